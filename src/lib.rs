use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub mod chat_runtime;
pub mod cli_dispatch_misc_ops;
pub mod extract;
pub mod extract_education;
pub mod helpers;
pub mod parser;
pub mod personas;
pub mod providers;
pub mod render;
pub mod schema;
pub mod session;
pub mod session_ops;
pub mod types;

#[derive(Parser, Debug)]
#[command(
    name = "helperchat",
    version,
    about = "Chat with structured LLM helper personas from the terminal"
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send one prompt and print the rendered reply
    Ask {
        prompt: String,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Interactive chat loop
    Chat {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Run the recovery pipeline over a raw model reply (file or stdin)
    Parse {
        /// Helper tag used for manual extraction and rendering
        #[arg(long)]
        helper: Option<String>,
        /// File holding the raw reply; stdin when omitted
        #[arg(long)]
        file: Option<PathBuf>,
        /// Print the {data, error} parse result as JSON instead of rendered text
        #[arg(long)]
        json: bool,
    },
    /// List the configured helper personas
    Helpers {
        /// YAML personas config overriding the built-in prompts
        #[arg(long)]
        personas: Option<PathBuf>,
    },
    /// Inspect or edit stored sessions
    Session {
        #[arg(long, default_value = ".helperchat")]
        state_dir: PathBuf,
        #[command(subcommand)]
        command: SessionSubcommand,
    },
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Helper persona (tweet-generator | token-analysis | crypto-research | blockchain-educator)
    #[arg(long)]
    pub helper: Option<String>,
    #[arg(long, default_value = providers::fireworks::DEFAULT_MODEL)]
    pub model: String,
    #[arg(long, default_value = providers::fireworks::DEFAULT_BASE_URL)]
    pub base_url: String,
    /// Inference backend (fireworks | mock)
    #[arg(long, default_value = "fireworks")]
    pub provider: String,
    /// Reply language injected into the persona prompt
    #[arg(long, default_value = "en")]
    pub language: String,
    #[arg(long, default_value = "default")]
    pub session: String,
    #[arg(long, default_value = ".helperchat")]
    pub state_dir: PathBuf,
    /// YAML personas config overriding the built-in prompts
    #[arg(long)]
    pub personas: Option<PathBuf>,
    #[arg(long, default_value_t = 4096)]
    pub max_tokens: u32,
    #[arg(long, default_value_t = 0.6)]
    pub temperature: f32,
    #[arg(long, default_value_t = 60_000)]
    pub http_timeout_ms: u64,
    /// Print the {data, error} parse result as JSON instead of rendered text
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum SessionSubcommand {
    /// Summary of one session
    Info {
        #[arg(long, default_value = "default")]
        name: String,
    },
    /// Print the last messages of a session
    Show {
        #[arg(long, default_value = "default")]
        name: String,
        #[arg(long, default_value_t = 20)]
        last: usize,
    },
    /// Drop messages from a session
    Drop {
        #[arg(long, default_value = "default")]
        name: String,
        #[arg(long)]
        from: Option<usize>,
        #[arg(long)]
        last: Option<usize>,
    },
    /// Delete a session
    Reset {
        #[arg(long, default_value = "default")]
        name: String,
    },
    /// List stored sessions
    List {
        /// Glob over session names (e.g. 'tweets-*')
        #[arg(long = "match")]
        name_glob: Option<String>,
    },
}

pub fn build_info() -> String {
    format!(
        "helperchat {} ({} {})",
        env!("CARGO_PKG_VERSION"),
        env!("HELPERCHAT_GIT_SHA"),
        env!("HELPERCHAT_TARGET")
    )
}
