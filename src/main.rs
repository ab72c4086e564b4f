use anyhow::anyhow;
use clap::Parser;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use helperchat::chat_runtime::{run_chat_loop, run_turn};
use helperchat::cli_dispatch_misc_ops::{handle_helpers_command, handle_parse_command};
use helperchat::helpers::HelperKind;
use helperchat::personas::PersonaSet;
use helperchat::providers::fireworks::FireworksProvider;
use helperchat::providers::mock::MockProvider;
use helperchat::providers::ProviderKind;
use helperchat::session::SessionStore;
use helperchat::session_ops::handle_session_command;
use helperchat::{build_info, Cli, Command, RunArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    debug!("{}", build_info());

    match cli.command {
        Command::Ask { prompt, run } => dispatch_ask(&run, &prompt).await,
        Command::Chat { run } => dispatch_chat(&run).await,
        Command::Parse { helper, file, json } => {
            handle_parse_command(helper.as_deref(), file.as_deref(), json)
        }
        Command::Helpers { personas } => handle_helpers_command(personas.as_deref()),
        Command::Session { state_dir, command } => handle_session_command(&state_dir, &command),
    }
}

fn resolve_helper(run: &RunArgs) -> anyhow::Result<Option<HelperKind>> {
    match run.helper.as_deref() {
        None => Ok(None),
        Some(tag) => HelperKind::parse(tag).map(Some).ok_or_else(|| {
            anyhow!(
                "unknown helper '{tag}' (try: tweet-generator, token-analysis, crypto-research, blockchain-educator)"
            )
        }),
    }
}

fn load_personas(run: &RunArgs) -> anyhow::Result<PersonaSet> {
    match &run.personas {
        Some(path) => PersonaSet::from_file(path),
        None => Ok(PersonaSet::builtin()),
    }
}

async fn dispatch_ask(run: &RunArgs, prompt: &str) -> anyhow::Result<()> {
    let helper = resolve_helper(run)?;
    let personas = load_personas(run)?;
    let store = SessionStore::open(&run.state_dir, &run.session);

    let outcome = match ProviderKind::parse(&run.provider) {
        Some(ProviderKind::Fireworks) => {
            let provider = FireworksProvider::from_env(&run.base_url, run.http_timeout_ms)?;
            run_turn(&provider, &personas, &store, run, helper, prompt).await?
        }
        Some(ProviderKind::Mock) => {
            let provider = MockProvider::new();
            run_turn(&provider, &personas, &store, run, helper, prompt).await?
        }
        None => {
            return Err(anyhow!(
                "unknown provider '{}' (try: fireworks, mock)",
                run.provider
            ))
        }
    };

    if run.json {
        let out = serde_json::json!({
            "data": outcome.parsed,
            "error": outcome.parse_error,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", outcome.rendered.trim_end());
    }
    Ok(())
}

async fn dispatch_chat(run: &RunArgs) -> anyhow::Result<()> {
    let helper = resolve_helper(run)?;
    let personas = load_personas(run)?;
    let store = SessionStore::open(&run.state_dir, &run.session);

    match ProviderKind::parse(&run.provider) {
        Some(ProviderKind::Fireworks) => {
            let provider = FireworksProvider::from_env(&run.base_url, run.http_timeout_ms)?;
            run_chat_loop(&provider, &personas, &store, run, helper).await
        }
        Some(ProviderKind::Mock) => {
            let provider = MockProvider::new();
            run_chat_loop(&provider, &personas, &store, run, helper).await
        }
        None => Err(anyhow!(
            "unknown provider '{}' (try: fireworks, mock)",
            run.provider
        )),
    }
}
