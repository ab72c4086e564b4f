use std::io::Write as _;

use serde_json::Value;
use tokio::io::AsyncBufReadExt;
use tracing::debug;

use crate::helpers::HelperKind;
use crate::parser::parse_helper_response;
use crate::personas::PersonaSet;
use crate::providers::ModelProvider;
use crate::render::render_helper_response;
use crate::session::{SessionStore, StoredMessage};
use crate::types::{GenerateRequest, Message, Role, Usage};
use crate::RunArgs;

#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub raw: String,
    pub parsed: Option<Value>,
    pub parse_error: Option<String>,
    pub rendered: String,
    pub usage: Option<Usage>,
}

/// One full helper turn: build the request from the persona prompt plus
/// stored history, call the provider, run the reply through the recovery
/// chain, persist both sides, and render.
pub async fn run_turn<P: ModelProvider>(
    provider: &P,
    personas: &PersonaSet,
    store: &SessionStore,
    run: &RunArgs,
    helper: Option<HelperKind>,
    prompt: &str,
) -> anyhow::Result<TurnOutcome> {
    let mut data = store.load()?;
    if let Some(kind) = helper {
        data.helper_type = Some(kind.as_str().to_string());
    }
    data.language = run.language.clone();

    let mut messages = Vec::new();
    if let Some(kind) = helper {
        messages.push(Message::system(
            personas.system_prompt_for(kind, &run.language)?,
        ));
    }
    for stored in &data.messages {
        if matches!(stored.role, Role::System) {
            continue;
        }
        messages.push(Message {
            role: stored.role,
            content: stored.content.clone(),
        });
    }
    messages.push(Message::user(prompt));

    let req = GenerateRequest {
        model: run.model.clone(),
        messages,
        max_tokens: run.max_tokens,
        temperature: run.temperature,
    };
    let resp = provider.generate(req).await?;

    let (parsed, parse_error) = match helper {
        Some(kind) => parse_helper_response(&resp.content, kind.as_str()).into_parts(),
        None => (None, None),
    };
    let rendered = render_helper_response(
        helper.map(|k| k.as_str()),
        parsed.clone(),
        &resp.content,
    );

    data.messages.push(StoredMessage::new(Role::User, prompt));
    let mut assistant = StoredMessage::new(Role::Assistant, resp.content.clone());
    assistant.parsed = parsed.clone();
    assistant.parse_error = parse_error.clone();
    data.messages.push(assistant);
    store.save(&mut data)?;

    debug!(
        "turn stored: session={} messages={}",
        data.name,
        data.messages.len()
    );

    Ok(TurnOutcome {
        raw: resp.content,
        parsed,
        parse_error,
        rendered,
        usage: resp.usage,
    })
}

pub async fn run_chat_loop<P: ModelProvider>(
    provider: &P,
    personas: &PersonaSet,
    store: &SessionStore,
    run: &RunArgs,
    helper: Option<HelperKind>,
) -> anyhow::Result<()> {
    match helper {
        Some(kind) => println!(
            "helperchat - {} ({}). /quit to exit.",
            kind.display_name(),
            run.model
        ),
        None => println!("helperchat - plain chat ({}). /quit to exit.", run.model),
    }

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().ok();
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input, "/quit" | "/exit") {
            break;
        }

        match run_turn(provider, personas, store, run, helper, input).await {
            Ok(outcome) => {
                println!("{}", outcome.rendered.trim_end());
                if let Some(usage) = outcome.usage {
                    debug!(
                        "usage: prompt={:?} completion={:?} total={:?}",
                        usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
                    );
                }
            }
            Err(e) => println!("[provider-error] {e:#}"),
        }
    }
    Ok(())
}
