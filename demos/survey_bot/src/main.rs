//! Survey Bot Example
//!
//! A three-step survey driven entirely by conversation state:
//!
//! ```text
//! (virgin) ──/start──▶ awaiting_name ──any text──▶ awaiting_age ──number──▶ done
//!                                                       │
//!                                                       └──not a number──▶ (asks again)
//! ```
//!
//! Webhook bodies are read from stdin, one JSON document per line, and
//! dispatched as if they had arrived over HTTP. Replies are logged instead
//! of being sent.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package survey-bot -- --platform telegram < updates.jsonl
//! PARLEY_STORE__BACKEND=redis cargo run --package survey-bot --features redis -- -p viber
//! ```

use anyhow::Result;
use clap::Parser;
use parley::prelude::*;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

#[derive(Debug, Parser)]
#[command(about = "Dispatch webhook bodies from stdin through a survey bot")]
struct Args {
    /// Platform the bodies come from (telegram, vkontakte, viber, facebook).
    #[arg(short, long, default_value = "telegram")]
    platform: String,

    /// Configuration file (defaults to ./parley.toml if present).
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
}

// ============================================================================
// Event helpers
// ============================================================================

/// Message text, whichever platform the event came from.
fn text_of(event: &BoxedEvent) -> Option<&str> {
    if let Some(update) = event.downcast_ref::<telegram::Update>() {
        return update.text();
    }
    if let Some(callback) = event.downcast_ref::<vkontakte::Callback>() {
        return callback.text();
    }
    if let Some(callback) = event.downcast_ref::<viber::Callback>() {
        return callback.text();
    }
    event.downcast_ref::<facebook::Webhook>()?.text()
}

fn is_start(event: &BoxedEvent) -> bool {
    text_of(event).is_some_and(|text| text.trim() == "/start")
}

fn reply(state: &StateHandle, text: &str) {
    info!(to = state.entity_id(), "{text}");
}

// ============================================================================
// Handlers
// ============================================================================

async fn start(_event: BoxedEvent, mut state: StateHandle) -> Result<()> {
    reply(&state, "Hi! What's your name?");
    state.set_label("awaiting_name").await?;
    Ok(())
}

async fn save_name(event: BoxedEvent, mut state: StateHandle) -> Result<()> {
    let name = text_of(&event).unwrap_or_default().trim().to_string();
    reply(&state, &format!("Nice to meet you, {name}. How old are you?"));
    state.insert("name", json!(name)).await?;
    state.set_label("awaiting_age").await?;
    Ok(())
}

async fn save_age(event: BoxedEvent, mut state: StateHandle) -> Result<()> {
    let Some(age) = text_of(&event).and_then(|t| t.trim().parse::<u8>().ok()) else {
        reply(&state, "Please answer with a number.");
        return Ok(());
    };
    let name = state
        .get("name")
        .and_then(|v| v.as_str())
        .unwrap_or("stranger")
        .to_string();
    reply(&state, &format!("Thanks {name}, you're all set."));
    state.insert("age", json!(age)).await?;
    state.set_label("done").await?;
    Ok(())
}

async fn restart(_event: BoxedEvent, mut state: StateHandle) -> Result<()> {
    reply(&state, "Starting over. What's your name?");
    state.delete().await?;
    state.set_label("awaiting_name").await?;
    Ok(())
}

async fn explain(_event: BoxedEvent, state: StateHandle) {
    reply(&state, "Send /start to take the survey.");
}

fn registry() -> HandlerRegistry {
    HandlerRegistry::new()
        .with(
            Registration::new()
                .name("start")
                .content(is_start)
                .state(|s| s.is_virgin())
                .handler(start),
        )
        .with(
            Registration::new()
                .name("restart")
                .content(is_start)
                .state(|s| !s.is_virgin())
                .handler(restart),
        )
        .with(
            Registration::new()
                .name("save_name")
                .content(|e| text_of(e).is_some())
                .in_state("awaiting_name")
                .handler(save_name),
        )
        .with(
            Registration::new()
                .name("save_age")
                .content(|e| text_of(e).is_some())
                .in_state("awaiting_age")
                .handler(save_age),
        )
        .with_default(explain)
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.file(path);
    }
    let (_config, store) = bootstrap(loader).await?;
    let dispatcher = Dispatcher::new(registry(), store, default_resolver())
        .with_observer(TracingObserver);

    info!(platform = %args.platform, "Reading webhook bodies from stdin");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let event = match decode(&args.platform, line.as_bytes()) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "Skipping undecodable body");
                continue;
            }
        };
        if let Err(e) = dispatcher.dispatch(event).await {
            error!(error = %e, "Dispatch failed");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn telegram(user: i64, text: &str) -> BoxedEvent {
        let body = json!({
            "update_id": 1,
            "message": {
                "message_id": 1,
                "from": {"id": user, "first_name": "T"},
                "chat": {"id": user, "type": "private"},
                "text": text
            }
        });
        decode("telegram", body.to_string().as_bytes()).unwrap()
    }

    #[tokio::test]
    async fn test_survey_flow() {
        let store = StateStore::memory();
        let dispatcher = Dispatcher::new(registry(), store.clone(), default_resolver());

        let steps = [
            ("hello", DispatchOutcome::Fallback),
            ("/start", DispatchOutcome::Handled { index: 0, name: Some("start".into()) }),
            ("Ada", DispatchOutcome::Handled { index: 2, name: Some("save_name".into()) }),
            ("old", DispatchOutcome::Handled { index: 3, name: Some("save_age".into()) }),
            ("36", DispatchOutcome::Handled { index: 3, name: Some("save_age".into()) }),
        ];
        for (text, expected) in steps {
            let outcome = dispatcher.dispatch(telegram(9, text)).await.unwrap();
            assert_eq!(outcome, expected, "after {text:?}");
        }

        let state = store.load("telegram_9").await.unwrap();
        assert!(state.is("done"));
        assert_eq!(state.get("name"), Some(&json!("Ada")));
        assert_eq!(state.get("age"), Some(&json!(36)));

        dispatcher.dispatch(telegram(9, "/start")).await.unwrap();
        let state = store.load("telegram_9").await.unwrap();
        assert!(state.is("awaiting_name"));
        assert_eq!(state.get("name"), None);
    }
}
