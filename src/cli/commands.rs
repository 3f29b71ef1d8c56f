//! Command handlers for the chatline binary.

use std::io::Write;
use std::sync::Arc;

use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use super::{ReplInput, TranslateArgs};
use crate::config::ChatConfig;
use crate::conversation::ConversationEngine;
use crate::error::{ChatlineError, Result};
use crate::stream::{HttpStreamConsumer, StreamEvent};
use crate::types::{ChatMode, ExchangeRequest, Language, MessageStatus};
use crate::util::cancel_after;

const HELP: &str = "commands: /lang <language>, /clear, /quit (Ctrl-C stops the current answer)";

/// Writes cumulative snapshots to stdout as they grow.
#[derive(Debug, Default)]
struct Printer {
    shown: String,
}

impl Printer {
    fn show(&mut self, text: &str) {
        let mut out = std::io::stdout();
        match text.strip_prefix(self.shown.as_str()) {
            Some(rest) => {
                let _ = write!(out, "{rest}");
            }
            None => {
                let _ = write!(out, "\n{text}");
            }
        }
        let _ = out.flush();
        self.shown.clear();
        self.shown.push_str(text);
    }

    fn finish(&mut self) {
        println!();
        self.shown.clear();
    }
}

/// Interactive chat over stdin.
pub async fn run_chat(config: ChatConfig, language: Option<Language>) -> Result<()> {
    let mut config = config;
    config.mode = ChatMode::Chat;
    if let Some(language) = language {
        config.language = language;
    }

    let consumer = Arc::new(HttpStreamConsumer::new(&config)?);
    let mut engine = ConversationEngine::new(consumer, &config);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    eprintln!("chatting in {} ({})", config.language, config.language.native_name());
    eprintln!("{HELP}");

    loop {
        eprint!("> ");
        let Some(line) = lines.next_line().await? else {
            break;
        };
        match ReplInput::parse(&line) {
            ReplInput::Empty => {}
            ReplInput::Quit => break,
            ReplInput::Help => eprintln!("{HELP}"),
            ReplInput::Invalid(reason) => eprintln!("{reason}"),
            ReplInput::Clear => {
                engine.clear();
                eprintln!("conversation cleared");
            }
            ReplInput::SetLanguage(language) => {
                engine.set_language(language);
                eprintln!("language set to {language} ({})", language.native_name());
            }
            ReplInput::Send(text) => {
                if engine.send(&text) {
                    stream_reply(&mut engine).await;
                }
            }
        }
    }
    Ok(())
}

async fn stream_reply(engine: &mut ConversationEngine) {
    let stop = engine.cancel_token().unwrap_or_default();
    let mut printer = Printer::default();

    loop {
        tokio::select! {
            more = engine.dispatch_next() => {
                if let Some(reply) = engine.state().messages().last() {
                    printer.show(reply.text());
                    if reply.status() == MessageStatus::Final {
                        break;
                    }
                }
                if !more {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                stop.cancel();
            }
        }
    }
    printer.finish();
}

/// Stream one translation to stdout.
pub async fn run_translate(config: ChatConfig, args: TranslateArgs) -> Result<()> {
    let mut config = config;
    config.mode = ChatMode::Translate;
    if let Some(from) = args.from {
        config.source_language = from;
    }
    let target = args.to.unwrap_or(config.language);

    let text = args.text.join(" ");
    if text.trim().is_empty() {
        return Err(ChatlineError::InvalidArgument("nothing to translate".to_string()));
    }

    let consumer = HttpStreamConsumer::new(&config)?;
    let cancel = CancellationToken::new();
    if let Some(deadline) = config.deadline {
        cancel_after(cancel.clone(), deadline);
    }
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let mut events = consumer.events(ExchangeRequest::new(text, target), cancel);
    let mut printer = Printer::default();
    while let Some(event) = events.next().await {
        match event {
            StreamEvent::Increment(text) | StreamEvent::Complete(text) => printer.show(&text),
            StreamEvent::Failed(err) => {
                printer.finish();
                return Err(err);
            }
        }
    }
    printer.finish();
    Ok(())
}

/// Print the server's health.
pub async fn run_health(config: ChatConfig) -> Result<()> {
    let consumer = HttpStreamConsumer::new(&config)?;
    let health = consumer.health().await?;
    println!(
        "{}: {} (cache {})",
        config.base_url,
        health.status,
        if health.cache_enabled { "enabled" } else { "disabled" }
    );
    if !health.is_healthy() {
        return Err(ChatlineError::Stream(format!(
            "server reported status '{}'",
            health.status
        )));
    }
    Ok(())
}
