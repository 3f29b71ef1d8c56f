//! CLI entry point for chatline.

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::types::Language;

/// chatline CLI
#[derive(Parser, Debug)]
#[command(name = "chatline", version, about = "Streaming chat and translation client")]
pub struct Cli {
    /// Config file (default: ~/.chatline/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Server base URL, overrides config and environment
    #[arg(long, global = true)]
    pub url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive chat
    Chat(ChatArgs),
    /// Translate one text
    Translate(TranslateArgs),
    /// Check the server's health endpoint
    Health,
}

/// Arguments for the `chat` subcommand.
#[derive(Parser, Debug)]
pub struct ChatArgs {
    /// Reply language (Korean, English, Japanese, Chinese, French, German, Spanish, Russian)
    #[arg(short, long)]
    pub language: Option<Language>,
}

/// Arguments for the `translate` subcommand.
#[derive(Parser, Debug)]
pub struct TranslateArgs {
    /// Source language
    #[arg(long)]
    pub from: Option<Language>,

    /// Target language
    #[arg(long)]
    pub to: Option<Language>,

    /// Text to translate
    #[arg(required = true)]
    pub text: Vec<String>,
}

/// A line typed into the chat REPL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplInput {
    Send(String),
    SetLanguage(Language),
    Clear,
    Quit,
    Help,
    Empty,
    Invalid(String),
}

impl ReplInput {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(command) = trimmed.strip_prefix('/') else {
            return if trimmed.is_empty() {
                Self::Empty
            } else {
                Self::Send(line.trim_end_matches(['\r', '\n']).to_string())
            };
        };

        let mut parts = command.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("quit" | "exit" | "q"), None) => Self::Quit,
            (Some("clear"), None) => Self::Clear,
            (Some("help" | "?"), None) => Self::Help,
            (Some("lang" | "language"), Some(code)) => match code.parse() {
                Ok(language) => Self::SetLanguage(language),
                Err(_) => Self::Invalid(format!("unknown language '{code}'")),
            },
            _ => Self::Invalid(format!("unknown command '/{command}'")),
        }
    }
}
