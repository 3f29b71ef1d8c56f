//! chatline: streaming chat and translation client.
//!
//! Opens an exchange against a text-generation server that answers with a
//! `data:`-framed event stream, decodes the stream into cumulative text
//! increments, and reconciles them into an ordered conversation history.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use chatline::prelude::*;
//!
//! # async fn example() -> chatline::error::Result<()> {
//! let config = ChatConfig::load(None)?;
//! let consumer = Arc::new(HttpStreamConsumer::new(&config)?);
//! let mut engine = ConversationEngine::new(consumer, &config);
//!
//! engine.send("Hello!");
//! engine.wait_idle().await;
//! for message in engine.snapshot().messages {
//!     println!("{}: {}", message.role(), message.text());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod conversation;
pub mod error;
pub mod prelude;
pub mod stream;
pub mod types;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
