//! Core types for chatline.

pub mod language;
pub mod message;
pub mod request;

pub use language::*;
pub use message::*;
pub use request::*;
