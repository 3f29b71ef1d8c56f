//! Convenience re-exports for common use.

pub use crate::config::ChatConfig;
pub use crate::conversation::{ConversationEngine, ConversationSnapshot, ConversationState};
pub use crate::error::{ChatlineError, Result};
pub use crate::stream::{HttpStreamConsumer, StreamConsumer, StreamEvent, StreamHandle};
pub use crate::types::{ChatMode, ExchangeRequest, Language, Message, MessageStatus, Role};
