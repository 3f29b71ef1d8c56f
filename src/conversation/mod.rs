//! Conversation engine: owns the ordered message history and reconciles
//! stream increments into it.
//!
//! State machine per conversation: `Idle` → `send` → `Streaming` →
//! (`Complete` | `Failed`) → `Idle`. `clear` is legal from both states and
//! returns to `Idle` with an empty history.

pub mod engine;
pub mod state;

pub use engine::ConversationEngine;
pub use state::{Applied, ConversationSnapshot, ConversationState, ExchangeId, PendingSend};
