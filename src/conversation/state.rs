//! Conversation state and its transition functions.
//!
//! All mutation goes through these methods. They are synchronous and pure
//! with respect to I/O, so the same transitions drive the live engine and
//! the tests.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::stream::StreamEvent;
use crate::types::{ExchangeRequest, Language, Message, MessageId};

/// Identifies one send, so events from a superseded exchange can be told apart.
pub type ExchangeId = Uuid;

/// Everything the engine needs to start the exchange for an accepted send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSend {
    pub exchange_id: ExchangeId,
    pub assistant_id: MessageId,
    pub request: ExchangeRequest,
}

/// Read-only view handed to the render layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSnapshot {
    pub messages: Vec<Message>,
    pub busy: bool,
    pub language: Language,
}

/// What applying an event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The pending message received a newer snapshot.
    Updated(MessageId),
    /// The pending message was finalized and the conversation is idle again.
    Finished(MessageId),
    /// The event belonged to no live exchange and was dropped.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InFlight {
    exchange_id: ExchangeId,
    assistant_id: MessageId,
}

/// Ordered message history plus language selection and the busy gate.
///
/// Invariant: `busy` is true exactly when one exchange is in flight, and
/// then the history holds exactly one pending message, the in-flight one.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    messages: Vec<Message>,
    language: Language,
    in_flight: Option<InFlight>,
}

impl ConversationState {
    pub fn new(language: Language) -> Self {
        Self {
            messages: Vec::new(),
            language,
            in_flight: None,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Exchange currently in flight, if any.
    pub fn active_exchange(&self) -> Option<ExchangeId> {
        self.in_flight.map(|f| f.exchange_id)
    }

    pub fn snapshot(&self) -> ConversationSnapshot {
        ConversationSnapshot {
            messages: self.messages.clone(),
            busy: self.is_busy(),
            language: self.language,
        }
    }

    /// Accept a send: append the user message and an empty pending reply.
    ///
    /// Returns `None` with no state change when the text is blank or an
    /// exchange is already in flight.
    pub fn begin_send(&mut self, raw_text: &str) -> Option<PendingSend> {
        let trimmed = raw_text.trim();
        if trimmed.is_empty() || self.is_busy() {
            return None;
        }

        let assistant = Message::pending_assistant();
        let in_flight = InFlight {
            exchange_id: Uuid::new_v4(),
            assistant_id: assistant.id(),
        };
        self.messages.push(Message::user(trimmed));
        self.messages.push(assistant);
        self.in_flight = Some(in_flight);

        Some(PendingSend {
            exchange_id: in_flight.exchange_id,
            assistant_id: in_flight.assistant_id,
            request: ExchangeRequest::new(raw_text, self.language),
        })
    }

    /// Fold one stream event into the history.
    ///
    /// Events for any exchange other than the active one are ignored, which
    /// keeps a cleared history from being resurrected by late callbacks.
    pub fn apply(
        &mut self,
        exchange_id: ExchangeId,
        event: StreamEvent,
        failure_text: &str,
    ) -> Applied {
        let Some(in_flight) = self.in_flight.filter(|f| f.exchange_id == exchange_id) else {
            return Applied::Ignored;
        };
        let assistant_id = in_flight.assistant_id;
        let Some(message) = self.messages.iter_mut().rev().find(|m| m.id() == assistant_id) else {
            self.in_flight = None;
            return Applied::Ignored;
        };

        match event {
            StreamEvent::Increment(text) => {
                message.replace_pending_text(&text);
                Applied::Updated(in_flight.assistant_id)
            }
            StreamEvent::Complete(text) => {
                message.finalize(text);
                self.in_flight = None;
                Applied::Finished(in_flight.assistant_id)
            }
            StreamEvent::Failed(_) => {
                message.finalize(failure_text);
                self.in_flight = None;
                Applied::Finished(in_flight.assistant_id)
            }
        }
    }

    /// Affects subsequent sends only.
    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Drop all messages and return to idle.
    ///
    /// Returns the exchange that was in flight, so the caller can cancel it.
    pub fn clear(&mut self) -> Option<ExchangeId> {
        self.messages.clear();
        self.in_flight.take().map(|f| f.exchange_id)
    }
}
