//! Outgoing exchange payloads and their wire encodings.

use serde::Serialize;

use super::language::{ChatMode, Language};

/// What the conversation engine asks the stream consumer to generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeRequest {
    pub text: String,
    pub target_language: Language,
}

impl ExchangeRequest {
    pub fn new(text: impl Into<String>, target_language: Language) -> Self {
        Self {
            text: text.into(),
            target_language,
        }
    }

    /// Encode the request as the JSON body expected by `mode`'s endpoint.
    pub fn to_wire(&self, mode: ChatMode, source_language: Language) -> WireBody<'_> {
        match mode {
            ChatMode::Chat => WireBody::Chat {
                message: &self.text,
                language: self.target_language.code(),
            },
            ChatMode::Translate => WireBody::Translate {
                text: &self.text,
                source_language: source_language.code(),
                target_language: self.target_language.code(),
            },
        }
    }
}

/// JSON request body. Both variants share the same framing on the response side.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum WireBody<'a> {
    Chat {
        message: &'a str,
        language: &'static str,
    },
    Translate {
        text: &'a str,
        source_language: &'static str,
        target_language: &'static str,
    },
}
