//! Shared test helpers and a scripted stream consumer.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chatline::config::ChatConfig;
use chatline::conversation::ConversationEngine;
use chatline::stream::{StreamConsumer, StreamEvent, StreamEventSink, StreamHandle};
use chatline::types::ExchangeRequest;
use tokio_util::sync::CancellationToken;

pub const PLACEHOLDER: &str = "interrupted";
pub const FAILURE: &str = "generation failed";

/// How one scripted exchange behaves.
pub enum Script {
    /// Deliver these events right away, in order.
    Events(Vec<StreamEvent>),
    /// Deliver these increments, then hold the exchange open until cancelled.
    UntilCancelled(Vec<&'static str>),
}

/// A stream consumer that replays queued scripts and records requests.
#[derive(Default)]
pub struct ScriptedConsumer {
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<ExchangeRequest>>,
}

impl ScriptedConsumer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn queue(&self, script: Script) {
        self.scripts.lock().unwrap().push_back(script);
    }

    /// Queue an exchange that streams `increments` and completes with the last one.
    pub fn queue_reply(&self, increments: &[&str]) {
        let mut events: Vec<StreamEvent> = increments
            .iter()
            .map(|t| StreamEvent::Increment(t.to_string()))
            .collect();
        let last = increments.last().copied().unwrap_or_default();
        events.push(StreamEvent::Complete(last.trim().to_string()));
        self.queue(Script::Events(events));
    }

    pub fn requests(&self) -> Vec<ExchangeRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl StreamConsumer for ScriptedConsumer {
    fn open(&self, request: ExchangeRequest, sink: StreamEventSink) -> StreamHandle {
        self.requests.lock().unwrap().push(request);
        let cancel = CancellationToken::new();
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Script::Events(vec![StreamEvent::Complete(String::new())]));

        match script {
            Script::Events(events) => {
                for event in events {
                    sink(event);
                }
                StreamHandle::new(cancel, None)
            }
            Script::UntilCancelled(increments) => {
                let mut text = String::new();
                for part in increments {
                    text = part.to_string();
                    sink(StreamEvent::Increment(text.clone()));
                }
                let token = cancel.clone();
                let task = tokio::spawn(async move {
                    token.cancelled().await;
                    let final_text = if text.is_empty() {
                        PLACEHOLDER.to_string()
                    } else {
                        text
                    };
                    sink(StreamEvent::Complete(final_text));
                });
                StreamHandle::new(cancel, Some(task))
            }
        }
    }
}

pub fn test_config() -> ChatConfig {
    ChatConfig::builder()
        .interrupted_text(PLACEHOLDER)
        .failure_text(FAILURE)
        .build()
}

pub fn engine_with(consumer: &Arc<ScriptedConsumer>) -> ConversationEngine {
    ConversationEngine::new(consumer.clone(), &test_config())
}
