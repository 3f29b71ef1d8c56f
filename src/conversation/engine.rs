//! Owning dispatcher around [`ConversationState`].

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::state::{Applied, ConversationSnapshot, ConversationState, ExchangeId};
use crate::config::ChatConfig;
use crate::stream::{StreamConsumer, StreamEvent, StreamEventSink, StreamHandle};
use crate::types::Language;
use crate::util::cancel_after;

/// Translates user intent into conversation mutations.
///
/// The engine is the single owner of its [`ConversationState`]. Stream
/// events arrive on an internal channel tagged with their exchange id and are
/// applied only when the owner calls [`dispatch_next`](Self::dispatch_next),
/// [`dispatch_ready`](Self::dispatch_ready) or
/// [`wait_idle`](Self::wait_idle), so mutation is serialized through `&mut
/// self` even though the network runs on background tasks.
///
/// Failures never escape: a failed exchange becomes the configured failure
/// text on the assistant message.
///
/// ```ignore
/// let consumer = Arc::new(HttpStreamConsumer::new(&config)?);
/// let mut engine = ConversationEngine::new(consumer, &config);
/// engine.send("How are you?");
/// engine.wait_idle().await;
/// println!("{}", engine.snapshot().messages[1].text());
/// ```
pub struct ConversationEngine {
    state: ConversationState,
    consumer: Arc<dyn StreamConsumer>,
    active: Option<(ExchangeId, StreamHandle)>,
    events_tx: mpsc::UnboundedSender<(ExchangeId, StreamEvent)>,
    events_rx: mpsc::UnboundedReceiver<(ExchangeId, StreamEvent)>,
    snapshot_tx: watch::Sender<ConversationSnapshot>,
    failure_text: String,
    deadline: Option<std::time::Duration>,
}

impl ConversationEngine {
    pub fn new(consumer: Arc<dyn StreamConsumer>, config: &ChatConfig) -> Self {
        let state = ConversationState::new(config.language);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, _) = watch::channel(state.snapshot());
        Self {
            state,
            consumer,
            active: None,
            events_tx,
            events_rx,
            snapshot_tx,
            failure_text: config.failure_text.clone(),
            deadline: config.deadline,
        }
    }

    /// Current state, borrowed.
    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn snapshot(&self) -> ConversationSnapshot {
        self.state.snapshot()
    }

    /// Subscribe to snapshots published after every state change.
    pub fn watch(&self) -> watch::Receiver<ConversationSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    /// Send user text. Returns whether it was accepted.
    ///
    /// Blank text and sends while an exchange is in flight are dropped
    /// without any state change.
    pub fn send(&mut self, raw_text: &str) -> bool {
        let Some(pending) = self.state.begin_send(raw_text) else {
            debug!(busy = self.state.is_busy(), "send rejected");
            return false;
        };

        let exchange_id = pending.exchange_id;
        let tx = self.events_tx.clone();
        let sink: StreamEventSink = Arc::new(move |event| {
            let _ = tx.send((exchange_id, event));
        });
        let handle = self.consumer.open(pending.request, sink);
        if let Some(deadline) = self.deadline {
            cancel_after(handle.token(), deadline);
        }
        debug!(exchange = %exchange_id, message = %pending.assistant_id, "exchange opened");

        self.active = Some((exchange_id, handle));
        self.publish();
        true
    }

    /// Change the target language for subsequent sends.
    pub fn set_language(&mut self, language: Language) {
        self.state.set_language(language);
        self.publish();
    }

    /// Discard the history. An in-flight exchange is cancelled and any of its
    /// late events are ignored.
    pub fn clear(&mut self) {
        if let Some(exchange_id) = self.state.clear() {
            debug!(exchange = %exchange_id, "clearing with exchange in flight");
        }
        if let Some((_, handle)) = self.active.take() {
            handle.cancel();
        }
        self.publish();
    }

    /// Stop the in-flight exchange. It still completes, with whatever text
    /// arrived or the interruption placeholder.
    pub fn cancel(&self) -> bool {
        match &self.active {
            Some((_, handle)) => handle.cancel(),
            None => false,
        }
    }

    /// Token of the in-flight exchange, for cancelling from outside `&mut self`.
    pub fn cancel_token(&self) -> Option<CancellationToken> {
        self.active.as_ref().map(|(_, handle)| handle.token())
    }

    /// Wait for and apply the next event of the active exchange.
    ///
    /// Returns `false` immediately when idle. Stale events from cleared
    /// exchanges are consumed and dropped along the way.
    pub async fn dispatch_next(&mut self) -> bool {
        if !self.state.is_busy() {
            return false;
        }
        loop {
            let Some((exchange_id, event)) = self.events_rx.recv().await else {
                return false;
            };
            if self.apply(exchange_id, event) != Applied::Ignored {
                return true;
            }
        }
    }

    /// Apply every event already queued without waiting. Returns how many
    /// changed the conversation.
    pub fn dispatch_ready(&mut self) -> usize {
        let mut applied = 0;
        while let Ok((exchange_id, event)) = self.events_rx.try_recv() {
            if self.apply(exchange_id, event) != Applied::Ignored {
                applied += 1;
            }
        }
        applied
    }

    /// Dispatch events until no exchange is in flight.
    pub async fn wait_idle(&mut self) {
        while self.dispatch_next().await {}
    }

    fn apply(&mut self, exchange_id: ExchangeId, event: StreamEvent) -> Applied {
        if let StreamEvent::Failed(err) = &event {
            warn!(exchange = %exchange_id, error = %err, "exchange failed");
        }
        let applied = self.state.apply(exchange_id, event, &self.failure_text);
        match applied {
            Applied::Ignored => {
                debug!(exchange = %exchange_id, "dropped event for inactive exchange");
            }
            Applied::Finished(_) => {
                if matches!(&self.active, Some((id, _)) if *id == exchange_id) {
                    self.active = None;
                }
                self.publish();
            }
            Applied::Updated(_) => self.publish(),
        }
        applied
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.state.snapshot());
    }
}
