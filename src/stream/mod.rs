//! Stream consumer: opens a generation exchange and decodes its body into
//! cumulative text increments.
//!
//! - [`SseDecoder`]: chunk-boundary-safe decoding of `data:` lines
//! - [`decode_byte_stream`]: turns any byte stream into [`StreamEvent`]s
//! - [`StreamConsumer`]: the seam the conversation engine talks to
//! - [`HttpStreamConsumer`]: the reqwest-backed implementation
//!
//! Increments carry the whole text so far rather than deltas: every event
//! copies the prefix, and consumers never merge.

pub mod decoder;
pub mod events;
pub mod http;

pub use decoder::{SseDecoder, Utf8Decoder};
pub use events::{decode_byte_stream, StreamEvent, StreamEventSink};
pub use http::{HealthStatus, HttpStreamConsumer};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::types::ExchangeRequest;

/// Cancellation token scoped to one open exchange.
///
/// Cancelling is cooperative: the pending read is aborted and the exchange
/// still finishes through its sink with a `Complete` event.
#[derive(Debug)]
pub struct StreamHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl StreamHandle {
    pub fn new(cancel: CancellationToken, task: Option<JoinHandle<()>>) -> Self {
        Self { cancel, task }
    }

    /// Request cancellation. Returns `false` if it was already requested.
    pub fn cancel(&self) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        self.cancel.cancel();
        true
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// A clone of the underlying token, e.g. to arm a deadline.
    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Whether the exchange has delivered its terminal event.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map(|t| t.is_finished()).unwrap_or(true)
    }

    /// Wait until the exchange has delivered its terminal event.
    pub async fn join(mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

/// Opens streaming exchanges.
pub trait StreamConsumer: Send + Sync {
    /// Start an exchange. Events are delivered to `sink` from a background
    /// task: increments first, then exactly one terminal event.
    fn open(&self, request: ExchangeRequest, sink: StreamEventSink) -> StreamHandle;
}
