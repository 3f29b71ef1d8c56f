//! Stream events and the byte-stream driver that produces them.

use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::decoder::SseDecoder;
use crate::error::ChatlineError;

/// One observation of an in-flight exchange.
///
/// An exchange yields zero or more `Increment`s followed by exactly one of
/// `Complete` or `Failed`.
#[derive(Debug)]
pub enum StreamEvent {
    /// Cumulative text decoded so far. Supersedes the previous increment.
    Increment(String),
    /// Normal termination (or cancellation) with the trimmed final text.
    Complete(String),
    /// The transport failed before normal termination.
    Failed(ChatlineError),
}

impl StreamEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Increment(_))
    }
}

/// Callback receiving every event of one exchange, in order.
pub type StreamEventSink = Arc<dyn Fn(StreamEvent) + Send + Sync>;

/// How the read loop ended.
enum Outcome {
    Ended,
    Cancelled,
    Failed(ChatlineError),
}

/// Decode a body byte stream into [`StreamEvent`]s.
///
/// Cancellation aborts the pending read and resolves as `Complete` with the
/// text accumulated so far, or `interrupted_text` if nothing arrived. The
/// returned stream always ends with exactly one terminal event.
pub fn decode_byte_stream<S, B, E>(
    bytes: S,
    cancel: CancellationToken,
    interrupted_text: String,
) -> impl Stream<Item = StreamEvent> + Send + 'static
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<ChatlineError> + Send + 'static,
{
    async_stream::stream! {
        let mut decoder = SseDecoder::new();
        let mut received = 0usize;
        futures::pin_mut!(bytes);

        let outcome = loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => break Outcome::Cancelled,
                next = bytes.next() => next,
            };
            match next {
                None => break Outcome::Ended,
                Some(Err(err)) => break Outcome::Failed(err.into()),
                Some(Ok(chunk)) => {
                    let chunk = chunk.as_ref();
                    received += chunk.len();
                    for snapshot in decoder.push(chunk) {
                        yield StreamEvent::Increment(snapshot);
                    }
                    if decoder.is_done() {
                        break Outcome::Ended;
                    }
                }
            }
        };

        match outcome {
            Outcome::Ended => {
                if let Some(snapshot) = decoder.finish() {
                    yield StreamEvent::Increment(snapshot);
                }
                debug!(bytes = received, "stream ended");
                yield StreamEvent::Complete(decoder.final_text());
            }
            Outcome::Cancelled => {
                let text = decoder.final_text();
                debug!(bytes = received, partial = !text.is_empty(), "stream cancelled");
                yield StreamEvent::Complete(if text.is_empty() { interrupted_text } else { text });
            }
            Outcome::Failed(err) => {
                debug!(bytes = received, error = %err, "stream failed");
                yield StreamEvent::Failed(err);
            }
        }
    }
}
