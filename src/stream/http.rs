//! reqwest-backed stream consumer.

use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::events::{decode_byte_stream, StreamEvent, StreamEventSink};
use super::{StreamConsumer, StreamHandle};
use crate::config::ChatConfig;
use crate::error::{status_to_error, Result};
use crate::types::{ChatMode, ExchangeRequest, Language};

/// Response of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub cache_enabled: bool,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Stream consumer that POSTs to the configured generation endpoint.
#[derive(Debug, Clone)]
pub struct HttpStreamConsumer {
    client: reqwest::Client,
    endpoint: String,
    health_url: String,
    mode: ChatMode,
    source_language: Language,
    interrupted_text: String,
}

impl HttpStreamConsumer {
    pub fn new(config: &ChatConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(4)
            .default_headers(default_headers())
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// Use a caller-provided client (shared pools, custom TLS).
    pub fn with_client(client: reqwest::Client, config: &ChatConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint_url(),
            health_url: config.health_url(),
            mode: config.mode,
            source_language: config.source_language,
            interrupted_text: config.interrupted_text.clone(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Lazily run one exchange as a stream of events.
    ///
    /// Nothing is sent until the stream is first polled. A non-success
    /// status yields a single `Failed` event and no increments.
    pub fn events(
        &self,
        request: ExchangeRequest,
        cancel: CancellationToken,
    ) -> BoxStream<'static, StreamEvent> {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        let mode = self.mode;
        let source_language = self.source_language;
        let interrupted_text = self.interrupted_text.clone();

        let stream = async_stream::stream! {
            let connect = send_request(&client, &endpoint, &request, mode, source_language);
            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                response = connect => Some(response),
            };

            match response {
                None => {
                    debug!(endpoint = %endpoint, "exchange cancelled before response");
                    yield StreamEvent::Complete(interrupted_text);
                }
                Some(Err(err)) => {
                    warn!(endpoint = %endpoint, error = %err, "exchange failed");
                    yield StreamEvent::Failed(err);
                }
                Some(Ok(response)) => {
                    let body = decode_byte_stream(response.bytes_stream(), cancel, interrupted_text);
                    futures::pin_mut!(body);
                    while let Some(event) = body.next().await {
                        yield event;
                    }
                }
            }
        };
        Box::pin(stream)
    }

    /// Probe the server's health endpoint.
    pub async fn health(&self) -> Result<HealthStatus> {
        let response = self.client.get(&self.health_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_to_error(status.as_u16(), &body));
        }
        Ok(response.json::<HealthStatus>().await?)
    }
}

impl StreamConsumer for HttpStreamConsumer {
    fn open(&self, request: ExchangeRequest, sink: StreamEventSink) -> StreamHandle {
        let cancel = CancellationToken::new();
        let mut events = self.events(request, cancel.clone());
        let task = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                sink(event);
            }
        });
        StreamHandle::new(cancel, Some(task))
    }
}

async fn send_request(
    client: &reqwest::Client,
    endpoint: &str,
    request: &ExchangeRequest,
    mode: ChatMode,
    source_language: Language,
) -> Result<reqwest::Response> {
    debug!(
        endpoint,
        target_language = %request.target_language,
        chars = request.text.chars().count(),
        "opening exchange"
    );
    let response = client
        .post(endpoint)
        .json(&request.to_wire(mode, source_language))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(status_to_error(status.as_u16(), &body));
    }
    debug!(status = status.as_u16(), "exchange accepted");
    Ok(response)
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
    headers
}
