//! OpenAI-compatible streaming chat completion provider (`/chat/completions`).
//!
//! Sends the turn list with `stream: true` and parses the Server-Sent Events
//! with `reqwest-eventsource`. All wire types are private to this module.
//! Content-safety rejections (Azure-style `content_filter_result` envelopes
//! on an HTTP error, or `finish_reason = "content_filter"` mid-stream) are
//! mapped to [`CompletionError::Filtered`]; everything else becomes
//! [`CompletionError::Other`]. The event source never reconnects.

use std::collections::BTreeMap;
use std::time::Duration;

use futures_util::{Stream, StreamExt, stream};
use reqwest::{Client, StatusCode};
use reqwest_eventsource::{Event, EventSource, RequestBuilderExt, retry::Never};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace, warn};

use crate::llm::{
    ChatCompletion, ChatTurn, ChunkChoice, ChunkDelta, ChunkStream, CompletionChunk,
    CompletionError, CompletionFuture, FilterCategory, ProviderError,
};

const DONE_SENTINEL: &str = "[DONE]";

// ── Public provider ───────────────────────────────────────────────────────────

/// Adapter for any HTTP endpoint implementing streaming `/chat/completions`.
///
/// Covers OpenAI, Azure OpenAI deployments and OpenAI-compatible local
/// servers. Constructed once at startup and shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleProvider {
    client: Client,
    api_base_url: String,
    temperature: f32,
    api_key: Option<String>,
    api_key_header: Option<String>,
}

impl OpenAiCompatibleProvider {
    /// Build a provider from config values and an optional API key.
    ///
    /// The key is sent as `Authorization: Bearer <key>`, or under
    /// `api_key_header` when one is configured (Azure uses `api-key`).
    /// Only the connect phase has a timeout; streams may run indefinitely.
    pub fn new(
        api_base_url: String,
        temperature: f32,
        connect_timeout_seconds: u64,
        api_key: Option<String>,
        api_key_header: Option<String>,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_seconds))
            .build()
            .map_err(|e| ProviderError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, api_base_url, temperature, api_key, api_key_header })
    }

    async fn open(&self, model: &str, turns: Vec<ChatTurn>) -> Result<ChunkStream, CompletionError> {
        // Some models (gpt-5 family) do not accept a temperature parameter.
        let temperature = if model.starts_with("gpt-5") { None } else { Some(self.temperature) };

        let payload = ChatCompletionRequest {
            model: model.to_string(),
            messages: turns,
            temperature,
            stream: true,
        };

        debug!(
            model = %payload.model,
            temperature = ?payload.temperature,
            turns = payload.messages.len(),
            "opening completion stream"
        );
        if tracing::enabled!(tracing::Level::TRACE) {
            let json = serde_json::to_string_pretty(&payload)
                .unwrap_or_else(|e| format!("<serialization failed: {e}>"));
            trace!(payload = %json, "full completion request payload");
        }

        let mut req = self.client.post(&self.api_base_url).json(&payload);
        if let Some(key) = &self.api_key {
            req = match &self.api_key_header {
                Some(header) => req.header(header.as_str(), key.as_str()),
                None => req.bearer_auth(key),
            };
        }

        let mut es = req
            .eventsource()
            .map_err(|e| CompletionError::Other(format!("failed to create event source: {e}")))?;
        es.set_retry_policy(Box::new(Never));

        // The first event tells us whether the upstream accepted the request.
        let pending = match es.next().await {
            Some(Ok(Event::Open)) => {
                debug!("completion stream opened");
                None
            }
            Some(Ok(Event::Message(msg))) => Some(msg.data),
            Some(Err(reqwest_eventsource::Error::StreamEnded)) | None => {
                es.close();
                return Ok(Box::pin(stream::empty()));
            }
            Some(Err(err)) => {
                es.close();
                return Err(stream_error(err).await);
            }
        };

        Ok(Box::pin(chunk_stream(es, pending)))
    }
}

impl ChatCompletion for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn stream_chat<'a>(&'a self, model: &'a str, turns: Vec<ChatTurn>) -> CompletionFuture<'a> {
        Box::pin(self.open(model, turns))
    }
}

// ── Chunk stream ──────────────────────────────────────────────────────────────

struct ChunkState {
    es: EventSource,
    pending: Option<String>,
    done: bool,
}

/// Turn raw SSE events into completion chunks. Ends on `[DONE]`, on stream
/// end, or right after yielding the first error.
fn chunk_stream(
    es: EventSource,
    pending: Option<String>,
) -> impl Stream<Item = Result<CompletionChunk, CompletionError>> + Send + 'static {
    stream::unfold(ChunkState { es, pending, done: false }, |mut state| async move {
        if state.done {
            return None;
        }
        loop {
            let data = match state.pending.take() {
                Some(data) => data,
                None => match state.es.next().await {
                    Some(Ok(Event::Open)) => continue,
                    Some(Ok(Event::Message(msg))) => msg.data,
                    Some(Err(reqwest_eventsource::Error::StreamEnded)) | None => {
                        state.es.close();
                        return None;
                    }
                    Some(Err(err)) => {
                        warn!(?err, "completion stream error");
                        state.es.close();
                        state.done = true;
                        return Some((Err(stream_error(err).await), state));
                    }
                },
            };

            match parse_event_data(&data) {
                Parsed::Chunk(chunk) => return Some((Ok(chunk), state)),
                Parsed::Skip => continue,
                Parsed::Done => {
                    debug!("completion stream finished");
                    state.es.close();
                    return None;
                }
                Parsed::Failed(err) => {
                    state.es.close();
                    state.done = true;
                    return Some((Err(err), state));
                }
            }
        }
    })
}

#[derive(Debug, PartialEq)]
enum Parsed {
    Chunk(CompletionChunk),
    Skip,
    Done,
    Failed(CompletionError),
}

/// Interpret the `data:` payload of one SSE message.
fn parse_event_data(data: &str) -> Parsed {
    let data = data.trim();
    if data == DONE_SENTINEL {
        return Parsed::Done;
    }

    let wire = match serde_json::from_str::<WireChunk>(data) {
        Ok(wire) => wire,
        Err(e) => {
            warn!(error = %e, "ignoring unparseable completion event");
            return Parsed::Skip;
        }
    };

    if let Some(body) = wire.error {
        return Parsed::Failed(classify_error_body(None, body));
    }

    let mut choices = Vec::with_capacity(wire.choices.len());
    for choice in wire.choices {
        if choice.finish_reason.as_deref() == Some("content_filter") {
            let categories = choice
                .content_filter_results
                .map(categories_from)
                .unwrap_or_default();
            return Parsed::Failed(CompletionError::Filtered { categories });
        }
        choices.push(ChunkChoice {
            delta: ChunkDelta { content: choice.delta.and_then(|d| d.content) },
        });
    }

    Parsed::Chunk(CompletionChunk { choices })
}

// ── Error classification ──────────────────────────────────────────────────────

async fn stream_error(err: reqwest_eventsource::Error) -> CompletionError {
    match err {
        reqwest_eventsource::Error::InvalidStatusCode(status, response) => {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read error body>".to_string());
            let classified = error_from_body(status, &body);
            error!(%status, error = %classified, "completion request returned HTTP error");
            classified
        }
        reqwest_eventsource::Error::Transport(e) => {
            error!(error = %e, "completion request failed (transport)");
            CompletionError::Other(format!("Network error: {e}"))
        }
        other => CompletionError::Other(format!("Stream error: {other}")),
    }
}

/// Classify a non-2xx response body.
fn error_from_body(status: StatusCode, body: &str) -> CompletionError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) => classify_error_body(Some(status), env.error),
        Err(_) => CompletionError::Other(format!("HTTP {status}: {body}")),
    }
}

fn classify_error_body(status: Option<StatusCode>, body: ErrorBody) -> CompletionError {
    if let Some(results) = body.innererror.and_then(|inner| inner.content_filter_result) {
        return CompletionError::Filtered { categories: categories_from(results) };
    }

    let code = body
        .code
        .map(|v| match v {
            serde_json::Value::String(s) => format!(" [code={s}]"),
            other => format!(" [code={other}]"),
        })
        .unwrap_or_default();

    match status {
        Some(status) => CompletionError::Other(format!("HTTP {status}{code}: {}", body.message)),
        None => CompletionError::Other(format!("{}{code}", body.message)),
    }
}

/// Convert a `{category: {filtered, severity?}}` map. Non-object entries are
/// skipped.
fn categories_from(results: BTreeMap<String, serde_json::Value>) -> Vec<FilterCategory> {
    results
        .into_iter()
        .filter_map(|(name, verdict)| {
            let verdict = verdict.as_object()?;
            Some(FilterCategory {
                name,
                filtered: verdict.get("filtered").and_then(|v| v.as_bool()).unwrap_or(false),
                severity: verdict.get("severity").and_then(|v| v.as_str()).map(str::to_string),
            })
        })
        .collect()
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatTurn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct WireChunk {
    #[serde(default)]
    choices: Vec<WireChoice>,
    #[serde(default)]
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    #[serde(default)]
    delta: Option<WireDelta>,
    #[serde(default)]
    finish_reason: Option<String>,
    #[serde(default)]
    content_filter_results: Option<BTreeMap<String, serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct WireDelta {
    #[serde(default)]
    content: Option<String>,
}

// Error envelope used by OpenAI and compatible APIs.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default)]
    innererror: Option<InnerError>,
}

#[derive(Debug, Deserialize)]
struct InnerError {
    #[serde(default)]
    content_filter_result: Option<BTreeMap<String, serde_json::Value>>,
}
