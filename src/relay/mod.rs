//! Completion relay: turns one chat request into a framed event stream.
//!
//! Per request, single pass, no retries:
//!
//! ```text
//! Start ──search──▶ build prompt ──stream_chat──▶ Streaming ──end──▶ completed_message ──▶ stream_end
//!   │                                               │
//!   └──────────── error ───────────────────────────┴──▶ completed_message(classified) ──▶ stream_end
//! ```
//!
//! The relay is a pull-driven [`Stream`]: nothing happens upstream until the
//! HTTP body asks for the next event. Dropping the stream (client
//! disconnect) drops the upstream [`ChunkStream`] with it, so the provider
//! connection is released on every exit path.

pub mod events;
pub mod prompt;

use std::pin::Pin;
use std::sync::Arc;

use futures_util::{Stream, StreamExt, stream};
use tracing::{Instrument, Span, debug, error, info, info_span};
use uuid::Uuid;

use crate::llm::{ChatCompletion, ChatRequest, ChunkStream, CompletionError};
use crate::retrieval::Retriever;

pub use events::StreamEvent;

/// Prefix of the `completed_message` sent when the provider's safety filter
/// rejects a request.
pub const FILTERED_PREFIX: &str = "We have found the following safety issues in the response: ";

/// Category list used when the filter names no flagged category.
const UNSPECIFIED_FILTER: &str = "content filtered";

/// Boxed event stream handed to the HTTP layer.
pub type RelayStream = Pin<Box<dyn Stream<Item = StreamEvent> + Send + 'static>>;

/// Human-readable text for a terminal upstream failure.
pub fn describe_failure(err: &CompletionError) -> String {
    match err {
        CompletionError::Filtered { categories } => {
            let flagged = categories
                .iter()
                .filter(|c| c.filtered)
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            if flagged.is_empty() {
                format!("{FILTERED_PREFIX}{UNSPECIFIED_FILTER}")
            } else {
                format!("{FILTERED_PREFIX}{flagged}")
            }
        }
        CompletionError::Other(message) => message.clone(),
    }
}

// ── Relay ─────────────────────────────────────────────────────────────────────

/// Shared relay capabilities. Cheap to clone; all fields are
/// reference-counted.
#[derive(Clone)]
pub struct CompletionRelay {
    client: Arc<dyn ChatCompletion>,
    retriever: Option<Arc<dyn Retriever>>,
    model: Arc<str>,
}

impl CompletionRelay {
    pub fn new(
        client: Arc<dyn ChatCompletion>,
        retriever: Option<Arc<dyn Retriever>>,
        model: impl Into<Arc<str>>,
    ) -> Self {
        Self { client, retriever, model: model.into() }
    }

    /// Event stream for one request.
    ///
    /// Always yields exactly one `completed_message` followed by one
    /// `stream_end`, preceded by zero or more `message` deltas.
    pub fn relay(&self, request: ChatRequest) -> RelayStream {
        let span = info_span!(
            "chat",
            request_id = %Uuid::new_v4(),
            provider = self.client.name(),
            turns = request.messages.len(),
        );
        let state = RelayState {
            relay: self.clone(),
            phase: Phase::Start(request),
            span,
        };
        stream::unfold(state, |state| {
            let span = state.span.clone();
            step(state).instrument(span)
        })
        .boxed()
    }

    /// Context lookup, prompt assembly and stream open.
    async fn open(&self, request: ChatRequest) -> Result<ChunkStream, CompletionError> {
        let context = match &self.retriever {
            Some(retriever) => {
                let found = retriever
                    .search(&request)
                    .await
                    .map_err(|e| CompletionError::Other(e.to_string()))?
                    .filter(|c| !c.trim().is_empty());
                match &found {
                    Some(ctx) => debug!(context_chars = ctx.len(), "grounding context found"),
                    None => info!("unable to find relevant information in the index for the request"),
                }
                found
            }
            None => None,
        };

        let turns = prompt::build_prompt(context.as_deref(), request.messages);
        debug!(model = %self.model, turns = turns.len(), "opening completion stream");
        self.client.stream_chat(&self.model, turns).await
    }
}

// ── State machine ─────────────────────────────────────────────────────────────

enum Phase {
    Start(ChatRequest),
    Streaming { upstream: ChunkStream, accumulated: String },
    Finish,
    Done,
}

struct RelayState {
    relay: CompletionRelay,
    phase: Phase,
    span: Span,
}

impl RelayState {
    /// Terminal failure: classified text, then `stream_end`.
    fn fail(mut self, err: CompletionError) -> (StreamEvent, Self) {
        let text = describe_failure(&err);
        error!(error = %text, "completion failed");
        self.phase = Phase::Finish;
        (StreamEvent::completed(text), self)
    }
}

async fn step(mut state: RelayState) -> Option<(StreamEvent, RelayState)> {
    loop {
        match std::mem::replace(&mut state.phase, Phase::Done) {
            Phase::Start(request) => match state.relay.open(request).await {
                Ok(upstream) => {
                    state.phase = Phase::Streaming { upstream, accumulated: String::new() };
                }
                Err(err) => return Some(state.fail(err)),
            },
            Phase::Streaming { mut upstream, mut accumulated } => match upstream.next().await {
                Some(Ok(chunk)) => {
                    if let Some(delta) = chunk.first_delta() {
                        accumulated.push_str(delta);
                        let event = StreamEvent::message(delta);
                        state.phase = Phase::Streaming { upstream, accumulated };
                        return Some((event, state));
                    }
                    state.phase = Phase::Streaming { upstream, accumulated };
                }
                Some(Err(err)) => {
                    drop(upstream);
                    return Some(state.fail(err));
                }
                None => {
                    info!(chars = accumulated.len(), "completion finished");
                    state.phase = Phase::Finish;
                    return Some((StreamEvent::completed(accumulated), state));
                }
            },
            Phase::Finish => return Some((StreamEvent::StreamEnd, state)),
            Phase::Done => return None,
        }
    }
}
