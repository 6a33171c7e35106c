//! Chat-completion provider abstraction.
//!
//! [`ChatCompletion`] is the seam between the relay and a concrete backend.
//! A provider takes a model identifier plus the ordered turn list and hands
//! back a [`ChunkStream`] of incremental deltas. Failures are typed:
//! content-safety rejections arrive as [`CompletionError::Filtered`] so the
//! relay never has to sniff error payloads.
//!
//! Providers are shared immutable capabilities held behind an `Arc`.

pub mod providers;

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use futures_util::Stream;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Turns ─────────────────────────────────────────────────────────────────────

/// One conversation turn as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

impl ChatTurn {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self { role: role.into(), content: content.into() }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }
}

/// Body of `POST /chat`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatTurn>,
}

impl ChatRequest {
    /// Content of the most recent user turn, if any.
    pub fn latest_user_turn(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|t| t.role == "user")
            .map(|t| t.content.as_str())
    }
}

// ── Chunks ────────────────────────────────────────────────────────────────────

/// One incremental unit from the upstream stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: ChunkDelta,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}

impl CompletionChunk {
    /// Chunk with a single choice carrying `text`.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            choices: vec![ChunkChoice { delta: ChunkDelta { content: Some(text.into()) } }],
        }
    }

    /// Non-empty content delta of the first choice.
    pub fn first_delta(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.delta.content.as_deref())
            .filter(|s| !s.is_empty())
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Verdict for one content-safety category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCategory {
    pub name: String,
    pub filtered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
}

impl FilterCategory {
    pub fn flagged(name: impl Into<String>, severity: Option<&str>) -> Self {
        Self {
            name: name.into(),
            filtered: true,
            severity: severity.map(str::to_string),
        }
    }
}

impl fmt::Display for FilterCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.severity {
            Some(sev) => write!(f, "{}, severity: {sev}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Failure raised while opening or consuming a completion stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    /// The provider's content-safety filter rejected the prompt or response.
    #[error("content filtered: {}", flagged_names(.categories))]
    Filtered { categories: Vec<FilterCategory> },

    /// Any other upstream failure, carried as display text.
    #[error("{0}")]
    Other(String),
}

fn flagged_names(categories: &[FilterCategory]) -> String {
    categories
        .iter()
        .filter(|c| c.filtered)
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Provider construction failure.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("provider request failed: {0}")]
    Request(String),
}

// ── Provider seam ─────────────────────────────────────────────────────────────

/// Incremental chunks; end-of-stream is normal completion.
pub type ChunkStream =
    Pin<Box<dyn Stream<Item = Result<CompletionChunk, CompletionError>> + Send + 'static>>;

/// Future returned by [`ChatCompletion::stream_chat`].
pub type CompletionFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ChunkStream, CompletionError>> + Send + 'a>>;

/// A backend that can stream a chat completion.
pub trait ChatCompletion: Send + Sync + 'static {
    /// Stable provider name used in log fields.
    fn name(&self) -> &str;

    /// Open a streaming completion over `turns` (in order) with `model`.
    ///
    /// Resolves once the upstream has accepted the request. Dropping the
    /// returned stream releases the upstream connection.
    fn stream_chat<'a>(&'a self, model: &'a str, turns: Vec<ChatTurn>) -> CompletionFuture<'a>;
}
