//! Grounding-context retrieval.
//!
//! A [`Retriever`] looks at the chat request and returns context text to
//! embed in the instruction turn, or `None` when nothing relevant exists.
//! `None` is a normal outcome; only a raised [`RetrievalError`] is a failure.

pub mod docs;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::config::RetrievalConfig;
use crate::error::AppError;
use crate::llm::ChatRequest;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetrievalError {
    #[error("retrieval failed: {0}")]
    Search(String),
}

/// Future returned by [`Retriever::search`].
pub type SearchFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Option<String>, RetrievalError>> + Send + 'a>>;

pub trait Retriever: Send + Sync + 'static {
    fn search<'a>(&'a self, request: &'a ChatRequest) -> SearchFuture<'a>;
}

/// Build the configured retriever, or `None` when no docs dir is set.
pub fn build(config: &RetrievalConfig) -> Result<Option<Arc<dyn Retriever>>, AppError> {
    match &config.docs_dir {
        Some(dir) => {
            let retriever = docs::DocsRetriever::load(dir, config.top_k, config.max_chars)?;
            info!(
                docs_dir = %dir.display(),
                passages = retriever.len(),
                "docs retrieval enabled"
            );
            Ok(Some(Arc::new(retriever)))
        }
        None => {
            info!("retrieval disabled: no docs_dir configured");
            Ok(None)
        }
    }
}
