//! Dummy provider: streams the last user turn back prefixed with `[echo]`.
//! Used for running the full relay without an API key.

use futures_util::stream;

use crate::llm::{ChatCompletion, ChatTurn, ChunkStream, CompletionChunk, CompletionFuture};

#[derive(Debug, Clone)]
pub struct DummyProvider;

impl DummyProvider {
    /// Split the echo into word-sized deltas, keeping the separating spaces.
    fn deltas(turns: &[ChatTurn]) -> Vec<String> {
        let last = turns
            .iter()
            .rev()
            .find(|t| t.role == "user")
            .map(|t| t.content.as_str())
            .unwrap_or_default();

        let mut deltas = vec!["[echo]".to_string()];
        deltas.extend(last.split_whitespace().map(|word| format!(" {word}")));
        deltas
    }
}

impl ChatCompletion for DummyProvider {
    fn name(&self) -> &str {
        "dummy"
    }

    fn stream_chat<'a>(&'a self, _model: &'a str, turns: Vec<ChatTurn>) -> CompletionFuture<'a> {
        Box::pin(async move {
            let chunks = Self::deltas(&turns)
                .into_iter()
                .map(|d| Ok(CompletionChunk::text(d)));
            let stream: ChunkStream = Box::pin(stream::iter(chunks));
            Ok(stream)
        })
    }
}
