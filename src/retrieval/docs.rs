//! In-memory keyword retriever over a directory of text documents.
//!
//! Files ending in `.md` or `.txt` are read once at startup and split into
//! paragraphs. A query is scored against each paragraph by the number of
//! distinct query terms it contains; the best `top_k` paragraphs are joined
//! into the context, truncated to `max_chars` characters.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use super::{Retriever, SearchFuture};
use crate::error::AppError;
use crate::llm::ChatRequest;

#[derive(Debug, Clone)]
struct Passage {
    text: String,
    terms: HashSet<String>,
}

impl Passage {
    fn new(text: String) -> Self {
        let terms = tokenize(&text);
        Self { text, terms }
    }
}

#[derive(Debug, Clone)]
pub struct DocsRetriever {
    passages: Vec<Passage>,
    top_k: usize,
    max_chars: usize,
}

impl DocsRetriever {
    /// Load every `.md` / `.txt` file directly inside `dir`, in path order.
    pub fn load(dir: &Path, top_k: usize, max_chars: usize) -> Result<Self, AppError> {
        let entries = fs::read_dir(dir).map_err(|e| {
            AppError::Retrieval(format!("cannot read docs dir {}: {e}", dir.display()))
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_doc = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("md") || e.eq_ignore_ascii_case("txt"));
            if path.is_file() && is_doc {
                paths.push(path);
            }
        }
        paths.sort();

        let mut texts = Vec::new();
        for path in &paths {
            let raw = fs::read_to_string(path).map_err(|e| {
                AppError::Retrieval(format!("cannot read {}: {e}", path.display()))
            })?;
            texts.extend(split_paragraphs(&raw));
        }

        if texts.is_empty() {
            warn!(docs_dir = %dir.display(), "docs dir contains no passages");
        }
        Ok(Self::from_passages(texts, top_k, max_chars))
    }

    pub fn from_passages<I, S>(texts: I, top_k: usize, max_chars: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            passages: texts.into_iter().map(|t| Passage::new(t.into())).collect(),
            top_k,
            max_chars,
        }
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    /// Best-matching passages for `query`, joined by blank lines.
    pub fn lookup(&self, query: &str) -> Option<String> {
        let query_terms = tokenize(query);
        if query_terms.is_empty() {
            return None;
        }

        let mut scored: Vec<(usize, usize)> = self
            .passages
            .iter()
            .enumerate()
            .map(|(i, p)| (i, query_terms.intersection(&p.terms).count()))
            .filter(|(_, score)| *score > 0)
            .collect();
        // Stable sort keeps document order among equal scores.
        scored.sort_by(|a, b| b.1.cmp(&a.1));

        let joined = scored
            .iter()
            .take(self.top_k)
            .map(|(i, _)| self.passages[*i].text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        if joined.is_empty() {
            return None;
        }
        debug!(matches = scored.len(), "docs retrieval hit");
        Some(truncate_chars(&joined, self.max_chars))
    }
}

impl Retriever for DocsRetriever {
    fn search<'a>(&'a self, request: &'a ChatRequest) -> SearchFuture<'a> {
        Box::pin(async move { Ok(request.latest_user_turn().and_then(|q| self.lookup(q))) })
    }
}

fn split_paragraphs(raw: &str) -> Vec<String> {
    raw.replace("\r\n", "\n")
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn tokenize(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 2)
        .map(str::to_lowercase)
        .collect()
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
