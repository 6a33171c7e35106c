//! Arcana relay: a streaming chat-completion relay with optional grounding
//! context, plus a tarot draw engine, served over axum.
//!
//! - [`tarot`]: deck model, meanings and the draw engine.
//! - [`llm`]: completion provider seam and providers.
//! - [`retrieval`]: grounding-context lookup.
//! - [`relay`]: per-request event stream.
//! - [`server`]: HTTP routes, basic auth, pages.

pub mod config;
pub mod error;
pub mod llm;
pub mod logger;
pub mod relay;
pub mod retrieval;
pub mod server;
pub mod tarot;
