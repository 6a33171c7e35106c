//! Tarot deck model and draw engine.
//!
//! - [`deck`]: canonical 78-card identifier sequence.
//! - [`meanings`]: identifier → meaning lookup, total over all inputs.
//! - [`engine`]: draw-without-replacement sampling and named spreads.

pub mod deck;
pub mod engine;
pub mod meanings;

use thiserror::Error;

pub use deck::build_deck;
pub use engine::{DrawEngine, DrawnCard, Spread, SpreadCard};
pub use meanings::meaning_of;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TarotError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Unsupported spread '{0}'. Use {allowed}.", allowed = allowed_spreads())]
    UnsupportedSpread(String),
}

/// `'single', 'three' or 'cross'`, built from [`Spread::ALLOWED`].
fn allowed_spreads() -> String {
    let quoted: Vec<String> = Spread::ALLOWED.iter().map(|n| format!("'{n}'")).collect();
    match quoted.split_last() {
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} or {last}", rest.join(", ")),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_spread_lists_allowed_names() {
        let err = TarotError::UnsupportedSpread("bogus".into());
        assert_eq!(
            err.to_string(),
            "Unsupported spread 'bogus'. Use 'single', 'three' or 'cross'."
        );
    }
}
