//! Draw-without-replacement sampling and named spreads.
//!
//! [`DrawEngine`] holds the immutable canonical deck. Every draw shuffles a
//! private copy with the caller's random source, so concurrent draws never
//! share shuffle state and tests can pass a seeded generator.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;

use super::TarotError;
use super::deck::{DECK_SIZE, build_deck};
use super::meanings::meaning_of;

const THREE_POSITIONS: [&str; 3] = ["Past", "Present", "Future"];

const CROSS_POSITIONS: [&str; 10] = [
    "Significator",
    "Crossing/Challenge",
    "Above/Conscious",
    "Below/Subconscious",
    "Past",
    "Future",
    "Self/Attitude",
    "Environment",
    "Hopes & Fears",
    "Outcome",
];

// ── Types ─────────────────────────────────────────────────────────────────────

/// A card pulled from the deck together with its meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawnCard {
    pub card: String,
    pub meaning: String,
}

/// A drawn card placed at a labelled spread position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpreadCard {
    pub position: String,
    pub card: String,
    pub meaning: String,
}

/// Supported spread layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spread {
    /// Caller-sized draw, positions numbered from 1.
    Single,
    /// Past / Present / Future.
    Three,
    /// Celtic Cross, ten positions.
    Cross,
}

impl Spread {
    /// Accepted names, in the order error messages list them.
    pub const ALLOWED: [&'static str; 3] = ["single", "three", "cross"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Spread::Single => "single",
            Spread::Three => "three",
            Spread::Cross => "cross",
        }
    }

    /// Position labels for a draw of `count` cards.
    ///
    /// `count` only matters for [`Spread::Single`]; fixed layouts always
    /// return their own labels.
    pub fn positions(&self, count: usize) -> Vec<String> {
        match self {
            Spread::Single => (1..=count).map(|i| i.to_string()).collect(),
            Spread::Three => THREE_POSITIONS.iter().map(|p| p.to_string()).collect(),
            Spread::Cross => CROSS_POSITIONS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl FromStr for Spread {
    type Err = TarotError;

    /// Case-insensitive, no trimming. An empty name selects [`Spread::Single`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "single" => Ok(Spread::Single),
            "three" => Ok(Spread::Three),
            "cross" => Ok(Spread::Cross),
            _ => Err(TarotError::UnsupportedSpread(s.to_string())),
        }
    }
}

impl fmt::Display for Spread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Engine ────────────────────────────────────────────────────────────────────

/// Stateless sampler over the canonical deck. Cheap to share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct DrawEngine {
    deck: Vec<String>,
}

impl Default for DrawEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawEngine {
    pub fn new() -> Self {
        Self { deck: build_deck() }
    }

    /// The canonical deck in build order.
    pub fn deck(&self) -> &[String] {
        &self.deck
    }

    /// Draw `count` distinct cards.
    ///
    /// Fails with [`TarotError::InvalidArgument`] unless `1 <= count <= 78`.
    pub fn draw<R: Rng + ?Sized>(
        &self,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<DrawnCard>, TarotError> {
        if count < 1 {
            return Err(TarotError::InvalidArgument("count must be >= 1".into()));
        }
        if count > DECK_SIZE {
            return Err(TarotError::InvalidArgument(format!(
                "count must be <= {DECK_SIZE}"
            )));
        }

        let mut shuffled = self.deck.clone();
        shuffled.shuffle(rng);
        shuffled.truncate(count);

        Ok(shuffled
            .into_iter()
            .map(|card| {
                let meaning = meaning_of(&card);
                DrawnCard { card, meaning }
            })
            .collect())
    }

    /// Draw a named spread. `count` is only used by the single spread.
    pub fn draw_spread<R: Rng + ?Sized>(
        &self,
        spread: &str,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<SpreadCard>, TarotError> {
        let spread: Spread = spread.parse()?;
        self.draw_layout(spread, count, rng)
    }

    /// Draw an already-parsed spread.
    pub fn draw_layout<R: Rng + ?Sized>(
        &self,
        spread: Spread,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<SpreadCard>, TarotError> {
        let size = match spread {
            Spread::Single => count,
            Spread::Three => THREE_POSITIONS.len(),
            Spread::Cross => CROSS_POSITIONS.len(),
        };
        let cards = self.draw(size, rng)?;

        Ok(spread
            .positions(size)
            .into_iter()
            .zip(cards)
            .map(|(position, drawn)| SpreadCard {
                position,
                card: drawn.card,
                meaning: drawn.meaning,
            })
            .collect())
    }
}
