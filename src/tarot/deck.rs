//! Canonical 78-card deck: 22 major arcana followed by the four minor suits.

pub const MAJOR_ARCANA: [&str; 22] = [
    "The Fool",
    "The Magician",
    "The High Priestess",
    "The Empress",
    "The Emperor",
    "The Hierophant",
    "The Lovers",
    "The Chariot",
    "Strength",
    "The Hermit",
    "Wheel of Fortune",
    "Justice",
    "The Hanged Man",
    "Death",
    "Temperance",
    "The Devil",
    "The Tower",
    "The Star",
    "The Moon",
    "The Sun",
    "Judgement",
    "The World",
];

pub const RANKS: [&str; 14] = [
    "Ace", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Page",
    "Knight", "Queen", "King",
];

pub const SUITS: [&str; 4] = ["Wands", "Cups", "Swords", "Pentacles"];

/// Number of cards in a full deck.
pub const DECK_SIZE: usize = MAJOR_ARCANA.len() + RANKS.len() * SUITS.len();

/// Build the full deck of card identifiers in canonical order.
///
/// Pure and deterministic: every call yields the same sequence.
pub fn build_deck() -> Vec<String> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    deck.extend(MAJOR_ARCANA.iter().map(|name| name.to_string()));
    for suit in SUITS {
        for rank in RANKS {
            deck.push(format!("{rank} of {suit}"));
        }
    }
    deck
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn deck_has_78_unique_cards() {
        let deck = build_deck();
        assert_eq!(deck.len(), 78);
        assert_eq!(DECK_SIZE, 78);
        let unique: HashSet<&String> = deck.iter().collect();
        assert_eq!(unique.len(), 78);
    }

    #[test]
    fn deck_is_deterministic() {
        assert_eq!(build_deck(), build_deck());
    }

    #[test]
    fn major_arcana_come_first_then_suits_in_order() {
        let deck = build_deck();
        assert_eq!(deck[0], "The Fool");
        assert_eq!(deck[21], "The World");
        assert_eq!(deck[22], "Ace of Wands");
        assert_eq!(deck[35], "King of Wands");
        assert_eq!(deck[36], "Ace of Cups");
        assert_eq!(deck[50], "Ace of Swords");
        assert_eq!(deck[77], "King of Pentacles");
    }
}
