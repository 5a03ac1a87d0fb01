//! Deck construction: the 52-card sequence that drives one session.

use std::ops::Index;
use std::sync::Arc;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::model::{Card, CardId, Rank, Suit};

/// Number of cards in a full deck.
pub const DECK_SIZE: usize = Suit::ALL.len() * Rank::ALL.len();

/// Ordered, immutable card sequence for one session.
///
/// Cloning is cheap; all clones share the same cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    cards: Arc<[Card]>,
}

impl Deck {
    /// Builds a freshly shuffled deck using the thread-local RNG.
    #[must_use]
    pub fn shuffled() -> Self {
        Self::shuffled_with(&mut rand::rng())
    }

    /// Builds a shuffled deck from the given random source.
    #[must_use]
    pub fn shuffled_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut cards = canonical_cards();
        // `SliceRandom::shuffle` is a Fisher-Yates pass.
        cards.as_mut_slice().shuffle(rng);
        Self::from_cards(cards)
    }

    /// Deck in generation order, without shuffling.
    #[must_use]
    pub fn canonical() -> Self {
        Self::from_cards(canonical_cards())
    }

    /// Wraps an explicit card sequence. Used for replays and short test decks.
    #[must_use]
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self {
            cards: cards.into(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Card> {
        self.cards.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Card] {
        &self.cards
    }
}

impl Index<usize> for Deck {
    type Output = Card;

    fn index(&self, index: usize) -> &Card {
        &self.cards[index]
    }
}

impl<'a> IntoIterator for &'a Deck {
    type Item = &'a Card;
    type IntoIter = std::slice::Iter<'a, Card>;

    fn into_iter(self) -> Self::IntoIter {
        self.cards.iter()
    }
}

/// Builds a shuffled 52-card deck.
#[must_use]
pub fn build_deck() -> Deck {
    Deck::shuffled()
}

fn canonical_cards() -> Vec<Card> {
    let mut cards = Vec::with_capacity(DECK_SIZE);
    let mut next_id = 0_u32;
    for suit in Suit::ALL {
        for rank in Rank::ALL {
            cards.push(Card::new(CardId::new(next_id), suit, rank));
            next_id += 1;
        }
    }
    cards
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Exercise;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn is_generation_order(deck: &Deck) -> bool {
        deck.as_slice()
            .windows(2)
            .all(|w| w[0].id().value() < w[1].id().value())
    }

    #[test]
    fn deck_has_52_unique_cards() {
        let deck = build_deck();
        assert_eq!(deck.len(), 52);
        let ids: HashSet<_> = deck.iter().map(Card::id).collect();
        assert_eq!(ids.len(), 52);
        let pairs: HashSet<_> = deck.iter().map(|c| (c.suit(), c.rank())).collect();
        assert_eq!(pairs.len(), 52);
    }

    #[test]
    fn mapping_holds_regardless_of_order() {
        let deck = Deck::shuffled_with(&mut StdRng::seed_from_u64(7));
        for card in &deck {
            assert_eq!(card.exercise(), card.suit().exercise());
            assert_eq!(card.value(), card.rank().value());
        }
        let ace = deck.iter().find(|c| c.rank() == Rank::Ace).unwrap();
        assert_eq!(ace.value(), 15);
        let two = deck.iter().find(|c| c.rank() == Rank::Two).unwrap();
        assert_eq!(two.value(), 2);
        let hearts = deck.iter().find(|c| c.suit() == Suit::Hearts).unwrap();
        assert_eq!(hearts.exercise(), Exercise::PushUps);
    }

    #[test]
    fn canonical_ids_follow_suit_then_rank() {
        let deck = Deck::canonical();
        assert!(is_generation_order(&deck));
        assert_eq!(deck[0].id(), CardId::new(0));
        assert_eq!(deck[0].suit(), Suit::Hearts);
        assert_eq!(deck[0].rank(), Rank::Two);
        assert_eq!(deck[12].rank(), Rank::Ace);
        assert_eq!(deck[13].suit(), Suit::Diamonds);
        assert_eq!(deck[51].suit(), Suit::Clubs);
        assert_eq!(deck[51].rank(), Rank::Ace);
    }

    #[test]
    fn shuffled_deck_is_not_in_generation_order() {
        // A sorted outcome has probability 1/52! per draw.
        for _ in 0..5 {
            assert!(!is_generation_order(&build_deck()));
        }
    }

    #[test]
    fn seeded_shuffles_are_reproducible() {
        let a = Deck::shuffled_with(&mut StdRng::seed_from_u64(42));
        let b = Deck::shuffled_with(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn every_card_reaches_every_position() {
        // Rough uniformity check: over many shuffles, card-0 should land in
        // the first and last slot at a rate near 1/52.
        let mut rng = StdRng::seed_from_u64(2024);
        let runs = 20_000;
        let mut first = 0;
        let mut last = 0;
        for _ in 0..runs {
            let deck = Deck::shuffled_with(&mut rng);
            if deck[0].id() == CardId::new(0) {
                first += 1;
            }
            if deck[51].id() == CardId::new(0) {
                last += 1;
            }
        }
        let expected = f64::from(runs) / 52.0;
        for hits in [first, last] {
            let ratio = f64::from(hits) / expected;
            assert!((0.75..1.25).contains(&ratio), "ratio {ratio}");
        }
    }
}
