//! A shuffled 52-card deck with a positional read cursor.

use crate::cards::Card;
use crate::error::GameError;
use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::RngCore;

/// The number of cards ever dealt in a legal hand never exceeds this: up to
/// six players' hole cards (12), three burns (3), and the flop/turn/river
/// (3 + 1 + 1). `DeckExhausted` is therefore a programmer error, never a
/// reachable outcome of legal play.
pub const MAX_CARDS_PER_HAND: usize = 6 * 2 + 3 + 3 + 1 + 1;

/// A freshly shuffled 52-card sequence with a read cursor. Cards already
/// dealt (`cursor` cards from the front) never reappear.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
    cursor: usize,
}

impl Deck {
    /// Build a deck shuffled from a cryptographically strong source. This is
    /// the constructor production code should use — it draws from the OS
    /// CSPRNG rather than a seedable, reproducible generator, so no operator
    /// or observer can predict or replay a shuffle.
    pub fn new() -> Self {
        Self::shuffled_with(&mut OsRng)
    }

    /// Build a deck shuffled by a caller-supplied RNG. Production code should
    /// prefer [`Deck::new`]; this exists so tests can inject a seeded
    /// `rand::rngs::StdRng` and assert determinism.
    pub fn shuffled_with<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        let mut cards = Card::universe();
        // `SliceRandom::shuffle` performs an unbiased Fisher-Yates shuffle:
        // each swap index is drawn via `Uniform`, which rejection-samples to
        // avoid modulo bias rather than reducing a wide draw mod range.len().
        cards.shuffle(rng);
        Deck { cards, cursor: 0 }
    }

    /// Cards remaining to be dealt.
    pub fn remaining(&self) -> usize {
        self.cards.len() - self.cursor
    }

    /// Deal the next card and advance the cursor.
    pub fn deal(&mut self) -> Result<Card, GameError> {
        let card = *self.cards.get(self.cursor).ok_or(GameError::DeckExhausted)?;
        self.cursor += 1;
        Ok(card)
    }

    /// Deal the next `k` cards as an ordered sequence. Equivalent to `k`
    /// sequential calls to [`Deck::deal`].
    pub fn deal_n(&mut self, k: usize) -> Result<Vec<Card>, GameError> {
        if k > self.remaining() {
            return Err(GameError::DeckExhausted);
        }
        let mut out = Vec::with_capacity(k);
        for _ in 0..k {
            out.push(self.deal()?);
        }
        Ok(out)
    }

    /// Advance the cursor by one card without returning it.
    pub fn burn(&mut self) -> Result<(), GameError> {
        self.deal().map(|_| ())
    }

    /// Build a deck that deals exactly the given cards in order, with no
    /// shuffle. Does not enforce that `cards` is the 52-card universe — a
    /// test driving a specific scenario only needs as many cards as that
    /// hand will actually deal.
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Deck { cards, cursor: 0 }
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}
