//! The seven-card hand evaluator: ranks five-card hands with correct
//! tiebreaks, including the wheel, over any five-to-seven card input.

use crate::cards::{Card, Rank};
use crate::error::GameError;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// The ten hand categories, ordered weakest to strongest. The discriminants
/// double as the 0..9 category rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum HandCategory {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
    RoyalFlush = 9,
}

/// A fully evaluated hand: its category, a tiebreak vector (descending
/// importance, raw rank values 2..14), and the exact five cards chosen.
/// Ordering is category first, then lexicographic tiebreak comparison — the
/// `cards` field never participates in comparison, since two hands with the
/// same category and tiebreaks are a tie regardless of suit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatedHand {
    pub category: HandCategory,
    pub tiebreakers: Vec<u8>,
    pub cards: [Card; 5],
}

impl PartialOrd for EvaluatedHand {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EvaluatedHand {
    fn cmp(&self, other: &Self) -> Ordering {
        self.category
            .cmp(&other.category)
            .then_with(|| self.tiebreakers.cmp(&other.tiebreakers))
    }
}

/// Evaluate the best five-card hand out of `cards` (which must have at least
/// five elements; normal play supplies up to seven). Enumerates all
/// `C(n, 5)` five-card subsets and keeps the maximum under [`compare`].
pub fn evaluate_best(cards: &[Card]) -> Result<EvaluatedHand, GameError> {
    if cards.len() < 5 {
        return Err(GameError::InsufficientCards);
    }

    let mut best: Option<EvaluatedHand> = None;
    for combo in cards.iter().combinations(5) {
        let five: [Card; 5] = [*combo[0], *combo[1], *combo[2], *combo[3], *combo[4]];
        let candidate = evaluate_five(five);
        if best.as_ref().map_or(true, |b| candidate > *b) {
            best = Some(candidate);
        }
    }
    Ok(best.expect("at least one 5-card combination exists when len >= 5"))
}

/// Total order on two already-evaluated hands.
pub fn compare(a: &EvaluatedHand, b: &EvaluatedHand) -> Ordering {
    a.cmp(b)
}

/// Classify exactly five cards.
fn evaluate_five(cards: [Card; 5]) -> EvaluatedHand {
    let mut rank_counts: HashMap<u8, u8> = HashMap::new();
    for card in &cards {
        *rank_counts.entry(card.rank.value()).or_insert(0) += 1;
    }

    let is_flush = cards.iter().all(|c| c.suit == cards[0].suit);
    let straight_high = straight_high_value(&cards);

    let mut values: Vec<u8> = cards.iter().map(|c| c.rank.value()).collect();
    values.sort_unstable_by(|a, b| b.cmp(a));

    if is_flush {
        if let Some(high) = straight_high {
            let category = if high == 14 && is_broadway(&cards) {
                HandCategory::RoyalFlush
            } else {
                HandCategory::StraightFlush
            };
            return EvaluatedHand {
                category,
                tiebreakers: vec![high],
                cards,
            };
        }
    }

    if let Some(quad_rank) = rank_of_count(&rank_counts, 4) {
        let kicker = values.iter().copied().find(|&v| v != quad_rank).unwrap();
        return EvaluatedHand {
            category: HandCategory::FourOfAKind,
            tiebreakers: vec![quad_rank, kicker],
            cards,
        };
    }

    if let Some(trips_rank) = rank_of_count(&rank_counts, 3) {
        if let Some(pair_rank) = rank_counts
            .iter()
            .filter(|(&r, &c)| r != trips_rank && c >= 2)
            .map(|(&r, _)| r)
            .max()
        {
            return EvaluatedHand {
                category: HandCategory::FullHouse,
                tiebreakers: vec![trips_rank, pair_rank],
                cards,
            };
        }
    }

    if is_flush {
        return EvaluatedHand {
            category: HandCategory::Flush,
            tiebreakers: values,
            cards,
        };
    }

    if let Some(high) = straight_high {
        return EvaluatedHand {
            category: HandCategory::Straight,
            tiebreakers: vec![high],
            cards,
        };
    }

    if let Some(trips_rank) = rank_of_count(&rank_counts, 3) {
        let kickers = descending_ranks_excluding(&values, &[trips_rank]);
        return EvaluatedHand {
            category: HandCategory::ThreeOfAKind,
            tiebreakers: std::iter::once(trips_rank).chain(kickers).collect(),
            cards,
        };
    }

    let mut pairs: Vec<u8> = rank_counts
        .iter()
        .filter(|(_, &c)| c == 2)
        .map(|(&r, _)| r)
        .collect();
    pairs.sort_unstable_by(|a, b| b.cmp(a));

    if pairs.len() == 2 {
        let kicker = descending_ranks_excluding(&values, &pairs)[0];
        return EvaluatedHand {
            category: HandCategory::TwoPair,
            tiebreakers: vec![pairs[0], pairs[1], kicker],
            cards,
        };
    }

    if pairs.len() == 1 {
        let kickers = descending_ranks_excluding(&values, &pairs);
        return EvaluatedHand {
            category: HandCategory::OnePair,
            tiebreakers: std::iter::once(pairs[0]).chain(kickers).collect(),
            cards,
        };
    }

    EvaluatedHand {
        category: HandCategory::HighCard,
        tiebreakers: values,
        cards,
    }
}

fn rank_of_count(counts: &HashMap<u8, u8>, n: u8) -> Option<u8> {
    counts.iter().find(|&(_, &c)| c == n).map(|(&r, _)| r)
}

fn descending_ranks_excluding(sorted_desc: &[u8], excluded: &[u8]) -> Vec<u8> {
    sorted_desc
        .iter()
        .copied()
        .filter(|v| !excluded.contains(v))
        .collect()
}

/// True iff the five cards are exactly the Broadway run (10-J-Q-K-A), the
/// only standard straight whose high card is an ace. A flush over this run
/// is a royal flush; any other ace-high straight flush is the wheel, which
/// can't coexist with a flush over a five-card hand since the wheel's
/// values are fixed ([14, 5, 4, 3, 2]) and distinct from Broadway's.
fn is_broadway(cards: &[Card; 5]) -> bool {
    let mut values: Vec<u8> = cards.iter().map(|c| c.rank.value()).collect();
    values.sort_unstable();
    values == [10, 11, 12, 13, 14]
}

/// Returns the straight's high card value if the five cards form a standard
/// consecutive run or the wheel (A-2-3-4-5, ranked 5-high).
fn straight_high_value(cards: &[Card; 5]) -> Option<u8> {
    let mut values: Vec<u8> = cards.iter().map(|c| c.rank.value()).collect();
    values.sort_unstable();
    values.dedup();
    if values.len() != 5 {
        return None;
    }

    if values == [2, 3, 4, 5, 14] {
        return Some(5);
    }

    let is_consecutive = values.windows(2).all(|w| w[1] == w[0] + 1);
    if is_consecutive {
        return Some(values[4]);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Suit;

    fn c(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    #[test]
    fn royal_flush_beats_straight_flush() {
        let royal = evaluate_five([
            c(Rank::Ace, Suit::Spades),
            c(Rank::King, Suit::Spades),
            c(Rank::Queen, Suit::Spades),
            c(Rank::Jack, Suit::Spades),
            c(Rank::Ten, Suit::Spades),
        ]);
        assert_eq!(royal.category, HandCategory::RoyalFlush);

        let king_high_sf = evaluate_five([
            c(Rank::King, Suit::Hearts),
            c(Rank::Queen, Suit::Hearts),
            c(Rank::Jack, Suit::Hearts),
            c(Rank::Ten, Suit::Hearts),
            c(Rank::Nine, Suit::Hearts),
        ]);
        assert_eq!(king_high_sf.category, HandCategory::StraightFlush);
        assert!(royal > king_high_sf);
    }

    #[test]
    fn wheel_straight_flush_is_not_royal() {
        let wheel_sf = evaluate_five([
            c(Rank::Ace, Suit::Clubs),
            c(Rank::Two, Suit::Clubs),
            c(Rank::Three, Suit::Clubs),
            c(Rank::Four, Suit::Clubs),
            c(Rank::Five, Suit::Clubs),
        ]);
        assert_eq!(wheel_sf.category, HandCategory::StraightFlush);
        assert_eq!(wheel_sf.tiebreakers, vec![5]);
    }

    #[test]
    fn wheel_straight_ranks_five_high() {
        let wheel = evaluate_five([
            c(Rank::Ace, Suit::Spades),
            c(Rank::Two, Suit::Hearts),
            c(Rank::Three, Suit::Clubs),
            c(Rank::Four, Suit::Diamonds),
            c(Rank::Five, Suit::Spades),
        ]);
        assert_eq!(wheel.category, HandCategory::Straight);
        assert_eq!(wheel.tiebreakers, vec![5]);
    }

    #[test]
    fn wheel_loses_to_a_pair_of_kings() {
        // Scenario S3: hero A-2 on a 3-4-5-9-J board vs villain K-K.
        let hero_hole = [c(Rank::Ace, Suit::Spades), c(Rank::Two, Suit::Spades)];
        let villain_hole = [c(Rank::King, Suit::Spades), c(Rank::King, Suit::Diamonds)];
        let board = [
            c(Rank::Three, Suit::Diamonds),
            c(Rank::Four, Suit::Hearts),
            c(Rank::Five, Suit::Clubs),
            c(Rank::Nine, Suit::Clubs),
            c(Rank::Jack, Suit::Hearts),
        ];

        let mut hero_cards = hero_hole.to_vec();
        hero_cards.extend_from_slice(&board);
        let mut villain_cards = villain_hole.to_vec();
        villain_cards.extend_from_slice(&board);

        let hero = evaluate_best(&hero_cards).unwrap();
        let villain = evaluate_best(&villain_cards).unwrap();
        assert_eq!(hero.category, HandCategory::Straight);
        assert_eq!(villain.category, HandCategory::OnePair);
        assert!(compare(&hero, &villain) == Ordering::Greater);
    }

    #[test]
    fn four_of_a_kind_tiebreaks_on_kicker() {
        let hand = evaluate_five([
            c(Rank::Ace, Suit::Hearts),
            c(Rank::Ace, Suit::Diamonds),
            c(Rank::Ace, Suit::Clubs),
            c(Rank::Ace, Suit::Spades),
            c(Rank::King, Suit::Hearts),
        ]);
        assert_eq!(hand.category, HandCategory::FourOfAKind);
        assert_eq!(hand.tiebreakers, vec![14, 13]);
    }

    #[test]
    fn full_house_tiebreaks_trips_then_pair() {
        let hand = evaluate_five([
            c(Rank::King, Suit::Hearts),
            c(Rank::King, Suit::Diamonds),
            c(Rank::King, Suit::Clubs),
            c(Rank::Queen, Suit::Spades),
            c(Rank::Queen, Suit::Hearts),
        ]);
        assert_eq!(hand.category, HandCategory::FullHouse);
        assert_eq!(hand.tiebreakers, vec![13, 12]);
    }

    #[test]
    fn insufficient_cards_is_an_error() {
        let cards = vec![
            c(Rank::Ace, Suit::Hearts),
            c(Rank::King, Suit::Hearts),
            c(Rank::Queen, Suit::Hearts),
        ];
        assert_eq!(evaluate_best(&cards), Err(GameError::InsufficientCards));
    }

    #[test]
    fn evaluate_best_picks_the_best_of_seven() {
        // Board makes a flush; hole cards are irrelevant low cards.
        let mut cards = vec![c(Rank::Two, Suit::Clubs), c(Rank::Three, Suit::Diamonds)];
        cards.extend_from_slice(&[
            c(Rank::Four, Suit::Hearts),
            c(Rank::Six, Suit::Hearts),
            c(Rank::Eight, Suit::Hearts),
            c(Rank::Ten, Suit::Hearts),
            c(Rank::Queen, Suit::Hearts),
        ]);
        let best = evaluate_best(&cards).unwrap();
        assert_eq!(best.category, HandCategory::Flush);
        assert_eq!(best.tiebreakers, vec![12, 10, 8, 6, 4]);
    }

    #[test]
    fn compare_is_antisymmetric_and_transitive_over_a_small_sample() {
        let a = evaluate_five([
            c(Rank::Ace, Suit::Hearts),
            c(Rank::Ace, Suit::Diamonds),
            c(Rank::King, Suit::Clubs),
            c(Rank::Queen, Suit::Spades),
            c(Rank::Jack, Suit::Hearts),
        ]);
        let b = evaluate_five([
            c(Rank::King, Suit::Hearts),
            c(Rank::King, Suit::Diamonds),
            c(Rank::Queen, Suit::Clubs),
            c(Rank::Jack, Suit::Spades),
            c(Rank::Ten, Suit::Hearts),
        ]);
        let c_hand = evaluate_five([
            c(Rank::Two, Suit::Hearts),
            c(Rank::Four, Suit::Diamonds),
            c(Rank::Six, Suit::Clubs),
            c(Rank::Eight, Suit::Spades),
            c(Rank::Ten, Suit::Diamonds),
        ]);
        assert_eq!(compare(&a, &b), Ordering::Greater);
        assert_eq!(compare(&b, &a), Ordering::Less);
        assert_eq!(compare(&a, &c_hand), Ordering::Greater);
        assert_eq!(compare(&b, &c_hand), Ordering::Greater);
    }
}
