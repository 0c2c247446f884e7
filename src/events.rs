//! The event stream emitted by the engine. One variant per event the
//! engine reports; the operator's sink pattern-matches on [`Event`] the
//! way it would on any other tagged union at a module boundary.

use crate::cards::Card;
use crate::evaluator::EvaluatedHand;
use crate::player::{ActionKind, PublicPlayerView};
use crate::pots::SidePot;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One legal action available to the player on action, with the amount
/// bounds the state machine computed for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidAction {
    Fold,
    Check,
    Call { amount: u64 },
    Raise { min: u64, max: u64 },
}

/// One player's result at showdown (or the degenerate single-winner case).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowdownEntry {
    pub player_id: String,
    /// Empty for players who didn't show (folded, or the sole remaining
    /// player in the fast-path award).
    pub cards: Vec<Card>,
    pub hand: Option<EvaluatedHand>,
    pub win_amount: u64,
}

/// The tagged event stream. Carries owned values throughout, never
/// references into engine state, so consumers may retain events safely
///.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    HandStart {
        dealer_seat: u8,
        hand_number: u64,
        roster: Vec<PublicPlayerView>,
    },
    /// Delivered to every dealt-in player; it is the operator's
    /// responsibility (not the engine's) to route this only to the named
    /// player.
    HoleCards {
        player_id: String,
        cards: [Card; 2],
    },
    Community {
        cards: Vec<Card>,
        round: crate::state::Round,
    },
    ActionOn {
        player_id: String,
        valid_actions: Vec<ValidAction>,
        pot: u64,
        current_bet: u64,
        /// Time remaining until auto-fold, as of emission. `Instant` itself
        /// isn't serializable (it's opaque and process-relative), so the
        /// event carries a duration rather than an absolute deadline; the
        /// engine still tracks the real deadline internally as an
        /// `Instant`.
        deadline: Duration,
    },
    PlayerActed {
        player_id: String,
        action: ActionKind,
        amount: u64,
        pot: u64,
        remaining_chips: u64,
    },
    PotUpdate {
        pot: u64,
        side_pots: Vec<SidePot<String>>,
    },
    Showdown {
        entries: Vec<ShowdownEntry>,
    },
    HandEnd {
        roster: Vec<PublicPlayerView>,
    },
}
