//! Player state and the actions a player may take on their turn.

use crate::cards::Card;
use serde::{Deserialize, Serialize};

/// A command a player submits on their turn. `AllIn` is shorthand for
/// raising the player's entire remaining stack; the engine translates it
/// into the same bookkeeping as a `Raise` whose amount equals their chips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionRequest {
    Fold,
    Check,
    Call,
    Raise(u64),
    AllIn,
}

/// The kind of the most recent action a player took, recorded without the
/// amount (amounts are only meaningful in the `player_acted` event, not in
/// the roster snapshot).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    Fold,
    Check,
    Call,
    Raise,
    AllIn,
}

/// A seated player and everything the engine tracks about them across and
/// within hands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub seat_index: u8,
    pub chips: u64,
    pub hole_cards: Vec<Card>,
    /// Chips committed in the current betting round.
    pub current_bet: u64,
    /// Chips committed across the whole hand, all rounds combined. Feeds
    /// the side-pot builder, which needs total contribution, not just the
    /// current round's.
    pub total_committed: u64,
    pub has_folded: bool,
    pub is_all_in: bool,
    pub is_sitting_out: bool,
    pub is_connected: bool,
    pub last_action: Option<ActionKind>,
}

impl Player {
    pub fn new(id: impl Into<String>, name: impl Into<String>, seat_index: u8, chips: u64) -> Self {
        Player {
            id: id.into(),
            name: name.into(),
            seat_index,
            chips,
            hole_cards: Vec::new(),
            current_bet: 0,
            total_committed: 0,
            has_folded: false,
            is_all_in: false,
            is_sitting_out: false,
            is_connected: true,
            last_action: None,
        }
    }

    /// True iff the player is chip-positive, connected, and not sitting
    /// out — the "eligible to be dealt into the next hand" predicate. Distinct from [`Player::is_in_hand`]: a player can
    /// be `chips == 0` mid-hand (all-in) and still be very much in the
    /// hand.
    pub fn eligible_for_next_hand(&self) -> bool {
        self.chips > 0 && self.is_connected && !self.is_sitting_out
    }

    /// True iff the player currently holds a stake in the pot: dealt in,
    /// hasn't folded. Admits `chips == 0` all-in players, unlike
    /// [`Player::eligible_for_next_hand`].
    pub fn is_in_hand(&self) -> bool {
        !self.has_folded && !self.hole_cards.is_empty()
    }

    /// True iff the player can still act this round: in the hand, not
    /// all-in, and not folded.
    pub fn can_act(&self) -> bool {
        self.is_in_hand() && !self.is_all_in
    }

    pub fn reset_for_new_hand(&mut self) {
        self.hole_cards.clear();
        self.current_bet = 0;
        self.total_committed = 0;
        self.has_folded = false;
        self.is_all_in = false;
        self.last_action = None;
    }

    pub fn reset_for_new_round(&mut self) {
        self.current_bet = 0;
        self.last_action = None;
    }

    /// Commit up to `amount` chips, capping at the player's stack (a
    /// short-stacked commitment goes all-in automatically).
    pub fn commit(&mut self, amount: u64) -> u64 {
        let paid = amount.min(self.chips);
        self.chips -= paid;
        self.current_bet += paid;
        self.total_committed += paid;
        if self.chips == 0 {
            self.is_all_in = true;
        }
        paid
    }

    pub fn public_view(&self) -> PublicPlayerView {
        PublicPlayerView {
            id: self.id.clone(),
            name: self.name.clone(),
            seat: self.seat_index,
            chips: self.chips,
            current_bet: self.current_bet,
            has_folded: self.has_folded,
            is_all_in: self.is_all_in,
            last_action: self.last_action,
        }
    }
}

/// The public roster view: never includes hole cards, regardless of where
/// it ends up serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicPlayerView {
    pub id: String,
    pub name: String,
    pub seat: u8,
    pub chips: u64,
    pub current_bet: u64,
    pub has_folded: bool,
    pub is_all_in: bool,
    pub last_action: Option<ActionKind>,
}
