//! The betting state machine: per-hand round sequencing, whose turn
//! it is, and what actions are legal. Pure with respect to cards — it
//! never touches the deck or the evaluator, only `Player` bet bookkeeping.
//! [`crate::engine::HandEngine`] drives it and reacts to the outcomes it
//! reports by dealing community cards, running showdown, and so on.

use crate::error::ActionError;
use crate::events::ValidAction;
use crate::player::{ActionKind, ActionRequest, Player};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// The stage of a hand. A betting round is embedded in each of the first
/// four; `Showdown` and `Complete` have none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Round {
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
    Complete,
}

impl Round {
    pub fn next(self) -> Round {
        match self {
            Round::Preflop => Round::Flop,
            Round::Flop => Round::Turn,
            Round::Turn => Round::River,
            Round::River => Round::Showdown,
            Round::Showdown => Round::Complete,
            Round::Complete => Round::Complete,
        }
    }
}

/// Per-hand mutable record. Community cards and the action timer live
/// on `HandEngine`'s wrapper around this type; `HandState` is the subset
/// the betting machine owns and mutates directly.
#[derive(Debug, Clone)]
pub struct HandState {
    pub round: Round,
    pub pot: u64,
    pub current_bet: u64,
    pub min_raise: u64,
    pub last_raise_amount: u64,
    pub active_seat: Option<u8>,
    pub dealer_seat: u8,
    pub hand_number: u64,
    pub action_deadline: Option<Instant>,
}

impl HandState {
    pub fn new(dealer_seat: u8, hand_number: u64, big_blind: u64) -> Self {
        HandState {
            round: Round::Preflop,
            pot: 0,
            current_bet: 0,
            min_raise: big_blind,
            last_raise_amount: big_blind,
            active_seat: None,
            dealer_seat,
            hand_number,
            action_deadline: None,
        }
    }

    /// Reset per-player round bookkeeping and the shared bet/min-raise for
    /// a fresh round; `current_bet` and `min_raise` fall back to the big
    /// blind. Callers never invoke this after
    /// the river, since showdown has no following betting round.
    pub fn start_new_round(&mut self, players: &mut [Player], big_blind: u64) {
        for player in players.iter_mut() {
            if !player.has_folded {
                player.reset_for_new_round();
            }
        }
        self.current_bet = 0;
        self.min_raise = big_blind;
        self.last_raise_amount = big_blind;
    }
}

/// What happened as a direct consequence of one accepted action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    /// The round continues; this seat is now on action.
    Continues { next_actor: u8 },
    /// No further action is possible this round (everyone has matched the
    /// bet, or is all-in/folded) but more than one player remains.
    RoundComplete,
    /// Only one non-folded player remains; award the pot without a
    /// showdown.
    HandComplete,
}

/// The legal action set for the player on action, given
/// `to_call = current_bet - player.current_bet`.
pub fn valid_actions(player: &Player, state: &HandState) -> Vec<ValidAction> {
    let to_call = state.current_bet.saturating_sub(player.current_bet);
    let mut actions = vec![ValidAction::Fold];

    if to_call == 0 {
        actions.push(ValidAction::Check);
    } else {
        actions.push(ValidAction::Call {
            amount: to_call.min(player.chips),
        });
    }

    if player.chips > to_call {
        let min_raise_total = state.current_bet + state.min_raise;
        let min_increment = (min_raise_total - player.current_bet).min(player.chips);
        actions.push(ValidAction::Raise {
            min: min_increment,
            max: player.chips,
        });
    }

    actions
}

/// Apply one player's action. On success, mutates `players` and `state`
/// and reports the consequence for round/hand sequencing; on rejection,
/// neither is touched.
pub fn apply_action(
    players: &mut [Player],
    state: &mut HandState,
    player_id: &str,
    action: ActionRequest,
) -> Result<RoundOutcome, ActionError> {
    if matches!(state.round, Round::Showdown | Round::Complete) {
        return Err(ActionError::NoActiveHand);
    }
    let active_seat = state.active_seat.ok_or(ActionError::NoActiveHand)?;

    let player_index = players
        .iter()
        .position(|p| p.id == player_id)
        .ok_or_else(|| ActionError::UnknownPlayer(player_id.to_string()))?;
    if players[player_index].seat_index != active_seat {
        return Err(ActionError::NotActivePlayer(player_id.to_string()));
    }

    apply_to_active_player(&mut players[player_index], state, action)?;

    if players.iter().filter(|p| !p.has_folded).count() <= 1 {
        state.active_seat = None;
        return Ok(RoundOutcome::HandComplete);
    }

    match find_next_actor(players, active_seat, state.current_bet) {
        Some(seat) => {
            state.active_seat = Some(seat);
            Ok(RoundOutcome::Continues { next_actor: seat })
        }
        None => {
            state.active_seat = None;
            Ok(RoundOutcome::RoundComplete)
        }
    }
}

fn apply_to_active_player(player: &mut Player, state: &mut HandState, action: ActionRequest) -> Result<(), ActionError> {
    let to_call = state.current_bet.saturating_sub(player.current_bet);

    match action {
        ActionRequest::Fold => {
            player.has_folded = true;
            player.last_action = Some(ActionKind::Fold);
        }
        ActionRequest::Check => {
            if to_call != 0 {
                return Err(ActionError::IllegalAction("cannot check with a bet outstanding"));
            }
            player.last_action = Some(ActionKind::Check);
        }
        ActionRequest::Call => {
            if to_call == 0 {
                return Err(ActionError::IllegalAction("nothing to call"));
            }
            player.commit(to_call.min(player.chips));
            player.last_action = Some(ActionKind::Call);
        }
        ActionRequest::Raise(raise_amount) => {
            if player.chips <= to_call {
                return Err(ActionError::IllegalAction(
                    "not enough chips to raise, only call or go all-in",
                ));
            }
            let new_bet = player.current_bet + raise_amount;
            let raise_over = new_bet.saturating_sub(state.current_bet);
            let is_all_in = raise_amount >= player.chips;
            if raise_over < state.min_raise && !is_all_in {
                return Err(ActionError::IllegalAction("raise below the minimum legal raise"));
            }
            player.commit(raise_amount);
            state.current_bet = state.current_bet.max(player.current_bet);
            if raise_over >= state.min_raise {
                state.min_raise = raise_over;
                state.last_raise_amount = raise_over;
            }
            player.last_action = Some(ActionKind::Raise);
        }
        ActionRequest::AllIn => {
            let stake = player.chips;
            let new_bet = player.current_bet + stake;
            let raise_over = new_bet.saturating_sub(state.current_bet);
            player.commit(stake);
            state.current_bet = state.current_bet.max(player.current_bet);
            if raise_over >= state.min_raise {
                state.min_raise = raise_over;
                state.last_raise_amount = raise_over;
            }
            player.last_action = Some(ActionKind::AllIn);
        }
    }
    Ok(())
}

/// Scan seats in ascending order starting just after `after_seat`, wrapping,
/// among players who can still act. Returns the first whose
/// current-round bet is short of `current_bet`, or who hasn't acted at all
/// yet this round. The second clause is what's usually called the preflop
/// "big blind option" when `current_bet` already equals the blind, but the
/// same rule has to hold in every round: every non-folded, non-all-in
/// player gets at least one turn before a round can close, not just the
/// players who are short of the current bet. Reading the option as
/// preflop-only would end a post-flop check-around after the first check,
/// since nobody ever "owes" when the bet stays at zero.
pub fn find_next_actor(players: &[Player], after_seat: u8, current_bet: u64) -> Option<u8> {
    let mut candidates: Vec<&Player> = players.iter().filter(|p| p.can_act()).collect();
    candidates.sort_by_key(|p| p.seat_index);
    if candidates.is_empty() {
        return None;
    }

    let start = candidates.iter().position(|p| p.seat_index > after_seat).unwrap_or(0);
    let n = candidates.len();
    for step in 0..n {
        let candidate = candidates[(start + step) % n];
        let owes = candidate.current_bet < current_bet;
        let has_option = candidate.last_action.is_none();
        if owes || has_option {
            return Some(candidate.seat_index);
        }
    }
    None
}

/// The nth seat (1-indexed) after `after_seat`, cyclically, among the given
/// sorted, distinct seat indices. Used for blind posting and first-actor
/// determination, where "active" means dealt into the hand rather
/// than still able to act this round.
pub fn nth_seat_after(seats: &[u8], after_seat: u8, n: usize) -> Option<u8> {
    if seats.is_empty() {
        return None;
    }
    let start = seats.iter().position(|&s| s > after_seat).unwrap_or(0);
    let len = seats.len();
    Some(seats[(start + n - 1) % len])
}

/// The first player to act in a round, before any betting occurs.
/// `dealt_in_seats` must be sorted ascending.
///
/// Preflop, the dealer posts the small blind directly (see
/// [`crate::engine::HandEngine::post_blinds`'s doc comment] for why this
/// departs from the common "SB is the seat after the dealer" shorthand in
/// favor of the worked S1 scenario), the big blind is the seat after
/// the dealer, and the first actor is the seat after that — two seats past
/// the dealer. Heads-up that lands back on the dealer, matching "dealer
/// acts first" directly; this is the general formula, not a special case.
pub fn first_actor(dealt_in_seats: &[u8], dealer_seat: u8, round: Round) -> Option<u8> {
    if round == Round::Preflop {
        nth_seat_after(dealt_in_seats, dealer_seat, 2)
    } else {
        nth_seat_after(dealt_in_seats, dealer_seat, 1)
    }
}

/// True iff no further betting is possible: every non-folded player is
/// all-in, or at most one remains who could even be asked to act (with
/// nobody left to respond, soliciting that lone action would be pointless),
/// so the hand should run out remaining community cards without soliciting
/// further action.
pub fn no_further_action_possible(players: &[Player]) -> bool {
    players.iter().filter(|p| p.can_act()).count() <= 1
}

/// The first seat at or after `seat` (wrapping) that can still act. Used to
/// resolve a nominal first-actor seat (computed from `first_actor`, which
/// only knows about dealt-in seats) down to the actual player who should
/// receive the `action_on` event when that nominal seat is already all-in.
pub fn first_actionable_from(players: &[Player], seat: u8) -> Option<u8> {
    let mut candidates: Vec<&Player> = players.iter().filter(|p| p.can_act()).collect();
    candidates.sort_by_key(|p| p.seat_index);
    if candidates.is_empty() {
        return None;
    }
    let start = candidates.iter().position(|p| p.seat_index >= seat).unwrap_or(0);
    Some(candidates[start].seat_index)
}
