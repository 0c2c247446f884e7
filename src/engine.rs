//! The hand engine: the orchestrator that owns the persistent
//! player roster, the deck, and the dealer button across hands, and drives
//! the betting state machine through one hand from blinds to showdown.

use crate::cards::Card;
use crate::config::TableConfig;
use crate::deck::Deck;
use crate::error::{ActionError, RosterError};
use crate::evaluator::{self, EvaluatedHand};
use crate::events::{Event, ShowdownEntry};
use crate::player::{ActionRequest, Player};
use crate::pots::{self, Contribution};
use crate::state::{self, HandState, Round, RoundOutcome};
use std::cell::Cell;
use std::collections::HashMap;
use std::time::Instant;

/// An operator-supplied event callback. The engine never calls back into
/// itself from inside one of these calls; see [`HandEngine::sink_active`].
pub type EventSink<'a> = dyn FnMut(Event) + 'a;

pub struct HandEngine {
    config: TableConfig,
    players: Vec<Player>,
    dealer_seat: Option<u8>,
    hand_number: u64,
    hand_in_progress: bool,
    hand: Option<HandState>,
    deck: Option<Deck>,
    community_cards: Vec<Card>,
    /// Debug-mode re-entrancy guard: set for the duration of a sink
    /// invocation. The borrow checker already forbids a sink from calling
    /// back into `&mut self` directly; this also catches the case where an
    /// operator stashes a second handle to the same engine behind shared
    /// mutability and calls back through that.
    sink_active: Cell<bool>,
}

impl HandEngine {
    pub fn new(config: TableConfig) -> Self {
        HandEngine {
            config,
            players: Vec::new(),
            dealer_seat: None,
            hand_number: 0,
            hand_in_progress: false,
            hand: None,
            deck: None,
            community_cards: Vec::new(),
            sink_active: Cell::new(false),
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn hand_in_progress(&self) -> bool {
        self.hand_in_progress
    }

    pub fn hand_state(&self) -> Option<&HandState> {
        self.hand.as_ref()
    }

    /// The id of the player currently on action, if any. Resolves
    /// `HandState::active_seat` (a seat index) to the player it belongs to,
    /// so callers don't have to scan `players()` for the matching seat
    /// themselves.
    pub fn active_player(&self) -> Option<&str> {
        let seat = self.hand.as_ref()?.active_seat?;
        self.players.iter().find(|p| p.seat_index == seat).map(|p| p.id.as_str())
    }

    fn emit(&self, sink: &mut EventSink, event: Event) {
        debug_assert!(!self.sink_active.get(), "event sink invoked re-entrantly");
        self.sink_active.set(true);
        sink(event);
        self.sink_active.set(false);
    }

    fn total_pot(&self) -> u64 {
        self.players.iter().map(|p| p.total_committed).sum()
    }

    fn public_roster(&self) -> Vec<crate::player::PublicPlayerView> {
        self.players.iter().map(Player::public_view).collect()
    }

    // ---- roster management ----

    pub fn add_player(&mut self, id: impl Into<String>, name: impl Into<String>, seat: u8) -> Result<(), RosterError> {
        let id = id.into();
        if seat >= self.config.max_seats {
            return Err(RosterError::InvalidSeat(seat));
        }
        if self.players.iter().any(|p| p.seat_index == seat) {
            return Err(RosterError::SeatTaken(seat));
        }
        if self.players.iter().any(|p| p.id == id) {
            return Err(RosterError::DuplicateId(id));
        }
        if self.players.len() >= self.config.max_seats as usize {
            return Err(RosterError::RosterFull);
        }
        self.players.push(Player::new(id, name, seat, self.config.buy_in));
        Ok(())
    }

    /// Between hands this removes the player outright. During a hand it
    /// folds and disconnects them instead (removal is deferred to the next
    /// `end_hand`'s purge), advancing action if they held it.
    pub fn remove_player(&mut self, id: &str, sink: &mut EventSink) -> bool {
        debug_assert!(!self.sink_active.get());
        let Some(index) = self.players.iter().position(|p| p.id == id) else {
            return false;
        };

        if !self.hand_in_progress {
            self.players.remove(index);
            return true;
        }

        self.players[index].is_connected = false;
        let was_active = self.hand.as_ref().and_then(|h| h.active_seat) == Some(self.players[index].seat_index);
        if !self.players[index].has_folded {
            self.players[index].has_folded = true;
            self.players[index].last_action = Some(crate::player::ActionKind::Fold);
        }
        if was_active {
            self.advance_after_forced_fold(id, sink);
        }
        true
    }

    pub fn set_connected(&mut self, id: &str, connected: bool) -> bool {
        match self.players.iter_mut().find(|p| p.id == id) {
            Some(p) => {
                p.is_connected = connected;
                true
            }
            None => false,
        }
    }

    pub fn can_start_hand(&self) -> bool {
        !self.hand_in_progress && self.players.iter().filter(|p| p.eligible_for_next_hand()).count() >= 2
    }

    // ---- hand lifecycle ----

    pub fn start_hand(&mut self, sink: &mut EventSink) -> bool {
        self.start_hand_inner(Deck::new(), sink)
    }

    /// Like [`HandEngine::start_hand`] but deals from a caller-supplied deck
    /// instead of a fresh shuffle. Intended for deterministic tests that
    /// need to pin specific hole cards and a specific board (build the deck
    /// with [`Deck::from_cards`]); production code should use
    /// [`HandEngine::start_hand`].
    pub fn start_hand_with_deck(&mut self, deck: Deck, sink: &mut EventSink) -> bool {
        self.start_hand_inner(deck, sink)
    }

    fn start_hand_inner(&mut self, deck: Deck, sink: &mut EventSink) -> bool {
        debug_assert!(!self.sink_active.get());
        if !self.can_start_hand() {
            return false;
        }

        self.players.retain(|p| p.chips > 0 && p.is_connected);
        for player in self.players.iter_mut() {
            player.reset_for_new_hand();
        }

        let mut participants: Vec<u8> = self
            .players
            .iter()
            .filter(|p| p.eligible_for_next_hand())
            .map(|p| p.seat_index)
            .collect();
        participants.sort_unstable();

        let dealer = match self.dealer_seat {
            None => participants[0],
            Some(prev) => state::nth_seat_after(&participants, prev, 1).unwrap_or(participants[0]),
        };
        self.dealer_seat = Some(dealer);
        self.hand_number += 1;

        self.deck = Some(deck);
        self.community_cards.clear();

        let mut hand = HandState::new(dealer, self.hand_number, self.config.big_blind);
        self.post_blinds(dealer, &participants, &mut hand);

        for &seat in &participants {
            let cards = [
                self.deck.as_mut().unwrap().deal().expect("deck exhausted: unreachable in legal play"),
                self.deck.as_mut().unwrap().deal().expect("deck exhausted: unreachable in legal play"),
            ];
            let player = self.players.iter_mut().find(|p| p.seat_index == seat).unwrap();
            player.hole_cards = vec![cards[0], cards[1]];
        }

        hand.pot = self.total_pot();
        self.hand = Some(hand);
        self.hand_in_progress = true;

        self.emit(
            sink,
            Event::HandStart {
                dealer_seat: dealer,
                hand_number: self.hand_number,
                roster: self.public_roster(),
            },
        );
        for &seat in &participants {
            let player = self.players.iter().find(|p| p.seat_index == seat).unwrap();
            self.emit(
                sink,
                Event::HoleCards {
                    player_id: player.id.clone(),
                    cards: [player.hole_cards[0], player.hole_cards[1]],
                },
            );
        }

        let first_actor = state::first_actor(&participants, dealer, Round::Preflop)
            .and_then(|nominal| state::first_actionable_from(&self.players, nominal));
        match first_actor {
            Some(seat) => self.enter_action_on(seat, sink),
            None => self.advance_after_round(sink),
        }
        true
    }

    /// The dealer posts the small blind directly and the seat after them
    /// posts the big blind, for any table size — heads-up's "dealer posts
    /// SB, the other posts BB" is this same rule with only two
    /// seats. The common shorthand for three-or-more players instead reads
    /// "SB is the seat after the dealer," but that contradicts the worked S1
    /// scenario (dealer A posts the SB, B posts the BB, C acts first); S1
    /// is the authoritative, testable form, so that is what this follows
    /// (see DESIGN.md).
    fn post_blinds(&mut self, dealer: u8, participants: &[u8], hand: &mut HandState) {
        let sb_seat = dealer;
        let bb_seat = state::nth_seat_after(participants, dealer, 1).unwrap();
        let sb = self.config.small_blind;
        let bb = self.config.big_blind;
        self.players.iter_mut().find(|p| p.seat_index == sb_seat).unwrap().commit(sb);
        self.players.iter_mut().find(|p| p.seat_index == bb_seat).unwrap().commit(bb);
        hand.current_bet = bb;
        hand.min_raise = bb;
        hand.last_raise_amount = bb;
    }

    /// Forwards `id`'s action to the state machine after verifying they are
    /// the active player, then reacts to the consequences.
    pub fn handle_action(&mut self, id: &str, action: ActionRequest, sink: &mut EventSink) -> Result<(), ActionError> {
        debug_assert!(!self.sink_active.get());
        if !self.hand_in_progress {
            return Err(ActionError::NoActiveHand);
        }
        self.dispatch_action(id, action, sink)
    }

    /// Pull-based timeout check: the operator calls this
    /// whenever its scheduler fires. If the active player's deadline has
    /// passed, they are auto-folded.
    pub fn tick(&mut self, now: Instant, sink: &mut EventSink) {
        debug_assert!(!self.sink_active.get());
        if !self.hand_in_progress {
            return;
        }
        let Some(hand) = self.hand.as_ref() else { return };
        let (Some(deadline), Some(seat)) = (hand.action_deadline, hand.active_seat) else {
            return;
        };
        if now < deadline {
            return;
        }
        let Some(id) = self.players.iter().find(|p| p.seat_index == seat).map(|p| p.id.clone()) else {
            return;
        };
        let _ = self.dispatch_action(&id, ActionRequest::Fold, sink);
    }

    fn advance_after_forced_fold(&mut self, id: &str, sink: &mut EventSink) {
        let _ = self.dispatch_action(id, ActionRequest::Fold, sink);
    }

    fn dispatch_action(&mut self, id: &str, action: ActionRequest, sink: &mut EventSink) -> Result<(), ActionError> {
        let hand = self.hand.as_mut().ok_or(ActionError::NoActiveHand)?;
        let outcome = state::apply_action(&mut self.players, hand, id, action)?;

        let acted = self.players.iter().find(|p| p.id == id).expect("player existed a moment ago");
        let action_kind = acted.last_action.expect("apply_action always records an action on success");
        let amount = acted.current_bet;
        let remaining_chips = acted.chips;
        self.hand.as_mut().unwrap().pot = self.players.iter().map(|p| p.total_committed).sum();
        let pot = self.total_pot();
        self.emit(
            sink,
            Event::PlayerActed {
                player_id: id.to_string(),
                action: action_kind,
                amount,
                pot,
                remaining_chips,
            },
        );

        match outcome {
            RoundOutcome::HandComplete => self.finish_hand_single_winner(sink),
            RoundOutcome::RoundComplete => self.advance_after_round(sink),
            RoundOutcome::Continues { next_actor } => self.enter_action_on(next_actor, sink),
        }
        Ok(())
    }

    fn enter_action_on(&mut self, seat: u8, sink: &mut EventSink) {
        let timeout = self.config.action_timeout;
        let player = self.players.iter().find(|p| p.seat_index == seat).unwrap().clone();
        let hand = self.hand.as_mut().unwrap();
        let valid = state::valid_actions(&player, hand);
        hand.active_seat = Some(seat);
        hand.action_deadline = Some(Instant::now() + timeout);
        let pot = self.total_pot();
        let current_bet = hand.current_bet;
        self.emit(
            sink,
            Event::ActionOn {
                player_id: player.id,
                valid_actions: valid,
                pot,
                current_bet,
                deadline: timeout,
            },
        );
    }

    /// Called after a round ends with more than one player remaining:
    /// either deal into the next street and solicit action, or — if
    /// everyone left is all-in, or only one player could even be asked to
    /// act — run the board out to the river and go straight to showdown.
    fn advance_after_round(&mut self, sink: &mut EventSink) {
        if state::no_further_action_possible(&self.players) {
            loop {
                let round = self.hand.as_ref().unwrap().round;
                if round == Round::River {
                    break;
                }
                self.deal_next_street(sink);
            }
            self.resolve_showdown(sink);
            return;
        }
        self.deal_next_street(sink);

        let next_round = self.hand.as_ref().unwrap().round;
        if next_round == Round::Showdown {
            self.resolve_showdown(sink);
            return;
        }

        let mut dealt_in: Vec<u8> = self.players.iter().filter(|p| p.is_in_hand()).map(|p| p.seat_index).collect();
        dealt_in.sort_unstable();
        let dealer = self.hand.as_ref().unwrap().dealer_seat;
        let actor = state::first_actor(&dealt_in, dealer, next_round).and_then(|nominal| state::first_actionable_from(&self.players, nominal));
        match actor {
            Some(seat) => self.enter_action_on(seat, sink),
            None => self.advance_after_round(sink),
        }
    }

    /// Deals community cards for the street after the hand's current round
    /// and advances `hand.round` to it, resetting per-round bet bookkeeping
    ///. Emits `community` and `pot_update`.
    fn deal_next_street(&mut self, sink: &mut EventSink) {
        let current = self.hand.as_ref().unwrap().round;
        let next = current.next();
        let deck = self.deck.as_mut().expect("deck exists for the duration of a hand");
        match next {
            Round::Flop => {
                deck.burn().expect("deck exhausted: unreachable in legal play");
                self.community_cards
                    .extend(deck.deal_n(3).expect("deck exhausted: unreachable in legal play"));
            }
            Round::Turn | Round::River => {
                deck.burn().expect("deck exhausted: unreachable in legal play");
                self.community_cards
                    .push(deck.deal().expect("deck exhausted: unreachable in legal play"));
            }
            Round::Showdown | Round::Complete | Round::Preflop => {}
        }

        let big_blind = self.config.big_blind;
        self.hand.as_mut().unwrap().start_new_round(&mut self.players, big_blind);
        self.hand.as_mut().unwrap().round = next;
        self.hand.as_mut().unwrap().pot = self.total_pot();

        self.emit(
            sink,
            Event::Community {
                cards: self.community_cards.clone(),
                round: next,
            },
        );
        self.emit_pot_update(sink);
    }

    fn emit_pot_update(&mut self, sink: &mut EventSink) {
        let pot = self.total_pot();
        let contributions = self.contributions();
        let side_pots = pots::build_side_pots(&contributions);
        self.emit(sink, Event::PotUpdate { pot, side_pots });
    }

    fn contributions(&self) -> Vec<Contribution<String>> {
        self.players
            .iter()
            .map(|p| Contribution {
                player_id: p.id.clone(),
                total: p.total_committed,
                folded: p.has_folded,
                all_in: p.is_all_in,
            })
            .collect()
    }

    /// Single-winner fast path: awards the pot to the sole
    /// remaining player without revealing cards or running a showdown.
    fn finish_hand_single_winner(&mut self, sink: &mut EventSink) {
        let pot = self.total_pot();
        let winner_id = {
            let winner = self
                .players
                .iter_mut()
                .find(|p| !p.has_folded)
                .expect("exactly one non-folded player when the hand completes early");
            winner.chips += pot;
            winner.id.clone()
        };
        self.emit(
            sink,
            Event::Showdown {
                entries: vec![ShowdownEntry {
                    player_id: winner_id,
                    cards: Vec::new(),
                    hand: None,
                    win_amount: pot,
                }],
            },
        );
        self.end_hand(sink);
    }

    /// Full showdown: builds side pots, evaluates every contesting
    /// hand, and awards each pot to its best hand(s), splitting ties with
    /// the remainder going to the tied winner closest to the dealer's left
    ///.
    fn resolve_showdown(&mut self, sink: &mut EventSink) {
        let hand = self.hand.as_mut().unwrap();
        hand.round = Round::Showdown;
        let dealer = hand.dealer_seat;

        let mut evaluations: HashMap<String, EvaluatedHand> = HashMap::new();
        for player in self.players.iter().filter(|p| p.is_in_hand()) {
            let mut cards = player.hole_cards.clone();
            cards.extend(self.community_cards.iter().copied());
            let evaluated = evaluator::evaluate_best(&cards).expect("a dealt-in player always has at least 5 cards by showdown");
            evaluations.insert(player.id.clone(), evaluated);
        }

        let contributions = self.contributions();
        let side_pots = pots::build_side_pots(&contributions);

        let mut winnings: HashMap<String, u64> = HashMap::new();
        for pot in &side_pots {
            let mut best: Option<&EvaluatedHand> = None;
            let mut winners: Vec<&String> = Vec::new();
            for player_id in &pot.eligible_player_ids {
                let Some(hand_value) = evaluations.get(player_id) else { continue };
                match best {
                    None => {
                        best = Some(hand_value);
                        winners = vec![player_id];
                    }
                    Some(current) => match evaluator::compare(hand_value, current) {
                        std::cmp::Ordering::Greater => {
                            best = Some(hand_value);
                            winners = vec![player_id];
                        }
                        std::cmp::Ordering::Equal => winners.push(player_id),
                        std::cmp::Ordering::Less => {}
                    },
                }
            }
            if winners.is_empty() {
                continue;
            }
            let share = pot.amount / winners.len() as u64;
            let remainder = pot.amount % winners.len() as u64;
            for &winner_id in &winners {
                *winnings.entry(winner_id.clone()).or_insert(0) += share;
            }
            if remainder > 0 {
                let mut winner_seats: Vec<u8> = winners
                    .iter()
                    .filter_map(|id| self.players.iter().find(|p| &&p.id == id).map(|p| p.seat_index))
                    .collect();
                winner_seats.sort_unstable();
                if let Some(seat) = state::nth_seat_after(&winner_seats, dealer, 1) {
                    let id = self.players.iter().find(|p| p.seat_index == seat).unwrap().id.clone();
                    *winnings.entry(id).or_insert(0) += remainder;
                }
            }
        }

        let mut entries = Vec::new();
        for player in self.players.iter_mut() {
            if !player.is_in_hand() {
                continue;
            }
            let win_amount = winnings.get(&player.id).copied().unwrap_or(0);
            player.chips += win_amount;
            entries.push(ShowdownEntry {
                player_id: player.id.clone(),
                cards: player.hole_cards.clone(),
                hand: evaluations.get(&player.id).cloned(),
                win_amount,
            });
        }

        self.emit(sink, Event::Showdown { entries });
        self.end_hand(sink);
    }

    fn end_hand(&mut self, sink: &mut EventSink) {
        self.hand = None;
        self.hand_in_progress = false;
        self.deck = None;
        self.players.retain(|p| p.is_connected || p.chips > 0);
        self.emit(
            sink,
            Event::HandEnd {
                roster: self.public_roster(),
            },
        );
    }
}
