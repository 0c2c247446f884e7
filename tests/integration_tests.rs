//! Black-box tests of `HandEngine`'s public surface: roster management and
//! full hands driven only through `add_player`/`start_hand_with_deck`/
//! `handle_action`, the way an operator embedding the engine would.

use texas_engine::cards::{Card, Rank, Suit};
use texas_engine::deck::Deck;
use texas_engine::{ActionRequest, Event, HandEngine, TableConfig};

fn card(rank: Rank, suit: Suit) -> Card {
    Card::new(rank, suit)
}

#[test]
fn roster_enforces_seat_and_id_limits() {
    let mut engine = HandEngine::new(TableConfig::default());
    assert!(engine.add_player("a", "Alice", 0).is_ok());
    assert!(engine.add_player("b", "Bob", 6).is_err(), "seat 6 is out of 0..=5");
    assert!(engine.add_player("c", "Carl", 0).is_err(), "seat 0 already taken");
    assert!(engine.add_player("a", "Alice2", 1).is_err(), "id already seated");
}

#[test]
fn cannot_start_with_a_single_player() {
    let mut engine = HandEngine::new(TableConfig::default());
    engine.add_player("a", "Alice", 0).unwrap();
    assert!(!engine.can_start_hand());
}

/// Scenario S5: two equal two-pair hands split the pot, the extra chip
/// going to the tied winner seated closest to the dealer's left. A folded
/// contribution (the small blind, never matched) makes the pot an odd 41.
#[test]
fn s5_split_pot_awards_the_odd_chip_to_dealer_left() {
    let config = TableConfig::new(1, 2, 1000);
    let mut engine = HandEngine::new(config);
    engine.add_player("a", "Alice", 0).unwrap();
    engine.add_player("b", "Bob", 2).unwrap();
    engine.add_player("c", "Carl", 4).unwrap();

    // Dealing order is participant-seat order (a, b, c), two cards each.
    let deck = Deck::from_cards(vec![
        card(Rank::Three, Suit::Diamonds), // a hole
        card(Rank::Nine, Suit::Diamonds),
        card(Rank::Nine, Suit::Clubs), // b hole
        card(Rank::Four, Suit::Clubs),
        card(Rank::Seven, Suit::Spades), // c hole (folds, never shown)
        card(Rank::Eight, Suit::Spades),
        card(Rank::Two, Suit::Spades), // burn
        card(Rank::King, Suit::Spades),
        card(Rank::King, Suit::Hearts),
        card(Rank::Queen, Suit::Spades),
        card(Rank::Six, Suit::Spades), // burn
        card(Rank::Queen, Suit::Hearts),
        card(Rank::Five, Suit::Spades), // burn
        card(Rank::Two, Suit::Clubs),
    ]);

    let mut events = Vec::new();
    let mut sink = |e: Event| events.push(e);
    // Dealer is c (seat 4): c posts SB=1, a posts BB=2, b acts first.
    assert!(engine.start_hand_with_deck(deck, &mut sink));

    assert_eq!(engine.handle_action("b", ActionRequest::Raise(20), &mut sink), Ok(()));
    assert_eq!(engine.handle_action("c", ActionRequest::Fold, &mut sink), Ok(()));
    assert_eq!(engine.handle_action("a", ActionRequest::Call, &mut sink), Ok(()));

    for _ in 0..3 {
        assert_eq!(engine.handle_action("a", ActionRequest::Check, &mut sink), Ok(()));
        assert_eq!(engine.handle_action("b", ActionRequest::Check, &mut sink), Ok(()));
    }

    let showdown = events
        .iter()
        .find_map(|e| match e {
            Event::Showdown { entries } => Some(entries.clone()),
            _ => None,
        })
        .expect("a showdown event was emitted");
    let total_awarded: u64 = showdown.iter().map(|entry| entry.win_amount).sum();
    assert_eq!(total_awarded, 41, "20+20+1 dead money from c's unmatched small blind");

    let chips = |id: &str| engine.players().iter().find(|p| p.id == id).unwrap().chips;
    // Both started with 1000; a ends up with the odd chip (seated left of
    // dealer c), b gets the even share, c is down only the 1-chip blind.
    assert_eq!(chips("a"), 1000 - 20 + 21);
    assert_eq!(chips("b"), 1000 - 20 + 20);
    assert_eq!(chips("c"), 1000 - 1);
}

/// Property: chip conservation holds across any sequence of legal
/// actions, whatever the outcome (fold-out, all-in runout, or full
/// showdown).
#[test]
fn chip_totals_are_conserved_across_a_full_hand() {
    let config = TableConfig::new(1, 2, 200);
    let mut engine = HandEngine::new(config);
    engine.add_player("a", "Alice", 0).unwrap();
    engine.add_player("b", "Bob", 2).unwrap();
    engine.add_player("c", "Carl", 4).unwrap();

    let total_before: u64 = engine.players().iter().map(|p| p.chips).sum();

    let mut events = Vec::new();
    let mut sink = |e: Event| events.push(e);
    assert!(engine.start_hand(&mut sink));

    // Play it out with folds only, regardless of the real shuffle — every
    // seat folds except whoever is left, so the pot always resolves.
    loop {
        let Some(active_id) = engine.active_player().map(str::to_string) else {
            break;
        };
        if engine.handle_action(&active_id, ActionRequest::Fold, &mut sink).is_err() {
            break;
        }
        if !engine.hand_in_progress() {
            break;
        }
    }

    let total_after: u64 = engine.players().iter().map(|p| p.chips).sum();
    assert_eq!(total_before, total_after);
}

/// Property: every `pot_update` event's side pots sum to the pot
/// figure carried alongside them, and eligibility never grows along the
/// ordered list.
#[test]
fn pot_updates_are_internally_consistent() {
    let config = TableConfig::new(1, 2, 200);
    let mut engine = HandEngine::new(config);
    engine.add_player("a", "Alice", 0).unwrap();
    engine.add_player("b", "Bob", 2).unwrap();

    let mut events = Vec::new();
    let mut sink = |e: Event| events.push(e);
    assert!(engine.start_hand(&mut sink));
    while let Some(id) = engine.active_player().map(str::to_string) {
        if engine.handle_action(&id, ActionRequest::Call, &mut sink).is_err() {
            let _ = engine.handle_action(&id, ActionRequest::Check, &mut sink);
        }
        if !engine.hand_in_progress() {
            break;
        }
    }

    for event in &events {
        if let Event::PotUpdate { pot, side_pots } = event {
            let summed: u64 = side_pots.iter().map(|p| p.amount).sum();
            assert!(summed <= *pot, "side pots never exceed the running pot total");
            for window in side_pots.windows(2) {
                let (a, b) = (&window[0].eligible_player_ids, &window[1].eligible_player_ids);
                assert!(b.iter().all(|id| a.contains(id)), "eligibility must be non-increasing");
            }
        }
    }
}

/// Scenario S6: a player disconnecting while on action is auto-folded and,
/// if that leaves one player standing, the pot is awarded without a
/// showdown and their hole cards are never revealed.
#[test]
fn s6_disconnect_on_action_folds_without_revealing_cards() {
    let mut engine = HandEngine::new(TableConfig::new(1, 2, 100));
    engine.add_player("a", "Alice", 0).unwrap();
    engine.add_player("b", "Bob", 2).unwrap();

    let mut events = Vec::new();
    let mut sink = |e: Event| events.push(e);
    assert!(engine.start_hand(&mut sink));
    let active_id = engine.active_player().unwrap().to_string();
    engine.remove_player(&active_id, &mut sink);

    assert!(!engine.hand_in_progress());
    let showdown = events
        .iter()
        .find_map(|e| match e {
            Event::Showdown { entries } => Some(entries.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(showdown.len(), 1);
    assert!(showdown[0].cards.is_empty(), "the fast-path winner's cards are never shown");
    assert!(showdown[0].hand.is_none());
}
