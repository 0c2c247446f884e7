//! Error types, split along a propagation policy: local, recoverable
//! rejections for user-driven commands vs. fatal assertions for internal
//! invariant violations that legal play can never trigger.

use thiserror::Error;

/// Fatal, internal-invariant errors. The engine never surfaces these as
/// control flow to an operator — they indicate a programmer error (calling
/// the evaluator with too few cards, or dealing past 52 cards in a single
/// hand) and callers are expected to treat them as unrecoverable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("deck exhausted: no cards remain to deal")]
    DeckExhausted,
    #[error("fewer than five cards supplied to the hand evaluator")]
    InsufficientCards,
}

/// Rejections for roster management (`add_player`). No side effects occur
/// when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    #[error("seat {0} is not in 0..=5")]
    InvalidSeat(u8),
    #[error("seat {0} is already occupied")]
    SeatTaken(u8),
    #[error("roster already has the maximum of 6 players")]
    RosterFull,
    #[error("player id {0:?} is already seated")]
    DuplicateId(String),
}

/// Rejections for `handle_action`. The hand state is left unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("no hand is currently in progress")]
    NoActiveHand,
    #[error("player {0:?} is not the player on action")]
    NotActivePlayer(String),
    #[error("unknown player id {0:?}")]
    UnknownPlayer(String),
    #[error("illegal action: {0}")]
    IllegalAction(&'static str),
}
