//! The error taxonomy every public [`crate::engine::GameEngine`] operation
//! returns. Variants are caller-visible and never mutate state when an
//! operation is rejected.

use thiserror::Error;

use crate::chess::core::Square;

/// Machine-readable error kind returned by a rejected engine operation.
///
/// No variant here corresponds to a terminal game state (checkmate,
/// stalemate, draw) — those are successful transitions surfaced through
/// [`crate::engine::view::GameStateView`], not errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GambitError {
    /// The engine was asked to initialize twice.
    #[error("game is already initialized")]
    AlreadyInitialized,
    /// An operation ran before `initialize`.
    #[error("game has not been initialized")]
    NotInitialized,
    /// The operation is not valid in the engine's current phase.
    #[error("operation not valid in the current phase")]
    WrongPhase,
    /// A move was submitted by the side not currently to move.
    #[error("it is not your turn")]
    NotYourTurn,
    /// The caller's session id does not match either player in this game.
    #[error("session id does not match a player in this game")]
    NotYourSession,
    /// A duel allocation or retreat was submitted by a non-participant.
    #[error("caller is not a participant in the pending duel")]
    NotAParticipant,
    /// `from` names an empty square.
    #[error("no piece at source square {0:?}")]
    NoPieceAtSource(Square),
    /// `from` names a piece belonging to the other color.
    #[error("piece at {0:?} does not belong to the caller")]
    WrongPieceOwner(Square),
    /// The move is geometrically illegal, blocked, or otherwise malformed.
    #[error("illegal move from {from:?} to {to:?}")]
    IllegalMove {
        /// Source square of the rejected move.
        from: Square,
        /// Destination square of the rejected move.
        to: Square,
    },
    /// The move is legal geometrically but leaves the mover's own king in
    /// check.
    #[error("move leaves the moving side's king in check")]
    MoveLeavesKingInCheck,
    /// A square coordinate was out of the 0..8 range.
    #[error("invalid board position")]
    InvalidPosition,
    /// A BP allocation exceeds the hard per-duel cap, or its
    /// capacity-derived cost exceeds the allocator's available BP.
    #[error("invalid BP allocation")]
    InvalidBpAllocation,
    /// Not enough BP to cover a retreat's cost.
    #[error("insufficient BP")]
    InsufficientBp,
    /// A declared retreat cost did not match the engine's computed cost.
    #[error("declared retreat cost does not match computed cost")]
    BpCostMismatch,
    /// The chosen retreat square is not among the attacker's options.
    #[error("square is not a valid retreat option")]
    InvalidRetreatPosition,
    /// The same color already has a pending allocation for this duel.
    #[error("this side has already submitted an allocation for the pending duel")]
    AlreadyAllocated,
    /// The game has already reached a terminal result.
    #[error("the game is over")]
    GameOver,
}

/// Result alias used throughout the public API.
pub type GambitResult<T> = Result<T, GambitError>;
