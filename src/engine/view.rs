//! Per-role filtered snapshots of a game, handed to the transport layer.
//! A view is a value: mutating it has no effect on engine state.

use crate::chess::board::Board;
use crate::chess::core::{Color, Piece};
use crate::economy::BpEconomy;
use crate::engine::{GameResult, MoveRecord, Phase};
use crate::retreat::RetreatOption;

/// Who a view is being built for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Viewer {
    Player(Color),
    Spectator,
}

/// Borrowed engine state, threaded through to avoid exposing `GameState`
/// outside the crate.
pub(crate) struct StateSource<'a> {
    pub board: &'a Board,
    pub economy: &'a BpEconomy,
    pub phase: &'a Phase,
    pub history: &'a [MoveRecord],
}

/// The fact that a duel is pending, filtered so a side only ever sees its
/// own allocation before resolution.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct DuelView {
    pub attacker_square: crate::chess::core::Square,
    pub defender_square: crate::chess::core::Square,
    pub own_allocation: Option<u32>,
}

/// The fact that a retreat is pending; the cost table is visible only to
/// the retreating side.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct RetreatView {
    pub piece_square: crate::chess::core::Square,
    pub options: Option<Vec<RetreatOption>>,
}

/// Phase-specific detail visible to this particular viewer.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum PhaseView {
    NormalMove,
    DuelAllocation(DuelView),
    TacticalRetreat(RetreatView),
    GameOver(GameResult),
}

/// A complete, role-filtered snapshot of a game.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct GameStateView {
    pub pieces: Vec<Piece>,
    pub captures: Vec<Piece>,
    pub move_history: Vec<MoveRecord>,
    pub current_turn: Color,
    pub phase: PhaseView,
    /// The viewer's own BP; `None` for spectators, who have no BP of
    /// their own to report.
    pub own_bp: Option<u32>,
    pub white_bp: u32,
    pub black_bp: u32,
}

pub(crate) fn build(state: StateSource<'_>, viewer: Viewer) -> GameStateView {
    let pieces = state
        .board
        .pieces_by_color(Color::White)
        .chain(state.board.pieces_by_color(Color::Black))
        .cloned()
        .collect();
    let captures = state.board.captures().iter().map(|&id| state.board.piece(id).clone()).collect();

    let phase = match state.phase {
        Phase::NormalMove => PhaseView::NormalMove,
        Phase::DuelAllocation(pending) => PhaseView::DuelAllocation(DuelView {
            attacker_square: pending.from,
            defender_square: pending.to,
            own_allocation: match viewer {
                Viewer::Player(color) => pending.allocation_of(color),
                Viewer::Spectator => None,
            },
        }),
        Phase::TacticalRetreat(pending) => PhaseView::TacticalRetreat(RetreatView {
            piece_square: pending.original_square,
            options: match viewer {
                Viewer::Player(color) if color == pending.attacker_color => Some(pending.options.clone()),
                _ => None,
            },
        }),
        Phase::GameOver(result) => PhaseView::GameOver(*result),
    };

    let own_bp = match viewer {
        Viewer::Player(color) => Some(state.economy.bp(color)),
        Viewer::Spectator => None,
    };

    GameStateView {
        pieces,
        captures,
        move_history: state.history.to_vec(),
        current_turn: state.board.side_to_move(),
        phase,
        own_bp,
        white_bp: state.economy.bp(Color::White),
        black_bp: state.economy.bp(Color::Black),
    }
}
