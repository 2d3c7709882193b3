//! Deterministic scenario construction and stable-format (de)serialization,
//! used by both tests (custom positions) and hosts (persistence).

use crate::chess::board::Board;
use crate::chess::core::{Color, PieceKind, Square};
use crate::config::EngineConfig;
use crate::economy::BpEconomy;
use crate::engine::GameEngine;
use crate::error::GambitError;

/// Serializes a game to a stable byte format the host can persist and
/// later hand back to [`deserialize`].
pub fn serialize(engine: &GameEngine) -> Result<Vec<u8>, GambitError> {
    bincode::serialize(engine).map_err(|_| GambitError::InvalidPosition)
}

/// Restores a game from bytes produced by [`serialize`].
pub fn deserialize(bytes: &[u8]) -> Result<GameEngine, GambitError> {
    bincode::deserialize(bytes).map_err(|_| GambitError::InvalidPosition)
}

/// Builds a custom, non-initial-position board for tests: place pieces one
/// at a time, then finish with an explicit side to move.
pub struct Scenario {
    board: Board,
}

impl Scenario {
    #[must_use]
    pub fn new() -> Self {
        Self { board: Board::empty() }
    }

    #[must_use]
    pub fn piece(mut self, kind: PieceKind, color: Color, square: Square) -> Self {
        self.board.place_piece(kind, color, square);
        self
    }

    /// Finishes construction with `to_move` as the side to move and a
    /// fresh BP pool for both sides under `config`.
    #[must_use]
    pub fn build(mut self, to_move: Color, config: EngineConfig) -> (Board, BpEconomy) {
        if to_move == Color::Black {
            self.board.set_move_number(2);
        }
        let economy = BpEconomy::new(config.initial_bp_pool, config.bp_max);
        (self.board, economy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::core::PieceKind;

    #[test]
    fn stalemate_scenario_has_black_king_cornered() {
        let (board, _) = Scenario::new()
            .piece(PieceKind::King, Color::Black, Square::new(0, 7).unwrap())
            .piece(PieceKind::King, Color::White, Square::new(2, 5).unwrap())
            .piece(PieceKind::Queen, Color::White, Square::new(2, 6).unwrap())
            .build(Color::White, EngineConfig::default());
        assert_eq!(board.side_to_move(), Color::White);
        assert!(!board.has_any_legal_move(Color::Black) || board.is_in_check(Color::Black));
    }

    #[test]
    fn round_trips_through_bincode() {
        let mut engine = GameEngine::new();
        engine.initialize("white", "black", None).unwrap();
        let bytes = serialize(&engine).unwrap();
        let restored = deserialize(&bytes).unwrap();
        assert_eq!(
            restored.create_state_view("white").unwrap().current_turn,
            engine.create_state_view("white").unwrap().current_turn
        );
    }
}
