//! Tactical retreats: after a long-range attacker loses a duel, it may
//! retreat along the ray it attacked on (always free back to its origin)
//! or, for a queen, also along the perpendicular directions through its
//! origin square.

use std::collections::HashMap;

use crate::chess::board::{Board, bishop_dirs, rook_dirs};
use crate::chess::core::{PieceKind, Square};
use crate::error::{GambitError, GambitResult};

/// One reachable retreat square and its BP cost.
#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RetreatOption {
    pub square: Square,
    pub cost: u32,
}

fn ray_direction(from: Square, to: Square) -> (i8, i8) {
    let dx = i8::try_from(i16::from(to.x) - i16::from(from.x))
        .unwrap_or(0)
        .signum();
    let dy = i8::try_from(i16::from(to.y) - i16::from(from.y))
        .unwrap_or(0)
        .signum();
    (dx, dy)
}

/// Every retreat option for an attacker of `kind` that failed to capture
/// from `from` along its attempted move to `to`. Always includes `from`
/// itself at cost 0.
#[must_use]
pub fn options(board: &Board, kind: PieceKind, from: Square, to: Square) -> Vec<RetreatOption> {
    let mut found: HashMap<Square, u32> = HashMap::new();
    found.insert(from, 0);

    let primary_dir = ray_direction(from, to);
    for square in board.empty_squares_along(from, primary_dir) {
        let cost = u32::from(from.ray_distance(square));
        found.entry(square).or_insert(cost);
    }

    if kind == PieceKind::Queen {
        // A diagonal attempt retreats along the rank and file through the
        // origin; an orthogonal attempt retreats along the two diagonals
        // through it. Never the attempt's own direction family.
        let is_diagonal = primary_dir.0.abs() == primary_dir.1.abs();
        let extra_family = if is_diagonal { rook_dirs() } else { bishop_dirs() };
        for dir in extra_family {
            for square in board.empty_squares_along(from, dir) {
                let cost = u32::from(from.ray_distance(square));
                found.entry(square).or_insert(cost);
            }
        }
    }

    let mut options: Vec<_> = found
        .into_iter()
        .map(|(square, cost)| RetreatOption { square, cost })
        .collect();
    options.sort_by_key(|opt| (opt.cost, opt.square.x, opt.square.y));
    options
}

/// Validates a submitted `(chosen_square, declared_cost)` retreat against
/// the computed option set and the attacker's available BP.
pub fn validate_choice(
    board: &Board,
    kind: PieceKind,
    from: Square,
    to: Square,
    chosen: Square,
    declared_cost: u32,
    available_bp: u32,
) -> GambitResult<u32> {
    let opts = options(board, kind, from, to);
    let matching = opts
        .iter()
        .find(|opt| opt.square == chosen)
        .ok_or(GambitError::InvalidRetreatPosition)?;
    if matching.cost != declared_cost {
        return Err(GambitError::BpCostMismatch);
    }
    if available_bp < matching.cost {
        return Err(GambitError::InsufficientBp);
    }
    Ok(matching.cost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::core::Color;

    #[test]
    fn rook_retreat_options_are_origin_plus_ray() {
        let mut board = Board::empty();
        board.place_piece(PieceKind::King, Color::White, Square::new(0, 0).unwrap());
        board.place_piece(PieceKind::King, Color::Black, Square::new(7, 7).unwrap());
        let from = Square::new(3, 3).unwrap();
        let to = Square::new(3, 6).unwrap();
        board.place_piece(PieceKind::Rook, Color::White, from);
        board.place_piece(PieceKind::Pawn, Color::Black, to);
        let opts = options(&board, PieceKind::Rook, from, to);
        assert!(opts.iter().any(|o| o.square == from && o.cost == 0));
        assert!(opts.iter().any(|o| o.square == Square::new(3, 4).unwrap() && o.cost == 1));
        assert!(opts.iter().any(|o| o.square == Square::new(3, 5).unwrap() && o.cost == 2));
        assert!(!opts.iter().any(|o| o.square == to));
    }

    #[test]
    fn queen_retreat_after_an_orthogonal_attempt_adds_the_two_diagonals_only() {
        let mut board = Board::empty();
        board.place_piece(PieceKind::King, Color::White, Square::new(0, 0).unwrap());
        board.place_piece(PieceKind::King, Color::Black, Square::new(7, 7).unwrap());
        let from = Square::new(3, 3).unwrap();
        let to = Square::new(3, 6).unwrap();
        board.place_piece(PieceKind::Queen, Color::White, from);
        board.place_piece(PieceKind::Pawn, Color::Black, to);
        let opts = options(&board, PieceKind::Queen, from, to);

        // The attempt was orthogonal (0,1): the two diagonals through the
        // origin are added.
        assert!(opts.iter().any(|o| o.square == Square::new(4, 4).unwrap()));
        assert!(opts.iter().any(|o| o.square == Square::new(4, 2).unwrap()));
        assert!(opts.iter().any(|o| o.square == Square::new(2, 4).unwrap()));
        assert!(opts.iter().any(|o| o.square == Square::new(2, 2).unwrap()));

        // The perpendicular file and the reverse of the attempted rank are
        // NOT added: only the diagonal family belongs to an orthogonal
        // attempt's retreat fan.
        assert!(!opts.iter().any(|o| o.square == Square::new(4, 3).unwrap()));
        assert!(!opts.iter().any(|o| o.square == Square::new(2, 3).unwrap()));
        assert!(!opts.iter().any(|o| o.square == Square::new(3, 2).unwrap()));
    }

    #[test]
    fn queen_retreat_after_a_diagonal_attempt_adds_the_rank_and_file_only() {
        let mut board = Board::empty();
        board.place_piece(PieceKind::King, Color::White, Square::new(0, 7).unwrap());
        board.place_piece(PieceKind::King, Color::Black, Square::new(7, 0).unwrap());
        let from = Square::new(3, 3).unwrap();
        let to = Square::new(6, 6).unwrap();
        board.place_piece(PieceKind::Queen, Color::White, from);
        board.place_piece(PieceKind::Pawn, Color::Black, to);
        let opts = options(&board, PieceKind::Queen, from, to);

        // The attempt was diagonal (1,1): the rank and file through the
        // origin are added.
        assert!(opts.iter().any(|o| o.square == Square::new(4, 3).unwrap()));
        assert!(opts.iter().any(|o| o.square == Square::new(2, 3).unwrap()));
        assert!(opts.iter().any(|o| o.square == Square::new(3, 4).unwrap()));
        assert!(opts.iter().any(|o| o.square == Square::new(3, 2).unwrap()));

        // The other diagonal family is NOT added.
        assert!(!opts.iter().any(|o| o.square == Square::new(4, 2).unwrap()));
        assert!(!opts.iter().any(|o| o.square == Square::new(2, 4).unwrap()));
    }

    #[test]
    fn cost_mismatch_is_rejected() {
        let mut board = Board::empty();
        board.place_piece(PieceKind::King, Color::White, Square::new(0, 0).unwrap());
        board.place_piece(PieceKind::King, Color::Black, Square::new(7, 7).unwrap());
        let from = Square::new(3, 3).unwrap();
        let to = Square::new(3, 6).unwrap();
        board.place_piece(PieceKind::Rook, Color::White, from);
        board.place_piece(PieceKind::Pawn, Color::Black, to);
        let result = validate_choice(&board, PieceKind::Rook, from, to, Square::new(3, 4).unwrap(), 5, 39);
        assert!(matches!(result, Err(GambitError::BpCostMismatch)));
    }
}
