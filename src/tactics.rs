//! Tactic detection: forks, pins, skewers and discovered
//! attacks/checks on a board snapshot, plus the before/after diff that
//! isolates genuinely *new* motifs for Battle Points reward purposes.

use std::collections::HashSet;

use itertools::Itertools;

use crate::chess::board::{Board, bishop_dirs, queen_dirs, rook_dirs};
use crate::chess::core::{Color, PieceId, PieceKind};

/// The five motif categories this module detects.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum TacticKind {
    Fork,
    Pin,
    Skewer,
    DiscoveredAttack,
    DiscoveredCheck,
}

/// One instance of a motif, keyed by `(kind, attacker, sorted victims)` —
/// this is exactly the key used to tell new motifs from pre-existing ones.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TacticInstance {
    pub kind: TacticKind,
    pub attacker: PieceId,
    pub victims: Vec<PieceId>,
}

impl TacticInstance {
    fn new(kind: TacticKind, attacker: PieceId, mut victims: Vec<PieceId>) -> Self {
        victims.sort_unstable();
        Self { kind, attacker, victims }
    }
}

/// Result of diffing two snapshots.
#[derive(Clone, Debug, Default)]
pub struct TacticDiff {
    pub new: Vec<TacticInstance>,
    pub pre_existing: Vec<TacticInstance>,
}

/// A value used only to rank pin/skewer participants; the king is treated
/// as more valuable than any material piece since it can never legally be
/// the "closer" half of a pin/skewer target pair without ending the game.
fn rank_value(kind: PieceKind) -> u32 {
    if kind == PieceKind::King {
        u32::MAX
    } else {
        kind.classical_value()
    }
}

fn detect_forks(board: &Board, mover: Color) -> Vec<TacticInstance> {
    board
        .pieces_by_color(mover)
        .filter_map(|piece| {
            let victims: Vec<PieceId> = board
                .reach_of(piece.id)
                .into_iter()
                .filter_map(|square| board.piece_at(square))
                .filter(|target| target.color == mover.opposite())
                .map(|target| target.id)
                .collect();
            (victims.len() >= 2).then(|| TacticInstance::new(TacticKind::Fork, piece.id, victims))
        })
        .collect()
}

fn slider_directions(kind: PieceKind) -> Vec<(i8, i8)> {
    match kind {
        PieceKind::Bishop => bishop_dirs().to_vec(),
        PieceKind::Rook => rook_dirs().to_vec(),
        PieceKind::Queen => queen_dirs().to_vec(),
        _ => Vec::new(),
    }
}

fn detect_pins_and_skewers(board: &Board, mover: Color) -> Vec<TacticInstance> {
    let mut result = Vec::new();
    for piece in board.pieces_by_color(mover) {
        if !piece.kind.is_long_range() {
            continue;
        }
        let Some(from) = piece.position else { continue };
        for dir in slider_directions(piece.kind) {
            let mut occupants = board.ray_occupants(from, dir).into_iter();
            // The first two occupants in ray order, regardless of color: a
            // friendly piece blocking the line must stop the scan here,
            // not be skipped over in search of an enemy further down.
            let Some((_, near_id)) = occupants.next() else {
                continue;
            };
            if board.piece(near_id).color != mover.opposite() {
                continue;
            }
            let Some((_, far_id)) = occupants.next() else {
                continue;
            };
            if board.piece(far_id).color != mover.opposite() {
                continue;
            }
            let near_value = rank_value(board.piece(near_id).kind);
            let far_value = rank_value(board.piece(far_id).kind);
            if far_value > near_value {
                result.push(TacticInstance::new(TacticKind::Pin, piece.id, vec![near_id, far_id]));
            } else if near_value > far_value {
                result.push(TacticInstance::new(
                    TacticKind::Skewer,
                    piece.id,
                    vec![near_id, far_id],
                ));
            }
        }
    }
    result
}

fn detect_discovered(board: &Board, mover: Color, exclude: Option<PieceId>) -> Vec<TacticInstance> {
    let mut result = Vec::new();
    for piece in board.pieces_by_color(mover) {
        if !piece.kind.is_long_range() || Some(piece.id) == exclude {
            continue;
        }
        let victims: Vec<_> = board
            .reach_of(piece.id)
            .into_iter()
            .filter_map(|square| board.piece_at(square))
            .filter(|target| target.color == mover.opposite())
            .collect();
        for victim in victims {
            let kind = if victim.kind == PieceKind::King {
                TacticKind::DiscoveredCheck
            } else {
                TacticKind::DiscoveredAttack
            };
            result.push(TacticInstance::new(kind, piece.id, vec![victim.id]));
        }
    }
    result
}

/// Every motif instance present in `board` from `mover`'s perspective.
/// `exclude_from_discovered` should be the id of the piece that produced
/// this snapshot (if any) — discovered attacks/checks are by definition
/// credited to a piece *other* than the one that just moved.
#[must_use]
pub fn detect(board: &Board, mover: Color, exclude_from_discovered: Option<PieceId>) -> HashSet<TacticInstance> {
    let mut all = detect_forks(board, mover);
    all.extend(detect_pins_and_skewers(board, mover));
    all.extend(detect_discovered(board, mover, exclude_from_discovered));
    all.into_iter().collect()
}

/// Diffs the motifs present in `before` against `after`, both from
/// `mover`'s perspective, using the canonical `(kind, attacker, victims)`
/// key. `moved_piece` excludes that piece from discovered
/// attack/check credit on both sides of the diff.
#[must_use]
pub fn diff(before: &Board, after: &Board, mover: Color, moved_piece: PieceId) -> TacticDiff {
    let before_set = detect(before, mover, Some(moved_piece));
    let after_set = detect(after, mover, Some(moved_piece));
    let new = after_set.difference(&before_set).cloned().collect_vec();
    let pre_existing = after_set.intersection(&before_set).cloned().collect_vec();
    TacticDiff { new, pre_existing }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::core::Square;

    #[test]
    fn knight_fork_on_king_and_rook() {
        let mut board = Board::empty();
        board.place_piece(PieceKind::King, Color::White, Square::new(4, 0).unwrap());
        board.place_piece(PieceKind::King, Color::Black, Square::new(6, 1).unwrap());
        board.place_piece(PieceKind::Rook, Color::Black, Square::new(7, 4).unwrap());
        let knight = board.place_piece(PieceKind::Knight, Color::White, Square::new(5, 3).unwrap());
        let forks: Vec<_> = detect_forks(&board, Color::White);
        assert_eq!(forks.len(), 1);
        assert_eq!(forks[0].attacker, knight);
        assert_eq!(forks[0].victims.len(), 2);
    }

    #[test]
    fn pin_of_knight_against_king() {
        let mut board = Board::empty();
        board.place_piece(PieceKind::King, Color::White, Square::new(4, 0).unwrap());
        let rook = board.place_piece(PieceKind::Rook, Color::White, Square::new(0, 7).unwrap());
        board.place_piece(PieceKind::Knight, Color::Black, Square::new(0, 3).unwrap());
        board.place_piece(PieceKind::King, Color::Black, Square::new(0, 0).unwrap());
        let pins = detect_pins_and_skewers(&board, Color::White);
        assert_eq!(pins.len(), 1);
        assert_eq!(pins[0].kind, TacticKind::Pin);
        assert_eq!(pins[0].attacker, rook);
    }

    #[test]
    fn a_friendly_piece_blocking_the_ray_prevents_a_pin() {
        let mut board = Board::empty();
        board.place_piece(PieceKind::King, Color::White, Square::new(4, 0).unwrap());
        board.place_piece(PieceKind::Rook, Color::White, Square::new(0, 7).unwrap());
        // White's own pawn sits between the rook and the black pieces further
        // down the file, so there is no pin: the rook's line is blocked.
        board.place_piece(PieceKind::Pawn, Color::White, Square::new(0, 3).unwrap());
        board.place_piece(PieceKind::Knight, Color::Black, Square::new(0, 2).unwrap());
        board.place_piece(PieceKind::King, Color::Black, Square::new(0, 0).unwrap());
        let pins = detect_pins_and_skewers(&board, Color::White);
        assert!(pins.is_empty());
    }
}
