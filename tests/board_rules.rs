//! Movement/check/castling/promotion edge cases driven through `Board`'s
//! public surface directly, independent of the duel/retreat/BP layers.

use gambit_chess_core::chess::board::{Board, CastlingRights, MoveKind};
use gambit_chess_core::chess::core::{Color, PieceKind, Square};
use gambit_chess_core::error::GambitError;

fn sq(x: u8, y: u8) -> Square {
    Square::new(x, y).unwrap()
}

#[test]
fn kingside_castle_moves_both_king_and_rook() {
    let mut board = Board::empty();
    board.place_piece(PieceKind::King, Color::White, sq(4, 0));
    board.place_piece(PieceKind::Rook, Color::White, sq(7, 0));
    board.place_piece(PieceKind::King, Color::Black, sq(4, 7));
    board.set_castling_rights(CastlingRights::all());

    let outcome = board.make_move(sq(4, 0), sq(6, 0), None).unwrap();
    assert_eq!(outcome.kind, MoveKind::Castle);
    assert!(board.piece_at(sq(6, 0)).is_some_and(|p| p.kind == PieceKind::King));
    assert!(board.piece_at(sq(5, 0)).is_some_and(|p| p.kind == PieceKind::Rook));
    assert!(board.piece_at(sq(4, 0)).is_none());
    assert!(board.piece_at(sq(7, 0)).is_none());
}

#[test]
fn castling_through_an_attacked_square_is_rejected() {
    let mut board = Board::empty();
    board.place_piece(PieceKind::King, Color::White, sq(4, 0));
    board.place_piece(PieceKind::Rook, Color::White, sq(7, 0));
    board.place_piece(PieceKind::King, Color::Black, sq(4, 7));
    board.set_castling_rights(CastlingRights::all());
    // Rook attacks f1, the square the king must pass through.
    board.place_piece(PieceKind::Rook, Color::Black, sq(5, 5));

    let result = board.validate_move(sq(4, 0), sq(6, 0), None);
    assert!(matches!(result, Err(GambitError::IllegalMove { .. })));
}

#[test]
fn castling_rights_are_revoked_once_the_rook_has_moved() {
    let mut board = Board::empty();
    board.place_piece(PieceKind::King, Color::White, sq(4, 0));
    board.place_piece(PieceKind::Rook, Color::White, sq(7, 0));
    board.place_piece(PieceKind::King, Color::Black, sq(4, 7));
    board.set_castling_rights(CastlingRights::all());

    board.make_move(sq(7, 0), sq(7, 3), None).unwrap();
    board.make_move(sq(4, 7), sq(4, 6), None).unwrap();

    let result = board.validate_move(sq(4, 0), sq(6, 0), None);
    assert!(matches!(result, Err(GambitError::IllegalMove { .. })));
}

#[test]
fn pawn_reaching_the_last_rank_must_promote_to_a_legal_piece() {
    let mut board = Board::empty();
    board.place_piece(PieceKind::King, Color::White, sq(0, 0));
    board.place_piece(PieceKind::King, Color::Black, sq(7, 7));
    board.place_piece(PieceKind::Pawn, Color::White, sq(3, 6));

    let outcome = board.make_move(sq(3, 6), sq(3, 7), Some(PieceKind::Queen)).unwrap();
    assert_eq!(outcome.kind, MoveKind::Promotion);
    assert!(board.piece_at(sq(3, 7)).is_some_and(|p| p.kind == PieceKind::Queen && p.color == Color::White));
}

#[test]
fn promoting_to_a_king_is_rejected() {
    let mut board = Board::empty();
    board.place_piece(PieceKind::King, Color::White, sq(0, 0));
    board.place_piece(PieceKind::King, Color::Black, sq(7, 7));
    board.place_piece(PieceKind::Pawn, Color::White, sq(3, 6));

    let result = board.validate_move(sq(3, 6), sq(3, 7), Some(PieceKind::King));
    assert!(result.is_err());
}

#[test]
fn sliding_piece_cannot_jump_over_a_blocker() {
    let mut board = Board::empty();
    board.place_piece(PieceKind::King, Color::White, sq(0, 0));
    board.place_piece(PieceKind::King, Color::Black, sq(7, 7));
    board.place_piece(PieceKind::Rook, Color::White, sq(4, 0));
    board.place_piece(PieceKind::Pawn, Color::White, sq(4, 3));

    let result = board.validate_move(sq(4, 0), sq(4, 6), None);
    assert!(matches!(result, Err(GambitError::IllegalMove { .. })));
}

#[test]
fn en_passant_capture_removes_the_passed_pawn_not_the_destination_square() {
    let mut board = Board::empty();
    board.place_piece(PieceKind::King, Color::White, sq(0, 0));
    board.place_piece(PieceKind::King, Color::Black, sq(7, 7));
    board.place_piece(PieceKind::Pawn, Color::White, sq(4, 4));
    board.place_piece(PieceKind::Pawn, Color::Black, sq(3, 6));
    board.set_move_number(2);

    board.make_move(sq(3, 6), sq(3, 4), None).unwrap();
    assert_eq!(board.en_passant_target(), Some(sq(3, 5)));

    let captured = board.capture_target(sq(4, 4), sq(3, 5));
    assert!(captured.is_some());

    let outcome = board.make_move(sq(4, 4), sq(3, 5), None).unwrap();
    assert_eq!(outcome.kind, MoveKind::EnPassant);
    assert!(board.piece_at(sq(3, 4)).is_none());
    assert!(board.piece_at(sq(3, 5)).is_some_and(|p| p.color == Color::White));
}
