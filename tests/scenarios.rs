//! End-to-end scenarios driven entirely through `GameEngine`'s public
//! surface: a full move/duel/retreat turn cycle the way a transport layer
//! would drive it.

use gambit_chess_core::chess::core::{Color, PieceKind, Square};
use gambit_chess_core::config::EngineConfig;
use gambit_chess_core::engine::{GameEngine, GameResult};
use gambit_chess_core::error::GambitError;
use gambit_chess_core::snapshot::Scenario;

fn sq(x: u8, y: u8) -> Square {
    Square::new(x, y).unwrap()
}

fn new_engine() -> GameEngine {
    let mut engine = GameEngine::new();
    engine.initialize("white", "black", None).unwrap();
    engine
}

#[test]
fn capture_attempt_enters_duel_and_attacker_wins_takes_the_square() {
    let mut engine = new_engine();
    // 1. e4 e5 2. Nf3 Nc6 3. Bb5 ... set up a simple capturable knight.
    engine.process_move("white", sq(4, 1), sq(4, 3), None).unwrap();
    engine.process_move("black", sq(4, 6), sq(4, 4), None).unwrap();
    engine.process_move("white", sq(6, 0), sq(5, 2), None).unwrap();
    engine.process_move("black", sq(1, 7), sq(2, 5), None).unwrap();

    let outcome = engine.process_move("white", sq(5, 2), sq(4, 4), None).unwrap();
    assert!(outcome.triggers_duel);

    // White allocates more than Black, so the attacker wins the square.
    engine.process_bp_allocation("white", 3).unwrap();
    engine.process_bp_allocation("black", 1).unwrap();

    let view = engine.create_state_view("white").unwrap();
    let knight_on_e5 = view
        .pieces
        .iter()
        .find(|p| p.position == Some(sq(4, 4)))
        .expect("attacker occupies the contested square");
    assert_eq!(knight_on_e5.kind, PieceKind::Knight);
    assert_eq!(knight_on_e5.color, Color::White);
    assert_eq!(view.current_turn, Color::Black);
}

#[test]
fn capture_attempt_defender_wins_non_long_range_attacker_stays_put() {
    let mut engine = new_engine();
    engine.process_move("white", sq(4, 1), sq(4, 3), None).unwrap();
    engine.process_move("black", sq(4, 6), sq(4, 4), None).unwrap();
    engine.process_move("white", sq(6, 0), sq(5, 2), None).unwrap();
    engine.process_move("black", sq(1, 7), sq(2, 5), None).unwrap();

    engine.process_move("white", sq(5, 2), sq(4, 4), None).unwrap();
    // Black outbids: the knight fails to take and stays on its origin.
    engine.process_bp_allocation("white", 1).unwrap();
    engine.process_bp_allocation("black", 3).unwrap();

    let view = engine.create_state_view("white").unwrap();
    assert!(view.pieces.iter().any(|p| p.position == Some(sq(5, 2)) && p.kind == PieceKind::Knight));
    assert!(view.pieces.iter().any(|p| p.position == Some(sq(4, 4)) && p.kind == PieceKind::Pawn));
    assert_eq!(view.current_turn, Color::Black);
}

#[test]
fn long_range_attacker_losing_a_duel_must_retreat() {
    let (board, economy) = Scenario::new()
        .piece(PieceKind::King, Color::White, sq(4, 0))
        .piece(PieceKind::King, Color::Black, sq(4, 7))
        .piece(PieceKind::Rook, Color::White, sq(0, 3))
        .piece(PieceKind::Pawn, Color::Black, sq(4, 3))
        .build(Color::White, EngineConfig::default());

    let mut engine = GameEngine::new();
    engine
        .initialize_from_position("white", "black", board, economy, EngineConfig::default())
        .unwrap();

    let outcome = engine.process_move("white", sq(0, 3), sq(4, 3), None).unwrap();
    assert!(outcome.triggers_duel);

    engine.process_bp_allocation("white", 1).unwrap();
    engine.process_bp_allocation("black", 1).unwrap();

    let view = engine.create_state_view("white").unwrap();
    let retreat_cost = match &view.phase {
        gambit_chess_core::engine::view::PhaseView::TacticalRetreat(r) => {
            let options = r.options.as_ref().expect("attacker's own view sees options");
            options.iter().find(|o| o.square == sq(2, 3)).unwrap().cost
        }
        other => panic!("expected tactical retreat phase, got {other:?}"),
    };
    assert_eq!(retreat_cost, 2);

    engine.process_tactical_retreat("white", sq(2, 3), retreat_cost).unwrap();
    let view = engine.create_state_view("white").unwrap();
    assert!(view.pieces.iter().any(|p| p.position == Some(sq(2, 3)) && p.kind == PieceKind::Rook));
    assert_eq!(view.current_turn, Color::Black);
}

#[test]
fn retreat_cost_mismatch_is_rejected() {
    let (board, economy) = Scenario::new()
        .piece(PieceKind::King, Color::White, sq(4, 0))
        .piece(PieceKind::King, Color::Black, sq(4, 7))
        .piece(PieceKind::Rook, Color::White, sq(0, 3))
        .piece(PieceKind::Pawn, Color::Black, sq(4, 3))
        .build(Color::White, EngineConfig::default());

    let mut engine = GameEngine::new();
    engine
        .initialize_from_position("white", "black", board, economy, EngineConfig::default())
        .unwrap();

    engine.process_move("white", sq(0, 3), sq(4, 3), None).unwrap();
    engine.process_bp_allocation("white", 1).unwrap();
    engine.process_bp_allocation("black", 1).unwrap();

    let result = engine.process_tactical_retreat("white", sq(2, 3), 99);
    assert!(matches!(result, Err(GambitError::BpCostMismatch)));
}

#[test]
fn fools_mate_ends_the_game_in_checkmate() {
    let mut engine = new_engine();
    engine.process_move("white", sq(5, 1), sq(5, 2), None).unwrap();
    engine.process_move("black", sq(4, 6), sq(4, 4), None).unwrap();
    engine.process_move("white", sq(6, 1), sq(6, 3), None).unwrap();
    engine.process_move("black", sq(3, 7), sq(7, 3), None).unwrap();

    let view = engine.create_state_view("white").unwrap();
    match view.phase {
        gambit_chess_core::engine::view::PhaseView::GameOver(GameResult::Checkmate(Color::Black)) => {}
        other => panic!("expected white to be checkmated, got {other:?}"),
    }
}

#[test]
fn stalemate_scenario_reports_no_legal_moves_for_the_side_to_move() {
    let (board, economy) = Scenario::new()
        .piece(PieceKind::King, Color::Black, sq(0, 7))
        .piece(PieceKind::King, Color::White, sq(1, 5))
        .piece(PieceKind::Queen, Color::White, sq(2, 6))
        .build(Color::White, EngineConfig::default());

    let mut engine = GameEngine::new();
    engine
        .initialize_from_position("white", "black", board, economy, EngineConfig::default())
        .unwrap();

    // Kb6-c6 boxes the black king on a8 into stalemate: a7, b7 and b8 are
    // all covered by the queen on c7 or the king on c6, and black is not
    // itself in check.
    engine.process_move("white", sq(1, 5), sq(2, 5), None).unwrap();

    let view = engine.create_state_view("black").unwrap();
    match view.phase {
        gambit_chess_core::engine::view::PhaseView::GameOver(GameResult::Stalemate) => {}
        other => panic!("expected stalemate, got {other:?}"),
    }
}

#[test]
fn a_fork_detected_once_is_not_rewarded_again_on_a_later_unrelated_move() {
    let (board, economy) = Scenario::new()
        .piece(PieceKind::King, Color::White, sq(4, 0))
        .piece(PieceKind::King, Color::Black, sq(6, 1))
        .piece(PieceKind::Rook, Color::Black, sq(7, 4))
        .piece(PieceKind::Knight, Color::White, sq(5, 3))
        .piece(PieceKind::Pawn, Color::White, sq(0, 1))
        .build(Color::White, EngineConfig::default());

    let mut engine = GameEngine::new();
    engine
        .initialize_from_position("white", "black", board, economy, EngineConfig::default())
        .unwrap();

    // White's knight already forks king and rook before any move; a quiet
    // pawn push shouldn't be credited with "creating" that fork.
    engine.process_move("white", sq(0, 1), sq(0, 2), None).unwrap();
    let view = engine.create_state_view("white").unwrap();
    let last = view.move_history.last().unwrap();
    assert!(last.tactics_detected.is_empty());
}
