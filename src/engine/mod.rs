//! The top-level game orchestrator: owns the board, BP economy, and
//! duel/retreat sub-state machines; exposes the entire public surface a
//! transport layer drives a game through.

pub mod view;

use crate::chess::board::{Board, MoveKind};
use crate::chess::core::{Color, PieceId, PieceKind, Square};
use crate::config::EngineConfig;
use crate::duel::{DuelOutcome, PendingDuel};
use crate::economy::BpEconomy;
use crate::error::{GambitError, GambitResult};
use crate::retreat::{self, RetreatOption};
use crate::tactics::{self, TacticInstance};

pub use view::GameStateView;

/// Which sub-state-machine is currently live. A pending duel or retreat
/// carries its own state rather than living as loose fields on the engine.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum Phase {
    NormalMove,
    DuelAllocation(PendingDuel),
    TacticalRetreat(PendingRetreat),
    GameOver(GameResult),
}

/// A long-range attacker that lost a duel, awaiting a retreat choice.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct PendingRetreat {
    pub piece: PieceId,
    pub attacker_color: Color,
    pub original_square: Square,
    pub failed_target: Square,
    pub options: Vec<RetreatOption>,
}

/// Why a reason a draw was recorded.
#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DrawReason {
    ThreefoldRepetition,
    FiftyMoveRule,
    Agreement,
}

/// Terminal outcome of a finished game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GameResult {
    Checkmate(Color),
    Stalemate,
    Draw(DrawReason),
    Resignation(Color),
    TimeFlag(Color),
}

/// One committed half-move, append-only and replay-sufficient with the
/// initial position.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct MoveRecord {
    pub number: u32,
    pub color: Color,
    pub kind: MoveKind,
    pub from: Square,
    pub to: Square,
    pub piece_kind: PieceKind,
    pub captured_piece: Option<PieceId>,
    pub promotion: Option<PieceKind>,
    pub duel_outcome: Option<DuelOutcome>,
    pub bp_spent: Option<u32>,
    pub retreat_square: Option<Square>,
    pub retreat_cost: Option<u32>,
    pub check: bool,
    pub tactics_detected: Vec<TacticInstance>,
}

/// Outcome of a successfully accepted [`GameEngine::process_move`].
#[derive(Copy, Clone, Debug)]
pub struct ProcessMoveOutcome {
    pub triggers_duel: bool,
    pub move_kind: MoveKind,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
struct GameState {
    board: Board,
    economy: BpEconomy,
    config: EngineConfig,
    phase: Phase,
    white_session: String,
    black_session: String,
    history: Vec<MoveRecord>,
}

/// Owns a single game from initialization to a terminal result. Every
/// public method is a synchronous, serialized operation; the host must not
/// call into the same engine concurrently from more than one task.
#[derive(Default, Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct GameEngine {
    state: Option<GameState>,
}

impl GameEngine {
    #[must_use]
    pub fn new() -> Self {
        Self { state: None }
    }

    pub fn initialize(
        &mut self,
        white_session: impl Into<String>,
        black_session: impl Into<String>,
        config: Option<EngineConfig>,
    ) -> GambitResult<()> {
        if self.state.is_some() {
            return Err(GambitError::AlreadyInitialized);
        }
        let config = config.unwrap_or_default();
        let economy = BpEconomy::new(config.initial_bp_pool, config.bp_max);
        self.state = Some(GameState {
            board: Board::new_initial(),
            economy,
            config,
            phase: Phase::NormalMove,
            white_session: white_session.into(),
            black_session: black_session.into(),
            history: Vec::new(),
        });
        tracing::info!("game initialized");
        Ok(())
    }

    /// Initializes a game from a custom starting position rather than the
    /// standard one, e.g. a [`crate::snapshot::Scenario`] built for a
    /// puzzle or a test.
    pub fn initialize_from_position(
        &mut self,
        white_session: impl Into<String>,
        black_session: impl Into<String>,
        board: Board,
        economy: BpEconomy,
        config: EngineConfig,
    ) -> GambitResult<()> {
        if self.state.is_some() {
            return Err(GambitError::AlreadyInitialized);
        }
        self.state = Some(GameState {
            board,
            economy,
            config,
            phase: Phase::NormalMove,
            white_session: white_session.into(),
            black_session: black_session.into(),
            history: Vec::new(),
        });
        tracing::info!("game initialized from custom position");
        Ok(())
    }

    fn state(&self) -> GambitResult<&GameState> {
        self.state.as_ref().ok_or(GambitError::NotInitialized)
    }

    fn state_mut(&mut self) -> GambitResult<&mut GameState> {
        self.state.as_mut().ok_or(GambitError::NotInitialized)
    }

    fn color_for_session(state: &GameState, session_id: &str) -> GambitResult<Color> {
        if session_id == state.white_session {
            Ok(Color::White)
        } else if session_id == state.black_session {
            Ok(Color::Black)
        } else {
            Err(GambitError::NotYourSession)
        }
    }

    /// Validates and submits a move. If it's a capture attempt (including
    /// en passant), enters `DuelAllocation` without applying it; otherwise
    /// commits the move immediately.
    pub fn process_move(
        &mut self,
        session_id: &str,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> GambitResult<ProcessMoveOutcome> {
        let state = self.state_mut()?;
        match &state.phase {
            Phase::GameOver(_) => return Err(GambitError::GameOver),
            Phase::NormalMove => {}
            _ => return Err(GambitError::WrongPhase),
        }
        let mover_color = Self::color_for_session(state, session_id)?;
        if mover_color != state.board.side_to_move() {
            return Err(GambitError::NotYourTurn);
        }
        state.board.validate_move(from, to, promotion)?;

        if let Some(defender_id) = state.board.capture_target(from, to) {
            let attacker_id = state.board.piece_id_at(from).expect("validated above");
            let attacker_kind = state.board.piece(attacker_id).kind;
            let defender_kind = state.board.piece(defender_id).kind;
            let move_kind = if attacker_kind == PieceKind::Pawn && to.x != from.x && state.board.piece_at(to).is_none() {
                MoveKind::EnPassant
            } else {
                MoveKind::Capture
            };
            let mut pending = PendingDuel::new(attacker_id, defender_id, mover_color, from, to, attacker_kind, defender_kind);
            pending.promotion = promotion;
            state.phase = Phase::DuelAllocation(pending);
            tracing::debug!(?from, ?to, "capture attempt enters duel allocation");
            return Ok(ProcessMoveOutcome {
                triggers_duel: true,
                move_kind,
            });
        }

        let before = state.board.clone();
        let moved_piece = state.board.piece_id_at(from).expect("validated above");
        let outcome = state.board.make_move(from, to, promotion)?;
        self.finish_half_move(mover_color, moved_piece, &before, outcome.kind, from, to, outcome.captured, promotion, None, None, None)?;
        Ok(ProcessMoveOutcome {
            triggers_duel: false,
            move_kind: outcome.kind,
        })
    }

    /// Submits `amount` BP for the pending duel on behalf of `session_id`'s
    /// side. Resolves the duel once both sides have allocated.
    pub fn process_bp_allocation(&mut self, session_id: &str, amount: u32) -> GambitResult<()> {
        let state = self.state_mut()?;
        let color = Self::color_for_session(state, session_id)?;
        let available = state.economy.bp(color);
        let max_allocation = state.config.max_bp_allocation;
        let Phase::DuelAllocation(pending) = &mut state.phase else {
            return Err(GambitError::WrongPhase);
        };
        if color != pending.attacker_color && color != pending.defender_color() {
            return Err(GambitError::NotAParticipant);
        }
        pending.submit_allocation(color, amount, max_allocation, available)?;

        if !pending.is_ready() {
            return Ok(());
        }
        self.resolve_duel()
    }

    fn resolve_duel(&mut self) -> GambitResult<()> {
        let (pending, outcome, attacker_cost) = {
            let state = self.state_mut()?;
            let Phase::DuelAllocation(pending) = state.phase.clone() else {
                unreachable!("resolve_duel called outside duel phase");
            };
            let (outcome, attacker_cost, defender_cost) = pending.resolve();
            state.economy.spend(pending.attacker_color, attacker_cost);
            state.economy.spend(pending.defender_color(), defender_cost);
            tracing::info!(?outcome, attacker_cost, defender_cost, "duel resolved");
            (pending, outcome, attacker_cost)
        };

        match outcome {
            DuelOutcome::AttackerWins => {
                let state = self.state_mut()?;
                let before = state.board.clone();
                let moved_piece = pending.attacker;
                let move_outcome = state.board.make_move(pending.from, pending.to, pending.promotion)?;
                self.finish_half_move(
                    pending.attacker_color,
                    moved_piece,
                    &before,
                    move_outcome.kind,
                    pending.from,
                    pending.to,
                    move_outcome.captured,
                    pending.promotion,
                    Some(outcome),
                    Some(attacker_cost),
                    None,
                )?;
            }
            DuelOutcome::DefenderWins => {
                if pending.attacker_kind.is_long_range() {
                    let state = self.state_mut()?;
                    let options = retreat::options(&state.board, pending.attacker_kind, pending.from, pending.to);
                    state.phase = Phase::TacticalRetreat(PendingRetreat {
                        piece: pending.attacker,
                        attacker_color: pending.attacker_color,
                        original_square: pending.from,
                        failed_target: pending.to,
                        options,
                    });
                } else {
                    let state = self.state_mut()?;
                    let before = state.board.clone();
                    // No piece moved, but the half-move still completes: advance
                    // the turn counter directly since there's no `make_move` call
                    // to do it for us.
                    state.board.set_move_number(state.board.move_number() + 1);
                    self.finish_half_move(
                        pending.attacker_color,
                        pending.attacker,
                        &before,
                        MoveKind::Normal,
                        pending.from,
                        pending.from,
                        None,
                        None,
                        Some(outcome),
                        Some(attacker_cost),
                        None,
                    )?;
                }
            }
        }
        Ok(())
    }

    /// Commits a chosen retreat square for the pending tactical retreat.
    pub fn process_tactical_retreat(&mut self, session_id: &str, chosen: Square, declared_cost: u32) -> GambitResult<()> {
        let state = self.state_mut()?;
        let Phase::TacticalRetreat(pending) = &state.phase else {
            return Err(GambitError::WrongPhase);
        };
        let color = Self::color_for_session(state, session_id)?;
        if color != pending.attacker_color {
            return Err(GambitError::NotAParticipant);
        }
        let piece_id = pending.piece;
        let original = pending.original_square;
        let failed_target = pending.failed_target;
        let available_bp = state.economy.bp(color);
        let piece_kind = state.board.piece(piece_id).kind;
        let cost = retreat::validate_choice(&state.board, piece_kind, original, failed_target, chosen, declared_cost, available_bp)?;

        state.economy.spend(color, cost);
        let before = state.board.clone();
        state.board.relocate_for_retreat(piece_id, chosen);
        self.finish_half_move(
            color,
            piece_id,
            &before,
            MoveKind::Normal,
            original,
            chosen,
            None,
            None,
            None,
            None,
            Some((chosen, cost)),
        )?;
        Ok(())
    }

    /// Shared tail of every half-move: tactic diffing, BP bonuses, pending
    /// regen commit, history append, terminal-state detection, and turn
    /// switch. Assumes the board mutation (if any) has already happened.
    #[allow(clippy::too_many_arguments)]
    fn finish_half_move(
        &mut self,
        mover_color: Color,
        moved_piece: PieceId,
        before_board: &Board,
        move_kind: MoveKind,
        from: Square,
        to: Square,
        captured: Option<PieceId>,
        promotion: Option<PieceKind>,
        duel_outcome: Option<DuelOutcome>,
        bp_spent: Option<u32>,
        retreat: Option<(Square, u32)>,
    ) -> GambitResult<()> {
        let state = self.state_mut()?;
        let move_number = state.board.move_number();
        let diff = tactics::diff(before_board, &state.board, mover_color, moved_piece);
        let opponent = mover_color.opposite();
        let was_in_check_before = before_board.is_in_check(opponent);
        let check_now = state.board.is_in_check(opponent);
        let new_check = check_now && !was_in_check_before;

        let mut regen = state.config.base_bp_regen;
        regen += u32::try_from(diff.new.len()).unwrap_or(u32::MAX) * state.config.bp_bonus_per_new_tactic;
        if new_check {
            regen += state.config.bp_bonus_check;
        }
        state.economy.add_pending_regen(mover_color, regen);
        state.economy.commit_pending_regen(mover_color);

        state.history.push(MoveRecord {
            number: move_number,
            color: mover_color,
            kind: move_kind,
            from,
            to,
            piece_kind: state.board.piece(moved_piece).kind,
            captured_piece: captured,
            promotion,
            duel_outcome,
            bp_spent,
            retreat_square: retreat.map(|(square, _)| square),
            retreat_cost: retreat.map(|(_, cost)| cost),
            check: check_now,
            tactics_detected: diff.new,
        });

        if !state.board.has_any_legal_move(opponent) {
            let result = if check_now {
                GameResult::Checkmate(mover_color)
            } else {
                GameResult::Stalemate
            };
            tracing::info!(?result, "game over");
            state.phase = Phase::GameOver(result);
        } else {
            state.phase = Phase::NormalMove;
        }
        Ok(())
    }

    /// Records a resignation, ending the game immediately.
    pub fn resign(&mut self, session_id: &str) -> GambitResult<()> {
        let state = self.state_mut()?;
        if matches!(state.phase, Phase::GameOver(_)) {
            return Err(GambitError::GameOver);
        }
        let color = Self::color_for_session(state, session_id)?;
        state.phase = Phase::GameOver(GameResult::Resignation(color.opposite()));
        Ok(())
    }

    /// A role-filtered view of the game for the caller's session (or a
    /// spectator view if the session matches neither player).
    pub fn create_state_view(&self, session_id: &str) -> GambitResult<GameStateView> {
        let state = self.state()?;
        let viewer = if session_id == state.white_session {
            view::Viewer::Player(Color::White)
        } else if session_id == state.black_session {
            view::Viewer::Player(Color::Black)
        } else {
            view::Viewer::Spectator
        };
        Ok(view::build(state_view_source(state), viewer))
    }
}

fn state_view_source(state: &GameState) -> view::StateSource<'_> {
    view::StateSource {
        board: &state.board,
        economy: &state.economy,
        phase: &state.phase,
        history: &state.history,
    }
}
