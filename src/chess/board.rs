//! The board model: piece placement, move legality/execution, and check
//! detection.
//!
//! `Board` exposes a minimal query surface (`piece_at`, `pieces_by_color`,
//! `king_position`, `clone`) and check detection is implemented purely in
//! terms of that surface, so there's no separate detector type and no
//! cyclic dependency between "what moves are legal" and "is the king safe".

use arrayvec::ArrayVec;
use bitflags::bitflags;

use crate::chess::core::{BOARD_WIDTH, Color, Piece, PieceId, PieceKind, Square};
use crate::error::GambitError;

bitflags! {
    /// Which castling moves are still (geometrically, ignoring check)
    /// available, tracked by king/rook moves and rook captures.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
    pub struct CastlingRights: u8 {
        const WHITE_KINGSIDE  = 0b0001;
        const WHITE_QUEENSIDE = 0b0010;
        const BLACK_KINGSIDE  = 0b0100;
        const BLACK_QUEENSIDE = 0b1000;
    }
}

/// The kind of a committed half-move (committed half-move record's `type`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MoveKind {
    Normal,
    Capture,
    Castle,
    EnPassant,
    Promotion,
}

/// Result of a successfully applied [`Board::make_move`].
#[derive(Clone, Debug)]
pub struct MoveOutcome {
    pub kind: MoveKind,
    /// Id of the captured piece, if any.
    pub captured: Option<PieceId>,
    /// Whether this move places the opponent (now to move) in check.
    pub check: bool,
}

/// Bookkeeping for the immediately preceding half-move, used only to derive
/// en passant eligibility from the last moved piece's history rather than
/// storing it as a separate field.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
struct LastMove {
    piece_id: PieceId,
    from: Square,
    to: Square,
    was_pawn_double_step: bool,
}

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];
const KING_OFFSETS: [(i8, i8); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];
const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const ROOK_DIRS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// The four diagonal ray directions, shared by this board's own
/// attacked-squares computation, [`crate::tactics`]'s pin/skewer/discovered-
/// attack detection, and [`crate::retreat`]'s queen retreat extension.
#[must_use]
pub fn bishop_dirs() -> [(i8, i8); 4] {
    BISHOP_DIRS
}

/// The four orthogonal ray directions, shared the same way as
/// [`bishop_dirs`].
#[must_use]
pub fn rook_dirs() -> [(i8, i8); 4] {
    ROOK_DIRS
}

/// All eight ray directions: [`bishop_dirs`] followed by [`rook_dirs`].
#[must_use]
pub fn queen_dirs() -> [(i8, i8); 8] {
    [
        BISHOP_DIRS[0],
        BISHOP_DIRS[1],
        BISHOP_DIRS[2],
        BISHOP_DIRS[3],
        ROOK_DIRS[0],
        ROOK_DIRS[1],
        ROOK_DIRS[2],
        ROOK_DIRS[3],
    ]
}

/// The chess board: piece placement, the capture list, and the half-move
/// counter. Owns no concept of Battle Points, duels or retreats — those
/// are layered on top by [`crate::engine::GameEngine`], which applies
/// moves directly rather than routing them back through a duel check.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Board {
    /// All pieces ever created, indexed by [`PieceId`]; never shrinks.
    pieces: Vec<Piece>,
    /// Square occupancy, `squares[y * 8 + x]`.
    squares: Vec<Option<PieceId>>,
    /// Ids of captured pieces, in capture order.
    captures: Vec<PieceId>,
    /// 1-based; increments after each executed half-move.
    move_number: u32,
    castling_rights: CastlingRights,
    last_move: Option<LastMove>,
}

fn index_of(square: Square) -> usize {
    usize::from(square.y) * usize::from(BOARD_WIDTH) + usize::from(square.x)
}

impl Board {
    /// Builds the standard initial position.
    #[must_use]
    pub fn new_initial() -> Self {
        let mut pieces = Vec::with_capacity(32);
        let mut squares = vec![None; 64];
        let mut push = |pieces: &mut Vec<Piece>, kind, color, square: Square| {
            let id = pieces.len() as PieceId;
            pieces.push(Piece::new(id, kind, color, square));
            squares[index_of(square)] = Some(id);
        };

        let back_rank = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        for (color, rank, pawn_rank) in [(Color::White, 0u8, 1u8), (Color::Black, 7u8, 6u8)] {
            for (x, kind) in back_rank.iter().enumerate() {
                push(
                    &mut pieces,
                    *kind,
                    color,
                    Square::new(x as u8, rank).expect("on board"),
                );
            }
            for x in 0..BOARD_WIDTH {
                push(
                    &mut pieces,
                    PieceKind::Pawn,
                    color,
                    Square::new(x, pawn_rank).expect("on board"),
                );
            }
        }

        Self {
            pieces,
            squares,
            captures: Vec::new(),
            move_number: 1,
            castling_rights: CastlingRights::all(),
            last_move: None,
        }
    }

    /// Builds an empty board with no pieces, for deterministic scenario
    /// construction (used by `crate::snapshot::Scenario`).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            pieces: Vec::new(),
            squares: vec![None; 64],
            captures: Vec::new(),
            move_number: 1,
            castling_rights: CastlingRights::empty(),
            last_move: None,
        }
    }

    /// Places a new, unmoved piece on the board; used only by scenario
    /// construction, never mid-game.
    pub fn place_piece(&mut self, kind: PieceKind, color: Color, square: Square) -> PieceId {
        let id = self.pieces.len() as PieceId;
        self.pieces.push(Piece::new(id, kind, color, square));
        self.squares[index_of(square)] = Some(id);
        id
    }

    #[must_use]
    pub fn move_number(&self) -> u32 {
        self.move_number
    }

    /// Overrides the move counter, used only by scenario construction to
    /// pick which side is to move.
    pub fn set_move_number(&mut self, move_number: u32) {
        self.move_number = move_number;
    }

    /// Overrides castling rights, used only by scenario construction;
    /// `Board::empty()` otherwise starts with none.
    pub fn set_castling_rights(&mut self, rights: CastlingRights) {
        self.castling_rights = rights;
    }

    /// The side to move, derived from the move counter.
    #[must_use]
    pub fn side_to_move(&self) -> Color {
        if self.move_number % 2 == 1 {
            Color::White
        } else {
            Color::Black
        }
    }

    #[must_use]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    #[must_use]
    pub fn captures(&self) -> &[PieceId] {
        &self.captures
    }

    #[must_use]
    pub fn piece(&self, id: PieceId) -> &Piece {
        &self.pieces[id as usize]
    }

    #[must_use]
    pub fn piece_at(&self, square: Square) -> Option<&Piece> {
        self.squares[index_of(square)].map(|id| self.piece(id))
    }

    #[must_use]
    pub fn piece_id_at(&self, square: Square) -> Option<PieceId> {
        self.squares[index_of(square)]
    }

    /// All non-captured pieces of `color`.
    pub fn pieces_by_color(&self, color: Color) -> impl Iterator<Item = &Piece> {
        self.pieces
            .iter()
            .filter(move |p| p.color == color && !p.is_captured())
    }

    #[must_use]
    pub fn king_position(&self, color: Color) -> Square {
        self.pieces_by_color(color)
            .find(|p| p.kind == PieceKind::King)
            .and_then(|p| p.position)
            .expect("exactly one king per color exists throughout a game")
    }

    /// Square behind a pawn that just advanced two squares, if the capturing
    /// pawn stands adjacent to it right now. Derived fresh from
    /// [`Board::last_move`]'s bookkeeping, never stored as independent state
    #[must_use]
    pub fn en_passant_target(&self) -> Option<Square> {
        let last = self.last_move.as_ref()?;
        if !last.was_pawn_double_step {
            return None;
        }
        let mover = self.piece(last.piece_id);
        if mover.is_captured() {
            return None;
        }
        let direction = mover.color.pawn_direction();
        Square::new(last.to.x, (i16::from(last.to.y) - i16::from(direction)) as u8).ok()
    }

    /// Squares strictly between `from` and `to` along a shared rank, file or
    /// diagonal. Empty if the squares are not aligned or adjacent.
    fn ray_between(from: Square, to: Square) -> Vec<Square> {
        let dx = i16::from(to.x) - i16::from(from.x);
        let dy = i16::from(to.y) - i16::from(from.y);
        if dx == 0 && dy == 0 {
            return Vec::new();
        }
        if dx != 0 && dy != 0 && dx.abs() != dy.abs() {
            return Vec::new();
        }
        let step_x = dx.signum() as i8;
        let step_y = dy.signum() as i8;
        let mut squares = Vec::new();
        let mut cur = from;
        loop {
            let Some(next) = cur.offset(step_x, step_y) else {
                break;
            };
            if next == to {
                break;
            }
            squares.push(next);
            cur = next;
        }
        squares
    }

    fn is_path_clear(&self, from: Square, to: Square) -> bool {
        Self::ray_between(from, to)
            .iter()
            .all(|square| self.piece_at(*square).is_none())
    }

    /// Squares a piece on `square` threatens, for check/attack purposes.
    /// Distinct from legal move generation: pawns only threaten their
    /// diagonals (never the forward square), and sliders stop at, but
    /// include, the first occupied square.
    fn attacked_squares_from(&self, square: Square, kind: PieceKind, color: Color) -> Vec<Square> {
        match kind {
            PieceKind::Pawn => {
                let dir = color.pawn_direction();
                [-1i8, 1]
                    .into_iter()
                    .filter_map(|dx| square.offset(dx, dir))
                    .collect()
            }
            PieceKind::Knight => KNIGHT_OFFSETS
                .into_iter()
                .filter_map(|(dx, dy)| square.offset(dx, dy))
                .collect(),
            PieceKind::King => KING_OFFSETS
                .into_iter()
                .filter_map(|(dx, dy)| square.offset(dx, dy))
                .collect(),
            PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen => {
                let dirs: Vec<(i8, i8)> = match kind {
                    PieceKind::Bishop => bishop_dirs().to_vec(),
                    PieceKind::Rook => rook_dirs().to_vec(),
                    _ => queen_dirs().to_vec(),
                };
                let mut result = Vec::new();
                for (dx, dy) in dirs {
                    let mut cur = square;
                    while let Some(next) = cur.offset(dx, dy) {
                        result.push(next);
                        if self.piece_at(next).is_some() {
                            break;
                        }
                        cur = next;
                    }
                }
                result
            }
        }
    }

    /// Whether `square` is attacked by any piece of `by_color`.
    #[must_use]
    pub fn is_square_attacked(&self, square: Square, by_color: Color) -> bool {
        self.attackers_of(square, by_color).next().is_some()
    }

    /// Ids of every piece of `by_color` that attacks `square`.
    pub fn attackers_of(&self, square: Square, by_color: Color) -> impl Iterator<Item = PieceId> + '_ {
        self.pieces_by_color(by_color).filter_map(move |p| {
            let from = p.position.expect("filtered to non-captured");
            self.attacked_squares_from(from, p.kind, p.color)
                .contains(&square)
                .then_some(p.id)
        })
    }

    #[must_use]
    pub fn is_in_check(&self, color: Color) -> bool {
        self.is_square_attacked(self.king_position(color), color.opposite())
    }

    /// Squares `piece_id` attacks or could move to (ignoring self-check),
    /// used by [`crate::tactics`] to detect forks/pins/skewers.
    #[must_use]
    pub fn reach_of(&self, piece_id: PieceId) -> Vec<Square> {
        let piece = self.piece(piece_id);
        let Some(from) = piece.position else {
            return Vec::new();
        };
        self.attacked_squares_from(from, piece.kind, piece.color)
    }

    /// The occupied squares walking from `from` in direction `(dx, dy)`, in
    /// order, not stopping at the first one. Used by [`crate::tactics`] to
    /// find the first two pieces on a ray (pin/skewer detection) and by
    /// [`crate::retreat`] to enumerate empty squares along a ray.
    #[must_use]
    pub fn ray_occupants(&self, from: Square, dir: (i8, i8)) -> Vec<(Square, PieceId)> {
        let mut result = Vec::new();
        let mut cur = from;
        while let Some(next) = cur.offset(dir.0, dir.1) {
            if let Some(id) = self.piece_id_at(next) {
                result.push((next, id));
            }
            cur = next;
        }
        result
    }

    /// The empty squares walking from `from` in direction `(dx, dy)`, in
    /// order, stopping at (and excluding) the first occupied square.
    #[must_use]
    pub fn empty_squares_along(&self, from: Square, dir: (i8, i8)) -> Vec<Square> {
        let mut result = Vec::new();
        let mut cur = from;
        while let Some(next) = cur.offset(dir.0, dir.1) {
            if self.piece_at(next).is_some() {
                break;
            }
            result.push(next);
            cur = next;
        }
        result
    }

    fn validate_destination(&self, from: Square, to: Square, mover_color: Color) -> Result<(), GambitError> {
        if let Some(target) = self.piece_at(to) {
            if target.color == mover_color {
                return Err(GambitError::IllegalMove { from, to });
            }
        }
        Ok(())
    }

    /// Geometric (not check-aware) legality of a candidate move, shared by
    /// [`Board::is_valid_move`] and scenario-building sanity checks.
    fn geometry_legal(&self, from: Square, to: Square, promotion: Option<PieceKind>) -> Result<(), GambitError> {
        let Some(piece) = self.piece_at(from) else {
            return Err(GambitError::NoPieceAtSource(from));
        };
        if piece.color != self.side_to_move() {
            return Err(GambitError::WrongPieceOwner(from));
        }
        if from == to {
            return Err(GambitError::IllegalMove { from, to });
        }
        let dx = i16::from(to.x) - i16::from(from.x);
        let dy = i16::from(to.y) - i16::from(from.y);
        match piece.kind {
            PieceKind::Pawn => {
                let dir = i16::from(piece.color.pawn_direction());
                let start_rank = if piece.color == Color::White { 1 } else { 6 };
                let last_rank = if piece.color == Color::White { 7 } else { 0 };
                if dx == 0 && dy == dir && self.piece_at(to).is_none() {
                    // single forward push
                } else if dx == 0
                    && dy == 2 * dir
                    && i16::from(from.y) == start_rank
                    && self.piece_at(to).is_none()
                    && self
                        .piece_at(Square::new(from.x, (from.y as i16 + dir) as u8).expect("on board"))
                        .is_none()
                {
                    // double forward push from the start rank
                } else if dx.abs() == 1 && dy == dir {
                    let captures_en_passant = self.en_passant_target() == Some(to);
                    if self.piece_at(to).map(|p| p.color) == Some(piece.color.opposite()) {
                        // diagonal capture
                    } else if captures_en_passant {
                        // en passant capture
                    } else {
                        return Err(GambitError::IllegalMove { from, to });
                    }
                } else {
                    return Err(GambitError::IllegalMove { from, to });
                }
                if i16::from(to.y) == last_rank {
                    if let Some(promo) = promotion {
                        if !promo.is_legal_promotion() {
                            return Err(GambitError::IllegalMove { from, to });
                        }
                    }
                }
                self.validate_destination(from, to, piece.color)
            }
            PieceKind::Knight => {
                if !KNIGHT_OFFSETS.contains(&(dx as i8, dy as i8)) {
                    return Err(GambitError::IllegalMove { from, to });
                }
                self.validate_destination(from, to, piece.color)
            }
            PieceKind::Bishop => {
                if dx.abs() != dy.abs() || dx == 0 {
                    return Err(GambitError::IllegalMove { from, to });
                }
                if !self.is_path_clear(from, to) {
                    return Err(GambitError::IllegalMove { from, to });
                }
                self.validate_destination(from, to, piece.color)
            }
            PieceKind::Rook => {
                if !((dx == 0) ^ (dy == 0)) {
                    return Err(GambitError::IllegalMove { from, to });
                }
                if !self.is_path_clear(from, to) {
                    return Err(GambitError::IllegalMove { from, to });
                }
                self.validate_destination(from, to, piece.color)
            }
            PieceKind::Queen => {
                let is_diagonal = dx.abs() == dy.abs() && dx != 0;
                let is_straight = (dx == 0) ^ (dy == 0);
                if !is_diagonal && !is_straight {
                    return Err(GambitError::IllegalMove { from, to });
                }
                if !self.is_path_clear(from, to) {
                    return Err(GambitError::IllegalMove { from, to });
                }
                self.validate_destination(from, to, piece.color)
            }
            PieceKind::King => {
                if dx.abs() <= 1 && dy.abs() <= 1 {
                    return self.validate_destination(from, to, piece.color);
                }
                if dy == 0 && dx.abs() == 2 {
                    return self.castle_legal(piece.color, dx > 0).map(|_| ());
                }
                Err(GambitError::IllegalMove { from, to })
            }
        }
    }

    /// Validates a castling attempt  and returns the rook's
    /// `(from, to)` squares on success.
    fn castle_legal(&self, color: Color, kingside: bool) -> Result<(Square, Square), GambitError> {
        let rank = color.back_rank();
        let king_from = Square::new(4, rank).expect("on board");
        let (needed_right, rook_from_x, king_to_x, rook_to_x) = match (color, kingside) {
            (Color::White, true) => (CastlingRights::WHITE_KINGSIDE, 7, 6, 5),
            (Color::White, false) => (CastlingRights::WHITE_QUEENSIDE, 0, 2, 3),
            (Color::Black, true) => (CastlingRights::BLACK_KINGSIDE, 7, 6, 5),
            (Color::Black, false) => (CastlingRights::BLACK_QUEENSIDE, 0, 2, 3),
        };
        let err = GambitError::IllegalMove {
            from: king_from,
            to: Square::new(king_to_x, rank).expect("on board"),
        };
        if !self.castling_rights.contains(needed_right) {
            return Err(err);
        }
        let rook_from = Square::new(rook_from_x, rank).expect("on board");
        if self.piece_at(rook_from).map(|p| (p.kind, p.color)) != Some((PieceKind::Rook, color)) {
            return Err(err);
        }
        if self.piece_at(king_from).map(|p| (p.kind, p.color)) != Some((PieceKind::King, color)) {
            return Err(err);
        }
        if !self.is_path_clear(king_from, rook_from) {
            return Err(err);
        }
        if self.is_in_check(color) {
            return Err(err);
        }
        let step: i8 = if king_to_x > 4 { 1 } else { -1 };
        let crossing = king_from.offset(step, 0).expect("on board");
        if self.is_square_attacked(king_from, color.opposite())
            || self.is_square_attacked(crossing, color.opposite())
            || self.is_square_attacked(Square::new(king_to_x, rank).expect("on board"), color.opposite())
        {
            return Err(err);
        }
        Ok((rook_from, Square::new(rook_to_x, rank).expect("on board")))
    }

    /// Geometric legality AND the mover's king is not left in check.
    /// Implemented by cloning and materializing the move, which is simple
    /// and correct for a board this small, rather than attack-line
    /// reasoning that avoids the clone.
    #[must_use]
    pub fn is_valid_move(&self, from: Square, to: Square, promotion: Option<PieceKind>) -> bool {
        self.validate_move(from, to, promotion).is_ok()
    }

    /// Like [`Self::is_valid_move`] but with the specific rejection reason,
    /// for callers (the game engine) that need to report it. Does not
    /// mutate the board.
    pub fn validate_move(&self, from: Square, to: Square, promotion: Option<PieceKind>) -> Result<(), GambitError> {
        self.geometry_legal(from, to, promotion)?;
        let mover_color = self.side_to_move();
        let mut probe = self.clone();
        probe.apply_unchecked(from, to, promotion);
        if probe.is_in_check(mover_color) {
            return Err(GambitError::MoveLeavesKingInCheck);
        }
        Ok(())
    }

    /// The id of the piece that `from → to` would capture, if any, without
    /// mutating the board. Accounts for en passant, whose captured piece
    /// does not stand on `to`. Used by the engine to decide whether a move
    /// must be routed through the duel resolver before it's applied.
    #[must_use]
    pub fn capture_target(&self, from: Square, to: Square) -> Option<PieceId> {
        let piece = self.piece_at(from)?;
        if piece.kind == PieceKind::Pawn && to.x != from.x && self.piece_at(to).is_none() {
            let captured_square = Square::new(to.x, from.y).ok()?;
            return self.piece_id_at(captured_square);
        }
        self.piece_id_at(to)
    }

    /// Applies a move without any legality checking; used internally by
    /// `is_valid_move`'s probe and by `make_move` once validation passed.
    fn apply_unchecked(&mut self, from: Square, to: Square, promotion: Option<PieceKind>) -> MoveOutcome {
        let piece_id = self.piece_id_at(from).expect("validated by caller");
        let piece_kind = self.piece(piece_id).kind;
        let piece_color = self.piece(piece_id).color;
        let is_castle = piece_kind == PieceKind::King && (i16::from(to.x) - i16::from(from.x)).abs() == 2;
        let is_en_passant =
            piece_kind == PieceKind::Pawn && to.x != from.x && self.piece_at(to).is_none();
        let turn = self.move_number;

        let mut captured = None;
        let mut kind = MoveKind::Normal;

        if is_castle {
            let kingside = to.x > from.x;
            let (rook_from, rook_to) = self
                .castle_legal(piece_color, kingside)
                .expect("validated by caller");
            self.relocate(piece_id, to, turn);
            let rook_id = self.piece_id_at(rook_from).expect("validated by caller");
            self.relocate(rook_id, rook_to, turn);
            kind = MoveKind::Castle;
        } else if is_en_passant {
            let captured_square = Square::new(to.x, from.y).expect("on board");
            let captured_id = self.piece_id_at(captured_square).expect("en passant target present");
            self.remove(captured_id);
            self.relocate(piece_id, to, turn);
            captured = Some((captured_id, captured_square));
            kind = MoveKind::EnPassant;
        } else {
            if let Some(target_id) = self.piece_id_at(to) {
                self.remove(target_id);
                captured = Some((target_id, to));
                kind = MoveKind::Capture;
            }
            self.relocate(piece_id, to, turn);
        }

        let last_rank = if piece_color == Color::White { 7 } else { 0 };
        if piece_kind == PieceKind::Pawn && to.y == last_rank {
            let new_kind = promotion.filter(|p| p.is_legal_promotion()).unwrap_or(PieceKind::Queen);
            self.pieces[piece_id as usize].kind = new_kind;
            kind = MoveKind::Promotion;
        }

        self.update_castling_rights(piece_id, from, captured);
        let captured = captured.map(|(id, _)| id);

        let was_pawn_double_step =
            piece_kind == PieceKind::Pawn && (i16::from(to.y) - i16::from(from.y)).abs() == 2;
        self.last_move = Some(LastMove {
            piece_id,
            from,
            to,
            was_pawn_double_step,
        });
        self.move_number += 1;

        let check = self.is_in_check(self.side_to_move());
        MoveOutcome { kind, captured, check }
    }

    /// Moves a piece that failed a capture to its chosen retreat square —
    /// no capture, no castling, no promotion — and completes the
    /// half-move bookkeeping (`lastMove`, move counter) the same way
    /// `apply_unchecked` does for an ordinary move.
    pub fn relocate_for_retreat(&mut self, piece_id: PieceId, to: Square) {
        let from = self.piece(piece_id).position.expect("retreating a captured piece");
        let turn = self.move_number;
        self.relocate(piece_id, to, turn);
        self.last_move = Some(LastMove {
            piece_id,
            from,
            to,
            was_pawn_double_step: false,
        });
        self.move_number += 1;
    }

    fn relocate(&mut self, piece_id: PieceId, to: Square, turn: u32) {
        let from = self.pieces[piece_id as usize]
            .position
            .expect("relocating a captured piece");
        self.squares[index_of(from)] = None;
        self.squares[index_of(to)] = Some(piece_id);
        self.pieces[piece_id as usize].record_move(to, turn);
    }

    fn remove(&mut self, piece_id: PieceId) {
        if let Some(square) = self.pieces[piece_id as usize].position {
            self.squares[index_of(square)] = None;
        }
        self.pieces[piece_id as usize].position = None;
        self.captures.push(piece_id);
    }

    fn update_castling_rights(
        &mut self,
        moved_piece: PieceId,
        from: Square,
        captured: Option<(PieceId, Square)>,
    ) {
        let moved = self.piece(moved_piece);
        self.revoke_corner_right(moved.kind, moved.color, from.x, from.y);
        if let Some((captured_id, captured_square)) = captured {
            let captured_piece = self.piece(captured_id);
            self.revoke_corner_right(
                captured_piece.kind,
                captured_piece.color,
                captured_square.x,
                captured_square.y,
            );
        }
    }

    /// Revokes the castling right tied to a king/rook leaving (by move or
    /// capture) its original square.
    fn revoke_corner_right(&mut self, kind: PieceKind, color: Color, x: u8, y: u8) {
        match (kind, color, x, y) {
            (PieceKind::King, Color::White, _, _) => {
                self.castling_rights
                    .remove(CastlingRights::WHITE_KINGSIDE | CastlingRights::WHITE_QUEENSIDE);
            }
            (PieceKind::King, Color::Black, _, _) => {
                self.castling_rights
                    .remove(CastlingRights::BLACK_KINGSIDE | CastlingRights::BLACK_QUEENSIDE);
            }
            (PieceKind::Rook, Color::White, 0, 0) => self.castling_rights.remove(CastlingRights::WHITE_QUEENSIDE),
            (PieceKind::Rook, Color::White, 7, 0) => self.castling_rights.remove(CastlingRights::WHITE_KINGSIDE),
            (PieceKind::Rook, Color::Black, 0, 7) => self.castling_rights.remove(CastlingRights::BLACK_QUEENSIDE),
            (PieceKind::Rook, Color::Black, 7, 7) => self.castling_rights.remove(CastlingRights::BLACK_KINGSIDE),
            _ => {}
        }
    }

    /// Validates and applies a move (`makeMove`). Does not
    /// consult the duel layer: callers (the game engine) must intercept
    /// capture attempts and run the duel before ever calling this for a
    /// capturing move.
    pub fn make_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> Result<MoveOutcome, GambitError> {
        self.geometry_legal(from, to, promotion)?;
        let mover_color = self.side_to_move();
        let mut probe = self.clone();
        let outcome = probe.apply_unchecked(from, to, promotion);
        if probe.is_in_check(mover_color) {
            return Err(GambitError::MoveLeavesKingInCheck);
        }
        *self = probe;
        Ok(outcome)
    }

    /// Whether `color` has any legal move in the current position, used for
    /// checkmate/stalemate detection.
    #[must_use]
    pub fn has_any_legal_move(&self, color: Color) -> bool {
        if self.side_to_move() != color {
            // Legality (in particular self-check) is only meaningful for the
            // side to move; probe as if it were their turn by temporarily
            // cloning with an adjusted move number.
            let mut probe = self.clone();
            if probe.move_number % 2 != if color == Color::White { 1 } else { 0 } {
                probe.move_number += 1;
            }
            return probe.has_any_legal_move_for_side_to_move();
        }
        self.has_any_legal_move_for_side_to_move()
    }

    fn has_any_legal_move_for_side_to_move(&self) -> bool {
        let color = self.side_to_move();
        for piece in self.pieces_by_color(color).collect::<Vec<_>>() {
            let from = piece.position.expect("filtered to non-captured");
            for to in Square::iter_all() {
                if self.is_valid_move(from, to, Some(PieceKind::Queen)) {
                    return true;
                }
            }
        }
        false
    }

    /// All legal destination squares for the piece on `from`, capped at a
    /// queen's theoretical maximum (move lists are always small).
    #[must_use]
    pub fn legal_destinations(&self, from: Square) -> ArrayVec<Square, 27> {
        let mut result = ArrayVec::new();
        let Some(piece) = self.piece_at(from) else {
            return result;
        };
        if piece.color != self.side_to_move() {
            return result;
        }
        for to in Square::iter_all() {
            if self.is_valid_move(from, to, Some(PieceKind::Queen)) && result.try_push(to).is_err() {
                break;
            }
        }
        result
    }
}

/// Maps a square to its zero-based index, exposed for callers (tactic
/// detection, retreat geometry) that want the same addressing scheme a
/// `HashMap<Square, _>` would use without paying for the hash.
#[must_use]
pub fn square_index(square: Square) -> usize {
    index_of(square)
}
