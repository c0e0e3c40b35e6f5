use serde::{Deserialize, Serialize};

use crate::{
    PieceCollisionError,
    core::{
        board::Board,
        piece::{Piece, PieceKind},
    },
};

use super::piece_bag::{PieceBag, PieceSeed};

/// Why a field stopped accepting pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TopOutReason {
    #[display("piece locked above the visible board")]
    LockedAboveBoard,
    #[display("no room to spawn the next piece")]
    SpawnBlocked,
}

/// Result of locking the falling piece into the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockOutcome {
    /// The piece as it was locked.
    pub piece: Piece,
    /// Number of rows removed by the lock.
    pub cleared_lines: usize,
    /// Set when the lock ended the game.
    pub top_out: Option<TopOutReason>,
}

impl LockOutcome {
    #[must_use]
    pub fn is_topped_out(&self) -> bool {
        self.top_out.is_some()
    }
}

/// Result of a soft or hard drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum DropOutcome {
    /// The piece moved down one row and is still falling.
    Fell,
    /// The piece descended `distance` rows and then locked.
    Landed { distance: usize, lock: LockOutcome },
    /// The field has topped out; nothing changed.
    Inactive,
}

/// The board together with the falling piece, the next piece and the bag
/// that supplies them.
///
/// All moves are validated against the board: an illegal move or rotation
/// leaves the field untouched and reports `false`. The ghost row (the
/// landing row of the falling piece) is recomputed after every committed
/// change.
///
/// Once a lock tops out, the field is frozen and every operation is a no-op.
#[derive(Debug, Clone)]
pub struct GameField {
    board: Board,
    piece_bag: PieceBag,
    falling_piece: Piece,
    next_piece: Piece,
    ghost_y: i32,
    top_out: Option<TopOutReason>,
}

impl Default for GameField {
    fn default() -> Self {
        Self::new()
    }
}

impl GameField {
    #[must_use]
    pub fn new() -> Self {
        Self::from_parts(Board::EMPTY, PieceBag::new())
    }

    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self::from_parts(Board::EMPTY, PieceBag::with_seed(seed))
    }

    /// Builds a field on an existing board, drawing the falling and next
    /// pieces from `piece_bag`.
    ///
    /// If the board already blocks the spawn position the field starts
    /// topped out.
    #[must_use]
    pub fn from_parts(board: Board, mut piece_bag: PieceBag) -> Self {
        let falling_piece = Piece::spawn(piece_bag.draw());
        let next_piece = Piece::spawn(piece_bag.draw());
        let mut this = Self {
            board,
            piece_bag,
            falling_piece,
            next_piece,
            ghost_y: falling_piece.position().y(),
            top_out: None,
        };
        if !this.board.can_place(&this.falling_piece) {
            this.top_out = Some(TopOutReason::SpawnBlocked);
        }
        this.refresh_ghost();
        this
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn falling_piece(&self) -> Piece {
        self.falling_piece
    }

    /// The piece that spawns after the falling piece locks.
    #[must_use]
    pub fn next_piece(&self) -> Piece {
        self.next_piece
    }

    #[must_use]
    pub fn next_kind(&self) -> PieceKind {
        self.next_piece.kind()
    }

    #[must_use]
    pub fn piece_bag(&self) -> &PieceBag {
        &self.piece_bag
    }

    /// Lowest row the falling piece can reach at its current column and rotation.
    #[must_use]
    pub fn ghost_y(&self) -> i32 {
        self.ghost_y
    }

    /// The falling piece moved to its landing row.
    #[must_use]
    pub fn ghost_piece(&self) -> Piece {
        let current = self.falling_piece.position().y();
        self.falling_piece.moved(0, self.ghost_y - current)
    }

    #[must_use]
    pub fn top_out(&self) -> Option<TopOutReason> {
        self.top_out
    }

    #[must_use]
    pub fn is_topped_out(&self) -> bool {
        self.top_out.is_some()
    }

    fn refresh_ghost(&mut self) {
        self.ghost_y = if self.is_topped_out() {
            self.falling_piece.position().y()
        } else {
            self.falling_piece.drop_position(&self.board).position().y()
        };
    }

    /// Replaces the falling piece, e.g. to set up a puzzle position.
    pub fn set_falling_piece(&mut self, piece: Piece) -> Result<(), PieceCollisionError> {
        if self.is_topped_out() || !self.board.can_place(&piece) {
            return Err(PieceCollisionError);
        }
        self.falling_piece = piece;
        self.refresh_ghost();
        Ok(())
    }

    /// Moves the falling piece by `(dx, dy)` if the target is free.
    pub fn try_move(&mut self, dx: i32, dy: i32) -> bool {
        let piece = self.falling_piece.moved(dx, dy);
        self.set_falling_piece(piece).is_ok()
    }

    pub fn try_move_left(&mut self) -> bool {
        self.try_move(-1, 0)
    }

    pub fn try_move_right(&mut self) -> bool {
        self.try_move(1, 0)
    }

    /// Rotates the falling piece clockwise using the kick list.
    pub fn try_rotate(&mut self) -> bool {
        if self.is_topped_out() {
            return false;
        }
        let Some(piece) = self.falling_piece.kicked_rotation(&self.board) else {
            return false;
        };
        self.falling_piece = piece;
        self.refresh_ghost();
        true
    }

    /// Moves the falling piece down one row, locking it if it cannot move.
    pub fn soft_drop(&mut self) -> DropOutcome {
        if self.is_topped_out() {
            return DropOutcome::Inactive;
        }
        if self.try_move(0, 1) {
            return DropOutcome::Fell;
        }
        self.landed(0)
    }

    /// Drops the falling piece to its landing row and locks it.
    pub fn hard_drop(&mut self) -> DropOutcome {
        if self.is_topped_out() {
            return DropOutcome::Inactive;
        }
        let mut distance = 0;
        while self.try_move(0, 1) {
            distance += 1;
        }
        self.landed(distance)
    }

    fn landed(&mut self, distance: usize) -> DropOutcome {
        match self.lock_piece() {
            Some(lock) => DropOutcome::Landed { distance, lock },
            None => DropOutcome::Inactive,
        }
    }

    /// Locks the falling piece where it is, clears completed rows and
    /// spawns the next piece.
    ///
    /// A lock with cells above the board tops out before any row is
    /// cleared. A spawn that collides tops out after the clear, so the
    /// cleared rows are still reported. Returns `None` if the field had
    /// already topped out.
    pub fn lock_piece(&mut self) -> Option<LockOutcome> {
        if self.is_topped_out() {
            return None;
        }

        let piece = self.falling_piece;
        if self.board.lock(&piece).is_err() {
            self.top_out = Some(TopOutReason::LockedAboveBoard);
            self.refresh_ghost();
            return Some(LockOutcome {
                piece,
                cleared_lines: 0,
                top_out: self.top_out,
            });
        }

        let cleared_lines = self.board.clear_completed_rows();
        self.falling_piece = self.next_piece;
        self.next_piece = Piece::spawn(self.piece_bag.draw());
        if !self.board.can_place(&self.falling_piece) {
            self.top_out = Some(TopOutReason::SpawnBlocked);
        }
        self.refresh_ghost();

        Some(LockOutcome {
            piece,
            cleared_lines,
            top_out: self.top_out,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PiecePosition, PieceRotation};

    const SEED: PieceSeed = PieceSeed::from_bytes([7; 16]);

    fn field_on(board: Board) -> GameField {
        GameField::from_parts(board, PieceBag::with_seed(SEED))
    }

    fn assert_ghost_invariant(field: &GameField) {
        let ghost = field.ghost_piece();
        assert!(field.ghost_y() >= field.falling_piece().position().y());
        assert!(field.board().can_place(&ghost));
        assert!(!field.board().can_place(&ghost.moved(0, 1)));
    }

    #[test]
    fn test_new_field_spawns_two_pieces() {
        let field = GameField::with_seed(SEED);
        let falling = field.falling_piece();
        assert_eq!(falling, Piece::spawn(falling.kind()));
        assert_eq!(field.next_piece(), Piece::spawn(field.next_kind()));
        assert_ne!(falling.kind(), field.next_kind(), "same bag cycle");
        assert!(!field.is_topped_out());
        assert_ghost_invariant(&field);
    }

    #[test]
    fn test_move_into_wall_is_noop() {
        let mut field = field_on(Board::EMPTY);
        while field.try_move_left() {}
        let before = field.falling_piece();
        let ghost_before = field.ghost_y();

        assert!(!field.try_move_left());
        assert_eq!(field.falling_piece(), before);
        assert_eq!(field.ghost_y(), ghost_before);
    }

    #[test]
    fn test_move_updates_ghost() {
        let board = Board::from_ascii(
            r"
            #.........
            #.........
            #.........
            #.........
            ",
        );
        let mut field = field_on(board);
        let o = Piece::new(
            PieceKind::O,
            PieceRotation::SPAWN,
            PiecePosition::new(1, 0),
        );
        field.set_falling_piece(o).unwrap();
        assert_eq!(field.ghost_y(), 18);

        assert!(field.try_move_left());
        // Over the column of height four the O lands four rows higher.
        assert_eq!(field.ghost_y(), 14);
        assert_ghost_invariant(&field);
    }

    #[test]
    fn test_rotation_blocked_is_noop() {
        let board = Board::from_ascii(
            r"
            ##...#####
            ##...#####
            ##...#####
            ",
        );
        let mut field = field_on(board);
        let vertical_i = Piece::new(
            PieceKind::I,
            PieceRotation::new(1).unwrap(),
            PiecePosition::new(1, 16),
        );
        field.set_falling_piece(vertical_i).unwrap();

        assert!(!field.try_rotate());
        assert_eq!(field.falling_piece(), vertical_i);
    }

    #[test]
    fn test_rotation_kicks_off_wall() {
        let mut field = field_on(Board::EMPTY);
        let vertical_i = Piece::new(
            PieceKind::I,
            PieceRotation::new(3).unwrap(),
            PiecePosition::new(8, 5),
        );
        // 0x4444 keeps the cells in window column 1, i.e. board column 9.
        field.set_falling_piece(vertical_i).unwrap();

        assert!(field.try_rotate());
        let rotated = field.falling_piece();
        assert_eq!(rotated.rotation().index(), 0);
        assert_eq!(rotated.position(), PiecePosition::new(6, 5));
        assert_ghost_invariant(&field);
    }

    #[test]
    fn test_soft_drop_falls_then_locks() {
        let mut field = field_on(Board::EMPTY);
        let o = Piece::new(
            PieceKind::O,
            PieceRotation::SPAWN,
            PiecePosition::new(0, 17),
        );
        field.set_falling_piece(o).unwrap();
        let next = field.next_piece();

        assert_eq!(field.soft_drop(), DropOutcome::Fell);
        let DropOutcome::Landed { distance, lock } = field.soft_drop() else {
            panic!("expected the piece to lock");
        };
        assert_eq!(distance, 0);
        assert_eq!(lock.piece, o.moved(0, 1));
        assert_eq!(lock.cleared_lines, 0);
        assert!(!lock.is_topped_out());
        assert!(field.board().is_occupied(0, 19));
        assert_eq!(field.falling_piece(), next);
    }

    #[test]
    fn test_hard_drop_counts_distance_and_clears() {
        let board = Board::from_ascii(
            r"
            IIII..IIII
            IIII..IIII
            ",
        );
        let mut field = field_on(board);
        let o = Piece::new(
            PieceKind::O,
            PieceRotation::SPAWN,
            PiecePosition::new(4, 0),
        );
        field.set_falling_piece(o).unwrap();

        let DropOutcome::Landed { distance, lock } = field.hard_drop() else {
            panic!("expected the piece to lock");
        };
        assert_eq!(distance, 18);
        assert_eq!(lock.cleared_lines, 2);
        assert_eq!(field.board(), &Board::EMPTY);
        assert_ghost_invariant(&field);
    }

    #[test]
    fn test_lock_above_board_tops_out_without_clearing() {
        // Row 1 is blocked in the corner only, away from the spawn columns.
        let mut art = String::from("##........\n");
        for _ in 0..18 {
            art.push_str("..........\n");
        }
        let mut field = field_on(Board::from_ascii(&art));
        assert!(!field.is_topped_out());
        // An O half above the board, resting on row 1
        let o = Piece::new(
            PieceKind::O,
            PieceRotation::SPAWN,
            PiecePosition::new(0, -1),
        );
        field.set_falling_piece(o).unwrap();

        let DropOutcome::Landed { lock, .. } = field.soft_drop() else {
            panic!("expected the piece to lock");
        };
        assert_eq!(lock.top_out, Some(TopOutReason::LockedAboveBoard));
        assert_eq!(lock.cleared_lines, 0);
        assert_eq!(field.top_out(), Some(TopOutReason::LockedAboveBoard));
        assert!(field.board().is_occupied(0, 0));
        assert!(field.board().is_occupied(1, 0));

        // Frozen from now on.
        let frozen = field.falling_piece();
        let board = field.board().clone();
        assert!(!field.try_move_left());
        assert!(!field.try_rotate());
        assert_eq!(field.soft_drop(), DropOutcome::Inactive);
        assert_eq!(field.hard_drop(), DropOutcome::Inactive);
        assert_eq!(field.lock_piece(), None);
        assert_eq!(field.falling_piece(), frozen);
        assert_eq!(field.board(), &board);
    }

    #[test]
    fn test_field_on_blocked_board_starts_topped_out() {
        let mut art = String::new();
        for _ in 0..20 {
            art.push_str("IIIII.IIII\n");
        }
        let board = Board::from_ascii(&art);
        let mut field = field_on(board.clone());

        assert_eq!(field.top_out(), Some(TopOutReason::SpawnBlocked));
        assert_eq!(field.hard_drop(), DropOutcome::Inactive);
        assert_eq!(field.board(), &board);
    }

    #[test]
    fn test_spawn_blocked_after_lock_still_reports_clears() {
        // Row 3 is complete except column 4, which is filled below it.
        let mut art = String::from("IIII.IIIII\n");
        for _ in 0..16 {
            art.push_str("....I.....\n");
        }
        let mut field = field_on(Board::from_ascii(&art));
        assert!(!field.is_topped_out());

        // Vertical I in column 4 covering rows 0..=3
        let vertical_i = Piece::new(
            PieceKind::I,
            PieceRotation::new(1).unwrap(),
            PiecePosition::new(2, 0),
        );
        field.set_falling_piece(vertical_i).unwrap();

        let DropOutcome::Landed { distance, lock } = field.hard_drop() else {
            panic!("expected the piece to lock");
        };
        assert_eq!(distance, 0);
        assert_eq!(lock.cleared_lines, 1);
        // The rest of the I falls onto the spawn area.
        assert!(field.board().is_occupied(4, 1));
        assert_eq!(lock.top_out, Some(TopOutReason::SpawnBlocked));
        assert!(field.is_topped_out());
    }
}
