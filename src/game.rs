//! Game state: board, piece catalog, rotation, line clears, fall timer.

use rand::Rng;
use std::collections::VecDeque;
use std::time::Duration;

/// Tetromino kinds in catalog order. Colour ids are the 1-based catalog
/// positions, so 0 stays free to mean "empty" on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceKind {
    I,
    T,
    L,
    J,
    S,
    O,
    Z,
}

impl PieceKind {
    pub const ALL: [Self; 7] = [Self::I, Self::T, Self::L, Self::J, Self::S, Self::O, Self::Z];

    /// Base (unrotated) occupancy matrix, origin at the top-left of the
    /// bounding box.
    pub fn base_shape(&self) -> Shape {
        let rows: &[&[u8]] = match self {
            Self::I => &[&[1, 1, 1, 1]],
            Self::T => &[&[1, 1, 1], &[0, 1, 0]],
            Self::L => &[&[1, 1, 1], &[1, 0, 0]],
            Self::J => &[&[1, 1, 1], &[0, 0, 1]],
            Self::S => &[&[0, 1, 1], &[1, 1, 0]],
            Self::O => &[&[1, 1], &[1, 1]],
            Self::Z => &[&[1, 1, 0], &[0, 1, 1]],
        };
        Shape::from_rows(rows)
    }

    /// Colour id 1..=7 for Theme::piece_color.
    pub fn color_id(&self) -> u8 {
        match self {
            Self::I => 1, // cyan
            Self::T => 2, // purple
            Self::L => 3, // orange
            Self::J => 4, // blue
            Self::S => 5, // green
            Self::O => 6, // yellow
            Self::Z => 7, // red
        }
    }

    fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// Occupancy matrix of a piece in local coordinates; (0,0) is the top-left
/// of the bounding box. Immutable: rotation returns a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    rows: Vec<Vec<u8>>,
}

impl Shape {
    fn from_rows(rows: &[&[u8]]) -> Self {
        Self {
            rows: rows.iter().map(|r| r.to_vec()).collect(),
        }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Column count of the first row; all rows have equal length.
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Occupied cells as (y, x) local coordinates.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|&(_, v)| *v != 0)
                .map(move |(x, _)| (y, x))
        })
    }

    /// 90° clockwise rotation: transpose of the rows taken in reverse order.
    /// Works for non-square matrices; the result has swapped dimensions.
    pub fn rotated_cw(&self) -> Self {
        let (h, w) = (self.height(), self.width());
        let rows = (0..w)
            .map(|y| (0..h).map(|x| self.rows[h - 1 - x][y]).collect())
            .collect();
        Self { rows }
    }
}

/// Single board cell: empty or locked with a colour id (1..=7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Locked(u8),
}

/// Grid of locked cells. Row 0 is the top; dimensions are fixed after
/// construction. Only `lock` and `clear_full_rows` mutate cell state.
#[derive(Debug, Clone)]
pub struct Board {
    width: usize,
    height: usize,
    /// rows[r][c] = cell. rows[0] is top.
    rows: VecDeque<Vec<Cell>>,
}

impl Board {
    pub fn new(width: u16, height: u16) -> Self {
        let (w, h) = (width as usize, height as usize);
        let rows = (0..h).map(|_| vec![Cell::Empty; w]).collect();
        Self {
            width: w,
            height: h,
            rows,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Legality check for `shape` anchored at `(row, col)`: every occupied
    /// cell must land in bounds on an empty board cell. This is the single
    /// authority for move, rotation and fall legality; an oversized or
    /// mis-anchored shape is simply invalid, never an error.
    pub fn is_valid_position(&self, shape: &Shape, row: i32, col: i32) -> bool {
        shape.cells().all(|(y, x)| {
            let (r, c) = (row + y as i32, col + x as i32);
            r >= 0
                && r < self.height as i32
                && c >= 0
                && c < self.width as i32
                && self.get(r as usize, c as usize) == Some(Cell::Empty)
        })
    }

    /// Write `color_id` into every cell covered by `shape` at `(row, col)`.
    /// Caller contract: the position has already passed `is_valid_position`.
    /// The check is not repeated here; a bad anchor overwrites locked cells.
    pub fn lock(&mut self, shape: &Shape, row: i32, col: i32, color_id: u8) {
        for (y, x) in shape.cells() {
            let (r, c) = (row + y as i32, col + x as i32);
            if r < 0 || c < 0 {
                continue;
            }
            if let Some(cell) = self
                .rows
                .get_mut(r as usize)
                .and_then(|rw| rw.get_mut(c as usize))
            {
                *cell = Cell::Locked(color_id);
            }
        }
    }

    /// Remove every full row at once and refill the top with empty rows,
    /// keeping the remaining rows in order and the row count constant.
    /// Returns how many rows were cleared.
    pub fn clear_full_rows(&mut self) -> u32 {
        self.rows.retain(|row| row.iter().any(|c| *c == Cell::Empty));
        let cleared = self.height - self.rows.len();
        for _ in 0..cleared {
            self.rows.push_front(vec![Cell::Empty; self.width]);
        }
        cleared as u32
    }
}

/// The falling piece: shape plus anchor in board coordinates. Treated as a
/// value; every successful move or rotation replaces it wholesale.
#[derive(Debug, Clone)]
pub struct ActivePiece {
    pub kind: PieceKind,
    pub shape: Shape,
    pub row: i32,
    pub col: i32,
}

impl ActivePiece {
    /// New piece at the top of the board, horizontally centred on the
    /// unrotated shape width.
    pub fn spawn(kind: PieceKind, board_width: usize) -> Self {
        let shape = kind.base_shape();
        let col = (board_width / 2) as i32 - (shape.width() / 2) as i32;
        Self {
            kind,
            shape,
            row: 0,
            col,
        }
    }

    pub fn color_id(&self) -> u8 {
        self.kind.color_id()
    }

    /// Occupied cells in board coordinates.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape
            .cells()
            .map(|(y, x)| (self.row + y as i32, self.col + x as i32))
    }

    fn offset(&self, dr: i32, dc: i32) -> Self {
        Self {
            row: self.row + dr,
            col: self.col + dc,
            ..self.clone()
        }
    }

    fn rotated(&self) -> Self {
        Self {
            shape: self.shape.rotated_cw(),
            ..self.clone()
        }
    }
}

/// Game state: board, falling piece, fall timer. Owned exclusively by the
/// app loop; rendering reads it after mutation for the tick completes.
#[derive(Debug)]
pub struct GameState {
    pub board: Board,
    pub piece: ActivePiece,
    fall_acc: Duration,
    fall_interval: Duration,
}

impl GameState {
    pub fn new(config: &crate::GameConfig) -> Self {
        let board = Board::new(config.width, config.height);
        let kind = PieceKind::random(&mut rand::thread_rng());
        let piece = ActivePiece::spawn(kind, board.width());
        Self {
            board,
            piece,
            fall_acc: Duration::ZERO,
            fall_interval: config.fall_interval,
        }
    }

    pub fn move_left(&mut self) {
        self.try_shift(0, -1);
    }

    pub fn move_right(&mut self) {
        self.try_shift(0, 1);
    }

    /// Blocked horizontal moves only revert; they never lock the piece.
    fn try_shift(&mut self, dr: i32, dc: i32) {
        let cand = self.piece.offset(dr, dc);
        if self.board.is_valid_position(&cand.shape, cand.row, cand.col) {
            self.piece = cand;
        }
    }

    /// Rotate clockwise if the rotated shape fits at the current anchor;
    /// otherwise the candidate is discarded. No kick search.
    pub fn rotate(&mut self) {
        let cand = self.piece.rotated();
        if self.board.is_valid_position(&cand.shape, cand.row, cand.col) {
            self.piece = cand;
        }
    }

    /// One downward step. A blocked step locks the piece, clears full rows
    /// and spawns the next piece; manual drops and timed falls share this
    /// path.
    pub fn soft_drop(&mut self) {
        let cand = self.piece.offset(1, 0);
        if self.board.is_valid_position(&cand.shape, cand.row, cand.col) {
            self.piece = cand;
        } else {
            self.board.lock(
                &self.piece.shape,
                self.piece.row,
                self.piece.col,
                self.piece.color_id(),
            );
            self.board.clear_full_rows();
            self.spawn_next();
        }
    }

    /// Feed elapsed wall-clock time into the fall timer. At most one step is
    /// taken per call even when several intervals have elapsed; the
    /// accumulator resets to zero after a step.
    pub fn advance(&mut self, elapsed: Duration) {
        self.fall_acc += elapsed;
        if self.fall_acc > self.fall_interval {
            self.soft_drop();
            self.fall_acc = Duration::ZERO;
        }
    }

    /// Spawn performs no overlap check: once the stack reaches the spawn
    /// area a piece can appear on top of locked cells, and the next blocked
    /// downward step locks it there. There is no game-over detection.
    fn spawn_next(&mut self) {
        let kind = PieceKind::random(&mut rand::thread_rng());
        self.piece = ActivePiece::spawn(kind, self.board.width());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(width: u16, height: u16) -> crate::GameConfig {
        crate::GameConfig {
            width,
            height,
            fall_interval: Duration::from_millis(500),
        }
    }

    fn state_10x20() -> GameState {
        GameState::new(&config(10, 20))
    }

    fn place(state: &mut GameState, kind: PieceKind, row: i32, col: i32) {
        state.piece = ActivePiece {
            kind,
            shape: kind.base_shape(),
            row,
            col,
        };
    }

    #[test]
    fn rotating_the_o_piece_is_the_identity() {
        let mut shape = PieceKind::O.base_shape();
        for _ in 0..4 {
            shape = shape.rotated_cw();
            assert_eq!(shape, PieceKind::O.base_shape());
        }
    }

    #[test]
    fn four_rotations_restore_every_shape() {
        for kind in PieceKind::ALL {
            let original = kind.base_shape();
            let mut shape = original.clone();
            for _ in 0..4 {
                shape = shape.rotated_cw();
            }
            assert_eq!(shape, original, "{kind:?}");
        }
    }

    #[test]
    fn rotation_swaps_dimensions() {
        let rotated = PieceKind::I.base_shape().rotated_cw();
        assert_eq!(rotated.height(), 4);
        assert_eq!(rotated.width(), 1);
    }

    #[test]
    fn rotation_is_transpose_of_reversed_rows() {
        // T: [[1,1,1],[0,1,0]] -> columns become rows, bottom row first
        let rotated = PieceKind::T.base_shape().rotated_cw();
        assert_eq!(rotated, Shape::from_rows(&[&[0, 1], &[1, 1], &[0, 1]]));
    }

    #[test]
    fn spawn_centres_on_unrotated_width() {
        assert_eq!(ActivePiece::spawn(PieceKind::I, 10).col, 3); // 10/2 - 4/2
        assert_eq!(ActivePiece::spawn(PieceKind::O, 10).col, 4); // 10/2 - 2/2
        assert_eq!(ActivePiece::spawn(PieceKind::T, 10).col, 4); // 10/2 - 3/2
        assert_eq!(ActivePiece::spawn(PieceKind::I, 10).row, 0);
    }

    #[test]
    fn lock_writes_only_covered_cells() {
        let mut board = Board::new(10, 20);
        board.lock(&PieceKind::I.base_shape(), 0, 3, PieceKind::I.color_id());
        for col in 0..10 {
            let expected = if (3..7).contains(&col) {
                Cell::Locked(1)
            } else {
                Cell::Empty
            };
            assert_eq!(board.get(0, col), Some(expected));
        }
        for row in 1..20 {
            for col in 0..10 {
                assert_eq!(board.get(row, col), Some(Cell::Empty));
            }
        }
    }

    #[test]
    fn clearing_a_single_full_row_shifts_the_rows_above() {
        let mut board = Board::new(10, 20);
        for col in 0..10 {
            board.rows[5][col] = Cell::Locked(3);
        }
        // markers above and below the full row
        board.rows[4][0] = Cell::Locked(2);
        board.rows[19][9] = Cell::Locked(7);

        assert_eq!(board.clear_full_rows(), 1);
        assert_eq!(board.height(), 20);
        for col in 0..10 {
            assert_eq!(board.get(0, col), Some(Cell::Empty));
        }
        // old row 4 moved down to row 5; rows below the cleared one stay put
        assert_eq!(board.get(5, 0), Some(Cell::Locked(2)));
        assert_eq!(board.get(4, 0), Some(Cell::Empty));
        assert_eq!(board.get(19, 9), Some(Cell::Locked(7)));
    }

    #[test]
    fn all_full_rows_clear_simultaneously() {
        let mut board = Board::new(10, 20);
        for col in 0..10 {
            board.rows[16][col] = Cell::Locked(4);
            board.rows[18][col] = Cell::Locked(1);
        }
        // partial row sandwiched between the two full ones
        board.rows[17][3] = Cell::Locked(5);

        assert_eq!(board.clear_full_rows(), 2);
        // the partial row keeps its contents and slides to the bottom gap
        assert_eq!(board.get(18, 3), Some(Cell::Locked(5)));
        for col in 0..10 {
            assert_eq!(board.get(0, col), Some(Cell::Empty));
            assert_eq!(board.get(1, col), Some(Cell::Empty));
            assert_eq!(board.get(19, col), Some(Cell::Empty));
        }
    }

    #[test]
    fn clear_on_untouched_board_is_a_no_op() {
        let mut board = Board::new(10, 20);
        assert_eq!(board.clear_full_rows(), 0);
        assert_eq!(board.height(), 20);
    }

    #[test]
    fn blocked_left_move_reverts_exactly() {
        let mut state = state_10x20();
        place(&mut state, PieceKind::T, 5, 0);
        state.move_left();
        assert_eq!((state.piece.row, state.piece.col), (5, 0));
        // horizontal blocks never lock anything
        assert!(state.board.rows.iter().flatten().all(|c| *c == Cell::Empty));
    }

    #[test]
    fn blocked_right_move_reverts_exactly() {
        let mut state = state_10x20();
        place(&mut state, PieceKind::T, 5, 7); // T is 3 wide; col 7 touches the wall
        state.move_right();
        assert_eq!((state.piece.row, state.piece.col), (5, 7));
        assert!(state.board.rows.iter().flatten().all(|c| *c == Cell::Empty));
    }

    #[test]
    fn rotation_commits_at_the_same_anchor() {
        let mut state = state_10x20();
        place(&mut state, PieceKind::I, 5, 3);
        state.rotate();
        assert_eq!((state.piece.row, state.piece.col), (5, 3));
        assert_eq!(state.piece.shape.height(), 4);
        assert_eq!(state.piece.shape.width(), 1);
    }

    #[test]
    fn blocked_rotation_keeps_the_piece_unchanged() {
        let mut state = state_10x20();
        place(&mut state, PieceKind::I, 0, 6);
        // vertical I at col 6 would need rows 0..4; block row 1
        state.board.rows[1][6] = Cell::Locked(2);
        let before = state.piece.shape.clone();
        state.rotate();
        assert_eq!(state.piece.shape, before);
        assert_eq!((state.piece.row, state.piece.col), (0, 6));
    }

    #[test]
    fn rotation_against_the_wall_fails_without_a_kick() {
        let mut state = state_10x20();
        // vertical I hugging the right wall: rotating back to horizontal
        // would stick out past the edge and must be rejected outright
        state.piece = ActivePiece {
            kind: PieceKind::I,
            shape: PieceKind::I.base_shape().rotated_cw(),
            row: 5,
            col: 9,
        };
        state.rotate();
        assert_eq!(state.piece.shape.width(), 1);
        assert_eq!((state.piece.row, state.piece.col), (5, 9));
    }

    #[test]
    fn oversized_shape_is_just_invalid() {
        let board = Board::new(3, 4);
        let i = PieceKind::I.base_shape(); // 4 wide on a 3-wide board
        assert!(!board.is_valid_position(&i, 0, 0));
        assert!(!board.is_valid_position(&i, 0, -1));
        assert!(!board.is_valid_position(&i, -1, 0));
    }

    #[test]
    fn t_piece_drops_to_the_floor_and_locks() {
        let mut state = state_10x20();
        place(&mut state, PieceKind::T, 0, 3);
        // 18 successful steps take the anchor to row 18 (the shape is 2 tall)
        for expected_row in 1..=18 {
            state.soft_drop();
            assert_eq!(state.piece.row, expected_row);
            assert_eq!(state.piece.kind, PieceKind::T);
        }
        // the next attempt is blocked: lock, clear (nothing full), respawn
        state.soft_drop();
        assert_eq!(state.piece.row, 0);

        let t = PieceKind::T.color_id();
        for col in 3..6 {
            assert_eq!(state.board.get(18, col), Some(Cell::Locked(t)));
        }
        assert_eq!(state.board.get(19, 3), Some(Cell::Empty));
        assert_eq!(state.board.get(19, 4), Some(Cell::Locked(t)));
        assert_eq!(state.board.get(19, 5), Some(Cell::Empty));
    }

    #[test]
    fn locking_into_a_full_row_clears_it() {
        let mut state = state_10x20();
        for col in 0..10 {
            if !(3..7).contains(&col) {
                state.board.rows[19][col] = Cell::Locked(5);
            }
        }
        place(&mut state, PieceKind::I, 19, 3);
        state.soft_drop(); // blocked by the floor: locks and completes row 19
        assert!(state.board.rows.iter().flatten().all(|c| *c == Cell::Empty));
        assert_eq!(state.piece.row, 0);
    }

    #[test]
    fn fall_timer_steps_once_per_threshold() {
        let mut state = state_10x20();
        place(&mut state, PieceKind::O, 0, 4);
        state.advance(Duration::from_millis(400));
        assert_eq!(state.piece.row, 0);
        state.advance(Duration::from_millis(200)); // 600 ms > 500 ms
        assert_eq!(state.piece.row, 1);
        // no catch-up: a long stall still advances a single row
        state.advance(Duration::from_millis(5_000));
        assert_eq!(state.piece.row, 2);
    }

    #[test]
    fn fall_accumulator_resets_after_a_step() {
        let mut state = state_10x20();
        place(&mut state, PieceKind::O, 0, 4);
        state.advance(Duration::from_millis(501));
        assert_eq!(state.piece.row, 1);
        state.advance(Duration::from_millis(499));
        assert_eq!(state.piece.row, 1); // fresh accumulator, threshold not crossed
    }

    #[test]
    fn spawn_ignores_the_existing_stack() {
        let mut state = state_10x20();
        for row in 0..2 {
            for col in 0..10 {
                state.board.rows[row][col] = Cell::Locked(3);
            }
        }
        // no overlap check and no game over; the piece simply appears
        state.spawn_next();
        assert_eq!(state.piece.row, 0);
    }

    #[test]
    fn piece_stays_in_bounds_and_off_the_stack_under_play() {
        let mut state = state_10x20();
        for i in 0..100 {
            match i % 5 {
                0 => state.move_left(),
                1 => state.rotate(),
                2 => state.move_right(),
                3 => state.soft_drop(),
                _ => state.advance(Duration::from_millis(600)),
            }
            for (r, c) in state.piece.cells() {
                assert!(r >= 0 && (r as usize) < state.board.height());
                assert!(c >= 0 && (c as usize) < state.board.width());
                assert_eq!(state.board.get(r as usize, c as usize), Some(Cell::Empty));
            }
        }
    }
}
