use rand::Rng;
use std::fmt;

/// A direction to slide/merge tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Up,
    Right,
    Down,
    Left,
}

impl Action {
    /// Enumeration order used wherever a policy scans its options.
    pub const ALL: [Action; 4] = [Action::Up, Action::Right, Action::Down, Action::Left];
}

/// Clockwise quarter-turns applied before and after the canonical left
/// merge, indexed by `Action`. Pre + post is always 0 or 4, so the board's
/// absolute orientation is preserved across a move.
const ROTATIONS: [(usize, usize); 4] = [(3, 1), (2, 2), (1, 3), (0, 0)];

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    #[error("action did not move any tile")]
    IllegalAction,
    #[error("board is full, cannot spawn any tile")]
    GameOver,
}

/// A 4x4 2048 board storing one base-2 exponent per cell, row-major.
///
/// A cell holds `log2(tile)`: 0 is empty, 1 is the "2" tile, 11 is "2048".
/// Exponents are expected to stay below the value function's digit base
/// (tiles up to 2^14); the engine itself never caps them.
///
/// `Board` is a plain value: copy it to take a snapshot, no move ever
/// aliases a live board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board {
    cells: [u8; 16],
}

impl Board {
    /// A constant empty board (all zeros).
    pub const EMPTY: Board = Board { cells: [0; 16] };

    /// Construct a `Board` from 16 row-major exponents.
    #[inline]
    pub fn from_cells(cells: [u8; 16]) -> Self {
        Board { cells }
    }

    /// A fresh game: empty board seeded with a "2" and a "4" tile at two
    /// distinct random cells.
    ///
    /// Deterministic example using a seeded RNG:
    /// ```
    /// use rand::{rngs::StdRng, SeedableRng};
    /// use td_2048::engine::Board;
    /// let mut rng = StdRng::seed_from_u64(42);
    /// let board = Board::new_game(&mut rng);
    /// assert_eq!(board.count_empty(), 14);
    /// ```
    pub fn new_game<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut board = Board::EMPTY;
        board.reset(rng);
        board
    }

    /// Clear all cells, then place exponent 1 and exponent 2 tiles at two
    /// distinct uniformly random empty cells.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cells = [0; 16];
        self.place_random(1, rng);
        self.place_random(2, rng);
    }

    /// The exponent stored at `idx` (row-major, 0..16).
    #[inline]
    pub fn exponent(&self, idx: usize) -> u8 {
        self.cells[idx]
    }

    /// The displayed value at `idx`: `2^exponent`, or 0 for an empty cell.
    #[inline]
    pub fn tile_value(&self, idx: usize) -> u32 {
        match self.cells[idx] {
            0 => 0,
            exp => 1 << exp,
        }
    }

    /// The largest displayed tile value, 0 if the board is empty.
    pub fn highest_tile(&self) -> u32 {
        match self.cells.iter().copied().max().unwrap_or(0) {
            0 => 0,
            exp => 1 << exp,
        }
    }

    /// Count the number of empty cells.
    pub fn count_empty(&self) -> usize {
        self.empty_cells().count()
    }

    /// Slide and merge all tiles toward `action`'s direction.
    ///
    /// Returns the summed merge reward (`2^(exp+1)` per merged pair). Fails
    /// with [`EngineError::IllegalAction`], leaving the board untouched, when
    /// the move would change nothing; that unchanged-board test is the sole
    /// legality check.
    ///
    /// ```
    /// use td_2048::engine::{Action, Board, EngineError};
    /// let mut board = Board::from_cells([
    ///     1, 1, 0, 0, //
    ///     0, 0, 0, 0, //
    ///     0, 0, 0, 0, //
    ///     0, 0, 0, 0,
    /// ]);
    /// assert_eq!(board.act(Action::Left), Ok(4));
    /// assert_eq!(board.exponent(0), 2);
    /// assert_eq!(board.act(Action::Left), Err(EngineError::IllegalAction));
    /// ```
    pub fn act(&mut self, action: Action) -> Result<u32, EngineError> {
        let before = *self;
        let (pre, post) = ROTATIONS[action as usize];
        for _ in 0..pre {
            self.rotate_cw();
        }
        let reward = self.merge_to_left();
        for _ in 0..post {
            self.rotate_cw();
        }
        if *self == before {
            return Err(EngineError::IllegalAction);
        }
        Ok(reward)
    }

    /// Place one new tile, failing with [`EngineError::GameOver`] when no
    /// cell is empty.
    ///
    /// With `random_tile` false the tile is an exponent 1 at the first empty
    /// index, for reproducible evaluation. With `random_tile` true it is an
    /// exponent 2 with probability 0.1 (else exponent 1) at a uniformly
    /// random empty cell.
    pub fn spawn_tile<R: Rng + ?Sized>(
        &mut self,
        random_tile: bool,
        rng: &mut R,
    ) -> Result<(), EngineError> {
        let Some(first_empty) = self.empty_cells().next() else {
            return Err(EngineError::GameOver);
        };
        if random_tile {
            let exponent = if rng.gen_range(0..10) < 9 { 1 } else { 2 };
            self.place_random(exponent, rng);
        } else {
            self.cells[first_empty] = 1;
        }
        Ok(())
    }

    fn empty_cells(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &exp)| exp == 0)
            .map(|(idx, _)| idx)
    }

    fn place_random<R: Rng + ?Sized>(&mut self, exponent: u8, rng: &mut R) {
        let empty: Vec<usize> = self.empty_cells().collect();
        self.cells[empty[rng.gen_range(0..empty.len())]] = exponent;
    }

    /// Rotate the grid 90 degrees clockwise in place.
    fn rotate_cw(&mut self) {
        let src = self.cells;
        for row in 0..4 {
            for col in 0..4 {
                self.cells[row * 4 + col] = src[(3 - col) * 4 + row];
            }
        }
    }

    /// Merge every row toward column 0, returning the summed merge reward.
    fn merge_to_left(&mut self) -> u32 {
        let mut reward = 0;
        for r in 0..4 {
            let i = r * 4;
            let (row_reward, merged) = merge_row([
                self.cells[i],
                self.cells[i + 1],
                self.cells[i + 2],
                self.cells[i + 3],
            ]);
            self.cells[i..i + 4].copy_from_slice(&merged);
            reward += row_reward;
        }
        reward
    }
}

/// Slide one row of exponents toward index 0, merging each adjacent equal
/// pair exactly once per pass. A freshly merged tile never re-merges with
/// its new neighbor.
fn merge_row(row: [u8; 4]) -> (u32, [u8; 4]) {
    let mut out = [0u8; 4];
    let mut reward = 0u32;
    let mut n = 0;
    let mut hold: Option<u8> = None;
    for exp in row.into_iter().filter(|&exp| exp != 0) {
        match hold {
            Some(held) if held == exp => {
                reward += 1 << (held + 1);
                out[n] = held + 1;
                n += 1;
                hold = None;
            }
            Some(held) => {
                out[n] = held;
                n += 1;
                hold = Some(exp);
            }
            None => hold = Some(exp),
        }
    }
    if let Some(held) = hold {
        out[n] = held;
    }
    (reward, out)
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(4) {
            for &exp in row {
                match exp {
                    0 => write!(f, "{:>6}", ".")?,
                    _ => write!(f, "{:>6}", 1u32 << exp)?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
