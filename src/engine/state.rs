use std::fmt;

use serde::{Deserialize, Serialize};

/// Side length of the board.
pub const SIZE: usize = 4;

/// Actual tile value (0 = empty, otherwise a power of two).
pub type Tile = u32;
/// Running score.
pub type Score = u64;

/// Largest tile a board may hold. Two of them never merge, so shifts stay
/// inside `Tile` and every board packs into exponents `0..=MAX_EXPONENT`.
pub const MAX_TILE: Tile = 1 << MAX_EXPONENT;
/// Exponent of [`MAX_TILE`].
pub const MAX_EXPONENT: u8 = 30;

type Rows = [[Tile; SIZE]; SIZE];

/// A 4x4 2048 board stored as actual tile values, row-major.
///
/// `Board` is `Copy`: moves and spawns return new boards and never touch
/// the one they were called on.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Board(Rows);

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("tile {value} at ({row}, {col}) is not a power of two")]
    InvalidTile { row: usize, col: usize, value: Tile },
    #[error("tile {value} at ({row}, {col}) is above the {} limit", MAX_TILE)]
    TileTooLarge { row: usize, col: usize, value: Tile },
    #[error("tile exponent {exp} at index {idx} is out of range")]
    InvalidExponent { idx: usize, exp: u8 },
}

impl Board {
    /// A constant empty board.
    pub const EMPTY: Board = Board([[0; SIZE]; SIZE]);

    /// Build a board from rows, checking that every non-zero tile is a power
    /// of two no larger than [`MAX_TILE`].
    ///
    /// ```
    /// use rollout_2048::engine::{Board, BoardError};
    /// assert!(Board::from_rows([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]).is_ok());
    /// assert!(matches!(
    ///     Board::from_rows([[3, 0, 0, 0], [0; 4], [0; 4], [0; 4]]),
    ///     Err(BoardError::InvalidTile { row: 0, col: 0, value: 3 })
    /// ));
    /// ```
    pub fn from_rows(rows: Rows) -> Result<Self, BoardError> {
        for (row, line) in rows.iter().enumerate() {
            for (col, &value) in line.iter().enumerate() {
                // 1 is a power of two but never a tile.
                if value == 1 || (value != 0 && !value.is_power_of_two()) {
                    return Err(BoardError::InvalidTile { row, col, value });
                }
                if value > MAX_TILE {
                    return Err(BoardError::TileTooLarge { row, col, value });
                }
            }
        }
        Ok(Board(rows))
    }

    /// Build a board without validation. Callers guarantee the tile invariant.
    #[inline]
    pub const fn from_rows_unchecked(rows: Rows) -> Self { Board(rows) }

    /// Borrow the rows.
    #[inline]
    pub fn rows(&self) -> &Rows { &self.0 }

    /// Consume this board, returning its rows.
    #[inline]
    pub fn into_rows(self) -> Rows { self.0 }

    /// Tile at `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Tile { self.0[row][col] }

    #[inline]
    pub(crate) fn set(&mut self, row: usize, col: usize, value: Tile) { self.0[row][col] = value; }

    /// Tile at row-major index `0..16`.
    #[inline]
    pub fn tile_value(&self, idx: usize) -> Tile { self.0[idx / SIZE][idx % SIZE] }

    /// Iterate non-empty cells as `(row, col, value)`.
    pub fn tiles(&self) -> impl Iterator<Item = (usize, usize, Tile)> + '_ {
        self.0.iter().enumerate().flat_map(|(r, line)| {
            line.iter().enumerate().filter_map(move |(c, &v)| (v != 0).then_some((r, c, v)))
        })
    }

    /// True iff no cell is empty.
    #[inline]
    pub fn is_full(&self) -> bool { self.0.iter().all(|line| line.iter().all(|&v| v != 0)) }

    /// True iff some horizontally or vertically adjacent pair holds equal non-zero values.
    ///
    /// Two neighbouring empty cells are not a merge, and neither are two
    /// [`MAX_TILE`]s.
    pub fn has_available_merge(&self) -> bool {
        for r in 0..SIZE {
            for c in 0..SIZE {
                let v = self.0[r][c];
                if v == 0 || v >= MAX_TILE {
                    continue;
                }
                if c + 1 < SIZE && self.0[r][c + 1] == v {
                    return true;
                }
                if r + 1 < SIZE && self.0[r + 1][c] == v {
                    return true;
                }
            }
        }
        false
    }

    /// All empty coordinates as `(row, col)`, row-major.
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        let mut cells = Vec::with_capacity(SIZE * SIZE);
        for (r, line) in self.0.iter().enumerate() {
            for (c, &v) in line.iter().enumerate() {
                if v == 0 {
                    cells.push((r, c));
                }
            }
        }
        cells
    }

    /// Count the number of empty cells on the board.
    #[inline]
    pub fn count_empty(&self) -> usize { self.0.iter().flatten().filter(|&&v| v == 0).count() }

    /// Sum of all tile values.
    #[inline]
    pub fn tile_sum(&self) -> u64 { self.0.iter().flatten().map(|&v| v as u64).sum() }

    /// Return the highest tile value present (0 on an empty board).
    #[inline]
    pub fn highest_tile(&self) -> Tile { self.0.iter().flatten().copied().max().unwrap_or(0) }

    /// Pack into 16 exponent bytes, row-major (0 = empty, k = 2^k).
    pub fn to_exponents(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        for (slot, &v) in out.iter_mut().zip(self.0.iter().flatten()) {
            *slot = if v == 0 { 0 } else { v.trailing_zeros() as u8 };
        }
        out
    }

    /// Inverse of [`Board::to_exponents`].
    pub fn from_exponents(exps: [u8; 16]) -> Result<Self, BoardError> {
        let mut rows = [[0; SIZE]; SIZE];
        for (idx, &exp) in exps.iter().enumerate() {
            if exp > MAX_EXPONENT {
                return Err(BoardError::InvalidExponent { idx, exp });
            }
            rows[idx / SIZE][idx % SIZE] = if exp == 0 { 0 } else { (1 as Tile) << exp };
        }
        Ok(Board(rows))
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({:?})", self.0)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, line) in self.0.iter().enumerate() {
            if r > 0 {
                writeln!(f, "-------------------------------")?;
            }
            let cells: Vec<String> = line.iter().map(|&v| format_val(v)).collect();
            writeln!(f, "{}", cells.join("|"))?;
        }
        Ok(())
    }
}

impl TryFrom<Rows> for Board {
    type Error = BoardError;
    fn try_from(rows: Rows) -> Result<Self, Self::Error> { Board::from_rows(rows) }
}

impl From<Board> for Rows { fn from(b: Board) -> Self { b.into_rows() } }

fn format_val(val: Tile) -> String {
    match val {
        0 => " ".repeat(7),
        x => format!("{:^7}", x),
    }
}
