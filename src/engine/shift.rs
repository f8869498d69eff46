//! Directional compaction and merging.
//!
//! All four directions share one line routine. A line is read starting at
//! the wall the tiles move toward, so `line[0]` is the wall cell:
//! - Left: a row, left to right
//! - Right: a row, right to left
//! - Up: a column, top to bottom
//! - Down: a column, bottom to top
//!
//! A sweep visits cells `1..4` in order; a non-empty tile looks only at its
//! wall-side neighbour and either slides one cell into it (if empty), merges
//! into it (if equal and this line has not merged yet during the move), or
//! stays. Sweeps repeat until one changes nothing. The first sweep alone is
//! the classic single-pass step; the repeats finish compaction. A line
//! merges at most once per move, and two [`MAX_TILE`]s never merge.
//!
//! Lines whose tiles are all below 2^15 pack into a 16-bit key (one exponent
//! nibble per cell, wall cell in the low nibble) and are looked up in a
//! 65,536-entry table built from the same sweep routine on first use. Larger
//! lines run the sweeps directly.

use std::sync::OnceLock;

use super::state::{Board, Score, Tile, MAX_TILE, SIZE};
use super::Move;

/// Result of one directional move.
///
/// `score` is the score passed in plus the value of every merged tile. When
/// `moved` is false, `board` equals the input and `score` is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub board: Board,
    pub moved: bool,
    pub score: Score,
}

type Line = [Tile; SIZE];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct LineShift {
    moved: bool,
    gained: Score,
}

const LINE_TABLE_SIZE: usize = 1 << 16;
/// Highest exponent a table key may hold; merging two of them still fits a nibble.
const TABLE_MAX_EXPONENT: u32 = 14;

#[derive(Debug, Clone, Copy, Default)]
struct LineEntry {
    line: u16,
    gained: u32,
}

static LINE_TABLE: OnceLock<Box<[LineEntry]>> = OnceLock::new();

fn create_line_table() -> Box<[LineEntry]> {
    // Heap allocation keeps the 512 KiB table off the stack.
    let mut table = vec![LineEntry::default(); LINE_TABLE_SIZE];
    for (key, entry) in table.iter_mut().enumerate() {
        let key = key as u16;
        let mut line = unpack_line(key);
        // Keys with a 15 nibble never come out of `pack_line`.
        let res = if is_table_key(key) { shift_line(&mut line) } else { LineShift::default() };
        entry.line = pack_exponents(&line);
        entry.gained = res.gained as u32;
    }
    table.into_boxed_slice()
}

#[inline(always)]
fn line_table() -> &'static [LineEntry] { LINE_TABLE.get_or_init(create_line_table) }

#[inline]
fn is_table_key(key: u16) -> bool { (0..SIZE).all(|k| u32::from((key >> (4 * k)) & 0xf) <= TABLE_MAX_EXPONENT) }

/// Pack a line into exponent nibbles, or `None` if a tile is too large for the table.
#[inline]
fn pack_line(line: &Line) -> Option<u16> {
    if line.iter().any(|&v| v != 0 && v.trailing_zeros() > TABLE_MAX_EXPONENT) {
        return None;
    }
    Some(pack_exponents(line))
}

/// Tiles must be below 2^16.
#[inline]
fn pack_exponents(line: &Line) -> u16 {
    line.iter().enumerate().fold(0, |key, (k, &v)| {
        let exp = if v == 0 { 0 } else { v.trailing_zeros() as u16 };
        key | (exp << (4 * k))
    })
}

#[inline]
fn unpack_line(key: u16) -> Line {
    let mut line = [0; SIZE];
    for (k, slot) in line.iter_mut().enumerate() {
        let exp = (key >> (4 * k)) & 0xf;
        *slot = if exp == 0 { 0 } else { 1 << exp };
    }
    line
}

fn shift_line_cached(line: &mut Line) -> LineShift {
    let Some(key) = pack_line(line) else {
        return shift_line(line);
    };
    let entry = line_table()[key as usize];
    if entry.line == key {
        return LineShift::default();
    }
    *line = unpack_line(entry.line);
    LineShift { moved: true, gained: Score::from(entry.gained) }
}

impl Board {
    /// Slide/merge tiles in `dir`. No random insert; `score` in the outcome is
    /// only what this move gained.
    ///
    /// ```
    /// use rollout_2048::engine::{Board, Move};
    /// let b = Board::from_rows([[2, 0, 2, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
    /// let out = b.shift(Move::Left);
    /// assert!(out.moved);
    /// assert_eq!(out.score, 4);
    /// assert_eq!(out.board.rows()[0], [4, 0, 0, 0]);
    /// ```
    pub fn shift(self, dir: Move) -> MoveOutcome {
        let mut board = self;
        let mut total = LineShift::default();
        for idx in 0..SIZE {
            let mut line = read_line(&board, dir, idx);
            let res = shift_line_cached(&mut line);
            if res.moved {
                write_line(&mut board, dir, idx, &line);
                total.moved = true;
                total.gained += res.gained;
            }
        }
        MoveOutcome { board, moved: total.moved, score: total.gained }
    }

    /// True if shifting in `dir` would change the board.
    #[inline]
    pub fn can_move(self, dir: Move) -> bool { self.shift(dir).moved }
}

/// Position of the `k`-th cell (counted from the wall) of line `idx` for `dir`.
#[inline]
fn cell(dir: Move, idx: usize, k: usize) -> (usize, usize) {
    let far = SIZE - 1 - k;
    match dir {
        Move::Left => (idx, k),
        Move::Right => (idx, far),
        Move::Up => (k, idx),
        Move::Down => (far, idx),
    }
}

fn read_line(board: &Board, dir: Move, idx: usize) -> Line {
    let mut line = [0; SIZE];
    for (k, slot) in line.iter_mut().enumerate() {
        let (r, c) = cell(dir, idx, k);
        *slot = board.get(r, c);
    }
    line
}

fn write_line(board: &mut Board, dir: Move, idx: usize, line: &Line) {
    for (k, &v) in line.iter().enumerate() {
        let (r, c) = cell(dir, idx, k);
        board.set(r, c, v);
    }
}

fn shift_line(line: &mut Line) -> LineShift {
    let mut out = LineShift::default();
    let mut merged = false;
    loop {
        let changed = sweep(line, &mut merged, &mut out.gained);
        if !changed {
            break;
        }
        out.moved = true;
    }
    out
}

/// One wall-ward sweep. Each tile moves at most one cell.
fn sweep(line: &mut Line, merged: &mut bool, gained: &mut Score) -> bool {
    let mut changed = false;
    for i in 1..SIZE {
        let val = line[i];
        if val == 0 {
            continue;
        }
        let next = line[i - 1];
        if next == 0 {
            line[i - 1] = val;
            line[i] = 0;
            changed = true;
        } else if next == val && val < MAX_TILE && !*merged {
            let doubled = val << 1;
            line[i - 1] = doubled;
            line[i] = 0;
            *gained += doubled as Score;
            *merged = true;
            changed = true;
        }
    }
    changed
}
