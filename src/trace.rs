//! Binary run traces.
//!
//! Layout (little-endian):
//! - header: magic `R2T1`, version, endian flag, steps (u32), seed (u64),
//!   start time (u64 unix s), elapsed (f32 s), final score (u64),
//!   highest tile (u32), rollout iterations (u32), engine string length (u16)
//! - engine string bytes
//! - `steps + 1` boards, 16 exponent bytes each
//! - `steps + 1` scores (u64)
//! - `steps` moves (u8: Up=0, Down=1, Left=2, Right=3)
//! - CRC32C of everything above (u32)

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::engine::{Board, Move, Score};

const MAGIC: &[u8; 4] = b"R2T1";
const VERSION: u8 = 1;
const ENDIAN_LE: u8 = 0;

// 4 magic + 1 version + 1 endian + 4 steps + 8 seed + 8 start + 4 elapsed + 8 score + 4 tile + 4 iterations + 2 engine_len
const HEADER_LEN: usize = 4 + 1 + 1 + 4 + 8 + 8 + 4 + 8 + 4 + 4 + 2;
const BOARD_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub steps: u32,
    pub seed: u64,
    pub start_unix_s: u64,
    pub elapsed_s: f32,
    pub final_score: u64,
    pub highest_tile: u32,
    pub iterations: u32,
    /// Never `Some("")`: an empty string is stored as `None`.
    pub engine_str: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub meta: Meta,
    pub states: Vec<Board>, // length = steps + 1
    pub scores: Vec<Score>, // length = steps + 1
    pub moves: Vec<Move>,   // length = steps
}

#[derive(thiserror::Error, Debug)]
pub enum TraceError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid magic or version")]
    MagicOrVersion,
    #[error("unsupported endianness")]
    Endianness,
    #[error("file too short or malformed")]
    Malformed,
    #[error("checksum mismatch")]
    Checksum,
    #[error("invalid move byte {0}")]
    InvalidMove(u8),
    #[error("run has {states} states, {scores} scores and {moves} moves for {steps} steps")]
    LengthMismatch { steps: u32, states: usize, scores: usize, moves: usize },
    #[error("engine string longer than {} bytes", u16::MAX)]
    EngineStrTooLong,
}

/// Collects boards, scores and moves while a game is played.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    states: Vec<Board>,
    scores: Vec<Score>,
    moves: Vec<Move>,
}

impl Recorder {
    /// Start recording from the initial board.
    pub fn new(board: Board, score: Score) -> Self {
        let mut states = Vec::with_capacity(1024);
        let mut scores = Vec::with_capacity(1024);
        states.push(board);
        scores.push(score);
        Recorder { states, scores, moves: Vec::with_capacity(1024) }
    }

    /// Record a successful move and the board/score it produced.
    pub fn push(&mut self, dir: Move, board: Board, score: Score) {
        self.moves.push(dir);
        self.states.push(board);
        self.scores.push(score);
    }

    #[inline]
    pub fn steps(&self) -> usize { self.moves.len() }

    /// Finish the run. Derived metadata fields are filled from the recording.
    pub fn finish(self, seed: u64, start_unix_s: u64, elapsed_s: f32, iterations: u32, engine_str: Option<String>) -> Run {
        let final_score = self.scores.last().copied().unwrap_or(0);
        let highest_tile = self.states.iter().map(|b| b.highest_tile()).max().unwrap_or(0);
        let meta = Meta {
            steps: self.moves.len() as u32,
            seed,
            start_unix_s,
            elapsed_s,
            final_score,
            highest_tile,
            iterations,
            engine_str: engine_str.filter(|s| !s.is_empty()),
        };
        Run { meta, states: self.states, scores: self.scores, moves: self.moves }
    }
}

#[inline]
fn move_to_u8(m: Move) -> u8 { m.index() as u8 }

#[inline]
fn read_u16_le(bytes: &[u8]) -> Option<u16> {
    Some(u16::from_le_bytes(bytes.get(..2)?.try_into().ok()?))
}

#[inline]
fn read_u32_le(bytes: &[u8]) -> Option<u32> {
    Some(u32::from_le_bytes(bytes.get(..4)?.try_into().ok()?))
}

#[inline]
fn read_u64_le(bytes: &[u8]) -> Option<u64> {
    Some(u64::from_le_bytes(bytes.get(..8)?.try_into().ok()?))
}

pub fn encode_run(run: &Run) -> Result<Vec<u8>, TraceError> {
    let meta = &run.meta;
    let steps = meta.steps as usize;
    if run.states.len() != steps + 1 || run.scores.len() != steps + 1 || run.moves.len() != steps {
        return Err(TraceError::LengthMismatch {
            steps: meta.steps,
            states: run.states.len(),
            scores: run.scores.len(),
            moves: run.moves.len(),
        });
    }

    let engine_bytes = meta.engine_str.as_deref().map(str::as_bytes).unwrap_or(&[]);
    let engine_len: u16 = engine_bytes.len().try_into().map_err(|_| TraceError::EngineStrTooLong)?;

    let payload_len = engine_bytes.len() + run.states.len() * (BOARD_LEN + 8) + run.moves.len();
    let mut buf = Vec::with_capacity(HEADER_LEN + payload_len + 4);

    buf.extend_from_slice(MAGIC);
    buf.push(VERSION);
    buf.push(ENDIAN_LE);
    buf.extend_from_slice(&meta.steps.to_le_bytes());
    buf.extend_from_slice(&meta.seed.to_le_bytes());
    buf.extend_from_slice(&meta.start_unix_s.to_le_bytes());
    buf.extend_from_slice(&meta.elapsed_s.to_bits().to_le_bytes());
    buf.extend_from_slice(&meta.final_score.to_le_bytes());
    buf.extend_from_slice(&meta.highest_tile.to_le_bytes());
    buf.extend_from_slice(&meta.iterations.to_le_bytes());
    buf.extend_from_slice(&engine_len.to_le_bytes());
    buf.extend_from_slice(engine_bytes);

    for board in &run.states {
        buf.extend_from_slice(&board.to_exponents());
    }
    for score in &run.scores {
        buf.extend_from_slice(&score.to_le_bytes());
    }
    buf.extend(run.moves.iter().map(|&m| move_to_u8(m)));

    let checksum = crc32c::crc32c(&buf);
    buf.extend_from_slice(&checksum.to_le_bytes());
    Ok(buf)
}

pub fn write_run_to_path<P: AsRef<Path>>(path: P, run: &Run) -> Result<(), TraceError> {
    let data = encode_run(run)?;
    let mut f = fs::File::create(path)?;
    f.write_all(&data)?;
    Ok(())
}

pub fn parse_run_bytes(bytes: &[u8]) -> Result<Run, TraceError> {
    if bytes.len() < HEADER_LEN + 4 {
        return Err(TraceError::Malformed);
    }

    // Validate checksum first to avoid reading garbage fields
    let (content, trailer) = bytes.split_at(bytes.len() - 4);
    let file_crc = read_u32_le(trailer).ok_or(TraceError::Malformed)?;
    if file_crc != crc32c::crc32c(content) {
        return Err(TraceError::Checksum);
    }

    if &content[..4] != MAGIC || content[4] != VERSION {
        return Err(TraceError::MagicOrVersion);
    }
    if content[5] != ENDIAN_LE {
        return Err(TraceError::Endianness);
    }

    let mut off = 6;
    let steps = read_u32_le(&content[off..]).ok_or(TraceError::Malformed)?; off += 4;
    let seed = read_u64_le(&content[off..]).ok_or(TraceError::Malformed)?; off += 8;
    let start_unix_s = read_u64_le(&content[off..]).ok_or(TraceError::Malformed)?; off += 8;
    let elapsed_s = f32::from_bits(read_u32_le(&content[off..]).ok_or(TraceError::Malformed)?); off += 4;
    let final_score = read_u64_le(&content[off..]).ok_or(TraceError::Malformed)?; off += 8;
    let highest_tile = read_u32_le(&content[off..]).ok_or(TraceError::Malformed)?; off += 4;
    let iterations = read_u32_le(&content[off..]).ok_or(TraceError::Malformed)?; off += 4;
    let engine_len = read_u16_le(&content[off..]).ok_or(TraceError::Malformed)? as usize; off += 2;

    let engine_bytes = content.get(off..off + engine_len).ok_or(TraceError::Malformed)?;
    off += engine_len;
    let engine_str = if engine_len > 0 {
        Some(std::str::from_utf8(engine_bytes).map_err(|_| TraceError::Malformed)?.to_string())
    } else {
        None
    };

    let states_count = (steps as usize).checked_add(1).ok_or(TraceError::Malformed)?;
    let states_len = states_count.checked_mul(BOARD_LEN).ok_or(TraceError::Malformed)?;
    let scores_len = states_count.checked_mul(8).ok_or(TraceError::Malformed)?;
    if content.len() != off + states_len + scores_len + steps as usize {
        return Err(TraceError::Malformed);
    }

    let states = content[off..off + states_len]
        .chunks_exact(BOARD_LEN)
        .map(|chunk| {
            let mut exps = [0u8; BOARD_LEN];
            exps.copy_from_slice(chunk);
            Board::from_exponents(exps).map_err(|_| TraceError::Malformed)
        })
        .collect::<Result<Vec<_>, _>>()?;
    off += states_len;

    let scores = content[off..off + scores_len]
        .chunks_exact(8)
        .map(|chunk| read_u64_le(chunk).ok_or(TraceError::Malformed))
        .collect::<Result<Vec<_>, _>>()?;
    off += scores_len;

    let moves = content[off..]
        .iter()
        .map(|&b| Move::from_index(b as usize).ok_or(TraceError::InvalidMove(b)))
        .collect::<Result<Vec<_>, _>>()?;

    let meta = Meta { steps, seed, start_unix_s, elapsed_s, final_score, highest_tile, iterations, engine_str };
    Ok(Run { meta, states, scores, moves })
}

pub fn parse_run_file<P: AsRef<Path>>(path: P) -> Result<Run, TraceError> {
    let data = fs::read(path)?;
    parse_run_bytes(&data)
}

pub fn now_unix_seconds() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}
