use serde::{Deserialize, Serialize};

use crate::engine::state::SIZE;
use crate::engine::Board;

/// Weights of the static board evaluation. Higher totals are better; only
/// the ranking between boards matters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvalWeights {
    /// Per unit of tile value.
    pub tile_sum: f64,
    /// Per empty cell.
    pub empty_cells: f64,
    /// Per unit of `tile * (row * 4 + col)`, favouring big tiles toward the bottom right.
    pub position: f64,
}

impl Default for EvalWeights {
    fn default() -> Self { Self { tile_sum: 1.0, empty_cells: 2.0, position: 0.1 } }
}

/// Evaluate a board with the default weights.
///
/// ```
/// use rollout_2048::engine::Board;
/// use rollout_2048::rollout::evaluate;
/// let b = Board::from_rows([[2, 0, 0, 0], [0; 4], [0; 4], [0, 0, 0, 4]]).unwrap();
/// // 6 (tiles) + 14 * 2 (empty) + 4 * 15 * 0.1 (position)
/// assert!((evaluate(b) - 40.0).abs() < 1e-9);
/// ```
#[inline]
pub fn evaluate(board: Board) -> f64 { evaluate_with(board, &EvalWeights::default()) }

pub fn evaluate_with(board: Board, w: &EvalWeights) -> f64 {
    let mut sum = 0.0;
    let mut empty = 0.0;
    let mut position = 0.0;
    for (r, line) in board.rows().iter().enumerate() {
        for (c, &tile) in line.iter().enumerate() {
            if tile == 0 {
                empty += 1.0;
                continue;
            }
            let tile = tile as f64;
            sum += tile;
            position += tile * (r * SIZE + c) as f64;
        }
    }
    sum * w.tile_sum + empty * w.empty_cells + position * w.position
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool { (a - b).abs() < 1e-9 }

    #[test]
    fn empty_board_scores_only_empties() {
        assert!(approx(evaluate(Board::EMPTY), 32.0));
    }

    #[test]
    fn position_term_uses_linear_index() {
        let top_left = Board::from_rows_unchecked([[8, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let bottom_right = Board::from_rows_unchecked([[0; 4], [0; 4], [0; 4], [0, 0, 0, 8]]);
        assert!(approx(evaluate(top_left), 8.0 + 30.0));
        assert!(approx(evaluate(bottom_right), 8.0 + 30.0 + 8.0 * 15.0 * 0.1));
        assert!(evaluate(bottom_right) > evaluate(top_left));
    }

    #[test]
    fn custom_weights() {
        let b = Board::from_rows_unchecked([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let only_empty = EvalWeights { tile_sum: 0.0, empty_cells: 1.0, position: 0.0 };
        assert!(approx(evaluate_with(b, &only_empty), 14.0));
        let only_position = EvalWeights { tile_sum: 0.0, empty_cells: 0.0, position: 1.0 };
        assert!(approx(evaluate_with(b, &only_position), 2.0));
    }
}
