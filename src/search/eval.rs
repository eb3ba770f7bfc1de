//! The evaluator interface and a plain material/piece-square evaluator.
//!
//! The search treats evaluators as opaque: any type answering
//! `evaluate_for_stm` with a bounded score works, and the bounds are hints
//! it may ignore. Learned evaluators live outside this crate; they
//! typically run `see::global_exchange_evaluation` first to judge a calm
//! position instead of a capture-storm one.

use crate::bitboard::BitIter;
use crate::board::{
    Board, BB, BK, BLACK, BN, BP, BQ, BR, WB, WK, WN, WP, WQ, WR,
};
use crate::moves::attacks::ADJACENT_FILES_OF;
use crate::search::Score;

pub trait Evaluator {
    /// Signed score with 0 = draw, positive = the side to move is better.
    /// `lower`/`upper` are window hints; implementations may cut corners
    /// outside them.
    fn evaluate_for_stm(&self, board: &mut Board, lower: Score, upper: Score) -> Score;

    /// Bulk entry point; the default just iterates.
    fn batch_evaluate(
        &self,
        boards: &mut [Board],
        results: &mut [Score],
        lower: Score,
        upper: Score,
    ) {
        for (board, result) in boards.iter_mut().zip(results.iter_mut()) {
            *result = self.evaluate_for_stm(board, lower, upper);
        }
    }

    /// Optional diagnostic dump.
    fn print_diag(&self, _board: &mut Board) {}
}

const MAT: [Score; 6] = [0, 1200, 600, 400, 400, 100]; // K Q R N B P

const ISOLATED_PAWN_PENALTY: Score = 12;

#[rustfmt::skip]
const PAWN_PSQT: [Score; 64] = [
      0,   0,   0,   0,   0,   0,   0,   0,
      2,   4,   4, -12, -12,   4,   4,   2,
      2,  -2,  -4,   2,   2,  -4,  -2,   2,
      0,   0,   6,  16,  16,   6,   0,   0,
      4,   4,  10,  20,  20,  10,   4,   4,
     10,  12,  18,  24,  24,  18,  12,  10,
     30,  32,  36,  40,  40,  36,  32,  30,
      0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const KNIGHT_PSQT: [Score; 64] = [
    -40, -24, -16, -12, -12, -16, -24, -40,
    -24,  -8,   0,   4,   4,   0,  -8, -24,
    -16,   4,  10,  14,  14,  10,   4, -16,
    -12,   6,  14,  20,  20,  14,   6, -12,
    -12,   6,  14,  20,  20,  14,   6, -12,
    -16,   4,  10,  14,  14,  10,   4, -16,
    -24,  -8,   0,   4,   4,   0,  -8, -24,
    -40, -24, -16, -12, -12, -16, -24, -40,
];

#[rustfmt::skip]
const BISHOP_PSQT: [Score; 64] = [
    -16,  -8,  -8,  -8,  -8,  -8,  -8, -16,
     -8,   6,   4,   4,   4,   4,   6,  -8,
     -8,   4,   8,   8,   8,   8,   4,  -8,
     -8,   4,   8,  12,  12,   8,   4,  -8,
     -8,   4,   8,  12,  12,   8,   4,  -8,
     -8,   4,   8,   8,   8,   8,   4,  -8,
     -8,   6,   4,   4,   4,   4,   6,  -8,
    -16,  -8,  -8,  -8,  -8,  -8,  -8, -16,
];

#[rustfmt::skip]
const ROOK_PSQT: [Score; 64] = [
     -2,   0,   4,   8,   8,   4,   0,  -2,
     -4,   0,   0,   4,   4,   0,   0,  -4,
     -4,   0,   0,   4,   4,   0,   0,  -4,
     -4,   0,   0,   4,   4,   0,   0,  -4,
     -4,   0,   0,   4,   4,   0,   0,  -4,
     -4,   0,   0,   4,   4,   0,   0,  -4,
     10,  12,  12,  14,  14,  12,  12,  10,
      2,   2,   4,   6,   6,   4,   2,   2,
];

#[rustfmt::skip]
const QUEEN_PSQT: [Score; 64] = [
    -12,  -8,  -6,  -2,  -2,  -6,  -8, -12,
     -8,  -2,   0,   2,   2,   0,  -2,  -8,
     -6,   0,   4,   4,   4,   4,   0,  -6,
     -2,   2,   4,   6,   6,   4,   2,  -2,
     -2,   2,   4,   6,   6,   4,   2,  -2,
     -6,   0,   4,   4,   4,   4,   0,  -6,
     -8,  -2,   0,   2,   2,   0,  -2,  -8,
    -12,  -8,  -6,  -2,  -2,  -6,  -8, -12,
];

#[rustfmt::skip]
const KING_PSQT: [Score; 64] = [
     16,  24,  12,   0,   0,  12,  24,  16,
     12,  12,   0,  -8,  -8,   0,  12,  12,
     -8, -12, -16, -20, -20, -16, -12,  -8,
    -16, -20, -24, -28, -28, -24, -20, -16,
    -24, -28, -32, -36, -36, -32, -28, -24,
    -24, -28, -32, -36, -36, -32, -28, -24,
    -24, -28, -32, -36, -36, -32, -28, -24,
    -24, -28, -32, -36, -36, -32, -28, -24,
];

fn psqt_for(role: u8) -> &'static [Score; 64] {
    match role {
        WQ => &QUEEN_PSQT,
        WR => &ROOK_PSQT,
        WN => &KNIGHT_PSQT,
        WB => &BISHOP_PSQT,
        WP => &PAWN_PSQT,
        _ => &KING_PSQT,
    }
}

/// Material plus piece-square terms, with an isolated-pawn nudge. No
/// tapering, no king safety: this is the fallback evaluator the search can
/// always rely on, not a strength project.
pub struct MaterialEvaluator;

impl MaterialEvaluator {
    fn side_score(board: &Board, pieces: [u8; 6], black: bool) -> i32 {
        let mut score = 0i32;
        let own_pawns = board.piece_bitboard(pieces[5]);

        for (role, &pt) in pieces.iter().enumerate() {
            let table = psqt_for(role as u8);
            for sq in BitIter(board.piece_bitboard(pt)) {
                let view_sq = if black { sq ^ 56 } else { sq };
                score += MAT[role] as i32 + table[view_sq] as i32;

                if pt == pieces[5] && ADJACENT_FILES_OF[sq] & own_pawns == 0 {
                    score -= ISOLATED_PAWN_PENALTY as i32;
                }
            }
        }
        score
    }
}

impl Evaluator for MaterialEvaluator {
    fn evaluate_for_stm(&self, board: &mut Board, _lower: Score, _upper: Score) -> Score {
        let white = MaterialEvaluator::side_score(board, [WK, WQ, WR, WN, WB, WP], false);
        let black = MaterialEvaluator::side_score(board, [BK, BQ, BR, BN, BB, BP], true);

        let from_white = (white - black).clamp(-20000, 20000) as Score;
        if board.side_to_move() == BLACK {
            -from_white
        } else {
            from_white
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn start_position_is_balanced() {
        let mut board = Board::start_position();
        assert_eq!(MaterialEvaluator.evaluate_for_stm(&mut board, -100, 100), 0);
    }

    #[test]
    fn evaluation_is_stm_relative() {
        let mut board = Board::from_str("7k/8/8/8/8/8/8/QK6 w - - 0 1").unwrap();
        let white_view = MaterialEvaluator.evaluate_for_stm(&mut board, -32000, 32000);
        assert!(white_view > 1000);

        let mut board = Board::from_str("7k/8/8/8/8/8/8/QK6 b - - 0 1").unwrap();
        let black_view = MaterialEvaluator.evaluate_for_stm(&mut board, -32000, 32000);
        assert!(black_view < -1000);
    }

    #[test]
    fn central_advance_shows_up_for_the_opponent() {
        let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
        let mut board = Board::from_str(fen).unwrap();
        let black_view = MaterialEvaluator.evaluate_for_stm(&mut board, -32000, 32000);
        assert!(black_view < 0);
    }

    #[test]
    fn isolated_pawns_are_penalised() {
        let mut lonely = Board::from_str("7k/8/8/8/8/8/P7/K7 w - - 0 1").unwrap();
        let mut connected = Board::from_str("7k/8/8/8/8/8/PP6/K7 w - - 0 1").unwrap();
        let one = MaterialEvaluator.evaluate_for_stm(&mut lonely, -32000, 32000);
        let two = MaterialEvaluator.evaluate_for_stm(&mut connected, -32000, 32000);
        assert!(two > one + MAT[5] - 1, "second connected pawn is worth more than its material");
    }
}
