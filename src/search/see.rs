//! Static exchange evaluation.
//!
//! A SEE answers "what does the capture sequence on this square settle to,
//! smallest attacker first, with either side free to stop?" It runs on the
//! board's lean SEE make/unmake, so X-ray attackers appear as pieces leave
//! the occupancy.

use crate::board::{Board, EMPTY, WK};
use crate::moves::movegen::MoveKind;
use crate::moves::types::Move;
use crate::search::Score;
use crate::square::Square;

/// Exchange values per piece tag. These are coarser than the evaluator's
/// notion of material on purpose: move ordering wants stable class
/// boundaries, not centipawn precision.
pub const SEE_MAT: [Score; 14] = [
    1500, // WK
    1200, // WQ
    600,  // WR
    400,  // WN
    400,  // WB
    100,  // WP
    0, 0, // occupancy tags
    1500, // BK
    1200, // BQ
    600,  // BR
    400,  // BN
    400,  // BB
    100,  // BP
];

/// Best tactical result of playing `mv` (which must be legal), for the
/// moving side. The first move is forced; everything after is optional.
pub fn static_exchange_evaluation(board: &mut Board, mv: Move) -> Score {
    board.reset_see();

    let pt = mv.piece_type();
    let from = mv.from_sq();
    let to = mv.to_sq();

    let captured = board.apply_move_see(pt, from, to);

    let ret = if captured != EMPTY {
        SEE_MAT[captured as usize] - exchange_on_square(board, to, false)
    } else {
        -exchange_on_square(board, to, false)
    };

    board.undo_move_see();

    ret
}

/// The value the side to move can extract from `sq`, treating the square as
/// if it were empty. "What is the biggest thing I could safely land there?"
pub fn see_map(board: &mut Board, sq: Square) -> Score {
    board.reset_see();
    -exchange_on_square(board, sq, true)
}

/// "What does *not* moving this piece cost me?" Passes the move, then asks
/// what the opponent can now extract from the piece's square. Positive
/// means the piece is en prise if it stays.
pub fn nm_static_exchange_evaluation(board: &mut Board, mv: Move) -> Score {
    if board.in_check() {
        return 0;
    }

    board.make_null_move();
    board.reset_see();
    let ret = exchange_on_square(board, mv.from_sq(), false);
    board.undo_move();

    ret
}

/// Value of the continued capture sequence on `sq` for the side to move.
/// In forced mode the first capture must be played and the square is
/// valued as empty (SEE-map construction); otherwise the side may decline.
fn exchange_on_square(board: &mut Board, sq: Square, forced: bool) -> Score {
    match board.generate_smallest_capture_see(sq) {
        Some((pt, from)) => {
            let captured = board.apply_move_see(pt, from, sq);

            let ret = if forced {
                -exchange_on_square(board, sq, false)
            } else {
                Score::max(0, SEE_MAT[captured as usize] - exchange_on_square(board, sq, false))
            };

            board.undo_move_see();
            ret
        }
        None => {
            if forced {
                -SEE_MAT[WK as usize]
            } else {
                0
            }
        }
    }
}

/// A quiescence-shaped search over captures only, scored purely by SEE
/// material. Reaches a tactically quiet position cheaply; evaluators use it
/// to find a calm leaf before judging a position. Scores are relative to
/// the entry position (`current_eval` biases them). Returns fail-soft on
/// the lower bound and fills `pv` with the capture line.
pub fn global_exchange_evaluation(
    board: &mut Board,
    pv: &mut Vec<Move>,
    current_eval: Score,
    mut lower_bound: Score,
    upper_bound: Score,
) -> Score {
    pv.clear();

    // Stand pat.
    if current_eval >= upper_bound {
        return current_eval;
    }
    if current_eval > lower_bound {
        lower_bound = current_eval;
    }

    let captures = board.legal_moves(MoveKind::Violent);
    let mut sub_pv = Vec::new();

    for &mv in captures.iter() {
        let see = static_exchange_evaluation(board, mv);

        // Only strictly winning captures that could raise the bound.
        if see < 0 || current_eval + see <= lower_bound {
            continue;
        }

        let captured = board.captured_piece_type(mv);
        let captured_value = SEE_MAT[captured as usize];

        board.apply_move(mv);
        let score = -global_exchange_evaluation(
            board,
            &mut sub_pv,
            -(current_eval + captured_value),
            -upper_bound,
            -lower_bound,
        );
        board.undo_move();

        if score >= upper_bound {
            return score;
        }

        if score > lower_bound {
            lower_bound = score;
            pv.clear();
            pv.push(mv);
            pv.extend_from_slice(&sub_pv);
        }
    }

    lower_bound
}

/// `global_exchange_evaluation` from a neutral standpoint.
pub fn global_exchange_evaluation_root(board: &mut Board, pv: &mut Vec<Move>) -> Score {
    global_exchange_evaluation(board, pv, 0, -SEE_MAT[WK as usize], SEE_MAT[WK as usize])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn see_of(fen: &str, mv_text: &str) -> Score {
        let mut board = Board::from_str(fen).unwrap();
        let mv = board.parse_move(mv_text).expect("legal move");
        let before = board.clone();
        let see = static_exchange_evaluation(&mut board, mv);
        assert_eq!(board, before, "SEE must leave the board untouched");
        see
    }

    #[test]
    fn undefended_pawn() {
        assert_eq!(see_of("7k/8/8/3p4/8/3R4/8/K7 w - - 0 1", "d3d5"), 100);
    }

    #[test]
    fn undefended_rook_taken_by_pawn() {
        assert_eq!(see_of("7k/8/8/4p3/5R2/8/8/K7 b - - 0 1", "e5f4"), 600);
    }

    #[test]
    fn simple_exchange() {
        assert_eq!(see_of("6k1/8/8/4p3/5R1R/8/8/K7 b - - 0 1", "e5f4"), 500);
    }

    #[test]
    fn discovered_attacker_discourages_recapture() {
        assert_eq!(see_of("7k/4q3/4q3/8/4R3/4R3/8/K7 w - - 0 1", "e4e6"), 1200);
        assert_eq!(see_of("7k/4q3/4q3/8/4R3/8/8/K7 w - - 0 1", "e4e6"), 600);
    }

    #[test]
    fn long_exchange_sequences() {
        assert_eq!(
            see_of("4q2k/3q2b1/8/2p5/3P4/4P3/3Rn3/K2R4 b - - 0 1", "c5d4"),
            100
        );
        assert_eq!(
            see_of("4q2k/3q4/8/2p5/3P4/4P3/3R4/K2R4 b - - 0 1", "c5d4"),
            0
        );
    }

    #[test]
    fn blocked_defender_is_revealed() {
        assert_eq!(see_of("7k/q7/8/2p5/3P4/8/3R4/6K1 b - - 0 1", "c5d4"), 100);
    }

    #[test]
    fn losing_captures() {
        assert_eq!(
            see_of("7k/q7/2n5/8/3P4/8/3R4/3R2K1 b - - 0 1", "c6d4"),
            -300
        );
        assert_eq!(
            see_of("7k/q7/2n5/8/3p4/8/3R4/3R2K1 w - - 0 1", "d2d4"),
            -500
        );
    }

    #[test]
    fn non_captures_measure_safety() {
        let fen = "2r4k/1P6/8/4q1nr/7p/5N2/K7/8 w - - 0 1";
        assert_eq!(see_of(fen, "f3e1"), -400);
        assert_eq!(see_of(fen, "f3d2"), 0);
    }

    #[test]
    fn see_map_measures_square_control() {
        // Nobody contests e5: the opponent could park anything there.
        let mut board = Board::from_str("7k/8/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let e5 = crate::square::parse_square("e5").unwrap();
        assert_eq!(see_map(&mut board, e5), SEE_MAT[WK as usize]);

        // d5 is covered by the rook and undefended: nothing survives there.
        let mut board = Board::from_str("7k/8/8/3p4/8/3R4/8/K7 w - - 0 1").unwrap();
        let d5 = crate::square::parse_square("d5").unwrap();
        assert_eq!(see_map(&mut board, d5), 0);
    }

    #[test]
    fn nm_see_flags_en_prise_pieces() {
        // The white rook on d5 is attacked by the c6 pawn; passing loses it.
        let mut board = Board::from_str("7k/8/2p5/3R4/8/8/8/K7 w - - 0 1").unwrap();
        let mv = board.parse_move("d5d1").unwrap();
        let before = board.clone();
        assert_eq!(nm_static_exchange_evaluation(&mut board, mv), 600);
        assert_eq!(board, before);
    }

    #[test]
    fn gee_plays_out_winning_captures() {
        let mut board = Board::from_str("7k/8/8/3p4/8/3R4/8/K7 w - - 0 1").unwrap();
        let mut pv = Vec::new();
        let score = global_exchange_evaluation_root(&mut board, &mut pv);
        assert_eq!(score, 100);
        assert_eq!(pv.len(), 1);
        assert_eq!(pv[0].to_string(), "d3d5");
    }

    #[test]
    fn gee_stands_pat_when_captures_lose() {
        let mut board =
            Board::from_str("7k/q7/2n5/8/3p4/8/3R4/3R2K1 w - - 0 1").unwrap();
        let mut pv = Vec::new();
        let score = global_exchange_evaluation_root(&mut board, &mut pv);
        assert_eq!(score, 0);
        assert!(pv.is_empty());
    }
}
