//! Perft: the canonical move-generator check.

use crate::board::Board;
use crate::moves::movegen::MoveKind;
use crate::moves::types::Move;

/// Counts leaf nodes of the legal move tree to the given depth.
pub fn perft(board: &mut Board, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = board.legal_moves(MoveKind::All);
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0;
    for &mv in moves.iter() {
        let applied = board.apply_move(mv);
        debug_assert!(applied, "legal_moves produced an illegal move");
        nodes += perft(board, depth - 1);
        board.undo_move();
    }
    nodes
}

/// Per-root-move node counts, for narrowing down generator bugs.
pub fn perft_divide(board: &mut Board, depth: u32) -> Vec<(Move, u64)> {
    let moves = board.legal_moves(MoveKind::All);
    let mut out = Vec::with_capacity(moves.len());
    for &mv in moves.iter() {
        board.apply_move(mv);
        let nodes = if depth > 1 { perft(board, depth - 1) } else { 1 };
        board.undo_move();
        out.push((mv, nodes));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divide_sums_to_perft() {
        let mut board = Board::start_position();
        let total = perft(&mut board, 3);
        let divided: u64 = perft_divide(&mut board, 3).iter().map(|(_, n)| n).sum();
        assert_eq!(total, divided);
        assert_eq!(total, 8_902);
    }
}
