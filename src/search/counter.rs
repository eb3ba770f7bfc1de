//! Counter moves: the refutation last seen for each (side, from, to).

use crate::board::{Board, BLACK};
use crate::moves::types::Move;

pub struct CounterMove {
    // [side to move][last move from][last move to]
    data: Box<[[[Option<Move>; 64]; 64]; 2]>,
}

impl Default for CounterMove {
    fn default() -> CounterMove {
        CounterMove::new()
    }
}

impl CounterMove {
    pub fn new() -> CounterMove {
        CounterMove {
            data: Box::new([[[None; 64]; 64]; 2]),
        }
    }

    #[inline]
    fn key(board: &Board) -> Option<(usize, usize, usize)> {
        // A null move keys on from 0, to 0, which is fine.
        let last = board.move_from_last(0)?;
        let side = if board.side_to_move() == BLACK { 1 } else { 0 };
        Some((side, last.from_sq(), last.to_sq()))
    }

    /// Records `reply` as the refutation of the move just played.
    pub fn notify(&mut self, board: &Board, reply: Move) {
        if let Some((side, from, to)) = CounterMove::key(board) {
            self.data[side][from][to] = Some(reply.without_score());
        }
    }

    /// The recorded reply to the move just played, if any. Not guaranteed to
    /// be legal here; callers verify.
    pub fn get_counter_move(&self, board: &Board) -> Option<Move> {
        let (side, from, to) = CounterMove::key(board)?;
        self.data[side][from][to]
    }
}
