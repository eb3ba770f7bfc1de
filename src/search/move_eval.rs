//! The contract between the search and its move-ordering policy.
//!
//! The search hands each node's legal moves to a `MoveEvaluator`, which
//! assigns every move a `node_allocation`, the fraction of the node's
//! budget its subtree deserves. Zero means "prune". Allocations are
//! normalised to sum to one, so only their ordering matters, not their
//! magnitudes. The static policy below encodes the classic ordering ladder;
//! a learned policy implements the same trait elsewhere.

use arrayvec::ArrayVec;

use crate::board::Board;
use crate::moves::movegen::MoveKind;
use crate::moves::types::{Move, MAX_LEGAL_MOVES};
use crate::search::counter::CounterMove;
use crate::search::history::History;
use crate::search::killer::{Killer, KillerMoveList};
use crate::search::see;
use crate::search::{NodeBudget, Score, SCORE_MAX, SCORE_MIN};

#[derive(Clone, Copy, Debug)]
pub struct MoveInfo {
    pub mv: Move,
    /// Fraction of the parent's node budget for this move's subtree.
    pub node_allocation: f32,
    pub see_score: Score,
    pub nm_see_score: Score,
}

impl MoveInfo {
    pub fn new(mv: Move) -> MoveInfo {
        MoveInfo {
            mv,
            node_allocation: 0.0,
            see_score: 0,
            nm_see_score: 0,
        }
    }
}

pub type MoveInfoList = ArrayVec<MoveInfo, MAX_LEGAL_MOVES>;

/// Everything a move-ordering policy may want to look at.
pub struct SearchInfo<'a> {
    pub killer: Option<&'a Killer>,
    pub counter: Option<&'a CounterMove>,
    pub history: Option<&'a History>,
    pub hash_move: Option<Move>,
    pub ply: usize,
    pub is_qs: bool,
    pub total_node_budget: NodeBudget,
    /// Bounds from the moving side's point of view; hints only.
    pub lower_bound: Score,
    pub upper_bound: Score,
}

impl<'a> SearchInfo<'a> {
    pub fn new() -> SearchInfo<'a> {
        SearchInfo {
            killer: None,
            counter: None,
            history: None,
            hash_move: None,
            ply: 0,
            is_qs: false,
            total_node_budget: 0,
            lower_bound: SCORE_MIN,
            upper_bound: SCORE_MAX,
        }
    }
}

impl<'a> Default for SearchInfo<'a> {
    fn default() -> SearchInfo<'a> {
        SearchInfo::new()
    }
}

/// Rescales allocations to sum to one. A list of all-zero allocations is
/// left alone.
pub fn normalize_move_info_list(list: &mut MoveInfoList) {
    let sum: f32 = list.iter().map(|mi| mi.node_allocation).sum();
    if sum != 0.0 {
        for mi in list.iter_mut() {
            mi.node_allocation /= sum;
        }
    }
}

pub trait MoveEvaluator {
    /// Fills in allocation and SEE fields for a list of legal moves and
    /// sorts it best-first. Implementations normalise before returning.
    fn evaluate_moves(&self, board: &mut Board, si: &SearchInfo, list: &mut MoveInfoList);

    /// Generates this node's legal moves (violent only in quiescence) and
    /// evaluates them.
    fn generate_and_evaluate_moves(
        &self,
        board: &mut Board,
        si: &SearchInfo,
        list: &mut MoveInfoList,
    ) {
        list.clear();

        let kind = if si.is_qs {
            MoveKind::Violent
        } else {
            MoveKind::All
        };
        for mv in board.legal_moves(kind) {
            list.push(MoveInfo::new(mv));
        }

        self.evaluate_moves(board, si, list);
    }

    /// Feedback hook: the search reports which move actually turned out
    /// best and how many moves it had to try. Learning policies listen.
    fn notify_best_move(
        &self,
        _board: &mut Board,
        _si: &SearchInfo,
        _list: &MoveInfoList,
        _best: Move,
        _moves_searched: usize,
    ) {
    }
}

/// Hand-crafted ordering policy. Exact values only encode the ladder's
/// ordering; normalisation washes out their magnitudes.
pub struct StaticMoveEvaluator;

const ALLOC_HASH: f32 = 3.0009;
const ALLOC_QUEEN_PROMO: f32 = 2.0008;
const ALLOC_WINNING_CAPTURE: f32 = 2.0007;
const ALLOC_KILLER_BASE: f32 = 1.100;
const ALLOC_KILLER_SLOT_STEP: f32 = 0.0001;
const ALLOC_COUNTER: f32 = 1.05;
const ALLOC_NEUTRAL_BASE: f32 = 1.0;
const ALLOC_NEUTRAL_HISTORY_SCALE: f32 = 0.01;
const ALLOC_LOSING_CAPTURE: f32 = 0.1;
const ALLOC_LOSING_QUIET: f32 = 0.01;

impl MoveEvaluator for StaticMoveEvaluator {
    fn evaluate_moves(&self, board: &mut Board, si: &SearchInfo, list: &mut MoveInfoList) {
        let mut killers = KillerMoveList::new();
        if let Some(killer) = si.killer {
            killer.get_killers(&mut killers, si.ply);
        }

        let counter_move = si.counter.and_then(|c| c.get_counter_move(board));

        for mi in list.iter_mut() {
            let mv = mi.mv;

            let is_violent = board.is_violent(mv);
            let is_queen_promo = mv.is_queen_promotion();
            let is_under_promo = mv.is_promotion() && !is_queen_promo;

            mi.see_score = see::static_exchange_evaluation(board, mv);
            mi.nm_see_score = see::nm_static_exchange_evaluation(board, mv);

            mi.node_allocation = if si.hash_move == Some(mv) {
                ALLOC_HASH
            } else if is_queen_promo && mi.see_score >= 0 {
                ALLOC_QUEEN_PROMO
            } else if is_violent && mi.see_score >= 0 && !is_under_promo {
                ALLOC_WINNING_CAPTURE
            } else if si.is_qs {
                // Quiescence looks at nothing below this line.
                0.0
            } else if !is_violent && killers.contains(&mv) {
                let slot = killers.iter().position(|k| *k == mv).unwrap_or(0);
                ALLOC_KILLER_BASE - ALLOC_KILLER_SLOT_STEP * slot as f32
            } else if counter_move == Some(mv) {
                ALLOC_COUNTER
            } else if mi.see_score >= 0 && !is_under_promo {
                let history = si.history.map(|h| h.score(mv)).unwrap_or(0.5);
                ALLOC_NEUTRAL_BASE + history * ALLOC_NEUTRAL_HISTORY_SCALE
            } else if is_violent && !is_under_promo {
                ALLOC_LOSING_CAPTURE
            } else {
                ALLOC_LOSING_QUIET
            };
        }

        list.sort_by(|a, b| {
            b.node_allocation
                .total_cmp(&a.node_allocation)
                .then(b.see_score.cmp(&a.see_score))
        });

        normalize_move_info_list(list);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn evaluate(board: &mut Board, si: &SearchInfo) -> MoveInfoList {
        let mut list = MoveInfoList::new();
        StaticMoveEvaluator.generate_and_evaluate_moves(board, si, &mut list);
        list
    }

    #[test]
    fn allocations_sum_to_one() {
        let mut board = Board::start_position();
        let list = evaluate(&mut board, &SearchInfo::new());
        let sum: f32 = list.iter().map(|mi| mi.node_allocation).sum();
        assert!((sum - 1.0).abs() < 1e-5);
    }

    #[test]
    fn hash_move_heads_the_list() {
        let mut board = Board::start_position();
        let hash_move = board.parse_move("g1f3").unwrap();
        let si = SearchInfo {
            hash_move: Some(hash_move),
            ..SearchInfo::new()
        };
        let list = evaluate(&mut board, &si);
        assert_eq!(list[0].mv, hash_move);
        assert!(list[0].node_allocation > list[1].node_allocation);
    }

    #[test]
    fn winning_captures_outrank_quiets() {
        let mut board =
            Board::from_str("7k/8/8/3p4/8/3R4/8/K7 w - - 0 1").unwrap();
        let list = evaluate(&mut board, &SearchInfo::new());
        assert_eq!(list[0].mv.to_string(), "d3d5");
        assert_eq!(list[0].see_score, 100);
    }

    #[test]
    fn qs_prunes_everything_below_captures() {
        let mut board =
            Board::from_str("7k/q7/2n5/8/3p4/8/3R4/3R2K1 w - - 0 1").unwrap();
        let si = SearchInfo {
            is_qs: true,
            ..SearchInfo::new()
        };
        let list = evaluate(&mut board, &si);
        // The only capture loses material, so everything is pruned.
        assert!(list.iter().all(|mi| mi.node_allocation == 0.0));
    }

    #[test]
    fn killers_rank_between_captures_and_quiets() {
        let mut board = Board::start_position();
        let killer_mv = board.parse_move("b1c3").unwrap();
        let mut killer = Killer::new();
        killer.notify(0, killer_mv);

        let si = SearchInfo {
            killer: Some(&killer),
            ..SearchInfo::new()
        };
        let list = evaluate(&mut board, &si);
        assert_eq!(list[0].mv, killer_mv);
    }

    #[test]
    fn counter_move_ranks_above_plain_quiets() {
        let mut board = Board::start_position();
        let e4 = board.parse_move("e2e4").unwrap();
        board.apply_move(e4);

        let reply = board.parse_move("e7e5").unwrap();
        let mut counter = CounterMove::new();
        counter.notify(&board, reply);

        let si = SearchInfo {
            counter: Some(&counter),
            ..SearchInfo::new()
        };
        let list = evaluate(&mut board, &si);
        assert_eq!(list[0].mv, reply);
    }

    #[test]
    fn losing_captures_sink() {
        let mut board =
            Board::from_str("7k/q7/2n5/8/3p4/8/3R4/3R2K1 w - - 0 1").unwrap();
        let list = evaluate(&mut board, &SearchInfo::new());
        let rxd4 = board.parse_move("d2d4").unwrap();
        let idx = list.iter().position(|mi| mi.mv == rxd4).unwrap();
        // The losing capture ranks below every SEE-safe quiet move.
        for mi in &list[..idx] {
            assert!(mi.node_allocation >= list[idx].node_allocation);
        }
        assert!(idx > list.len() / 2);
    }
}
