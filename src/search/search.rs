//! The search kernel and root controller.
//!
//! Recursion is governed by a fractional node budget instead of an integer
//! depth: every child receives its parent's remaining budget times the
//! allocation the move evaluator assigned to its move. A node whose budget
//! drops below one becomes a quiescence leaf. The root controller raises
//! the budget geometrically (iterative deepening), wraps each iteration in
//! an aspiration window, and commits only results from fully completed
//! iterations.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::board::Board;
use crate::moves::types::Move;
use crate::search::counter::CounterMove;
use crate::search::eval::Evaluator;
use crate::search::history::History;
use crate::search::killer::Killer;
use crate::search::move_eval::{MoveEvaluator, MoveInfoList, SearchInfo};
use crate::search::time::TimeAllocation;
use crate::search::tt::{Bound, TranspositionTable};
use crate::search::{
    adjust_if_mate_score, NodeBudget, Score, TablebaseProbe, MATE_OPPONENT_SIDE, SCORE_MAX,
    SCORE_MIN,
};

const ENABLE_NULL_MOVE: bool = true;
const ENABLE_TT: bool = true;
const ENABLE_IID: bool = true;
const ENABLE_PVS: bool = true;
const ENABLE_KILLERS: bool = true;
const ENABLE_COUNTERMOVES: bool = true;
const ENABLE_HISTORY: bool = true;

pub const MIN_NODE_BUDGET_FOR_NULL_MOVE: NodeBudget = 1;

/// Fraction of the node's budget spent on the null-move refutation search.
/// Untuned.
pub const NULL_MOVE_BUDGET_SCALE: f32 = 3e-4;

pub const MIN_NODE_BUDGET_FOR_IID: NodeBudget = 1024;

/// Fraction of the node's budget for the internal-iterative-deepening
/// pre-search. Untuned.
pub const IID_BUDGET_SCALE: f32 = 0.1;

pub const MIN_NODE_BUDGET_FOR_PVS: NodeBudget = 16;

pub const ASPIRATION_WINDOW_HALF_SIZE: Score = 400;

/// Beyond this offset the window opens fully; keeps a freshly discovered
/// mate score from forcing many re-searches.
pub const ASPIRATION_WINDOW_HALF_SIZE_THRESHOLD: Score = 1600;

pub const ASPIRATION_WINDOW_WIDEN_MULTIPLIER: Score = 4;

pub const DRAW_SCORE: Score = 0;

/// Two-fold repetition window: how far back the in-search draw check looks.
pub const NUM_MOVES_TO_LOOK_FOR_DRAW: usize = 16;

// Node-count search can go very deep; cap recursion to protect the stack.
const MAX_RECURSION_DEPTH: usize = 64;

// Budget growth per iterative-deepening step.
const NODE_BUDGET_MULTIPLIER: NodeBudget = 4;

// Budget is not node count (it includes budget routed into pruned
// subtrees), so the cap is enormous; it exists to rule out overflow when
// multiplied per iteration.
const ID_MAX_NODE_BUDGET: NodeBudget = 200_000_000_000_000_000;

// If an iteration used more than 1/x of the allocated time, the next one
// won't fit and is not started.
const ESTIMATED_MIN_BRANCHING_FACTOR: f64 = 1.0;

/// Thread-shared search control: the stop protocol and the node counter.
#[derive(Default)]
pub struct SearchControl {
    pub stop_request: AtomicBool,
    pub one_ply_done: AtomicBool,
    pub node_count: AtomicU64,
    pub done: AtomicBool,
}

impl SearchControl {
    /// The worker unwinds when a stop is requested and at least one
    /// iteration has completed.
    #[inline(always)]
    pub fn stopping(&self) -> bool {
        self.one_ply_done.load(Ordering::Relaxed) && self.stop_request.load(Ordering::Relaxed)
    }
}

/// Non-owning handles to everything one search mutates. All searches from
/// the same root share one of these.
pub struct RootSearchContext<'a> {
    pub control: &'a SearchControl,
    pub tt: &'a mut TranspositionTable,
    pub killer: &'a mut Killer,
    pub counter: &'a mut CounterMove,
    pub history: &'a mut History,
    pub evaluator: &'a dyn Evaluator,
    pub move_evaluator: &'a dyn MoveEvaluator,
    pub tablebase: Option<&'a dyn TablebaseProbe>,
}

/// The tables that persist from move to move within one game.
pub struct SearchSession {
    pub tt: TranspositionTable,
    pub killer: Killer,
    pub counter: CounterMove,
    pub history: History,
}

impl SearchSession {
    pub fn new(tt_slots: usize) -> SearchSession {
        SearchSession {
            tt: TranspositionTable::new(tt_slots),
            killer: Killer::new(),
            counter: CounterMove::new(),
            history: History::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    pub score: Score,
    pub pv: Vec<Move>,
}

/// One record per completed root iteration, handed to the thinking sink.
#[derive(Debug, Clone)]
pub struct ThinkingOutput {
    pub ply: i32,
    pub score: Score,
    pub time: f64,
    pub node_count: u64,
    pub pv: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchType {
    /// Search the allocated time, then emit the chosen move.
    MakeMove,
    /// Search until told to stop.
    Infinite,
}

pub type ThinkingSink = Box<dyn Fn(&ThinkingOutput) + Send>;
pub type FinalMoveSink = Box<dyn Fn(&str) + Send>;

pub struct RootSearchJob {
    pub board: Board,
    pub session: SearchSession,
    pub evaluator: Arc<dyn Evaluator + Send + Sync>,
    pub move_evaluator: Arc<dyn MoveEvaluator + Send + Sync>,
    pub tablebase: Option<Arc<dyn TablebaseProbe + Send + Sync>>,
    pub time_alloc: TimeAllocation,
    pub search_type: SearchType,
    /// 0 means "no limit" (the internal cap still applies).
    pub node_budget: NodeBudget,
    pub thinking_sink: Option<ThinkingSink>,
    pub final_move_sink: Option<FinalMoveSink>,
}

struct AbortSignal {
    mutex: Mutex<()>,
    condvar: Condvar,
}

/// An asynchronous root search: one worker thread that owns the session
/// for the duration, plus a timer thread for timed searches.
pub struct AsyncSearch {
    control: Arc<SearchControl>,
    abort: Arc<AbortSignal>,
    thread: Option<JoinHandle<(SearchResult, Board, SearchSession)>>,
}

impl AsyncSearch {
    pub fn start(job: RootSearchJob) -> AsyncSearch {
        let control = Arc::new(SearchControl::default());
        let abort = Arc::new(AbortSignal {
            mutex: Mutex::new(()),
            condvar: Condvar::new(),
        });

        let thread_control = Arc::clone(&control);
        let thread_abort = Arc::clone(&abort);
        let thread = std::thread::spawn(move || root_search(job, thread_control, thread_abort));

        AsyncSearch {
            control,
            abort,
            thread: Some(thread),
        }
    }

    /// Requests an abort; the worker commits its last completed iteration.
    pub fn abort(&self) {
        let _guard = self.abort.mutex.lock().expect("abort mutex");
        self.control.stop_request.store(true, Ordering::Relaxed);
        self.abort.condvar.notify_all();
    }

    pub fn done(&self) -> bool {
        self.control.done.load(Ordering::Relaxed)
    }

    pub fn node_count(&self) -> u64 {
        self.control.node_count.load(Ordering::Relaxed)
    }

    /// Blocks until the worker finishes and returns the result together
    /// with the (possibly advanced) board and the session tables.
    pub fn join(mut self) -> (SearchResult, Board, SearchSession) {
        self.thread
            .take()
            .expect("join called once")
            .join()
            .expect("search worker panicked")
    }
}

fn search_timer(control: &SearchControl, signal: &AbortSignal, seconds: f64) {
    let end = Instant::now() + Duration::from_secs_f64(seconds.max(0.0));

    let mut guard = signal.mutex.lock().expect("timer mutex");
    while !control.stop_request.load(Ordering::Relaxed) {
        let now = Instant::now();
        if now >= end {
            break;
        }
        // Interruptible sleep: abort() wakes the condvar early.
        let (g, _) = signal
            .condvar
            .wait_timeout(guard, end - now)
            .expect("timer wait");
        guard = g;
    }

    control.stop_request.store(true, Ordering::Relaxed);
}

fn pv_to_text(pv: &[Move]) -> String {
    let mut out = String::new();
    for mv in pv {
        out.push_str(&mv.to_string());
        out.push(' ');
    }
    out
}

fn root_search(
    mut job: RootSearchJob,
    control: Arc<SearchControl>,
    abort: Arc<AbortSignal>,
) -> (SearchResult, Board, SearchSession) {
    let start_time = Instant::now();
    let allocated = job.time_alloc.normal_time;

    let timer = if job.search_type != SearchType::Infinite {
        let timer_control = Arc::clone(&control);
        let timer_abort = Arc::clone(&abort);
        Some(std::thread::spawn(move || {
            search_timer(&timer_control, &timer_abort, allocated)
        }))
    } else {
        None
    };

    let max_budget = if job.node_budget == 0 || job.node_budget > ID_MAX_NODE_BUDGET {
        ID_MAX_NODE_BUDGET
    } else {
        job.node_budget
    };

    control.one_ply_done.store(false, Ordering::Relaxed);

    let mut best = SearchResult::default();
    let mut latest = SearchResult::default();
    let mut iteration: i32 = 0;

    {
        let evaluator: &dyn Evaluator = &*job.evaluator;
        let move_evaluator: &dyn MoveEvaluator = &*job.move_evaluator;
        let tablebase: Option<&dyn TablebaseProbe> =
            job.tablebase.as_ref().map(|tb| &**tb as &dyn TablebaseProbe);
        let mut ctx = RootSearchContext {
            control: &control,
            tt: &mut job.session.tt,
            killer: &mut job.session.killer,
            counter: &mut job.session.counter,
            history: &mut job.session.history,
            evaluator,
            move_evaluator,
            tablebase,
        };

        let mut node_budget: NodeBudget = 1;
        while node_budget <= max_budget
            && (start_time.elapsed().as_secs_f64() < allocated
                || job.search_type == SearchType::Infinite
                || !control.one_ply_done.load(Ordering::Relaxed))
            && !control.stopping()
        {
            iteration += 1;

            // Aspiration: a window around the last iteration's score,
            // widened multiplicatively on the side that fails.
            let last_score = latest.score;
            let mut high_offset = ASPIRATION_WINDOW_HALF_SIZE;
            let mut low_offset = ASPIRATION_WINDOW_HALF_SIZE;
            let mut high_open = false;
            let mut low_open = false;

            while !control.stopping() {
                let alpha = if low_open {
                    SCORE_MIN
                } else {
                    last_score - low_offset
                };
                let beta = if high_open {
                    SCORE_MAX
                } else {
                    last_score + high_offset
                };

                latest.score = search(
                    &mut ctx,
                    &mut latest.pv,
                    &mut job.board,
                    alpha,
                    beta,
                    node_budget,
                    0,
                    true,
                );

                if !high_open && latest.score >= last_score + high_offset {
                    high_offset *= ASPIRATION_WINDOW_WIDEN_MULTIPLIER;
                    if high_offset > ASPIRATION_WINDOW_HALF_SIZE_THRESHOLD {
                        high_open = true;
                    }
                } else if !low_open && latest.score <= last_score - low_offset {
                    low_offset *= ASPIRATION_WINDOW_WIDEN_MULTIPLIER;
                    if low_offset > ASPIRATION_WINDOW_HALF_SIZE_THRESHOLD {
                        low_open = true;
                    }
                } else {
                    break;
                }
            }

            if !control.stopping() {
                best = latest.clone();

                let elapsed = start_time.elapsed().as_secs_f64();
                let node_count = control.node_count.load(Ordering::Relaxed);
                let output = ThinkingOutput {
                    ply: iteration,
                    score: best.score,
                    time: elapsed,
                    node_count,
                    pv: pv_to_text(&best.pv),
                };
                if let Some(sink) = &job.thinking_sink {
                    sink(&output);
                }
                debug!(
                    iteration,
                    node_budget,
                    score = best.score as i32,
                    nps = (node_count as f64 / elapsed.max(1e-9)) as u64,
                    "iteration complete"
                );
            }

            control.one_ply_done.store(true, Ordering::Relaxed);

            let elapsed = start_time.elapsed().as_secs_f64();
            let estimated_next_iteration = elapsed * ESTIMATED_MIN_BRANCHING_FACTOR;
            if estimated_next_iteration > (allocated - elapsed)
                && job.search_type != SearchType::Infinite
            {
                break;
            }

            node_budget = node_budget.saturating_mul(NODE_BUDGET_MULTIPLIER);
        }
    }

    // Interrupt the timing thread and wait for it.
    {
        let _guard = abort.mutex.lock().expect("abort mutex");
        control.stop_request.store(true, Ordering::Relaxed);
        abort.condvar.notify_all();
    }
    if let Some(timer) = timer {
        let _ = timer.join();
    }

    if job.search_type == SearchType::MakeMove {
        if let Some(&mv) = best.pv.first() {
            let applied = job.board.apply_move(mv);
            debug_assert!(applied, "committed PV move must be legal");

            if let Some(sink) = &job.final_move_sink {
                sink(&mv.to_string());
            }

            // Between-move book-keeping: age the table, slide the killers,
            // decay the history.
            job.session.tt.age();
            job.session.killer.move_made();
            job.session.history.notify_move_made();
        }
    }

    control.done.store(true, Ordering::Relaxed);

    (best, job.board, job.session)
}

/// A synchronous fixed-budget search with no threads and no clock, for
/// tests and training drivers. Absent session tables are created fresh.
pub fn sync_search_node_limited(
    board: &Board,
    node_budget: NodeBudget,
    evaluator: &dyn Evaluator,
    move_evaluator: &dyn MoveEvaluator,
    session: Option<&mut SearchSession>,
) -> SearchResult {
    let control = SearchControl::default();

    let mut fresh;
    let session = match session {
        Some(existing) => existing,
        None => {
            fresh = SearchSession::new(4 * 1024);
            &mut fresh
        }
    };

    let mut ctx = RootSearchContext {
        control: &control,
        tt: &mut session.tt,
        killer: &mut session.killer,
        counter: &mut session.counter,
        history: &mut session.history,
        evaluator,
        move_evaluator,
        tablebase: None,
    };

    let mut board = board.clone();
    let mut result = SearchResult::default();
    result.score = search(
        &mut ctx,
        &mut result.pv,
        &mut board,
        SCORE_MIN,
        SCORE_MAX,
        node_budget,
        0,
        true,
    );
    result
}

/// The recursive kernel. Fail-soft: may return outside (alpha, beta). The
/// returned score is a don't-care once a stop has been observed.
#[allow(clippy::too_many_arguments)]
pub fn search(
    ctx: &mut RootSearchContext,
    pv: &mut Vec<Move>,
    board: &mut Board,
    mut alpha: Score,
    beta: Score,
    mut node_budget: NodeBudget,
    ply: usize,
    null_allowed: bool,
) -> Score {
    let is_pv = (beta as i32 - alpha as i32) != 1;

    pv.clear();

    // Out of budget (or too deep): drop into quiescence. `< 1` guarantees a
    // root search with budget 1 still searches a full ply.
    if node_budget < 1 || ply > MAX_RECURSION_DEPTH {
        if ENABLE_TT && !is_pv {
            // Quiescence results carry no budget, so no budget check here.
            if let Some(entry) = ctx.tt.probe(board.get_hash()) {
                match entry.bound {
                    Bound::Exact => return entry.score,
                    Bound::Upper if entry.score <= alpha => return entry.score,
                    Bound::Lower if entry.score >= beta => return entry.score,
                    _ => {}
                }
            }
        }

        let ret = qsearch(ctx, pv, board, alpha, beta, ply, 0);

        // First-ply quiescence results are worth keeping.
        if ENABLE_TT && !ctx.control.stopping() {
            let best_move = pv.first().copied();
            if ret >= beta {
                ctx.tt.store(board.get_hash(), best_move, ret, 0, Bound::Lower);
            } else if ret <= alpha {
                ctx.tt.store(board.get_hash(), None, ret, 0, Bound::Upper);
            } else {
                ctx.tt.store(board.get_hash(), best_move, ret, 0, Bound::Exact);
            }
        }

        return ret;
    }

    ctx.control.node_count.fetch_add(1, Ordering::Relaxed);

    if ctx.control.stopping() {
        // The value is never used once the stop is observed.
        return 0;
    }

    // Draws are checked before the table: the table can hide repetitions.
    // At the root the strict material rules apply (a relaxed "draw" there
    // would leave no PV to play).
    if board.has_insufficient_material(ply > 0) {
        return DRAW_SCORE;
    }
    if ply > 0 && (board.is_2fold(NUM_MOVES_TO_LOOK_FOR_DRAW) || board.is_50_moves()) {
        return DRAW_SCORE;
    }

    let original_node_budget = node_budget;
    node_budget -= 1; // this node's own expense

    let original_alpha = alpha;
    let is_root = ply == 0;

    // No probing at the root: a probe hit would leave no move to play.
    if !is_root {
        if let Some(tablebase) = ctx.tablebase {
            if let Some(score) = tablebase.probe(board) {
                return score;
            }
        }
    }

    let mut t_entry = if ENABLE_TT {
        ctx.tt.probe(board.get_hash()).copied()
    } else {
        None
    };

    // Internal iterative deepening: a PV node with no move to try first is
    // worth a cheap pre-search just to seed the table.
    if ENABLE_IID
        && ENABLE_TT
        && is_pv
        && t_entry.map_or(true, |entry| entry.best_move.is_none())
        && node_budget >= MIN_NODE_BUDGET_FOR_IID
    {
        let mut iid_pv = Vec::new();
        let iid_budget = (node_budget as f64 * IID_BUDGET_SCALE as f64) as NodeBudget;
        search(ctx, &mut iid_pv, board, alpha, beta, iid_budget, ply, true);

        // The re-probe may still come back without a best move; that's fine.
        t_entry = ctx.tt.probe(board.get_hash()).copied();
    }

    if let Some(entry) = &t_entry {
        // A stored result from an equal or bigger budget can cut off, except
        // in PV nodes (it would truncate the PV).
        if entry.node_budget >= node_budget && !is_pv {
            match entry.bound {
                Bound::Exact => return entry.score,
                Bound::Upper if entry.score <= alpha => return entry.score,
                Bound::Lower if entry.score >= beta => return entry.score,
                _ => {}
            }
        }
    }

    let static_eval = ctx.evaluator.evaluate_for_stm(board, alpha, beta);

    // Null move: if standing pat already beats beta and the position is not
    // zugzwang-probable, a drastically cheaper refutation search usually
    // confirms the fail-high.
    if ENABLE_NULL_MOVE
        && static_eval >= beta
        && !is_pv
        && node_budget >= MIN_NODE_BUDGET_FOR_NULL_MOVE
        && !board.in_check()
        && !board.is_zugzwang_probable()
        && null_allowed
    {
        board.make_null_move();

        let mut null_pv = Vec::new();
        let null_budget = (node_budget as f64 * NULL_MOVE_BUDGET_SCALE as f64) as NodeBudget;
        let null_score = -search(
            ctx,
            &mut null_pv,
            board,
            -beta,
            -beta + 1,
            null_budget,
            ply + 1,
            false,
        );

        board.undo_move();

        if null_score >= beta {
            if ENABLE_TT {
                ctx.tt.store(
                    board.get_hash(),
                    None,
                    null_score,
                    original_node_budget,
                    Bound::Lower,
                );
            }
            return beta;
        }
    }

    let hash_move = t_entry.and_then(|entry| entry.best_move);

    let mut mi_list = MoveInfoList::new();
    {
        let si = SearchInfo {
            killer: if ENABLE_KILLERS { Some(&*ctx.killer) } else { None },
            counter: if ENABLE_COUNTERMOVES { Some(&*ctx.counter) } else { None },
            history: if ENABLE_HISTORY { Some(&*ctx.history) } else { None },
            hash_move,
            ply,
            is_qs: false,
            total_node_budget: node_budget,
            lower_bound: alpha,
            upper_bound: beta,
        };
        ctx.move_evaluator
            .generate_and_evaluate_moves(board, &si, &mut mi_list);
    }

    if mi_list.is_empty() {
        // Mated or stalemated; mate scores pick up distance on the way up.
        return if board.in_check() {
            MATE_OPPONENT_SIDE
        } else {
            DRAW_SCORE
        };
    }

    let mut sub_pv: Vec<Move> = Vec::new();
    // SCORE_MIN rather than the type minimum: the parent negates what we
    // return, and -i16::MIN does not exist.
    let mut best_score = SCORE_MIN;

    for (idx, mi) in mi_list.iter().enumerate() {
        // Zero allocation means the evaluator pruned the move.
        if mi.node_allocation == 0.0 {
            continue;
        }

        let mv = mi.mv;

        let applied = board.apply_move(mv);
        debug_assert!(applied, "move evaluator produced an illegal move");

        let mut child_budget = (node_budget as f64 * mi.node_allocation as f64) as NodeBudget;

        // A checking move must not drop straight into quiescence.
        if board.in_check() {
            child_budget = child_budget.max(1);
        }

        let mut score;
        if ENABLE_PVS && idx != 0 && (beta as i32 - alpha as i32) != 1
            && node_budget > MIN_NODE_BUDGET_FOR_PVS
        {
            // Everything after the first move is expected to fail low; scout
            // with a null window and only re-search genuine improvements.
            score = -search(
                ctx,
                &mut sub_pv,
                board,
                -alpha - 1,
                -alpha,
                child_budget,
                ply + 1,
                true,
            );

            if score > alpha && score < beta {
                score = -search(
                    ctx,
                    &mut sub_pv,
                    board,
                    -beta,
                    -alpha,
                    child_budget,
                    ply + 1,
                    true,
                );
            }
        } else {
            score = -search(
                ctx,
                &mut sub_pv,
                board,
                -beta,
                -alpha,
                child_budget,
                ply + 1,
                true,
            );
        }

        board.undo_move();

        if ctx.control.stopping() {
            return 0;
        }

        adjust_if_mate_score(&mut score);

        if score > best_score {
            best_score = score;
            pv.clear();
            pv.push(mv);
            pv.extend_from_slice(&sub_pv);
        }

        if score > alpha {
            alpha = score;
        }

        if score >= beta {
            if ENABLE_TT {
                ctx.tt.store(
                    board.get_hash(),
                    Some(mv),
                    score,
                    original_node_budget,
                    Bound::Lower,
                );
            }

            notify_best_move(ctx, board, hash_move, ply, alpha, beta, &mi_list, mv, idx + 1);

            // Captures are searched before killers anyway; only quiet
            // cutoffs feed the quiet-move heuristics.
            if !board.is_violent(mv) {
                if ENABLE_KILLERS {
                    ctx.killer.notify(ply, mv);
                }
                if ENABLE_COUNTERMOVES {
                    ctx.counter.notify(board, mv);
                }
                if ENABLE_HISTORY {
                    ctx.history.notify_cutoff(mv, original_node_budget);
                }
            }

            return score;
        } else if ENABLE_HISTORY {
            ctx.history.notify_no_cutoff(mv, original_node_budget);
        }
    }

    if !ctx.control.stopping() {
        if best_score > original_alpha {
            // A new best line below beta: exact.
            if ENABLE_TT {
                ctx.tt.store(
                    board.get_hash(),
                    pv.first().copied(),
                    best_score,
                    original_node_budget,
                    Bound::Exact,
                );
            }
            if let Some(&best) = pv.first() {
                notify_best_move(
                    ctx,
                    board,
                    hash_move,
                    ply,
                    alpha,
                    beta,
                    &mi_list,
                    best,
                    mi_list.len(),
                );
            }
        } else if ENABLE_TT {
            // Failed low (possibly with every move pruned).
            ctx.tt.store(
                board.get_hash(),
                pv.first().copied(),
                best_score,
                original_node_budget,
                Bound::Upper,
            );
        }
    }

    best_score
}

#[allow(clippy::too_many_arguments)]
fn notify_best_move(
    ctx: &mut RootSearchContext,
    board: &mut Board,
    hash_move: Option<Move>,
    ply: usize,
    alpha: Score,
    beta: Score,
    mi_list: &MoveInfoList,
    best: Move,
    moves_searched: usize,
) {
    let si = SearchInfo {
        killer: None,
        counter: None,
        history: None,
        hash_move,
        ply,
        is_qs: false,
        total_node_budget: 0,
        lower_bound: alpha,
        upper_bound: beta,
    };
    ctx.move_evaluator
        .notify_best_move(board, &si, mi_list, best, moves_searched);
}

/// Quiescence: forcing moves only, until the position is calm. Re-enters
/// the full search at budget one when in check past the first QS ply.
pub fn qsearch(
    ctx: &mut RootSearchContext,
    pv: &mut Vec<Move>,
    board: &mut Board,
    mut alpha: Score,
    beta: Score,
    ply: usize,
    qs_ply: usize,
) -> Score {
    ctx.control.node_count.fetch_add(1, Ordering::Relaxed);

    pv.clear();

    if ctx.control.stopping() {
        return 0;
    }

    // Only the hard material draw matters down here.
    if board.has_insufficient_material(true) {
        return DRAW_SCORE;
    }

    if let Some(tablebase) = ctx.tablebase {
        if let Some(score) = tablebase.probe(board) {
            return score;
        }
    }

    // In check there is no standing pat; go back to the full search for one
    // ply of evasions. Guarded to qs_ply > 0: a checked leaf re-entering
    // endlessly would explode.
    if board.in_check() && qs_ply > 0 {
        return search(ctx, pv, board, alpha, beta, 1, ply, true);
    }

    let static_eval = ctx.evaluator.evaluate_for_stm(board, alpha, beta);

    if static_eval >= beta {
        return static_eval;
    }

    let is_pv = (beta as i32 - alpha as i32) != 1;

    let t_entry = if ENABLE_TT {
        ctx.tt.probe(board.get_hash()).copied()
    } else {
        None
    };

    if let Some(entry) = &t_entry {
        // Bound checks only; quiescence ignores stored budgets.
        if !is_pv {
            match entry.bound {
                Bound::Exact => return entry.score,
                Bound::Upper if entry.score <= alpha => return entry.score,
                Bound::Lower if entry.score >= beta => return entry.score,
                _ => {}
            }
        }
    }

    if static_eval > alpha {
        alpha = static_eval;
    }

    let mut mi_list = MoveInfoList::new();
    {
        let si = SearchInfo {
            killer: if ENABLE_KILLERS { Some(&*ctx.killer) } else { None },
            counter: if ENABLE_COUNTERMOVES { Some(&*ctx.counter) } else { None },
            history: if ENABLE_HISTORY { Some(&*ctx.history) } else { None },
            hash_move: t_entry.and_then(|entry| entry.best_move),
            ply,
            is_qs: true,
            total_node_budget: 0,
            lower_bound: alpha,
            upper_bound: beta,
        };
        ctx.move_evaluator
            .generate_and_evaluate_moves(board, &si, &mut mi_list);
    }

    let mut sub_pv: Vec<Move> = Vec::new();

    for mi in mi_list.iter() {
        if mi.node_allocation == 0.0 {
            continue;
        }

        let mv = mi.mv;

        let applied = board.apply_move(mv);
        debug_assert!(applied, "QS move evaluator produced an illegal move");

        let score = -qsearch(ctx, &mut sub_pv, board, -beta, -alpha, ply + 1, qs_ply + 1);

        board.undo_move();

        if ctx.control.stopping() {
            return 0;
        }

        if score > alpha {
            alpha = score;
            pv.clear();
            pv.push(mv);
            pv.extend_from_slice(&sub_pv);
        }

        if score >= beta {
            return score;
        }
    }

    alpha
}
