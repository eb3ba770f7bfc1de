//! Line-oriented command front end.
//!
//! This is deliberately thin: positions in, moves out. It understands a
//! handful of commands:
//!
//! ```text
//! position startpos [moves e2e4 ...]
//! position fen <fen> [moves ...]
//! go nodes <n> | go movetime <ms> | go wtime <ms> btime <ms> [winc <ms>] [binc <ms>] [movestogo <n>]
//! perft <depth> | divide <depth>
//! order          move-ordering diagnostic for the current position
//! fen | d | status | quit
//! ```

use std::io::BufRead;
use std::sync::Arc;
use std::time::Instant;

use quota::board::{Board, GameStatus, BLACK};
use quota::moves::movegen::MoveKind;
use quota::moves::perft::{perft, perft_divide};
use quota::search::eval::MaterialEvaluator;
use quota::search::move_eval::{MoveInfoList, SearchInfo, StaticMoveEvaluator};
use quota::search::search::{
    AsyncSearch, RootSearchJob, SearchSession, SearchType, ThinkingOutput,
};
use quota::search::time::{allocate_time, ChessClock, ClockMode, TimeAllocation};
use quota::search::{is_mate_score, NodeBudget, MATE_MOVING_SIDE};

const TT_SLOTS: usize = 1 << 20;

struct Engine {
    board: Board,
    session: Option<SearchSession>,
}

impl Engine {
    fn new() -> Engine {
        Engine {
            board: Board::start_position(),
            session: Some(SearchSession::new(TT_SLOTS)),
        }
    }

    fn set_position(&mut self, args: &[&str]) {
        let (board, rest) = match args.split_first() {
            Some((&"startpos", rest)) => (Ok(Board::start_position()), rest),
            Some((&"fen", rest)) => {
                let split = rest
                    .iter()
                    .position(|&t| t == "moves")
                    .unwrap_or(rest.len());
                (Board::from_fen(&rest[..split].join(" ")), &rest[split..])
            }
            _ => {
                println!("usage: position startpos|fen <fen> [moves ...]");
                return;
            }
        };

        let mut board = match board {
            Ok(board) => board,
            Err(err) => {
                println!("FEN is invalid ({})", err);
                return;
            }
        };

        if let Some((&"moves", moves)) = rest.split_first() {
            for text in moves {
                match board.parse_move(text) {
                    Some(mv) => {
                        board.apply_move(mv);
                    }
                    None => {
                        println!("illegal move in position command: {}", text);
                        return;
                    }
                }
            }
        }

        self.board = board;
        // A new game forgets the old one's tables.
        self.session = Some(SearchSession::new(TT_SLOTS));
    }

    fn go(&mut self, args: &[&str]) {
        let mut node_budget: NodeBudget = 0;
        let mut time_alloc = TimeAllocation {
            normal_time: 86_400.0,
            max_time: 86_400.0,
        };

        let value_after = |key: &str| -> Option<f64> {
            args.iter()
                .position(|&t| t == key)
                .and_then(|i| args.get(i + 1))
                .and_then(|v| v.parse().ok())
        };

        if let Some(nodes) = value_after("nodes") {
            node_budget = nodes as NodeBudget;
        } else if let Some(ms) = value_after("movetime") {
            time_alloc = TimeAllocation {
                normal_time: ms / 1000.0,
                max_time: ms / 1000.0,
            };
        } else {
            let our_time = if self.board.side_to_move() == BLACK {
                value_after("btime")
            } else {
                value_after("wtime")
            };
            if let Some(ms) = our_time {
                let inc_key = if self.board.side_to_move() == BLACK { "binc" } else { "winc" };
                let clock = ChessClock {
                    mode: ClockMode::ConventionalIncremental,
                    reading: ms / 1000.0,
                    increment: value_after(inc_key).unwrap_or(0.0) / 1000.0,
                    moves_to_next_period: value_after("movestogo").unwrap_or(0.0) as u32,
                };
                time_alloc = allocate_time(&clock);
            }
        }

        let session = match self.session.take() {
            Some(session) => session,
            None => SearchSession::new(TT_SLOTS),
        };

        let job = RootSearchJob {
            board: self.board.clone(),
            session,
            evaluator: Arc::new(MaterialEvaluator),
            move_evaluator: Arc::new(StaticMoveEvaluator),
            tablebase: None,
            time_alloc,
            search_type: SearchType::MakeMove,
            node_budget,
            thinking_sink: Some(Box::new(|output: &ThinkingOutput| {
                let score_text = if is_mate_score(output.score) {
                    let plies = (MATE_MOVING_SIDE - output.score.abs()) as i32;
                    let moves = (plies + 1) / 2;
                    if output.score > 0 {
                        format!("mate {}", moves)
                    } else {
                        format!("mate -{}", moves)
                    }
                } else {
                    format!("cp {}", output.score)
                };
                println!(
                    "info depth {} score {} nodes {} time {} pv {}",
                    output.ply,
                    score_text,
                    output.node_count,
                    (output.time * 1000.0) as u64,
                    output.pv.trim_end(),
                );
            })),
            final_move_sink: Some(Box::new(|mv: &str| {
                println!("bestmove {}", mv);
            })),
        };

        let (_result, board, session) = AsyncSearch::start(job).join();
        self.board = board;
        self.session = Some(session);
    }

    fn perft(&mut self, args: &[&str], divide: bool) {
        let depth: u32 = args
            .first()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1);

        let start = Instant::now();
        if divide {
            let mut total = 0;
            for (mv, nodes) in perft_divide(&mut self.board, depth) {
                println!("{}: {}", mv, nodes);
                total += nodes;
            }
            println!("total: {}", total);
        } else {
            let nodes = perft(&mut self.board, depth);
            let secs = start.elapsed().as_secs_f64().max(1e-9);
            println!(
                "perft({}) = {} ({:.0} nps)",
                depth,
                nodes,
                nodes as f64 / secs
            );
        }
    }

    fn order(&mut self) {
        let mut list = MoveInfoList::new();
        let si = SearchInfo::new();
        use quota::search::move_eval::MoveEvaluator;
        StaticMoveEvaluator.generate_and_evaluate_moves(&mut self.board, &si, &mut list);
        for mi in list.iter() {
            println!(
                "{}: alloc {:.5} see {} nmsee {}",
                mi.mv, mi.node_allocation, mi.see_score, mi.nm_see_score
            );
        }
    }

    fn status(&mut self) {
        let text = match self.board.game_status() {
            GameStatus::WhiteWins => "1-0",
            GameStatus::BlackWins => "0-1",
            GameStatus::Stalemate => "1/2-1/2 stalemate",
            GameStatus::InsufficientMaterial => "1/2-1/2 insufficient material",
            GameStatus::Ongoing => "*",
        };
        println!(
            "{} ({} legal moves)",
            text,
            self.board.legal_moves(MoveKind::All).len()
        );
    }
}

fn main() {
    quota::logger::init_logging("logs/quota.log", "info");

    let mut engine = Engine::new();
    let stdin = std::io::stdin();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(_) => break,
        };
        let tokens: Vec<&str> = line.split_whitespace().collect();

        match tokens.split_first() {
            Some((&"position", rest)) => engine.set_position(rest),
            Some((&"go", rest)) => engine.go(rest),
            Some((&"perft", rest)) => engine.perft(rest, false),
            Some((&"divide", rest)) => engine.perft(rest, true),
            Some((&"order", _)) => engine.order(),
            Some((&"fen", _)) => println!("{}", engine.board.to_fen()),
            Some((&"d", _)) => print!("{}", engine.board.print_board()),
            Some((&"status", _)) => engine.status(),
            Some((&"quit", _)) | Some((&"exit", _)) => break,
            Some((cmd, _)) => println!("unknown command: {}", cmd),
            None => {}
        }
    }
}
