//! Make/unmake contracts: castling rights, en passant, promotions, clocks,
//! and the rollback of moves that would leave the king in check.

use quota::board::{Board, BLACK, WHITE, WN};
use quota::moves::types::Move;
use quota::square::parse_square;
use std::str::FromStr;

const CASTLE_FEN: &str = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";

fn play(board: &mut Board, text: &str) {
    let mv = board.parse_move(text).expect("legal move");
    assert!(board.apply_move(mv));
}

#[test]
fn king_move_revokes_both_rights() {
    let mut board = Board::from_str(CASTLE_FEN).unwrap();
    let before = board.clone();

    play(&mut board, "e1e2");
    assert!(!board.has_short_castling_right(WHITE));
    assert!(!board.has_long_castling_right(WHITE));
    assert!(board.has_short_castling_right(BLACK));

    board.undo_move();
    assert_eq!(board, before);
}

#[test]
fn rook_move_revokes_one_right() {
    let mut board = Board::from_str(CASTLE_FEN).unwrap();
    play(&mut board, "h1h2");
    assert!(!board.has_short_castling_right(WHITE));
    assert!(board.has_long_castling_right(WHITE));
}

#[test]
fn capture_onto_rook_home_revokes_the_victims_right() {
    let mut board = Board::from_str(CASTLE_FEN).unwrap();
    let before = board.clone();

    // Ra1xa8: white loses the long right (rook left home) AND black loses
    // the long right (rook captured on its home square).
    play(&mut board, "a1a8");
    assert!(!board.has_long_castling_right(WHITE));
    assert!(!board.has_long_castling_right(BLACK));
    assert!(board.has_short_castling_right(WHITE));
    assert!(board.has_short_castling_right(BLACK));

    board.undo_move();
    assert_eq!(board, before);
}

#[test]
fn castling_moves_both_pieces_and_counts_the_clock() {
    let mut board = Board::from_str("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 7 20").unwrap();
    let before = board.clone();

    play(&mut board, "e1g1");
    assert_eq!(board.piece_at(parse_square("g1").unwrap()), quota::board::WK);
    assert_eq!(board.piece_at(parse_square("f1").unwrap()), quota::board::WR);
    assert_eq!(board.piece_at(parse_square("e1").unwrap()), quota::board::EMPTY);
    assert_eq!(board.piece_at(parse_square("h1").unwrap()), quota::board::EMPTY);
    assert!(!board.has_short_castling_right(WHITE));
    assert!(!board.has_long_castling_right(WHITE));
    // Castling neither captures nor moves a pawn.
    assert_eq!(board.half_moves_clock(), 8);
    assert_eq!(board.get_hash(), board.compute_hash_full());

    board.undo_move();
    assert_eq!(board, before);
}

#[test]
fn queenside_castle_round_trips() {
    let mut board = Board::from_str(CASTLE_FEN).unwrap();
    let before = board.clone();
    play(&mut board, "e1c1");
    assert_eq!(board.piece_at(parse_square("c1").unwrap()), quota::board::WK);
    assert_eq!(board.piece_at(parse_square("d1").unwrap()), quota::board::WR);
    board.undo_move();
    assert_eq!(board, before);

    play(&mut board, "e1e2");
    play(&mut board, "e8c8");
    assert_eq!(board.piece_at(parse_square("c8").unwrap()), quota::board::BK);
    assert_eq!(board.piece_at(parse_square("d8").unwrap()), quota::board::BR);
}

#[test]
fn en_passant_capture_removes_the_right_pawn() {
    let mut board = Board::from_str("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 3").unwrap();
    let before = board.clone();

    play(&mut board, "e5d6");
    assert_eq!(board.piece_at(parse_square("d6").unwrap()), quota::board::WP);
    assert_eq!(board.piece_at(parse_square("d5").unwrap()), quota::board::EMPTY);
    assert_eq!(board.piece_at(parse_square("e5").unwrap()), quota::board::EMPTY);
    // A capture and a pawn move: the clock resets.
    assert_eq!(board.half_moves_clock(), 0);

    board.undo_move();
    assert_eq!(board, before);
}

#[test]
fn promotion_with_capture_round_trips() {
    let mut board = Board::from_str("2r4k/1P6/8/8/8/8/8/K7 w - - 3 40").unwrap();
    let before = board.clone();

    let mv = board.parse_move("b7c8q").unwrap();
    assert!(board.apply_move(mv));
    assert_eq!(board.piece_at(parse_square("c8").unwrap()), quota::board::WQ);
    assert_eq!(board.piece_bitboard(quota::board::BR), 0);
    assert_eq!(board.half_moves_clock(), 0);
    assert_eq!(board.get_hash(), board.compute_hash_full());

    board.undo_move();
    assert_eq!(board, before);

    // Under-promotion to knight, no capture.
    let mv = board.parse_move("b7b8n").unwrap();
    assert!(board.apply_move(mv));
    assert_eq!(board.piece_at(parse_square("b8").unwrap()), WN);
    board.undo_move();
    assert_eq!(board, before);
}

#[test]
fn illegal_move_rolls_back_completely() {
    // The knight on e2 is pinned against the king by the rook on e7.
    let board = Board::from_str("4k3/4r3/8/8/8/8/4N3/4K3 w - - 0 1").unwrap();
    let mut working = board.clone();

    let pinned = Move::new(WN, parse_square("e2").unwrap(), parse_square("d4").unwrap());
    assert!(working.check_pseudo_legal(pinned));
    assert!(!working.apply_move(pinned));
    assert_eq!(working, board, "failed apply must leave no trace");
    assert_eq!(working.possible_undo(), 0);
}

#[test]
fn null_move_round_trips_with_ep_armed() {
    let mut board = Board::from_str("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 3").unwrap();
    let before = board.clone();

    board.make_null_move();
    assert_eq!(board.side_to_move(), BLACK);
    assert_eq!(board.ep_square(), None);
    assert_eq!(board.move_from_last(0), Some(Move::NONE));
    assert_eq!(board.get_hash(), board.compute_hash_full());

    board.undo_move();
    assert_eq!(board, before);
}

#[test]
fn quiet_moves_advance_the_clock() {
    let mut board = Board::start_position();
    play(&mut board, "g1f3");
    assert_eq!(board.half_moves_clock(), 1);
    play(&mut board, "g8f6");
    assert_eq!(board.half_moves_clock(), 2);
    play(&mut board, "e2e4");
    assert_eq!(board.half_moves_clock(), 0);
}

#[test]
fn move_stack_reports_history() {
    let mut board = Board::start_position();
    play(&mut board, "e2e4");
    play(&mut board, "e7e5");
    let last = board.move_from_last(0).unwrap();
    assert_eq!(last.to_string(), "e7e5");
    let earlier = board.move_from_last(1).unwrap();
    assert_eq!(earlier.to_string(), "e2e4");
    assert_eq!(board.move_from_last(2), None);
}
