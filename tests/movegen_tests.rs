//! Move-generation kind partition and edge cases.

use quota::board::Board;
use quota::moves::movegen::MoveKind;
use std::str::FromStr;

const FENS: &[&str] = &[
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq -",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - -",
    "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
    "r2q1rk1/pP1p2pp/Q4n2/bbp1p3/Np6/1B3NBn/pPPP1PPP/R3K2R b KQ - 0 1",
    "2r4k/1P6/8/4q1nr/7p/5N2/K7/8 w - - 0 1",
    "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1",
];

#[test]
fn kinds_partition_the_legal_set() {
    for fen in FENS {
        let mut board = Board::from_str(fen).unwrap();
        let all = board.legal_moves(MoveKind::All);
        let violent = board.legal_moves(MoveKind::Violent);
        let quiet = board.legal_moves(MoveKind::Quiet);

        assert_eq!(
            all.len(),
            violent.len() + quiet.len(),
            "partition size mismatch for {}",
            fen
        );
        for mv in violent.iter() {
            assert!(all.contains(mv), "violent move missing from all: {}", mv);
            assert!(!quiet.contains(mv), "move in both kinds: {}", mv);
        }
        for mv in quiet.iter() {
            assert!(all.contains(mv), "quiet move missing from all: {}", mv);
        }
    }
}

#[test]
fn violent_means_capture_or_queen_promotion() {
    for fen in FENS {
        let mut board = Board::from_str(fen).unwrap();
        for mv in board.legal_moves(MoveKind::Violent) {
            assert!(board.is_violent(mv), "generated violent move isn't: {}", mv);
            let captures = board.captured_piece_type(mv) != quota::board::EMPTY;
            assert!(
                captures || mv.is_queen_promotion(),
                "violent move neither captures nor queens: {}",
                mv
            );
        }
        for mv in board.legal_moves(MoveKind::Quiet) {
            assert!(!board.is_violent(mv), "quiet move is violent: {}", mv);
        }
    }
}

#[test]
fn every_generated_move_is_pseudo_legal() {
    for fen in FENS {
        let mut board = Board::from_str(fen).unwrap();
        for mv in board.legal_moves(MoveKind::All) {
            assert!(
                board.check_pseudo_legal(mv),
                "{} fails its own pseudo-legality check on {}",
                mv,
                fen
            );
        }
    }
}

#[test]
fn pinned_ep_capture_is_rejected() {
    // Taking en passant would clear the fifth rank and expose the king to
    // the rook: both pawns vanish from the rank at once.
    let mut board = Board::from_str("8/8/8/KPp4r/8/8/8/4k3 w - c6 0 2").unwrap();
    let all = board.legal_moves(MoveKind::All);
    assert!(
        !all.iter().any(|m| m.to_string() == "b5c6"),
        "illegal ep capture generated"
    );
}

#[test]
fn legal_ep_capture_is_found() {
    let mut board = Board::from_str("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").unwrap();
    let violent = board.legal_moves(MoveKind::Violent);
    assert!(violent.iter().any(|m| m.to_string() == "e5d6"));
}

#[test]
fn check_evasion_only() {
    // Double check: only king moves escape.
    let mut board = Board::from_str("4k3/8/8/8/8/4r3/5n2/4K3 w - - 0 1").unwrap();
    assert!(board.in_check());
    let all = board.legal_moves(MoveKind::All);
    assert!(!all.is_empty());
    for mv in all.iter() {
        assert_eq!(mv.piece_type(), quota::board::WK);
    }
}

#[test]
fn is_checking_detects_checks() {
    let mut board = Board::start_position();
    let quiet = board.parse_move("e2e4").unwrap();
    assert!(!board.is_checking(quiet));

    let mut board = Board::from_str("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
    let check = board.parse_move("a1a8").unwrap();
    assert!(board.is_checking(check));
}
