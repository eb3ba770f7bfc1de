//! Draw detection and game termination.

use super::{Board, BB, BLACK, BN, BP, BQ, BR, HALF_MOVES_CLOCK, HASH, SIDE_TO_MOVE, WB, WN, WP, WQ, WR};
use crate::bitboard::{BitboardExt, BLACK_SQUARES, WHITE_SQUARES};
use crate::moves::movegen::MoveKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    WhiteWins,
    BlackWins,
    Stalemate,
    InsufficientMaterial,
    Ongoing,
}

impl Board {
    /// Has this position occurred at least twice before? The en-passant key
    /// is part of the hash whether or not a capture is actually possible, so
    /// in rare cases a transposition is missed; the engine only ever offers
    /// draws, never claims them, so that stays harmless.
    pub fn is_3fold(&self) -> bool {
        let current = self.bb[HASH];
        let mut count = 0;
        for &past in self.hash_stack.iter() {
            if past == current {
                count += 1;
                if count >= 2 {
                    return true;
                }
            }
        }
        false
    }

    /// Looks for one earlier occurrence of the current position within the
    /// last `window` plies. The search uses this instead of the full 3-fold
    /// scan, which gets slow in long games.
    pub fn is_2fold(&self, window: usize) -> bool {
        let current = self.bb[HASH];
        self.hash_stack
            .iter()
            .rev()
            .take(window)
            .any(|&past| past == current)
    }

    pub fn is_50_moves(&self) -> bool {
        self.u8s[HALF_MOVES_CLOCK] >= 100
    }

    /// Neither side can win. In relaxed mode, configurations that are not
    /// drawn by rule but cannot be won without suicidal cooperation (two
    /// lone knights) count as insufficient too.
    pub fn has_insufficient_material(&self, relaxed: bool) -> bool {
        if self.bb[WP as usize] != 0
            || self.bb[BP as usize] != 0
            || self.bb[WQ as usize] != 0
            || self.bb[BQ as usize] != 0
            || self.bb[WR as usize] != 0
            || self.bb[BR as usize] != 0
        {
            return false;
        }

        let can_win = |knights: u64, bishops: u64| -> bool {
            if knights == 0 && bishops == 0 {
                return false;
            }
            if knights == 0 {
                // Bishops alone win only on both square colours.
                return bishops & WHITE_SQUARES != 0 && bishops & BLACK_SQUARES != 0;
            }
            if bishops == 0 {
                let needed = if relaxed { 3 } else { 2 };
                return knights.count() >= needed;
            }
            // Bishop plus knight mates.
            true
        };

        !can_win(self.bb[WN as usize], self.bb[WB as usize])
            && !can_win(self.bb[BN as usize], self.bb[BB as usize])
    }

    pub fn game_status(&mut self) -> GameStatus {
        let legal = self.legal_moves(MoveKind::All);

        if legal.is_empty() {
            if self.in_check() {
                if self.u8s[SIDE_TO_MOVE] == BLACK {
                    GameStatus::WhiteWins
                } else {
                    GameStatus::BlackWins
                }
            } else {
                GameStatus::Stalemate
            }
        } else if self.has_insufficient_material(false) {
            GameStatus::InsufficientMaterial
        } else {
            GameStatus::Ongoing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn fools_mate() {
        let mut board = Board::start_position();
        for text in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            let mv = board.parse_move(text).unwrap();
            assert!(board.apply_move(mv));
        }
        assert_eq!(board.game_status(), GameStatus::BlackWins);
    }

    #[test]
    fn stalemate_detected() {
        let mut board = Board::from_str("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(board.game_status(), GameStatus::Stalemate);
    }

    #[test]
    fn bare_kings_are_insufficient() {
        let mut board = Board::from_str("8/8/4k3/8/8/2K5/8/8 w - - 0 1").unwrap();
        assert!(board.has_insufficient_material(false));
        assert_eq!(board.game_status(), GameStatus::InsufficientMaterial);
    }

    #[test]
    fn two_knights_only_relaxed() {
        let board = Board::from_str("8/8/4k3/8/8/2K2N2/4N3/8 w - - 0 1").unwrap();
        assert!(board.has_insufficient_material(true));
        assert!(!board.has_insufficient_material(false));
    }

    #[test]
    fn opposite_bishops_can_win() {
        // Bishops on both colours: not insufficient.
        let board = Board::from_str("8/8/4k3/8/8/2KBB3/8/8 w - - 0 1").unwrap();
        assert!(!board.has_insufficient_material(true));
        // Single bishop: insufficient.
        let board = Board::from_str("8/8/4k3/8/8/2KB4/8/8 w - - 0 1").unwrap();
        assert!(board.has_insufficient_material(false));
    }

    #[test]
    fn repetition_scans() {
        let mut board = Board::start_position();
        // Knight shuffle: the start position recurs after every 4 plies.
        for _ in 0..2 {
            for text in ["g1f3", "g8f6", "f3g1", "f6g8"] {
                let mv = board.parse_move(text).unwrap();
                board.apply_move(mv);
            }
        }
        assert!(board.is_3fold());
        assert!(board.is_2fold(16));
        assert!(!board.is_2fold(2));
    }

    #[test]
    fn fifty_move_rule() {
        let board = Board::from_str("7k/8/8/8/8/8/8/R6K w - - 100 80").unwrap();
        assert!(board.is_50_moves());
        let board = Board::from_str("7k/8/8/8/8/8/8/R6K w - - 99 80").unwrap();
        assert!(!board.is_50_moves());
    }
}
