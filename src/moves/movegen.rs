//! Pseudo-legal move generation by kind, plus the legality filter.
//!
//! *Violent* moves are captures and queen promotions (capturing queen
//! promotions included). *Quiet* moves are everything else: castling,
//! non-captures, and all under-promotions whether they capture or not.
//!
//! Violent moves come out pawn first and king last, so the list is already
//! ordered least-valuable-attacker-first; the move picker's capture stage
//! counts on that.

use crate::bitboard::{bit, BitIter, RANK_1, RANK_8};
use crate::board::{
    opposite, Board, Color, PieceType, B_LONG_CASTLE, B_SHORT_CASTLE, EMPTY, EN_PASS_SQUARE, WB,
    WHITE, WK, WN, WP, WQ, WR, W_LONG_CASTLE, W_SHORT_CASTLE,
};
use crate::moves::attacks::{KING_ATK, KNIGHT_ATK, PAWN_ATK, PAWN_MOVE_1, PAWN_MOVE_2};
use crate::moves::magic::{bmagic, qmagic, rmagic};
use crate::moves::square_control::is_square_attacked;
use crate::moves::types::{
    Move, MoveList, CASTLE_BLACK_LONG, CASTLE_BLACK_SHORT, CASTLE_WHITE_LONG, CASTLE_WHITE_SHORT,
};
use crate::square::{A1, A8, B1, B8, C1, C8, D1, D8, E1, E8, F1, F8, G1, G8, H1, H8};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    All,
    Violent,
    Quiet,
}

impl Board {
    /// Pseudo-legal moves of the given kind, in generation order.
    pub fn generate_pseudo_legal(&self, kind: MoveKind, out: &mut MoveList) {
        match kind {
            MoveKind::Violent => self.generate_kind(true, out),
            MoveKind::Quiet => self.generate_kind(false, out),
            MoveKind::All => {
                self.generate_kind(true, out);
                self.generate_kind(false, out);
            }
        }
    }

    /// Legal moves of the given kind: pseudo-legal filtered through
    /// apply/undo king-safety.
    pub fn legal_moves(&mut self, kind: MoveKind) -> MoveList {
        let mut pseudo = MoveList::new();
        self.generate_pseudo_legal(kind, &mut pseudo);

        let mut legal = MoveList::new();
        for &mv in pseudo.iter() {
            if self.apply_move(mv) {
                self.undo_move();
                legal.push(mv);
            }
        }
        legal
    }

    fn generate_kind(&self, violent: bool, out: &mut MoveList) {
        let color = self.side_to_move();
        self.generate_pawn_moves(color, violent, out);
        self.generate_knight_moves(color, violent, out);
        self.generate_slider_moves(WB, color, violent, out);
        self.generate_slider_moves(WR, color, violent, out);
        self.generate_slider_moves(WQ, color, violent, out);
        self.generate_king_moves(color, violent, out);
    }

    fn generate_pawn_moves(&self, color: Color, violent: bool, out: &mut MoveList) {
        let pt = WP | color;
        let dir = if color == WHITE { 0 } else { 1 };
        let promo_rank = if color == WHITE { RANK_8 } else { RANK_1 };
        let enemy = self.occupied(opposite(color));
        let empty = !self.total_occupancy();
        let ep = self.bb[EN_PASS_SQUARE];

        let queen = WQ | color;
        let under_promos = [WR | color, WB | color, WN | color];

        for from in BitIter(self.piece_bitboard(pt)) {
            let captures = PAWN_ATK[from][dir] & (enemy | ep);
            let push1 = PAWN_MOVE_1[from][dir] & empty;
            let push2 = if push1 != 0 {
                PAWN_MOVE_2[from][dir] & empty
            } else {
                0
            };

            if violent {
                for to in BitIter(captures) {
                    if bit(to) & promo_rank != 0 {
                        out.push(Move::promotion(pt, from, to, queen));
                    } else {
                        out.push(Move::new(pt, from, to));
                    }
                }
                for to in BitIter(push1 & promo_rank) {
                    out.push(Move::promotion(pt, from, to, queen));
                }
            } else {
                for to in BitIter(push1 & !promo_rank) {
                    out.push(Move::new(pt, from, to));
                }
                for to in BitIter(push2) {
                    out.push(Move::new(pt, from, to));
                }
                // Under-promotions, capturing or not, are quiet moves.
                for to in BitIter((captures | push1) & promo_rank) {
                    for &under in &under_promos {
                        out.push(Move::promotion(pt, from, to, under));
                    }
                }
            }
        }
    }

    fn generate_knight_moves(&self, color: Color, violent: bool, out: &mut MoveList) {
        let pt = WN | color;
        let targets = self.target_set(color, violent);
        for from in BitIter(self.piece_bitboard(pt)) {
            for to in BitIter(KNIGHT_ATK[from] & targets) {
                out.push(Move::new(pt, from, to));
            }
        }
    }

    fn generate_slider_moves(
        &self,
        role: PieceType,
        color: Color,
        violent: bool,
        out: &mut MoveList,
    ) {
        let pt = role | color;
        let targets = self.target_set(color, violent);
        let occupancy = self.total_occupancy();
        for from in BitIter(self.piece_bitboard(pt)) {
            let attacks = match role {
                WB => bmagic(from, occupancy),
                WR => rmagic(from, occupancy),
                _ => qmagic(from, occupancy),
            };
            for to in BitIter(attacks & targets) {
                out.push(Move::new(pt, from, to));
            }
        }
    }

    fn generate_king_moves(&self, color: Color, violent: bool, out: &mut MoveList) {
        let pt = WK | color;
        let from = self.king_square(color);
        let targets = self.target_set(color, violent);

        for to in BitIter(KING_ATK[from] & targets) {
            out.push(Move::new(pt, from, to));
        }

        if violent {
            return;
        }

        // Castling: rights held, path empty, king's current and transit
        // squares safe. The arrival square is covered by the legality filter
        // like any other king move.
        let them = opposite(color);
        if color == WHITE {
            if self.u8s[W_SHORT_CASTLE] != 0
                && self.u8s[F1] == EMPTY
                && self.u8s[G1] == EMPTY
                && !is_square_attacked(self, E1, them)
                && !is_square_attacked(self, F1, them)
            {
                out.push(Move::castle(pt, E1, G1, CASTLE_WHITE_SHORT));
            }
            if self.u8s[W_LONG_CASTLE] != 0
                && self.u8s[B1] == EMPTY
                && self.u8s[C1] == EMPTY
                && self.u8s[D1] == EMPTY
                && !is_square_attacked(self, E1, them)
                && !is_square_attacked(self, D1, them)
            {
                out.push(Move::castle(pt, E1, C1, CASTLE_WHITE_LONG));
            }
        } else {
            if self.u8s[B_SHORT_CASTLE] != 0
                && self.u8s[F8] == EMPTY
                && self.u8s[G8] == EMPTY
                && !is_square_attacked(self, E8, them)
                && !is_square_attacked(self, F8, them)
            {
                out.push(Move::castle(pt, E8, G8, CASTLE_BLACK_SHORT));
            }
            if self.u8s[B_LONG_CASTLE] != 0
                && self.u8s[B8] == EMPTY
                && self.u8s[C8] == EMPTY
                && self.u8s[D8] == EMPTY
                && !is_square_attacked(self, E8, them)
                && !is_square_attacked(self, D8, them)
            {
                out.push(Move::castle(pt, E8, C8, CASTLE_BLACK_LONG));
            }
        }
    }

    #[inline(always)]
    fn target_set(&self, color: Color, violent: bool) -> u64 {
        if violent {
            self.occupied(opposite(color))
        } else {
            !self.total_occupancy()
        }
    }

    /// Is the move a capture or a queen promotion in this position?
    pub fn is_violent(&self, mv: Move) -> bool {
        let to = mv.to_sq();
        mv.is_queen_promotion()
            || self.u8s[to] != EMPTY
            || (bit(to) == self.bb[EN_PASS_SQUARE]
                && crate::board::strip_color(mv.piece_type()) == WP)
    }

    /// Does playing the move give check? Applies and undoes the move.
    pub fn is_checking(&mut self, mv: Move) -> bool {
        if !self.apply_move(mv) {
            return false;
        }
        let checking = self.in_check();
        self.undo_move();
        checking
    }

    /// Verifies that a move from a table (hash move, killer) is playable in
    /// this position. The move must be well-formed for *some* position; this
    /// checks slot origin, destination constraints, blocker emptiness for
    /// castling and double pushes, and transit-square safety for castling.
    /// Never mutates the board.
    pub fn check_pseudo_legal(&self, mv: Move) -> bool {
        if mv.is_none() {
            return false;
        }

        let pt = mv.piece_type();
        let role = crate::board::strip_color(pt);
        let from = mv.from_sq();
        let to = mv.to_sq();
        let color = crate::board::get_color(pt);

        let to_pt = self.u8s[to];
        let to_color = crate::board::get_color(to_pt);

        // Destination occupied by a friend, wrong piece on the from square,
        // or wrong side to move.
        if to_pt != EMPTY && to_color == color {
            return false;
        }
        if self.u8s[from] != pt {
            return false;
        }
        if color != self.side_to_move() {
            return false;
        }

        let occupancy = self.total_occupancy();

        match role {
            WN => KNIGHT_ATK[from] & bit(to) != 0,
            WR => rmagic(from, occupancy) & bit(to) != 0,
            WB => bmagic(from, occupancy) & bit(to) != 0,
            WQ => qmagic(from, occupancy) & bit(to) != 0,
            WP => {
                let dir = if color == WHITE { 0 } else { 1 };
                if crate::square::file_of(from) != crate::square::file_of(to) {
                    // Diagonal: must be a capture or the en-passant target.
                    if PAWN_ATK[from][dir] & bit(to) == 0 {
                        return false;
                    }
                    to_pt != EMPTY || bit(to) == self.bb[EN_PASS_SQUARE]
                } else if PAWN_MOVE_1[from][dir] & bit(to) != 0 {
                    to_pt == EMPTY
                } else if PAWN_MOVE_2[from][dir] & bit(to) != 0 {
                    let mid = (from + to) / 2;
                    to_pt == EMPTY && self.u8s[mid] == EMPTY
                } else {
                    false
                }
            }
            _ => {
                // King: castling needs rights, the rook at home, an empty
                // path, and safe current/transit squares.
                let them = opposite(color);
                if from == E1 && to == G1 && mv.is_castling() {
                    self.u8s[W_SHORT_CASTLE] != 0
                        && self.u8s[H1] == WR
                        && self.u8s[F1] == EMPTY
                        && self.u8s[G1] == EMPTY
                        && !is_square_attacked(self, E1, them)
                        && !is_square_attacked(self, F1, them)
                } else if from == E1 && to == C1 && mv.is_castling() {
                    self.u8s[W_LONG_CASTLE] != 0
                        && self.u8s[A1] == WR
                        && self.u8s[B1] == EMPTY
                        && self.u8s[C1] == EMPTY
                        && self.u8s[D1] == EMPTY
                        && !is_square_attacked(self, E1, them)
                        && !is_square_attacked(self, D1, them)
                } else if from == E8 && to == G8 && mv.is_castling() {
                    self.u8s[B_SHORT_CASTLE] != 0
                        && self.u8s[H8] == crate::board::BR
                        && self.u8s[F8] == EMPTY
                        && self.u8s[G8] == EMPTY
                        && !is_square_attacked(self, E8, them)
                        && !is_square_attacked(self, F8, them)
                } else if from == E8 && to == C8 && mv.is_castling() {
                    self.u8s[B_LONG_CASTLE] != 0
                        && self.u8s[A8] == crate::board::BR
                        && self.u8s[B8] == EMPTY
                        && self.u8s[C8] == EMPTY
                        && self.u8s[D8] == EMPTY
                        && !is_square_attacked(self, E8, them)
                        && !is_square_attacked(self, D8, them)
                } else {
                    !mv.is_castling() && KING_ATK[from] & bit(to) != 0
                }
            }
        }
    }

    /// Finds the legal move matching coordinate text like `e2e4` / `a7a8q`.
    pub fn parse_move(&mut self, text: &str) -> Option<Move> {
        let text = text.trim();
        if text.len() != 4 && text.len() != 5 {
            return None;
        }
        let from = crate::square::parse_square(text.get(0..2)?)?;
        let to = crate::square::parse_square(text.get(2..4)?)?;
        let promo_role = match text.len() {
            5 => match text.as_bytes()[4].to_ascii_lowercase() {
                b'q' => Some(WQ),
                b'r' => Some(WR),
                b'b' => Some(WB),
                b'n' => Some(WN),
                _ => return None,
            },
            _ => None,
        };

        let legal = self.legal_moves(MoveKind::All);
        legal.iter().copied().find(|mv| {
            mv.from_sq() == from
                && mv.to_sq() == to
                && match promo_role {
                    Some(role) => crate::board::strip_color(mv.promo_type()) == role,
                    None => !mv.is_promotion(),
                }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn start_position_has_twenty_moves() {
        let mut board = Board::start_position();
        assert_eq!(board.legal_moves(MoveKind::All).len(), 20);
        assert_eq!(board.legal_moves(MoveKind::Violent).len(), 0);
        assert_eq!(board.legal_moves(MoveKind::Quiet).len(), 20);
    }

    #[test]
    fn kind_partition() {
        let mut board = Board::from_str(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        let all = board.legal_moves(MoveKind::All);
        let violent = board.legal_moves(MoveKind::Violent);
        let quiet = board.legal_moves(MoveKind::Quiet);
        assert_eq!(all.len(), violent.len() + quiet.len());
        for mv in violent.iter() {
            assert!(all.contains(mv));
            assert!(board.is_violent(*mv));
        }
        for mv in quiet.iter() {
            assert!(all.contains(mv));
            assert!(!board.is_violent(*mv));
        }
    }

    #[test]
    fn underpromotions_are_quiet() {
        let mut board = Board::from_str("2r4k/1P6/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let violent = board.legal_moves(MoveKind::Violent);
        let quiet = board.legal_moves(MoveKind::Quiet);

        // Violent: b7b8q, b7c8q. Quiet promotions: 3 under-promos per target.
        assert!(violent.iter().all(|m| m.is_queen_promotion()));
        assert_eq!(violent.len(), 2);
        let under: Vec<_> = quiet.iter().filter(|m| m.is_promotion()).collect();
        assert_eq!(under.len(), 6);
    }

    #[test]
    fn en_passant_is_generated_and_violent() {
        let mut board =
            Board::from_str("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").unwrap();
        let violent = board.legal_moves(MoveKind::Violent);
        let ep = violent
            .iter()
            .find(|m| m.to_string() == "e5d6")
            .copied()
            .expect("ep capture generated");
        assert!(board.is_violent(ep));
    }

    #[test]
    fn castling_blocked_by_attack() {
        // The f8 rook covers the short-castle transit square f1.
        let mut board =
            Board::from_str("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let quiet = board.legal_moves(MoveKind::Quiet);
        assert!(!quiet.iter().any(|m| m.to_string() == "e1g1"));
        assert!(quiet.iter().any(|m| m.to_string() == "e1c1"));
    }

    #[test]
    fn pseudo_legal_validates_table_moves() {
        let board = Board::start_position();
        let good = Move::new(WP, crate::square::parse_square("e2").unwrap(), 28);
        assert!(board.check_pseudo_legal(good));

        // Knight move that is not a knight jump
        let bad = Move::new(WN, 1, 2);
        assert!(!board.check_pseudo_legal(bad));

        // Right piece, wrong side to move
        let black_pawn = Move::new(crate::board::BP, 48, 40);
        assert!(!board.check_pseudo_legal(black_pawn));
    }

    #[test]
    fn parse_move_finds_promotions() {
        let mut board = Board::from_str("2r4k/1P6/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let mv = board.parse_move("b7c8r").unwrap();
        assert!(mv.is_promotion() && !mv.is_queen_promotion());
        assert!(board.parse_move("b7c8").is_none());
        assert!(board.parse_move("a1a3").is_none());
    }
}
