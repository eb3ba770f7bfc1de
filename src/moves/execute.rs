//! Move application and undo.
//!
//! Apply records the previous value of every slot it touches, each slot at
//! most once per move, so undo is a plain write-back of both lists plus a
//! pop of the hash and move stacks. The Zobrist hash is updated XOR by XOR,
//! in step with each state change, and is never recomputed from scratch
//! outside debug assertions.

use crate::bitboard::{bit, inv_bit, BitboardExt};
use crate::board::{
    get_color, Board, PieceType, UndoListBB, UndoListU8, BK, BLACK, BP, BR, B_LONG_CASTLE,
    B_SHORT_CASTLE, COLOR_MASK, EMPTY, EN_PASS_SQUARE, HALF_MOVES_CLOCK, HASH, IN_CHECK,
    SIDE_TO_MOVE, WHITE_OCCUPIED, WK, WP, WR, W_LONG_CASTLE, W_SHORT_CASTLE,
};
use crate::hash::zobrist::keys;
use crate::moves::attacks::PAWN_MOVE_1;
use crate::moves::types::{
    Move, CASTLE_BLACK_LONG, CASTLE_BLACK_SHORT, CASTLE_WHITE_LONG, CASTLE_WHITE_SHORT,
};
use crate::square::{rank_of, Square, A1, A8, C1, C8, D1, D8, E1, E8, F1, F8, G1, G8, H1, H8};

impl Board {
    #[inline(always)]
    fn move_piece(&mut self, pt: PieceType, from: Square, to: Square) {
        self.bb[pt as usize] ^= bit(from) | bit(to);
        self.u8s[from] = EMPTY;
        self.u8s[to] = pt;
    }

    #[inline(always)]
    fn remove_piece(&mut self, pt: PieceType, sq: Square) {
        self.bb[pt as usize] &= inv_bit(sq);
        self.u8s[sq] = EMPTY;
    }

    #[inline(always)]
    fn place_piece(&mut self, pt: PieceType, sq: Square) {
        self.bb[pt as usize] |= bit(sq);
        self.u8s[sq] = pt;
    }

    #[inline(always)]
    fn replace_piece(&mut self, old_pt: PieceType, new_pt: PieceType, sq: Square) {
        self.bb[old_pt as usize] &= inv_bit(sq);
        self.bb[new_pt as usize] |= bit(sq);
        self.u8s[sq] = new_pt;
    }

    /// Attempts to play `mv` (which must be pseudo-legal). If the move would
    /// leave the mover's king in check, every change is rolled back and
    /// `false` is returned; otherwise the move is committed, the side to
    /// move flips, and `true` is returned.
    pub fn apply_move(&mut self, mv: Move) -> bool {
        let zk = keys();

        let mut ul_bb = UndoListBB::new();
        let mut ul_u8 = UndoListU8::new();

        let mv = mv.without_score();
        let pt = mv.piece_type();
        let from = mv.from_sq();
        let to = mv.to_sq();
        let color = get_color(pt);
        let promo = mv.promo_type();

        self.hash_stack.push(self.bb[HASH]);

        // The en-passant target dies on every move; its key leaves the hash
        // whenever the field is non-zero, capturable or not.
        if self.bb[EN_PASS_SQUARE] != 0 {
            self.bb[HASH] ^= zk.en_passant[self.bb[EN_PASS_SQUARE].lsb()];
        }
        ul_bb.push((EN_PASS_SQUARE as u8, self.bb[EN_PASS_SQUARE]));
        let current_ep = self.bb[EN_PASS_SQUARE];
        self.bb[EN_PASS_SQUARE] = 0;

        ul_u8.push((IN_CHECK as u8, self.u8s[IN_CHECK]));

        let is_pawn = pt == WP || pt == BP;
        let is_ep_capture = is_pawn && bit(to) == current_ep;
        let is_capture = self.u8s[to] != EMPTY || is_ep_capture;

        // Half-move clock: reset on any pawn move or capture (en passant
        // included), otherwise count up. Castling counts up.
        ul_u8.push((HALF_MOVES_CLOCK as u8, self.u8s[HALF_MOVES_CLOCK]));
        if is_capture || is_pawn {
            self.u8s[HALF_MOVES_CLOCK] = 0;
        } else {
            self.u8s[HALF_MOVES_CLOCK] = self.u8s[HALF_MOVES_CLOCK].saturating_add(1);
        }

        if mv.is_castling() {
            let (king_from, king_to, rook_from, rook_to, short_idx, long_idx) =
                match mv.castling_type() {
                    CASTLE_WHITE_SHORT => (E1, G1, H1, F1, W_SHORT_CASTLE, W_LONG_CASTLE),
                    CASTLE_WHITE_LONG => (E1, C1, A1, D1, W_SHORT_CASTLE, W_LONG_CASTLE),
                    CASTLE_BLACK_SHORT => (E8, G8, H8, F8, B_SHORT_CASTLE, B_LONG_CASTLE),
                    _ => (E8, C8, A8, D8, B_SHORT_CASTLE, B_LONG_CASTLE),
                };
            let king = WK | color;
            let rook = WR | color;
            let occ_idx = WHITE_OCCUPIED | color as usize;

            ul_u8.push((king_from as u8, self.u8s[king_from]));
            ul_u8.push((king_to as u8, self.u8s[king_to]));
            ul_u8.push((rook_from as u8, self.u8s[rook_from]));
            ul_u8.push((rook_to as u8, self.u8s[rook_to]));
            ul_bb.push((king as u8, self.bb[king as usize]));
            ul_bb.push((rook as u8, self.bb[rook as usize]));
            ul_bb.push((occ_idx as u8, self.bb[occ_idx]));

            let (short_key, long_key) = if color == crate::board::WHITE {
                (zk.castling[0], zk.castling[1])
            } else {
                (zk.castling[2], zk.castling[3])
            };
            if self.u8s[short_idx] != 0 {
                self.bb[HASH] ^= short_key;
            }
            if self.u8s[long_idx] != 0 {
                self.bb[HASH] ^= long_key;
            }

            self.bb[HASH] ^= zk.pieces[king_from][king as usize];
            self.bb[HASH] ^= zk.pieces[king_to][king as usize];
            self.bb[HASH] ^= zk.pieces[rook_from][rook as usize];
            self.bb[HASH] ^= zk.pieces[rook_to][rook as usize];

            self.move_piece(king, king_from, king_to);
            self.move_piece(rook, rook_from, rook_to);
            ul_u8.push((short_idx as u8, self.u8s[short_idx]));
            ul_u8.push((long_idx as u8, self.u8s[long_idx]));
            self.u8s[short_idx] = 0;
            self.u8s[long_idx] = 0;
            self.bb[occ_idx] ^= bit(king_from) | bit(king_to) | bit(rook_from) | bit(rook_to);
        } else if is_ep_capture {
            let victim_sq = if pt == WP { to - 8 } else { to + 8 };
            let victim = if pt == WP { BP } else { WP };
            let own_occ = WHITE_OCCUPIED | color as usize;
            let their_occ = WHITE_OCCUPIED | (color ^ COLOR_MASK) as usize;

            ul_u8.push((from as u8, self.u8s[from]));
            ul_u8.push((to as u8, self.u8s[to]));
            ul_u8.push((victim_sq as u8, self.u8s[victim_sq]));
            ul_bb.push((pt as u8, self.bb[pt as usize]));
            ul_bb.push((victim as u8, self.bb[victim as usize]));
            ul_bb.push((own_occ as u8, self.bb[own_occ]));
            ul_bb.push((their_occ as u8, self.bb[their_occ]));

            self.bb[HASH] ^= zk.pieces[from][pt as usize];
            self.bb[HASH] ^= zk.pieces[to][pt as usize];
            self.bb[HASH] ^= zk.pieces[victim_sq][victim as usize];

            self.move_piece(pt, from, to);
            self.remove_piece(victim, victim_sq);
            self.bb[own_occ] ^= bit(from) | bit(to);
            self.bb[their_occ] ^= bit(victim_sq);
        } else {
            let captured = self.u8s[to];
            let is_promotion = promo != 0;
            let own_occ = WHITE_OCCUPIED | color as usize;
            let their_occ = WHITE_OCCUPIED | (color ^ COLOR_MASK) as usize;

            ul_u8.push((from as u8, self.u8s[from]));
            ul_u8.push((to as u8, self.u8s[to]));

            if captured != EMPTY && !is_promotion {
                ul_bb.push((pt as u8, self.bb[pt as usize]));
                ul_bb.push((captured, self.bb[captured as usize]));
                ul_bb.push((own_occ as u8, self.bb[own_occ]));
                ul_bb.push((their_occ as u8, self.bb[their_occ]));

                self.bb[HASH] ^= zk.pieces[from][pt as usize];
                self.bb[HASH] ^= zk.pieces[to][pt as usize];
                self.bb[HASH] ^= zk.pieces[to][captured as usize];

                self.remove_piece(pt, from);
                self.replace_piece(captured, pt, to);
                self.bb[their_occ] ^= bit(to);
                self.bb[own_occ] ^= bit(from) | bit(to);
            } else if !is_promotion {
                ul_bb.push((pt as u8, self.bb[pt as usize]));
                ul_bb.push((own_occ as u8, self.bb[own_occ]));

                self.bb[HASH] ^= zk.pieces[from][pt as usize];
                self.bb[HASH] ^= zk.pieces[to][pt as usize];

                self.move_piece(pt, from, to);
                self.bb[own_occ] ^= bit(from) | bit(to);
            } else if captured != EMPTY {
                ul_bb.push((pt as u8, self.bb[pt as usize]));
                ul_bb.push((captured, self.bb[captured as usize]));
                ul_bb.push((promo as u8, self.bb[promo as usize]));
                ul_bb.push((own_occ as u8, self.bb[own_occ]));
                ul_bb.push((their_occ as u8, self.bb[their_occ]));

                self.bb[HASH] ^= zk.pieces[from][pt as usize];
                self.bb[HASH] ^= zk.pieces[to][promo as usize];
                self.bb[HASH] ^= zk.pieces[to][captured as usize];

                self.remove_piece(pt, from);
                self.replace_piece(captured, promo, to);
                self.bb[their_occ] ^= bit(to);
                self.bb[own_occ] ^= bit(from) | bit(to);
            } else {
                ul_bb.push((pt as u8, self.bb[pt as usize]));
                ul_bb.push((promo as u8, self.bb[promo as usize]));
                ul_bb.push((own_occ as u8, self.bb[own_occ]));

                self.bb[HASH] ^= zk.pieces[from][pt as usize];
                self.bb[HASH] ^= zk.pieces[to][promo as usize];

                self.remove_piece(pt, from);
                self.place_piece(promo, to);
                self.bb[own_occ] ^= bit(from) | bit(to);
            }

            // A double pawn push arms the en-passant target; the slot's
            // previous value is already on the undo list.
            if is_pawn && rank_of(from).abs_diff(rank_of(to)) == 2 {
                let dir = if pt == WP { 0 } else { 1 };
                self.bb[EN_PASS_SQUARE] = PAWN_MOVE_1[from][dir];
                self.bb[HASH] ^= zk.en_passant[PAWN_MOVE_1[from][dir].lsb()];
            }

            // Castling-right revocation: king moved, rook left home, or
            // anything landed on a rook home square.
            if self.u8s[W_SHORT_CASTLE] != 0
                && (pt == WK || (pt == WR && from == H1) || to == H1)
            {
                ul_u8.push((W_SHORT_CASTLE as u8, self.u8s[W_SHORT_CASTLE]));
                self.u8s[W_SHORT_CASTLE] = 0;
                self.bb[HASH] ^= zk.castling[0];
            }
            if self.u8s[W_LONG_CASTLE] != 0
                && (pt == WK || (pt == WR && from == A1) || to == A1)
            {
                ul_u8.push((W_LONG_CASTLE as u8, self.u8s[W_LONG_CASTLE]));
                self.u8s[W_LONG_CASTLE] = 0;
                self.bb[HASH] ^= zk.castling[1];
            }
            if self.u8s[B_SHORT_CASTLE] != 0
                && (pt == BK || (pt == BR && from == H8) || to == H8)
            {
                ul_u8.push((B_SHORT_CASTLE as u8, self.u8s[B_SHORT_CASTLE]));
                self.u8s[B_SHORT_CASTLE] = 0;
                self.bb[HASH] ^= zk.castling[2];
            }
            if self.u8s[B_LONG_CASTLE] != 0
                && (pt == BK || (pt == BR && from == A8) || to == A8)
            {
                ul_u8.push((B_LONG_CASTLE as u8, self.u8s[B_LONG_CASTLE]));
                self.u8s[B_LONG_CASTLE] = 0;
                self.bb[HASH] ^= zk.castling[3];
            }
        }

        self.update_in_check();

        if self.in_check() {
            // The mover's king is attacked: revert everything pushed so far.
            for &(idx, val) in ul_bb.iter() {
                self.bb[idx as usize] = val;
            }
            for &(idx, val) in ul_u8.iter() {
                self.u8s[idx as usize] = val;
            }
            self.bb[HASH] = self.hash_stack.pop().expect("hash pushed above");
            return false;
        }

        // Side to move is not on the undo lists; undo flips it back.
        self.u8s[SIDE_TO_MOVE] ^= COLOR_MASK;
        self.bb[HASH] ^= zk.side_to_move;

        self.update_in_check();

        if color == BLACK {
            self.fullmove += 1;
        }

        self.undo_bb.push(ul_bb);
        self.undo_u8.push(ul_u8);
        self.move_stack.push(mv);

        true
    }

    /// Reverses exactly one `apply_move` or `make_null_move`.
    pub fn undo_move(&mut self) {
        let ul_bb = self.undo_bb.pop().expect("undo with no move applied");
        let ul_u8 = self.undo_u8.pop().expect("undo with no move applied");

        self.u8s[SIDE_TO_MOVE] ^= COLOR_MASK;

        for &(idx, val) in ul_bb.iter() {
            self.bb[idx as usize] = val;
        }
        for &(idx, val) in ul_u8.iter() {
            self.u8s[idx as usize] = val;
        }

        self.bb[HASH] = self.hash_stack.pop().expect("hash stack in lock-step");
        self.move_stack.pop().expect("move stack in lock-step");

        if self.u8s[SIDE_TO_MOVE] == BLACK {
            self.fullmove -= 1;
        }
    }

    /// Flips the side to move without moving a piece. The side to move must
    /// not be in check. Recorded on the stacks like a real move, with
    /// `Move::NONE` in the played-move slot; undone by `undo_move`.
    pub fn make_null_move(&mut self) {
        debug_assert!(!self.in_check());

        let zk = keys();
        let mut ul_bb = UndoListBB::new();
        let mut ul_u8 = UndoListU8::new();

        self.hash_stack.push(self.bb[HASH]);
        self.move_stack.push(Move::NONE);

        ul_u8.push((IN_CHECK as u8, self.u8s[IN_CHECK]));

        if self.bb[EN_PASS_SQUARE] != 0 {
            ul_bb.push((EN_PASS_SQUARE as u8, self.bb[EN_PASS_SQUARE]));
            self.bb[HASH] ^= zk.en_passant[self.bb[EN_PASS_SQUARE].lsb()];
            self.bb[EN_PASS_SQUARE] = 0;
        }

        if self.u8s[SIDE_TO_MOVE] == BLACK {
            self.fullmove += 1;
        }
        self.u8s[SIDE_TO_MOVE] ^= COLOR_MASK;
        self.bb[HASH] ^= zk.side_to_move;

        self.update_in_check();

        self.undo_bb.push(ul_bb);
        self.undo_u8.push(ul_u8);
    }

    /// Plays out a line of moves, stopping at the first illegal one.
    pub fn apply_variation(&mut self, moves: &[Move]) -> Result<(), String> {
        for &mv in moves {
            if !self.apply_move(mv) {
                return Err(format!("illegal move {} in variation", mv));
            }
        }
        Ok(())
    }
}
