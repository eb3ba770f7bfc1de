//! Lean make/unmake for static exchange evaluation.
//!
//! `apply_move_see` plays a bare capture: it writes the mover into the
//! destination mailbox cell, clears the mover's origin bit from its piece
//! bitboard and from the SEE occupancy, and flips the side to move. Nothing
//! else happens: no legality, no hash, no occupancy boards, and the origin
//! mailbox cell is left stale, so the board is deliberately incoherent
//! while a SEE sequence is in flight. No other board operation may run until every
//! `apply_move_see` has been matched by an `undo_move_see`; after that the
//! board is bit-exactly what it was, including the SEE occupancy.
//!
//! The smallest-attacker cursors advance monotonically per side: once a
//! piece class is exhausted on the target square it is never revisited,
//! which is what guarantees termination.

use super::{
    Board, Color, PieceType, SeeUndo, COLOR_MASK, EMPTY, SIDE_TO_MOVE, WB, WHITE, WK, WN, WP, WQ,
    WR,
};
use crate::bitboard::{inv_bit, BitboardExt};
use crate::moves::attacks::{KING_ATK, KNIGHT_ATK, PAWN_ATK};
use crate::moves::magic::{bmagic, qmagic, rmagic};
use crate::moves::types::Move;
use crate::square::{rank_of, Square};

impl Board {
    /// Arms the SEE scratch state. Call once before each SEE sequence.
    pub fn reset_see(&mut self) {
        self.see_last_white = WP;
        self.see_last_black = WP;
        self.see_occupancy = self.total_occupancy();
        self.see_undo.clear();
    }

    /// Plays a SEE capture of the piece on `to` (if any) by `pt` from
    /// `from`. Returns the captured piece type, `EMPTY` for none. The king
    /// may be "captured".
    pub fn apply_move_see(&mut self, pt: PieceType, from: Square, to: Square) -> PieceType {
        let captured = self.u8s[to];

        self.see_undo.push(SeeUndo {
            to,
            to_prev: captured,
            moved_pt: pt,
            moved_bb_prev: self.bb[pt as usize],
            occupancy_prev: self.see_occupancy,
        });

        // The destination cell must show the new occupant: the next
        // apply_move_see on this square reads it for the captured piece.
        self.u8s[to] = pt;

        // Clearing the origin hides the piece from the attacker scan and
        // uncovers X-ray attackers behind it.
        self.bb[pt as usize] &= inv_bit(from);
        self.see_occupancy &= inv_bit(from);

        self.u8s[SIDE_TO_MOVE] ^= COLOR_MASK;

        captured
    }

    /// Reverses one `apply_move_see`.
    pub fn undo_move_see(&mut self) {
        let undo = self.see_undo.pop().expect("SEE undo with no SEE move applied");

        self.u8s[undo.to] = undo.to_prev;
        self.bb[undo.moved_pt as usize] = undo.moved_bb_prev;
        self.see_occupancy = undo.occupancy_prev;

        self.u8s[SIDE_TO_MOVE] ^= COLOR_MASK;
    }

    /// The cheapest capture of `to` available to the side to move, as
    /// `(piece type, from square)`. Starts from the side's cursor class and
    /// never moves the cursor backwards.
    pub fn generate_smallest_capture_see(&mut self, to: Square) -> Option<(PieceType, Square)> {
        let stm = self.side_to_move();
        let mut role = if stm == WHITE {
            self.see_last_white
        } else {
            self.see_last_black
        };

        loop {
            let attackers = match role {
                WP => {
                    let dir = if stm == WHITE { 1 } else { 0 };
                    PAWN_ATK[to][dir] & self.bb[(WP | stm) as usize]
                }
                WN => KNIGHT_ATK[to] & self.bb[(WN | stm) as usize],
                WB => bmagic(to, self.see_occupancy) & self.bb[(WB | stm) as usize],
                WR => rmagic(to, self.see_occupancy) & self.bb[(WR | stm) as usize],
                WQ => qmagic(to, self.see_occupancy) & self.bb[(WQ | stm) as usize],
                _ => KING_ATK[to] & self.bb[(WK | stm) as usize],
            };

            if attackers != 0 {
                return Some((role | stm, attackers.lsb()));
            }

            role = match role {
                WP => WN,
                WN => WB,
                WB => WR,
                WR => WQ,
                WQ => WK,
                _ => return None,
            };
            self.set_see_cursor(stm, role);
        }
    }

    #[inline(always)]
    fn set_see_cursor(&mut self, side: Color, role: PieceType) {
        if side == WHITE {
            self.see_last_white = role;
        } else {
            self.see_last_black = role;
        }
    }

    /// The piece a violent move captures: the destination occupant, the
    /// opposing pawn for en passant (destination rank 3 or 6), or `EMPTY`
    /// for a non-capturing promotion.
    pub fn captured_piece_type(&self, violent_mv: Move) -> PieceType {
        let to = violent_mv.to_sq();
        let at_square = self.u8s[to];

        if at_square != EMPTY {
            at_square
        } else if rank_of(to) == 2 || rank_of(to) == 5 {
            if self.side_to_move() == WHITE {
                super::BP
            } else {
                WP
            }
        } else {
            EMPTY
        }
    }
}
