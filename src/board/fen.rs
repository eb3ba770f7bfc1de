//! Position text (FEN) parsing and emission.

use super::{
    char_to_piece_type, piece_type_to_char, Board, BK, BLACK, BR, B_LONG_CASTLE, B_SHORT_CASTLE,
    EMPTY, EN_PASS_SQUARE, HALF_MOVES_CLOCK, HASH, SIDE_TO_MOVE, WHITE, WHITE_OCCUPIED, WK, WR,
    W_LONG_CASTLE, W_SHORT_CASTLE,
};
use crate::bitboard::bit;
use crate::board::get_color;
use crate::square::{parse_square, sq, square_to_string, A1, A8, E1, E8, H1, H8};

impl Board {
    /// Builds a position from a FEN string. The half-move and full-move
    /// counters are optional (defaults 0 and 1).
    pub fn from_fen(fen: &str) -> Result<Board, String> {
        let mut board = Board::empty();
        board.set_fen(fen)?;
        Ok(board)
    }

    pub fn set_fen(&mut self, fen: &str) -> Result<(), String> {
        let mut fields = fen.split_whitespace();

        let layout = fields.next().ok_or("empty position description")?;
        let stm = fields.next().ok_or("missing side to move")?;
        let castling = fields.next().ok_or("missing castling rights")?;
        let en_passant = fields.next().ok_or("missing en passant field")?;
        let half_moves = fields.next().unwrap_or("0");
        let full_moves = fields.next().unwrap_or("1");

        *self = Board::empty();

        // Board layout: 8 ranks top-down, digits for empty runs.
        let ranks: Vec<&str> = layout.split('/').collect();
        if ranks.len() != 8 {
            return Err(format!("expected 8 ranks, got {}", ranks.len()));
        }

        for (i, rank_text) in ranks.iter().enumerate() {
            let rank = 7 - i;
            let mut file = 0usize;
            for c in rank_text.chars() {
                if let Some(run) = c.to_digit(10) {
                    file += run as usize;
                } else {
                    let pt = char_to_piece_type(c)
                        .ok_or_else(|| format!("unknown piece letter '{}'", c))?;
                    if file > 7 {
                        return Err(format!("rank {} overflows the board", rank + 1));
                    }
                    let square = sq(file, rank);
                    self.bb[pt as usize] |= bit(square);
                    self.bb[WHITE_OCCUPIED | get_color(pt) as usize] |= bit(square);
                    self.u8s[square] = pt;
                    file += 1;
                }
            }
            if file != 8 {
                return Err(format!("rank {} has {} files", rank + 1, file));
            }
        }

        if self.bb[WK as usize].count_ones() != 1 || self.bb[BK as usize].count_ones() != 1 {
            return Err("each side needs exactly one king".into());
        }

        self.u8s[SIDE_TO_MOVE] = match stm {
            "w" => WHITE,
            "b" => BLACK,
            other => return Err(format!("invalid side to move '{}'", other)),
        };

        if castling != "-" {
            for c in castling.chars() {
                match c {
                    'K' => self.u8s[W_SHORT_CASTLE] = 1,
                    'Q' => self.u8s[W_LONG_CASTLE] = 1,
                    'k' => self.u8s[B_SHORT_CASTLE] = 1,
                    'q' => self.u8s[B_LONG_CASTLE] = 1,
                    other => return Err(format!("invalid castling flag '{}'", other)),
                }
            }
        }

        // A right only makes sense with king and rook still at home; some
        // sources emit stale flags, drop those silently.
        if self.u8s[E1] != WK {
            self.u8s[W_SHORT_CASTLE] = 0;
            self.u8s[W_LONG_CASTLE] = 0;
        }
        if self.u8s[H1] != WR {
            self.u8s[W_SHORT_CASTLE] = 0;
        }
        if self.u8s[A1] != WR {
            self.u8s[W_LONG_CASTLE] = 0;
        }
        if self.u8s[E8] != BK {
            self.u8s[B_SHORT_CASTLE] = 0;
            self.u8s[B_LONG_CASTLE] = 0;
        }
        if self.u8s[H8] != BR {
            self.u8s[B_SHORT_CASTLE] = 0;
        }
        if self.u8s[A8] != BR {
            self.u8s[B_LONG_CASTLE] = 0;
        }

        if en_passant != "-" {
            let ep =
                parse_square(en_passant).ok_or_else(|| format!("bad ep square '{}'", en_passant))?;
            self.bb[EN_PASS_SQUARE] = bit(ep);
        }

        let clock: u32 = half_moves
            .parse()
            .map_err(|_| format!("bad half-move clock '{}'", half_moves))?;
        self.u8s[HALF_MOVES_CLOCK] = clock.min(255) as u8;

        self.fullmove = full_moves
            .parse()
            .map_err(|_| format!("bad full-move number '{}'", full_moves))?;

        self.bb[HASH] = self.compute_hash_full();
        self.update_in_check();

        Ok(())
    }

    pub fn to_fen(&self) -> String {
        let mut out = String::new();

        for rank in (0..8).rev() {
            let mut empty_run = 0;
            for file in 0..8 {
                let pt = self.u8s[sq(file, rank)];
                if pt == EMPTY {
                    empty_run += 1;
                } else {
                    if empty_run > 0 {
                        out.push(char::from(b'0' + empty_run));
                        empty_run = 0;
                    }
                    out.push(piece_type_to_char(pt));
                }
            }
            if empty_run > 0 {
                out.push(char::from(b'0' + empty_run));
            }
            if rank > 0 {
                out.push('/');
            }
        }

        out.push(' ');
        out.push(if self.side_to_move() == WHITE { 'w' } else { 'b' });

        out.push(' ');
        let mut any_right = false;
        for (idx, c) in [
            (W_SHORT_CASTLE, 'K'),
            (W_LONG_CASTLE, 'Q'),
            (B_SHORT_CASTLE, 'k'),
            (B_LONG_CASTLE, 'q'),
        ] {
            if self.u8s[idx] != 0 {
                out.push(c);
                any_right = true;
            }
        }
        if !any_right {
            out.push('-');
        }

        out.push(' ');
        match self.ep_square() {
            Some(ep) => out.push_str(&square_to_string(ep)),
            None => out.push('-'),
        }

        out.push_str(&format!(" {} {}", self.u8s[HALF_MOVES_CLOCK], self.fullmove));

        out
    }
}
