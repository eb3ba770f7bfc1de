//! Killer moves: the last two quiet cutoff moves per ply.

use arrayvec::ArrayVec;

use crate::moves::types::Move;

pub const KILLERS_PER_PLY: usize = 2;

/// Killers for a lookup ply: two slots each from the ply itself, ply-2 and
/// ply+2.
pub const MAX_KILLERS: usize = 6;

pub type KillerMoveList = ArrayVec<Move, MAX_KILLERS>;

#[derive(Default, Clone, Copy)]
struct KillerSlot {
    moves: [Option<Move>; KILLERS_PER_PLY],
}

#[derive(Default)]
pub struct Killer {
    // indexed by ply, grown on demand
    slots: Vec<KillerSlot>,
}

impl Killer {
    pub fn new() -> Killer {
        Killer::default()
    }

    /// Records a quiet cutoff move at `ply`. A move already in the front
    /// slot stays put; otherwise everything shifts down one slot.
    pub fn notify(&mut self, ply: usize, mv: Move) {
        if self.slots.len() < ply + 1 {
            self.slots.resize_with(ply + 1, KillerSlot::default);
        }

        let slot = &mut self.slots[ply];
        let mv = mv.without_score();

        if slot.moves[0] == Some(mv) {
            return;
        }

        for i in (1..KILLERS_PER_PLY).rev() {
            slot.moves[i] = slot.moves[i - 1];
        }
        slot.moves[0] = Some(mv);
    }

    /// Killers worth trying at `ply`: its own slots first, then ply-2's,
    /// then ply+2's.
    pub fn get_killers(&self, list: &mut KillerMoveList, ply: usize) {
        list.clear();

        let mut push_from = |p: usize| {
            if let Some(slot) = self.slots.get(p) {
                for mv in slot.moves.into_iter().flatten() {
                    list.push(mv);
                }
            }
        };

        if ply >= self.slots.len() {
            return;
        }
        push_from(ply);
        if ply >= 2 {
            push_from(ply - 2);
        }
        push_from(ply + 2);
    }

    /// Shifts the whole table down one ply. Called when a move is committed
    /// at the root, so ply n's killers become ply n-1's.
    pub fn move_made(&mut self) {
        if !self.slots.is_empty() {
            self.slots.remove(0);
        }
    }
}
