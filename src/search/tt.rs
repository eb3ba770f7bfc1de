//! Transposition table keyed by node budget.
//!
//! Open-addressed, one entry per slot, index = hash mod capacity. Deeper
//! searches (bigger node budgets) evict shallower results for the same key;
//! a different key always evicts. Ageing and clearing both work through the
//! generation counter: clear just bumps it by a large stride, so every live
//! entry loses to the first fresh store in its slot.

use crate::moves::types::Move;
use crate::search::{NodeBudget, Score};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Exact,
    Lower,
    Upper,
}

#[derive(Debug, Clone, Copy)]
pub struct TTEntry {
    pub hash: u64,
    pub best_move: Option<Move>,
    /// Generation at store time; entries age as the counter advances.
    pub birthday: i32,
    pub score: Score,
    pub node_budget: NodeBudget,
    pub bound: Bound,
}

pub struct TranspositionTable {
    entries: Vec<Option<TTEntry>>,
    generation: i32,
}

/// Stride added on clear so that any surviving entry is older than anything
/// stored afterwards.
const CLEAR_GENERATION_STRIDE: i32 = 1000;

impl TranspositionTable {
    /// `capacity` is the number of slots, not bytes.
    pub fn new(capacity: usize) -> TranspositionTable {
        assert!(capacity > 0);
        TranspositionTable {
            entries: vec![None; capacity],
            generation: 0,
        }
    }

    #[inline]
    fn index(&self, hash: u64) -> usize {
        (hash % self.entries.len() as u64) as usize
    }

    /// Returns the slot entry only on exact hash equality.
    pub fn probe(&self, hash: u64) -> Option<&TTEntry> {
        self.entries[self.index(hash)]
            .as_ref()
            .filter(|entry| entry.hash == hash)
    }

    /// Replaces the slot if the key differs or the new budget exceeds the
    /// stored one.
    pub fn store(
        &mut self,
        hash: u64,
        best_move: Option<Move>,
        score: Score,
        node_budget: NodeBudget,
        bound: Bound,
    ) {
        let idx = self.index(hash);
        let slot = &mut self.entries[idx];

        let replace = match slot {
            None => true,
            Some(existing) => existing.hash != hash || node_budget > existing.node_budget,
        };

        if replace {
            *slot = Some(TTEntry {
                hash,
                best_move: best_move.map(Move::without_score),
                birthday: self.generation,
                score,
                node_budget,
                bound,
            });
        }
    }

    /// Called once per committed root move.
    pub fn age(&mut self) {
        self.generation += 1;
    }

    /// Cheap clear: ages every entry past any future store.
    pub fn clear(&mut self) {
        self.generation += CLEAR_GENERATION_STRIDE;
    }

    pub fn generation(&self) -> i32 {
        self.generation
    }
}
