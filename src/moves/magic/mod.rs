//! Magic-bitboard sliding attacks.
//!
//! The tables are built once per process from a fixed seed. With the
//! `load_magic` feature they are additionally cached on disk with bincode,
//! which skips the magic-number search on later runs.

pub mod attacks;
pub mod precompute;
pub mod structs;

pub use structs::{MagicEntry, MagicTables};

use once_cell::sync::OnceCell;
use precompute::{generate_magic_tables, MagicTableSeed};

const MAGIC_SEED: u64 = 0x5EED_0F_5A71AB1E;

#[cfg(feature = "load_magic")]
fn cache_path() -> std::path::PathBuf {
    std::env::var_os("QUOTA_MAGIC_PATH")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|| std::path::PathBuf::from("magic_tables.bin"))
}

#[cfg(feature = "load_magic")]
fn load_cached() -> Option<MagicTables> {
    let bytes = std::fs::read(cache_path()).ok()?;
    bincode::deserialize(&bytes).ok()
}

#[cfg(feature = "load_magic")]
fn store_cached(tables: &MagicTables) {
    if let Ok(bytes) = bincode::serialize(tables) {
        let _ = std::fs::write(cache_path(), bytes);
    }
}

/// Process-wide magic tables.
pub fn tables() -> &'static MagicTables {
    static TABLES: OnceCell<MagicTables> = OnceCell::new();
    TABLES.get_or_init(|| {
        #[cfg(feature = "load_magic")]
        if let Some(cached) = load_cached() {
            return cached;
        }

        let generated = generate_magic_tables(MagicTableSeed::Fixed(MAGIC_SEED))
            .expect("magic table generation with the fixed seed");

        #[cfg(feature = "load_magic")]
        store_cached(&generated);

        generated
    })
}

/// Rook attacks from `sq` with the given blocker occupancy.
#[inline(always)]
pub fn rmagic(sq: usize, blockers: u64) -> u64 {
    tables().rook_attacks(sq, blockers)
}

/// Bishop attacks from `sq` with the given blocker occupancy.
#[inline(always)]
pub fn bmagic(sq: usize, blockers: u64) -> u64 {
    tables().bishop_attacks(sq, blockers)
}

/// Queen attacks = rook ∪ bishop.
#[inline(always)]
pub fn qmagic(sq: usize, blockers: u64) -> u64 {
    tables().queen_attacks(sq, blockers)
}
