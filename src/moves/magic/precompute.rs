//! Magic-number search and table construction.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use super::attacks::{
    bishop_attacks_slow, bishop_relevant_mask, rook_attacks_slow, rook_relevant_mask,
};
use super::structs::{MagicEntry, MagicTables};

pub enum MagicTableSeed {
    Fixed(u64),
    Random,
}

const MAX_ATTEMPTS: u32 = 1_000_000;

/// Sparse candidates collide far less often in the multiply-shift hash.
#[inline]
fn random_sparse_u64<R: RngCore>(rng: &mut R) -> u64 {
    rng.next_u64() & rng.next_u64() & rng.next_u64()
}

/// Enumerates every subset of `mask` (Carry-Rippler walk), including 0.
fn blocker_subsets(mask: u64) -> Vec<u64> {
    let mut subsets = Vec::with_capacity(1 << mask.count_ones());
    let mut sub = 0u64;
    loop {
        subsets.push(sub);
        sub = sub.wrapping_sub(mask) & mask;
        if sub == 0 {
            break;
        }
    }
    subsets
}

/// A candidate is valid when no two blocker sets with different attack sets
/// land on the same index. Constructive collisions (same attacks) are fine.
fn try_build_table(
    blockers: &[u64],
    attacks: &[u64],
    magic: u64,
    shift: u32,
) -> Option<Box<[u64]>> {
    let size = 1usize << (64 - shift);
    let mut table = vec![0u64; size];
    let mut used = vec![false; size];

    for (&blocker, &attack) in blockers.iter().zip(attacks) {
        let index = (blocker.wrapping_mul(magic) >> shift) as usize;
        if used[index] {
            if table[index] != attack {
                return None;
            }
        } else {
            used[index] = true;
            table[index] = attack;
        }
    }

    Some(table.into_boxed_slice())
}

fn find_magic_for_square<R: RngCore>(
    square: usize,
    mask: u64,
    slow: impl Fn(usize, u64) -> u64,
    rng: &mut R,
) -> Result<MagicEntry, String> {
    let blockers = blocker_subsets(mask);
    let attacks: Vec<u64> = blockers.iter().map(|&b| slow(square, b)).collect();
    let shift = 64 - mask.count_ones();

    for _ in 0..MAX_ATTEMPTS {
        let magic = random_sparse_u64(rng);
        // Cheap pre-filter: the top index bits must be well mixed.
        if (mask.wrapping_mul(magic) >> 56).count_ones() < 6 {
            continue;
        }
        if let Some(table) = try_build_table(&blockers, &attacks, magic, shift) {
            return Ok(MagicEntry {
                magic,
                shift,
                mask,
                table,
            });
        }
    }

    Err(format!(
        "no magic number found for square {} after {} attempts",
        square, MAX_ATTEMPTS
    ))
}

pub fn generate_magic_tables(seed: MagicTableSeed) -> Result<MagicTables, String> {
    let mut rng = match seed {
        MagicTableSeed::Fixed(s) => StdRng::seed_from_u64(s),
        MagicTableSeed::Random => {
            let mut buf = [0u8; 32];
            rand::rng().fill_bytes(&mut buf);
            StdRng::from_seed(buf)
        }
    };

    let mut rook = Vec::with_capacity(64);
    let mut bishop = Vec::with_capacity(64);

    for sq in 0..64 {
        rook.push(find_magic_for_square(
            sq,
            rook_relevant_mask(sq),
            rook_attacks_slow,
            &mut rng,
        )?);
        bishop.push(find_magic_for_square(
            sq,
            bishop_relevant_mask(sq),
            bishop_attacks_slow,
            &mut rng,
        )?);
    }

    Ok(MagicTables { rook, bishop })
}
