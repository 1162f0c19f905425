//! L1: magic bitboards for sliding-piece (bishop/rook/queen) attack lookup.
//!
//! Magic tables are deterministic: built once from a fixed seed the first
//! time they are touched (via `once_cell::sync::Lazy`) and never
//! regenerated afterward for the life of the process.

use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::bitboard::{popcount, EMPTY};
use crate::types::{Bitboard, Square};

const MAGIC_SEED: u64 = 0x5EED_C0FF_EE15_BA5E;

struct MagicEntry {
    mask: Bitboard,
    magic: u64,
    shift: u32,
    table: Vec<Bitboard>,
}

impl MagicEntry {
    #[inline]
    fn lookup(&self, occupancy: Bitboard) -> Bitboard {
        let blockers = occupancy & self.mask;
        let index = ((blockers.wrapping_mul(self.magic)) >> self.shift) as usize;
        self.table[index]
    }
}

struct MagicTables {
    rook: Vec<MagicEntry>,
    bishop: Vec<MagicEntry>,
}

const ROOK_DIRS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

fn relevant_mask(sq: usize, dirs: &[(i8, i8); 4]) -> Bitboard {
    let (rank, file) = ((sq / 8) as i8, (sq % 8) as i8);
    let mut mask = EMPTY;
    for &(dr, df) in dirs {
        let mut r = rank + dr;
        let mut f = file + df;
        while (1..7).contains(&r) && (1..7).contains(&f) {
            mask |= 1u64 << (r * 8 + f);
            r += dr;
            f += df;
        }
    }
    mask
}

fn sliding_attacks(sq: usize, occupancy: Bitboard, dirs: &[(i8, i8); 4]) -> Bitboard {
    let (rank, file) = ((sq / 8) as i8, (sq % 8) as i8);
    let mut attacks = EMPTY;
    for &(dr, df) in dirs {
        let mut r = rank + dr;
        let mut f = file + df;
        while (0..8).contains(&r) && (0..8).contains(&f) {
            let bit = 1u64 << (r * 8 + f);
            attacks |= bit;
            if occupancy & bit != 0 {
                break;
            }
            r += dr;
            f += df;
        }
    }
    attacks
}

/// Enumerate the `2^bits` blocker subsets of `mask` in index order, so the
/// same `index_to_blockers` ordering used to fill a magic table is used at
/// lookup time to decode the index back from a multiply-shift.
fn index_to_blockers(index: usize, mask: Bitboard) -> Bitboard {
    let mut blockers = EMPTY;
    let mut m = mask;
    let mut i = index;
    while m != 0 {
        let bit = m & m.wrapping_neg();
        m &= m - 1;
        if i & 1 != 0 {
            blockers |= bit;
        }
        i >>= 1;
    }
    blockers
}

fn find_magic(sq: usize, dirs: &[(i8, i8); 4], rng: &mut StdRng) -> MagicEntry {
    let mask = relevant_mask(sq, dirs);
    let bits = popcount(mask);
    let shift = 64 - bits;
    let size = 1usize << bits;

    let mut reference = vec![EMPTY; size];
    for (index, slot) in reference.iter_mut().enumerate() {
        let blockers = index_to_blockers(index, mask);
        *slot = sliding_attacks(sq, blockers, dirs);
    }

    loop {
        // Candidate magics with few set bits multiply more sparsely and
        // are more likely to produce a perfect hash quickly.
        let magic: u64 = rng.gen::<u64>() & rng.gen::<u64>() & rng.gen::<u64>();
        if popcount(mask.wrapping_mul(magic) & 0xff00_0000_0000_0000) < 6 {
            continue;
        }

        let mut table = vec![None; size];
        let mut valid = true;
        for (index, &attack) in reference.iter().enumerate() {
            let blockers = index_to_blockers(index, mask);
            let slot = ((blockers.wrapping_mul(magic)) >> shift) as usize;
            match table[slot] {
                None => table[slot] = Some(attack),
                Some(existing) if existing == attack => {}
                Some(_) => {
                    valid = false;
                    break;
                }
            }
        }

        if valid {
            return MagicEntry {
                mask,
                magic,
                shift,
                table: table.into_iter().map(|o| o.unwrap_or(EMPTY)).collect(),
            };
        }
    }
}

static TABLES: Lazy<MagicTables> = Lazy::new(|| {
    let mut rng = StdRng::seed_from_u64(MAGIC_SEED);
    let rook = (0..64).map(|sq| find_magic(sq, &ROOK_DIRS, &mut rng)).collect();
    let bishop = (0..64)
        .map(|sq| find_magic(sq, &BISHOP_DIRS, &mut rng))
        .collect();
    MagicTables { rook, bishop }
});

#[inline]
#[must_use]
pub fn rook_attacks(sq: Square, occupancy: Bitboard) -> Bitboard {
    TABLES.rook[sq.index()].lookup(occupancy)
}

#[inline]
#[must_use]
pub fn bishop_attacks(sq: Square, occupancy: Bitboard) -> Bitboard {
    TABLES.bishop[sq.index()].lookup(occupancy)
}

#[inline]
#[must_use]
pub fn queen_attacks(sq: Square, occupancy: Bitboard) -> Bitboard {
    rook_attacks(sq, occupancy) | bishop_attacks(sq, occupancy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rook_attacks_on_empty_board_from_a1() {
        let bb = rook_attacks(Square::new(0), EMPTY);
        // full a-file plus full 1st rank, minus a1 itself
        assert_eq!(bb.count_ones(), 14);
    }

    #[test]
    fn rook_attacks_blocked_by_own_occupant() {
        let occ = 1u64 << 8; // a2 occupied
        let bb = rook_attacks(Square::new(0), occ);
        assert!(bb & (1 << 8) != 0, "must include the blocker square");
        assert!(bb & (1 << 16) == 0, "must not see past the blocker");
    }

    #[test]
    fn bishop_attacks_from_center_empty_board() {
        let bb = bishop_attacks(Square::new(27), EMPTY); // d4
        assert_eq!(bb.count_ones(), 13);
    }

    #[test]
    fn queen_attacks_is_union_of_rook_and_bishop() {
        let sq = Square::new(27);
        let occ = 0xffff_0000_0000u64;
        assert_eq!(
            queen_attacks(sq, occ),
            rook_attacks(sq, occ) | bishop_attacks(sq, occ)
        );
    }
}
