//! Zobrist hashing: a fixed set of 64-bit random constants seeded
//! deterministically, XORed to fold incremental position deltas.

use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::Piece;

const ZOBRIST_SEED: u64 = 0x5A0B_7157_1234_5678;

pub struct ZobristKeys {
    /// `piece_keys[piece_zobrist_index][square]`, 12 real piece types x 64
    /// squares. There is no 13th "null" slot: callers skip XORing when a
    /// square is empty rather than indexing a guaranteed-zero row, since
    /// `Option<Piece>` already expresses that at the type level.
    pub piece_keys: [[u64; 64]; 12],
    pub castle_keys: [u64; 16],
    pub ep_file_keys: [u64; 8],
    pub turn_key: u64,
}

impl ZobristKeys {
    fn generate() -> Self {
        let mut rng = StdRng::seed_from_u64(ZOBRIST_SEED);
        let mut piece_keys = [[0u64; 64]; 12];
        for row in &mut piece_keys {
            for key in row.iter_mut() {
                *key = rng.gen();
            }
        }
        let mut castle_keys = [0u64; 16];
        for key in &mut castle_keys {
            *key = rng.gen();
        }
        let mut ep_file_keys = [0u64; 8];
        for key in &mut ep_file_keys {
            *key = rng.gen();
        }
        ZobristKeys {
            piece_keys,
            castle_keys,
            ep_file_keys,
            turn_key: rng.gen(),
        }
    }

    /// Serialize to a fixed binary layout for persistence or cross-process
    /// sharing: `ZOBRIST_KEYS[13][64] || ZOBRIST_CASTLE[16] || ZOBRIST_EP[8] || ZOBRIST_TURN`,
    /// little-endian `u64`s. The 13th piece row (the "empty square" slot
    /// used to keep external consumers' XOR math uniform) is written as
    /// all zeros since this implementation never reads it back.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity((13 * 64 + 16 + 8 + 1) * 8);
        for row in &self.piece_keys {
            for key in row {
                out.extend_from_slice(&key.to_le_bytes());
            }
        }
        for _ in 0..64 {
            out.extend_from_slice(&0u64.to_le_bytes());
        }
        for key in &self.castle_keys {
            out.extend_from_slice(&key.to_le_bytes());
        }
        for key in &self.ep_file_keys {
            out.extend_from_slice(&key.to_le_bytes());
        }
        out.extend_from_slice(&self.turn_key.to_le_bytes());
        out
    }

    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let expected = (13 * 64 + 16 + 8 + 1) * 8;
        if bytes.len() != expected {
            return None;
        }
        let mut cursor = bytes.chunks_exact(8).map(|c| {
            let mut arr = [0u8; 8];
            arr.copy_from_slice(c);
            u64::from_le_bytes(arr)
        });
        let mut piece_keys = [[0u64; 64]; 12];
        for row in piece_keys.iter_mut() {
            for key in row.iter_mut() {
                *key = cursor.next()?;
            }
        }
        for _ in 0..64 {
            cursor.next()?; // discard the null piece row
        }
        let mut castle_keys = [0u64; 16];
        for key in castle_keys.iter_mut() {
            *key = cursor.next()?;
        }
        let mut ep_file_keys = [0u64; 8];
        for key in ep_file_keys.iter_mut() {
            *key = cursor.next()?;
        }
        let turn_key = cursor.next()?;
        Some(ZobristKeys {
            piece_keys,
            castle_keys,
            ep_file_keys,
            turn_key,
        })
    }
}

pub static ZOBRIST: Lazy<ZobristKeys> = Lazy::new(ZobristKeys::generate);

#[inline]
#[must_use]
pub fn piece_key(piece: Piece, sq: usize) -> u64 {
    ZOBRIST.piece_keys[piece.zobrist_index()][sq]
}

#[inline]
#[must_use]
pub fn castle_key(rights_mask: u8) -> u64 {
    ZOBRIST.castle_keys[rights_mask as usize]
}

#[inline]
#[must_use]
pub fn ep_file_key(file: u8) -> u64 {
    ZOBRIST.ep_file_keys[file as usize]
}

#[inline]
#[must_use]
pub fn turn_key() -> u64 {
    ZOBRIST.turn_key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_bytes() {
        let bytes = ZOBRIST.to_bytes();
        let restored = ZobristKeys::from_bytes(&bytes).unwrap();
        assert_eq!(restored.turn_key, ZOBRIST.turn_key);
        assert_eq!(restored.piece_keys, ZOBRIST.piece_keys);
    }

    #[test]
    fn keys_are_deterministic_across_generations() {
        let a = ZobristKeys::generate();
        let b = ZobristKeys::generate();
        assert_eq!(a.turn_key, b.turn_key);
        assert_eq!(a.castle_keys, b.castle_keys);
    }
}
