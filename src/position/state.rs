use crate::types::{CastlingRights, Move, Piece, Square};

/// Reversible auxiliary state captured before a move is made, so `unmake`
/// can restore exactly what `make` overwrote.
#[derive(Clone, Debug)]
pub struct StateFrame {
    pub castling_rights: CastlingRights,
    pub captured_piece: Option<Piece>,
    pub ep_square: Option<Square>,
    pub mv: Move,
    pub halfmove_clock: u32,
    pub zobrist: u64,
    /// `key_history` as it stood immediately before this move, so unmake
    /// can restore it exactly rather than guess how make mutated it.
    pub key_history_snapshot: Vec<u64>,
}
