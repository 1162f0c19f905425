//! L3: legal move generation, driven by precomputed attack tables and the
//! pin/check masks maintained incrementally by `StackedBitboard`.

mod kings;
mod knights;
mod pawns;
mod sliders;

use crate::bitboard::{bitscan_forward, popcount, UNIVERSE};
use crate::position::Position;
use crate::tables::ray_mask;
use crate::types::{Bitboard, MoveList, PieceKind, Square};

/// Generates every fully legal move for the side to move.
///
/// Implements the algorithm from the move-generation component design:
/// double check permits only king moves; single check restricts non-king
/// pieces to the "block or capture" mask; pinned pieces are further
/// restricted to their pin line; king moves are filtered against the enemy
/// attack set computed with the king's own square excluded from blockers.
#[must_use]
pub fn legal_moves(pos: &Position) -> MoveList {
    let mut list = MoveList::new();
    let color = pos.turn();
    let board = pos.boards();
    let king_sq = board.king_square(color);
    let checkers = board.checkers(color);
    let checker_count = popcount(checkers);

    kings::generate(pos, &mut list);

    if checker_count == 2 {
        return list;
    }

    let check_mask: Bitboard = if checker_count == 0 {
        UNIVERSE
    } else {
        let checker_sq = Square::new(bitscan_forward(checkers).expect("checker_count == 1"));
        ray_mask(king_sq, checker_sq) | checker_sq.bitboard()
    };

    pawns::generate(pos, check_mask, king_sq, &mut list);
    knights::generate(pos, check_mask, king_sq, &mut list);
    sliders::generate(pos, PieceKind::Bishop, check_mask, king_sq, &mut list);
    sliders::generate(pos, PieceKind::Rook, check_mask, king_sq, &mut list);
    sliders::generate(pos, PieceKind::Queen, check_mask, king_sq, &mut list);

    list
}

/// A piece's destination mask restricted by the check mask and, if it is
/// pinned, by the pin line between it and its own king.
#[inline]
pub(crate) fn restrict(
    pos: &Position,
    origin: Square,
    king_sq: Square,
    check_mask: Bitboard,
) -> Bitboard {
    let color = pos.turn();
    let mut allowed = check_mask;
    if pos.boards().pinned(color) & origin.bitboard() != 0 {
        allowed &= crate::tables::pin_mask(king_sq, origin);
    }
    allowed
}
