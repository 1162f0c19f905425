//! L5: Static Exchange Evaluation — the minimax value of a capture
//! sequence on a single square, used to prune losing captures from
//! quiescence search and move ordering.

use crate::bitboard::{bitscan_forward, EMPTY};
use crate::board::StackedBitboard;
use crate::eval::piece_value;
use crate::magic;
use crate::position::Position;
use crate::tables;
use crate::types::{Bitboard, Color, Move, PieceKind, Square, ALL_KINDS};

fn attackers_to_square(board: &StackedBitboard, sq: Square, occ: Bitboard, side: Color) -> Bitboard {
    let mut attackers = EMPTY;
    attackers |= board.board_of(side, PieceKind::Pawn) & tables::pawn_attacks(!side, sq.bitboard());
    attackers |= board.board_of(side, PieceKind::Knight) & tables::knight_attacks(sq);
    attackers |= board.board_of(side, PieceKind::King) & tables::king_attacks(sq);
    let diagonal = board.board_of(side, PieceKind::Bishop) | board.board_of(side, PieceKind::Queen);
    attackers |= diagonal & magic::bishop_attacks(sq, occ);
    let straight = board.board_of(side, PieceKind::Rook) | board.board_of(side, PieceKind::Queen);
    attackers |= straight & magic::rook_attacks(sq, occ);
    attackers
}

fn least_valuable_attacker(board: &StackedBitboard, attackers: Bitboard, side: Color) -> Option<(Square, PieceKind)> {
    for &kind in &ALL_KINDS {
        let bb = board.board_of(side, kind) & attackers;
        if bb != EMPTY {
            let sq = bitscan_forward(bb).expect("bb != EMPTY");
            return Some((Square::new(sq), kind));
        }
    }
    None
}

/// Swap-off value of capturing on `mv.to()`, in centipawns, from the mover's
/// perspective: positive means the full exchange sequence nets material for
/// the side making `mv`. Zero for non-captures.
#[must_use]
pub fn see(pos: &Position, mv: Move) -> i32 {
    if !mv.is_capture() {
        return 0;
    }
    let board = pos.boards();
    let attacker_color = pos.turn();
    let to = mv.to();
    let from = mv.from();

    let captured_kind = if mv.is_en_passant() {
        PieceKind::Pawn
    } else {
        match board.piece_at(to) {
            Some(p) => p.kind,
            None => return 0,
        }
    };
    let mut attacker_kind = board
        .piece_at(from)
        .expect("see called with a pseudo-move whose origin is empty")
        .kind;
    if let Some(promo) = mv.promotion_kind() {
        attacker_kind = promo;
    }

    let mut occ = board.occupancy() & !from.bitboard();
    if mv.is_en_passant() {
        let captured_sq = Square::new((to.index() as i8 - attacker_color.forward()) as u8);
        occ &= !captured_sq.bitboard();
    } else {
        occ &= !to.bitboard();
    }
    occ |= to.bitboard();

    let mut used = [EMPTY; 2];
    used[attacker_color.index()] |= from.bitboard();

    let mut gains = vec![piece_value(captured_kind)];
    let mut side = !attacker_color;
    let mut on_square = attacker_kind;

    loop {
        let raw_attackers = attackers_to_square(board, to, occ, side) & !used[side.index()];
        let Some((sq, kind)) = least_valuable_attacker(board, raw_attackers, side) else {
            break;
        };
        gains.push(piece_value(on_square) - gains.last().copied().unwrap());
        used[side.index()] |= sq.bitboard();
        occ &= !sq.bitboard();
        on_square = kind;
        side = !side;
    }

    // Backward induction: at each ply the side to recapture only does so if
    // it improves their outcome, i.e. if continuing beats stopping here.
    for i in (0..gains.len().saturating_sub(1)).rev() {
        gains[i] = gains[i].min(-gains[i + 1]);
    }
    gains[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_capture_has_zero_see() {
        let pos = Position::new();
        let mv = Move::quiet(Square::from_algebraic("e2").unwrap(), Square::from_algebraic("e4").unwrap());
        assert_eq!(see(&pos, mv), 0);
    }

    #[test]
    fn pawn_takes_undefended_knight_is_winning() {
        let pos = Position::from_fen("4k3/8/8/8/3n4/4P3/8/4K3 w - - 0 1").unwrap();
        let mv = Move::capture(Square::from_algebraic("e3").unwrap(), Square::from_algebraic("d4").unwrap());
        assert_eq!(see(&pos, mv), piece_value(PieceKind::Knight));
    }

    #[test]
    fn pawn_takes_defended_pawn_loses_the_exchange() {
        // e3 pawn takes d4 pawn, which is defended by the c5 pawn.
        let pos = Position::from_fen("4k3/8/8/2p5/3p4/4P3/8/4K3 w - - 0 1").unwrap();
        let mv = Move::capture(Square::from_algebraic("e3").unwrap(), Square::from_algebraic("d4").unwrap());
        assert_eq!(see(&pos, mv), piece_value(PieceKind::Pawn) - piece_value(PieceKind::Pawn));
    }
}
