//! L2: `StackedBitboard`, the per-color/per-piece occupancy container with
//! incrementally maintained attack, pin, and check sets.

use crate::bitboard::{iter_bits, popcount, EMPTY};
use crate::magic;
use crate::tables;
use crate::types::{Bitboard, Color, Piece, PieceKind, Square, ALL_KINDS};
use crate::zobrist;

/// Per-color, per-piece occupancy, plus the derived sets (attacks, pins,
/// checkers) that move generation and search consult. Uniquely owned by a
/// single [`crate::position::Position`].
#[derive(Clone)]
pub struct StackedBitboard {
    boards: [[Bitboard; 6]; 2],
    /// Per-color single-bit en-passant pseudo-board: the square a pawn of
    /// that color just skipped over on a double push.
    ep: [Bitboard; 2],
    occupancy: [Bitboard; 2],
    square: [Option<Piece>; 64],
    attacks: [[Bitboard; 6]; 2],
    pinned: [Bitboard; 2],
    checkers: [Bitboard; 2],
    /// XOR of piece-placement Zobrist keys only. Castling/turn/en-passant
    /// contributions are folded in by `Position`, which owns the
    /// authoritative full key (see `position::Position::zobrist`).
    piece_zobrist: u64,
}

impl StackedBitboard {
    #[must_use]
    pub fn empty() -> Self {
        StackedBitboard {
            boards: [[EMPTY; 6]; 2],
            ep: [EMPTY; 2],
            occupancy: [EMPTY; 2],
            square: [None; 64],
            attacks: [[EMPTY; 6]; 2],
            pinned: [EMPTY; 2],
            checkers: [EMPTY; 2],
            piece_zobrist: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.square[sq.index()]
    }

    #[inline]
    #[must_use]
    pub fn board_of(&self, color: Color, kind: PieceKind) -> Bitboard {
        self.boards[color.index()][kind.index()]
    }

    #[inline]
    #[must_use]
    pub fn occupancy(&self) -> Bitboard {
        self.occupancy[0] | self.occupancy[1]
    }

    #[inline]
    #[must_use]
    pub fn occupancy_of(&self, color: Color) -> Bitboard {
        self.occupancy[color.index()]
    }

    #[inline]
    #[must_use]
    pub fn ep_board(&self, color: Color) -> Bitboard {
        self.ep[color.index()]
    }

    #[inline]
    #[must_use]
    pub fn piece_zobrist(&self) -> u64 {
        self.piece_zobrist
    }

    /// Panics if `color` has no king on the board. Every caller outside this
    /// module only ever sees positions where `debug_assert_invariants` has
    /// already confirmed exactly one king per side; during construction or
    /// mid-mutation (see `king_square_opt`) the king can be transiently
    /// absent, so those call sites use the checked accessor instead.
    #[must_use]
    pub fn king_square(&self, color: Color) -> Square {
        self.king_square_opt(color)
            .unwrap_or_else(|| panic!("king_square: no {color:?} king on the board"))
    }

    /// `None` while `color`'s king board is empty: true only transiently,
    /// while a `StackedBitboard` is being built up piece by piece (FEN
    /// parsing) or mid-mutation inside `move_piece` (a king is briefly gone
    /// between its `remove` and the matching `place`).
    #[inline]
    fn king_square_opt(&self, color: Color) -> Option<Square> {
        let bb = self.boards[color.index()][PieceKind::King.index()];
        if bb == EMPTY {
            None
        } else {
            Some(Square::new(bb.trailing_zeros() as u8))
        }
    }

    #[inline]
    #[must_use]
    pub fn attacks_by(&self, color: Color) -> Bitboard {
        self.attacks[color.index()]
            .iter()
            .fold(EMPTY, |acc, &bb| acc | bb)
    }

    /// Enemy attack set used specifically for king-move legality: recomputed
    /// on demand with `excluded` (the moving king's current square) cleared
    /// from blockers, so a slider's ray extends through the square the king
    /// is vacating instead of stopping on it.
    #[must_use]
    pub fn attacks_by_excluding(&self, color: Color, excluded: Square) -> Bitboard {
        let occ = self.occupancy() & !excluded.bitboard();
        let mut attacks = EMPTY;
        for &kind in &ALL_KINDS {
            let bb = self.boards[color.index()][kind.index()];
            for sq in iter_bits(bb) {
                attacks |= piece_attack(kind, color, Square::new(sq), occ);
            }
        }
        attacks
    }

    #[inline]
    #[must_use]
    pub fn checkers(&self, color: Color) -> Bitboard {
        self.checkers[color.index()]
    }

    #[inline]
    #[must_use]
    pub fn pinned(&self, color: Color) -> Bitboard {
        self.pinned[color.index()]
    }

    /// Place `piece` at `sq`, displacing and returning whatever piece was
    /// already there (if any).
    pub fn place(&mut self, sq: Square, piece: Piece) -> Option<Piece> {
        let displaced = self.remove(sq);
        let bb = sq.bitboard();
        self.boards[piece.color.index()][piece.kind.index()] |= bb;
        self.occupancy[piece.color.index()] |= bb;
        self.square[sq.index()] = Some(piece);
        self.piece_zobrist ^= zobrist::piece_key(piece, sq.index());
        self.recompute_attack_kind(piece.color, piece.kind);
        self.recompute_pins_and_checks();
        displaced
    }

    /// Remove whatever piece occupies `sq`, if any, returning it.
    pub fn remove(&mut self, sq: Square) -> Option<Piece> {
        let existing = self.square[sq.index()]?;
        let bb = sq.bitboard();
        self.boards[existing.color.index()][existing.kind.index()] &= !bb;
        self.occupancy[existing.color.index()] &= !bb;
        self.square[sq.index()] = None;
        self.piece_zobrist ^= zobrist::piece_key(existing, sq.index());
        self.recompute_attack_kind(existing.color, existing.kind);
        self.recompute_pins_and_checks();
        Some(existing)
    }

    /// Atomic `from -> to` relocation of `piece`. If `drop` is set, a piece
    /// is simultaneously re-placed on `from` in the same step — used by
    /// unmake of ordinary captures, where the undone move both restores the
    /// mover to `from` and resurrects the captured piece there... actually
    /// `drop` re-places on `from`, the captured piece's un-capture is
    /// driven by the caller separately for non-adjacent capture kinds
    /// (en passant, promotion); for a plain capture, `unmake` calls this
    /// with `drop` set to the captured piece so both the mover's retreat
    /// and the victim's resurrection happen in one mutation.
    pub fn move_piece(
        &mut self,
        from: Square,
        to: Square,
        piece: Piece,
        drop: Option<Piece>,
    ) -> Option<Piece> {
        let captured = self.remove(to);
        self.remove(from);
        self.place(to, piece);
        if let Some(dropped) = drop {
            self.place(from, dropped);
        }
        captured
    }

    pub fn toggle_ep(&mut self, color: Color, sq: Option<Square>) {
        self.ep[color.index()] = sq.map_or(EMPTY, Square::bitboard);
    }

    /// Yields `(kind, own_bb, enemy_bb)` for the six real piece kinds.
    pub fn iter_material(&self, color: Color) -> impl Iterator<Item = (PieceKind, Bitboard, Bitboard)> + '_ {
        ALL_KINDS.iter().map(move |&kind| {
            (
                kind,
                self.boards[color.index()][kind.index()],
                self.boards[(!color).index()][kind.index()],
            )
        })
    }

    fn recompute_attack_kind(&mut self, color: Color, kind: PieceKind) {
        let occ = self.occupancy();
        let bb = self.boards[color.index()][kind.index()];
        let mut attacks = EMPTY;
        for sq in iter_bits(bb) {
            attacks |= piece_attack(kind, color, Square::new(sq), occ);
        }
        self.attacks[color.index()][kind.index()] = attacks;
    }

    fn recompute_all_attacks(&mut self) {
        for &color in &[Color::White, Color::Black] {
            for &kind in &ALL_KINDS {
                self.recompute_attack_kind(color, kind);
            }
        }
    }

    /// Recomputes pinned-piece and checker sets for both colors from
    /// scratch. Called after every mutation; cheap relative to a full
    /// from-FEN rebuild since it only walks sliders and king positions.
    ///
    /// A color with no king yet placed (mid-FEN-parse, or momentarily
    /// inside `move_piece`'s remove/place pair) simply has no pins or
    /// checkers rather than being queried with a nonexistent king square.
    fn recompute_pins_and_checks(&mut self) {
        for &color in &[Color::White, Color::Black] {
            match self.king_square_opt(color) {
                Some(king_sq) => {
                    self.pinned[color.index()] = self.compute_pinned(color, king_sq);
                    self.checkers[color.index()] = self.compute_checkers(color, king_sq);
                }
                None => {
                    self.pinned[color.index()] = EMPTY;
                    self.checkers[color.index()] = EMPTY;
                }
            }
        }
    }

    fn compute_pinned(&self, color: Color, king_sq: Square) -> Bitboard {
        let enemy = !color;
        let own_occ = self.occupancy_of(color);
        let all_occ = self.occupancy();
        let mut pinned = EMPTY;

        let diagonal_sliders =
            self.boards[enemy.index()][PieceKind::Bishop.index()] | self.boards[enemy.index()][PieceKind::Queen.index()];
        let straight_sliders =
            self.boards[enemy.index()][PieceKind::Rook.index()] | self.boards[enemy.index()][PieceKind::Queen.index()];

        for sq in iter_bits(diagonal_sliders) {
            pinned |= self.pin_along(king_sq, Square::new(sq), own_occ, all_occ);
        }
        for sq in iter_bits(straight_sliders) {
            pinned |= self.pin_along(king_sq, Square::new(sq), own_occ, all_occ);
        }
        pinned
    }

    fn pin_along(&self, king_sq: Square, slider_sq: Square, own_occ: Bitboard, all_occ: Bitboard) -> Bitboard {
        if tables::pin_mask(king_sq, slider_sq) == EMPTY {
            return EMPTY;
        }
        let between = tables::ray_mask(king_sq, slider_sq);
        let blockers = between & all_occ;
        if popcount(blockers) == 1 && (blockers & own_occ) == blockers {
            blockers
        } else {
            EMPTY
        }
    }

    fn compute_checkers(&self, color: Color, king_sq: Square) -> Bitboard {
        let enemy = !color;
        let occ = self.occupancy();
        let mut checkers = EMPTY;

        checkers |= self.boards[enemy.index()][PieceKind::Pawn.index()]
            & tables::pawn_attacks(color, king_sq.bitboard());
        checkers |= self.boards[enemy.index()][PieceKind::Knight.index()] & tables::knight_attacks(king_sq);
        checkers |= (self.boards[enemy.index()][PieceKind::Bishop.index()]
            | self.boards[enemy.index()][PieceKind::Queen.index()])
            & magic::bishop_attacks(king_sq, occ);
        checkers |= (self.boards[enemy.index()][PieceKind::Rook.index()]
            | self.boards[enemy.index()][PieceKind::Queen.index()])
            & magic::rook_attacks(king_sq, occ);
        checkers
    }

    pub(crate) fn recompute_everything(&mut self) {
        self.recompute_all_attacks();
        self.recompute_pins_and_checks();
    }
}

#[inline]
fn piece_attack(kind: PieceKind, color: Color, sq: Square, occ: Bitboard) -> Bitboard {
    match kind {
        PieceKind::Pawn => tables::pawn_attacks(color, sq.bitboard()),
        PieceKind::Knight => tables::knight_attacks(sq),
        PieceKind::Bishop => magic::bishop_attacks(sq, occ),
        PieceKind::Rook => magic::rook_attacks(sq, occ),
        PieceKind::Queen => magic::queen_attacks(sq, occ),
        PieceKind::King => tables::king_attacks(sq),
    }
}
