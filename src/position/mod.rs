//! L4: `Position` — FEN I/O, make/unmake, legality predicates, incremental
//! Zobrist maintenance, and the reversible state stack.

mod fen;
mod make_unmake;
mod san;
mod state;

pub use state::StateFrame;

use std::fmt;

use crate::bitboard::popcount;
use crate::board::StackedBitboard;
use crate::constants::STARTING_FEN;
use crate::error::FenError;
use crate::movegen;
use crate::types::{CastlingRights, Color, Move, Square};

#[derive(Clone)]
pub struct Position {
    boards: StackedBitboard,
    turn: Color,
    castling_rights: CastlingRights,
    ep_square: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
    /// Full Zobrist key: piece placement (delegated to `StackedBitboard`)
    /// XORed with castling rights, en-passant file, and side-to-move keys.
    zobrist: u64,
    history: Vec<StateFrame>,
    /// Zobrist key at every position reached since the last irreversible
    /// move (pawn push, capture, castle), oldest first, used for
    /// threefold-repetition detection.
    key_history: Vec<u64>,
}

impl Position {
    #[must_use]
    pub fn new() -> Self {
        Self::from_fen(STARTING_FEN).expect("starting FEN is well-formed")
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        fen::parse(fen)
    }

    #[must_use]
    pub fn to_fen(&self) -> String {
        fen::emit(self)
    }

    #[inline]
    #[must_use]
    pub fn boards(&self) -> &StackedBitboard {
        &self.boards
    }

    #[inline]
    #[must_use]
    pub fn turn(&self) -> Color {
        self.turn
    }

    #[inline]
    #[must_use]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    #[inline]
    #[must_use]
    pub fn ep_square(&self) -> Option<Square> {
        self.ep_square
    }

    #[inline]
    #[must_use]
    pub fn zobrist(&self) -> u64 {
        self.zobrist
    }

    #[inline]
    #[must_use]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    #[must_use]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    #[must_use]
    pub fn is_check(&self) -> bool {
        self.boards.checkers(self.turn) != 0
    }

    #[must_use]
    pub fn legal_moves(&self) -> crate::types::MoveList {
        movegen::legal_moves(self)
    }

    #[must_use]
    pub fn is_checkmate(&self) -> bool {
        self.is_check() && self.legal_moves().is_empty()
    }

    #[must_use]
    pub fn is_stalemate(&self) -> bool {
        !self.is_check() && self.legal_moves().is_empty()
    }

    #[must_use]
    pub fn is_draw_by_fifty_move(&self) -> bool {
        self.halfmove_clock >= 100
    }

    #[must_use]
    pub fn is_draw_by_repetition(&self) -> bool {
        let occurrences = self
            .key_history
            .iter()
            .rev()
            .filter(|&&k| k == self.zobrist)
            .count();
        occurrences >= 2
    }

    #[must_use]
    pub fn is_draw(&self) -> bool {
        self.is_draw_by_fifty_move() || self.is_draw_by_repetition()
    }

    pub fn make_move(&mut self, mv: Move) {
        make_unmake::make(self, mv);
    }

    pub fn unmake_move(&mut self) {
        make_unmake::unmake(self);
    }

    /// Parse and apply a UCI long-algebraic move (`e2e4`, `e7e8q`) against
    /// the current legal move set, disambiguating quiet/capture/en-passant
    /// flags the bare text can't express on its own.
    pub fn make_uci(&mut self, text: &str) -> Result<Move, crate::error::EngineError> {
        let (from, to, promo) = Move::from_uci_squares(text)
            .map_err(crate::error::EngineError::Move)?;
        let legal = self.legal_moves();
        let found = legal.into_iter().find(|m| {
            m.from() == from && m.to() == to && m.promotion_kind() == promo
        });
        match found {
            Some(mv) => {
                self.make_move(mv);
                Ok(mv)
            }
            None => Err(crate::error::EngineError::IllegalMove {
                uci: text.to_string(),
            }),
        }
    }

    #[must_use]
    pub fn move_to_san(&self, mv: Move) -> String {
        san::to_san(self, mv)
    }

    pub fn parse_san(&self, text: &str) -> Result<Move, crate::error::MoveParseError> {
        san::parse_san(self, text)
    }

    /// An 8x8 ASCII rendering with file/rank borders, used by debug logging.
    #[must_use]
    pub fn render_ascii(&self) -> String {
        let mut out = String::new();
        let border = "  +---+---+---+---+---+---+---+---+\n";
        out.push_str(border);
        for rank in (0..8).rev() {
            out.push_str(&format!("{} ", rank + 1));
            for file in 0..8 {
                let sq = Square::from_file_rank(file, rank);
                let c = self.boards.piece_at(sq).map_or(' ', |p| p.to_char());
                out.push_str(&format!("| {c} "));
            }
            out.push_str("|\n");
            out.push_str(border);
        }
        out.push_str("    a   b   c   d   e   f   g   h\n");
        out
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.render_ascii(), self.to_fen())
    }
}

/// Checks core position invariants (one king per side, disjoint occupancy,
/// bounded checker/pin counts). Compiled in debug/test builds only; a
/// violation panics, since it indicates a bug in make/unmake or table
/// initialization rather than a recoverable error.
pub fn debug_assert_invariants(pos: &Position) {
    if !cfg!(debug_assertions) {
        return;
    }
    let b = pos.boards();
    for &color in &[Color::White, Color::Black] {
        let king_count = popcount(b.board_of(color, crate::types::PieceKind::King));
        assert_eq!(king_count, 1, "exactly one king per color must exist");
        assert!(
            popcount(b.ep_board(color)) <= 1,
            "en-passant board has at most one bit set"
        );
        assert!(
            popcount(b.checkers(color)) <= 2,
            "at most two simultaneous checkers"
        );
        assert_eq!(
            b.pinned(color) & !b.occupancy_of(color),
            0,
            "pinned pieces must be a subset of own occupancy"
        );
    }
    assert_eq!(
        b.occupancy_of(Color::White) & b.occupancy_of(Color::Black),
        0,
        "white and black occupancy must be disjoint"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_position_has_twenty_legal_moves() {
        let pos = Position::new();
        assert_eq!(pos.legal_moves().len(), 20);
    }

    #[test]
    fn start_position_is_not_check() {
        let pos = Position::new();
        assert!(!pos.is_check());
        assert!(!pos.is_checkmate());
        assert!(!pos.is_stalemate());
    }
}
