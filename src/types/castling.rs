use super::color::Color;

pub const WHITE_KINGSIDE: u8 = 0b0001;
pub const WHITE_QUEENSIDE: u8 = 0b0010;
pub const BLACK_KINGSIDE: u8 = 0b0100;
pub const BLACK_QUEENSIDE: u8 = 0b1000;

/// 4-bit castling rights mask: bit 0 white-kingside, bit 1 white-queenside,
/// bit 2 black-kingside, bit 3 black-queenside.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CastlingRights(pub u8);

impl CastlingRights {
    #[must_use]
    pub const fn none() -> Self {
        CastlingRights(0)
    }

    #[must_use]
    pub const fn all() -> Self {
        CastlingRights(WHITE_KINGSIDE | WHITE_QUEENSIDE | BLACK_KINGSIDE | BLACK_QUEENSIDE)
    }

    #[must_use]
    pub const fn has(self, bit: u8) -> bool {
        self.0 & bit != 0
    }

    pub fn clear(&mut self, mask: u8) {
        self.0 &= !mask;
    }

    #[must_use]
    pub const fn kingside(color: Color) -> u8 {
        match color {
            Color::White => WHITE_KINGSIDE,
            Color::Black => BLACK_KINGSIDE,
        }
    }

    #[must_use]
    pub const fn queenside(color: Color) -> u8 {
        match color {
            Color::White => WHITE_QUEENSIDE,
            Color::Black => BLACK_QUEENSIDE,
        }
    }

    #[must_use]
    pub const fn both(color: Color) -> u8 {
        Self::kingside(color) | Self::queenside(color)
    }

    #[must_use]
    pub fn to_fen(self) -> String {
        if self.0 == 0 {
            return "-".to_string();
        }
        let mut s = String::with_capacity(4);
        if self.has(WHITE_KINGSIDE) {
            s.push('K');
        }
        if self.has(WHITE_QUEENSIDE) {
            s.push('Q');
        }
        if self.has(BLACK_KINGSIDE) {
            s.push('k');
        }
        if self.has(BLACK_QUEENSIDE) {
            s.push('q');
        }
        s
    }

    #[must_use]
    pub fn from_fen(field: &str) -> Self {
        if field == "-" {
            return CastlingRights::none();
        }
        let mut bits = 0u8;
        for c in field.chars() {
            bits |= match c {
                'K' => WHITE_KINGSIDE,
                'Q' => WHITE_QUEENSIDE,
                'k' => BLACK_KINGSIDE,
                'q' => BLACK_QUEENSIDE,
                _ => 0,
            };
        }
        CastlingRights(bits)
    }
}
