//! Standard Algebraic Notation: emission and parsing against the legal
//! move list of a given position (SAN has no meaning outside one).

use super::Position;
use crate::error::MoveParseError;
use crate::types::{Move, PieceKind};

#[must_use]
pub fn to_san(pos: &Position, mv: Move) -> String {
    let mut s = san_core(pos, mv);
    let mut after = pos.clone();
    after.make_move(mv);
    if after.is_check() {
        s.push(if after.is_checkmate() { '#' } else { '+' });
    }
    s
}

pub fn parse_san(pos: &Position, text: &str) -> Result<Move, MoveParseError> {
    let wanted = normalize(text);
    let legal = pos.legal_moves();
    let mut matches = legal
        .into_iter()
        .filter(|&mv| normalize(&san_core(pos, mv)) == wanted);

    match (matches.next(), matches.next()) {
        (None, _) => Err(MoveParseError::InvalidSan {
            text: text.to_string(),
        }),
        (Some(mv), None) => Ok(mv),
        (Some(_), Some(_)) => {
            let count = 2 + matches.count();
            Err(MoveParseError::AmbiguousSan {
                text: text.to_string(),
                count,
            })
        }
    }
}

/// SAN text without the trailing `+`/`#` check annotation, which `parse_san`
/// strips from its input too so both sides compare on equal footing.
fn san_core(pos: &Position, mv: Move) -> String {
    if mv.is_castle_kingside() {
        return "O-O".to_string();
    }
    if mv.is_castle_queenside() {
        return "O-O-O".to_string();
    }

    let piece = pos
        .boards()
        .piece_at(mv.from())
        .expect("san_core called with a pseudo-move whose origin is empty");
    let mut s = String::new();

    if piece.kind == PieceKind::Pawn {
        if mv.is_capture() {
            s.push((b'a' + mv.from().file()) as char);
        }
    } else {
        s.push(kind_letter(piece.kind));
        s.push_str(&disambiguation(pos, mv, piece.kind));
    }

    if mv.is_capture() {
        s.push('x');
    }
    s.push_str(&mv.to().to_string());

    if let Some(promo) = mv.promotion_kind() {
        s.push('=');
        s.push(kind_letter(promo));
    }

    s
}

fn kind_letter(kind: PieceKind) -> char {
    match kind {
        PieceKind::Knight => 'N',
        PieceKind::Bishop => 'B',
        PieceKind::Rook => 'R',
        PieceKind::Queen => 'Q',
        PieceKind::King => 'K',
        PieceKind::Pawn => unreachable!("pawns are never given a SAN piece letter"),
    }
}

/// Minimal file/rank/both prefix needed to distinguish `mv` from every other
/// legal move of the same piece kind landing on the same square.
fn disambiguation(pos: &Position, mv: Move, kind: PieceKind) -> String {
    let others: Vec<Move> = pos
        .legal_moves()
        .into_iter()
        .filter(|&other| {
            other != mv
                && other.to() == mv.to()
                && pos.boards().piece_at(other.from()).map(|p| p.kind) == Some(kind)
        })
        .collect();

    if others.is_empty() {
        return String::new();
    }

    let same_file = others.iter().any(|o| o.from().file() == mv.from().file());
    let same_rank = others.iter().any(|o| o.from().rank() == mv.from().rank());

    if !same_file {
        ((b'a' + mv.from().file()) as char).to_string()
    } else if !same_rank {
        mv.from().to_string().chars().nth(1).unwrap().to_string()
    } else {
        mv.from().to_string()
    }
}

fn normalize(text: &str) -> String {
    text.trim()
        .trim_end_matches(['+', '#', '!', '?'])
        .replace("0-0-0", "O-O-O")
        .replace("0-0", "O-O")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Square;

    #[test]
    fn pawn_push_has_no_piece_letter() {
        let pos = Position::new();
        let mv = Move::quiet(Square::from_algebraic("e2").unwrap(), Square::from_algebraic("e4").unwrap());
        assert_eq!(san_core(&pos, mv), "e4");
    }

    #[test]
    fn knight_development_uses_piece_letter() {
        let pos = Position::new();
        let mv = Move::quiet(Square::from_algebraic("g1").unwrap(), Square::from_algebraic("f3").unwrap());
        assert_eq!(san_core(&pos, mv), "Nf3");
    }

    #[test]
    fn kingside_castle_renders_as_o_o() {
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let mv = Move::castle_kingside(Square::from_algebraic("e1").unwrap(), Square::from_algebraic("g1").unwrap());
        assert_eq!(to_san(&pos, mv), "O-O");
    }

    #[test]
    fn round_trips_through_parse() {
        let pos = Position::new();
        let mv = Move::quiet(Square::from_algebraic("e2").unwrap(), Square::from_algebraic("e4").unwrap());
        let san = to_san(&pos, mv);
        assert_eq!(parse_san(&pos, &san).unwrap(), mv);
    }

    #[test]
    fn ambiguous_rook_moves_disambiguate_by_file() {
        let pos = Position::from_fen("4k3/8/8/3R4/8/8/8/R3K3 w - - 0 1").unwrap();
        let mv = Move::quiet(Square::from_algebraic("a1").unwrap(), Square::from_algebraic("d1").unwrap());
        assert_eq!(san_core(&pos, mv), "Rad1");
    }
}
