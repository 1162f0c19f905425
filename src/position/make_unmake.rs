//! L4 make/unmake: applies a [`Move`] to a [`Position`] and reverses it via
//! the [`StateFrame`] stack, keeping the full Zobrist key, castling rights,
//! en-passant square, and repetition history consistent.

use super::{Position, StateFrame};
use crate::types::{CastlingRights, Color, Move, MoveFlag, Piece, PieceKind, Square};
use crate::zobrist;

pub fn make(pos: &mut Position, mv: Move) {
    let color = pos.turn;
    let from = mv.from();
    let to = mv.to();
    let flag = mv.flag();
    let moving_piece = pos
        .boards
        .piece_at(from)
        .unwrap_or_else(|| panic!("make: no piece on {from} ({mv:?})"));

    let frame = StateFrame {
        castling_rights: pos.castling_rights,
        captured_piece: None, // filled in below once we know what's captured
        ep_square: pos.ep_square,
        mv,
        halfmove_clock: pos.halfmove_clock,
        zobrist: pos.zobrist,
        key_history_snapshot: pos.key_history.clone(),
    };

    let captured = match flag {
        MoveFlag::Quiet | MoveFlag::DoublePawnPush => {
            pos.boards.move_piece(from, to, moving_piece, None)
        }
        MoveFlag::Capture => pos.boards.move_piece(from, to, moving_piece, None),
        MoveFlag::EnPassantCapture => {
            let captured_sq = ep_captured_square(color, to);
            let victim = pos.boards.remove(captured_sq);
            pos.boards.move_piece(from, to, moving_piece, None);
            victim
        }
        MoveFlag::CastleKingside | MoveFlag::CastleQueenside => {
            pos.boards.move_piece(from, to, moving_piece, None);
            let (rook_from, rook_to) = castle_rook_squares(color, flag);
            let rook = Piece::new(PieceKind::Rook, color);
            pos.boards.move_piece(rook_from, rook_to, rook, None);
            None
        }
        MoveFlag::PromoKnight
        | MoveFlag::PromoBishop
        | MoveFlag::PromoRook
        | MoveFlag::PromoQueen => {
            pos.boards.remove(from);
            pos.boards
                .place(to, Piece::new(mv.promotion_kind().unwrap(), color))
        }
        MoveFlag::PromoCaptureKnight
        | MoveFlag::PromoCaptureBishop
        | MoveFlag::PromoCaptureRook
        | MoveFlag::PromoCaptureQueen => {
            let victim = pos.boards.remove(to);
            pos.boards.remove(from);
            pos.boards
                .place(to, Piece::new(mv.promotion_kind().unwrap(), color));
            victim
        }
    };

    let is_irreversible = moving_piece.kind == PieceKind::Pawn || captured.is_some();

    update_castling_rights(pos, color, from, to, captured);

    // The previously active ep pseudo-board (if any) belongs to the side
    // that just moved last move, i.e. `!color` here; it expires after one
    // half-move regardless of whether it was captured.
    pos.boards.toggle_ep(!color, None);
    pos.ep_square = match flag {
        MoveFlag::DoublePawnPush => Some(ep_captured_square(color, to)),
        _ => None,
    };
    if let Some(sq) = pos.ep_square {
        pos.boards.toggle_ep(color, Some(sq));
    }

    if moving_piece.kind == PieceKind::Pawn || captured.is_some() {
        pos.halfmove_clock = 0;
    } else {
        pos.halfmove_clock += 1;
    }
    if color == Color::Black {
        pos.fullmove_number += 1;
    }

    if is_irreversible {
        pos.key_history.clear();
    } else {
        pos.key_history.push(frame.zobrist);
    }

    pos.turn = !color;
    pos.zobrist = recompute_zobrist(pos);

    pos.history.push(StateFrame {
        captured_piece: captured,
        ..frame
    });

    super::debug_assert_invariants(pos);
}

pub fn unmake(pos: &mut Position) {
    let frame = pos.history.pop().expect("unmake called with empty history");
    let mv = frame.mv;
    let from = mv.from();
    let to = mv.to();
    let flag = mv.flag();
    let color = !pos.turn;

    match flag {
        MoveFlag::Quiet | MoveFlag::DoublePawnPush => {
            let piece = pos.boards.piece_at(to).expect("moved piece must be at destination");
            pos.boards.move_piece(to, from, piece, None);
        }
        MoveFlag::Capture => {
            let piece = pos.boards.piece_at(to).expect("moved piece must be at destination");
            pos.boards.move_piece(to, from, piece, frame.captured_piece);
        }
        MoveFlag::EnPassantCapture => {
            let piece = pos.boards.piece_at(to).expect("moved piece must be at destination");
            pos.boards.move_piece(to, from, piece, None);
            let captured_sq = ep_captured_square(color, to);
            pos.boards.place(
                captured_sq,
                frame.captured_piece.expect("en passant always captures a pawn"),
            );
        }
        MoveFlag::CastleKingside | MoveFlag::CastleQueenside => {
            let (rook_from, rook_to) = castle_rook_squares(color, flag);
            let rook = Piece::new(PieceKind::Rook, color);
            pos.boards.move_piece(rook_to, rook_from, rook, None);
            let king = pos.boards.piece_at(to).expect("king must be at destination");
            pos.boards.move_piece(to, from, king, None);
        }
        MoveFlag::PromoKnight
        | MoveFlag::PromoBishop
        | MoveFlag::PromoRook
        | MoveFlag::PromoQueen => {
            pos.boards.remove(to);
            pos.boards.place(from, Piece::new(PieceKind::Pawn, color));
        }
        MoveFlag::PromoCaptureKnight
        | MoveFlag::PromoCaptureBishop
        | MoveFlag::PromoCaptureRook
        | MoveFlag::PromoCaptureQueen => {
            pos.boards.remove(to);
            pos.boards.place(from, Piece::new(PieceKind::Pawn, color));
            pos.boards.place(
                to,
                frame.captured_piece.expect("promotion-capture always captures a piece"),
            );
        }
    }

    // Undo this move's own ep pseudo-board (if it was a double push) and
    // restore whatever the opponent's was beforehand.
    pos.boards.toggle_ep(color, None);
    pos.boards.toggle_ep(!color, frame.ep_square);

    pos.turn = color;
    pos.castling_rights = frame.castling_rights;
    pos.ep_square = frame.ep_square;
    pos.halfmove_clock = frame.halfmove_clock;
    pos.zobrist = frame.zobrist;
    if color == Color::Black {
        pos.fullmove_number -= 1;
    }
    pos.key_history = frame.key_history_snapshot;
}

/// Given the destination square of a double push or en-passant capture,
/// the square the skipped-over (or captured) pawn sits on, one rank behind
/// `to` from `color`'s perspective.
fn ep_captured_square(color: Color, to: Square) -> Square {
    let delta = -color.forward();
    Square::new((to.index() as i8 + delta) as u8)
}

fn castle_rook_squares(color: Color, flag: MoveFlag) -> (Square, Square) {
    let home_rank = match color {
        Color::White => 0u8,
        Color::Black => 7u8,
    };
    match flag {
        MoveFlag::CastleKingside => (
            Square::from_file_rank(7, home_rank),
            Square::from_file_rank(5, home_rank),
        ),
        MoveFlag::CastleQueenside => (
            Square::from_file_rank(0, home_rank),
            Square::from_file_rank(3, home_rank),
        ),
        _ => unreachable!("castle_rook_squares called with a non-castling flag"),
    }
}

fn update_castling_rights(
    pos: &mut Position,
    color: Color,
    from: Square,
    to: Square,
    captured: Option<Piece>,
) {
    if from == king_home(color) {
        pos.castling_rights.clear(CastlingRights::both(color));
    }
    clear_if_rook_home(pos, from);
    if captured.is_some() {
        clear_if_rook_home(pos, to);
    }
}

fn king_home(color: Color) -> Square {
    match color {
        Color::White => Square::from_file_rank(4, 0),
        Color::Black => Square::from_file_rank(4, 7),
    }
}

fn clear_if_rook_home(pos: &mut Position, sq: Square) {
    let bit = match sq {
        s if s == Square::from_file_rank(0, 0) => CastlingRights::queenside(Color::White),
        s if s == Square::from_file_rank(7, 0) => CastlingRights::kingside(Color::White),
        s if s == Square::from_file_rank(0, 7) => CastlingRights::queenside(Color::Black),
        s if s == Square::from_file_rank(7, 7) => CastlingRights::kingside(Color::Black),
        _ => return,
    };
    pos.castling_rights.clear(bit);
}

fn recompute_zobrist(pos: &Position) -> u64 {
    let mut key = pos.boards.piece_zobrist() ^ zobrist::castle_key(pos.castling_rights.0);
    if let Some(sq) = pos.ep_square {
        key ^= zobrist::ep_file_key(sq.file());
    }
    if pos.turn == Color::Black {
        key ^= zobrist::turn_key();
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(pos: &Position) -> (String, u64) {
        (pos.to_fen(), pos.zobrist)
    }

    #[test]
    fn quiet_pawn_push_round_trips() {
        let mut pos = Position::new();
        let before = snapshot(&pos);
        let mv = Move::quiet(Square::from_algebraic("e2").unwrap(), Square::from_algebraic("e3").unwrap());
        pos.make_move(mv);
        assert_ne!(snapshot(&pos), before);
        pos.unmake_move();
        assert_eq!(snapshot(&pos), before);
    }

    #[test]
    fn capture_round_trips() {
        let mut pos =
            Position::from_fen("rnbqkbnr/pppp1ppp/8/4p3/3P4/8/PPP1PPPP/RNBQKBNR w KQkq - 0 2").unwrap();
        let before = snapshot(&pos);
        let mv = Move::capture(Square::from_algebraic("d4").unwrap(), Square::from_algebraic("e5").unwrap());
        pos.make_move(mv);
        assert_eq!(pos.halfmove_clock(), 0);
        pos.unmake_move();
        assert_eq!(snapshot(&pos), before);
    }

    #[test]
    fn castling_round_trips() {
        let mut pos =
            Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let before = snapshot(&pos);
        let mv = Move::castle_kingside(Square::from_algebraic("e1").unwrap(), Square::from_algebraic("g1").unwrap());
        pos.make_move(mv);
        assert_eq!(pos.boards().piece_at(Square::from_algebraic("f1").unwrap()).unwrap().kind, PieceKind::Rook);
        assert!(!pos.castling_rights().has(CastlingRights::kingside(Color::White)));
        pos.unmake_move();
        assert_eq!(snapshot(&pos), before);
        assert!(pos.castling_rights().has(CastlingRights::kingside(Color::White)));
    }

    #[test]
    fn en_passant_round_trips() {
        let mut pos =
            Position::from_fen("rnbqkbnr/1pp1pppp/p7/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3").unwrap();
        let before = snapshot(&pos);
        let mv = Move::en_passant(Square::from_algebraic("e5").unwrap(), Square::from_algebraic("d6").unwrap());
        pos.make_move(mv);
        assert!(pos.boards().piece_at(Square::from_algebraic("d5").unwrap()).is_none());
        assert_eq!(pos.halfmove_clock(), 0);
        pos.unmake_move();
        assert_eq!(snapshot(&pos), before);
    }

    #[test]
    fn double_push_sets_the_ep_pseudo_board_for_an_immediate_reply() {
        // A double push played via make_move (not parsed off a FEN's ep
        // field) must still leave StackedBitboard's ep board set so the very
        // next move's pawn-capture generation can see it.
        let mut pos =
            Position::from_fen("rnbqkbnr/1pp1pppp/p7/4P3/8/8/PPPP1PPP/RNBQKBNR b KQkq - 0 3").unwrap();
        pos.make_move(Move::double_pawn_push(
            Square::from_algebraic("d7").unwrap(),
            Square::from_algebraic("d5").unwrap(),
        ));
        assert_eq!(pos.ep_square(), Some(Square::from_algebraic("d6").unwrap()));
        assert!(
            pos.boards().ep_board(Color::Black) & Square::from_algebraic("d6").unwrap().bitboard() != 0,
            "the ep pseudo-board must be set, not just Position::ep_square"
        );
        let ep = Move::en_passant(Square::from_algebraic("e5").unwrap(), Square::from_algebraic("d6").unwrap());
        assert!(pos.legal_moves().contains(&ep), "e5xd6 en passant must be generated");
    }

    #[test]
    fn ep_pseudo_board_expires_after_one_reply() {
        let mut pos =
            Position::from_fen("rnbqkbnr/1pp1pppp/p7/4P3/8/8/PPPP1PPP/RNBQKBNR b KQkq - 0 3").unwrap();
        pos.make_move(Move::double_pawn_push(
            Square::from_algebraic("d7").unwrap(),
            Square::from_algebraic("d5").unwrap(),
        ));
        pos.make_move(Move::quiet(Square::from_algebraic("a2").unwrap(), Square::from_algebraic("a3").unwrap()));
        pos.make_move(Move::quiet(Square::from_algebraic("a6").unwrap(), Square::from_algebraic("a5").unwrap()));
        assert_eq!(pos.boards().ep_board(Color::Black), 0, "a stale ep right must not survive a reply");
        let ep = Move::en_passant(Square::from_algebraic("e5").unwrap(), Square::from_algebraic("d6").unwrap());
        assert!(!pos.legal_moves().contains(&ep));
    }

    #[test]
    fn promotion_round_trips() {
        let mut pos = Position::from_fen("8/P6k/8/8/8/8/7p/7K w - - 0 1").unwrap();
        let before = snapshot(&pos);
        let mv = Move::promotion(
            Square::from_algebraic("a7").unwrap(),
            Square::from_algebraic("a8").unwrap(),
            PieceKind::Queen,
            false,
        );
        pos.make_move(mv);
        assert_eq!(
            pos.boards().piece_at(Square::from_algebraic("a8").unwrap()).unwrap().kind,
            PieceKind::Queen
        );
        pos.unmake_move();
        assert_eq!(snapshot(&pos), before);
    }
}
