//! Game-wide constants.

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Score (centipawns) used to signal a forced mate. Mate-in-`n` is reported
/// as `MATE_SCORE - n`, so shallower mates always outscore deeper ones.
pub const MATE_SCORE: i32 = 30_000;

/// Any score at or above this magnitude is a mate score, not a material one.
pub const MATE_THRESHOLD: i32 = MATE_SCORE - 1_000;
