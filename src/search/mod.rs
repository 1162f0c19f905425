//! L6: iterative-deepening negamax with alpha-beta pruning, a quiescence
//! search extension, a transposition table, killer-move ordering, and
//! cooperative stop-flag cancellation.

pub mod control;
pub mod killers;
pub mod ordering;
pub mod tt;

use crate::config::EngineConfig;
use crate::constants::{MATE_SCORE, MATE_THRESHOLD};
use crate::eval;
use crate::position::Position;
use crate::see;
use crate::types::Move;
use control::{NodeCounter, StopSignal};
use killers::KillerTable;
use tt::{BoundType, TranspositionTable};

/// Outcome of one `go` call: the best line found, its score (centipawns
/// from the root side's perspective), and bookkeeping for UCI `info` lines.
#[derive(Clone, Debug, Default)]
pub struct SearchResult {
    pub best_move: Option<Move>,
    pub score: i32,
    pub depth: u32,
    pub nodes: u64,
    pub pv: Vec<Move>,
}

pub struct Searcher {
    config: EngineConfig,
    tt: TranspositionTable,
    killers: KillerTable,
    stop: StopSignal,
    nodes: NodeCounter,
}

impl Searcher {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Searcher {
            tt: TranspositionTable::new(config.tt_size_mb),
            killers: KillerTable::new(config.killer_slots, config.max_depth as usize + 64),
            stop: StopSignal::new(),
            nodes: NodeCounter::new(0),
            config,
        }
    }

    /// A handle the UCI front end can clone and use to request cancellation
    /// from a different thread while `go` is running.
    #[must_use]
    pub fn stop_handle(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn clear(&mut self) {
        self.tt.clear();
        self.killers.clear();
    }

    /// Iterative deepening from depth 1 up to `max_depth` (or the
    /// configured default if 0), returning the deepest iteration that
    /// completed before the stop signal fired. Callers own the stop
    /// signal's lifecycle: reset it via `stop_handle()` before starting a
    /// new search, since a concurrent `stop` command may fire at any time.
    pub fn go(&mut self, pos: &mut Position, max_depth: u32) -> SearchResult {
        let max_depth = if max_depth == 0 { self.config.max_depth } else { max_depth };
        self.nodes = NodeCounter::new(0);
        self.killers.clear();

        let mut best = SearchResult::default();
        for depth in 1..=max_depth {
            let mut pv = Vec::new();
            let score = self.negamax(pos, depth, 0, -MATE_SCORE - 1, MATE_SCORE + 1, &mut pv);
            if self.stop.is_stopped() {
                tracing::debug!(depth, "search canceled mid-iteration, keeping previous depth");
                break;
            }
            best = SearchResult {
                best_move: pv.first().copied(),
                score,
                depth,
                nodes: self.nodes.count(),
                pv,
            };
            tracing::debug!(depth, score = best.score, nodes = best.nodes, "iteration complete");
            self.tt.new_generation();
            if score.abs() >= MATE_THRESHOLD {
                break;
            }
        }
        best
    }

    fn negamax(&mut self, pos: &mut Position, depth: u32, ply: u32, alpha: i32, beta: i32, pv: &mut Vec<Move>) -> i32 {
        pv.clear();
        if self.stop.is_stopped() {
            return 0;
        }
        if ply > 0 && pos.is_draw() {
            return 0;
        }

        let mut alpha = alpha.max(-MATE_SCORE + ply as i32);
        let beta = beta.min(MATE_SCORE - ply as i32);
        if alpha >= beta {
            return alpha;
        }

        let original_alpha = alpha;
        let hash = pos.zobrist();
        let mut tt_move = None;
        if let Some(entry) = self.tt.probe(hash) {
            tt_move = entry.best_move;
            if entry.depth >= depth {
                match entry.bound_type {
                    BoundType::Exact => {
                        if let Some(mv) = entry.best_move {
                            pv.push(mv);
                        }
                        return entry.score;
                    }
                    BoundType::LowerBound => alpha = alpha.max(entry.score),
                    BoundType::UpperBound => {
                        if entry.score < beta {
                            return entry.score;
                        }
                    }
                }
                if alpha >= beta {
                    return entry.score;
                }
            }
        }

        if depth == 0 {
            return self.quiescence(pos, alpha, beta, 0);
        }

        if self.nodes.visit() {
            self.stop.request_stop();
        }

        let mut moves = pos.legal_moves();
        if moves.is_empty() {
            return if pos.is_check() {
                -(MATE_SCORE - ply as i32)
            } else {
                0
            };
        }

        let killer_moves = self.killers.at(ply as usize).to_vec();
        ordering::order_moves(pos, &mut moves, tt_move, &killer_moves);

        let mut best_score = -MATE_SCORE - 1;
        let mut best_move = None;
        let mut child_pv = Vec::new();

        for mv in moves {
            pos.make_move(mv);
            let score = -self.negamax(pos, depth - 1, ply + 1, -beta, -alpha, &mut child_pv);
            pos.unmake_move();

            if self.stop.is_stopped() {
                return 0;
            }

            if score > best_score {
                best_score = score;
                best_move = Some(mv);
                pv.clear();
                pv.push(mv);
                pv.extend(child_pv.iter().copied());
            }
            alpha = alpha.max(score);
            if alpha >= beta {
                if !mv.is_capture() {
                    self.killers.record(ply as usize, mv);
                }
                break;
            }
        }

        let bound = if best_score <= original_alpha {
            BoundType::UpperBound
        } else if best_score >= beta {
            BoundType::LowerBound
        } else {
            BoundType::Exact
        };
        self.tt.store(hash, depth, best_score, bound, best_move);
        best_score
    }

    fn quiescence(&mut self, pos: &mut Position, alpha: i32, beta: i32, qply: u32) -> i32 {
        if self.nodes.visit() {
            self.stop.request_stop();
        }
        if self.stop.is_stopped() || pos.is_draw() {
            return 0;
        }

        let stand_pat = eval::evaluate(pos);
        if stand_pat >= beta {
            return beta;
        }
        let mut alpha = alpha.max(stand_pat);
        if qply >= self.config.quiescence_ply_cap {
            return alpha;
        }

        let mut moves = pos.legal_moves();
        moves.retain(|mv| mv.is_capture() || mv.is_promotion());
        moves.retain(|&mv| !mv.is_capture() || see::see(pos, mv) >= 0);
        ordering::order_moves(pos, &mut moves, None, &[]);

        for mv in moves {
            pos.make_move(mv);
            let score = -self.quiescence(pos, -beta, -alpha, qply + 1);
            pos.unmake_move();
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                break;
            }
        }
        alpha
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Square;

    #[test]
    fn finds_mate_in_one() {
        // Black king cornered on h8: Ra1-a8# (rook covers g8/the back rank,
        // the king on g6 covers g7 and h7).
        let mut pos = Position::from_fen("7k/8/6K1/8/8/8/8/R7 w - - 0 1").unwrap();
        let mut searcher = Searcher::new(EngineConfig::default());
        let result = searcher.go(&mut pos, 3);
        let mv = result.best_move.expect("a mating move must be found");
        pos.make_move(mv);
        assert!(pos.is_checkmate());
    }

    #[test]
    fn prefers_winning_a_hanging_queen() {
        let mut pos = Position::from_fen("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let mut searcher = Searcher::new(EngineConfig::default());
        let result = searcher.go(&mut pos, 2);
        let mv = result.best_move.unwrap();
        assert_eq!(mv.from(), Square::from_algebraic("e4").unwrap());
        assert_eq!(mv.to(), Square::from_algebraic("d5").unwrap());
    }

    #[test]
    fn stop_signal_halts_iteration() {
        let mut pos = Position::new();
        let mut searcher = Searcher::new(EngineConfig::default());
        searcher.stop_handle().request_stop();
        let result = searcher.go(&mut pos, 10);
        assert_eq!(result.depth, 0);
    }
}
