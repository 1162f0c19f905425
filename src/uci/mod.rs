//! Universal Chess Interface front end: a thin text-protocol loop wired to
//! [`Position`] and [`Searcher`]. Runs each `go` on a background thread so
//! `stop` (read from the same stdin loop) can cancel it cooperatively.

pub mod options;

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;

use crate::config::EngineConfig;
use crate::position::Position;
use crate::search::control::StopSignal;
use crate::search::Searcher;

use options::UciOptions;

#[derive(Default, Debug, Clone)]
struct GoParams {
    depth: Option<u32>,
    movetime: Option<u64>,
    wtime: Option<u64>,
    btime: Option<u64>,
    winc: Option<u64>,
    binc: Option<u64>,
    infinite: bool,
}

fn parse_go_params(parts: &[&str]) -> GoParams {
    let mut params = GoParams::default();
    let mut i = 1;
    while i < parts.len() {
        let consumed = match parts[i] {
            "depth" => {
                params.depth = parts.get(i + 1).and_then(|v| v.parse().ok());
                2
            }
            "movetime" => {
                params.movetime = parts.get(i + 1).and_then(|v| v.parse().ok());
                2
            }
            "wtime" => {
                params.wtime = parts.get(i + 1).and_then(|v| v.parse().ok());
                2
            }
            "btime" => {
                params.btime = parts.get(i + 1).and_then(|v| v.parse().ok());
                2
            }
            "winc" => {
                params.winc = parts.get(i + 1).and_then(|v| v.parse().ok());
                2
            }
            "binc" => {
                params.binc = parts.get(i + 1).and_then(|v| v.parse().ok());
                2
            }
            "infinite" => {
                params.infinite = true;
                1
            }
            _ => 1,
        };
        i += consumed;
    }
    params
}

/// A rough time allocation: remaining time divided across an assumed
/// 30-move horizon, minus a safety margin, plus a quarter of the increment.
fn allocate_movetime(time_left_ms: u64, inc_ms: u64) -> u64 {
    const MOVES_TO_GO: u64 = 30;
    const SAFETY_MARGIN_MS: u64 = 50;
    let mut alloc = time_left_ms / MOVES_TO_GO;
    alloc = alloc.saturating_sub(SAFETY_MARGIN_MS);
    alloc = alloc.saturating_add(inc_ms / 4);
    alloc.max(1)
}

fn parse_position_command(position: &mut Position, parts: &[&str]) {
    let mut i = 1;
    if parts.get(i) == Some(&"startpos") {
        *position = Position::new();
        i += 1;
    } else if parts.get(i) == Some(&"fen") {
        if i + 6 >= parts.len() {
            tracing::warn!("position fen command missing fields");
            return;
        }
        let fen = parts[i + 1..i + 7].join(" ");
        match Position::from_fen(&fen) {
            Ok(pos) => *position = pos,
            Err(err) => {
                tracing::warn!(%err, %fen, "invalid FEN in position command");
                return;
            }
        }
        i += 7;
    } else {
        tracing::warn!("position command missing startpos/fen");
        return;
    }

    if parts.get(i) == Some(&"moves") {
        i += 1;
        while i < parts.len() {
            if position.make_uci(parts[i]).is_err() {
                tracing::warn!(mv = parts[i], "invalid move in position command");
                break;
            }
            i += 1;
        }
    }
}

struct Engine {
    position: Position,
    searcher: Arc<Mutex<Searcher>>,
    stop: StopSignal,
    config: EngineConfig,
    options: UciOptions,
    search_thread: Option<JoinHandle<()>>,
}

impl Engine {
    fn new() -> Self {
        let config = EngineConfig::default();
        let searcher = Searcher::new(config);
        let stop = searcher.stop_handle();
        Engine {
            position: Position::new(),
            searcher: Arc::new(Mutex::new(searcher)),
            stop,
            options: UciOptions::new(&config),
            config,
            search_thread: None,
        }
    }

    fn join_search(&mut self) {
        if let Some(handle) = self.search_thread.take() {
            let _ = handle.join();
        }
    }

    fn stop_search(&mut self) {
        self.stop.request_stop();
        self.join_search();
    }

    fn handle_go(&mut self, parts: &[&str]) {
        self.stop_search();
        let params = parse_go_params(parts);

        let movetime_ms = params.movetime.or_else(|| {
            let (time_left, inc) = match self.position.turn() {
                crate::types::Color::White => (params.wtime, params.winc.unwrap_or(0)),
                crate::types::Color::Black => (params.btime, params.binc.unwrap_or(0)),
            };
            time_left.map(|t| allocate_movetime(t, inc))
        });

        self.stop.reset();
        let position = self.position.clone();
        let searcher = Arc::clone(&self.searcher);
        let stop = self.stop.clone();
        let max_depth = params.depth.unwrap_or(0);

        // Fire-and-forget: if the search finishes on its own first, this
        // just sets an already-irrelevant flag a moment later.
        if !params.infinite {
            if let Some(ms) = movetime_ms {
                let stop = stop.clone();
                thread::spawn(move || {
                    thread::sleep(Duration::from_millis(ms));
                    stop.request_stop();
                });
            }
        }

        self.search_thread = Some(thread::spawn(move || {
            let mut position = position;
            let result = searcher.lock().go(&mut position, max_depth);
            match result.best_move {
                Some(mv) => println!("bestmove {}", mv.to_uci()),
                None => println!("bestmove 0000"),
            }
            io::stdout().flush().ok();
        }));
    }

    fn handle_setoption(&mut self, parts: &[&str]) {
        if let Some((name, value)) = options::parse_setoption(parts) {
            let changed = self.options.apply(&name, value.as_deref(), &mut self.config);
            if changed {
                self.searcher.lock().clear();
            }
        }
    }
}

/// Runs the blocking stdin/stdout UCI command loop until `quit` or EOF.
pub fn run() {
    let stdin = io::stdin();
    let mut engine = Engine::new();

    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(&command) = parts.first() else { continue };

        match command {
            "uci" => engine.options.print(),
            "isready" => println!("readyok"),
            "ucinewgame" => {
                engine.stop_search();
                engine.position = Position::new();
                engine.searcher.lock().clear();
            }
            "position" => parse_position_command(&mut engine.position, &parts),
            "go" => engine.handle_go(&parts),
            "setoption" => engine.handle_setoption(&parts),
            "stop" => engine.stop_search(),
            "quit" => {
                engine.stop_search();
                break;
            }
            _ => {}
        }
        io::stdout().flush().ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_depth_and_movetime() {
        let parts = ["go", "depth", "5", "movetime", "1000"];
        let params = parse_go_params(&parts);
        assert_eq!(params.depth, Some(5));
        assert_eq!(params.movetime, Some(1000));
    }

    #[test]
    fn allocates_nonzero_movetime_from_remaining_clock() {
        assert!(allocate_movetime(30_000, 0) > 0);
        assert_eq!(allocate_movetime(10, 0), 1);
    }

    #[test]
    fn position_command_sets_startpos_then_plays_moves() {
        let mut pos = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let parts = ["position", "startpos", "moves", "e2e4", "e7e5"];
        parse_position_command(&mut pos, &parts);
        assert_eq!(pos.turn(), crate::types::Color::White);
    }
}
