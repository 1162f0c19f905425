//! Perft-divide utility: prints per-root-move leaf counts for a FEN and
//! depth, for diffing against a reference engine's output when move
//! generation is suspected of a bug.

use std::env;
use std::time::Instant;

use corvus::constants::STARTING_FEN;
use corvus::perft::{perft_divide, perft};
use corvus::position::Position;

fn main() {
    let mut args = env::args().skip(1);
    let fen = args.next().unwrap_or_else(|| STARTING_FEN.to_string());
    let depth: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(3);

    let mut pos = match Position::from_fen(&fen) {
        Ok(pos) => pos,
        Err(err) => {
            eprintln!("invalid FEN '{fen}': {err}");
            std::process::exit(1);
        }
    };

    println!("perft divide depth {depth} from {fen}");
    let start = Instant::now();
    let mut total = 0u64;
    for (mv, nodes) in perft_divide(&mut pos, depth) {
        println!("  {}: {}", mv.to_uci(), nodes);
        total += nodes;
    }
    let elapsed = start.elapsed();
    let recomputed = perft(&mut pos, depth);
    debug_assert_eq!(total, recomputed, "divide total must match perft(depth)");
    println!("total: {total} in {elapsed:?}");
}
