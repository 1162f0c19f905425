//! Benchmarks for perft, move generation, search, and evaluation.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use corvus::config::EngineConfig;
use corvus::eval::evaluate;
use corvus::perft::perft;
use corvus::position::Position;
use corvus::search::Searcher;

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
const MIDDLEGAME: &str = "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4";

fn bench_perft(c: &mut Criterion) {
    let mut group = c.benchmark_group("perft");

    for depth in 1..=4 {
        group.bench_with_input(BenchmarkId::new("startpos", depth), &depth, |b, &depth| {
            b.iter(|| perft(&mut Position::new(), black_box(depth)))
        });
    }

    for depth in 1..=3 {
        group.bench_with_input(BenchmarkId::new("kiwipete", depth), &depth, |b, &depth| {
            b.iter(|| perft(&mut Position::from_fen(KIWIPETE).unwrap(), black_box(depth)))
        });
    }

    group.finish();
}

fn bench_movegen(c: &mut Criterion) {
    let mut group = c.benchmark_group("movegen");

    let startpos = Position::new();
    group.bench_function("startpos", |b| b.iter(|| black_box(startpos.legal_moves())));

    let middlegame = Position::from_fen(MIDDLEGAME).unwrap();
    group.bench_function("middlegame", |b| b.iter(|| black_box(middlegame.legal_moves())));

    let kiwipete = Position::from_fen(KIWIPETE).unwrap();
    group.bench_function("kiwipete", |b| b.iter(|| black_box(kiwipete.legal_moves())));

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    group.sample_size(10);

    for depth in [3, 4, 5] {
        group.bench_with_input(BenchmarkId::new("startpos", depth), &depth, |b, &depth| {
            b.iter(|| {
                let mut pos = Position::new();
                let mut searcher = Searcher::new(EngineConfig::default());
                searcher.go(&mut pos, depth)
            })
        });
    }

    for depth in [3, 4] {
        group.bench_with_input(BenchmarkId::new("tactical", depth), &depth, |b, &depth| {
            b.iter(|| {
                let mut pos =
                    Position::from_fen("r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4")
                        .unwrap();
                let mut searcher = Searcher::new(EngineConfig::default());
                searcher.go(&mut pos, depth)
            })
        });
    }

    group.finish();
}

fn bench_eval(c: &mut Criterion) {
    let mut group = c.benchmark_group("eval");

    let positions = [
        ("startpos", "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
        ("middlegame", MIDDLEGAME),
        ("endgame", "8/5k2/8/8/8/8/5K2/4R3 w - - 0 1"),
    ];

    for (name, fen) in positions {
        let pos = Position::from_fen(fen).unwrap();
        group.bench_with_input(BenchmarkId::new("position", name), &pos, |b, pos| {
            b.iter(|| black_box(evaluate(pos)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_perft, bench_movegen, bench_search, bench_eval);
criterion_main!(benches);
