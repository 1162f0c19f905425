use std::io::Write;
use std::process::{Command, Stdio};

use corvus::position::Position;

#[test]
fn uci_smoke_test_returns_legal_move() {
    let exe = env!("CARGO_BIN_EXE_corvus-uci");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("failed to spawn engine binary");

    let input = b"uci\nisready\nposition startpos moves e2e4\ngo movetime 50\nquit\n";
    child.stdin.as_mut().unwrap().write_all(input).unwrap();

    let output = child.wait_with_output().expect("failed to read output");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("uciok"));
    assert!(stdout.contains("readyok"));

    let bestmove = stdout
        .lines()
        .filter(|line| line.starts_with("bestmove"))
        .last()
        .expect("no bestmove found");
    let parts: Vec<&str> = bestmove.split_whitespace().collect();
    assert!(parts.len() >= 2, "bestmove missing move: {bestmove}");
    let mv = parts[1];
    assert_ne!(mv, "0000", "engine returned null move");

    let mut pos = Position::new();
    pos.make_uci("e2e4").unwrap();
    let legal = pos.legal_moves().into_iter().any(|m| m.to_uci() == mv);
    assert!(legal, "bestmove not legal in position: {mv}");
}

#[test]
fn uci_fixed_depth_search_completes_and_quits() {
    let exe = env!("CARGO_BIN_EXE_corvus-uci");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("failed to spawn engine binary");

    let input = b"uci\nucinewgame\nposition fen 6k1/5ppp/8/8/8/8/8/R6K w - - 0 1\ngo depth 1\nquit\n";
    child.stdin.as_mut().unwrap().write_all(input).unwrap();
    let output = child.wait_with_output().expect("failed to read output");
    let stdout = String::from_utf8_lossy(&output.stdout);

    let bestmove = stdout
        .lines()
        .filter(|line| line.starts_with("bestmove"))
        .last()
        .expect("no bestmove found");
    assert!(bestmove.contains("a1a8"), "expected the mating rook lift, got: {bestmove}");
}

#[test]
fn uci_setoption_hash_is_accepted_without_crashing() {
    let exe = env!("CARGO_BIN_EXE_corvus-uci");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("failed to spawn engine binary");

    let input = b"uci\nsetoption name Hash value 16\nisready\nquit\n";
    child.stdin.as_mut().unwrap().write_all(input).unwrap();
    let output = child.wait_with_output().expect("failed to read output");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("readyok"));
}
