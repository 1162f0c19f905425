use corvus::perft::perft;
use corvus::position::Position;

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

#[test]
fn starting_position_perft_matches_known_counts() {
    let expected = [20u64, 400, 8_902, 197_281, 4_865_609];
    for (depth, &want) in (1..=5u32).zip(expected.iter()) {
        let mut pos = Position::new();
        assert_eq!(perft(&mut pos, depth), want, "perft({depth}) from startpos");
    }
}

#[test]
fn kiwipete_perft_depth_1_is_48() {
    let mut pos = Position::from_fen(KIWIPETE).unwrap();
    assert_eq!(perft(&mut pos, 1), 48);
}

#[test]
fn kiwipete_perft_depth_4_matches_known_count() {
    let mut pos = Position::from_fen(KIWIPETE).unwrap();
    assert_eq!(perft(&mut pos, 4), 4_085_603);
}
