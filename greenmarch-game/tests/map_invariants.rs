//! Seeded property sweep over the map generator's structural guarantees.

use greenmarch_game::constants::{CENTER_COL, MAP_ROWS};
use greenmarch_game::{MapLayer, NodeKind, generate_map, validate_connections};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::collections::HashSet;

const SWEEP_SEEDS: u64 = 100;

fn inbound_ids(layers: &[MapLayer], row: usize) -> HashSet<&str> {
    layers[row - 1]
        .nodes
        .iter()
        .flat_map(|node| node.connections.iter().map(String::as_str))
        .collect()
}

#[test]
fn every_generated_map_passes_the_edge_validator() {
    for seed in 0..SWEEP_SEEDS {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let map = generate_map(MAP_ROWS, &mut rng);
        assert!(validate_connections(&map), "seed {seed} produced a forbidden edge");
    }
}

#[test]
fn no_node_beyond_the_start_row_is_orphaned() {
    for seed in 0..SWEEP_SEEDS {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let map = generate_map(MAP_ROWS, &mut rng);
        for row in 1..map.len() {
            let inbound = inbound_ids(&map, row);
            for node in &map[row].nodes {
                assert!(
                    inbound.contains(node.id.as_str()),
                    "seed {seed}: node {} in row {row} has no inbound edge",
                    node.id
                );
            }
        }
    }
}

#[test]
fn no_node_before_the_last_row_is_a_dead_end() {
    for seed in 0..SWEEP_SEEDS {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let map = generate_map(MAP_ROWS, &mut rng);
        for layer in &map[..map.len() - 1] {
            for node in &layer.nodes {
                assert!(
                    !node.connections.is_empty(),
                    "seed {seed}: node {} in row {} has no outbound edge",
                    node.id,
                    layer.row
                );
            }
        }
    }
}

#[test]
fn connections_only_point_one_row_ahead() {
    for seed in 0..SWEEP_SEEDS {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let map = generate_map(MAP_ROWS, &mut rng);
        for (row, layer) in map.iter().enumerate() {
            let next_ids: HashSet<&str> = map
                .get(row + 1)
                .map(|next| next.nodes.iter().map(|n| n.id.as_str()).collect())
                .unwrap_or_default();
            for node in &layer.nodes {
                for conn in &node.connections {
                    assert!(
                        next_ids.contains(conn.as_str()),
                        "seed {seed}: edge {} -> {conn} skips a row",
                        node.id
                    );
                }
            }
        }
    }
}

#[test]
fn terminal_rows_are_fixed_single_nodes() {
    for seed in 0..SWEEP_SEEDS {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let map = generate_map(MAP_ROWS, &mut rng);

        assert_eq!(map[0].nodes.len(), 1, "seed {seed}");
        assert_eq!(map[0].nodes[0].kind, NodeKind::Combat, "seed {seed}");
        assert_eq!(map[0].nodes[0].col, CENTER_COL, "seed {seed}");

        let bosses: Vec<_> = map
            .iter()
            .flat_map(|layer| layer.nodes.iter())
            .filter(|node| node.kind == NodeKind::Boss)
            .collect();
        assert_eq!(bosses.len(), 1, "seed {seed}: exactly one boss");
        assert_eq!(bosses[0].row, MAP_ROWS - 1, "seed {seed}: boss in last row");
    }
}

#[test]
fn node_ids_are_unique_across_the_whole_map() {
    for seed in 0..SWEEP_SEEDS {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let map = generate_map(MAP_ROWS, &mut rng);
        let mut seen = HashSet::new();
        for layer in &map {
            for node in &layer.nodes {
                assert!(seen.insert(node.id.as_str()), "seed {seed}: duplicate {}", node.id);
            }
        }
    }
}

#[test]
fn generated_map_survives_a_serde_round_trip() {
    let mut rng = ChaCha20Rng::seed_from_u64(7);
    let map = generate_map(MAP_ROWS, &mut rng);
    let blob = serde_json::to_string(&map).expect("serialize");
    let restored: Vec<MapLayer> = serde_json::from_str(&blob).expect("deserialize");
    assert_eq!(restored, map);
}

#[test]
fn tiny_row_counts_are_clamped_to_a_playable_map() {
    let mut rng = ChaCha20Rng::seed_from_u64(13);
    let map = generate_map(0, &mut rng);
    assert_eq!(map.len(), 2);
    assert_eq!(map[0].nodes[0].kind, NodeKind::Combat);
    assert_eq!(map[1].nodes[0].kind, NodeKind::Boss);
    assert!(!map[0].nodes[0].connections.is_empty());
}
