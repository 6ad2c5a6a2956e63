//! Procedural campaign map generation.
//!
//! Produces a layered, branching graph of encounter nodes with three vertical
//! lanes (military / balanced / economic), periodic convergence rows, and two
//! hard guarantees: every node beyond row 0 keeps at least one inbound edge,
//! and the two extreme lanes (columns 0 and 4) are never directly connected.

use crate::constants::{
    CENTER_COL, CONVERGENCE_CROSS_CHANCE, CONVERGENCE_INTERVAL, LANE_COLS, LANE_CROSS_CHANCE,
    REST_HEALTH_GAIN,
};
use crate::random::{WeightedTable, pick};
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Combat,
    Elite,
    Shop,
    Event,
    Rest,
    Boss,
}

impl NodeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Combat => "combat",
            Self::Elite => "elite",
            Self::Shop => "shop",
            Self::Event => "event",
            Self::Rest => "rest",
            Self::Boss => "boss",
        }
    }

    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Combat => "⚔️",
            Self::Elite => "👑",
            Self::Shop => "🏪",
            Self::Event => "❓",
            Self::Rest => "🏕️",
            Self::Boss => "💀",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical grouping of a node by column, governing its type-probability table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lane {
    Military,
    Balanced,
    Economic,
}

impl Lane {
    #[must_use]
    pub const fn from_col(col: u8) -> Self {
        match col {
            0 => Self::Military,
            4 => Self::Economic,
            _ => Self::Balanced,
        }
    }
}

/// Reward attached to a node at generation time, granted when the node resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reward {
    Gold { amount: i64 },
    Card { name: String },
    Relic { name: String },
    Health { amount: i32 },
}

/// A single encounter point in the branching progression graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapNode {
    pub id: String,
    pub kind: NodeKind,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub row: usize,
    pub col: u8,
    /// Ordered ids of downstream nodes (directed edges, row + 1 only).
    #[serde(default)]
    pub connections: SmallVec<[String; 4]>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub accessible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward: Option<Reward>,
}

impl MapNode {
    #[must_use]
    pub const fn lane(&self) -> Lane {
        Lane::from_col(self.col)
    }
}

/// One row of the campaign map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapLayer {
    pub row: usize,
    pub nodes: Vec<MapNode>,
}

const COMBAT_TITLES: [&str; 4] = [
    "Enemy Patrol",
    "Ambush",
    "Border Guard",
    "Hostile Scouts",
];
const COMBAT_DESCS: [&str; 4] = [
    "A band of enemies blocks your path",
    "Adversaries burst from the undergrowth",
    "The guards challenge you",
    "Outriders try to stop your advance",
];
const ELITE_TITLES: [&str; 4] = [
    "Enemy Champion",
    "Opposing General",
    "Legendary Hero",
    "Elite Commander",
];
const ELITE_DESCS: [&str; 4] = [
    "A fearsome adversary awaits you",
    "A seasoned warlord takes the field",
    "A living legend stands in your way",
    "A renowned strategist bars the road",
];
const SHOP_TITLES: [&str; 4] = [
    "Travelling Merchant",
    "Local Smith",
    "Trade Caravan",
    "Mystic Bazaar",
];
const SHOP_DESCS: [&str; 4] = [
    "A trader offers their services",
    "An artisan offers their wares",
    "Merchants make a roadside halt",
    "Rare goods are on display",
];
const EVENT_TITLES: [&str; 4] = [
    "Strange Encounter",
    "Ancient Discovery",
    "Hard Choice",
    "Unexpected Turn",
];
const EVENT_DESCS: [&str; 4] = [
    "Something strange is happening",
    "You stumble upon ancient ruins",
    "A decision forces itself on you",
    "Fate puts you to the test",
];
const REST_TITLES: [&str; 4] = [
    "Safe Camp",
    "Sacred Spring",
    "Natural Refuge",
    "Quiet Haven",
];
const REST_DESCS: [&str; 4] = [
    "A place to recover your strength",
    "A spring with healing properties",
    "A shelter away from danger",
    "A peaceful spot to rest",
];
const BOSS_TITLES: [&str; 4] = [
    "Warlord",
    "Ancient Dragon",
    "High Necromancer",
    "Fallen Emperor",
];
const BOSS_DESCS: [&str; 4] = [
    "The final enemy awaits",
    "A legendary creature guards the hoard",
    "The master of the dark host",
    "The last obstacle before victory",
];

const RELIC_NAME: &str = "Ancient Relic";
const CARD_NAME: &str = "Mystic Card";

const fn display_tables(kind: NodeKind) -> (&'static [&'static str; 4], &'static [&'static str; 4]) {
    match kind {
        NodeKind::Combat => (&COMBAT_TITLES, &COMBAT_DESCS),
        NodeKind::Elite => (&ELITE_TITLES, &ELITE_DESCS),
        NodeKind::Shop => (&SHOP_TITLES, &SHOP_DESCS),
        NodeKind::Event => (&EVENT_TITLES, &EVENT_DESCS),
        NodeKind::Rest => (&REST_TITLES, &REST_DESCS),
        NodeKind::Boss => (&BOSS_TITLES, &BOSS_DESCS),
    }
}

/// Direct edges between the two extreme lanes are never permitted.
#[must_use]
pub const fn is_forbidden_connection(source_col: u8, target_col: u8) -> bool {
    (source_col == 0 && target_col == 4) || (source_col == 4 && target_col == 0)
}

/// Per-lane node-type weight tables (percentages).
fn kind_table(lane: Lane) -> WeightedTable<NodeKind> {
    match lane {
        Lane::Military => WeightedTable::new(vec![
            (60, NodeKind::Combat),
            (25, NodeKind::Elite),
            (15, NodeKind::Rest),
        ]),
        Lane::Economic => WeightedTable::new(vec![
            (40, NodeKind::Shop),
            (30, NodeKind::Event),
            (20, NodeKind::Combat),
            (10, NodeKind::Rest),
        ]),
        Lane::Balanced => WeightedTable::new(vec![
            (35, NodeKind::Combat),
            (20, NodeKind::Shop),
            (20, NodeKind::Event),
            (15, NodeKind::Elite),
            (10, NodeKind::Rest),
        ]),
    }
}

fn roll_reward<R: Rng + ?Sized>(kind: NodeKind, rng: &mut R) -> Option<Reward> {
    match kind {
        NodeKind::Combat => Some(Reward::Gold {
            amount: rng.gen_range(25..=74),
        }),
        NodeKind::Elite => Some(Reward::Relic {
            name: RELIC_NAME.to_string(),
        }),
        NodeKind::Event => Some(if rng.gen_bool(0.5) {
            Reward::Card {
                name: CARD_NAME.to_string(),
            }
        } else {
            Reward::Gold {
                amount: rng.gen_range(50..=149),
            }
        }),
        NodeKind::Rest => Some(Reward::Health {
            amount: REST_HEALTH_GAIN,
        }),
        NodeKind::Shop | NodeKind::Boss => None,
    }
}

fn make_node<R: Rng + ?Sized>(
    id_counter: &mut u32,
    kind: NodeKind,
    row: usize,
    col: u8,
    rng: &mut R,
) -> MapNode {
    let (titles, descs) = display_tables(kind);
    let title = pick(rng, titles.as_slice()).copied().unwrap_or_default();
    let description = pick(rng, descs.as_slice()).copied().unwrap_or_default();
    let node = MapNode {
        id: format!("node_{id_counter}"),
        kind,
        title: title.to_string(),
        description: description.to_string(),
        icon: kind.icon().to_string(),
        row,
        col,
        connections: SmallVec::new(),
        completed: false,
        accessible: false,
        reward: roll_reward(kind, rng),
    };
    *id_counter += 1;
    node
}

const fn is_convergence_row(row: usize) -> bool {
    row % CONVERGENCE_INTERVAL == CONVERGENCE_INTERVAL - 1
}

/// Generate a campaign map of `rows` layers. Row/column layout is
/// deterministic apart from convergence-row width; node types, rewards and
/// connection topology come from `rng`. Pure: no side effects beyond the RNG.
pub fn generate_map<R: Rng + ?Sized>(rows: usize, rng: &mut R) -> Vec<MapLayer> {
    let rows = rows.max(2);
    let mut id_counter = 1u32;
    let mut layers: Vec<MapLayer> = Vec::with_capacity(rows);

    for row in 0..rows {
        let is_first = row == 0;
        let is_last = row == rows - 1;

        let cols: SmallVec<[u8; 3]> = if is_first || is_last {
            SmallVec::from_slice(&[CENTER_COL])
        } else if is_convergence_row(row) {
            if rng.gen_bool(0.5) {
                SmallVec::from_slice(&[CENTER_COL])
            } else {
                SmallVec::from_slice(&[1, 3])
            }
        } else {
            SmallVec::from_slice(&LANE_COLS)
        };

        let mut nodes = Vec::with_capacity(cols.len());
        for &col in &cols {
            let kind = if is_last {
                NodeKind::Boss
            } else if is_first {
                NodeKind::Combat
            } else {
                kind_table(Lane::from_col(col))
                    .choose(rng)
                    .unwrap_or(NodeKind::Combat)
            };
            nodes.push(make_node(&mut id_counter, kind, row, col, rng));
        }
        layers.push(MapLayer { row, nodes });
    }

    generate_connections(&mut layers, rng);
    layers
}

fn generate_connections<R: Rng + ?Sized>(layers: &mut [MapLayer], rng: &mut R) {
    for row in 0..layers.len().saturating_sub(1) {
        let targets: Vec<(String, u8)> = layers[row + 1]
            .nodes
            .iter()
            .map(|n| (n.id.clone(), n.col))
            .collect();
        let is_first = row == 0;
        let current_converges = is_convergence_row(row);
        let next_converges = is_convergence_row(row + 1);

        for node in &mut layers[row].nodes {
            if is_first || current_converges {
                // Fan back out across every open lane.
                for (id, _) in &targets {
                    node.connections.push(id.clone());
                }
            } else if next_converges {
                connect_into_convergence(node, &targets, rng);
            } else {
                connect_along_lane(node, &targets, rng);
            }
        }

        repair_row_transition(layers, row);
    }
}

/// Lanes funnel into the convergence row's center node, with an occasional
/// extra edge into a flanking node.
fn connect_into_convergence<R: Rng + ?Sized>(
    node: &mut MapNode,
    targets: &[(String, u8)],
    rng: &mut R,
) {
    let Some((main_id, _)) = targets
        .iter()
        .find(|(_, col)| *col == CENTER_COL)
        .or_else(|| targets.first())
    else {
        return;
    };
    node.connections.push(main_id.clone());

    if targets.len() > 1 && rng.gen_bool(CONVERGENCE_CROSS_CHANCE) {
        let cross = targets.iter().find(|(id, col)| {
            *col != CENTER_COL && id != main_id && !is_forbidden_connection(node.col, *col)
        });
        if let Some((cross_id, _)) = cross {
            node.connections.push(cross_id.clone());
        }
    }
}

/// Normal rows follow their own lane, with an occasional cross-lane edge.
fn connect_along_lane<R: Rng + ?Sized>(node: &mut MapNode, targets: &[(String, u8)], rng: &mut R) {
    let lane = node.lane();
    let same_lane: Vec<&(String, u8)> = targets
        .iter()
        .filter(|(_, col)| Lane::from_col(*col) == lane)
        .collect();
    if let Some((main_id, _)) = pick(rng, &same_lane) {
        node.connections.push(main_id.clone());
    } else {
        // No same-lane target ahead; take the nearest legal one instead of
        // leaving a dead end.
        let nearest = targets
            .iter()
            .filter(|(_, col)| !is_forbidden_connection(node.col, *col))
            .min_by_key(|(_, col)| node.col.abs_diff(*col));
        if let Some((main_id, _)) = nearest {
            node.connections.push(main_id.clone());
        }
    }

    if rng.gen_bool(LANE_CROSS_CHANCE) {
        let cross: Vec<&(String, u8)> = targets
            .iter()
            .filter(|(id, col)| {
                Lane::from_col(*col) != lane
                    && !node.connections.iter().any(|c| c == id)
                    && !is_forbidden_connection(node.col, *col)
            })
            .collect();
        if let Some((cross_id, _)) = pick(rng, &cross) {
            node.connections.push(cross_id.clone());
        }
    }
}

/// Guarantee every node in `row + 1` has at least one inbound edge, without
/// ever introducing a forbidden extreme-lane pair.
fn repair_row_transition(layers: &mut [MapLayer], row: usize) {
    let orphan_targets: Vec<(String, u8)> = layers[row + 1]
        .nodes
        .iter()
        .filter(|target| {
            !layers[row]
                .nodes
                .iter()
                .any(|source| source.connections.iter().any(|c| c == &target.id))
        })
        .map(|target| (target.id.clone(), target.col))
        .collect();

    for (target_id, target_col) in orphan_targets {
        let sources = &mut layers[row].nodes;
        if sources.is_empty() {
            continue;
        }

        // Nearest valid source by column distance; first found wins ties.
        let mut best: Option<usize> = None;
        for (idx, source) in sources.iter().enumerate() {
            if is_forbidden_connection(source.col, target_col) {
                continue;
            }
            let dist = source.col.abs_diff(target_col);
            if best.is_none_or(|b| dist < sources[b].col.abs_diff(target_col)) {
                best = Some(idx);
            }
        }

        let source_idx = best
            .or_else(|| sources.iter().position(|s| s.col == CENTER_COL))
            .unwrap_or(0);
        log::debug!(
            "map repair: connecting {} (col {}) -> {target_id} (col {target_col})",
            sources[source_idx].id,
            sources[source_idx].col
        );
        sources[source_idx].connections.push(target_id);
    }
}

/// Walk every edge and reject maps containing a forbidden extreme-lane pair.
/// Pure checker for catching generator bugs, not a runtime repair.
#[must_use]
pub fn validate_connections(layers: &[MapLayer]) -> bool {
    let cols_by_id: std::collections::HashMap<&str, u8> = layers
        .iter()
        .flat_map(|layer| layer.nodes.iter().map(|n| (n.id.as_str(), n.col)))
        .collect();

    for layer in layers {
        for node in &layer.nodes {
            for conn in &node.connections {
                if let Some(&target_col) = cols_by_id.get(conn.as_str())
                    && is_forbidden_connection(node.col, target_col)
                {
                    log::warn!(
                        "forbidden connection: {} (col {}) -> {conn} (col {target_col})",
                        node.id,
                        node.col
                    );
                    return false;
                }
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAP_ROWS;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn lanes_map_to_columns() {
        assert_eq!(Lane::from_col(0), Lane::Military);
        assert_eq!(Lane::from_col(4), Lane::Economic);
        for col in 1..=3 {
            assert_eq!(Lane::from_col(col), Lane::Balanced);
        }
    }

    #[test]
    fn forbidden_pairs_are_symmetric() {
        assert!(is_forbidden_connection(0, 4));
        assert!(is_forbidden_connection(4, 0));
        assert!(!is_forbidden_connection(0, 2));
        assert!(!is_forbidden_connection(2, 4));
        assert!(!is_forbidden_connection(0, 0));
    }

    #[test]
    fn layout_matches_row_policy() {
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let map = generate_map(MAP_ROWS, &mut rng);
        assert_eq!(map.len(), MAP_ROWS);

        assert_eq!(map[0].nodes.len(), 1);
        assert_eq!(map[0].nodes[0].col, CENTER_COL);
        assert_eq!(map[0].nodes[0].kind, NodeKind::Combat);

        let last = &map[MAP_ROWS - 1];
        assert_eq!(last.nodes.len(), 1);
        assert_eq!(last.nodes[0].kind, NodeKind::Boss);

        for layer in &map[1..MAP_ROWS - 1] {
            if is_convergence_row(layer.row) {
                let cols: Vec<u8> = layer.nodes.iter().map(|n| n.col).collect();
                assert!(cols == vec![CENTER_COL] || cols == vec![1, 3], "row {}", layer.row);
            } else {
                let cols: Vec<u8> = layer.nodes.iter().map(|n| n.col).collect();
                assert_eq!(cols, LANE_COLS.to_vec(), "row {}", layer.row);
            }
        }
    }

    #[test]
    fn rewards_are_keyed_by_kind() {
        let mut rng = ChaCha20Rng::seed_from_u64(21);
        for _ in 0..200 {
            match roll_reward(NodeKind::Combat, &mut rng) {
                Some(Reward::Gold { amount }) => assert!((25..=74).contains(&amount)),
                other => panic!("combat reward {other:?}"),
            }
            match roll_reward(NodeKind::Event, &mut rng) {
                Some(Reward::Card { .. }) => {}
                Some(Reward::Gold { amount }) => assert!((50..=149).contains(&amount)),
                other => panic!("event reward {other:?}"),
            }
        }
        assert!(matches!(
            roll_reward(NodeKind::Elite, &mut rng),
            Some(Reward::Relic { .. })
        ));
        assert_eq!(
            roll_reward(NodeKind::Rest, &mut rng),
            Some(Reward::Health {
                amount: REST_HEALTH_GAIN
            })
        );
        assert!(roll_reward(NodeKind::Shop, &mut rng).is_none());
        assert!(roll_reward(NodeKind::Boss, &mut rng).is_none());
    }

    #[test]
    fn validator_flags_planted_forbidden_edge() {
        let mut rng = ChaCha20Rng::seed_from_u64(31);
        let mut map = generate_map(MAP_ROWS, &mut rng);
        assert!(validate_connections(&map));

        // Plant an illegal edge between the extremes of two normal rows.
        let target_id = map[2]
            .nodes
            .iter()
            .find(|n| n.col == 4)
            .map(|n| n.id.clone())
            .expect("normal row has an economic node");
        let source = map[1]
            .nodes
            .iter_mut()
            .find(|n| n.col == 0)
            .expect("normal row has a military node");
        source.connections.push(target_id);
        assert!(!validate_connections(&map));
    }

    #[test]
    fn node_ids_are_unique() {
        let mut rng = ChaCha20Rng::seed_from_u64(41);
        let map = generate_map(MAP_ROWS, &mut rng);
        let mut seen = std::collections::HashSet::new();
        for layer in &map {
            for node in &layer.nodes {
                assert!(seen.insert(node.id.clone()), "duplicate id {}", node.id);
            }
        }
    }
}
