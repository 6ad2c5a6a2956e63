//! Campaign progression state machine.
//!
//! Tracks which map nodes are accessible and completed, advances the player
//! row by row, and emits typed events for node side effects. The state machine
//! never touches other subsystems directly; the session layer dispatches its
//! events to the ledger and the external mission/navigation collaborators.

use crate::constants::{COMBAT_PENALTY_RANGE, ELITE_PENALTY_RANGE, MAP_ROWS, REST_LEADERSHIP_GAIN};
use crate::mapgen::{MapLayer, MapNode, NodeKind, Reward, generate_map, validate_connections};
use crate::mission::{MissionDescriptor, MissionDifficulty, MissionPenalty};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Side effect requested by a node selection, handled by the orchestration
/// layer that owns the other subsystems.
#[derive(Debug, Clone, PartialEq)]
pub enum CampaignEvent {
    /// Combat or elite node: hand off to the mission collaborator.
    MissionRequested(MissionDescriptor),
    GoldGranted { amount: i64 },
    /// Event/elite artifact grants (cards and relics both land in the inventory).
    ArtifactGranted { name: String },
    HealthGranted { amount: i32 },
    LeadershipGranted { amount: i32 },
    /// Shop nodes have no automatic effect; the host decides what to present.
    ShopEntered { node_id: String },
    /// Boss defeated: the run is complete, signal victory to navigation.
    Victory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectError {
    #[error("unknown node id")]
    UnknownNode,
    #[error("node is not accessible")]
    NotAccessible,
    #[error("node is already completed")]
    AlreadyCompleted,
}

/// One traversal of one generated map. Reset by building a fresh value from
/// `new_run`; never reset by mutating a shared template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignState {
    #[serde(default)]
    pub layers: Vec<MapLayer>,
    #[serde(default)]
    pub current_row: usize,
    #[serde(default)]
    pub selected_node_id: Option<String>,
    #[serde(default)]
    pub map_generated: bool,
    #[serde(default)]
    pub run_completed: bool,
}

impl Default for CampaignState {
    fn default() -> Self {
        Self {
            layers: Vec::new(),
            current_row: 0,
            selected_node_id: None,
            map_generated: false,
            run_completed: false,
        }
    }
}

impl CampaignState {
    /// Generate a fresh map and open the starting node.
    pub fn new_run<R: Rng + ?Sized>(rows: usize, rng: &mut R) -> Self {
        let mut layers = generate_map(rows, rng);
        debug_assert!(
            validate_connections(&layers),
            "generator produced a forbidden connection"
        );
        if let Some(start) = layers.first_mut().and_then(|layer| layer.nodes.first_mut()) {
            start.accessible = true;
        }
        Self {
            layers,
            current_row: 0,
            selected_node_id: None,
            map_generated: true,
            run_completed: false,
        }
    }

    /// Default-sized run.
    pub fn new_default_run<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::new_run(MAP_ROWS, rng)
    }

    #[must_use]
    pub fn node(&self, id: &str) -> Option<&MapNode> {
        self.layers
            .iter()
            .flat_map(|layer| layer.nodes.iter())
            .find(|node| node.id == id)
    }

    fn node_mut(&mut self, id: &str) -> Option<&mut MapNode> {
        self.layers
            .iter_mut()
            .flat_map(|layer| layer.nodes.iter_mut())
            .find(|node| node.id == id)
    }

    /// Ids of nodes the player may currently pick.
    #[must_use]
    pub fn accessible_nodes(&self) -> Vec<&MapNode> {
        self.layers
            .iter()
            .flat_map(|layer| layer.nodes.iter())
            .filter(|node| node.accessible && !node.completed)
            .collect()
    }

    /// Select an accessible, not-yet-completed node. On success the node is
    /// marked completed, abandoned same-row branches close, downstream
    /// connections open, and the node's side effects are returned as events.
    /// Rejections leave the state untouched.
    pub fn select_node<R: Rng + ?Sized>(
        &mut self,
        id: &str,
        rng: &mut R,
    ) -> Result<Vec<CampaignEvent>, SelectError> {
        let node = self.node(id).ok_or(SelectError::UnknownNode)?;
        if node.completed {
            return Err(SelectError::AlreadyCompleted);
        }
        if !node.accessible {
            return Err(SelectError::NotAccessible);
        }

        let row = node.row;
        let kind = node.kind;
        let title = node.title.clone();
        let narrative = node.description.clone();
        let reward = node.reward.clone();
        let connections: Vec<String> = node.connections.iter().cloned().collect();

        if let Some(node) = self.node_mut(id) {
            node.completed = true;
        }
        self.selected_node_id = Some(id.to_string());
        self.current_row = row;

        // Abandoned branches in the same row close for the rest of the run.
        if let Some(layer) = self.layers.iter_mut().find(|layer| layer.row == row) {
            for sibling in layer.nodes.iter_mut().filter(|n| !n.completed) {
                sibling.accessible = false;
            }
        }

        // Opening listed connections is the only way the frontier grows.
        for conn in &connections {
            if let Some(target) = self.node_mut(conn)
                && !target.completed
            {
                target.accessible = true;
            }
        }

        Ok(self.node_effects(id, kind, title, narrative, reward, rng))
    }

    fn node_effects<R: Rng + ?Sized>(
        &mut self,
        id: &str,
        kind: NodeKind,
        title: String,
        narrative: String,
        reward: Option<Reward>,
        rng: &mut R,
    ) -> Vec<CampaignEvent> {
        match kind {
            NodeKind::Combat | NodeKind::Elite => {
                let (difficulty, (lo, hi)) = if kind == NodeKind::Elite {
                    (MissionDifficulty::Elite, ELITE_PENALTY_RANGE)
                } else {
                    (MissionDifficulty::Medium, COMBAT_PENALTY_RANGE)
                };
                vec![CampaignEvent::MissionRequested(MissionDescriptor {
                    node_id: id.to_string(),
                    name: title,
                    difficulty,
                    narrative,
                    reward,
                    penalty: MissionPenalty {
                        gold: 0,
                        leadership: rng.gen_range(lo..=hi),
                    },
                })]
            }
            NodeKind::Event => match reward {
                Some(Reward::Gold { amount }) => vec![CampaignEvent::GoldGranted { amount }],
                Some(Reward::Card { name } | Reward::Relic { name }) => {
                    vec![CampaignEvent::ArtifactGranted { name }]
                }
                _ => Vec::new(),
            },
            NodeKind::Rest => {
                let amount = match reward {
                    Some(Reward::Health { amount }) => amount,
                    _ => 0,
                };
                vec![
                    CampaignEvent::HealthGranted { amount },
                    CampaignEvent::LeadershipGranted {
                        amount: REST_LEADERSHIP_GAIN,
                    },
                ]
            }
            NodeKind::Shop => vec![CampaignEvent::ShopEntered {
                node_id: id.to_string(),
            }],
            NodeKind::Boss => {
                self.run_completed = true;
                vec![CampaignEvent::Victory]
            }
        }
    }
}
