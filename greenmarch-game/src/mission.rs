//! Mission descriptors handed off to the external mission collaborator.

use crate::mapgen::Reward;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissionDifficulty {
    Easy,
    Medium,
    Hard,
    Elite,
}

impl MissionDifficulty {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Elite => "elite",
        }
    }

    /// Leadership granted when a mission of this difficulty succeeds.
    #[must_use]
    pub const fn leadership_reward(self) -> i32 {
        match self {
            Self::Easy => 5,
            Self::Medium => 10,
            Self::Hard => 15,
            Self::Elite => 25,
        }
    }
}

impl fmt::Display for MissionDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Penalty applied when a mission is lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MissionPenalty {
    #[serde(default)]
    pub gold: i64,
    #[serde(default)]
    pub leadership: i32,
}

/// Everything the external mission collaborator needs to run an encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionDescriptor {
    pub node_id: String,
    pub name: String,
    pub difficulty: MissionDifficulty,
    pub narrative: String,
    /// Node reward granted on success, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward: Option<Reward>,
    #[serde(default)]
    pub penalty: MissionPenalty,
}

/// Tracks the mission currently in flight, if any.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MissionLog {
    #[serde(default)]
    pub current: Option<MissionDescriptor>,
    #[serde(default)]
    pub in_mission: bool,
}

impl MissionLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, descriptor: MissionDescriptor) {
        self.current = Some(descriptor);
        self.in_mission = true;
    }

    /// Clear the active mission, returning its descriptor.
    pub fn finish(&mut self) -> Option<MissionDescriptor> {
        self.in_mission = false;
        self.current.take()
    }
}
