//! Player profile: race, home resources, and the gold/leadership ledger with
//! its artifact inventory.

use crate::constants::{LEADERSHIP_MAX, LEADERSHIP_MIN};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("not enough gold")]
    InsufficientGold,
    #[error("not enough resources")]
    InsufficientResources,
    #[error("artifact is not in the inventory")]
    UnknownArtifact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RaceStats {
    #[serde(default)]
    pub economy: i32,
    #[serde(default)]
    pub military: i32,
    #[serde(default)]
    pub defense: i32,
}

/// A playable faction. Catalog content lives with the host; the engine only
/// needs the id and stat block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Race {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub stats: RaceStats,
}

/// Home-village stockpile (distinct from the mission town's economy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Resources {
    #[serde(default)]
    pub wood: i64,
    #[serde(default)]
    pub stone: i64,
    #[serde(default)]
    pub iron: i64,
    #[serde(default)]
    pub food: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactSlot {
    Weapon,
    Armor,
    Accessory,
    Relic,
}

impl ArtifactSlot {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weapon => "weapon",
            Self::Armor => "armor",
            Self::Accessory => "accessory",
            Self::Relic => "relic",
        }
    }
}

impl fmt::Display for ArtifactSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: String,
    pub name: String,
    pub slot: ArtifactSlot,
    pub rarity: Rarity,
    #[serde(default)]
    pub military: i32,
    #[serde(default)]
    pub economy: i32,
    #[serde(default)]
    pub defense: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obtained_from: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerInventory {
    #[serde(default)]
    pub gold: i64,
    #[serde(default)]
    pub leadership: i32,
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
    /// Artifact id equipped per slot.
    #[serde(default)]
    pub equipped: Vec<(ArtifactSlot, String)>,
}

impl Default for PlayerInventory {
    fn default() -> Self {
        Self {
            gold: 50,
            leadership: 100,
            artifacts: Vec::new(),
            equipped: Vec::new(),
        }
    }
}

/// Whole player profile: one per game session, reset by constructing a fresh
/// default value (never by reusing a shared template).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    #[serde(default)]
    pub started: bool,
    #[serde(default)]
    pub race: Option<Race>,
    #[serde(default)]
    pub resources: Resources,
    #[serde(default)]
    pub inventory: PlayerInventory,
    #[serde(default)]
    pub population: u32,
    #[serde(default)]
    pub created_at_ms: Option<u64>,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            started: false,
            race: None,
            resources: Resources {
                wood: 100,
                stone: 100,
                iron: 50,
                food: 100,
            },
            inventory: PlayerInventory::default(),
            population: 10,
            created_at_ms: None,
        }
    }
}

impl PlayerState {
    /// Begin a new game with the chosen race: applies race start bonuses and
    /// the starting artifact grant.
    pub fn start_new_game(&mut self, race: Race, now_ms: u64) {
        *self = Self::default();
        self.started = true;
        self.created_at_ms = Some(now_ms);
        self.apply_race_bonuses(&race);
        self.grant_starting_artifact(&race);
        self.race = Some(race);
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::cast_sign_loss)]
    fn apply_race_bonuses(&mut self, race: &Race) {
        let scale = |value: i64, factor: f64| (value as f64 * factor).floor() as i64;
        match race.id.as_str() {
            "romans" => {
                self.resources.wood = scale(self.resources.wood, 1.15);
                self.resources.stone = scale(self.resources.stone, 1.2);
                self.resources.iron = scale(self.resources.iron, 1.15);
                self.resources.food = scale(self.resources.food, 1.1);
            }
            "gauls" => {
                self.resources.stone = scale(self.resources.stone, 1.3);
                self.resources.iron = scale(self.resources.iron, 1.2);
                self.resources.wood = scale(self.resources.wood, 1.1);
                self.population += 3;
            }
            "germans" => {
                self.resources.wood = scale(self.resources.wood, 0.9);
                self.resources.stone = scale(self.resources.stone, 0.8);
                self.resources.iron = scale(self.resources.iron, 1.1);
                self.resources.food = scale(self.resources.food, 0.9);
                self.population += 7;
            }
            _ => {}
        }
    }

    fn grant_starting_artifact(&mut self, race: &Race) {
        let artifact = match race.id.as_str() {
            "romans" => Some(Artifact {
                id: "roman-gladius".to_string(),
                name: "Roman Gladius".to_string(),
                slot: ArtifactSlot::Weapon,
                rarity: Rarity::Common,
                military: 5,
                economy: 2,
                defense: 0,
                obtained_from: Some("Roman starting equipment".to_string()),
            }),
            "gauls" => Some(Artifact {
                id: "gallic-shield".to_string(),
                name: "Gallic Shield".to_string(),
                slot: ArtifactSlot::Armor,
                rarity: Rarity::Common,
                military: 0,
                economy: 0,
                defense: 8,
                obtained_from: Some("Gallic starting equipment".to_string()),
            }),
            "germans" => Some(Artifact {
                id: "german-axe".to_string(),
                name: "Germanic Axe".to_string(),
                slot: ArtifactSlot::Weapon,
                rarity: Rarity::Common,
                military: 7,
                economy: 0,
                defense: 0,
                obtained_from: Some("Germanic starting equipment".to_string()),
            }),
            _ => None,
        };
        if let Some(artifact) = artifact {
            let slot = artifact.slot;
            let id = artifact.id.clone();
            self.inventory.artifacts.push(artifact);
            self.equip_by_id(slot, &id);
        }
        self.inventory.gold += 25;
        let leadership_shift = match race.id.as_str() {
            "romans" => 10,
            "gauls" => 5,
            "germans" => -5,
            _ => 0,
        };
        self.inventory.leadership =
            (self.inventory.leadership + leadership_shift).clamp(LEADERSHIP_MIN, LEADERSHIP_MAX);
    }

    pub fn add_gold(&mut self, amount: i64) {
        self.inventory.gold += amount;
    }

    pub fn spend_gold(&mut self, amount: i64) -> Result<(), LedgerError> {
        if self.inventory.gold < amount {
            return Err(LedgerError::InsufficientGold);
        }
        self.inventory.gold -= amount;
        Ok(())
    }

    /// Raise leadership, clamped to the ceiling.
    pub fn add_leadership(&mut self, amount: i32) {
        self.inventory.leadership = (self.inventory.leadership + amount).min(LEADERSHIP_MAX);
    }

    /// Lower leadership, clamped to the floor. Returns `true` when leadership
    /// is exhausted (the caller triggers the game-over path).
    #[must_use]
    pub fn lose_leadership(&mut self, amount: i32) -> bool {
        self.inventory.leadership -= amount;
        if self.inventory.leadership <= LEADERSHIP_MIN {
            self.inventory.leadership = LEADERSHIP_MIN;
            return true;
        }
        false
    }

    pub fn add_resources(&mut self, gained: &Resources) {
        self.resources.wood += gained.wood;
        self.resources.stone += gained.stone;
        self.resources.iron += gained.iron;
        self.resources.food += gained.food;
    }

    /// All-or-nothing spend across every requested kind.
    pub fn spend_resources(&mut self, cost: &Resources) -> Result<(), LedgerError> {
        if self.resources.wood < cost.wood
            || self.resources.stone < cost.stone
            || self.resources.iron < cost.iron
            || self.resources.food < cost.food
        {
            return Err(LedgerError::InsufficientResources);
        }
        self.resources.wood -= cost.wood;
        self.resources.stone -= cost.stone;
        self.resources.iron -= cost.iron;
        self.resources.food -= cost.food;
        Ok(())
    }

    pub fn add_artifact(&mut self, artifact: Artifact) {
        self.inventory.artifacts.push(artifact);
    }

    /// Equip an inventory artifact into its slot, replacing any previous one.
    pub fn equip_artifact(&mut self, artifact_id: &str) -> Result<(), LedgerError> {
        let slot = self
            .inventory
            .artifacts
            .iter()
            .find(|a| a.id == artifact_id)
            .map(|a| a.slot)
            .ok_or(LedgerError::UnknownArtifact)?;
        self.equip_by_id(slot, artifact_id);
        Ok(())
    }

    fn equip_by_id(&mut self, slot: ArtifactSlot, artifact_id: &str) {
        self.inventory.equipped.retain(|(s, _)| *s != slot);
        self.inventory
            .equipped
            .push((slot, artifact_id.to_string()));
    }

    pub fn unequip_slot(&mut self, slot: ArtifactSlot) {
        self.inventory.equipped.retain(|(s, _)| *s != slot);
    }

    #[must_use]
    pub fn equipped_artifacts(&self) -> Vec<&Artifact> {
        self.inventory
            .equipped
            .iter()
            .filter_map(|(_, id)| self.inventory.artifacts.iter().find(|a| &a.id == id))
            .collect()
    }
}
