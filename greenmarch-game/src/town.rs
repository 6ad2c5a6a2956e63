//! Town economy: wall-clock resource accrual, atomic spending, buildings and
//! unit training.
//!
//! Resource quantities are continuous non-negative reals internally and are
//! floored only for display. Accrual derives from `now - last_update`, never
//! from a tick counter, so long host gaps (app closed and reopened) resolve
//! correctly on the next update.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EconomyError {
    #[error("not enough resources")]
    InsufficientResources,
    #[error("building not found")]
    UnknownBuilding,
}

/// Resource quantities by kind. Also used for costs and production rates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TownResources {
    #[serde(default)]
    pub wood: f64,
    #[serde(default)]
    pub clay: f64,
    #[serde(default)]
    pub iron: f64,
    #[serde(default)]
    pub crop: f64,
}

impl TownResources {
    #[must_use]
    pub const fn new(wood: f64, clay: f64, iron: f64, crop: f64) -> Self {
        Self {
            wood,
            clay,
            iron,
            crop,
        }
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.wood + self.clay + self.iron + self.crop
    }

    fn covers(&self, cost: &Self) -> bool {
        self.wood >= cost.wood
            && self.clay >= cost.clay
            && self.iron >= cost.iron
            && self.crop >= cost.crop
    }

    fn add(&mut self, other: &Self) {
        self.wood += other.wood;
        self.clay += other.clay;
        self.iron += other.iron;
        self.crop += other.crop;
    }

    fn subtract(&mut self, other: &Self) {
        self.wood -= other.wood;
        self.clay -= other.clay;
        self.iron -= other.iron;
        self.crop -= other.crop;
    }

    /// Whole-unit quantities for display.
    #[must_use]
    pub fn display(&self) -> (i64, i64, i64, i64) {
        #[allow(clippy::cast_possible_truncation)]
        (
            self.wood.floor() as i64,
            self.clay.floor() as i64,
            self.iron.floor() as i64,
            self.crop.floor() as i64,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildingKind {
    Barracks,
    Stable,
    Workshop,
    Farm,
    Mine,
    Quarry,
    Lumbermill,
}

impl BuildingKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Barracks => "barracks",
            Self::Stable => "stable",
            Self::Workshop => "workshop",
            Self::Farm => "farm",
            Self::Mine => "mine",
            Self::Quarry => "quarry",
            Self::Lumbermill => "lumbermill",
        }
    }
}

impl fmt::Display for BuildingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TownBuilding {
    pub id: String,
    pub kind: BuildingKind,
    pub level: u32,
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Infantry,
    Archer,
    Cavalry,
    Siege,
}

impl UnitKind {
    /// Training cost per single unit.
    #[must_use]
    pub const fn cost(self) -> TownResources {
        match self {
            Self::Infantry => TownResources::new(20.0, 10.0, 30.0, 15.0),
            Self::Archer => TownResources::new(30.0, 15.0, 25.0, 20.0),
            Self::Cavalry => TownResources::new(50.0, 30.0, 60.0, 40.0),
            Self::Siege => TownResources::new(100.0, 80.0, 120.0, 60.0),
        }
    }

    /// (attack, defense, health) per unit.
    #[must_use]
    pub const fn stats(self) -> (i32, i32, i32) {
        match self {
            Self::Infantry => (40, 35, 100),
            Self::Archer => (25, 15, 80),
            Self::Cavalry => (100, 50, 150),
            Self::Siege => (200, 20, 300),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRoster {
    pub kind: UnitKind,
    pub count: u32,
    pub attack: i32,
    pub defense: i32,
    pub health: i32,
}

/// The mission town's full economic state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TownEconomy {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub resources: TownResources,
    /// Production rates per minute.
    #[serde(default)]
    pub production: TownResources,
    #[serde(default)]
    pub buildings: Vec<TownBuilding>,
    #[serde(default)]
    pub units: Vec<UnitRoster>,
    #[serde(default)]
    pub population: u32,
    /// Epoch ms of the last accrual application.
    #[serde(default)]
    pub last_update_ms: u64,
}

impl Default for TownEconomy {
    fn default() -> Self {
        Self::new(0)
    }
}

impl TownEconomy {
    /// Fresh base-camp town. Always built from scratch so no two instances
    /// share building or unit collections.
    #[must_use]
    pub fn new(now_ms: u64) -> Self {
        Self {
            name: "Base Camp".to_string(),
            resources: TownResources::new(500.0, 500.0, 300.0, 400.0),
            production: TownResources::new(50.0, 40.0, 30.0, 60.0),
            buildings: vec![
                TownBuilding {
                    id: "barracks-1".to_string(),
                    kind: BuildingKind::Barracks,
                    level: 1,
                    x: 2,
                    y: 2,
                },
                TownBuilding {
                    id: "farm-1".to_string(),
                    kind: BuildingKind::Farm,
                    level: 1,
                    x: 1,
                    y: 1,
                },
                TownBuilding {
                    id: "lumbermill-1".to_string(),
                    kind: BuildingKind::Lumbermill,
                    level: 1,
                    x: 3,
                    y: 1,
                },
            ],
            units: Vec::new(),
            population: 10,
            last_update_ms: now_ms,
        }
    }

    /// Apply production for the wall-clock time elapsed since the last
    /// update: `quantity += rate * elapsed_minutes` per resource.
    pub fn accrue(&mut self, now_ms: u64) {
        let elapsed_ms = now_ms.saturating_sub(self.last_update_ms);
        if elapsed_ms == 0 {
            return;
        }
        #[allow(clippy::cast_precision_loss)]
        let minutes = elapsed_ms as f64 / 60_000.0;
        self.resources.add(&TownResources::new(
            self.production.wood * minutes,
            self.production.clay * minutes,
            self.production.iron * minutes,
            self.production.crop * minutes,
        ));
        self.last_update_ms = now_ms;
    }

    pub fn add_resources(&mut self, gained: &TownResources) {
        self.resources.add(gained);
    }

    /// All-or-nothing spend: either every requested kind is covered and the
    /// whole cost is deducted, or nothing changes.
    pub fn spend(&mut self, cost: &TownResources) -> Result<(), EconomyError> {
        if !self.resources.covers(cost) {
            return Err(EconomyError::InsufficientResources);
        }
        self.resources.subtract(cost);
        Ok(())
    }

    #[must_use]
    pub fn building(&self, id: &str) -> Option<&TownBuilding> {
        self.buildings.iter().find(|b| b.id == id)
    }

    /// Upgrade a building, spending a level-scaled cost. Producer buildings
    /// raise their resource rate.
    pub fn upgrade_building(&mut self, id: &str) -> Result<u32, EconomyError> {
        let (idx, level, kind) = self
            .buildings
            .iter()
            .enumerate()
            .find(|(_, b)| b.id == id)
            .map(|(i, b)| (i, b.level, b.kind))
            .ok_or(EconomyError::UnknownBuilding)?;

        let cost = TownResources::new(
            f64::from(level) * 100.0,
            f64::from(level) * 80.0,
            f64::from(level) * 60.0,
            f64::from(level) * 40.0,
        );
        self.spend(&cost)?;

        let building = &mut self.buildings[idx];
        building.level += 1;
        match kind {
            BuildingKind::Lumbermill => self.production.wood += 10.0,
            BuildingKind::Quarry => self.production.clay += 8.0,
            BuildingKind::Mine => self.production.iron += 6.0,
            BuildingKind::Farm => self.production.crop += 12.0,
            _ => {}
        }
        Ok(building.level)
    }

    /// Train `count` units of a kind, spending their combined cost and merging
    /// them into the roster.
    pub fn train_units(&mut self, kind: UnitKind, count: u32) -> Result<(), EconomyError> {
        let unit_cost = kind.cost();
        let total = TownResources::new(
            unit_cost.wood * f64::from(count),
            unit_cost.clay * f64::from(count),
            unit_cost.iron * f64::from(count),
            unit_cost.crop * f64::from(count),
        );
        self.spend(&total)?;

        if let Some(existing) = self.units.iter_mut().find(|u| u.kind == kind) {
            existing.count += count;
        } else {
            let (attack, defense, health) = kind.stats();
            self.units.push(UnitRoster {
                kind,
                count,
                attack,
                defense,
                health,
            });
        }
        Ok(())
    }
}
