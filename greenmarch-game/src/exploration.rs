//! Exploration state: point-limited tile reveals, lazy point regeneration,
//! and terrain-keyed scouting intelligence.
//!
//! All elapsed-time effects derive from `now - stored timestamp`; there is no
//! tick counter, so state stays correct across arbitrarily long host gaps.

use crate::constants::{EXPLORATION_REGEN_INTERVAL_MS, MAX_EXPLORATION_POINTS};
use crate::terrain::{TerrainGrid, TerrainKind};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExploreError {
    #[error("not enough exploration points")]
    InsufficientPoints,
    #[error("no unexplored area nearby")]
    NothingToExplore,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoutError {
    #[error("tile not found")]
    UnknownTile,
    #[error("tile has not been explored yet")]
    Unexplored,
}

/// Strength-rated enemy sighting from a scout report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemySighting {
    pub unit: String,
    pub strength: i32,
}

/// Resource estimate attached to a scout report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceEstimate {
    #[serde(default)]
    pub gold: i64,
    #[serde(default)]
    pub wood: i64,
    #[serde(default)]
    pub iron: i64,
}

/// Terrain-keyed intelligence returned by `scout_tile`. Values are rolled
/// fresh on every call, never cached.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoutReport {
    #[serde(default)]
    pub enemies: Vec<EnemySighting>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceEstimate>,
    #[serde(default)]
    pub treasures: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Viewport parameters, display-only but persisted with the rest of the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub offset_x: usize,
    pub offset_y: usize,
    /// Number of visible tiles along one edge.
    pub zoom: usize,
}

pub const VIEWPORT_DEFAULT: usize = 15;
pub const VIEWPORT_MIN: usize = 5;
pub const VIEWPORT_MAX: usize = 25;

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset_x: 0,
            offset_y: 0,
            zoom: VIEWPORT_DEFAULT,
        }
    }
}

/// Owns the tile grid plus the exploration economy around it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplorationState {
    #[serde(default)]
    pub grid: TerrainGrid,
    #[serde(default)]
    pub position_x: usize,
    #[serde(default)]
    pub position_y: usize,
    #[serde(default)]
    pub selected_tile_id: Option<String>,
    #[serde(default)]
    pub exploration_points: u32,
    #[serde(default)]
    pub max_exploration_points: u32,
    /// Timestamp of the last exploration or point regeneration, epoch ms.
    #[serde(default)]
    pub last_regen_ms: u64,
    #[serde(default)]
    pub discovered: Vec<String>,
    #[serde(default)]
    pub viewport: Viewport,
}

impl Default for ExplorationState {
    fn default() -> Self {
        Self {
            grid: TerrainGrid::default(),
            position_x: 0,
            position_y: 0,
            selected_tile_id: None,
            exploration_points: MAX_EXPLORATION_POINTS,
            max_exploration_points: MAX_EXPLORATION_POINTS,
            last_regen_ms: 0,
            discovered: Vec::new(),
            viewport: Viewport::default(),
        }
    }
}

impl ExplorationState {
    /// Fresh state over a newly generated grid, positioned at the home tile.
    pub fn new<R: Rng + ?Sized>(size: usize, now_ms: u64, rng: &mut R) -> Self {
        let grid = TerrainGrid::generate(size, rng);
        let (cx, cy) = grid.center();
        let half = VIEWPORT_DEFAULT / 2;
        Self {
            grid,
            position_x: cx,
            position_y: cy,
            selected_tile_id: None,
            exploration_points: MAX_EXPLORATION_POINTS,
            max_exploration_points: MAX_EXPLORATION_POINTS,
            last_regen_ms: now_ms,
            discovered: Vec::new(),
            viewport: Viewport {
                offset_x: cx.saturating_sub(half),
                offset_y: cy.saturating_sub(half),
                zoom: VIEWPORT_DEFAULT,
            },
        }
    }

    #[must_use]
    pub fn can_explore(&self) -> bool {
        self.exploration_points > 0
    }

    /// A tile can be selected only once explored.
    pub fn select_tile(&mut self, id: &str) -> bool {
        match self.grid.tile(id) {
            Some(tile) if tile.explored => {
                self.selected_tile_id = Some(id.to_string());
                true
            }
            _ => false,
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected_tile_id = None;
    }

    /// Spend one exploration point to reveal a random unexplored neighbor of
    /// the current position. Returns the revealed tile id.
    pub fn explore<R: Rng + ?Sized>(
        &mut self,
        now_ms: u64,
        rng: &mut R,
    ) -> Result<String, ExploreError> {
        if self.exploration_points == 0 {
            return Err(ExploreError::InsufficientPoints);
        }

        let unexplored: Vec<String> = self
            .grid
            .adjacent_tiles(self.position_x, self.position_y)
            .iter()
            .filter(|tile| !tile.explored)
            .map(|tile| tile.id.clone())
            .collect();
        let Some(chosen) = crate::random::pick(rng, &unexplored).cloned() else {
            return Err(ExploreError::NothingToExplore);
        };

        if let Some(tile) = self.grid.tile_mut(&chosen) {
            tile.explored = true;
        }
        self.exploration_points -= 1;
        self.last_regen_ms = now_ms;
        self.discovered.push(chosen.clone());
        Ok(chosen)
    }

    /// Lazily regenerate exploration points: +1 per full elapsed hour since
    /// the last exploration/regeneration event, capped at the maximum. The
    /// timestamp only advances when points are actually applied.
    pub fn regenerate_points(&mut self, now_ms: u64) -> u32 {
        let elapsed = now_ms.saturating_sub(self.last_regen_ms);
        let earned = u32::try_from(elapsed / EXPLORATION_REGEN_INTERVAL_MS).unwrap_or(u32::MAX);
        if earned == 0 || self.exploration_points >= self.max_exploration_points {
            return 0;
        }
        let granted = earned.min(self.max_exploration_points - self.exploration_points);
        self.exploration_points += granted;
        self.last_regen_ms = now_ms;
        granted
    }

    /// Terrain-keyed intelligence for an explored tile.
    pub fn scout_tile<R: Rng + ?Sized>(
        &self,
        id: &str,
        rng: &mut R,
    ) -> Result<ScoutReport, ScoutError> {
        let tile = self.grid.tile(id).ok_or(ScoutError::UnknownTile)?;
        if !tile.explored {
            return Err(ScoutError::Unexplored);
        }

        let report = match tile.kind {
            TerrainKind::VillageEnemy => ScoutReport {
                enemies: vec![
                    EnemySighting {
                        unit: "Guard".to_string(),
                        strength: rng.gen_range(25..75),
                    },
                    EnemySighting {
                        unit: "Archer".to_string(),
                        strength: rng.gen_range(15..45),
                    },
                ],
                resources: Some(ResourceEstimate {
                    gold: rng.gen_range(50..150),
                    wood: rng.gen_range(100..300),
                    iron: 0,
                }),
                ..ScoutReport::default()
            },
            TerrainKind::Ruins => ScoutReport {
                treasures: vec!["Ancient Artifact".to_string(), "Spellbook".to_string()],
                resources: Some(ResourceEstimate {
                    iron: rng.gen_range(75..225),
                    ..ResourceEstimate::default()
                }),
                ..ScoutReport::default()
            },
            TerrainKind::Stronghold => ScoutReport {
                enemies: vec![EnemySighting {
                    unit: "Commander".to_string(),
                    strength: rng.gen_range(75..175),
                }],
                resources: Some(ResourceEstimate {
                    gold: rng.gen_range(200..500),
                    ..ResourceEstimate::default()
                }),
                ..ScoutReport::default()
            },
            _ => ScoutReport {
                message: Some("Peaceful area, no threats detected".to_string()),
                ..ScoutReport::default()
            },
        };
        Ok(report)
    }

    /// Move the viewport, clamped so it stays inside the grid.
    pub fn move_viewport(&mut self, x: usize, y: usize) {
        let max_offset = self.grid.size.saturating_sub(self.viewport.zoom);
        self.viewport.offset_x = x.min(max_offset);
        self.viewport.offset_y = y.min(max_offset);
    }

    pub fn center_viewport_on(&mut self, x: usize, y: usize) {
        let half = self.viewport.zoom / 2;
        self.move_viewport(x.saturating_sub(half), y.saturating_sub(half));
    }

    /// Set the zoom level (visible tile count), keeping the center in place.
    pub fn set_zoom(&mut self, zoom: usize) {
        let old = self.viewport.zoom;
        let new = zoom.clamp(VIEWPORT_MIN, VIEWPORT_MAX.min(self.grid.size.max(VIEWPORT_MIN)));
        let center_x = self.viewport.offset_x + old / 2;
        let center_y = self.viewport.offset_y + old / 2;
        self.viewport.zoom = new;
        self.center_viewport_on(center_x, center_y);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.viewport.zoom.saturating_sub(1));
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.viewport.zoom + 1);
    }
}
