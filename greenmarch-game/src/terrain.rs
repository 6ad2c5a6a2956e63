//! Explorable terrain grid.
//!
//! A fixed N×N grid of weighted-random tiles with one home village at the
//! center. Two configurations are in use: an 11×11 campaign-scale grid and a
//! 100×100 world-scale grid for the scout pool.

use crate::constants::{GRID_SIZE_LARGE, GRID_SIZE_SMALL};
use crate::random::WeightedTable;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainKind {
    Plains,
    Forest,
    Mountain,
    Water,
    VillagePlayer,
    VillageEnemy,
    Ruins,
    Stronghold,
}

impl TerrainKind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Plains => "Plains",
            Self::Forest => "Forest",
            Self::Mountain => "Mountains",
            Self::Water => "Lake",
            Self::VillagePlayer => "Your Village",
            Self::VillageEnemy => "Enemy Village",
            Self::Ruins => "Ruins",
            Self::Stronghold => "Stronghold",
        }
    }

    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Plains => "🌾",
            Self::Forest => "🌲",
            Self::Mountain => "⛰️",
            Self::Water => "🌊",
            Self::VillagePlayer => "🏠",
            Self::VillageEnemy => "🏘️",
            Self::Ruins => "🏛️",
            Self::Stronghold => "🏰",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Plains => "Wide fertile plains, ideal for farming.",
            Self::Forest => "Dense forest rich in timber and game.",
            Self::Mountain => "Rocky mountains holding precious ore.",
            Self::Water => "A stretch of water teeming with fish.",
            Self::VillagePlayer => "Your home village.",
            Self::VillageEnemy => "An enemy village ripe for conquest.",
            Self::Ruins => "Mysterious ancient ruins.",
            Self::Stronghold => "A powerful enemy stronghold.",
        }
    }

    /// Terrain production bonus shown on the tile, if any.
    #[must_use]
    pub const fn bonus(self) -> Option<&'static str> {
        match self {
            Self::Forest => Some("+50% Wood"),
            Self::Mountain => Some("+50% Stone"),
            Self::Water => Some("+50% Fish"),
            _ => None,
        }
    }
}

impl fmt::Display for TerrainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single cell of the exploration grid. Tile ids are coordinate keys
/// (`"x-y"`) and double as discovery-log entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapTile {
    pub id: String,
    pub kind: TerrainKind,
    #[serde(default)]
    pub explored: bool,
    /// Marks the player's home tile; exactly one per grid.
    #[serde(default)]
    pub current: bool,
    pub x: usize,
    pub y: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus: Option<String>,
}

#[must_use]
pub fn tile_id(x: usize, y: usize) -> String {
    format!("{x}-{y}")
}

/// The full tile collection. Size is fixed at generation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TerrainGrid {
    #[serde(default)]
    pub size: usize,
    #[serde(default)]
    pub tiles: Vec<MapTile>,
}

fn terrain_table() -> WeightedTable<TerrainKind> {
    // Original cumulative thresholds: 30% forest, 20% mountain, 10% water,
    // 10% ruins, 10% enemy village, 5% stronghold, remainder plains.
    WeightedTable::new(vec![
        (30, TerrainKind::Forest),
        (20, TerrainKind::Mountain),
        (10, TerrainKind::Water),
        (10, TerrainKind::Ruins),
        (10, TerrainKind::VillageEnemy),
        (5, TerrainKind::Stronghold),
        (15, TerrainKind::Plains),
    ])
}

impl TerrainGrid {
    /// Generate a fresh grid. The center tile is always the player's village,
    /// explored and current; everything else is a weighted terrain draw.
    pub fn generate<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Self {
        let table = terrain_table();
        let center = size / 2;
        let mut tiles = Vec::with_capacity(size * size);
        for x in 0..size {
            for y in 0..size {
                let is_center = x == center && y == center;
                let kind = if is_center {
                    TerrainKind::VillagePlayer
                } else {
                    table.choose(rng).unwrap_or(TerrainKind::Plains)
                };
                tiles.push(MapTile {
                    id: tile_id(x, y),
                    kind,
                    explored: is_center,
                    current: is_center,
                    x,
                    y,
                    bonus: kind.bonus().map(str::to_string),
                });
            }
        }
        Self { size, tiles }
    }

    pub fn generate_small<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::generate(GRID_SIZE_SMALL, rng)
    }

    pub fn generate_large<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::generate(GRID_SIZE_LARGE, rng)
    }

    #[must_use]
    pub const fn center(&self) -> (usize, usize) {
        (self.size / 2, self.size / 2)
    }

    #[must_use]
    pub fn tile(&self, id: &str) -> Option<&MapTile> {
        self.tiles.iter().find(|tile| tile.id == id)
    }

    pub fn tile_mut(&mut self, id: &str) -> Option<&mut MapTile> {
        self.tiles.iter_mut().find(|tile| tile.id == id)
    }

    #[must_use]
    pub fn tile_at(&self, x: usize, y: usize) -> Option<&MapTile> {
        if x >= self.size || y >= self.size {
            return None;
        }
        self.tiles.get(x * self.size + y)
    }

    pub fn tile_at_mut(&mut self, x: usize, y: usize) -> Option<&mut MapTile> {
        if x >= self.size || y >= self.size {
            return None;
        }
        self.tiles.get_mut(x * self.size + y)
    }

    /// The up-to-eight neighbors of a coordinate.
    #[must_use]
    pub fn adjacent_tiles(&self, x: usize, y: usize) -> Vec<&MapTile> {
        let mut adjacent = Vec::with_capacity(8);
        for dx in -1i64..=1 {
            for dy in -1i64..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let (nx, ny) = (x as i64 + dx, y as i64 + dy);
                if nx < 0 || ny < 0 {
                    continue;
                }
                if let Some(tile) = self.tile_at(nx as usize, ny as usize) {
                    adjacent.push(tile);
                }
            }
        }
        adjacent
    }

    /// Tiles inside the half-open rectangle `[start, end)`, for viewport rendering.
    #[must_use]
    pub fn tiles_in_range(
        &self,
        start_x: usize,
        start_y: usize,
        end_x: usize,
        end_y: usize,
    ) -> Vec<&MapTile> {
        self.tiles
            .iter()
            .filter(|t| t.x >= start_x && t.x < end_x && t.y >= start_y && t.y < end_y)
            .collect()
    }

    #[must_use]
    pub fn explored_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.explored).count()
    }
}
