//! Greenmarch Game Engine
//!
//! Platform-agnostic core logic for the Greenmarch browser strategy game.
//! This crate provides map generation, campaign progression, terrain
//! exploration, scouting, the town economy and the player ledger without UI
//! or platform-specific dependencies.

pub mod campaign;
pub mod constants;
pub mod exploration;
pub mod mapgen;
pub mod mission;
pub mod persist;
pub mod player;
pub mod random;
pub mod scouting;
pub mod session;
pub mod terrain;
pub mod town;

// Re-export commonly used types
pub use campaign::{CampaignEvent, CampaignState, SelectError};
pub use exploration::{
    EnemySighting, ExplorationState, ExploreError, ResourceEstimate, ScoutError, ScoutReport,
    Viewport,
};
pub use mapgen::{Lane, MapLayer, MapNode, NodeKind, Reward, generate_map, validate_connections};
pub use mission::{MissionDescriptor, MissionDifficulty, MissionLog, MissionPenalty};
pub use persist::{
    KEY_CAMPAIGN, KEY_MISSIONS, KEY_PLAYER, KEY_TERRAIN, KEY_TOWN, LoadStatus, MemoryStore,
    StateStore, load_or_default, save_aggregate,
};
pub use player::{
    Artifact, ArtifactSlot, LedgerError, PlayerInventory, PlayerState, Race, RaceStats, Rarity,
    Resources,
};
pub use random::WeightedTable;
pub use scouting::{ScoutMission, ScoutMissionError, ScoutMissionStatus, ScoutPool};
pub use session::{
    GameSession, MissionSink, NavSink, Notifier, NullMissionSink, NullNavSink, NullNotifier,
    SessionSinks,
};
pub use terrain::{MapTile, TerrainGrid, TerrainKind, tile_id};
pub use town::{
    BuildingKind, EconomyError, TownBuilding, TownEconomy, TownResources, UnitKind, UnitRoster,
};
