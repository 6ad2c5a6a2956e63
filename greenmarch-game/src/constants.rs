//! Central tuning constants for the Greenmarch engine.

/// Number of rows in a generated campaign map (row 0 = start, last row = boss).
pub const MAP_ROWS: usize = 12;

/// Convergence rows occur every `CONVERGENCE_INTERVAL` rows (row % interval == interval - 1).
pub const CONVERGENCE_INTERVAL: usize = 4;

/// Columns used by a normal three-lane row.
pub const LANE_COLS: [u8; 3] = [0, 2, 4];
/// Center column shared by start, boss and single-node convergence rows.
pub const CENTER_COL: u8 = 2;

/// Chance of an extra cross connection into a convergence row.
pub const CONVERGENCE_CROSS_CHANCE: f64 = 0.2;
/// Chance of an extra cross-lane connection between two normal rows.
pub const LANE_CROSS_CHANCE: f64 = 0.3;

/// Small exploration grid edge length (campaign-scale map).
pub const GRID_SIZE_SMALL: usize = 11;
/// Large exploration grid edge length (world-scale map).
pub const GRID_SIZE_LARGE: usize = 100;

/// Maximum banked exploration points.
pub const MAX_EXPLORATION_POINTS: u32 = 3;
/// One exploration point regenerates per this many elapsed milliseconds.
pub const EXPLORATION_REGEN_INTERVAL_MS: u64 = 60 * 60 * 1000;

/// Number of scouts available for concurrent missions.
pub const SCOUT_POOL_SIZE: usize = 4;
/// Default scout mission duration in milliseconds.
pub const SCOUT_MISSION_DURATION_MS: u64 = 10_000;

/// Auto-save cadence for the session tick.
pub const AUTO_SAVE_INTERVAL_MS: u64 = 30_000;

/// Delay between mission completion and the deferred map reset, so a
/// transition screen can display before state changes land.
pub const MISSION_TRANSITION_DELAY_MS: u64 = 3_000;

/// Leadership ledger bounds.
pub const LEADERSHIP_MAX: i32 = 200;
pub const LEADERSHIP_MIN: i32 = 0;

/// Leadership restored by a rest node.
pub const REST_LEADERSHIP_GAIN: i32 = 10;
/// Health restored by a rest node reward.
pub const REST_HEALTH_GAIN: i32 = 25;

/// Leadership penalty ranges rolled into mission descriptors.
pub const COMBAT_PENALTY_RANGE: (i32, i32) = (50, 120);
pub const ELITE_PENALTY_RANGE: (i32, i32) = (150, 250);
