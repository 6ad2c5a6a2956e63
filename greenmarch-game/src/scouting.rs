//! Pool-bounded, time-delimited scout missions over the large terrain grid.
//!
//! A mission completes purely as a function of wall-clock time crossing its
//! end timestamp. Completion is evaluated lazily by `sweep` whenever state is
//! read (and by the periodic session tick); there are no per-mission timers.

use crate::constants::{SCOUT_MISSION_DURATION_MS, SCOUT_POOL_SIZE};
use crate::exploration::ExplorationState;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoutMissionStatus {
    Pending,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoutMission {
    pub id: u64,
    pub target_tile_id: String,
    pub started_at_ms: u64,
    pub ends_at_ms: u64,
    pub status: ScoutMissionStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoutMissionError {
    #[error("all scouts are already deployed")]
    NoScoutAvailable,
    #[error("tile not found")]
    UnknownTile,
    #[error("tile is already discovered")]
    AlreadyDiscovered,
    #[error("a scout is already heading for that tile")]
    DuplicateTarget,
}

/// Fixed-size pool of scouts and their mission history for the current grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoutPool {
    #[serde(default = "default_pool_size")]
    pub capacity: usize,
    #[serde(default = "default_mission_duration")]
    pub mission_duration_ms: u64,
    #[serde(default)]
    pub missions: Vec<ScoutMission>,
    #[serde(default)]
    next_mission_id: u64,
}

const fn default_pool_size() -> usize {
    SCOUT_POOL_SIZE
}

const fn default_mission_duration() -> u64 {
    SCOUT_MISSION_DURATION_MS
}

impl Default for ScoutPool {
    fn default() -> Self {
        Self {
            capacity: SCOUT_POOL_SIZE,
            mission_duration_ms: SCOUT_MISSION_DURATION_MS,
            missions: Vec::new(),
            next_mission_id: 1,
        }
    }
}

impl ScoutPool {
    #[must_use]
    pub fn new(capacity: usize, mission_duration_ms: u64) -> Self {
        Self {
            capacity,
            mission_duration_ms,
            missions: Vec::new(),
            next_mission_id: 1,
        }
    }

    /// Number of scouts currently out on pending missions.
    #[must_use]
    pub fn deployed(&self) -> usize {
        self.missions
            .iter()
            .filter(|m| m.status == ScoutMissionStatus::Pending)
            .count()
    }

    #[must_use]
    pub fn free_scouts(&self) -> usize {
        self.capacity.saturating_sub(self.deployed())
    }

    #[must_use]
    pub fn has_pending_for(&self, tile_id: &str) -> bool {
        self.missions
            .iter()
            .any(|m| m.status == ScoutMissionStatus::Pending && m.target_tile_id == tile_id)
    }

    /// Dispatch a scout toward a tile, returning the new mission id. Fails
    /// when the pool is exhausted, the tile is unknown or already discovered,
    /// or a mission is already pending for the same target.
    pub fn start_mission(
        &mut self,
        exploration: &ExplorationState,
        tile_id: &str,
        now_ms: u64,
    ) -> Result<u64, ScoutMissionError> {
        if self.free_scouts() == 0 {
            return Err(ScoutMissionError::NoScoutAvailable);
        }
        let tile = exploration
            .grid
            .tile(tile_id)
            .ok_or(ScoutMissionError::UnknownTile)?;
        if tile.explored || exploration.discovered.iter().any(|d| d == tile_id) {
            return Err(ScoutMissionError::AlreadyDiscovered);
        }
        if self.has_pending_for(tile_id) {
            return Err(ScoutMissionError::DuplicateTarget);
        }

        let id = self.next_mission_id;
        self.next_mission_id += 1;
        self.missions.push(ScoutMission {
            id,
            target_tile_id: tile_id.to_string(),
            started_at_ms: now_ms,
            ends_at_ms: now_ms + self.mission_duration_ms,
            status: ScoutMissionStatus::Pending,
        });
        Ok(id)
    }

    /// Complete every pending mission whose end time has passed, marking the
    /// target tiles discovered and explored. Resolved missions are dropped
    /// from the pool so the aggregate stays bounded. Returns the completed
    /// targets.
    pub fn sweep(&mut self, exploration: &mut ExplorationState, now_ms: u64) -> Vec<String> {
        let mut completed = Vec::new();
        for mission in &mut self.missions {
            if mission.status == ScoutMissionStatus::Pending && now_ms >= mission.ends_at_ms {
                mission.status = ScoutMissionStatus::Completed;
                if let Some(tile) = exploration.grid.tile_mut(&mission.target_tile_id) {
                    tile.explored = true;
                }
                if !exploration
                    .discovered
                    .iter()
                    .any(|d| d == &mission.target_tile_id)
                {
                    exploration.discovered.push(mission.target_tile_id.clone());
                }
                completed.push(mission.target_tile_id.clone());
            }
        }
        self.missions
            .retain(|m| m.status == ScoutMissionStatus::Pending);
        completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::tile_id;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn setup(seed: u64) -> (ExplorationState, ScoutPool) {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let exploration = ExplorationState::new(100, 0, &mut rng);
        (exploration, ScoutPool::default())
    }

    #[test]
    fn mission_runs_for_its_duration_then_reveals_tile() {
        let (mut exploration, mut pool) = setup(1);
        let target = tile_id(10, 10);

        pool.start_mission(&exploration, &target, 0).expect("starts");
        assert_eq!(pool.deployed(), 1);

        // Mid-flight sweep completes nothing.
        assert!(pool.sweep(&mut exploration, SCOUT_MISSION_DURATION_MS / 2).is_empty());
        assert_eq!(pool.deployed(), 1);

        let done = pool.sweep(&mut exploration, SCOUT_MISSION_DURATION_MS);
        assert_eq!(done, vec![target.clone()]);
        assert_eq!(pool.deployed(), 0);
        assert_eq!(pool.free_scouts(), pool.capacity);
        assert!(exploration.grid.tile(&target).is_some_and(|t| t.explored));
        assert!(exploration.discovered.contains(&target));
    }

    #[test]
    fn duplicate_target_rejected_while_pending() {
        let (mut exploration, mut pool) = setup(2);
        let target = tile_id(20, 20);
        pool.start_mission(&exploration, &target, 0).expect("first");
        assert_eq!(
            pool.start_mission(&exploration, &target, 100).unwrap_err(),
            ScoutMissionError::DuplicateTarget
        );

        // Once completed, the tile is discovered, so a re-run fails differently.
        pool.sweep(&mut exploration, SCOUT_MISSION_DURATION_MS + 1);
        assert_eq!(
            pool.start_mission(&exploration, &target, 0).unwrap_err(),
            ScoutMissionError::AlreadyDiscovered
        );
    }

    #[test]
    fn fifth_mission_fails_when_pool_exhausted() {
        let (exploration, mut pool) = setup(3);
        for i in 0..SCOUT_POOL_SIZE {
            pool.start_mission(&exploration, &tile_id(30 + i, 30), 0)
                .expect("pool has room");
        }
        assert_eq!(pool.free_scouts(), 0);
        assert_eq!(
            pool.start_mission(&exploration, &tile_id(40, 40), 0).unwrap_err(),
            ScoutMissionError::NoScoutAvailable
        );
    }

    #[test]
    fn discovered_and_explored_tiles_cannot_be_targeted() {
        let (mut exploration, mut pool) = setup(4);
        let home = tile_id(50, 50);
        assert_eq!(
            pool.start_mission(&exploration, &home, 0).unwrap_err(),
            ScoutMissionError::AlreadyDiscovered
        );
        assert_eq!(
            pool.start_mission(&exploration, "nope", 0).unwrap_err(),
            ScoutMissionError::UnknownTile
        );

        exploration.discovered.push(tile_id(60, 60));
        if let Some(tile) = exploration.grid.tile_mut(&tile_id(60, 60)) {
            tile.explored = false;
        }
        assert_eq!(
            pool.start_mission(&exploration, &tile_id(60, 60), 0).unwrap_err(),
            ScoutMissionError::AlreadyDiscovered
        );
    }

    #[test]
    fn resolved_missions_are_pruned_from_the_pool() {
        let (mut exploration, mut pool) = setup(6);
        let mut now = 0;
        for wave in 0..10usize {
            for i in 0..SCOUT_POOL_SIZE {
                let target = tile_id(i, 2 + wave);
                pool.start_mission(&exploration, &target, now).expect("room");
            }
            now += SCOUT_MISSION_DURATION_MS;
            pool.sweep(&mut exploration, now);
        }
        assert!(pool.missions.is_empty(), "resolved missions must not pile up");
        assert_eq!(pool.free_scouts(), pool.capacity);
    }

    #[test]
    fn completion_releases_scout_for_reuse() {
        let (mut exploration, mut pool) = setup(5);
        for i in 0..SCOUT_POOL_SIZE {
            pool.start_mission(&exploration, &tile_id(i, 0), 0).expect("room");
        }
        pool.sweep(&mut exploration, SCOUT_MISSION_DURATION_MS);
        pool.start_mission(&exploration, &tile_id(0, 2), SCOUT_MISSION_DURATION_MS)
            .expect("scout freed after sweep");
        assert_eq!(pool.deployed(), 1);
    }
}
