//! Game session orchestration.
//!
//! One `GameSession` owns every subsystem aggregate for a play session and is
//! the single writer for all of them: hosts must funnel every mutation through
//! it (one logical owner per store). Campaign side effects arrive here as
//! events and are dispatched to the collaborator sinks, keeping the state
//! machine itself free of cross-module calls.

use crate::campaign::{CampaignEvent, CampaignState, SelectError};
use crate::constants::{AUTO_SAVE_INTERVAL_MS, GRID_SIZE_LARGE, MISSION_TRANSITION_DELAY_MS};
use crate::exploration::{ExploreError, ExplorationState};
use crate::mission::{MissionDescriptor, MissionLog};
use crate::persist::{
    KEY_CAMPAIGN, KEY_MISSIONS, KEY_PLAYER, KEY_TERRAIN, KEY_TOWN, LoadStatus, StateStore,
    load_or_default, save_aggregate,
};
use crate::player::{Artifact, ArtifactSlot, PlayerState, Race, Rarity};
use crate::scouting::ScoutPool;
use crate::town::TownEconomy;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

/// External mission-launch collaborator.
pub trait MissionSink {
    fn start_mission(&mut self, descriptor: &MissionDescriptor);
}

/// External navigation collaborator.
pub trait NavSink {
    fn go_to(&mut self, route: &str);
}

/// External notification collaborator.
pub trait Notifier {
    fn show_info(&mut self, message: &str, duration_ms: u64);
    fn show_success(&mut self, message: &str, duration_ms: u64);
}

/// Bundle of collaborator sinks passed into session operations.
pub struct SessionSinks<'a> {
    pub missions: &'a mut dyn MissionSink,
    pub nav: &'a mut dyn NavSink,
    pub notify: &'a mut dyn Notifier,
}

pub struct NullMissionSink;
impl MissionSink for NullMissionSink {
    fn start_mission(&mut self, _descriptor: &MissionDescriptor) {}
}

pub struct NullNavSink;
impl NavSink for NullNavSink {
    fn go_to(&mut self, _route: &str) {}
}

pub struct NullNotifier;
impl Notifier for NullNotifier {
    fn show_info(&mut self, _message: &str, _duration_ms: u64) {}
    fn show_success(&mut self, _message: &str, _duration_ms: u64) {}
}

const NOTIFY_DURATION_MS: u64 = 4_000;
pub const ROUTE_SHOP: &str = "/shop";
pub const ROUTE_VICTORY: &str = "/victory";
pub const ROUTE_GAME_OVER: &str = "/game-over";

/// Deferred one-shot action: lets a transition screen display before the
/// post-mission reset lands. Cancelable, never serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingTownReset {
    due_at_ms: u64,
}

/// Owns all per-session state and the persistence store.
pub struct GameSession<S: StateStore> {
    store: S,
    pub player: PlayerState,
    pub campaign: CampaignState,
    pub exploration: ExplorationState,
    pub scouts: ScoutPool,
    pub town: TownEconomy,
    pub missions: MissionLog,
    rng: ChaCha20Rng,
    last_save_ms: u64,
    pending_town_reset: Option<PendingTownReset>,
}

impl<S: StateStore> GameSession<S>
where
    S::Error: Into<anyhow::Error>,
{
    /// Fresh session over an empty world. Call `load_all` afterwards to pick
    /// up any existing saves.
    pub fn new(store: S, seed: u64, now_ms: u64) -> Self {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let exploration = ExplorationState::new(GRID_SIZE_LARGE, now_ms, &mut rng);
        Self {
            store,
            player: PlayerState::default(),
            campaign: CampaignState::default(),
            exploration,
            scouts: ScoutPool::default(),
            town: TownEconomy::new(now_ms),
            missions: MissionLog::new(),
            rng,
            last_save_ms: now_ms,
            pending_town_reset: None,
        }
    }

    /// Load every aggregate from its own key. Missing or corrupt blobs fall
    /// back to fresh state; a saved grid with no tiles is replaced rather
    /// than trusted. Returns whether any aggregate actually loaded.
    pub fn load_all(&mut self, now_ms: u64) -> bool {
        let mut any_loaded = false;

        let (player, status) = load_or_default::<_, PlayerState>(&self.store, KEY_PLAYER);
        if status == LoadStatus::Loaded {
            self.player = player;
            any_loaded = true;
        }

        let (campaign, status) = load_or_default::<_, CampaignState>(&self.store, KEY_CAMPAIGN);
        if status == LoadStatus::Loaded && campaign.map_generated {
            self.campaign = campaign;
            any_loaded = true;
        }

        let (exploration, status) =
            load_or_default::<_, ExplorationState>(&self.store, KEY_TERRAIN);
        if status == LoadStatus::Loaded && !exploration.grid.tiles.is_empty() {
            self.exploration = exploration;
            any_loaded = true;
        } else if status != LoadStatus::Missing {
            log::warn!("saved terrain grid was empty or corrupt, regenerating");
            self.exploration = ExplorationState::new(GRID_SIZE_LARGE, now_ms, &mut self.rng);
        }

        let (town, status) = load_or_default::<_, TownEconomy>(&self.store, KEY_TOWN);
        if status == LoadStatus::Loaded {
            self.town = town;
            // Settle production for however long the app was closed.
            self.town.accrue(now_ms);
            any_loaded = true;
        }

        let (missions, status) = load_or_default::<_, MissionLog>(&self.store, KEY_MISSIONS);
        if status == LoadStatus::Loaded {
            self.missions = missions;
            any_loaded = true;
        }

        any_loaded
    }

    /// Persist every aggregate under its own key.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the store write fails.
    pub fn save_all(&mut self, now_ms: u64) -> anyhow::Result<()> {
        save_aggregate(&mut self.store, KEY_PLAYER, &self.player)?;
        save_aggregate(&mut self.store, KEY_CAMPAIGN, &self.campaign)?;
        // Never overwrite a valid saved grid with an empty one.
        if self.exploration.grid.tiles.is_empty() {
            log::warn!("skipping save of empty terrain grid");
        } else {
            save_aggregate(&mut self.store, KEY_TERRAIN, &self.exploration)?;
        }
        save_aggregate(&mut self.store, KEY_TOWN, &self.town)?;
        save_aggregate(&mut self.store, KEY_MISSIONS, &self.missions)?;
        self.last_save_ms = now_ms;
        Ok(())
    }

    fn save_quietly(&mut self, now_ms: u64) {
        if let Err(err) = self.save_all(now_ms) {
            log::warn!("auto-save failed: {err}");
        }
    }

    /// Start a brand-new game: fresh profile with the chosen race, fresh
    /// campaign map, starting node open.
    pub fn start_new_game(&mut self, race: Race, now_ms: u64) {
        self.player.start_new_game(race, now_ms);
        self.campaign = CampaignState::new_default_run(&mut self.rng);
        self.missions = MissionLog::new();
        self.save_quietly(now_ms);
    }

    /// Select a campaign node and dispatch its side effects to the sinks.
    /// Invalid selections are typed no-ops.
    pub fn select_node(
        &mut self,
        node_id: &str,
        now_ms: u64,
        sinks: &mut SessionSinks<'_>,
    ) -> Result<(), SelectError> {
        let events = self.campaign.select_node(node_id, &mut self.rng)?;
        self.dispatch(&events, now_ms, sinks);
        self.save_quietly(now_ms);
        Ok(())
    }

    fn dispatch(&mut self, events: &[CampaignEvent], now_ms: u64, sinks: &mut SessionSinks<'_>) {
        for event in events {
            match event {
                CampaignEvent::MissionRequested(descriptor) => {
                    self.missions.begin(descriptor.clone());
                    sinks.missions.start_mission(descriptor);
                }
                CampaignEvent::GoldGranted { amount } => {
                    self.player.add_gold(*amount);
                    sinks.notify.show_success(
                        &format!("Gained {amount} gold"),
                        NOTIFY_DURATION_MS,
                    );
                }
                CampaignEvent::ArtifactGranted { name } => {
                    self.player.add_artifact(drawn_artifact(name, &mut self.rng));
                    sinks
                        .notify
                        .show_success(&format!("Obtained {name}"), NOTIFY_DURATION_MS);
                }
                CampaignEvent::HealthGranted { amount } => {
                    sinks
                        .notify
                        .show_info(&format!("Recovered {amount} health"), NOTIFY_DURATION_MS);
                }
                CampaignEvent::LeadershipGranted { amount } => {
                    self.player.add_leadership(*amount);
                }
                CampaignEvent::ShopEntered { .. } => {
                    sinks.nav.go_to(ROUTE_SHOP);
                }
                CampaignEvent::Victory => {
                    sinks
                        .notify
                        .show_success("The campaign is won!", NOTIFY_DURATION_MS);
                    sinks.nav.go_to(ROUTE_VICTORY);
                    self.pending_town_reset = Some(PendingTownReset {
                        due_at_ms: now_ms + MISSION_TRANSITION_DELAY_MS,
                    });
                }
            }
        }
    }

    /// Resolve the active mission. Success grants the node reward plus
    /// difficulty-scaled leadership and schedules the deferred town reset;
    /// failure applies the rolled penalties. The selected node stays
    /// completed either way.
    pub fn complete_mission(&mut self, success: bool, now_ms: u64, sinks: &mut SessionSinks<'_>) {
        let Some(descriptor) = self.missions.finish() else {
            return;
        };
        if success {
            match &descriptor.reward {
                Some(crate::mapgen::Reward::Gold { amount }) => self.player.add_gold(*amount),
                Some(
                    crate::mapgen::Reward::Card { name } | crate::mapgen::Reward::Relic { name },
                ) => {
                    let artifact = drawn_artifact(name, &mut self.rng);
                    self.player.add_artifact(artifact);
                }
                Some(crate::mapgen::Reward::Health { amount }) => {
                    sinks
                        .notify
                        .show_info(&format!("Recovered {amount} health"), NOTIFY_DURATION_MS);
                }
                None => {}
            }
            self.player
                .add_leadership(descriptor.difficulty.leadership_reward());
            sinks
                .notify
                .show_success("Mission accomplished", NOTIFY_DURATION_MS);
            self.pending_town_reset = Some(PendingTownReset {
                due_at_ms: now_ms + MISSION_TRANSITION_DELAY_MS,
            });
        } else {
            if descriptor.penalty.gold > 0 {
                // All-or-nothing: an under-funded penalty deducts nothing.
                let _ = self.player.spend_gold(descriptor.penalty.gold);
            }
            if self.player.lose_leadership(descriptor.penalty.leadership) {
                sinks
                    .notify
                    .show_info("Your leadership has collapsed", NOTIFY_DURATION_MS);
                sinks.nav.go_to(ROUTE_GAME_OVER);
                self.full_reset(now_ms);
                return;
            }
        }
        self.save_quietly(now_ms);
    }

    /// Cancel the deferred post-mission reset (e.g. the host skipped the
    /// transition screen flow).
    pub fn cancel_pending_reset(&mut self) {
        self.pending_town_reset = None;
    }

    /// Periodic driver. Safe to call at any cadence: all elapsed-time effects
    /// are computed from timestamps, and each call is one atomic critical
    /// section with respect to other host callbacks.
    pub fn tick(&mut self, now_ms: u64, sinks: &mut SessionSinks<'_>) {
        self.town.accrue(now_ms);
        self.exploration.regenerate_points(now_ms);

        for tile_id in self.scouts.sweep(&mut self.exploration, now_ms) {
            sinks
                .notify
                .show_info(&format!("Scout report ready for {tile_id}"), NOTIFY_DURATION_MS);
        }

        if let Some(pending) = self.pending_town_reset
            && now_ms >= pending.due_at_ms
        {
            self.pending_town_reset = None;
            self.town = TownEconomy::new(now_ms);
        }

        if now_ms.saturating_sub(self.last_save_ms) >= AUTO_SAVE_INTERVAL_MS {
            self.save_quietly(now_ms);
        }
    }

    /// Explore from the current position, surfacing the result as a
    /// notification. Returns the revealed tile id.
    pub fn explore(
        &mut self,
        now_ms: u64,
        sinks: &mut SessionSinks<'_>,
    ) -> Result<String, ExploreError> {
        self.exploration.regenerate_points(now_ms);
        let tile_id = self.exploration.explore(now_ms, &mut self.rng)?;
        let name = self
            .exploration
            .grid
            .tile(&tile_id)
            .map_or("Unknown terrain", |t| t.kind.name());
        sinks
            .notify
            .show_success(&format!("New area discovered: {name}"), NOTIFY_DURATION_MS);
        self.save_quietly(now_ms);
        Ok(tile_id)
    }

    /// Regenerate the campaign map only: fresh graph, accessibility reset to
    /// row 0, race and inventory preserved.
    pub fn reset_map(&mut self, now_ms: u64) {
        self.campaign = CampaignState::new_default_run(&mut self.rng);
        self.save_quietly(now_ms);
    }

    /// Full reset: clears profile, campaign, grid, town and missions, and
    /// removes every persisted key. Every aggregate is rebuilt from its
    /// constructor so no nested state is shared with the old instance.
    pub fn full_reset(&mut self, now_ms: u64) {
        self.player = PlayerState::default();
        self.campaign = CampaignState::default();
        self.exploration = ExplorationState::new(GRID_SIZE_LARGE, now_ms, &mut self.rng);
        self.scouts = ScoutPool::default();
        self.town = TownEconomy::new(now_ms);
        self.missions = MissionLog::new();
        self.pending_town_reset = None;
        for key in [KEY_PLAYER, KEY_CAMPAIGN, KEY_TERRAIN, KEY_TOWN, KEY_MISSIONS] {
            if let Err(err) = self.store.remove(key) {
                log::warn!("failed to clear {key}: {err}");
            }
        }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }
}

/// Materialize a reward name into an inventory artifact.
fn drawn_artifact<R: rand::Rng + ?Sized>(name: &str, rng: &mut R) -> Artifact {
    let serial: u32 = rng.gen_range(1_000..10_000);
    Artifact {
        id: format!("{}-{serial}", name.to_lowercase().replace(' ', "-")),
        name: name.to_string(),
        slot: ArtifactSlot::Relic,
        rarity: Rarity::Rare,
        military: 0,
        economy: 0,
        defense: 0,
        obtained_from: Some("Campaign reward".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemoryStore;

    #[derive(Default)]
    struct RecordingSinks {
        missions: Vec<MissionDescriptor>,
        routes: Vec<String>,
        messages: Vec<String>,
    }

    struct RecMission<'a>(&'a mut Vec<MissionDescriptor>);
    impl MissionSink for RecMission<'_> {
        fn start_mission(&mut self, descriptor: &MissionDescriptor) {
            self.0.push(descriptor.clone());
        }
    }

    struct RecNav<'a>(&'a mut Vec<String>);
    impl NavSink for RecNav<'_> {
        fn go_to(&mut self, route: &str) {
            self.0.push(route.to_string());
        }
    }

    struct RecNotify<'a>(&'a mut Vec<String>);
    impl Notifier for RecNotify<'_> {
        fn show_info(&mut self, message: &str, _duration_ms: u64) {
            self.0.push(message.to_string());
        }
        fn show_success(&mut self, message: &str, _duration_ms: u64) {
            self.0.push(message.to_string());
        }
    }

    fn race() -> Race {
        Race {
            id: "romans".to_string(),
            name: "Romans".to_string(),
            stats: crate::player::RaceStats::default(),
        }
    }

    fn session() -> GameSession<MemoryStore> {
        GameSession::new(MemoryStore::new(), 0xfeed, 0)
    }

    #[test]
    fn selecting_start_node_hands_off_a_mission() {
        let mut session = session();
        session.start_new_game(race(), 0);

        let start_id = session.campaign.layers[0].nodes[0].id.clone();
        let mut recorded = RecordingSinks::default();
        {
            let mut sinks = SessionSinks {
                missions: &mut RecMission(&mut recorded.missions),
                nav: &mut RecNav(&mut recorded.routes),
                notify: &mut RecNotify(&mut recorded.messages),
            };
            session
                .select_node(&start_id, 1_000, &mut sinks)
                .expect("start node selectable");
        }
        assert_eq!(recorded.missions.len(), 1);
        assert_eq!(recorded.missions[0].node_id, start_id);
        assert!(session.missions.in_mission);
    }

    #[test]
    fn successful_mission_grants_and_schedules_deferred_reset() {
        let mut session = session();
        session.start_new_game(race(), 0);
        let start_id = session.campaign.layers[0].nodes[0].id.clone();
        let gold_before = session.player.inventory.gold;

        let mut recorded = RecordingSinks::default();
        {
            let mut sinks = SessionSinks {
                missions: &mut RecMission(&mut recorded.missions),
                nav: &mut RecNav(&mut recorded.routes),
                notify: &mut RecNotify(&mut recorded.messages),
            };
            session.select_node(&start_id, 0, &mut sinks).expect("select");
            session.town.resources.wood = 9_999.0;
            session.complete_mission(true, 1_000, &mut sinks);

            // Town reset is deferred past the transition delay, then lands.
            session.tick(1_500, &mut sinks);
            assert!(session.town.resources.wood >= 9_999.0);
            session.tick(1_000 + MISSION_TRANSITION_DELAY_MS, &mut sinks);
        }
        assert!(session.town.resources.wood < 9_999.0, "town reset landed");
        assert!(session.player.inventory.gold > gold_before, "reward granted");
        assert!(!session.missions.in_mission);
    }

    #[test]
    fn failed_mission_applies_penalty_and_keeps_node_completed() {
        let mut session = session();
        session.start_new_game(race(), 0);
        session.player.inventory.leadership = 200;
        let start_id = session.campaign.layers[0].nodes[0].id.clone();
        let leadership_before = session.player.inventory.leadership;

        let mut recorded = RecordingSinks::default();
        let mut sinks = SessionSinks {
            missions: &mut RecMission(&mut recorded.missions),
            nav: &mut RecNav(&mut recorded.routes),
            notify: &mut RecNotify(&mut recorded.messages),
        };
        session.select_node(&start_id, 0, &mut sinks).expect("select");
        session.complete_mission(false, 1_000, &mut sinks);

        assert!(session.player.inventory.leadership < leadership_before);
        assert!(
            session
                .campaign
                .node(&start_id)
                .is_some_and(|n| n.completed),
            "node stays completed regardless of mission outcome"
        );
    }

    #[test]
    fn leadership_exhaustion_triggers_full_reset() {
        let mut session = session();
        session.start_new_game(race(), 0);
        session.player.inventory.leadership = 1;
        let start_id = session.campaign.layers[0].nodes[0].id.clone();

        let mut recorded = RecordingSinks::default();
        {
            let mut sinks = SessionSinks {
                missions: &mut RecMission(&mut recorded.missions),
                nav: &mut RecNav(&mut recorded.routes),
                notify: &mut RecNotify(&mut recorded.messages),
            };
            session.select_node(&start_id, 0, &mut sinks).expect("select");
            session.complete_mission(false, 0, &mut sinks);
        }
        assert!(recorded.routes.contains(&ROUTE_GAME_OVER.to_string()));
        assert!(!session.player.started, "profile was fully reset");
        assert!(!session.store().contains(KEY_PLAYER));
    }

    #[test]
    fn map_reset_preserves_profile() {
        let mut session = session();
        session.start_new_game(race(), 0);
        session.player.add_gold(500);

        let start_id = session.campaign.layers[0].nodes[0].id.clone();
        let mut recorded = RecordingSinks::default();
        {
            let mut sinks = SessionSinks {
                missions: &mut RecMission(&mut recorded.missions),
                nav: &mut RecNav(&mut recorded.routes),
                notify: &mut RecNotify(&mut recorded.messages),
            };
            session.select_node(&start_id, 0, &mut sinks).expect("select");
        }
        session.reset_map(10_000);

        assert!(session.player.inventory.gold >= 500, "inventory preserved");
        assert!(session.campaign.map_generated);
        // Progress is gone: nothing completed, only the fresh start node open.
        assert!(
            session
                .campaign
                .layers
                .iter()
                .all(|layer| layer.nodes.iter().all(|n| !n.completed))
        );
        assert_eq!(session.campaign.accessible_nodes().len(), 1);
        assert_eq!(session.campaign.current_row, 0);
    }

    #[test]
    fn tick_autosaves_on_interval() {
        let mut session = session();
        session.start_new_game(race(), 0);
        for key in [KEY_PLAYER, KEY_CAMPAIGN, KEY_TERRAIN, KEY_TOWN, KEY_MISSIONS] {
            session.store.remove(key).expect("clear");
        }

        let mut recorded = RecordingSinks::default();
        let mut sinks = SessionSinks {
            missions: &mut RecMission(&mut recorded.missions),
            nav: &mut RecNav(&mut recorded.routes),
            notify: &mut RecNotify(&mut recorded.messages),
        };
        session.tick(AUTO_SAVE_INTERVAL_MS - 1, &mut sinks);
        assert!(!session.store().contains(KEY_PLAYER));
        session.tick(AUTO_SAVE_INTERVAL_MS, &mut sinks);
        assert!(session.store().contains(KEY_PLAYER));
        assert!(session.store().contains(KEY_TOWN));
    }
}
