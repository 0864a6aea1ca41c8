//! Zone transitions
//!
//! Exactly one zone is current at any time. Each tick the player position is
//! tested against the current zone's boundaries; the first satisfied one
//! switches zones, rebuilds the spatial index for the new extents and either
//! populates the zone (first visit) or reloads its persisted items.

use glam::Vec2;

use super::store::{ZoneState, ZoneStateStore};
use super::zone::{Boundary, Side, ZoneConfig, ZoneId, ZoneRegistry};
use crate::sim::generation::{CategoryReport, populate_zone, zone_seed};
use crate::sim::rng::RandomSource;
use crate::sim::spatial::{Entity, SpatialIndex};
use crate::tuning::GenerationTuning;

/// Result of a transition attempt
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionOutcome {
    pub success: bool,
    pub message: String,
    pub from: ZoneId,
    pub to: ZoneId,
    /// Where the player lands (only on success)
    pub arrival: Option<Vec2>,
    pub first_visit: bool,
    /// Generation reports for a first visit
    pub reports: Vec<CategoryReport>,
}

impl TransitionOutcome {
    fn failed(from: ZoneId, to: ZoneId, message: String) -> Self {
        Self {
            success: false,
            message,
            from,
            to,
            arrival: None,
            first_visit: false,
            reports: Vec::new(),
        }
    }
}

/// Owns the zone catalog, per-zone state and the current zone's spatial index
#[derive(Debug, Clone)]
pub struct TransitionManager {
    registry: ZoneRegistry,
    store: ZoneStateStore,
    current: ZoneId,
    index: SpatialIndex,
    world_seed: u64,
    cell_size: f32,
    generation: GenerationTuning,
    /// Side the player last left a zone through
    last_exit: Option<Side>,
    /// Side the player left the home zone through on the current trip
    home_departure: Option<Side>,
    /// Set once a transition fired this tick
    in_progress: bool,
    cooldown: f32,
    cooldown_secs: f32,
}

impl TransitionManager {
    /// Start in the registry's home zone. Call [`enter_home`](Self::enter_home)
    /// before the first tick to populate it.
    pub fn new(
        registry: ZoneRegistry,
        world_seed: u64,
        cell_size: f32,
        generation: GenerationTuning,
        cooldown_secs: f32,
    ) -> Self {
        let current = registry.home().clone();
        let (w, h) = registry
            .get(&current)
            .map(|z| (z.width, z.height))
            .unwrap_or((0.0, 0.0));
        Self {
            registry,
            store: ZoneStateStore::new(),
            current,
            index: SpatialIndex::new(w, h, cell_size),
            world_seed,
            cell_size,
            generation,
            last_exit: None,
            home_departure: None,
            in_progress: false,
            cooldown: 0.0,
            cooldown_secs,
        }
    }

    pub fn registry(&self) -> &ZoneRegistry {
        &self.registry
    }

    pub fn store(&self) -> &ZoneStateStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ZoneStateStore {
        &mut self.store
    }

    pub fn current_zone(&self) -> &ZoneId {
        &self.current
    }

    pub fn current_config(&self) -> Option<&ZoneConfig> {
        self.registry.get(&self.current)
    }

    pub fn current_state(&self) -> Option<&ZoneState> {
        self.store.get(&self.current)
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    /// Index and current zone state together, for pickup/consumption logic
    pub fn zone_parts_mut(&mut self) -> (&mut SpatialIndex, &mut ZoneState) {
        let state = self.store.get_or_create(&self.current);
        (&mut self.index, state)
    }

    pub fn last_exit(&self) -> Option<Side> {
        self.last_exit
    }

    pub fn home_departure(&self) -> Option<Side> {
        self.home_departure
    }

    pub fn is_in_progress(&self) -> bool {
        self.in_progress
    }

    pub fn world_seed(&self) -> u64 {
        self.world_seed
    }

    /// Clear the per-tick guard and run down the arrival cooldown
    pub fn begin_tick(&mut self, dt: f32) {
        self.in_progress = false;
        self.cooldown = (self.cooldown - dt.max(0.0)).max(0.0);
    }

    /// Load (or populate) the current zone without moving the player
    pub fn enter_home(&mut self, rng: &mut dyn RandomSource, now_ms: u64) -> Vec<CategoryReport> {
        let id = self.current.clone();
        self.store.mark_visited(&id, now_ms);
        self.load_current(rng)
    }

    /// Make `zone` current without crossing a boundary (resuming a save).
    /// Returns `false` for an unregistered zone.
    pub fn resume_in(&mut self, zone: &ZoneId, rng: &mut dyn RandomSource, now_ms: u64) -> bool {
        if !self.registry.contains(zone) {
            log::warn!("cannot resume in unknown zone '{zone}'");
            return false;
        }
        self.current = zone.clone();
        self.cooldown = 0.0;
        self.store.mark_visited(zone, now_ms);
        self.load_current(rng);
        true
    }

    /// Test `pos` against the current zone's boundaries and fire the first hit
    pub fn check(
        &mut self,
        pos: Vec2,
        rng: &mut dyn RandomSource,
        now_ms: u64,
    ) -> Option<TransitionOutcome> {
        if self.in_progress || self.cooldown > 0.0 {
            return None;
        }
        let boundary = self.current_config()?.triggered_boundary(pos)?.clone();
        Some(self.fire(&boundary, rng, now_ms))
    }

    /// Cross `boundary` out of the current zone
    pub fn fire(
        &mut self,
        boundary: &Boundary,
        rng: &mut dyn RandomSource,
        now_ms: u64,
    ) -> TransitionOutcome {
        let arrival = self.arrival_point(boundary);
        self.switch_zone(&boundary.target, arrival, Some(boundary.side), rng, now_ms)
    }

    /// Jump straight to `target`, arriving at its spawn point
    pub fn transition_to(
        &mut self,
        target: &ZoneId,
        rng: &mut dyn RandomSource,
        now_ms: u64,
    ) -> TransitionOutcome {
        let spawn = self.registry.get(target).map(|z| z.spawn);
        self.switch_zone(target, spawn, None, rng, now_ms)
    }

    /// Absolute exit, or the base offset along the remembered exit direction
    fn arrival_point(&self, boundary: &Boundary) -> Option<Vec2> {
        if !boundary.relative {
            return Some(boundary.exit);
        }
        let side = if &boundary.target == self.registry.home() {
            self.home_departure.unwrap_or(boundary.side)
        } else {
            boundary.side
        };
        Some(boundary.exit + side.direction() * boundary.offset)
    }

    fn switch_zone(
        &mut self,
        target: &ZoneId,
        arrival: Option<Vec2>,
        exit_side: Option<Side>,
        rng: &mut dyn RandomSource,
        now_ms: u64,
    ) -> TransitionOutcome {
        let from = self.current.clone();
        if self.in_progress {
            return TransitionOutcome::failed(
                from,
                target.clone(),
                "Transition already in progress".to_string(),
            );
        }
        let Some(config) = self.registry.get(target) else {
            log::warn!("transition from '{from}' to unknown zone '{target}'");
            // Retry a dead boundary only after the cooldown
            self.cooldown = self.cooldown_secs;
            return TransitionOutcome::failed(
                from,
                target.clone(),
                format!("Unknown zone: {target}"),
            );
        };
        let arrival = arrival.unwrap_or(config.spawn);
        let name = config.name.clone();
        self.in_progress = true;

        self.store.mark_visited(&from, now_ms);
        let first_visit = !self.store.get_or_create(target).is_loaded;

        if let Some(side) = exit_side {
            self.last_exit = Some(side);
            if &from == self.registry.home() {
                self.home_departure = Some(side);
            }
        }

        self.current = target.clone();
        self.store.mark_visited(target, now_ms);
        let reports = self.load_current(rng);
        self.cooldown = self.cooldown_secs;

        log::info!(
            "zone transition '{from}' -> '{target}' at ({:.0}, {:.0}){}",
            arrival.x,
            arrival.y,
            if first_visit { " [first visit]" } else { "" }
        );
        TransitionOutcome {
            success: true,
            message: format!("Entered {name}"),
            from,
            to: target.clone(),
            arrival: Some(arrival),
            first_visit,
            reports,
        }
    }

    /// Rebuild the index for the current zone, then populate or reload it
    fn load_current(&mut self, rng: &mut dyn RandomSource) -> Vec<CategoryReport> {
        let Some(config) = self.registry.get(&self.current) else {
            return Vec::new();
        };
        self.index = SpatialIndex::new(config.width, config.height, self.cell_size);
        let state = self.store.get_or_create(&self.current);

        if state.is_loaded {
            for item in state.items.iter().filter(|i| !i.collected) {
                self.index.insert(Entity::new(item.id.clone(), item.pos, item.radius()));
            }
            return Vec::new();
        }

        rng.set_seed(zone_seed(self.world_seed, config.id.as_str()));
        let plan = self.generation.plan_for(config.width, config.height);
        let generated = populate_zone(rng, &mut self.index, config, &plan);
        state.items = generated.items;
        state.is_loaded = true;
        generated.reports
    }
}
