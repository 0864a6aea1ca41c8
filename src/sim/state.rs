//! Session state and the read-only frame snapshot
//!
//! Everything the tick mutates lives in [`GameState`]. Rendering and UI
//! collaborators only ever see a [`FrameSnapshot`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::clock::GameClock;
use super::generation::CategoryReport;
use super::items::WorldItem;
use super::player::PlayerState;
use super::rng::SeededRandom;
use crate::Rect;
use crate::tuning::Tuning;
use crate::world::{TransitionManager, ZoneId, ZoneRegistry};

/// Complete simulation state for one session
#[derive(Debug, Clone)]
pub struct GameState {
    /// World seed; per-zone streams are derived from it
    pub seed: u64,
    pub rng: SeededRandom,
    pub tuning: Tuning,
    pub player: PlayerState,
    pub clock: GameClock,
    pub transitions: TransitionManager,
    /// Ticks simulated so far
    pub time_ticks: u64,
}

impl GameState {
    /// New session in the registry's home zone, populated immediately
    pub fn new(seed: u64, tuning: Tuning, registry: ZoneRegistry, now_ms: u64) -> Self {
        let spawn = registry
            .get(registry.home())
            .map(|z| z.spawn)
            .unwrap_or(Vec2::ZERO);
        let transitions = TransitionManager::new(
            registry,
            seed,
            tuning.grid_cell_size,
            tuning.generation.clone(),
            tuning.transition_cooldown_secs,
        );
        let clock = GameClock::new(
            tuning.clock.start_day,
            tuning.clock.start_hour,
            0,
            tuning.clock.minutes_per_real_second,
        );
        let mut state = Self {
            seed,
            rng: SeededRandom::new(seed),
            player: PlayerState::new(spawn, tuning.max_effect_stack),
            tuning,
            clock,
            transitions,
            time_ticks: 0,
        };
        let reports = state.transitions.enter_home(&mut state.rng, now_ms);
        log_reports(state.transitions.current_zone(), &reports);
        state
    }

    /// Default world, default tuning
    pub fn with_seed(seed: u64) -> Self {
        Self::new(seed, Tuning::default(), ZoneRegistry::with_defaults(), 0)
    }

    pub fn current_zone(&self) -> &ZoneId {
        self.transitions.current_zone()
    }

    /// Uncollected items of the current zone whose position lies in `view`
    pub fn items_in_view(&self, view: Rect) -> Vec<&WorldItem> {
        let Some(zone) = self.transitions.current_state() else {
            return Vec::new();
        };
        self.transitions
            .index()
            .query_rect(view)
            .entities
            .iter()
            .filter_map(|e| zone.item(&e.id))
            .filter(|i| !i.collected)
            .collect()
    }

    /// Owned copy of what a frame needs to draw
    pub fn snapshot(&self) -> FrameSnapshot {
        let items = self
            .transitions
            .current_state()
            .map(|z| z.uncollected().cloned().collect())
            .unwrap_or_default();
        FrameSnapshot {
            player: self.player.clone(),
            clock: self.clock,
            clock_label: self.clock.label(),
            zone: self.current_zone().clone(),
            items,
        }
    }
}

pub(crate) fn log_reports(zone: &ZoneId, reports: &[CategoryReport]) {
    let placed: usize = reports.iter().map(|r| r.placed).sum();
    let short = reports.iter().filter(|r| r.exhausted).count();
    log::info!("populated '{zone}' with {placed} items ({short} categories under-filled)");
}

/// Read-only per-frame view for rendering/UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub player: PlayerState,
    pub clock: GameClock,
    pub clock_label: String,
    pub zone: ZoneId,
    pub items: Vec<WorldItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_starts_at_home_spawn() {
        let state = GameState::with_seed(12345);
        assert_eq!(state.current_zone().as_str(), "town");
        assert_eq!(state.player.pos, Vec2::new(800.0, 600.0));
        assert_eq!(state.clock.hour(), 8);
        assert!(state.transitions.current_state().unwrap().is_loaded);
    }

    #[test]
    fn view_query_matches_snapshot_items() {
        let state = GameState::with_seed(7);
        let snap = state.snapshot();
        let everything = state.items_in_view(Rect::new(0.0, 0.0, 1600.0, 1200.0));
        assert_eq!(everything.len(), snap.items.len());

        let none = state.items_in_view(Rect::new(-500.0, -500.0, 10.0, 10.0));
        assert!(none.is_empty());
    }

    #[test]
    fn snapshot_serializes() {
        let state = GameState::with_seed(1);
        let json = serde_json::to_string(&state.snapshot()).unwrap();
        assert!(json.contains("\"zone\":\"town\""));
        assert!(json.contains("Day 1, 08:00"));
    }
}
