//! Roam - real-time simulation core for a top-down exploration/survival game
//!
//! Core modules:
//! - `sim`: Deterministic per-tick simulation (spatial index, generation, player, clock)
//! - `world`: Zone catalog, per-zone state and zone-to-zone transitions
//! - `platform`: Ports to the outside world (time, storage)
//! - `persistence`: Versioned save files
//! - `tuning`: Data-driven game balance

pub mod error;
pub mod persistence;
pub mod platform;
pub mod sim;
pub mod tuning;
pub mod world;

pub use error::{ConfigError, PersistenceError, StorageError};
pub use tuning::{Difficulty, Tuning};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Engine configuration constants
pub mod consts {
    /// Fixed simulation timestep used by the headless driver (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Default spatial grid cell size (world units)
    pub const GRID_CELL_SIZE: f32 = 100.0;

    /// Player collision diameter, used for rectangular bounds inset
    pub const PLAYER_SIZE: f32 = 24.0;

    /// Rejection sampling budget, as a multiple of the requested count
    pub const GENERATION_ATTEMPT_FACTOR: usize = 10;

    /// Id of the distinguished home zone (round trips remember the departure side)
    pub const HOME_ZONE: &str = "town";
}

/// Axis-aligned rectangle in world units (origin at top-left)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Point-in-rect test (inclusive edges)
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }
}

/// Convert polar (r, theta) around `center` to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(center: Vec2, r: f32, theta: f32) -> Vec2 {
    center + Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Linear interpolation between `a` and `b`, `t` clamped to [0, 1]
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}
