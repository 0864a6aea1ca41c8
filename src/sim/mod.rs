//! Deterministic simulation module
//!
//! All per-frame gameplay logic lives here. This module must stay pure and
//! deterministic:
//! - Seeded RNG only, reseeded per zone
//! - Stable iteration order (BTreeMap / Vec, never HashMap iteration)
//! - No rendering, audio or blocking I/O

pub mod bounds;
pub mod clock;
pub mod effects;
pub mod events;
pub mod generation;
pub mod items;
pub mod player;
pub mod rng;
pub mod spatial;
pub mod state;
pub mod stats;
pub mod tick;

pub use bounds::{BoundsResult, Fence};
pub use clock::GameClock;
pub use effects::{ActiveEffects, AddOutcome, DriveEffect, EffectKind, EffectVector};
pub use events::{EventLog, SimEvent, TickServices};
pub use generation::{CategoryReport, Generated, SpawnRequest, populate_zone, spawn_category};
pub use items::{InventoryItem, ItemCategory, ItemPayload, WorldItem};
pub use player::{PlayerState, RiddenVehicle, UseOutcome};
pub use rng::{RandomSource, SeededRandom};
pub use spatial::{Entity, QueryResult, SpatialIndex};
pub use state::{FrameSnapshot, GameState};
pub use stats::{Stat, StatDelta, Stats};
pub use tick::{TickInput, tick};
