//! Zones: static catalog, per-zone mutable state, and transitions between them

pub mod store;
pub mod transition;
pub mod zone;

pub use store::{WorldEvent, WorldEventKind, WorldNpc, ZoneState, ZoneStateStore};
pub use transition::{TransitionManager, TransitionOutcome};
pub use zone::{Boundary, Side, ZoneConfig, ZoneId, ZoneRegistry};
