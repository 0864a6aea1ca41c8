//! Mutable per-zone state
//!
//! Zone states are created lazily on first access and live for the rest of
//! the session. Persistence is best-effort: a failed save leaves the
//! in-memory state untouched and is reported to the caller.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::zone::ZoneId;
use crate::error::PersistenceError;
use crate::platform::Storage;
use crate::sim::items::WorldItem;

/// A non-player character placed in a zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldNpc {
    pub id: String,
    pub name: String,
    pub pos: Vec2,
    /// Key into the external dialogue system
    pub dialogue: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorldEventKind {
    StreetFestival,
    Rainstorm,
    PowerOutage,
    Cleanup,
}

/// A timed happening in a zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldEvent {
    pub id: String,
    pub kind: WorldEventKind,
    pub pos: Vec2,
    pub started_at_ms: u64,
    pub duration_ms: u64,
}

impl WorldEvent {
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.started_at_ms.saturating_add(self.duration_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneState {
    pub world_id: ZoneId,
    pub items: Vec<WorldItem>,
    pub npcs: Vec<WorldNpc>,
    pub events: Vec<WorldEvent>,
    /// Unix ms of the last visit (0 = never)
    pub last_visited_ms: u64,
    /// Set once the zone has been populated
    pub is_loaded: bool,
}

impl ZoneState {
    pub fn new(world_id: ZoneId) -> Self {
        Self {
            world_id,
            items: Vec::new(),
            npcs: Vec::new(),
            events: Vec::new(),
            last_visited_ms: 0,
            is_loaded: false,
        }
    }

    pub fn item(&self, id: &str) -> Option<&WorldItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn item_mut(&mut self, id: &str) -> Option<&mut WorldItem> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    /// Items still lying in the zone
    pub fn uncollected(&self) -> impl Iterator<Item = &WorldItem> {
        self.items.iter().filter(|i| !i.collected)
    }
}

/// All zone states of the session, keyed by zone id
#[derive(Debug, Clone, Default)]
pub struct ZoneStateStore {
    states: BTreeMap<ZoneId, ZoneState>,
}

impl ZoneStateStore {
    /// Storage key prefix for zone snapshots
    pub const KEY_PREFIX: &'static str = "zone/";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn storage_key(id: &ZoneId) -> String {
        format!("{}{}", Self::KEY_PREFIX, id)
    }

    pub fn get(&self, id: &ZoneId) -> Option<&ZoneState> {
        self.states.get(id)
    }

    pub fn get_mut(&mut self, id: &ZoneId) -> Option<&mut ZoneState> {
        self.states.get_mut(id)
    }

    /// Existing state, or a fresh unloaded one
    pub fn get_or_create(&mut self, id: &ZoneId) -> &mut ZoneState {
        self.states
            .entry(id.clone())
            .or_insert_with(|| ZoneState::new(id.clone()))
    }

    pub fn contains(&self, id: &ZoneId) -> bool {
        self.states.contains_key(id)
    }

    pub fn mark_visited(&mut self, id: &ZoneId, now_ms: u64) {
        self.get_or_create(id).last_visited_ms = now_ms;
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Add an NPC; returns `false` if the id is already present
    pub fn add_npc(&mut self, zone: &ZoneId, npc: WorldNpc) -> bool {
        let state = self.get_or_create(zone);
        if state.npcs.iter().any(|n| n.id == npc.id) {
            return false;
        }
        state.npcs.push(npc);
        true
    }

    /// Remove an NPC; `None` if absent
    pub fn remove_npc(&mut self, zone: &ZoneId, npc_id: &str) -> Option<WorldNpc> {
        let npcs = &mut self.states.get_mut(zone)?.npcs;
        let idx = npcs.iter().position(|n| n.id == npc_id)?;
        Some(npcs.remove(idx))
    }

    pub fn add_event(&mut self, zone: &ZoneId, event: WorldEvent) {
        self.get_or_create(zone).events.push(event);
    }

    /// Drop expired events in `zone`; returns how many were removed
    pub fn prune_events(&mut self, zone: &ZoneId, now_ms: u64) -> usize {
        let Some(state) = self.states.get_mut(zone) else {
            return 0;
        };
        let before = state.events.len();
        state.events.retain(|e| !e.is_expired(now_ms));
        before - state.events.len()
    }

    /// Persist one zone snapshot. Returns `Ok(false)` if the zone has no state.
    pub async fn save_zone<S: Storage>(
        &self,
        storage: &mut S,
        id: &ZoneId,
    ) -> Result<bool, PersistenceError> {
        let Some(state) = self.states.get(id) else {
            return Ok(false);
        };
        let key = Self::storage_key(id);
        let json = serde_json::to_string(state)
            .map_err(|source| PersistenceError::Serde { key: key.clone(), source })?;
        storage.save(&key, json).await?;
        log::debug!("saved zone '{id}' ({} items)", state.items.len());
        Ok(true)
    }

    /// Persist every zone; stops at the first failure
    pub async fn save_all<S: Storage>(&self, storage: &mut S) -> Result<usize, PersistenceError> {
        let mut saved = 0;
        for id in self.states.keys() {
            if self.save_zone(storage, id).await? {
                saved += 1;
            }
        }
        log::info!("saved {saved} zone snapshots");
        Ok(saved)
    }

    /// Restore one zone snapshot, replacing in-memory state.
    /// Returns `Ok(false)` if nothing was stored for it.
    pub async fn load_zone<S: Storage>(
        &mut self,
        storage: &S,
        id: &ZoneId,
    ) -> Result<bool, PersistenceError> {
        let key = Self::storage_key(id);
        let Some(json) = storage.load(&key).await? else {
            return Ok(false);
        };
        let state: ZoneState = serde_json::from_str(&json)
            .map_err(|source| PersistenceError::Serde { key, source })?;
        self.states.insert(id.clone(), state);
        Ok(true)
    }

    /// Restore every stored zone snapshot
    pub async fn load_all<S: Storage>(&mut self, storage: &S) -> Result<usize, PersistenceError> {
        let mut loaded = 0;
        for key in storage.keys().await? {
            if let Some(id) = key.strip_prefix(Self::KEY_PREFIX) {
                if self.load_zone(storage, &ZoneId::new(id)).await? {
                    loaded += 1;
                }
            }
        }
        log::info!("restored {loaded} zone snapshots");
        Ok(loaded)
    }
}
