//! Save slots
//!
//! A save is a small envelope (player, clock, current zone) plus the zone
//! snapshots written alongside it. Zone snapshots are per world, not per
//! slot: the most recent save owns them.

use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::platform::Storage;
use crate::sim::{GameClock, GameState, PlayerState};
use crate::tuning::Tuning;
use crate::world::{ZoneId, ZoneRegistry};

/// Current envelope version; older or newer saves are rejected
pub const SAVE_VERSION: u32 = 1;

const SLOT_PREFIX: &str = "save/";

/// Versioned save envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveGame {
    pub version: u32,
    /// Unix ms when written
    pub saved_at_ms: u64,
    /// World seed, needed to regenerate zones not yet visited
    pub seed: u64,
    pub zone: ZoneId,
    pub player: PlayerState,
    pub clock: GameClock,
}

impl SaveGame {
    pub fn capture(state: &GameState, saved_at_ms: u64) -> Self {
        Self {
            version: SAVE_VERSION,
            saved_at_ms,
            seed: state.seed,
            zone: state.current_zone().clone(),
            player: state.player.clone(),
            clock: state.clock,
        }
    }

    pub fn slot_key(slot: &str) -> String {
        format!("{SLOT_PREFIX}{slot}")
    }
}

/// Summary of one stored slot, for a load menu
#[derive(Debug, Clone, PartialEq)]
pub struct SlotInfo {
    pub slot: String,
    pub saved_at_ms: u64,
    pub zone: ZoneId,
    /// In-game clock label at save time
    pub clock_label: String,
}

/// Only the version field, decoded before the full envelope
#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

/// Write every zone snapshot, then the slot envelope
pub async fn save_game<S: Storage>(
    storage: &mut S,
    slot: &str,
    state: &GameState,
    now_ms: u64,
) -> Result<(), PersistenceError> {
    state.transitions.store().save_all(storage).await?;

    let key = SaveGame::slot_key(slot);
    let save = SaveGame::capture(state, now_ms);
    let json = serde_json::to_string(&save)
        .map_err(|source| PersistenceError::Serde { key: key.clone(), source })?;
    storage.save(&key, json).await?;
    log::info!("saved slot '{slot}' in zone '{}'", save.zone);
    Ok(())
}

/// Read and version-check a slot envelope. `Ok(None)` if the slot is empty.
pub async fn load_game<S: Storage>(
    storage: &S,
    slot: &str,
) -> Result<Option<SaveGame>, PersistenceError> {
    let key = SaveGame::slot_key(slot);
    let Some(json) = storage.load(&key).await? else {
        return Ok(None);
    };

    let probe: VersionProbe = serde_json::from_str(&json)
        .map_err(|source| PersistenceError::Serde { key: key.clone(), source })?;
    if probe.version != SAVE_VERSION {
        return Err(PersistenceError::VersionMismatch {
            key,
            found: probe.version,
            expected: SAVE_VERSION,
        });
    }

    let save = serde_json::from_str(&json).map_err(|source| PersistenceError::Serde { key, source })?;
    Ok(Some(save))
}

/// Rebuild a session from a slot and the stored zone snapshots
pub async fn restore_game<S: Storage>(
    storage: &S,
    slot: &str,
    tuning: Tuning,
    registry: ZoneRegistry,
    now_ms: u64,
) -> Result<Option<GameState>, PersistenceError> {
    let Some(save) = load_game(storage, slot).await? else {
        return Ok(None);
    };

    let mut state = GameState::new(save.seed, tuning, registry, now_ms);
    state.transitions.store_mut().load_all(storage).await?;
    if !state.transitions.resume_in(&save.zone, &mut state.rng, now_ms) {
        // Zone was dropped from the catalog; fall back to home
        let home = state.transitions.registry().home().clone();
        state.transitions.resume_in(&home, &mut state.rng, now_ms);
    }
    state.player = save.player;
    state.clock = save.clock;

    log::info!("restored slot '{slot}' in zone '{}'", state.current_zone());
    Ok(Some(state))
}

/// Stored slots, newest first. Unreadable slots are skipped.
pub async fn list_slots<S: Storage>(storage: &S) -> Result<Vec<SlotInfo>, PersistenceError> {
    let mut slots = Vec::new();
    for key in storage.keys().await? {
        let Some(slot) = key.strip_prefix(SLOT_PREFIX) else {
            continue;
        };
        match load_game(storage, slot).await {
            Ok(Some(save)) => slots.push(SlotInfo {
                slot: slot.to_string(),
                saved_at_ms: save.saved_at_ms,
                zone: save.zone,
                clock_label: save.clock.label(),
            }),
            Ok(None) => {}
            Err(e) => log::warn!("skipping slot '{slot}': {e}"),
        }
    }
    slots.sort_by(|a, b| b.saved_at_ms.cmp(&a.saved_at_ms));
    Ok(slots)
}

/// Remove a slot envelope; `Ok(false)` if it did not exist
pub async fn delete_slot<S: Storage>(storage: &mut S, slot: &str) -> Result<bool, PersistenceError> {
    Ok(storage.remove(&SaveGame::slot_key(slot)).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStorage;
    use glam::Vec2;

    fn session() -> GameState {
        GameState::with_seed(4242)
    }

    #[tokio::test]
    async fn save_and_restore_round_trip() {
        let mut storage = MemoryStorage::new();
        let mut state = session();
        state.player.pos = Vec2::new(321.0, 123.0);
        state.player.stats.coin = 17.0;
        state.clock.advance(30.0, 1.0);

        // Collect one item so the zone snapshot differs from a fresh roll
        let (index, zone) = state.transitions.zone_parts_mut();
        let taken = zone.items[0].id.clone();
        zone.items[0].collected = true;
        index.remove(&taken);

        save_game(&mut storage, "one", &state, 5_000).await.unwrap();
        let restored = restore_game(
            &storage,
            "one",
            Tuning::default(),
            ZoneRegistry::with_defaults(),
            6_000,
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(restored.player.pos, Vec2::new(321.0, 123.0));
        assert_eq!(restored.player.stats.coin, 17.0);
        assert_eq!(restored.clock, state.clock);
        assert_eq!(restored.current_zone(), state.current_zone());
        assert!(!restored.transitions.index().contains(&taken));
        assert_eq!(restored.transitions.index().len(), state.transitions.index().len());
    }

    #[tokio::test]
    async fn empty_slot_is_none() {
        let storage = MemoryStorage::new();
        assert!(load_game(&storage, "nothing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn version_mismatch_is_rejected() {
        let mut storage = MemoryStorage::new();
        storage
            .save("save/old", r#"{"version":0,"whatever":true}"#.to_string())
            .await
            .unwrap();
        let err = load_game(&storage, "old").await.unwrap_err();
        assert!(matches!(
            err,
            PersistenceError::VersionMismatch {
                found: 0,
                expected: SAVE_VERSION,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn slots_list_newest_first_and_delete() {
        let mut storage = MemoryStorage::new();
        let state = session();
        save_game(&mut storage, "a", &state, 100).await.unwrap();
        save_game(&mut storage, "b", &state, 300).await.unwrap();
        storage.save("save/broken", "{".to_string()).await.unwrap();

        let slots = list_slots(&storage).await.unwrap();
        let names: Vec<&str> = slots.iter().map(|s| s.slot.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(slots[0].clock_label, "Day 1, 08:00");

        assert!(delete_slot(&mut storage, "a").await.unwrap());
        assert!(!delete_slot(&mut storage, "a").await.unwrap());
        assert_eq!(list_slots(&storage).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_write_propagates() {
        let mut storage = MemoryStorage::new();
        storage.fail_writes = true;
        let err = save_game(&mut storage, "x", &session(), 1).await.unwrap_err();
        assert!(matches!(err, PersistenceError::Storage(_)));
    }
}
