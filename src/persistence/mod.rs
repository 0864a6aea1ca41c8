//! Save/load persistence
//!
//! Features:
//! - Versioned JSON envelope per save slot (`save/<slot>`)
//! - Zone snapshots shared by the world (`zone/<id>`)
//! - Version check before the full decode

pub mod save;

pub use save::{
    SAVE_VERSION, SaveGame, SlotInfo, delete_slot, list_slots, load_game, restore_game, save_game,
};
