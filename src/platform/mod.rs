//! Platform abstraction layer
//!
//! Ports the simulation core talks through:
//! - Time (wall-clock milliseconds for "last visited" stamps and real `dt`)
//! - Storage (async key/value persistence)

pub mod storage;
pub mod time;

pub use storage::{MemoryStorage, Storage};
pub use time::{ManualTime, SystemTimeSource, TimeSource};
