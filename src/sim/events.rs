//! Notifications emitted by the tick for UI/audio collaborators

use serde::{Deserialize, Serialize};

use super::effects::EffectKind;
use super::items::{InventoryItem, ItemCategory};
use crate::platform::TimeSource;
use crate::world::ZoneId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    ItemCollected { id: String, category: ItemCategory },
    ItemUsed { item: InventoryItem, success: bool },
    EffectApplied { kind: EffectKind },
    EffectExpired { kind: EffectKind },
    ZoneChanged { from: ZoneId, to: ZoneId, first_visit: bool },
    TransitionFailed { target: ZoneId, message: String },
    LightsToggled { on: bool },
    BatteryDepleted,
    Mounted { vehicle_id: String },
    Dismounted { vehicle_id: String },
    RestToggled { resting: bool },
}

/// Append-only event queue, drained once per frame
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<SimEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: SimEvent) {
        log::trace!("event: {event:?}");
        self.events.push(event);
    }

    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Take every queued event, leaving the log empty
    pub fn drain(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Collaborators handed to each tick
pub struct TickServices<'a> {
    pub events: &'a mut EventLog,
    pub time: &'a dyn TimeSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_empties_log() {
        let mut log = EventLog::new();
        log.push(SimEvent::BatteryDepleted);
        log.push(SimEvent::LightsToggled { on: false });
        assert_eq!(log.len(), 2);

        let drained = log.drain();
        assert_eq!(drained[0], SimEvent::BatteryDepleted);
        assert!(log.is_empty());
        assert!(log.drain().is_empty());
    }
}
