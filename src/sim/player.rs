//! Player state: position, stats, effects, inventory and transient flags

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::effects::{ActiveEffects, AddOutcome, DriveEffect, EffectKind};
use super::items::{DrinkKind, FoodKind, InventoryItem, VehicleKind};
use super::stats::{Stat, StatDelta, Stats};

/// Vehicle the player is currently riding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiddenVehicle {
    pub id: String,
    pub kind: VehicleKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub pos: Vec2,
    /// Velocity applied last tick (world units / s)
    pub velocity: Vec2,
    /// Decaying bounce velocity after hitting a circular fence while riding
    pub rebound: Vec2,
    pub stats: Stats,
    pub effects: ActiveEffects,
    #[serde(with = "inventory_entries")]
    pub inventory: BTreeMap<InventoryItem, u32>,
    pub resting: bool,
    /// Externally driven vehicle the player sits in (can't walk)
    pub boarded_vehicle: Option<String>,
    /// Rideable vehicle the player is on
    pub riding: Option<RiddenVehicle>,
    pub lights_on: bool,
}

/// Result of using an inventory item
#[derive(Debug, Clone, PartialEq)]
pub struct UseOutcome {
    pub success: bool,
    pub message: String,
    pub effect: Option<(EffectKind, AddOutcome)>,
}

impl UseOutcome {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            effect: None,
        }
    }
}

impl PlayerState {
    pub fn new(pos: Vec2, max_effect_stack: usize) -> Self {
        Self {
            pos,
            velocity: Vec2::ZERO,
            rebound: Vec2::ZERO,
            stats: Stats::default(),
            effects: ActiveEffects::new(max_effect_stack),
            inventory: BTreeMap::new(),
            resting: false,
            boarded_vehicle: None,
            riding: None,
            lights_on: false,
        }
    }

    pub fn is_riding(&self) -> bool {
        self.riding.is_some()
    }

    pub fn bike_id(&self) -> Option<&str> {
        self.riding.as_ref().map(|r| r.id.as_str())
    }

    /// Walking is suppressed while resting or sitting in an external vehicle
    pub fn can_walk(&self) -> bool {
        !self.resting && self.boarded_vehicle.is_none()
    }

    /// Sit in an externally driven vehicle
    pub fn board_vehicle(&mut self, id: impl Into<String>) {
        self.boarded_vehicle = Some(id.into());
        self.resting = false;
    }

    /// Leave the external vehicle; `None` if not aboard
    pub fn leave_vehicle(&mut self) -> Option<String> {
        self.boarded_vehicle.take()
    }

    pub fn quantity(&self, item: InventoryItem) -> u32 {
        self.inventory.get(&item).copied().unwrap_or(0)
    }

    pub fn add_item(&mut self, item: InventoryItem, qty: u32) {
        if qty > 0 {
            *self.inventory.entry(item).or_insert(0) += qty;
        }
    }

    /// Take one unit; `false` if none is held
    pub fn remove_item(&mut self, item: InventoryItem) -> bool {
        match self.inventory.get_mut(&item) {
            Some(qty) if *qty > 0 => {
                *qty -= 1;
                if *qty == 0 {
                    self.inventory.remove(&item);
                }
                true
            }
            _ => false,
        }
    }

    pub fn add_effect(&mut self, effect: DriveEffect) -> AddOutcome {
        self.effects.add(effect)
    }

    /// Consume one unit of `item` and apply it
    pub fn use_item(&mut self, item: InventoryItem) -> UseOutcome {
        if matches!(item, InventoryItem::Flashlight) {
            return UseOutcome::failed("The flashlight is toggled, not used");
        }
        if !self.remove_item(item) {
            return UseOutcome::failed(format!("No {item:?} in inventory"));
        }

        let (delta, dose) = item_effect(item);
        self.stats.apply_delta(&delta);
        if let InventoryItem::PowerCell(charge) = item {
            self.stats.apply(Stat::LightBattery, charge as f32);
        }
        let effect = dose.map(|kind| (kind, self.effects.add(DriveEffect::dose(kind))));

        UseOutcome {
            success: true,
            message: format!("Used {item:?}"),
            effect,
        }
    }

    /// Flip the lights. Needs a flashlight and some charge to switch on.
    pub fn toggle_light(&mut self) -> bool {
        if self.lights_on {
            self.lights_on = false;
            return true;
        }
        if self.quantity(InventoryItem::Flashlight) == 0 || self.stats.light_battery <= 0.0 {
            return false;
        }
        self.lights_on = true;
        true
    }
}

/// Immediate stat change and optional effect dose for consuming `item`
fn item_effect(item: InventoryItem) -> (StatDelta, Option<EffectKind>) {
    let none = StatDelta::default();
    match item {
        InventoryItem::Drink(DrinkKind::Water) => (StatDelta { thirst: 30.0, ..none }, None),
        InventoryItem::Drink(DrinkKind::Soda) => (
            StatDelta {
                thirst: 20.0,
                mood: 5.0,
                ..none
            },
            Some(EffectKind::Sugar),
        ),
        InventoryItem::Drink(DrinkKind::Coffee) => (
            StatDelta {
                thirst: 10.0,
                ..none
            },
            Some(EffectKind::Caffeine),
        ),
        InventoryItem::Food(FoodKind::Apple) => (
            StatDelta {
                hunger: 15.0,
                thirst: 3.0,
                ..none
            },
            None,
        ),
        InventoryItem::Food(FoodKind::Sandwich) => (StatDelta { hunger: 35.0, ..none }, None),
        InventoryItem::Food(FoodKind::Pizza) => (
            StatDelta {
                hunger: 45.0,
                mood: 5.0,
                ..none
            },
            None,
        ),
        InventoryItem::Consumable(kind) => (none, Some(kind)),
        InventoryItem::PowerCell(_) | InventoryItem::Flashlight => (none, None),
    }
}

/// JSON object keys must be strings, so the inventory is stored as pairs
mod inventory_entries {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serializer};

    use crate::sim::items::InventoryItem;

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<InventoryItem, u32>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(map.iter())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<InventoryItem, u32>, D::Error> {
        let entries = Vec::<(InventoryItem, u32)>::deserialize(deserializer)?;
        Ok(entries.into_iter().filter(|(_, qty)| *qty > 0).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> PlayerState {
        PlayerState::new(Vec2::new(100.0, 100.0), 3)
    }

    #[test]
    fn missing_item_is_not_an_error() {
        let mut p = player();
        let out = p.use_item(InventoryItem::Drink(DrinkKind::Water));
        assert!(!out.success);
        assert_eq!(p.stats, Stats::default());
    }

    #[test]
    fn drinking_restores_thirst_with_clamp() {
        let mut p = player();
        p.stats.thirst = 90.0;
        p.add_item(InventoryItem::Drink(DrinkKind::Water), 2);
        assert!(p.use_item(InventoryItem::Drink(DrinkKind::Water)).success);
        assert_eq!(p.stats.thirst, 100.0);
        assert_eq!(p.quantity(InventoryItem::Drink(DrinkKind::Water)), 1);
    }

    #[test]
    fn coffee_applies_caffeine() {
        let mut p = player();
        p.add_item(InventoryItem::Drink(DrinkKind::Coffee), 1);
        let out = p.use_item(InventoryItem::Drink(DrinkKind::Coffee));
        assert_eq!(out.effect, Some((EffectKind::Caffeine, AddOutcome::Added)));
        assert!(p.effects.get(EffectKind::Caffeine).is_some());
        assert!(p.inventory.is_empty());
    }

    #[test]
    fn power_cell_recharges_battery() {
        let mut p = player();
        p.stats.light_battery = 10.0;
        p.add_item(InventoryItem::PowerCell(30), 1);
        p.add_item(InventoryItem::PowerCell(55), 1);
        assert!(p.use_item(InventoryItem::PowerCell(30)).success);
        assert_eq!(p.stats.light_battery, 40.0);
        assert_eq!(p.quantity(InventoryItem::PowerCell(55)), 1);
    }

    #[test]
    fn light_needs_flashlight_and_charge() {
        let mut p = player();
        assert!(!p.toggle_light());
        p.add_item(InventoryItem::Flashlight, 1);
        p.stats.light_battery = 0.0;
        assert!(!p.toggle_light());
        p.stats.light_battery = 5.0;
        assert!(p.toggle_light());
        assert!(p.lights_on);
        assert!(p.toggle_light());
        assert!(!p.lights_on);
    }

    #[test]
    fn inventory_survives_json() {
        let mut p = player();
        p.add_item(InventoryItem::Food(FoodKind::Pizza), 2);
        p.add_item(InventoryItem::Flashlight, 1);
        let json = serde_json::to_string(&p).unwrap();
        let back: PlayerState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.inventory, p.inventory);
    }

    #[test]
    fn boarding_blocks_walking() {
        let mut p = player();
        assert!(p.can_walk());
        p.board_vehicle("bus_7");
        assert!(!p.can_walk());
        assert_eq!(p.leave_vehicle().as_deref(), Some("bus_7"));
        assert!(p.leave_vehicle().is_none());
    }
}
