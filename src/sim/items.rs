//! Closed item catalog: categories, subtypes and per-category payloads

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::effects::EffectKind;

/// Every kind of thing the generator scatters through a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ItemCategory {
    Currency,
    Hydration,
    Food,
    Consumable,
    Vehicle,
    Litter,
    LightSource,
    PowerCell,
}

/// Placement constraints for one category
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRules {
    /// Minimum distance from the zone's player spawn point
    pub min_distance_from_player: f32,
    /// Minimum distance between two items of this category
    pub min_spacing: f32,
    /// Collision/pickup radius of the item
    pub radius: f32,
}

impl ItemCategory {
    pub const ALL: [ItemCategory; 8] = [
        ItemCategory::Currency,
        ItemCategory::Hydration,
        ItemCategory::Food,
        ItemCategory::Consumable,
        ItemCategory::Vehicle,
        ItemCategory::Litter,
        ItemCategory::LightSource,
        ItemCategory::PowerCell,
    ];

    /// Prefix used in generated ids
    pub fn prefix(&self) -> &'static str {
        match self {
            ItemCategory::Currency => "coin",
            ItemCategory::Hydration => "drink",
            ItemCategory::Food => "food",
            ItemCategory::Consumable => "effect",
            ItemCategory::Vehicle => "vehicle",
            ItemCategory::Litter => "litter",
            ItemCategory::LightSource => "light",
            ItemCategory::PowerCell => "cell",
        }
    }

    pub fn spawn_rules(&self) -> SpawnRules {
        let (min_distance_from_player, min_spacing, radius) = match self {
            ItemCategory::Currency => (80.0, 40.0, 8.0),
            ItemCategory::Hydration => (100.0, 80.0, 10.0),
            ItemCategory::Food => (100.0, 80.0, 10.0),
            ItemCategory::Consumable => (150.0, 120.0, 10.0),
            ItemCategory::Vehicle => (120.0, 200.0, 20.0),
            ItemCategory::Litter => (60.0, 30.0, 6.0),
            ItemCategory::LightSource => (150.0, 250.0, 10.0),
            ItemCategory::PowerCell => (120.0, 150.0, 8.0),
        };
        SpawnRules {
            min_distance_from_player,
            min_spacing,
            radius,
        }
    }
}

impl std::fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.prefix())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DrinkKind {
    Water,
    Soda,
    Coffee,
}

impl DrinkKind {
    pub const WEIGHTS: [(DrinkKind, f32); 3] = [
        (DrinkKind::Water, 0.6),
        (DrinkKind::Soda, 0.25),
        (DrinkKind::Coffee, 0.15),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FoodKind {
    Apple,
    Sandwich,
    Pizza,
}

impl FoodKind {
    pub const WEIGHTS: [(FoodKind, f32); 3] = [
        (FoodKind::Apple, 0.5),
        (FoodKind::Sandwich, 0.35),
        (FoodKind::Pizza, 0.15),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VehicleKind {
    Bicycle,
    Scooter,
    Skateboard,
}

impl VehicleKind {
    pub const ALL: [VehicleKind; 3] = [
        VehicleKind::Bicycle,
        VehicleKind::Scooter,
        VehicleKind::Skateboard,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LitterKind {
    Can,
    Bottle,
    Wrapper,
    Cup,
}

impl LitterKind {
    pub const ALL: [LitterKind; 4] = [
        LitterKind::Can,
        LitterKind::Bottle,
        LitterKind::Wrapper,
        LitterKind::Cup,
    ];

    /// Karma gained for reclaiming one piece
    pub fn karma(&self) -> f32 {
        match self {
            LitterKind::Can | LitterKind::Bottle => 2.0,
            LitterKind::Wrapper => 1.0,
            LitterKind::Cup => 1.5,
        }
    }

    /// Deposit refund, in coins
    pub fn refund(&self) -> f32 {
        match self {
            LitterKind::Can | LitterKind::Bottle => 1.0,
            LitterKind::Wrapper | LitterKind::Cup => 0.0,
        }
    }
}

/// Coin denominations and their weights
pub const COIN_WEIGHTS: [(u32, f32); 4] = [(1, 0.55), (5, 0.3), (10, 0.12), (25, 0.03)];

/// Per-category data carried by a world item
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum ItemPayload {
    Currency { value: u32 },
    Hydration { drink: DrinkKind },
    Food { food: FoodKind },
    Consumable { effect: EffectKind },
    Vehicle { vehicle: VehicleKind },
    Litter { litter: LitterKind },
    LightSource { battery: f32 },
    /// Battery charge restored when the cell is used
    PowerCell { charge: u32 },
}

impl ItemPayload {
    pub fn category(&self) -> ItemCategory {
        match self {
            ItemPayload::Currency { .. } => ItemCategory::Currency,
            ItemPayload::Hydration { .. } => ItemCategory::Hydration,
            ItemPayload::Food { .. } => ItemCategory::Food,
            ItemPayload::Consumable { .. } => ItemCategory::Consumable,
            ItemPayload::Vehicle { .. } => ItemCategory::Vehicle,
            ItemPayload::Litter { .. } => ItemCategory::Litter,
            ItemPayload::LightSource { .. } => ItemCategory::LightSource,
            ItemPayload::PowerCell { .. } => ItemCategory::PowerCell,
        }
    }
}

/// A placed item in a zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldItem {
    pub id: String,
    pub pos: Vec2,
    pub collected: bool,
    pub payload: ItemPayload,
}

impl WorldItem {
    pub fn category(&self) -> ItemCategory {
        self.payload.category()
    }

    pub fn radius(&self) -> f32 {
        self.category().spawn_rules().radius
    }
}

/// Things the player can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InventoryItem {
    Drink(DrinkKind),
    Food(FoodKind),
    Consumable(EffectKind),
    /// Keyed by charge so cells of different strength stack separately
    PowerCell(u32),
    Flashlight,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_category_round_trips_through_table() {
        let payloads = [
            ItemPayload::Currency { value: 5 },
            ItemPayload::Hydration { drink: DrinkKind::Water },
            ItemPayload::Food { food: FoodKind::Apple },
            ItemPayload::Consumable { effect: EffectKind::Caffeine },
            ItemPayload::Vehicle { vehicle: VehicleKind::Bicycle },
            ItemPayload::Litter { litter: LitterKind::Can },
            ItemPayload::LightSource { battery: 100.0 },
            ItemPayload::PowerCell { charge: 50 },
        ];
        let categories: Vec<_> = payloads.iter().map(|p| p.category()).collect();
        assert_eq!(categories, ItemCategory::ALL.to_vec());
    }

    #[test]
    fn spawn_rules_are_positive() {
        for category in ItemCategory::ALL {
            let rules = category.spawn_rules();
            assert!(rules.min_spacing > 0.0, "{category}");
            assert!(rules.radius > 0.0, "{category}");
        }
    }

    #[test]
    fn payload_serializes_with_category_tag() {
        let json = serde_json::to_string(&ItemPayload::Currency { value: 10 }).unwrap();
        assert_eq!(json, r#"{"category":"currency","value":10}"#);
    }
}
