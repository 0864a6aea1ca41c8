//! Deterministic, spacing-constrained procedural population
//!
//! Each category is placed by rejection sampling with an attempt budget of
//! `GENERATION_ATTEMPT_FACTOR x count`. Sibling spacing is checked through the
//! zone's spatial index rather than pairwise. Running out of budget yields a
//! shorter list (reported in [`CategoryReport`]), never an error.

use std::collections::HashSet;

use glam::Vec2;

use super::bounds::Fence;
use super::effects::EffectKind;
use super::items::{
    COIN_WEIGHTS, DrinkKind, FoodKind, ItemCategory, ItemPayload, LitterKind, VehicleKind,
    WorldItem,
};
use super::rng::{RandomSource, pick_uniform, pick_weighted};
use super::spatial::{Entity, SpatialIndex};
use crate::consts::GENERATION_ATTEMPT_FACTOR;
use crate::polar_to_cartesian;
use crate::world::ZoneConfig;

/// How many of one category to place, and under which constraints
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRequest {
    pub category: ItemCategory,
    pub count: usize,
    pub min_distance_from_player: f32,
    pub min_spacing: f32,
}

impl SpawnRequest {
    /// Request using the category's default spawn rules
    pub fn for_category(category: ItemCategory, count: usize) -> Self {
        let rules = category.spawn_rules();
        Self {
            category,
            count,
            min_distance_from_player: rules.min_distance_from_player,
            min_spacing: rules.min_spacing,
        }
    }

    pub fn with_min_distance(mut self, distance: f32) -> Self {
        self.min_distance_from_player = distance;
        self
    }

    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.min_spacing = spacing;
        self
    }
}

/// Outcome of placing one category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryReport {
    pub category: ItemCategory,
    pub requested: usize,
    pub placed: usize,
    pub attempts: usize,
    /// The attempt budget ran out before `requested` items were placed
    pub exhausted: bool,
}

/// Items placed for a whole zone
#[derive(Debug, Clone, Default)]
pub struct Generated {
    pub items: Vec<WorldItem>,
    pub reports: Vec<CategoryReport>,
}

impl Generated {
    pub fn count(&self, category: ItemCategory) -> usize {
        self.items.iter().filter(|i| i.category() == category).count()
    }
}

/// Stable id: a pure function of category, running index and seed
pub fn item_id(category: ItemCategory, index: usize, seed: u64) -> String {
    format!("{}_{:x}_{}", category.prefix(), seed, index)
}

/// Uniform sample inside the zone's playable area, inset by `margin`
fn sample_position(rng: &mut dyn RandomSource, zone: &ZoneConfig, margin: f32) -> Vec2 {
    match zone.fence {
        Fence::Circle { center, radius } => {
            // r = R * sqrt(u) keeps the density uniform over the disc
            let r = (radius - margin).max(0.0) * (rng.random() as f32).sqrt();
            let theta = rng.random() as f32 * std::f32::consts::TAU;
            polar_to_cartesian(center, r, theta)
        }
        Fence::Rect => {
            let max_x = (zone.width - margin).max(margin);
            let max_y = (zone.height - margin).max(margin);
            Vec2::new(
                rng.random_range(margin as f64, max_x as f64) as f32,
                rng.random_range(margin as f64, max_y as f64) as f32,
            )
        }
    }
}

fn roll_payload(rng: &mut dyn RandomSource, category: ItemCategory) -> ItemPayload {
    match category {
        ItemCategory::Currency => ItemPayload::Currency {
            value: pick_weighted(rng, &COIN_WEIGHTS).unwrap_or(1),
        },
        ItemCategory::Hydration => ItemPayload::Hydration {
            drink: pick_weighted(rng, &DrinkKind::WEIGHTS).unwrap_or(DrinkKind::Water),
        },
        ItemCategory::Food => ItemPayload::Food {
            food: pick_weighted(rng, &FoodKind::WEIGHTS).unwrap_or(FoodKind::Apple),
        },
        ItemCategory::Consumable => ItemPayload::Consumable {
            effect: pick_weighted(rng, &EffectKind::WEIGHTS).unwrap_or(EffectKind::Sugar),
        },
        ItemCategory::Vehicle => ItemPayload::Vehicle {
            vehicle: pick_uniform(rng, &VehicleKind::ALL).unwrap_or(VehicleKind::Bicycle),
        },
        ItemCategory::Litter => ItemPayload::Litter {
            litter: pick_uniform(rng, &LitterKind::ALL).unwrap_or(LitterKind::Can),
        },
        ItemCategory::LightSource => ItemPayload::LightSource {
            battery: rng.random_range(40.0, 100.0).round() as f32,
        },
        ItemCategory::PowerCell => ItemPayload::PowerCell {
            charge: rng.random_range(30.0, 60.0).round() as u32,
        },
    }
}

/// Place up to `request.count` items of one category into `index`
pub fn spawn_category(
    rng: &mut dyn RandomSource,
    index: &mut SpatialIndex,
    zone: &ZoneConfig,
    request: &SpawnRequest,
) -> (Vec<WorldItem>, CategoryReport) {
    let rules = request.category.spawn_rules();
    let budget = request.count * GENERATION_ATTEMPT_FACTOR;
    let seed = rng.seed();

    let mut items = Vec::with_capacity(request.count);
    let mut siblings: HashSet<String> = HashSet::new();
    let mut attempts = 0;

    while items.len() < request.count && attempts < budget {
        attempts += 1;
        let pos = sample_position(rng, zone, rules.radius);

        if pos.distance(zone.spawn) < request.min_distance_from_player {
            continue;
        }
        let crowded = index
            .query_radius(pos, request.min_spacing)
            .entities
            .iter()
            .any(|e| siblings.contains(&e.id) && e.pos.distance(pos) < request.min_spacing);
        if crowded {
            continue;
        }

        let payload = roll_payload(rng, request.category);
        let id = item_id(request.category, items.len(), seed);
        if !index.insert(Entity::new(id.clone(), pos, rules.radius)) {
            continue;
        }
        siblings.insert(id.clone());
        items.push(WorldItem {
            id,
            pos,
            collected: false,
            payload,
        });
    }

    let exhausted = items.len() < request.count;
    if exhausted {
        log::debug!(
            "generation budget exhausted for {} in '{}': placed {}/{} after {} attempts",
            request.category,
            zone.id,
            items.len(),
            request.count,
            attempts
        );
    }
    let report = CategoryReport {
        category: request.category,
        requested: request.count,
        placed: items.len(),
        attempts,
        exhausted,
    };
    (items, report)
}

/// Populate a freshly entered zone, category by category in plan order
pub fn populate_zone(
    rng: &mut dyn RandomSource,
    index: &mut SpatialIndex,
    zone: &ZoneConfig,
    plan: &[SpawnRequest],
) -> Generated {
    let mut generated = Generated::default();
    for request in plan {
        let (items, report) = spawn_category(rng, index, zone, request);
        generated.items.extend(items);
        generated.reports.push(report);
    }
    log::debug!("populated '{}' with {} items", zone.id, generated.items.len());
    generated
}

/// Per-zone seed so a zone's contents don't depend on visit order
pub fn zone_seed(world_seed: u64, zone_id: &str) -> u64 {
    // FNV-1a over the id, folded with the world seed
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325 ^ world_seed;
    for byte in zone_id.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    hash
}
