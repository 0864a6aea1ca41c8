//! Per-frame simulation tick
//!
//! Advances one player through a variable real-time `dt`. Order within a
//! tick is fixed: actions, temporal effects, movement and bounds, need
//! decay, light drain, pickups, clock, then the zone boundary check.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bounds::{reflect_velocity, resolve};
use super::effects::combined_time_scale;
use super::events::{SimEvent, TickServices};
use super::items::{InventoryItem, ItemCategory, ItemPayload, WorldItem};
use super::player::{PlayerState, RiddenVehicle};
use super::spatial::{Entity, SpatialIndex};
use super::state::{GameState, log_reports};
use super::stats::Stat;
use crate::sim::bounds::Fence;
use crate::tuning::Tuning;
use crate::world::ZoneState;

/// Rebound speeds below this snap to zero
const REBOUND_EPSILON: f32 = 1.0;

/// Input commands for a single tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// Desired walking direction; normalized internally
    pub direction: Option<Vec2>,
    /// Toggle resting
    pub rest: bool,
    /// Mount the nearest vehicle, or dismount
    pub mount: bool,
    /// Consume one unit of an inventory item
    pub use_item: Option<InventoryItem>,
    pub toggle_light: bool,
}

/// Advance the simulation by `dt` real seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32, services: &mut TickServices<'_>) {
    let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
    let now_ms = services.time.now_ms();
    state.time_ticks += 1;
    state.transitions.begin_tick(dt);

    handle_actions(state, input, services);
    tick_effects(&mut state.player, dt, services);

    let distance = move_player(state, input, dt);
    decay_needs(&mut state.player, &state.tuning, distance, dt);
    drain_light(&mut state.player, &state.tuning, dt, services);
    collect_pickups(state, services);

    let zone_scale = state
        .transitions
        .current_config()
        .map(|z| z.time_scale)
        .unwrap_or(1.0);
    let scale = combined_time_scale(
        zone_scale,
        &state.player.effects,
        state.tuning.clock.min_time_scale,
        state.tuning.clock.max_time_scale,
    );
    state.clock.advance(dt, scale);

    let zone = state.transitions.current_zone().clone();
    state.transitions.store_mut().prune_events(&zone, now_ms);

    check_transition(state, now_ms, services);
}

fn handle_actions(state: &mut GameState, input: &TickInput, services: &mut TickServices<'_>) {
    let player = &mut state.player;

    if input.rest {
        player.resting = !player.resting;
        services.events.push(SimEvent::RestToggled {
            resting: player.resting,
        });
    }

    if input.mount && player.boarded_vehicle.is_none() {
        let interact = state.tuning.movement.interact_radius;
        let (index, zone) = state.transitions.zone_parts_mut();
        if let Some(ridden) = player.riding.take() {
            let id = ridden.id.clone();
            drop_vehicle(index, zone, ridden, player.pos);
            services.events.push(SimEvent::Dismounted { vehicle_id: id });
        } else if let Some(ridden) = take_nearest_vehicle(index, zone, player.pos, interact) {
            player.resting = false;
            services.events.push(SimEvent::Mounted {
                vehicle_id: ridden.id.clone(),
            });
            player.riding = Some(ridden);
        }
    }

    if let Some(item) = input.use_item {
        let outcome = player.use_item(item);
        if !outcome.success {
            log::debug!("use {item:?} failed: {}", outcome.message);
        }
        services.events.push(SimEvent::ItemUsed {
            item,
            success: outcome.success,
        });
        if let Some((kind, _)) = outcome.effect {
            services.events.push(SimEvent::EffectApplied { kind });
        }
    }

    if input.toggle_light && player.toggle_light() {
        services.events.push(SimEvent::LightsToggled {
            on: player.lights_on,
        });
    }
}

/// Nearest uncollected vehicle within `radius`, lifted out of the zone
fn take_nearest_vehicle(
    index: &mut SpatialIndex,
    zone: &mut ZoneState,
    pos: Vec2,
    radius: f32,
) -> Option<RiddenVehicle> {
    let nearest = index
        .query_radius(pos, radius)
        .entities
        .iter()
        .filter(|e| {
            zone.item(&e.id)
                .is_some_and(|i| !i.collected && i.category() == ItemCategory::Vehicle)
        })
        .min_by(|a, b| a.pos.distance_squared(pos).total_cmp(&b.pos.distance_squared(pos)))
        .map(|e| e.id.clone())?;

    let item = zone.item_mut(&nearest)?;
    let ItemPayload::Vehicle { vehicle } = item.payload else {
        return None;
    };
    item.collected = true;
    index.remove(&nearest);
    Some(RiddenVehicle {
        id: nearest,
        kind: vehicle,
    })
}

/// Park a ridden vehicle at `pos` in the current zone
fn drop_vehicle(index: &mut SpatialIndex, zone: &mut ZoneState, ridden: RiddenVehicle, pos: Vec2) {
    let item = match zone.item_mut(&ridden.id) {
        Some(item) => {
            item.pos = pos;
            item.collected = false;
            item.clone()
        }
        None => {
            // Ridden in from another zone
            let item = WorldItem {
                id: ridden.id,
                pos,
                collected: false,
                payload: ItemPayload::Vehicle {
                    vehicle: ridden.kind,
                },
            };
            zone.items.push(item.clone());
            item
        }
    };
    index.insert(Entity::new(item.id.clone(), item.pos, item.radius()));
}

fn tick_effects(player: &mut PlayerState, dt: f32, services: &mut TickServices<'_>) {
    let delta = player.effects.stat_delta(dt);
    player.stats.apply_delta(&delta);
    for kind in player.effects.tick(dt) {
        services.events.push(SimEvent::EffectExpired { kind });
    }
}

/// Walk, resolve bounds and apply rebound; returns distance actually moved
fn move_player(state: &mut GameState, input: &TickInput, dt: f32) -> f32 {
    let Some(config) = state.transitions.current_config() else {
        return 0.0;
    };
    let (fence, width, height) = (config.fence, config.width, config.height);
    let movement = &state.tuning.movement;
    let player = &mut state.player;

    let mut walk = Vec2::ZERO;
    if player.can_walk() {
        if let Some(direction) = input.direction {
            let riding = if player.is_riding() {
                movement.riding_multiplier
            } else {
                1.0
            };
            let speed = player.stats.speed_base
                * player.effects.speed_multiplier()
                * riding
                * player.stats.speed_multiplier(&state.tuning.speed_bands);
            walk = direction.normalize_or_zero() * speed;
        }
    }

    let velocity = walk + player.rebound;
    let start = player.pos;
    let result = resolve(fence, start + velocity * dt, width, height, movement.player_size / 2.0);
    player.pos = result.pos;
    player.velocity = velocity;

    let circular = matches!(fence, Fence::Circle { .. });
    if result.hit && circular && player.is_riding() {
        player.rebound = reflect_velocity(velocity, result.normal) * movement.rebound_damping;
    } else {
        player.rebound *= (1.0 - movement.rebound_decay_per_sec * dt).max(0.0);
    }
    if player.rebound.length() < REBOUND_EPSILON {
        player.rebound = Vec2::ZERO;
    }

    player.pos.distance(start)
}

fn decay_needs(player: &mut PlayerState, tuning: &Tuning, distance: f32, dt: f32) {
    let needs = &tuning.needs;
    let scale = tuning.decay_scale();
    let stats = &mut player.stats;

    stats.apply(Stat::Thirst, -needs.thirst_per_sec * scale * dt);
    stats.apply(Stat::Hunger, -needs.hunger_per_sec * scale * dt);

    let per_unit = if player.riding.is_some() {
        needs.energy_per_unit * needs.riding_energy_factor
    } else {
        needs.energy_per_unit
    };
    stats.apply(Stat::Energy, -distance * per_unit * scale);
    if player.resting {
        stats.apply(Stat::Energy, needs.rest_energy_per_sec * dt);
    }

    // Homeostasis toward the mean of the physical needs
    let pull = (stats.needs_average() - stats.mood) * needs.mood_convergence_rate * dt;
    stats.apply(Stat::Mood, pull);
}

fn drain_light(player: &mut PlayerState, tuning: &Tuning, dt: f32, services: &mut TickServices<'_>) {
    if !player.lights_on {
        return;
    }
    let left = player
        .stats
        .apply(Stat::LightBattery, -tuning.needs.light_drain_per_sec * dt);
    if left <= 0.0 {
        player.lights_on = false;
        services.events.push(SimEvent::BatteryDepleted);
        services.events.push(SimEvent::LightsToggled { on: false });
    }
}

fn collect_pickups(state: &mut GameState, services: &mut TickServices<'_>) {
    let player = &mut state.player;
    let radius = state.tuning.movement.pickup_radius;
    let (index, zone) = state.transitions.zone_parts_mut();

    let nearby: Vec<String> = index
        .query_radius(player.pos, radius)
        .entities
        .iter()
        .map(|e| e.id.clone())
        .collect();

    for id in nearby {
        let Some(item) = zone.item_mut(&id) else {
            continue;
        };
        if item.collected || item.category() == ItemCategory::Vehicle {
            continue;
        }
        item.collected = true;
        let category = item.category();
        apply_pickup(player, item.payload);
        index.remove(&id);
        services.events.push(SimEvent::ItemCollected { id, category });
    }
}

fn apply_pickup(player: &mut PlayerState, payload: ItemPayload) {
    match payload {
        ItemPayload::Currency { value } => {
            player.stats.apply(Stat::Coin, value as f32);
        }
        ItemPayload::Litter { litter } => {
            player.stats.apply(Stat::Karma, litter.karma());
            player.stats.apply(Stat::Coin, litter.refund());
        }
        ItemPayload::Hydration { drink } => player.add_item(InventoryItem::Drink(drink), 1),
        ItemPayload::Food { food } => player.add_item(InventoryItem::Food(food), 1),
        ItemPayload::Consumable { effect } => {
            player.add_item(InventoryItem::Consumable(effect), 1)
        }
        ItemPayload::LightSource { battery } => {
            player.add_item(InventoryItem::Flashlight, 1);
            let topped = player.stats.light_battery.max(battery);
            player.stats.light_battery = Stat::LightBattery.clamp(topped);
        }
        ItemPayload::PowerCell { charge } => player.add_item(InventoryItem::PowerCell(charge), 1),
        ItemPayload::Vehicle { .. } => {}
    }
}

fn check_transition(state: &mut GameState, now_ms: u64, services: &mut TickServices<'_>) {
    let Some(outcome) = state
        .transitions
        .check(state.player.pos, &mut state.rng, now_ms)
    else {
        return;
    };
    if !outcome.success {
        services.events.push(SimEvent::TransitionFailed {
            target: outcome.to,
            message: outcome.message,
        });
        return;
    }
    if let Some(arrival) = outcome.arrival {
        state.player.pos = arrival;
    }
    state.player.rebound = Vec2::ZERO;
    if outcome.first_visit {
        log_reports(&outcome.to, &outcome.reports);
    }
    services.events.push(SimEvent::ZoneChanged {
        from: outcome.from,
        to: outcome.to,
        first_visit: outcome.first_visit,
    });
}
