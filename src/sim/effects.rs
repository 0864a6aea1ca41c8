//! Temporary effects with stacking and bounded stack size
//!
//! Durations count down in real seconds. The `time_scale` an effect exports
//! only bends the game clock; it never speeds up or slows down the effect's
//! own countdown.

use serde::{Deserialize, Serialize};

use super::stats::StatDelta;

/// Minimum product of effect speed multipliers
pub const MIN_EFFECT_SPEED_MULT: f32 = 0.1;

/// Weight applied to a newly stacked same-type effect
pub const STACK_WEIGHT: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EffectKind {
    Caffeine,
    Sugar,
    Alcohol,
    Cannabis,
    Psilocybin,
    Stimulant,
}

/// Per-second stat deltas, speed delta and clock multiplier exported by an effect
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectVector {
    /// Fractional speed change (0.3 = +30% at full intensity)
    pub speed: f32,
    pub energy: f32,
    pub mood: f32,
    pub thirst: f32,
    pub hunger: f32,
    pub karma: f32,
    /// Multiplier on game-clock advancement (1.0 = neutral)
    pub time_scale: f32,
}

impl Default for EffectVector {
    fn default() -> Self {
        Self {
            speed: 0.0,
            energy: 0.0,
            mood: 0.0,
            thirst: 0.0,
            hunger: 0.0,
            karma: 0.0,
            time_scale: 1.0,
        }
    }
}

impl EffectKind {
    pub const WEIGHTS: [(EffectKind, f32); 6] = [
        (EffectKind::Caffeine, 0.3),
        (EffectKind::Sugar, 0.3),
        (EffectKind::Alcohol, 0.15),
        (EffectKind::Cannabis, 0.12),
        (EffectKind::Psilocybin, 0.08),
        (EffectKind::Stimulant, 0.05),
    ];

    /// Base (duration secs, intensity, vector) for a fresh dose
    pub fn profile(&self) -> (f32, f32, EffectVector) {
        let base = EffectVector::default();
        match self {
            EffectKind::Caffeine => (
                60.0,
                0.6,
                EffectVector {
                    speed: 0.15,
                    energy: 0.5,
                    thirst: -0.1,
                    ..base
                },
            ),
            EffectKind::Sugar => (
                30.0,
                0.5,
                EffectVector {
                    speed: 0.1,
                    energy: 0.3,
                    mood: 0.2,
                    ..base
                },
            ),
            EffectKind::Alcohol => (
                90.0,
                0.7,
                EffectVector {
                    speed: -0.25,
                    mood: 0.4,
                    thirst: -0.2,
                    karma: -0.02,
                    time_scale: 1.3,
                    ..base
                },
            ),
            EffectKind::Cannabis => (
                120.0,
                0.6,
                EffectVector {
                    speed: -0.2,
                    mood: 0.3,
                    hunger: -0.3,
                    time_scale: 0.7,
                    ..base
                },
            ),
            EffectKind::Psilocybin => (
                180.0,
                0.8,
                EffectVector {
                    speed: -0.1,
                    mood: 0.25,
                    time_scale: 0.5,
                    ..base
                },
            ),
            EffectKind::Stimulant => (
                45.0,
                0.9,
                EffectVector {
                    speed: 0.5,
                    energy: 0.8,
                    mood: -0.1,
                    hunger: -0.2,
                    karma: -0.05,
                    time_scale: 1.5,
                    ..base
                },
            ),
        }
    }
}

/// A single active temporary effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriveEffect {
    pub kind: EffectKind,
    /// Remaining duration in real seconds
    pub remaining: f32,
    /// Strength in [0, 1]
    pub intensity: f32,
    pub vector: EffectVector,
}

impl DriveEffect {
    pub fn new(kind: EffectKind, duration: f32, intensity: f32, vector: EffectVector) -> Self {
        Self {
            kind,
            remaining: duration.max(0.0),
            intensity: intensity.clamp(0.0, 1.0),
            vector,
        }
    }

    /// A standard dose of `kind`
    pub fn dose(kind: EffectKind) -> Self {
        let (duration, intensity, vector) = kind.profile();
        Self::new(kind, duration, intensity, vector)
    }

    /// Fold a new same-type dose into this one (half-weight additive)
    pub fn stack(&mut self, incoming: &DriveEffect) {
        self.intensity = (self.intensity + incoming.intensity * STACK_WEIGHT).min(1.0);
        self.remaining += incoming.remaining * STACK_WEIGHT;
    }

    pub fn speed_multiplier(&self) -> f32 {
        1.0 + self.vector.speed * self.intensity
    }
}

/// What happened when an effect was added
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AddOutcome {
    Added,
    Stacked,
    /// Stack was full; the shortest-remaining effect was evicted first
    Evicted(EffectKind),
}

/// Bounded list of active effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveEffects {
    effects: Vec<DriveEffect>,
    max_stack: usize,
}

impl ActiveEffects {
    pub fn new(max_stack: usize) -> Self {
        Self {
            effects: Vec::new(),
            max_stack: max_stack.max(1),
        }
    }

    pub fn max_stack(&self) -> usize {
        self.max_stack
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DriveEffect> {
        self.effects.iter()
    }

    pub fn get(&self, kind: EffectKind) -> Option<&DriveEffect> {
        self.effects.iter().find(|e| e.kind == kind)
    }

    /// Add an effect, stacking onto an active same-type effect if present
    pub fn add(&mut self, effect: DriveEffect) -> AddOutcome {
        if let Some(existing) = self.effects.iter_mut().find(|e| e.kind == effect.kind) {
            existing.stack(&effect);
            return AddOutcome::Stacked;
        }

        let mut outcome = AddOutcome::Added;
        if self.effects.len() >= self.max_stack {
            let shortest = self
                .effects
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| a.remaining.total_cmp(&b.remaining))
                .map(|(i, _)| i);
            if let Some(idx) = shortest {
                let evicted = self.effects.remove(idx);
                log::debug!("effect stack full, evicted {:?}", evicted.kind);
                outcome = AddOutcome::Evicted(evicted.kind);
            }
        }
        self.effects.push(effect);
        outcome
    }

    /// Count down by real `dt` and prune expired effects; returns what expired
    pub fn tick(&mut self, dt: f32) -> Vec<EffectKind> {
        let dt = dt.max(0.0);
        for effect in &mut self.effects {
            effect.remaining -= dt;
        }
        let expired = self
            .effects
            .iter()
            .filter(|e| e.remaining <= 0.0)
            .map(|e| e.kind)
            .collect();
        self.effects.retain(|e| e.remaining > 0.0);
        expired
    }

    /// Product of effect speed multipliers, floored at [`MIN_EFFECT_SPEED_MULT`]
    pub fn speed_multiplier(&self) -> f32 {
        self.effects
            .iter()
            .map(DriveEffect::speed_multiplier)
            .product::<f32>()
            .max(MIN_EFFECT_SPEED_MULT)
    }

    /// Product of every effect's time-scale field (1.0 when none are active)
    pub fn time_scale(&self) -> f32 {
        self.effects.iter().map(|e| e.vector.time_scale).product()
    }

    /// Stat changes contributed by all effects over `dt`
    pub fn stat_delta(&self, dt: f32) -> StatDelta {
        let mut delta = StatDelta::default();
        for e in &self.effects {
            let k = e.intensity * dt;
            delta.energy += e.vector.energy * k;
            delta.mood += e.vector.mood * k;
            delta.thirst += e.vector.thirst * k;
            delta.hunger += e.vector.hunger * k;
            delta.karma += e.vector.karma * k;
        }
        delta
    }
}

/// Combined clock scale: zone scale times effect scales, kept in `[min, max]`
pub fn combined_time_scale(zone_scale: f32, effects: &ActiveEffects, min: f32, max: f32) -> f32 {
    let scale = zone_scale * effects.time_scale();
    if scale.is_nan() {
        return min;
    }
    scale.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn effect(kind: EffectKind, duration: f32, intensity: f32) -> DriveEffect {
        DriveEffect::new(kind, duration, intensity, EffectVector::default())
    }

    #[test]
    fn stimulant_dose_drives_energy_not_thirst() {
        let dose = DriveEffect::dose(EffectKind::Stimulant);
        assert_eq!(dose.vector.thirst, 0.0);
        assert!(dose.vector.energy > 0.0);
        assert_eq!(dose.vector.time_scale, 1.5);
    }

    #[test]
    fn same_type_stacks_instead_of_replacing() {
        let mut effects = ActiveEffects::new(3);
        effects.add(effect(EffectKind::Caffeine, 10.0, 0.6));
        let outcome = effects.add(effect(EffectKind::Caffeine, 8.0, 0.6));

        assert_eq!(outcome, AddOutcome::Stacked);
        assert_eq!(effects.len(), 1);
        let e = effects.get(EffectKind::Caffeine).unwrap();
        assert_eq!(e.intensity, 0.6 + 0.6 * 0.5);
        assert_eq!(e.remaining, 14.0);
    }

    #[test]
    fn stacked_intensity_caps_at_one() {
        let mut effects = ActiveEffects::new(3);
        effects.add(effect(EffectKind::Sugar, 10.0, 0.9));
        effects.add(effect(EffectKind::Sugar, 10.0, 0.9));
        assert_eq!(effects.get(EffectKind::Sugar).unwrap().intensity, 1.0);
    }

    #[test]
    fn full_stack_evicts_shortest_remaining() {
        let mut effects = ActiveEffects::new(2);
        effects.add(effect(EffectKind::Caffeine, 5.0, 0.5)); // oldest but longer
        effects.add(effect(EffectKind::Sugar, 2.0, 0.5)); // newest but shortest
        let outcome = effects.add(effect(EffectKind::Alcohol, 10.0, 0.5));

        assert_eq!(outcome, AddOutcome::Evicted(EffectKind::Sugar));
        assert_eq!(effects.len(), 2);
        assert!(effects.get(EffectKind::Caffeine).is_some());
        assert!(effects.get(EffectKind::Alcohol).is_some());
    }

    #[test]
    fn duration_counts_real_seconds_regardless_of_time_scale() {
        let mut effects = ActiveEffects::new(3);
        effects.add(DriveEffect::new(
            EffectKind::Psilocybin,
            3.0,
            1.0,
            EffectVector {
                time_scale: 0.1,
                ..Default::default()
            },
        ));
        assert!(effects.tick(2.0).is_empty());
        assert_eq!(effects.tick(1.0), vec![EffectKind::Psilocybin]);
        assert!(effects.is_empty());
    }

    #[test]
    fn speed_multiplier_floors() {
        let mut effects = ActiveEffects::new(3);
        let slow = EffectVector {
            speed: -0.95,
            ..Default::default()
        };
        effects.add(DriveEffect::new(EffectKind::Alcohol, 10.0, 1.0, slow));
        effects.add(DriveEffect::new(EffectKind::Cannabis, 10.0, 1.0, slow));
        assert_eq!(effects.speed_multiplier(), MIN_EFFECT_SPEED_MULT);
        assert_eq!(ActiveEffects::new(3).speed_multiplier(), 1.0);
    }

    #[test]
    fn combined_time_scale_is_clamped() {
        let mut effects = ActiveEffects::new(3);
        assert_eq!(combined_time_scale(2.0, &effects, 0.01, 240.0), 2.0);
        effects.add(DriveEffect::new(
            EffectKind::Psilocybin,
            10.0,
            1.0,
            EffectVector {
                time_scale: 0.0,
                ..Default::default()
            },
        ));
        assert_eq!(combined_time_scale(2.0, &effects, 0.01, 240.0), 0.01);
        assert_eq!(combined_time_scale(1000.0, &ActiveEffects::new(3), 0.01, 240.0), 240.0);
    }

    proptest! {
        #[test]
        fn stacking_law(a in 0.0f32..=1.0, da in 0.0f32..500.0, b in 0.0f32..=1.0, db in 0.0f32..500.0) {
            let mut effects = ActiveEffects::new(4);
            effects.add(effect(EffectKind::Stimulant, da, a));
            effects.add(effect(EffectKind::Stimulant, db, b));
            let e = effects.get(EffectKind::Stimulant).unwrap();
            prop_assert_eq!(e.intensity, (a + b * 0.5).min(1.0));
            prop_assert_eq!(e.remaining, da + db * 0.5);
        }

        #[test]
        fn stack_never_exceeds_max(kinds in prop::collection::vec(0usize..6, 0..40), max in 1usize..5) {
            let mut effects = ActiveEffects::new(max);
            for k in kinds {
                effects.add(DriveEffect::dose(EffectKind::WEIGHTS[k].0));
                prop_assert!(effects.len() <= max);
            }
        }
    }
}
