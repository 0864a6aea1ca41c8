//! Player stat vector, bounds table and clamping
//!
//! Every additive change (decay, pickup, item use, effect) goes through
//! [`Stats::apply`], which clamps each stat against [`Stat::bounds`].

use serde::{Deserialize, Serialize};

use crate::lerp;
use crate::tuning::SpeedBands;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stat {
    Coin,
    Energy,
    Mood,
    Thirst,
    Hunger,
    Karma,
    SpeedBase,
    LightBattery,
}

impl Stat {
    pub const ALL: [Stat; 8] = [
        Stat::Coin,
        Stat::Energy,
        Stat::Mood,
        Stat::Thirst,
        Stat::Hunger,
        Stat::Karma,
        Stat::SpeedBase,
        Stat::LightBattery,
    ];

    /// Inclusive (min, max) for each stat
    pub const fn bounds(&self) -> (f32, f32) {
        match self {
            Stat::Coin => (0.0, 999_999.0),
            Stat::Energy => (0.0, 100.0),
            Stat::Mood => (0.0, 100.0),
            Stat::Thirst => (0.0, 100.0),
            Stat::Hunger => (0.0, 100.0),
            Stat::Karma => (-100.0, 100.0),
            Stat::SpeedBase => (40.0, 400.0),
            Stat::LightBattery => (0.0, 100.0),
        }
    }

    pub fn clamp(&self, value: f32) -> f32 {
        let (min, max) = self.bounds();
        if value.is_nan() {
            return min;
        }
        value.clamp(min, max)
    }
}

/// Player stats. Thirst and hunger read as "fullness": 100 is satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub coin: f32,
    pub energy: f32,
    pub mood: f32,
    pub thirst: f32,
    pub hunger: f32,
    pub karma: f32,
    pub speed_base: f32,
    pub light_battery: f32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            coin: 0.0,
            energy: 100.0,
            mood: 70.0,
            thirst: 100.0,
            hunger: 100.0,
            karma: 0.0,
            speed_base: 160.0,
            light_battery: 100.0,
        }
    }
}

/// Additive change to the needs/economy stats
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatDelta {
    pub coin: f32,
    pub energy: f32,
    pub mood: f32,
    pub thirst: f32,
    pub hunger: f32,
    pub karma: f32,
}

impl Stats {
    pub fn get(&self, stat: Stat) -> f32 {
        match stat {
            Stat::Coin => self.coin,
            Stat::Energy => self.energy,
            Stat::Mood => self.mood,
            Stat::Thirst => self.thirst,
            Stat::Hunger => self.hunger,
            Stat::Karma => self.karma,
            Stat::SpeedBase => self.speed_base,
            Stat::LightBattery => self.light_battery,
        }
    }

    fn slot(&mut self, stat: Stat) -> &mut f32 {
        match stat {
            Stat::Coin => &mut self.coin,
            Stat::Energy => &mut self.energy,
            Stat::Mood => &mut self.mood,
            Stat::Thirst => &mut self.thirst,
            Stat::Hunger => &mut self.hunger,
            Stat::Karma => &mut self.karma,
            Stat::SpeedBase => &mut self.speed_base,
            Stat::LightBattery => &mut self.light_battery,
        }
    }

    /// Add `delta` to `stat` and clamp; returns the new value
    pub fn apply(&mut self, stat: Stat, delta: f32) -> f32 {
        let slot = self.slot(stat);
        *slot = stat.clamp(*slot + delta);
        *slot
    }

    pub fn apply_delta(&mut self, delta: &StatDelta) {
        self.apply(Stat::Coin, delta.coin);
        self.apply(Stat::Energy, delta.energy);
        self.apply(Stat::Mood, delta.mood);
        self.apply(Stat::Thirst, delta.thirst);
        self.apply(Stat::Hunger, delta.hunger);
        self.apply(Stat::Karma, delta.karma);
    }

    /// Mean of the three physical needs
    pub fn needs_average(&self) -> f32 {
        (self.energy + self.thirst + self.hunger) / 3.0
    }

    /// Product of the energy/thirst/hunger/mood sub-multipliers
    pub fn speed_multiplier(&self, bands: &SpeedBands) -> f32 {
        energy_multiplier(self.energy, bands)
            * need_multiplier(self.thirst, bands.thirst_threshold, bands.thirst_floor)
            * need_multiplier(self.hunger, bands.hunger_threshold, bands.hunger_floor)
            * mood_multiplier(self.mood, bands)
    }
}

/// 1.0 above `high`, linear to `mid_mult` at `low`, linear to `floor` at 0
fn energy_multiplier(energy: f32, b: &SpeedBands) -> f32 {
    if energy >= b.energy_high {
        1.0
    } else if energy >= b.energy_low {
        lerp(b.energy_mid_mult, 1.0, (energy - b.energy_low) / (b.energy_high - b.energy_low))
    } else {
        lerp(b.energy_floor, b.energy_mid_mult, energy / b.energy_low)
    }
}

/// 1.0 at or above `threshold`, linear down to `floor` at 0
fn need_multiplier(value: f32, threshold: f32, floor: f32) -> f32 {
    if value >= threshold {
        1.0
    } else {
        lerp(floor, 1.0, value / threshold)
    }
}

/// Penalty below `mood_low`, neutral band, bonus above `mood_high`
fn mood_multiplier(mood: f32, b: &SpeedBands) -> f32 {
    if mood < b.mood_low {
        lerp(b.mood_floor, 1.0, mood / b.mood_low)
    } else if mood > b.mood_high {
        lerp(1.0, b.mood_bonus, (mood - b.mood_high) / (100.0 - b.mood_high))
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::{RandomSource, SeededRandom};

    #[test]
    fn zero_delta_leaves_stats_unchanged() {
        let mut stats = Stats::default();
        let before = stats;
        stats.apply_delta(&StatDelta::default());
        for stat in Stat::ALL {
            stats.apply(stat, 0.0);
        }
        assert_eq!(stats, before);
    }

    #[test]
    fn randomized_deltas_stay_in_bounds() {
        let mut rng = SeededRandom::new(2024);
        let mut stats = Stats::default();
        for _ in 0..1000 {
            let stat = Stat::ALL[(rng.random() * Stat::ALL.len() as f64) as usize];
            let (min, max) = stat.bounds();
            let before = stats.get(stat);
            let delta = rng.random_range(-2_000_000.0, 2_000_000.0) as f32;
            let after = stats.apply(stat, delta);

            assert!(after >= min && after <= max, "{stat:?} = {after}");
            if before + delta > max {
                assert_eq!(after, max);
            } else if before + delta < min {
                assert_eq!(after, min);
            }
        }
    }

    #[test]
    fn nan_clamps_to_minimum() {
        assert_eq!(Stat::Karma.clamp(f32::NAN), -100.0);
    }

    #[test]
    fn full_stats_move_at_full_speed() {
        let bands = SpeedBands::default();
        let stats = Stats {
            mood: 50.0,
            ..Stats::default()
        };
        assert_eq!(stats.speed_multiplier(&bands), 1.0);
    }

    #[test]
    fn depleted_needs_slow_the_player() {
        let bands = SpeedBands::default();
        let stats = Stats {
            energy: 0.0,
            thirst: 0.0,
            hunger: 0.0,
            mood: 0.0,
            ..Stats::default()
        };
        let expected = bands.energy_floor * bands.thirst_floor * bands.hunger_floor * bands.mood_floor;
        assert!((stats.speed_multiplier(&bands) - expected).abs() < 1e-6);
    }

    #[test]
    fn energy_bands_are_continuous() {
        let b = SpeedBands::default();
        let just_below = energy_multiplier(b.energy_low - 1e-3, &b);
        let at = energy_multiplier(b.energy_low, &b);
        assert!((just_below - at).abs() < 1e-3);
        assert_eq!(energy_multiplier(b.energy_high, &b), 1.0);
    }
}
