//! In-game clock
//!
//! `total_minutes` is the single source of truth; day/hour/minute are always
//! derived from it and never decremented directly.

use serde::{Deserialize, Serialize};

pub const MINUTES_PER_HOUR: u64 = 60;
pub const MINUTES_PER_DAY: u64 = 24 * MINUTES_PER_HOUR;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameClock {
    /// Monotonic in-game minutes since day 1, 00:00
    total_minutes: f64,
    /// Value of `total_minutes` when the clock was started
    #[serde(default)]
    start_minutes: f64,
    /// Game minutes per real second at time-scale 1.0
    minutes_per_real_second: f64,
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new(1, 8, 0, 1.0)
    }
}

impl GameClock {
    /// Start at `day` (>= 1), `hour`, `minute`
    pub fn new(day: u32, hour: u32, minute: u32, minutes_per_real_second: f64) -> Self {
        let day = day.max(1) as u64 - 1;
        let total = day * MINUTES_PER_DAY
            + (hour as u64 % 24) * MINUTES_PER_HOUR
            + (minute as u64 % MINUTES_PER_HOUR);
        Self {
            total_minutes: total as f64,
            start_minutes: total as f64,
            minutes_per_real_second: minutes_per_real_second.max(0.0),
        }
    }

    /// Advance by real `dt` seconds at `time_scale`. Negative or NaN inputs
    /// are ignored so the counter never decreases.
    pub fn advance(&mut self, dt: f32, time_scale: f32) {
        let step = dt as f64 * self.minutes_per_real_second * time_scale as f64;
        if step > 0.0 && step.is_finite() {
            self.total_minutes += step;
        }
    }

    /// Absolute minutes since day 1, 00:00 (a clock started at 08:00 reads 480)
    pub fn total_minutes(&self) -> f64 {
        self.total_minutes
    }

    /// Minutes advanced since the clock was started
    pub fn elapsed_minutes(&self) -> f64 {
        self.total_minutes - self.start_minutes
    }

    fn whole_minutes(&self) -> u64 {
        self.total_minutes.floor() as u64
    }

    /// Day number, starting at 1
    pub fn day(&self) -> u32 {
        (self.whole_minutes() / MINUTES_PER_DAY) as u32 + 1
    }

    /// Hour in [0, 24)
    pub fn hour(&self) -> u32 {
        ((self.whole_minutes() % MINUTES_PER_DAY) / MINUTES_PER_HOUR) as u32
    }

    /// Minute in [0, 60)
    pub fn minute(&self) -> u32 {
        (self.whole_minutes() % MINUTES_PER_HOUR) as u32
    }

    /// Night runs from 20:00 to 06:00
    pub fn is_night(&self) -> bool {
        let h = self.hour();
        !(6..20).contains(&h)
    }

    /// "Day 3, 07:45"
    pub fn label(&self) -> String {
        format!("Day {}, {:02}:{:02}", self.day(), self.hour(), self.minute())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn one_second_at_scale_sixty_is_one_hour() {
        let mut clock = GameClock::new(1, 8, 0, 1.0);
        clock.advance(1.0, 60.0);
        assert_eq!(clock.elapsed_minutes(), 60.0);
        assert_eq!(clock.total_minutes(), 540.0);
        assert_eq!((clock.day(), clock.hour(), clock.minute()), (1, 9, 0));
    }

    #[test]
    fn rolls_over_midnight() {
        let mut clock = GameClock::new(1, 23, 30, 1.0);
        clock.advance(45.0, 1.0);
        assert_eq!((clock.day(), clock.hour(), clock.minute()), (2, 0, 15));
        assert_eq!(clock.label(), "Day 2, 00:15");
    }

    #[test]
    fn negative_dt_is_ignored() {
        let mut clock = GameClock::default();
        let before = clock.total_minutes();
        clock.advance(-5.0, 1.0);
        clock.advance(1.0, f32::NAN);
        assert_eq!(clock.total_minutes(), before);
    }

    #[test]
    fn night_window() {
        assert!(GameClock::new(1, 22, 0, 1.0).is_night());
        assert!(GameClock::new(1, 5, 59, 1.0).is_night());
        assert!(!GameClock::new(1, 12, 0, 1.0).is_night());
    }

    proptest! {
        #[test]
        fn clock_is_monotonic(steps in prop::collection::vec((0.0f32..10.0, 0.0f32..240.0), 1..200)) {
            let mut clock = GameClock::default();
            let mut last = clock.total_minutes();
            for (dt, scale) in steps {
                clock.advance(dt, scale);
                prop_assert!(clock.total_minutes() >= last);
                prop_assert!(clock.hour() < 24);
                prop_assert!(clock.minute() < 60);
                prop_assert!(clock.day() >= 1);
                last = clock.total_minutes();
            }
        }
    }
}
