//! Data-driven game balance
//!
//! Every numeric knob of the simulation lives here. Persisted separately
//! from save games through the storage port.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::platform::Storage;
use crate::sim::generation::SpawnRequest;
use crate::sim::items::ItemCategory;

/// Difficulty presets scale need decay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Relaxed,
    #[default]
    Normal,
    Harsh,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Relaxed => "Relaxed",
            Difficulty::Normal => "Normal",
            Difficulty::Harsh => "Harsh",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "relaxed" | "easy" => Some(Difficulty::Relaxed),
            "normal" => Some(Difficulty::Normal),
            "harsh" | "hard" => Some(Difficulty::Harsh),
            _ => None,
        }
    }

    /// Multiplier on thirst/hunger/energy decay
    pub fn decay_scale(&self) -> f32 {
        match self {
            Difficulty::Relaxed => 0.6,
            Difficulty::Normal => 1.0,
            Difficulty::Harsh => 1.5,
        }
    }
}

/// Need decay and recovery rates
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NeedsTuning {
    /// Thirst lost per real second
    pub thirst_per_sec: f32,
    /// Hunger lost per real second
    pub hunger_per_sec: f32,
    /// Energy lost per world unit walked
    pub energy_per_unit: f32,
    /// Energy-per-distance factor while riding (0.1 = ten times cheaper)
    pub riding_energy_factor: f32,
    /// Fraction of the gap to the needs average mood closes per second
    pub mood_convergence_rate: f32,
    /// Energy regained per second while resting
    pub rest_energy_per_sec: f32,
    /// Light battery drained per second while lights are on
    pub light_drain_per_sec: f32,
}

impl Default for NeedsTuning {
    fn default() -> Self {
        Self {
            thirst_per_sec: 0.25,
            hunger_per_sec: 0.15,
            energy_per_unit: 0.004,
            riding_energy_factor: 0.1,
            mood_convergence_rate: 0.02,
            rest_energy_per_sec: 2.0,
            light_drain_per_sec: 0.5,
        }
    }
}

/// Threshold bands for the stat speed multiplier
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedBands {
    /// Energy at or above this moves at full speed
    pub energy_high: f32,
    /// Below this energy the steep band starts
    pub energy_low: f32,
    /// Multiplier at `energy_low`
    pub energy_mid_mult: f32,
    /// Multiplier at zero energy
    pub energy_floor: f32,
    pub thirst_threshold: f32,
    pub thirst_floor: f32,
    pub hunger_threshold: f32,
    pub hunger_floor: f32,
    /// Mood below this slows the player
    pub mood_low: f32,
    pub mood_floor: f32,
    /// Mood above this speeds the player up
    pub mood_high: f32,
    /// Multiplier at mood 100
    pub mood_bonus: f32,
}

impl Default for SpeedBands {
    fn default() -> Self {
        Self {
            energy_high: 50.0,
            energy_low: 20.0,
            energy_mid_mult: 0.7,
            energy_floor: 0.4,
            thirst_threshold: 40.0,
            thirst_floor: 0.6,
            hunger_threshold: 40.0,
            hunger_floor: 0.7,
            mood_low: 30.0,
            mood_floor: 0.8,
            mood_high: 70.0,
            mood_bonus: 1.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementTuning {
    /// Speed multiplier while riding a vehicle
    pub riding_multiplier: f32,
    /// Fraction of speed kept when bouncing off a circular fence
    pub rebound_damping: f32,
    /// Rebound velocity decay per second
    pub rebound_decay_per_sec: f32,
    /// Player collision diameter
    pub player_size: f32,
    pub pickup_radius: f32,
    /// Radius for mounting vehicles
    pub interact_radius: f32,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            riding_multiplier: 1.5,
            rebound_damping: 0.6,
            rebound_decay_per_sec: 3.0,
            player_size: crate::consts::PLAYER_SIZE,
            pickup_radius: 24.0,
            interact_radius: 48.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockTuning {
    pub start_day: u32,
    pub start_hour: u32,
    /// Game minutes per real second at time-scale 1.0
    pub minutes_per_real_second: f64,
    pub min_time_scale: f32,
    pub max_time_scale: f32,
}

impl Default for ClockTuning {
    fn default() -> Self {
        Self {
            start_day: 1,
            start_hour: 8,
            minutes_per_real_second: 1.0,
            min_time_scale: 0.01,
            max_time_scale: 240.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: ItemCategory,
    pub count: usize,
}

/// How many items of each category a zone of `reference_area` receives
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationTuning {
    pub reference_area: f32,
    pub counts: Vec<CategoryCount>,
    /// Upper bound on the area scale factor
    pub max_area_scale: f32,
}

impl Default for GenerationTuning {
    fn default() -> Self {
        let counts = [
            (ItemCategory::Currency, 20),
            (ItemCategory::Hydration, 6),
            (ItemCategory::Food, 5),
            (ItemCategory::Consumable, 3),
            (ItemCategory::Vehicle, 2),
            (ItemCategory::Litter, 25),
            (ItemCategory::LightSource, 1),
            (ItemCategory::PowerCell, 2),
        ]
        .into_iter()
        .map(|(category, count)| CategoryCount { category, count })
        .collect();
        Self {
            reference_area: 1600.0 * 1200.0,
            counts,
            max_area_scale: 4.0,
        }
    }
}

impl GenerationTuning {
    /// Spawn requests for a zone of the given extents
    pub fn plan_for(&self, width: f32, height: f32) -> Vec<SpawnRequest> {
        let scale = ((width * height) / self.reference_area).clamp(0.0, self.max_area_scale);
        self.counts
            .iter()
            .map(|c| SpawnRequest::for_category(c.category, (c.count as f32 * scale).round() as usize))
            .collect()
    }
}

/// Complete balance configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub difficulty: Difficulty,
    pub needs: NeedsTuning,
    pub speed_bands: SpeedBands,
    pub movement: MovementTuning,
    pub clock: ClockTuning,
    pub generation: GenerationTuning,
    /// Maximum simultaneous temporary effects
    pub max_effect_stack: usize,
    /// Seconds after a transition before boundaries are checked again
    pub transition_cooldown_secs: f32,
    pub grid_cell_size: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            needs: NeedsTuning::default(),
            speed_bands: SpeedBands::default(),
            movement: MovementTuning::default(),
            clock: ClockTuning::default(),
            generation: GenerationTuning::default(),
            max_effect_stack: 3,
            transition_cooldown_secs: 0.5,
            grid_cell_size: crate::consts::GRID_CELL_SIZE,
        }
    }
}

impl Tuning {
    /// Storage key
    const STORAGE_KEY: &'static str = "roam_tuning";

    /// Defaults with a difficulty preset applied
    pub fn from_preset(difficulty: Difficulty) -> Self {
        let mut tuning = Self::default();
        tuning.apply_preset(difficulty);
        tuning
    }

    pub fn apply_preset(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    /// Thirst/hunger/energy decay scale from the difficulty preset
    pub fn decay_scale(&self) -> f32 {
        self.difficulty.decay_scale()
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_effect_stack == 0 {
            return Err(ConfigError::Invalid("max_effect_stack must be at least 1".into()));
        }
        if !(self.grid_cell_size > 0.0) {
            return Err(ConfigError::Invalid("grid_cell_size must be positive".into()));
        }
        let clock = &self.clock;
        if !(clock.min_time_scale > 0.0 && clock.max_time_scale >= clock.min_time_scale) {
            return Err(ConfigError::Invalid(format!(
                "time scale range [{}, {}] must be positive and ordered",
                clock.min_time_scale, clock.max_time_scale
            )));
        }
        let generation = &self.generation;
        if !(generation.reference_area > 0.0) {
            return Err(ConfigError::Invalid("generation reference_area must be positive".into()));
        }
        if !(generation.max_area_scale >= 0.0) {
            return Err(ConfigError::Invalid(
                "generation max_area_scale must not be negative".into(),
            ));
        }
        let b = &self.speed_bands;
        if !(b.energy_high > b.energy_low && b.energy_low > 0.0) {
            return Err(ConfigError::Invalid("energy bands must satisfy 0 < low < high".into()));
        }
        if !(b.thirst_threshold > 0.0 && b.hunger_threshold > 0.0) {
            return Err(ConfigError::Invalid("need thresholds must be positive".into()));
        }
        if !(b.mood_low > 0.0 && b.mood_high > b.mood_low && b.mood_high < 100.0) {
            return Err(ConfigError::Invalid("mood bands must satisfy 0 < low < high < 100".into()));
        }
        Ok(())
    }

    /// Load from storage, falling back to defaults
    pub async fn load<S: Storage>(storage: &S) -> Self {
        match storage.load(Self::STORAGE_KEY).await {
            Ok(Some(json)) => match Self::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning ({})", tuning.difficulty.as_str());
                    return tuning;
                }
                Err(e) => log::warn!("Ignoring stored tuning: {e}"),
            },
            Ok(None) => {}
            Err(e) => log::warn!("Could not read tuning: {e}"),
        }
        log::info!("Using default tuning");
        Self::default()
    }

    pub async fn save<S: Storage>(&self, storage: &mut S) -> Result<(), crate::PersistenceError> {
        let json = serde_json::to_string(self).map_err(|source| crate::PersistenceError::Serde {
            key: Self::STORAGE_KEY.to_string(),
            source,
        })?;
        storage.save(Self::STORAGE_KEY, json).await?;
        log::info!("Tuning saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStorage;

    #[test]
    fn difficulty_parses_aliases() {
        assert_eq!(Difficulty::from_str("HARD"), Some(Difficulty::Harsh));
        assert_eq!(Difficulty::from_str("relaxed"), Some(Difficulty::Relaxed));
        assert_eq!(Difficulty::from_str("nightmare"), None);
        assert_eq!(Difficulty::Normal.as_str(), "Normal");
    }

    #[test]
    fn preset_scales_decay() {
        assert!(Tuning::from_preset(Difficulty::Harsh).decay_scale() > Tuning::default().decay_scale());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let tuning = Tuning::from_json(r#"{"max_effect_stack": 5, "needs": {"thirst_per_sec": 1.0}}"#).unwrap();
        assert_eq!(tuning.max_effect_stack, 5);
        assert_eq!(tuning.needs.thirst_per_sec, 1.0);
        assert_eq!(tuning.needs.hunger_per_sec, NeedsTuning::default().hunger_per_sec);
    }

    #[test]
    fn invalid_tuning_is_rejected() {
        assert!(matches!(
            Tuning::from_json(r#"{"max_effect_stack": 0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(Tuning::from_json("not json"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn bad_generation_scale_is_rejected() {
        for json in [
            r#"{"generation": {"max_area_scale": -1.0}}"#,
            r#"{"generation": {"reference_area": 0.0}}"#,
        ] {
            assert!(
                matches!(Tuning::from_json(json), Err(ConfigError::Invalid(_))),
                "{json} should be rejected"
            );
        }
        let zero_cap = Tuning::from_json(r#"{"generation": {"max_area_scale": 0.0}}"#).unwrap();
        assert!(zero_cap.generation.plan_for(1600.0, 1200.0).iter().all(|r| r.count == 0));
    }

    #[test]
    fn plan_scales_with_area() {
        let generation = GenerationTuning::default();
        let full = generation.plan_for(1600.0, 1200.0);
        let quarter = generation.plan_for(800.0, 600.0);
        let coins = |plan: &[SpawnRequest]| {
            plan.iter()
                .find(|r| r.category == ItemCategory::Currency)
                .map(|r| r.count)
        };
        assert_eq!(coins(&full), Some(20));
        assert_eq!(coins(&quarter), Some(5));
    }

    #[tokio::test]
    async fn load_falls_back_and_round_trips() {
        let mut storage = MemoryStorage::new();
        assert_eq!(Tuning::load(&storage).await.max_effect_stack, 3);

        let mut tuning = Tuning::from_preset(Difficulty::Relaxed);
        tuning.max_effect_stack = 4;
        tuning.save(&mut storage).await.unwrap();

        let loaded = Tuning::load(&storage).await;
        assert_eq!(loaded.difficulty, Difficulty::Relaxed);
        assert_eq!(loaded.max_effect_stack, 4);
    }
}
