//! Headless driver: runs a scripted wander through the default world and
//! prints the final frame snapshot as JSON.
//!
//! Usage: `roam-sim [--seed N] [--seconds S] [--difficulty relaxed|normal|harsh]`

use clap::Parser;
use glam::Vec2;

use roam_sim::consts::{MAX_SUBSTEPS, SIM_DT};
use roam_sim::platform::{SystemTimeSource, TimeSource};
use roam_sim::sim::{EventLog, GameState, InventoryItem, SimEvent, TickInput, TickServices, tick};
use roam_sim::sim::items::{DrinkKind, FoodKind};
use roam_sim::world::ZoneRegistry;
use roam_sim::{Difficulty, Tuning};

#[derive(Parser)]
#[command(
    name = "roam-sim",
    about = "Headless run of the exploration/survival simulation",
    version
)]
struct Cli {
    /// World seed
    #[arg(short, long, default_value_t = 12345)]
    seed: u64,

    /// Simulated seconds to run
    #[arg(short = 't', long, default_value_t = 120.0)]
    seconds: f32,

    /// Difficulty preset (relaxed, normal, harsh)
    #[arg(short, long, default_value = "normal", value_parser = parse_difficulty)]
    difficulty: Difficulty,
}

fn parse_difficulty(s: &str) -> Result<Difficulty, String> {
    Difficulty::from_str(s).ok_or_else(|| format!("unknown difficulty '{s}' (relaxed, normal, harsh)"))
}

/// Uneven frame times, as a real display loop would produce
const FRAME_TIMES: [f32; 4] = [1.0 / 60.0, 1.0 / 30.0, 1.0 / 144.0, 1.0 / 45.0];

struct Driver {
    state: GameState,
    events: EventLog,
    accumulator: f32,
    elapsed: f32,
    input: TickInput,
}

impl Driver {
    fn new(state: GameState) -> Self {
        Self {
            state,
            events: EventLog::new(),
            accumulator: 0.0,
            elapsed: 0.0,
            input: TickInput::default(),
        }
    }

    fn update(&mut self, frame_dt: f32, time: &dyn TimeSource) {
        self.accumulator += frame_dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.script();
            let input = self.input.clone();
            let mut services = TickServices {
                events: &mut self.events,
                time,
            };
            tick(&mut self.state, &input, SIM_DT, &mut services);
            self.accumulator -= SIM_DT;
            self.elapsed += SIM_DT;
            substeps += 1;

            // One-shot inputs
            self.input.rest = false;
            self.input.mount = false;
            self.input.use_item = None;
            self.input.toggle_light = false;
        }
        if substeps == MAX_SUBSTEPS {
            self.accumulator = 0.0;
        }

        for event in self.events.drain() {
            match event {
                SimEvent::ZoneChanged { from, to, .. } => log::info!("{from} -> {to}"),
                other => log::debug!("{other:?}"),
            }
        }
    }

    /// Wander in slow curves; drink, eat and ride when it makes sense
    fn script(&mut self) {
        let player = &self.state.player;
        let t = self.elapsed;
        self.input.direction = Some(Vec2::from_angle(t * 0.35 + (t * 0.07).sin() * 2.0));

        let water = InventoryItem::Drink(DrinkKind::Water);
        if player.stats.thirst < 50.0 && player.quantity(water) > 0 {
            self.input.use_item = Some(water);
        }
        let sandwich = InventoryItem::Food(FoodKind::Sandwich);
        if player.stats.hunger < 50.0 && player.quantity(sandwich) > 0 {
            self.input.use_item = Some(sandwich);
        }
        if !player.is_riding() && player.stats.energy < 40.0 {
            self.input.mount = true;
        }
        if self.state.clock.is_night() != player.lights_on {
            self.input.toggle_light = true;
        }
    }
}

fn main() {
    env_logger::init();

    let Cli {
        seed,
        seconds,
        difficulty,
    } = Cli::parse();

    log::info!(
        "roam-sim starting: seed {seed}, {seconds}s, {}",
        difficulty.as_str()
    );

    let time = SystemTimeSource;
    let state = GameState::new(
        seed,
        Tuning::from_preset(difficulty),
        ZoneRegistry::with_defaults(),
        time.now_ms(),
    );
    let mut driver = Driver::new(state);

    let mut frame = 0;
    while driver.elapsed < seconds {
        driver.update(FRAME_TIMES[frame % FRAME_TIMES.len()], &time);
        frame += 1;
    }

    log::info!(
        "finished after {} ticks at {}",
        driver.state.time_ticks,
        driver.state.clock.label()
    );
    match serde_json::to_string_pretty(&driver.state.snapshot()) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            log::error!("failed to serialize snapshot: {e}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_arguments() {
        let cli = Cli::try_parse_from(["roam-sim"]).unwrap();
        assert_eq!(cli.seed, 12345);
        assert_eq!(cli.seconds, 120.0);
        assert_eq!(cli.difficulty, Difficulty::Normal);
    }

    #[test]
    fn difficulty_accepts_aliases() {
        let cli = Cli::try_parse_from(["roam-sim", "--difficulty", "hard", "-s", "7"]).unwrap();
        assert_eq!(cli.difficulty, Difficulty::Harsh);
        assert_eq!(cli.seed, 7);
    }

    #[test]
    fn bad_input_is_reported() {
        assert!(Cli::try_parse_from(["roam-sim", "--seed", "notaseed"]).is_err());
        assert!(Cli::try_parse_from(["roam-sim", "--difficulty", "nightmare"]).is_err());
    }
}
