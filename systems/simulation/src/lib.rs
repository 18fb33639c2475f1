#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-rate simulation clock that sequences the world and its systems.
//!
//! Each [`SimulationClock::step`] runs one tick in a fixed order: queued
//! external commands, time advance and accrual, spawning, then combat
//! resolution. External input is only ever queued and takes effect at the
//! next tick boundary.

mod audio;
mod input;
mod rules;

use std::{collections::VecDeque, fmt, time::Duration};

use lawn_defence_core::{Command, Event, Rules};
use lawn_defence_system_spawning::{Config as SpawningConfig, Spawning};
use lawn_defence_world::{self as world, query, World};
use tracing::{debug, trace};

pub use audio::{cue_for, AudioCue, AudioCues};
pub use input::translate_click;
pub use rules::{load_rules, parse_rules, RulesError};

/// Fixed tick length used when none is configured, roughly 60 Hz.
pub const DEFAULT_TICK: Duration = Duration::from_micros(16_667);

/// Configuration parameters required to construct the simulation clock.
#[derive(Clone, Copy, Debug)]
pub struct ClockConfig {
    dt: Duration,
    rng_seed: u64,
}

impl ClockConfig {
    /// Creates a configuration with the provided tick length and spawn seed.
    #[must_use]
    pub const fn new(dt: Duration, rng_seed: u64) -> Self {
        Self { dt, rng_seed }
    }

    /// Tick length advanced by every step.
    #[must_use]
    pub const fn dt(&self) -> Duration {
        self.dt
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TICK, 0)
    }
}

/// Drives the world one fixed tick at a time.
pub struct SimulationClock {
    world: World,
    spawning: Spawning,
    dt: Duration,
    pending: VecDeque<Command>,
    events: Vec<Event>,
    audio: Option<Box<dyn AudioCues>>,
}

impl SimulationClock {
    /// Creates a clock over a fresh world using the default rules.
    #[must_use]
    pub fn new(config: ClockConfig) -> Self {
        Self::with_rules(config, Rules::default())
    }

    /// Creates a clock over a fresh world using the provided rules.
    #[must_use]
    pub fn with_rules(config: ClockConfig, rules: Rules) -> Self {
        Self {
            world: World::with_rules(rules),
            spawning: Spawning::new(SpawningConfig::new(config.rng_seed)),
            dt: config.dt,
            pending: VecDeque::new(),
            events: Vec::new(),
            audio: None,
        }
    }

    /// Attaches the sink that receives audio cues after every step.
    #[must_use]
    pub fn with_audio(mut self, sink: Box<dyn AudioCues>) -> Self {
        self.audio = Some(sink);
        self
    }

    /// Queues an external command for the next tick boundary.
    ///
    /// Only `Start`, `Reset` and `Plant` are accepted from outside; the clock
    /// issues every other command itself.
    pub fn submit(&mut self, command: Command) {
        match command {
            Command::Start | Command::Reset | Command::Plant { .. } => {
                self.pending.push_back(command);
            }
            Command::Tick { .. } | Command::SpawnAttacker { .. } | Command::ResolveCombat => {
                debug!(?command, "ignoring internal command submitted externally");
            }
        }
    }

    /// Translates a click against the current phase and queues the result.
    pub fn click(&mut self, x: f32, y: f32) {
        let phase = query::game_state(&self.world).phase;
        if let Some(command) = translate_click(phase, x, y) {
            trace!(x, y, ?command, "click translated");
            self.submit(command);
        }
    }

    /// Runs one tick and returns every event it produced, in order.
    pub fn step(&mut self) -> &[Event] {
        self.events.clear();

        while let Some(command) = self.pending.pop_front() {
            world::apply(&mut self.world, command, &mut self.events);
        }

        world::apply(
            &mut self.world,
            Command::Tick { dt: self.dt },
            &mut self.events,
        );

        let state = query::game_state(&self.world);
        let mut spawns = Vec::new();
        self.spawning.handle(&self.events, &state, &mut spawns);
        for command in spawns {
            world::apply(&mut self.world, command, &mut self.events);
        }

        world::apply(&mut self.world, Command::ResolveCombat, &mut self.events);

        if let Some(sink) = self.audio.as_mut() {
            for cue in self.events.iter().filter_map(cue_for) {
                sink.play(cue);
            }
        }

        &self.events
    }

    /// Read-only access to the simulated world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Tick length advanced by every step.
    #[must_use]
    pub fn dt(&self) -> Duration {
        self.dt
    }
}

impl fmt::Debug for SimulationClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulationClock")
            .field("world", &self.world)
            .field("spawning", &self.spawning)
            .field("dt", &self.dt)
            .field("pending", &self.pending)
            .field("audio", &self.audio.is_some())
            .finish_non_exhaustive()
    }
}
