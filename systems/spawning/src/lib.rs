#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting attacker spawn commands.

use std::time::Duration;

use lawn_defence_core::{
    AttackerKind, Command, Event, GamePhase, GameStateSnapshot, Lane, RewardKind, LANE_COUNT,
};
use rand::{
    distributions::{Distribution, WeightedIndex},
    seq::SliceRandom,
    Rng, SeedableRng,
};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

const BASE_SPAWN_INTERVAL_MS: u64 = 3_000;
const MIN_SPAWN_INTERVAL_MS: u64 = 1_000;
const INTERVAL_STEP_PER_LEVEL_MS: u64 = 200;
const MAX_INTERVAL_REDUCTION_MS: u64 = 1_000;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration seeding the spawn roll with `rng_seed`.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Pure system that deterministically emits spawn commands while a level is played.
///
/// The system keeps its own clock built from `TimeAdvanced` events. Time spent
/// outside the playing phase never counts towards the next spawn, and every new
/// level starts a fresh interval.
#[derive(Debug)]
pub struct Spawning {
    elapsed: Duration,
    last_spawn: Duration,
    level: u32,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            elapsed: Duration::ZERO,
            last_spawn: Duration::ZERO,
            level: 0,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes the tick's events and the session counters to emit at most one
    /// spawn command.
    pub fn handle(
        &mut self,
        events: &[Event],
        state: &GameStateSnapshot,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                self.elapsed = self.elapsed.saturating_add(*dt);
            }
        }

        if state.phase != GamePhase::Playing {
            self.last_spawn = self.elapsed;
            return;
        }

        if state.level != self.level {
            self.level = state.level;
            self.last_spawn = self.elapsed;
            return;
        }

        if state.kills >= state.kill_quota {
            return;
        }

        if self.elapsed.saturating_sub(self.last_spawn) <= spawn_interval(self.level) {
            return;
        }

        self.last_spawn = self.elapsed;
        let command = self.roll_spawn();
        debug!(?command, level = self.level, "spawning attacker");
        out.push(command);
    }

    fn roll_spawn(&mut self) -> Command {
        let kind = self.roll_kind();
        let lane = Lane::new(self.rng.gen_range(0..LANE_COUNT));
        let reward = if self.rng.gen_bool(reward_probability(self.level)) {
            RewardKind::ALL.choose(&mut self.rng).copied()
        } else {
            None
        };
        Command::SpawnAttacker { kind, lane, reward }
    }

    fn roll_kind(&mut self) -> AttackerKind {
        let weights = spawn_weights(self.level);
        match WeightedIndex::new(weights.iter().map(|(_, weight)| *weight)) {
            Ok(index) => weights[index.sample(&mut self.rng)].0,
            Err(error) => {
                warn!(
                    level = self.level,
                    %error,
                    "spawn weights rejected, rolling a basic attacker"
                );
                AttackerKind::Basic
            }
        }
    }
}

/// Time between spawns while the given level is played.
#[must_use]
pub fn spawn_interval(level: u32) -> Duration {
    let reduction = u64::from(level)
        .saturating_mul(INTERVAL_STEP_PER_LEVEL_MS)
        .min(MAX_INTERVAL_REDUCTION_MS);
    Duration::from_millis(
        BASE_SPAWN_INTERVAL_MS
            .saturating_sub(reduction)
            .max(MIN_SPAWN_INTERVAL_MS),
    )
}

/// Normalized probability of each attacker kind at the given level.
#[must_use]
pub fn spawn_weights(level: u32) -> [(AttackerKind, f64); 3] {
    let steps = f64::from(level.saturating_sub(1));
    let basic = (0.7 - steps * 0.15).max(0.1);
    let armored = (0.2 + steps * 0.1).min(0.5);
    let enrageable = (0.1 + steps * 0.05).min(0.4);
    let total = basic + armored + enrageable;
    [
        (AttackerKind::Basic, basic / total),
        (AttackerKind::Armored, armored / total),
        (AttackerKind::Enrageable, enrageable / total),
    ]
}

/// Chance that a spawned attacker carries a reward at the given level.
#[must_use]
pub fn reward_probability(level: u32) -> f64 {
    (0.15 + f64::from(level.saturating_sub(1)) * 0.02).min(0.25)
}
