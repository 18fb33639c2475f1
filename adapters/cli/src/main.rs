#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Lawn Defence session.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use lawn_defence_core::{Event, GameStateSnapshot, PlantRejection, Rules};
use lawn_defence_system_simulation::{
    load_rules, AudioCue, AudioCues, ClockConfig, SimulationClock, DEFAULT_TICK,
};
use lawn_defence_world::query;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Headless lawn-defence simulation runner.
#[derive(Parser, Debug)]
#[command(name = "lawn-defence")]
#[command(about = "Runs a headless lawn-defence session and prints a summary")]
#[command(version)]
struct Args {
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 3_600)]
    ticks: u64,

    /// Seed for the spawn roll.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// RON file overriding the default rules.
    #[arg(long, value_name = "RULES_FILE")]
    rules: Option<PathBuf>,

    /// Click at pixel X,Y before tick TICK. May be repeated.
    #[arg(long = "click", value_name = "X,Y@TICK", value_parser = parse_click)]
    clicks: Vec<ScriptedClick>,
}

/// Pointer click scheduled for a specific tick.
#[derive(Clone, Copy, Debug, PartialEq)]
struct ScriptedClick {
    x: f32,
    y: f32,
    tick: u64,
}

fn parse_click(value: &str) -> Result<ScriptedClick, String> {
    let (position, tick) = value
        .split_once('@')
        .ok_or_else(|| format!("expected X,Y@TICK, got '{value}'"))?;
    let (x, y) = position
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y before '@', got '{position}'"))?;
    Ok(ScriptedClick {
        x: x.trim().parse().map_err(|err| format!("invalid x '{x}': {err}"))?,
        y: y.trim().parse().map_err(|err| format!("invalid y '{y}': {err}"))?,
        tick: tick
            .trim()
            .parse()
            .map_err(|err| format!("invalid tick '{tick}': {err}"))?,
    })
}

/// Audio sink that reports cues through the log instead of a speaker.
#[derive(Debug, Default)]
struct LoggedAudio;

impl AudioCues for LoggedAudio {
    fn play(&mut self, cue: AudioCue) {
        debug!(?cue, "audio cue");
    }
}

/// Running totals printed once the session ends.
#[derive(Debug, Default)]
struct Summary {
    planted: u32,
    rejected: u32,
    spawned: u32,
    killed: u32,
    lives_lost: u32,
    defenders_lost: u32,
    levels_cleared: u32,
    outcome: Option<&'static str>,
}

impl Summary {
    fn record(&mut self, event: &Event) {
        match event {
            Event::PlantPlaced { .. } => self.planted += 1,
            Event::PlantRejected { reason, .. } => {
                if *reason != PlantRejection::NotPlaying {
                    self.rejected += 1;
                }
            }
            Event::AttackerSpawned { .. } => self.spawned += 1,
            Event::AttackerKilled { .. } => self.killed += 1,
            Event::AttackerReachedBoundary { .. } => self.lives_lost += 1,
            Event::DefenderDied { .. } => self.defenders_lost += 1,
            Event::LevelAdvanced { level } => {
                self.levels_cleared += 1;
                info!(level, "level advanced");
            }
            Event::Victory => self.outcome = Some("victory"),
            Event::Defeat => self.outcome = Some("defeat"),
            Event::GameReset => self.outcome = None,
            _ => {}
        }
    }

    fn print(&self, ticks: u64, state: &GameStateSnapshot) {
        println!("ticks simulated: {ticks}");
        println!("phase: {:?}", state.phase);
        println!(
            "level {} | kills {}/{} | lives {} | resource {:.2}",
            state.level, state.kills, state.kill_quota, state.lives, state.resource
        );
        println!(
            "planted {} (rejected {}) | defenders lost {}",
            self.planted, self.rejected, self.defenders_lost
        );
        println!(
            "attackers spawned {} | killed {} | crossed {}",
            self.spawned, self.killed, self.lives_lost
        );
        println!("levels cleared: {}", self.levels_cleared);
        if let Some(outcome) = self.outcome {
            println!("outcome: {outcome}");
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

/// Entry point for the Lawn Defence command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let rules = match &args.rules {
        Some(path) => load_rules(path)
            .with_context(|| format!("loading rules from {}", path.display()))?,
        None => Rules::default(),
    };

    let mut clock = SimulationClock::with_rules(ClockConfig::new(DEFAULT_TICK, args.seed), rules)
        .with_audio(Box::new(LoggedAudio));
    println!("{}", query::welcome_banner(clock.world()));

    let mut clicks = args.clicks;
    clicks.sort_by_key(|click| click.tick);
    let mut clicks = clicks.into_iter().peekable();

    let mut summary = Summary::default();
    for tick in 0..args.ticks {
        while let Some(click) = clicks.next_if(|click| click.tick <= tick) {
            clock.click(click.x, click.y);
        }
        for event in clock.step() {
            summary.record(event);
        }
    }

    summary.print(args.ticks, &query::game_state(clock.world()));
    Ok(())
}
