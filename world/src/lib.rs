#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Lawn Defence.
//!
//! The [`World`] owns the session counters, the resource balance, the
//! plantable grid and every live entity. It is only mutated through [`apply`];
//! collaborators observe it through the read-only [`query`] module.

mod combat;
mod economy;
mod entities;
mod grid;
mod progression;
mod registry;

use std::time::Duration;

use lawn_defence_core::{
    AttackerBehavior, AttackerKind, CellCoord, Command, DefenderId, DefenderKind, Event,
    GamePhase, Lane, PlantPreference, PlantRejection, RewardKind, Rules, GRID_COLUMNS, GRID_ROWS,
    LANE_COUNT, WELCOME_BANNER,
};
use tracing::{debug, info};

use crate::{
    combat::CombatResolver,
    economy::Economy,
    entities::{Attacker, Defender},
    grid::GridMap,
    progression::{GameState, Transition},
    registry::EntityRegistry,
};

/// Represents the authoritative Lawn Defence world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    rules: Rules,
    state: GameState,
    economy: Economy,
    grid: GridMap,
    registry: EntityRegistry,
    tick_index: u64,
}

impl World {
    /// Creates a new world on the title screen using the default rules.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rules(Rules::default())
    }

    /// Creates a new world on the title screen using the provided rules.
    #[must_use]
    pub fn with_rules(rules: Rules) -> Self {
        Self {
            banner: WELCOME_BANNER,
            state: GameState::new(&rules),
            economy: Economy::new(&rules),
            grid: GridMap::new(GRID_COLUMNS, GRID_ROWS),
            registry: EntityRegistry::new(),
            rules,
            tick_index: 0,
        }
    }

    fn start(&mut self, out_events: &mut Vec<Event>) {
        if self.state.phase != GamePhase::NotStarted {
            return;
        }
        self.state.phase = GamePhase::Playing;
        info!(level = self.state.level, "game started");
        out_events.push(Event::GameStarted);
    }

    fn reset(&mut self, out_events: &mut Vec<Event>) {
        if !matches!(self.state.phase, GamePhase::GameOver | GamePhase::Victory) {
            return;
        }
        self.stop_chomp_loop(out_events);
        self.state = GameState::new(&self.rules);
        self.economy = Economy::new(&self.rules);
        self.grid.clear();
        self.registry = EntityRegistry::new();
        self.tick_index = 0;
        info!("game reset");
        out_events.push(Event::GameReset);
    }

    fn plant(&mut self, cell: CellCoord, preference: PlantPreference, out_events: &mut Vec<Event>) {
        match self.try_plant(cell, preference) {
            Ok((defender, kind)) => {
                debug!(defender = defender.get(), ?kind, ?cell, "defender planted");
                out_events.push(Event::PlantPlaced {
                    defender,
                    kind,
                    cell,
                });
            }
            Err(reason) => {
                debug!(?cell, ?reason, "planting rejected");
                out_events.push(Event::PlantRejected { cell, reason });
            }
        }
    }

    fn try_plant(
        &mut self,
        cell: CellCoord,
        preference: PlantPreference,
    ) -> Result<(DefenderId, DefenderKind), PlantRejection> {
        if !self.state.is_playing() {
            return Err(PlantRejection::NotPlaying);
        }
        if !self.grid.contains(cell) {
            return Err(PlantRejection::OutOfBounds);
        }
        if self.grid.is_occupied(cell) {
            return Err(PlantRejection::Occupied);
        }

        let kind = economy::purchase(
            &mut self.economy,
            self.state.level,
            preference,
            self.registry.live_shooters(),
            &self.rules,
        )?;
        self.grid.occupy(cell);
        let defender = self.registry.insert_defender(Defender::plant(kind, cell));
        Ok((defender, kind))
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if !self.state.is_playing() {
            return;
        }
        self.tick_index = self.tick_index.saturating_add(1);
        self.economy
            .accrue(self.state.level, self.rules.base_accrual);
        out_events.push(Event::TimeAdvanced { dt });
    }

    fn spawn_attacker(
        &mut self,
        kind: AttackerKind,
        lane: Lane,
        reward: Option<RewardKind>,
        out_events: &mut Vec<Event>,
    ) {
        if !self.state.is_playing() {
            return;
        }
        if lane.get() >= LANE_COUNT {
            debug!(lane = lane.get(), "ignoring spawn outside the lanes");
            return;
        }

        let attacker = self
            .registry
            .insert_attacker(Attacker::spawn(kind, lane, reward, self.state.level));
        self.state.attackers_spawned = self.state.attackers_spawned.saturating_add(1);
        out_events.push(Event::AttackerSpawned {
            attacker,
            kind,
            lane,
            reward,
        });
    }

    fn resolve_combat(&mut self, out_events: &mut Vec<Event>) {
        if !self.state.is_playing() {
            return;
        }

        CombatResolver::new(
            &mut self.registry,
            &mut self.state,
            &mut self.economy,
            &self.rules,
        )
        .resolve(out_events);

        self.registry.reap(&mut self.grid);
        self.update_chomp_loop(out_events);
        self.apply_transition(out_events);
    }

    fn update_chomp_loop(&mut self, out_events: &mut Vec<Event>) {
        let chomping = self
            .registry
            .attackers
            .iter_live()
            .any(|(_, attacker)| attacker.behavior() != AttackerBehavior::Walking);
        if chomping == self.state.chomping {
            return;
        }
        self.state.chomping = chomping;
        out_events.push(if chomping {
            Event::ChompLoopStarted
        } else {
            Event::ChompLoopStopped
        });
    }

    fn stop_chomp_loop(&mut self, out_events: &mut Vec<Event>) {
        if self.state.chomping {
            self.state.chomping = false;
            out_events.push(Event::ChompLoopStopped);
        }
    }

    fn apply_transition(&mut self, out_events: &mut Vec<Event>) {
        match progression::check_transition(&self.state, &self.rules) {
            Transition::Continue => {}
            Transition::AdvanceTo(level) => self.advance_level(level, out_events),
            Transition::Victory => {
                self.stop_chomp_loop(out_events);
                self.state.phase = GamePhase::Victory;
                info!(level = self.state.level, "victory");
                out_events.push(Event::Victory);
            }
            Transition::Defeat => {
                self.stop_chomp_loop(out_events);
                self.state.phase = GamePhase::GameOver;
                info!(
                    level = self.state.level,
                    kills = self.state.kills,
                    "all lives lost"
                );
                out_events.push(Event::Defeat);
            }
        }
    }

    fn advance_level(&mut self, level: u32, out_events: &mut Vec<Event>) {
        self.stop_chomp_loop(out_events);
        let carried = self.economy.balance() + self.rules.level_bonus_resource;
        self.economy = Economy::with_balance(carried, self.rules.resource_cap);
        self.state = GameState::for_level(level, &self.rules);
        self.registry.clear();
        self.grid.clear();
        info!(level, resource = self.economy.balance(), "level advanced");
        out_events.push(Event::LevelAdvanced { level });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Every command other than `Start` and `Reset` is ignored unless the session
/// is in the playing phase. Rejections are reported as events, never as errors.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Start => world.start(out_events),
        Command::Reset => world.reset(out_events),
        Command::Plant { cell, preference } => world.plant(cell, preference, out_events),
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::SpawnAttacker { kind, lane, reward } => {
            world.spawn_attacker(kind, lane, reward, out_events)
        }
        Command::ResolveCombat => world.resolve_combat(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use lawn_defence_core::{
        AttackerView, DefenderView, GameStateSnapshot, OccupancyView, ProjectileView, Rules,
    };

    use super::{economy, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Rules the world was created with.
    #[must_use]
    pub fn rules(world: &World) -> &Rules {
        &world.rules
    }

    /// Number of ticks simulated since the session started.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Captures the session counters.
    #[must_use]
    pub fn game_state(world: &World) -> GameStateSnapshot {
        GameStateSnapshot {
            resource: world.economy.balance(),
            lives: world.state.lives,
            kills: world.state.kills,
            kill_quota: world.rules.kill_quota,
            level: world.state.level,
            phase: world.state.phase,
            attackers_spawned: world.state.attackers_spawned,
            chomping: world.state.chomping,
        }
    }

    /// Captures a read-only view of the live defenders.
    #[must_use]
    pub fn defender_view(world: &World) -> DefenderView {
        DefenderView::from_snapshots(
            world
                .registry
                .defenders
                .iter_live()
                .map(|(id, defender)| defender.snapshot(id))
                .collect(),
        )
    }

    /// Captures a read-only view of the live attackers.
    #[must_use]
    pub fn attacker_view(world: &World) -> AttackerView {
        AttackerView::from_snapshots(
            world
                .registry
                .attackers
                .iter_live()
                .map(|(id, attacker)| attacker.snapshot(id))
                .collect(),
        )
    }

    /// Captures a read-only view of the live projectiles.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        ProjectileView::from_snapshots(
            world
                .registry
                .projectiles
                .iter_live()
                .map(|(id, projectile)| projectile.snapshot(id))
                .collect(),
        )
    }

    /// Exposes a read-only view of the plantable grid.
    #[must_use]
    pub fn occupancy_view(world: &World) -> OccupancyView<'_> {
        world.grid.view()
    }

    /// Current price of a shooter.
    #[must_use]
    pub fn shooter_cost(world: &World) -> u32 {
        economy::shooter_cost(world.state.level)
    }

    /// Current price of an area charge.
    #[must_use]
    pub fn area_charge_cost(world: &World) -> u32 {
        economy::area_charge_cost(world.state.level)
    }
}
