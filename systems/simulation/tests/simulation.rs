use std::{cell::RefCell, rc::Rc, time::Duration};

use lawn_defence_core::{
    AttackerKind, CellCoord, Command, DefenderKind, Event, GamePhase, Lane, PlantPreference,
};
use lawn_defence_system_simulation::{
    parse_rules, AudioCue, AudioCues, ClockConfig, SimulationClock, DEFAULT_TICK,
};
use lawn_defence_world::query;

#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Vec<AudioCue>>>);

impl AudioCues for Recorder {
    fn play(&mut self, cue: AudioCue) {
        self.0.borrow_mut().push(cue);
    }
}

fn started_clock(seed: u64, rules: &str) -> SimulationClock {
    let rules = parse_rules(rules).expect("valid rules");
    let mut clock = SimulationClock::with_rules(ClockConfig::new(DEFAULT_TICK, seed), rules);
    clock.click(400.0, 300.0);
    let events = clock.step().to_vec();
    assert_eq!(events.first(), Some(&Event::GameStarted));
    clock
}

/// Clicks the first column of every lane row.
fn plant_column_of_shooters(clock: &mut SimulationClock) {
    for y in [130.0, 250.0, 370.0, 490.0] {
        clock.click(10.0, y);
    }
}

fn phase(clock: &SimulationClock) -> GamePhase {
    query::game_state(clock.world()).phase
}

#[test]
fn queued_commands_wait_for_the_next_tick() {
    let mut clock = started_clock(1, "(starting_resource: 10.0)");
    clock.click(10.0, 130.0);

    assert!(query::defender_view(clock.world()).is_empty());
    let events = clock.step().to_vec();

    assert!(matches!(
        events.first(),
        Some(Event::PlantPlaced {
            kind: DefenderKind::Shooter,
            ..
        })
    ));
    assert_eq!(query::defender_view(clock.world()).len(), 1);
    assert!(query::occupancy_view(clock.world()).is_occupied(CellCoord::new(0, 0)));
}

#[test]
fn internal_commands_cannot_be_submitted() {
    let mut clock = started_clock(1, "(starting_resource: 10.0)");
    clock.click(10.0, 130.0);
    let events = clock.step().to_vec();
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::ProjectileFired { .. })));
    let fired_at = query::projectile_view(clock.world())
        .iter()
        .map(|projectile| projectile.position.x)
        .next()
        .expect("shooter fires on its first update");
    let tick_before = query::tick_index(clock.world());

    clock.submit(Command::SpawnAttacker {
        kind: AttackerKind::Basic,
        lane: Lane::new(0),
        reward: None,
    });
    clock.submit(Command::ResolveCombat);
    clock.submit(Command::Tick {
        dt: Duration::from_secs(100),
    });
    let events = clock.step().to_vec();

    assert_eq!(
        events,
        vec![Event::TimeAdvanced {
            dt: clock.dt()
        }]
    );
    let world = clock.world();
    assert_eq!(query::tick_index(world), tick_before + 1);
    assert!(query::attacker_view(world).is_empty());
    assert_eq!(query::game_state(world).attackers_spawned, 0);
    let projectiles = query::projectile_view(world).into_vec();
    assert_eq!(projectiles.len(), 1);
    assert_eq!(projectiles[0].position.x - fired_at, 5.0, "one combat pass per step");
}

#[test]
fn attackers_arrive_once_the_first_interval_elapses() {
    let mut clock = started_clock(7, "()");

    let mut first_spawn = None;
    for tick in 1..=400 {
        if clock
            .step()
            .iter()
            .any(|event| matches!(event, Event::AttackerSpawned { .. }))
        {
            first_spawn = Some(tick);
            break;
        }
    }

    // 2.8 s at ~16.7 ms per tick, counted from the tick that started the game.
    assert_eq!(first_spawn, Some(168));
    assert_eq!(query::game_state(clock.world()).attackers_spawned, 1);
}

#[test]
fn identical_scripts_replay_identically() {
    let script = |clock: &mut SimulationClock, tick: u32| {
        if tick % 240 == 0 {
            let column = (tick / 240) % 5;
            let row = (tick / 480) % 4;
            clock.click(column as f32 * 160.0 + 20.0, 130.0 + row as f32 * 120.0);
        }
    };

    let mut first = started_clock(0x5eed, "()");
    let mut second = started_clock(0x5eed, "()");
    for tick in 0..3_000 {
        script(&mut first, tick);
        script(&mut second, tick);
        let first_events = first.step().to_vec();
        let second_events = second.step().to_vec();
        assert_eq!(first_events, second_events, "diverged at tick {tick}");
    }
}

#[test]
fn occupancy_always_matches_live_defenders() {
    let mut clock = started_clock(42, "(starting_resource: 10.0)");

    for tick in 0..6_000u32 {
        if tick % 97 == 0 {
            let column = tick % 5;
            let row = (tick / 5) % 4;
            clock.click(column as f32 * 160.0 + 80.0, 180.0 + row as f32 * 120.0);
        }
        let _ = clock.step();

        let world = clock.world();
        let state = query::game_state(world);
        assert_eq!(
            query::occupancy_view(world).occupied_count(),
            query::defender_view(world).len(),
            "grid drifted at tick {tick}"
        );
        assert!((0.0..=10.0).contains(&state.resource));
        assert!(state.lives <= query::rules(world).max_lives);
        let shooters = query::defender_view(world)
            .iter()
            .filter(|defender| defender.kind == DefenderKind::Shooter)
            .count();
        assert!(shooters <= query::rules(world).max_shooters);

        if state.phase != GamePhase::Playing {
            break;
        }
    }
}

#[test]
fn undefended_lanes_end_in_defeat_and_a_click_resets() {
    let mut clock = started_clock(3, "()");

    let mut defeated = false;
    for _ in 0..10_000 {
        if clock.step().contains(&Event::Defeat) {
            defeated = true;
            break;
        }
    }
    assert!(defeated, "five attackers should cross the lawn");
    assert_eq!(phase(&clock), GamePhase::GameOver);
    assert_eq!(query::game_state(clock.world()).lives, 0);

    for _ in 0..10 {
        assert!(clock.step().is_empty(), "finished sessions stay frozen");
    }

    clock.click(1.0, 1.0);
    let events = clock.step().to_vec();
    assert_eq!(events, vec![Event::GameReset]);
    assert_eq!(phase(&clock), GamePhase::NotStarted);
    assert_eq!(query::game_state(clock.world()).lives, 5);
}

#[test]
fn first_kill_wins_a_single_level_session() {
    let mut clock = started_clock(11, "(kill_quota: 1, final_level: 1, starting_resource: 10.0)");
    plant_column_of_shooters(&mut clock);
    let events = clock.step().to_vec();
    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(event, Event::PlantPlaced { .. }))
            .count(),
        4
    );

    let mut won = false;
    for _ in 0..10_000 {
        if clock.step().contains(&Event::Victory) {
            won = true;
            break;
        }
    }

    assert!(won);
    assert_eq!(phase(&clock), GamePhase::Victory);
    assert_eq!(query::game_state(clock.world()).kills, 1);
}

#[test]
fn clearing_a_level_carries_resource_and_clears_the_lawn() {
    let mut clock = started_clock(11, "(kill_quota: 1, final_level: 2, starting_resource: 10.0)");
    plant_column_of_shooters(&mut clock);
    let _ = clock.step();

    let mut advanced = false;
    for _ in 0..10_000 {
        if clock.step().contains(&Event::LevelAdvanced { level: 2 }) {
            advanced = true;
            break;
        }
    }

    assert!(advanced);
    let world = clock.world();
    let state = query::game_state(world);
    assert_eq!(state.level, 2);
    assert_eq!(state.kills, 0);
    assert_eq!(state.lives, 5);
    assert_eq!(state.attackers_spawned, 0);
    assert!(state.resource >= 2.0);
    assert!(query::defender_view(world).is_empty());
    assert!(query::attacker_view(world).is_empty());
    assert!(query::projectile_view(world).is_empty());
    assert_eq!(query::shooter_cost(world), 2);
    assert_eq!(query::area_charge_cost(world), 4);
}

#[test]
fn audio_sink_hears_planting_and_reset() {
    let recorder = Recorder::default();
    let rules = parse_rules("(starting_resource: 10.0, starting_lives: 1, max_lives: 1)")
        .expect("valid rules");
    let mut clock = SimulationClock::with_rules(ClockConfig::new(DEFAULT_TICK, 9), rules)
        .with_audio(Box::new(recorder.clone()));

    clock.submit(Command::Start);
    let _ = clock.step();
    clock.submit(Command::Plant {
        cell: CellCoord::new(4, 3),
        preference: PlantPreference::Only(DefenderKind::AreaCharge),
    });
    let _ = clock.step();
    assert_eq!(recorder.0.borrow().as_slice(), &[AudioCue::Plant]);

    while phase(&clock) == GamePhase::Playing {
        let _ = clock.step();
    }
    clock.click(0.0, 0.0);
    let _ = clock.step();

    let cues = recorder.0.borrow();
    assert!(cues.contains(&AudioCue::Explosion));
    assert!(cues.contains(&AudioCue::Lose));
    assert_eq!(cues.last(), Some(&AudioCue::MusicRestart));
}
