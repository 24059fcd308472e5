use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use scroll_runner::consts::*;
use scroll_runner::settings::{DifficultySettings, SpawnerSettings};
use scroll_runner::sim::*;
use scroll_runner::{ConfigError, ListenerError, Settings, SimError};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Heard {
    Game(GameState),
    Player(PlayerState),
}

type Log = Rc<RefCell<Vec<Heard>>>;

struct Recorder(Log);

impl GameStateListener for Recorder {
    fn on_game_state_change(&mut self, state: GameState) -> Result<(), ListenerError> {
        self.0.borrow_mut().push(Heard::Game(state));
        Ok(())
    }
}

impl PlayerStateListener for Recorder {
    fn on_player_state_change(&mut self, state: PlayerState) -> Result<(), ListenerError> {
        self.0.borrow_mut().push(Heard::Player(state));
        Ok(())
    }
}

struct Broken;

impl GameStateListener for Broken {
    fn on_game_state_change(&mut self, _state: GameState) -> Result<(), ListenerError> {
        Err(ListenerError::new("panel missing"))
    }
}

fn session() -> Session {
    Session::new(Settings::default(), PieceCatalog::demo()).unwrap()
}

fn recorded_session() -> (Session, Log) {
    let log = Log::default();
    let mut session = session();
    session
        .game_listeners()
        .join("recorder", Box::new(Recorder(log.clone())));
    session
        .player_listeners()
        .join("recorder", Box::new(Recorder(log.clone())));
    (session, log)
}

fn run(session: &mut Session, steps: u32, dt: f32) {
    for _ in 0..steps {
        session.tick(&TickInput::default(), dt).unwrap();
    }
}

#[test]
fn scenario_a_gameplay_restart_reseeds_track() {
    let mut session = session();
    session.request_state(GameState::Gameplay);
    assert_eq!(session.speed().base(), INITIAL_MOVE_SPEED);
    run(&mut session, 1200, SIM_DT);

    let old_ids: Vec<PieceId> = session.pieces().iter().map(|p| p.id).collect();
    assert!(!old_ids.is_empty());

    session.request_game_end();
    assert_eq!(session.speed().base(), 0.0);
    session.request_state(GameState::Gameplay);

    assert_eq!(session.speed().base(), INITIAL_MOVE_SPEED);
    assert_eq!(session.pieces().len(), INITIAL_PIECES);
    assert!(session.pieces().iter().all(|p| !old_ids.contains(&p.id)));
    assert_eq!(session.pieces()[0].name, "start");
}

#[test]
fn scenario_b_empty_catalog_fails_without_side_effects() {
    let catalog = PieceCatalog {
        first: PieceDescriptor::plain("start", 10.0),
        pieces: Vec::new(),
    };
    let mut difficulty = DifficultyController::new(DifficultySettings::default());
    let mut spawner = SegmentSpawner::new(catalog, SpawnerSettings::default(), 1);

    let first = spawner.spawn_first(Vec2::ZERO, &mut difficulty);
    assert_eq!(
        spawner.spawn_next(&mut difficulty),
        Err(ConfigError::EmptyCatalog)
    );
    assert_eq!(spawner.pieces().len(), 1);
    assert_eq!(spawner.last_spawned().map(|p| p.id), Some(first));

    // The distance check keeps retrying without creating anything
    for _ in 0..3 {
        assert!(
            spawner
                .tick(GameState::Gameplay, Vec2::new(9.0, 0.0), &mut difficulty)
                .is_none()
        );
    }
    assert_eq!(spawner.pieces().len(), 1);
}

#[test]
fn scenario_c_boost_expires_back_to_normal() {
    let (mut session, log) = recorded_session();
    session.request_state(GameState::Gameplay);
    session.apply_boost(5.0, 3.0).unwrap();
    assert_eq!(session.player_state(), PlayerState::Boosted);
    assert_eq!(session.speed().bonus(), 5.0);
    log.borrow_mut().clear();

    run(&mut session, 301, 0.01);

    assert_eq!(session.player_state(), PlayerState::Normal);
    assert_eq!(session.speed().bonus(), 0.0);
    assert!(session.orchestrator().boost().is_none());
    assert_eq!(*log.borrow(), vec![Heard::Player(PlayerState::Normal)]);
}

fn slot_piece(chance: f32, min: u32, max: u32, slots: usize) -> PieceCatalog {
    let mut piece = PieceDescriptor::plain("slots", 12.0);
    piece.obstacles = SlotGroup {
        slots: (0..slots).map(|i| SpawnSlot::at(2.0 * i as f32, 0.0)).collect(),
        prefabs: vec![
            ObstaclePrefab {
                name: "cone".into(),
                damage: 1,
            },
            ObstaclePrefab {
                name: "wall".into(),
                damage: 2,
            },
        ],
        chance: Some(chance),
        min,
        max,
    };
    PieceCatalog {
        first: PieceDescriptor::plain("start", 10.0),
        pieces: vec![piece],
    }
}

#[test]
fn scenario_d_exact_count_on_distinct_slots() {
    let mut difficulty = DifficultyController::new(DifficultySettings::default());
    let mut spawner = SegmentSpawner::new(slot_piece(1.0, 2, 2, 5), SpawnerSettings::default(), 9);
    spawner.spawn_first(Vec2::ZERO, &mut difficulty);

    for _ in 0..200 {
        spawner.spawn_next(&mut difficulty).unwrap();
        let piece = spawner.last_spawned().unwrap();
        let mut slots: Vec<usize> = piece.obstacles().filter_map(|i| i.slot).collect();
        slots.sort_unstable();
        slots.dedup();
        assert_eq!(slots.len(), 2);
        assert_eq!(piece.obstacles().count(), 2);
    }
}

#[test]
fn scenario_e_zero_chance_populates_nothing() {
    let mut difficulty = DifficultyController::new(DifficultySettings::default());
    let mut spawner = SegmentSpawner::new(slot_piece(0.0, 3, 5, 5), SpawnerSettings::default(), 9);
    spawner.spawn_first(Vec2::ZERO, &mut difficulty);

    for _ in 0..200 {
        spawner.spawn_next(&mut difficulty).unwrap();
        assert_eq!(spawner.last_spawned().unwrap().obstacles().count(), 0);
    }
}

#[test]
fn scenario_f_game_over_while_boosted_forces_normal() {
    let (mut session, log) = recorded_session();
    let signalled = Rc::new(RefCell::new(Vec::new()));
    let sink = signalled.clone();
    session.state_changed().subscribe(move |state| sink.borrow_mut().push(state));

    session.request_state(GameState::Gameplay);
    session.apply_boost(5.0, 3.0).unwrap();
    log.borrow_mut().clear();

    session.request_game_end();

    assert_eq!(session.game_state(), GameState::GameOver);
    assert_eq!(session.player_state(), PlayerState::Normal);
    assert_eq!(session.speed().bonus(), 0.0);
    assert_eq!(
        *log.borrow(),
        vec![
            Heard::Game(GameState::GameOver),
            Heard::Player(PlayerState::Normal)
        ]
    );
    assert_eq!(signalled.borrow().last(), Some(&GameState::GameOver));
    assert!(session.orchestrator().check_invariants().is_ok());
}

#[test]
fn failing_listener_does_not_stop_fan_out() {
    let (mut session, log) = recorded_session();
    session.game_listeners().join("broken", Box::new(Broken));
    let late = Log::default();
    session
        .game_listeners()
        .join("late", Box::new(Recorder(late.clone())));

    session.request_game_start();

    assert_eq!(session.game_state(), GameState::Countdown);
    assert!(log.borrow().contains(&Heard::Game(GameState::Countdown)));
    assert_eq!(*late.borrow(), vec![Heard::Game(GameState::Countdown)]);

    let failures = session.take_listener_failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].listener, "broken");
    assert!(session.take_listener_failures().is_empty());
}

#[test]
fn listener_leaving_stops_notifications() {
    let mut session = session();
    let log = Log::default();
    let id = session
        .game_listeners()
        .join("recorder", Box::new(Recorder(log.clone())));

    session.request_game_start();
    assert!(session.game_listeners().leave(id).is_some());
    assert!(!session.game_listeners().contains(id));
    session.request_game_end();

    assert_eq!(*log.borrow(), vec![Heard::Game(GameState::Countdown)]);
}

#[test]
fn boost_outside_gameplay_is_rejected() {
    let mut session = session();
    session.request_game_start();
    let err = session.apply_boost(3.0, 2.0).unwrap_err();
    assert!(matches!(
        err,
        SimError::BoostRejected {
            state: GameState::Countdown
        }
    ));
    assert_eq!(session.player_state(), PlayerState::Normal);
}

#[test]
fn full_run_through_countdown() {
    let (mut session, log) = recorded_session();
    let start = TickInput {
        start_game: true,
        ..Default::default()
    };
    session.tick(&start, SIM_DT).unwrap();
    run(&mut session, (COUNTDOWN_SECS / SIM_DT) as u32 + 2, SIM_DT);
    assert_eq!(session.game_state(), GameState::Gameplay);

    run(&mut session, 600, SIM_DT);
    let stats = session.stats();
    assert!(stats.elapsed > 9.0);
    assert!(stats.distance > INITIAL_MOVE_SPEED * 9.0);

    let end = TickInput {
        end_game: true,
        ..Default::default()
    };
    session.tick(&end, SIM_DT).unwrap();
    let frozen = session.stats();
    run(&mut session, 60, SIM_DT);
    assert_eq!(session.stats(), frozen);

    let games: Vec<GameState> = log
        .borrow()
        .iter()
        .filter_map(|h| match h {
            Heard::Game(state) => Some(*state),
            Heard::Player(_) => None,
        })
        .collect();
    assert_eq!(
        games,
        vec![GameState::Countdown, GameState::Gameplay, GameState::GameOver]
    );
}

#[test]
fn same_seed_same_track() {
    let layout = |seed: u64| {
        let settings = Settings {
            seed,
            ..Settings::default()
        };
        let mut session = Session::new(settings, PieceCatalog::demo()).unwrap();
        session.request_state(GameState::Gameplay);
        run(&mut session, 1800, SIM_DT);
        session
            .pieces()
            .iter()
            .map(|p| (p.name.clone(), p.items.clone()))
            .collect::<Vec<_>>()
    };

    assert_eq!(layout(11), layout(11));
}

#[test]
fn hitting_obstacles_until_game_over() {
    let mut session = session();
    session.request_state(GameState::Gameplay);

    // Lay pieces until one carries an obstacle
    let mut target = None;
    for _ in 0..3600 {
        target = session.pieces().iter().find_map(|p| {
            p.obstacles()
                .next()
                .map(|item| (p.id, item.id))
        });
        if target.is_some() {
            break;
        }
        session.tick(&TickInput::default(), SIM_DT).unwrap();
    }
    let (piece, item) = target.expect("demo catalog places obstacles");

    let mut outcome = DamageOutcome::Damaged;
    while outcome == DamageOutcome::Damaged {
        outcome = session.hit_obstacle(piece, item).unwrap();
    }
    assert_eq!(outcome, DamageOutcome::Died);
    assert_eq!(session.game_state(), GameState::GameOver);
    assert!(matches!(
        session.hit_obstacle(PieceId(u32::MAX), 1),
        Err(SimError::UnknownItem { .. })
    ));
}

#[test]
fn long_pieces_keep_the_track_growing() {
    // Longer than trigger distance minus despawn boundary
    let catalog = PieceCatalog {
        first: PieceDescriptor::plain("start", 10.0),
        pieces: vec![PieceDescriptor::plain("long", 60.0)],
    };
    let mut session = Session::new(Settings::default(), catalog).unwrap();
    session.request_state(GameState::Gameplay);

    for _ in 0..3600 {
        session.tick(&TickInput::default(), SIM_DT).unwrap();
        let last = session.spawner().last_spawned().expect("stitching anchor kept");
        assert!(last.exit_world().x > session.viewpoint().x);
    }
    assert!(!session.pieces().is_empty());
    assert!(session.stats().distance > 300.0);
}
