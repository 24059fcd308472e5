//! Scroll Runner entry point
//!
//! Headless driver: runs scripted sessions on a fixed timestep and logs what
//! happens. Presentation lives elsewhere.
//!
//! Usage: `scroll-runner [settings.json] [catalog.json]`

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use scroll_runner::consts::*;
    use scroll_runner::sim::{
        GameState, GameStateListener, ItemKind, PieceCatalog, PieceId, PlayerState,
        PlayerStateListener, Session, TickInput, tick,
    };
    use scroll_runner::{ListenerError, Settings, SimError};

    /// Wall-clock length of the scripted run (seconds)
    const RUN_SECS: f32 = 90.0;
    /// Frame time fed to the accumulator (deliberately not a multiple of SIM_DT)
    const FRAME_DT: f32 = 1.0 / 50.0;
    /// Seconds spent on the game over screen before restarting
    const RESTART_DELAY: f32 = 2.0;
    /// Half-width of the player's pickup zone around the viewpoint
    const REACH: f32 = 0.5;

    struct LogGameState;

    impl GameStateListener for LogGameState {
        fn on_game_state_change(&mut self, state: GameState) -> Result<(), ListenerError> {
            log::info!("[listener] game state is now {state:?}");
            Ok(())
        }
    }

    struct LogPlayerState;

    impl PlayerStateListener for LogPlayerState {
        fn on_player_state_change(&mut self, state: PlayerState) -> Result<(), ListenerError> {
            log::debug!("[listener] player state is now {state:?}");
            Ok(())
        }
    }

    /// Items under the player this step
    fn items_in_reach(session: &Session) -> Vec<(PieceId, u32, bool)> {
        let x = session.viewpoint().x;
        session
            .pieces()
            .iter()
            .flat_map(|piece| {
                piece
                    .items
                    .iter()
                    .filter(move |item| (piece.item_world(item).x - x).abs() <= REACH)
                    .filter_map(move |item| match item.kind {
                        ItemKind::Booster(_) => Some((piece.id, item.id, true)),
                        ItemKind::Obstacle(_) => Some((piece.id, item.id, false)),
                        ItemKind::Coin => None,
                    })
            })
            .collect()
    }

    fn interact(session: &mut Session, items: Vec<(PieceId, u32, bool)>) -> Result<(), SimError> {
        for (piece, item, is_booster) in items {
            if session.game_state() != GameState::Gameplay {
                break;
            }
            if is_booster {
                session.collect_booster(piece, item)?;
            } else {
                let outcome = session.hit_obstacle(piece, item)?;
                log::debug!("Hit obstacle {item}: {outcome:?}");
            }
        }
        Ok(())
    }

    pub fn run() -> Result<(), SimError> {
        let mut args = std::env::args().skip(1);
        let settings = match args.next() {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        let catalog = match args.next() {
            Some(path) => PieceCatalog::load(path)?,
            None => PieceCatalog::demo(),
        };

        let mut session = Session::new(settings, catalog)?;
        session.game_listeners().join("log", Box::new(LogGameState));
        session.player_listeners().join("log", Box::new(LogPlayerState));
        session
            .boost_started()
            .subscribe(|duration| log::info!("Boost started for {duration:.1}s"));

        let mut input = TickInput {
            start_game: true,
            ..Default::default()
        };
        let mut accumulator = 0.0;
        let mut game_over_for = 0.0;
        let mut trail_timer = 0.0;
        let mut touched = std::collections::HashSet::new();
        let mut best = 0.0f32;

        let frames = (RUN_SECS / FRAME_DT) as u32;
        for _ in 0..frames {
            accumulator += FRAME_DT;

            let mut substeps = 0;
            while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                tick(&mut session, &input, SIM_DT)?;
                accumulator -= SIM_DT;
                substeps += 1;

                // Clear one-shot inputs after processing
                input = TickInput::default();

                match session.game_state() {
                    GameState::Gameplay => {
                        // Obstacles stay on the track; only the first contact counts
                        let fresh: Vec<_> = items_in_reach(&session)
                            .into_iter()
                            .filter(|(piece, item, _)| touched.insert((*piece, *item)))
                            .collect();
                        interact(&mut session, fresh)?;

                        trail_timer += SIM_DT;
                        if trail_timer >= 1.0 {
                            trail_timer = 0.0;
                            session.add_trail(session.viewpoint());
                        }
                        best = best.max(session.stats().distance);
                    }
                    GameState::GameOver => {
                        game_over_for += SIM_DT;
                        if game_over_for >= RESTART_DELAY {
                            game_over_for = 0.0;
                            touched.clear();
                            log::info!(
                                "Run {} ended after {:.1}s, {:.0} units",
                                session.stats().runs,
                                session.stats().elapsed,
                                session.stats().distance
                            );
                            input.request_state = Some(GameState::Gameplay);
                        }
                    }
                    _ => {}
                }
            }

            for failure in session.take_listener_failures() {
                log::debug!("Recorded {failure}");
            }
        }

        session.request_game_end();
        log::info!(
            "Finished: {} runs, best distance {:.0}, {} ticks",
            session.stats().runs,
            best,
            session.time_ticks
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Scroll Runner (headless) starting...");

    if let Err(e) = native::run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation is driven by the host on wasm
}
