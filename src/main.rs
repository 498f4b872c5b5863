//! Fruit Dropper headless runner
//!
//! Plays a scripted session against the sandbox world and logs what happens.
//!
//! Usage: `fruit-dropper [settings.json] [seed]` (set `RUST_LOG=debug` for detail)

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Fruit Dropper (headless) starting...");

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => fruit_dropper::Settings::load_or_default(path),
        None => fruit_dropper::Settings::default(),
    };
    let seed = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(headless::DEFAULT_SEED);

    match headless::run(settings, seed) {
        Ok(summary) => println!(
            "\n{} fruit dropped, {} settled in {:.1}s of play{}",
            summary.dropped,
            summary.settled,
            summary.time,
            if summary.lost { " (container overflowed)" } else { "" }
        ),
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No browser host; the library is driven by the embedding game
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use fruit_dropper::consts::*;
    use fruit_dropper::menu::PauseMenu;
    use fruit_dropper::sim::{
        DropController, DropEvent, SandboxWorld, Session, TickInput, tick,
    };
    use fruit_dropper::{DropError, Settings};

    pub const DEFAULT_SEED: u64 = 0x00F2_D1E5;

    /// Drops attempted before the script stops
    const MAX_DROPS: u32 = 25;
    /// Hard stop in case the script stalls
    const MAX_TICKS: u32 = 60 * 120;
    /// Ticks the scripted finger holds before letting go (0.25s)
    const DRAG_TICKS: u32 = 15;
    /// Pause the run once, to show the gate holding everything still
    const PAUSE_AT_TICK: u32 = 300;
    const PAUSE_TICKS: u32 = 90;

    pub struct Summary {
        pub dropped: u32,
        pub settled: u32,
        pub time: f64,
        pub lost: bool,
    }

    /// Scripted player
    enum Finger {
        Up,
        Dragging { target: f32, ticks: u32 },
    }

    pub fn run(settings: Settings, seed: u64) -> Result<Summary, DropError> {
        let config = settings.dropper;
        let mut world = SandboxWorld::default();
        world.add_floor(0.0, config.min_x - 1.0, config.max_x + 1.0);

        let mut controller = DropController::seeded(config.clone(), world, seed)?;
        let pause_menu = PauseMenu::new(settings.audio);
        let mut session = Session::new();
        controller.start(&mut session)?;
        log::info!("Game initialized with seed: {}", seed);

        // Separate stream for the scripted finger so it doesn't shift the fruit sequence
        let mut aim = Pcg32::seed_from_u64(seed.wrapping_add(1));
        let mut finger = Finger::Up;
        let mut summary = Summary {
            dropped: 0,
            settled: 0,
            time: 0.0,
            lost: false,
        };

        for tick_index in 0..MAX_TICKS {
            if summary.dropped >= MAX_DROPS || session.lost {
                break;
            }

            if tick_index == PAUSE_AT_TICK {
                pause_menu.pause(&mut session);
            } else if tick_index == PAUSE_AT_TICK + PAUSE_TICKS {
                pause_menu.resume(&mut session);
            }

            let mut input = TickInput::default();
            finger = match finger {
                Finger::Up if session.ready_to_drop && !session.is_frozen() => {
                    let target = aim.random_range(config.min_x..=config.max_x);
                    input.press = true;
                    input.pointer_x = Some(target);
                    Finger::Dragging { target, ticks: 0 }
                }
                Finger::Dragging { target, ticks } if ticks >= DRAG_TICKS => {
                    input.release = true;
                    input.pointer_x = Some(target);
                    Finger::Up
                }
                Finger::Dragging { target, ticks } => {
                    input.pointer_x = Some(target);
                    let ticks = if session.is_frozen() { ticks } else { ticks + 1 };
                    Finger::Dragging { target, ticks }
                }
                up => up,
            };

            let dt = SIM_DT * session.time_scale();
            controller.world_mut().step(dt);
            tick(&mut controller, &mut session, &input, SIM_DT);

            for event in controller.drain_events() {
                match event {
                    DropEvent::Released { kind, x, .. } => {
                        summary.dropped += 1;
                        log::info!("Dropped {:?} at x={:.2}", kind, x);
                    }
                    DropEvent::Settled { kind, .. } => {
                        summary.settled += 1;
                        log::info!("{:?} landed (next up: {:?})", kind, session.next_preview);
                    }
                    DropEvent::Spawned { .. } => {}
                    DropEvent::SpawnFailed => log::warn!("Dropper is empty"),
                }
            }

            // Pile reaching the dropper ends the run
            let pile_top = controller
                .world()
                .resting_fruit()
                .map(|b| b.bounds.max.y)
                .fold(f32::MIN, f32::max);
            if pile_top >= config.dropper_y {
                session.mark_lost();
            }
        }

        summary.time = session.time;
        summary.lost = session.lost;
        Ok(summary)
    }
}
