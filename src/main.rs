/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use config::GameConfig;
use sim::controller::GameController;
use sim::event::GameEvent;
use sim::maze;
use sim::session::Session;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::{Alert, Overlay, Renderer};
use ui::sound::{self, SoundEngine};
use ui::tilt::TiltControls;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

const KEYS_RETRY: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R'), KeyCode::Enter, KeyCode::Char(' ')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];

fn main() {
    let (config, warnings) = GameConfig::load();
    let logging = init_logging(&config);
    for w in &warnings {
        if logging {
            log::warn!("config: {w}");
        } else {
            eprintln!("config: {w}");
        }
    }
    log::info!(
        "starting: sample every {:?}, damping {}, token 1/{} of a cell, {:?} walls",
        config.sample_interval,
        config.tuning.damping,
        config.tuning.token_divisor,
        config.tuning.wall_policy,
    );

    let maze = maze::resolve(&config);
    let session = Session::new(maze, config.viewport, config.tuning);

    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();
    let mut controller = GameController::new(session, config.sample_interval, Instant::now());

    let result = game_loop(&mut controller, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        log::error!("game loop failed: {e}");
        eprintln!("Game error: {e}");
    }

    let session = controller.session();
    log::info!("exit after {} attempt(s), state {:?}", session.attempt(), session.state());

    println!();
    println!("Thanks for playing Tilt Maze!");
    println!("Attempts: {}", session.attempt());
}

/// Route `log` output to the configured file. The terminal is in raw mode
/// while the game runs, so nothing may go to stderr.
fn init_logging(config: &GameConfig) -> bool {
    let path = match &config.log_file {
        Some(p) => p,
        None => return false,
    };
    let file = match File::create(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("cannot open log file {}: {e}", path.display());
            return false;
        }
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    true
}

fn game_loop(
    controller: &mut GameController,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.honor_release = renderer.key_release_supported();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);

    let mut alert: Option<Alert> = None;

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() || kb.any_pressed(KEYS_QUIT) || gp.quit_pressed() {
            break;
        }

        let mut events = vec![];
        if kb.any_pressed(KEYS_RETRY) || gp.retry_pressed() {
            events.extend(controller.retry(Instant::now()));
        }

        let mut tilt = TiltControls { kb: &kb, gp: &gp, cfg: &config.tilt };
        events.extend(controller.tick(Instant::now(), &mut tilt));

        sound::play_events(sound, &events);
        for event in &events {
            match event {
                GameEvent::Ended { title, message, .. } => {
                    alert = Some(Alert { title: *title, message: *message });
                }
                GameEvent::Retried { .. } => alert = None,
                GameEvent::EdgeBump => {}
            }
        }

        let overlay = Overlay {
            alert: alert.as_ref(),
            elapsed: controller.elapsed(),
            pad_connected: gp.connected,
        };
        renderer.render(controller.session(), &overlay)?;

        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}
