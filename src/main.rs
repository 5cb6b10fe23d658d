//! Entry point and game loop.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use log::{info, warn};

use mazechase::config::GameConfig;
use mazechase::sim::game::{FrameInput, Game, Mode, Phase, Setup};
use mazechase::sim::maze::Maze;
use mazechase::sim::menu::{Menu, MenuOutcome};
use mazechase::ui::input::{InputState, ARROWS, WASD};
use mazechase::ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

/// What the loop is driving: the setup menu, or a session built from it.
enum Screen {
    Menu(Menu),
    Playing(Game),
}

fn main() {
    // Warnings (config and board fallbacks) are printed before the alternate screen opens
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let config = GameConfig::load();

    let maze = match &config.game.board {
        Some(path) => Maze::load(path).unwrap_or_else(|e| {
            warn!("could not load board {}: {e}; using the built-in board", path.display());
            Maze::builtin()
        }),
        None => Maze::builtin(),
    };

    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let mut last_game = None;
    let result = game_loop(&mut renderer, &config, &maze, &mut last_game);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Maze Chase!");
    if let Some(game) = last_game {
        info!("session ended after {} ticks", game.tick_count());
        match game.phase() {
            Phase::Won => println!("Board cleared! Final Score: {}", game.score()),
            _ => println!("Final Score: {}", game.score()),
        }
    }
}

fn game_loop(
    renderer: &mut Renderer,
    config: &GameConfig,
    maze: &Maze,
    last_game: &mut Option<Game>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.honor_release = renderer.reports_key_release();
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.speed.tick_rate_ms);
    let mut screen = Screen::Menu(Menu::new(config.game.mode));

    loop {
        kb.drain_events();

        match &mut screen {
            Screen::Menu(menu) => {
                let mut start = None;
                for key in kb.menu_keys() {
                    match menu.handle(key) {
                        MenuOutcome::Stay => {}
                        MenuOutcome::Start(mode) => {
                            start = Some(mode);
                            break;
                        }
                        MenuOutcome::Quit => return Ok(()),
                    }
                }

                match start {
                    Some(mode) => {
                        screen = Screen::Playing(start_game(config, maze, mode));
                        last_tick = Instant::now();
                    }
                    None => renderer.render_menu(menu, maze)?,
                }
            }

            Screen::Playing(game) => {
                // Quit, or Enter on a finished game: back to the menu, keep the result
                let quit = kb.quit_requested();
                if quit || (game.phase() != Phase::Playing && kb.confirm_pressed()) {
                    let menu = Menu::new(game.mode());
                    if let Screen::Playing(game) = std::mem::replace(&mut screen, Screen::Menu(menu)) {
                        *last_game = Some(game);
                    }
                    if quit {
                        return Ok(());
                    }
                    continue;
                }

                if last_tick.elapsed() >= tick_rate {
                    let frame_input = FrameInput {
                        hero: kb.direction(&ARROWS),
                        rival: kb.direction(&WASD),
                    };
                    game.tick(frame_input);
                    last_tick = Instant::now();
                }

                renderer.render(game)?;
            }
        }

        std::thread::sleep(FRAME_SLEEP);
    }
}

fn start_game(config: &GameConfig, maze: &Maze, mode: Mode) -> Game {
    let seed = config.game.seed.unwrap_or_else(clock_seed);
    let setup = Setup::from_config(config, mode, seed);
    Game::new(&setup, maze.clone())
}

/// Seed for the ghosts when config.toml does not pin one.
fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
