/// Game session: one board, one arena, the counters around them.
///
/// Processing order of `tick`:
///   1. Control step (player, then rival) from the frame's input
///   2. Arena tick: movement, collision detection, callbacks
///   3. Events applied to the session counters (score)
///   4. Win / lose check, logged once when the phase changes
///
/// Lives are owned by the player actor; the session reads them back.

use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::config::GameConfig;
use crate::domain::actor::ActorId;
use crate::domain::entity::{Critter, Ghost, Grade, Pacman, Pellet, Rival};
use crate::domain::event::GameEvent;
use crate::domain::grid::Direction;
use super::arena::Arena;
use super::maze::Maze;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    Easy,
    Medium,
    Hard,
    /// A second player steers the rival ghost.
    Versus,
}

impl Mode {
    pub fn from_name(name: &str) -> Option<Mode> {
        match name.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Mode::Easy),
            "medium" => Some(Mode::Medium),
            "hard" => Some(Mode::Hard),
            "versus" => Some(Mode::Versus),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Easy => "Easy",
            Mode::Medium => "Medium",
            Mode::Hard => "Hard",
            Mode::Versus => "Versus",
        }
    }

    pub fn lives(self) -> u32 {
        match self {
            Mode::Easy => 5,
            Mode::Medium => 3,
            Mode::Hard => 2,
            Mode::Versus => 3,
        }
    }

    /// Random-turn ghosts placed on the board.
    pub fn ghosts(self) -> usize {
        match self {
            Mode::Easy => 2,
            Mode::Medium => 3,
            Mode::Hard => 4,
            Mode::Versus => 0,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    GameOver,
    Won,
}

/// Everything `Game::new` needs besides the board.
#[derive(Clone, Debug)]
pub struct Setup {
    pub mode: Mode,
    pub lives: u32,
    pub ghosts: usize,
    pub speed: i32,
    pub hit_cooldown: u64,
    pub small_points: u32,
    pub large_points: u32,
    /// None: the total value of the board's pellets.
    pub win_score: Option<u32>,
    pub seed: u64,
}

impl Setup {
    pub fn new(mode: Mode, seed: u64) -> Self {
        Setup::from_config(&GameConfig::default(), mode, seed)
    }

    pub fn from_config(config: &GameConfig, mode: Mode, seed: u64) -> Self {
        Setup {
            mode,
            lives: mode.lives(),
            ghosts: mode.ghosts(),
            speed: config.speed.actor_speed,
            hit_cooldown: config.rules.hit_cooldown_ticks,
            small_points: config.rules.small_pellet_points,
            large_points: config.rules.large_pellet_points,
            win_score: config.rules.win_score,
            seed,
        }
    }
}

/// Held directions for one frame. At most one per steerable actor.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub hero: Option<Direction>,
    pub rival: Option<Direction>,
}

pub struct Game {
    arena: Arena<Critter>,
    maze: Maze,
    mode: Mode,
    hero: ActorId,
    rival: Option<ActorId>,
    score: u32,
    win_score: u32,
    phase: Phase,
}

impl Game {
    /// Populate the arena: pellets in board order, then the player, then
    /// the enemies, so the actors drawn on top are checked first.
    pub fn new(setup: &Setup, maze: Maze) -> Self {
        let mut arena: Arena<Critter> = Arena::new(maze.extent());

        let mut board_total = 0;
        for &(grade, tile) in maze.pellets() {
            let points = match grade {
                Grade::Small => setup.small_points,
                Grade::Large => setup.large_points,
            };
            board_total += points;
            arena.spawn(Pellet::on_tile(grade, tile, points));
        }

        let hero = arena.spawn(Pacman::new(
            maze.player_spawn(),
            setup.lives,
            setup.speed,
            setup.hit_cooldown,
        ));

        let spawns = maze.ghost_spawns();
        for (i, seed) in ghost_seeds(setup.seed, setup.ghosts).into_iter().enumerate() {
            let color = (i % 4) as u8;
            arena.spawn(Ghost::new(spawns[i % spawns.len()], color, setup.speed, seed));
        }

        let rival = (setup.mode == Mode::Versus)
            .then(|| arena.spawn(Rival::new(spawns[0], setup.speed)));

        let win_score = setup.win_score.unwrap_or(board_total);
        info!(
            "{} board, {} mode: {} pellets worth {}, {} ghosts, seed {}",
            maze.name,
            setup.mode.name(),
            maze.pellets().len(),
            board_total,
            setup.ghosts,
            setup.seed,
        );

        Game {
            arena,
            maze,
            mode: setup.mode,
            hero,
            rival,
            score: 0,
            win_score,
            phase: Phase::Playing,
        }
    }

    /// Advance the session by one tick. No-op once the game is decided.
    pub fn tick(&mut self, input: FrameInput) -> Vec<GameEvent> {
        if self.phase != Phase::Playing {
            return vec![];
        }

        if let Some(Critter::Pacman(p)) = self.arena.get_mut(self.hero) {
            p.control(input.hero, &self.maze);
        }
        if let Some(id) = self.rival {
            if let Some(Critter::Rival(r)) = self.arena.get_mut(id) {
                r.control(input.rival, &self.maze);
            }
        }

        let events = self.arena.advance(&self.maze);
        for event in &events {
            match *event {
                GameEvent::PelletEaten { points, .. } => self.add_score(points),
                GameEvent::PlayerHit { lives } => debug!("{lives} lives left"),
            }
        }

        self.update_phase();
        events
    }

    pub fn add_score(&mut self, amount: u32) {
        self.score = self.score.saturating_add(amount);
        self.update_phase();
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn win_score(&self) -> u32 {
        self.win_score
    }

    pub fn lives(&self) -> u32 {
        match self.arena.get(self.hero) {
            Some(Critter::Pacman(p)) => p.lives(),
            _ => 0,
        }
    }

    pub fn tick_count(&self) -> u64 {
        self.arena.tick_count()
    }

    pub fn game_over(&self) -> bool {
        self.lives() == 0
    }

    /// Literal score match, not "board cleared".
    pub fn game_won(&self) -> bool {
        self.score == self.win_score
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn arena(&self) -> &Arena<Critter> {
        &self.arena
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    /// Pellets still on the board.
    pub fn pellets_left(&self) -> usize {
        self.arena
            .actors()
            .into_iter()
            .filter(|&id| matches!(self.arena.get(id), Some(Critter::Pellet(_))))
            .count()
    }

    fn update_phase(&mut self) {
        if self.phase != Phase::Playing {
            return;
        }
        if self.game_over() {
            self.phase = Phase::GameOver;
            info!("game over at tick {} with score {}", self.tick_count(), self.score);
        } else if self.game_won() {
            self.phase = Phase::Won;
            info!("board won at tick {} with score {}", self.tick_count(), self.score);
        }
    }
}

/// Per-ghost RNG seeds, drawn from one stream seeded with the session seed.
fn ghost_seeds(seed: u64, count: usize) -> Vec<u64> {
    let mut master = Pcg32::seed_from_u64(seed);
    (0..count).map(|_| master.random::<u64>()).collect()
}
