/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use log::warn;
use serde::Deserialize;
use std::path::PathBuf;

use crate::sim::game::Mode;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    pub rules: RulesConfig,
    pub game: SessionConfig,
}

#[derive(Clone, Debug)]
pub struct SpeedConfig {
    pub tick_rate_ms: u64,
    pub actor_speed: i32,   // px per tick, must divide the 8 px tile
}

#[derive(Clone, Debug)]
pub struct RulesConfig {
    pub hit_cooldown_ticks: u64,
    pub small_pellet_points: u32,
    pub large_pellet_points: u32,
    pub win_score: Option<u32>,   // None: total value of the board's pellets
}

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub mode: Mode,
    pub seed: Option<u64>,
    pub board: Option<PathBuf>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    rules: TomlRules,
    #[serde(default)]
    game: TomlGame,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_actor_speed")]
    actor_speed: i32,
}

#[derive(Deserialize, Debug)]
struct TomlRules {
    #[serde(default = "default_hit_cooldown")]
    hit_cooldown_ticks: u64,
    #[serde(default = "default_small_points")]
    small_pellet_points: u32,
    #[serde(default = "default_large_points")]
    large_pellet_points: u32,
    #[serde(default)]
    win_score: Option<u32>,
}

#[derive(Deserialize, Debug)]
struct TomlGame {
    #[serde(default = "default_mode")]
    mode: String,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    board: Option<String>,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 33 }      // ~30 ticks per second
fn default_actor_speed() -> i32 { 2 }
fn default_hit_cooldown() -> u64 { 30 }   // ~1s of grace after a hit
fn default_small_points() -> u32 { 100 }
fn default_large_points() -> u32 { 200 }
fn default_mode() -> String { "medium".into() }

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            tick_rate_ms: default_tick_rate(),
            actor_speed: default_actor_speed(),
        }
    }
}

impl Default for TomlRules {
    fn default() -> Self {
        TomlRules {
            hit_cooldown_ticks: default_hit_cooldown(),
            small_pellet_points: default_small_points(),
            large_pellet_points: default_large_points(),
            win_score: None,
        }
    }
}

impl Default for TomlGame {
    fn default() -> Self {
        TomlGame {
            mode: default_mode(),
            seed: None,
            board: None,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::resolve(TomlConfig::default(), &[])
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        GameConfig::resolve(toml_cfg, &search_dirs)
    }

    /// Build a config from TOML text. Parse errors fall back to defaults.
    pub fn parse(text: &str) -> Self {
        GameConfig::resolve(parse_toml(text), &[])
    }

    fn resolve(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let mode = Mode::from_name(&toml_cfg.game.mode).unwrap_or_else(|| {
            warn!("unknown mode {:?} in config.toml, using medium", toml_cfg.game.mode);
            Mode::Medium
        });

        let actor_speed = match toml_cfg.speed.actor_speed {
            s @ (1 | 2 | 4 | 8) => s,
            s => {
                warn!("actor_speed {s} does not divide the tile size, using {}", default_actor_speed());
                default_actor_speed()
            }
        };

        // Relative board paths are looked up next to config.toml first
        let board = toml_cfg.game.board.map(|name| {
            let path = PathBuf::from(&name);
            if path.is_absolute() {
                return path;
            }
            search_dirs
                .iter()
                .map(|d| d.join(&name))
                .find(|p| p.is_file())
                .unwrap_or(path)
        });

        GameConfig {
            speed: SpeedConfig {
                tick_rate_ms: toml_cfg.speed.tick_rate_ms.max(1),
                actor_speed,
            },
            rules: RulesConfig {
                hit_cooldown_ticks: toml_cfg.rules.hit_cooldown_ticks,
                small_pellet_points: toml_cfg.rules.small_pellet_points,
                large_pellet_points: toml_cfg.rules.large_pellet_points,
                win_score: toml_cfg.rules.win_score,
            },
            game: SessionConfig {
                mode,
                seed: toml_cfg.game.seed,
                board,
            },
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. Fallback
    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => return parse_toml(&text),
                Err(e) => warn!("could not read {}: {e}", path.display()),
            }
        }
    }
    TomlConfig::default()
}

fn parse_toml(text: &str) -> TomlConfig {
    match toml::from_str::<TomlConfig>(text) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("config.toml parse error, using default settings: {e}");
            TomlConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = GameConfig::parse("");
        assert_eq!(cfg.speed.tick_rate_ms, 33);
        assert_eq!(cfg.speed.actor_speed, 2);
        assert_eq!(cfg.rules.hit_cooldown_ticks, 30);
        assert_eq!(cfg.rules.small_pellet_points, 100);
        assert_eq!(cfg.rules.large_pellet_points, 200);
        assert_eq!(cfg.rules.win_score, None);
        assert_eq!(cfg.game.mode, Mode::Medium);
        assert_eq!(cfg.game.seed, None);
        assert!(cfg.game.board.is_none());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::parse(
            "[rules]\nwin_score = 500\n\n[game]\nmode = \"versus\"\nseed = 42\n",
        );
        assert_eq!(cfg.rules.win_score, Some(500));
        assert_eq!(cfg.rules.hit_cooldown_ticks, 30);
        assert_eq!(cfg.game.mode, Mode::Versus);
        assert_eq!(cfg.game.seed, Some(42));
        assert_eq!(cfg.speed.tick_rate_ms, 33);
    }

    #[test]
    fn bad_values_fall_back() {
        let cfg = GameConfig::parse("[game]\nmode = \"nightmare\"\n[speed]\nactor_speed = 3\n");
        assert_eq!(cfg.game.mode, Mode::Medium);
        assert_eq!(cfg.speed.actor_speed, 2);

        let cfg = GameConfig::parse("[speed\ntick_rate_ms = ");
        assert_eq!(cfg.speed.tick_rate_ms, 33);
    }

    #[test]
    fn absolute_board_path_is_kept() {
        let cfg = GameConfig::parse("[game]\nboard = \"/srv/boards/wide.txt\"\n");
        assert_eq!(cfg.game.board, Some(PathBuf::from("/srv/boards/wide.txt")));
    }
}
