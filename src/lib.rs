//! Maze Chase: a tile-maze arcade game on a tick-driven arena/actor core.
//!
//! Core modules:
//! - `domain`: actor contract, grid geometry, steering, concrete actors
//! - `sim`: the arena tick protocol, maze boards, the setup menu, the game session
//! - `ui`: terminal renderer and keyboard input
//! - `config`: `config.toml` loading

pub mod config;
pub mod domain;
pub mod sim;
pub mod ui;
