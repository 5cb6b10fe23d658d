//! Pure game rules: no I/O, no terminal.

pub mod actor;
pub mod entity;
pub mod event;
pub mod grid;
pub mod steering;
pub mod tile;
