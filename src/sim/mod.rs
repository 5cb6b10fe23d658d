//! Simulation: the arena and the session built on it.
//!
//! Deterministic for a given seed: ghost turns come from per-ghost seeded
//! RNGs and the arena iterates in registration order.

pub mod arena;
pub mod game;
pub mod maze;
pub mod menu;
