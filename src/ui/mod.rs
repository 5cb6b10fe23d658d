//! Terminal front end (crossterm).

pub mod input;
pub mod renderer;
