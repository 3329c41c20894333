//! Seams between the engine and its collaborators.

pub mod input;
pub mod render;
pub mod time;
