// Per-tick and on-demand simulation systems.

pub mod collision;
pub mod mission;
pub mod movement;
pub mod sensors;
