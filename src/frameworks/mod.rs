// Frameworks layer: runtime bootstrap and environment configuration.

pub mod config;
pub mod runner;
