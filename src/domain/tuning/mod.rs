// Gameplay tuning, kept apart from runtime configuration.

pub mod drone;
pub mod mission;
pub mod pacing;
pub mod sensor;

pub use drone::DroneTuning;
pub use mission::MissionTuning;
pub use sensor::SensorTuning;
