use crate::domain::state::{LedAppearance, MissionResult};

// Port for the external collaborators the engine reports to.
//
// Every hook is fire-and-forget: implementations must not block, and nothing
// they do can fail a running program.
pub trait EngineHooks: Send + Sync {
    /// User-facing console line.
    fn log(&self, message: &str);

    /// Marks the editor block behind a command as executing (or not).
    fn highlight(&self, _command_id: &str, _on: bool) {}

    /// `(0, 0)` hides the progress indicator.
    fn report_progress(&self, _current: usize, _total: usize) {}

    fn led_changed(&self, _appearance: &LedAppearance) {}

    fn mission_completed(&self, _result: &MissionResult) {}
}
