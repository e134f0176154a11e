// Interface adapters: wire protocol and hook implementations.

pub mod hooks;
pub mod protocol;

pub use hooks::TracingHooks;
pub use protocol::{ProtocolError, Scenario};
