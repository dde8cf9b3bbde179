//! Domain models for the dashboard back end.

pub mod project;
pub mod session;

pub use project::{AnalystPerformance, Municipality, Project, Task};
pub use session::{PersistedIdentity, keys as session_keys};
