// Use cases: the session gate and the validated actions behind each view.

pub mod actions;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use actions::{ActionError, Dashboard, Notice, Workspace};
pub use session::{Session, SessionFailure, SessionGate, SessionOutcome};
