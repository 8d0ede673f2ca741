//! `setup init` and `setup reset`.

mod orchestrator;

pub use self::orchestrator::{ResetOptions, SetupOrchestrator, SetupReport};
