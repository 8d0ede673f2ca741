//! Hedera CLI local state.
//!
//! Persists operator credentials, the active network, known accounts and
//! tokens, and recorded scripts in a single JSON document, and provides the
//! `setup` workflows that initialize and reset it.

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod credentials;
pub mod error;
pub mod recorder;
pub mod setup;
pub mod state;

pub use error::{Error, Result};
