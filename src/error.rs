//! Error types for the Hedera CLI state layer.

use std::path::PathBuf;

use crate::state::Network;

/// Top-level error type for the CLI.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("State error: {0}")]
    State(#[from] StateError),

    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    #[error("Recorder error: {0}")]
    Recorder(#[from] RecorderError),

    #[error("Setup error: {0}")]
    Setup(#[from] SetupError),
}

/// Errors from the persisted state document.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// The backing store could not be read or did not hold a valid document.
    #[error("State unavailable at {location}: {reason}")]
    Unavailable { location: String, reason: String },

    #[error("Failed to write state to {location}: {reason}")]
    WriteFailed { location: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Operator credential and network selection errors.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error(
        "Both {prefix}_OPERATOR_KEY and {prefix}_OPERATOR_ID must be defined together",
        prefix = .network.env_prefix()
    )]
    IncompletePair { network: Network },

    #[error("Invalid network name '{0}'. Available networks: mainnet, testnet")]
    InvalidNetwork(String),

    #[error("Unsupported network: {0}")]
    UnsupportedNetwork(String),

    #[error("Operator key and ID not set for {network}")]
    MissingOperator { network: Network },

    #[error("Operator ID '{id}' for {network} is not a valid account ID")]
    InvalidOperatorId { network: Network, id: String },

    #[error("Client construction failed: {0}")]
    Client(String),

    #[error(transparent)]
    State(#[from] StateError),
}

/// Account and token lookup errors.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Token not found: {0}")]
    TokenNotFound(String),

    #[error(transparent)]
    State(#[from] StateError),
}

/// Script recording errors.
#[derive(Debug, thiserror::Error)]
pub enum RecorderError {
    #[error("Script '{0}' does not exist")]
    ScriptNotFound(String),

    #[error("Already recording script '{0}'")]
    AlreadyRecording(String),

    #[error("No recording session is active")]
    NotRecording,

    #[error(transparent)]
    State(#[from] StateError),
}

/// `setup init` / `setup reset` errors.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("HOME directory could not be determined")]
    HomeDirMissing,

    #[error("Error loading {}: {reason}", .path.display())]
    EnvFile { path: PathBuf, reason: String },

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    State(#[from] StateError),
}

pub type Result<T> = std::result::Result<T, Error>;
