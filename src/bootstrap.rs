//! Bootstrap helpers for the Hedera CLI.
//!
//! Operator credentials are supplied by the user in a dotenv file that is
//! read once by `setup init` / `setup reset`. The file is parsed into an
//! explicit [`OperatorEnv`]; the process environment is never touched.
//!
//! File: `~/.hedera/.env` (standard dotenvy format)

use std::path::{Path, PathBuf};

use crate::credentials::{OperatorCredentials, OperatorPair};
use crate::error::SetupError;

/// Keys read from the `.env` file.
pub const TESTNET_OPERATOR_KEY: &str = "TESTNET_OPERATOR_KEY";
pub const TESTNET_OPERATOR_ID: &str = "TESTNET_OPERATOR_ID";
pub const MAINNET_OPERATOR_KEY: &str = "MAINNET_OPERATOR_KEY";
pub const MAINNET_OPERATOR_ID: &str = "MAINNET_OPERATOR_ID";

/// The CLI home directory: `~/.hedera`.
pub fn hedera_home_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".hedera"))
}

/// Path to the credential file: `~/.hedera/.env`.
pub fn hedera_env_path() -> Option<PathBuf> {
    hedera_home_dir().map(|dir| dir.join(".env"))
}

/// Path to the state document: `~/.hedera/state.json`.
pub fn default_state_path() -> Option<PathBuf> {
    hedera_home_dir().map(|dir| dir.join("state.json"))
}

/// The four optional credential values from the `.env` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperatorEnv {
    pub testnet_operator_key: Option<String>,
    pub testnet_operator_id: Option<String>,
    pub mainnet_operator_key: Option<String>,
    pub mainnet_operator_id: Option<String>,
}

impl OperatorEnv {
    /// Parse `path`. A missing or malformed file is an error; unknown keys are ignored.
    pub fn from_path(path: &Path) -> Result<Self, SetupError> {
        let env_error = |reason: String| SetupError::EnvFile {
            path: path.to_path_buf(),
            reason,
        };

        let iter = dotenvy::from_path_iter(path).map_err(|e| env_error(e.to_string()))?;

        let mut env = Self::default();
        for item in iter {
            let (key, value) = item.map_err(|e| env_error(e.to_string()))?;
            let slot = match key.as_str() {
                TESTNET_OPERATOR_KEY => &mut env.testnet_operator_key,
                TESTNET_OPERATOR_ID => &mut env.testnet_operator_id,
                MAINNET_OPERATOR_KEY => &mut env.mainnet_operator_key,
                MAINNET_OPERATOR_ID => &mut env.mainnet_operator_id,
                _ => continue,
            };
            *slot = Some(value);
        }

        tracing::debug!("Loaded operator credentials from {}", path.display());
        Ok(env)
    }

    pub fn credentials(&self) -> OperatorCredentials {
        OperatorCredentials {
            testnet: OperatorPair::new(
                self.testnet_operator_id.as_deref(),
                self.testnet_operator_key.as_deref(),
            ),
            mainnet: OperatorPair::new(
                self.mainnet_operator_id.as_deref(),
                self.mainnet_operator_key.as_deref(),
            ),
        }
    }
}
