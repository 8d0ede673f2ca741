//! Resolved runtime paths.
//!
//! Paths come from explicit overrides (CLI flag or env var, handled by
//! clap) and fall back to `~/.hedera/`.

use std::path::PathBuf;

use crate::bootstrap::{default_state_path, hedera_env_path};
use crate::error::SetupError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// State document, `~/.hedera/state.json` by default.
    pub state_path: PathBuf,
    /// Credential file, `~/.hedera/.env` by default.
    pub env_path: PathBuf,
}

impl Config {
    pub fn resolve(
        state_path: Option<PathBuf>,
        env_path: Option<PathBuf>,
    ) -> Result<Self, SetupError> {
        let state_path = state_path
            .or_else(default_state_path)
            .ok_or(SetupError::HomeDirMissing)?;
        let env_path = env_path
            .or_else(hedera_env_path)
            .ok_or(SetupError::HomeDirMissing)?;
        Ok(Self {
            state_path,
            env_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_win() {
        let config = Config::resolve(
            Some(PathBuf::from("/tmp/state.json")),
            Some(PathBuf::from("/tmp/.env")),
        )
        .unwrap();
        assert_eq!(config.state_path, PathBuf::from("/tmp/state.json"));
        assert_eq!(config.env_path, PathBuf::from("/tmp/.env"));
    }

    #[test]
    fn test_defaults_live_under_hedera_home() {
        if dirs::home_dir().is_none() {
            return;
        }
        let config = Config::resolve(None, None).unwrap();
        assert!(config.state_path.ends_with(".hedera/state.json"));
        assert!(config.env_path.ends_with(".hedera/.env"));
    }
}
