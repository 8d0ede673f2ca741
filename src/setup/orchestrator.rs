//! Setup orchestration.
//!
//! `init` writes a fresh default document and then installs the operator
//! credentials from the user's `.env` file. `reset` does the same unless
//! partitions are marked to skip, in which case credentials are re-applied
//! and only the unskipped partitions are cleared.
//!
//! Credentials are validated before anything is written.

use crate::bootstrap::OperatorEnv;
use crate::credentials::{CredentialManager, OperatorCredentials};
use crate::error::SetupError;
use crate::state::{Network, State, StateStore};

/// Which partitions `setup reset` leaves untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResetOptions {
    pub skip_accounts: bool,
    pub skip_tokens: bool,
    pub skip_scripts: bool,
}

impl ResetOptions {
    /// No partition is skipped, so reset behaves like init.
    pub fn is_full(&self) -> bool {
        !self.skip_accounts && !self.skip_tokens && !self.skip_scripts
    }
}

/// What a setup action changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupReport {
    /// Active network after setup.
    pub network: Network,
    /// Partitions emptied by this action.
    pub cleared: Vec<&'static str>,
    /// Recording session that setup ended, if one was active.
    pub ended_recording: Option<String>,
}

pub struct SetupOrchestrator<'a> {
    store: &'a StateStore,
}

impl<'a> SetupOrchestrator<'a> {
    pub fn new(store: &'a StateStore) -> Self {
        Self { store }
    }

    /// Replace the document with defaults and install credentials.
    pub fn init(&self, env: &OperatorEnv) -> Result<SetupReport, SetupError> {
        let credentials = validated_credentials(env)?;

        // An unreadable previous document is replaced, not reported.
        let ended_recording = match self.store.get(active_script) {
            Ok(active) => active,
            Err(e) => {
                tracing::warn!("Replacing unreadable state at {}: {}", self.store.location(), e);
                None
            }
        };

        self.store.save_state(&State::default())?;
        CredentialManager::new(self.store).apply_credentials(&credentials)?;

        if let Some(name) = &ended_recording {
            tracing::warn!("Recording session for script {} ended by init", name);
        }
        tracing::info!("State initialized at {}", self.store.location());

        Ok(SetupReport {
            network: self.store.get(|state| state.network)?,
            cleared: vec!["accounts", "tokens", "scripts"],
            ended_recording,
        })
    }

    /// Re-apply credentials and clear every partition not skipped.
    pub fn reset(&self, env: &OperatorEnv, options: ResetOptions) -> Result<SetupReport, SetupError> {
        if options.is_full() {
            tracing::info!("Resetting CLI to default settings");
            return self.init(env);
        }

        let credentials = validated_credentials(env)?;

        // one document write: credentials and cleared partitions land together
        let (network, cleared, ended_recording) = self.store.update(|state| {
            credentials.apply_to(state);
            let mut cleared = Vec::new();
            let mut ended_recording = None;

            if !options.skip_accounts {
                state.accounts.clear();
                cleared.push("accounts");
            }
            if !options.skip_tokens {
                state.tokens.clear();
                cleared.push("tokens");
            }
            if !options.skip_scripts {
                state.scripts.clear();
                cleared.push("scripts");
                ended_recording = active_script(state);
                state.recording = false;
                state.recording_script_name.clear();
            }

            Ok::<_, SetupError>((state.network, cleared, ended_recording))
        })?;

        if let Some(name) = &ended_recording {
            tracing::warn!("Recording session for script {} ended by reset", name);
        }
        tracing::info!("State reset on {}, cleared: {:?}", network, cleared);

        Ok(SetupReport {
            network,
            cleared,
            ended_recording,
        })
    }
}

fn validated_credentials(env: &OperatorEnv) -> Result<OperatorCredentials, SetupError> {
    let credentials = env.credentials();
    credentials.validate()?;
    Ok(credentials)
}

fn active_script(state: &State) -> Option<String> {
    state.active_script().map(str::to_string)
}
