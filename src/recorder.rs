//! Command recording into named scripts.
//!
//! While a recording session is active, every top-level invocation is
//! appended to the session's script before the command itself runs.

use crate::error::RecorderError;
use crate::state::StateStore;

pub struct CommandRecorder<'a> {
    store: &'a StateStore,
}

impl<'a> CommandRecorder<'a> {
    pub fn new(store: &'a StateStore) -> Self {
        Self { store }
    }

    /// Append `command` (joined with spaces) to the active script.
    ///
    /// Returns `false` without touching the document when no session is active.
    pub fn record_command<S: AsRef<str>>(&self, command: &[S]) -> Result<bool, RecorderError> {
        let Some(name) = self.store.get(|state| state.active_script().map(str::to_string))? else {
            return Ok(false);
        };

        let line = command
            .iter()
            .map(AsRef::<str>::as_ref)
            .collect::<Vec<_>>()
            .join(" ");

        self.store.update(|state| {
            let script = state
                .scripts
                .get_mut(&name)
                .ok_or_else(|| RecorderError::ScriptNotFound(name.clone()))?;
            script.commands.push(line.clone());
            Ok::<_, RecorderError>(())
        })?;

        tracing::debug!("Recorded '{}' into script {}", line, name);
        Ok(true)
    }

    /// Begin recording into `name`, creating the script if needed.
    pub fn start_recording(&self, name: &str) -> Result<(), RecorderError> {
        self.store.update(|state| {
            if let Some(active) = state.active_script() {
                return Err(RecorderError::AlreadyRecording(active.to_string()));
            }
            state.scripts.entry(name.to_string()).or_default();
            state.recording = true;
            state.recording_script_name = name.to_string();
            Ok(())
        })?;
        tracing::info!("Recording started for script {}", name);
        Ok(())
    }

    /// End the active session and return the script name.
    pub fn stop_recording(&self) -> Result<String, RecorderError> {
        let name = self.store.update(|state| {
            let name = state
                .active_script()
                .map(str::to_string)
                .ok_or(RecorderError::NotRecording)?;
            state.recording = false;
            state.recording_script_name.clear();
            Ok::<_, RecorderError>(name)
        })?;
        tracing::info!("Recording stopped for script {}", name);
        Ok(name)
    }
}
