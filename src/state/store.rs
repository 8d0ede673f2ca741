//! Whole-document state persistence.
//!
//! Every read loads the full document and every write replaces it. The
//! JSON file backend writes a sibling temp file and renames it over the
//! target, so a reader sees either the previous or the new document.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use fs4::FileExt;

use crate::error::StateError;
use crate::state::{State, StateField};

/// Storage for the state document.
pub trait StateBackend: Send + Sync {
    /// Load the full document.
    fn load(&self) -> Result<State, StateError>;

    /// Replace the full document.
    fn persist(&self, state: &State) -> Result<(), StateError>;

    /// Human-readable location used in errors and logs.
    fn location(&self) -> String;
}

/// JSON document on disk.
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(suffix);
        PathBuf::from(name)
    }

    fn write_failed(&self, e: impl std::fmt::Display) -> StateError {
        StateError::WriteFailed {
            location: self.location(),
            reason: e.to_string(),
        }
    }
}

impl StateBackend for JsonFileBackend {
    fn load(&self) -> Result<State, StateError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No state document at {}, using defaults", self.path.display());
                return Ok(State::default());
            }
            Err(e) => {
                return Err(StateError::Unavailable {
                    location: self.location(),
                    reason: e.to_string(),
                });
            }
        };

        serde_json::from_str(&data).map_err(|e| StateError::Unavailable {
            location: self.location(),
            reason: format!("invalid state document: {e}"),
        })
    }

    fn persist(&self, state: &State) -> Result<(), StateError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| self.write_failed(e))?;
        }

        let json = serde_json::to_string_pretty(state)?;

        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.sibling(".lock"))
            .map_err(|e| self.write_failed(e))?;
        lock.lock_exclusive().map_err(|e| self.write_failed(e))?;

        let temp_path = self.sibling(".tmp");
        let result = (|| -> std::io::Result<()> {
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&temp_path)?;
            file.write_all(json.as_bytes())?;
            file.write_all(b"\n")?;
            file.sync_all()?;
            fs::rename(&temp_path, &self.path)
        })();

        if let Err(e) = lock.unlock() {
            tracing::warn!("Failed to release state lock for {}: {}", self.path.display(), e);
        }
        result.map_err(|e| self.write_failed(e))
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-process document.
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
}

impl MemoryBackend {
    pub fn new(state: State) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }
}

impl StateBackend for MemoryBackend {
    fn load(&self) -> Result<State, StateError> {
        self.state
            .lock()
            .map(|state| state.clone())
            .map_err(|e| StateError::Unavailable {
                location: self.location(),
                reason: e.to_string(),
            })
    }

    fn persist(&self, state: &State) -> Result<(), StateError> {
        let mut guard = self.state.lock().map_err(|e| StateError::WriteFailed {
            location: self.location(),
            reason: e.to_string(),
        })?;
        *guard = state.clone();
        Ok(())
    }

    fn location(&self) -> String {
        "<memory>".to_string()
    }
}

/// Handle to the state document, opened once per CLI invocation.
pub struct StateStore {
    backend: Box<dyn StateBackend>,
}

impl StateStore {
    pub fn new(backend: impl StateBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// Open the JSON document at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::new(JsonFileBackend::new(path))
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::default())
    }

    pub fn location(&self) -> String {
        self.backend.location()
    }

    /// Read the full document.
    pub fn get_all(&self) -> Result<State, StateError> {
        let state = self.backend.load()?;
        tracing::debug!("Loaded state from {}", self.backend.location());
        Ok(state)
    }

    /// Read a single projection of the document.
    pub fn get<T>(&self, read: impl FnOnce(&State) -> T) -> Result<T, StateError> {
        Ok(read(&self.get_all()?))
    }

    /// Persist one top-level field, keeping everything else as stored.
    pub fn save_key(&self, field: StateField) -> Result<(), StateError> {
        let mut state = self.get_all()?;
        state.apply(field);
        self.save_state(&state)
    }

    /// Persist a full replacement document.
    pub fn save_state(&self, state: &State) -> Result<(), StateError> {
        self.backend.persist(state)?;
        tracing::debug!("Saved state to {}", self.backend.location());
        Ok(())
    }

    /// Load, mutate, and save the document in one step.
    ///
    /// Nothing is written when `mutate` fails.
    pub fn update<T, E>(&self, mutate: impl FnOnce(&mut State) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StateError>,
    {
        let mut state = self.get_all()?;
        let out = mutate(&mut state)?;
        self.save_state(&state)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Account, Network, Script, Token, TokenAssociation};
    use tempfile::tempdir;

    fn populated_state() -> State {
        let mut state = State {
            network: Network::Mainnet,
            mainnet_operator_id: "0.0.2".to_string(),
            mainnet_operator_key: "302e0201".to_string(),
            recording: true,
            recording_script_name: "deploy".to_string(),
            ..Default::default()
        };
        state
            .accounts
            .insert("alice".to_string(), Account::new("0.0.1001", "alice"));
        let mut token = Token::new("0.0.5005");
        token.associations.push(TokenAssociation {
            alias: "alice".to_string(),
            account_id: "0.0.1001".to_string(),
        });
        state.tokens.insert("0.0.5005".to_string(), token);
        state.scripts.insert(
            "deploy".to_string(),
            Script {
                commands: vec!["account create -b 1000".to_string()],
            },
        );
        state
    }

    #[test]
    fn test_save_state_then_get_all_round_trip() {
        let dir = tempdir().unwrap();
        let store = StateStore::open(dir.path().join("state.json"));

        let state = populated_state();
        store.save_state(&state).unwrap();
        assert_eq!(store.get_all().unwrap(), state);
    }

    #[test]
    fn test_missing_document_reads_as_default() {
        let dir = tempdir().unwrap();
        let store = StateStore::open(dir.path().join("nested").join("state.json"));
        assert_eq!(store.get_all().unwrap(), State::default());
    }

    #[test]
    fn test_corrupt_document_is_unavailable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = StateStore::open(&path);
        let err = store.get_all().unwrap_err();
        assert!(matches!(err, StateError::Unavailable { .. }));

        // save_key must not paper over the broken document
        let err = store
            .save_key(StateField::Network(Network::Mainnet))
            .unwrap_err();
        assert!(matches!(err, StateError::Unavailable { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn test_save_key_leaves_other_fields() {
        let dir = tempdir().unwrap();
        let store = StateStore::open(dir.path().join("state.json"));
        let state = populated_state();
        store.save_state(&state).unwrap();

        store
            .save_key(StateField::Tokens(Default::default()))
            .unwrap();

        let loaded = store.get_all().unwrap();
        assert!(loaded.tokens.is_empty());
        assert_eq!(loaded.accounts, state.accounts);
        assert_eq!(loaded.scripts, state.scripts);
        assert_eq!(loaded.network, Network::Mainnet);
    }

    #[test]
    fn test_persist_creates_parent_dirs_and_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deep").join("state.json");
        let store = StateStore::open(&path);

        store.save_state(&State::default()).unwrap();

        assert!(path.exists());
        assert!(!dir.path().join("deep").join("state.json.tmp").exists());
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["recording"], 0);
    }

    #[test]
    fn test_update_does_not_save_on_error() {
        let store = StateStore::in_memory();
        let result: Result<(), StateError> = store.update(|state| {
            state.network = Network::Mainnet;
            Err(StateError::WriteFailed {
                location: "test".to_string(),
                reason: "abort".to_string(),
            })
        });
        assert!(result.is_err());
        assert_eq!(store.get(|s| s.network).unwrap(), Network::Testnet);
    }
}
