//! Persisted CLI state.
//!
//! A single JSON document holds everything the CLI remembers between
//! invocations: operator credentials per network, the active network,
//! locally known accounts and tokens, and recorded scripts.
//!
//! File: `~/.hedera/state.json`

pub mod accounts;
pub mod store;

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::CredentialError;

pub use self::accounts::{AccountResolver, add_token_association, is_account_id};
pub use self::store::{JsonFileBackend, MemoryBackend, StateBackend, StateStore};

pub const DEFAULT_MIRROR_NODE_MAINNET: &str = "https://mainnet-public.mirrornode.hedera.com/api/v1";
pub const DEFAULT_MIRROR_NODE_TESTNET: &str = "https://testnet.mirrornode.hedera.com/api/v1";

/// Network a credential pair and mirror node belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    pub const ALL: [Network; 2] = [Network::Mainnet, Network::Testnet];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
        }
    }

    /// Prefix of the credential variables in the `.env` file.
    pub fn env_prefix(self) -> &'static str {
        match self {
            Self::Mainnet => "MAINNET",
            Self::Testnet => "TESTNET",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = CredentialError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            _ => Err(CredentialError::UnsupportedNetwork(value.to_string())),
        }
    }
}

/// A locally known account, keyed by alias in [`State::accounts`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub account_id: String,
    pub alias: String,

    /// Fields written by other commands (key type, public key, EVM address...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Account {
    pub fn new(account_id: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            alias: alias.into(),
            extra: serde_json::Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAssociation {
    pub alias: String,
    pub account_id: String,
}

/// A locally known token, keyed by token ID in [`State::tokens`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub token_id: String,
    #[serde(default)]
    pub associations: Vec<TokenAssociation>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Token {
    pub fn new(token_id: impl Into<String>) -> Self {
        Self {
            token_id: token_id.into(),
            associations: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }
}

/// A recorded, replayable sequence of command lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub commands: Vec<String>,
}

/// The whole persisted document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    pub network: Network,

    #[serde(default)]
    pub mainnet_operator_id: String,
    #[serde(default)]
    pub mainnet_operator_key: String,
    #[serde(default)]
    pub testnet_operator_id: String,
    #[serde(default)]
    pub testnet_operator_key: String,

    #[serde(default = "default_mirror_node_mainnet")]
    pub mirror_node_mainnet: String,
    #[serde(default = "default_mirror_node_testnet")]
    pub mirror_node_testnet: String,

    #[serde(default)]
    pub accounts: IndexMap<String, Account>,
    #[serde(default)]
    pub tokens: IndexMap<String, Token>,
    #[serde(default)]
    pub scripts: IndexMap<String, Script>,

    /// Stored as `0`/`1`.
    #[serde(default, with = "int_flag")]
    pub recording: bool,
    #[serde(default)]
    pub recording_script_name: String,
}

fn default_mirror_node_mainnet() -> String {
    DEFAULT_MIRROR_NODE_MAINNET.to_string()
}

fn default_mirror_node_testnet() -> String {
    DEFAULT_MIRROR_NODE_TESTNET.to_string()
}

impl Default for State {
    fn default() -> Self {
        Self {
            network: Network::Testnet,
            mainnet_operator_id: String::new(),
            mainnet_operator_key: String::new(),
            testnet_operator_id: String::new(),
            testnet_operator_key: String::new(),
            mirror_node_mainnet: default_mirror_node_mainnet(),
            mirror_node_testnet: default_mirror_node_testnet(),
            accounts: IndexMap::new(),
            tokens: IndexMap::new(),
            scripts: IndexMap::new(),
            recording: false,
            recording_script_name: String::new(),
        }
    }
}

impl State {
    /// Operator `(id, key)` stored for `network`; either may be empty.
    pub fn operator(&self, network: Network) -> (&str, &str) {
        match network {
            Network::Mainnet => (&self.mainnet_operator_id, &self.mainnet_operator_key),
            Network::Testnet => (&self.testnet_operator_id, &self.testnet_operator_key),
        }
    }

    pub fn set_operator(&mut self, network: Network, id: String, key: String) {
        match network {
            Network::Mainnet => {
                self.mainnet_operator_id = id;
                self.mainnet_operator_key = key;
            }
            Network::Testnet => {
                self.testnet_operator_id = id;
                self.testnet_operator_key = key;
            }
        }
    }

    pub fn mirror_node(&self, network: Network) -> &str {
        match network {
            Network::Mainnet => &self.mirror_node_mainnet,
            Network::Testnet => &self.mirror_node_testnet,
        }
    }

    /// Script currently being recorded into, if a session is active.
    pub fn active_script(&self) -> Option<&str> {
        self.recording.then_some(self.recording_script_name.as_str())
    }

    /// Apply a single top-level field, leaving the rest of the document alone.
    pub fn apply(&mut self, field: StateField) {
        match field {
            StateField::Network(network) => self.network = network,
            StateField::Accounts(accounts) => self.accounts = accounts,
            StateField::Tokens(tokens) => self.tokens = tokens,
            StateField::Scripts(scripts) => self.scripts = scripts,
            StateField::Recording(recording) => self.recording = recording,
            StateField::RecordingScriptName(name) => self.recording_script_name = name,
        }
    }
}

/// A top-level field written by [`StateStore::save_key`].
#[derive(Debug, Clone, PartialEq)]
pub enum StateField {
    Network(Network),
    Accounts(IndexMap<String, Account>),
    Tokens(IndexMap<String, Token>),
    Scripts(IndexMap<String, Script>),
    Recording(bool),
    RecordingScriptName(String),
}

mod int_flag {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(serde::de::Error::custom(format!(
                "recording flag must be 0 or 1, got {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_state_document_shape() {
        let value = serde_json::to_value(State::default()).unwrap();
        assert_eq!(value["network"], "testnet");
        assert_eq!(value["recording"], 0);
        assert_eq!(value["recordingScriptName"], "");
        assert_eq!(value["mainnetOperatorId"], "");
        assert_eq!(value["mirrorNodeTestnet"], DEFAULT_MIRROR_NODE_TESTNET);
        assert_eq!(value["accounts"], json!({}));
        assert_eq!(value["tokens"], json!({}));
        assert_eq!(value["scripts"], json!({}));
    }

    #[test]
    fn test_recording_flag_rejects_other_integers() {
        let mut value = serde_json::to_value(State::default()).unwrap();
        value["recording"] = json!(2);
        assert!(serde_json::from_value::<State>(value).is_err());
    }

    #[test]
    fn test_unknown_network_is_rejected() {
        let mut value = serde_json::to_value(State::default()).unwrap();
        value["network"] = json!("previewnet");
        assert!(serde_json::from_value::<State>(value).is_err());

        let err = "previewnet".parse::<Network>().unwrap_err();
        assert!(matches!(err, CredentialError::UnsupportedNetwork(name) if name == "previewnet"));
    }

    #[test]
    fn test_network_parse_is_exact() {
        assert_eq!("mainnet".parse::<Network>().unwrap(), Network::Mainnet);
        assert_eq!("testnet".parse::<Network>().unwrap(), Network::Testnet);
        for name in ["MAINNET", " mainnet", "testnet ", "Testnet"] {
            assert!(name.parse::<Network>().is_err(), "{name:?} should not parse");
        }
    }

    #[test]
    fn test_collections_keep_document_order() {
        let mut value = serde_json::to_value(State::default()).unwrap();
        value["accounts"] = json!({
            "zeta": { "accountId": "0.0.7", "alias": "zeta" },
            "alpha": { "accountId": "0.0.7", "alias": "alpha" }
        });
        let state: State = serde_json::from_value(value).unwrap();
        let aliases: Vec<_> = state.accounts.keys().map(String::as_str).collect();
        assert_eq!(aliases, ["zeta", "alpha"]);

        let saved = serde_json::to_string(&state).unwrap();
        let zeta = saved.find("\"zeta\"").unwrap();
        let alpha = saved.find("\"alpha\"").unwrap();
        assert!(zeta < alpha);
    }

    #[test]
    fn test_account_extra_fields_survive_round_trip() {
        let raw = json!({
            "accountId": "0.0.1234",
            "alias": "alice",
            "type": "ed25519",
            "publicKey": "302a..."
        });
        let account: Account = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(account.account_id, "0.0.1234");
        assert_eq!(account.extra["type"], "ed25519");
        assert_eq!(serde_json::to_value(&account).unwrap(), raw);
    }

    #[test]
    fn test_apply_touches_only_the_named_field() {
        let mut state = State {
            testnet_operator_id: "0.0.2".to_string(),
            testnet_operator_key: "key".to_string(),
            ..Default::default()
        };
        state
            .accounts
            .insert("alice".to_string(), Account::new("0.0.1001", "alice"));

        state.apply(StateField::Network(Network::Mainnet));
        assert_eq!(state.network, Network::Mainnet);
        assert_eq!(state.accounts.len(), 1);
        assert_eq!(state.operator(Network::Testnet), ("0.0.2", "key"));
    }

    #[test]
    fn test_active_script_requires_recording() {
        let mut state = State {
            recording_script_name: "deploy".to_string(),
            ..Default::default()
        };
        assert_eq!(state.active_script(), None);
        state.recording = true;
        assert_eq!(state.active_script(), Some("deploy"));
    }
}
