//! Operator credentials and network selection.
//!
//! Each network carries an operator ID/key pair. A pair is either fully
//! set or fully empty; a half-configured network is rejected before
//! anything is written.

use secrecy::SecretString;

use crate::error::CredentialError;
use crate::state::{Network, State, StateField, StateStore, is_account_id};

/// Operator ID and key for one network. Only an empty string means "not configured".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperatorPair {
    pub id: String,
    pub key: String,
}

impl OperatorPair {
    /// Build a pair from optional raw values; an absent value is empty.
    pub fn new(id: Option<&str>, key: Option<&str>) -> Self {
        Self {
            id: id.unwrap_or_default().to_string(),
            key: key.unwrap_or_default().to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_empty() && self.key.is_empty()
    }
}

/// Fail with `IncompletePair` when exactly one of `key`/`id` is set.
pub fn validate_pair(network: Network, key: &str, id: &str) -> Result<(), CredentialError> {
    if key.is_empty() != id.is_empty() {
        return Err(CredentialError::IncompletePair { network });
    }
    Ok(())
}

/// Credentials for both networks, as supplied by the user's `.env` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperatorCredentials {
    pub testnet: OperatorPair,
    pub mainnet: OperatorPair,
}

impl OperatorCredentials {
    pub fn pair(&self, network: Network) -> &OperatorPair {
        match network {
            Network::Mainnet => &self.mainnet,
            Network::Testnet => &self.testnet,
        }
    }

    /// Validate both pairs; testnet is checked first.
    pub fn validate(&self) -> Result<(), CredentialError> {
        for network in [Network::Testnet, Network::Mainnet] {
            let pair = self.pair(network);
            validate_pair(network, &pair.key, &pair.id)?;
        }
        Ok(())
    }

    /// Write all four fields into `state`.
    ///
    /// The active network moves to mainnet only when testnet is entirely
    /// unconfigured; otherwise the stored choice is kept.
    pub fn apply_to(&self, state: &mut State) {
        for network in Network::ALL {
            let pair = self.pair(network);
            state.set_operator(network, pair.id.clone(), pair.key.clone());
        }
        if self.testnet.is_empty() {
            state.network = Network::Mainnet;
        }
    }
}

/// The account that signs and pays for network requests.
#[derive(Debug)]
pub struct OperatorIdentity {
    pub network: Network,
    pub account_id: String,
    pub private_key: SecretString,
}

/// Builds a network client bound to an operator.
pub trait ClientFactory {
    type Client;

    fn connect(
        &self,
        network: Network,
        operator: OperatorIdentity,
    ) -> Result<Self::Client, CredentialError>;
}

/// Resolved connection settings handed to network commands.
#[derive(Debug)]
pub struct ClientConfig {
    pub network: Network,
    pub operator: OperatorIdentity,
}

/// Factory producing [`ClientConfig`] handles.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientConfigFactory;

impl ClientFactory for ClientConfigFactory {
    type Client = ClientConfig;

    fn connect(
        &self,
        network: Network,
        operator: OperatorIdentity,
    ) -> Result<Self::Client, CredentialError> {
        Ok(ClientConfig { network, operator })
    }
}

/// Applies credentials and switches networks on a [`StateStore`].
pub struct CredentialManager<'a> {
    store: &'a StateStore,
}

impl<'a> CredentialManager<'a> {
    pub fn new(store: &'a StateStore) -> Self {
        Self { store }
    }

    pub fn active_network(&self) -> Result<Network, CredentialError> {
        Ok(self.store.get(|state| state.network)?)
    }

    pub fn apply_credentials(&self, credentials: &OperatorCredentials) -> Result<(), CredentialError> {
        let network = self.store.update(|state| {
            credentials.apply_to(state);
            Ok::<_, CredentialError>(state.network)
        })?;
        tracing::info!("Operator credentials applied, active network: {}", network);
        Ok(())
    }

    /// Make `name` the active network. Its operator pair must be configured.
    pub fn switch_network(&self, name: &str) -> Result<Network, CredentialError> {
        let network: Network = name
            .parse()
            .map_err(|_| CredentialError::InvalidNetwork(name.to_string()))?;

        let configured = self.store.get(|state| {
            let (id, key) = state.operator(network);
            !id.is_empty() && !key.is_empty()
        })?;
        if !configured {
            return Err(CredentialError::MissingOperator { network });
        }

        self.store.save_key(StateField::Network(network))?;
        tracing::info!("Switched to {}", network);
        Ok(network)
    }

    /// Operator for the active network.
    pub fn operator_identity(&self) -> Result<OperatorIdentity, CredentialError> {
        let state = self.store.get_all()?;
        let network = state.network;
        let (id, key) = state.operator(network);

        if id.is_empty() || key.is_empty() {
            return Err(CredentialError::MissingOperator { network });
        }
        if !is_account_id(id) {
            return Err(CredentialError::InvalidOperatorId {
                network,
                id: id.to_string(),
            });
        }

        Ok(OperatorIdentity {
            network,
            account_id: id.to_string(),
            private_key: SecretString::from(key.to_string()),
        })
    }

    /// Build a client for the active network's operator.
    pub fn resolve_client<F: ClientFactory>(&self, factory: &F) -> Result<F::Client, CredentialError> {
        let operator = self.operator_identity()?;
        factory.connect(operator.network, operator)
    }

    /// Mirror node base URL for the active network.
    pub fn mirror_node_url(&self) -> Result<String, CredentialError> {
        Ok(self
            .store
            .get(|state| state.mirror_node(state.network).to_string())?)
    }
}
