//! Wallet connection lifecycle

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::constants::WALLET_STORAGE_KEY;
use crate::errors::{DaoError, DaoResult, WalletNotConnected};
use crate::ledger::LedgerClient;
use crate::persistence::Persist;
use crate::types::{ConnectionState, Network, WalletInfo};
use crate::utils::balance::Mist;

/// Durable subset of [`WalletStore`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSnapshot {
    pub wallet: Option<WalletInfo>,
    pub preferred_network: Network,
    pub auto_connect: bool,
}

impl Default for WalletSnapshot {
    fn default() -> Self {
        Self {
            wallet: None,
            preferred_network: Network::default(),
            auto_connect: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WalletStore {
    wallet: Option<WalletInfo>,
    state: ConnectionState,
    preferred_network: Network,
    auto_connect: bool,
    is_loading: bool,
    error: Option<String>,
}

impl Default for WalletStore {
    fn default() -> Self {
        Self {
            wallet: None,
            state: ConnectionState::Disconnected,
            preferred_network: Network::default(),
            auto_connect: true,
            is_loading: false,
            error: None,
        }
    }
}

impl WalletStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wallet(&self) -> Option<&WalletInfo> {
        self.wallet.as_ref()
    }

    /// Address of the connected wallet
    pub fn address(&self) -> Option<&str> {
        self.wallet
            .as_ref()
            .filter(|_| self.is_connected())
            .map(|w| w.address.as_str())
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn is_connecting(&self) -> bool {
        self.state == ConnectionState::Connecting
    }

    pub fn preferred_network(&self) -> Network {
        self.preferred_network
    }

    pub fn auto_connect(&self) -> bool {
        self.auto_connect
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn fail(&mut self, err: DaoError) -> DaoError {
        warn!(error = %err, "Wallet action failed");
        self.error = Some(err.to_string());
        err
    }

    pub fn set_wallet(&mut self, wallet: WalletInfo) {
        self.state = if wallet.connected {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        };
        self.wallet = Some(wallet);
        self.error = None;
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.state = if connected {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        };
        if let Some(wallet) = self.wallet.as_mut() {
            wallet.connected = connected;
        }
    }

    pub fn set_connecting(&mut self, connecting: bool) {
        if connecting {
            self.state = ConnectionState::Connecting;
        } else if self.state == ConnectionState::Connecting {
            self.state = ConnectionState::Disconnected;
        }
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn set_preferred_network(&mut self, network: Network) {
        self.preferred_network = network;
    }

    pub fn set_auto_connect(&mut self, auto_connect: bool) {
        self.auto_connect = auto_connect;
    }

    /// Disconnected -> Connecting -> Connected on the preferred network
    pub async fn connect_wallet(&mut self, ledger: &dyn LedgerClient) -> DaoResult<WalletInfo> {
        self.state = ConnectionState::Connecting;
        self.error = None;

        match ledger.connect_account(self.preferred_network).await {
            Ok(wallet) => {
                info!(address = %wallet.address, network = %wallet.network, "Wallet connected");
                self.set_wallet(wallet.clone());
                Ok(wallet)
            }
            Err(e) => {
                self.state = ConnectionState::Disconnected;
                Err(self.fail(e))
            }
        }
    }

    /// Back to Disconnected from any state
    pub fn disconnect_wallet(&mut self) {
        if let Some(wallet) = self.wallet.take() {
            info!(address = %wallet.address, "Wallet disconnected");
        }
        self.state = ConnectionState::Disconnected;
        self.error = None;
    }

    fn require_wallet(&mut self) -> DaoResult<WalletInfo> {
        match self.wallet.clone() {
            Some(wallet) if self.is_connected() => Ok(wallet),
            _ => Err(self.fail(WalletNotConnected::new("connect a wallet first").into())),
        }
    }

    /// Re-read the connected account's balance
    pub async fn refresh_balance(&mut self, ledger: &dyn LedgerClient) -> DaoResult<Mist> {
        let mut wallet = self.require_wallet()?;
        self.is_loading = true;
        self.error = None;
        let result = ledger.get_balance(&wallet.address).await;
        self.is_loading = false;

        let balance = result.map_err(|e| self.fail(e))?;
        wallet.balance = balance.to_base_units();
        self.set_wallet(wallet);
        Ok(balance)
    }

    /// Move the connected wallet and the preference to `network`.
    ///
    /// No reconnect happens; without a connected wallet nothing changes.
    pub fn switch_network(&mut self, network: Network) -> DaoResult<()> {
        let mut wallet = self.require_wallet()?;
        wallet.network = network;
        self.set_wallet(wallet);
        self.set_preferred_network(network);
        info!(%network, "Switched network");
        Ok(())
    }
}

impl Persist for WalletStore {
    const KEY: &'static str = WALLET_STORAGE_KEY;
    type Snapshot = WalletSnapshot;

    fn snapshot(&self) -> WalletSnapshot {
        WalletSnapshot {
            wallet: self.wallet.clone(),
            preferred_network: self.preferred_network,
            auto_connect: self.auto_connect,
        }
    }

    fn restore(&mut self, snapshot: WalletSnapshot) {
        self.preferred_network = snapshot.preferred_network;
        self.auto_connect = snapshot.auto_connect;
        match snapshot.wallet {
            Some(wallet) => self.set_wallet(wallet),
            None => {
                self.wallet = None;
                self.state = ConnectionState::Disconnected;
            }
        }
    }
}
