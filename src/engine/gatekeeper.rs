//! Connection gatekeeping.
//!
//! Answers "is it safe to use the wallet's address right now?" with a direct
//! query for authorized accounts instead of trusting the cached subscription
//! flag, which can be stale if the wallet locked or switched accounts since
//! the last render. The live re-check narrows the time-of-check/time-of-use
//! window; it does not eliminate races with concurrent wallet changes.

use std::sync::Arc;
use tracing::debug;

use crate::adapters::WalletProvider;
use crate::config::ClaimConfiguration;
use crate::types::WalletState;

/// Result of one live provider probe.
#[derive(Debug, Clone, Copy)]
pub struct LiveConnection {
    pub state: WalletState,
    /// False when no provider responded at all (nothing injected, transport
    /// down), as opposed to a provider that answered "no accounts"
    pub provider_available: bool,
}

pub struct ConnectionGatekeeper {
    wallet: Arc<dyn WalletProvider>,
}

impl ConnectionGatekeeper {
    pub fn new(wallet: Arc<dyn WalletProvider>) -> Self {
        Self { wallet }
    }

    /// Live query for authorized accounts. A missing or failing provider is
    /// reported as disconnected, never as an error.
    pub async fn probe(&self) -> LiveConnection {
        match self.wallet.request_accounts().await {
            Ok(accounts) => LiveConnection {
                state: match accounts.first() {
                    Some(address) => WalletState::connected(*address),
                    None => WalletState::disconnected(),
                },
                provider_available: true,
            },
            Err(e) => {
                debug!("Wallet provider unavailable, treating as disconnected: {}", e);
                LiveConnection {
                    state: WalletState::disconnected(),
                    provider_available: false,
                }
            }
        }
    }

    /// Live connection snapshot.
    pub async fn live_connection(&self) -> WalletState {
        self.probe().await.state
    }

    /// Whether this attempt may proceed without a connected wallet.
    ///
    /// Receiver-pays always needs the connection (the connected account pays
    /// gas); sender-pays needs it only when the host opted in.
    pub fn connection_required(
        configuration: &ClaimConfiguration,
        require_connection: bool,
    ) -> bool {
        match configuration {
            ClaimConfiguration::ConnectedReceiverPays { .. } => true,
            ClaimConfiguration::KeySigned { .. }
            | ClaimConfiguration::ConnectedSenderPays { .. } => require_connection,
        }
    }

    /// Surface the provider's connect UI (second click of the gate).
    pub async fn open_connect_modal(&self) {
        self.wallet.open_connect_modal().await;
    }
}
