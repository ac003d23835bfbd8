//! External collaborator interfaces.
//!
//! The engine never touches a wallet, RPC node, or ambient `window`-style
//! provider directly; everything blockchain-facing is injected through these
//! traits so each one can be substituted with a test double.

pub mod onchain;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use thiserror::Error;

use crate::error::Result;
use crate::types::Receipt;

pub use onchain::RpcDirectSigner;

/// Why a connected-wallet submission did not yield a transaction hash.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("user rejected the signature request")]
    UserRejected,

    #[error("submission failed: {0}")]
    Other(String),
}

/// Argument to an ERC-20 contract call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallArg {
    Address(Address),
    Uint(U256),
}

/// A concrete contract call: target, function name, ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    pub contract: Address,
    pub function: String,
    pub args: Vec<CallArg>,
}

impl ContractCall {
    pub fn transfer(token: Address, to: Address, amount: U256) -> Self {
        Self {
            contract: token,
            function: "transfer".to_string(),
            args: vec![CallArg::Address(to), CallArg::Uint(amount)],
        }
    }

    pub fn approve(token: Address, spender: Address, amount: U256) -> Self {
        Self {
            contract: token,
            function: "approve".to_string(),
            args: vec![CallArg::Address(spender), CallArg::Uint(amount)],
        }
    }

    pub fn transfer_from(token: Address, from: Address, to: Address, amount: U256) -> Self {
        Self {
            contract: token,
            function: "transferFrom".to_string(),
            args: vec![
                CallArg::Address(from),
                CallArg::Address(to),
                CallArg::Uint(amount),
            ],
        }
    }
}

/// Wallet connection provider (browser wallet, WalletConnect, test double).
///
/// There is deliberately no cached-connection accessor: every consumer goes
/// through the live account query, since a cached view can be stale.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Live query for the currently authorized accounts.
    ///
    /// An error means the provider itself is missing or unreachable; the
    /// gatekeeper treats that as "not connected", never as a panic.
    async fn request_accounts(&self) -> Result<Vec<Address>>;

    /// Surface the provider's connect UI.
    async fn open_connect_modal(&self);
}

/// Submits a contract call for signature through the connected wallet.
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    async fn submit(&self, call: &ContractCall) -> std::result::Result<String, SubmitError>;
}

/// Watches a submitted transaction until its receipt is observed.
#[async_trait]
pub trait ReceiptWatcher: Send + Sync {
    /// Resolves with the mined receipt, or errors if the watch itself failed
    /// (RPC outage, etc.) -- distinct from an on-chain revert.
    async fn await_receipt(&self, tx_hash: &str) -> Result<Receipt>;
}

/// Key-signed direct submitter: signs with the sender key and resolves only
/// after on-chain inclusion.
#[async_trait]
pub trait DirectSigner: Send + Sync {
    async fn send_and_confirm(&self, call: &ContractCall) -> Result<Receipt>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_constructors() {
        let token: Address = "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174"
            .parse()
            .unwrap();
        let to: Address = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
            .parse()
            .unwrap();
        let amount = U256::from(1000u64);

        let call = ContractCall::transfer(token, to, amount);
        assert_eq!(call.function, "transfer");
        assert_eq!(call.args.len(), 2);
        assert_eq!(call.args[0], CallArg::Address(to));

        let call = ContractCall::transfer_from(token, to, to, amount);
        assert_eq!(call.function, "transferFrom");
        assert_eq!(call.args.len(), 3);
    }
}
