//! Core data types for a claim attempt.

use alloy::primitives::{Address, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::phase::ClaimPhase;
use crate::error::ClaimFailure;

/// Which party's wallet submits (and pays gas for) the token-moving call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PayMode {
    #[default]
    SenderPays,
    ReceiverPays,
}

/// How the component behaves for the current configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonMode {
    /// Plain clickable button; clicks pass through to the host
    Plain,
    /// Reward-claim button; clicks drive the claim state machine
    Reward,
}

/// Immutable inputs for a single claim attempt.
///
/// Created when the attempt begins and discarded on its terminal outcome.
#[derive(Debug, Clone)]
pub struct ClaimRequest {
    pub attempt_id: Uuid,
    pub token_address: Address,
    /// Amount in the token's smallest unit. Parsed from a decimal string,
    /// never a floating-point type.
    pub amount: U256,
    /// The original decimal string, reported back through callbacks.
    pub amount_raw: String,
    pub token_symbol: String,
    pub pay_mode: PayMode,
    pub sender_address: Option<Address>,
    pub explicit_recipient: Option<Address>,
    pub created_at: DateTime<Utc>,
}

impl ClaimRequest {
    /// Short log label for the attempt's gas-payment mode.
    pub fn pay_mode_label(&self) -> &'static str {
        match self.pay_mode {
            PayMode::SenderPays => "sender pays gas",
            PayMode::ReceiverPays => "receiver pays gas",
        }
    }
}

/// Wallet connection snapshot.
///
/// Always derived from a live query to the wallet provider; a cached
/// "connected" flag can be stale if the wallet locked or switched accounts
/// between render and click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletState {
    pub connected_address: Option<Address>,
    pub is_connected: bool,
}

impl WalletState {
    pub fn connected(address: Address) -> Self {
        Self {
            connected_address: Some(address),
            is_connected: true,
        }
    }

    pub fn disconnected() -> Self {
        Self {
            connected_address: None,
            is_connected: false,
        }
    }
}

/// A submitted transaction whose receipt has not yet been observed.
#[derive(Debug, Clone)]
pub struct PendingTransaction {
    pub hash: String,
    pub submitted_at: DateTime<Utc>,
}

impl PendingTransaction {
    pub fn new(hash: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            submitted_at: Utc::now(),
        }
    }
}

/// Final execution status of a mined transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    Success,
    Reverted,
}

/// On-chain record of a mined transaction's outcome.
#[derive(Debug, Clone)]
pub struct Receipt {
    pub hash: String,
    pub status: TxStatus,
    /// Revert reason when the node surfaced one
    pub revert_reason: Option<String>,
}

impl Receipt {
    pub fn success(hash: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            status: TxStatus::Success,
            revert_reason: None,
        }
    }

    pub fn reverted(hash: impl Into<String>, reason: Option<String>) -> Self {
        Self {
            hash: hash.into(),
            status: TxStatus::Reverted,
            revert_reason: reason,
        }
    }
}

/// Terminal value of an attempt. Exactly one is produced per attempt.
#[derive(Debug, Clone)]
pub enum ClaimOutcome {
    Claimed { hash: String, amount: String },
    Failed(ClaimFailure),
}

/// Wallet provider events fed into the engine by the host's subscriptions.
///
/// These replace any reliance on a UI re-render cycle to notice wallet
/// changes.
#[derive(Debug, Clone)]
pub enum WalletEvent {
    AccountsChanged(Vec<Address>),
    Disconnected,
}

/// Render model for the host UI. The engine is the single source of truth
/// for label and disabled state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonView {
    pub label: String,
    pub disabled: bool,
    pub phase: ClaimPhase,
    pub error: Option<String>,
}
