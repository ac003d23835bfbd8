//! claimgate: headless reward-claim engine for ERC-20 reward buttons.
//!
//! The engine owns the full claim lifecycle: mode classification, the
//! two-click connection gate, recipient resolution, transfer strategy
//! selection, submission, and confirmation watching. Hosts render from
//! [`types::ButtonView`], forward clicks and wallet events, and receive the
//! terminal outcome through [`hooks::RewardHooks`] exactly once per attempt.

pub mod adapters;
pub mod config;
pub mod engine;
pub mod error;
pub mod hooks;
pub mod signing;
pub mod types;

pub use adapters::{ContractCall, DirectSigner, ReceiptWatcher, TransactionSubmitter, WalletProvider};
pub use config::{ClaimConfiguration, RewardConfig};
pub use engine::{Adapters, ClaimEngine, ClaimPhase, ClickAction};
pub use error::{ClaimError, ClaimFailure, FailureKind, Result};
pub use hooks::RewardHooks;
pub use signing::SenderWallet;
pub use types::{ButtonMode, ButtonView, ClaimOutcome, PayMode, WalletEvent, WalletState};
