//! Claim lifecycle state machine.
//!
//! Drives one attempt through:
//! IDLE → AWAITING_CONNECT → VALIDATING → [APPROVING] → SUBMITTING →
//! [CONFIRMING] → CLAIMED | FAILED
//!
//! CLAIMED and FAILED are terminal per attempt; a fresh click resets to IDLE
//! and starts a new attempt. APPROVING is reachable only in receiver-pays
//! mode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ClaimError, Result};

/// Phase of the current claim attempt; the only thing the UI renders from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimPhase {
    /// No attempt in progress
    Idle,

    /// Click received while disconnected; waiting for the user to connect
    AwaitingWalletConnect,

    /// Classifying configuration and resolving the recipient
    Validating,

    /// Receiver-pays only: key-signed allowance approval awaiting inclusion
    ApprovingAllowance,

    /// Token-moving call handed to the wallet or direct signer
    Submitting,

    /// Transaction hash captured; waiting for the receipt
    Confirming,

    /// Terminal: receipt observed with success status
    Claimed,

    /// Terminal: attempt failed with a taxonomy reason
    Failed,
}

impl fmt::Display for ClaimPhase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "IDLE"),
            Self::AwaitingWalletConnect => write!(f, "AWAITING_CONNECT"),
            Self::Validating => write!(f, "VALIDATING"),
            Self::ApprovingAllowance => write!(f, "APPROVING"),
            Self::Submitting => write!(f, "SUBMITTING"),
            Self::Confirming => write!(f, "CONFIRMING"),
            Self::Claimed => write!(f, "CLAIMED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// Transition events
#[derive(Debug, Clone)]
pub enum ClaimEvent {
    // Idle → AwaitingWalletConnect
    ConnectRequired,

    // AwaitingWalletConnect → Validating (auto-resume)
    WalletConnected,

    // AwaitingWalletConnect → Idle
    WalletDisconnected,

    // Idle → Validating
    AttemptStarted,

    // Validating → Failed
    ValidationFailed,

    // Validating → ApprovingAllowance (receiver-pays)
    ApprovalStarted,

    // ApprovingAllowance → Submitting
    ApprovalConfirmed,

    // ApprovingAllowance → Failed
    ApprovalFailed,

    // Validating → Submitting
    SubmissionStarted,

    // Submitting → Failed
    SubmissionRejected,

    // Submitting → Confirming (async strategies)
    TxPending,

    // Submitting | Confirming → Claimed
    InclusionConfirmed,

    // Submitting | Confirming → Failed
    TxReverted,

    // Confirming → Failed
    WatcherFailed,

    // Claimed | Failed → Idle (fresh attempt)
    Reset,
}

/// State transition record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseTransition {
    pub from: ClaimPhase,
    pub to: ClaimPhase,
    pub event: String,
    pub at: DateTime<Utc>,
}

/// State machine for one button instance.
pub struct PhaseMachine {
    phase: ClaimPhase,
    history: Vec<PhaseTransition>,
}

impl PhaseMachine {
    pub fn new() -> Self {
        Self {
            phase: ClaimPhase::Idle,
            history: vec![],
        }
    }

    /// Attempt a transition, rejecting anything outside the allowed table.
    pub fn transition(&mut self, event: ClaimEvent) -> Result<ClaimPhase> {
        use ClaimEvent as E;
        use ClaimPhase as P;

        let from = self.phase;

        let to = match (&self.phase, &event) {
            (P::Idle, E::ConnectRequired) => P::AwaitingWalletConnect,
            (P::Idle, E::AttemptStarted) => P::Validating,

            (P::AwaitingWalletConnect, E::WalletConnected) => P::Validating,
            (P::AwaitingWalletConnect, E::WalletDisconnected) => P::Idle,

            (P::Validating, E::ValidationFailed) => P::Failed,
            (P::Validating, E::ApprovalStarted) => P::ApprovingAllowance,
            (P::Validating, E::SubmissionStarted) => P::Submitting,

            (P::ApprovingAllowance, E::ApprovalConfirmed) => P::Submitting,
            (P::ApprovingAllowance, E::ApprovalFailed) => P::Failed,

            (P::Submitting, E::SubmissionRejected) => P::Failed,
            (P::Submitting, E::TxPending) => P::Confirming,
            // Synchronous key-signed strategy skips Confirming
            (P::Submitting, E::InclusionConfirmed) => P::Claimed,
            (P::Submitting, E::TxReverted) => P::Failed,

            (P::Confirming, E::InclusionConfirmed) => P::Claimed,
            (P::Confirming, E::TxReverted) => P::Failed,
            (P::Confirming, E::WatcherFailed) => P::Failed,

            (P::Claimed | P::Failed, E::Reset) => P::Idle,

            _ => {
                return Err(ClaimError::InvalidTransition {
                    from: self.phase.to_string(),
                    event: format!("{:?}", event),
                });
            }
        };

        self.history.push(PhaseTransition {
            from,
            to,
            event: format!("{:?}", event),
            at: Utc::now(),
        });

        self.phase = to;
        Ok(to)
    }

    pub fn phase(&self) -> ClaimPhase {
        self.phase
    }

    /// An attempt is actively progressing; clicks are ignored.
    pub fn in_flight(&self) -> bool {
        matches!(
            self.phase,
            ClaimPhase::Validating
                | ClaimPhase::ApprovingAllowance
                | ClaimPhase::Submitting
                | ClaimPhase::Confirming
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, ClaimPhase::Claimed | ClaimPhase::Failed)
    }

    pub fn is_awaiting_connect(&self) -> bool {
        self.phase == ClaimPhase::AwaitingWalletConnect
    }

    pub fn history(&self) -> &[PhaseTransition] {
        &self.history
    }
}

impl Default for PhaseMachine {
    fn default() -> Self {
        Self::new()
    }
}
