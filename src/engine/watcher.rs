//! Confirmation watching and revert classification.

use std::sync::Arc;
use tracing::{info, warn};

use crate::adapters::ReceiptWatcher;
use crate::error::{ClaimFailure, FailureKind};
use crate::types::{ClaimOutcome, PendingTransaction, TxStatus};

/// Waits on a submitted transaction's receipt and maps it to a terminal
/// outcome.
pub struct ConfirmationWatcher {
    watcher: Arc<dyn ReceiptWatcher>,
}

impl ConfirmationWatcher {
    pub fn new(watcher: Arc<dyn ReceiptWatcher>) -> Self {
        Self { watcher }
    }

    pub async fn await_outcome(
        &self,
        pending: &PendingTransaction,
        amount_raw: &str,
    ) -> ClaimOutcome {
        match self.watcher.await_receipt(&pending.hash).await {
            Ok(receipt) => match receipt.status {
                TxStatus::Success => {
                    info!("Transaction confirmed: {}", receipt.hash);
                    ClaimOutcome::Claimed {
                        hash: receipt.hash,
                        amount: amount_raw.to_string(),
                    }
                }
                TxStatus::Reverted => {
                    let message = revert_summary(receipt.revert_reason.as_deref());
                    warn!("Transaction {} reverted: {}", receipt.hash, message);
                    ClaimOutcome::Failed(ClaimFailure::new(FailureKind::OnChainRevert, message))
                }
            },
            Err(e) => ClaimOutcome::Failed(ClaimFailure::new(
                FailureKind::ConfirmationError,
                format!("receipt watch failed: {}", e),
            )),
        }
    }
}

/// Summarize a revert for the host, naming the likely cause.
///
/// Allowance-related reverts get a specific message because the remediation
/// (ask the sender to approve more) differs from a generic retry.
pub fn revert_summary(reason: Option<&str>) -> String {
    match reason {
        Some(reason) if is_allowance_revert(reason) => format!(
            "transfer amount exceeds allowance ({}); ask the sender to approve a larger allowance",
            reason.trim()
        ),
        Some(reason) if reason.to_ascii_lowercase().contains("balance") => format!(
            "transfer amount exceeds the sender's balance ({})",
            reason.trim()
        ),
        Some(reason) => format!("transaction reverted: {}", reason.trim()),
        None => {
            "transaction was mined but reverted; commonly insufficient allowance or balance"
                .to_string()
        }
    }
}

fn is_allowance_revert(reason: &str) -> bool {
    let reason = reason.to_ascii_lowercase();
    reason.contains("allowance") || reason.contains("exceeds allowance")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowance_revert_names_remediation() {
        let message = revert_summary(Some("ERC20: transfer amount exceeds allowance"));
        assert!(message.contains("allowance"));
        assert!(message.contains("approve a larger allowance"));

        let message = revert_summary(Some("ERC20: insufficient allowance"));
        assert!(message.contains("approve a larger allowance"));
    }

    #[test]
    fn test_balance_revert() {
        let message = revert_summary(Some("ERC20: transfer amount exceeds balance"));
        assert!(message.contains("balance"));
        assert!(!message.contains("approve a larger allowance"));
    }

    #[test]
    fn test_unknown_revert_keeps_reason() {
        let message = revert_summary(Some("Pausable: paused"));
        assert!(message.contains("Pausable: paused"));
    }

    #[test]
    fn test_missing_reason_names_common_causes() {
        let message = revert_summary(None);
        assert!(message.contains("allowance"));
        assert!(message.contains("balance"));
    }
}
