//! Transfer strategy selection.
//!
//! Maps the closed `ClaimConfiguration` set plus the resolved recipient onto
//! the concrete call plan. Selection is infallible: unsatisfiable
//! configurations were already rejected at classification time.

use alloy::primitives::Address;

use crate::adapters::ContractCall;
use crate::config::ClaimConfiguration;

/// Execution plan for one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferStrategy {
    /// `transfer(recipient, amount)` signed directly with the sender key;
    /// resolves after inclusion, no separate watcher
    KeySigned { call: ContractCall },

    /// `transfer(recipient, amount)` signed by the connected wallet
    ConnectedTransfer { call: ContractCall },

    /// Receiver-pays: key-signed `approve(recipient, amount)` awaited to
    /// confirmation, then wallet-signed `transferFrom(sender, recipient,
    /// amount)`. The second call must not be issued until the first's
    /// receipt is observed.
    ApproveThenTransferFrom {
        approve: ContractCall,
        transfer_from: ContractCall,
    },
}

pub fn select(configuration: &ClaimConfiguration, recipient: Address) -> TransferStrategy {
    match configuration {
        ClaimConfiguration::KeySigned { token, amount, .. } => TransferStrategy::KeySigned {
            call: ContractCall::transfer(*token, recipient, *amount),
        },
        ClaimConfiguration::ConnectedSenderPays { token, amount } => {
            TransferStrategy::ConnectedTransfer {
                call: ContractCall::transfer(*token, recipient, *amount),
            }
        }
        ClaimConfiguration::ConnectedReceiverPays {
            token,
            amount,
            sender,
            ..
        } => TransferStrategy::ApproveThenTransferFrom {
            approve: ContractCall::approve(*token, recipient, *amount),
            transfer_from: ContractCall::transfer_from(*token, *sender, recipient, *amount),
        },
    }
}
