//! Recipient resolution.
//!
//! Pure function of the attempt request and the live wallet snapshot; no
//! hidden lookups, no network calls, and never a fallback address.

use alloy::primitives::Address;

use crate::error::{ClaimError, Result};
use crate::types::{ClaimRequest, PayMode, WalletState};

/// Compute the single address that will receive funds for this attempt.
///
/// Receiver-pays: the recipient MUST be the live connected wallet address.
/// Honoring `explicit_recipient` here would let a claimer redirect sender
/// funds to an arbitrary address while the sender's allowance names an
/// address it never intended, so the field is ignored in this mode.
///
/// Sender-pays: live connected wallet address first, else the explicit
/// recipient. With neither, the attempt fails closed.
pub fn resolve(request: &ClaimRequest, wallet: &WalletState) -> Result<Address> {
    let live_address = wallet.connected_address.filter(|_| wallet.is_connected);

    match request.pay_mode {
        PayMode::ReceiverPays => live_address.ok_or_else(|| {
            ClaimError::NoRecipient(
                "receiver-pays claims require a connected wallet as the recipient".to_string(),
            )
        }),
        PayMode::SenderPays => live_address
            .or(request.explicit_recipient)
            .ok_or_else(|| {
                ClaimError::NoRecipient(
                    "no connected wallet and no recipient address configured".to_string(),
                )
            }),
    }
}
