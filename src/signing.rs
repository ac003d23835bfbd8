use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use tracing::info;
use zeroize::Zeroize;

use crate::error::{ClaimError, Result};

/// Signer for the sender wallet that holds the reward tokens.
///
/// # Security
/// The raw signing key is only used during construction and then immediately
/// zeroized. It is never stored as a string, and `Debug` reveals only the
/// derived address.
#[derive(Clone)]
pub struct SenderWallet {
    inner: PrivateKeySigner,
}

impl SenderWallet {
    /// Create a wallet from a signing key hex string.
    ///
    /// The key is zeroized from memory after the signer is built.
    pub fn from_signing_key(signing_key: &str) -> Result<Self> {
        // Remove 0x prefix if present
        let key_hex = signing_key.trim_start_matches("0x");

        let mut secure_key = key_hex.to_string();

        let signer = secure_key
            .parse::<PrivateKeySigner>()
            .map_err(|e| ClaimError::Wallet(format!("Invalid signing key: {}", e)))?;

        secure_key.zeroize();

        info!(
            "Sender wallet initialized: {} (signing key zeroized from memory)",
            signer.address()
        );

        Ok(Self { inner: signer })
    }

    /// Create a wallet from environment variables.
    ///
    /// Reads `CLAIMGATE_SENDER_KEY`, falling back to `PRIVATE_KEY`; the
    /// variable's value is zeroized after use.
    pub fn from_env() -> Result<Self> {
        let mut signing_key = std::env::var("CLAIMGATE_SENDER_KEY")
            .or_else(|_| std::env::var("PRIVATE_KEY"))
            .map_err(|_| {
                ClaimError::Wallet(
                    "CLAIMGATE_SENDER_KEY or PRIVATE_KEY environment variable not set".to_string(),
                )
            })?;

        let result = Self::from_signing_key(&signing_key);

        signing_key.zeroize();

        result
    }

    /// The sender account address derived from the key.
    pub fn address(&self) -> Address {
        self.inner.address()
    }

    /// The underlying signer, for binding to a provider.
    pub fn signer(&self) -> &PrivateKeySigner {
        &self.inner
    }
}

impl std::fmt::Debug for SenderWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SenderWallet")
            .field("address", &self.address())
            .finish()
    }
}
