//! Alloy-backed direct signer for key-signed ERC-20 calls.
//!
//! Binds the sender wallet to the configured RPC endpoint, submits the call,
//! and resolves only after the transaction is included on-chain.

use alloy::network::EthereumWallet;
use alloy::providers::ProviderBuilder;
use alloy::sol;
use async_trait::async_trait;
use tracing::info;

use super::{CallArg, ContractCall, DirectSigner};
use crate::error::{ClaimError, Result};
use crate::signing::SenderWallet;
use crate::types::Receipt;

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IERC20 {
        function transfer(address to, uint256 value) external returns (bool);
        function approve(address spender, uint256 value) external returns (bool);
        function transferFrom(address from, address to, uint256 value) external returns (bool);
        function allowance(address owner, address spender) external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
    }
}

/// Direct signer bound to one sender wallet and one RPC endpoint.
#[derive(Debug, Clone)]
pub struct RpcDirectSigner {
    wallet: SenderWallet,
    rpc_url: String,
}

impl RpcDirectSigner {
    pub fn new(wallet: SenderWallet, rpc_url: impl Into<String>) -> Self {
        Self {
            wallet,
            rpc_url: rpc_url.into(),
        }
    }
}

#[async_trait]
impl DirectSigner for RpcDirectSigner {
    async fn send_and_confirm(&self, call: &ContractCall) -> Result<Receipt> {
        let rpc_url = self
            .rpc_url
            .parse()
            .map_err(|e| ClaimError::Rpc(format!("Invalid RPC URL: {}", e)))?;
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(self.wallet.signer().clone()))
            .connect_http(rpc_url);

        let token = IERC20::new(call.contract, provider);

        info!(
            "Submitting key-signed {} to {} from {}",
            call.function,
            call.contract,
            self.wallet.address()
        );

        let pending = match (call.function.as_str(), call.args.as_slice()) {
            ("transfer", [CallArg::Address(to), CallArg::Uint(value)]) => {
                token.transfer(*to, *value).send().await
            }
            ("approve", [CallArg::Address(spender), CallArg::Uint(value)]) => {
                token.approve(*spender, *value).send().await
            }
            (
                "transferFrom",
                [CallArg::Address(from), CallArg::Address(to), CallArg::Uint(value)],
            ) => token.transferFrom(*from, *to, *value).send().await,
            _ => {
                return Err(ClaimError::Rpc(format!(
                    "Unsupported contract call: {}/{} args",
                    call.function,
                    call.args.len()
                )))
            }
        }
        .map_err(|e| ClaimError::SubmissionRejected(format!("{} failed: {}", call.function, e)))?;

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| ClaimError::ConfirmationError(format!("Tx confirmation failed: {}", e)))?;

        let tx_hash = format!("{:?}", receipt.transaction_hash);
        if receipt.status() {
            info!("{} included: {}", call.function, tx_hash);
            Ok(Receipt::success(tx_hash))
        } else {
            Ok(Receipt::reverted(tx_hash, None))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, U256};

    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn signer(rpc_url: &str) -> RpcDirectSigner {
        RpcDirectSigner::new(SenderWallet::from_signing_key(TEST_KEY).unwrap(), rpc_url)
    }

    #[tokio::test]
    async fn test_invalid_rpc_url_is_rejected() {
        let token: Address = "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174"
            .parse()
            .unwrap();
        let call = ContractCall::transfer(token, token, U256::from(1u64));

        let result = signer("not a url").send_and_confirm(&call).await;
        assert!(matches!(result, Err(ClaimError::Rpc(_))));
    }

    #[tokio::test]
    async fn test_unsupported_function_is_rejected() {
        let token: Address = "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174"
            .parse()
            .unwrap();
        let call = ContractCall {
            contract: token,
            function: "mint".to_string(),
            args: vec![CallArg::Uint(U256::from(1u64))],
        };

        let result = signer("http://localhost:8545").send_and_confirm(&call).await;
        assert!(matches!(result, Err(ClaimError::Rpc(_))));
    }
}
