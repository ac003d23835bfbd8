//! End-to-end demo of the claim engine against simulated adapters.
//!
//! Walks the full lifecycle without touching a chain: a click while
//! disconnected opens the connect gate, a simulated wallet connect resumes
//! the attempt, and the scripted submitter and watcher drive it to CLAIMED.
//!
//! ```text
//! cargo run --bin claim_demo -- --amount 1500000 --symbol USDC
//! cargo run --bin claim_demo -- --start-connected --reject-signature
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use alloy::primitives::Address;
use async_trait::async_trait;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use claimgate::adapters::{ContractCall, SubmitError};
use claimgate::error::{ClaimError, ClaimFailure};
use claimgate::types::{Receipt, WalletEvent};
use claimgate::{
    Adapters, ClaimEngine, ReceiptWatcher, RewardConfig, RewardHooks, TransactionSubmitter,
    WalletProvider,
};

#[derive(Parser, Debug)]
#[command(name = "claim_demo", about = "Simulated reward-claim walkthrough")]
struct Args {
    /// Reward token contract address
    #[arg(long, default_value = "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174")]
    token: String,

    /// Reward amount in the token's smallest unit
    #[arg(long, default_value = "1500000")]
    amount: String,

    /// Display symbol
    #[arg(long, default_value = "USDC")]
    symbol: String,

    /// Display decimals
    #[arg(long, default_value_t = 6)]
    decimals: u8,

    /// Simulated wallet starts connected (skips the connect gate)
    #[arg(long)]
    start_connected: bool,

    /// Simulated user declines the wallet signature prompt
    #[arg(long)]
    reject_signature: bool,
}

/// Simulated browser wallet: starts connected or not, and "connects" when
/// the connect modal is opened.
struct SimulatedWallet {
    address: Address,
    connected: AtomicBool,
}

impl SimulatedWallet {
    fn new(address: Address, connected: bool) -> Self {
        Self {
            address,
            connected: AtomicBool::new(connected),
        }
    }

    fn connect(&self) {
        self.connected.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl WalletProvider for SimulatedWallet {
    async fn request_accounts(&self) -> claimgate::Result<Vec<Address>> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(vec![self.address])
        } else {
            Ok(vec![])
        }
    }

    async fn open_connect_modal(&self) {
        info!("[wallet] connect modal opened");
    }
}

struct SimulatedSubmitter {
    reject: bool,
}

#[async_trait]
impl TransactionSubmitter for SimulatedSubmitter {
    async fn submit(&self, call: &ContractCall) -> Result<String, SubmitError> {
        if self.reject {
            info!("[wallet] user declined to sign {}", call.function);
            return Err(SubmitError::UserRejected);
        }
        info!("[wallet] signed and broadcast {}", call.function);
        Ok(format!("0x{}", "ab".repeat(32)))
    }
}

struct SimulatedChain;

#[async_trait]
impl ReceiptWatcher for SimulatedChain {
    async fn await_receipt(&self, tx_hash: &str) -> claimgate::Result<Receipt> {
        info!("[chain] mined {}", tx_hash);
        Ok(Receipt::success(tx_hash))
    }
}

struct LoggingHooks;

impl RewardHooks for LoggingHooks {
    fn on_reward_started(&self) {
        info!("[hook] reward claim started");
    }

    fn on_reward_claimed(&self, tx_hash: &str, amount: &str) {
        info!("[hook] reward claimed: {} units, tx {}", amount, tx_hash);
    }

    fn on_reward_failed(&self, failure: &ClaimFailure) {
        info!("[hook] reward claim failed: {}", failure);
    }
}

#[tokio::main]
async fn main() -> Result<(), ClaimError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = RewardConfig {
        token_address: Some(args.token),
        reward_amount: Some(args.amount),
        token_symbol: args.symbol,
        token_decimals: args.decimals,
        ..RewardConfig::default()
    };

    let claimer: Address = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8"
        .parse()
        .map_err(|e| ClaimError::AddressParsing(format!("claimer: {}", e)))?;
    let wallet = Arc::new(SimulatedWallet::new(claimer, args.start_connected));

    let adapters = Adapters::new(
        wallet.clone(),
        Arc::new(SimulatedSubmitter {
            reject: args.reject_signature,
        }),
        Arc::new(SimulatedChain),
    );
    let engine = ClaimEngine::new(config, adapters, Arc::new(LoggingHooks));

    let view = engine.view().await;
    info!("[render] \"{}\" (phase {})", view.label, view.phase);

    info!("[user] click");
    engine.click().await;

    let view = engine.view().await;
    info!("[render] \"{}\" (phase {})", view.label, view.phase);

    if !args.start_connected {
        // The user connects through the wallet UI; the provider event
        // auto-resumes the gated attempt.
        info!("[user] connects wallet");
        wallet.connect();
        engine
            .handle_wallet_event(WalletEvent::AccountsChanged(vec![claimer]))
            .await;
    }

    let view = engine.view().await;
    info!("[render] \"{}\" (phase {})", view.label, view.phase);
    if let Some(error) = view.error {
        info!("[render] error shown to user: {}", error);
    }

    Ok(())
}
