//! Button configuration, mode classification, and the tagged claim
//! configuration handed to the transfer strategy selector.

use alloy::primitives::{Address, U256};
use chrono::Utc;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;
use uuid::Uuid;

use crate::error::{ClaimError, Result};
use crate::signing::SenderWallet;
use crate::types::{ButtonMode, ClaimRequest, PayMode};

fn default_token_symbol() -> String {
    "TOKEN".to_string()
}

fn default_token_decimals() -> u8 {
    18
}

fn default_true() -> bool {
    true
}

fn default_label() -> String {
    "Button".to_string()
}

fn default_loading_text() -> String {
    "Loading...".to_string()
}

fn default_connect_label() -> String {
    "Claim Reward".to_string()
}

/// Full configuration of one reward button instance.
///
/// Every on-chain field is optional: with no token address or no positive
/// amount the button is a plain button and none of the wallet machinery runs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// ERC-20 contract address of the reward token
    pub token_address: Option<String>,
    /// Reward amount in the token's smallest unit, as a decimal string
    pub reward_amount: Option<String>,
    /// Display symbol, e.g. "USDC"
    pub token_symbol: String,
    /// Display decimals for label formatting
    pub token_decimals: u8,
    pub pay_mode: PayMode,
    /// The sender wallet that holds the reward tokens
    pub sender_address: Option<String>,
    /// Signing key for the sender wallet (held config-side, never the
    /// connected wallet's)
    pub sender_signing_key: Option<String>,
    pub rpc_url: Option<String>,
    /// Explicit recipient for sender-pays demos. Never honored in
    /// receiver-pays mode.
    pub recipient_address: Option<String>,
    /// Require a connected wallet before a sender-pays claim may run
    pub require_connection: bool,
    pub show_reward_amount: bool,
    pub label: String,
    pub loading_text: String,
    /// Label shown while waiting for the user to connect a wallet
    pub connect_label: String,
    /// Host-supplied disabled flag, OR-ed with the engine's own in-flight gate
    pub disabled: bool,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            token_address: None,
            reward_amount: None,
            token_symbol: default_token_symbol(),
            token_decimals: default_token_decimals(),
            pay_mode: PayMode::SenderPays,
            sender_address: None,
            sender_signing_key: None,
            rpc_url: None,
            recipient_address: None,
            require_connection: default_true(),
            show_reward_amount: default_true(),
            label: default_label(),
            loading_text: default_loading_text(),
            connect_label: default_connect_label(),
            disabled: false,
        }
    }
}

/// Closed set of executable claim configurations.
///
/// Built once per attempt from the optional-field prop bag, so the strategy
/// selector pattern-matches these variants instead of chaining presence
/// checks.
#[derive(Debug, Clone)]
pub enum ClaimConfiguration {
    /// Sender pays gas, signing key supplied: direct key-signed transfer
    KeySigned {
        token: Address,
        amount: U256,
        wallet: SenderWallet,
        rpc_url: String,
    },
    /// Sender pays gas through the connected wallet (sender is self)
    ConnectedSenderPays { token: Address, amount: U256 },
    /// Receiver pays gas: key-signed approval, then connected-wallet
    /// transferFrom
    ConnectedReceiverPays {
        token: Address,
        amount: U256,
        sender: Address,
        wallet: SenderWallet,
        rpc_url: String,
    },
}

impl ClaimConfiguration {
    pub fn pay_mode(&self) -> PayMode {
        match self {
            Self::KeySigned { .. } | Self::ConnectedSenderPays { .. } => PayMode::SenderPays,
            Self::ConnectedReceiverPays { .. } => PayMode::ReceiverPays,
        }
    }

    pub fn token(&self) -> Address {
        match self {
            Self::KeySigned { token, .. }
            | Self::ConnectedSenderPays { token, .. }
            | Self::ConnectedReceiverPays { token, .. } => *token,
        }
    }

    pub fn amount(&self) -> U256 {
        match self {
            Self::KeySigned { amount, .. }
            | Self::ConnectedSenderPays { amount, .. }
            | Self::ConnectedReceiverPays { amount, .. } => *amount,
        }
    }
}

fn parse_address(field: &str, value: &str) -> Result<Address> {
    value
        .parse::<Address>()
        .map_err(|e| ClaimError::AddressParsing(format!("{}: {}", field, e)))
}

/// True for a non-empty, all-digit, nonzero decimal string.
fn is_positive_amount(amount: &str) -> bool {
    !amount.is_empty()
        && amount.chars().all(|c| c.is_ascii_digit())
        && amount.chars().any(|c| c != '0')
}

impl RewardConfig {
    /// Load configuration from a TOML file (optional) plus `CLAIMGATE_*`
    /// environment overrides, e.g. `CLAIMGATE_TOKEN_ADDRESS`.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(Environment::with_prefix("CLAIMGATE").try_parsing(true))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Classify the configuration. Evaluated on every use, not cached,
    /// since host props may change between clicks.
    pub fn mode(&self) -> ButtonMode {
        let has_token = self.token_address.as_deref().is_some_and(|t| !t.is_empty());
        let has_amount = self.reward_amount.as_deref().is_some_and(is_positive_amount);
        if has_token && has_amount {
            ButtonMode::Reward
        } else {
            ButtonMode::Plain
        }
    }

    /// Normalize the prop bag into an executable claim configuration,
    /// failing closed when a mode's required credentials are absent.
    pub fn classify(&self) -> Result<ClaimConfiguration> {
        if self.mode() != ButtonMode::Reward {
            return Err(ClaimError::MissingConfiguration(
                "token address and a positive reward amount are required".to_string(),
            ));
        }

        let token = parse_address(
            "token_address",
            self.token_address.as_deref().unwrap_or_default(),
        )?;
        let amount_raw = self.reward_amount.as_deref().unwrap_or_default();
        let amount = U256::from_str_radix(amount_raw, 10)
            .map_err(|e| ClaimError::AmountParsing(format!("reward_amount: {}", e)))?;

        match self.pay_mode {
            PayMode::SenderPays => match self.sender_signing_key.as_deref() {
                Some(key) => {
                    let rpc_url = self.rpc_url.clone().ok_or_else(|| {
                        ClaimError::MissingConfiguration(
                            "rpc_url is required for key-signed transfers".to_string(),
                        )
                    })?;
                    let wallet = SenderWallet::from_signing_key(key)?;
                    Ok(ClaimConfiguration::KeySigned {
                        token,
                        amount,
                        wallet,
                        rpc_url,
                    })
                }
                None => Ok(ClaimConfiguration::ConnectedSenderPays { token, amount }),
            },
            PayMode::ReceiverPays => {
                let sender = self
                    .sender_address
                    .as_deref()
                    .ok_or_else(|| {
                        ClaimError::MissingConfiguration(
                            "receiver-pays claims require sender_address".to_string(),
                        )
                    })
                    .and_then(|s| parse_address("sender_address", s))?;
                let key = self.sender_signing_key.as_deref().ok_or_else(|| {
                    ClaimError::MissingConfiguration(
                        "receiver-pays claims require sender_signing_key for the approval phase"
                            .to_string(),
                    )
                })?;
                let rpc_url = self.rpc_url.clone().ok_or_else(|| {
                    ClaimError::MissingConfiguration(
                        "receiver-pays claims require rpc_url for the approval phase".to_string(),
                    )
                })?;
                let wallet = SenderWallet::from_signing_key(key)?;
                Ok(ClaimConfiguration::ConnectedReceiverPays {
                    token,
                    amount,
                    sender,
                    wallet,
                    rpc_url,
                })
            }
        }
    }

    /// Build the immutable per-attempt request.
    pub fn claim_request(&self, configuration: &ClaimConfiguration) -> Result<ClaimRequest> {
        let explicit_recipient = self
            .recipient_address
            .as_deref()
            .map(|r| parse_address("recipient_address", r))
            .transpose()?;
        let sender_address = match configuration {
            ClaimConfiguration::KeySigned { wallet, .. } => Some(wallet.address()),
            ClaimConfiguration::ConnectedSenderPays { .. } => None,
            ClaimConfiguration::ConnectedReceiverPays { sender, .. } => Some(*sender),
        };

        Ok(ClaimRequest {
            attempt_id: Uuid::new_v4(),
            token_address: configuration.token(),
            amount: configuration.amount(),
            amount_raw: self.reward_amount.clone().unwrap_or_default(),
            token_symbol: self.token_symbol.clone(),
            pay_mode: configuration.pay_mode(),
            sender_address,
            explicit_recipient,
            created_at: Utc::now(),
        })
    }

    /// Display string for the configured amount, e.g. "1.5 USDC".
    pub fn display_amount(&self) -> Option<String> {
        let raw = self.reward_amount.as_deref()?;
        let amount = U256::from_str_radix(raw, 10).ok()?;
        Some(format!(
            "{} {}",
            format_units(amount, self.token_decimals),
            self.token_symbol
        ))
    }
}

/// Format a smallest-unit amount as a decimal token amount.
///
/// Pure integer math; trailing fractional zeros are trimmed.
pub fn format_units(amount: U256, decimals: u8) -> String {
    if decimals == 0 {
        return amount.to_string();
    }
    let base = match U256::from(10u64).checked_pow(U256::from(decimals)) {
        Some(base) => base,
        None => return amount.to_string(),
    };
    let whole = amount / base;
    let frac = amount % base;
    if frac.is_zero() {
        return whole.to_string();
    }
    let frac_str = frac.to_string();
    let padding = "0".repeat(decimals as usize - frac_str.len());
    let padded = format!("{}{}", padding, frac_str);
    format!("{}.{}", whole, padded.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174";
    const SENDER: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn reward_config() -> RewardConfig {
        RewardConfig {
            token_address: Some(TOKEN.to_string()),
            reward_amount: Some("1000000".to_string()),
            token_symbol: "USDC".to_string(),
            token_decimals: 6,
            ..RewardConfig::default()
        }
    }

    #[test]
    fn test_plain_mode_without_token() {
        let config = RewardConfig::default();
        assert_eq!(config.mode(), ButtonMode::Plain);

        let config = RewardConfig {
            reward_amount: Some("100".to_string()),
            ..RewardConfig::default()
        };
        assert_eq!(config.mode(), ButtonMode::Plain);
    }

    #[test]
    fn test_plain_mode_for_non_positive_amounts() {
        for bad in ["", "0", "000", "-5", "1.5", "abc"] {
            let config = RewardConfig {
                token_address: Some(TOKEN.to_string()),
                reward_amount: Some(bad.to_string()),
                ..RewardConfig::default()
            };
            assert_eq!(config.mode(), ButtonMode::Plain, "amount {:?}", bad);
        }
    }

    #[test]
    fn test_reward_mode() {
        assert_eq!(reward_config().mode(), ButtonMode::Reward);
    }

    #[test]
    fn test_classify_connected_sender_pays() {
        let configuration = reward_config().classify().unwrap();
        assert!(matches!(
            configuration,
            ClaimConfiguration::ConnectedSenderPays { .. }
        ));
        assert_eq!(configuration.amount(), U256::from(1_000_000u64));
    }

    #[test]
    fn test_classify_key_signed() {
        let config = RewardConfig {
            sender_signing_key: Some(TEST_KEY.to_string()),
            rpc_url: Some("http://localhost:8545".to_string()),
            ..reward_config()
        };
        let configuration = config.classify().unwrap();
        assert!(matches!(configuration, ClaimConfiguration::KeySigned { .. }));
    }

    #[test]
    fn test_key_signed_requires_rpc_url() {
        let config = RewardConfig {
            sender_signing_key: Some(TEST_KEY.to_string()),
            ..reward_config()
        };
        assert!(matches!(
            config.classify(),
            Err(ClaimError::MissingConfiguration(_))
        ));
    }

    #[test]
    fn test_classify_receiver_pays() {
        let config = RewardConfig {
            pay_mode: PayMode::ReceiverPays,
            sender_address: Some(SENDER.to_string()),
            sender_signing_key: Some(TEST_KEY.to_string()),
            rpc_url: Some("http://localhost:8545".to_string()),
            ..reward_config()
        };
        let configuration = config.classify().unwrap();
        match configuration {
            ClaimConfiguration::ConnectedReceiverPays { sender, .. } => {
                assert_eq!(format!("{:?}", sender).to_lowercase(), SENDER.to_lowercase());
            }
            other => panic!("unexpected configuration: {:?}", other),
        }
    }

    #[test]
    fn test_receiver_pays_without_credentials_is_missing_configuration() {
        let config = RewardConfig {
            pay_mode: PayMode::ReceiverPays,
            ..reward_config()
        };
        assert!(matches!(
            config.classify(),
            Err(ClaimError::MissingConfiguration(_))
        ));
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(U256::from(1_000_000u64), 6), "1");
        assert_eq!(format_units(U256::from(1_500_000u64), 6), "1.5");
        assert_eq!(format_units(U256::from(1u64), 6), "0.000001");
        assert_eq!(format_units(U256::from(42u64), 0), "42");
        assert_eq!(format_units(U256::ZERO, 18), "0");
    }

    #[test]
    fn test_display_amount() {
        assert_eq!(reward_config().display_amount().unwrap(), "1 USDC");
    }
}
