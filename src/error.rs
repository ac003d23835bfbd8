use thiserror::Error;

/// Main error type for the claim engine
#[derive(Error, Debug)]
pub enum ClaimError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("Address parsing error: {0}")]
    AddressParsing(String),

    #[error("Amount parsing error: {0}")]
    AmountParsing(String),

    // Recipient resolution errors
    #[error("No safe recipient address: {0}")]
    NoRecipient(String),

    // Wallet errors
    #[error("Wallet unavailable: {0}")]
    WalletUnavailable(String),

    #[error("Wallet error: {0}")]
    Wallet(String),

    // Submission errors
    #[error("Submission rejected: {0}")]
    SubmissionRejected(String),

    #[error("Allowance approval failed: {0}")]
    ApprovalFailed(String),

    // Confirmation errors
    #[error("Transaction reverted on-chain: {0}")]
    OnChainRevert(String),

    #[error("Confirmation watcher error: {0}")]
    ConfirmationError(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    // State machine errors
    #[error("Invalid state transition: from {from} on {event}")]
    InvalidTransition { from: String, event: String },

    // Generic errors
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for ClaimError
pub type Result<T> = std::result::Result<T, ClaimError>;

/// Terminal failure taxonomy surfaced through `on_reward_failed`.
///
/// One of these is produced per failed attempt; the engine never lets a raw
/// `ClaimError` escape to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FailureKind {
    /// Resolver found no safe destination address
    NoRecipient,
    /// Required mode-specific inputs absent
    MissingConfiguration,
    /// No wallet provider detected at gate time
    WalletUnavailable,
    /// User declined the signature prompt, or a pre-submission re-check failed
    SubmissionRejected,
    /// The allowance-approval phase reverted or errored
    ApprovalFailed,
    /// Transaction mined but execution failed
    OnChainRevert,
    /// The confirmation watcher itself errored (RPC outage, etc.)
    ConfirmationError,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoRecipient => write!(f, "no_recipient"),
            Self::MissingConfiguration => write!(f, "missing_configuration"),
            Self::WalletUnavailable => write!(f, "wallet_unavailable"),
            Self::SubmissionRejected => write!(f, "submission_rejected"),
            Self::ApprovalFailed => write!(f, "approval_failed"),
            Self::OnChainRevert => write!(f, "on_chain_revert"),
            Self::ConfirmationError => write!(f, "confirmation_error"),
        }
    }
}

/// Structured failure handed to the host: a taxonomy kind plus a
/// human-readable message naming the likely cause.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct ClaimFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl ClaimFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl ClaimError {
    /// Map an internal error to its public taxonomy kind.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NoRecipient(_) => FailureKind::NoRecipient,
            Self::Config(_)
            | Self::MissingConfiguration(_)
            | Self::AddressParsing(_)
            | Self::AmountParsing(_) => FailureKind::MissingConfiguration,
            Self::WalletUnavailable(_) | Self::Wallet(_) => FailureKind::WalletUnavailable,
            Self::ApprovalFailed(_) => FailureKind::ApprovalFailed,
            Self::OnChainRevert(_) => FailureKind::OnChainRevert,
            Self::ConfirmationError(_) | Self::Rpc(_) => FailureKind::ConfirmationError,
            // Anything else surfaces as a pre-submission rejection
            Self::SubmissionRejected(_) | Self::InvalidTransition { .. } | Self::Other(_) => {
                FailureKind::SubmissionRejected
            }
        }
    }

    /// Convert to the terminal failure surfaced to the host.
    pub fn failure(&self) -> ClaimFailure {
        ClaimFailure::new(self.kind(), self.to_string())
    }
}
