//! The claim engine: one instance per button.
//!
//! Owns the attempt state machine and drives a click through gatekeeping,
//! recipient resolution, strategy selection, submission, and confirmation.
//! Every error is converted to a terminal `Failed` state plus the
//! `on_reward_failed` callback at this boundary; nothing propagates to the
//! host, and no failed attempt is ever retried without a fresh click.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use alloy::primitives::Address;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::adapters::{
    ContractCall, DirectSigner, ReceiptWatcher, RpcDirectSigner, SubmitError,
    TransactionSubmitter, WalletProvider,
};
use crate::config::{ClaimConfiguration, RewardConfig};
use crate::error::{ClaimFailure, FailureKind};
use crate::hooks::RewardHooks;
use crate::types::{
    ButtonMode, ButtonView, ClaimOutcome, ClaimRequest, PendingTransaction, TxStatus, WalletEvent,
    WalletState,
};

use super::gatekeeper::ConnectionGatekeeper;
use super::phase::{ClaimEvent, ClaimPhase, PhaseMachine};
use super::recipient;
use super::strategy::{self, TransferStrategy};
use super::watcher::{revert_summary, ConfirmationWatcher};

/// What the host should do with the click it just forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickAction {
    /// Plain mode: run the host's own click handler
    PassThrough,
    /// Reward mode: the engine consumed the click
    Handled,
}

/// Injected collaborators. Everything the engine touches outside its own
/// state goes through these.
#[derive(Clone)]
pub struct Adapters {
    pub wallet: Arc<dyn WalletProvider>,
    pub submitter: Arc<dyn TransactionSubmitter>,
    pub watcher: Arc<dyn ReceiptWatcher>,
    /// Key-signed path; filled from the configuration when absent
    pub direct_signer: Option<Arc<dyn DirectSigner>>,
}

impl Adapters {
    pub fn new(
        wallet: Arc<dyn WalletProvider>,
        submitter: Arc<dyn TransactionSubmitter>,
        watcher: Arc<dyn ReceiptWatcher>,
    ) -> Self {
        Self {
            wallet,
            submitter,
            watcher,
            direct_signer: None,
        }
    }

    pub fn with_direct_signer(mut self, signer: Arc<dyn DirectSigner>) -> Self {
        self.direct_signer = Some(signer);
        self
    }
}

/// Mutable state of the current attempt. Discarded wholesale when a fresh
/// click starts a new attempt.
struct AttemptState {
    machine: PhaseMachine,
    request: Option<ClaimRequest>,
    pending: Option<PendingTransaction>,
    last_error: Option<ClaimFailure>,
    outcome_emitted: bool,
}

impl AttemptState {
    fn new() -> Self {
        Self {
            machine: PhaseMachine::new(),
            request: None,
            pending: None,
            last_error: None,
            outcome_emitted: false,
        }
    }

    fn begin_fresh(&mut self) {
        self.request = None;
        self.pending = None;
        self.last_error = None;
        self.outcome_emitted = false;
    }
}

pub struct ClaimEngine {
    config: RewardConfig,
    adapters: Adapters,
    hooks: Arc<dyn RewardHooks>,
    gatekeeper: ConnectionGatekeeper,
    state: Mutex<AttemptState>,
    abandoned: AtomicBool,
}

impl ClaimEngine {
    /// Build an engine. When the configuration calls for a key-signed phase
    /// and no direct signer was injected, an RPC-backed one is constructed
    /// from the configured sender wallet and endpoint.
    pub fn new(config: RewardConfig, mut adapters: Adapters, hooks: Arc<dyn RewardHooks>) -> Self {
        if adapters.direct_signer.is_none() {
            if let Ok(
                ClaimConfiguration::KeySigned {
                    wallet, rpc_url, ..
                }
                | ClaimConfiguration::ConnectedReceiverPays {
                    wallet, rpc_url, ..
                },
            ) = config.classify()
            {
                adapters.direct_signer = Some(Arc::new(RpcDirectSigner::new(wallet, rpc_url)));
            }
        }

        let gatekeeper = ConnectionGatekeeper::new(adapters.wallet.clone());
        Self {
            config,
            adapters,
            hooks,
            gatekeeper,
            state: Mutex::new(AttemptState::new()),
            abandoned: AtomicBool::new(false),
        }
    }

    /// Forward a click. Plain mode passes through; reward mode drives the
    /// attempt to a terminal outcome (or to the connect gate) before
    /// returning. Clicks during an in-flight attempt are ignored, not
    /// queued.
    pub async fn click(&self) -> ClickAction {
        if self.config.mode() == ButtonMode::Plain {
            return ClickAction::PassThrough;
        }
        if self.abandoned.load(Ordering::SeqCst) {
            return ClickAction::Handled;
        }

        let awaiting_connect = {
            let mut state = self.state.lock().await;
            if state.machine.in_flight() {
                debug!("Click ignored: attempt in flight ({})", state.machine.phase());
                return ClickAction::Handled;
            }
            if state.machine.is_terminal() {
                // Fresh click after a terminal outcome starts a new attempt
                let _ = state.machine.transition(ClaimEvent::Reset);
                state.begin_fresh();
            }
            state.machine.is_awaiting_connect()
        };

        if awaiting_connect {
            let live = self.gatekeeper.live_connection().await;
            if live.is_connected {
                self.resume(live).await;
            } else {
                // Second click while still disconnected opens the modal;
                // the first click only changed the label.
                info!("Still disconnected on second click, opening connect modal");
                self.gatekeeper.open_connect_modal().await;
            }
            return ClickAction::Handled;
        }

        let configuration = match self.config.classify() {
            Ok(configuration) => configuration,
            Err(e) => {
                // Enters Validating so the started hook precedes the failure
                if self.transition(ClaimEvent::AttemptStarted).await {
                    self.hooks.on_reward_started();
                    self.fail(ClaimEvent::ValidationFailed, e.failure()).await;
                }
                return ClickAction::Handled;
            }
        };

        let probe = self.gatekeeper.probe().await;
        let required = ConnectionGatekeeper::connection_required(
            &configuration,
            self.config.require_connection,
        );

        if required && !probe.state.is_connected {
            if !probe.provider_available {
                if self.transition(ClaimEvent::AttemptStarted).await {
                    self.hooks.on_reward_started();
                    self.fail(
                        ClaimEvent::ValidationFailed,
                        ClaimFailure::new(
                            FailureKind::WalletUnavailable,
                            "no wallet provider detected",
                        ),
                    )
                    .await;
                }
                return ClickAction::Handled;
            }
            // First click: flip the label, do not open any wallet UI yet so
            // host pre-click hooks always run before a modal can appear.
            info!("Wallet not connected, awaiting connect before claiming");
            let _ = self.transition(ClaimEvent::ConnectRequired).await;
            return ClickAction::Handled;
        }

        if self.transition(ClaimEvent::AttemptStarted).await {
            self.hooks.on_reward_started();
            self.run_attempt(configuration, probe.state).await;
        }
        ClickAction::Handled
    }

    /// Feed a wallet provider event. This is the explicit subscription
    /// surface: a connect while the gate is open auto-resumes the attempt
    /// without another click; a disconnect clears the gate back to idle.
    pub async fn handle_wallet_event(&self, event: WalletEvent) {
        if self.abandoned.load(Ordering::SeqCst) {
            return;
        }

        let awaiting_connect = self.state.lock().await.machine.is_awaiting_connect();
        if !awaiting_connect {
            // An attempt past the gate keeps its own pre-submission
            // re-check; watches on submitted transactions continue.
            return;
        }

        match event {
            WalletEvent::AccountsChanged(accounts) if !accounts.is_empty() => {
                // The event is the trigger; the live query stays the source
                // of truth for which address to trust.
                let live = self.gatekeeper.live_connection().await;
                if live.is_connected {
                    info!("Wallet connected, resuming pending claim attempt");
                    self.resume(live).await;
                }
            }
            WalletEvent::AccountsChanged(_) | WalletEvent::Disconnected => {
                let mut state = self.state.lock().await;
                if state.machine.is_awaiting_connect() {
                    let _ = state.machine.transition(ClaimEvent::WalletDisconnected);
                }
            }
        }
    }

    /// Abandon the engine (host unmount). Any in-flight confirmation watch
    /// is dropped without firing callbacks; the underlying transaction, if
    /// already submitted, is not this engine's concern anymore.
    pub fn abandon(&self) {
        self.abandoned.store(true, Ordering::SeqCst);
    }

    pub async fn phase(&self) -> ClaimPhase {
        self.state.lock().await.machine.phase()
    }

    pub async fn pending_transaction(&self) -> Option<PendingTransaction> {
        self.state.lock().await.pending.clone()
    }

    pub async fn last_failure(&self) -> Option<ClaimFailure> {
        self.state.lock().await.last_error.clone()
    }

    /// Render model for the host. The engine is the single source of truth
    /// for label and disabled state.
    pub async fn view(&self) -> ButtonView {
        let state = self.state.lock().await;
        let phase = state.machine.phase();

        let label = match self.config.mode() {
            ButtonMode::Plain => self.config.label.clone(),
            ButtonMode::Reward => match phase {
                ClaimPhase::AwaitingWalletConnect => self.config.connect_label.clone(),
                _ if state.machine.in_flight() => self.config.loading_text.clone(),
                _ => {
                    if self.config.show_reward_amount {
                        match self.config.display_amount() {
                            Some(amount) => format!("Claim {}", amount),
                            None => self.config.label.clone(),
                        }
                    } else {
                        self.config.label.clone()
                    }
                }
            },
        };

        ButtonView {
            label,
            disabled: self.config.disabled || state.machine.in_flight(),
            phase,
            error: state.last_error.as_ref().map(|f| f.message.clone()),
        }
    }

    // ==================== attempt progression ====================

    /// Resume a gated attempt now that a wallet is connected.
    async fn resume(&self, live: WalletState) {
        match self.config.classify() {
            Ok(configuration) => {
                if self.transition(ClaimEvent::WalletConnected).await {
                    self.hooks.on_reward_started();
                    self.run_attempt(configuration, live).await;
                }
            }
            Err(e) => {
                if self.transition(ClaimEvent::WalletConnected).await {
                    self.hooks.on_reward_started();
                    self.fail(ClaimEvent::ValidationFailed, e.failure()).await;
                }
            }
        }
    }

    /// Drive one attempt from Validating to a terminal phase.
    async fn run_attempt(&self, configuration: ClaimConfiguration, live: WalletState) {
        let request = match self.config.claim_request(&configuration) {
            Ok(request) => request,
            Err(e) => return self.fail(ClaimEvent::ValidationFailed, e.failure()).await,
        };

        let recipient = match recipient::resolve(&request, &live) {
            Ok(address) => address,
            Err(e) => return self.fail(ClaimEvent::ValidationFailed, e.failure()).await,
        };

        self.state.lock().await.request = Some(request.clone());
        info!(
            "Claim attempt {}: {} {} to {} ({})",
            request.attempt_id, request.amount_raw, request.token_symbol, recipient, request.pay_mode_label()
        );

        match strategy::select(&configuration, recipient) {
            TransferStrategy::KeySigned { call } => {
                self.run_key_signed(call, &request, recipient).await
            }
            TransferStrategy::ConnectedTransfer { call } => {
                if self.transition(ClaimEvent::SubmissionStarted).await {
                    self.run_connected(call, &request, recipient).await;
                }
            }
            TransferStrategy::ApproveThenTransferFrom {
                approve,
                transfer_from,
            } => {
                // The transferFrom must not be issued until the approval's
                // receipt is observed; submitting early is a race that will
                // revert.
                if self.approve_allowance(approve).await {
                    self.run_connected(transfer_from, &request, recipient).await;
                }
            }
        }
    }

    /// Key-signed direct transfer: the signer call itself waits for
    /// inclusion, so there is no Confirming phase.
    async fn run_key_signed(&self, call: ContractCall, request: &ClaimRequest, recipient: Address) {
        let Some(signer) = self.adapters.direct_signer.clone() else {
            return self
                .fail(
                    ClaimEvent::ValidationFailed,
                    ClaimFailure::new(
                        FailureKind::MissingConfiguration,
                        "no direct signer configured for key-signed transfer",
                    ),
                )
                .await;
        };

        if !self.transition(ClaimEvent::SubmissionStarted).await {
            return;
        }

        // Same pre-submission re-check as the connected path: the resolved
        // recipient may have gone stale since gate time even though the key
        // signs locally.
        if !self.recipient_still_live(request, recipient).await {
            warn!("Wallet state changed between gate and submission, aborting claim");
            return self
                .fail(
                    ClaimEvent::SubmissionRejected,
                    ClaimFailure::new(
                        FailureKind::SubmissionRejected,
                        "wallet connection changed before submission; claim aborted",
                    ),
                )
                .await;
        }

        match signer.send_and_confirm(&call).await {
            Ok(receipt) => match receipt.status {
                TxStatus::Success => {
                    let _ = self.transition(ClaimEvent::InclusionConfirmed).await;
                    self.emit(ClaimOutcome::Claimed {
                        hash: receipt.hash,
                        amount: request.amount_raw.clone(),
                    })
                    .await;
                }
                TxStatus::Reverted => {
                    self.fail(
                        ClaimEvent::TxReverted,
                        ClaimFailure::new(
                            FailureKind::OnChainRevert,
                            revert_summary(receipt.revert_reason.as_deref()),
                        ),
                    )
                    .await;
                }
            },
            Err(e) => {
                self.fail(ClaimEvent::SubmissionRejected, e.failure()).await;
            }
        }
    }

    /// Receiver-pays phase 1: key-signed allowance approval, awaited to
    /// confirmation. Returns true when the attempt may proceed.
    async fn approve_allowance(&self, call: ContractCall) -> bool {
        let Some(signer) = self.adapters.direct_signer.clone() else {
            self.fail(
                ClaimEvent::ValidationFailed,
                ClaimFailure::new(
                    FailureKind::MissingConfiguration,
                    "no direct signer configured for the approval phase",
                ),
            )
            .await;
            return false;
        };

        if !self.transition(ClaimEvent::ApprovalStarted).await {
            return false;
        }

        match signer.send_and_confirm(&call).await {
            Ok(receipt) => match receipt.status {
                TxStatus::Success => {
                    info!("Allowance approval confirmed: {}", receipt.hash);
                    self.transition(ClaimEvent::ApprovalConfirmed).await
                }
                TxStatus::Reverted => {
                    self.fail(
                        ClaimEvent::ApprovalFailed,
                        ClaimFailure::new(
                            FailureKind::ApprovalFailed,
                            format!(
                                "approval reverted: {}",
                                revert_summary(receipt.revert_reason.as_deref())
                            ),
                        ),
                    )
                    .await;
                    false
                }
            },
            Err(e) => {
                self.fail(
                    ClaimEvent::ApprovalFailed,
                    ClaimFailure::new(FailureKind::ApprovalFailed, e.to_string()),
                )
                .await;
                false
            }
        }
    }

    /// Submit through the connected wallet and hand off to the confirmation
    /// watcher. Expects the machine to already be in Submitting.
    async fn run_connected(&self, call: ContractCall, request: &ClaimRequest, recipient: Address) {
        if !self.recipient_still_live(request, recipient).await {
            warn!("Wallet state changed between gate and submission, aborting claim");
            return self
                .fail(
                    ClaimEvent::SubmissionRejected,
                    ClaimFailure::new(
                        FailureKind::SubmissionRejected,
                        "wallet connection changed before submission; claim aborted",
                    ),
                )
                .await;
        }

        let hash = match self.adapters.submitter.submit(&call).await {
            Ok(hash) => hash,
            Err(SubmitError::UserRejected) => {
                return self
                    .fail(
                        ClaimEvent::SubmissionRejected,
                        ClaimFailure::new(
                            FailureKind::SubmissionRejected,
                            "user declined the wallet signature prompt",
                        ),
                    )
                    .await;
            }
            Err(SubmitError::Other(message)) => {
                return self
                    .fail(
                        ClaimEvent::SubmissionRejected,
                        ClaimFailure::new(FailureKind::SubmissionRejected, message),
                    )
                    .await;
            }
        };

        let pending = PendingTransaction::new(&hash);
        self.state.lock().await.pending = Some(pending.clone());
        if !self.transition(ClaimEvent::TxPending).await {
            return;
        }
        info!("Transaction submitted, awaiting receipt: {}", hash);

        let outcome = ConfirmationWatcher::new(self.adapters.watcher.clone())
            .await_outcome(&pending, &request.amount_raw)
            .await;

        match &outcome {
            ClaimOutcome::Claimed { .. } => {
                let _ = self.transition(ClaimEvent::InclusionConfirmed).await;
            }
            ClaimOutcome::Failed(failure) if failure.kind == FailureKind::OnChainRevert => {
                let _ = self.transition(ClaimEvent::TxReverted).await;
            }
            ClaimOutcome::Failed(_) => {
                let _ = self.transition(ClaimEvent::WatcherFailed).await;
            }
        }
        self.emit(outcome).await;
    }

    /// Live re-check immediately before submission: if the wallet
    /// disconnected or switched accounts since gate time, the resolved
    /// recipient may be stale and funds could land on the wrong address.
    async fn recipient_still_live(&self, request: &ClaimRequest, recipient: Address) -> bool {
        let live = self.gatekeeper.live_connection().await;
        recipient::resolve(request, &live)
            .map(|address| address == recipient)
            .unwrap_or(false)
    }

    // ==================== bookkeeping ====================

    /// Apply a transition; an invalid one means a concurrent actor already
    /// moved the machine, so the caller backs off.
    async fn transition(&self, event: ClaimEvent) -> bool {
        let mut state = self.state.lock().await;
        match state.machine.transition(event) {
            Ok(phase) => {
                debug!("Phase -> {}", phase);
                true
            }
            Err(e) => {
                debug!("Transition skipped: {}", e);
                false
            }
        }
    }

    async fn fail(&self, event: ClaimEvent, failure: ClaimFailure) {
        let _ = self.transition(event).await;
        self.emit(ClaimOutcome::Failed(failure)).await;
    }

    /// Emit the terminal outcome exactly once per attempt. Nothing fires
    /// after abandonment.
    async fn emit(&self, outcome: ClaimOutcome) {
        if self.abandoned.load(Ordering::SeqCst) {
            debug!("Engine abandoned, suppressing outcome callback");
            return;
        }

        let mut state = self.state.lock().await;
        if state.outcome_emitted {
            return;
        }
        state.outcome_emitted = true;

        match outcome {
            ClaimOutcome::Claimed { hash, amount } => {
                state.last_error = None;
                drop(state);
                info!("Reward claimed: {} ({})", hash, amount);
                self.hooks.on_reward_claimed(&hash, &amount);
            }
            ClaimOutcome::Failed(failure) => {
                state.last_error = Some(failure.clone());
                drop(state);
                warn!("Reward claim failed: {}", failure);
                self.hooks.on_reward_failed(&failure);
            }
        }
    }
}
