//! Lifecycle callbacks exposed to the host UI.

use crate::error::ClaimFailure;

/// Host callbacks for the claim lifecycle.
///
/// `on_reward_started` fires on entering validation; exactly one of
/// `on_reward_claimed` / `on_reward_failed` fires per attempt, never zero,
/// never twice. All methods default to no-ops so hosts implement only what
/// they need.
pub trait RewardHooks: Send + Sync {
    fn on_reward_started(&self) {}

    fn on_reward_claimed(&self, _tx_hash: &str, _amount: &str) {}

    fn on_reward_failed(&self, _failure: &ClaimFailure) {}
}

/// Hook implementation that ignores every event.
pub struct NoopHooks;

impl RewardHooks for NoopHooks {}
