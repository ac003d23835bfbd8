//! Claim orchestration: the phase machine and the stages that drive it.

pub mod engine;
pub mod gatekeeper;
pub mod phase;
pub mod recipient;
pub mod strategy;
pub mod watcher;

pub use engine::{Adapters, ClaimEngine, ClickAction};
pub use gatekeeper::{ConnectionGatekeeper, LiveConnection};
pub use phase::{ClaimEvent, ClaimPhase, PhaseMachine, PhaseTransition};
pub use strategy::TransferStrategy;
pub use watcher::ConfirmationWatcher;
