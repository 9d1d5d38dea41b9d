//! Client-side chat session
//!
//! The session coordinates three things: the request lifecycle of the
//! question in flight, the cancellable reveal of its answer, and the
//! persisted history and pinned chats. Views observe a [`SessionState`]
//! through a watch channel and never mutate it directly.

pub mod controller;
pub mod lifecycle;
pub mod log;
pub mod reveal;
pub mod state;

pub use controller::{ChatSession, SubmitOutcome};
pub use lifecycle::{
    RequestLifecycle, RequestOutcome, RequestPhase, Resolution, FALLBACK_ANSWER,
};
pub use log::{ChatLog, Confirmation, DELETE_CONFIRMATION_PROMPT};
pub use reveal::{RevealAnimator, RevealFrame, RevealSink, REVEAL_STEP_DELAY};
pub use state::SessionState;
