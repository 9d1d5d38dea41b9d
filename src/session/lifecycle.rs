//! Request lifecycle for a single question/answer exchange
//!
//! `Idle -> Pending -> (Fulfilled | Failed)`, back to `Idle` on reset. A new
//! submit is accepted while another is pending. Each submit takes a fresh
//! generation number; a response whose generation is no longer the latest
//! is reported as stale and leaves the phase untouched.

use crate::providers::{CompletionRequest, Provider};
use std::sync::{Arc, Mutex, MutexGuard};

/// Answer shown in place of a failed request
pub const FALLBACK_ANSWER: &str = "Oops! Something went wrong.";

/// Phase of the most recent submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPhase {
    /// Nothing submitted since the last reset
    Idle,
    /// Waiting on the provider
    Pending {
        /// Generation of the request being waited on
        generation: u64,
    },
    /// The provider answered
    Fulfilled(String),
    /// The provider failed; the fallback answer is exposed
    Failed,
}

impl RequestPhase {
    /// The displayable answer for a resolved phase
    pub fn answer(&self) -> Option<&str> {
        match self {
            Self::Fulfilled(text) => Some(text),
            Self::Failed => Some(FALLBACK_ANSWER),
            Self::Idle | Self::Pending { .. } => None,
        }
    }
}

/// How a submission resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Completion text from the provider
    Fulfilled(String),
    /// Any provider failure
    Failed,
}

impl RequestOutcome {
    /// The answer to display, the fallback for failures
    pub fn answer(&self) -> &str {
        match self {
            Self::Fulfilled(text) => text,
            Self::Failed => FALLBACK_ANSWER,
        }
    }

    /// Whether the provider failed
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

/// Result of [`RequestLifecycle::submit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Generation assigned at submit time
    pub generation: u64,
    /// What the provider produced
    pub outcome: RequestOutcome,
    /// No newer submit started while this one was pending
    pub current: bool,
}

#[derive(Debug)]
struct LifecycleState {
    generation: u64,
    phase: RequestPhase,
}

/// Drives one outstanding exchange against a provider
pub struct RequestLifecycle {
    provider: Arc<dyn Provider>,
    state: Mutex<LifecycleState>,
}

impl RequestLifecycle {
    /// Create an idle lifecycle over `provider`
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            state: Mutex::new(LifecycleState {
                generation: 0,
                phase: RequestPhase::Idle,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LifecycleState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Submit a question
    ///
    /// Returns `None` without calling the provider when `question` is empty
    /// or whitespace-only. Otherwise the provider is called exactly once with
    /// the literal question text. Failures never escape: they resolve as
    /// [`RequestOutcome::Failed`], whose answer is [`FALLBACK_ANSWER`].
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use askverse::providers::FakeProvider;
    /// use askverse::session::{RequestLifecycle, RequestPhase};
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let lifecycle = RequestLifecycle::new(Arc::new(FakeProvider::with_answers(["4"])));
    /// let resolution = lifecycle.submit("2+2?").await.unwrap();
    /// assert_eq!(resolution.outcome.answer(), "4");
    /// assert_eq!(lifecycle.phase(), RequestPhase::Fulfilled("4".to_string()));
    /// # }
    /// ```
    pub async fn submit(&self, question: &str) -> Option<Resolution> {
        if question.trim().is_empty() {
            tracing::debug!("Ignoring blank question");
            return None;
        }

        let generation = self.begin();
        Some(self.complete(generation, question).await)
    }

    /// Enter `Pending` under a fresh generation and return it
    ///
    /// Callers that need the phase change to line up with their own state
    /// pair this with [`RequestLifecycle::complete`] instead of calling
    /// [`RequestLifecycle::submit`].
    pub fn begin(&self) -> u64 {
        let mut state = self.lock();
        state.generation += 1;
        state.phase = RequestPhase::Pending {
            generation: state.generation,
        };
        tracing::debug!(
            generation = state.generation,
            provider = self.provider.name(),
            "Request pending"
        );
        state.generation
    }

    /// Call the provider for a generation handed out by [`RequestLifecycle::begin`]
    pub async fn complete(&self, generation: u64, question: &str) -> Resolution {
        let outcome = match self
            .provider
            .complete(&CompletionRequest::new(question))
            .await
        {
            Ok(response) => RequestOutcome::Fulfilled(response.text),
            Err(e) => {
                tracing::warn!(generation, "Request failed: {:#}", e);
                RequestOutcome::Failed
            }
        };

        let current = {
            let mut state = self.lock();
            let current = state.generation == generation;
            if current {
                state.phase = match &outcome {
                    RequestOutcome::Fulfilled(text) => RequestPhase::Fulfilled(text.clone()),
                    RequestOutcome::Failed => RequestPhase::Failed,
                };
            }
            current
        };

        if current {
            tracing::debug!(generation, failed = outcome.is_failed(), "Request resolved");
        } else {
            tracing::debug!(generation, "Discarding stale response");
        }

        Resolution {
            generation,
            outcome,
            current,
        }
    }

    /// Give up on a pending generation without waiting for its response
    ///
    /// Returns to `Idle` only if `generation` is still the one pending;
    /// returns whether it was.
    pub fn abandon(&self, generation: u64) -> bool {
        let mut state = self.lock();
        if state.phase == (RequestPhase::Pending { generation }) {
            state.phase = RequestPhase::Idle;
            tracing::debug!(generation, "Request abandoned");
            true
        } else {
            false
        }
    }

    /// Whether `generation` is the most recent submit
    pub fn is_current(&self, generation: u64) -> bool {
        self.lock().generation == generation
    }

    /// Current phase
    pub fn phase(&self) -> RequestPhase {
        self.lock().phase.clone()
    }

    /// A request is pending
    pub fn is_busy(&self) -> bool {
        matches!(self.lock().phase, RequestPhase::Pending { .. })
    }

    /// Generation of the most recent submit
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Return a resolved lifecycle to `Idle`
    ///
    /// Has no effect while a request is pending.
    pub fn reset(&self) {
        let mut state = self.lock();
        if !matches!(state.phase, RequestPhase::Pending { .. }) {
            state.phase = RequestPhase::Idle;
        }
    }

    /// The provider requests go to
    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }
}
