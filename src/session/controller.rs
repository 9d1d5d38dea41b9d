//! Chat session orchestration
//!
//! [`ChatSession`] turns questions into requests, feeds answers to the
//! reveal animator, records exchanges in the history, and publishes a
//! [`SessionState`] that views observe through [`ChatSession::subscribe`].

use super::lifecycle::RequestLifecycle;
use super::log::{ChatLog, Confirmation};
use super::reveal::{RevealAnimator, RevealFrame};
use super::state::SessionState;
use crate::providers::Provider;
use crate::storage::{ChatExchange, KeyValueStore};

use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

/// What a call to [`ChatSession::submit_question`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input; nothing was sent or recorded
    Ignored,
    /// The provider answered and the exchange was recorded
    Answered(ChatExchange),
    /// The provider failed; the fallback exchange was recorded
    Failed(ChatExchange),
    /// A newer question was submitted before this one resolved; its
    /// response was discarded
    Superseded,
}

impl SubmitOutcome {
    /// The recorded exchange, if any
    pub fn exchange(&self) -> Option<&ChatExchange> {
        match self {
            Self::Answered(exchange) | Self::Failed(exchange) => Some(exchange),
            Self::Ignored | Self::Superseded => None,
        }
    }
}

/// Orchestrates one interactive chat session
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use askverse::providers::FakeProvider;
/// use askverse::session::{ChatSession, SubmitOutcome};
/// use askverse::storage::{ChatExchange, MemoryStore};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let session = ChatSession::new(
///     Arc::new(FakeProvider::with_answers(["4"])),
///     Arc::new(MemoryStore::new()),
///     false,
/// );
///
/// let outcome = session.submit_question("2+2?").await;
/// assert_eq!(outcome, SubmitOutcome::Answered(ChatExchange::new("2+2?", "4")));
/// assert_eq!(session.state().displayed_answer, "4");
/// # }
/// ```
pub struct ChatSession {
    lifecycle: RequestLifecycle,
    animator: RevealAnimator,
    state: Arc<watch::Sender<SessionState>>,
    log: Mutex<ChatLog>,
    // Serializes starting a request against settling one
    turn: Mutex<()>,
}

/// Clears `busy` if a submit future is dropped before its answer settles
struct PendingRequest<'a> {
    session: &'a ChatSession,
    generation: u64,
    armed: bool,
}

impl PendingRequest<'_> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for PendingRequest<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let _turn = self.session.turn();
        if self.session.lifecycle.abandon(self.generation) {
            self.session.state.send_modify(|s| s.busy = false);
        }
    }
}

impl ChatSession {
    /// Create a session, loading history and pinned chats from `store`
    pub fn new(
        provider: Arc<dyn Provider>,
        store: Arc<dyn KeyValueStore>,
        typing_enabled: bool,
    ) -> Self {
        let (sender, _) = watch::channel(SessionState::new(typing_enabled));
        let state = Arc::new(sender);

        let sink_state = state.clone();
        let animator = RevealAnimator::new(
            Arc::new(move |frame: RevealFrame| {
                sink_state.send_modify(|s| frame.apply(&mut s.displayed_answer));
            }),
            typing_enabled,
        );

        Self {
            lifecycle: RequestLifecycle::new(provider),
            animator,
            state,
            log: Mutex::new(ChatLog::load(store)),
            turn: Mutex::new(()),
        }
    }

    fn turn(&self) -> MutexGuard<'_, ()> {
        self.turn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn log(&self) -> MutexGuard<'_, ChatLog> {
        self.log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Observe state changes
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Submit a question and reveal its answer
    ///
    /// Blank input is ignored. Otherwise the current question and answer are
    /// replaced, the provider is called once, and the resulting exchange
    /// (the fallback answer on failure) is appended to the history. If a
    /// newer question is submitted before this one resolves, this response
    /// is discarded and nothing is recorded.
    ///
    /// Dropping the returned future before it completes abandons the
    /// request: `busy` is cleared and a late response is never recorded.
    pub async fn submit_question(&self, text: &str) -> SubmitOutcome {
        if text.trim().is_empty() {
            return SubmitOutcome::Ignored;
        }

        let generation = {
            let _turn = self.turn();
            self.animator.cancel();
            let generation = self.lifecycle.begin();
            self.state.send_modify(|s| {
                s.question = text.to_string();
                s.answer.clear();
                s.displayed_answer.clear();
                s.busy = true;
            });
            generation
        };
        let mut pending = PendingRequest {
            session: self,
            generation,
            armed: true,
        };

        let resolution = self.lifecycle.complete(generation, text).await;

        let _turn = self.turn();
        pending.disarm();
        if !resolution.current || !self.lifecycle.is_current(generation) {
            return SubmitOutcome::Superseded;
        }

        let answer = resolution.outcome.answer().to_string();
        let exchange = ChatExchange::new(text, answer.clone());
        self.log().record(exchange.clone());

        self.state.send_modify(|s| {
            s.answer = answer.clone();
            s.busy = false;
        });
        self.animator
            .start(&answer, self.animator.incremental_enabled());

        if resolution.outcome.is_failed() {
            SubmitOutcome::Failed(exchange)
        } else {
            SubmitOutcome::Answered(exchange)
        }
    }

    /// Replace the question being edited
    pub fn edit_question(&self, text: &str) {
        self.state.send_modify(|s| s.question = text.to_string());
    }

    /// Clear the current question and answer
    ///
    /// History, pinned chats, and any running reveal are left alone.
    pub fn start_new_chat(&self) {
        self.lifecycle.reset();
        self.state.send_modify(|s| {
            s.question.clear();
            s.answer.clear();
            s.displayed_answer.clear();
        });
    }

    /// Bring a stored exchange back as the current chat
    ///
    /// The answer is replayed through the same reveal path as a fresh one.
    pub fn restore_chat(&self, exchange: &ChatExchange) {
        self.state.send_modify(|s| {
            s.question = exchange.question.clone();
            s.answer = exchange.answer.clone();
        });
        self.animator
            .start(&exchange.answer, self.animator.incremental_enabled());
    }

    /// Pin or unpin an exchange; returns whether it is pinned afterwards
    pub fn toggle_pin(&self, exchange: &ChatExchange) -> bool {
        self.log().toggle_pin(exchange)
    }

    /// Whether an equal exchange is pinned
    pub fn is_pinned(&self, exchange: &ChatExchange) -> bool {
        self.log().is_pinned(exchange)
    }

    /// Delete every equal history entry once `confirmation` agrees
    ///
    /// Returns the number of entries removed.
    pub fn delete_chat(&self, exchange: &ChatExchange, confirmation: &dyn Confirmation) -> usize {
        self.log().delete(exchange, confirmation)
    }

    /// Recorded exchanges, oldest first
    pub fn history(&self) -> Vec<ChatExchange> {
        self.log().history().to_vec()
    }

    /// Pinned exchanges in pin order
    pub fn pinned(&self) -> Vec<ChatExchange> {
        self.log().pinned().to_vec()
    }

    /// Turn the typing effect on or off
    ///
    /// Turning it off while an answer is being revealed shows the whole
    /// answer at once.
    pub fn set_typing_enabled(&self, enabled: bool) {
        self.animator.set_incremental_enabled(enabled);
        self.state.send_modify(|s| {
            s.typing_enabled = enabled;
            if !enabled && !s.busy && !s.answer.is_empty() {
                s.displayed_answer = s.answer.clone();
            }
        });
    }

    /// Whether the typing effect is on
    pub fn typing_enabled(&self) -> bool {
        self.animator.incremental_enabled()
    }

    /// Skip the rest of a running reveal
    ///
    /// Returns `false` when nothing was being revealed.
    pub fn finish_reveal(&self) -> bool {
        self.animator.finish()
    }

    /// Whether a reveal is running
    pub fn is_revealing(&self) -> bool {
        self.animator.is_active()
    }

    /// Whether a request is pending
    pub fn is_busy(&self) -> bool {
        self.lifecycle.is_busy()
    }

    /// Name of the provider questions go to
    pub fn provider_name(&self) -> &str {
        self.lifecycle.provider().name()
    }

    /// Model questions go to
    pub fn provider_model(&self) -> String {
        self.lifecycle.provider().model()
    }
}
