//! Incremental answer reveal
//!
//! A reveal drives a displayed string from empty to the full answer, one
//! character per step, on a spawned tokio task. Each reveal owns a
//! [`CancellationToken`]; starting a new reveal or cancelling cancels the
//! token, and the token is checked under the same lock as every step, so no
//! character lands after `cancel` returns.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Delay between revealed characters
pub const REVEAL_STEP_DELAY: Duration = Duration::from_millis(2);

/// A change to the displayed text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealFrame {
    /// Clear the display
    Reset,
    /// Append one character
    Append(char),
    /// Replace the display with the full text
    Show(String),
}

impl RevealFrame {
    /// Apply this frame to a displayed string
    ///
    /// # Examples
    ///
    /// ```
    /// use askverse::session::RevealFrame;
    ///
    /// let mut shown = String::from("old");
    /// RevealFrame::Reset.apply(&mut shown);
    /// RevealFrame::Append('h').apply(&mut shown);
    /// assert_eq!(shown, "h");
    /// ```
    pub fn apply(&self, displayed: &mut String) {
        match self {
            Self::Reset => displayed.clear(),
            Self::Append(ch) => displayed.push(*ch),
            Self::Show(text) => {
                displayed.clear();
                displayed.push_str(text);
            }
        }
    }
}

/// Receives every frame a reveal produces
pub type RevealSink = Arc<dyn Fn(RevealFrame) + Send + Sync>;

struct ActiveReveal {
    id: u64,
    token: CancellationToken,
    text: String,
}

struct Inner {
    sink: RevealSink,
    step_delay: Duration,
    incremental_enabled: AtomicBool,
    next_id: AtomicU64,
    active: Mutex<Option<ActiveReveal>>,
}

impl Inner {
    fn active(&self) -> MutexGuard<'_, Option<ActiveReveal>> {
        self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit(&self, frame: RevealFrame) {
        (self.sink)(frame)
    }
}

/// Cancellable, restartable reveal of answer text
///
/// Cloning yields another handle to the same animator.
#[derive(Clone)]
pub struct RevealAnimator {
    inner: Arc<Inner>,
}

impl RevealAnimator {
    /// Create an animator that reports frames to `sink`
    pub fn new(sink: RevealSink, incremental_enabled: bool) -> Self {
        Self::with_step_delay(sink, incremental_enabled, REVEAL_STEP_DELAY)
    }

    pub(crate) fn with_step_delay(
        sink: RevealSink,
        incremental_enabled: bool,
        step_delay: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                sink,
                step_delay,
                incremental_enabled: AtomicBool::new(incremental_enabled),
                next_id: AtomicU64::new(0),
                active: Mutex::new(None),
            }),
        }
    }

    /// Start revealing `text`, superseding any running reveal
    ///
    /// With `incremental` false the full text is shown at once. Otherwise
    /// the display is cleared and one character is appended per step until
    /// the text is complete. Empty text completes with zero steps.
    ///
    /// Incremental reveals need a tokio runtime; without one the text is
    /// shown at once.
    pub fn start(&self, text: &str, incremental: bool) {
        let mut active = self.inner.active();
        if let Some(previous) = active.take() {
            previous.token.cancel();
            tracing::debug!(reveal = previous.id, "Superseded running reveal");
        }

        if !incremental {
            self.inner.emit(RevealFrame::Show(text.to_string()));
            return;
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                tracing::warn!("No async runtime for reveal, showing full text");
                self.inner.emit(RevealFrame::Show(text.to_string()));
                return;
            }
        };

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let token = CancellationToken::new();
        *active = Some(ActiveReveal {
            id,
            token: token.clone(),
            text: text.to_string(),
        });
        self.inner.emit(RevealFrame::Reset);
        drop(active);

        tracing::debug!(reveal = id, chars = text.chars().count(), "Starting reveal");
        runtime.spawn(run_reveal(self.inner.clone(), id, token, text.to_string()));
    }

    /// Stop the running reveal, leaving the display as it is
    ///
    /// Idempotent.
    pub fn cancel(&self) {
        if let Some(active) = self.inner.active().take() {
            active.token.cancel();
            tracing::debug!(reveal = active.id, "Cancelled reveal");
        }
    }

    /// Stop the running reveal and show its full text
    ///
    /// Returns `false` when no reveal was running.
    pub fn finish(&self) -> bool {
        let mut active = self.inner.active();
        match active.take() {
            Some(reveal) => {
                reveal.token.cancel();
                self.inner.emit(RevealFrame::Show(reveal.text));
                true
            }
            None => false,
        }
    }

    /// Enable or disable incremental reveal
    ///
    /// Disabling while a reveal runs shows the full text immediately.
    /// Enabling has no effect on what is already displayed.
    pub fn set_incremental_enabled(&self, enabled: bool) {
        self.inner
            .incremental_enabled
            .store(enabled, Ordering::Relaxed);
        if !enabled && self.finish() {
            tracing::debug!("Incremental reveal disabled mid-reveal");
        }
    }

    /// Whether incremental reveal is enabled
    pub fn incremental_enabled(&self) -> bool {
        self.inner.incremental_enabled.load(Ordering::Relaxed)
    }

    /// Whether a reveal is running
    pub fn is_active(&self) -> bool {
        self.inner.active().is_some()
    }
}

async fn run_reveal(inner: Arc<Inner>, id: u64, token: CancellationToken, text: String) {
    for (step, ch) in text.chars().enumerate() {
        if step > 0 {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(inner.step_delay) => {}
            }
        }

        let _active = inner.active();
        if token.is_cancelled() {
            return;
        }
        inner.emit(RevealFrame::Append(ch));
    }

    let mut active = inner.active();
    if active.as_ref().map(|a| a.id) == Some(id) {
        *active = None;
        tracing::debug!(reveal = id, "Reveal complete");
    }
}
