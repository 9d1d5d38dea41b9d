//! Observable chat session state

/// Transient view of the chat session
///
/// Owned by [`ChatSession`](super::ChatSession) and published through a
/// watch channel; observers never mutate it. Nothing here is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// The question currently being edited or last submitted
    pub question: String,
    /// The latest raw answer, empty while a request is pending
    pub answer: String,
    /// The part of the answer revealed so far
    pub displayed_answer: String,
    /// A request is in flight
    pub busy: bool,
    /// Answers are revealed one character at a time
    pub typing_enabled: bool,
}

impl SessionState {
    /// Initial state with the given typing preference
    pub fn new(typing_enabled: bool) -> Self {
        Self {
            question: String::new(),
            answer: String::new(),
            displayed_answer: String::new(),
            busy: false,
            typing_enabled,
        }
    }

    /// The whole answer is on screen and nothing is pending
    ///
    /// # Examples
    ///
    /// ```
    /// use askverse::session::SessionState;
    ///
    /// let mut state = SessionState::new(true);
    /// state.answer = "4".to_string();
    /// assert!(!state.is_settled());
    ///
    /// state.displayed_answer = "4".to_string();
    /// assert!(state.is_settled());
    /// ```
    pub fn is_settled(&self) -> bool {
        !self.busy && self.displayed_answer == self.answer
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(true)
    }
}
