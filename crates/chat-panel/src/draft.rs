/// Observable state of the input draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DraftState {
    #[default]
    Empty,
    NonEmpty,
}

/// Component-local text of the message input.
///
/// Mirrors the input widget value and decides whether a submission is accepted.
/// Nothing here is persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    value: String,
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replaces the draft with the latest input value.
    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    pub fn trimmed(&self) -> &str {
        self.value.trim()
    }

    /// Whitespace-only text counts as empty.
    pub fn state(&self) -> DraftState {
        if self.trimmed().is_empty() {
            DraftState::Empty
        } else {
            DraftState::NonEmpty
        }
    }

    pub fn can_submit(&self, is_loading: bool) -> bool {
        !is_loading && self.state() == DraftState::NonEmpty
    }

    /// Returns the trimmed text and resets the draft when the submission is accepted.
    ///
    /// Rejected submissions leave the draft untouched.
    pub fn take_submission(&mut self, is_loading: bool) -> Option<String> {
        if !self.can_submit(is_loading) {
            return None;
        }

        let content = self.trimmed().to_string();
        self.clear();
        Some(content)
    }
}
