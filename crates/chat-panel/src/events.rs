use gpui::SharedString;

/// Emitted when the panel accepts a submission.
///
/// `content` is already trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessage {
    pub content: SharedString,
}

impl SendMessage {
    pub fn new(content: impl Into<SharedString>) -> Self {
        Self {
            content: content.into(),
        }
    }
}
