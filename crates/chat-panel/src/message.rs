use std::time::SystemTime;

use gpui::SharedString;

/// Stable identifier for one message, used as the row key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub SharedString);

impl MessageId {
    /// Creates a typed message identifier.
    pub fn new(raw: impl Into<SharedString>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_ref()
    }
}

impl From<&'static str> for MessageId {
    fn from(raw: &'static str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for MessageId {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

/// One chat entry supplied by the caller.
///
/// The panel only reads messages; creating, ordering and discarding them is the
/// caller's job. Ids must be unique within one sequence, which is not checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub content: SharedString,
    pub is_user: bool,
    /// Carried for the caller's benefit; rendering ignores it.
    pub timestamp: Option<SystemTime>,
}

impl Message {
    pub fn new(id: impl Into<MessageId>, content: impl Into<SharedString>, is_user: bool) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            is_user,
            timestamp: None,
        }
    }

    /// Creates a message authored by the local user.
    pub fn user(id: impl Into<MessageId>, content: impl Into<SharedString>) -> Self {
        Self::new(id, content, true)
    }

    /// Creates a message authored by the other party.
    pub fn assistant(id: impl Into<MessageId>, content: impl Into<SharedString>) -> Self {
        Self::new(id, content, false)
    }

    pub fn with_timestamp(mut self, timestamp: SystemTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}
