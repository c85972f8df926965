use gpui::SharedString;

use crate::message::{Message, MessageId};

/// Horizontal placement of one message row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Start,
    End,
}

/// Icon shown next to a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Avatar {
    Person,
    Assistant,
}

/// One block of the rendered panel, in paint order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    Header {
        title: Option<SharedString>,
        subtitle: Option<SharedString>,
    },
    Message {
        /// Position in the caller's sequence.
        index: usize,
        id: MessageId,
        alignment: Alignment,
        avatar: Avatar,
    },
    PendingIndicator,
    ScrollAnchor,
}

/// Render inputs borrowed from the panel for a single frame.
#[derive(Debug, Clone, Copy)]
pub struct PanelInputs<'a> {
    pub messages: &'a [Message],
    pub title: Option<&'a SharedString>,
    pub subtitle: Option<&'a SharedString>,
    pub is_loading: bool,
}

/// Ordered render plan for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelLayout {
    rows: Vec<Row>,
}

impl PanelLayout {
    pub fn build(inputs: PanelInputs<'_>) -> Self {
        let mut rows = Vec::with_capacity(inputs.messages.len() + 3);

        let title = non_empty(inputs.title);
        let subtitle = non_empty(inputs.subtitle);
        if title.is_some() || subtitle.is_some() {
            rows.push(Row::Header { title, subtitle });
        }

        rows.extend(
            inputs
                .messages
                .iter()
                .enumerate()
                .map(|(index, message)| Row::Message {
                    index,
                    id: message.id.clone(),
                    alignment: alignment_for(message),
                    avatar: avatar_for(message),
                }),
        );

        // The indicator sits after the last message but before the anchor so the
        // bottom scroll keeps it in view.
        if inputs.is_loading {
            rows.push(Row::PendingIndicator);
        }
        rows.push(Row::ScrollAnchor);

        Self { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn header(&self) -> Option<&Row> {
        self.rows
            .first()
            .filter(|row| matches!(row, Row::Header { .. }))
    }

    /// Rows that belong to the scrollable list, excluding the header.
    pub fn list_rows(&self) -> &[Row] {
        match self.header() {
            Some(_) => &self.rows[1..],
            None => &self.rows,
        }
    }
}

pub fn alignment_for(message: &Message) -> Alignment {
    if message.is_user {
        Alignment::End
    } else {
        Alignment::Start
    }
}

pub fn avatar_for(message: &Message) -> Avatar {
    if message.is_user {
        Avatar::Person
    } else {
        Avatar::Assistant
    }
}

fn non_empty(text: Option<&SharedString>) -> Option<SharedString> {
    text.filter(|text| !text.is_empty()).cloned()
}
