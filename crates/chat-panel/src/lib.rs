//! Chat panel widget for gpui applications.
//!
//! The panel renders a caller-owned message list, an optional header and an
//! input form, and reports submissions back to the caller.
#![deny(unsafe_code)]

pub mod app;
pub mod draft;
pub mod events;
pub mod i18n;
pub mod layout;
pub mod message;
pub mod panel;
pub mod scroll_manager;
pub mod settings;

pub use draft::{Draft, DraftState};
pub use events::SendMessage;
pub use layout::{Alignment, Avatar, PanelInputs, PanelLayout, Row};
pub use message::{Message, MessageId};
pub use panel::{ChatPanel, ChatPanelOptions, SendMessageHandler};
pub use scroll_manager::{ScrollManager, SmoothScroll};
