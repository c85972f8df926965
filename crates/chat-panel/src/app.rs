use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use gpui::*;
use gpui_component::ActiveTheme;

use crate::events::SendMessage;
use crate::i18n::I18n;
use crate::message::{Message, MessageId};
use crate::panel::{ChatPanel, ChatPanelOptions};
use crate::settings::{SettingsStore, ShellSettings};

/// Returns the default themes directory path.
pub fn default_themes_path() -> PathBuf {
    PathBuf::from("./themes")
}

gpui::actions!(shell, [Quit, ToggleTheme]);

/// Demo host that plays the caller role for a [`ChatPanel`].
///
/// It owns the message history, flips the loading flag while a reply is
/// pending and answers every submission with an echo after a configurable
/// delay.
pub struct DemoShell {
    panel: Entity<ChatPanel>,
    settings: Arc<SettingsStore>,
    i18n: I18n,
    messages: Vec<Message>,
    next_message_id: u64,
    reply_task: Option<Task<()>>,
}

impl DemoShell {
    pub fn new(settings: Arc<SettingsStore>, window: &mut Window, cx: &mut Context<Self>) -> Self {
        let i18n = I18n::current(cx);
        let snapshot = settings.settings();
        let (title, subtitle) = header_text(&snapshot, &i18n);

        let greeting = Message::assistant(message_id(1), i18n.t("demo.greeting"))
            .with_timestamp(SystemTime::now());
        let messages = vec![greeting];

        let mut options = ChatPanelOptions::new()
            .messages(messages.clone())
            .title(title)
            .subtitle(subtitle)
            .on_send_message(|content, _window, _cx| {
                tracing::debug!(chars = content.chars().count(), "chat message submitted");
            });
        if let Some(placeholder) = snapshot.placeholder() {
            options = options.placeholder(placeholder);
        }
        let panel = cx.new(|cx| ChatPanel::new(options, window, cx));

        cx.subscribe(&panel, |this, _, event: &SendMessage, cx| {
            this.handle_send(event, cx);
        })
        .detach();

        Self {
            panel,
            settings,
            i18n,
            messages,
            next_message_id: 2,
            reply_task: None,
        }
    }

    fn handle_send(&mut self, event: &SendMessage, cx: &mut Context<Self>) {
        let message = Message::user(self.alloc_message_id(), event.content.clone())
            .with_timestamp(SystemTime::now());
        self.messages.push(message);
        self.sync_panel(true, cx);
        self.schedule_reply(event.content.clone(), cx);
    }

    fn schedule_reply(&mut self, prompt: SharedString, cx: &mut Context<Self>) {
        let delay = Duration::from_millis(self.settings.settings().reply_delay_ms);
        let reply = echo_reply(&self.i18n, &prompt);

        self.reply_task = Some(cx.spawn(async move |this, cx| {
            cx.background_executor().timer(delay).await;

            let _ = this.update(cx, |this, cx| {
                this.finish_reply(reply, cx);
                this.reply_task = None;
            });
        }));
    }

    fn finish_reply(&mut self, reply: String, cx: &mut Context<Self>) {
        let message =
            Message::assistant(self.alloc_message_id(), reply).with_timestamp(SystemTime::now());
        self.messages.push(message);
        self.sync_panel(false, cx);
    }

    /// Hands the panel a fresh snapshot of the history.
    fn sync_panel(&mut self, is_loading: bool, cx: &mut Context<Self>) {
        let messages: Rc<[Message]> = self.messages.clone().into();
        self.panel.update(cx, |panel, cx| {
            panel.set_messages(messages, cx);
            panel.set_loading(is_loading, cx);
        });
    }

    fn toggle_theme(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        match self.settings.update(|settings| settings.with_toggled_theme()) {
            Ok(settings) => settings.apply_theme(Some(window), cx),
            Err(error) => {
                tracing::warn!("failed to persist theme change: {}", error);
                self.settings
                    .settings()
                    .with_toggled_theme()
                    .apply_theme(Some(window), cx);
            }
        }
        cx.notify();
    }

    fn alloc_message_id(&mut self) -> MessageId {
        let id = message_id(self.next_message_id);
        self.next_message_id = self.next_message_id.saturating_add(1);
        id
    }
}

impl Render for DemoShell {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        div()
            .id("demo-shell")
            .size_full()
            .bg(theme.background)
            .on_action(cx.listener(|this, _: &ToggleTheme, window, cx| {
                this.toggle_theme(window, cx);
            }))
            .child(self.panel.clone())
    }
}

/// Configured header text, falling back to the localized demo strings.
fn header_text(settings: &ShellSettings, i18n: &I18n) -> (SharedString, SharedString) {
    let pick = |configured: &str, key: &str| -> SharedString {
        if configured.is_empty() {
            i18n.t(key).into()
        } else {
            configured.to_string().into()
        }
    };

    (
        pick(&settings.title, "demo.title"),
        pick(&settings.subtitle, "demo.subtitle"),
    )
}

fn message_id(sequence: u64) -> MessageId {
    MessageId::new(format!("msg-{sequence}"))
}

fn echo_reply(i18n: &I18n, prompt: &str) -> String {
    i18n.format("demo.reply", &[("message", prompt)])
}
