use std::rc::Rc;
use std::time::Duration;

use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::{
    ActiveTheme, Disableable, Icon, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    input::{Input, InputEvent, InputState},
    label::Label,
    v_flex,
};

use crate::draft::Draft;
use crate::events::SendMessage;
use crate::i18n::{self, I18n};
use crate::layout::{Alignment, Avatar, PanelInputs, PanelLayout, Row};
use crate::message::Message;
use crate::scroll_manager::ScrollManager;

const BUBBLE_MAX_WIDTH: Pixels = px(540.);
const AVATAR_SIZE: Pixels = px(28.);
const AVATAR_ICON_SIZE: Pixels = px(16.);
const PENDING_DOT_SIZE: Pixels = px(6.);
/// Pulse periods of the three pending dots; staggered so they never sync up.
const PENDING_DOT_PERIODS_MS: [u64; 3] = [900, 1_050, 1_200];

/// Caller handler for accepted submissions.
pub type SendMessageHandler = Rc<dyn Fn(&SharedString, &mut Window, &mut App)>;

/// Initial configuration for a [`ChatPanel`].
#[derive(Clone, Default)]
pub struct ChatPanelOptions {
    messages: Rc<[Message]>,
    title: Option<SharedString>,
    subtitle: Option<SharedString>,
    placeholder: Option<SharedString>,
    is_loading: bool,
    on_send_message: Option<SendMessageHandler>,
}

impl ChatPanelOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(mut self, messages: impl Into<Rc<[Message]>>) -> Self {
        self.messages = messages.into();
        self
    }

    pub fn title(mut self, title: impl Into<SharedString>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn subtitle(mut self, subtitle: impl Into<SharedString>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    /// Overrides the localized "Type your message..." placeholder.
    pub fn placeholder(mut self, placeholder: impl Into<SharedString>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn loading(mut self, is_loading: bool) -> Self {
        self.is_loading = is_loading;
        self
    }

    pub fn on_send_message(
        mut self,
        handler: impl Fn(&SharedString, &mut Window, &mut App) + 'static,
    ) -> Self {
        self.on_send_message = Some(Rc::new(handler));
        self
    }
}

/// Localized labels resolved once when the panel is built.
struct PanelStrings {
    placeholder: SharedString,
    send: SharedString,
    attach: SharedString,
    search: SharedString,
    more: SharedString,
}

impl PanelStrings {
    fn resolve(catalog: &I18n) -> Self {
        Self {
            placeholder: catalog.t(i18n::PLACEHOLDER_KEY).into(),
            send: catalog.t(i18n::SEND_KEY).into(),
            attach: catalog.t(i18n::ATTACH_KEY).into(),
            search: catalog.t(i18n::SEARCH_KEY).into(),
            more: catalog.t(i18n::MORE_KEY).into(),
        }
    }
}

/// Scrollable message list with a header and a submission form.
///
/// The message slice belongs to the caller and is only read here. The panel
/// owns the draft text and the scroll-to-bottom behavior, and reports accepted
/// submissions through [`SendMessage`] and the optional handler.
pub struct ChatPanel {
    messages: Rc<[Message]>,
    title: Option<SharedString>,
    subtitle: Option<SharedString>,
    is_loading: bool,
    on_send_message: Option<SendMessageHandler>,
    input_state: Entity<InputState>,
    draft: Draft,
    scroll_manager: ScrollManager,
    strings: PanelStrings,
}

impl EventEmitter<SendMessage> for ChatPanel {}

impl ChatPanel {
    pub fn new(options: ChatPanelOptions, window: &mut Window, cx: &mut Context<Self>) -> Self {
        let strings = PanelStrings::resolve(&I18n::current(cx));
        let placeholder = options
            .placeholder
            .unwrap_or_else(|| strings.placeholder.clone());
        let input_state = cx.new(|cx| InputState::new(window, cx).placeholder(placeholder));

        cx.subscribe_in(
            &input_state,
            window,
            |this, state, event: &InputEvent, window, cx| match event {
                InputEvent::Change { .. } => {
                    let value = state.read(cx).value().to_string();
                    this.draft.set(value);
                    cx.notify();
                }
                InputEvent::PressEnter { secondary } if !*secondary => {
                    this.submit(window, cx);
                }
                _ => {}
            },
        )
        .detach();

        let mut scroll_manager = ScrollManager::new();
        if !options.messages.is_empty() {
            scroll_manager.request_scroll_to_bottom();
        }

        Self {
            messages: options.messages,
            title: options.title,
            subtitle: options.subtitle,
            is_loading: options.is_loading,
            on_send_message: options.on_send_message,
            input_state,
            draft: Draft::new(),
            scroll_manager,
            strings,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Replaces the caller-owned message slice.
    ///
    /// Handing over a different slice schedules a scroll to the bottom once the
    /// next layout has placed the new rows.
    pub fn set_messages(&mut self, messages: impl Into<Rc<[Message]>>, cx: &mut Context<Self>) {
        let messages = messages.into();
        if Rc::ptr_eq(&self.messages, &messages) {
            return;
        }

        tracing::trace!(count = messages.len(), "chat panel messages replaced");
        self.messages = messages;
        self.scroll_manager.request_scroll_to_bottom();
        cx.notify();
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn set_loading(&mut self, is_loading: bool, cx: &mut Context<Self>) {
        if self.is_loading != is_loading {
            self.is_loading = is_loading;
            cx.notify();
        }
    }

    pub fn set_title(&mut self, title: Option<SharedString>, cx: &mut Context<Self>) {
        self.title = title;
        cx.notify();
    }

    pub fn set_subtitle(&mut self, subtitle: Option<SharedString>, cx: &mut Context<Self>) {
        self.subtitle = subtitle;
        cx.notify();
    }

    /// Sets the input placeholder; `None` restores the localized default.
    pub fn set_placeholder(
        &mut self,
        placeholder: Option<SharedString>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        let placeholder = placeholder.unwrap_or_else(|| self.strings.placeholder.clone());
        self.input_state.update(cx, |state, cx| {
            state.set_placeholder(placeholder, window, cx);
        });
    }

    pub fn on_send_message(
        &mut self,
        handler: impl Fn(&SharedString, &mut Window, &mut App) + 'static,
    ) {
        self.on_send_message = Some(Rc::new(handler));
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Replaces the draft text, for example to prefill the input.
    pub fn set_draft(
        &mut self,
        text: impl Into<SharedString>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        let text = text.into();
        self.input_state.update(cx, |state, cx| {
            state.set_value(text.clone(), window, cx);
        });
        self.draft.set(text.to_string());
        cx.notify();
    }

    pub fn can_submit(&self) -> bool {
        self.draft.can_submit(self.is_loading)
    }

    pub fn layout(&self) -> PanelLayout {
        PanelLayout::build(PanelInputs {
            messages: &self.messages,
            title: self.title.as_ref(),
            subtitle: self.subtitle.as_ref(),
            is_loading: self.is_loading,
        })
    }

    /// Commits the draft if it is non-blank and no reply is pending.
    pub fn submit(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        let Some(content) = self.draft.take_submission(self.is_loading) else {
            tracing::trace!(is_loading = self.is_loading, "chat panel submission ignored");
            return;
        };

        let content = SharedString::from(content);
        self.input_state.update(cx, |state, cx| {
            state.set_value("", window, cx);
        });

        cx.emit(SendMessage::new(content.clone()));
        if let Some(handler) = self.on_send_message.clone() {
            // Run after this update so the handler may update the panel itself.
            window.defer(cx, move |window, cx| handler(&content, window, cx));
        }
        cx.notify();
    }

    fn render_header(
        &self,
        title: Option<SharedString>,
        subtitle: Option<SharedString>,
        cx: &Context<Self>,
    ) -> impl IntoElement {
        let theme = cx.theme();

        h_flex()
            .id("chat-panel-header")
            .w_full()
            .flex_shrink_0()
            .px_4()
            .py_3()
            .gap_2()
            .justify_between()
            .border_b_1()
            .border_color(theme.border)
            .child(
                v_flex()
                    .min_w_0()
                    .gap_0p5()
                    .when_some(title, |column, title| {
                        column.child(Label::new(title).text_color(theme.foreground))
                    })
                    .when_some(subtitle, |column, subtitle| {
                        column.child(
                            Label::new(subtitle)
                                .text_xs()
                                .text_color(theme.muted_foreground),
                        )
                    }),
            )
            // Search and the overflow menu have no behavior yet.
            .child(
                h_flex()
                    .gap_1()
                    .child(
                        Button::new("chat-panel-search")
                            .ghost()
                            .small()
                            .icon(IconName::Search)
                            .tooltip(self.strings.search.clone()),
                    )
                    .child(
                        Button::new("chat-panel-more")
                            .ghost()
                            .small()
                            .icon(IconName::EllipsisVertical)
                            .tooltip(self.strings.more.clone()),
                    ),
            )
    }

    fn render_message_row(
        &self,
        message: &Message,
        alignment: Alignment,
        avatar: Avatar,
        cx: &Context<Self>,
    ) -> AnyElement {
        let theme = cx.theme();
        let (background, foreground) = match alignment {
            Alignment::End => (theme.accent, theme.accent_foreground),
            Alignment::Start => (theme.secondary, theme.secondary_foreground),
        };

        // Plain text only; Label keeps spaces and line breaks as typed.
        let bubble = div()
            .max_w(BUBBLE_MAX_WIDTH)
            .px_3()
            .py_2()
            .rounded_lg()
            .bg(background)
            .text_color(foreground)
            .child(Label::new(message.content.clone()).text_sm());

        let row = h_flex()
            .id(SharedString::from(format!(
                "chat-message-{}",
                message.id.as_str()
            )))
            .w_full()
            .gap_2()
            .items_start();

        match alignment {
            Alignment::End => row
                .justify_end()
                .child(bubble)
                .child(render_avatar(avatar, cx)),
            Alignment::Start => row
                .justify_start()
                .child(render_avatar(avatar, cx))
                .child(bubble),
        }
        .into_any_element()
    }

    fn render_form(&self, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let is_loading = self.is_loading;

        h_flex()
            .id("chat-panel-form")
            .w_full()
            .flex_shrink_0()
            .gap_2()
            .p_3()
            .border_t_1()
            .border_color(theme.border)
            .bg(theme.background)
            .child(
                // Attachments are not supported; the control is decorative.
                Button::new("chat-panel-attach")
                    .ghost()
                    .small()
                    .icon(IconName::Plus)
                    .tooltip(self.strings.attach.clone())
                    .disabled(is_loading),
            )
            .child(
                div()
                    .flex_1()
                    .min_w_0()
                    .child(Input::new(&self.input_state).w_full().disabled(is_loading)),
            )
            .child(
                Button::new("chat-panel-send")
                    .small()
                    .primary()
                    .icon(IconName::ArrowUp)
                    .child(self.strings.send.clone())
                    .disabled(!self.can_submit())
                    .on_click(cx.listener(|this, _, window, cx| {
                        this.submit(window, cx);
                    })),
            )
    }
}

impl Render for ChatPanel {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        if self.scroll_manager.apply_pending_scroll() {
            window.request_animation_frame();
        }
        let cx: &Context<Self> = cx;

        let layout = self.layout();
        let header = match layout.header() {
            Some(Row::Header { title, subtitle }) => Some((title.clone(), subtitle.clone())),
            _ => None,
        };

        let list_rows = layout
            .list_rows()
            .iter()
            .filter_map(|row| match row {
                Row::Message {
                    index,
                    alignment,
                    avatar,
                    ..
                } => self
                    .messages
                    .get(*index)
                    .map(|message| self.render_message_row(message, *alignment, *avatar, cx)),
                Row::PendingIndicator => Some(render_pending_indicator(cx)),
                Row::ScrollAnchor => Some(
                    div()
                        .id("chat-panel-scroll-anchor")
                        .w_full()
                        .h(px(1.))
                        .into_any_element(),
                ),
                Row::Header { .. } => None,
            })
            .collect::<Vec<_>>();

        let theme = cx.theme();

        v_flex()
            .id("chat-panel")
            .size_full()
            .min_h_0()
            .overflow_hidden()
            .bg(theme.background)
            .when_some(header, |panel, (title, subtitle)| {
                panel.child(self.render_header(title, subtitle, cx))
            })
            .child(
                v_flex()
                    .id("chat-panel-messages")
                    .flex_1()
                    .min_h_0()
                    .w_full()
                    .overflow_y_scroll()
                    .track_scroll(self.scroll_manager.handle())
                    .px_4()
                    .py_3()
                    .gap_3()
                    .children(list_rows),
            )
            .child(self.render_form(cx))
    }
}

fn render_avatar(avatar: Avatar, cx: &App) -> impl IntoElement {
    let theme = cx.theme();
    let icon = match avatar {
        Avatar::Person => IconName::CircleUser,
        Avatar::Assistant => IconName::Bot,
    };

    div()
        .flex_shrink_0()
        .size(AVATAR_SIZE)
        .rounded_full()
        .border_1()
        .border_color(theme.border)
        .bg(theme.muted)
        .flex()
        .items_center()
        .justify_center()
        .child(
            Icon::new(icon)
                .size(AVATAR_ICON_SIZE)
                .text_color(theme.foreground),
        )
}

fn render_pending_indicator(cx: &App) -> AnyElement {
    let theme = cx.theme();
    let dots = PENDING_DOT_PERIODS_MS
        .iter()
        .enumerate()
        .map(|(index, period_ms)| {
            div()
                .size(PENDING_DOT_SIZE)
                .rounded_full()
                .bg(theme.muted_foreground)
                .with_animation(
                    ("chat-pending-dot", index),
                    Animation::new(Duration::from_millis(*period_ms))
                        .repeat()
                        .with_easing(pulsating_between(0.25, 1.0)),
                    |dot, delta| dot.opacity(delta),
                )
        });

    h_flex()
        .id("chat-panel-pending")
        .w_full()
        .gap_2()
        .items_start()
        .justify_start()
        .child(render_avatar(Avatar::Assistant, cx))
        .child(
            h_flex()
                .px_3()
                .py_3()
                .gap_1()
                .rounded_lg()
                .bg(theme.secondary)
                .children(dots),
        )
        .into_any_element()
}
