use std::sync::Arc;

use gpui::*;
use gpui_component::{Root, ThemeRegistry};

use chat_panel::app::{DemoShell, Quit, ToggleTheme, default_themes_path};
use chat_panel::i18n;
use chat_panel::settings::SettingsStore;

/// Boots gpui, installs gpui-component, the ui catalog and themes, then opens
/// the demo window hosting the chat panel.
fn main() {
    tracing_subscriber::fmt::init();

    let app = Application::new().with_assets(gpui_component_assets::Assets);

    app.run(|cx| {
        // Required before any Root usage.
        gpui_component::init(cx);

        let settings = Arc::new(SettingsStore::load());
        i18n::init(settings.settings().locale.as_deref(), cx);

        let theme_settings = settings.clone();
        if let Err(err) = ThemeRegistry::watch_dir(default_themes_path(), cx, move |cx| {
            theme_settings.settings().apply_theme(None, cx);
            tracing::info!("Theme directory watch initialized");
        }) {
            tracing::warn!(
                "Failed to watch themes directory: {}. Using default themes.",
                err
            );
            settings.settings().apply_theme(None, cx);
        }

        cx.on_action(|_: &Quit, cx| {
            cx.quit();
        });

        cx.bind_keys([
            KeyBinding::new("cmd-q", Quit, None),
            KeyBinding::new("cmd-t", ToggleTheme, None),
        ]);

        cx.spawn(async move |cx| {
            cx.update(|cx| {
                let options = WindowOptions {
                    window_bounds: Some(WindowBounds::Windowed(Bounds::centered(
                        None,
                        size(px(480.), px(720.)),
                        cx,
                    ))),
                    titlebar: Some(TitlebarOptions {
                        title: Some("Chat".into()),
                        ..Default::default()
                    }),
                    ..Default::default()
                };

                let opened = cx.open_window(options, |window, cx| {
                    let shell = cx.new(|cx| DemoShell::new(settings, window, cx));
                    cx.new(|cx| Root::new(shell, window, cx))
                });

                match opened {
                    Ok(_) => cx.activate(true),
                    Err(error) => {
                        tracing::error!("failed to open main window: {}", error);
                        cx.quit();
                    }
                }
            })
        })
        .detach();
    });
}
