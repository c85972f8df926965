use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized},
};
use gpui::{App, SharedString, Window};
use gpui_component::{Theme, ThemeMode, ThemeRegistry};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use snafu::{ResultExt, Snafu};

pub const SETTINGS_DIRECTORY_NAME: &str = "chat-panel";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const ENV_PREFIX: &str = "CHAT_PANEL_";
pub const DEFAULT_REPLY_DELAY_MS: u64 = 900;
pub const MAX_REPLY_DELAY_MS: u64 = 10_000;

/// Configuration for the demo shell hosting the panel.
///
/// Empty strings mean "use the localized default" for title, subtitle and
/// placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellSettings {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(
        default = "default_theme_mode",
        serialize_with = "serialize_theme_mode",
        deserialize_with = "deserialize_theme_mode"
    )]
    pub theme_mode: ThemeMode,
    #[serde(default)]
    pub theme_name: String,
    #[serde(default = "default_reply_delay_ms")]
    pub reply_delay_ms: u64,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            title: String::new(),
            subtitle: String::new(),
            placeholder: None,
            locale: None,
            theme_mode: default_theme_mode(),
            theme_name: String::new(),
            reply_delay_ms: default_reply_delay_ms(),
        }
    }
}

impl ShellSettings {
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.subtitle = self.subtitle.trim().to_string();
        self.placeholder = non_blank(self.placeholder);
        self.locale = non_blank(self.locale);
        self.theme_name = self.theme_name.trim().to_string();
        self.reply_delay_ms = self.reply_delay_ms.min(MAX_REPLY_DELAY_MS);
        self
    }

    pub fn placeholder(&self) -> Option<SharedString> {
        self.placeholder.clone().map(SharedString::from)
    }

    /// Returns a copy with the light/dark mode flipped.
    pub fn with_toggled_theme(&self) -> Self {
        let mut next = self.clone();
        next.theme_mode = if self.theme_mode.is_dark() {
            ThemeMode::Light
        } else {
            ThemeMode::Dark
        };
        next
    }

    pub fn apply_theme(&self, window: Option<&mut Window>, cx: &mut App) {
        if let Some(theme_config) = ThemeRegistry::global(cx)
            .themes()
            .get(&SharedString::from(self.theme_name.clone()))
            .cloned()
        {
            let theme = Theme::global_mut(cx);
            if theme_config.mode.is_dark() {
                theme.dark_theme = theme_config;
            } else {
                theme.light_theme = theme_config;
            }
        }

        Theme::change(self.theme_mode, window, cx);
    }
}

/// Live settings snapshot backed by a JSON file.
pub struct SettingsStore {
    settings: Arc<ArcSwap<ShellSettings>>,
    config_path: PathBuf,
}

impl SettingsStore {
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|path| path.join(SETTINGS_DIRECTORY_NAME))
            .unwrap_or_else(|| PathBuf::from(".chat-panel"))
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join(SETTINGS_FILE_NAME)
    }

    pub fn new(config_path: PathBuf) -> Self {
        let settings = Self::load_from_disk(&config_path);
        Self {
            settings: Arc::new(ArcSwap::from_pointee(settings)),
            config_path,
        }
    }

    pub fn load() -> Self {
        Self::new(Self::default_config_path())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn settings(&self) -> Arc<ShellSettings> {
        self.settings.load_full()
    }

    /// Applies `change` to the file layer, writes it and reloads the live snapshot.
    ///
    /// `CHAT_PANEL_*` overrides stay in the environment and never reach the file.
    pub fn update(
        &self,
        change: impl FnOnce(ShellSettings) -> ShellSettings,
    ) -> Result<Arc<ShellSettings>, SettingsError> {
        let file_settings = change(Self::load_file_layer(&self.config_path)).normalized();
        self.persist(&file_settings)?;

        let settings = Arc::new(Self::load_from_disk(&self.config_path));
        self.settings.store(settings.clone());
        Ok(settings)
    }

    /// Layers defaults and the JSON file.
    pub fn file_figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(ShellSettings::default())).merge(Json::file(path))
    }

    /// Layers defaults, the JSON file and `CHAT_PANEL_*` variables.
    pub fn figment(path: &Path) -> Figment {
        Self::file_figment(path).merge(Env::prefixed(ENV_PREFIX))
    }

    fn load_file_layer(path: &Path) -> ShellSettings {
        match Self::file_figment(path).extract::<ShellSettings>() {
            Ok(settings) => settings.normalized(),
            Err(error) => {
                tracing::warn!(
                    "settings file {:?} is unreadable, rewriting from defaults: {}",
                    path,
                    error
                );
                ShellSettings::default()
            }
        }
    }

    fn load_from_disk(path: &Path) -> ShellSettings {
        if !path.exists() {
            tracing::info!("settings file not found at {:?}, using defaults", path);
        }

        match Self::figment(path).extract::<ShellSettings>() {
            Ok(settings) => settings.normalized(),
            Err(error) => {
                tracing::warn!(
                    "failed to parse settings from {:?}: {}. using defaults",
                    path,
                    error
                );
                ShellSettings::default()
            }
        }
    }

    fn persist(&self, settings: &ShellSettings) -> Result<(), SettingsError> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).context(CreateDirSnafu {
                stage: "create-settings-directory",
                path: parent.to_path_buf(),
            })?;
        }

        let content = serde_json::to_string_pretty(settings).context(SerializeConfigSnafu {
            stage: "serialize-settings-json",
        })?;

        let temp_path = self.config_path.with_extension("json.tmp");
        std::fs::write(&temp_path, content).context(WriteFileSnafu {
            stage: "write-temporary-settings-file",
            path: temp_path.clone(),
        })?;

        std::fs::rename(&temp_path, &self.config_path).context(RenameTempFileSnafu {
            stage: "rename-temporary-settings-file",
            from: temp_path,
            to: self.config_path.clone(),
        })?;

        tracing::info!("saved settings to {:?}", self.config_path);
        Ok(())
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SettingsError {
    #[snafu(display("failed to create settings directory at {path:?} on `{stage}`: {source}"))]
    CreateDir {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("failed to serialize settings on `{stage}`: {source}"))]
    SerializeConfig {
        stage: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("failed to write settings file at {path:?} on `{stage}`: {source}"))]
    WriteFile {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display(
        "failed to replace settings file from {from:?} to {to:?} on `{stage}`: {source}"
    ))]
    RenameTempFile {
        stage: &'static str,
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn default_theme_mode() -> ThemeMode {
    ThemeMode::Light
}

fn default_reply_delay_ms() -> u64 {
    DEFAULT_REPLY_DELAY_MS
}

fn serialize_theme_mode<S>(value: &ThemeMode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(value.name())
}

fn deserialize_theme_mode<'de, D>(deserializer: D) -> Result<ThemeMode, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(parse_theme_mode(&value))
}

fn parse_theme_mode(value: &str) -> ThemeMode {
    if value.trim().eq_ignore_ascii_case("dark") {
        ThemeMode::Dark
    } else {
        ThemeMode::Light
    }
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    // Store tests touch process env; `Jail` serializes them.

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|jail| {
            let store = SettingsStore::new(jail.directory().join(SETTINGS_FILE_NAME));

            let settings = store.settings();
            assert_eq!(settings.reply_delay_ms, DEFAULT_REPLY_DELAY_MS);
            assert!(settings.title.is_empty());
            assert_eq!(settings.placeholder, None);
            assert!(!settings.theme_mode.is_dark());
            Ok(())
        });
    }

    #[test]
    fn partial_file_merges_over_defaults_and_normalizes() {
        Jail::expect_with(|jail| {
            jail.create_file(
                SETTINGS_FILE_NAME,
                r#"{ "title": "  Support  ", "placeholder": "   ", "theme_mode": "Dark", "reply_delay_ms": 60000 }"#,
            )?;

            let settings = SettingsStore::new(jail.directory().join(SETTINGS_FILE_NAME)).settings();

            assert_eq!(settings.title, "Support");
            assert_eq!(settings.placeholder, None);
            assert!(settings.theme_mode.is_dark());
            assert_eq!(settings.reply_delay_ms, MAX_REPLY_DELAY_MS);
            assert_eq!(settings.subtitle, "");
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_file_and_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                SETTINGS_FILE_NAME,
                r#"{ "title": "File title", "theme_mode": "light", "reply_delay_ms": 250 }"#,
            )?;
            jail.set_env("CHAT_PANEL_REPLY_DELAY_MS", "60000");
            jail.set_env("CHAT_PANEL_THEME_MODE", "dark");
            jail.set_env("CHAT_PANEL_SUBTITLE", "  From env  ");

            let settings = SettingsStore::new(jail.directory().join(SETTINGS_FILE_NAME)).settings();

            assert_eq!(settings.reply_delay_ms, MAX_REPLY_DELAY_MS);
            assert!(settings.theme_mode.is_dark());
            assert_eq!(settings.subtitle, "From env");
            assert_eq!(settings.title, "File title");
            Ok(())
        });
    }

    #[test]
    fn environment_override_applies_without_a_file() {
        Jail::expect_with(|jail| {
            jail.set_env("CHAT_PANEL_REPLY_DELAY_MS", "40");

            let settings = SettingsStore::new(jail.directory().join(SETTINGS_FILE_NAME)).settings();

            assert_eq!(settings.reply_delay_ms, 40);
            assert!(!settings.theme_mode.is_dark());
            Ok(())
        });
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(SETTINGS_FILE_NAME, "{ this is not json")?;

            assert_eq!(
                *SettingsStore::new(jail.directory().join(SETTINGS_FILE_NAME)).settings(),
                ShellSettings::default()
            );
            Ok(())
        });
    }

    #[test]
    fn update_persists_and_reloads() {
        Jail::expect_with(|jail| {
            let path = jail.directory().join("nested").join(SETTINGS_FILE_NAME);
            let store = SettingsStore::new(path.clone());

            let live = store
                .update(|settings| {
                    ShellSettings {
                        subtitle: "Online".to_string(),
                        placeholder: Some(" Ask away ".to_string()),
                        ..settings
                    }
                    .with_toggled_theme()
                })
                .unwrap();

            assert_eq!(live.placeholder.as_deref(), Some("Ask away"));
            assert_eq!(store.settings(), live);
            assert!(!path.with_extension("json.tmp").exists());

            let reloaded = SettingsStore::new(path).settings();
            assert_eq!(reloaded.subtitle, "Online");
            assert_eq!(reloaded.placeholder.as_deref(), Some("Ask away"));
            assert!(reloaded.theme_mode.is_dark());
            Ok(())
        });
    }

    #[test]
    fn theme_toggle_keeps_environment_out_of_the_file() {
        Jail::expect_with(|jail| {
            let path = jail.directory().join(SETTINGS_FILE_NAME);
            jail.create_file(SETTINGS_FILE_NAME, r#"{ "subtitle": "Online" }"#)?;
            jail.set_env("CHAT_PANEL_TITLE", "Temp");
            let store = SettingsStore::new(path.clone());
            assert_eq!(store.settings().title, "Temp");

            let live = store.update(|settings| settings.with_toggled_theme()).unwrap();

            assert_eq!(live.title, "Temp");
            assert!(live.theme_mode.is_dark());

            let written = std::fs::read_to_string(&path).unwrap();
            assert!(!written.contains("Temp"), "env value leaked into {written}");

            let file_layer: ShellSettings = SettingsStore::file_figment(&path).extract()?;
            assert_eq!(file_layer.title, "");
            assert_eq!(file_layer.subtitle, "Online");
            assert!(file_layer.theme_mode.is_dark());
            Ok(())
        });
    }

    #[test]
    fn update_reports_unwritable_directory() {
        Jail::expect_with(|jail| {
            jail.create_file("blocker", "")?;
            let store = SettingsStore::new(jail.directory().join("blocker").join(SETTINGS_FILE_NAME));

            let error = store.update(|settings| settings).unwrap_err();

            assert!(matches!(
                error,
                SettingsError::CreateDir {
                    stage: "create-settings-directory",
                    ..
                }
            ));
            Ok(())
        });
    }

    #[test]
    fn theme_toggle_flips_mode() {
        let light = ShellSettings::default();
        let dark = light.with_toggled_theme();

        assert!(dark.theme_mode.is_dark());
        assert!(!dark.with_toggled_theme().theme_mode.is_dark());
    }
}
