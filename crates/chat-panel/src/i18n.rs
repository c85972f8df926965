use std::collections::HashMap;
use std::env;

use gpui::{App, Global};
use serde_json::Value;

pub const DEFAULT_LOCALE: &str = "en";

pub const PLACEHOLDER_KEY: &str = "chat.input.placeholder";
pub const SEND_KEY: &str = "chat.input.send";
pub const ATTACH_KEY: &str = "chat.input.attach";
pub const SEARCH_KEY: &str = "chat.header.search";
pub const MORE_KEY: &str = "chat.header.more";

const LOCALE_ENV_VARS: [&str; 3] = ["LC_ALL", "LC_MESSAGES", "LANG"];

/// Localized UI strings for one locale.
#[derive(Clone, Debug)]
pub struct I18n {
    locale: String,
    messages: HashMap<String, String>,
}

impl Global for I18n {}

impl I18n {
    /// Loads the bundled catalog for `locale`, falling back to English.
    pub fn load(locale: &str) -> Self {
        let locale = normalize_locale(locale).unwrap_or_else(|| DEFAULT_LOCALE.to_string());
        let messages = parse_catalog(&locale, catalog_source(&locale));
        Self { locale, messages }
    }

    pub fn english() -> Self {
        Self::load(DEFAULT_LOCALE)
    }

    /// Returns the installed global catalog, or English when none is set.
    pub fn current(cx: &App) -> Self {
        cx.try_global::<Self>()
            .cloned()
            .unwrap_or_else(Self::english)
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Unknown keys are returned verbatim.
    pub fn t(&self, key: &str) -> String {
        self.messages
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    pub fn format(&self, key: &str, params: &[(&str, &str)]) -> String {
        let mut value = self.t(key);
        for (param, replacement) in params {
            value = value.replace(&format!("{{{param}}}"), replacement);
        }
        value
    }
}

/// Installs the catalog for `locale`, or the environment's locale when `None`.
pub fn init(locale: Option<&str>, cx: &mut App) {
    let locale = locale
        .and_then(normalize_locale)
        .unwrap_or_else(|| detect_locale(|key| env::var(key).ok()));
    let i18n = I18n::load(&locale);
    tracing::debug!(locale = i18n.locale(), "installed ui catalog");
    cx.set_global(i18n);
}

/// Picks the first non-empty locale variable reported by `lookup`.
pub fn detect_locale(lookup: impl Fn(&str) -> Option<String>) -> String {
    LOCALE_ENV_VARS
        .iter()
        .filter_map(|key| lookup(key))
        .find_map(|value| normalize_locale(&value))
        .unwrap_or_else(|| DEFAULT_LOCALE.to_string())
}

/// Turns `de-DE.UTF-8` style values into `de_de`.
pub fn normalize_locale(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let normalized = trimmed
        .split('.')
        .next()
        .unwrap_or(trimmed)
        .replace('-', "_")
        .to_lowercase();

    // POSIX "C" locales carry no language.
    if normalized.is_empty() || normalized == "c" || normalized == "posix" {
        None
    } else {
        Some(normalized)
    }
}

fn catalog_source(locale: &str) -> &'static str {
    if locale.starts_with("es") {
        include_str!("../i18n/es.json")
    } else if locale.starts_with("de") {
        include_str!("../i18n/de.json")
    } else {
        include_str!("../i18n/en.json")
    }
}

fn parse_catalog(locale: &str, raw: &str) -> HashMap<String, String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map
            .into_iter()
            .filter_map(|(key, value)| value.as_str().map(|text| (key, text.to_string())))
            .collect(),
        Ok(_) => {
            tracing::warn!(locale, "ui catalog is not a json object, using keys");
            HashMap::new()
        }
        Err(error) => {
            tracing::warn!(locale, %error, "failed to parse ui catalog, using keys");
            HashMap::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_encoding_and_separators() {
        assert_eq!(normalize_locale("de-DE.UTF-8").as_deref(), Some("de_de"));
        assert_eq!(normalize_locale(" en_US ").as_deref(), Some("en_us"));
        assert_eq!(normalize_locale(""), None);
        assert_eq!(normalize_locale("C.UTF-8"), None);
        assert_eq!(normalize_locale("POSIX"), None);
    }

    #[test]
    fn detection_skips_empty_variables_in_priority_order() {
        let locale = detect_locale(|key| match key {
            "LC_ALL" => Some("  ".to_string()),
            "LC_MESSAGES" => None,
            "LANG" => Some("es_ES.UTF-8".to_string()),
            _ => None,
        });
        assert_eq!(locale, "es_es");

        assert_eq!(detect_locale(|_| None), DEFAULT_LOCALE);
    }

    #[test]
    fn default_placeholder_is_localized() {
        assert_eq!(I18n::english().t(PLACEHOLDER_KEY), "Type your message...");
        assert_eq!(I18n::load("es_MX").t(PLACEHOLDER_KEY), "Escribe tu mensaje...");
        assert_eq!(I18n::load("de").t(PLACEHOLDER_KEY), "Nachricht eingeben...");
    }

    #[test]
    fn unknown_locale_and_keys_fall_back() {
        let i18n = I18n::load("fr_FR");

        assert_eq!(i18n.locale(), "fr_fr");
        assert_eq!(i18n.t(SEND_KEY), "Send");
        assert_eq!(i18n.t("chat.missing"), "chat.missing");
    }

    #[test]
    fn bundled_catalogs_share_keys() {
        let english = parse_catalog("en", include_str!("../i18n/en.json"));
        for locale in ["es", "de"] {
            let catalog = parse_catalog(locale, catalog_source(locale));
            let mut missing = english
                .keys()
                .filter(|key| !catalog.contains_key(*key))
                .collect::<Vec<_>>();
            missing.sort();
            assert!(missing.is_empty(), "{locale} catalog is missing {missing:?}");
        }
    }

    #[test]
    fn format_substitutes_named_params() {
        let i18n = I18n::english();

        assert_eq!(
            i18n.format("demo.reply", &[("message", "hi")]),
            "You said: hi"
        );
    }

    #[test]
    fn malformed_catalog_degrades_to_keys() {
        assert!(parse_catalog("xx", "[1, 2]").is_empty());
        assert!(parse_catalog("xx", "{not json").is_empty());
    }
}
