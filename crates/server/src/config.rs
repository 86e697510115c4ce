use std::{fs, time::Duration};

use client_core::WeatherSource;
use genai_integration::gemini::{DEFAULT_BASE_URL, DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL};
use shared::domain::PLACEHOLDER_IMAGE_URL;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_bind: String,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub text_model: String,
    pub image_model: String,
    pub debounce_ms: u64,
    pub weather_source: WeatherSource,
    pub placeholder_image_url: String,
    pub log_level: String,
    pub request_body_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:9002".into(),
            gemini_api_key: None,
            gemini_base_url: DEFAULT_BASE_URL.into(),
            text_model: DEFAULT_TEXT_MODEL.into(),
            image_model: DEFAULT_IMAGE_MODEL.into(),
            debounce_ms: 500,
            weather_source: WeatherSource::Random,
            placeholder_image_url: PLACEHOLDER_IMAGE_URL.into(),
            log_level: "info".into(),
            request_body_limit: 64 * 1024,
        }
    }
}

impl Settings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

pub fn load_settings() -> Settings {
    let file = fs::read_to_string("server.toml").ok();
    load_settings_from(file.as_deref(), |key| std::env::var(key).ok())
}

/// Defaults, then `server.toml` contents, then environment variables. Later
/// names in each env list win over earlier ones.
pub fn load_settings_from(file: Option<&str>, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = file {
        match toml::from_str::<toml::Table>(raw) {
            Ok(table) => apply(&mut settings, |key| file_value(&table, key)),
            Err(error) => warn!(%error, "ignoring unreadable server.toml"),
        }
    }

    apply(&mut settings, |key| {
        ENV_NAMES
            .iter()
            .filter(|(field, _)| *field == key)
            .filter_map(|(_, name)| env(name))
            .last()
    });

    settings
}

const ENV_NAMES: &[(&str, &str)] = &[
    ("bind_addr", "SERVER_BIND"),
    ("bind_addr", "APP__BIND_ADDR"),
    ("gemini_api_key", "GOOGLE_API_KEY"),
    ("gemini_api_key", "GEMINI_API_KEY"),
    ("gemini_api_key", "APP__GEMINI_API_KEY"),
    ("gemini_base_url", "APP__GEMINI_BASE_URL"),
    ("text_model", "APP__TEXT_MODEL"),
    ("image_model", "APP__IMAGE_MODEL"),
    ("debounce_ms", "APP__DEBOUNCE_MS"),
    ("weather_source", "APP__WEATHER_SOURCE"),
    ("placeholder_image_url", "APP__PLACEHOLDER_IMAGE_URL"),
    ("log_level", "APP__LOG_LEVEL"),
    ("request_body_limit", "APP__REQUEST_BODY_LIMIT"),
];

fn file_value(table: &toml::Table, key: &str) -> Option<String> {
    match table.get(key)? {
        toml::Value::String(value) => Some(value.clone()),
        toml::Value::Integer(value) => Some(value.to_string()),
        other => {
            warn!(key, value = %other, "ignoring non-scalar setting");
            None
        }
    }
}

fn apply(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("bind_addr") {
        settings.server_bind = v;
    }
    if let Some(v) = lookup("gemini_api_key") {
        let v = v.trim();
        if !v.is_empty() {
            settings.gemini_api_key = Some(v.to_string());
        }
    }
    if let Some(v) = lookup("gemini_base_url") {
        settings.gemini_base_url = v;
    }
    if let Some(v) = lookup("text_model") {
        settings.text_model = v;
    }
    if let Some(v) = lookup("image_model") {
        settings.image_model = v;
    }
    if let Some(v) = lookup("debounce_ms") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.debounce_ms = parsed;
        }
    }
    if let Some(v) = lookup("weather_source") {
        match v.parse::<WeatherSource>() {
            Ok(source) => settings.weather_source = source,
            Err(error) => warn!(%error, "keeping default weather source"),
        }
    }
    if let Some(v) = lookup("placeholder_image_url") {
        settings.placeholder_image_url = v;
    }
    if let Some(v) = lookup("log_level") {
        settings.log_level = v;
    }
    if let Some(v) = lookup("request_body_limit") {
        if let Ok(parsed) = v.trim().parse::<usize>() {
            settings.request_body_limit = parsed;
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
