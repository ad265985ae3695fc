use std::{fs, path::Path};

use anyhow::{bail, Context};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_CATALOG_URL: &str = "http://localhost:9092/api/cars";
pub const DEFAULT_BOOKING_URL: &str = "http://localhost:9091/api/bookings";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub catalog_url: String,
    pub booking_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.into(),
            booking_url: DEFAULT_BOOKING_URL.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    catalog_url: Option<String>,
    booking_url: Option<String>,
}

/// Defaults, then `config_path` if it exists, then environment overrides.
pub fn load_settings(config_path: &Path) -> Settings {
    let raw = fs::read_to_string(config_path).ok();
    layer_settings(raw.as_deref(), |key| std::env::var(key).ok())
}

fn layer_settings(raw_file: Option<&str>, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = raw_file {
        match toml::from_str::<FileSettings>(raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.catalog_url {
                    settings.catalog_url = v;
                }
                if let Some(v) = file_cfg.booking_url {
                    settings.booking_url = v;
                }
            }
            Err(err) => tracing::warn!(error = %err, "ignoring unreadable booking config file"),
        }
    }

    if let Some(v) = env("BOOKING_CATALOG_URL") {
        settings.catalog_url = v;
    }
    if let Some(v) = env("APP__CATALOG_URL") {
        settings.catalog_url = v;
    }

    if let Some(v) = env("BOOKING_URL") {
        settings.booking_url = v;
    }
    if let Some(v) = env("APP__BOOKING_URL") {
        settings.booking_url = v;
    }

    settings
}

pub fn parse_endpoint(raw: &str, name: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("invalid {name} url '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("{name} url '{raw}' must use http or https");
    }
    Ok(url)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
