use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use time::UtcOffset;
use url::Url;

use super::date_format::{DateFormat, parse_format};
use super::search::{SearchConfig, validate_search_config};
use super::timezone::parse_timezone;

pub const CONFIG_FILE: &str = "canopy.yaml";

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub name: String,
    pub title: Option<String>,
    pub description: String,
    pub base_url: String,
    pub nav: Vec<NavEntry>,
    pub output_dir: String,
    pub date_format: String,
    pub default_timezone: String,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, JsonValue>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct NavEntry {
    pub title: String,
    pub url: String,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Config =
            serde_yaml::from_str(&raw).with_context(|| invalid_yaml_message(path))?;
        config.validate(path)?;
        Ok(config)
    }

    pub fn validate(&self, origin: &Path) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("{}: name must not be empty", origin.display());
        }
        validate_url(&self.base_url, origin)?;
        if self.output_dir.trim().is_empty() {
            bail!("{}: output_dir must not be empty", origin.display());
        }
        for entry in &self.nav {
            if entry.url.trim().is_empty() {
                bail!(
                    "{}: nav entry '{}' has an empty url",
                    origin.display(),
                    entry.title
                );
            }
        }
        validate_format(&self.date_format, origin)?;
        validate_timezone(&self.default_timezone, origin)?;
        validate_search_config(&self.search, origin)?;
        Ok(())
    }

    /// Title shown in layouts and feeds; falls back to the site name.
    pub fn site_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|title| !title.trim().is_empty())
            .unwrap_or(&self.name)
    }

    pub fn default_offset(&self) -> Result<UtcOffset> {
        parse_timezone(&self.default_timezone)
    }

    pub fn display_format(&self) -> Result<DateFormat> {
        parse_format(&self.date_format)
            .with_context(|| format!("invalid date_format '{}'", self.date_format))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: "canopy".to_string(),
            title: None,
            description: String::new(),
            base_url: "https://example.com".to_string(),
            nav: Vec::new(),
            output_dir: "public".to_string(),
            date_format: "[year]-[month]-[day]".to_string(),
            default_timezone: "+00:00".to_string(),
            search: SearchConfig::default(),
            extra: serde_json::Map::new(),
        }
    }
}

fn invalid_yaml_message(path: &Path) -> String {
    format!("{}: invalid YAML", path.display())
}

fn validate_url(value: &str, origin: &Path) -> Result<()> {
    if value.trim().is_empty() {
        bail!("{}: base_url must not be empty", origin.display());
    }
    let url = Url::parse(value)
        .with_context(|| format!("{}: base_url must be an absolute URL", origin.display()))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("{}: base_url must use http or https", origin.display());
    }
    Ok(())
}

fn validate_format(value: &str, origin: &Path) -> Result<()> {
    parse_format(value).with_context(|| {
        format!(
            "{}: date_format '{}' is invalid (see https://docs.rs/time/latest/time/format_description)",
            origin.display(), value
        )
    })?;
    Ok(())
}

fn validate_timezone(value: &str, origin: &Path) -> Result<()> {
    parse_timezone(value).with_context(|| {
        format!(
            "{}: default_timezone '{}' is invalid (expected offset like +00:00)",
            origin.display(),
            value
        )
    })?;
    Ok(())
}
