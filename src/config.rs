use std::collections::HashMap;
use std::env;
use std::fs;

use chrono_tz::Tz;

use crate::clients::openai_client::{DEFAULT_API_URL, DEFAULT_MODEL};
use crate::error::ConfigError;

pub const DEFAULT_CALENDAR_DB_LOCATION: &str = "./data/calendar.json";
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Values read from a `KEY=VALUE` file, as written for a shell `.env`.
#[derive(Debug, Default, Clone)]
pub struct AppConfig {
    values: HashMap<String, String>,
}

impl AppConfig {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut values = HashMap::new();
        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(ConfigError::InvalidLine {
                    line: idx + 1,
                    content: line.to_string(),
                });
            };
            let key = key.trim();
            let mut value = value.trim().to_string();
            if value.len() >= 2
                && ((value.starts_with('"') && value.ends_with('"'))
                    || (value.starts_with('\'') && value.ends_with('\'')))
            {
                value = value[1..value.len() - 1].to_string();
            }
            values.insert(key.to_string(), value);
        }
        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    /// File value first, then the process environment.
    pub fn get_prop(&self, key: &str) -> Option<String> {
        self.get(key).or_else(|| env::var(key).ok())
    }
}

#[derive(Clone)]
pub struct Settings {
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_api_url: String,
    pub calendar_db_location: String,
    pub timezone: Tz,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "<redacted>"))
            .field("openai_model", &self.openai_model)
            .field("openai_api_url", &self.openai_api_url)
            .field("calendar_db_location", &self.calendar_db_location)
            .field("timezone", &self.timezone)
            .finish()
    }
}

impl Settings {
    /// Load from the file named by `CONFIG_FILE`, if any, falling back to the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let config = match env::var("CONFIG_FILE") {
            Ok(path) => AppConfig::from_file(&path)?,
            Err(_) => AppConfig::default(),
        };
        Self::from_config(&config)
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let timezone_name = config
            .get_prop("TIMEZONE")
            .unwrap_or(DEFAULT_TIMEZONE.to_string());
        let timezone = timezone_name
            .parse::<Tz>()
            .map_err(|_| ConfigError::InvalidTimezone(timezone_name.clone()))?;

        Ok(Settings {
            openai_api_key: config.get_prop("OPENAI_API_KEY").filter(|key| !key.is_empty()),
            openai_model: config
                .get_prop("OPENAI_MODEL")
                .unwrap_or(DEFAULT_MODEL.to_string()),
            openai_api_url: config
                .get_prop("OPENAI_API_URL")
                .unwrap_or(DEFAULT_API_URL.to_string()),
            calendar_db_location: config
                .get_prop("CALENDAR_DB_LOCATION")
                .unwrap_or(DEFAULT_CALENDAR_DB_LOCATION.to_string()),
            timezone,
        })
    }

    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.openai_api_key
            .as_deref()
            .ok_or(ConfigError::Missing("OPENAI_API_KEY"))
    }
}
