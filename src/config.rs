use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;
use crate::service::change_message_service::DEFAULT_HEADER;
use crate::service::snapshot_store::DEFAULT_DATA_FILE;
use crate::tasks::check_loop::DEFAULT_CHECK_INTERVAL;

pub const DEFAULT_CONFIG_FILE: &str = ".env";

/// Values from a dotenv-style `KEY=VALUE` file.
#[derive(Debug, Default, Clone)]
pub struct AppConfig {
    values: HashMap<String, String>,
}

impl AppConfig {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::File {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        Self::parse(&content).map_err(|reason| ConfigError::File {
            path: path.to_string(),
            reason,
        })
    }

    /// Loads `CONFIG_FILE` when set, otherwise `.env` if present.
    pub fn discover(config_file: Option<String>) -> Result<Self, ConfigError> {
        match config_file {
            Some(path) => Self::from_file(&path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        let mut values = HashMap::new();
        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(format!("Invalid config line {}: {}", idx + 1, line));
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
}

/// Settings the bot needs to run.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub discord_token: String,
    pub channel_id: u64,
    pub webcal_url: String,
    pub data_file: String,
    pub check_interval: Duration,
    pub announcement_header: String,
}

impl BotConfig {
    /// Builds the config from a key lookup (file first, then environment in
    /// `main`). Empty values count as missing.
    pub fn from_lookup<F>(get_prop: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| get_prop(key).filter(|v| !v.trim().is_empty());

        let discord_token = get("DISCORD_TOKEN")
            .or_else(|| get("TOKEN"))
            .ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let raw_channel = get("CHANNEL_ID").ok_or(ConfigError::Missing("CHANNEL_ID"))?;
        let channel_id = raw_channel
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|id| *id != 0)
            .ok_or_else(|| ConfigError::Invalid {
                key: "CHANNEL_ID",
                reason: format!("expected a Discord channel id, got {raw_channel:?}"),
            })?;

        let webcal_url = get("WEBCAL_URL").ok_or(ConfigError::Missing("WEBCAL_URL"))?;

        let data_file = get("DATA_FILE").unwrap_or_else(|| DEFAULT_DATA_FILE.to_string());

        let check_interval = match get("CHECK_INTERVAL_SECONDS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| ConfigError::Invalid {
                    key: "CHECK_INTERVAL_SECONDS",
                    reason: format!("expected a positive number of seconds, got {raw:?}"),
                })?,
            None => DEFAULT_CHECK_INTERVAL,
        };

        let announcement_header =
            get("ANNOUNCEMENT_HEADER").unwrap_or_else(|| DEFAULT_HEADER.to_string());

        Ok(Self {
            discord_token,
            channel_id,
            webcal_url,
            data_file,
            check_interval,
            announcement_header,
        })
    }
}
