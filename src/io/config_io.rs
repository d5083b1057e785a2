use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("could not parse nextup.toml: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Configuration from nextup.toml, all sections optional.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub reminders: ReminderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataConfig {
    /// Data file name, relative to the data directory
    #[serde(default = "default_data_file")]
    pub file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReminderConfig {
    /// Poll interval for `nx watch`, in seconds
    #[serde(default = "default_poll_secs")]
    pub poll_secs: u64,
    /// Default snooze offset, in minutes
    #[serde(default = "default_snooze_minutes")]
    pub snooze_minutes: i64,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            file: default_data_file(),
        }
    }
}

impl Default for ReminderConfig {
    fn default() -> Self {
        ReminderConfig {
            poll_secs: default_poll_secs(),
            snooze_minutes: default_snooze_minutes(),
        }
    }
}

fn default_data_file() -> String {
    "nextup.json".to_string()
}

fn default_poll_secs() -> u64 {
    crate::ops::reminder::POLL_INTERVAL.as_secs()
}

fn default_snooze_minutes() -> i64 {
    10
}

/// Read nextup.toml from the data directory. A missing file means defaults.
pub fn read_config(data_dir: &Path) -> Result<Config, ConfigError> {
    let path = data_dir.join("nextup.toml");
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(e) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                source: e,
            });
        }
    };
    Ok(toml::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_config_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = read_config(dir.path()).unwrap();
        assert_eq!(config.reminders.poll_secs, 30);
        assert_eq!(config.reminders.snooze_minutes, 10);
        assert_eq!(config.data.file, "nextup.json");
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("nextup.toml"),
            "[reminders]\npoll_secs = 5\n",
        )
        .unwrap();
        let config = read_config(dir.path()).unwrap();
        assert_eq!(config.reminders.poll_secs, 5);
        assert_eq!(config.reminders.snooze_minutes, 10);
        assert_eq!(config.data.file, "nextup.json");
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("nextup.toml"), "reminders = nope").unwrap();
        assert!(matches!(
            read_config(dir.path()),
            Err(ConfigError::Parse(_))
        ));
    }
}
