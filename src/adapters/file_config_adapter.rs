//! INI file configuration adapter.
//!
//! Keys are case-insensitive. Values are read lazily through
//! [`ConfigPort`]; [`FileConfigAdapter::unknown_keys`] reports anything
//! outside the sections smacross understands.

use crate::domain::error::SmaCrossError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

/// Every `(section, key)` pair read anywhere in the crate.
pub const KNOWN_KEYS: &[(&str, &str)] = &[
    ("backtest", "code"),
    ("backtest", "start_date"),
    ("backtest", "end_date"),
    ("backtest", "short_window"),
    ("backtest", "long_window"),
    ("backtest", "initial_cash"),
    ("data", "dir"),
    ("report", "chart_path"),
    ("report", "trades_path"),
    ("report", "print_trades"),
    ("logging", "level"),
    ("logging", "format"),
];

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SmaCrossError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config.load(path).map_err(|reason| SmaCrossError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, SmaCrossError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| SmaCrossError::ConfigParse {
                file: "<inline>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    /// `[section] key` for every entry not in [`KNOWN_KEYS`], sorted.
    /// Usually a typo such as `short_windw`.
    pub fn unknown_keys(&self) -> Vec<String> {
        let mut unknown: Vec<String> = self
            .config
            .get_map_ref()
            .iter()
            .flat_map(|(section, keys)| {
                keys.keys()
                    .filter(move |key| {
                        !KNOWN_KEYS
                            .iter()
                            .any(|&(s, k)| s == section.as_str() && k == key.as_str())
                    })
                    .map(move |key| format!("[{section}] {key}"))
            })
            .collect();
        unknown.sort();
        unknown
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_ref()
            .and_then(|v| Self::parse_bool(v))
            .unwrap_or(default)
    }
}
