//! Configuration validation.
//!
//! Validates all config fields before any price data is read.

use crate::domain::backtest::{DEFAULT_LONG_WINDOW, DEFAULT_SHORT_WINDOW};
use crate::domain::error::SmaCrossError;
use crate::domain::portfolio::DEFAULT_INITIAL_CASH;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), SmaCrossError> {
    validate_initial_cash(config)?;
    validate_windows(config)?;
    validate_dates(config)?;
    validate_code(config)?;
    Ok(())
}

fn validate_initial_cash(config: &dyn ConfigPort) -> Result<(), SmaCrossError> {
    let value = config.get_double("backtest", "initial_cash", DEFAULT_INITIAL_CASH);
    if !value.is_finite() || value <= 0.0 {
        return Err(SmaCrossError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "initial_cash".to_string(),
            reason: "initial_cash must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_windows(config: &dyn ConfigPort) -> Result<(), SmaCrossError> {
    let short = config.get_int("backtest", "short_window", DEFAULT_SHORT_WINDOW as i64);
    if short < 1 {
        return Err(SmaCrossError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "short_window".to_string(),
            reason: "short_window must be at least 1".to_string(),
        });
    }
    let long = config.get_int("backtest", "long_window", DEFAULT_LONG_WINDOW as i64);
    if long < 1 {
        return Err(SmaCrossError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "long_window".to_string(),
            reason: "long_window must be at least 1".to_string(),
        });
    }
    if short >= long {
        return Err(SmaCrossError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "short_window".to_string(),
            reason: "short_window must be less than long_window".to_string(),
        });
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), SmaCrossError> {
    let start_str = config.get_string("backtest", "start_date");
    let end_str = config.get_string("backtest", "end_date");

    let start_date = parse_date(start_str.as_deref(), "start_date")?;
    let end_date = parse_date(end_str.as_deref(), "end_date")?;

    if start_date >= end_date {
        return Err(SmaCrossError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "start_date".to_string(),
            reason: "start_date must be before end_date".to_string(),
        });
    }
    Ok(())
}

pub fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, SmaCrossError> {
    match value {
        None => Err(SmaCrossError::ConfigMissing {
            section: "backtest".to_string(),
            key: field.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            SmaCrossError::ConfigInvalid {
                section: "backtest".to_string(),
                key: field.to_string(),
                reason: format!("invalid {} format, expected YYYY-MM-DD", field),
            }
        }),
    }
}

fn validate_code(config: &dyn ConfigPort) -> Result<(), SmaCrossError> {
    match config.get_string("backtest", "code") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(SmaCrossError::ConfigMissing {
            section: "backtest".to_string(),
            key: "code".to_string(),
        }),
    }
}
