//! Configuration validation.
//!
//! Validates all config fields before a schedule run.

use crate::domain::error::WeekrotError;
use crate::domain::rotation::TimingConvention;
use crate::ports::config_port::ConfigPort;

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), WeekrotError> {
    validate_symbols(config)?;
    validate_warmup_days(config)?;
    validate_take_profit(config)?;
    validate_timing(config)?;
    Ok(())
}

fn validate_symbols(config: &dyn ConfigPort) -> Result<(), WeekrotError> {
    let symbol = config
        .get_string("strategy", "symbol")
        .ok_or_else(|| WeekrotError::ConfigMissing {
            section: "strategy".to_string(),
            key: "symbol".to_string(),
        })?;
    let benchmark = config
        .get_string("strategy", "benchmark")
        .ok_or_else(|| WeekrotError::ConfigMissing {
            section: "strategy".to_string(),
            key: "benchmark".to_string(),
        })?;

    if symbol.trim().is_empty() {
        return Err(WeekrotError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "symbol".to_string(),
            reason: "symbol must not be empty".to_string(),
        });
    }
    if symbol.trim().eq_ignore_ascii_case(benchmark.trim()) {
        return Err(WeekrotError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "benchmark".to_string(),
            reason: "benchmark must differ from the traded symbol".to_string(),
        });
    }
    Ok(())
}

fn validate_warmup_days(config: &dyn ConfigPort) -> Result<(), WeekrotError> {
    let value = config.get_int("strategy", "warmup_days", 20);
    if value < 0 {
        return Err(WeekrotError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "warmup_days".to_string(),
            reason: "warmup_days must be non-negative".to_string(),
        });
    }
    Ok(())
}

fn validate_take_profit(config: &dyn ConfigPort) -> Result<(), WeekrotError> {
    for key in ["take_profit_pct", "legacy_take_profit_pct"] {
        let value = config.get_double("strategy", key, 0.07);
        if value <= 0.0 {
            return Err(WeekrotError::ConfigInvalid {
                section: "strategy".to_string(),
                key: key.to_string(),
                reason: format!("{key} must be positive"),
            });
        }
    }
    Ok(())
}

fn validate_timing(config: &dyn ConfigPort) -> Result<(), WeekrotError> {
    let value = config
        .get_string("strategy", "timing")
        .unwrap_or_else(|| "prior_close".to_string());
    if TimingConvention::parse(value.trim()).is_none() {
        return Err(WeekrotError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "timing".to_string(),
            reason: format!(
                "unrecognized timing '{value}' (expected prior_close or same_close_deferred)"
            ),
        });
    }
    Ok(())
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), WeekrotError> {
    match config.get_string("data", "path") {
        Some(p) if !p.trim().is_empty() => Ok(()),
        Some(_) => Err(WeekrotError::ConfigInvalid {
            section: "data".to_string(),
            key: "path".to_string(),
            reason: "path must not be empty".to_string(),
        }),
        None => Err(WeekrotError::ConfigMissing {
            section: "data".to_string(),
            key: "path".to_string(),
        }),
    }
}
