//! Configuration validation.
//!
//! Validates all config fields before a screening run. Missing keys fall back
//! to their defaults and are not errors; present keys must be well formed.
//! Window values replaced by command-line overrides are checked in their
//! overridden form.

use crate::domain::analysis::DEFAULT_LOOKBACK_DAYS;
use crate::domain::error::ScreenerError;
use crate::domain::portfolio::{parse_entries, Portfolio};
use crate::domain::signal::{DEFAULT_LONG_WINDOW, DEFAULT_SHORT_WINDOW};
use crate::ports::config_port::ConfigPort;

pub const PORTFOLIO_SECTION_PREFIX: &str = "portfolio.";
pub const DATA_SOURCES: &[&str] = &["csv", "yahoo"];
pub const DEFAULT_FETCH_TIMEOUT_SECS: i64 = 30;

/// Command-line values that take precedence over `[analysis]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalysisOverrides {
    pub short_window: Option<usize>,
    pub long_window: Option<usize>,
}

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    validate_config_with(config, AnalysisOverrides::default())
}

pub fn validate_config_with(
    config: &dyn ConfigPort,
    overrides: AnalysisOverrides,
) -> Result<(), ScreenerError> {
    let short = window(config, "short_window", DEFAULT_SHORT_WINDOW, overrides.short_window);
    let long = window(config, "long_window", DEFAULT_LONG_WINDOW, overrides.long_window);
    validate_windows(short, long)?;
    validate_lookback(config, short)?;
    validate_timeout(config)?;
    validate_source(config)?;
    validate_portfolios(config)?;
    validate_active_portfolio(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> ScreenerError {
    ScreenerError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn window(
    config: &dyn ConfigPort,
    key: &str,
    default: usize,
    override_value: Option<usize>,
) -> i64 {
    match override_value {
        Some(v) => i64::try_from(v).unwrap_or(i64::MAX),
        None => config.get_int("analysis", key, default as i64),
    }
}

fn validate_windows(short: i64, long: i64) -> Result<(), ScreenerError> {
    if short < 1 {
        return Err(invalid("analysis", "short_window", "short_window must be at least 1"));
    }
    if long <= short {
        return Err(invalid(
            "analysis",
            "long_window",
            "long_window must be greater than short_window",
        ));
    }
    Ok(())
}

fn validate_lookback(config: &dyn ConfigPort, short: i64) -> Result<(), ScreenerError> {
    let lookback = config.get_int("analysis", "lookback_days", DEFAULT_LOOKBACK_DAYS as i64);
    if lookback < short {
        return Err(invalid(
            "analysis",
            "lookback_days",
            "lookback_days must be at least short_window",
        ));
    }
    Ok(())
}

fn validate_timeout(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    if config.get_int("analysis", "fetch_timeout_secs", DEFAULT_FETCH_TIMEOUT_SECS) < 1 {
        return Err(invalid(
            "analysis",
            "fetch_timeout_secs",
            "fetch_timeout_secs must be at least 1",
        ));
    }
    Ok(())
}

fn validate_source(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    match config.get_string("data", "source") {
        None => Ok(()),
        Some(s) if DATA_SOURCES.contains(&s.trim().to_lowercase().as_str()) => Ok(()),
        Some(s) => Err(invalid(
            "data",
            "source",
            &format!("unknown source '{}' (expected one of: {})", s, DATA_SOURCES.join(", ")),
        )),
    }
}

fn validate_portfolios(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    for section in config.sections() {
        if !section.starts_with(PORTFOLIO_SECTION_PREFIX) {
            continue;
        }
        let entries = config
            .get_string(&section, "entries")
            .ok_or_else(|| ScreenerError::ConfigMissing {
                section: section.clone(),
                key: "entries".to_string(),
            })?;
        parse_entries(&entries).map_err(|e| invalid(&section, "entries", &e.to_string()))?;
    }
    Ok(())
}

fn validate_active_portfolio(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    let Some(active) = config.get_string("portfolio", "active") else {
        return Ok(());
    };
    let key = active.trim().to_lowercase();
    let section = format!("{}{}", PORTFOLIO_SECTION_PREFIX, key);
    if Portfolio::preset(&key).is_some() || config.sections().contains(&section) {
        Ok(())
    } else {
        Err(invalid(
            "portfolio",
            "active",
            &format!("no portfolio named '{}'", active.trim()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    fn assert_invalid_key(result: Result<(), ScreenerError>, expected_key: &str) {
        match result {
            Err(ScreenerError::ConfigInvalid { key, .. }) => assert_eq!(key, expected_key),
            other => panic!("expected ConfigInvalid for {}, got {:?}", expected_key, other),
        }
    }

    #[test]
    fn empty_config_is_valid() {
        assert!(validate_config(&config("[analysis]\n")).is_ok());
    }

    #[test]
    fn full_config_is_valid() {
        let c = config(
            "[analysis]\nshort_window = 10\nlong_window = 30\nlookback_days = 45\n\
             fetch_timeout_secs = 5\n\
             [data]\nsource = yahoo\n\
             [portfolio]\nactive = watch\n\
             [portfolio.watch]\nname = Watch\nentries = AAPL:Apple, NVDA:NVIDIA\n",
        );
        assert!(validate_config(&c).is_ok());
    }

    #[test]
    fn short_window_zero() {
        assert_invalid_key(
            validate_config(&config("[analysis]\nshort_window = 0\n")),
            "short_window",
        );
    }

    #[test]
    fn long_not_greater_than_short() {
        assert_invalid_key(
            validate_config(&config("[analysis]\nshort_window = 20\nlong_window = 20\n")),
            "long_window",
        );
    }

    #[test]
    fn long_override_repairs_inverted_windows() {
        let c = config("[analysis]\nshort_window = 30\nlong_window = 25\n");
        assert_invalid_key(validate_config(&c), "long_window");
        let overrides = AnalysisOverrides {
            short_window: None,
            long_window: Some(60),
        };
        assert!(validate_config_with(&c, overrides).is_ok());
    }

    #[test]
    fn short_override_is_checked_against_lookback() {
        let c = config("[analysis]\nlookback_days = 30\n");
        let overrides = AnalysisOverrides {
            short_window: Some(40),
            long_window: Some(80),
        };
        assert_invalid_key(validate_config_with(&c, overrides), "lookback_days");
    }

    #[test]
    fn defaults_match_analysis_defaults() {
        let c = config(&format!(
            "[analysis]\nshort_window = {}\nlong_window = {}\nlookback_days = {}\nfetch_timeout_secs = {}\n",
            DEFAULT_SHORT_WINDOW, DEFAULT_LONG_WINDOW, DEFAULT_LOOKBACK_DAYS, DEFAULT_FETCH_TIMEOUT_SECS
        ));
        assert!(validate_config(&c).is_ok());
        assert!(validate_config(&config("[analysis]\n")).is_ok());
    }

    #[test]
    fn lookback_shorter_than_short_window() {
        assert_invalid_key(
            validate_config(&config("[analysis]\nlookback_days = 10\n")),
            "lookback_days",
        );
    }

    #[test]
    fn zero_timeout() {
        assert_invalid_key(
            validate_config(&config("[analysis]\nfetch_timeout_secs = 0\n")),
            "fetch_timeout_secs",
        );
    }

    #[test]
    fn unknown_source() {
        assert_invalid_key(
            validate_config(&config("[data]\nsource = bloomberg\n")),
            "source",
        );
    }

    #[test]
    fn portfolio_section_without_entries() {
        let result = validate_config(&config("[portfolio.empty]\nname = Empty\n"));
        assert!(matches!(result, Err(ScreenerError::ConfigMissing { key, .. }) if key == "entries"));
    }

    #[test]
    fn portfolio_section_with_bad_entries() {
        assert_invalid_key(
            validate_config(&config("[portfolio.bad]\nentries = AAPL:Apple,,TSLA:Tesla\n")),
            "entries",
        );
    }

    #[test]
    fn active_preset() {
        assert!(validate_config(&config("[portfolio]\nactive = TECH\n")).is_ok());
    }

    #[test]
    fn active_missing() {
        assert_invalid_key(
            validate_config(&config("[portfolio]\nactive = crypto\n")),
            "active",
        );
    }
}
