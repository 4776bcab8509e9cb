//! Resolution of textual settings into simulation types.

use crate::error::ConfigError;
use crate::types::TtsigConfig;
use std::path::PathBuf;
use ttsig_common::Frequency;
use ttsig_sim::{parse_duration, SimTime};

/// Clock period used when `[clock]` names neither frequency nor period.
pub const DEFAULT_CLOCK_PERIOD: SimTime = SimTime {
    fs: 10 * ttsig_sim::FS_PER_US,
};

/// A validated configuration with durations parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Project name.
    pub name: String,
    /// Top-level module.
    pub top: String,
    /// Port driven by the clock.
    pub clock_port: String,
    /// Clock period.
    pub clock_period: SimTime,
    /// Wait between the sampling edge and reading the output, if configured.
    pub settle: Option<SimTime>,
    /// Clock edges to hold reset.
    pub reset_cycles: u32,
    /// First sweep input.
    pub start: i8,
    /// Last sweep input, inclusive.
    pub end: i8,
    /// Simulation time limit.
    pub time_limit: Option<SimTime>,
    /// VCD output path.
    pub waveform: Option<PathBuf>,
}

/// Validates `config` and parses its durations and frequency.
pub fn resolve(config: &TtsigConfig) -> Result<ResolvedConfig, ConfigError> {
    if config.project.name.is_empty() {
        return Err(invalid("project.name must not be empty"));
    }
    if config.project.top.is_empty() {
        return Err(invalid("project.top must not be empty"));
    }
    if config.clock.port.is_empty() {
        return Err(invalid("clock.port must not be empty"));
    }

    let clock_period = match (&config.clock.frequency, &config.clock.period) {
        (Some(_), Some(_)) => {
            return Err(invalid("clock: set either frequency or period, not both"));
        }
        (Some(freq), None) => {
            let freq: Frequency = freq
                .parse()
                .map_err(|e| invalid(format!("clock.frequency: {e}")))?;
            SimTime::from_fs(freq.period_fs())
        }
        (None, Some(period)) => duration("clock.period", period)?,
        (None, None) => DEFAULT_CLOCK_PERIOD,
    };
    if clock_period.fs < 2 {
        return Err(invalid("clock period must be at least 2 fs"));
    }

    let test = &config.test;
    if test.reset_cycles == 0 {
        return Err(invalid("test.reset_cycles must be at least 1"));
    }
    let settle = test
        .settle
        .as_deref()
        .map(|t| duration("test.settle", t))
        .transpose()?;
    let time_limit = test
        .time_limit
        .as_deref()
        .map(|t| duration("test.time_limit", t))
        .transpose()?;

    Ok(ResolvedConfig {
        name: config.project.name.clone(),
        top: config.project.top.clone(),
        clock_port: config.clock.port.clone(),
        clock_period,
        settle,
        reset_cycles: test.reset_cycles,
        start: input_value("test.start", test.start)?,
        end: input_value("test.end", test.end)?,
        time_limit,
        waveform: test.waveform.as_ref().map(PathBuf::from),
    })
}

fn duration(field: &str, text: &str) -> Result<SimTime, ConfigError> {
    parse_duration(text).map_err(|e| invalid(format!("{field}: {e}")))
}

fn input_value(field: &str, value: i32) -> Result<i8, ConfigError> {
    i8::try_from(value)
        .map_err(|_| invalid(format!("{field} = {value} does not fit in ui_in[7:0] (-128..=127)")))
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(msg.into())
}
