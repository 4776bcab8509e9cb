//! Clock frequencies with unit parsing and period conversion.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Femtoseconds in one second.
const FS_PER_SECOND: f64 = 1e15;

/// A clock frequency in Hertz.
///
/// Parses strings like `"100KHz"`, `"50 MHz"` or a bare number of Hertz.
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frequency(f64);

/// Error returned when a frequency string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid frequency: '{input}'")]
pub struct ParseFrequencyError {
    /// The rejected input.
    pub input: String,
}

impl Frequency {
    /// Returns the clock period in whole femtoseconds, rounded to nearest.
    pub fn period_fs(&self) -> u64 {
        (FS_PER_SECOND / self.0).round() as u64
    }
}

impl fmt::Debug for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frequency({self})")
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hz = self.0;
        if hz >= 1e9 {
            write!(f, "{}GHz", hz / 1e9)
        } else if hz >= 1e6 {
            write!(f, "{}MHz", hz / 1e6)
        } else if hz >= 1e3 {
            write!(f, "{}KHz", hz / 1e3)
        } else {
            write!(f, "{hz}Hz")
        }
    }
}

impl FromStr for Frequency {
    type Err = ParseFrequencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseFrequencyError {
            input: s.to_string(),
        };
        let lower = s.trim().to_ascii_lowercase();
        let (num, scale) = [("ghz", 1e9), ("mhz", 1e6), ("khz", 1e3), ("hz", 1.0)]
            .iter()
            .find_map(|(suffix, scale)| lower.strip_suffix(suffix).map(|n| (n, *scale)))
            .unwrap_or((lower.as_str(), 1.0));
        let val: f64 = num.trim().parse().map_err(|_| err())?;
        if !val.is_finite() || val <= 0.0 {
            return Err(err());
        }
        Ok(Frequency(val * scale))
    }
}
