//! Simulation time with femtosecond resolution and unit parsing.
//!
//! [`SimTime`] is both a point on the simulation timeline and a duration;
//! triggers such as `Timer` take a duration and the kernel adds it to the
//! current time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;
use std::str::FromStr;

use crate::error::SimError;

/// Femtoseconds per picosecond.
pub const FS_PER_PS: u64 = 1_000;
/// Femtoseconds per nanosecond.
pub const FS_PER_NS: u64 = 1_000_000;
/// Femtoseconds per microsecond.
pub const FS_PER_US: u64 = 1_000_000_000;
/// Femtoseconds per millisecond.
pub const FS_PER_MS: u64 = 1_000_000_000_000;
/// Femtoseconds per second.
pub const FS_PER_S: u64 = 1_000_000_000_000_000;

/// Units accepted in durations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    /// Femtoseconds.
    Fs,
    /// Picoseconds.
    Ps,
    /// Nanoseconds.
    Ns,
    /// Microseconds.
    Us,
    /// Milliseconds.
    Ms,
    /// Seconds.
    S,
}

impl TimeUnit {
    /// Femtoseconds in one of this unit.
    pub fn fs_per_unit(self) -> u64 {
        match self {
            TimeUnit::Fs => 1,
            TimeUnit::Ps => FS_PER_PS,
            TimeUnit::Ns => FS_PER_NS,
            TimeUnit::Us => FS_PER_US,
            TimeUnit::Ms => FS_PER_MS,
            TimeUnit::S => FS_PER_S,
        }
    }
}

impl FromStr for TimeUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fs" => Ok(TimeUnit::Fs),
            "ps" => Ok(TimeUnit::Ps),
            "ns" => Ok(TimeUnit::Ns),
            "us" => Ok(TimeUnit::Us),
            "ms" => Ok(TimeUnit::Ms),
            "s" => Ok(TimeUnit::S),
            "" => Err("missing unit (use fs, ps, ns, us, ms, or s)".into()),
            other => Err(format!(
                "unknown unit '{other}' (use fs, ps, ns, us, ms, or s)"
            )),
        }
    }
}

/// A point in simulation time, or a duration, in femtoseconds.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SimTime {
    /// Femtoseconds since time zero.
    pub fs: u64,
}

impl SimTime {
    /// Time zero.
    pub const ZERO: SimTime = SimTime { fs: 0 };

    /// Creates a time from a count of `unit`.
    pub fn new(value: u64, unit: TimeUnit) -> Self {
        Self {
            fs: value.saturating_mul(unit.fs_per_unit()),
        }
    }

    /// Creates a time from femtoseconds.
    pub fn from_fs(fs: u64) -> Self {
        Self { fs }
    }

    /// Creates a time from nanoseconds.
    pub fn from_ns(ns: u64) -> Self {
        Self::new(ns, TimeUnit::Ns)
    }

    /// Creates a time from microseconds.
    pub fn from_us(us: u64) -> Self {
        Self::new(us, TimeUnit::Us)
    }
}

impl Add for SimTime {
    type Output = SimTime;

    fn add(self, rhs: SimTime) -> SimTime {
        SimTime {
            fs: self.fs.saturating_add(rhs.fs),
        }
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fs = self.fs;
        if fs == 0 {
            return write!(f, "0 fs");
        }
        for (per, unit) in [
            (FS_PER_S, "s"),
            (FS_PER_MS, "ms"),
            (FS_PER_US, "us"),
            (FS_PER_NS, "ns"),
            (FS_PER_PS, "ps"),
        ] {
            if fs % per == 0 {
                return write!(f, "{} {unit}", fs / per);
            }
        }
        write!(f, "{fs} fs")
    }
}

/// Parses a duration such as `"10ns"`, `"1 us"` or `"500ps"`.
pub fn parse_duration(s: &str) -> Result<SimTime, SimError> {
    let trimmed = s.trim();
    let invalid = |reason: String| SimError::InvalidDuration {
        input: s.to_string(),
        reason,
    };
    if trimmed.is_empty() {
        return Err(invalid("empty duration".into()));
    }

    let digit_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    if digit_end == 0 {
        return Err(invalid("no numeric value".into()));
    }
    let number: u64 = trimmed[..digit_end]
        .parse()
        .map_err(|_| invalid("number too large".into()))?;
    let unit: TimeUnit = trimmed[digit_end..].trim().parse().map_err(invalid)?;

    number
        .checked_mul(unit.fs_per_unit())
        .map(SimTime::from_fs)
        .ok_or_else(|| invalid("duration overflows".into()))
}

impl FromStr for SimTime {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_duration(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_agree() {
        assert_eq!(SimTime::from_ns(10), SimTime::new(10, TimeUnit::Ns));
        assert_eq!(SimTime::from_us(10).fs, 10_000_000_000);
        assert_eq!(SimTime::from_fs(42).fs, 42);
    }

    #[test]
    fn add_saturates() {
        let t = SimTime::from_fs(u64::MAX) + SimTime::from_ns(1);
        assert_eq!(t.fs, u64::MAX);
        assert_eq!(SimTime::from_ns(1) + SimTime::from_ns(2), SimTime::from_ns(3));
    }

    #[test]
    fn ordering() {
        assert!(SimTime::from_ns(1) < SimTime::from_ns(2));
        assert_eq!(SimTime::default(), SimTime::ZERO);
    }

    #[test]
    fn display_picks_largest_exact_unit() {
        assert_eq!(SimTime::ZERO.to_string(), "0 fs");
        assert_eq!(SimTime::from_ns(10).to_string(), "10 ns");
        assert_eq!(SimTime::from_us(10).to_string(), "10 us");
        assert_eq!(SimTime::from_ns(1500).to_string(), "1500 ns");
        assert_eq!(SimTime::from_fs(1500).to_string(), "1500 fs");
        assert_eq!(SimTime::new(2, TimeUnit::S).to_string(), "2 s");
    }

    #[test]
    fn parse_units() {
        assert_eq!(parse_duration("1ns").unwrap(), SimTime::from_ns(1));
        assert_eq!(parse_duration("10 us").unwrap(), SimTime::from_us(10));
        assert_eq!(parse_duration("500ps").unwrap().fs, 500_000);
        assert_eq!(parse_duration("7fs").unwrap().fs, 7);
        assert_eq!(parse_duration(" 3ms ").unwrap().fs, 3 * FS_PER_MS);
        assert_eq!(parse_duration("1s").unwrap().fs, FS_PER_S);
        assert_eq!(parse_duration("0ns").unwrap(), SimTime::ZERO);
    }

    #[test]
    fn parse_errors() {
        assert!(matches!(
            parse_duration(""),
            Err(SimError::InvalidDuration { .. })
        ));
        assert!(parse_duration("ns").is_err());
        assert!(parse_duration("10").is_err());
        assert!(parse_duration("10 hours").is_err());
        assert!(parse_duration("99999999999 s").is_err());
    }

    #[test]
    fn parse_error_message_names_unit() {
        let err = parse_duration("5 parsecs").unwrap_err();
        assert!(err.to_string().contains("unknown unit 'parsecs'"));
    }

    #[test]
    fn from_str_matches_parse_duration() {
        let t: SimTime = "10ns".parse().unwrap();
        assert_eq!(t, SimTime::from_ns(10));
    }

    #[test]
    fn serde_roundtrip() {
        let t = SimTime::from_ns(12);
        let json = serde_json::to_string(&t).unwrap();
        let back: SimTime = serde_json::from_str(&json).unwrap();
        assert_eq!(t, back);
    }
}
