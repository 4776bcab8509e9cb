//! The datapath of the sigmoid core, and the faults that can be injected into it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Piecewise-linear sigmoid computed by the core.
///
/// The input is an 8-bit two's-complement activation in Q4.4 fixed point;
/// the output is an unsigned 8-bit probability where 128 means one half.
/// The slope is 4 LSB per input step and the output saturates once
/// `x <= -32` or `x >= 32`.
pub fn sigmoid_8bit(x: i8) -> u8 {
    let x = i32::from(x);
    if x <= -32 {
        0
    } else if x >= 32 {
        255
    } else {
        // -31..=31 maps onto 4..=252.
        (x * 4 + 128) as u8
    }
}

/// A deliberate defect in the model, used to check that the testbench
/// catches bad silicon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "value")]
pub enum Fault {
    /// The output register always loads this value.
    StuckAt(u8),
    /// The output is one LSB high for this input only.
    OffByOne(i8),
    /// Saturation starts at |x| >= 31 instead of at -32 and +32.
    SymmetricClamp,
}

impl Fault {
    /// Applies the fault to an input and the fault-free output for it.
    pub fn apply(self, x: i8, good: u8) -> u8 {
        match self {
            Fault::StuckAt(v) => v,
            Fault::OffByOne(at) if at == x => good.wrapping_add(1),
            Fault::OffByOne(_) => good,
            Fault::SymmetricClamp => match x {
                ..=-31 => 0,
                31.. => 255,
                _ => good,
            },
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::StuckAt(v) => write!(f, "stuck-at={v}"),
            Fault::OffByOne(at) => write!(f, "off-by-one={at}"),
            Fault::SymmetricClamp => write!(f, "symmetric-clamp"),
        }
    }
}

/// Error parsing a [`Fault`] from its command-line spelling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid fault '{input}': expected stuck-at=<0..255>, off-by-one=<-128..127> or symmetric-clamp")]
pub struct ParseFaultError {
    /// The rejected text.
    pub input: String,
}

impl FromStr for Fault {
    type Err = ParseFaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseFaultError {
            input: s.to_string(),
        };
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("symmetric-clamp") {
            return Ok(Fault::SymmetricClamp);
        }
        let (kind, value) = trimmed.split_once('=').ok_or_else(err)?;
        let value = value.trim();
        match kind.trim().to_ascii_lowercase().as_str() {
            "stuck-at" => parse_u8(value).map(Fault::StuckAt).ok_or_else(err),
            "off-by-one" => value.parse().map(Fault::OffByOne).map_err(|_| err()),
            _ => Err(err()),
        }
    }
}

fn parse_u8(text: &str) -> Option<u8> {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}
