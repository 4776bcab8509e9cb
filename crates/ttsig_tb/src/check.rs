//! The per-input stimulus-and-check step.

use ttsig_sim::SimTime;

use crate::error::TbError;
use crate::expected::expected_output;
use crate::pins::{reset, TtPins};

/// Timing of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckTiming {
    /// Wait after the sampling edge before reading `uo_out`.
    pub settle: SimTime,
    /// Clock edges to hold reset before the stimulus.
    pub reset_cycles: u32,
}

impl Default for CheckTiming {
    fn default() -> Self {
        Self {
            settle: SimTime::from_ns(1),
            reset_cycles: 10,
        }
    }
}

/// Resets the device, applies `x`, and checks `uo_out` one clock later.
///
/// Returns the sampled output on success.
pub async fn test_value(pins: &TtPins, x: i8, timing: CheckTiming) -> Result<u8, TbError> {
    let dut = pins.dut();
    let expected = expected_output(x);
    tracing::info!(sim_time = %dut.now(), "Test ui_in={x}, expected uo_out={expected}");

    reset(pins, timing.reset_cycles).await?;

    pins.ui_in.set(i64::from(x))?;
    pins.clk.clock_cycles(1).await;
    dut.timer(timing.settle).await;

    let actual = pins.uo_out.to_unsigned()?;
    if actual != u64::from(expected) {
        return Err(TbError::Mismatch {
            input: x,
            expected,
            actual,
        });
    }
    tracing::info!(sim_time = %dut.now(), "Passed for ui_in={x}, received uo_out={actual}");
    Ok(expected)
}
