//! Free-running clock driver.

use crate::error::SimError;
use crate::handle::Signal;
use crate::time::SimTime;

/// Drives a single-bit signal with a 50% duty cycle clock, high phase first.
///
/// An odd period puts the extra femtosecond in the low phase.
#[derive(Debug, Clone)]
pub struct Clock {
    signal: Signal,
    period: SimTime,
}

impl Clock {
    /// Creates a clock for `signal` with the given period.
    pub fn new(signal: Signal, period: SimTime) -> Result<Self, SimError> {
        if signal.width() != 1 {
            return Err(SimError::WidthMismatch {
                signal: signal.name().to_string(),
                expected: 1,
                actual: signal.width(),
            });
        }
        if period.fs < 2 {
            return Err(SimError::InvalidDuration {
                input: period.to_string(),
                reason: "clock period must be at least 2 fs".into(),
            });
        }
        Ok(Self { signal, period })
    }

    /// The clock period.
    pub fn period(&self) -> SimTime {
        self.period
    }

    /// Toggles the signal forever. Pass the returned future to
    /// [`Dut::start_soon`](crate::Dut::start_soon).
    pub async fn start(self) -> Result<(), SimError> {
        let high = SimTime::from_fs(self.period.fs / 2);
        let low = SimTime::from_fs(self.period.fs - high.fs);
        let dut = self.signal.dut();
        tracing::debug!(signal = self.signal.name(), period = %self.period, "clock started");
        loop {
            self.signal.set(1)?;
            dut.timer(high).await;
            self.signal.set(0)?;
            dut.timer(low).await;
        }
    }
}
