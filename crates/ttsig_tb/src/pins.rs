//! Tiny Tapeout pin bindings and the reset sequence.

use ttsig_sim::{Clock, Dut, SimError, SimTime, Signal, TaskHandle};

use crate::error::TbError;

/// Handles to the user-project pins the testbench drives and samples.
#[derive(Debug, Clone)]
pub struct TtPins {
    /// Clock input.
    pub clk: Signal,
    /// Design enable.
    pub ena: Signal,
    /// Active-low reset.
    pub rst_n: Signal,
    /// Dedicated inputs; the signed activation.
    pub ui_in: Signal,
    /// Bidirectional inputs, unused by the design.
    pub uio_in: Signal,
    /// Dedicated outputs; the registered sigmoid.
    pub uo_out: Signal,
}

impl TtPins {
    /// Looks up the pins on `dut`, with the clock on `clock_port`.
    pub fn bind(dut: &Dut, clock_port: &str) -> Result<Self, SimError> {
        Ok(Self {
            clk: dut.signal(clock_port)?,
            ena: dut.signal("ena")?,
            rst_n: dut.signal("rst_n")?,
            ui_in: dut.signal("ui_in")?,
            uio_in: dut.signal("uio_in")?,
            uo_out: dut.signal("uo_out")?,
        })
    }

    /// The device these pins belong to.
    pub fn dut(&self) -> Dut {
        self.clk.dut()
    }

    /// Starts a free-running clock on `clk` in the background.
    pub fn start_clock(&self, period: SimTime) -> Result<TaskHandle, SimError> {
        let clock = Clock::new(self.clk.clone(), period)?;
        Ok(self.dut().start_soon(clock.start()))
    }
}

/// Puts the device in a known state.
///
/// Enables the design, zeroes the inputs, holds `rst_n` low for `cycles`
/// rising clock edges and releases it. Running it again from any state
/// leaves the device exactly as one run does. `cycles` must be at least 1.
pub async fn reset(pins: &TtPins, cycles: u32) -> Result<(), TbError> {
    if cycles == 0 {
        return Err(TbError::NoResetCycles);
    }
    tracing::debug!(sim_time = %pins.dut().now(), cycles, "Reset");
    pins.ena.set(1)?;
    pins.ui_in.set(0)?;
    pins.uio_in.set(0)?;
    pins.rst_n.set(0)?;
    pins.clk.clock_cycles(cycles).await;
    pins.rst_n.set(1)?;
    Ok(())
}
