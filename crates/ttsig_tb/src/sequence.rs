//! The top-level sweep: every input from `start` to `end`, fail-fast.

use serde::Serialize;
use ttsig_sim::{DeviceModel, Dut, SimConfig, SimTime, Simulator};

use crate::check::{test_value, CheckTiming};
use crate::error::TbError;
use crate::pins::TtPins;

/// Settings for [`test_project`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepConfig {
    /// Port the clock drives.
    pub clock_port: String,
    /// Clock period.
    pub clock_period: SimTime,
    /// Per-check timing.
    pub timing: CheckTiming,
    /// First input.
    pub start: i8,
    /// Last input, inclusive. May be above or below `start`.
    pub end: i8,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            clock_port: "clk".to_string(),
            clock_period: SimTime::from_us(10),
            timing: CheckTiming::default(),
            start: 40,
            end: -39,
        }
    }
}

impl SweepConfig {
    /// Inputs in the order they are applied.
    pub fn inputs(&self) -> Vec<i8> {
        if self.start >= self.end {
            (self.end..=self.start).rev().collect()
        } else {
            (self.start..=self.end).collect()
        }
    }
}

/// Summary of a passing sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestReport {
    /// Top-level module that was tested.
    pub design: String,
    /// Inputs checked, all of which passed.
    pub inputs_checked: usize,
    /// Simulation time at the end of the sweep.
    pub final_time: SimTime,
    /// Delta cycles executed.
    pub total_deltas: u64,
}

/// Starts the clock and checks every input in `config`, stopping at the
/// first failure. Returns the number of inputs checked.
pub async fn test_project(dut: Dut, config: SweepConfig) -> Result<usize, TbError> {
    let pins = TtPins::bind(&dut, &config.clock_port)?;
    pins.start_clock(config.clock_period)?;

    let inputs = config.inputs();
    tracing::info!(
        design = %dut.name(),
        start = config.start,
        end = config.end,
        period = %config.clock_period,
        "Starting sweep of {} inputs",
        inputs.len()
    );
    for &x in &inputs {
        test_value(&pins, x, config.timing).await?;
    }
    Ok(inputs.len())
}

/// Builds a simulator around `model`, runs [`test_project`] on it and
/// reports the result.
pub fn run_test_project(
    model: impl DeviceModel + 'static,
    config: &SweepConfig,
    sim_config: &SimConfig,
) -> Result<TestReport, TbError> {
    let mut sim = Simulator::new(model)?;
    sim.configure(sim_config)?;
    let design = sim.dut().name();
    let config = config.clone();
    let outcome = sim.run(|dut| test_project(dut, config))?;
    let inputs_checked = outcome.value?;
    Ok(TestReport {
        design,
        inputs_checked,
        final_time: outcome.final_time,
        total_deltas: outcome.total_deltas,
    })
}
