//! Cooperative simulation kernel for the ttsig testbench.
//!
//! A device under test is described by a [`DeviceModel`]; test code is an
//! `async` block that drives the device's signals and awaits triggers
//! ([`Timer`], [`EdgeTrigger`], [`Signal::clock_cycles`]). The
//! [`Simulator`] runs the test and any background tasks (such as a
//! [`Clock`]) on a single thread. At most one task runs at a time and tasks
//! only switch at an `.await`.
//!
//! # Usage
//!
//! ```ignore
//! use ttsig_sim::{Clock, SimTime, Simulator};
//!
//! let sim = Simulator::new(model)?;
//! let outcome = sim.run(|dut| async move {
//!     let clk = dut.signal("clk")?;
//!     dut.start_soon(Clock::new(clk.clone(), SimTime::from_us(10))?.start());
//!     dut.signal("ui_in")?.set(-4)?;
//!     clk.clock_cycles(1).await;
//!     dut.timer(SimTime::from_ns(1)).await;
//!     dut.signal("uo_out")?.to_unsigned()
//! })?;
//! ```
//!
//! # Modules
//!
//! - `error`: Simulation error types
//! - `time`: Femtosecond time and duration parsing
//! - `signal`: Port declarations, signal table, edge classification
//! - `model`: The device model trait
//! - `kernel`: Timer queue, edge waiters, delta-cycle settle loop
//! - `scheduler`: Task executor and [`Simulator`]
//! - `handle`: [`Dut`], [`Signal`] and [`TaskHandle`]
//! - `trigger`: Awaitable [`Timer`] and [`EdgeTrigger`]
//! - `clock`: Free-running [`Clock`]
//! - `waveform`: VCD output

#![warn(missing_docs)]

pub mod clock;
pub mod error;
pub mod handle;
mod kernel;
pub mod model;
pub mod scheduler;
pub mod signal;
pub mod time;
pub mod trigger;
pub mod waveform;

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

pub use clock::Clock;
pub use error::SimError;
pub use handle::{Dut, Signal, TaskHandle};
pub use kernel::DEFAULT_MAX_DELTAS;
pub use model::{DeviceModel, ModelContext};
pub use scheduler::{SimOutcome, Simulator, TaskId};
pub use signal::{Edge, PortDirection, PortSpec, SignalId};
pub use time::{
    parse_duration, SimTime, TimeUnit, FS_PER_MS, FS_PER_NS, FS_PER_PS, FS_PER_S, FS_PER_US,
};
pub use trigger::{EdgeTrigger, Timer};
pub use waveform::{TraceVar, VcdRecorder, WaveformRecorder};

/// Run-level options applied to a [`Simulator`] before it starts.
#[derive(Debug, Clone, Default)]
pub struct SimConfig {
    /// Abort once simulated time would pass this point.
    pub time_limit: Option<SimTime>,
    /// Write a VCD file here.
    pub waveform_path: Option<PathBuf>,
    /// Per-time-step delta limit; [`DEFAULT_MAX_DELTAS`] if `None`.
    pub max_deltas: Option<u32>,
}

impl Simulator {
    /// Applies a [`SimConfig`], creating the waveform file if one is requested.
    pub fn configure(&mut self, config: &SimConfig) -> Result<(), SimError> {
        if let Some(limit) = config.time_limit {
            self.set_time_limit(limit);
        }
        if let Some(max) = config.max_deltas {
            self.set_max_delta(max);
        }
        if let Some(path) = &config.waveform_path {
            let writer = BufWriter::new(File::create(path)?);
            self.set_recorder(Box::new(VcdRecorder::new(writer)));
        }
        Ok(())
    }
}
