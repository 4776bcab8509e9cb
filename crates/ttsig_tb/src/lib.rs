//! Testbench for the `tt_um_sigmoid_8bit` Tiny Tapeout design.
//!
//! For each input in a fixed range the checker resets the device, drives
//! `ui_in`, waits one clock edge and a short settle time, samples `uo_out`
//! and compares it against [`expected_output`]. The first mismatch ends the
//! run with [`TbError::Mismatch`].
//!
//! ```ignore
//! use ttsig_device::SigmoidModel;
//! use ttsig_tb::{run_test_project, SweepConfig};
//!
//! let report = run_test_project(SigmoidModel::new(), &SweepConfig::default(), &Default::default())?;
//! assert_eq!(report.inputs_checked, 80);
//! ```
//!
//! The [`probe`] module samples the device without asserting, for plotting
//! its transfer curve or using it as an activation function.

#![warn(missing_docs)]

pub mod check;
pub mod error;
pub mod expected;
pub mod pins;
pub mod probe;
pub mod sequence;

pub use check::{test_value, CheckTiming};
pub use error::TbError;
pub use expected::expected_output;
pub use pins::{reset, TtPins};
pub use probe::{
    fetch_value, quantize, reference_activation, run_transfer_curve, transfer_curve, CurvePoint,
    ProbeConfig,
};
pub use sequence::{run_test_project, test_project, SweepConfig, TestReport};
