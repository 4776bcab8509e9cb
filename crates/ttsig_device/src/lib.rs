//! Behavioral model of the `tt_um_sigmoid_8bit` Tiny Tapeout design.
//!
//! [`SigmoidModel`] implements [`ttsig_sim::DeviceModel`] with the standard
//! Tiny Tapeout user-project pins (`clk`, `ena`, `rst_n`, `ui_in`, `uo_out`,
//! `uio_in`, `uio_out`, `uio_oe`). A [`Fault`] can be injected to check that
//! a testbench detects a defective core.

#![warn(missing_docs)]

pub mod model;
pub mod transfer;

pub use model::{SigmoidModel, TOP_MODULE};
pub use transfer::{sigmoid_8bit, Fault, ParseFaultError};
