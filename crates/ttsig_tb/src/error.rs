//! Testbench errors.

use thiserror::Error;
use ttsig_sim::SimError;

/// Why a check or a sweep failed.
#[derive(Debug, Error)]
pub enum TbError {
    /// The device produced the wrong output.
    #[error("Expected uo_out to be {expected} for ui_in={input}, but got {actual}")]
    Mismatch {
        /// The driven `ui_in` value.
        input: i8,
        /// What `uo_out` should have been.
        expected: u8,
        /// What `uo_out` was.
        actual: u64,
    },

    /// Reset was asked to hold for zero clock edges, which never drives
    /// `rst_n` low.
    #[error("reset must be held for at least one clock cycle")]
    NoResetCycles,

    /// The simulation itself failed.
    #[error(transparent)]
    Sim(#[from] SimError),
}
