//! Shared foundational types for the ttsig testbench.
//!
//! Provides 4-state logic values, fixed-width logic vectors used as signal
//! values, and clock frequencies.

#![warn(missing_docs)]

pub mod frequency;
pub mod logic;
pub mod logic_array;

pub use frequency::{Frequency, ParseFrequencyError};
pub use logic::Logic;
pub use logic_array::{LogicArray, ValueError, MAX_WIDTH};
