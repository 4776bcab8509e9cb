//! Parsing and validation of `ttsig.toml` testbench configuration files.
//!
//! [`load_config`] reads the file from a project directory and produces a
//! [`TtsigConfig`]; [`resolve`] turns its textual durations and frequencies
//! into simulation types. A project without a `ttsig.toml` gets defaults
//! that reproduce the standard sweep: 100 KHz clock, 10 reset cycles,
//! inputs 40 down to -39.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_file, load_config_from_str, CONFIG_FILE_NAME};
pub use resolve::{resolve, ResolvedConfig};
pub use types::*;
