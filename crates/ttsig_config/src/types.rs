//! Configuration types deserialized from `ttsig.toml`.
//!
//! Every section and field is optional. Durations and frequencies stay as
//! strings here and are checked by [`resolve`](crate::resolve).

use serde::Deserialize;

/// The top-level configuration parsed from `ttsig.toml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TtsigConfig {
    /// Which design is under test.
    #[serde(default)]
    pub project: ProjectMeta,
    /// The free-running clock.
    #[serde(default)]
    pub clock: ClockConfig,
    /// Sweep and checker settings.
    #[serde(default)]
    pub test: TestConfig,
}

/// Project metadata.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectMeta {
    /// The project name, used in logs and reports.
    #[serde(default = "default_top")]
    pub name: String,
    /// Top-level module of the device under test.
    #[serde(default = "default_top")]
    pub top: String,
}

impl Default for ProjectMeta {
    fn default() -> Self {
        Self {
            name: default_top(),
            top: default_top(),
        }
    }
}

fn default_top() -> String {
    "tt_um_sigmoid_8bit".to_string()
}

/// Clock definition. Give either `frequency` or `period`, not both.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClockConfig {
    /// Clock frequency, e.g. `"100KHz"`.
    pub frequency: Option<String>,
    /// Clock period, e.g. `"10us"`.
    pub period: Option<String>,
    /// Port the clock drives.
    #[serde(default = "default_clock_port")]
    pub port: String,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            frequency: None,
            period: None,
            port: default_clock_port(),
        }
    }
}

fn default_clock_port() -> String {
    "clk".to_string()
}

/// Testbench settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestConfig {
    /// Wait between the sampling clock edge and reading `uo_out`. Unset
    /// means each command's own default: 1 ns for the sweep, 10 ns for
    /// sampling.
    pub settle: Option<String>,
    /// Clock edges to hold `rst_n` low.
    #[serde(default = "default_reset_cycles")]
    pub reset_cycles: u32,
    /// First input of the sweep.
    #[serde(default = "default_start")]
    pub start: i32,
    /// Last input of the sweep, inclusive.
    #[serde(default = "default_end")]
    pub end: i32,
    /// Abort the simulation past this time, e.g. `"50ms"`.
    pub time_limit: Option<String>,
    /// Write a VCD waveform to this path.
    pub waveform: Option<String>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            settle: None,
            reset_cycles: default_reset_cycles(),
            start: default_start(),
            end: default_end(),
            time_limit: None,
            waveform: None,
        }
    }
}

fn default_reset_cycles() -> u32 {
    10
}

fn default_start() -> i32 {
    40
}

fn default_end() -> i32 {
    -39
}
