//! Simulation error types.
//!
//! Everything that can go wrong while building a simulation, driving its
//! signals or running its scheduler is a variant of [`SimError`].

use std::io;

use ttsig_common::ValueError;

/// Errors raised by the simulation kernel and its handles.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// No signal with the given name exists on the device.
    #[error("no signal named '{name}'")]
    UnknownSignal {
        /// The requested name.
        name: String,
    },

    /// The device model declared the same port twice.
    #[error("signal '{name}' declared more than once")]
    DuplicateSignal {
        /// The duplicated name.
        name: String,
    },

    /// A value could not be written to a signal.
    #[error("cannot drive '{signal}': {source}")]
    Value {
        /// The target signal.
        signal: String,
        /// Why the value was rejected.
        #[source]
        source: ValueError,
    },

    /// A written value's width differs from the signal's width.
    #[error("cannot drive '{signal}': expected {expected} bit(s), got {actual}")]
    WidthMismatch {
        /// The target signal.
        signal: String,
        /// The signal width.
        expected: u32,
        /// The width of the written value.
        actual: u32,
    },

    /// An integer read was attempted on a value containing `X` or `Z`.
    #[error("signal '{signal}' has unresolvable value {value}")]
    Unresolvable {
        /// The signal that was read.
        signal: String,
        /// Binary rendering of the value.
        value: String,
    },

    /// The testbench tried to drive a port owned by the device, or the device
    /// tried to drive one owned by the testbench.
    #[error("signal '{signal}' is not writable from here")]
    NotWritable {
        /// The target signal.
        signal: String,
    },

    /// Too many delta cycles at a single time step, indicating a combinational loop.
    #[error("delta cycle limit exceeded at {fs} fs (max {max_deltas} deltas)")]
    DeltaCycleLimit {
        /// The time in femtoseconds where the limit was hit.
        fs: u64,
        /// The maximum number of delta cycles allowed.
        max_deltas: u32,
    },

    /// The simulation exceeded the configured time limit.
    #[error("time limit exceeded: {limit_fs} fs")]
    TimeLimitExceeded {
        /// The time limit in femtoseconds.
        limit_fs: u64,
    },

    /// The test is still waiting but nothing is scheduled that could wake it.
    #[error("simulation stalled at {time_fs} fs: test is waiting but no events are pending")]
    Stalled {
        /// Time in femtoseconds when the stall was detected.
        time_fs: u64,
    },

    /// A duration string could not be parsed.
    #[error("invalid duration '{input}': {reason}")]
    InvalidDuration {
        /// The rejected input.
        input: String,
        /// What was wrong with it.
        reason: String,
    },

    /// An I/O error occurred while writing waveform data.
    #[error("waveform I/O error: {0}")]
    WaveformIo(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_signal_display() {
        let e = SimError::UnknownSignal {
            name: "uo_outt".into(),
        };
        assert_eq!(e.to_string(), "no signal named 'uo_outt'");
    }

    #[test]
    fn value_display_includes_source() {
        let e = SimError::Value {
            signal: "ui_in".into(),
            source: ValueError::OutOfRange {
                value: 300,
                width: 8,
            },
        };
        assert_eq!(
            e.to_string(),
            "cannot drive 'ui_in': value 300 does not fit in 8 bit(s)"
        );
    }

    #[test]
    fn width_mismatch_display() {
        let e = SimError::WidthMismatch {
            signal: "clk".into(),
            expected: 1,
            actual: 8,
        };
        assert_eq!(
            e.to_string(),
            "cannot drive 'clk': expected 1 bit(s), got 8"
        );
    }

    #[test]
    fn unresolvable_display() {
        let e = SimError::Unresolvable {
            signal: "uo_out".into(),
            value: "XXXXXXXX".into(),
        };
        assert_eq!(
            e.to_string(),
            "signal 'uo_out' has unresolvable value XXXXXXXX"
        );
    }

    #[test]
    fn delta_cycle_limit_display() {
        let e = SimError::DeltaCycleLimit {
            fs: 100,
            max_deltas: 10000,
        };
        assert_eq!(
            e.to_string(),
            "delta cycle limit exceeded at 100 fs (max 10000 deltas)"
        );
    }

    #[test]
    fn stalled_display() {
        let e = SimError::Stalled { time_fs: 5 };
        assert!(e.to_string().starts_with("simulation stalled at 5 fs"));
    }

    #[test]
    fn waveform_io_display() {
        let e = SimError::WaveformIo(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(e.to_string().contains("waveform I/O error"));
    }
}
