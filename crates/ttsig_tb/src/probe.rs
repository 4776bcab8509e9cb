//! Reading the device as an activation function rather than checking it.
//!
//! A real-valued activation `v` is fed to the core in Q4.4 fixed point
//! ([`quantize`]); the 8-bit output reads as a probability `uo_out / 255`.
//! [`reference_activation`] is the software function the core replaces.

use serde::Serialize;
use ttsig_sim::{DeviceModel, SimConfig, SimTime, Simulator};

use crate::error::TbError;
use crate::expected::expected_output;
use crate::pins::{reset, TtPins};

/// Q4.4 scale: one input LSB is 1/16.
pub const FIXED_POINT_SCALE: f32 = 16.0;

/// Settings for probing: no checks, so only timing matters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Port the clock drives.
    pub clock_port: String,
    /// Clock period.
    pub clock_period: SimTime,
    /// Wait after the sampling edge before reading `uo_out`.
    pub settle: SimTime,
    /// Clock edges to hold reset once before the first sample.
    pub reset_cycles: u32,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            clock_port: "clk".to_string(),
            clock_period: SimTime::from_us(10),
            settle: SimTime::from_ns(10),
            reset_cycles: 10,
        }
    }
}

/// One sample of the transfer curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CurvePoint {
    /// Driven `ui_in`.
    pub input: i8,
    /// Sampled `uo_out`.
    pub output: u8,
    /// What the checker would expect.
    pub expected: u8,
}

impl CurvePoint {
    /// `output` read as a probability in `[0, 1]`.
    pub fn probability(&self) -> f32 {
        f32::from(self.output) / 255.0
    }
}

/// Drives `ui_in = x`, waits one clock edge and `settle`, and returns `uo_out`.
///
/// Does not reset the device.
pub async fn fetch_value(pins: &TtPins, x: i8, settle: SimTime) -> Result<u8, TbError> {
    let dut = pins.dut();
    pins.ui_in.set(i64::from(x))?;
    pins.clk.clock_cycles(1).await;
    dut.timer(settle).await;
    let value = pins.uo_out.to_unsigned()?;
    tracing::debug!(sim_time = %dut.now(), "Fetched uo_out={value} for ui_in={x}");
    // uo_out is 8 bits wide.
    Ok(value as u8)
}

/// Fixed-point encoding of a real activation: `clamp(trunc(v * 16), -128, 127)`.
///
/// NaN encodes as 0.
pub fn quantize(v: f32) -> i8 {
    (v * FIXED_POINT_SCALE).trunc().clamp(-128.0, 127.0) as i8
}

/// The software activation the core approximates: `clamp(0.25 v + 0.5, 0, 1)`.
pub fn reference_activation(v: f32) -> f32 {
    (0.25 * v + 0.5).clamp(0.0, 1.0)
}

/// Resets once, then samples every input in order.
pub async fn transfer_curve(
    pins: &TtPins,
    inputs: &[i8],
    settle: SimTime,
    reset_cycles: u32,
) -> Result<Vec<CurvePoint>, TbError> {
    reset(pins, reset_cycles).await?;
    let mut points = Vec::with_capacity(inputs.len());
    for &input in inputs {
        let output = fetch_value(pins, input, settle).await?;
        points.push(CurvePoint {
            input,
            output,
            expected: expected_output(input),
        });
    }
    Ok(points)
}

/// Builds a simulator around `model` and samples the transfer curve over `inputs`.
pub fn run_transfer_curve(
    model: impl DeviceModel + 'static,
    inputs: &[i8],
    config: &ProbeConfig,
    sim_config: &SimConfig,
) -> Result<Vec<CurvePoint>, TbError> {
    let mut sim = Simulator::new(model)?;
    sim.configure(sim_config)?;
    let inputs = inputs.to_vec();
    let config = config.clone();
    let outcome = sim.run(|dut| async move {
        let pins = TtPins::bind(&dut, &config.clock_port)?;
        pins.start_clock(config.clock_period)?;
        transfer_curve(&pins, &inputs, config.settle, config.reset_cycles).await
    })?;
    outcome.value
}

#[cfg(test)]
mod tests {
    use super::*;
    use ttsig_device::{Fault, SigmoidModel};

    #[test]
    fn quantize_scales_and_truncates() {
        assert_eq!(quantize(0.0), 0);
        assert_eq!(quantize(0.6), 9);
        assert_eq!(quantize(-0.6), -9);
        assert_eq!(quantize(2.5), 40);
        assert_eq!(quantize(-2.4375), -39);
    }

    #[test]
    fn quantize_saturates() {
        assert_eq!(quantize(8.0), 127);
        assert_eq!(quantize(1e9), 127);
        assert_eq!(quantize(-8.0), -128);
        assert_eq!(quantize(f32::NEG_INFINITY), -128);
        assert_eq!(quantize(f32::NAN), 0);
    }

    #[test]
    fn reference_activation_clamps() {
        assert_eq!(reference_activation(0.0), 0.5);
        assert_eq!(reference_activation(1.0), 0.75);
        assert_eq!(reference_activation(-4.0), 0.0);
        assert_eq!(reference_activation(10.0), 1.0);
    }

    #[test]
    fn probability_scale() {
        let p = CurvePoint {
            input: 40,
            output: 255,
            expected: 255,
        };
        assert_eq!(p.probability(), 1.0);
    }

    #[test]
    fn curve_matches_expected_for_good_core() {
        let inputs: Vec<i8> = (-40..=39).collect();
        let points = run_transfer_curve(
            SigmoidModel::new(),
            &inputs,
            &ProbeConfig::default(),
            &SimConfig::default(),
        )
        .unwrap();
        assert_eq!(points.len(), 80);
        assert!(points.iter().all(|p| p.output == p.expected));
        assert_eq!(points[0].input, -40);
    }

    #[test]
    fn curve_exposes_fault_without_failing() {
        let points = run_transfer_curve(
            SigmoidModel::with_fault(Fault::SymmetricClamp),
            &[30, 31, 32],
            &ProbeConfig::default(),
            &SimConfig::default(),
        )
        .unwrap();
        let outputs: Vec<u8> = points.iter().map(|p| p.output).collect();
        assert_eq!(outputs, vec![248, 255, 255]);
        assert_eq!(points[1].expected, 252);
    }

    #[test]
    fn curve_serializes_as_json_array() {
        let json = serde_json::to_string(&[CurvePoint {
            input: 0,
            output: 128,
            expected: 128,
        }])
        .unwrap();
        assert_eq!(json, r#"[{"input":0,"output":128,"expected":128}]"#);
    }
}
