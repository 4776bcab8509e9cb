//! `tt_um_sigmoid_8bit` on the Tiny Tapeout pin set.

use ttsig_common::{Logic, LogicArray};
use ttsig_sim::{DeviceModel, ModelContext, PortSpec, SimError};

use crate::transfer::{sigmoid_8bit, Fault};

/// Top-level module name of the design.
pub const TOP_MODULE: &str = "tt_um_sigmoid_8bit";

/// Registered sigmoid core.
///
/// On each rising edge of `clk`:
///
/// | `rst_n` | `ena` | `uo_out` next          |
/// |---------|-------|------------------------|
/// | 0       | any   | 0                      |
/// | 1       | 1     | `sigmoid(ui_in as i8)` |
/// | 1       | 0     | unchanged              |
///
/// An unknown `rst_n`, or an unknown `ui_in` while enabled, loads all-`X`.
/// `uio_out` and `uio_oe` are tied low: the bidirectional pins are unused.
#[derive(Debug, Clone, Default)]
pub struct SigmoidModel {
    fault: Option<Fault>,
    tied_off: bool,
}

impl SigmoidModel {
    /// A fault-free core.
    pub fn new() -> Self {
        Self::default()
    }

    /// A core with `fault` injected into its datapath.
    pub fn with_fault(fault: Fault) -> Self {
        Self {
            fault: Some(fault),
            tied_off: false,
        }
    }

    /// The injected fault, if any.
    pub fn fault(&self) -> Option<Fault> {
        self.fault
    }

    fn next_output(
        &self,
        rst_n: Logic,
        ena: Logic,
        ui_in: LogicArray,
        held: LogicArray,
    ) -> LogicArray {
        match (rst_n, ena) {
            (Logic::Zero, _) => LogicArray::new(8),
            (Logic::One, Logic::One) => match ui_in.to_signed() {
                Some(x) => {
                    let x = x as i8;
                    let good = sigmoid_8bit(x);
                    let out = self.fault.map_or(good, |f| f.apply(x, good));
                    LogicArray::from_unsigned(u64::from(out), 8)
                }
                None => LogicArray::unknown(8),
            },
            (Logic::One, Logic::Zero) => held,
            _ => LogicArray::unknown(8),
        }
    }
}

impl DeviceModel for SigmoidModel {
    fn name(&self) -> &str {
        TOP_MODULE
    }

    fn ports(&self) -> Vec<PortSpec> {
        vec![
            PortSpec::input("clk", 1),
            PortSpec::input("ena", 1),
            PortSpec::input("ui_in", 8),
            PortSpec::input("uio_in", 8),
            PortSpec::input("rst_n", 1),
            PortSpec::output("uo_out", 8),
            PortSpec::output("uio_out", 8),
            PortSpec::output("uio_oe", 8),
        ]
    }

    fn evaluate(&mut self, ctx: &mut ModelContext<'_>) -> Result<(), SimError> {
        if !self.tied_off {
            ctx.drive("uio_out", LogicArray::new(8))?;
            ctx.drive("uio_oe", LogicArray::new(8))?;
            self.tied_off = true;
            if let Some(fault) = self.fault {
                tracing::debug!(%fault, "fault injected");
            }
        }
        if !ctx.rose("clk")? {
            return Ok(());
        }
        let next = self.next_output(
            ctx.bit("rst_n")?,
            ctx.bit("ena")?,
            ctx.value("ui_in")?,
            ctx.value("uo_out")?,
        );
        ctx.drive("uo_out", next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ttsig_sim::{Clock, Dut, Signal, SimTime, Simulator};

    fn start_clock(dut: &Dut) -> Result<Signal, SimError> {
        let clk = dut.signal("clk")?;
        dut.start_soon(Clock::new(clk.clone(), SimTime::from_ns(100))?.start());
        Ok(clk)
    }

    /// Holds reset for `cycles` edges, then releases it.
    async fn reset(dut: &Dut, clk: &Signal, cycles: u32) -> Result<(), SimError> {
        dut.signal("ena")?.set(1)?;
        dut.signal("ui_in")?.set(0)?;
        dut.signal("uio_in")?.set(0)?;
        dut.signal("rst_n")?.set(0)?;
        clk.clock_cycles(cycles).await;
        dut.signal("rst_n")?.set(1)?;
        Ok(())
    }

    async fn apply(dut: &Dut, clk: &Signal, x: i64) -> Result<u64, SimError> {
        dut.signal("ui_in")?.set(x)?;
        clk.clock_cycles(1).await;
        dut.timer(SimTime::from_ns(1)).await;
        dut.signal("uo_out")?.to_unsigned()
    }

    #[test]
    fn ports_follow_tiny_tapeout_pinout() {
        let names: Vec<String> = SigmoidModel::new().ports().into_iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            ["clk", "ena", "ui_in", "uio_in", "rst_n", "uo_out", "uio_out", "uio_oe"]
        );
        assert_eq!(SigmoidModel::new().name(), "tt_um_sigmoid_8bit");
    }

    #[test]
    fn output_unknown_before_first_clock() {
        let sim = Simulator::new(SigmoidModel::new()).unwrap();
        let outcome = sim
            .run(|dut| async move {
                dut.timer(SimTime::from_ns(1)).await;
                let uo_out = dut.signal("uo_out")?;
                Ok::<_, SimError>((uo_out.value(), dut.signal("uio_oe")?.to_unsigned()?))
            })
            .unwrap();
        let (uo_out, uio_oe) = outcome.value.unwrap();
        assert_eq!(uo_out, LogicArray::unknown(8));
        assert_eq!(uio_oe, 0);
    }

    #[test]
    fn reset_clears_output() {
        let sim = Simulator::new(SigmoidModel::new()).unwrap();
        let outcome = sim
            .run(|dut| async move {
                let clk = start_clock(&dut)?;
                reset(&dut, &clk, 10).await?;
                dut.timer(SimTime::from_ns(1)).await;
                dut.signal("uo_out")?.to_unsigned()
            })
            .unwrap();
        assert_eq!(outcome.value.unwrap(), 0);
    }

    #[test]
    fn reset_is_idempotent() {
        let sim = Simulator::new(SigmoidModel::new()).unwrap();
        let outcome = sim
            .run(|dut| async move {
                let clk = start_clock(&dut)?;
                reset(&dut, &clk, 10).await?;
                let once = apply(&dut, &clk, 10).await?;
                reset(&dut, &clk, 10).await?;
                reset(&dut, &clk, 10).await?;
                let twice = apply(&dut, &clk, 10).await?;
                Ok::<_, SimError>((once, twice))
            })
            .unwrap();
        assert_eq!(outcome.value.unwrap(), (168, 168));
    }

    #[test]
    fn loads_sigmoid_of_signed_input() {
        let sim = Simulator::new(SigmoidModel::new()).unwrap();
        let outcome = sim
            .run(|dut| async move {
                let clk = start_clock(&dut)?;
                reset(&dut, &clk, 2).await?;
                let mut out = Vec::new();
                for x in [-40, 0, 10, 39] {
                    out.push(apply(&dut, &clk, x).await?);
                }
                Ok::<_, SimError>(out)
            })
            .unwrap();
        assert_eq!(outcome.value.unwrap(), vec![0, 128, 168, 255]);
    }

    #[test]
    fn disabled_core_holds_output() {
        let sim = Simulator::new(SigmoidModel::new()).unwrap();
        let outcome = sim
            .run(|dut| async move {
                let clk = start_clock(&dut)?;
                reset(&dut, &clk, 2).await?;
                let first = apply(&dut, &clk, 10).await?;
                dut.signal("ena")?.set(0)?;
                let held = apply(&dut, &clk, -10).await?;
                Ok::<_, SimError>((first, held))
            })
            .unwrap();
        assert_eq!(outcome.value.unwrap(), (168, 168));
    }

    #[test]
    fn undriven_reset_gives_unknown_output() {
        let sim = Simulator::new(SigmoidModel::new()).unwrap();
        let err = sim
            .run(|dut| async move {
                let clk = start_clock(&dut)?;
                dut.signal("ena")?.set(1)?;
                apply(&dut, &clk, 10).await
            })
            .unwrap()
            .value
            .unwrap_err();
        assert!(matches!(err, SimError::Unresolvable { .. }));
    }

    #[test]
    fn stuck_at_fault_overrides_datapath() {
        let sim = Simulator::new(SigmoidModel::with_fault(Fault::StuckAt(0x55))).unwrap();
        let outcome = sim
            .run(|dut| async move {
                let clk = start_clock(&dut)?;
                reset(&dut, &clk, 2).await?;
                let zero_after_reset = dut.signal("uo_out")?.to_unsigned()?;
                let out = apply(&dut, &clk, 0).await?;
                Ok::<_, SimError>((zero_after_reset, out))
            })
            .unwrap();
        // Reset still clears the register; the fault is in the datapath.
        assert_eq!(outcome.value.unwrap(), (0, 0x55));
    }

    #[test]
    fn with_fault_records_fault() {
        assert_eq!(
            SigmoidModel::with_fault(Fault::SymmetricClamp).fault(),
            Some(Fault::SymmetricClamp)
        );
        assert_eq!(SigmoidModel::new().fault(), None);
    }
}
