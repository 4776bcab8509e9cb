//! Waveform recording.
//!
//! The kernel reports every committed signal change to a
//! [`WaveformRecorder`]. [`VcdRecorder`] writes IEEE 1364 Value Change Dump
//! text that GTKWave or Surfer can open.

use std::io::Write;

use ttsig_common::LogicArray;

use crate::error::SimError;
use crate::signal::SignalId;

/// A signal as announced to a recorder before the first change.
#[derive(Clone, Debug)]
pub struct TraceVar {
    /// Kernel ID of the signal.
    pub id: SignalId,
    /// Signal name.
    pub name: String,
    /// Width in bits.
    pub width: u32,
}

/// Sink for simulation waveforms.
pub trait WaveformRecorder {
    /// Declares all traced signals under one scope. Called once, before any change.
    fn declare(&mut self, scope: &str, vars: &[TraceVar]) -> Result<(), SimError>;

    /// Records that `id` took `value` at `time_fs`.
    fn change(&mut self, time_fs: u64, id: SignalId, value: &LogicArray) -> Result<(), SimError>;

    /// Flushes buffered output.
    fn finish(&mut self) -> Result<(), SimError>;
}

/// VCD writer with a 1 fs timescale.
pub struct VcdRecorder<W: Write> {
    writer: W,
    codes: Vec<(SignalId, String, u32)>,
    last_time: Option<u64>,
}

impl<W: Write> VcdRecorder<W> {
    /// Creates a recorder writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            codes: Vec::new(),
            last_time: None,
        }
    }

    /// Short identifier code for the `index`th variable, drawn from printable
    /// ASCII starting at `!`.
    fn id_code(index: usize) -> String {
        let mut code = String::new();
        let mut idx = index;
        loop {
            code.push((b'!' + (idx % 94) as u8) as char);
            idx /= 94;
            if idx == 0 {
                break;
            }
            idx -= 1;
        }
        code
    }

    fn format_value(value: &LogicArray) -> String {
        if value.width() == 1 {
            value.get(0).to_vcd_char().to_string()
        } else {
            let mut s = String::with_capacity(value.width() as usize + 1);
            s.push('b');
            s.extend(value.iter_msb_first().map(|b| b.to_vcd_char()));
            s
        }
    }
}

impl<W: Write> WaveformRecorder for VcdRecorder<W> {
    fn declare(&mut self, scope: &str, vars: &[TraceVar]) -> Result<(), SimError> {
        writeln!(self.writer, "$version")?;
        writeln!(self.writer, "  ttsig testbench")?;
        writeln!(self.writer, "$end")?;
        writeln!(self.writer, "$timescale")?;
        writeln!(self.writer, "  1fs")?;
        writeln!(self.writer, "$end")?;
        writeln!(self.writer, "$scope module {scope} $end")?;
        for (i, var) in vars.iter().enumerate() {
            let code = Self::id_code(i);
            if var.width == 1 {
                writeln!(self.writer, "$var wire 1 {code} {} $end", var.name)?;
            } else {
                writeln!(
                    self.writer,
                    "$var wire {} {code} {} [{}:0] $end",
                    var.width,
                    var.name,
                    var.width - 1
                )?;
            }
            self.codes.push((var.id, code, var.width));
        }
        writeln!(self.writer, "$upscope $end")?;
        writeln!(self.writer, "$enddefinitions $end")?;
        Ok(())
    }

    fn change(&mut self, time_fs: u64, id: SignalId, value: &LogicArray) -> Result<(), SimError> {
        if self.last_time != Some(time_fs) {
            writeln!(self.writer, "#{time_fs}")?;
            self.last_time = Some(time_fs);
        }
        let (_, code, width) = self
            .codes
            .iter()
            .find(|(sid, _, _)| *sid == id)
            .ok_or_else(|| SimError::UnknownSignal {
                name: format!("<undeclared trace #{}>", id.as_raw()),
            })?;
        let text = Self::format_value(value);
        if *width == 1 {
            writeln!(self.writer, "{text}{code}")?;
        } else {
            writeln!(self.writer, "{text} {code}")?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SimError> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars() -> Vec<TraceVar> {
        vec![
            TraceVar {
                id: SignalId::from_raw(0),
                name: "clk".into(),
                width: 1,
            },
            TraceVar {
                id: SignalId::from_raw(1),
                name: "uo_out".into(),
                width: 8,
            },
        ]
    }

    fn output(rec: VcdRecorder<Vec<u8>>) -> String {
        String::from_utf8(rec.writer).unwrap()
    }

    #[test]
    fn id_codes() {
        assert_eq!(VcdRecorder::<Vec<u8>>::id_code(0), "!");
        assert_eq!(VcdRecorder::<Vec<u8>>::id_code(93), "~");
        assert_eq!(VcdRecorder::<Vec<u8>>::id_code(94).len(), 2);
    }

    #[test]
    fn header_declares_vars() {
        let mut rec = VcdRecorder::new(Vec::new());
        rec.declare("tt_um_sigmoid_8bit", &vars()).unwrap();
        let out = output(rec);
        assert!(out.contains("$timescale"));
        assert!(out.contains("$scope module tt_um_sigmoid_8bit $end"));
        assert!(out.contains("$var wire 1 ! clk $end"));
        assert!(out.contains("$var wire 8 \" uo_out [7:0] $end"));
        assert!(out.contains("$enddefinitions $end"));
    }

    #[test]
    fn changes_grouped_by_timestamp() {
        let mut rec = VcdRecorder::new(Vec::new());
        rec.declare("top", &vars()).unwrap();
        rec.change(0, SignalId::from_raw(0), &LogicArray::from_bool(true))
            .unwrap();
        rec.change(0, SignalId::from_raw(1), &LogicArray::unknown(8))
            .unwrap();
        rec.change(5000, SignalId::from_raw(1), &LogicArray::from_unsigned(0x80, 8))
            .unwrap();
        rec.finish().unwrap();
        let out = output(rec);
        assert_eq!(out.matches("#0\n").count(), 1);
        assert!(out.contains("1!"));
        assert!(out.contains("bxxxxxxxx \""));
        assert!(out.contains("#5000\nb10000000 \""));
    }

    #[test]
    fn undeclared_signal_errors() {
        let mut rec = VcdRecorder::new(Vec::new());
        rec.declare("top", &vars()).unwrap();
        let err = rec
            .change(1, SignalId::from_raw(9), &LogicArray::new(1))
            .unwrap_err();
        assert!(matches!(err, SimError::UnknownSignal { .. }));
    }
}
