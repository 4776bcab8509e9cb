//! `ttsig probe`: sample the device for a single input.

use ttsig_tb::{quantize, reference_activation, run_transfer_curve};

use crate::settings::{load_settings, make_model, probe_config, sim_config};
use crate::{GlobalArgs, ProbeArgs, ReportFormat};

/// Parsed probe input.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ProbeInput {
    /// A raw `ui_in` byte.
    Raw(i8),
    /// A real activation and its Q4.4 encoding.
    Real { value: f32, encoded: i8 },
}

impl ProbeInput {
    fn encoded(self) -> i8 {
        match self {
            ProbeInput::Raw(x) => x,
            ProbeInput::Real { encoded, .. } => encoded,
        }
    }
}

fn parse_input(text: &str, float: bool) -> Result<ProbeInput, Box<dyn std::error::Error>> {
    if float {
        let value: f32 = text
            .parse()
            .map_err(|e| format!("invalid activation '{text}': {e}"))?;
        if !value.is_finite() {
            return Err(format!("activation must be finite, got '{text}'").into());
        }
        Ok(ProbeInput::Real {
            value,
            encoded: quantize(value),
        })
    } else {
        let x: i8 = text.parse().map_err(|_| {
            format!("'{text}' is not a signed byte (-128..=127); pass --float for real values")
        })?;
        Ok(ProbeInput::Raw(x))
    }
}

/// Runs the `ttsig probe` command.
pub fn run(args: &ProbeArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let input = parse_input(&args.value, args.float)?;
    let settings = load_settings(global)?;
    let config = probe_config(&settings, args.settle);

    let points = run_transfer_curve(
        make_model(args.fault),
        &[input.encoded()],
        &config,
        &sim_config(&settings, None),
    )?;
    let Some(point) = points.first() else {
        return Err("probe returned no sample".into());
    };

    match (args.format, input) {
        (ReportFormat::Json, _) => {
            let mut json = serde_json::to_value(point)?;
            json["probability"] = serde_json::json!(point.probability());
            if let ProbeInput::Real { value, .. } = input {
                json["activation"] = serde_json::json!(value);
                json["reference"] = serde_json::json!(reference_activation(value));
            }
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        (ReportFormat::Text, ProbeInput::Raw(x)) => {
            println!("ui_in={x} -> uo_out={} (expected {})", point.output, point.expected);
        }
        (ReportFormat::Text, ProbeInput::Real { value, encoded }) => {
            println!(
                "activation {value} -> ui_in={encoded} -> uo_out={} ({:.4}, reference {:.4})",
                point.output,
                point.probability(),
                reference_activation(value)
            );
        }
    }
    Ok(0)
}
