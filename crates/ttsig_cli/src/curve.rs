//! `ttsig curve`: print the transfer curve.

use ttsig_tb::{run_transfer_curve, CurvePoint};

use crate::settings::{load_settings, make_model, probe_config, sim_config};
use crate::{CurveArgs, GlobalArgs, ReportFormat};

/// Runs the `ttsig curve` command.
pub fn run(args: &CurveArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let settings = load_settings(global)?;
    let config = probe_config(&settings, args.settle);
    let inputs = curve_inputs(args.from, args.to);
    let points = run_transfer_curve(
        make_model(args.fault),
        &inputs,
        &config,
        &sim_config(&settings, None),
    )?;

    match args.format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&points)?),
        ReportFormat::Text => print!("{}", render_text(&points)),
    }
    Ok(0)
}

/// Inputs from `from` to `to` inclusive, in either direction.
fn curve_inputs(from: i8, to: i8) -> Vec<i8> {
    if from <= to {
        (from..=to).collect()
    } else {
        (to..=from).rev().collect()
    }
}

fn render_text(points: &[CurvePoint]) -> String {
    let mut out = String::from("ui_in  uo_out  expected\n");
    for p in points {
        let mark = if p.output == p.expected { "" } else { "  <- differs" };
        out.push_str(&format!("{:>5}  {:>6}  {:>8}{mark}\n", p.input, p.output, p.expected));
    }
    out
}
