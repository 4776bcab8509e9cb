//! ttsig CLI: runs the `tt_um_sigmoid_8bit` testbench.
//!
//! Provides `ttsig test` for the full fail-fast sweep, `ttsig probe` for
//! sampling one input, and `ttsig curve` for printing the transfer curve.

#![warn(missing_docs)]

mod curve;
mod probe;
mod settings;

use std::process;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use ttsig_device::Fault;
use ttsig_sim::SimTime;

/// ttsig: testbench for an 8-bit sigmoid circuit.
#[derive(Parser, Debug)]
#[command(name = "ttsig", version, about = "Testbench for the tt_um_sigmoid_8bit design")]
pub struct Cli {
    /// Only print warnings and errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// More log output; repeat for trace level.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Path to a `ttsig.toml` file, or a directory containing one.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check every input of the sweep against the expected output.
    Test(TestArgs),
    /// Sample the device for one input.
    Probe(ProbeArgs),
    /// Print the device's transfer curve.
    Curve(CurveArgs),
}

/// Arguments for the `ttsig test` subcommand.
#[derive(Parser, Debug)]
pub struct TestArgs {
    /// Wait after the sampling edge before reading `uo_out` (e.g. "1ns").
    #[arg(long)]
    pub settle: Option<SimTime>,

    /// Clock period (e.g. "10us").
    #[arg(long)]
    pub period: Option<SimTime>,

    /// Clock edges to hold reset before each check; at least 1.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub reset_cycles: Option<u32>,

    /// First input of the sweep.
    #[arg(long, allow_negative_numbers = true)]
    pub start: Option<i8>,

    /// Last input of the sweep, inclusive.
    #[arg(long, allow_negative_numbers = true)]
    pub end: Option<i8>,

    /// Write a VCD waveform to this path.
    #[arg(long)]
    pub vcd: Option<String>,

    /// Abort past this simulation time (e.g. "50ms").
    #[arg(long)]
    pub time_limit: Option<SimTime>,

    /// Inject a fault: stuck-at=N, off-by-one=X or symmetric-clamp.
    #[arg(long)]
    pub fault: Option<Fault>,

    /// Summary format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for the `ttsig probe` subcommand.
#[derive(Parser, Debug)]
pub struct ProbeArgs {
    /// Input value: a signed byte, or a real activation with `--float`.
    #[arg(allow_hyphen_values = true)]
    pub value: String,

    /// Read `value` as a real number and quantize it to Q4.4.
    #[arg(long)]
    pub float: bool,

    /// Wait after the sampling edge before reading `uo_out`.
    #[arg(long)]
    pub settle: Option<SimTime>,

    /// Inject a fault: stuck-at=N, off-by-one=X or symmetric-clamp.
    #[arg(long)]
    pub fault: Option<Fault>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for the `ttsig curve` subcommand.
#[derive(Parser, Debug)]
pub struct CurveArgs {
    /// First input.
    #[arg(long, default_value_t = -40, allow_negative_numbers = true)]
    pub from: i8,

    /// Last input, inclusive.
    #[arg(long, default_value_t = 39, allow_negative_numbers = true)]
    pub to: i8,

    /// Wait after the sampling edge before reading `uo_out`.
    #[arg(long)]
    pub settle: Option<SimTime>,

    /// Inject a fault: stuck-at=N, off-by-one=X or symmetric-clamp.
    #[arg(long)]
    pub fault: Option<Fault>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Verbosity level from repeated `-v`.
    pub verbose: u8,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

impl GlobalArgs {
    /// Log filter for these flags.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };

    init_logging(&global);

    let result = match cli.command {
        Command::Test(ref args) => test::run(args, &global),
        Command::Probe(ref args) => probe::run(args, &global),
        Command::Curve(ref args) => curve::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Logs go to stderr so that JSON on stdout stays parseable. `RUST_LOG`
/// overrides the level picked by `-q`/`-v`.
fn init_logging(global: &GlobalArgs) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(global.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
