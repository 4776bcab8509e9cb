//! Shared command plumbing: configuration lookup and model construction.

use std::path::{Path, PathBuf};

use ttsig_config::{load_config, load_config_file, resolve, ResolvedConfig};
use ttsig_device::{Fault, SigmoidModel, TOP_MODULE};
use ttsig_sim::{SimConfig, SimTime};
use ttsig_tb::ProbeConfig;

use crate::GlobalArgs;

/// Loads and resolves the configuration named by `--config`, or the
/// `ttsig.toml` in the current directory. A missing default file means
/// defaults.
pub fn load_settings(global: &GlobalArgs) -> Result<ResolvedConfig, Box<dyn std::error::Error>> {
    let config = match global.config.as_deref().map(Path::new) {
        Some(path) if path.is_dir() => load_config(path)?,
        Some(path) => load_config_file(path)?,
        None => load_config(&std::env::current_dir()?)?,
    };
    let resolved = resolve(&config)?;
    if resolved.top != TOP_MODULE {
        return Err(format!(
            "unknown design '{}': only {TOP_MODULE} is modeled",
            resolved.top
        )
        .into());
    }
    tracing::debug!(
        project = %resolved.name,
        period = %resolved.clock_period,
        "configuration loaded"
    );
    Ok(resolved)
}

/// The device model, with `fault` injected if given.
pub fn make_model(fault: Option<Fault>) -> SigmoidModel {
    match fault {
        Some(fault) => SigmoidModel::with_fault(fault),
        None => SigmoidModel::new(),
    }
}

/// Kernel options from the configuration, with an optional waveform override.
pub fn sim_config(settings: &ResolvedConfig, vcd: Option<&str>) -> SimConfig {
    SimConfig {
        time_limit: settings.time_limit,
        waveform_path: vcd.map(PathBuf::from).or_else(|| settings.waveform.clone()),
        max_deltas: None,
    }
}

/// Sampling options for `probe` and `curve`. `--settle` wins over
/// `[test] settle`, which wins over the 10 ns sampling default.
pub fn probe_config(settings: &ResolvedConfig, settle: Option<SimTime>) -> ProbeConfig {
    ProbeConfig {
        clock_port: settings.clock_port.clone(),
        clock_period: settings.clock_period,
        settle: settle
            .or(settings.settle)
            .unwrap_or(ProbeConfig::default().settle),
        reset_cycles: settings.reset_cycles,
    }
}
