//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::resolve::resolve;
use crate::types::TtsigConfig;
use std::io::ErrorKind;
use std::path::Path;

/// Name of the configuration file looked up in a project directory.
pub const CONFIG_FILE_NAME: &str = "ttsig.toml";

/// Loads `<project_dir>/ttsig.toml`.
///
/// A missing file yields [`TtsigConfig::default`]; any other read error is
/// reported.
pub fn load_config(project_dir: &Path) -> Result<TtsigConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE_NAME);
    match std::fs::read_to_string(&config_path) {
        Ok(content) => load_config_from_str(&content),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(TtsigConfig::default()),
        Err(e) => Err(e.into()),
    }
}

/// Loads an explicitly named configuration file, which must exist.
pub fn load_config_file(path: &Path) -> Result<TtsigConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `ttsig.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<TtsigConfig, ConfigError> {
    let config: TtsigConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    // Resolution performs every value check; the result is discarded here.
    resolve(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let toml = r#"
[project]
name = "sigmoid"
top = "tt_um_sigmoid_8bit"

[clock]
frequency = "100KHz"
port = "clk"

[test]
settle = "10ns"
reset_cycles = 4
start = 20
end = -20
time_limit = "1s"
waveform = "sweep.vcd"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.project.name, "sigmoid");
        assert_eq!(config.clock.frequency.as_deref(), Some("100KHz"));
        assert_eq!(config.test.settle.as_deref(), Some("10ns"));
        assert_eq!(config.test.reset_cycles, 4);
        assert_eq!(config.test.waveform.as_deref(), Some("sweep.vcd"));
    }

    #[test]
    fn syntax_error_is_parse_error() {
        let err = load_config_from_str("[test\nsettle = ").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn bad_value_is_validation_error() {
        let err = load_config_from_str("[test]\nsettle = \"soon\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config, TtsigConfig::default());
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[clock]\nperiod = \"20us\"\n",
        )
        .unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.clock.period.as_deref(), Some("20us"));
    }

    #[test]
    fn explicit_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_file(&dir.path().join("other.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }

    #[test]
    fn explicit_file_loads() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "[test]\nstart = 5\nend = -5\n").unwrap();
        let config = load_config_file(file.path()).unwrap();
        assert_eq!((config.test.start, config.test.end), (5, -5));
    }
}
