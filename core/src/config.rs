//! TOML configuration for the checker.

use crate::error::{CoreError, CoreResult};
use crate::export::gate::Capabilities;
use crate::scan::command::{CommandAnalyzer, DEFAULT_MAX_OUTPUT_BYTES};
use crate::scan::gateway::{AnalyzerGateway, PageAnalyzer};
use crate::scan::reference::ReferenceAnalyzer;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "a11y-check.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckerConfig {
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub capabilities: Capabilities,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzerKind {
    #[default]
    Reference,
    Command,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalyzerConfig {
    #[serde(default)]
    pub kind: AnalyzerKind,
    /// Engine executable, required when `kind = "command"`.
    #[serde(default)]
    pub program: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Command analyzer only: largest results document accepted on stdout.
    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: usize,
    /// Reference analyzer only.
    #[serde(default)]
    pub simulated_delay_ms: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            kind: AnalyzerKind::Reference,
            program: None,
            args: Vec::new(),
            timeout_secs: default_timeout_secs(),
            max_output_bytes: default_max_output_bytes(),
            simulated_delay_ms: 0,
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_output_bytes() -> usize {
    DEFAULT_MAX_OUTPUT_BYTES
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerConfig {
    #[serde(default = "default_ledger_path")]
    pub path: PathBuf,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: default_ledger_path(),
        }
    }
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from("a11y-ledger.json")
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Missing file means defaults; a present but malformed file is an error.
pub fn load_config(path: impl AsRef<Path>) -> CoreResult<CheckerConfig> {
    let path = path.as_ref();
    if !path.exists() {
        debug!("no config at {}, using defaults", path.display());
        return Ok(CheckerConfig::default());
    }
    let text = std::fs::read_to_string(path)?;
    parse_config(&text)
}

pub fn parse_config(text: &str) -> CoreResult<CheckerConfig> {
    let cfg: CheckerConfig =
        toml::from_str(text).map_err(|e| CoreError::Config(e.to_string()))?;
    if cfg.analyzer.timeout_secs == 0 {
        return Err(CoreError::Config(
            "analyzer.timeout_secs must be greater than zero".to_string(),
        ));
    }
    Ok(cfg)
}

pub fn build_gateway(cfg: &AnalyzerConfig) -> CoreResult<AnalyzerGateway> {
    let analyzer: Arc<dyn PageAnalyzer> = match cfg.kind {
        AnalyzerKind::Reference => Arc::new(
            ReferenceAnalyzer::new()
                .with_simulated_delay(Duration::from_millis(cfg.simulated_delay_ms)),
        ),
        AnalyzerKind::Command => {
            let program = cfg
                .program
                .as_deref()
                .filter(|p| !p.trim().is_empty())
                .ok_or_else(|| {
                    CoreError::Config("analyzer.program is required for kind = \"command\"".to_string())
                })?;
            Arc::new(
                CommandAnalyzer::new(program, cfg.args.clone())
                    .with_output_limit(cfg.max_output_bytes),
            )
        }
    };
    Ok(AnalyzerGateway::new(analyzer).with_timeout(Duration::from_secs(cfg.timeout_secs)))
}

#[cfg(test)]
mod tests {
    use super::{build_gateway, load_config, parse_config, AnalyzerConfig, AnalyzerKind};
    use crate::error::CoreError;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.analyzer.kind, AnalyzerKind::Reference);
        assert_eq!(cfg.analyzer.timeout_secs, 30);
        assert_eq!(cfg.ledger.path, PathBuf::from("a11y-ledger.json"));
        assert!(!cfg.capabilities.pdf_export);
        assert_eq!(cfg.log.level, "warn");
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let cfg = parse_config(
            r#"
[analyzer]
kind = "command"
program = "axe-runner"
args = ["--json", "{url}"]

[capabilities]
pdf_export = true
"#,
        )
        .unwrap();
        assert_eq!(cfg.analyzer.kind, AnalyzerKind::Command);
        assert_eq!(cfg.analyzer.program.as_deref(), Some("axe-runner"));
        assert_eq!(cfg.analyzer.timeout_secs, 30);
        assert_eq!(cfg.analyzer.max_output_bytes, 16 * 1024 * 1024);
        assert!(cfg.capabilities.pdf_export);
        assert_eq!(cfg.log.level, "warn");
    }

    #[test]
    fn malformed_or_zero_timeout_is_config_error() {
        assert!(matches!(
            parse_config("[analyzer]\nkind = \"browser\"\n"),
            Err(CoreError::Config(_))
        ));
        assert!(matches!(
            parse_config("[analyzer]\ntimeout_secs = 0\n"),
            Err(CoreError::Config(_))
        ));
    }

    #[test]
    fn command_kind_requires_program() {
        let cfg = AnalyzerConfig {
            kind: AnalyzerKind::Command,
            ..AnalyzerConfig::default()
        };
        assert!(matches!(build_gateway(&cfg), Err(CoreError::Config(_))));

        let cfg = AnalyzerConfig {
            timeout_secs: 5,
            ..AnalyzerConfig::default()
        };
        let gw = build_gateway(&cfg).unwrap();
        assert_eq!(gw.analyzer_name(), "reference");
        assert_eq!(gw.timeout(), Duration::from_secs(5));
    }
}
