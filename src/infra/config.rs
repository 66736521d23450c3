//! Configuration loading from TOML files
//!
//! Config file is selected via:
//! 1. --config <path> command line argument (handled by the binary)
//! 2. CONFIG_FILE environment variable
//! 3. Default: config/cleanroom.toml

use anyhow::Context;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Room ID of the clean room in the access database
pub const CLEAN_ROOM_ID: i64 = 24;

const DEFAULT_CONFIG_PATH: &str = "config/cleanroom.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Tsv,
    Jsonl,
}

impl std::str::FromStr for ReportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tsv" => Ok(ReportFormat::Tsv),
            "jsonl" => Ok(ReportFormat::Jsonl),
            other => anyhow::bail!("unknown report format '{}', expected tsv or jsonl", other),
        }
    }
}

impl ReportFormat {
    pub fn as_str(&self) -> &str {
        match self {
            ReportFormat::Tsv => "tsv",
            ReportFormat::Jsonl => "jsonl",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Room to report on
    #[serde(default = "default_room_id")]
    pub room_id: i64,
    /// Display name, only used in logs
    #[serde(default = "default_site_name")]
    pub name: String,
}

fn default_room_id() -> i64 {
    CLEAN_ROOM_ID
}

fn default_site_name() -> String {
    "clean room".to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self { room_id: default_room_id(), name: default_site_name() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Tab-separated export of the room access table ("-" for stdin)
    #[serde(default = "default_access_log")]
    pub access_log: String,
    /// Direction label meaning badge-in; all other labels are badge-out
    #[serde(default = "default_in_direction")]
    pub in_direction: String,
    /// chrono format string for the datetime column
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
}

fn default_access_log() -> String {
    "-".to_string()
}

fn default_in_direction() -> String {
    "InDirection".to_string()
}

fn default_timestamp_format() -> String {
    "%Y-%m-%d %H:%M:%S".to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            access_log: default_access_log(),
            in_direction: default_in_direction(),
            timestamp_format: default_timestamp_format(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Output path ("-" for stdout)
    #[serde(default = "default_report_output")]
    pub output: String,
    #[serde(default = "default_report_format")]
    pub format: ReportFormat,
    /// Append an Hours column to the TSV report
    #[serde(default)]
    pub include_hours: bool,
}

fn default_report_output() -> String {
    "-".to_string()
}

fn default_report_format() -> ReportFormat {
    ReportFormat::Tsv
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: default_report_output(),
            format: default_report_format(),
            include_hours: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Main configuration struct passed to the report run
#[derive(Debug, Clone)]
pub struct Config {
    room_id: i64,
    site_name: String,
    access_log: String,
    in_direction: String,
    timestamp_format: String,
    report_output: String,
    report_format: ReportFormat,
    include_hours: bool,
    config_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default(), "default".to_string())
    }
}

impl Config {
    fn from_toml(toml_config: TomlConfig, config_file: String) -> Self {
        Self {
            room_id: toml_config.site.room_id,
            site_name: toml_config.site.name,
            access_log: toml_config.source.access_log,
            in_direction: toml_config.source.in_direction,
            timestamp_format: toml_config.source.timestamp_format,
            report_output: toml_config.report.output,
            report_format: toml_config.report.format,
            include_hours: toml_config.report.include_hours,
            config_file,
        }
    }

    /// Config file path when none is given on the command line
    pub fn resolve_config_path() -> String {
        env::var("CONFIG_FILE").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let toml_config: TomlConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(Self::from_toml(toml_config, path.display().to_string()))
    }

    /// Load configuration from a path, falling back to defaults on any error
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %format!("{:#}", e), "config_load_failed_using_defaults");
                Self::default()
            }
        }
    }

    // Getters for all config fields
    pub fn room_id(&self) -> i64 {
        self.room_id
    }

    pub fn site_name(&self) -> &str {
        &self.site_name
    }

    pub fn access_log(&self) -> &str {
        &self.access_log
    }

    pub fn in_direction(&self) -> &str {
        &self.in_direction
    }

    pub fn timestamp_format(&self) -> &str {
        &self.timestamp_format
    }

    pub fn report_output(&self) -> &str {
        &self.report_output
    }

    pub fn report_format(&self) -> ReportFormat {
        self.report_format
    }

    pub fn include_hours(&self) -> bool {
        self.include_hours
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    // Command line overrides
    pub fn with_room_id(mut self, room_id: i64) -> Self {
        self.room_id = room_id;
        self
    }

    pub fn with_access_log(mut self, path: &str) -> Self {
        self.access_log = path.to_string();
        self
    }

    pub fn with_report_output(mut self, path: &str) -> Self {
        self.report_output = path.to_string();
        self
    }

    pub fn with_report_format(mut self, format: ReportFormat) -> Self {
        self.report_format = format;
        self
    }

    pub fn with_include_hours(mut self, include_hours: bool) -> Self {
        self.include_hours = include_hours;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.room_id(), 24);
        assert_eq!(config.access_log(), "-");
        assert_eq!(config.in_direction(), "InDirection");
        assert_eq!(config.timestamp_format(), "%Y-%m-%d %H:%M:%S");
        assert_eq!(config.report_output(), "-");
        assert_eq!(config.report_format(), ReportFormat::Tsv);
        assert!(!config.include_hours());
        assert_eq!(config.config_file(), "default");
    }

    #[test]
    fn test_partial_toml_uses_section_defaults() {
        let toml_config: TomlConfig = toml::from_str(
            r#"
[report]
format = "jsonl"
"#,
        )
        .unwrap();
        let config = Config::from_toml(toml_config, "inline".to_string());

        assert_eq!(config.report_format(), ReportFormat::Jsonl);
        assert_eq!(config.report_output(), "-");
        assert_eq!(config.room_id(), CLEAN_ROOM_ID);
        assert_eq!(config.in_direction(), "InDirection");
    }

    #[test]
    fn test_overrides() {
        let config = Config::default()
            .with_room_id(7)
            .with_access_log("access.tsv")
            .with_report_output("out/visits.tsv")
            .with_report_format(ReportFormat::Jsonl)
            .with_include_hours(true);

        assert_eq!(config.room_id(), 7);
        assert_eq!(config.access_log(), "access.tsv");
        assert_eq!(config.report_output(), "out/visits.tsv");
        assert_eq!(config.report_format(), ReportFormat::Jsonl);
        assert!(config.include_hours());
    }

    #[test]
    fn test_report_format_from_str() {
        assert_eq!("tsv".parse::<ReportFormat>().unwrap(), ReportFormat::Tsv);
        assert_eq!("jsonl".parse::<ReportFormat>().unwrap(), ReportFormat::Jsonl);
        assert!("csv".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn test_resolve_config_path_from_env() {
        // Only test in this crate that touches CONFIG_FILE
        env::remove_var("CONFIG_FILE");
        assert_eq!(Config::resolve_config_path(), "config/cleanroom.toml");

        env::set_var("CONFIG_FILE", "config/lab.toml");
        assert_eq!(Config::resolve_config_path(), "config/lab.toml");

        env::remove_var("CONFIG_FILE");
    }
}
