//! Configuration file management for ais-decode.
//!
//! Reads/writes `~/.ais-decode/config.yaml` with the NMEA feed address and
//! output preferences. The file is a small YAML subset parsed by hand:
//! top-level sections with indented `key: value` pairs.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::warn;

use crate::types::AisError;

/// Full configuration structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub feed: FeedConfig,
    pub output: OutputConfig,
}

/// TCP source of NMEA lines (a receiver or an aggregator).
#[derive(Debug, Clone, PartialEq)]
pub struct FeedConfig {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub reconnect_delay_secs: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Print a per-type summary table when the input ends.
    pub summary: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One JSON object per line.
    Json,
    /// Rust debug formatting.
    Debug,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Debug => "debug",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = AisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "debug" => Ok(OutputFormat::Debug),
            other => Err(AisError::Config(format!("unknown output format: {other}"))),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            feed: FeedConfig {
                name: "default".into(),
                host: "127.0.0.1".into(),
                port: 10110,
                reconnect_delay_secs: 5,
            },
            output: OutputConfig {
                format: OutputFormat::Json,
                summary: false,
            },
        }
    }
}

/// Get the config directory path (`~/.ais-decode/`).
pub fn config_dir() -> PathBuf {
    dirs_home().join(".ais-decode")
}

/// Get the config file path.
pub fn config_file() -> PathBuf {
    config_dir().join("config.yaml")
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Load config from `~/.ais-decode/config.yaml`.
///
/// Returns default config if the file doesn't exist or can't be read.
pub fn load_config() -> Config {
    load_config_from(&config_file())
}

pub fn load_config_from(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(text) => parse_config(&text),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "unreadable config, using defaults");
            Config::default()
        }
    }
}

/// Save config to `~/.ais-decode/config.yaml`.
pub fn save_config(config: &Config) -> Result<PathBuf, AisError> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let path = config_file();
    save_config_to(config, &path)?;
    Ok(path)
}

pub fn save_config_to(config: &Config, path: &Path) -> Result<(), AisError> {
    std::fs::write(path, serialize_config(config))
        .map_err(|e| AisError::Config(format!("{}: {e}", path.display())))
}

/// Parse simple YAML-like config text. Unknown keys and bad values are
/// skipped with a warning; whatever parses overrides the defaults.
fn parse_config(text: &str) -> Config {
    let mut config = Config::default();
    let mut current_section: Option<String> = None;

    for line in text.lines() {
        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }

        let is_indented = line.starts_with("  ") || line.starts_with('\t');

        let Some((key, val)) = stripped.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let val = val.trim();

        if !is_indented {
            current_section = val.is_empty().then(|| key.to_string());
            continue;
        }

        match (current_section.as_deref(), key) {
            (Some("feed"), "name") => {
                if let Some(v) = parse_string_value(val) {
                    config.feed.name = v;
                }
            }
            (Some("feed"), "host") => {
                if let Some(v) = parse_string_value(val) {
                    config.feed.host = v;
                }
            }
            (Some("feed"), "port") => match val.parse::<u16>() {
                Ok(v) => config.feed.port = v,
                Err(_) => warn!(value = val, "ignoring bad feed.port"),
            },
            (Some("feed"), "reconnect_delay_secs") => match val.parse::<u64>() {
                Ok(v) => config.feed.reconnect_delay_secs = v,
                Err(_) => warn!(value = val, "ignoring bad feed.reconnect_delay_secs"),
            },
            (Some("output"), "format") => {
                match parse_string_value(val).map(|v| v.parse::<OutputFormat>()) {
                    Some(Ok(format)) => config.output.format = format,
                    _ => warn!(value = val, "ignoring bad output.format"),
                }
            }
            (Some("output"), "summary") => match parse_bool_value(val) {
                Some(v) => config.output.summary = v,
                None => warn!(value = val, "ignoring bad output.summary"),
            },
            (section, key) => {
                warn!(section = ?section, key, "unknown config key");
            }
        }
    }

    config
}

fn parse_string_value(val: &str) -> Option<String> {
    if val == "null" || val == "~" || val.is_empty() {
        return None;
    }
    if (val.starts_with('"') && val.ends_with('"') && val.len() >= 2)
        || (val.starts_with('\'') && val.ends_with('\'') && val.len() >= 2)
    {
        return Some(val[1..val.len() - 1].to_string());
    }
    Some(val.to_string())
}

fn parse_bool_value(val: &str) -> Option<bool> {
    match val {
        "true" | "yes" | "on" => Some(true),
        "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Serialize config to YAML-like text.
fn serialize_config(config: &Config) -> String {
    let mut lines = vec!["# ais-decode configuration".to_string(), String::new()];

    lines.push("feed:".into());
    lines.push(format!("  name: \"{}\"", config.feed.name));
    lines.push(format!("  host: \"{}\"", config.feed.host));
    lines.push(format!("  port: {}", config.feed.port));
    lines.push(format!(
        "  reconnect_delay_secs: {}",
        config.feed.reconnect_delay_secs
    ));
    lines.push(String::new());

    lines.push("output:".into());
    lines.push(format!("  format: {}", config.output.format.as_str()));
    lines.push(format!("  summary: {}", config.output.summary));

    lines.join("\n") + "\n"
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
