// src/config.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::chart::DEFAULT_RETENTION_MS;
use crate::range::TimeRange;

pub const ENV_CONFIG_PATH: &str = "CHART_CONFIG_PATH";
const DEFAULT_TOML_PATH: &str = "config/chart.toml";
const DEFAULT_JSON_PATH: &str = "config/chart.json";

fn default_debounce_ms() -> u64 {
    50
}
fn default_prune_interval_ms() -> u64 {
    1000
}
fn default_retention_ms() -> i64 {
    DEFAULT_RETENTION_MS
}

/// Tunables for [`crate::aggregator::RollingEventAggregator`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AggregatorConfig {
    #[serde(default)]
    pub default_range: TimeRange,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_prune_interval_ms")]
    pub prune_interval_ms: u64,
    /// How long raw events are kept for re-aggregation.
    #[serde(default = "default_retention_ms")]
    pub retention_ms: i64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            default_range: TimeRange::default(),
            debounce_ms: default_debounce_ms(),
            prune_interval_ms: default_prune_interval_ms(),
            retention_ms: default_retention_ms(),
        }
    }
}

impl AggregatorConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn prune_interval(&self) -> Duration {
        Duration::from_millis(self.prune_interval_ms)
    }

    /// Load from an explicit path. TOML or JSON, picked by extension.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading chart config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg = parse(&content, ext.as_str())
            .with_context(|| format!("parsing chart config {}", path.display()))?;
        Ok(cfg.sanitized())
    }

    /// Load using env var + fallbacks:
    /// 1) $CHART_CONFIG_PATH
    /// 2) config/chart.toml
    /// 3) config/chart.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            } else {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
        }
        let toml_p = PathBuf::from(DEFAULT_TOML_PATH);
        if toml_p.exists() {
            return Self::load_from(&toml_p);
        }
        let json_p = PathBuf::from(DEFAULT_JSON_PATH);
        if json_p.exists() {
            return Self::load_from(&json_p);
        }
        Ok(Self::default())
    }

    fn sanitized(mut self) -> Self {
        // zero intervals would spin or never flush
        if self.debounce_ms == 0 {
            self.debounce_ms = default_debounce_ms();
        }
        if self.prune_interval_ms == 0 {
            self.prune_interval_ms = default_prune_interval_ms();
        }
        if self.retention_ms <= 0 {
            self.retention_ms = default_retention_ms();
        }
        self
    }
}

fn parse(s: &str, hint_ext: &str) -> Result<AggregatorConfig> {
    match hint_ext {
        "json" => Ok(serde_json::from_str(s)?),
        "toml" => Ok(toml::from_str(s)?),
        _ => toml::from_str(s)
            .or_else(|_| serde_json::from_str(s))
            .map_err(|e| anyhow!("unsupported chart config format: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let cfg = parse(r#"default_range = "3m""#, "toml").unwrap();
        assert_eq!(cfg.default_range, TimeRange::ThreeMinutes);
        assert_eq!(cfg.debounce_ms, 50);
        assert_eq!(cfg.prune_interval_ms, 1000);
        assert_eq!(cfg.retention_ms, 300_000);
    }

    #[test]
    fn json_and_sanitizing() {
        let cfg = parse(r#"{"debounce_ms": 0, "prune_interval_ms": 250}"#, "json")
            .unwrap()
            .sanitized();
        assert_eq!(cfg.debounce_ms, 50);
        assert_eq!(cfg.prune_interval(), Duration::from_millis(250));
    }

    #[test]
    fn unknown_extension_tries_both() {
        assert!(parse(r#"{"default_range": "5m"}"#, "").is_ok());
        assert!(parse("default_range = \"1m\"", "").is_ok());
        assert!(parse("default_range = \"9m\"", "").is_err());
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_then_fallbacks() {
        // Run in an empty temp dir so a real config/ in the repo doesn't interfere
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();

        env::remove_var(ENV_CONFIG_PATH);
        assert_eq!(AggregatorConfig::load_default().unwrap(), AggregatorConfig::default());

        fs::create_dir_all("config").unwrap();
        fs::write("config/chart.json", r#"{"default_range": "3m"}"#).unwrap();
        let v = AggregatorConfig::load_default().unwrap();
        assert_eq!(v.default_range, TimeRange::ThreeMinutes);

        // Env wins over fallbacks
        let p = tmp.path().join("custom.toml");
        fs::write(&p, "default_range = \"5m\"\ndebounce_ms = 20").unwrap();
        env::set_var(ENV_CONFIG_PATH, p.display().to_string());
        let v2 = AggregatorConfig::load_default().unwrap();
        assert_eq!(v2.default_range, TimeRange::FiveMinutes);
        assert_eq!(v2.debounce_ms, 20);

        env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml").display().to_string());
        assert!(AggregatorConfig::load_default().is_err());
        env::remove_var(ENV_CONFIG_PATH);

        env::set_current_dir(&old).unwrap();
    }
}
