use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub connection: ConnectionDefaults,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SimulationConfig {
    // Terminal round-trip, milliseconds
    pub terminal_latency_ms: (u64, u64),
    // Panel round-trip, milliseconds
    pub panel_latency_ms: (u64, u64),
    // Share of panel executions marked failed
    pub panel_failure_rate: f64,
    // Unknown terminal input above this draw reports "command not found"
    pub not_found_threshold: f64,
    pub working_dir: String,
    // Skip every artificial delay
    pub no_delay: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            terminal_latency_ms: (500, 1500),
            panel_latency_ms: (1000, 3000),
            panel_failure_rate: 0.1,
            not_found_threshold: 0.8,
            working_dir: "/var/lib/validator".to_string(),
            no_delay: false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ConnectionDefaults {
    pub test_delay_ms: u64,
    pub test_success_rate: f64,
    pub connect_delay_ms: u64,
    pub connect_success_rate: f64,
    pub username: String,
    pub use_tls: bool,
    pub timeout_secs: u32,
}

impl Default for ConnectionDefaults {
    fn default() -> Self {
        Self {
            test_delay_ms: 1500,
            test_success_rate: 0.7,
            connect_delay_ms: 2000,
            connect_success_rate: 0.8,
            username: "root".to_string(),
            use_tls: true,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DisplayConfig {
    pub language: String,
    // Panel results kept, newest first
    pub max_results: usize,
    // Terminal records rendered below the header
    pub visible_records: usize,
    pub metrics_interval_secs: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            language: "auto".to_string(),
            max_results: 10,
            visible_records: 12,
            metrics_interval_secs: 3,
        }
    }
}

impl Config {
    /// Load `~/.vdash/config.toml`, writing the defaults on first run.
    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_path();

        let mut config = if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .with_context(|| format!("reading {}", config_path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("parsing {}", config_path.display()))?
        } else {
            let config = Config::default();
            if let Err(e) = config.save() {
                log::warn!("could not write default config: {e:#}");
            }
            config
        };
        config.apply_env();
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path();
        if let Some(config_dir) = config_path.parent() {
            fs::create_dir_all(config_dir)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&config_path, content)?;
        Ok(())
    }

    fn get_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".vdash")
            .join("config.toml")
    }

    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("VDASH_NO_DELAY") {
            let v = v.to_lowercase();
            self.simulation.no_delay = !(v == "0" || v == "false" || v.is_empty());
        }
    }

    /// Seed from `VDASH_SEED`, if it parses.
    pub fn env_seed() -> Option<u64> {
        std::env::var("VDASH_SEED").ok()?.trim().parse().ok()
    }

    pub fn get_effective_language(&self) -> String {
        if self.display.language == "auto" {
            std::env::var("LANG")
                .unwrap_or_else(|_| "en_US".to_string())
                .split('.')
                .next()
                .unwrap_or("en")
                .to_string()
        } else {
            self.display.language.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dashboard_behaviour() {
        let config = Config::default();
        assert_eq!(config.simulation.terminal_latency_ms, (500, 1500));
        assert_eq!(config.simulation.panel_latency_ms, (1000, 3000));
        assert_eq!(config.display.max_results, 10);
        assert_eq!(config.display.metrics_interval_secs, 3);
        assert_eq!(config.connection.timeout_secs, 30);
    }

    #[test]
    fn partial_file_fills_missing_sections() {
        let config: Config = toml::from_str(
            r#"
            [simulation]
            panel_failure_rate = 0.5

            [display]
            language = "zh_CN"
            "#,
        )
        .unwrap();
        assert_eq!(config.simulation.panel_failure_rate, 0.5);
        assert_eq!(config.simulation.working_dir, "/var/lib/validator");
        assert_eq!(config.display.language, "zh_CN");
        assert_eq!(config.display.max_results, 10);
        assert_eq!(config.connection.username, "root");
    }

    #[test]
    fn round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.simulation.not_found_threshold, 0.8);
        assert_eq!(back.connection.connect_delay_ms, 2000);
    }

    #[test]
    fn explicit_language_wins() {
        let mut config = Config::default();
        config.display.language = "en".into();
        assert_eq!(config.get_effective_language(), "en");
    }
}
