// src/core/config_manager.rs
//! Client configuration: defaults, optional YAML file, environment overrides

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::progress::CANDIDATE_STEPS;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_CONFIG_FILE: &str = "talentalign.yaml";

const DEFAULT_TIMEOUT_SECS: u64 = 400;

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment: String,
    pub service: ServiceConfig,
    pub ui: UiConfig,
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub api_url: String,
    /// 0 disables the client-side timeout
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Simulated delays for the first three analysis steps
    pub step_delays_ms: Vec<u64>,
    /// Pause before the last step is marked completed
    pub final_step_delay_ms: u64,
    pub page_size: usize,
    pub toast_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub preferences_file: PathBuf,
    pub export_dir: PathBuf,
}

/// One environment section of the YAML file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct EnvironmentSection {
    service: Option<ServiceConfig>,
    ui: Option<UiConfig>,
    paths: Option<PathsConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    local: EnvironmentSection,
    production: EnvironmentSection,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            step_delays_ms: vec![300, 300, 500],
            final_step_delay_ms: 300,
            page_size: 6,
            toast_seconds: 5,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            preferences_file: PathBuf::from(".talentalign").join("preferences.toml"),
            export_dir: PathBuf::from("."),
        }
    }
}

impl UiConfig {
    pub fn step_delays(&self) -> Vec<Duration> {
        self.step_delays_ms
            .iter()
            .map(|ms| Duration::from_millis(*ms))
            .collect()
    }

    pub fn final_step_delay(&self) -> Duration {
        Duration::from_millis(self.final_step_delay_ms)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_secs(self.toast_seconds)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self {
            environment: "local".to_string(),
            service: ServiceConfig::default(),
            ui: UiConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

impl ConfigManager {
    /// Load from `talentalign.yaml` in the working directory, if present
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Load all configurations: defaults, then the file, then the environment
    pub fn load_from(path: &Path) -> Result<Self> {
        let environment = Self::get_environment();
        info!("Loading client configuration for environment: {}", environment);

        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Self::from_yaml(&content, &environment)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            Self {
                environment,
                ..Self::default()
            }
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn from_yaml(content: &str, environment: &str) -> Result<Self> {
        let file: ConfigFile = serde_yaml::from_str(content)?;
        let section = match environment {
            "production" => file.production,
            _ => file.local,
        };

        Ok(Self {
            environment: environment.to_string(),
            service: section.service.unwrap_or_default(),
            ui: section.ui.unwrap_or_default(),
            paths: section.paths.unwrap_or_default(),
        })
    }

    fn get_environment() -> String {
        std::env::var("TALENTALIGN_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("TALENTALIGN_API_URL") {
            self.service.api_url = url;
        }

        if let Ok(timeout) = std::env::var("TALENTALIGN_TIMEOUT_SECS") {
            self.service.timeout_seconds = timeout
                .parse()
                .map_err(|_| anyhow::anyhow!("TALENTALIGN_TIMEOUT_SECS must be a number of seconds"))?;
        }

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if !self.service.api_url.starts_with("http://") && !self.service.api_url.starts_with("https://") {
            anyhow::bail!("API URL must start with http:// or https://: {}", self.service.api_url);
        }
        if self.ui.page_size == 0 {
            anyhow::bail!("Page size must be at least 1");
        }
        // One delay per step between the first and the last
        let timed_steps = CANDIDATE_STEPS.len() - 2;
        if self.ui.step_delays_ms.len() != timed_steps {
            anyhow::bail!(
                "ui.step_delays_ms must list exactly {} delays, got {}",
                timed_steps,
                self.ui.step_delays_ms.len()
            );
        }
        Ok(())
    }

    pub fn with_api_url(mut self, url: String) -> Self {
        self.service.api_url = url;
        self
    }
}
