// ABOUTME: Configuration management for the apiforge CLI
// ABOUTME: Handles loading configuration from YAML files and merging environment variables

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub overrides_path: Option<PathBuf>,

    #[serde(default)]
    pub proxy_name: Option<String>,

    #[serde(default = "default_environments")]
    pub environments: Vec<String>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

fn default_environments() -> Vec<String> {
    vec!["dev".to_string(), "uat".to_string(), "prod".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            overrides_path: None,
            proxy_name: None,
            environments: default_environments(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file path or default locations
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => Self::find_config_file(),
        };

        let mut config = if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            serde_yaml::from_str(&contents)?
        } else {
            Config::default()
        };

        config.merge_env()?;
        Ok(config)
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> PathBuf {
        if let Some(home_dir) = dirs::home_dir() {
            let home_config = home_dir.join(".apiforge").join("config.yaml");
            if home_config.exists() {
                return home_config;
            }
        }

        let possible_paths = [
            "apiforge.yaml",
            "apiforge.yml",
            ".apiforge.yaml",
            ".apiforge.yml",
        ];

        possible_paths
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
            .unwrap_or_else(|| PathBuf::from("apiforge.yaml"))
    }

    /// Merge environment variables into configuration
    fn merge_env(&mut self) -> Result<()> {
        self.apply_env(|key| std::env::var(key).ok())
    }

    fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("APIFORGE_OVERRIDES_PATH") {
            self.overrides_path = Some(PathBuf::from(path));
        }
        if let Some(proxy) = lookup("APIFORGE_PROXY_NAME") {
            self.proxy_name = Some(proxy);
        }
        if let Some(environments) = lookup("APIFORGE_ENVIRONMENTS") {
            let parsed: Vec<String> = environments
                .split(',')
                .map(str::trim)
                .filter(|env| !env.is_empty())
                .map(str::to_string)
                .collect();
            if parsed.is_empty() {
                anyhow::bail!("APIFORGE_ENVIRONMENTS must list at least one environment");
            }
            self.environments = parsed;
        }

        // Logging configuration
        if let Some(level) = lookup("APIFORGE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("APIFORGE_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Where template overrides are persisted
    pub fn overrides_path(&self) -> PathBuf {
        if let Some(path) = &self.overrides_path {
            return path.clone();
        }

        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".apiforge")
            .join("overrides.json")
    }

    /// Non-empty proxy name, if configured
    pub fn proxy_name(&self) -> Option<&str> {
        self.proxy_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}
