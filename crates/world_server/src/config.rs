//! Configuration management for the world server.
//!
//! The TOML file has a `[world]` table (the index configuration), a
//! `[regions]` table naming the region file and a `[logging]` table.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::filter::Directive;
use world_index::WorldConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

fn default_region_file() -> String {
    "regions.scp".to_string()
}

fn default_land_id() -> u16 {
    3
}

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Spatial index configuration
    #[serde(default)]
    pub world: WorldConfig,
    /// Region file settings
    #[serde(default)]
    pub regions: RegionFileSettings,
    /// Flat terrain the index falls back to
    #[serde(default)]
    pub terrain: TerrainSettings,
    /// Logging configuration settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Where the static regions come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionFileSettings {
    /// Region file loaded at startup
    #[serde(default = "default_region_file")]
    pub file: String,
}

impl Default for RegionFileSettings {
    fn default() -> Self {
        Self {
            file: default_region_file(),
        }
    }
}

/// The land every tile has when no terrain data is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainSettings {
    #[serde(default = "default_land_id")]
    pub land_id: u16,
    #[serde(default)]
    pub z: i32,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            land_id: default_land_id(),
            z: 0,
        }
    }
}

/// Logging system configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
    /// Whether to output logs in JSON format
    #[serde(default)]
    pub json_format: bool,
    /// Per-module overrides on top of `level`, e.g. `world_index::movement=trace`
    #[serde(default)]
    pub directives: Vec<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            directives: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, a default configuration file is written at
    /// `path` and the defaults are returned.
    pub async fn load_from_file(path: &PathBuf) -> Result<Self> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            let config: AppConfig = toml::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?;
            Ok(config)
        } else {
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    /// Validates the configuration for consistency and correctness.
    ///
    /// # Returns
    ///
    /// `Ok(())` if the configuration is valid, or an error string describing the issue.
    pub fn validate(&self) -> Result<(), String> {
        self.world.validate()?;

        if self.regions.file.trim().is_empty() {
            return Err("Region file cannot be empty".to_string());
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid log level: {} (expected one of {})",
                self.logging.level,
                LOG_LEVELS.join(", ")
            ));
        }

        if let Some(bad) = self
            .logging
            .directives
            .iter()
            .find(|d| d.parse::<Directive>().is_err())
        {
            return Err(format!("Invalid log directive: {bad}"));
        }

        Ok(())
    }
}
