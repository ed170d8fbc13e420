//! # World Server - Main Entry Point
//!
//! Operator host for a [`world_index::WorldIndex`]: loads the configuration
//! and the static region file, resolves and checks the region hierarchy and
//! answers point queries from the command line.
//!
//! ## Quick Start
//!
//! ```bash
//! # Load the region file named in world.toml (created with defaults if missing)
//! world_server
//!
//! # Check a region file and probe a few points
//! world_server --regions map0.scp --check --probe 1495,1629 --probe 100,100,1
//!
//! # Normalize a region file
//! world_server --regions map0.scp --resave map0.clean.scp
//!
//! # JSON logging
//! world_server --json-logs --log-level debug
//! ```
//!
//! ## Configuration
//!
//! The server loads configuration from a TOML file (default: `world.toml`)
//! with `[world]`, `[regions]`, `[terrain]` and `[logging]` tables. If the
//! file doesn't exist, a default configuration will be created.

use tracing::error;

pub mod app;
pub mod cli;
pub mod config;
pub mod logging;

use app::Application;
use cli::CliArgs;
use config::AppConfig;

/// Main entry point for the world server.
///
/// # Exit Codes
///
/// * **0**: Successful execution
/// * **1**: Error during startup, configuration, or region loading
pub async fn init() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Load configuration to get logging settings
    let mut config = AppConfig::load_from_file(&args.config_path)
        .await
        .unwrap_or_default();
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }

    if let Err(e) = logging::setup_logging(&config, args.json_logs) {
        eprintln!("❌ Failed to setup logging: {e}");
        std::process::exit(1);
    }

    match Application::new(args).await {
        Ok(app) => {
            if let Err(e) = app.run().await {
                error!("❌ Application error: {:?}", e);
                std::process::exit(1);
            }
        }
        Err(e) => {
            error!("❌ Failed to start application: {e:?}");
            std::process::exit(1);
        }
    }

    Ok(())
}

pub use app::{ProbeResult, RunSummary};
pub use config::{LoggingSettings, RegionFileSettings, TerrainSettings};

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use world_index::Point4D;

    const REGIONS: &str = r#"
[StaticRegion a_world]
name="World"
rect=0,0,6143,4095

[StaticRegion a_britain]
name="Britain"
parent=(a_world)
rect=1296,1480,1640,1788

[StaticRegion a_britain_bank]
name="Bank"
parent=(a_britain)
rect=1420,1680,1440,1696

[StaticRegion a_moonglow]
name="Moonglow"
parent=(a_world)
rect=1600,1700,1700,1800
"#;

    fn args_in(dir: &Path) -> CliArgs {
        CliArgs {
            config_path: dir.join("world.toml"),
            regions_file: Some(dir.join("regions.scp")),
            log_level: None,
            json_logs: false,
            check: false,
            resave: None,
            probes: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_run_loads_and_probes() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("regions.scp"), REGIONS).await.unwrap();

        let args = CliArgs {
            probes: vec![Point4D::new(1430, 1690, 0, 0), Point4D::new(10, 10, 0, 0)],
            ..args_in(dir.path())
        };
        let summary = Application::new(args).await.unwrap().run().await.unwrap();

        assert_eq!(summary.static_regions, 4);
        assert_eq!(summary.hierarchy_depth, 2);
        assert!(summary.conflicts.is_empty());
        assert_eq!(
            summary.probes[0].hierarchy.as_deref(),
            Some("Bank in Britain in World")
        );
        assert_eq!(summary.probes[1].hierarchy.as_deref(), Some("World"));
        assert!(dir.path().join("world.toml").exists());
    }

    #[tokio::test]
    async fn test_check_reports_overlapping_neighbours() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("regions.scp"), REGIONS).await.unwrap();

        let args = CliArgs {
            check: true,
            ..args_in(dir.path())
        };
        let summary = Application::new(args).await.unwrap().run().await.unwrap();
        assert_eq!(summary.conflicts, vec!["a_britain", "a_moonglow"]);
    }

    #[tokio::test]
    async fn test_resave_writes_a_loadable_file() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("regions.scp"), REGIONS).await.unwrap();
        let out = dir.path().join("resaved.scp");

        let args = CliArgs {
            resave: Some(out.clone()),
            ..args_in(dir.path())
        };
        let summary = Application::new(args).await.unwrap().run().await.unwrap();
        assert_eq!(summary.resaved_to, Some(out.clone()));

        let again = CliArgs {
            regions_file: Some(out),
            ..args_in(dir.path())
        };
        let reloaded = Application::new(again).await.unwrap().run().await.unwrap();
        assert_eq!(reloaded.static_regions, 4);
        assert_eq!(reloaded.hierarchy_depth, 2);
    }

    #[tokio::test]
    async fn test_missing_region_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let args = CliArgs {
            regions_file: Some(dir.path().join("nowhere.scp")),
            ..args_in(dir.path())
        };
        let err = Application::new(args).await.unwrap().run().await.unwrap_err();
        assert!(format!("{err:#}").contains("nowhere.scp"));
    }

    #[tokio::test]
    async fn test_invalid_override_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let args = CliArgs {
            log_level: Some("chatty".to_string()),
            ..args_in(dir.path())
        };
        assert!(Application::new(args).await.is_err());
    }
}
