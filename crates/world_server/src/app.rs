//! Main application logic and lifecycle management.
//!
//! The [`Application`] loads the configuration, builds the [`WorldIndex`],
//! loads the region file into it and then answers what the command line
//! asked for: a hierarchy check, probes, a re-save.

use crate::{cli::CliArgs, config::AppConfig, logging::display_banner};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use world_index::{LandTile, MemoryTerrain, Point4D, TileData, WorldIndex};

/// The region found at a probed point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub point: Point4D,
    /// `"Inner in Outer in World"`, or `None` where no region applies.
    pub hierarchy: Option<String>,
}

/// What a run did, for the caller and for tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub static_regions: usize,
    pub hierarchy_depth: u32,
    /// Defnames of regions failing the hierarchy check (with `--check`).
    pub conflicts: Vec<String>,
    pub probes: Vec<ProbeResult>,
    pub resaved_to: Option<PathBuf>,
}

/// Main application struct.
pub struct Application {
    /// Loaded application configuration, CLI overrides applied
    config: AppConfig,
    /// Where the configuration came from
    config_path: PathBuf,
    check: bool,
    resave: Option<PathBuf>,
    probes: Vec<Point4D>,
    world: WorldIndex,
}

impl Application {
    /// Creates a new application instance.
    ///
    /// # Process
    ///
    /// 1. Load configuration from file (creating default if missing)
    /// 2. Apply command-line argument overrides
    /// 3. Validate merged configuration
    /// 4. Build the world index
    pub async fn new(args: CliArgs) -> Result<Self> {
        info!("🔧 Loading configuration from: {}", args.config_path.display());
        let mut config = AppConfig::load_from_file(&args.config_path).await?;

        if let Some(regions_file) = &args.regions_file {
            config.regions.file = regions_file.to_string_lossy().to_string();
        }
        if let Some(log_level) = &args.log_level {
            config.logging.level = log_level.clone();
        }
        if args.json_logs {
            config.logging.json_format = true;
        }

        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Configuration validation failed: {e}"))?;
        info!("✅ Configuration loaded and validated successfully");

        display_banner();

        let terrain = Arc::new(MemoryTerrain::new(LandTile::new(
            config.terrain.land_id,
            config.terrain.z,
        )));
        let world = WorldIndex::new(config.world.clone(), TileData::new(), terrain)?;

        Ok(Self {
            config,
            config_path: args.config_path,
            check: args.check,
            resave: args.resave,
            probes: args.probes,
            world,
        })
    }

    /// Loads the regions and carries out the requested actions.
    pub async fn run(mut self) -> Result<RunSummary> {
        self.log_configuration_summary();

        let path = PathBuf::from(&self.config.regions.file);
        let text = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading region file {}", path.display()))?;
        let file_name = path.display().to_string();
        self.world.load_regions_str(&text, &file_name)?;
        self.world.finish_loading()?;

        let mut summary = RunSummary {
            static_regions: self.world.static_regions().count(),
            hierarchy_depth: self.world.highest_hierarchy_index(),
            ..RunSummary::default()
        };
        for map in self.world.maps() {
            let active = map.active_regions().len();
            if active > 0 {
                info!("🗺️ Plane {}: {} active regions", map.plane(), active);
            }
        }

        if self.check {
            summary.conflicts = self
                .world
                .check_all_regions()
                .into_iter()
                .filter_map(|id| self.world.region(id))
                .filter_map(|region| region.defname().map(str::to_string))
                .collect();
            for defname in &summary.conflicts {
                warn!("⚠️ Region {defname} failed the hierarchy check");
            }
        }

        for &point in &self.probes {
            let hierarchy = self
                .world
                .region_for(point)
                .map(|id| self.world.hierarchy_name(id));
            match &hierarchy {
                Some(name) => info!("📍 {},{} on plane {}: {}", point.x, point.y, point.plane, name),
                None => info!("📍 {},{} on plane {}: no region", point.x, point.y, point.plane),
            }
            summary.probes.push(ProbeResult { point, hierarchy });
        }

        if let Some(target) = &self.resave {
            tokio::fs::write(target, self.world.save_regions())
                .await
                .with_context(|| format!("writing region file {}", target.display()))?;
            info!("💾 Regions saved to {}", target.display());
            summary.resaved_to = Some(target.clone());
        }

        info!(
            "✅ {} static regions, hierarchy depth {}",
            summary.static_regions, summary.hierarchy_depth
        );
        Ok(summary)
    }

    /// Logs the configuration summary at startup.
    fn log_configuration_summary(&self) {
        info!("📋 Configuration Summary:");
        info!("  📂 Config: {}", self.config_path.display());
        info!("  🗂️ Region file: {}", self.config.regions.file);
        let size = self.config.world.default_map_size;
        info!("  🌍 Default map: {}x{} tiles", size.width, size.height);
        info!(
            "  🔍 Strict hierarchy checks: {}",
            self.config.world.strict_hierarchy_checks
        );
    }
}
