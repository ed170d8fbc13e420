//! Logging system setup and configuration.
//!
//! The filter comes from the `[logging]` table: a base level plus optional
//! per-module directives such as `world_index::movement=trace`. `RUST_LOG`,
//! when set, replaces both.

use crate::config::{AppConfig, LoggingSettings};
use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Builds the filter described by the `[logging]` table, ignoring `RUST_LOG`.
///
/// # Errors
///
/// Fails on a directive `tracing_subscriber` cannot parse; the error names it.
pub fn filter_from_settings(settings: &LoggingSettings) -> Result<EnvFilter> {
    let mut filter = EnvFilter::new(settings.level.to_lowercase());
    for directive in &settings.directives {
        let parsed = directive
            .parse::<Directive>()
            .with_context(|| format!("invalid log directive '{directive}'"))?;
        filter = filter.add_directive(parsed);
    }
    Ok(filter)
}

/// Installs the global subscriber for the world server.
///
/// Region loading reports one line per problem, so the human-readable output
/// is compact and keeps the target to tell index and host messages apart.
/// JSON output flattens event fields (`id`, `point`, `region`) to the top
/// level. `json_override` forces JSON regardless of the config file.
pub fn setup_logging(config: &AppConfig, json_override: bool) -> Result<()> {
    let settings = &config.logging;
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => filter_from_settings(settings)?,
    };

    let output = if json_override || settings.json_format {
        fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .boxed()
    } else {
        fmt::layer().compact().with_target(true).boxed()
    };

    tracing_subscriber::registry()
        .with(output)
        .with(filter)
        .try_init()
        .context("a global logger is already installed")?;

    if settings.directives.is_empty() {
        info!("🔧 Logging initialized with level: {}", settings.level);
    } else {
        info!(
            "🔧 Logging initialized with level: {} ({})",
            settings.level,
            settings.directives.join(", ")
        );
    }
    Ok(())
}

/// Logs the startup banner.
pub fn display_banner() {
    let version = option_env!("CARGO_PKG_VERSION").unwrap_or("UNK");
    info!("╔══════════════════════════════════════════╗");
    info!("║            🗺️  WORLD SERVER 🗺️            ║");
    info!("║                  v{:<8}               ║", version);
    info!("║                                          ║");
    info!("║  Sector-grid spatial index               ║");
    info!("║  Static and dynamic region hierarchy     ║");
    info!("║  Movement and collision checks           ║");
    info!("╚══════════════════════════════════════════╝");
}
