//! World index configuration.
//!
//! Everything here has a serde default so partial TOML tables work; the host
//! embeds [`WorldConfig`] as the `[world]` table of its config file.

use crate::map::SECTOR_WIDTH;
use serde::{Deserialize, Serialize};

fn default_map_width() -> i32 {
    6144
}

fn default_map_height() -> i32 {
    4096
}

/// Door models the tile data forgets to flag as doors.
fn default_misflagged_doors() -> Vec<[u16; 2]> {
    vec![[0x692, 0x692], [0x846, 0x846], [0x873, 0x873], [0x6F5, 0x6F6]]
}

/// Tile dimensions of a map plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSize {
    #[serde(default = "default_map_width")]
    pub width: i32,
    #[serde(default = "default_map_height")]
    pub height: i32,
}

impl Default for MapSize {
    fn default() -> Self {
        Self {
            width: default_map_width(),
            height: default_map_height(),
        }
    }
}

/// A per-plane size override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaneSize {
    pub plane: u8,
    #[serde(flatten)]
    pub size: MapSize,
}

/// Configuration of a [`crate::WorldIndex`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Size of every plane without an override
    #[serde(default)]
    pub default_map_size: MapSize,
    /// Per-plane size overrides
    #[serde(default)]
    pub map_sizes: Vec<PlaneSize>,
    /// Run the full region conflict check while loading
    #[serde(default)]
    pub resolve_everything_at_start: bool,
    /// Turn region conflicts found while loading into a load failure
    #[serde(default)]
    pub strict_hierarchy_checks: bool,
    /// Skip ordering same-depth region rectangles by their area in a sector
    #[serde(default)]
    pub fast_startup: bool,
    /// Inclusive model ranges treated as doors regardless of their flags
    #[serde(default = "default_misflagged_doors")]
    pub misflagged_doors: Vec<[u16; 2]>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            default_map_size: MapSize::default(),
            map_sizes: Vec::new(),
            resolve_everything_at_start: false,
            strict_hierarchy_checks: false,
            fast_startup: false,
            misflagged_doors: default_misflagged_doors(),
        }
    }
}

impl WorldConfig {
    /// Tile dimensions of a plane.
    pub fn map_size(&self, plane: u8) -> MapSize {
        self.map_sizes
            .iter()
            .find(|entry| entry.plane == plane)
            .map(|entry| entry.size)
            .unwrap_or(self.default_map_size)
    }

    /// True if `model` is on the mis-flagged door list.
    pub fn is_misflagged_door(&self, model: u16) -> bool {
        self.misflagged_doors
            .iter()
            .any(|[first, last]| (*first..=*last).contains(&model))
    }

    /// Validates the configuration.
    ///
    /// Map sizes must be positive multiples of the sector width, and door
    /// ranges must be ordered.
    pub fn validate(&self) -> Result<(), String> {
        let sizes = std::iter::once((None, self.default_map_size))
            .chain(self.map_sizes.iter().map(|e| (Some(e.plane), e.size)));
        for (plane, size) in sizes {
            let label = match plane {
                Some(plane) => format!("mapplane {plane}"),
                None => "default map".to_string(),
            };
            if size.width <= 0 || size.height <= 0 {
                return Err(format!("{label} size must be positive"));
            }
            if size.width % SECTOR_WIDTH != 0 || size.height % SECTOR_WIDTH != 0 {
                return Err(format!(
                    "{label} size {}x{} is not a multiple of the sector width {SECTOR_WIDTH}",
                    size.width, size.height
                ));
            }
        }

        if let Some([first, last]) = self.misflagged_doors.iter().find(|[a, b]| a > b) {
            return Err(format!(
                "misflagged door range 0x{first:X}..0x{last:X} is inverted"
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = WorldConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.map_size(0), MapSize { width: 6144, height: 4096 });
    }

    #[test]
    fn test_door_list_matches_known_models() {
        let config = WorldConfig::default();
        for model in [0x692, 0x846, 0x873, 0x6F5, 0x6F6] {
            assert!(config.is_misflagged_door(model), "0x{model:X}");
        }
        assert!(!config.is_misflagged_door(0x6F7));
    }

    #[test]
    fn test_plane_overrides_and_validation() {
        let mut config = WorldConfig::default();
        config.map_sizes.push(PlaneSize {
            plane: 2,
            size: MapSize { width: 2304, height: 1600 },
        });
        assert_eq!(config.map_size(2).width, 2304);
        assert_eq!(config.map_size(1).width, 6144);
        assert!(config.validate().is_ok());

        config.map_sizes[0].size.width = 100;
        assert!(config.validate().is_err());

        config.map_sizes.clear();
        config.misflagged_doors.push([10, 5]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: WorldConfig =
            serde_json::from_str(r#"{ "fast_startup": true }"#).unwrap();
        assert!(config.fast_startup);
        assert_eq!(config.misflagged_doors.len(), 4);
        assert_eq!(config.default_map_size.height, 4096);
    }
}
