//! Scenario tests spanning several modules.

#[cfg(test)]
pub mod dynamic_regions;
#[cfg(test)]
pub mod movement;
#[cfg(test)]
pub mod persistence;

use crate::{
    LandTile, MemoryTerrain, Rectangle, RegionId, StaticRegionDef, TileData, WorldConfig,
    WorldIndex,
};
use std::sync::Arc;

pub(crate) fn rect(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Rectangle {
    Rectangle::new(min_x, min_y, max_x, max_y).unwrap()
}

pub(crate) fn world_with(config: WorldConfig) -> WorldIndex {
    let terrain = Arc::new(MemoryTerrain::new(LandTile::new(3, 0)));
    WorldIndex::new(config, TileData::new(), terrain).unwrap()
}

/// A world over custom terrain and tile data, default map sizes.
pub(crate) fn world_on(terrain: MemoryTerrain, tiles: TileData) -> WorldIndex {
    WorldIndex::new(WorldConfig::default(), tiles, Arc::new(terrain)).unwrap()
}

pub(crate) fn empty_world() -> WorldIndex {
    world_with(WorldConfig::default())
}

/// A world with the root region covering the whole default map.
pub(crate) fn world_with_root() -> (WorldIndex, RegionId) {
    let mut world = empty_world();
    let root = world
        .create_static_region(StaticRegionDef::new("a_world").with_rect(rect(0, 0, 6143, 4095)))
        .unwrap();
    (world, root)
}
