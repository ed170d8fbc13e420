//! Terrain: land tiles and static scenery, loaded per sector on demand.

use crate::map::{SECTOR_FACTOR, SECTOR_WIDTH};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One land tile: its graphic id and altitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LandTile {
    pub id: u16,
    pub z: i32,
}

impl LandTile {
    pub const fn new(id: u16, z: i32) -> Self {
        Self { id, z }
    }
}

/// A piece of static scenery at an absolute tile coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticTile {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub model: u16,
}

impl StaticTile {
    pub const fn new(x: i32, y: i32, z: i32, model: u16) -> Self {
        Self { x, y, z, model }
    }
}

/// The immutable terrain of one sector.
#[derive(Debug, Clone)]
pub struct StaticSector {
    land: Vec<LandTile>,
    statics: Vec<StaticTile>,
}

impl StaticSector {
    /// Builds a sector from row-major land tiles (`SECTOR_WIDTH²` of them)
    /// and its statics.
    ///
    /// Missing land tiles are padded with the default tile, surplus ones
    /// dropped.
    pub fn new(mut land: Vec<LandTile>, statics: Vec<StaticTile>) -> Self {
        let cells = (SECTOR_WIDTH * SECTOR_WIDTH) as usize;
        land.resize(cells, LandTile::default());
        Self { land, statics }
    }

    /// A sector covered by a single land tile.
    pub fn uniform(tile: LandTile) -> Self {
        Self::new(vec![tile; (SECTOR_WIDTH * SECTOR_WIDTH) as usize], Vec::new())
    }

    /// Land tile at sector-relative coordinates.
    pub fn land(&self, rel_x: i32, rel_y: i32) -> LandTile {
        let index = (rel_y * SECTOR_WIDTH + rel_x) as usize;
        self.land.get(index).copied().unwrap_or_default()
    }

    pub fn statics(&self) -> &[StaticTile] {
        &self.statics
    }
}

/// Source of land and static scenery for the maps.
///
/// Implementations read the client's map files or generate terrain; the index
/// calls [`TerrainSource::load_sector`] at most once per sector.
pub trait TerrainSource: Send + Sync {
    fn load_sector(&self, plane: u8, sx: i32, sy: i32) -> StaticSector;
}

/// In-memory terrain: a default land tile plus explicit overrides.
#[derive(Debug, Clone, Default)]
pub struct MemoryTerrain {
    default_tile: LandTile,
    land: HashMap<(u8, i32, i32), LandTile>,
    statics: HashMap<(u8, i32, i32), Vec<StaticTile>>,
}

impl MemoryTerrain {
    pub fn new(default_tile: LandTile) -> Self {
        Self {
            default_tile,
            ..Self::default()
        }
    }

    pub fn set_land(&mut self, plane: u8, x: i32, y: i32, tile: LandTile) -> &mut Self {
        self.land.insert((plane, x, y), tile);
        self
    }

    pub fn add_static(&mut self, plane: u8, tile: StaticTile) -> &mut Self {
        let key = (plane, tile.x >> SECTOR_FACTOR, tile.y >> SECTOR_FACTOR);
        self.statics.entry(key).or_default().push(tile);
        self
    }
}

impl TerrainSource for MemoryTerrain {
    fn load_sector(&self, plane: u8, sx: i32, sy: i32) -> StaticSector {
        let base_x = sx << SECTOR_FACTOR;
        let base_y = sy << SECTOR_FACTOR;
        let land = (0..SECTOR_WIDTH)
            .flat_map(|rel_y| (0..SECTOR_WIDTH).map(move |rel_x| (rel_x, rel_y)))
            .map(|(rel_x, rel_y)| {
                self.land
                    .get(&(plane, base_x + rel_x, base_y + rel_y))
                    .copied()
                    .unwrap_or(self.default_tile)
            })
            .collect();
        let statics = self
            .statics
            .get(&(plane, sx, sy))
            .cloned()
            .unwrap_or_default();
        StaticSector::new(land, statics)
    }
}
