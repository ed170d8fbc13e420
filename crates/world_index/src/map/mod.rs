//! The sector-grid spatial index.
//!
//! A [`Map`] covers one plane of the world with a grid of [`Sector`]s, each
//! `SECTOR_WIDTH` tiles square. Sectors are created on first touch and
//! hold the things standing in them, their static scenery and the region
//! rectangles draped over them, so point and range lookups only visit the
//! handful of sectors around the coordinates asked for.
//!
//! Mutation is not synchronized: a map belongs to the simulation step that
//! owns the [`crate::WorldIndex`].

mod occupants;
mod queries;
mod regions;
mod sector;

pub use regions::{ActivationEntry, RegionRect};
pub use sector::Sector;

use crate::config::WorldConfig;
use crate::terrain::{LandTile, TerrainSource};
use crate::tiles::TileData;
use once_cell::unsync::OnceCell;
use std::fmt;
use std::sync::Arc;

/// log2 of the sector width.
pub const SECTOR_FACTOR: i32 = 4;
/// Tiles per sector side.
pub const SECTOR_WIDTH: i32 = 1 << SECTOR_FACTOR;
/// Masks a coordinate down to the origin of its sector.
pub const SECTOR_AND: i32 = !(SECTOR_WIDTH - 1);

/// Sector coordinates of a tile coordinate.
///
/// # Examples
///
/// ```rust
/// use world_index::map::sector_of;
///
/// assert_eq!(sector_of(15, 16), (0, 1));
/// assert_eq!(sector_of(1000, 33), (62, 2));
/// ```
pub const fn sector_of(x: i32, y: i32) -> (i32, i32) {
    (x >> SECTOR_FACTOR, y >> SECTOR_FACTOR)
}

/// True if both coordinates fall into the same sector.
pub const fn same_sector(x1: i32, y1: i32, x2: i32, y2: i32) -> bool {
    (x1 & SECTOR_AND) == (x2 & SECTOR_AND) && (y1 & SECTOR_AND) == (y2 & SECTOR_AND)
}

/// One plane of the world.
pub struct Map {
    plane: u8,
    size_x: i32,
    size_y: i32,
    num_x_sectors: i32,
    num_y_sectors: i32,
    sectors: Box<[OnceCell<Sector>]>,
    /// Static regions currently draped over this plane, world region excluded.
    active_regions: Vec<crate::regions::RegionId>,
    tile_data: Arc<TileData>,
    terrain: Arc<dyn TerrainSource>,
    config: Arc<WorldConfig>,
}

impl fmt::Debug for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Map")
            .field("plane", &self.plane)
            .field("size_x", &self.size_x)
            .field("size_y", &self.size_y)
            .field("sectors_created", &self.sectors.iter().filter(|s| s.get().is_some()).count())
            .field("active_regions", &self.active_regions.len())
            .finish()
    }
}

impl Map {
    /// Creates the map of a plane, sized from the configuration.
    pub fn new(
        plane: u8,
        config: Arc<WorldConfig>,
        tile_data: Arc<TileData>,
        terrain: Arc<dyn TerrainSource>,
    ) -> Self {
        let size = config.map_size(plane);
        let num_x_sectors = (size.width >> SECTOR_FACTOR).max(1);
        let num_y_sectors = (size.height >> SECTOR_FACTOR).max(1);
        let cells = (num_x_sectors * num_y_sectors) as usize;
        let sectors = (0..cells).map(|_| OnceCell::new()).collect();
        Self {
            plane,
            size_x: size.width,
            size_y: size.height,
            num_x_sectors,
            num_y_sectors,
            sectors,
            active_regions: Vec::new(),
            tile_data,
            terrain,
            config,
        }
    }

    pub fn plane(&self) -> u8 {
        self.plane
    }

    pub fn size_x(&self) -> i32 {
        self.size_x
    }

    pub fn size_y(&self) -> i32 {
        self.size_y
    }

    pub fn num_x_sectors(&self) -> i32 {
        self.num_x_sectors
    }

    pub fn num_y_sectors(&self) -> i32 {
        self.num_y_sectors
    }

    pub fn tile_data(&self) -> &TileData {
        &self.tile_data
    }

    pub(crate) fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn is_valid_pos(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.size_x && y < self.size_y
    }

    /// Sector coordinates of a tile, clamped into the grid.
    ///
    /// Used for boundary and range queries, never for placing things.
    pub fn sector_xy_clamped(&self, x: i32, y: i32) -> (i32, i32) {
        let x = x.clamp(0, self.size_x - 1);
        let y = y.clamp(0, self.size_y - 1);
        sector_of(x, y)
    }

    fn sector_index(&self, sx: i32, sy: i32) -> Option<usize> {
        if sx < 0 || sy < 0 || sx >= self.num_x_sectors || sy >= self.num_y_sectors {
            return None;
        }
        Some((sy * self.num_x_sectors + sx) as usize)
    }

    /// The sector at sector coordinates, created on first access.
    pub fn sector(&self, sx: i32, sy: i32) -> Option<&Sector> {
        let index = self.sector_index(sx, sy)?;
        Some(self.sectors[index].get_or_init(|| Sector::new(sx, sy, self.plane)))
    }

    /// The sector at sector coordinates if it has been created already.
    pub fn existing_sector(&self, sx: i32, sy: i32) -> Option<&Sector> {
        let index = self.sector_index(sx, sy)?;
        self.sectors[index].get()
    }

    pub(crate) fn sector_mut(&mut self, sx: i32, sy: i32) -> Option<&mut Sector> {
        let index = self.sector_index(sx, sy)?;
        let plane = self.plane;
        let cell = &mut self.sectors[index];
        cell.get_or_init(|| Sector::new(sx, sy, plane));
        cell.get_mut()
    }

    /// Sectors already created, in no particular order.
    pub fn created_sectors(&self) -> impl Iterator<Item = &Sector> + '_ {
        self.sectors.iter().filter_map(OnceCell::get)
    }

    pub(crate) fn created_sectors_mut(&mut self) -> impl Iterator<Item = &mut Sector> + '_ {
        self.sectors.iter_mut().filter_map(OnceCell::get_mut)
    }

    // ------------------------------------------------------------------
    // Land tiles
    // ------------------------------------------------------------------

    /// Land tile at a coordinate clamped into the map.
    pub(crate) fn land_clamped(&self, x: i32, y: i32) -> LandTile {
        let x = x.clamp(0, self.size_x - 1);
        let y = y.clamp(0, self.size_y - 1);
        let (sx, sy) = sector_of(x, y);
        match self.sector(sx, sy) {
            Some(sector) => sector
                .terrain(self.terrain.as_ref())
                .land(x - (x & SECTOR_AND), y - (y & SECTOR_AND)),
            None => LandTile::default(),
        }
    }

    /// Land tile at a valid position.
    pub fn tile(&self, x: i32, y: i32) -> Option<LandTile> {
        self.is_valid_pos(x, y).then(|| self.land_clamped(x, y))
    }

    pub fn tile_id(&self, x: i32, y: i32) -> Option<u16> {
        self.tile(x, y).map(|tile| tile.id)
    }

    pub fn tile_z(&self, x: i32, y: i32) -> Option<i32> {
        self.tile(x, y).map(|tile| tile.z)
    }

    /// True if the land tile at a valid position is lava.
    pub fn is_lava(&self, x: i32, y: i32) -> bool {
        self.tile_id(x, y)
            .is_some_and(|id| self.tile_data.is_lava_land(id))
    }

    /// Altitudes of the land tile at `(x, y)`: `(low, average, top)`.
    ///
    /// The tile is shaped by the altitudes of its four corners `(x, y)`,
    /// `(x, y+1)`, `(x+1, y)` and `(x+1, y+1)`. The average is taken along
    /// the flatter of the two diagonals and rounded down.
    pub fn average_z(&self, x: i32, y: i32) -> (i32, i32, i32) {
        let z_top = self.land_clamped(x, y).z;
        let z_left = self.land_clamped(x, y + 1).z;
        let z_right = self.land_clamped(x + 1, y).z;
        let z_bottom = self.land_clamped(x + 1, y + 1).z;

        let low = z_top.min(z_left).min(z_right).min(z_bottom);
        let top = z_top.max(z_left).max(z_right).max(z_bottom);
        let avg = if (z_top - z_bottom).abs() > (z_left - z_right).abs() {
            floor_average(z_left, z_right)
        } else {
            floor_average(z_top, z_bottom)
        };
        (low, avg, top)
    }
}

fn floor_average(a: i32, b: i32) -> i32 {
    (a + b).div_euclid(2)
}
