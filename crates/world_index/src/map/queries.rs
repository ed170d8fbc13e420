//! Range queries over the sector grid.
//!
//! Every query computes the clamped sector box of its rectangle, visits only
//! those sectors, and filters their contents against the exact rectangle.
//! All of them are lazy iterators.

use super::{Map, Sector, SECTOR_FACTOR};
use crate::entity::{MultiComponent, Occupant};
use crate::rect::Rectangle;
use crate::terrain::StaticTile;

impl Map {
    /// Sectors overlapping a rectangle that exist already.
    pub fn sectors_in_rect(&self, rect: Rectangle) -> impl Iterator<Item = &Sector> + '_ {
        let (min_sx, min_sy, max_sx, max_sy) = self.sector_bounds(&rect);
        (min_sy..=max_sy)
            .flat_map(move |sy| (min_sx..=max_sx).map(move |sx| (sx, sy)))
            .filter_map(move |(sx, sy)| self.existing_sector(sx, sy))
    }

    /// Sectors overlapping a rectangle, created if needed.
    fn sectors_in_rect_loaded(&self, rect: Rectangle) -> impl Iterator<Item = &Sector> + '_ {
        let (min_sx, min_sy, max_sx, max_sy) = self.sector_bounds(&rect);
        (min_sy..=max_sy)
            .flat_map(move |sy| (min_sx..=max_sx).map(move |sx| (sx, sy)))
            .filter_map(move |(sx, sy)| self.sector(sx, sy))
    }

    /// Items and characters inside a rectangle.
    pub fn things_in_rect(&self, rect: Rectangle) -> impl Iterator<Item = &Occupant> + '_ {
        self.sectors_in_rect(rect)
            .flat_map(|sector| sector.things().iter())
            .filter(move |o| rect.contains_xy(o.x(), o.y()))
    }

    pub fn items_in_rect(&self, rect: Rectangle) -> impl Iterator<Item = &Occupant> + '_ {
        self.things_in_rect(rect).filter(|o| o.kind.is_item())
    }

    pub fn chars_in_rect(&self, rect: Rectangle) -> impl Iterator<Item = &Occupant> + '_ {
        self.things_in_rect(rect).filter(|o| o.kind.is_character())
    }

    /// Connected players inside a rectangle.
    pub fn players_in_rect(&self, rect: Rectangle) -> impl Iterator<Item = &Occupant> + '_ {
        self.sectors_in_rect(rect).flat_map(move |sector| {
            sector
                .things()
                .iter()
                .filter(move |o| sector.players().contains(&o.id))
                .filter(move |o| rect.contains_xy(o.x(), o.y()))
        })
    }

    pub fn disconnects_in_rect(&self, rect: Rectangle) -> impl Iterator<Item = &Occupant> + '_ {
        self.sectors_in_rect(rect)
            .flat_map(|sector| sector.disconnects().iter())
            .filter(move |o| rect.contains_xy(o.x(), o.y()))
    }

    /// Static scenery inside a rectangle; loads terrain of the touched sectors.
    pub fn statics_in_rect(&self, rect: Rectangle) -> impl Iterator<Item = &StaticTile> + '_ {
        self.sectors_in_rect_loaded(rect)
            .flat_map(move |sector| sector.terrain(self.terrain.as_ref()).statics().iter())
            .filter(move |s| rect.contains_xy(s.x, s.y))
    }

    pub fn multi_components_in_rect(
        &self,
        rect: Rectangle,
    ) -> impl Iterator<Item = &MultiComponent> + '_ {
        self.sectors_in_rect(rect)
            .flat_map(|sector| sector.multi_components().iter())
            .filter(move |c| rect.contains_xy(c.x, c.y))
    }

    pub fn things_in_range(&self, x: i32, y: i32, range: i32) -> impl Iterator<Item = &Occupant> + '_ {
        self.things_in_rect(Rectangle::from_range(x, y, range))
    }

    pub fn items_in_range(&self, x: i32, y: i32, range: i32) -> impl Iterator<Item = &Occupant> + '_ {
        self.items_in_rect(Rectangle::from_range(x, y, range))
    }

    pub fn chars_in_range(&self, x: i32, y: i32, range: i32) -> impl Iterator<Item = &Occupant> + '_ {
        self.chars_in_rect(Rectangle::from_range(x, y, range))
    }

    pub fn players_in_range(&self, x: i32, y: i32, range: i32) -> impl Iterator<Item = &Occupant> + '_ {
        self.players_in_rect(Rectangle::from_range(x, y, range))
    }

    pub fn statics_in_range(&self, x: i32, y: i32, range: i32) -> impl Iterator<Item = &StaticTile> + '_ {
        self.statics_in_rect(Rectangle::from_range(x, y, range))
    }

    /// Statics and structure components standing exactly on `(x, y)`.
    ///
    /// Components are reported as static tiles: movement treats both alike.
    pub fn statics_on_coords(&self, x: i32, y: i32) -> impl Iterator<Item = StaticTile> + '_ {
        let sector = if self.is_valid_pos(x, y) {
            self.sector(x >> SECTOR_FACTOR, y >> SECTOR_FACTOR)
        } else {
            None
        };
        let statics = sector
            .into_iter()
            .flat_map(move |s| s.terrain(self.terrain.as_ref()).statics().iter().copied());
        let components = sector.into_iter().flat_map(|s| {
            s.multi_components()
                .iter()
                .map(|c| StaticTile::new(c.x, c.y, c.z, c.model))
        });
        statics
            .chain(components)
            .filter(move |s| s.x == x && s.y == y)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::map_with_terrain;
    use super::*;
    use crate::entity::MultiPart;
    use crate::terrain::{LandTile, MemoryTerrain};
    use crate::tiles::TileData;
    use crate::types::{Point4D, ThingId};

    #[test]
    fn test_range_queries_filter_by_exact_rectangle() {
        let mut map = map_with_terrain(0, MemoryTerrain::new(LandTile::new(3, 0)), TileData::new());
        for (id, x, y) in [(1, 100, 100), (2, 105, 100), (3, 111, 100), (4, 300, 300)] {
            map.add(&Occupant::item(ThingId(id), Point4D::new(x, y, 0, 0), 0x100))
                .unwrap();
        }
        map.add(&Occupant::character(ThingId(5), Point4D::new(101, 99, 0, 0)).as_player())
            .unwrap();
        map.add(&Occupant::character(ThingId(6), Point4D::new(102, 99, 0, 0)))
            .unwrap();

        let mut ids: Vec<u32> = map.things_in_range(100, 100, 5).map(|o| o.id.0).collect();
        ids.sort();
        assert_eq!(ids, vec![1, 2, 5, 6]);

        assert_eq!(map.items_in_range(100, 100, 5).count(), 2);
        assert_eq!(map.chars_in_range(100, 100, 5).count(), 2);
        let players: Vec<ThingId> = map.players_in_range(100, 100, 5).map(|o| o.id).collect();
        assert_eq!(players, vec![ThingId(5)]);
        assert_eq!(map.things_in_range(0, 0, 50).count(), 0);
    }

    #[test]
    fn test_queries_at_the_map_edge_are_clamped() {
        let mut map = map_with_terrain(0, MemoryTerrain::new(LandTile::new(3, 0)), TileData::new());
        map.add(&Occupant::item(ThingId(1), Point4D::new(0, 0, 0, 0), 0x100))
            .unwrap();
        assert_eq!(map.things_in_range(-3, -3, 5).count(), 1);
        assert_eq!(map.things_in_range(7000, 7000, 5).count(), 0);
    }

    #[test]
    fn test_statics_on_coords_include_structure_components() {
        let mut terrain = MemoryTerrain::new(LandTile::new(3, 0));
        terrain.add_static(0, StaticTile::new(20, 20, 0, 0x80));
        terrain.add_static(0, StaticTile::new(21, 20, 0, 0x81));
        let mut map = map_with_terrain(0, terrain, TileData::new());
        let house = Occupant::item(ThingId(1), Point4D::new(18, 20, 0, 0), 0x4064)
            .with_parts(vec![MultiPart { model: 0x66, dx: 2, dy: 0, dz: 7 }]);
        map.add(&house).unwrap();

        let at: Vec<StaticTile> = map.statics_on_coords(20, 20).collect();
        assert_eq!(at, vec![StaticTile::new(20, 20, 0, 0x80), StaticTile::new(20, 20, 7, 0x66)]);
        assert_eq!(map.statics_in_range(20, 20, 1).count(), 2);
        assert_eq!(map.multi_components_in_rect(Rectangle::from_range(20, 20, 0)).count(), 1);
        assert_eq!(map.statics_on_coords(-1, 0).count(), 0);
    }
}
