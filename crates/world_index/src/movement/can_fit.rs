use super::{MAX_ITEM_MODEL, PERSON_HEIGHT};
use crate::entity::OccupantKind;
use crate::map::{sector_of, Map};
use crate::tiles::is_ignored_land_id;

/// What [`Map::can_fit`] takes into account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanFitOptions {
    /// Items flagged as blocking fit count as solid.
    pub check_blocks_fit: bool,
    /// Substantial characters count as solid.
    pub check_characters: bool,
    /// Something to stand on must be exactly at the requested z.
    pub require_surface: bool,
}

impl Default for CanFitOptions {
    fn default() -> Self {
        Self {
            check_blocks_fit: false,
            check_characters: true,
            require_surface: true,
        }
    }
}

impl Map {
    /// True if a body `height` tall fits at `(x, y)` standing at `z`.
    ///
    /// Solid land, scenery and items must not overlap the span
    /// `z..z + height`. Characters are treated as `PERSON_HEIGHT` tall.
    pub fn can_fit(&self, x: i32, y: i32, z: i32, height: i32, options: CanFitOptions) -> bool {
        if !self.is_valid_pos(x, y) {
            return false;
        }
        let overlaps = |bottom: i32, top: i32| top > z && z + height > bottom;
        let mut has_surface = false;

        let land = self.land_clamped(x, y);
        let (low_z, avg_z, _) = self.average_z(x, y);
        let land_flags = self.tile_data().land_flags(land.id);
        if land_flags.is_impassable() {
            if avg_z > z && z + height > low_z {
                return false;
            }
        } else if z == avg_z && !is_ignored_land_id(land.id) {
            has_surface = true;
        }

        for candidate in self.candidates_on(x, y) {
            let flags = candidate.info.flags;
            let (surface, impassable) = (flags.is_surface(), flags.is_impassable());
            if (surface || impassable) && overlaps(candidate.z, candidate.stand_z()) {
                return false;
            }
            if surface && !impassable && z == candidate.stand_z() {
                has_surface = true;
            }
        }

        let (sx, sy) = sector_of(x, y);
        if let Some(sector) = self.sector(sx, sy) {
            for thing in sector.things().iter().filter(|t| t.x() == x && t.y() == y) {
                match thing.kind {
                    OccupantKind::Item {
                        model,
                        height: item_height,
                        blocks_fit,
                    } if model < MAX_ITEM_MODEL => {
                        let info = self.tile_data().item(model);
                        let top = thing.z() + item_height.unwrap_or(info.height);
                        let (surface, impassable) = (info.flags.is_surface(), info.flags.is_impassable());
                        let solid = surface || impassable || (options.check_blocks_fit && blocks_fit);
                        if solid && overlaps(thing.z(), top) {
                            return false;
                        }
                        if surface && !impassable && z == top {
                            has_surface = true;
                        }
                    }
                    OccupantKind::Item { .. } => {}
                    OccupantKind::Character { insubstantial, .. } => {
                        if options.check_characters
                            && !insubstantial
                            && overlaps(thing.z(), thing.z() + PERSON_HEIGHT)
                        {
                            return false;
                        }
                    }
                }
            }
        }

        !options.require_surface || has_surface
    }
}
