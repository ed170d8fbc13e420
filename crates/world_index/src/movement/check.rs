//! The step check.

use super::{Candidate, MoveOutcome, MovementScratch, MovementSettings, MAX_ITEM_MODEL, PERSON_HEIGHT};
use crate::entity::OccupantKind;
use crate::map::{sector_of, Map};
use crate::tiles::{is_ignored_land_id, TileFlags};
use crate::types::{Direction, Point3D};
use smallvec::SmallVec;
use tracing::trace;

/// True if `candidate` is at least as close to `reference` as `best`; ties
/// go to the lower altitude.
fn preferred(candidate: i32, best: i32, reference: i32) -> bool {
    let cmp = (candidate - reference).abs() - (best - reference).abs();
    cmp < 0 || (cmp == 0 && candidate <= best)
}

impl Map {
    /// Checks a single step from `point` in `direction`.
    ///
    /// Diagonal steps also need both flanking cells to be passable, so
    /// nobody slips through the corner of two walls. With `hack_move` a
    /// rejected step is accepted anyway (for staff characters).
    ///
    /// # Arguments
    ///
    /// * `point` - Where the mover stands now
    /// * `settings` - What the mover can cross
    /// * `direction` - Direction of the step
    /// * `hack_move` - Accept the step even when it is blocked
    /// * `scratch` - Candidate buffers, cleared before returning
    ///
    /// # Returns
    ///
    /// The forward cell and the altitude the mover ends up at.
    pub fn check_movement<S: MovementSettings + ?Sized>(
        &self,
        point: Point3D,
        settings: &S,
        direction: Direction,
        hack_move: bool,
        scratch: &mut MovementScratch,
    ) -> MoveOutcome {
        let (x_forward, y_forward) = direction.offset(point.x, point.y);
        if !self.is_valid_pos(x_forward, y_forward) {
            return MoveOutcome {
                accepted: false,
                x: x_forward,
                y: y_forward,
                z: 0,
            };
        }

        let diagonal = direction.is_diagonal();
        let (x_left, y_left) = direction.left().offset(point.x, point.y);
        let (x_right, y_right) = direction.right().offset(point.x, point.y);

        scratch.clear();
        let mut cells: SmallVec<[(i32, i32); 4]> = SmallVec::new();
        cells.push((point.x, point.y));
        cells.push((x_forward, y_forward));
        if diagonal {
            cells.push((x_left, y_left));
            cells.push((x_right, y_right));
        }
        self.gather_items(settings, &cells, scratch);

        let (start_z, start_top) = self.start_z(settings, point, &scratch.start);

        let forward = self.check_cell(
            settings,
            point.z,
            &scratch.forward,
            &mut scratch.statics,
            x_forward,
            y_forward,
            start_top,
            start_z,
        );
        let mut accepted = forward.is_some();
        if accepted && diagonal {
            let left = self.check_cell(
                settings,
                point.z,
                &scratch.left,
                &mut scratch.statics,
                x_left,
                y_left,
                start_top,
                start_z,
            );
            let right = self.check_cell(
                settings,
                point.z,
                &scratch.right,
                &mut scratch.statics,
                x_right,
                y_right,
                start_top,
                start_z,
            );
            accepted = left.is_some() && right.is_some();
        }
        scratch.clear();

        let z = match (accepted, forward) {
            (true, Some(z)) => z,
            // forced through: keep the altitude found ahead, or stay level
            _ if hack_move => forward.unwrap_or(start_z),
            _ => start_z,
        };
        trace!(?direction, accepted, hack_move, z, "Movement checked");
        MoveOutcome {
            accepted: accepted || hack_move,
            x: x_forward,
            y: y_forward,
            z,
        }
    }

    /// Sorts the items that may matter for the step into per-cell buckets.
    ///
    /// `cells` holds the start, the forward cell and, for diagonals, the left
    /// and right flanks.
    fn gather_items<S: MovementSettings + ?Sized>(
        &self,
        settings: &S,
        cells: &[(i32, i32)],
        scratch: &mut MovementScratch,
    ) {
        let mut required = TileFlags::IMPASSABLE_SURFACE;
        if settings.can_swim() {
            required |= TileFlags::WET;
        }

        for &(x, y) in cells {
            let sector = sector_of(x, y);
            if !scratch.sectors.contains(&sector) {
                scratch.sectors.push(sector);
            }
        }

        let tile_data = self.tile_data();
        for &(sx, sy) in &scratch.sectors {
            let Some(sector) = self.sector(sx, sy) else {
                continue;
            };
            for thing in sector.things() {
                let OccupantKind::Item { model, .. } = thing.kind else {
                    continue;
                };
                if model >= MAX_ITEM_MODEL || !tile_data.item(model).flags.intersects(required) {
                    continue;
                }
                let Some(cell) = cells.iter().position(|&(x, y)| thing.x() == x && thing.y() == y) else {
                    continue;
                };
                let candidate = Candidate::new(model, thing.z(), tile_data);
                match cell {
                    0 => scratch.start.push(candidate),
                    1 => scratch.forward.push(candidate),
                    2 => scratch.left.push(candidate),
                    _ => scratch.right.push(candidate),
                }
            }
        }
    }

    /// True if the land tile stops the mover.
    fn land_blocks<S: MovementSettings + ?Sized>(&self, settings: &S, land_id: u16) -> bool {
        let flags = self.tile_data().land_flags(land_id);
        if !flags.is_impassable() && settings.can_cross_land() {
            return false;
        }
        let crossable = (settings.can_swim() && flags.is_wet())
            || (settings.can_cross_lava() && self.tile_data().is_lava_land(land_id))
            || settings.can_fly();
        !crossable
    }

    /// The altitude band the mover stands in: `(low, top)`.
    fn start_z<S: MovementSettings + ?Sized>(
        &self,
        settings: &S,
        point: Point3D,
        items: &[Candidate],
    ) -> (i32, i32) {
        let land = self.land_clamped(point.x, point.y);
        let land_blocks = self.land_blocks(settings, land.id);
        let consider_land = !is_ignored_land_id(land.id);
        let (land_z, land_center, land_top) = self.average_z(point.x, point.y);

        let (mut z_low, mut z_center, mut z_top) = (0, 0, 0);
        let mut is_set = false;

        if consider_land && !land_blocks && point.z >= land_center {
            z_low = land_z;
            z_center = land_center;
            z_top = z_top.max(land_top);
            is_set = true;
        }

        for candidate in self.candidates_on(point.x, point.y).chain(items.iter().copied()) {
            let calc_top = candidate.stand_z();
            if (is_set && calc_top < z_center) || point.z < calc_top {
                continue;
            }
            if !candidate.is_viable(settings, candidate.info.flags.is_surface()) {
                continue;
            }
            z_low = candidate.z;
            z_center = calc_top;
            let top = candidate.z + candidate.info.height;
            if !is_set || top > z_top {
                z_top = top;
            }
            is_set = true;
        }

        if !is_set {
            (point.z, point.z)
        } else {
            (z_low, z_top.max(point.z))
        }
    }

    /// Finds the altitude the mover would stand at on `(x, y)`, if any.
    #[allow(clippy::too_many_arguments)]
    fn check_cell<S: MovementSettings + ?Sized>(
        &self,
        settings: &S,
        point_z: i32,
        items: &[Candidate],
        statics: &mut SmallVec<[Candidate; 16]>,
        x: i32,
        y: i32,
        start_top: i32,
        start_z: i32,
    ) -> Option<i32> {
        let land = self.land_clamped(x, y);
        let land_blocks = self.land_blocks(settings, land.id);
        let consider_land = !is_ignored_land_id(land.id);
        let (land_z, land_center, _) = self.average_z(x, y);

        let step_height = settings.climb_power();
        let step_top = start_top + step_height;
        let check_top = start_z + PERSON_HEIGHT;

        statics.clear();
        statics.extend(self.candidates_on(x, y));
        let statics: &[Candidate] = statics;

        let mut new_z: Option<i32> = None;
        for candidate in statics.iter().chain(items) {
            if !candidate.is_viable(settings, candidate.info.flags.is_walkable_surface()) {
                continue;
            }
            let our_z = candidate.stand_z();
            if new_z.is_some_and(|best| !preferred(our_z, best, point_z)) {
                continue;
            }
            let test_top = check_top.max(our_z + PERSON_HEIGHT);
            let item_top = if candidate.info.flags.is_bridge() {
                candidate.z
            } else {
                candidate.z + candidate.info.height
            };
            if step_top < item_top {
                continue;
            }

            // don't stand on something buried in a hill
            let land_check = candidate.z + candidate.info.height.min(step_height);
            if consider_land && land_check < land_center && land_center > our_z && test_top > land_z {
                continue;
            }
            if self.is_clear(settings.ignore_doors(), our_z, test_top, statics, items) {
                new_z = Some(our_z);
            }
        }

        if consider_land && !land_blocks && step_top >= land_z {
            let our_z = land_center;
            let test_top = check_top.max(our_z + PERSON_HEIGHT);
            let should_check = new_z.map_or(true, |best| preferred(our_z, best, point_z));
            if should_check && self.is_clear(settings.ignore_doors(), our_z, test_top, statics, items) {
                new_z = Some(our_z);
            }
        }
        new_z
    }

    /// True if nothing solid overlaps the span `our_z..our_top`.
    fn is_clear(
        &self,
        ignore_doors: bool,
        our_z: i32,
        our_top: i32,
        statics: &[Candidate],
        items: &[Candidate],
    ) -> bool {
        let overlaps = |c: &Candidate| {
            c.info.flags.intersects(TileFlags::IMPASSABLE_SURFACE)
                && c.z + c.info.calc_height > our_z
                && our_top > c.z
        };
        if statics.iter().any(overlaps) {
            return false;
        }
        let config = self.config();
        !items.iter().any(|item| {
            let door = item.info.flags.is_door() || config.is_misflagged_door(item.model);
            !(ignore_doors && door) && overlaps(item)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Occupant;
    use crate::map::test_support::{flat_map, map_with_terrain};
    use crate::movement::Capabilities;
    use crate::terrain::{LandTile, MemoryTerrain, StaticTile};
    use crate::tiles::TileData;
    use crate::types::{Point4D, ThingId};

    const WALL: u16 = 0x80;
    const FLOOR: u16 = 0x500;
    const DOOR: u16 = 0x6A5;
    const WATER: u16 = 0xA8;

    fn tiles() -> TileData {
        let mut tiles = TileData::new();
        tiles
            .set_item(WALL, TileFlags::IMPASSABLE, 20)
            .set_item(FLOOR, TileFlags::SURFACE, 0)
            .set_item(DOOR, TileFlags::IMPASSABLE | TileFlags::DOOR, 20)
            .set_item(0x692, TileFlags::IMPASSABLE, 20)
            .set_land_flags(WATER, TileFlags::WET | TileFlags::IMPASSABLE);
        tiles
    }

    fn step(map: &Map, from: (i32, i32, i32), dir: Direction, caps: &Capabilities) -> MoveOutcome {
        let mut scratch = MovementScratch::new();
        map.check_movement(Point3D::new(from.0, from.1, from.2), caps, dir, false, &mut scratch)
    }

    #[test]
    fn test_walking_on_flat_land() {
        let map = flat_map(0);
        let outcome = step(&map, (10, 10, 0), Direction::East, &Capabilities::walker());
        assert_eq!(outcome, MoveOutcome { accepted: true, x: 11, y: 10, z: 0 });
    }

    #[test]
    fn test_stepping_off_the_map_is_rejected() {
        let map = flat_map(0);
        let outcome = step(&map, (0, 0, 0), Direction::North, &Capabilities::walker());
        assert!(!outcome.accepted);
        assert_eq!((outcome.x, outcome.y, outcome.z), (0, -1, 0));
    }

    #[test]
    fn test_walls_block_and_hack_move_overrides() {
        let mut terrain = MemoryTerrain::new(LandTile::new(3, 0));
        terrain.add_static(0, StaticTile::new(11, 10, 0, WALL));
        let map = map_with_terrain(0, terrain, tiles());

        let outcome = step(&map, (10, 10, 0), Direction::East, &Capabilities::walker());
        assert!(!outcome.accepted);
        assert_eq!(outcome.z, 0);

        let mut scratch = MovementScratch::new();
        let forced = map.check_movement(
            Point3D::new(10, 10, 0),
            &Capabilities::walker(),
            Direction::East,
            true,
            &mut scratch,
        );
        assert!(forced.accepted);
    }

    #[test]
    fn test_diagonal_steps_cannot_cut_corners() {
        let mut terrain = MemoryTerrain::new(LandTile::new(3, 0));
        // wall east of the start; the step goes north-east
        terrain.add_static(0, StaticTile::new(11, 10, 0, WALL));
        let map = map_with_terrain(0, terrain, tiles());

        let blocked = step(&map, (10, 10, 0), Direction::NorthEast, &Capabilities::walker());
        assert!(!blocked.accepted);
        let open = step(&map, (10, 10, 0), Direction::NorthWest, &Capabilities::walker());
        assert!(open.accepted);
    }

    #[test]
    fn test_climbing_respects_the_climb_power() {
        let mut terrain = MemoryTerrain::new(LandTile::new(3, 0));
        terrain.add_static(0, StaticTile::new(11, 10, 2, FLOOR));
        terrain.add_static(0, StaticTile::new(11, 12, 5, FLOOR));
        let map = map_with_terrain(0, terrain, tiles());
        let walker = Capabilities::walker();

        let low = step(&map, (10, 10, 0), Direction::East, &walker);
        assert!(low.accepted);
        assert_eq!(low.z, 2);

        // out of reach, and too low to walk under
        let high = step(&map, (10, 12, 0), Direction::East, &walker);
        assert!(!high.accepted);
        assert_eq!(high.z, 0);

        let climber = Capabilities { climb_power: 10, ..walker };
        let climbed = step(&map, (10, 12, 0), Direction::East, &climber);
        assert!(climbed.accepted);
        assert_eq!(climbed.z, 5);
    }

    #[test]
    fn test_water_stops_walkers_but_not_swimmers() {
        let mut terrain = MemoryTerrain::new(LandTile::new(3, 0));
        terrain.set_land(0, 11, 10, LandTile::new(WATER, 0));
        let map = map_with_terrain(0, terrain, tiles());

        let walker = step(&map, (10, 10, 0), Direction::East, &Capabilities::walker());
        assert!(!walker.accepted);

        let swimmer = Capabilities { can_swim: true, ..Capabilities::walker() };
        let swim = step(&map, (10, 10, 0), Direction::East, &swimmer);
        assert!(swim.accepted);
    }

    #[test]
    fn test_doors_open_for_those_who_ignore_them() {
        let mut map = map_with_terrain(0, MemoryTerrain::new(LandTile::new(3, 0)), tiles());
        map.add(&Occupant::item(ThingId(1), Point4D::new(11, 10, 0, 0), DOOR)).unwrap();
        map.add(&Occupant::item(ThingId(2), Point4D::new(10, 11, 0, 0), 0x692)).unwrap();

        let walker = Capabilities::walker();
        assert!(!step(&map, (10, 10, 0), Direction::East, &walker).accepted);
        assert!(!step(&map, (10, 10, 0), Direction::South, &walker).accepted);

        let ghost = Capabilities { ignore_doors: true, ..walker };
        assert!(step(&map, (10, 10, 0), Direction::East, &ghost).accepted);
        // not flagged as a door, but known to be one
        assert!(step(&map, (10, 10, 0), Direction::South, &ghost).accepted);
    }

    #[test]
    fn test_ties_prefer_the_lower_altitude() {
        assert!(preferred(4, 6, 5));
        assert!(!preferred(6, 4, 5));
        assert!(preferred(3, 8, 4));
    }
}
