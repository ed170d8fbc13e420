//! Dynamic regions: runtime-only rectangles that follow a moving anchor.
//!
//! Dynamic rectangles never overlap each other. Every relocation takes the
//! region off the map, checks the new rectangles against what is left and
//! puts back either the new or the old state, so a refused move leaves the
//! map exactly as it was.

use super::{Region, RegionId};
use crate::error::{Result, WorldError};
use crate::rect::Rectangle;
use crate::types::Point4D;
use crate::world::WorldIndex;
use tracing::{debug, trace};

impl WorldIndex {
    /// Creates an unplaced dynamic region from absolute rectangles.
    pub fn create_dynamic_region(&mut self, rectangles: Vec<Rectangle>) -> RegionId {
        let id = self.next_region_id();
        self.insert_region(Region::new_dynamic(id, rectangles))
    }

    fn require_dynamic(&self, id: RegionId) -> Result<&Region> {
        let region = self.require_region(id)?;
        if region.is_dynamic() {
            Ok(region)
        } else {
            Err(WorldError::WrongRegionKind(id, "dynamic"))
        }
    }

    fn require_valid_pos(&self, point: Point4D) -> Result<()> {
        if self.map(point.plane).is_valid_pos(point.x, point.y) {
            Ok(())
        } else {
            Err(WorldError::InvalidPosition {
                x: point.x,
                y: point.y,
                plane: point.plane,
            })
        }
    }

    /// Depth of a region nested in `parent`.
    fn depth_under(&self, parent: Option<RegionId>) -> u32 {
        parent
            .and_then(|p| self.region(p))
            .and_then(Region::hierarchy_index)
            .map_or(0, |index| index + 1)
    }

    /// Puts a dynamic region on the map for the first time.
    ///
    /// The region at `point` becomes its parent. Returns `Ok(false)` if a
    /// rectangle collides with another dynamic region; the region then stays
    /// unplaced and can be placed elsewhere.
    ///
    /// # Errors
    ///
    /// [`WorldError::AlreadyPlaced`] if the region is on a map already, use
    /// [`WorldIndex::set_position`] to move it.
    pub fn place(&mut self, id: RegionId, point: Point4D) -> Result<bool> {
        let region = self.require_dynamic(id)?;
        if region.is_placed() {
            return Err(WorldError::AlreadyPlaced(id));
        }
        let rectangles = region.rectangles.clone();
        self.require_valid_pos(point)?;

        let parent = self.region_for(point);
        let depth = self.depth_under(parent);
        let placed = self
            .map_mut(point.plane)
            .add_dynamic_region(id, depth, &rectangles, true);

        if placed {
            let region = self.require_region_mut(id)?;
            region.spawn_point = Some(point);
            region.plane = point.plane;
            region.parent = parent;
            region.hierarchy_index = Some(depth);
            debug!(%id, %point, "Dynamic region placed");
        } else {
            debug!(%id, %point, "Dynamic region collides, not placed");
        }
        Ok(placed)
    }

    /// Shifts a placed dynamic region by a small offset.
    ///
    /// The anchor point moves only when every shifted rectangle is free.
    pub fn step(&mut self, id: RegionId, dx: i32, dy: i32) -> Result<bool> {
        let region = self.require_dynamic(id)?;
        let Some(origin) = region.spawn_point else {
            return Err(WorldError::NotPlaced(id));
        };
        let depth = region.hierarchy_index.unwrap_or(0);
        let old_rects = region.rectangles.clone();
        let moved: Vec<Rectangle> = old_rects.iter().map(|r| r.moved(dx, dy)).collect();

        let map = self.map_mut(origin.plane);
        map.remove_dynamic_region(id, &old_rects);
        let free = moved.iter().all(|rect| map.check_dyn_rect_intersection(rect));
        let rectangles = if free { moved } else { old_rects };
        map.add_dynamic_region(id, depth, &rectangles, false);

        let region = self.require_region_mut(id)?;
        region.rectangles = rectangles;
        if free {
            region.spawn_point = Some(origin.shifted(dx, dy));
        }
        trace!(%id, dx, dy, free, "Dynamic region stepped");
        Ok(free)
    }

    /// Moves a placed dynamic region so its anchor lands on `point`.
    ///
    /// Handles a plane change and an xy change in one go. The parent is
    /// recomputed at the new position. When a rectangle would collide, the
    /// parent, the rectangles and the map are left as they were.
    pub fn set_position(&mut self, id: RegionId, point: Point4D) -> Result<bool> {
        let region = self.require_dynamic(id)?;
        let Some(origin) = region.spawn_point else {
            return Err(WorldError::NotPlaced(id));
        };
        let old_rects = region.rectangles.clone();
        let old_depth = region.hierarchy_index.unwrap_or(0);
        self.require_valid_pos(point)?;

        let (dx, dy) = (point.x - origin.x, point.y - origin.y);
        let new_rects: Vec<Rectangle> = old_rects.iter().map(|r| r.moved(dx, dy)).collect();

        self.map_mut(origin.plane).remove_dynamic_region(id, &old_rects);
        let parent = self.region_for(point);
        let depth = self.depth_under(parent);
        let target = self.map(point.plane);
        let free = new_rects
            .iter()
            .all(|rect| target.check_dyn_rect_intersection(rect));

        if !free {
            self.map_mut(origin.plane)
                .add_dynamic_region(id, old_depth, &old_rects, false);
            debug!(%id, from = %origin, to = %point, "Dynamic region move refused");
            return Ok(false);
        }

        self.map_mut(point.plane)
            .add_dynamic_region(id, depth, &new_rects, false);
        let region = self.require_region_mut(id)?;
        region.rectangles = new_rects;
        region.spawn_point = Some(point);
        region.plane = point.plane;
        region.parent = parent;
        region.hierarchy_index = Some(depth);
        debug!(%id, from = %origin, to = %point, "Dynamic region moved");
        Ok(true)
    }

    /// True if `rect` touches no dynamic rectangle on the plane.
    pub fn check_dyn_rect_intersection(&self, plane: u8, rect: &Rectangle) -> bool {
        self.map(plane).check_dyn_rect_intersection(rect)
    }

    /// Takes a dynamic region off its map and forgets it.
    ///
    /// Regions nested in it are handed to its parent.
    pub fn delete_dynamic_region(&mut self, id: RegionId) -> Result<()> {
        let region = self.require_dynamic(id)?;
        let parent = region.parent;
        let placed_on = region.spawn_point.map(|p| p.plane);
        let rectangles = region.rectangles.clone();

        if let Some(plane) = placed_on {
            self.map_mut(plane).remove_dynamic_region(id, &rectangles);
        }
        for child in self.find_children(id) {
            if let Some(child) = self.region_mut(child) {
                child.parent = parent;
            }
        }
        self.take_region(id);
        debug!(%id, "Dynamic region deleted");
        Ok(())
    }
}
