//! Draping region rectangles over the sector grid.

use super::{Map, SECTOR_FACTOR, SECTOR_WIDTH};
use crate::rect::Rectangle;
use crate::regions::RegionId;
use std::cmp::Ordering;
use tracing::{debug, trace};

/// A region rectangle as stored in a sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionRect {
    pub rect: Rectangle,
    pub region: RegionId,
    /// Hierarchy index of the owning region at the time it was draped.
    pub depth: u32,
}

/// A static region handed to [`Map::activate_regions`].
#[derive(Debug, Clone)]
pub struct ActivationEntry<'a> {
    pub region: RegionId,
    pub depth: u32,
    pub rectangles: &'a [Rectangle],
}

impl Map {
    /// Inclusive sector-coordinate bounds of a rectangle, clamped to the grid.
    pub(crate) fn sector_bounds(&self, rect: &Rectangle) -> (i32, i32, i32, i32) {
        let (min_sx, min_sy) = self.sector_xy_clamped(rect.min_x(), rect.min_y());
        let (max_sx, max_sy) = self.sector_xy_clamped(rect.max_x(), rect.max_y());
        (min_sx, min_sy, max_sx, max_sy)
    }

    /// Static regions currently draped over this map.
    pub fn active_regions(&self) -> &[RegionId] {
        &self.active_regions
    }

    /// Drapes static regions over the sectors they cover.
    ///
    /// Any previous static draping is replaced. Inside each sector the
    /// rectangles are ordered by depth, so lookups walking back to front find
    /// the most specific region first. Same-depth rectangles are ordered by
    /// how much of the sector they cover, unless `fast_startup` is set.
    pub fn activate_regions(&mut self, entries: &[ActivationEntry<'_>]) {
        self.inactivate_regions(false);

        let num_x = self.num_x_sectors as usize;
        let num_y = self.num_y_sectors as usize;
        let mut matrix: Vec<Vec<RegionRect>> = vec![Vec::new(); num_x * num_y];

        for entry in entries {
            for rect in entry.rectangles {
                let (min_sx, min_sy, max_sx, max_sy) = self.sector_bounds(rect);
                for sy in min_sy..=max_sy {
                    for sx in min_sx..=max_sx {
                        matrix[sy as usize * num_x + sx as usize].push(RegionRect {
                            rect: *rect,
                            region: entry.region,
                            depth: entry.depth,
                        });
                    }
                }
            }
        }

        let fast_startup = self.config.fast_startup;
        for (index, mut rects) in matrix.into_iter().enumerate() {
            if rects.is_empty() {
                continue;
            }
            let sx = (index % num_x) as i32;
            let sy = (index / num_x) as i32;
            let sector_rect = sector_area(sx, sy);
            rects.sort_by(|a, b| compare_region_rects(a, b, &sector_rect, fast_startup));
            if let Some(sector) = self.sector_mut(sx, sy) {
                sector.set_region_rects(rects);
            }
        }

        self.active_regions = entries.iter().map(|e| e.region).collect();
        debug!(
            plane = self.plane,
            regions = self.active_regions.len(),
            "Activated regions"
        );
    }

    /// Detaches static regions (and dynamic ones when asked) from all sectors.
    pub fn inactivate_regions(&mut self, dynamics_too: bool) {
        for sector in self.created_sectors_mut() {
            sector.clear_region_rects();
            if dynamics_too {
                sector.clear_dynamic_rects();
            }
        }
        self.active_regions.clear();
    }

    /// The deepest region covering a valid position, without world fallback.
    pub fn region_for(&self, x: i32, y: i32) -> Option<RegionId> {
        if !self.is_valid_pos(x, y) {
            return None;
        }
        self.existing_sector(x >> SECTOR_FACTOR, y >> SECTOR_FACTOR)?
            .region_for(x, y)
    }

    // ------------------------------------------------------------------
    // Dynamic regions
    // ------------------------------------------------------------------

    /// Registers a dynamic region's rectangles with every sector they touch.
    ///
    /// With `perform_checks`, each rectangle is first validated against the
    /// dynamic rectangles already present; on the first conflict everything
    /// inserted for this region is taken out again and `false` returned.
    pub fn add_dynamic_region(
        &mut self,
        region: RegionId,
        depth: u32,
        rectangles: &[Rectangle],
        perform_checks: bool,
    ) -> bool {
        for rect in rectangles {
            if perform_checks && !self.check_dyn_rect_intersection(rect) {
                trace!(?region, %rect, "Dynamic region rectangle collides");
                self.remove_dynamic_region(region, rectangles);
                return false;
            }
            let (min_sx, min_sy, max_sx, max_sy) = self.sector_bounds(rect);
            for sy in min_sy..=max_sy {
                for sx in min_sx..=max_sx {
                    if let Some(sector) = self.sector_mut(sx, sy) {
                        sector.add_dynamic_rect(RegionRect {
                            rect: *rect,
                            region,
                            depth,
                        });
                    }
                }
            }
        }
        true
    }

    /// Takes a dynamic region out of every sector its rectangles touch.
    pub fn remove_dynamic_region(&mut self, region: RegionId, rectangles: &[Rectangle]) {
        for rect in rectangles {
            let (min_sx, min_sy, max_sx, max_sy) = self.sector_bounds(rect);
            for sy in min_sy..=max_sy {
                for sx in min_sx..=max_sx {
                    if let Some(sector) = self.sector_mut(sx, sy) {
                        sector.remove_dynamic_rects_of(region);
                    }
                }
            }
        }
    }

    /// True if no dynamic rectangle registered on this map collides with
    /// `rect`. Stops at the first conflict.
    pub fn check_dyn_rect_intersection(&self, rect: &Rectangle) -> bool {
        let (min_sx, min_sy, max_sx, max_sy) = self.sector_bounds(rect);
        for sy in min_sy..=max_sy {
            for sx in min_sx..=max_sx {
                if let Some(sector) = self.existing_sector(sx, sy) {
                    if sector.dynamic_conflict(rect).is_some() {
                        return false;
                    }
                }
            }
        }
        true
    }
}

/// The area a sector is compared against when ordering its rectangles.
fn sector_area(sx: i32, sy: i32) -> Rectangle {
    let half = SECTOR_WIDTH / 2;
    let start_x = sx << SECTOR_FACTOR;
    let start_y = sy << SECTOR_FACTOR;
    // spans SECTOR_WIDTH + 1 tiles, one more than the sector holds
    Rectangle::from_range(start_x + half, start_y + half, half)
}

fn compare_region_rects(
    a: &RegionRect,
    b: &RegionRect,
    sector_rect: &Rectangle,
    fast_startup: bool,
) -> Ordering {
    a.depth.cmp(&b.depth).then_with(|| {
        if fast_startup {
            return Ordering::Equal;
        }
        let covered = |rr: &RegionRect| {
            rr.rect
                .intersection(sector_rect)
                .map_or(0, |i| i.tiles_number())
        };
        covered(a).cmp(&covered(b))
    })
}

#[cfg(test)]
mod tests {
    use super::super::test_support::flat_map;
    use super::*;

    fn rect(x1: i32, y1: i32, x2: i32, y2: i32) -> Rectangle {
        Rectangle::new(x1, y1, x2, y2).unwrap()
    }

    #[test]
    fn test_activation_drapes_rectangles_over_touched_sectors() {
        let mut map = flat_map(0);
        let a = [rect(100, 100, 200, 200)];
        let b = [rect(150, 150, 160, 160)];
        map.activate_regions(&[
            ActivationEntry { region: RegionId(1), depth: 1, rectangles: &a },
            ActivationEntry { region: RegionId(2), depth: 2, rectangles: &b },
        ]);

        assert_eq!(map.region_for(150, 150), Some(RegionId(2)));
        assert_eq!(map.region_for(120, 120), Some(RegionId(1)));
        assert_eq!(map.region_for(50, 50), None);
        assert_eq!(map.active_regions(), &[RegionId(1), RegionId(2)]);

        // sectors 6..=12 on both axes hold region 1
        assert_eq!(map.existing_sector(6, 6).unwrap().region_rects().len(), 1);
        assert_eq!(map.existing_sector(9, 9).unwrap().region_rects().len(), 2);
        assert!(map.existing_sector(13, 13).is_none());

        map.inactivate_regions(false);
        assert_eq!(map.region_for(150, 150), None);
        assert!(map.active_regions().is_empty());
    }

    #[test]
    fn test_rectangles_past_the_edge_are_clamped() {
        let mut map = flat_map(0);
        let edge = [rect(6100, 4000, 7000, 5000)];
        map.activate_regions(&[ActivationEntry {
            region: RegionId(4),
            depth: 1,
            rectangles: &edge,
        }]);
        assert_eq!(map.region_for(6143, 4095), Some(RegionId(4)));
    }

    #[test]
    fn test_same_depth_rectangles_order_by_covered_area() {
        let mut map = flat_map(0);
        let small = [rect(0, 0, 1, 1)];
        let large = [rect(0, 0, 10, 10)];
        map.activate_regions(&[
            ActivationEntry { region: RegionId(1), depth: 1, rectangles: &large },
            ActivationEntry { region: RegionId(2), depth: 1, rectangles: &small },
        ]);
        let rects = map.existing_sector(0, 0).unwrap().region_rects();
        assert_eq!(rects[0].region, RegionId(2));
        assert_eq!(rects[1].region, RegionId(1));
        // the larger one is found first by the back-to-front lookup
        assert_eq!(map.region_for(0, 0), Some(RegionId(1)));
    }

    #[test]
    fn test_dynamic_region_conflicts_roll_back() {
        let mut map = flat_map(0);
        assert!(map.add_dynamic_region(RegionId(1), 1, &[rect(10, 10, 20, 20)], true));
        assert!(!map.check_dyn_rect_intersection(&rect(15, 15, 25, 25)));
        assert!(map.check_dyn_rect_intersection(&rect(30, 30, 40, 40)));

        let second = [rect(40, 40, 45, 45), rect(18, 18, 30, 30)];
        assert!(!map.add_dynamic_region(RegionId(2), 1, &second, true));
        // the first, non-conflicting rectangle was taken out again
        assert_eq!(map.region_for(42, 42), None);
        assert_eq!(map.region_for(12, 12), Some(RegionId(1)));

        map.remove_dynamic_region(RegionId(1), &[rect(10, 10, 20, 20)]);
        assert!(map.check_dyn_rect_intersection(&rect(15, 15, 25, 25)));
    }
}
