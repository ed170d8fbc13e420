use super::regions::RegionRect;
use crate::entity::{MultiComponent, Occupant};
use crate::regions::RegionId;
use crate::terrain::{StaticSector, TerrainSource};
use crate::types::ThingId;
use once_cell::unsync::OnceCell;

/// A square bucket of the map grid.
#[derive(Debug)]
pub struct Sector {
    sx: i32,
    sy: i32,
    plane: u8,
    things: Vec<Occupant>,
    players: Vec<ThingId>,
    disconnects: Vec<Occupant>,
    multi_components: Vec<MultiComponent>,
    terrain: OnceCell<StaticSector>,
    /// Sorted by depth, shallowest first.
    region_rects: Vec<RegionRect>,
    /// Newest last; looked up back to front.
    dynamic_rects: Vec<RegionRect>,
}

impl Sector {
    pub(crate) fn new(sx: i32, sy: i32, plane: u8) -> Self {
        Self {
            sx,
            sy,
            plane,
            things: Vec::new(),
            players: Vec::new(),
            disconnects: Vec::new(),
            multi_components: Vec::new(),
            terrain: OnceCell::new(),
            region_rects: Vec::new(),
            dynamic_rects: Vec::new(),
        }
    }

    pub fn sx(&self) -> i32 {
        self.sx
    }

    pub fn sy(&self) -> i32 {
        self.sy
    }

    pub fn plane(&self) -> u8 {
        self.plane
    }

    /// Items and characters standing in this sector.
    pub fn things(&self) -> &[Occupant] {
        &self.things
    }

    pub fn players(&self) -> &[ThingId] {
        &self.players
    }

    pub fn disconnects(&self) -> &[Occupant] {
        &self.disconnects
    }

    pub fn multi_components(&self) -> &[MultiComponent] {
        &self.multi_components
    }

    pub fn region_rects(&self) -> &[RegionRect] {
        &self.region_rects
    }

    pub fn dynamic_rects(&self) -> &[RegionRect] {
        &self.dynamic_rects
    }

    /// Land and statics of this sector, loaded on first use.
    pub fn terrain(&self, source: &dyn TerrainSource) -> &StaticSector {
        self.terrain
            .get_or_init(|| source.load_sector(self.plane, self.sx, self.sy))
    }

    pub fn is_terrain_loaded(&self) -> bool {
        self.terrain.get().is_some()
    }

    // ------------------------------------------------------------------
    // Occupants
    // ------------------------------------------------------------------

    pub(crate) fn add_thing(&mut self, occupant: Occupant) {
        self.things.push(occupant);
    }

    pub(crate) fn remove_thing(&mut self, id: ThingId) -> Option<Occupant> {
        let index = self.things.iter().position(|o| o.id == id)?;
        Some(self.things.swap_remove(index))
    }

    /// Replaces the stored snapshot of a thing; false if it is not here.
    pub(crate) fn update_thing(&mut self, occupant: Occupant) -> bool {
        match self.things.iter_mut().find(|o| o.id == occupant.id) {
            Some(slot) => {
                *slot = occupant;
                true
            }
            None => false,
        }
    }

    pub(crate) fn add_player(&mut self, id: ThingId) {
        if !self.players.contains(&id) {
            self.players.push(id);
        }
    }

    pub(crate) fn remove_player(&mut self, id: ThingId) -> bool {
        match self.players.iter().position(|p| *p == id) {
            Some(index) => {
                self.players.swap_remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn add_disconnect(&mut self, occupant: Occupant) {
        self.disconnects.push(occupant);
    }

    pub(crate) fn remove_disconnect(&mut self, id: ThingId) -> Option<Occupant> {
        let index = self.disconnects.iter().position(|o| o.id == id)?;
        Some(self.disconnects.swap_remove(index))
    }

    pub(crate) fn update_disconnect(&mut self, occupant: Occupant) -> bool {
        match self.disconnects.iter_mut().find(|o| o.id == occupant.id) {
            Some(slot) => {
                *slot = occupant;
                true
            }
            None => false,
        }
    }

    pub(crate) fn add_multi_component(&mut self, component: MultiComponent) {
        self.multi_components.push(component);
    }

    /// Removes one component matching `component` exactly.
    pub(crate) fn remove_multi_component(&mut self, component: &MultiComponent) -> bool {
        match self.multi_components.iter().position(|c| c == component) {
            Some(index) => {
                self.multi_components.swap_remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn replace_multi_component(&mut self, old: &MultiComponent, new: MultiComponent) -> bool {
        match self.multi_components.iter_mut().find(|c| **c == *old) {
            Some(slot) => {
                *slot = new;
                true
            }
            None => false,
        }
    }

    /// Drops every occupant, keeping terrain and region rectangles.
    pub(crate) fn clear_things(&mut self) {
        self.things.clear();
        self.players.clear();
        self.disconnects.clear();
        self.multi_components.clear();
    }

    // ------------------------------------------------------------------
    // Regions
    // ------------------------------------------------------------------

    /// The deepest region covering `(x, y)`, dynamic regions first.
    pub fn region_for(&self, x: i32, y: i32) -> Option<RegionId> {
        self.dynamic_rects
            .iter()
            .rev()
            .chain(self.region_rects.iter().rev())
            .find(|rr| rr.rect.contains_xy(x, y))
            .map(|rr| rr.region)
    }

    pub(crate) fn set_region_rects(&mut self, rects: Vec<RegionRect>) {
        self.region_rects = rects;
    }

    pub(crate) fn clear_region_rects(&mut self) {
        self.region_rects.clear();
    }

    pub(crate) fn add_dynamic_rect(&mut self, rect: RegionRect) {
        self.dynamic_rects.push(rect);
    }

    pub(crate) fn remove_dynamic_rects_of(&mut self, region: RegionId) {
        self.dynamic_rects.retain(|rr| rr.region != region);
    }

    pub(crate) fn clear_dynamic_rects(&mut self) {
        self.dynamic_rects.clear();
    }

    /// The first dynamic rectangle here that collides with `candidate`.
    pub fn dynamic_conflict(&self, candidate: &crate::rect::Rectangle) -> Option<&RegionRect> {
        self.dynamic_rects
            .iter()
            .find(|rr| rr.rect.intersects_either(candidate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rect::Rectangle;
    use crate::types::Point4D;

    fn region_rect(region: u32, depth: u32, rect: (i32, i32, i32, i32)) -> RegionRect {
        RegionRect {
            rect: Rectangle::new(rect.0, rect.1, rect.2, rect.3).unwrap(),
            region: RegionId(region),
            depth,
        }
    }

    #[test]
    fn test_deepest_static_rect_wins_but_dynamic_goes_first() {
        let mut sector = Sector::new(0, 0, 0);
        sector.set_region_rects(vec![
            region_rect(1, 1, (0, 0, 15, 15)),
            region_rect(2, 2, (4, 4, 8, 8)),
        ]);
        assert_eq!(sector.region_for(5, 5), Some(RegionId(2)));
        assert_eq!(sector.region_for(1, 1), Some(RegionId(1)));

        sector.add_dynamic_rect(region_rect(9, 3, (5, 5, 6, 6)));
        assert_eq!(sector.region_for(5, 5), Some(RegionId(9)));
        sector.remove_dynamic_rects_of(RegionId(9));
        assert_eq!(sector.region_for(5, 5), Some(RegionId(2)));
    }

    #[test]
    fn test_things_are_replaced_in_place() {
        let mut sector = Sector::new(0, 0, 0);
        let item = Occupant::item(ThingId(1), Point4D::new(1, 1, 0, 0), 0x100);
        sector.add_thing(item.clone());
        assert!(sector.update_thing(item.clone().at(Point4D::new(2, 2, 0, 0))));
        assert_eq!(sector.things()[0].x(), 2);
        assert!(sector.remove_thing(ThingId(1)).is_some());
        assert!(sector.remove_thing(ThingId(1)).is_none());
        assert!(!sector.update_thing(item));
    }
}
