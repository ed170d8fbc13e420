//! Static regions: registry, hierarchy resolution, activation and editing.

use super::{Region, RegionId};
use crate::error::{Result, WorldError};
use crate::map::ActivationEntry;
use crate::rect::Rectangle;
use crate::types::Point4D;
use crate::world::WorldIndex;
use std::collections::BTreeMap;
use tracing::{debug, error, info, warn};

/// Everything needed to create a static region at runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticRegionDef {
    pub defname: String,
    pub name: String,
    /// `None` only for the world region.
    pub parent: Option<RegionId>,
    pub rectangles: Vec<Rectangle>,
    pub spawn_point: Option<Point4D>,
    pub plane: u8,
    pub trigger_groups: Vec<String>,
}

impl StaticRegionDef {
    pub fn new(defname: impl Into<String>) -> Self {
        Self {
            defname: defname.into(),
            ..Self::default()
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn child_of(mut self, parent: RegionId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_rect(mut self, rect: Rectangle) -> Self {
        self.rectangles.push(rect);
        self
    }

    pub fn on_plane(mut self, plane: u8) -> Self {
        self.plane = plane;
        self
    }

    pub fn with_spawn_point(mut self, point: Point4D) -> Self {
        self.spawn_point = Some(point);
        self
    }

    pub fn with_trigger_group(mut self, group: impl Into<String>) -> Self {
        self.trigger_groups.push(group.into());
        self
    }
}

impl WorldIndex {
    // ------------------------------------------------------------------
    // Registry
    // ------------------------------------------------------------------

    /// Adds an empty static region under a new defname.
    ///
    /// # Errors
    ///
    /// [`WorldError::DuplicateDefname`] if the defname is taken (ignoring
    /// case).
    pub(crate) fn register_static_region(&mut self, defname: &str) -> Result<RegionId> {
        let key = defname.to_lowercase();
        if self.by_defname.contains_key(&key) {
            return Err(WorldError::DuplicateDefname(defname.to_string()));
        }
        let id = self.next_region_id();
        self.insert_region(Region::new_static(id, defname));
        self.by_defname.insert(key, id);
        Ok(id)
    }

    /// Static regions in creation order.
    pub fn static_regions(&self) -> impl Iterator<Item = &Region> + '_ {
        self.regions().filter(|r| r.is_static())
    }

    fn static_ids(&self) -> Vec<RegionId> {
        self.static_regions().map(Region::id).collect()
    }

    pub fn get_by_defname(&self, defname: &str) -> Option<RegionId> {
        self.by_defname.get(&defname.to_lowercase()).copied()
    }

    /// The first region registered under a name.
    pub fn get_by_name(&self, name: &str) -> Option<RegionId> {
        self.regions_named(name).first().copied()
    }

    /// All regions sharing a name.
    pub fn regions_named(&self, name: &str) -> &[RegionId] {
        self.by_name
            .get(&name.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn get_by_name_or_defname(&self, text: &str) -> Option<RegionId> {
        self.get_by_name(text).or_else(|| self.get_by_defname(text))
    }

    /// Static regions whose name contains `criteria`, ignoring case,
    /// sorted by name. An empty criteria matches every region.
    pub fn find_by_string(&self, criteria: &str) -> Vec<RegionId> {
        let criteria = criteria.to_lowercase();
        let mut found: Vec<&Region> = self
            .static_regions()
            .filter(|r| criteria.is_empty() || r.name().to_lowercase().contains(&criteria))
            .collect();
        found.sort_by_key(|r| r.name().to_lowercase());
        found.into_iter().map(Region::id).collect()
    }

    /// Regions whose parent is `id`, static and dynamic.
    pub fn find_children(&self, id: RegionId) -> Vec<RegionId> {
        self.regions()
            .filter(|r| r.parent == Some(id))
            .map(Region::id)
            .collect()
    }

    fn rebuild_name_index(&mut self) {
        let mut by_name: std::collections::HashMap<String, Vec<RegionId>> = Default::default();
        for region in self.static_regions() {
            if let Some(data) = region.static_data() {
                if !data.name.is_empty() {
                    by_name
                        .entry(data.name.to_lowercase())
                        .or_default()
                        .push(region.id);
                }
            }
        }
        self.by_name = by_name;
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Resolves the hierarchy of freshly loaded regions and activates them.
    ///
    /// Runs three passes: parent resolution (which also finds the world
    /// region), hierarchy indexing, and activation per plane. On any error
    /// the whole region subsystem is cleared: running with half a
    /// hierarchy is worse than running without regions.
    pub fn finish_loading(&mut self) -> Result<()> {
        match self.resolve_loaded_regions() {
            Ok(()) => Ok(()),
            Err(e) => {
                error!("❌ Regions not used: {e}");
                self.clear_regions();
                Err(e)
            }
        }
    }

    fn resolve_loaded_regions(&mut self) -> Result<()> {
        let ids = self.static_ids();
        if ids.is_empty() {
            info!("No static regions loaded");
            return Ok(());
        }

        self.resolve_parents(&ids)?;
        self.resolve_hierarchy()?;
        self.rebuild_name_index();

        if self.config.resolve_everything_at_start || self.config.strict_hierarchy_checks {
            let conflicting = self.check_all_regions();
            if self.config.strict_hierarchy_checks && !conflicting.is_empty() {
                let names = conflicting
                    .iter()
                    .filter_map(|id| self.region(*id))
                    .map(|r| r.defname().unwrap_or_default().to_string())
                    .collect();
                return Err(WorldError::HierarchyConflict(names));
            }
        }

        self.activate_all();
        info!(
            "✅ Loaded {} static regions, hierarchy depth {}",
            ids.len(),
            self.highest_hierarchy_index
        );
        Ok(())
    }

    fn resolve_parents(&mut self, ids: &[RegionId]) -> Result<()> {
        self.world_region = None;
        for &id in ids {
            let pending = self
                .region(id)
                .and_then(Region::static_data)
                .and_then(|data| data.parent_defname.clone());

            if let Some(parent_defname) = pending {
                match self.get_by_defname(&parent_defname) {
                    Some(parent) => {
                        if let Some(region) = self.region_mut(id) {
                            region.parent = Some(parent);
                        }
                    }
                    None => {
                        let defname = self.defname_of(id);
                        warn!("'{parent_defname}' is not a valid region (parent of '{defname}')");
                    }
                }
            }

            if self.region(id).is_some_and(|r| r.parent.is_none()) {
                if self.world_region.is_none() {
                    self.world_region = Some(id);
                } else {
                    return Err(WorldError::MissingParent(self.defname_of(id)));
                }
            }
        }

        if self.world_region.is_none() {
            return Err(WorldError::NoWorldRegion);
        }
        Ok(())
    }

    fn defname_of(&self, id: RegionId) -> String {
        self.region(id)
            .and_then(Region::defname)
            .unwrap_or_default()
            .to_string()
    }

    /// Assigns `hierarchy_index` to every static region.
    fn resolve_hierarchy(&mut self) -> Result<()> {
        let ids = self.static_ids();
        for &id in &ids {
            if let Some(region) = self.region_mut(id) {
                region.hierarchy_index = None;
            }
        }
        self.highest_hierarchy_index = 0;
        for id in ids {
            self.set_hierarchy_index(id)?;
        }
        debug!(depth = self.highest_hierarchy_index, "Region hierarchy resolved");
        Ok(())
    }

    /// Resolves the index of a region by first resolving its parents.
    fn set_hierarchy_index(&mut self, id: RegionId) -> Result<u32> {
        // regions still waiting for an index, innermost first
        let mut pending = Vec::new();
        let mut current = id;
        let mut base = loop {
            let region = self.require_region(current)?;
            if let Some(index) = region.hierarchy_index {
                break index;
            }
            if Some(current) == self.world_region {
                if let Some(world) = self.region_mut(current) {
                    world.hierarchy_index = Some(0);
                }
                break 0;
            }
            if pending.len() > self.regions.len() {
                return Err(WorldError::UnresolvableHierarchy(self.defname_of(id)));
            }
            let Some(parent) = region.parent else {
                return Err(WorldError::MissingParent(self.defname_of(current)));
            };
            let parent_region = self.require_region(parent)?;
            let other_plane = parent_region.plane != region.plane;
            if other_plane && Some(parent) != self.world_region {
                return Err(WorldError::ParentOnOtherPlane {
                    region: self.defname_of(current),
                    parent: self.defname_of(parent),
                });
            }
            pending.push(current);
            current = parent;
        };

        for region_id in pending.into_iter().rev() {
            base += 1;
            if let Some(region) = self.region_mut(region_id) {
                region.hierarchy_index = Some(base);
            }
            self.highest_hierarchy_index = self.highest_hierarchy_index.max(base);
        }
        self.require_region(id)?
            .hierarchy_index
            .ok_or_else(|| WorldError::UnresolvableHierarchy(self.defname_of(id)))
    }

    // ------------------------------------------------------------------
    // Conflict checks
    // ------------------------------------------------------------------

    /// Checks a region against its parent and its same-depth neighbours.
    ///
    /// Every corner of every rectangle must lie inside the parent's area,
    /// the union of its rectangles (the world region contains everything), and no rectangle may touch a
    /// rectangle of another region at the same depth on the same plane.
    /// Problems are logged as warnings; returns false if there were any.
    pub fn check_conflicts(&self, id: RegionId) -> bool {
        let Some(region) = self.region(id) else {
            return false;
        };
        if Some(id) == self.world_region {
            return true;
        }

        let mut ok = true;
        if let Some(parent) = region.parent.and_then(|p| self.region(p)) {
            if Some(parent.id) != self.world_region {
                for rect in &region.rectangles {
                    if !parent.contains_rect(rect) {
                        warn!(
                            "⚠️ Rectangle {} of region {} is not contained within its parent {}",
                            rect, region, parent
                        );
                        ok = false;
                    }
                }
            }
        }

        let siblings = self.static_regions().filter(|other| {
            other.id != id
                && other.plane == region.plane
                && other.hierarchy_index == region.hierarchy_index
        });
        for other in siblings {
            for rect in &region.rectangles {
                if let Some(other_rect) = other
                    .rectangles
                    .iter()
                    .find(|o| o.contains_rect_partly(rect) || rect.contains_rect_partly(o))
                {
                    warn!(
                        "⚠️ Rectangle {} of region {} overlaps rectangle {} of region {} at the same hierarchy depth",
                        rect, region, other_rect, other
                    );
                    ok = false;
                }
            }
        }
        ok
    }

    /// Checks every static region; returns the ones with problems.
    pub fn check_all_regions(&self) -> Vec<RegionId> {
        let conflicting: Vec<RegionId> = self
            .static_regions()
            .map(Region::id)
            .filter(|id| !self.check_conflicts(*id))
            .collect();
        if conflicting.is_empty() {
            info!("✅ Region hierarchy checked, no conflicts");
        } else {
            warn!("⚠️ {} regions have hierarchy conflicts", conflicting.len());
        }
        conflicting
    }

    // ------------------------------------------------------------------
    // Activation
    // ------------------------------------------------------------------

    /// Drapes every activatable static region over its plane's map.
    pub fn activate_all(&mut self) {
        let mut per_plane: BTreeMap<u8, Vec<(RegionId, u32, Vec<Rectangle>)>> = BTreeMap::new();
        let mut activated = Vec::new();
        for region in self.static_regions() {
            if Some(region.id) == self.world_region || !region.can_be_activated() {
                continue;
            }
            let Some(depth) = region.hierarchy_index else {
                continue;
            };
            per_plane
                .entry(region.plane)
                .or_default()
                .push((region.id, depth, region.rectangles.clone()));
            activated.push(region.id);
        }

        let existing: Vec<u8> = self.maps().map(|m| m.plane()).collect();
        for plane in existing {
            if !per_plane.contains_key(&plane) {
                self.map_mut(plane).inactivate_regions(false);
            }
        }
        for (plane, regions) in &per_plane {
            let entries: Vec<ActivationEntry<'_>> = regions
                .iter()
                .map(|(region, depth, rectangles)| ActivationEntry {
                    region: *region,
                    depth: *depth,
                    rectangles,
                })
                .collect();
            self.map_mut(*plane).activate_regions(&entries);
        }

        for id in activated {
            if let Some(region) = self.region_mut(id) {
                region.inactivated = false;
            }
        }
    }

    /// Detaches every static region from the maps.
    pub fn inactivate_all(&mut self) {
        for map in self.maps_mut() {
            map.inactivate_regions(false);
        }
        for region in self.regions.iter_mut().flatten() {
            if region.is_static() {
                region.inactivated = true;
            }
        }
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    /// Creates a static region at runtime and activates it.
    ///
    /// A region without parent becomes the world region if there is none
    /// yet.
    pub fn create_static_region(&mut self, def: StaticRegionDef) -> Result<RegionId> {
        let depth = match def.parent {
            Some(parent) => {
                let parent_region = self.require_region(parent)?;
                if !parent_region.is_static() {
                    return Err(WorldError::WrongRegionKind(parent, "static"));
                }
                if parent_region.plane != def.plane && Some(parent) != self.world_region {
                    return Err(WorldError::ParentOnOtherPlane {
                        region: def.defname.clone(),
                        parent: self.defname_of(parent),
                    });
                }
                parent_region
                    .hierarchy_index
                    .ok_or_else(|| WorldError::UnresolvableHierarchy(self.defname_of(parent)))?
                    + 1
            }
            None if self.world_region.is_none() => 0,
            None => return Err(WorldError::MissingParent(def.defname)),
        };

        let id = self.register_static_region(&def.defname)?;
        if let Some(region) = self.region_mut(id) {
            region.parent = def.parent;
            region.rectangles = def.rectangles;
            region.spawn_point = def.spawn_point;
            region.plane = def.plane;
            region.trigger_groups = def.trigger_groups;
            region.hierarchy_index = Some(depth);
            if let Some(data) = region.static_data_mut() {
                data.name = def.name;
            }
        }
        if depth == 0 {
            self.world_region = Some(id);
        }
        self.highest_hierarchy_index = self.highest_hierarchy_index.max(depth);
        self.rebuild_name_index();
        self.check_conflicts(id);
        self.activate_all();
        Ok(id)
    }

    /// Replaces the rectangles of a static region.
    ///
    /// All regions stay detached from the maps while the new rectangles are
    /// checked. If the check finds conflicts the previous rectangles are put
    /// back and `Ok(false)` is returned; either way everything is activated
    /// again afterwards.
    pub fn set_rectangles(&mut self, id: RegionId, rectangles: Vec<Rectangle>) -> Result<bool> {
        if !self.require_region(id)?.is_static() {
            return Err(WorldError::WrongRegionKind(id, "static"));
        }

        self.inactivate_all();
        let previous = {
            let region = self.require_region_mut(id)?;
            if let Some(data) = region.static_data_mut() {
                data.can_be_activated = false;
            }
            std::mem::replace(&mut region.rectangles, rectangles)
        };

        let accepted = self.check_conflicts(id);

        if let Some(region) = self.region_mut(id) {
            if !accepted {
                region.rectangles = previous;
            }
            if let Some(data) = region.static_data_mut() {
                data.can_be_activated = true;
            }
        }
        self.activate_all();
        Ok(accepted)
    }

    /// Deletes a static region, handing its children to its parent.
    pub fn delete_static_region(&mut self, id: RegionId) -> Result<()> {
        if Some(id) == self.world_region {
            return Err(WorldError::CannotDeleteWorldRegion);
        }
        let region = self.require_region(id)?;
        if !region.is_static() {
            return Err(WorldError::WrongRegionKind(id, "static"));
        }
        let parent = region.parent;
        let defname = self.defname_of(id);

        self.inactivate_all();
        for child in self.find_children(id) {
            if let Some(child) = self.region_mut(child) {
                child.parent = parent;
            }
        }
        self.by_defname.remove(&defname.to_lowercase());
        self.take_region(id);
        self.rebuild_name_index();

        let result = self.resolve_hierarchy();
        self.refresh_dynamic_depths();
        self.activate_all();
        info!("🗑️ Region '{defname}' deleted");
        result
    }

    /// Re-derives the depth of dynamic regions after the hierarchy changed.
    fn refresh_dynamic_depths(&mut self) {
        let updates: Vec<(RegionId, Option<u32>)> = self
            .regions()
            .filter(|r| r.is_dynamic())
            .map(|r| {
                let depth = r
                    .parent
                    .and_then(|p| self.region(p))
                    .and_then(Region::hierarchy_index)
                    .map(|i| i + 1);
                (r.id, depth)
            })
            .collect();
        for (id, depth) in updates {
            if let Some(region) = self.region_mut(id) {
                region.hierarchy_index = depth;
            }
        }
    }
}
