//! Walking the region tree.

use super::RegionId;
use crate::world::WorldIndex;

/// Iterator over a region and its ancestors, innermost first.
///
/// The walk is bounded by the number of regions ever created, so a parent
/// cycle in a not yet validated hierarchy ends the iteration instead of
/// looping forever.
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    world: &'a WorldIndex,
    next: Option<RegionId>,
    remaining: usize,
}

impl Iterator for Ancestors<'_> {
    type Item = RegionId;

    fn next(&mut self) -> Option<RegionId> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.next?;
        let region = self.world.region(current)?;
        self.remaining -= 1;
        self.next = region.parent;
        Some(current)
    }
}

impl WorldIndex {
    /// `id`, its parent, its grandparent... up to the root.
    pub fn ancestors(&self, id: RegionId) -> Ancestors<'_> {
        Ancestors {
            world: self,
            next: Some(id),
            remaining: self.regions.len(),
        }
    }

    /// True if `ancestor` is a strict ancestor of `id`.
    pub fn is_descendant_of(&self, id: RegionId, ancestor: RegionId) -> bool {
        self.ancestors(id).skip(1).any(|r| r == ancestor)
    }

    /// The deepest region that is an ancestor of (or equal to) both.
    pub fn lowest_common_ancestor(&self, a: RegionId, b: RegionId) -> Option<RegionId> {
        let chain_b: Vec<RegionId> = self.ancestors(b).collect();
        self.ancestors(a).find(|r| chain_b.contains(r))
    }

    /// `"Name in Parent in World"`, for messages and diagnostics.
    pub fn hierarchy_name(&self, id: RegionId) -> String {
        self.ancestors(id)
            .filter_map(|r| self.region(r))
            .map(|r| r.name().to_string())
            .collect::<Vec<_>>()
            .join(" in ")
    }
}
