//! Region trigger hooks and the hierarchy walks that fire them.
//!
//! Hooks are grouped into named trigger groups registered on the
//! [`WorldIndex`]; a region lists the groups it runs. Every walk goes through
//! [`WorldIndex::ancestors`], innermost region first.

use super::RegionId;
use crate::types::{Point4D, ThingId};
use crate::world::WorldIndex;
use std::sync::Arc;
use tracing::trace;

/// Whether a cancellable hook lets the action continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerResult {
    #[default]
    Continue,
    Cancel,
}

impl TriggerResult {
    pub fn is_cancel(self) -> bool {
        self == TriggerResult::Cancel
    }
}

/// What a hook is told about the action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerContext {
    /// The character (or item) acting.
    pub actor: ThingId,
    /// The region whose hook runs.
    pub region: RegionId,
    /// Where the action happens, when it has a place.
    pub point: Option<Point4D>,
    /// Set when the transition cannot be refused (teleports, forced moves).
    pub forced: bool,
}

/// Behaviour attached to regions through a trigger group.
///
/// Every method has a do-nothing default, so implementors only write the
/// hooks they care about.
pub trait RegionTriggers: Send + Sync {
    /// May veto entering the region.
    fn allow_enter(&self, _ctx: &TriggerContext) -> TriggerResult {
        TriggerResult::Continue
    }

    /// May veto leaving the region.
    fn allow_exit(&self, _ctx: &TriggerContext) -> TriggerResult {
        TriggerResult::Continue
    }

    fn on_enter(&self, _ctx: &TriggerContext) {}

    fn on_exit(&self, _ctx: &TriggerContext) {}

    /// An item was put on the ground in the region or one of its children.
    fn on_item_enter(&self, _ctx: &TriggerContext) {}

    /// An item left the ground in the region or one of its children.
    fn on_item_leave(&self, _ctx: &TriggerContext) {}

    /// Return `Cancel` to forbid picking up an item lying in the region.
    fn deny_pickup(&self, _ctx: &TriggerContext) -> TriggerResult {
        TriggerResult::Continue
    }

    /// Return `Cancel` to forbid putting an item on the ground in the region.
    fn deny_put_on_ground(&self, _ctx: &TriggerContext) -> TriggerResult {
        TriggerResult::Continue
    }
}

/// The regions a transition leaves and enters, in firing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    /// From the old region up to, but excluding, the common ancestor.
    pub exits: Vec<RegionId>,
    /// From below the common ancestor down to the new region.
    pub entries: Vec<RegionId>,
}

impl WorldIndex {
    fn hooks_of(&self, region: RegionId) -> Vec<Arc<dyn RegionTriggers>> {
        self.region(region)
            .map(|r| {
                r.trigger_groups
                    .iter()
                    .filter_map(|group| self.trigger_groups.get(&group.to_lowercase()).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Runs a cancellable hook on a region; the first cancelling group wins.
    fn cancellable(
        &self,
        ctx: &TriggerContext,
        hook: impl Fn(&dyn RegionTriggers, &TriggerContext) -> TriggerResult,
    ) -> bool {
        self.hooks_of(ctx.region)
            .iter()
            .any(|group| hook(group.as_ref(), ctx).is_cancel())
    }

    fn notify(&self, ctx: &TriggerContext, hook: impl Fn(&dyn RegionTriggers, &TriggerContext)) {
        for group in self.hooks_of(ctx.region) {
            hook(group.as_ref(), ctx);
        }
    }

    /// Computes which regions a move from `old` to `new` leaves and enters.
    ///
    /// `None` stands for "outside any region" (logging in, being created).
    pub fn transition(&self, old: Option<RegionId>, new: Option<RegionId>) -> Transition {
        let common = match (old, new) {
            (Some(a), Some(b)) => self.lowest_common_ancestor(a, b),
            _ => None,
        };
        let exits: Vec<RegionId> = old
            .map(|a| self.ancestors(a).take_while(|r| Some(*r) != common).collect())
            .unwrap_or_default();
        let mut entries: Vec<RegionId> = new
            .map(|b| self.ancestors(b).take_while(|r| Some(*r) != common).collect())
            .unwrap_or_default();
        entries.reverse();
        Transition { exits, entries }
    }

    /// Moves an actor between regions unless a hook vetoes it.
    ///
    /// Every exit and entry hook gets to veto first; only when none did are
    /// the `on_exit`/`on_enter` notifications fired. Returns false if the
    /// move was vetoed, in which case nothing was notified.
    pub fn try_exit_and_enter(
        &self,
        actor: ThingId,
        point: Option<Point4D>,
        old: Option<RegionId>,
        new: Option<RegionId>,
    ) -> bool {
        let transition = self.transition(old, new);
        let ctx = |region| TriggerContext {
            actor,
            region,
            point,
            forced: false,
        };

        for &region in &transition.exits {
            if self.cancellable(&ctx(region), |g, c| g.allow_exit(c)) {
                trace!(%actor, %region, "Region exit vetoed");
                return false;
            }
        }
        for &region in &transition.entries {
            if self.cancellable(&ctx(region), |g, c| g.allow_enter(c)) {
                trace!(%actor, %region, "Region entry vetoed");
                return false;
            }
        }

        self.fire_transition(&transition, |region| ctx(region));
        true
    }

    /// Moves an actor between regions, firing every notification.
    pub fn exit_and_enter(
        &self,
        actor: ThingId,
        point: Option<Point4D>,
        old: Option<RegionId>,
        new: Option<RegionId>,
    ) {
        let transition = self.transition(old, new);
        self.fire_transition(&transition, |region| TriggerContext {
            actor,
            region,
            point,
            forced: true,
        });
    }

    fn fire_transition(&self, transition: &Transition, ctx: impl Fn(RegionId) -> TriggerContext) {
        for &region in &transition.exits {
            self.notify(&ctx(region), |g, c| g.on_exit(c));
        }
        for &region in &transition.entries {
            self.notify(&ctx(region), |g, c| g.on_enter(c));
        }
    }

    fn item_ctx(item: ThingId, region: RegionId, point: Point4D) -> TriggerContext {
        TriggerContext {
            actor: item,
            region,
            point: Some(point),
            forced: true,
        }
    }

    /// Tells the region at `point` and all its ancestors that `item` now
    /// lies there.
    pub fn item_enter(&self, item: ThingId, point: Point4D) {
        let Some(start) = self.region_for(point) else {
            return;
        };
        for region in self.ancestors(start) {
            self.notify(&Self::item_ctx(item, region, point), |g, c| {
                g.on_item_enter(c)
            });
        }
    }

    /// Tells the region at `point` and all its ancestors that `item` was
    /// taken off the ground there.
    pub fn item_leave(&self, item: ThingId, point: Point4D) {
        let Some(start) = self.region_for(point) else {
            return;
        };
        for region in self.ancestors(start) {
            self.notify(&Self::item_ctx(item, region, point), |g, c| {
                g.on_item_leave(c)
            });
        }
    }

    /// Moves an item along the ground from `from` to `to`.
    ///
    /// Only the regions below the common ancestor hear about it: leaves fire
    /// with the old point, entries with the new one. Returns the transition.
    pub fn item_transition(&self, item: ThingId, from: Point4D, to: Point4D) -> Transition {
        let transition = self.transition(self.region_for(from), self.region_for(to));
        for &region in &transition.exits {
            self.notify(&Self::item_ctx(item, region, from), |g, c| {
                g.on_item_leave(c)
            });
        }
        for &region in &transition.entries {
            self.notify(&Self::item_ctx(item, region, to), |g, c| {
                g.on_item_enter(c)
            });
        }
        transition
    }

    /// Walks from `start` to the root; true as soon as a region cancels.
    fn first_veto(
        &self,
        actor: ThingId,
        point: Point4D,
        start: Option<RegionId>,
        hook: impl Fn(&dyn RegionTriggers, &TriggerContext) -> TriggerResult,
    ) -> bool {
        let Some(start) = start else {
            return false;
        };
        self.ancestors(start).any(|region| {
            let ctx = TriggerContext {
                actor,
                region,
                point: Some(point),
                forced: false,
            };
            self.cancellable(&ctx, &hook)
        })
    }

    /// True if a region at `point` (or an ancestor) forbids picking up the
    /// item lying there.
    pub fn deny_pickup(&self, actor: ThingId, point: Point4D) -> bool {
        self.first_veto(actor, point, self.region_for(point), |g, c| g.deny_pickup(c))
    }

    /// True if a region at `point` (or an ancestor) forbids dropping items
    /// there.
    pub fn deny_put_on_ground(&self, actor: ThingId, point: Point4D) -> bool {
        self.first_veto(actor, point, self.region_for(point), |g, c| {
            g.deny_put_on_ground(c)
        })
    }
}
