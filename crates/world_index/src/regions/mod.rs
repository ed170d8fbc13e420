//! The region hierarchy.
//!
//! Regions are named sets of rectangles arranged in a tree rooted at the
//! world region. Static regions come from region files and are draped over
//! the maps once loading finished; dynamic regions are created at runtime
//! and move with whatever owns them (a ship, a house).
//!
//! All regions live in an arena inside the [`crate::WorldIndex`] and are
//! addressed by [`RegionId`]; parent links are ids as well.

mod dynamic;
mod hierarchy;
mod persistence;
mod region;
mod static_regions;
mod triggers;

pub use hierarchy::Ancestors;
pub use region::{Region, RegionId, RegionKind, StaticRegionData, DYNAMIC_REGION_NAME};
pub use static_regions::StaticRegionDef;
pub use triggers::{RegionTriggers, Transition, TriggerContext, TriggerResult};
