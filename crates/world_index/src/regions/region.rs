use crate::rect::Rectangle;
use crate::types::Point4D;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle of a region inside a [`crate::WorldIndex`].
///
/// Handles are never reused within one index, so a stale handle of a deleted
/// region simply stops resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionId(pub u32);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Name reported by every dynamic region.
pub const DYNAMIC_REGION_NAME: &str = "DynamicRegion";

/// Data only static regions carry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StaticRegionData {
    /// Unique registry key, case-insensitive.
    pub defname: String,
    /// Human-readable name, not unique.
    pub name: String,
    pub created_at: Option<String>,
    /// Parent defname as written in the region file, until resolved.
    pub(crate) parent_defname: Option<String>,
    /// Cleared while the region's rectangles are being edited.
    pub(crate) can_be_activated: bool,
    /// Unrecognised `key=value` lines, kept for saving.
    pub tags: Vec<(String, String)>,
}

/// The two kinds of region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionKind {
    /// Registered by defname, persisted, part of the loaded hierarchy.
    Static(StaticRegionData),
    /// Runtime only; may move, never overlaps another dynamic region.
    Dynamic,
}

/// A region: a set of rectangles with a place in the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub(crate) id: RegionId,
    pub(crate) rectangles: Vec<Rectangle>,
    pub(crate) parent: Option<RegionId>,
    pub(crate) spawn_point: Option<Point4D>,
    pub(crate) hierarchy_index: Option<u32>,
    pub(crate) inactivated: bool,
    pub(crate) plane: u8,
    pub(crate) trigger_groups: Vec<String>,
    pub(crate) kind: RegionKind,
}

impl Region {
    pub(crate) fn new_static(id: RegionId, defname: &str) -> Self {
        Self {
            id,
            rectangles: Vec::new(),
            parent: None,
            spawn_point: None,
            hierarchy_index: None,
            inactivated: true,
            plane: 0,
            trigger_groups: Vec::new(),
            kind: RegionKind::Static(StaticRegionData {
                defname: defname.to_string(),
                can_be_activated: true,
                ..StaticRegionData::default()
            }),
        }
    }

    pub(crate) fn new_dynamic(id: RegionId, rectangles: Vec<Rectangle>) -> Self {
        Self {
            id,
            rectangles,
            parent: None,
            spawn_point: None,
            hierarchy_index: None,
            inactivated: false,
            plane: 0,
            trigger_groups: Vec::new(),
            kind: RegionKind::Dynamic,
        }
    }

    pub fn id(&self) -> RegionId {
        self.id
    }

    pub fn rectangles(&self) -> &[Rectangle] {
        &self.rectangles
    }

    pub fn parent(&self) -> Option<RegionId> {
        self.parent
    }

    pub fn spawn_point(&self) -> Option<Point4D> {
        self.spawn_point
    }

    /// Depth in the hierarchy, `None` until resolved (or placed).
    pub fn hierarchy_index(&self) -> Option<u32> {
        self.hierarchy_index
    }

    pub fn is_inactivated(&self) -> bool {
        self.inactivated
    }

    pub fn plane(&self) -> u8 {
        self.plane
    }

    pub fn trigger_groups(&self) -> &[String] {
        &self.trigger_groups
    }

    pub fn kind(&self) -> &RegionKind {
        &self.kind
    }

    pub fn is_static(&self) -> bool {
        matches!(self.kind, RegionKind::Static(_))
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self.kind, RegionKind::Dynamic)
    }

    pub fn static_data(&self) -> Option<&StaticRegionData> {
        match &self.kind {
            RegionKind::Static(data) => Some(data),
            RegionKind::Dynamic => None,
        }
    }

    pub(crate) fn static_data_mut(&mut self) -> Option<&mut StaticRegionData> {
        match &mut self.kind {
            RegionKind::Static(data) => Some(data),
            RegionKind::Dynamic => None,
        }
    }

    pub fn defname(&self) -> Option<&str> {
        self.static_data().map(|data| data.defname.as_str())
    }

    /// Display name; dynamic regions all share one.
    pub fn name(&self) -> &str {
        match &self.kind {
            RegionKind::Static(data) if !data.name.is_empty() => &data.name,
            RegionKind::Static(data) => &data.defname,
            RegionKind::Dynamic => DYNAMIC_REGION_NAME,
        }
    }

    pub fn contains_xy(&self, x: i32, y: i32) -> bool {
        self.rectangles.iter().any(|r| r.contains_xy(x, y))
    }

    /// True if every corner of `rect` lies in one of this region's
    /// rectangles. The corners may fall in different rectangles.
    pub fn contains_rect(&self, rect: &Rectangle) -> bool {
        rect.corners().iter().all(|&(x, y)| self.contains_xy(x, y))
    }

    /// A dynamic region is placed once it has a position.
    pub fn is_placed(&self) -> bool {
        self.is_dynamic() && self.spawn_point.is_some()
    }

    pub(crate) fn can_be_activated(&self) -> bool {
        match &self.kind {
            RegionKind::Static(data) => data.can_be_activated,
            RegionKind::Dynamic => false,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.defname() {
            Some(defname) => write!(f, "{} ({})", self.name(), defname),
            None => write!(f, "{} {}", self.name(), self.id),
        }
    }
}
