//! Movement and collision validation.
//!
//! [`Map::check_movement`] decides whether a mover standing on a cell can
//! step in a direction and at which altitude it ends up; [`Map::can_fit`]
//! answers whether a body of some height fits at an exact spot. Both read
//! the land, the static scenery, multi components and the items registered
//! with the map.

mod can_fit;
mod check;
mod scratch;

pub use can_fit::CanFitOptions;
pub use scratch::MovementScratch;

use crate::map::Map;
use crate::tiles::{ItemTileInfo, TileData};
use crate::types::{Direction, Point4D};
use crate::world::WorldIndex;
use serde::{Deserialize, Serialize};

/// Height of a standing character's body.
pub const PERSON_HEIGHT: i32 = 16;

/// Items with a model at or above this are multi-structure markers, not
/// tiles, and never collide.
pub(crate) const MAX_ITEM_MODEL: u16 = 0x4000;

/// What a mover is able to cross.
pub trait MovementSettings {
    fn can_cross_land(&self) -> bool;
    fn can_swim(&self) -> bool;
    fn can_cross_lava(&self) -> bool;
    fn can_fly(&self) -> bool;
    /// Doors do not block.
    fn ignore_doors(&self) -> bool;
    /// Largest altitude gain allowed in one step.
    fn climb_power(&self) -> i32;
}

/// A plain capability set, usable from configuration files.
///
/// # Examples
///
/// ```rust
/// use world_index::movement::{Capabilities, MovementSettings};
///
/// let swimmer = Capabilities { can_swim: true, ..Capabilities::default() };
/// assert!(swimmer.can_cross_land());
/// assert!(swimmer.can_swim());
/// assert_eq!(swimmer.climb_power(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    pub can_cross_land: bool,
    pub can_swim: bool,
    pub can_cross_lava: bool,
    pub can_fly: bool,
    pub ignore_doors: bool,
    pub climb_power: i32,
}

impl Capabilities {
    /// Walks on land, climbs 2 per step.
    pub const fn walker() -> Self {
        Self {
            can_cross_land: true,
            can_swim: false,
            can_cross_lava: false,
            can_fly: false,
            ignore_doors: false,
            climb_power: 2,
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::walker()
    }
}

impl MovementSettings for Capabilities {
    fn can_cross_land(&self) -> bool {
        self.can_cross_land
    }

    fn can_swim(&self) -> bool {
        self.can_swim
    }

    fn can_cross_lava(&self) -> bool {
        self.can_cross_lava
    }

    fn can_fly(&self) -> bool {
        self.can_fly
    }

    fn ignore_doors(&self) -> bool {
        self.ignore_doors
    }

    fn climb_power(&self) -> i32 {
        self.climb_power
    }
}

/// Result of a movement check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub accepted: bool,
    /// The forward cell, whether or not the move was accepted.
    pub x: i32,
    pub y: i32,
    /// Altitude after the move; the starting altitude when rejected.
    pub z: i32,
}

/// A static tile, multi component or item reduced to what the checks use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Candidate {
    pub model: u16,
    pub z: i32,
    pub info: ItemTileInfo,
    pub lava: bool,
}

impl Candidate {
    pub fn new(model: u16, z: i32, tile_data: &TileData) -> Self {
        Self {
            model,
            z,
            info: tile_data.item(model),
            lava: tile_data.is_lava_item(model),
        }
    }

    /// Altitude of someone standing on top.
    pub fn stand_z(&self) -> i32 {
        self.z + self.info.calc_height
    }

    /// A mover may use this as ground: walkable surface, or liquid/lava it
    /// can cross, or anything at all for flyers.
    pub fn is_viable<S: MovementSettings + ?Sized>(&self, settings: &S, walkable: bool) -> bool {
        let wet = self.info.flags.is_wet();
        let viable = walkable
            || (settings.can_swim() && wet)
            || (settings.can_cross_lava() && self.lava)
            || settings.can_fly();
        viable && (settings.can_fly() || settings.can_cross_land() || wet || self.lava)
    }
}

impl WorldIndex {
    /// [`Map::check_movement`] on the plane of `point`.
    pub fn check_movement<S: MovementSettings + ?Sized>(
        &self,
        point: Point4D,
        settings: &S,
        direction: Direction,
        hack_move: bool,
        scratch: &mut MovementScratch,
    ) -> MoveOutcome {
        self.map(point.plane)
            .check_movement(point.xyz(), settings, direction, hack_move, scratch)
    }

    /// [`Map::can_fit`] on the plane of `point`, at its z.
    pub fn can_fit(&self, point: Point4D, height: i32, options: CanFitOptions) -> bool {
        self.map(point.plane)
            .can_fit(point.x, point.y, point.z, height, options)
    }
}

impl Map {
    pub(crate) fn candidates_on(&self, x: i32, y: i32) -> impl Iterator<Item = Candidate> + '_ {
        let tile_data = self.tile_data();
        self.statics_on_coords(x, y)
            .map(move |tile| Candidate::new(tile.model, tile.z, tile_data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walker_is_the_default_capability_set() {
        let caps = Capabilities::default();
        assert!(caps.can_cross_land);
        assert!(!caps.can_swim && !caps.can_fly && !caps.can_cross_lava);
        assert_eq!(caps.climb_power, 2);
    }

    #[test]
    fn test_capabilities_parse_partially() {
        let caps: Capabilities = serde_json::from_str(r#"{"can_fly": true}"#).unwrap();
        assert!(caps.can_fly);
        assert!(caps.can_cross_land);
    }
}
