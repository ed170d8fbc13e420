//! Tile data: per-id flags and heights for land tiles and item models.
//!
//! The table is filled by the data layer (usually from the client's tile data
//! file); the index only reads it. Unknown ids behave as flagless, zero-height
//! tiles.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Passability flags of a tile or item model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TileFlags(pub u32);

impl TileFlags {
    pub const NONE: TileFlags = TileFlags(0);
    pub const DOOR: TileFlags = TileFlags(0x2000_0000);
    pub const IMPASSABLE: TileFlags = TileFlags(0x40);
    pub const WET: TileFlags = TileFlags(0x80);
    pub const SURFACE: TileFlags = TileFlags(0x200);
    pub const BRIDGE: TileFlags = TileFlags(0x400);
    pub const IMPASSABLE_SURFACE: TileFlags = TileFlags(0x40 | 0x200);

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// True if every bit of `other` is set.
    pub const fn contains(self, other: TileFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if any bit of `other` is set.
    pub const fn intersects(self, other: TileFlags) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn is_impassable(self) -> bool {
        self.contains(Self::IMPASSABLE)
    }

    pub const fn is_surface(self) -> bool {
        self.contains(Self::SURFACE)
    }

    pub const fn is_wet(self) -> bool {
        self.contains(Self::WET)
    }

    pub const fn is_bridge(self) -> bool {
        self.contains(Self::BRIDGE)
    }

    pub const fn is_door(self) -> bool {
        self.contains(Self::DOOR)
    }

    /// Surface and not impassable: something one can stand on.
    pub const fn is_walkable_surface(self) -> bool {
        self.0 & Self::IMPASSABLE_SURFACE.0 == Self::SURFACE.0
    }
}

impl BitOr for TileFlags {
    type Output = TileFlags;

    fn bitor(self, rhs: TileFlags) -> TileFlags {
        TileFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for TileFlags {
    fn bitor_assign(&mut self, rhs: TileFlags) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for TileFlags {
    type Output = TileFlags;

    fn bitand(self, rhs: TileFlags) -> TileFlags {
        TileFlags(self.0 & rhs.0)
    }
}

/// Static information about an item model (also used for static scenery).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemTileInfo {
    pub flags: TileFlags,
    /// Raw height of the model.
    pub height: i32,
    /// Height an actor stands at when on top of the model, relative to its z.
    pub calc_height: i32,
}

impl ItemTileInfo {
    /// Builds the info of a model, deriving its walkable height.
    ///
    /// Bridges are walked on halfway up; anything else on its top.
    pub fn new(flags: TileFlags, height: i32) -> Self {
        let calc_height = if flags.is_bridge() { height / 2 } else { height };
        Self {
            flags,
            height,
            calc_height,
        }
    }
}

/// Land tile ids the movement code ignores entirely (no-draw and void tiles).
pub fn is_ignored_land_id(id: u16) -> bool {
    id == 2 || id == 0x1DB || (0x1AE..=0x1B5).contains(&id)
}

/// The tile-data table consulted by the movement validator.
#[derive(Debug, Clone, Default)]
pub struct TileData {
    land: HashMap<u16, TileFlags>,
    items: HashMap<u16, ItemTileInfo>,
    lava_land: HashSet<u16>,
    lava_items: HashSet<u16>,
}

impl TileData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_land_flags(&mut self, id: u16, flags: TileFlags) -> &mut Self {
        self.land.insert(id, flags);
        self
    }

    pub fn set_item(&mut self, model: u16, flags: TileFlags, height: i32) -> &mut Self {
        self.items.insert(model, ItemTileInfo::new(flags, height));
        self
    }

    /// Marks a land tile id as lava.
    pub fn mark_lava_land(&mut self, id: u16) -> &mut Self {
        self.lava_land.insert(id);
        self
    }

    /// Marks an item model as lava.
    pub fn mark_lava_item(&mut self, model: u16) -> &mut Self {
        self.lava_items.insert(model);
        self
    }

    /// Flags of a land tile id; the high bits of a raw id are ignored.
    pub fn land_flags(&self, id: u16) -> TileFlags {
        self.land.get(&(id & 0x3FFF)).copied().unwrap_or_default()
    }

    pub fn item(&self, model: u16) -> ItemTileInfo {
        self.items.get(&model).copied().unwrap_or_default()
    }

    pub fn is_lava_land(&self, id: u16) -> bool {
        self.lava_land.contains(&id)
    }

    pub fn is_lava_item(&self, model: u16) -> bool {
        self.lava_items.contains(&model)
    }
}
