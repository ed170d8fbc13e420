//! # World Index
//!
//! The spatial backbone of a tile-based world server: where things are, which
//! region a point belongs to, and whether a mover can take a step.
//!
//! ## Core Features
//!
//! - **Sector grid**: every map plane is bucketed into 16x16 tile sectors,
//!   created on first touch, so point and range queries only visit a few
//!   sectors
//! - **Region hierarchy**: static regions loaded from region files form a
//!   tree rooted at the world region and are draped over the sectors;
//!   dynamic regions move at runtime and never overlap each other
//! - **Region triggers**: enter/exit hooks along the hierarchy, vetoable by
//!   any ancestor
//! - **Movement validation**: step checks and fit queries against land,
//!   scenery, structure components and items
//!
//! ## Quick Start Example
//!
//! ```rust
//! use std::sync::Arc;
//! use world_index::{
//!     LandTile, MemoryTerrain, Point4D, Rectangle, StaticRegionDef, TileData, WorldConfig,
//!     WorldIndex,
//! };
//!
//! let terrain = Arc::new(MemoryTerrain::new(LandTile::new(3, 0)));
//! let mut world = WorldIndex::new(WorldConfig::default(), TileData::new(), terrain)?;
//!
//! let root = world.create_static_region(
//!     StaticRegionDef::new("a_world").with_rect(Rectangle::new(0, 0, 6143, 4095)?),
//! )?;
//! let town = world.create_static_region(
//!     StaticRegionDef::new("a_town")
//!         .named("Town")
//!         .child_of(root)
//!         .with_rect(Rectangle::new(100, 100, 200, 200)?),
//! )?;
//!
//! assert_eq!(world.region_for(Point4D::new(150, 150, 0, 0)), Some(town));
//! assert_eq!(world.region_for(Point4D::new(50, 50, 0, 0)), Some(root));
//! assert_eq!(world.hierarchy_name(town), "Town in a_world");
//! # Ok::<(), world_index::WorldError>(())
//! ```

pub mod config;
pub mod entity;
pub mod error;
pub mod map;
pub mod movement;
pub mod rect;
pub mod regions;
pub mod terrain;
pub mod tiles;
pub mod types;
pub mod world;

#[cfg(test)]
mod tests;

pub use config::{MapSize, PlaneSize, WorldConfig};
pub use entity::{Entity, MultiComponent, MultiPart, Occupant, OccupantKind};
pub use error::{Result, WorldError};
pub use map::{Map, Sector};
pub use movement::{CanFitOptions, Capabilities, MoveOutcome, MovementScratch, MovementSettings};
pub use rect::Rectangle;
pub use regions::{
    Region, RegionId, RegionKind, RegionTriggers, StaticRegionDef, StaticRegionData, Transition,
    TriggerContext, TriggerResult,
};
pub use terrain::{LandTile, MemoryTerrain, StaticSector, StaticTile, TerrainSource};
pub use tiles::{ItemTileInfo, TileData, TileFlags};
pub use types::{Direction, Point2D, Point3D, Point4D, ThingId};
pub use world::{WorldIndex, PLANE_COUNT};
