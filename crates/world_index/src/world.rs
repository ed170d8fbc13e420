//! The world index context.
//!
//! A [`WorldIndex`] owns everything spatial about one world: the maps of all
//! planes, every region and the region registries. Nothing is global, so
//! several worlds (or tests) can live side by side.

use crate::config::WorldConfig;
use crate::entity::Entity;
use crate::error::{Result, WorldError};
use crate::map::Map;
use crate::regions::{Region, RegionId, RegionTriggers};
use crate::terrain::TerrainSource;
use crate::tiles::TileData;
use crate::types::Point4D;
use once_cell::unsync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Number of map planes a world can have.
pub const PLANE_COUNT: usize = 256;

/// A plane's map, built on first access.
type LazyMap = Lazy<Map, Box<dyn FnOnce() -> Map + Send>>;

/// Owner of the maps, regions and region registries of one world.
pub struct WorldIndex {
    pub(crate) config: Arc<WorldConfig>,
    pub(crate) tile_data: Arc<TileData>,
    pub(crate) terrain: Arc<dyn TerrainSource>,
    maps: Vec<LazyMap>,
    pub(crate) regions: Vec<Option<Region>>,
    /// Lowercased defname to static region.
    pub(crate) by_defname: HashMap<String, RegionId>,
    /// Lowercased name to static regions, in registration order.
    pub(crate) by_name: HashMap<String, Vec<RegionId>>,
    pub(crate) world_region: Option<RegionId>,
    pub(crate) highest_hierarchy_index: u32,
    pub(crate) trigger_groups: HashMap<String, Arc<dyn RegionTriggers>>,
}

impl fmt::Debug for WorldIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorldIndex")
            .field("maps_created", &self.maps().count())
            .field("regions", &self.region_count())
            .field("world_region", &self.world_region)
            .field("highest_hierarchy_index", &self.highest_hierarchy_index)
            .finish()
    }
}

impl WorldIndex {
    /// Creates an empty world.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidConfig`] if the configuration does not
    /// validate.
    pub fn new(
        config: WorldConfig,
        tile_data: TileData,
        terrain: Arc<dyn TerrainSource>,
    ) -> Result<Self> {
        config.validate().map_err(WorldError::InvalidConfig)?;
        let config = Arc::new(config);
        let tile_data = Arc::new(tile_data);
        let maps = (0..PLANE_COUNT)
            .map(|plane| Self::lazy_map(plane as u8, &config, &tile_data, &terrain))
            .collect();
        Ok(Self {
            config,
            tile_data,
            terrain,
            maps,
            regions: Vec::new(),
            by_defname: HashMap::new(),
            by_name: HashMap::new(),
            world_region: None,
            highest_hierarchy_index: 0,
            trigger_groups: HashMap::new(),
        })
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn tile_data(&self) -> &TileData {
        &self.tile_data
    }

    fn lazy_map(
        plane: u8,
        config: &Arc<WorldConfig>,
        tile_data: &Arc<TileData>,
        terrain: &Arc<dyn TerrainSource>,
    ) -> LazyMap {
        let (config, tile_data, terrain) =
            (Arc::clone(config), Arc::clone(tile_data), Arc::clone(terrain));
        Lazy::new(Box::new(move || Map::new(plane, config, tile_data, terrain)))
    }

    /// The map of a plane, created on first access.
    pub fn map(&self, plane: u8) -> &Map {
        Lazy::force(&self.maps[plane as usize])
    }

    /// Mutable access to the map of a plane, created on first access.
    pub fn map_mut(&mut self, plane: u8) -> &mut Map {
        Lazy::force_mut(&mut self.maps[plane as usize])
    }

    /// Maps created so far.
    pub fn maps(&self) -> impl Iterator<Item = &Map> + '_ {
        self.maps.iter().filter_map(Lazy::get)
    }

    pub(crate) fn maps_mut(&mut self) -> impl Iterator<Item = &mut Map> + '_ {
        self.maps.iter_mut().filter_map(Lazy::get_mut)
    }

    // ------------------------------------------------------------------
    // Things
    // ------------------------------------------------------------------

    /// Registers a thing with the map of its plane.
    ///
    /// Things not on the ground (in containers, equipped) are ignored.
    pub fn add_thing(&mut self, entity: &impl Entity) -> Result<()> {
        if !entity.is_on_ground() {
            return Ok(());
        }
        let plane = entity.point().plane;
        self.map_mut(plane).add(entity)
    }

    pub fn remove_thing(&mut self, entity: &impl Entity) -> bool {
        let plane = entity.point().plane;
        self.map_mut(plane).remove(entity)
    }

    /// Updates the index after a thing changed position from `old`.
    ///
    /// A plane change removes the thing from the old map and adds it to the
    /// new one; otherwise the map rebuckets it if it crossed a sector edge.
    pub fn changed_position(&mut self, entity: &impl Entity, old: Point4D) -> Result<()> {
        let new = entity.point();
        if old.plane != new.plane {
            let mut previous = entity.snapshot();
            previous.point = old;
            self.map_mut(old.plane).remove(&previous);
            self.map_mut(new.plane).add(entity)
        } else {
            self.map_mut(new.plane).moved(entity, old.xyz())
        }
    }

    pub fn disconnected(&mut self, entity: &impl Entity) {
        let plane = entity.point().plane;
        self.map_mut(plane).disconnected(entity);
    }

    pub fn reconnected(&mut self, entity: &impl Entity) {
        let plane = entity.point().plane;
        self.map_mut(plane).reconnected(entity);
    }

    pub fn made_into_player(&mut self, entity: &impl Entity) {
        let plane = entity.point().plane;
        self.map_mut(plane).made_into_player(entity);
    }

    pub fn made_into_non_player(&mut self, entity: &impl Entity) {
        let plane = entity.point().plane;
        self.map_mut(plane).made_into_non_player(entity);
    }

    /// Forgets every registered thing on every plane. Regions stay.
    pub fn clear_things(&mut self) {
        for map in self.maps_mut() {
            map.clear_things();
        }
    }

    // ------------------------------------------------------------------
    // Regions
    // ------------------------------------------------------------------

    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id.0 as usize).and_then(Option::as_ref)
    }

    pub(crate) fn region_mut(&mut self, id: RegionId) -> Option<&mut Region> {
        self.regions.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    pub(crate) fn require_region(&self, id: RegionId) -> Result<&Region> {
        self.region(id).ok_or(WorldError::UnknownRegion(id))
    }

    pub(crate) fn require_region_mut(&mut self, id: RegionId) -> Result<&mut Region> {
        self.region_mut(id).ok_or(WorldError::UnknownRegion(id))
    }

    pub(crate) fn next_region_id(&self) -> RegionId {
        RegionId(self.regions.len() as u32)
    }

    pub(crate) fn insert_region(&mut self, region: Region) -> RegionId {
        let id = region.id;
        debug_assert_eq!(id.0 as usize, self.regions.len());
        self.regions.push(Some(region));
        id
    }

    pub(crate) fn take_region(&mut self, id: RegionId) -> Option<Region> {
        self.regions.get_mut(id.0 as usize).and_then(Option::take)
    }

    /// Every live region, static and dynamic.
    pub fn regions(&self) -> impl Iterator<Item = &Region> + '_ {
        self.regions.iter().filter_map(Option::as_ref)
    }

    pub fn region_count(&self) -> usize {
        self.regions().count()
    }

    /// The root of the hierarchy, once loading finished.
    pub fn world_region(&self) -> Option<RegionId> {
        self.world_region
    }

    pub fn highest_hierarchy_index(&self) -> u32 {
        self.highest_hierarchy_index
    }

    /// The most specific region at a point.
    ///
    /// Dynamic regions win over static ones, deeper static regions over
    /// shallower ones, and points no rectangle covers belong to the world
    /// region.
    pub fn region_for(&self, point: Point4D) -> Option<RegionId> {
        self.map(point.plane)
            .region_for(point.x, point.y)
            .or(self.world_region)
    }

    /// Registers the hooks of a trigger group under a case-insensitive name.
    pub fn register_trigger_group(&mut self, name: &str, triggers: Arc<dyn RegionTriggers>) {
        self.trigger_groups.insert(name.to_lowercase(), triggers);
    }

    /// Drops every region and registry and detaches all rectangles.
    pub fn clear_regions(&mut self) {
        for map in self.maps_mut() {
            map.inactivate_regions(true);
        }
        // keep the slots so stale handles never resolve to new regions
        for slot in &mut self.regions {
            *slot = None;
        }
        self.by_defname.clear();
        self.by_name.clear();
        self.world_region = None;
        self.highest_hierarchy_index = 0;
        info!("🧹 Region subsystem cleared");
    }
}
