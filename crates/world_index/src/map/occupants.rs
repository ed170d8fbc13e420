//! Registering things with the sector grid.

use super::{same_sector, sector_of, Map};
use crate::entity::{Entity, MultiComponent, Occupant};
use crate::error::{Result, WorldError};
use crate::types::{Point3D, ThingId};
use tracing::warn;

impl Map {
    fn require_valid(&self, x: i32, y: i32) -> Result<()> {
        if self.is_valid_pos(x, y) {
            Ok(())
        } else {
            Err(WorldError::InvalidPosition {
                x,
                y,
                plane: self.plane,
            })
        }
    }

    /// Puts a thing into the sector of its position.
    ///
    /// Disconnected things go to the sector's disconnect list, players are
    /// also listed as players, and multi-tile structures register each of
    /// their components with the sector the component falls into.
    pub fn add(&mut self, entity: &impl Entity) -> Result<()> {
        let occupant = entity.snapshot();
        self.require_valid(occupant.x(), occupant.y())?;
        let (sx, sy) = sector_of(occupant.x(), occupant.y());

        let components: Vec<MultiComponent> = occupant.placed_components().collect();
        let Some(sector) = self.sector_mut(sx, sy) else {
            return Ok(());
        };
        if occupant.disconnected {
            sector.add_disconnect(occupant);
        } else {
            if occupant.kind.is_player() {
                sector.add_player(occupant.id);
            }
            sector.add_thing(occupant);
        }

        for component in components {
            self.add_component(component);
        }
        Ok(())
    }

    /// Takes a thing out of the sector of its current position.
    ///
    /// Returns false if it was not registered there.
    pub fn remove(&mut self, entity: &impl Entity) -> bool {
        let occupant = entity.snapshot();
        let removed = self.remove_at(occupant.id, occupant.point.xyz());
        for component in occupant.placed_components() {
            self.remove_component(&component);
        }
        removed
    }

    /// Removes a thing by id from the sector of `point`.
    pub fn remove_at(&mut self, id: ThingId, point: Point3D) -> bool {
        if !self.is_valid_pos(point.x, point.y) {
            return false;
        }
        let (sx, sy) = sector_of(point.x, point.y);
        let Some(sector) = self.sector_mut(sx, sy) else {
            return false;
        };
        sector.remove_player(id);
        sector.remove_thing(id).is_some() || sector.remove_disconnect(id).is_some()
    }

    /// Updates the index after a thing moved on this map from `old`.
    ///
    /// Only when the move crosses a sector boundary is the thing moved
    /// between sectors; otherwise its snapshot is refreshed in place.
    pub fn moved(&mut self, entity: &impl Entity, old: Point3D) -> Result<()> {
        let occupant = entity.snapshot();
        let new = occupant.point.xyz();
        self.require_valid(new.x, new.y)?;

        let old_components: Vec<MultiComponent> = occupant
            .parts
            .iter()
            .map(|part| MultiComponent::place(occupant.id, old, part))
            .collect();
        let new_components: Vec<MultiComponent> = occupant.placed_components().collect();

        if same_sector(old.x, old.y, new.x, new.y) {
            let (sx, sy) = sector_of(new.x, new.y);
            if let Some(sector) = self.sector_mut(sx, sy) {
                let updated = if occupant.disconnected {
                    sector.update_disconnect(occupant.clone())
                } else {
                    sector.update_thing(occupant.clone())
                };
                if !updated {
                    warn!(id = %occupant.id, "Moved thing was not registered in its sector");
                    self.remove_at(occupant.id, old);
                    for component in &old_components {
                        self.remove_component(component);
                    }
                    self.add(&occupant)?;
                    return Ok(());
                }
            }
        } else {
            self.remove_at(occupant.id, old);
            self.insert_without_components(occupant);
        }

        for (old_component, new_component) in old_components.iter().zip(new_components) {
            self.move_component(old_component, new_component);
        }
        Ok(())
    }

    fn insert_without_components(&mut self, occupant: Occupant) {
        let (sx, sy) = sector_of(occupant.x(), occupant.y());
        if let Some(sector) = self.sector_mut(sx, sy) {
            if occupant.disconnected {
                sector.add_disconnect(occupant);
            } else {
                if occupant.kind.is_player() {
                    sector.add_player(occupant.id);
                }
                sector.add_thing(occupant);
            }
        }
    }

    fn add_component(&mut self, component: MultiComponent) {
        if !self.is_valid_pos(component.x, component.y) {
            return;
        }
        let (sx, sy) = sector_of(component.x, component.y);
        if let Some(sector) = self.sector_mut(sx, sy) {
            sector.add_multi_component(component);
        }
    }

    fn remove_component(&mut self, component: &MultiComponent) {
        if !self.is_valid_pos(component.x, component.y) {
            return;
        }
        let (sx, sy) = sector_of(component.x, component.y);
        if let Some(sector) = self.sector_mut(sx, sy) {
            sector.remove_multi_component(component);
        }
    }

    fn move_component(&mut self, old: &MultiComponent, new: MultiComponent) {
        if self.is_valid_pos(old.x, old.y)
            && self.is_valid_pos(new.x, new.y)
            && same_sector(old.x, old.y, new.x, new.y)
        {
            let (sx, sy) = sector_of(new.x, new.y);
            if let Some(sector) = self.sector_mut(sx, sy) {
                if sector.replace_multi_component(old, new) {
                    return;
                }
            }
        }
        self.remove_component(old);
        self.add_component(new);
    }

    /// Moves a thing to its sector's disconnect list.
    pub fn disconnected(&mut self, entity: &impl Entity) {
        let occupant = entity.snapshot();
        if !self.is_valid_pos(occupant.x(), occupant.y()) {
            return;
        }
        let (sx, sy) = sector_of(occupant.x(), occupant.y());
        if let Some(sector) = self.sector_mut(sx, sy) {
            sector.remove_player(occupant.id);
            let stored = sector.remove_thing(occupant.id).unwrap_or(occupant);
            sector.add_disconnect(stored.set_disconnected(true));
        }
    }

    /// Moves a thing back from its sector's disconnect list.
    pub fn reconnected(&mut self, entity: &impl Entity) {
        let occupant = entity.snapshot();
        if !self.is_valid_pos(occupant.x(), occupant.y()) {
            return;
        }
        let (sx, sy) = sector_of(occupant.x(), occupant.y());
        if let Some(sector) = self.sector_mut(sx, sy) {
            let stored = sector
                .remove_disconnect(occupant.id)
                .unwrap_or(occupant)
                .set_disconnected(false);
            if stored.kind.is_player() {
                sector.add_player(stored.id);
            }
            sector.add_thing(stored);
        }
    }

    /// Lists a character as a player in its sector.
    pub fn made_into_player(&mut self, entity: &impl Entity) {
        let occupant = entity.snapshot();
        if !self.is_valid_pos(occupant.x(), occupant.y()) {
            return;
        }
        let (sx, sy) = sector_of(occupant.x(), occupant.y());
        if let Some(sector) = self.sector_mut(sx, sy) {
            sector.add_player(occupant.id);
            sector.update_thing(occupant);
        }
    }

    /// Removes a character from its sector's player list.
    pub fn made_into_non_player(&mut self, entity: &impl Entity) {
        let occupant = entity.snapshot();
        if !self.is_valid_pos(occupant.x(), occupant.y()) {
            return;
        }
        let (sx, sy) = sector_of(occupant.x(), occupant.y());
        if let Some(sector) = self.sector_mut(sx, sy) {
            sector.remove_player(occupant.id);
            sector.update_thing(occupant);
        }
    }

    /// Drops every registered thing, keeping sectors, terrain and regions.
    pub fn clear_things(&mut self) {
        for sector in self.created_sectors_mut() {
            sector.clear_things();
        }
    }
}
