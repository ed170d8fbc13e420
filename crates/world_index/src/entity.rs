//! The entity abstraction the index consumes.
//!
//! Game objects live in the entity layer. A map only keeps an [`Occupant`]
//! snapshot per thing: enough to answer range queries and collision checks
//! without calling back into the entity layer.

use crate::types::{Point3D, Point4D, ThingId};
use serde::{Deserialize, Serialize};

/// What kind of thing an occupant is, with the data collision checks need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OccupantKind {
    Item {
        model: u16,
        /// Overrides the model's tile-data height when set.
        height: Option<i32>,
        /// The item blocks `can_fit` queries that ask for it.
        blocks_fit: bool,
    },
    Character {
        player: bool,
        /// Insubstantial characters (ghosts, invisible GMs) never block.
        insubstantial: bool,
    },
}

impl OccupantKind {
    pub const fn is_item(&self) -> bool {
        matches!(self, OccupantKind::Item { .. })
    }

    pub const fn is_character(&self) -> bool {
        matches!(self, OccupantKind::Character { .. })
    }

    pub const fn is_player(&self) -> bool {
        matches!(self, OccupantKind::Character { player: true, .. })
    }

    pub const fn model(&self) -> Option<u16> {
        match self {
            OccupantKind::Item { model, .. } => Some(*model),
            OccupantKind::Character { .. } => None,
        }
    }
}

/// One tile of a multi-tile structure, relative to the structure's origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiPart {
    pub model: u16,
    pub dx: i32,
    pub dy: i32,
    pub dz: i32,
}

/// A multi-tile structure component placed on a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultiComponent {
    pub owner: ThingId,
    pub model: u16,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl MultiComponent {
    pub fn place(owner: ThingId, origin: Point3D, part: &MultiPart) -> Self {
        Self {
            owner,
            model: part.model,
            x: origin.x + part.dx,
            y: origin.y + part.dy,
            z: origin.z + part.dz,
        }
    }
}

/// Accessors the index needs from a game entity.
pub trait Entity {
    fn id(&self) -> ThingId;

    fn point(&self) -> Point4D;

    fn kind(&self) -> OccupantKind;

    /// Things held in containers or equipped are not on a map.
    fn is_on_ground(&self) -> bool {
        true
    }

    /// Logged-out characters and their belongings are kept aside.
    fn is_disconnected(&self) -> bool {
        false
    }

    /// Components of a multi-tile structure; empty for ordinary things.
    fn multi_parts(&self) -> &[MultiPart] {
        &[]
    }

    /// The snapshot a sector keeps for this entity.
    fn snapshot(&self) -> Occupant {
        Occupant {
            id: self.id(),
            point: self.point(),
            kind: self.kind(),
            on_ground: self.is_on_ground(),
            disconnected: self.is_disconnected(),
            parts: self.multi_parts().to_vec(),
        }
    }
}

/// A thing as stored in a sector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupant {
    pub id: ThingId,
    pub point: Point4D,
    pub kind: OccupantKind,
    pub on_ground: bool,
    pub disconnected: bool,
    pub parts: Vec<MultiPart>,
}

impl Occupant {
    pub fn item(id: ThingId, point: Point4D, model: u16) -> Self {
        Self {
            id,
            point,
            kind: OccupantKind::Item {
                model,
                height: None,
                blocks_fit: false,
            },
            on_ground: true,
            disconnected: false,
            parts: Vec::new(),
        }
    }

    pub fn character(id: ThingId, point: Point4D) -> Self {
        Self {
            id,
            point,
            kind: OccupantKind::Character {
                player: false,
                insubstantial: false,
            },
            on_ground: true,
            disconnected: false,
            parts: Vec::new(),
        }
    }

    pub fn as_player(mut self) -> Self {
        if let OccupantKind::Character { player, .. } = &mut self.kind {
            *player = true;
        }
        self
    }

    pub fn as_insubstantial(mut self) -> Self {
        if let OccupantKind::Character { insubstantial, .. } = &mut self.kind {
            *insubstantial = true;
        }
        self
    }

    pub fn with_height(mut self, new_height: i32) -> Self {
        if let OccupantKind::Item { height, .. } = &mut self.kind {
            *height = Some(new_height);
        }
        self
    }

    pub fn blocking_fit(mut self) -> Self {
        if let OccupantKind::Item { blocks_fit, .. } = &mut self.kind {
            *blocks_fit = true;
        }
        self
    }

    pub fn with_parts(mut self, parts: Vec<MultiPart>) -> Self {
        self.parts = parts;
        self
    }

    pub fn at(mut self, point: Point4D) -> Self {
        self.point = point;
        self
    }

    pub fn set_disconnected(mut self, disconnected: bool) -> Self {
        self.disconnected = disconnected;
        self
    }

    pub fn x(&self) -> i32 {
        self.point.x
    }

    pub fn y(&self) -> i32 {
        self.point.y
    }

    pub fn z(&self) -> i32 {
        self.point.z
    }

    /// Components of this occupant placed at its current position.
    pub fn placed_components(&self) -> impl Iterator<Item = MultiComponent> + '_ {
        let origin = self.point.xyz();
        self.parts
            .iter()
            .map(move |part| MultiComponent::place(self.id, origin, part))
    }
}

impl Entity for Occupant {
    fn id(&self) -> ThingId {
        self.id
    }

    fn point(&self) -> Point4D {
        self.point
    }

    fn kind(&self) -> OccupantKind {
        self.kind
    }

    fn is_on_ground(&self) -> bool {
        self.on_ground
    }

    fn is_disconnected(&self) -> bool {
        self.disconnected
    }

    fn multi_parts(&self) -> &[MultiPart] {
        &self.parts
    }

    fn snapshot(&self) -> Occupant {
        self.clone()
    }
}
