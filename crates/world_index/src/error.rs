//! Error types for the world index.
//!
//! Only configuration and programming errors surface here. Expected negative
//! outcomes of the hot path (a rejected move, a dynamic region that collides
//! with another one) are plain `bool`/struct results.

use crate::regions::RegionId;

/// Errors raised by the world index and the region subsystem.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A rectangle was constructed with its minimum past its maximum.
    #[error("Invalid rectangle: ({min_x}, {min_y}) - ({max_x}, {max_y}), min must not exceed max")]
    InvalidRectangle {
        min_x: i32,
        min_y: i32,
        max_x: i32,
        max_y: i32,
    },

    /// Two static regions share a defname.
    #[error("Region '{0}' loaded multiple times")]
    DuplicateDefname(String),

    /// A second parentless region was found after the world region.
    #[error("Parent missing for the region '{0}'")]
    MissingParent(String),

    /// No parentless region exists at all.
    #[error("No world region defined")]
    NoWorldRegion,

    /// The parent chain of some regions never reaches the world region.
    #[error("Region hierarchy not completely resolvable: {0}")]
    UnresolvableHierarchy(String),

    /// A region and its parent live on different map planes.
    #[error("Region '{region}' has its parent '{parent}' on another mapplane")]
    ParentOnOtherPlane { region: String, parent: String },

    /// Strict hierarchy checking rejected the loaded regions.
    #[error("Region hierarchy conflicts found in: {0:?}")]
    HierarchyConflict(Vec<String>),

    /// Dynamic regions have no persisted identity.
    #[error("Dynamic regions are not supposed to be saved or loaded")]
    DynamicRegionPersistence,

    /// `place` was called on a dynamic region that already sits on a map.
    #[error("Dynamic region {0:?} is already placed")]
    AlreadyPlaced(RegionId),

    /// A relocation was requested for a dynamic region that was never placed.
    #[error("Dynamic region {0:?} has not been placed yet")]
    NotPlaced(RegionId),

    /// A coordinate outside the map was used where a valid one is required.
    #[error("Invalid position ({x}, {y}) on mapplane {plane}")]
    InvalidPosition { x: i32, y: i32, plane: u8 },

    /// The region id does not (or no longer) refer to a live region.
    #[error("Unknown region {0:?}")]
    UnknownRegion(RegionId),

    /// A static-only operation was invoked on a dynamic region, or vice versa.
    #[error("Region {0:?} is not a {1} region")]
    WrongRegionKind(RegionId, &'static str),

    /// The world region cannot be removed.
    #[error("The world region cannot be deleted")]
    CannotDeleteWorldRegion,

    /// A line of a region file could not be understood.
    #[error("{file}:{line}: {message}")]
    Parse {
        file: String,
        line: usize,
        message: String,
    },

    /// The world configuration did not validate.
    #[error("Invalid world configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorldError {
    /// Builds a parse error for a given file and line.
    pub fn parse(file: &str, line: usize, message: impl Into<String>) -> Self {
        WorldError::Parse {
            file: file.to_string(),
            line,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WorldError>;
