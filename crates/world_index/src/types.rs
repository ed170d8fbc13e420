//! Core value types shared by the whole index.
//!
//! Coordinates are integer tile positions. `z` is an altitude in the same
//! units as tile heights, and `plane` selects one of up to 256 parallel map
//! layers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Identifiers
// ============================================================================

/// Identifier of a thing (item or character) registered with a map.
///
/// The index never creates these; they come from the entity layer and only
/// have to be unique within a world.
///
/// # Examples
///
/// ```rust
/// use world_index::ThingId;
///
/// let id = ThingId(0x4000_0001);
/// assert_eq!(id.to_string(), "0x40000001");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ThingId(pub u32);

impl fmt::Display for ThingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

// ============================================================================
// Points
// ============================================================================

/// A tile coordinate on a single plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: i32,
    pub y: i32,
}

impl Point2D {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A tile coordinate with altitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point3D {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Point3D {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub const fn xy(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}

/// A full world position: tile coordinate, altitude and map plane.
///
/// The textual form used by region files is `x,y,z,plane`; the trailing
/// components may be omitted and default to zero.
///
/// # Examples
///
/// ```rust
/// use world_index::Point4D;
///
/// let p: Point4D = "1000,1200,5".parse().unwrap();
/// assert_eq!(p, Point4D::new(1000, 1200, 5, 0));
/// assert_eq!(p.to_string(), "1000,1200,5,0");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point4D {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub plane: u8,
}

impl Point4D {
    pub const fn new(x: i32, y: i32, z: i32, plane: u8) -> Self {
        Self { x, y, z, plane }
    }

    pub const fn xy(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    pub const fn xyz(&self) -> Point3D {
        Point3D::new(self.x, self.y, self.z)
    }

    /// Returns this point shifted on the x/y axes, keeping altitude and plane.
    pub const fn shifted(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z, self.plane)
    }
}

impl fmt::Display for Point4D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x, self.y, self.z, self.plane)
    }
}

impl FromStr for Point4D {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('(').trim_end_matches(')');
        let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        if parts.len() < 2 || parts.len() > 4 {
            return Err(format!("'{s}' is not a point (expected x,y[,z[,plane]])"));
        }

        let x = parse_int(parts[0])?;
        let y = parse_int(parts[1])?;
        let z = match parts.get(2) {
            Some(z) => parse_int(z)?,
            None => 0,
        };
        let plane = match parts.get(3) {
            Some(plane) => {
                let plane = parse_int(plane)?;
                u8::try_from(plane).map_err(|_| format!("mapplane {plane} out of range"))?
            }
            None => 0,
        };
        Ok(Point4D::new(x, y, z, plane))
    }
}

/// Parses a decimal or `0x`-prefixed hexadecimal integer.
pub(crate) fn parse_int(text: &str) -> Result<i32, String> {
    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let value = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        i32::from_str_radix(hex, 16)
    } else {
        digits.parse::<i32>()
    }
    .map_err(|e| format!("'{text}' is not a number: {e}"))?;
    Ok(if negative { -value } else { value })
}

// ============================================================================
// Direction
// ============================================================================

/// One of the eight compass directions an actor can step in.
///
/// The discriminants are the wire values: odd values are the diagonals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    North = 0,
    NorthEast = 1,
    East = 2,
    SouthEast = 3,
    South = 4,
    SouthWest = 5,
    West = 6,
    NorthWest = 7,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Converts a wire value; only the low three bits are significant.
    pub const fn from_u8(value: u8) -> Self {
        Self::ALL[(value & 0x7) as usize]
    }

    pub const fn is_diagonal(self) -> bool {
        (self as u8) & 0x1 == 0x1
    }

    /// The direction one step counter-clockwise.
    pub const fn left(self) -> Self {
        Self::from_u8((self as u8).wrapping_sub(1))
    }

    /// The direction one step clockwise.
    pub const fn right(self) -> Self {
        Self::from_u8((self as u8).wrapping_add(1))
    }

    /// Offset applied to a coordinate when stepping in this direction.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::South => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, -1),
        }
    }

    pub const fn offset(self, x: i32, y: i32) -> (i32, i32) {
        let (dx, dy) = self.delta();
        (x + dx, y + dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_flanks_wrap_around() {
        assert_eq!(Direction::North.left(), Direction::NorthWest);
        assert_eq!(Direction::North.right(), Direction::NorthEast);
        assert_eq!(Direction::NorthWest.right(), Direction::North);
        assert_eq!(Direction::SouthEast.left(), Direction::East);
        assert_eq!(Direction::SouthEast.right(), Direction::South);
    }

    #[test]
    fn test_odd_directions_are_diagonal() {
        for d in Direction::ALL {
            let (dx, dy) = d.delta();
            assert_eq!(d.is_diagonal(), dx != 0 && dy != 0, "{d:?}");
        }
    }

    #[test]
    fn test_point_parsing_accepts_hex_and_parentheses() {
        let p: Point4D = "(0x10, 0x20, -5, 1)".parse().unwrap();
        assert_eq!(p, Point4D::new(16, 32, -5, 1));
        assert!("12".parse::<Point4D>().is_err());
        assert!("1,2,3,300".parse::<Point4D>().is_err());
    }

    #[test]
    fn test_parse_int_handles_negative_hex() {
        assert_eq!(parse_int("-0x10"), Ok(-16));
        assert_eq!(parse_int(" 42 "), Ok(42));
        assert!(parse_int("forty").is_err());
    }
}
