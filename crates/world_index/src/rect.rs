//! Axis-aligned integer rectangles.
//!
//! Both bounds are inclusive: a rectangle `(10, 10) - (10, 10)` covers exactly
//! one tile, yet its `width()` is 0. Intersection is a corner test, see
//! [`Rectangle::intersects`].

use crate::error::{Result, WorldError};
use crate::types::{parse_int, Point2D};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An immutable, inclusive rectangle of tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rectangle {
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
}

impl Rectangle {
    /// Creates a rectangle from its corners.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidRectangle`] if a minimum exceeds the
    /// corresponding maximum.
    pub fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Result<Self> {
        if min_x > max_x || min_y > max_y {
            return Err(WorldError::InvalidRectangle {
                min_x,
                min_y,
                max_x,
                max_y,
            });
        }
        Ok(Self {
            min_x,
            min_y,
            max_x,
            max_y,
        })
    }

    /// The square `[x - range, x + range] × [y - range, y + range]`.
    ///
    /// A negative range is treated as zero.
    pub fn from_range(x: i32, y: i32, range: i32) -> Self {
        let range = range.max(0);
        Self {
            min_x: x - range,
            min_y: y - range,
            max_x: x + range,
            max_y: y + range,
        }
    }

    pub const fn min_x(&self) -> i32 {
        self.min_x
    }

    pub const fn min_y(&self) -> i32 {
        self.min_y
    }

    pub const fn max_x(&self) -> i32 {
        self.max_x
    }

    pub const fn max_y(&self) -> i32 {
        self.max_y
    }

    pub const fn width(&self) -> i32 {
        self.max_x - self.min_x
    }

    pub const fn height(&self) -> i32 {
        self.max_y - self.min_y
    }

    /// Number of tiles covered, bounds included.
    pub const fn tiles_number(&self) -> i64 {
        (self.width() as i64 + 1) * (self.height() as i64 + 1)
    }

    pub const fn contains_xy(&self, x: i32, y: i32) -> bool {
        self.min_x <= x && x <= self.max_x && self.min_y <= y && y <= self.max_y
    }

    pub const fn contains_point(&self, point: Point2D) -> bool {
        self.contains_xy(point.x, point.y)
    }

    /// The four corner tiles, clockwise from the minimum corner.
    pub const fn corners(&self) -> [(i32, i32); 4] {
        [
            (self.min_x, self.min_y),
            (self.max_x, self.min_y),
            (self.max_x, self.max_y),
            (self.min_x, self.max_y),
        ]
    }

    /// True if all four corners of `other` lie inside this rectangle.
    pub fn contains_rect(&self, other: &Rectangle) -> bool {
        other.corners().iter().all(|&(x, y)| self.contains_xy(x, y))
    }

    /// True if at least one corner of `other` lies inside this rectangle.
    ///
    /// This is deliberately not an interval-overlap test: two rectangles
    /// crossing like a plus sign do not intersect in either direction, and a
    /// rectangle swallowing `self` intersects only one way. Callers needing
    /// a symmetric answer use [`Rectangle::intersects_either`].
    pub fn intersects(&self, other: &Rectangle) -> bool {
        other.corners().iter().any(|&(x, y)| self.contains_xy(x, y))
    }

    /// `self.intersects(other) || other.intersects(self)`.
    pub fn intersects_either(&self, other: &Rectangle) -> bool {
        self.intersects(other) || other.intersects(self)
    }

    /// Alias of [`Rectangle::intersects`] under the name used by hierarchy
    /// conflict checks.
    pub fn contains_rect_partly(&self, other: &Rectangle) -> bool {
        self.intersects(other)
    }

    /// The overlapping area of two rectangles, if any.
    pub fn intersection(&self, other: &Rectangle) -> Option<Rectangle> {
        let min_x = self.min_x.max(other.min_x);
        let min_y = self.min_y.max(other.min_y);
        let max_x = self.max_x.min(other.max_x);
        let max_y = self.max_y.min(other.max_y);
        Rectangle::new(min_x, min_y, max_x, max_y).ok()
    }

    /// A copy shifted by `(dx, dy)`.
    pub const fn moved(&self, dx: i32, dy: i32) -> Self {
        Self {
            min_x: self.min_x + dx,
            min_y: self.min_y + dy,
            max_x: self.max_x + dx,
            max_y: self.max_y + dy,
        }
    }
}

impl fmt::Display for Rectangle {
    /// The `minX,minY,maxX,maxY` form used in region files.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

impl FromStr for Rectangle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(format!("'{s}' is not a rectangle (expected x1,y1,x2,y2)"));
        }
        let x1 = parse_int(parts[0])?;
        let y1 = parse_int(parts[1])?;
        let x2 = parse_int(parts[2])?;
        let y2 = parse_int(parts[3])?;
        Rectangle::new(x1, y1, x2, y2).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x1: i32, y1: i32, x2: i32, y2: i32) -> Rectangle {
        Rectangle::new(x1, y1, x2, y2).unwrap()
    }

    #[test]
    fn test_inverted_bounds_are_rejected() {
        assert!(matches!(
            Rectangle::new(10, 0, 5, 0),
            Err(WorldError::InvalidRectangle { .. })
        ));
        assert!(Rectangle::new(0, 10, 0, 5).is_err());
        assert!(Rectangle::new(3, 3, 3, 3).is_ok());
    }

    #[test]
    fn test_width_excludes_the_last_tile() {
        let r = rect(10, 10, 10, 20);
        assert_eq!(r.width(), 0);
        assert_eq!(r.height(), 10);
        assert_eq!(r.tiles_number(), 11);
    }

    #[test]
    fn test_containment_is_reflexive() {
        let r = rect(0, 0, 5, 7);
        assert!(r.contains_rect(&r));
        assert!(r.intersects(&r));
        assert!(!r.contains_rect(&rect(0, 0, 6, 7)));
    }

    #[test]
    fn test_intersection_is_a_corner_test() {
        let big = rect(0, 0, 100, 100);
        let small = rect(10, 10, 20, 20);
        assert!(big.intersects(&small));
        // none of big's corners are inside small
        assert!(!small.intersects(&big));
        assert!(small.intersects_either(&big));

        // a plus-shaped overlap has no corner inside either rectangle
        let horizontal = rect(0, 10, 30, 20);
        let vertical = rect(10, 0, 20, 30);
        assert!(!horizontal.intersects(&vertical));
        assert!(!vertical.intersects(&horizontal));
        assert!(horizontal.intersection(&vertical).is_some());
    }

    #[test]
    fn test_range_rectangle_is_centered() {
        let r = Rectangle::from_range(50, 60, 5);
        assert_eq!(r, rect(45, 55, 55, 65));
        assert_eq!(Rectangle::from_range(1, 1, -3), rect(1, 1, 1, 1));
    }

    #[test]
    fn test_moved_keeps_size() {
        let r = rect(1, 2, 3, 4).moved(-1, 10);
        assert_eq!(r, rect(0, 12, 2, 14));
    }

    #[test]
    fn test_text_form_round_trips() {
        let r: Rectangle = "0x10, 20, 0x20,40".parse().unwrap();
        assert_eq!(r, rect(16, 20, 32, 40));
        assert_eq!(r.to_string(), "16,20,32,40");
        assert!("1,2,3".parse::<Rectangle>().is_err());
        assert!("5,5,1,1".parse::<Rectangle>().is_err());
    }
}
