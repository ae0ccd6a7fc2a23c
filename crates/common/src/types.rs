use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};
use uuid::Uuid;

/// An integer 2D coordinate on the world grid.
///
/// The derived `Ord` is lexicographic by x then y, which is the canonical
/// sort order for anything keyed by grid position.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    pub const ZERO: GridPoint = GridPoint { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance to another point (grid "ring" distance).
    pub fn chebyshev(&self, other: GridPoint) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

impl Add for GridPoint {
    type Output = GridPoint;
    fn add(self, rhs: GridPoint) -> GridPoint {
        GridPoint::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for GridPoint {
    type Output = GridPoint;
    fn sub(self, rhs: GridPoint) -> GridPoint {
        GridPoint::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<i32> for GridPoint {
    type Output = GridPoint;
    fn mul(self, rhs: i32) -> GridPoint {
        GridPoint::new(self.x * rhs, self.y * rhs)
    }
}

impl fmt::Display for GridPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Cardinal direction on the grid. y grows upward; depth grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const CARDINAL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Unit offset for this direction.
    pub const fn offset(self) -> GridPoint {
        match self {
            Direction::North => GridPoint::new(0, 1),
            Direction::East => GridPoint::new(1, 0),
            Direction::South => GridPoint::new(0, -1),
            Direction::West => GridPoint::new(-1, 0),
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }
}

/// Closed integer interval `[min, max]`.
///
/// Used both for depth bands and for enemy trait filters. Unbounded-below
/// bands use `i32::MIN` as the lower bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub min: i32,
    pub max: i32,
}

impl Range {
    pub fn new(min: i32, max: i32) -> Self {
        assert!(min <= max, "range min must not exceed max");
        Self { min, max }
    }

    /// A range open toward negative infinity, closed at `max`.
    pub fn up_to(max: i32) -> Self {
        Self {
            min: i32::MIN,
            max,
        }
    }

    pub fn contains(&self, value: i32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Width of the interval (`max - min`). Saturates for unbounded bands.
    pub fn size(&self) -> i32 {
        self.max.saturating_sub(self.min)
    }

    pub fn center(&self) -> i32 {
        // Midpoint without overflow on wide ranges.
        self.min + self.size() / 2
    }

    /// Distance from the interval midpoint. Saturates instead of overflowing
    /// for values near the i32 extremes.
    pub fn distance_from_center(&self, value: i32) -> i32 {
        value.saturating_sub(self.center()).saturating_abs()
    }
}

/// Unique identifier for an entity watched by the position tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackableId(pub Uuid);

impl TrackableId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TrackableId {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_point_arithmetic() {
        let a = GridPoint::new(3, -2);
        let b = GridPoint::new(-1, 5);
        assert_eq!(a + b, GridPoint::new(2, 3));
        assert_eq!(a - b, GridPoint::new(4, -7));
        assert_eq!(a * 3, GridPoint::new(9, -6));
    }

    #[test]
    fn grid_point_ordering_is_lexicographic() {
        let mut points = vec![
            GridPoint::new(1, 0),
            GridPoint::new(0, 5),
            GridPoint::new(0, -1),
            GridPoint::new(1, -9),
        ];
        points.sort();
        assert_eq!(
            points,
            vec![
                GridPoint::new(0, -1),
                GridPoint::new(0, 5),
                GridPoint::new(1, -9),
                GridPoint::new(1, 0),
            ]
        );
    }

    #[test]
    fn direction_offsets_cover_cardinals() {
        let sum = Direction::CARDINAL
            .iter()
            .fold(GridPoint::ZERO, |acc, d| acc + d.offset());
        assert_eq!(sum, GridPoint::ZERO);
        assert_eq!(Direction::North.offset(), GridPoint::new(0, 1));
        assert_eq!(Direction::South, Direction::North.opposite());
    }

    #[test]
    fn range_contains_is_closed() {
        let r = Range::new(2, 5);
        assert!(r.contains(2));
        assert!(r.contains(5));
        assert!(!r.contains(1));
        assert!(!r.contains(6));
        assert_eq!(r.size(), 3);
    }

    #[test]
    fn range_unbounded_below() {
        let r = Range::up_to(100);
        assert!(r.contains(i32::MIN));
        assert!(r.contains(100));
        assert!(!r.contains(101));
    }

    #[test]
    fn range_center_and_distance() {
        let r = Range::new(10, 30);
        assert_eq!(r.center(), 20);
        assert_eq!(r.distance_from_center(20), 0);
        assert_eq!(r.distance_from_center(12), 8);
        assert_eq!(r.distance_from_center(28), 8);
    }

    #[test]
    fn range_distance_saturates_at_extremes() {
        let r = Range::up_to(100);
        assert!(r.distance_from_center(i32::MIN) >= 0);
        assert!(r.distance_from_center(i32::MAX) >= 0);
        assert_eq!(Range::new(0, 10).distance_from_center(i32::MAX), i32::MAX - 5);
    }

    #[test]
    #[should_panic]
    fn range_rejects_inverted_bounds() {
        let _ = Range::new(5, 2);
    }

    #[test]
    fn trackable_id_uniqueness() {
        assert_ne!(TrackableId::new(), TrackableId::new());
    }

    #[test]
    fn chebyshev_distance() {
        let origin = GridPoint::ZERO;
        assert_eq!(GridPoint::new(3, -1).chebyshev(origin), 3);
        assert_eq!(GridPoint::new(-2, -2).chebyshev(origin), 2);
    }
}
