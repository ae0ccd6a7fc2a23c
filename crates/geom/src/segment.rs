use hollowvein_common::GridPoint;
use serde::{Deserialize, Serialize};

/// One directed polygon edge between two grid points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub start: GridPoint,
    pub end: GridPoint,
}

impl Segment {
    pub fn new(start: GridPoint, end: GridPoint) -> Self {
        Self { start, end }
    }

    pub fn delta(&self) -> GridPoint {
        self.end - self.start
    }

    /// Intersection of the two segments' *supporting lines*.
    ///
    /// Solves the 2x2 linear system of the infinite lines; the result is not
    /// clamped to either segment. Callers that need segment-bounded hits
    /// must check bounds themselves (the clipping walk does). Returns `None`
    /// when the lines are parallel or collinear (zero determinant).
    pub fn line_intersection(&self, other: &Segment) -> Option<GridPoint> {
        let d1 = self.delta();
        let d2 = other.delta();
        let det = i64::from(d1.x) * i64::from(d2.y) - i64::from(d1.y) * i64::from(d2.x);
        if det == 0 {
            return None;
        }
        let diff = other.start - self.start;
        let t_num = i64::from(diff.x) * i64::from(d2.y) - i64::from(diff.y) * i64::from(d2.x);
        // Exact rational parameter t = t_num / det; resolve to the nearest
        // grid point in f64, which is exact for the magnitudes in play.
        let t = t_num as f64 / det as f64;
        let x = self.start.x as f64 + t * d1.x as f64;
        let y = self.start.y as f64 + t * d1.y as f64;
        Some(GridPoint::new(x.round() as i32, y.round() as i32))
    }

    /// Whether a point lies inside this segment's axis-aligned bounding box.
    ///
    /// Used by the clipping walk to decide that a line intersection actually
    /// landed on the edge.
    pub fn bounds_contain(&self, p: GridPoint) -> bool {
        let (min_x, max_x) = if self.start.x <= self.end.x {
            (self.start.x, self.end.x)
        } else {
            (self.end.x, self.start.x)
        };
        let (min_y, max_y) = if self.start.y <= self.end.y {
            (self.start.y, self.end.y)
        } else {
            (self.end.y, self.start.y)
        };
        p.x >= min_x && p.x <= max_x && p.y >= min_y && p.y <= max_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(ax: i32, ay: i32, bx: i32, by: i32) -> Segment {
        Segment::new(GridPoint::new(ax, ay), GridPoint::new(bx, by))
    }

    #[test]
    fn perpendicular_lines_intersect() {
        let horizontal = seg(0, 0, 4, 0);
        let vertical = seg(2, -3, 2, 3);
        assert_eq!(
            horizontal.line_intersection(&vertical),
            Some(GridPoint::new(2, 0))
        );
    }

    #[test]
    fn parallel_lines_do_not_intersect() {
        let a = seg(0, 0, 4, 0);
        let b = seg(0, 1, 4, 1);
        assert_eq!(a.line_intersection(&b), None);
    }

    #[test]
    fn collinear_lines_do_not_intersect() {
        let a = seg(0, 0, 4, 0);
        let b = seg(5, 0, 9, 0);
        assert_eq!(a.line_intersection(&b), None);
    }

    #[test]
    fn intersection_is_unbounded() {
        // The supporting lines cross well outside both segments.
        let a = seg(0, 0, 1, 0);
        let b = seg(10, -1, 10, 1);
        assert_eq!(a.line_intersection(&b), Some(GridPoint::new(10, 0)));
        assert!(!a.bounds_contain(GridPoint::new(10, 0)));
    }

    #[test]
    fn diagonal_lines_intersect() {
        let a = seg(0, 0, 4, 4);
        let b = seg(0, 4, 4, 0);
        assert_eq!(a.line_intersection(&b), Some(GridPoint::new(2, 2)));
    }

    #[test]
    fn bounds_contain_endpoints() {
        let a = seg(4, 0, 4, 4);
        assert!(a.bounds_contain(GridPoint::new(4, 0)));
        assert!(a.bounds_contain(GridPoint::new(4, 4)));
        assert!(a.bounds_contain(GridPoint::new(4, 2)));
        assert!(!a.bounds_contain(GridPoint::new(4, 5)));
        assert!(!a.bounds_contain(GridPoint::new(3, 2)));
    }
}
