use crate::{GeomError, Segment};
use hollowvein_common::GridPoint;
use serde::{Deserialize, Serialize};

/// A closed polygon over grid points, listed in clockwise traversal order.
///
/// Derived segments connect consecutive vertices and loop back to the first.
/// Bounding corners are cached at construction. Serialization carries only
/// the vertex ring; segments and bounds are rebuilt on deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<GridPoint>", into = "Vec<GridPoint>")]
pub struct Shape {
    vertices: Vec<GridPoint>,
    segments: Vec<Segment>,
    min: GridPoint,
    max: GridPoint,
}

impl Shape {
    /// Build a shape from at least 2 vertices.
    pub fn new(vertices: Vec<GridPoint>) -> Result<Self, GeomError> {
        if vertices.len() < 2 {
            return Err(GeomError::TooFewVertices(vertices.len()));
        }
        let mut min = vertices[0];
        let mut max = vertices[0];
        let mut segments = Vec::with_capacity(vertices.len());
        for (i, &v) in vertices.iter().enumerate() {
            min.x = min.x.min(v.x);
            min.y = min.y.min(v.y);
            max.x = max.x.max(v.x);
            max.y = max.y.max(v.y);
            let next = vertices[(i + 1) % vertices.len()];
            segments.push(Segment::new(v, next));
        }
        Ok(Self {
            vertices,
            segments,
            min,
            max,
        })
    }

    /// Axis-aligned rectangle from its lower-left corner and extent.
    pub fn rect(origin: GridPoint, width: i32, height: i32) -> Result<Self, GeomError> {
        Self::new(vec![
            origin,
            origin + GridPoint::new(width, 0),
            origin + GridPoint::new(width, height),
            origin + GridPoint::new(0, height),
        ])
    }

    pub fn vertices(&self) -> &[GridPoint] {
        &self.vertices
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Cached bounding corners (min, max).
    pub fn bounds(&self) -> (GridPoint, GridPoint) {
        (self.min, self.max)
    }

    /// True iff the point is on-or-right-of every edge in traversal order.
    ///
    /// A degenerate zero-length edge makes the relationship undefined and
    /// the point is reported outside.
    pub fn contains(&self, p: GridPoint) -> bool {
        for seg in &self.segments {
            let d = seg.delta();
            if d == GridPoint::ZERO {
                return false;
            }
            let v = p - seg.start;
            let cross = i64::from(d.x) * i64::from(v.y) - i64::from(d.y) * i64::from(v.x);
            if cross < 0 {
                return false;
            }
        }
        true
    }

    /// Clip this shape against another by the alternating edge walk.
    ///
    /// The walk starts on the first edge (in declared order) whose start
    /// vertex lies inside the other shape, swapping operands once if this
    /// shape has none. Along the current edge, the other shape's segments
    /// are tested in declared order and the first hit wins; a hit is a
    /// supporting-line intersection that lands inside both segments' bounds.
    /// On a hit the intersection point is recorded and the walk substitutes
    /// to the hit segment; its endpoint is recorded once that edge yields no
    /// further hit. The walk closes when a recorded point equals the first;
    /// a ring structurally equal to either input means no intersection area.
    pub fn intersect(&self, other: &Shape) -> Result<Shape, GeomError> {
        // Shapes whose bounding boxes meet in a line or a point at most
        // (shared edge, shared corner) enclose no common interior; the walk
        // would trace a spurious ring, so reject them up front.
        let overlap_w = self.max.x.min(other.max.x) - self.min.x.max(other.min.x);
        let overlap_h = self.max.y.min(other.max.y) - self.min.y.max(other.min.y);
        if overlap_w <= 0 || overlap_h <= 0 {
            return Err(GeomError::NoOverlap);
        }
        if let Some(i) = self.vertices.iter().position(|&v| other.contains(v)) {
            walk(self, other, i)
        } else if let Some(j) = other.vertices.iter().position(|&v| self.contains(v)) {
            walk(other, self, j)
        } else {
            Err(GeomError::NoOverlap)
        }
    }
}

impl TryFrom<Vec<GridPoint>> for Shape {
    type Error = GeomError;
    fn try_from(vertices: Vec<GridPoint>) -> Result<Self, Self::Error> {
        Shape::new(vertices)
    }
}

impl From<Shape> for Vec<GridPoint> {
    fn from(shape: Shape) -> Self {
        shape.vertices
    }
}

/// Run the bounded clipping walk starting on `first.segments[start_idx]`.
fn walk(first: &Shape, second: &Shape, start_idx: usize) -> Result<Shape, GeomError> {
    let shapes = [first, second];
    let mut cur = 0usize;
    let mut idx = start_idx;
    let mut points: Vec<GridPoint> = Vec::new();
    // Bound the walk so malformed rings bail out instead of spinning.
    let max_steps = (first.segments.len() + second.segments.len()).pow(2);
    let mut steps = 0usize;
    let mut closed = false;

    while !closed {
        steps += 1;
        if steps > max_steps {
            return Err(GeomError::WalkDiverged(steps));
        }
        let seg = shapes[cur].segments()[idx];
        let other = shapes[1 - cur];

        let mut hit: Option<(GridPoint, usize)> = None;
        for (oi, oseg) in other.segments().iter().enumerate() {
            if let Some(p) = seg.line_intersection(oseg) {
                let on_both = seg.bounds_contain(p) && oseg.bounds_contain(p);
                if on_both && p != seg.start && points.last() != Some(&p) {
                    // First matching segment in declared order wins.
                    hit = Some((p, oi));
                    break;
                }
            }
        }

        match hit {
            Some((p, oi)) => {
                closed = record(&mut points, p);
                cur = 1 - cur;
                idx = oi;
            }
            None => {
                closed = record(&mut points, seg.end);
                idx = (idx + 1) % shapes[cur].segments().len();
            }
        }
    }

    tracing::trace!(points = points.len(), steps, "clip walk closed");
    if points.len() < 3 {
        // Shapes sharing only an edge close a two-point ring with no
        // interior; report that as no overlap, not as a degenerate shape.
        return Err(GeomError::NoOverlap);
    }
    if ring_equal(&points, first.vertices()) || ring_equal(&points, second.vertices()) {
        return Err(GeomError::NoOverlap);
    }
    Shape::new(points)
}

/// Record a walk point. Returns true when the ring just closed.
fn record(points: &mut Vec<GridPoint>, p: GridPoint) -> bool {
    if points.len() >= 2 && points[0] == p {
        return true;
    }
    if points.last() != Some(&p) {
        points.push(p);
    }
    false
}

/// Whether two vertex rings are equal up to rotation.
fn ring_equal(a: &[GridPoint], b: &[GridPoint]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    (0..b.len()).any(|off| (0..a.len()).all(|i| a[i] == b[(i + off) % b.len()]))
}
