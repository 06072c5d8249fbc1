//! Planar geometry primitives shared by hit-testing, measurement and rendering.
//!
//! All coordinates are in surface pixel space (the backing store of the
//! annotation canvas), independent of on-screen scaling or zoom.

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use thiserror::Error;

/// Relative tolerance used to reject nearly collinear circle constructions.
const DEGENERACY_EPSILON: f64 = 1e-9;

/// A point in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns this point shifted by `(dx, dy)`.
    pub fn translated(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn midpoint(self, other: Point) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Errors produced when derived geometry cannot be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("construction points are collinear or coincident; no unique circle passes through them")]
    DegenerateCircle,
}

/// Circle derived from three construction points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
}

impl Circle {
    pub fn area(&self) -> f64 {
        std::f64::consts::PI * self.radius * self.radius
    }

    /// Distance from `p` to the circumference.
    pub fn distance_to_circumference(&self, p: Point) -> f64 {
        (distance(p, self.center) - self.radius).abs()
    }

    /// Angle of `p` around the center, normalized into `[0, 2π)`.
    pub fn angle_of(&self, p: Point) -> f64 {
        normalize_angle((p.y - self.center.y).atan2(p.x - self.center.x))
    }
}

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// Distance from `p` to the closed segment `a`–`b`.
///
/// Projects `p` onto the infinite line through `a` and `b`, clamps the
/// projection parameter to `[0, 1]` and measures to the clamped point.
/// A zero-length segment degrades to the distance to `a`.
pub fn point_to_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return distance(p, a);
    }

    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    distance(p, Point::new(a.x + t * dx, a.y + t * dy))
}

/// Computes the circle passing through three points.
///
/// Uses the determinant form of the perpendicular-bisector intersection,
/// translated to `p1` for numerical stability. Axis-aligned chords are valid
/// input; collinear or coincident points return
/// [`GeometryError::DegenerateCircle`].
pub fn circle_from_three_points(p1: Point, p2: Point, p3: Point) -> Result<Circle, GeometryError> {
    let bx = p2.x - p1.x;
    let by = p2.y - p1.y;
    let cx = p3.x - p1.x;
    let cy = p3.y - p1.y;

    let b_sq = bx * bx + by * by;
    let c_sq = cx * cx + cy * cy;
    let scale = b_sq.max(c_sq);
    let d = 2.0 * (bx * cy - by * cx);

    if scale == 0.0 || d.abs() <= DEGENERACY_EPSILON * scale {
        return Err(GeometryError::DegenerateCircle);
    }

    let ux = (cy * b_sq - by * c_sq) / d;
    let uy = (bx * c_sq - cx * b_sq) / d;
    let center = Point::new(p1.x + ux, p1.y + uy);
    let radius = ux.hypot(uy);

    if !center.is_finite() || !radius.is_finite() {
        return Err(GeometryError::DegenerateCircle);
    }

    Ok(Circle { center, radius })
}

/// Brings an angle (radians) into `[0, 2π)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let normalized = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if normalized >= TAU { 0.0 } else { normalized }
}

/// Angular span of an arc that starts at `start` and ends at `end`,
/// sweeping in the direction of increasing normalized angle.
///
/// Returns `(start_angle, sweep)` with `start_angle` in `[0, 2π)` and
/// `sweep` in `[0, 2π)`.
pub fn arc_sweep(circle: &Circle, start: Point, end: Point) -> (f64, f64) {
    let start_angle = circle.angle_of(start);
    let mut end_angle = circle.angle_of(end);
    if end_angle < start_angle {
        end_angle += TAU;
    }
    (start_angle, end_angle - start_angle)
}

/// Whether `angle` lies inside the sweep `[start, start + sweep]`.
pub fn angle_within_sweep(angle: f64, start: f64, sweep: f64) -> bool {
    let mut a = normalize_angle(angle);
    if a < start {
        a += TAU;
    }
    a - start <= sweep
}

/// Cumulative length of an open polyline.
pub fn polyline_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| distance(w[0], w[1])).sum()
}

/// Polygon area via the shoelace formula.
///
/// The ring is closed implicitly (last point back to the first), so a ring
/// that already repeats its first point yields the same result. The result is
/// always non-negative.
pub fn shoelace_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let n = points.len();
    let twice_area: f64 = (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum();
    twice_area.abs() / 2.0
}

/// Included angle at `vertex` between the rays towards `a` and `b`, in degrees.
///
/// Returns a value in `[0, 180]`; zero-length rays yield `0.0`.
pub fn included_angle_degrees(a: Point, vertex: Point, b: Point) -> f64 {
    let (ux, uy) = (a.x - vertex.x, a.y - vertex.y);
    let (vx, vy) = (b.x - vertex.x, b.y - vertex.y);
    if (ux == 0.0 && uy == 0.0) || (vx == 0.0 && vy == 0.0) {
        return 0.0;
    }
    let cross = ux * vy - uy * vx;
    let dot = ux * vx + uy * vy;
    cross.abs().atan2(dot).to_degrees()
}
