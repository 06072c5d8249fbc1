//! Proximity hit-testing for annotations.
//!
//! The same per-variant rules serve selection (with the fixed selection
//! threshold) and erasing (with the user-adjustable eraser radius).

use super::shape::{Shape, ShapeKind, rect_edges};
use crate::geometry::{self, Point, distance, point_to_segment_distance};

/// Selection threshold in surface pixels.
pub const HIT_THRESHOLD: f64 = 10.0;

/// Approximate advance of one text character, used for text bounds.
pub const TEXT_CHAR_WIDTH: f64 = 8.0;

/// Approximate height of a text annotation.
pub const TEXT_HEIGHT: f64 = 14.0;

fn near_polyline(p: Point, points: &[Point], threshold: f64) -> bool {
    match points {
        [] => false,
        [only] => distance(p, *only) <= threshold,
        _ => points
            .windows(2)
            .any(|w| point_to_segment_distance(p, w[0], w[1]) <= threshold),
    }
}

fn near_any_point(p: Point, points: &[Point], threshold: f64) -> bool {
    points.iter().any(|q| distance(p, *q) <= threshold)
}

impl ShapeKind {
    /// Returns `true` when `p` lies within `threshold` of any drawn part of
    /// this shape.
    ///
    /// Outlines are tested, not interiors: a click in the middle of a large
    /// rectangle or circle does not hit it.
    pub fn is_near(&self, p: Point, threshold: f64) -> bool {
        match self {
            ShapeKind::Point { x, y, .. } => distance(p, Point::new(*x, *y)) <= threshold,
            ShapeKind::Line { start, end } | ShapeKind::Arrow { start, end } => {
                distance(p, *start) <= threshold
                    || distance(p, *end) <= threshold
                    || point_to_segment_distance(p, *start, *end) <= threshold
            }
            ShapeKind::Rectangle { start, end } => rect_edges(*start, *end)
                .iter()
                .any(|(a, b)| point_to_segment_distance(p, *a, *b) <= threshold),
            ShapeKind::Circle { points } => match self.circle() {
                Some(Ok(circle)) => circle.distance_to_circumference(p) <= threshold,
                _ => near_any_point(p, points, threshold),
            },
            ShapeKind::Arc { points } => {
                // construction dots are drawn, so they are always grabbable
                if near_any_point(p, points, threshold) {
                    return true;
                }
                match self.circle() {
                    Some(Ok(circle)) => {
                        if circle.distance_to_circumference(p) > threshold {
                            return false;
                        }
                        let (start, sweep) = geometry::arc_sweep(&circle, points[0], points[2]);
                        geometry::angle_within_sweep(circle.angle_of(p), start, sweep)
                    }
                    _ => false,
                }
            }
            ShapeKind::Curve { points } => near_polyline(p, points, threshold),
            ShapeKind::ClosedCurve { points } => {
                if near_polyline(p, points, threshold) {
                    return true;
                }
                match (points.first(), points.last()) {
                    (Some(first), Some(last)) if points.len() > 2 => {
                        point_to_segment_distance(p, *last, *first) <= threshold
                    }
                    _ => false,
                }
            }
            ShapeKind::Angle { points: [a, vertex, b] } => {
                point_to_segment_distance(p, *a, *vertex) <= threshold
                    || point_to_segment_distance(p, *vertex, *b) <= threshold
            }
            ShapeKind::Text { position, content } => {
                let width = content.chars().count() as f64 * TEXT_CHAR_WIDTH;
                p.x >= position.x - threshold
                    && p.x <= position.x + width + threshold
                    && p.y >= position.y - threshold
                    && p.y <= position.y + TEXT_HEIGHT + threshold
            }
        }
    }
}

impl Shape {
    /// Hit-tests this shape with the given proximity threshold.
    pub fn hit_test(&self, p: Point, threshold: f64) -> bool {
        self.kind.is_near(p, threshold)
    }
}
