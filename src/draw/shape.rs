//! Shape definitions for measurement annotations.

use super::color::{Color, GREEN, WHITE};
use crate::geometry::{self, Circle, GeometryError, Point};
use serde::{Deserialize, Serialize};

/// Identifier assigned to a shape when it is committed. Never reused within a
/// shape set's history.
pub type ShapeId = u64;

/// Per-shape appearance, captured from the current tool settings at creation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    /// Stroke color
    pub color: Color,
    /// Stroke width in pixels
    pub thickness: f64,
    /// Color of measurement labels and text content
    pub font_color: Color,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            color: GREEN,
            thickness: 2.0,
            font_color: WHITE,
        }
    }
}

/// A committed annotation.
///
/// The serialized form flattens the geometry next to `id` and `style`, e.g.
/// `{"id":1,"style":{..},"type":"line","start":{..},"end":{..}}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub id: ShapeId,
    pub style: Style,
    #[serde(flatten)]
    pub kind: ShapeKind,
}

/// Geometry of an annotation.
///
/// Derived values (circle centers, rectangle extents, lengths, areas) are never
/// stored; they are recomputed from these fields wherever they are needed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ShapeKind {
    /// Labelled marker (`p1`, `p2`, ...)
    Point { x: f64, y: f64, label: String },
    /// Measured straight line
    Line { start: Point, end: Point },
    /// Axis-aligned rectangle between two opposite corners (any order)
    Rectangle { start: Point, end: Point },
    /// Full circle through three construction points
    Circle { points: [Point; 3] },
    /// Arc from the first to the third construction point
    Arc { points: [Point; 3] },
    /// Open smoothed polyline
    Curve { points: Vec<Point> },
    /// Closed ring; the last point repeats the first
    ClosedCurve { points: Vec<Point> },
    /// Arrow with its head at `end`
    Arrow { start: Point, end: Point },
    /// Free text anchored at `position`
    Text { position: Point, content: String },
    /// Angle with its vertex at the second point
    Angle { points: [Point; 3] },
}

impl ShapeKind {
    /// Lower-case tag matching the serialized `type` field.
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Point { .. } => "point",
            ShapeKind::Line { .. } => "line",
            ShapeKind::Rectangle { .. } => "rectangle",
            ShapeKind::Circle { .. } => "circle",
            ShapeKind::Arc { .. } => "arc",
            ShapeKind::Curve { .. } => "curve",
            ShapeKind::ClosedCurve { .. } => "closedCurve",
            ShapeKind::Arrow { .. } => "arrow",
            ShapeKind::Text { .. } => "text",
            ShapeKind::Angle { .. } => "angle",
        }
    }

    /// Returns a copy with every geometric field shifted by `(dx, dy)`.
    ///
    /// Labels, text content and the point count are preserved.
    pub fn translated(&self, dx: f64, dy: f64) -> ShapeKind {
        let shift = |p: &Point| p.translated(dx, dy);
        match self {
            ShapeKind::Point { x, y, label } => ShapeKind::Point {
                x: x + dx,
                y: y + dy,
                label: label.clone(),
            },
            ShapeKind::Line { start, end } => ShapeKind::Line {
                start: shift(start),
                end: shift(end),
            },
            ShapeKind::Rectangle { start, end } => ShapeKind::Rectangle {
                start: shift(start),
                end: shift(end),
            },
            ShapeKind::Arrow { start, end } => ShapeKind::Arrow {
                start: shift(start),
                end: shift(end),
            },
            ShapeKind::Circle { points } => ShapeKind::Circle {
                points: points.map(|p| shift(&p)),
            },
            ShapeKind::Arc { points } => ShapeKind::Arc {
                points: points.map(|p| shift(&p)),
            },
            ShapeKind::Angle { points } => ShapeKind::Angle {
                points: points.map(|p| shift(&p)),
            },
            ShapeKind::Curve { points } => ShapeKind::Curve {
                points: points.iter().map(shift).collect(),
            },
            ShapeKind::ClosedCurve { points } => ShapeKind::ClosedCurve {
                points: points.iter().map(shift).collect(),
            },
            ShapeKind::Text { position, content } => ShapeKind::Text {
                position: shift(position),
                content: content.clone(),
            },
        }
    }

    /// The points the user placed to build this shape.
    pub fn construction_points(&self) -> Vec<Point> {
        match self {
            ShapeKind::Point { x, y, .. } => vec![Point::new(*x, *y)],
            ShapeKind::Line { start, end }
            | ShapeKind::Rectangle { start, end }
            | ShapeKind::Arrow { start, end } => vec![*start, *end],
            ShapeKind::Circle { points }
            | ShapeKind::Arc { points }
            | ShapeKind::Angle { points } => points.to_vec(),
            ShapeKind::Curve { points } | ShapeKind::ClosedCurve { points } => points.clone(),
            ShapeKind::Text { position, .. } => vec![*position],
        }
    }

    /// Derived circle for `Circle` and `Arc`; `None` for every other kind.
    pub fn circle(&self) -> Option<Result<Circle, GeometryError>> {
        match self {
            ShapeKind::Circle { points: [p1, p2, p3] } | ShapeKind::Arc { points: [p1, p2, p3] } => {
                Some(geometry::circle_from_three_points(*p1, *p2, *p3))
            }
            _ => None,
        }
    }
}

impl Shape {
    pub fn new(id: ShapeId, style: Style, kind: ShapeKind) -> Self {
        Self { id, style, kind }
    }

    /// Returns a copy moved by `(dx, dy)`, keeping id, style and label.
    pub fn translated(&self, dx: f64, dy: f64) -> Shape {
        Shape {
            id: self.id,
            style: self.style.clone(),
            kind: self.kind.translated(dx, dy),
        }
    }
}

/// Normalizes two opposite rectangle corners into `(min, max)` corners.
pub fn normalized_rect(start: Point, end: Point) -> (Point, Point) {
    (
        Point::new(start.x.min(end.x), start.y.min(end.y)),
        Point::new(start.x.max(end.x), start.y.max(end.y)),
    )
}

/// The four edges of a rectangle, clockwise from the top edge.
pub fn rect_edges(start: Point, end: Point) -> [(Point, Point); 4] {
    let (min, max) = normalized_rect(start, end);
    let top_right = Point::new(max.x, min.y);
    let bottom_left = Point::new(min.x, max.y);
    [
        (min, top_right),
        (top_right, max),
        (max, bottom_left),
        (bottom_left, min),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> Style {
        Style::default()
    }

    #[test]
    fn moving_a_point_preserves_id_and_label() {
        let shape = Shape::new(
            7,
            style(),
            ShapeKind::Point {
                x: 10.0,
                y: 10.0,
                label: "p3".to_string(),
            },
        );

        let moved = shape.translated(5.0, -3.0);
        assert_eq!(moved.id, 7);
        assert_eq!(
            moved.kind,
            ShapeKind::Point {
                x: 15.0,
                y: 7.0,
                label: "p3".to_string()
            }
        );
        assert_eq!(moved.style, shape.style);
    }

    #[test]
    fn translating_curves_moves_every_point() {
        let kind = ShapeKind::ClosedCurve {
            points: vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
                Point::new(0.0, 0.0),
            ],
        };
        let moved = kind.translated(1.0, 2.0);
        assert_eq!(
            moved.construction_points(),
            vec![
                Point::new(1.0, 2.0),
                Point::new(11.0, 2.0),
                Point::new(11.0, 12.0),
                Point::new(1.0, 2.0),
            ]
        );
    }

    #[test]
    fn rectangle_corners_normalize_in_any_drag_direction() {
        let (min, max) = normalized_rect(Point::new(10.0, 20.0), Point::new(0.0, 0.0));
        assert_eq!(min, Point::new(0.0, 0.0));
        assert_eq!(max, Point::new(10.0, 20.0));
    }

    #[test]
    fn serialized_form_is_flat_and_tagged() {
        let shape = Shape::new(
            1,
            style(),
            ShapeKind::Line {
                start: Point::new(0.0, 0.0),
                end: Point::new(100.0, 0.0),
            },
        );
        let value = serde_json::to_value(&shape).unwrap();
        assert_eq!(value["type"], "line");
        assert_eq!(value["id"], 1);
        assert_eq!(value["end"]["x"], 100.0);
        assert_eq!(value["style"]["fontColor"], "#ffffff");

        let back: Shape = serde_json::from_value(value).unwrap();
        assert_eq!(back, shape);
    }

    #[test]
    fn closed_curve_tag_is_camel_case() {
        let kind = ShapeKind::ClosedCurve { points: vec![] };
        let value = serde_json::to_value(&kind).unwrap();
        assert_eq!(value["type"], "closedCurve");
        assert_eq!(kind.name(), "closedCurve");
    }
}
