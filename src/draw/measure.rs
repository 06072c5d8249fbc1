//! Calibrated measurement labels.
//!
//! Measurements are computed in surface pixels from the shape geometry and
//! converted to physical units only when they are formatted. Nothing here
//! touches a drawing surface; the renderer places the returned [`Label`]s.

use super::shape::{ShapeKind, normalized_rect};
use crate::geometry::{self, GeometryError, Point, distance};

/// Distance from the angle vertex to its degree label.
const ANGLE_LABEL_DISTANCE: f64 = 40.0;

/// Unit conversion for measurement display.
#[derive(Debug, Clone, PartialEq)]
pub struct Units {
    /// Microns per pixel; `None` shows raw pixel values.
    pub factor: Option<f64>,
    /// Suffix for calibrated lengths, e.g. `µm`.
    pub unit_label: String,
}

impl Default for Units {
    fn default() -> Self {
        Self::uncalibrated()
    }
}

impl Units {
    pub fn uncalibrated() -> Self {
        Self {
            factor: None,
            unit_label: "µm".to_string(),
        }
    }

    /// Calibrated units; non-positive or non-finite factors fall back to pixels.
    pub fn calibrated(factor: f64) -> Self {
        Self {
            factor: Some(factor).filter(|f| f.is_finite() && *f > 0.0),
            ..Self::uncalibrated()
        }
    }

    pub fn with_unit_label(mut self, label: impl Into<String>) -> Self {
        self.unit_label = label.into();
        self
    }

    pub fn is_calibrated(&self) -> bool {
        self.factor.is_some()
    }

    pub fn length(&self, px: f64) -> f64 {
        match self.factor {
            Some(factor) => px / factor,
            None => px,
        }
    }

    pub fn area(&self, px_sq: f64) -> f64 {
        match self.factor {
            Some(factor) => px_sq / (factor * factor),
            None => px_sq,
        }
    }

    fn length_suffix(&self) -> &str {
        if self.is_calibrated() { &self.unit_label } else { "px" }
    }

    pub fn format_length(&self, px: f64) -> String {
        format!("{} {}", round_display(self.length(px)), self.length_suffix())
    }

    pub fn format_area(&self, px_sq: f64) -> String {
        format!("{} {}²", round_display(self.area(px_sq)), self.length_suffix())
    }

    /// Human-readable scale, e.g. `1 pixel = 0.250 microns`.
    pub fn scale_text(&self) -> Option<String> {
        self.factor.map(|f| format!("1 pixel = {f:.3} microns"))
    }
}

/// Rounds half away from zero for integer display.
pub fn round_display(value: f64) -> i64 {
    value.round() as i64
}

/// Formats an angle in degrees with one decimal.
pub fn format_degrees(degrees: f64) -> String {
    format!("{degrees:.1}°")
}

/// Raw (pixel-space) measurement of a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measurement {
    /// Points and text carry no measurement
    None,
    /// Straight or polyline length
    Length(f64),
    Rectangle { width: f64, height: f64, area: f64 },
    Circle { center: Point, radius: f64, area: f64 },
    Arc {
        center: Point,
        radius: f64,
        length: f64,
        degrees: f64,
        mid_angle: f64,
    },
    /// Enclosed polygon area
    Area(f64),
    /// Included angle in degrees
    Angle(f64),
}

impl ShapeKind {
    /// Computes the pixel-space measurement for this shape.
    ///
    /// Circles and arcs through collinear points return
    /// [`GeometryError::DegenerateCircle`].
    pub fn measurement(&self) -> Result<Measurement, GeometryError> {
        let m = match self {
            ShapeKind::Point { .. } | ShapeKind::Text { .. } => Measurement::None,
            ShapeKind::Line { start, end } | ShapeKind::Arrow { start, end } => {
                Measurement::Length(distance(*start, *end))
            }
            ShapeKind::Rectangle { start, end } => {
                let (min, max) = normalized_rect(*start, *end);
                let width = max.x - min.x;
                let height = max.y - min.y;
                Measurement::Rectangle {
                    width,
                    height,
                    area: width * height,
                }
            }
            ShapeKind::Circle { points: [p1, p2, p3] } => {
                let circle = geometry::circle_from_three_points(*p1, *p2, *p3)?;
                Measurement::Circle {
                    center: circle.center,
                    radius: circle.radius,
                    area: circle.area(),
                }
            }
            ShapeKind::Arc { points: [p1, p2, p3] } => {
                let circle = geometry::circle_from_three_points(*p1, *p2, *p3)?;
                let (start, sweep) = geometry::arc_sweep(&circle, *p1, *p3);
                Measurement::Arc {
                    center: circle.center,
                    radius: circle.radius,
                    length: sweep * circle.radius,
                    degrees: sweep.to_degrees(),
                    mid_angle: start + sweep / 2.0,
                }
            }
            ShapeKind::Curve { points } => Measurement::Length(geometry::polyline_length(points)),
            ShapeKind::ClosedCurve { points } => Measurement::Area(geometry::shoelace_area(points)),
            ShapeKind::Angle { points: [a, vertex, b] } => {
                Measurement::Angle(geometry::included_angle_degrees(*a, *vertex, *b))
            }
        };
        Ok(m)
    }
}

/// Horizontal alignment of a label relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Center,
    Left,
}

/// One line of label text at a surface position (vertically centered).
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub anchor: Point,
    pub align: Align,
}

impl Label {
    fn centered(text: impl Into<String>, anchor: Point) -> Self {
        Self {
            text: text.into(),
            anchor,
            align: Align::Center,
        }
    }

    fn left(text: impl Into<String>, anchor: Point) -> Self {
        Self {
            text: text.into(),
            anchor,
            align: Align::Left,
        }
    }
}

/// Unit vector bisecting the angle at `vertex`; falls back to a
/// perpendicular for straight angles and to +x for zero-length rays.
fn bisector(a: Point, vertex: Point, b: Point) -> (f64, f64) {
    let unit = |p: Point| {
        let (dx, dy) = (p.x - vertex.x, p.y - vertex.y);
        let len = dx.hypot(dy);
        (len > 0.0).then(|| (dx / len, dy / len))
    };
    match (unit(a), unit(b)) {
        (Some((ux, uy)), Some((vx, vy))) => {
            let (sx, sy) = (ux + vx, uy + vy);
            let len = sx.hypot(sy);
            if len < 1e-9 { (-uy, ux) } else { (sx / len, sy / len) }
        }
        _ => (1.0, 0.0),
    }
}

/// Builds the measurement labels for a shape.
///
/// Degenerate circles and arcs produce no labels.
pub fn labels(kind: &ShapeKind, units: &Units) -> Vec<Label> {
    let Ok(measurement) = kind.measurement() else {
        return Vec::new();
    };

    match (kind, measurement) {
        (ShapeKind::Point { x, y, label }, _) => {
            vec![Label::centered(label.clone(), Point::new(*x, *y - 10.0))]
        }
        (ShapeKind::Line { start, end } | ShapeKind::Arrow { start, end }, Measurement::Length(len)) => {
            vec![Label::centered(units.format_length(len), start.midpoint(*end))]
        }
        (
            ShapeKind::Rectangle { start, end },
            Measurement::Rectangle {
                width,
                height,
                area,
            },
        ) => {
            let c = start.midpoint(*end);
            let suffix = if units.is_calibrated() {
                units.unit_label.as_str()
            } else {
                "px"
            };
            vec![
                Label::centered(
                    format!(
                        "{} × {} {}",
                        round_display(units.length(width)),
                        round_display(units.length(height)),
                        suffix
                    ),
                    c.translated(0.0, -10.0),
                ),
                Label::centered(
                    format!("Area: {}", units.format_area(area)),
                    c.translated(0.0, 10.0),
                ),
            ]
        }
        (_, Measurement::Circle { center, radius, area }) => vec![
            Label::centered(
                format!("R: {}", units.format_length(radius)),
                center.translated(0.0, -15.0),
            ),
            Label::centered(
                format!("Area: {}", units.format_area(area)),
                center.translated(0.0, 5.0),
            ),
        ],
        (
            _,
            Measurement::Arc {
                center,
                radius,
                length,
                degrees,
                mid_angle,
            },
        ) => {
            let anchor = Point::new(
                center.x + 0.7 * radius * mid_angle.cos(),
                center.y + 0.7 * radius * mid_angle.sin(),
            );
            vec![
                Label::left(
                    format!("R: {}", units.format_length(radius)),
                    anchor.translated(-55.0, -30.0),
                ),
                Label::left(
                    format!("L: {}", units.format_length(length)),
                    anchor.translated(-55.0, -15.0),
                ),
                Label::left(format!("A: {}", format_degrees(degrees)), anchor.translated(-55.0, 0.0)),
            ]
        }
        (ShapeKind::Curve { points }, Measurement::Length(len)) => match points.last() {
            Some(last) => vec![Label::left(units.format_length(len), last.translated(15.0, 0.0))],
            None => Vec::new(),
        },
        (ShapeKind::ClosedCurve { points }, Measurement::Area(area)) => match points.last() {
            Some(last) => vec![Label::left(
                format!("Area: {}", units.format_area(area)),
                last.translated(15.0, 0.0),
            )],
            None => Vec::new(),
        },
        (ShapeKind::Angle { points: [a, vertex, b] }, Measurement::Angle(degrees)) => {
            let (bx, by) = bisector(*a, *vertex, *b);
            let mut out: Vec<Label> = [a, vertex, b]
                .iter()
                .enumerate()
                .map(|(i, p)| Label::centered(format!("P{}", i + 1), p.translated(0.0, -15.0)))
                .collect();
            out.push(Label::centered(
                format_degrees(degrees),
                vertex.translated(bx * ANGLE_LABEL_DISTANCE, by * ANGLE_LABEL_DISTANCE),
            ));
            out
        }
        _ => Vec::new(),
    }
}
