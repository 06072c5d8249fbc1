//! Cairo-based rendering functions for annotations and their measurement labels.

use super::color::{CYAN, Color, WHITE};
use super::font::FontDescriptor;
use super::measure::{self, Align, Label, Units};
use super::shape::{Shape, ShapeId, ShapeKind, normalized_rect};
use crate::geometry::{self, Point};
use crate::util;
use std::f64::consts::TAU;

/// Radius of construction and point-marker dots.
const DOT_RADIUS: f64 = 3.0;
/// Length of the perpendicular ticks at line ends.
const LINE_TICK_LENGTH: f64 = 10.0;
/// Arrowhead barb length in pixels.
const ARROW_HEAD_LENGTH: f64 = 20.0;
/// Arrowhead barb angle in degrees.
const ARROW_HEAD_ANGLE: f64 = 30.0;
/// Radius of the arc drawn inside an angle's vertex.
const ANGLE_ARC_RADIUS: f64 = 30.0;
/// Extra width of the selection outline over the shape's own stroke.
const HIGHLIGHT_EXTRA_WIDTH: f64 = 2.0;
/// Alpha applied to a closed curve's stroke color for its fill.
const CLOSED_CURVE_FILL_ALPHA: f64 = 0.2;

/// Settings shared by every shape drawn in one frame.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// Unit conversion for measurement labels
    pub units: Units,
    /// Font for measurement labels and text annotations
    pub label_font: FontDescriptor,
    /// Outline color of the selected shape
    pub highlight_color: Color,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            units: Units::uncalibrated(),
            label_font: FontDescriptor::default(),
            highlight_color: CYAN,
        }
    }
}

/// Paints the background image scaled to the surface, or a neutral
/// placeholder when no image is loaded.
///
/// Should be called first in every frame; it replaces the whole surface.
pub fn render_background(
    ctx: &cairo::Context,
    image: Option<&cairo::ImageSurface>,
    width: i32,
    height: i32,
) {
    let _ = ctx.save();
    ctx.set_operator(cairo::Operator::Source);
    ctx.set_source_rgb(0.12, 0.12, 0.12);
    let _ = ctx.paint();
    ctx.set_operator(cairo::Operator::Over);

    if let Some(image) = image {
        let (iw, ih) = (image.width(), image.height());
        if iw > 0 && ih > 0 && width > 0 && height > 0 {
            ctx.scale(width as f64 / iw as f64, height as f64 / ih as f64);
            if ctx.set_source_surface(image, 0.0, 0.0).is_ok() {
                let _ = ctx.paint();
            }
        }
    }
    let _ = ctx.restore();
}

/// Renders all shapes in insertion order (first shape = bottom layer).
///
/// The shape whose id equals `selected` is outlined in the highlight color
/// before being drawn in its own style.
pub fn render_shapes(
    ctx: &cairo::Context,
    shapes: &[Shape],
    selected: Option<ShapeId>,
    settings: &RenderSettings,
) {
    for shape in shapes {
        if selected == Some(shape.id) {
            render_selection_highlight(ctx, shape, settings);
        }
        render_shape(ctx, shape, settings);
    }
}

/// Renders a single committed shape together with its measurement labels.
pub fn render_shape(ctx: &cairo::Context, shape: &Shape, settings: &RenderSettings) {
    let style = &shape.style;
    if let ShapeKind::Text { position, content } = &shape.kind {
        render_text(ctx, *position, content, style.font_color, &settings.label_font);
        return;
    }

    render_geometry(ctx, &shape.kind, style.color, style.thickness, DOT_RADIUS);
    for label in measure::labels(&shape.kind, &settings.units) {
        render_label(ctx, &label, style.font_color, &settings.label_font);
    }
}

/// Draws the selection outline for a shape, wider than its own stroke.
pub fn render_selection_highlight(ctx: &cairo::Context, shape: &Shape, settings: &RenderSettings) {
    let color = settings.highlight_color;
    let width = shape.style.thickness + HIGHLIGHT_EXTRA_WIDTH;

    if let ShapeKind::Text { position, content } = &shape.kind {
        let (w, h) = text_extents(ctx, content, &settings.label_font);
        let _ = ctx.save();
        color.set_source(ctx);
        ctx.set_line_width(HIGHLIGHT_EXTRA_WIDTH);
        ctx.rectangle(position.x - 2.0, position.y - 2.0, w + 4.0, h + 4.0);
        let _ = ctx.stroke();
        let _ = ctx.restore();
        return;
    }

    render_geometry(
        ctx,
        &shape.kind,
        color,
        width,
        DOT_RADIUS + HIGHLIGHT_EXTRA_WIDTH,
    );
}

/// Strokes the geometry of a shape without labels.
///
/// Circles and arcs whose construction points are collinear fall back to a
/// polyline through those points.
pub fn render_geometry(
    ctx: &cairo::Context,
    kind: &ShapeKind,
    color: Color,
    thickness: f64,
    dot_radius: f64,
) {
    let _ = ctx.save();
    color.set_source(ctx);
    ctx.set_line_width(thickness);
    ctx.set_line_cap(cairo::LineCap::Round);
    ctx.set_line_join(cairo::LineJoin::Round);

    match kind {
        ShapeKind::Point { x, y, .. } => {
            render_dot(ctx, Point::new(*x, *y), dot_radius);
        }
        ShapeKind::Line { start, end } => {
            stroke_segment(ctx, *start, *end);
            for at in [*start, *end] {
                if let Some((a, b)) = util::perpendicular_tick(*start, *end, at, LINE_TICK_LENGTH) {
                    stroke_segment(ctx, a, b);
                }
            }
        }
        ShapeKind::Arrow { start, end } => {
            stroke_segment(ctx, *start, *end);
            for barb in util::calculate_arrowhead(*end, *start, ARROW_HEAD_LENGTH, ARROW_HEAD_ANGLE)
            {
                stroke_segment(ctx, *end, barb);
            }
        }
        ShapeKind::Rectangle { start, end } => {
            let (min, max) = normalized_rect(*start, *end);
            ctx.set_line_join(cairo::LineJoin::Miter);
            ctx.rectangle(min.x, min.y, max.x - min.x, max.y - min.y);
            let _ = ctx.stroke();
        }
        ShapeKind::Circle { points } => {
            match kind.circle() {
                Some(Ok(circle)) => {
                    ctx.new_sub_path();
                    ctx.arc(circle.center.x, circle.center.y, circle.radius, 0.0, TAU);
                    let _ = ctx.stroke();
                }
                _ => stroke_polyline(ctx, points),
            }
            render_dots(ctx, points, dot_radius);
        }
        ShapeKind::Arc { points } => {
            match kind.circle() {
                Some(Ok(circle)) => {
                    let (start, sweep) = geometry::arc_sweep(&circle, points[0], points[2]);
                    ctx.new_sub_path();
                    ctx.arc(
                        circle.center.x,
                        circle.center.y,
                        circle.radius,
                        start,
                        start + sweep,
                    );
                    let _ = ctx.stroke();
                }
                _ => stroke_polyline(ctx, points),
            }
            render_dots(ctx, points, dot_radius);
        }
        ShapeKind::Curve { points } => {
            if points.len() == 1 {
                render_dot(ctx, points[0], dot_radius);
            } else {
                smoothed_path(ctx, points);
                let _ = ctx.stroke();
            }
        }
        ShapeKind::ClosedCurve { points } => {
            if let Some((first, rest)) = points.split_first() {
                ctx.move_to(first.x, first.y);
                for p in rest {
                    ctx.line_to(p.x, p.y);
                }
                ctx.close_path();
                color
                    .with_alpha(color.a * CLOSED_CURVE_FILL_ALPHA)
                    .set_source(ctx);
                let _ = ctx.fill_preserve();
                color.set_source(ctx);
                let _ = ctx.stroke();
            }
        }
        ShapeKind::Angle {
            points: [a, vertex, b],
        } => {
            stroke_segment(ctx, *a, *vertex);
            stroke_segment(ctx, *vertex, *b);
            render_vertex_arc(ctx, *a, *vertex, *b);
            render_dots(ctx, &[*a, *vertex, *b], dot_radius);
        }
        ShapeKind::Text { .. } => {}
    }

    let _ = ctx.restore();
}

/// Draws an in-progress polyline (fewer construction points than the tool
/// needs), with dots on the placed points.
pub fn render_preview_polyline(
    ctx: &cairo::Context,
    placed: &[Point],
    cursor: Option<Point>,
    color: Color,
    thickness: f64,
) {
    let _ = ctx.save();
    color.set_source(ctx);
    ctx.set_line_width(thickness);
    ctx.set_line_cap(cairo::LineCap::Round);
    ctx.set_line_join(cairo::LineJoin::Round);

    let mut path: Vec<Point> = placed.to_vec();
    path.extend(cursor);
    stroke_polyline(ctx, &path);
    render_dots(ctx, placed, DOT_RADIUS);
    let _ = ctx.restore();
}

/// Eraser cursor: the erase radius as a translucent circle.
pub fn render_eraser_cursor(ctx: &cairo::Context, center: Point, radius: f64) {
    let _ = ctx.save();
    ctx.new_sub_path();
    ctx.arc(center.x, center.y, radius.max(1.0), 0.0, TAU);
    WHITE.with_alpha(0.3).set_source(ctx);
    let _ = ctx.fill_preserve();
    ctx.set_source_rgba(1.0, 0.0, 0.0, 0.5);
    ctx.set_line_width(1.0);
    let _ = ctx.stroke();
    let _ = ctx.restore();
}

/// Renders a measurement label centered vertically on its anchor.
///
/// Labels get a thin dark outline so they stay legible over bright images.
pub fn render_label(ctx: &cairo::Context, label: &Label, color: Color, font: &FontDescriptor) {
    let layout = pangocairo::functions::create_layout(ctx);
    layout.set_font_description(Some(&font.to_pango()));
    layout.set_text(&label.text);
    let (w, h) = layout.pixel_size();

    let x = match label.align {
        Align::Center => label.anchor.x - w as f64 / 2.0,
        Align::Left => label.anchor.x,
    };
    let y = label.anchor.y - h as f64 / 2.0;
    draw_outlined_layout(ctx, &layout, x, y, color, font.size_px);
}

/// Renders text content with its top-left corner at `position`.
pub fn render_text(
    ctx: &cairo::Context,
    position: Point,
    text: &str,
    color: Color,
    font: &FontDescriptor,
) {
    let layout = pangocairo::functions::create_layout(ctx);
    layout.set_font_description(Some(&font.to_pango()));
    layout.set_text(text);
    draw_outlined_layout(ctx, &layout, position.x, position.y, color, font.size_px);
}

/// Pixel size of `text` laid out in `font`.
pub fn text_extents(ctx: &cairo::Context, text: &str, font: &FontDescriptor) -> (f64, f64) {
    let layout = pangocairo::functions::create_layout(ctx);
    layout.set_font_description(Some(&font.to_pango()));
    layout.set_text(text);
    let (w, h) = layout.pixel_size();
    (w as f64, h as f64)
}

fn draw_outlined_layout(
    ctx: &cairo::Context,
    layout: &pango::Layout,
    x: f64,
    y: f64,
    color: Color,
    size: f64,
) {
    let _ = ctx.save();
    // gray antialiasing avoids color fringes on translucent surfaces
    ctx.set_antialias(cairo::Antialias::Gray);

    let brightness = color.r * 0.299 + color.g * 0.587 + color.b * 0.114;
    let outline = if brightness > 0.5 { 0.0 } else { 1.0 };

    ctx.move_to(x, y);
    pangocairo::functions::layout_path(ctx, layout);
    ctx.set_source_rgba(outline, outline, outline, 0.8);
    ctx.set_line_width((size * 0.15).max(1.0));
    ctx.set_line_join(cairo::LineJoin::Round);
    let _ = ctx.stroke_preserve();

    color.set_source(ctx);
    let _ = ctx.fill();
    let _ = ctx.restore();
}

fn stroke_segment(ctx: &cairo::Context, a: Point, b: Point) {
    ctx.move_to(a.x, a.y);
    ctx.line_to(b.x, b.y);
    let _ = ctx.stroke();
}

fn stroke_polyline(ctx: &cairo::Context, points: &[Point]) {
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    ctx.move_to(first.x, first.y);
    for p in rest {
        ctx.line_to(p.x, p.y);
    }
    let _ = ctx.stroke();
}

fn render_dot(ctx: &cairo::Context, center: Point, radius: f64) {
    ctx.new_sub_path();
    ctx.arc(center.x, center.y, radius, 0.0, TAU);
    let _ = ctx.fill();
}

fn render_dots(ctx: &cairo::Context, points: &[Point], radius: f64) {
    for p in points {
        render_dot(ctx, *p, radius);
    }
}

/// Builds a path through `points` smoothed with quadratic segments that
/// pass through the midpoints between consecutive points.
fn smoothed_path(ctx: &cairo::Context, points: &[Point]) {
    let Some((first, _)) = points.split_first() else {
        return;
    };
    ctx.move_to(first.x, first.y);
    if points.len() < 3 {
        for p in &points[1..] {
            ctx.line_to(p.x, p.y);
        }
        return;
    }

    let mut current = *first;
    for window in points[1..].windows(2) {
        let (control, next) = (window[0], window[1]);
        let end = control.midpoint(next);
        quadratic_to(ctx, current, control, end);
        current = end;
    }
    if let Some(last) = points.last() {
        ctx.line_to(last.x, last.y);
    }
}

/// Cairo only has cubic curves; elevate the quadratic from `from`.
fn quadratic_to(ctx: &cairo::Context, from: Point, control: Point, to: Point) {
    let c1 = Point::new(
        from.x + 2.0 / 3.0 * (control.x - from.x),
        from.y + 2.0 / 3.0 * (control.y - from.y),
    );
    let c2 = Point::new(
        to.x + 2.0 / 3.0 * (control.x - to.x),
        to.y + 2.0 / 3.0 * (control.y - to.y),
    );
    ctx.curve_to(c1.x, c1.y, c2.x, c2.y, to.x, to.y);
}

/// Small arc at the vertex spanning the included (smaller) angle.
fn render_vertex_arc(ctx: &cairo::Context, a: Point, vertex: Point, b: Point) {
    if a == vertex || b == vertex {
        return;
    }
    let theta_a = (a.y - vertex.y).atan2(a.x - vertex.x);
    let theta_b = (b.y - vertex.y).atan2(b.x - vertex.x);
    let delta = geometry::normalize_angle(theta_b - theta_a);
    let (start, sweep) = if delta <= TAU / 2.0 {
        (theta_a, delta)
    } else {
        (theta_b, TAU - delta)
    };

    ctx.new_sub_path();
    ctx.arc(vertex.x, vertex.y, ANGLE_ARC_RADIUS, start, start + sweep);
    let _ = ctx.stroke();
}
