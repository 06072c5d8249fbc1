use std::borrow::Cow;

use crate::draw::{
    Shape, ShapeKind, render_background, render_shape, render_shapes,
    render::{render_eraser_cursor, render_preview_polyline, render_text},
};
use crate::geometry::Point;
use crate::input::tool::{ThreePointTool, Tool};

use super::{DrawingState, InputState};

/// The in-progress shape as it should be previewed.
#[derive(Debug, Clone, PartialEq)]
pub enum Provisional {
    /// Enough points for the real shape; drawn with its labels
    Shape(ShapeKind),
    /// Too few (or degenerate) points: placed points plus the live cursor
    Polyline {
        placed: Vec<Point>,
        cursor: Option<Point>,
    },
}

impl InputState {
    /// Returns the shape currently being drawn for live preview.
    ///
    /// # Returns
    /// - `Some(Provisional)` while dragging or collecting points
    /// - `None` when idle, erasing, moving or entering text
    pub fn provisional(&self) -> Option<Provisional> {
        match &self.state {
            DrawingState::Dragging {
                tool,
                start,
                current,
            } => {
                let (start, end) = (*start, *current);
                let kind = match tool {
                    Tool::Rectangle => ShapeKind::Rectangle { start, end },
                    Tool::Arrow => ShapeKind::Arrow { start, end },
                    _ => ShapeKind::Line { start, end },
                };
                Some(Provisional::Shape(kind))
            }
            DrawingState::Collecting {
                tool,
                points,
                cursor,
            } => Some(collecting_preview(*tool, points, *cursor)),
            _ => None,
        }
    }

    /// Shapes as they should appear this frame: a shape being moved is shown
    /// at its dragged position.
    pub fn visible_shapes(&self) -> Cow<'_, [Shape]> {
        match &self.state {
            DrawingState::Moving { moved, .. } => Cow::Owned(
                self.frame
                    .shapes
                    .iter()
                    .map(|shape| {
                        if shape.id == moved.id {
                            moved.clone()
                        } else {
                            shape.clone()
                        }
                    })
                    .collect(),
            ),
            _ => Cow::Borrowed(&self.frame.shapes),
        }
    }

    /// Renders the complete scene onto a surface-sized context.
    ///
    /// Full redraw: background, committed shapes in z-order (the selected
    /// one highlighted), the provisional shape, the text entry caret and the
    /// eraser cursor.
    pub fn render(&self, ctx: &cairo::Context, background: Option<&cairo::ImageSurface>) {
        let settings = self.render_settings();
        let resolution = self.config.resolution;
        render_background(
            ctx,
            background,
            resolution.width as i32,
            resolution.height as i32,
        );

        render_shapes(ctx, &self.visible_shapes(), self.selected, &settings);

        match self.provisional() {
            Some(Provisional::Shape(kind)) => {
                let preview = Shape::new(0, self.current_style.clone(), kind);
                render_shape(ctx, &preview, &settings);
            }
            Some(Provisional::Polyline { placed, cursor }) => {
                render_preview_polyline(
                    ctx,
                    &placed,
                    cursor,
                    self.current_style.color,
                    self.current_style.thickness,
                );
            }
            None => {}
        }

        if let DrawingState::TextInput { position, buffer } = &self.state {
            let mut preview = buffer.clone();
            preview.push('_');
            render_text(
                ctx,
                *position,
                &preview,
                self.current_style.font_color,
                &settings.label_font,
            );
        }

        if self.active_tool == Tool::Eraser {
            if let Some(cursor) = self.cursor {
                render_eraser_cursor(ctx, cursor, self.eraser_radius);
            }
        }
    }
}

/// Preview for multi-click tools: placed points plus the cursor as the
/// next point.
fn collecting_preview(tool: Tool, points: &[Point], cursor: Option<Point>) -> Provisional {
    let polyline = || Provisional::Polyline {
        placed: points.to_vec(),
        cursor,
    };

    let mut path = points.to_vec();
    if let Some(cursor) = cursor {
        if path.last() != Some(&cursor) {
            path.push(cursor);
        }
    }

    match tool {
        Tool::Circle | Tool::Arc | Tool::Angle => {
            let Ok(three) = <[Point; 3]>::try_from(&path[..path.len().min(3)]) else {
                return polyline();
            };
            match ThreePointTool(tool).shape(three) {
                Ok(kind) => Provisional::Shape(kind),
                Err(_) => polyline(),
            }
        }
        Tool::Curve if path.len() >= 2 => Provisional::Shape(ShapeKind::Curve { points: path }),
        Tool::ClosedCurve if path.len() > 2 => {
            path.push(path[0]);
            Provisional::Shape(ShapeKind::ClosedCurve { points: path })
        }
        _ => polyline(),
    }
}
