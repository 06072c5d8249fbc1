//! Annotation tools and their pointer protocols.
//!
//! Each [`Tool`] maps to a [`ToolBehavior`] implementation that inspects the
//! current [`DrawingState`] and answers a pointer event with a [`Transition`].
//! Tools never touch the shape set; the engine applies the transition.

use super::state::{DrawingState, EngineError};
use crate::draw::ShapeKind;
use crate::geometry::{self, Point};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Annotation tool selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tool {
    /// Select and drag shapes (default)
    #[default]
    Pointer,
    /// Labelled point marker, one click
    Point,
    /// Measured line, drag
    Line,
    /// Rectangle with extent and area, drag
    Rectangle,
    /// Circle through three clicks, double-click to finish
    Circle,
    /// Arc through three clicks, double-click to finish
    Arc,
    /// Open smoothed polyline, double-click to finish
    Curve,
    /// Closed polygon with area, double-click to finish
    ClosedCurve,
    /// Removes shapes under the pointer
    Eraser,
    /// Select and drag shapes
    Move,
    /// Arrow, drag
    Arrow,
    /// Free text at a click position
    Textbox,
    /// Angle through three clicks (vertex second), double-click to finish
    Angle,
}

impl Tool {
    pub const ALL: [Tool; 13] = [
        Tool::Pointer,
        Tool::Point,
        Tool::Line,
        Tool::Rectangle,
        Tool::Circle,
        Tool::Arc,
        Tool::Curve,
        Tool::ClosedCurve,
        Tool::Eraser,
        Tool::Move,
        Tool::Arrow,
        Tool::Textbox,
        Tool::Angle,
    ];

    /// Human-readable tool name.
    pub fn name(self) -> &'static str {
        match self {
            Tool::Pointer => "Pointer",
            Tool::Point => "Point",
            Tool::Line => "Line",
            Tool::Rectangle => "Rectangle",
            Tool::Circle => "Circle",
            Tool::Arc => "Arc",
            Tool::Curve => "Curve",
            Tool::ClosedCurve => "Closed curve",
            Tool::Eraser => "Eraser",
            Tool::Move => "Move",
            Tool::Arrow => "Arrow",
            Tool::Textbox => "Text",
            Tool::Angle => "Angle",
        }
    }

    /// Whether clicking with this tool selects existing shapes.
    pub fn selects(self) -> bool {
        matches!(self, Tool::Pointer | Tool::Move)
    }

    /// Pointer protocol for this tool.
    pub fn behavior(self) -> &'static dyn ToolBehavior {
        match self {
            Tool::Pointer | Tool::Move => &SELECT,
            Tool::Point => &POINT,
            Tool::Line => &LINE,
            Tool::Rectangle => &RECTANGLE,
            Tool::Arrow => &ARROW,
            Tool::Circle => &CIRCLE,
            Tool::Arc => &ARC,
            Tool::Angle => &ANGLE,
            Tool::Curve => &CURVE,
            Tool::ClosedCurve => &CLOSED_CURVE,
            Tool::Eraser => &ERASER,
            Tool::Textbox => &TEXTBOX,
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Engine-level effect of a pointer event.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Nothing changes
    Stay,
    /// Replace the in-progress state (preview updates included)
    Enter(DrawingState),
    /// Finalize a shape into the set and return to idle
    Commit(ShapeKind),
    /// Commit a point marker; the engine assigns its label
    PlacePoint(Point),
    /// The gesture cannot finish; state is kept for correction
    Reject(EngineError),
    /// Start an eraser stroke and erase immediately
    EraseAt(Point),
    /// Erase at the next frame callback
    QueueErase(Point),
    /// Flush pending erasing and end the stroke
    EndErase,
    /// Pick the topmost shape under the point for moving
    Select(Point),
    /// Move the picked shape so the pick point follows the pointer
    Drag(Point),
    /// Finish moving and commit the translated shape
    Release,
}

/// Pointer protocol of a tool.
///
/// Coordinates are surface coordinates. Default methods ignore the event.
pub trait ToolBehavior: Sync {
    fn on_pointer_down(&self, state: &DrawingState, p: Point) -> Transition;

    fn on_pointer_move(&self, _state: &DrawingState, _p: Point) -> Transition {
        Transition::Stay
    }

    fn on_pointer_up(&self, _state: &DrawingState, _p: Point) -> Transition {
        Transition::Stay
    }

    fn on_double_click(&self, _state: &DrawingState, _p: Point) -> Transition {
        Transition::Stay
    }
}

/// Pointer and move tools.
pub struct SelectTool;

impl ToolBehavior for SelectTool {
    fn on_pointer_down(&self, _state: &DrawingState, p: Point) -> Transition {
        Transition::Select(p)
    }

    fn on_pointer_move(&self, state: &DrawingState, p: Point) -> Transition {
        match state {
            DrawingState::Moving { .. } => Transition::Drag(p),
            _ => Transition::Stay,
        }
    }

    fn on_pointer_up(&self, state: &DrawingState, _p: Point) -> Transition {
        match state {
            DrawingState::Moving { .. } => Transition::Release,
            _ => Transition::Stay,
        }
    }
}

/// Single-click point marker.
pub struct PointTool;

impl ToolBehavior for PointTool {
    fn on_pointer_down(&self, _state: &DrawingState, p: Point) -> Transition {
        Transition::PlacePoint(p)
    }
}

/// Press-drag-release tools: line, rectangle, arrow.
pub struct DragTool(pub Tool);

impl DragTool {
    fn shape(&self, start: Point, end: Point) -> ShapeKind {
        match self.0 {
            Tool::Rectangle => ShapeKind::Rectangle { start, end },
            Tool::Arrow => ShapeKind::Arrow { start, end },
            _ => ShapeKind::Line { start, end },
        }
    }
}

impl ToolBehavior for DragTool {
    fn on_pointer_down(&self, _state: &DrawingState, p: Point) -> Transition {
        Transition::Enter(DrawingState::Dragging {
            tool: self.0,
            start: p,
            current: p,
        })
    }

    fn on_pointer_move(&self, state: &DrawingState, p: Point) -> Transition {
        match state {
            DrawingState::Dragging { tool, start, .. } if *tool == self.0 => {
                Transition::Enter(DrawingState::Dragging {
                    tool: *tool,
                    start: *start,
                    current: p,
                })
            }
            _ => Transition::Stay,
        }
    }

    fn on_pointer_up(&self, state: &DrawingState, p: Point) -> Transition {
        match state {
            DrawingState::Dragging { tool, start, .. } if *tool == self.0 => {
                Transition::Commit(self.shape(*start, p))
            }
            _ => Transition::Stay,
        }
    }
}

/// Appends `p` to a collected point list, skipping an exact repeat of the
/// last point (the second press of a double-click).
fn collect(tool: Tool, state: &DrawingState, p: Point, limit: Option<usize>) -> Transition {
    match state {
        DrawingState::Collecting {
            tool: current,
            points,
            ..
        } if *current == tool => {
            if points.last() == Some(&p) || limit.is_some_and(|max| points.len() >= max) {
                return Transition::Stay;
            }
            let mut points = points.clone();
            points.push(p);
            Transition::Enter(DrawingState::Collecting {
                tool,
                points,
                cursor: Some(p),
            })
        }
        _ => Transition::Enter(DrawingState::Collecting {
            tool,
            points: vec![p],
            cursor: Some(p),
        }),
    }
}

fn track_cursor(tool: Tool, state: &DrawingState, p: Point) -> Transition {
    match state {
        DrawingState::Collecting {
            tool: current,
            points,
            ..
        } if *current == tool => Transition::Enter(DrawingState::Collecting {
            tool,
            points: points.clone(),
            cursor: Some(p),
        }),
        _ => Transition::Stay,
    }
}

/// Three-click tools: circle, arc, angle.
pub struct ThreePointTool(pub Tool);

impl ThreePointTool {
    /// Builds the shape for exactly three points.
    ///
    /// Circles and arcs through collinear or coincident points are rejected.
    pub fn shape(&self, points: [Point; 3]) -> Result<ShapeKind, EngineError> {
        match self.0 {
            Tool::Circle | Tool::Arc => {
                let [p1, p2, p3] = points;
                geometry::circle_from_three_points(p1, p2, p3)?;
                Ok(if self.0 == Tool::Circle {
                    ShapeKind::Circle { points }
                } else {
                    ShapeKind::Arc { points }
                })
            }
            _ => Ok(ShapeKind::Angle { points }),
        }
    }
}

impl ToolBehavior for ThreePointTool {
    fn on_pointer_down(&self, state: &DrawingState, p: Point) -> Transition {
        collect(self.0, state, p, Some(3))
    }

    fn on_pointer_move(&self, state: &DrawingState, p: Point) -> Transition {
        track_cursor(self.0, state, p)
    }

    fn on_double_click(&self, state: &DrawingState, _p: Point) -> Transition {
        match state {
            DrawingState::Collecting { tool, points, .. } if *tool == self.0 => {
                match <[Point; 3]>::try_from(points.as_slice()) {
                    Ok(three) => match self.shape(three) {
                        Ok(kind) => Transition::Commit(kind),
                        Err(err) => Transition::Reject(err),
                    },
                    Err(_) => Transition::Stay,
                }
            }
            _ => Transition::Stay,
        }
    }
}

/// Free-form polylines, open or closed.
pub struct PolylineTool {
    pub closed: bool,
}

impl PolylineTool {
    fn tool(&self) -> Tool {
        if self.closed { Tool::ClosedCurve } else { Tool::Curve }
    }
}

impl ToolBehavior for PolylineTool {
    fn on_pointer_down(&self, state: &DrawingState, p: Point) -> Transition {
        collect(self.tool(), state, p, None)
    }

    fn on_pointer_move(&self, state: &DrawingState, p: Point) -> Transition {
        track_cursor(self.tool(), state, p)
    }

    fn on_double_click(&self, state: &DrawingState, _p: Point) -> Transition {
        let DrawingState::Collecting { tool, points, .. } = state else {
            return Transition::Stay;
        };
        if *tool != self.tool() {
            return Transition::Stay;
        }

        if self.closed {
            if points.len() <= 2 {
                return Transition::Stay;
            }
            let mut ring = points.clone();
            ring.push(points[0]);
            Transition::Commit(ShapeKind::ClosedCurve { points: ring })
        } else if points.len() >= 2 {
            Transition::Commit(ShapeKind::Curve {
                points: points.clone(),
            })
        } else {
            Transition::Stay
        }
    }
}

/// Subtractive eraser.
pub struct EraserTool;

impl ToolBehavior for EraserTool {
    fn on_pointer_down(&self, _state: &DrawingState, p: Point) -> Transition {
        Transition::EraseAt(p)
    }

    fn on_pointer_move(&self, state: &DrawingState, p: Point) -> Transition {
        match state {
            DrawingState::Erasing { .. } => Transition::QueueErase(p),
            _ => Transition::Stay,
        }
    }

    fn on_pointer_up(&self, state: &DrawingState, _p: Point) -> Transition {
        match state {
            DrawingState::Erasing { .. } => Transition::EndErase,
            _ => Transition::Stay,
        }
    }
}

/// Opens (or repositions) the text entry at the click.
pub struct TextboxTool;

impl ToolBehavior for TextboxTool {
    fn on_pointer_down(&self, state: &DrawingState, p: Point) -> Transition {
        let buffer = match state {
            DrawingState::TextInput { buffer, .. } => buffer.clone(),
            _ => String::new(),
        };
        Transition::Enter(DrawingState::TextInput {
            position: p,
            buffer,
        })
    }
}

static SELECT: SelectTool = SelectTool;
static POINT: PointTool = PointTool;
static LINE: DragTool = DragTool(Tool::Line);
static RECTANGLE: DragTool = DragTool(Tool::Rectangle);
static ARROW: DragTool = DragTool(Tool::Arrow);
static CIRCLE: ThreePointTool = ThreePointTool(Tool::Circle);
static ARC: ThreePointTool = ThreePointTool(Tool::Arc);
static ANGLE: ThreePointTool = ThreePointTool(Tool::Angle);
static CURVE: PolylineTool = PolylineTool { closed: false };
static CLOSED_CURVE: PolylineTool = PolylineTool { closed: true };
static ERASER: EraserTool = EraserTool;
static TEXTBOX: TextboxTool = TextboxTool;
