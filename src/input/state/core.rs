//! Drawing state machine and annotation engine state.

use crate::calibration::{CameraSettings, Resolution};
use crate::config::{Action, KeyBinding};
use crate::draw::{
    Color, CYAN, FontDescriptor, Frame, HIT_THRESHOLD, RenderSettings, Shape, ShapeId, ShapeKind,
    Style, Units,
};
use crate::geometry::{GeometryError, Point};
use crate::history::{DEFAULT_MAX_SNAPSHOTS, History};
use crate::input::{
    modifiers::Modifiers,
    tool::{Tool, Transition},
    viewport::{MAX_ZOOM, MIN_ZOOM, Viewport},
};
use std::collections::HashMap;
use thiserror::Error;

/// Default eraser radius in surface pixels.
pub const DEFAULT_ERASER_RADIUS: f64 = 15.0;

/// Stroke thickness bounds (same as config validation).
pub const MIN_THICKNESS: f64 = 1.0;
pub const MAX_THICKNESS: f64 = 20.0;

/// Eraser radius bounds (same as config validation).
pub const MIN_ERASER_RADIUS: f64 = 1.0;
pub const MAX_ERASER_RADIUS: f64 = 200.0;

/// Errors reported for gestures that cannot be committed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("cannot build shape: {0}")]
    Geometry(#[from] GeometryError),
}

/// Current drawing mode state machine.
///
/// Everything held here is transient: nothing in a non-idle state is part of
/// the committed shape set or the undo history until it is finalized.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawingState {
    /// Waiting for input
    Idle,
    /// Press-drag-release tools (line, rectangle, arrow) with the button held
    Dragging {
        tool: Tool,
        /// Where the button was pressed
        start: Point,
        /// Latest pointer position
        current: Point,
    },
    /// Multi-click tools (circle, arc, angle, curves) gathering points
    Collecting {
        tool: Tool,
        /// Placed points in click order
        points: Vec<Point>,
        /// Live pointer position for the preview segment
        cursor: Option<Point>,
    },
    /// Eraser stroke in progress
    Erasing {
        /// Positions visited since the last frame callback, in order
        pending: Vec<Point>,
        /// Shapes removed so far in this stroke
        removed: usize,
    },
    /// Dragging a selected shape
    Moving {
        /// Shape as it was when picked
        original: Shape,
        /// Shape translated by the cumulative pointer delta
        moved: Shape,
        /// Pick position
        anchor: Point,
    },
    /// Text entry overlay at a clicked position
    TextInput {
        position: Point,
        buffer: String,
    },
}

/// Engine settings injected by the host.
///
/// The engine never looks up calibration or resolution on its own; hosts
/// derive this from their configuration and push changes through
/// [`InputState::update_config`].
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Microns per pixel; `None` shows raw pixel measurements
    pub calibration: Option<f64>,
    /// Suffix for calibrated lengths
    pub unit_label: String,
    /// Backing-store size of the annotation surface
    pub resolution: Resolution,
    /// Selection proximity in surface pixels
    pub hit_threshold: f64,
    /// Initial eraser radius in surface pixels
    pub eraser_radius: f64,
    /// Undo depth (0 = unbounded)
    pub max_snapshots: usize,
    /// Outline color of the selected shape
    pub highlight_color: Color,
    /// Font for labels and text annotations
    pub label_font: FontDescriptor,
    /// Style applied to new shapes
    pub style: Style,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            calibration: None,
            unit_label: "µm".to_string(),
            resolution: Resolution::default(),
            hit_threshold: HIT_THRESHOLD,
            eraser_radius: DEFAULT_ERASER_RADIUS,
            max_snapshots: DEFAULT_MAX_SNAPSHOTS,
            highlight_color: CYAN,
            label_font: FontDescriptor::default(),
            style: Style::default(),
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }
}

impl EngineConfig {
    /// Unit conversion implied by the calibration factor.
    pub fn units(&self) -> Units {
        match self.calibration {
            Some(factor) => Units::calibrated(factor),
            None => Units::uncalibrated(),
        }
        .with_unit_label(self.unit_label.clone())
    }
    /// Applies a persisted camera settings document.
    ///
    /// A valid cached factor and a parseable resolution replace the current
    /// values. An invalid cached factor drops calibration so labels fall back
    /// to pixels. Absent fields leave the settings unchanged. Returns `true`
    /// when anything changed.
    pub fn apply_camera_settings(&mut self, settings: &CameraSettings) -> bool {
        let before = (self.calibration, self.resolution);
        if settings.calibration_factor.is_some() {
            self.calibration = settings.calibration().map(|c| c.calibration_factor);
            if self.calibration.is_none() {
                log::warn!("Ignoring invalid cached calibration factor");
            }
        }
        if let Some(resolution) = settings.resolution() {
            self.resolution = resolution;
        }
        before != (self.calibration, self.resolution)
    }
}

/// The annotation engine.
///
/// Owns the committed shape set, the undo history, the in-progress drawing
/// state and the id/label counters. Hosts feed it pointer and key events and
/// render it onto a surface of the configured resolution.
pub struct InputState {
    /// Committed shapes in z-order
    pub(crate) frame: Frame,
    /// Snapshot history of committed shape sets
    pub(crate) history: History,
    /// Current drawing mode state machine
    pub state: DrawingState,
    /// Tool driving pointer events
    pub(crate) active_tool: Tool,
    /// Style applied to the next committed shape
    pub current_style: Style,
    /// Current eraser radius in surface pixels
    pub eraser_radius: f64,
    pub(crate) config: EngineConfig,
    /// Current modifier key state
    pub modifiers: Modifiers,
    /// Next shape id; only grows except on clear-all
    pub(crate) next_id: ShapeId,
    /// Number used for the next point label (`p<N>`)
    pub(crate) next_point_label: u32,
    /// Shape highlighted by the pointer and move tools
    pub(crate) selected: Option<ShapeId>,
    /// Last pointer position in surface coordinates
    pub(crate) cursor: Option<Point>,
    /// Screen to surface mapping
    pub viewport: Viewport,
    /// Whether the display needs to be redrawn
    pub needs_redraw: bool,
    /// Most recent rejected gesture, for host feedback
    pub(crate) last_error: Option<EngineError>,
    /// Keybinding action map for efficient lookup
    action_map: HashMap<KeyBinding, Action>,
    /// Committed shape set waiting to be published to the host
    pending_publish: bool,
}

impl InputState {
    /// Creates an engine with an empty shape set.
    pub fn new(config: EngineConfig, action_map: HashMap<KeyBinding, Action>) -> Self {
        let mut viewport = Viewport::new(config.resolution);
        viewport.set_zoom_limits(config.min_zoom, config.max_zoom);

        Self {
            frame: Frame::new(),
            history: History::new(config.max_snapshots),
            state: DrawingState::Idle,
            active_tool: Tool::default(),
            current_style: config.style.clone(),
            eraser_radius: config.eraser_radius,
            modifiers: Modifiers::new(),
            next_id: 1,
            next_point_label: 1,
            selected: None,
            cursor: None,
            viewport,
            needs_redraw: true,
            last_error: None,
            action_map,
            pending_publish: false,
            config,
        }
    }

    /// Applies new host settings without touching the shape set.
    ///
    /// Calibration changes only affect how labels are formatted; shapes are
    /// stored in surface pixels.
    pub fn update_config(&mut self, config: EngineConfig) {
        if config.resolution != self.config.resolution {
            self.viewport.set_surface(config.resolution);
        }
        self.viewport
            .set_zoom_limits(config.min_zoom, config.max_zoom);
        self.history.set_max_snapshots(config.max_snapshots);
        self.current_style = config.style.clone();
        self.eraser_radius = config.eraser_radius;
        log::info!(
            "Engine config updated (calibration: {:?}, resolution: {})",
            config.calibration,
            config.resolution
        );
        self.config = config;
        self.needs_redraw = true;
    }

    /// Applies a changed camera settings document (e.g. after the host's
    /// settings store reports a change).
    ///
    /// Only calibration and resolution change; the current style and eraser
    /// radius keep their runtime adjustments.
    pub fn apply_camera_settings(&mut self, settings: &CameraSettings) {
        let mut config = self.config.clone();
        if !config.apply_camera_settings(settings) {
            return;
        }
        if config.resolution != self.config.resolution {
            self.viewport.set_surface(config.resolution);
        }
        log::info!(
            "Camera settings applied (calibration: {:?}, resolution: {})",
            config.calibration,
            config.resolution
        );
        self.config = config;
        self.needs_redraw = true;
    }

    /// Replaces the keybinding map.
    pub fn set_action_map(&mut self, action_map: HashMap<KeyBinding, Action>) {
        self.action_map = action_map;
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Committed shapes in z-order.
    pub fn shapes(&self) -> &[Shape] {
        &self.frame.shapes
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn active_tool(&self) -> Tool {
        self.active_tool
    }

    pub fn selected(&self) -> Option<ShapeId> {
        self.selected
    }

    /// Label the next point marker will get.
    pub fn next_point_label(&self) -> String {
        format!("p{}", self.next_point_label)
    }

    /// Takes the last rejection, if any.
    pub fn take_last_error(&mut self) -> Option<EngineError> {
        self.last_error.take()
    }

    /// Takes the committed shape set if it changed since the last call.
    ///
    /// Hosts that own the shapes poll this after dispatching events.
    pub fn take_published_shapes(&mut self) -> Option<Vec<Shape>> {
        if std::mem::take(&mut self.pending_publish) {
            Some(self.frame.shapes.clone())
        } else {
            None
        }
    }

    /// Settings for drawing labels with the current calibration.
    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            units: self.config.units(),
            label_font: self.config.label_font.clone(),
            highlight_color: self.config.highlight_color,
        }
    }

    /// `1 pixel = X.XXX microns`, or `None` when uncalibrated.
    pub fn scale_text(&self) -> Option<String> {
        self.config.units().scale_text()
    }

    /// Switches tools, aborting any in-progress gesture.
    pub fn set_tool(&mut self, tool: Tool) {
        if tool == self.active_tool {
            return;
        }
        self.abort_in_progress();
        if !tool.selects() {
            self.selected = None;
        }
        self.active_tool = tool;
        self.needs_redraw = true;
        log::debug!("Tool switched to {tool}");
    }

    /// Replaces the shape set from the host (e.g. a loaded session).
    ///
    /// Aborts in-progress drawing and starts a fresh history from `shapes`.
    pub fn set_shapes(&mut self, shapes: Vec<Shape>) {
        self.abort_in_progress();
        self.frame = Frame::from_shapes(shapes);
        self.history.reset(self.frame.clone());
        self.selected = None;
        self.sync_counters();
        self.needs_redraw = true;
        log::info!("Loaded {} shape(s)", self.frame.len());
    }

    /// Drops any transient drawing state, returning to idle.
    ///
    /// An eraser stroke that already removed shapes is committed so the
    /// removals stay undoable.
    pub fn abort_in_progress(&mut self) {
        let previous = std::mem::replace(&mut self.state, DrawingState::Idle);
        match previous {
            DrawingState::Idle => return,
            DrawingState::Erasing { pending, removed } => {
                let removed = removed + self.erase_along(&pending);
                if removed > 0 {
                    self.commit_frame();
                }
            }
            other => log::debug!("Aborted in-progress {other:?}"),
        }
        self.needs_redraw = true;
    }

    /// Applies a tool transition to the engine.
    pub(crate) fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::Stay => {}
            Transition::Enter(state) => {
                if state != self.state {
                    self.state = state;
                    self.needs_redraw = true;
                }
            }
            Transition::Commit(kind) => {
                self.state = DrawingState::Idle;
                self.commit_shape(kind);
            }
            Transition::PlacePoint(p) => {
                let label = self.next_point_label();
                self.next_point_label += 1;
                self.commit_shape(ShapeKind::Point {
                    x: p.x,
                    y: p.y,
                    label,
                });
            }
            Transition::Reject(err) => {
                log::warn!("Rejected {}: {err}", self.active_tool);
                self.last_error = Some(err);
                self.needs_redraw = true;
            }
            Transition::EraseAt(p) => {
                let removed = self.erase_at(p);
                self.state = DrawingState::Erasing {
                    pending: Vec::new(),
                    removed,
                };
                self.needs_redraw = true;
            }
            Transition::QueueErase(p) => {
                if let DrawingState::Erasing { pending, .. } = &mut self.state {
                    pending.push(p);
                }
                self.needs_redraw = true;
            }
            Transition::EndErase => {
                self.flush_pending_erase();
                if let DrawingState::Erasing { removed, .. } = self.state {
                    self.state = DrawingState::Idle;
                    if removed > 0 {
                        self.commit_frame();
                        log::info!("Eraser stroke removed {removed} shape(s)");
                    }
                }
                self.needs_redraw = true;
            }
            Transition::Select(p) => self.select_at(p),
            Transition::Drag(p) => {
                if let DrawingState::Moving {
                    original,
                    moved,
                    anchor,
                } = &mut self.state
                {
                    *moved = original.translated(p.x - anchor.x, p.y - anchor.y);
                    self.needs_redraw = true;
                }
            }
            Transition::Release => {
                let previous = std::mem::replace(&mut self.state, DrawingState::Idle);
                if let DrawingState::Moving {
                    original, moved, ..
                } = previous
                {
                    if moved != original && self.frame.replace(moved) {
                        self.commit_frame();
                        log::info!("Moved shape {}", original.id);
                    }
                }
                self.needs_redraw = true;
            }
        }
    }

    fn select_at(&mut self, p: Point) {
        let picked = self
            .frame
            .topmost_at(p, self.config.hit_threshold)
            .cloned();
        match picked {
            Some(shape) => {
                log::debug!("Selected shape {} ({})", shape.id, shape.kind.name());
                self.selected = Some(shape.id);
                self.state = DrawingState::Moving {
                    moved: shape.clone(),
                    original: shape,
                    anchor: p,
                };
            }
            None => self.selected = None,
        }
        self.needs_redraw = true;
    }

    /// Finalizes a shape with the next id and the current style.
    pub(crate) fn commit_shape(&mut self, kind: ShapeKind) {
        let id = self.next_id;
        self.next_id += 1;
        log::info!("Committed {} #{id}", kind.name());
        self.frame
            .add(Shape::new(id, self.current_style.clone(), kind));
        self.commit_frame();
    }

    /// Pushes the current shape set onto the history and publishes it.
    fn commit_frame(&mut self) {
        self.history.commit(self.frame.clone());
        self.sync_counters();
        self.pending_publish = true;
        self.needs_redraw = true;
    }

    fn erase_at(&mut self, p: Point) -> usize {
        let removed = self.frame.erase_at(p, self.eraser_radius);
        if removed > 0 {
            if let Some(id) = self.selected {
                if self.frame.get(id).is_none() {
                    self.selected = None;
                }
            }
        }
        removed
    }

    /// Erases at every position in order, returning the number removed.
    fn erase_along(&mut self, positions: &[Point]) -> usize {
        positions.iter().map(|p| self.erase_at(*p)).sum()
    }

    fn flush_pending_erase(&mut self) -> bool {
        let pending = match &mut self.state {
            DrawingState::Erasing { pending, .. } => std::mem::take(pending),
            _ => return false,
        };
        let count = self.erase_along(&pending);
        if let DrawingState::Erasing { removed, .. } = &mut self.state {
            *removed += count;
        }
        count > 0
    }

    /// Frame callback: erases at every eraser position queued since the last
    /// frame.
    ///
    /// Returns `true` when shapes were removed.
    pub fn on_frame(&mut self) -> bool {
        let changed = self.flush_pending_erase();
        if changed {
            self.needs_redraw = true;
        }
        changed
    }

    /// Keeps the label counter at 1 for an empty set and the id counter above
    /// every existing id.
    fn sync_counters(&mut self) {
        if self.frame.is_empty() {
            self.next_point_label = 1;
        }
        self.next_id = self.next_id.max(self.frame.max_id() + 1);
    }

    /// Installs a snapshot taken from the history.
    fn restore(&mut self, frame: Frame) {
        self.frame = frame;
        if let Some(id) = self.selected {
            if self.frame.get(id).is_none() {
                self.selected = None;
            }
        }
        self.sync_counters();
        self.pending_publish = true;
        self.needs_redraw = true;
    }

    /// Steps back one snapshot. Returns `false` at the oldest snapshot.
    pub fn undo(&mut self) -> bool {
        self.abort_in_progress();
        match self.history.undo().cloned() {
            Some(frame) => {
                self.restore(frame);
                log::debug!("Undo to snapshot {}", self.history.index());
                true
            }
            None => false,
        }
    }

    /// Steps forward one snapshot. Returns `false` at the newest snapshot.
    pub fn redo(&mut self) -> bool {
        self.abort_in_progress();
        match self.history.redo().cloned() {
            Some(frame) => {
                self.restore(frame);
                log::debug!("Redo to snapshot {}", self.history.index());
                true
            }
            None => false,
        }
    }

    /// Removes every shape and resets both counters. Undoable.
    pub fn clear_all(&mut self) {
        self.abort_in_progress();
        self.selected = None;
        if self.frame.is_empty() {
            return;
        }
        self.frame.clear();
        self.next_id = 1;
        self.next_point_label = 1;
        self.history.commit(self.frame.clone());
        self.pending_publish = true;
        self.needs_redraw = true;
        log::info!("Cleared all shapes");
    }

    /// Look up an action for the given key and modifiers.
    pub(super) fn find_action(&self, key_str: &str) -> Option<Action> {
        self.find_action_with(key_str, self.modifiers)
    }

    pub(super) fn find_action_with(&self, key_str: &str, modifiers: Modifiers) -> Option<Action> {
        for (binding, action) in &self.action_map {
            if binding.matches(key_str, modifiers.ctrl, modifiers.shift, modifiers.alt) {
                return Some(*action);
            }
        }
        None
    }

    /// Adjusts the stroke thickness for new shapes, clamped to 1-20 px.
    pub fn adjust_thickness(&mut self, delta: f64) {
        self.current_style.thickness =
            (self.current_style.thickness + delta).clamp(MIN_THICKNESS, MAX_THICKNESS);
        self.needs_redraw = true;
        log::debug!("Thickness adjusted to {:.1}px", self.current_style.thickness);
    }

    /// Adjusts the eraser radius, clamped to 1-200 px.
    pub fn adjust_eraser_radius(&mut self, delta: f64) {
        self.eraser_radius =
            (self.eraser_radius + delta).clamp(MIN_ERASER_RADIUS, MAX_ERASER_RADIUS);
        self.needs_redraw = true;
        log::debug!("Eraser radius adjusted to {:.1}px", self.eraser_radius);
    }

    pub fn set_color(&mut self, color: Color) {
        self.current_style.color = color;
        self.needs_redraw = true;
    }
}
