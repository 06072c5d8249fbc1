use crate::geometry::Point;
use crate::input::events::MouseButton;

use super::{DrawingState, InputState};

impl InputState {
    /// Processes a mouse button press at host coordinates.
    ///
    /// # Behavior
    /// - Left click: forwarded to the active tool
    /// - Right click: cancels the in-progress shape or text entry
    pub fn on_mouse_press(&mut self, button: MouseButton, x: f64, y: f64) {
        let p = self.track_pointer(x, y);
        match button {
            MouseButton::Left => {
                let transition = self.active_tool.behavior().on_pointer_down(&self.state, p);
                self.apply(transition);
            }
            MouseButton::Right => {
                if !matches!(self.state, DrawingState::Idle) {
                    self.abort_in_progress();
                }
            }
            MouseButton::Middle => {}
        }
    }

    /// Processes pointer motion at host coordinates.
    ///
    /// Drives drag and multi-point previews, shape moves, and eraser strokes
    /// (queued until the next frame callback).
    pub fn on_mouse_motion(&mut self, x: f64, y: f64) {
        let p = self.track_pointer(x, y);
        let transition = self.active_tool.behavior().on_pointer_move(&self.state, p);
        self.apply(transition);
    }

    /// Processes a mouse button release at host coordinates.
    pub fn on_mouse_release(&mut self, button: MouseButton, x: f64, y: f64) {
        if button != MouseButton::Left {
            return;
        }
        let p = self.track_pointer(x, y);
        let transition = self.active_tool.behavior().on_pointer_up(&self.state, p);
        self.apply(transition);
    }

    /// Processes a double click; finishes multi-point shapes.
    ///
    /// Hosts deliver the two presses of the double click first.
    pub fn on_double_click(&mut self, x: f64, y: f64) {
        let p = self.track_pointer(x, y);
        let transition = self.active_tool.behavior().on_double_click(&self.state, p);
        self.apply(transition);
    }

    /// Wheel input: zooms while Ctrl is held. Returns `true` when consumed.
    pub fn on_scroll(&mut self, delta_y: f64) -> bool {
        if !self.modifiers.ctrl {
            return false;
        }
        let before = self.viewport.zoom();
        let after = self.viewport.zoom_by_wheel(delta_y);
        if after != before {
            self.needs_redraw = true;
            log::debug!("Zoom {:.2} -> {:.2}", before, after);
        }
        true
    }

    /// Pointer left the surface; hides the eraser cursor.
    pub fn on_pointer_leave(&mut self) {
        if self.cursor.take().is_some() {
            self.needs_redraw = true;
        }
    }

    fn track_pointer(&mut self, x: f64, y: f64) -> Point {
        let p = self.viewport.to_surface(Point::new(x, y));
        self.cursor = Some(p);
        if self.active_tool == crate::input::Tool::Eraser {
            self.needs_redraw = true;
        }
        p
    }
}
