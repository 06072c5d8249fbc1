use crate::config::Action;
use crate::draw::ShapeKind;
use crate::input::{events::Key, modifiers::Modifiers};

use super::{DrawingState, InputState};

/// Thickness change per keypress.
const THICKNESS_STEP: f64 = 1.0;
/// Eraser radius change per keypress.
const ERASER_RADIUS_STEP: f64 = 5.0;

impl InputState {
    /// Processes a key press event.
    ///
    /// Handles modifier tracking, the text entry buffer while a text box is
    /// open, and configurable actions (undo/redo, clearing, tool selection,
    /// thickness, eraser radius, zoom).
    pub fn on_key_press(&mut self, key: Key) {
        match key {
            Key::Shift => {
                self.modifiers.shift = true;
                return;
            }
            Key::Ctrl => {
                self.modifiers.ctrl = true;
                return;
            }
            Key::Alt => {
                self.modifiers.alt = true;
                return;
            }
            _ => {}
        }

        if matches!(self.state, DrawingState::TextInput { .. }) {
            self.on_text_key(key);
            return;
        }

        if let Some(action) = self.action_for_key(key) {
            self.handle_action(action);
        }
    }

    /// Processes a key release event.
    pub fn on_key_release(&mut self, key: Key) {
        match key {
            Key::Shift => self.modifiers.shift = false,
            Key::Ctrl => self.modifiers.ctrl = false,
            Key::Alt => self.modifiers.alt = false,
            _ => {}
        }
    }

    /// Resolves a key to an action under the current modifiers.
    ///
    /// Symbols typed with Shift (e.g. `+`) also match bindings written
    /// without it.
    fn action_for_key(&self, key: Key) -> Option<Action> {
        let name = key.binding_name()?;
        if let Some(action) = self.find_action(&name) {
            return Some(action);
        }
        match key {
            Key::Char(c) if self.modifiers.shift && !c.is_alphanumeric() => {
                let unshifted = Modifiers {
                    shift: false,
                    ..self.modifiers
                };
                self.find_action_with(&name, unshifted)
            }
            _ => None,
        }
    }

    fn on_text_key(&mut self, key: Key) {
        // Only modified keys reach actions so plain letters can be typed
        if self.modifiers.ctrl || self.modifiers.alt {
            if let Some(action) = self.action_for_key(key) {
                self.handle_action(action);
                return;
            }
        }

        match key {
            Key::Escape => self.abort_in_progress(),
            Key::Return => self.commit_text(),
            Key::Backspace => self.edit_text(|buffer| {
                buffer.pop();
            }),
            Key::Space => self.edit_text(|buffer| buffer.push(' ')),
            Key::Char(c) if !self.modifiers.ctrl && !self.modifiers.alt => {
                self.edit_text(|buffer| buffer.push(c))
            }
            _ => {}
        }
    }

    fn edit_text(&mut self, edit: impl FnOnce(&mut String)) {
        if let DrawingState::TextInput { buffer, .. } = &mut self.state {
            edit(buffer);
            self.needs_redraw = true;
        }
    }

    /// Commits the text entry; empty content is discarded.
    fn commit_text(&mut self) {
        let previous = std::mem::replace(&mut self.state, DrawingState::Idle);
        if let DrawingState::TextInput { position, buffer } = previous {
            if buffer.trim().is_empty() {
                log::debug!("Discarded empty text entry");
            } else {
                self.commit_shape(ShapeKind::Text {
                    position,
                    content: buffer,
                });
            }
        }
        self.needs_redraw = true;
    }

    /// Executes a bound action.
    pub fn handle_action(&mut self, action: Action) {
        if let Some(tool) = action.tool() {
            self.set_tool(tool);
            return;
        }

        match action {
            Action::Cancel => {
                if matches!(self.state, DrawingState::Idle) {
                    if self.selected.take().is_some() {
                        self.needs_redraw = true;
                    }
                } else {
                    self.abort_in_progress();
                }
            }
            Action::Undo => {
                if !self.undo() {
                    log::debug!("Nothing to undo");
                }
            }
            Action::Redo => {
                if !self.redo() {
                    log::debug!("Nothing to redo");
                }
            }
            Action::ClearAll => self.clear_all(),
            Action::IncreaseThickness => self.adjust_thickness(THICKNESS_STEP),
            Action::DecreaseThickness => self.adjust_thickness(-THICKNESS_STEP),
            Action::IncreaseEraserRadius => self.adjust_eraser_radius(ERASER_RADIUS_STEP),
            Action::DecreaseEraserRadius => self.adjust_eraser_radius(-ERASER_RADIUS_STEP),
            Action::ZoomIn => {
                self.viewport.zoom_by_wheel(-1.0);
                self.needs_redraw = true;
            }
            Action::ZoomOut => {
                self.viewport.zoom_by_wheel(1.0);
                self.needs_redraw = true;
            }
            Action::ResetZoom => {
                self.viewport.reset_zoom();
                self.needs_redraw = true;
            }
            _ => {}
        }
    }
}
