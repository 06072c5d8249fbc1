//! Keybinding configuration types and parsing.
//!
//! Every engine shortcut (undo/redo, clearing, tool selection, thickness,
//! eraser radius and zoom) is configurable from the `[keybindings]` table.

use crate::input::Tool;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// All possible actions that can be bound to keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Abort the in-progress shape or text entry
    Cancel,

    // History
    Undo,
    Redo,
    ClearAll,

    // Stroke and eraser size
    IncreaseThickness,
    DecreaseThickness,
    IncreaseEraserRadius,
    DecreaseEraserRadius,

    // Zoom
    ZoomIn,
    ZoomOut,
    ResetZoom,

    // Tool selection
    SelectPointer,
    SelectMove,
    SelectPoint,
    SelectLine,
    SelectRectangle,
    SelectCircle,
    SelectArc,
    SelectCurve,
    SelectClosedCurve,
    SelectEraser,
    SelectArrow,
    SelectTextbox,
    SelectAngle,
}

impl Action {
    /// Tool chosen by a tool-selection action.
    pub fn tool(self) -> Option<Tool> {
        let tool = match self {
            Action::SelectPointer => Tool::Pointer,
            Action::SelectMove => Tool::Move,
            Action::SelectPoint => Tool::Point,
            Action::SelectLine => Tool::Line,
            Action::SelectRectangle => Tool::Rectangle,
            Action::SelectCircle => Tool::Circle,
            Action::SelectArc => Tool::Arc,
            Action::SelectCurve => Tool::Curve,
            Action::SelectClosedCurve => Tool::ClosedCurve,
            Action::SelectEraser => Tool::Eraser,
            Action::SelectArrow => Tool::Arrow,
            Action::SelectTextbox => Tool::Textbox,
            Action::SelectAngle => Tool::Angle,
            _ => return None,
        };
        Some(tool)
    }
}

/// A single keybinding: a key with optional modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub key: String,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyBinding {
    /// Parse a keybinding string like "Ctrl+Shift+Z" or "Escape".
    /// Modifiers can appear in any order and spaces around '+' are allowed.
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if s.is_empty() {
            return Err("Empty keybinding string".to_string());
        }

        let normalized = s.replace(" + ", "+").replace("+ ", "+").replace(" +", "+");

        let mut ctrl = false;
        let mut shift = false;
        let mut alt = false;
        let mut key_parts = Vec::new();

        for part in normalized.split('+') {
            match part.to_lowercase().as_str() {
                "ctrl" | "control" => ctrl = true,
                "shift" => shift = true,
                "alt" => alt = true,
                _ => key_parts.push(part),
            }
        }

        if key_parts.is_empty() {
            return Err(format!("No key specified in: {}", s));
        }

        // "Ctrl++" splits into empty parts after the modifiers; the key is '+'
        let key = key_parts.join("+");
        let key = if key.chars().all(|c| c == '+') {
            "+".to_string()
        } else {
            key
        };

        Ok(Self {
            key,
            ctrl,
            shift,
            alt,
        })
    }

    /// Check if this keybinding matches the current input state.
    pub fn matches(&self, key: &str, ctrl: bool, shift: bool, alt: bool) -> bool {
        self.key.eq_ignore_ascii_case(key)
            && self.ctrl == ctrl
            && self.shift == shift
            && self.alt == alt
    }
}

/// Configuration for all keybindings.
///
/// Each action can have multiple keybindings:
/// ```toml
/// [keybindings]
/// undo = ["Ctrl+Z"]
/// redo = ["Ctrl+Y", "Ctrl+Shift+Z"]
/// select_circle = ["C"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct KeybindingsConfig {
    pub cancel: Vec<String>,
    pub undo: Vec<String>,
    pub redo: Vec<String>,
    pub clear_all: Vec<String>,
    pub increase_thickness: Vec<String>,
    pub decrease_thickness: Vec<String>,
    pub increase_eraser_radius: Vec<String>,
    pub decrease_eraser_radius: Vec<String>,
    pub zoom_in: Vec<String>,
    pub zoom_out: Vec<String>,
    pub reset_zoom: Vec<String>,
    pub select_pointer: Vec<String>,
    pub select_move: Vec<String>,
    pub select_point: Vec<String>,
    pub select_line: Vec<String>,
    pub select_rectangle: Vec<String>,
    pub select_circle: Vec<String>,
    pub select_arc: Vec<String>,
    pub select_curve: Vec<String>,
    pub select_closed_curve: Vec<String>,
    pub select_eraser: Vec<String>,
    pub select_arrow: Vec<String>,
    pub select_textbox: Vec<String>,
    pub select_angle: Vec<String>,
}

fn keys(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for KeybindingsConfig {
    fn default() -> Self {
        Self {
            cancel: keys(&["Escape"]),
            undo: keys(&["Ctrl+Z"]),
            redo: keys(&["Ctrl+Y", "Ctrl+Shift+Z"]),
            clear_all: keys(&["Delete"]),
            increase_thickness: keys(&["+", "="]),
            decrease_thickness: keys(&["-", "_"]),
            increase_eraser_radius: keys(&["]"]),
            decrease_eraser_radius: keys(&["["]),
            zoom_in: keys(&["Ctrl+=", "Ctrl+Shift++"]),
            zoom_out: keys(&["Ctrl+-"]),
            reset_zoom: keys(&["Ctrl+0"]),
            select_pointer: keys(&["V"]),
            select_move: keys(&["M"]),
            select_point: keys(&["P"]),
            select_line: keys(&["L"]),
            select_rectangle: keys(&["R"]),
            select_circle: keys(&["C"]),
            select_arc: keys(&["A"]),
            select_curve: keys(&["F"]),
            select_closed_curve: keys(&["Shift+F"]),
            select_eraser: keys(&["E"]),
            select_arrow: keys(&["Shift+L"]),
            select_textbox: keys(&["T"]),
            select_angle: keys(&["G"]),
        }
    }
}

impl KeybindingsConfig {
    /// Build a lookup map from keybindings to actions for efficient matching.
    /// Returns an error if any keybinding string is invalid or if duplicates are detected.
    pub fn build_action_map(&self) -> Result<HashMap<KeyBinding, Action>, String> {
        let table: [(&[String], Action); 24] = [
            (&self.cancel, Action::Cancel),
            (&self.undo, Action::Undo),
            (&self.redo, Action::Redo),
            (&self.clear_all, Action::ClearAll),
            (&self.increase_thickness, Action::IncreaseThickness),
            (&self.decrease_thickness, Action::DecreaseThickness),
            (&self.increase_eraser_radius, Action::IncreaseEraserRadius),
            (&self.decrease_eraser_radius, Action::DecreaseEraserRadius),
            (&self.zoom_in, Action::ZoomIn),
            (&self.zoom_out, Action::ZoomOut),
            (&self.reset_zoom, Action::ResetZoom),
            (&self.select_pointer, Action::SelectPointer),
            (&self.select_move, Action::SelectMove),
            (&self.select_point, Action::SelectPoint),
            (&self.select_line, Action::SelectLine),
            (&self.select_rectangle, Action::SelectRectangle),
            (&self.select_circle, Action::SelectCircle),
            (&self.select_arc, Action::SelectArc),
            (&self.select_curve, Action::SelectCurve),
            (&self.select_closed_curve, Action::SelectClosedCurve),
            (&self.select_eraser, Action::SelectEraser),
            (&self.select_arrow, Action::SelectArrow),
            (&self.select_textbox, Action::SelectTextbox),
            (&self.select_angle, Action::SelectAngle),
        ];

        let mut map = HashMap::new();
        for (bindings, action) in table {
            for binding_str in bindings {
                let binding = KeyBinding::parse(binding_str)?;
                if let Some(existing) = map.insert(binding, action) {
                    return Err(format!(
                        "Duplicate keybinding '{}' assigned to both {:?} and {:?}",
                        binding_str, existing, action
                    ));
                }
            }
        }

        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_key() {
        let binding = KeyBinding::parse("Escape").unwrap();
        assert_eq!(binding.key, "Escape");
        assert!(!binding.ctrl);
        assert!(!binding.shift);
        assert!(!binding.alt);
    }

    #[test]
    fn test_parse_ctrl_shift_key() {
        let binding = KeyBinding::parse("Ctrl+Shift+Z").unwrap();
        assert_eq!(binding.key, "Z");
        assert!(binding.ctrl);
        assert!(binding.shift);
        assert!(!binding.alt);
    }

    #[test]
    fn test_parse_plus_key() {
        let binding = KeyBinding::parse("Ctrl+Shift++").unwrap();
        assert_eq!(binding.key, "+");
        assert!(binding.ctrl && binding.shift);

        let plain = KeyBinding::parse("+").unwrap();
        assert_eq!(plain.key, "+");
        assert!(!plain.ctrl);
    }

    #[test]
    fn test_parse_with_spaces_and_any_order() {
        let a = KeyBinding::parse("Ctrl + Shift + Z").unwrap();
        let b = KeyBinding::parse("Shift+Ctrl+Z").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_rejects_modifiers_only() {
        assert!(KeyBinding::parse("Ctrl+Shift").is_err());
        assert!(KeyBinding::parse("  ").is_err());
    }

    #[test]
    fn test_matches() {
        let binding = KeyBinding::parse("Ctrl+Shift+Z").unwrap();
        assert!(binding.matches("Z", true, true, false));
        assert!(binding.matches("z", true, true, false));
        assert!(!binding.matches("Z", false, true, false));
        assert!(!binding.matches("Z", true, false, false));
    }

    #[test]
    fn test_build_action_map() {
        let map = KeybindingsConfig::default().build_action_map().unwrap();

        let ctrl_z = KeyBinding::parse("Ctrl+Z").unwrap();
        assert_eq!(map.get(&ctrl_z), Some(&Action::Undo));
        let ctrl_shift_z = KeyBinding::parse("Ctrl+Shift+Z").unwrap();
        assert_eq!(map.get(&ctrl_shift_z), Some(&Action::Redo));
        let delete = KeyBinding::parse("Delete").unwrap();
        assert_eq!(map.get(&delete), Some(&Action::ClearAll));
    }

    #[test]
    fn test_every_tool_has_a_default_binding() {
        let map = KeybindingsConfig::default().build_action_map().unwrap();
        for tool in Tool::ALL {
            assert!(
                map.values().any(|action| action.tool() == Some(tool)),
                "no binding selects {tool}"
            );
        }
    }

    #[test]
    fn test_duplicate_keybinding_detection() {
        let config = KeybindingsConfig {
            cancel: vec!["Ctrl+Z".to_string()],
            ..KeybindingsConfig::default()
        };

        let err = config.build_action_map().unwrap_err();
        assert!(err.contains("Duplicate keybinding"));
        assert!(err.contains("Ctrl+Z"));
    }

    #[test]
    fn test_duplicate_with_different_modifier_order() {
        let config = KeybindingsConfig {
            select_arrow: vec!["Shift+Ctrl+Z".to_string()],
            ..KeybindingsConfig::default()
        };
        assert!(config.build_action_map().is_err());
    }
}
