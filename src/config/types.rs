//! Configuration type definitions.

use super::enums::ColorSpec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Drawing-related settings.
///
/// Controls the style applied to new shapes and the font used for
/// measurement labels. Thickness can be changed at runtime with keybindings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DrawingConfig {
    /// Stroke color for new shapes - a color name, a CSS string like
    /// `"#00ff00"`, or an RGB array like `[0, 255, 0]`
    #[serde(default = "default_color")]
    pub default_color: ColorSpec,

    /// Color of measurement labels and text annotations
    #[serde(default = "default_font_color")]
    pub default_font_color: ColorSpec,

    /// Stroke thickness in surface pixels (valid range: 1.0 - 20.0)
    #[serde(default = "default_thickness")]
    pub default_thickness: f64,

    /// Font family for labels (e.g., "Sans", "Monospace")
    #[serde(default = "default_label_font_family")]
    pub label_font_family: String,

    /// Label size in surface pixels (valid range: 6.0 - 72.0)
    #[serde(default = "default_label_font_size")]
    pub label_font_size: f64,

    /// Font weight (e.g., "normal", "bold", "light", or 100-900)
    #[serde(default = "default_label_font_weight")]
    pub label_font_weight: String,
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            default_color: default_color(),
            default_font_color: default_font_color(),
            default_thickness: default_thickness(),
            label_font_family: default_label_font_family(),
            label_font_size: default_label_font_size(),
            label_font_weight: default_label_font_weight(),
        }
    }
}

/// Selection, erasing and labeling settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MeasurementConfig {
    /// Pointer distance in surface pixels within which a shape is picked
    /// (valid range: 1.0 - 100.0)
    #[serde(default = "default_hit_threshold")]
    pub hit_threshold: f64,

    /// Initial eraser radius in surface pixels (valid range: 1.0 - 200.0)
    #[serde(default = "default_eraser_radius")]
    pub eraser_radius: f64,

    /// Outline drawn around the selected shape
    #[serde(default = "default_highlight_color")]
    pub highlight_color: ColorSpec,

    /// Suffix for calibrated lengths; areas use the same label squared
    #[serde(default = "default_unit_label")]
    pub unit_label: String,
}

impl Default for MeasurementConfig {
    fn default() -> Self {
        Self {
            hit_threshold: default_hit_threshold(),
            eraser_radius: default_eraser_radius(),
            highlight_color: default_highlight_color(),
            unit_label: default_unit_label(),
        }
    }
}

/// Pixel-to-micron calibration.
///
/// An explicit `factor` wins. Otherwise the factor is looked up in
/// `factors` by `magnification`. Without either, measurements are shown in
/// pixels.
///
/// # Example TOML
/// ```toml
/// [calibration]
/// magnification = "40x"
///
/// [calibration.factors]
/// "10x" = 0.65
/// "40x" = 2.6
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct CalibrationConfig {
    /// Microns per pixel; lengths are shown as pixels divided by this (must be > 0)
    #[serde(default)]
    pub factor: Option<f64>,

    /// Current objective, used as the key into `factors`
    #[serde(default)]
    pub magnification: Option<String>,

    /// Known factors per magnification
    #[serde(default)]
    pub factors: BTreeMap<String, f64>,
}

/// Annotation surface settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CanvasConfig {
    /// Backing-store size as `"<width>x<height>"`, matching the camera
    #[serde(default = "default_resolution")]
    pub resolution: String,

    /// Smallest zoom factor (valid range: 0.01 - 1.0)
    #[serde(default = "default_min_zoom")]
    pub min_zoom: f64,

    /// Largest zoom factor (valid range: 1.0 - 50.0)
    #[serde(default = "default_max_zoom")]
    pub max_zoom: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            resolution: default_resolution(),
            min_zoom: default_min_zoom(),
            max_zoom: default_max_zoom(),
        }
    }
}

/// Undo history settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HistoryConfig {
    /// Snapshots kept for undo (0 = unbounded)
    #[serde(default = "default_max_snapshots")]
    pub max_snapshots: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_snapshots: default_max_snapshots(),
        }
    }
}

fn default_color() -> ColorSpec {
    ColorSpec::Name("#00ff00".to_string())
}

fn default_font_color() -> ColorSpec {
    ColorSpec::Name("#ffffff".to_string())
}

fn default_thickness() -> f64 {
    2.0
}

fn default_label_font_family() -> String {
    "Sans".to_string()
}

fn default_label_font_size() -> f64 {
    14.0
}

fn default_label_font_weight() -> String {
    "bold".to_string()
}

fn default_hit_threshold() -> f64 {
    10.0
}

fn default_eraser_radius() -> f64 {
    15.0
}

fn default_highlight_color() -> ColorSpec {
    ColorSpec::Name("#00ffff".to_string())
}

fn default_unit_label() -> String {
    "µm".to_string()
}

fn default_resolution() -> String {
    "1920x1080".to_string()
}

fn default_min_zoom() -> f64 {
    0.1
}

fn default_max_zoom() -> f64 {
    5.0
}

fn default_max_snapshots() -> usize {
    200
}
