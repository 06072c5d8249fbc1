//! Configuration file support for scopemark.
//!
//! This module handles loading and validating user settings from the configuration file
//! located at `~/.config/scopemark/config.toml`. Settings include drawing defaults,
//! measurement thresholds, calibration, canvas resolution, undo depth and keybindings.
//!
//! If no config file exists, sensible defaults are used automatically. The engine
//! never reads this file itself: hosts call [`Config::to_engine_config`] and hand the
//! result to [`InputState`](crate::input::InputState).

pub mod enums;
pub mod keybindings;
pub mod types;

// Re-export commonly used types at module level
pub use enums::ColorSpec;
pub use keybindings::{Action, KeyBinding, KeybindingsConfig};
pub use types::{CalibrationConfig, CanvasConfig, DrawingConfig, HistoryConfig, MeasurementConfig};

use crate::calibration::Resolution;
use crate::draw::{CYAN, FontDescriptor, GREEN, Style, WHITE};
use crate::input::EngineConfig;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Font weights Pango understands by name.
const FONT_WEIGHTS: &[&str] = &[
    "thin",
    "ultralight",
    "light",
    "normal",
    "book",
    "medium",
    "semibold",
    "bold",
    "ultrabold",
    "heavy",
    "ultraheavy",
];

/// Main configuration structure containing all user settings.
///
/// This is the root configuration type that gets deserialized from the TOML file.
/// All fields have sensible defaults and will use those if not specified in the config file.
///
/// # Example TOML
/// ```toml
/// [drawing]
/// default_color = "#00ff00"
/// default_thickness = 2.0
///
/// [measurement]
/// hit_threshold = 10.0
/// eraser_radius = 15.0
///
/// [calibration]
/// factor = 0.5
///
/// [canvas]
/// resolution = "1920x1080"
///
/// [keybindings]
/// undo = ["Ctrl+Z"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default, JsonSchema)]
pub struct Config {
    /// Style of new shapes and label font
    #[serde(default)]
    pub drawing: DrawingConfig,

    /// Selection, eraser and unit settings
    #[serde(default)]
    pub measurement: MeasurementConfig,

    /// Pixel-to-micron calibration
    #[serde(default)]
    pub calibration: CalibrationConfig,

    /// Annotation surface size and zoom limits
    #[serde(default)]
    pub canvas: CanvasConfig,

    /// Undo depth
    #[serde(default)]
    pub history: HistoryConfig,

    /// Keyboard shortcuts
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
}

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    ///
    /// Invalid values are clamped to the nearest valid value (or reset to
    /// their default) and a warning is logged. Calibration factors that are
    /// not positive are dropped so measurements fall back to pixels.
    pub fn validate_and_clamp(&mut self) {
        // Thickness: 1.0 - 20.0
        if !(1.0..=20.0).contains(&self.drawing.default_thickness) {
            warn!(
                "Invalid default_thickness {:.1}, clamping to 1.0-20.0 range",
                self.drawing.default_thickness
            );
            self.drawing.default_thickness = finite_clamp(self.drawing.default_thickness, 1.0, 20.0);
        }

        // Label size: 6.0 - 72.0
        if !(6.0..=72.0).contains(&self.drawing.label_font_size) {
            warn!(
                "Invalid label_font_size {:.1}, clamping to 6.0-72.0 range",
                self.drawing.label_font_size
            );
            self.drawing.label_font_size = finite_clamp(self.drawing.label_font_size, 6.0, 72.0);
        }

        if !is_valid_font_weight(&self.drawing.label_font_weight) {
            warn!(
                "Invalid label_font_weight '{}', using 'bold'",
                self.drawing.label_font_weight
            );
            self.drawing.label_font_weight = "bold".to_string();
        }

        let defaults = Config::default();
        if !self.drawing.default_color.is_valid() {
            warn!("Invalid default_color {:?}, using default", self.drawing.default_color);
            self.drawing.default_color = defaults.drawing.default_color.clone();
        }
        if !self.drawing.default_font_color.is_valid() {
            warn!(
                "Invalid default_font_color {:?}, using default",
                self.drawing.default_font_color
            );
            self.drawing.default_font_color = defaults.drawing.default_font_color.clone();
        }
        if !self.measurement.highlight_color.is_valid() {
            warn!(
                "Invalid highlight_color {:?}, using default",
                self.measurement.highlight_color
            );
            self.measurement.highlight_color = defaults.measurement.highlight_color.clone();
        }

        // Hit threshold: 1.0 - 100.0
        if !(1.0..=100.0).contains(&self.measurement.hit_threshold) {
            warn!(
                "Invalid hit_threshold {:.1}, clamping to 1.0-100.0 range",
                self.measurement.hit_threshold
            );
            self.measurement.hit_threshold = finite_clamp(self.measurement.hit_threshold, 1.0, 100.0);
        }

        // Eraser radius: 1.0 - 200.0
        if !(1.0..=200.0).contains(&self.measurement.eraser_radius) {
            warn!(
                "Invalid eraser_radius {:.1}, clamping to 1.0-200.0 range",
                self.measurement.eraser_radius
            );
            self.measurement.eraser_radius = finite_clamp(self.measurement.eraser_radius, 1.0, 200.0);
        }

        if let Some(factor) = self.calibration.factor {
            if !is_valid_factor(factor) {
                warn!("Invalid calibration factor {}, measurements will use pixels", factor);
                self.calibration.factor = None;
            }
        }
        self.calibration.factors.retain(|magnification, factor| {
            let valid = is_valid_factor(*factor);
            if !valid {
                warn!(
                    "Invalid calibration factor {} for magnification '{}', ignoring",
                    factor, magnification
                );
            }
            valid
        });

        if let Err(err) = self.canvas.resolution.parse::<Resolution>() {
            warn!("{}, using {}", err, Resolution::default());
            self.canvas.resolution = Resolution::default().to_string();
        }

        // Zoom limits: 0.01 - 1.0 and 1.0 - 50.0
        if !(0.01..=1.0).contains(&self.canvas.min_zoom) {
            warn!(
                "Invalid min_zoom {:.2}, clamping to 0.01-1.0 range",
                self.canvas.min_zoom
            );
            self.canvas.min_zoom = finite_clamp(self.canvas.min_zoom, 0.01, 1.0);
        }
        if !(1.0..=50.0).contains(&self.canvas.max_zoom) {
            warn!(
                "Invalid max_zoom {:.2}, clamping to 1.0-50.0 range",
                self.canvas.max_zoom
            );
            self.canvas.max_zoom = finite_clamp(self.canvas.max_zoom, 1.0, 50.0);
        }
    }

    /// Surface resolution; unparseable strings yield the default.
    pub fn resolution(&self) -> Resolution {
        self.canvas.resolution.parse().unwrap_or_default()
    }

    /// Effective calibration factor.
    ///
    /// An explicit `factor` wins; otherwise the `factors` table is consulted
    /// with the configured magnification.
    pub fn calibration_factor(&self) -> Option<f64> {
        self.calibration
            .factor
            .or_else(|| {
                let magnification = self.calibration.magnification.as_ref()?;
                self.calibration.factors.get(magnification).copied()
            })
            .filter(|factor| is_valid_factor(*factor))
    }

    /// Builds the settings injected into the annotation engine.
    pub fn to_engine_config(&self) -> EngineConfig {
        let style = Style {
            color: self.drawing.default_color.to_color_or(GREEN),
            thickness: self.drawing.default_thickness,
            font_color: self.drawing.default_font_color.to_color_or(WHITE),
        };
        let label_font = FontDescriptor::new(
            self.drawing.label_font_family.clone(),
            self.drawing.label_font_weight.clone(),
            "normal".to_string(),
            self.drawing.label_font_size,
        );

        EngineConfig {
            calibration: self.calibration_factor(),
            unit_label: self.measurement.unit_label.clone(),
            resolution: self.resolution(),
            hit_threshold: self.measurement.hit_threshold,
            eraser_radius: self.measurement.eraser_radius,
            max_snapshots: self.history.max_snapshots,
            highlight_color: self.measurement.highlight_color.to_color_or(CYAN),
            label_font,
            style,
            min_zoom: self.canvas.min_zoom,
            max_zoom: self.canvas.max_zoom,
        }
    }

    /// Builds the keybinding lookup table.
    ///
    /// Conflicting or malformed bindings are logged and the defaults are used
    /// instead, so a typo never leaves the engine without shortcuts.
    pub fn action_map(&self) -> HashMap<KeyBinding, Action> {
        match self.keybindings.build_action_map() {
            Ok(map) => map,
            Err(err) => {
                warn!("Invalid keybindings ({}), using defaults", err);
                KeybindingsConfig::default()
                    .build_action_map()
                    .unwrap_or_default()
            }
        }
    }

    /// JSON schema of the configuration file, for editors and validation.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }

    /// Returns the path to the configuration file.
    ///
    /// Location: `~/.config/scopemark/config.toml`
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("scopemark");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from file, or returns defaults if not found.
    ///
    /// Attempts to read and parse the config file at `~/.config/scopemark/config.toml`.
    /// If the file doesn't exist, returns a Config with default values.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The config directory path cannot be determined
    /// - The file exists but cannot be read
    /// - The file exists but contains invalid TOML syntax
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Loads, validates and clamps the configuration at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        config.validate_and_clamp();

        info!("Loaded config from {}", path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Saves the current configuration to `~/.config/scopemark/config.toml`.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created, the config cannot be
    /// serialized, or the file cannot be written.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    /// Serializes the configuration to TOML at `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let config_str = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, config_str)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Creates a default configuration file with documentation comments.
    ///
    /// Writes the example config from `config.example.toml` to the user's config directory.
    ///
    /// # Errors
    /// Returns an error if a config file already exists at the target path, or if
    /// the directory or file cannot be written.
    pub fn create_default_file() -> Result<PathBuf> {
        let config_path = Self::get_config_path()?;

        if config_path.exists() {
            return Err(anyhow::anyhow!(
                "Config file already exists at {}",
                config_path.display()
            ));
        }

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&config_path, EXAMPLE_CONFIG)?;

        info!("Created default config at {}", config_path.display());
        Ok(config_path)
    }
}

/// Documented example configuration shipped with the binary.
pub const EXAMPLE_CONFIG: &str = include_str!("../../config.example.toml");

fn is_valid_factor(factor: f64) -> bool {
    factor.is_finite() && factor > 0.0
}

fn is_valid_font_weight(weight: &str) -> bool {
    match weight.trim().parse::<u32>() {
        Ok(numeric) => (100..=900).contains(&numeric),
        Err(_) => FONT_WEIGHTS.contains(&weight.trim().to_ascii_lowercase().as_str()),
    }
}

/// Clamp that also maps NaN to the lower bound.
fn finite_clamp(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::color::{RED, YELLOW};
    use tempfile::TempDir;

    fn parse(toml_str: &str) -> Config {
        let mut config: Config = toml::from_str(toml_str).unwrap();
        config.validate_and_clamp();
        config
    }

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse("");
        assert_eq!(config, Config::default());
        assert_eq!(config.resolution(), Resolution::default());
        assert_eq!(config.calibration_factor(), None);
    }

    #[test]
    fn example_config_matches_defaults() {
        let mut config: Config = toml::from_str(EXAMPLE_CONFIG).unwrap();
        config.validate_and_clamp();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let config = parse(
            r#"
            [drawing]
            default_thickness = 50.0
            label_font_size = 2.0
            label_font_weight = "extra-chunky"

            [measurement]
            hit_threshold = 0.0
            eraser_radius = 500.0

            [canvas]
            min_zoom = 0.0
            max_zoom = 100.0
            "#,
        );

        assert_eq!(config.drawing.default_thickness, 20.0);
        assert_eq!(config.drawing.label_font_size, 6.0);
        assert_eq!(config.drawing.label_font_weight, "bold");
        assert_eq!(config.measurement.hit_threshold, 1.0);
        assert_eq!(config.measurement.eraser_radius, 200.0);
        assert_eq!(config.canvas.min_zoom, 0.01);
        assert_eq!(config.canvas.max_zoom, 50.0);
    }

    #[test]
    fn numeric_font_weights_are_accepted() {
        let config = parse("[drawing]\nlabel_font_weight = \"600\"");
        assert_eq!(config.drawing.label_font_weight, "600");
    }

    #[test]
    fn invalid_colors_reset_to_defaults() {
        let config = parse(
            r#"
            [drawing]
            default_color = "not-a-color"
            default_font_color = [255, 255, 0]
            "#,
        );
        assert_eq!(config.drawing.default_color, ColorSpec::from("#00ff00"));
        let engine = config.to_engine_config();
        assert_eq!(engine.style.color, GREEN);
        assert_eq!(engine.style.font_color, YELLOW);
    }

    #[test]
    fn non_positive_factor_is_dropped() {
        let config = parse("[calibration]\nfactor = -2.0");
        assert_eq!(config.calibration.factor, None);
        assert_eq!(config.to_engine_config().calibration, None);
    }

    #[test]
    fn factor_is_looked_up_by_magnification() {
        let config = parse(
            r#"
            [calibration]
            magnification = "40x"

            [calibration.factors]
            "10x" = 0.65
            "40x" = 2.6
            "100x" = 0.0
            "#,
        );
        assert_eq!(config.calibration_factor(), Some(2.6));
        assert!(!config.calibration.factors.contains_key("100x"));
    }

    #[test]
    fn explicit_factor_wins_over_table() {
        let config = parse(
            r#"
            [calibration]
            factor = 2.0
            magnification = "10x"
            factors = { "10x" = 0.65 }
            "#,
        );
        assert_eq!(config.calibration_factor(), Some(2.0));
    }

    #[test]
    fn invalid_resolution_falls_back() {
        let config = parse("[canvas]\nresolution = \"wide\"");
        assert_eq!(config.canvas.resolution, "1920x1080");

        let config = parse("[canvas]\nresolution = \"640x480\"");
        assert_eq!(
            config.resolution(),
            Resolution {
                width: 640,
                height: 480
            }
        );
    }

    #[test]
    fn engine_config_carries_every_section() {
        let config = parse(
            r#"
            [drawing]
            default_color = "red"
            default_thickness = 4.0
            label_font_family = "Monospace"
            label_font_size = 18.0

            [measurement]
            hit_threshold = 6.0
            eraser_radius = 25.0
            unit_label = "um"

            [calibration]
            factor = 0.5

            [canvas]
            resolution = "800x600"

            [history]
            max_snapshots = 0
            "#,
        );
        let engine = config.to_engine_config();

        assert_eq!(engine.style.color, RED);
        assert_eq!(engine.style.thickness, 4.0);
        assert_eq!(engine.label_font.family, "Monospace");
        assert_eq!(engine.label_font.size_px, 18.0);
        assert_eq!(engine.hit_threshold, 6.0);
        assert_eq!(engine.eraser_radius, 25.0);
        assert_eq!(engine.calibration, Some(0.5));
        assert_eq!(engine.units().format_length(100.0), "200 um");
        assert_eq!(engine.resolution.width, 800);
        assert_eq!(engine.max_snapshots, 0);
        assert_eq!(engine.highlight_color, CYAN);
    }

    #[test]
    fn conflicting_keybindings_fall_back_to_defaults() {
        let config = parse(
            r#"
            [keybindings]
            undo = ["Ctrl+Z"]
            redo = ["Ctrl+Z"]
            "#,
        );
        assert!(config.keybindings.build_action_map().is_err());

        let map = config.action_map();
        let undo = KeyBinding::parse("Ctrl+Z").unwrap();
        let redo = KeyBinding::parse("Ctrl+Y").unwrap();
        assert_eq!(map.get(&undo), Some(&Action::Undo));
        assert_eq!(map.get(&redo), Some(&Action::Redo));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.calibration.factor = Some(1.25);
        config.keybindings.undo = vec!["Ctrl+U".to_string()];
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[drawing\ndefault_thickness = 2").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config"));
    }

    #[test]
    fn schema_lists_every_section() {
        let schema = serde_json::to_value(Config::json_schema()).unwrap();
        let properties = schema["properties"].as_object().unwrap();
        for section in [
            "drawing",
            "measurement",
            "calibration",
            "canvas",
            "history",
            "keybindings",
        ] {
            assert!(properties.contains_key(section), "missing {section}");
        }
    }
}
