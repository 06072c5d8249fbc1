//! Configuration enum types.

use crate::draw::Color;
use log::warn;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Color specification - a named/CSS color string or RGB values.
///
/// # Examples
/// ```toml
/// # Named color
/// default_color = "green"
///
/// # CSS notation
/// highlight_color = "#00ffff"
/// default_color = "rgba(255, 0, 0, 0.5)"
///
/// # Custom RGB color (0-255 per component)
/// default_color = [255, 128, 0]  # Orange
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
#[serde(untagged)]
pub enum ColorSpec {
    /// Color name (red, green, blue, yellow, cyan, white, black) or a
    /// `#rrggbb`, `#rrggbbaa`, `rgb(..)`, `rgba(..)` string
    Name(String),
    /// RGB color as [red, green, blue] where each component is 0-255
    Rgb([u8; 3]),
}

impl ColorSpec {
    /// Converts the color specification to a [`Color`].
    ///
    /// Unparseable strings log a warning and yield `fallback`.
    pub fn to_color_or(&self, fallback: Color) -> Color {
        match self {
            ColorSpec::Name(name) => name.parse().unwrap_or_else(|_| {
                warn!("Unknown color '{}', using {}", name, fallback);
                fallback
            }),
            ColorSpec::Rgb([r, g, b]) => Color::from_rgb8(*r, *g, *b),
        }
    }

    /// Whether the parser understands this color.
    pub fn is_valid(&self) -> bool {
        match self {
            ColorSpec::Name(name) => name.parse::<Color>().is_ok(),
            ColorSpec::Rgb(_) => true,
        }
    }
}

impl From<&str> for ColorSpec {
    fn from(value: &str) -> Self {
        ColorSpec::Name(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::color::{CYAN, GREEN, RED};

    #[test]
    fn names_and_css_strings_resolve() {
        assert_eq!(ColorSpec::from("green").to_color_or(RED), GREEN);
        assert_eq!(ColorSpec::from("#00ffff").to_color_or(RED), CYAN);
        let translucent = ColorSpec::from("rgba(255, 0, 0, 0.5)").to_color_or(GREEN);
        assert_eq!(translucent, RED.with_alpha(0.5));
    }

    #[test]
    fn rgb_arrays_are_opaque() {
        let color = ColorSpec::Rgb([255, 0, 0]).to_color_or(GREEN);
        assert_eq!(color, RED);
    }

    #[test]
    fn unknown_names_use_the_fallback() {
        let spec = ColorSpec::from("chartreuse-ish");
        assert!(!spec.is_valid());
        assert_eq!(spec.to_color_or(CYAN), CYAN);
    }

    #[test]
    fn toml_accepts_both_forms() {
        #[derive(Deserialize)]
        struct Doc {
            a: ColorSpec,
            b: ColorSpec,
        }
        let doc: Doc = toml::from_str("a = \"#ff0000\"\nb = [0, 255, 0]").unwrap();
        assert_eq!(doc.a, ColorSpec::from("#ff0000"));
        assert_eq!(doc.b, ColorSpec::Rgb([0, 255, 0]));
    }
}
