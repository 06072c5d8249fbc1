//! RGBA color type and predefined color constants.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Represents an RGBA color with floating-point components.
///
/// All components are in the range 0.0 (minimum) to 1.0 (maximum).
/// Colors serialize as CSS-style strings (`#rrggbb` or `#rrggbbaa`) so shape
/// sets stay readable and interchangeable with browser front-ends.
///
/// # Examples
///
/// ```
/// use scopemark::draw::Color;
/// let green: Color = "#00ff00".parse().unwrap();
/// assert_eq!(green, Color { r: 0.0, g: 1.0, b: 0.0, a: 1.0 });
/// let translucent: Color = "rgba(255, 0, 0, 0.5)".parse().unwrap();
/// assert_eq!(translucent.a, 0.5);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    /// Red component (0.0 = no red, 1.0 = full red)
    pub r: f64,
    /// Green component (0.0 = no green, 1.0 = full green)
    pub g: f64,
    /// Blue component (0.0 = no blue, 1.0 = full blue)
    pub b: f64,
    /// Alpha/transparency (0.0 = fully transparent, 1.0 = fully opaque)
    pub a: f64,
}

/// Failure to interpret a color string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized color '{0}'")]
pub struct ColorParseError(pub String);

impl Color {
    /// Creates a new color from RGBA components.
    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color from 8-bit channels.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0, 1.0)
    }

    /// Returns the same color with a different alpha.
    pub fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }

    /// Formats as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        let (r, g, b, a) = (
            channel(self.r),
            channel(self.g),
            channel(self.b),
            channel(self.a),
        );
        if a == 255 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }

    /// Applies this color as the cairo source.
    pub fn set_source(&self, ctx: &cairo::Context) {
        ctx.set_source_rgba(self.r, self.g, self.b, self.a);
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        let digits = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 | 4 => {
                let mut channels = hex
                    .chars()
                    .map(|c| u8::from_str_radix(&c.to_string(), 16).ok().map(|v| v * 17));
                let r = channels.next()??;
                let g = channels.next()??;
                let b = channels.next()??;
                let a = channels.next().unwrap_or(Some(255))?;
                Some(Self::from_rgb8(r, g, b).with_alpha(a as f64 / 255.0))
            }
            6 | 8 => {
                let r = digits(hex.get(0..2)?)?;
                let g = digits(hex.get(2..4)?)?;
                let b = digits(hex.get(4..6)?)?;
                let a = match hex.get(6..8) {
                    Some(a) => digits(a)?,
                    None => 255,
                };
                Some(Self::from_rgb8(r, g, b).with_alpha(a as f64 / 255.0))
            }
            _ => None,
        }
    }

    fn parse_functional(s: &str) -> Option<Self> {
        let (name, rest) = s.split_once('(')?;
        let body = rest.strip_suffix(')')?;
        let parts: Vec<f64> = body
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .ok()?;
        let channel = |v: f64| (v / 255.0).clamp(0.0, 1.0);
        match (name.trim(), parts.as_slice()) {
            ("rgb", [r, g, b]) => Some(Self::new(channel(*r), channel(*g), channel(*b), 1.0)),
            ("rgba", [r, g, b, a]) => Some(Self::new(
                channel(*r),
                channel(*g),
                channel(*b),
                a.clamp(0.0, 1.0),
            )),
            _ => None,
        }
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    /// Accepts `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(r,g,b)`,
    /// `rgba(r,g,b,a)` and the predefined color names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parsed = if let Some(hex) = trimmed.strip_prefix('#') {
            Self::parse_hex(hex)
        } else if trimmed.contains('(') {
            Self::parse_functional(&trimmed.to_ascii_lowercase())
        } else {
            crate::util::name_to_color(trimmed)
        };
        parsed.ok_or_else(|| ColorParseError(s.to_string()))
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ============================================================================
// Predefined Color Constants
// ============================================================================

/// Predefined red color (R=1.0, G=0.0, B=0.0)
pub const RED: Color = Color {
    r: 1.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

/// Predefined green color (R=0.0, G=1.0, B=0.0), the default stroke color
pub const GREEN: Color = Color {
    r: 0.0,
    g: 1.0,
    b: 0.0,
    a: 1.0,
};

/// Predefined blue color (R=0.0, G=0.0, B=1.0)
pub const BLUE: Color = Color {
    r: 0.0,
    g: 0.0,
    b: 1.0,
    a: 1.0,
};

/// Predefined yellow color (R=1.0, G=1.0, B=0.0)
pub const YELLOW: Color = Color {
    r: 1.0,
    g: 1.0,
    b: 0.0,
    a: 1.0,
};

/// Predefined cyan color (R=0.0, G=1.0, B=1.0), used for selection outlines
pub const CYAN: Color = Color {
    r: 0.0,
    g: 1.0,
    b: 1.0,
    a: 1.0,
};

/// Predefined white color (R=1.0, G=1.0, B=1.0), the default label color
pub const WHITE: Color = Color {
    r: 1.0,
    g: 1.0,
    b: 1.0,
    a: 1.0,
};

/// Predefined black color (R=0.0, G=0.0, B=0.0)
pub const BLACK: Color = Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_forms() {
        assert_eq!("#0f0".parse::<Color>().unwrap(), GREEN);
        assert_eq!("#00FFFF".parse::<Color>().unwrap(), CYAN);
        let translucent: Color = "#ff000080".parse().unwrap();
        assert!((translucent.a - 128.0 / 255.0).abs() < 1e-9);
    }

    #[test]
    fn parses_functional_and_named_forms() {
        let c: Color = "rgba(255, 0, 0, 0.5)".parse().unwrap();
        assert_eq!(c, RED.with_alpha(0.5));
        assert_eq!("rgb(0,0,255)".parse::<Color>().unwrap(), BLUE);
        assert_eq!("white".parse::<Color>().unwrap(), WHITE);
        assert!("chartreuse-ish".parse::<Color>().is_err());
        assert!("#12345".parse::<Color>().is_err());
    }

    #[test]
    fn hex_output_drops_opaque_alpha() {
        assert_eq!(GREEN.to_hex(), "#00ff00");
        assert_eq!(RED.with_alpha(0.0).to_hex(), "#ff000000");
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_string(&CYAN).unwrap();
        assert_eq!(json, "\"#00ffff\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, CYAN);
    }
}
