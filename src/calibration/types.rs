//! Data types shared by the calibration and image collaborators.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Backing-store size of the annotation surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Errors from parsing a `"<W>x<H>"` resolution string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionParseError {
    #[error("expected <width>x<height>, got '{0}'")]
    Format(String),
    #[error("resolution must be non-zero, got '{0}'")]
    Zero(String),
}

impl FromStr for Resolution {
    type Err = ResolutionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (w, h) = trimmed
            .split_once(['x', 'X'])
            .ok_or_else(|| ResolutionParseError::Format(s.to_string()))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|_| ResolutionParseError::Format(s.to_string()))
        };
        let (width, height) = (parse(w)?, parse(h)?);
        if width == 0 || height == 0 {
            return Err(ResolutionParseError::Zero(s.to_string()));
        }
        Ok(Self { width, height })
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Calibration returned by a provider for one magnification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calibration {
    /// Microns per pixel
    pub calibration_factor: f64,
}

impl Calibration {
    /// A factor is usable only when finite and positive.
    pub fn is_valid(&self) -> bool {
        self.calibration_factor.is_finite() && self.calibration_factor > 0.0
    }
}

/// Persisted camera settings document, e.g.
/// `{"magnification":"10x","resolution":"1920x1080","calibrationFactor":0.5}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CameraSettings {
    pub magnification: Option<String>,
    pub resolution: Option<String>,
    pub calibration_factor: Option<f64>,
}

impl CameraSettings {
    pub fn from_json(json: &str) -> Result<Self, ProviderError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parsed resolution; malformed strings are ignored with a warning.
    pub fn resolution(&self) -> Option<Resolution> {
        let raw = self.resolution.as_deref()?;
        match raw.parse() {
            Ok(resolution) => Some(resolution),
            Err(err) => {
                log::warn!("Ignoring camera resolution: {err}");
                None
            }
        }
    }

    /// Locally cached calibration, if present and valid.
    pub fn calibration(&self) -> Option<Calibration> {
        self.calibration_factor
            .map(|calibration_factor| Calibration { calibration_factor })
            .filter(Calibration::is_valid)
    }
}

/// Errors reported by calibration and image collaborators.
///
/// None of these are fatal: callers fall back to uncalibrated measurements
/// or the placeholder background.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no calibration for magnification '{0}'")]
    UnknownMagnification(String),

    #[error("invalid calibration factor {0}")]
    InvalidFactor(f64),

    #[error("image not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid settings document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("image decode failed: {0}")]
    Decode(String),

    #[error("provider task failed: {0}")]
    Task(String),
}

/// Result of a sequenced load.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome<T> {
    /// The response belonged to the latest request and was applied
    Applied(T),
    /// A newer request was issued before this response arrived; discarded
    Stale,
    /// The latest request failed; the fallback state was applied
    Failed(String),
}

impl<T> LoadOutcome<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, LoadOutcome::Applied(_))
    }
}
