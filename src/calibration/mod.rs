//! External collaborators of the annotation engine.
//!
//! This module provides:
//! - Calibration lookup per magnification ([`CalibrationProvider`])
//! - Background image retrieval ([`ImageSource`])
//! - The persisted camera settings document and surface [`Resolution`]
//! - Request sequencing so a superseded response is never applied
//! - Live feed URLs with cache-busting timestamps

pub mod feed;
pub mod types;

mod dependencies;
mod manager;
#[cfg(test)]
mod tests;

pub use dependencies::{
    CalibrationProvider, FileImageSource, ImageSource, LoaderDependencies,
    StaticCalibrationProvider,
};
pub use feed::live_feed_url;
pub use manager::{CalibrationLoader, ImageLoader, LoadedImage, RequestSequencer, Ticket};
pub use types::{
    Calibration, CameraSettings, LoadOutcome, ProviderError, Resolution, ResolutionParseError,
};
