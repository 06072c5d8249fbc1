use std::{collections::HashMap, path::PathBuf, sync::Arc};

use async_trait::async_trait;

use crate::calibration::types::{Calibration, ProviderError};

/// Source of microns-per-pixel calibration for a magnification.
#[async_trait]
pub trait CalibrationProvider: Send + Sync {
    async fn get_calibration(&self, magnification: &str) -> Result<Calibration, ProviderError>;
}

/// Source of background image bytes (PNG).
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch_image(&self, path: &str) -> Result<Vec<u8>, ProviderError>;
}

/// Bundle of collaborators used by the loaders. Each component can be mocked in tests.
#[derive(Clone)]
pub struct LoaderDependencies {
    pub calibration: Arc<dyn CalibrationProvider>,
    pub images: Arc<dyn ImageSource>,
}

impl Default for LoaderDependencies {
    fn default() -> Self {
        Self {
            calibration: Arc::new(StaticCalibrationProvider::default()),
            images: Arc::new(FileImageSource::default()),
        }
    }
}

/// Calibration table keyed by magnification, typically from the config file.
#[derive(Debug, Clone, Default)]
pub struct StaticCalibrationProvider {
    factors: HashMap<String, f64>,
}

impl StaticCalibrationProvider {
    pub fn new(factors: HashMap<String, f64>) -> Self {
        Self { factors }
    }
}

#[async_trait]
impl CalibrationProvider for StaticCalibrationProvider {
    async fn get_calibration(&self, magnification: &str) -> Result<Calibration, ProviderError> {
        let factor = *self
            .factors
            .get(magnification)
            .ok_or_else(|| ProviderError::UnknownMagnification(magnification.to_string()))?;
        let calibration = Calibration {
            calibration_factor: factor,
        };
        if calibration.is_valid() {
            Ok(calibration)
        } else {
            Err(ProviderError::InvalidFactor(factor))
        }
    }
}

/// Reads images from the local filesystem, optionally below a root directory.
#[derive(Debug, Clone, Default)]
pub struct FileImageSource {
    root: Option<PathBuf>,
}

impl FileImageSource {
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        // Windows-style separators from stored image paths
        let normalized = path.replace('\\', "/");
        match &self.root {
            Some(root) => root.join(normalized.trim_start_matches('/')),
            None => PathBuf::from(normalized),
        }
    }
}

#[async_trait]
impl ImageSource for FileImageSource {
    async fn fetch_image(&self, path: &str) -> Result<Vec<u8>, ProviderError> {
        let resolved = self.resolve(path);
        let display = resolved.display().to_string();
        tokio::task::spawn_blocking(move || std::fs::read(&resolved))
            .await
            .map_err(|err| ProviderError::Task(err.to_string()))?
            .map_err(|err| match err.kind() {
                std::io::ErrorKind::NotFound => ProviderError::NotFound(display),
                _ => ProviderError::Io(err),
            })
    }
}
