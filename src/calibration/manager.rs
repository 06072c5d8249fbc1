use std::io::Cursor;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tokio::sync::Mutex;

use crate::calibration::{
    dependencies::{CalibrationProvider, ImageSource, LoaderDependencies},
    types::{Calibration, LoadOutcome, ProviderError},
};

/// Monotonic request tickets; only the latest ticket may apply its result.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

/// Handle for one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a ticket newer than every previous one.
    pub fn next(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether no newer request was issued after `ticket`.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}

/// Loads calibration for the selected magnification.
///
/// Responses to superseded requests are discarded. A failed latest request
/// clears the calibration so measurements fall back to pixels.
#[derive(Clone)]
pub struct CalibrationLoader {
    provider: Arc<dyn CalibrationProvider>,
    sequencer: Arc<RequestSequencer>,
    current: Arc<Mutex<Option<Calibration>>>,
}

impl CalibrationLoader {
    pub fn new(provider: Arc<dyn CalibrationProvider>) -> Self {
        Self {
            provider,
            sequencer: Arc::new(RequestSequencer::new()),
            current: Arc::new(Mutex::new(None)),
        }
    }

    pub fn from_dependencies(dependencies: &LoaderDependencies) -> Self {
        Self::new(dependencies.calibration.clone())
    }

    /// Requests calibration for `magnification` and applies it if still current.
    pub async fn load(&self, magnification: &str) -> LoadOutcome<Calibration> {
        let ticket = self.sequencer.next();
        log::debug!("Requesting calibration for {magnification} ({ticket:?})");
        let result = self
            .provider
            .get_calibration(magnification)
            .await
            .and_then(|calibration| {
                if calibration.is_valid() {
                    Ok(calibration)
                } else {
                    Err(ProviderError::InvalidFactor(calibration.calibration_factor))
                }
            });

        // Check and apply under the lock so a newer response cannot interleave
        let mut current = self.current.lock().await;
        if !self.sequencer.is_current(ticket) {
            log::debug!("Discarding stale calibration response ({ticket:?})");
            return LoadOutcome::Stale;
        }
        match result {
            Ok(calibration) => {
                log::info!(
                    "Calibration for {magnification}: {:.3} microns/pixel",
                    calibration.calibration_factor
                );
                *current = Some(calibration);
                LoadOutcome::Applied(calibration)
            }
            Err(err) => {
                log::warn!("Error loading calibration for {magnification}: {err}");
                *current = None;
                LoadOutcome::Failed(err.to_string())
            }
        }
    }

    /// Calibration currently in effect.
    pub async fn current(&self) -> Option<Calibration> {
        *self.current.lock().await
    }

    /// Microns per pixel currently in effect.
    pub async fn factor(&self) -> Option<f64> {
        self.current().await.map(|c| c.calibration_factor)
    }
}

/// Encoded background image held by the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    pub path: String,
    pub bytes: Arc<Vec<u8>>,
}

impl LoadedImage {
    /// Decodes the PNG into a Cairo surface on the caller's thread.
    pub fn decode(&self) -> Result<cairo::ImageSurface, ProviderError> {
        let mut reader = Cursor::new(self.bytes.as_slice());
        cairo::ImageSurface::create_from_png(&mut reader)
            .map_err(|err| ProviderError::Decode(err.to_string()))
    }
}

/// Loads background images by path.
///
/// Holds at most one image: a successful load releases the previous one, a
/// failed latest load clears it so the placeholder is shown.
#[derive(Clone)]
pub struct ImageLoader {
    source: Arc<dyn ImageSource>,
    sequencer: Arc<RequestSequencer>,
    current: Arc<Mutex<Option<LoadedImage>>>,
}

impl ImageLoader {
    pub fn new(source: Arc<dyn ImageSource>) -> Self {
        Self {
            source,
            sequencer: Arc::new(RequestSequencer::new()),
            current: Arc::new(Mutex::new(None)),
        }
    }

    pub fn from_dependencies(dependencies: &LoaderDependencies) -> Self {
        Self::new(dependencies.images.clone())
    }

    /// Fetches `path` unless it is already the loaded image.
    pub async fn load(&self, path: &str) -> LoadOutcome<LoadedImage> {
        // Taking a ticket first also supersedes any other path still in flight
        let ticket = self.sequencer.next();
        {
            let current = self.current.lock().await;
            if let Some(image) = current.as_ref().filter(|image| image.path == path) {
                return LoadOutcome::Applied(image.clone());
            }
        }

        let result = self.source.fetch_image(path).await;

        let mut current = self.current.lock().await;
        if !self.sequencer.is_current(ticket) {
            log::debug!("Discarding stale image response for {path}");
            return LoadOutcome::Stale;
        }
        match result {
            Ok(bytes) => {
                let image = LoadedImage {
                    path: path.to_string(),
                    bytes: Arc::new(bytes),
                };
                if let Some(previous) = current.replace(image.clone()) {
                    log::debug!("Released image {}", previous.path);
                }
                log::info!("Loaded image {path} ({} bytes)", image.bytes.len());
                LoadOutcome::Applied(image)
            }
            Err(err) => {
                log::warn!("Error loading image {path}: {err}");
                *current = None;
                LoadOutcome::Failed(err.to_string())
            }
        }
    }

    pub async fn current(&self) -> Option<LoadedImage> {
        self.current.lock().await.clone()
    }

    /// Drops the loaded image.
    pub async fn release(&self) {
        if let Some(previous) = self.current.lock().await.take() {
            log::debug!("Released image {}", previous.path);
        }
    }
}
