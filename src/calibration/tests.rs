use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use tokio::time::{Duration, sleep};

use super::{
    dependencies::{
        CalibrationProvider, FileImageSource, ImageSource, LoaderDependencies,
        StaticCalibrationProvider,
    },
    manager::{CalibrationLoader, ImageLoader, RequestSequencer},
    types::{Calibration, CameraSettings, LoadOutcome, ProviderError, Resolution},
};

/// Answers after a per-magnification delay and records every request.
#[derive(Clone, Default)]
struct MockProvider {
    responses: HashMap<String, (u64, Option<f64>)>,
    requested: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    fn with(mut self, magnification: &str, delay_ms: u64, factor: Option<f64>) -> Self {
        self.responses
            .insert(magnification.to_string(), (delay_ms, factor));
        self
    }
}

#[async_trait]
impl CalibrationProvider for MockProvider {
    async fn get_calibration(&self, magnification: &str) -> Result<Calibration, ProviderError> {
        self.requested
            .lock()
            .unwrap()
            .push(magnification.to_string());
        let (delay, factor) = self
            .responses
            .get(magnification)
            .copied()
            .unwrap_or((0, None));
        sleep(Duration::from_millis(delay)).await;
        factor
            .map(|calibration_factor| Calibration { calibration_factor })
            .ok_or_else(|| ProviderError::UnknownMagnification(magnification.to_string()))
    }
}

#[derive(Clone, Default)]
struct MockImages {
    delays: HashMap<String, u64>,
    calls: Arc<Mutex<usize>>,
}

#[async_trait]
impl ImageSource for MockImages {
    async fn fetch_image(&self, path: &str) -> Result<Vec<u8>, ProviderError> {
        *self.calls.lock().unwrap() += 1;
        let delay = self.delays.get(path).copied().unwrap_or(0);
        sleep(Duration::from_millis(delay)).await;
        if path.starts_with("missing") {
            Err(ProviderError::NotFound(path.to_string()))
        } else {
            Ok(path.as_bytes().to_vec())
        }
    }
}

fn write_png(path: &std::path::Path, width: i32, height: i32) {
    let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, width, height).unwrap();
    {
        let ctx = cairo::Context::new(&surface).unwrap();
        ctx.set_source_rgb(0.0, 0.0, 1.0);
        ctx.paint().unwrap();
    }
    let mut file = std::fs::File::create(path).unwrap();
    surface.write_to_png(&mut file).unwrap();
}

#[test]
fn resolution_parses_and_displays() {
    let res: Resolution = "1920x1080".parse().unwrap();
    assert_eq!(
        res,
        Resolution {
            width: 1920,
            height: 1080
        }
    );
    assert_eq!(res.to_string(), "1920x1080");
    assert_eq!(
        " 640 X 480 ".parse::<Resolution>().unwrap(),
        Resolution {
            width: 640,
            height: 480
        }
    );

    for bad in ["", "1920", "1920x", "axb", "0x100", "-1x10"] {
        assert!(bad.parse::<Resolution>().is_err(), "{bad} should fail");
    }
}

#[test]
fn camera_settings_document() {
    let settings = CameraSettings::from_json(
        r#"{"magnification":"10x","resolution":"2592x1944","calibrationFactor":0.25}"#,
    )
    .unwrap();
    assert_eq!(settings.magnification.as_deref(), Some("10x"));
    assert_eq!(
        settings.resolution(),
        Some(Resolution {
            width: 2592,
            height: 1944
        })
    );
    assert_eq!(
        settings.calibration(),
        Some(Calibration {
            calibration_factor: 0.25
        })
    );

    let partial = CameraSettings::from_json(r#"{"resolution":"wide","calibrationFactor":0}"#).unwrap();
    assert_eq!(partial.resolution(), None);
    assert_eq!(partial.calibration(), None);

    assert!(matches!(
        CameraSettings::from_json("not json"),
        Err(ProviderError::Parse(_))
    ));
}

#[test]
fn sequencer_only_latest_ticket_is_current() {
    let sequencer = RequestSequencer::new();
    let first = sequencer.next();
    assert!(sequencer.is_current(first));
    let second = sequencer.next();
    assert!(second > first);
    assert!(!sequencer.is_current(first));
    assert!(sequencer.is_current(second));
}

#[tokio::test]
async fn static_provider_looks_up_magnification() {
    let provider = StaticCalibrationProvider::new(HashMap::from([
        ("10x".to_string(), 0.5),
        ("broken".to_string(), -1.0),
    ]));
    assert_eq!(
        provider.get_calibration("10x").await.unwrap().calibration_factor,
        0.5
    );
    assert!(matches!(
        provider.get_calibration("40x").await,
        Err(ProviderError::UnknownMagnification(_))
    ));
    assert!(matches!(
        provider.get_calibration("broken").await,
        Err(ProviderError::InvalidFactor(_))
    ));
}

#[tokio::test]
async fn calibration_loader_applies_latest_result() {
    let provider = MockProvider::default().with("10x", 0, Some(0.5));
    let loader = CalibrationLoader::new(Arc::new(provider));

    assert_eq!(loader.factor().await, None);
    let outcome = loader.load("10x").await;
    assert!(outcome.is_applied());
    assert_eq!(loader.factor().await, Some(0.5));
}

#[tokio::test]
async fn calibration_loader_discards_stale_response() {
    let provider = MockProvider::default()
        .with("4x", 60, Some(2.0))
        .with("10x", 1, Some(0.5));
    let requested = provider.requested.clone();
    let loader = CalibrationLoader::new(Arc::new(provider));

    // the slow 4x request is issued first and answers last
    let (old, new) = tokio::join!(loader.load("4x"), loader.load("10x"));
    assert_eq!(old, LoadOutcome::Stale);
    assert!(new.is_applied());
    assert_eq!(loader.factor().await, Some(0.5));
    assert_eq!(*requested.lock().unwrap(), vec!["4x", "10x"]);
}

#[tokio::test]
async fn calibration_failure_falls_back_to_pixels() {
    let provider = MockProvider::default()
        .with("10x", 0, Some(0.5))
        .with("bad", 0, Some(f64::NAN));
    let loader = CalibrationLoader::new(Arc::new(provider));

    loader.load("10x").await;
    assert!(matches!(loader.load("20x").await, LoadOutcome::Failed(_)));
    assert_eq!(loader.factor().await, None);

    loader.load("10x").await;
    assert!(matches!(loader.load("bad").await, LoadOutcome::Failed(_)));
    assert_eq!(loader.current().await, None);
}

#[tokio::test]
async fn image_loader_replaces_and_skips_same_path() {
    let images = MockImages::default();
    let calls = images.calls.clone();
    let loader = ImageLoader::new(Arc::new(images));

    let first = loader.load("a.png").await;
    assert!(first.is_applied());
    let again = loader.load("a.png").await;
    assert!(again.is_applied());
    assert_eq!(*calls.lock().unwrap(), 1);

    loader.load("b.png").await;
    let current = loader.current().await.unwrap();
    assert_eq!(current.path, "b.png");
    assert_eq!(current.bytes.as_slice(), b"b.png");

    loader.release().await;
    assert!(loader.current().await.is_none());
}

#[tokio::test]
async fn image_loader_failure_clears_image() {
    let loader = ImageLoader::new(Arc::new(MockImages::default()));
    loader.load("a.png").await;
    assert!(matches!(
        loader.load("missing.png").await,
        LoadOutcome::Failed(_)
    ));
    assert!(loader.current().await.is_none());
}

#[tokio::test]
async fn image_loader_discards_stale_response() {
    let images = MockImages {
        delays: HashMap::from([("slow.png".to_string(), 60)]),
        ..MockImages::default()
    };
    let loader = ImageLoader::new(Arc::new(images));

    let (old, new) = tokio::join!(loader.load("slow.png"), loader.load("fast.png"));
    assert_eq!(old, LoadOutcome::Stale);
    assert!(new.is_applied());
    assert_eq!(loader.current().await.unwrap().path, "fast.png");
}

#[tokio::test]
async fn file_image_source_reads_and_decodes_png() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("captures")).unwrap();
    write_png(&dir.path().join("captures").join("slide.png"), 8, 6);

    let dependencies = LoaderDependencies {
        images: Arc::new(FileImageSource::with_root(dir.path())),
        ..LoaderDependencies::default()
    };
    let loader = ImageLoader::from_dependencies(&dependencies);

    let LoadOutcome::Applied(image) = loader.load("captures\\slide.png").await else {
        panic!("expected image to load");
    };
    let surface = image.decode().unwrap();
    assert_eq!((surface.width(), surface.height()), (8, 6));

    assert!(matches!(
        loader.load("captures/none.png").await,
        LoadOutcome::Failed(msg) if msg.contains("not found")
    ));
}

#[test]
fn undecodable_image_is_reported() {
    let image = super::LoadedImage {
        path: "junk".to_string(),
        bytes: Arc::new(b"not a png".to_vec()),
    };
    assert!(matches!(image.decode(), Err(ProviderError::Decode(_))));
}
