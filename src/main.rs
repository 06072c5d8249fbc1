use std::collections::HashMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scopemark::calibration::{
    CalibrationLoader, FileImageSource, ImageLoader, LoadOutcome, Resolution,
    StaticCalibrationProvider,
};
use scopemark::draw::{Shape, measure};
use scopemark::{Config, InputState};

#[derive(Parser, Debug)]
#[command(name = "scopemark")]
#[command(
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("SCOPEMARK_GIT_HASH"), ")"),
    about = "Measurement annotations for microscopy images"
)]
struct Cli {
    /// Config file to use instead of ~/.config/scopemark/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a shape set over a background image and write a PNG
    Render {
        /// JSON array of shapes
        #[arg(long, value_name = "FILE")]
        shapes: PathBuf,

        /// Output PNG
        #[arg(long, short = 'o', value_name = "FILE")]
        output: PathBuf,

        /// Background PNG; the placeholder fill is used if it cannot be loaded
        #[arg(long, value_name = "FILE")]
        background: Option<PathBuf>,

        #[command(flatten)]
        calibration: CalibrationArgs,

        /// Surface size as <width>x<height>
        #[arg(long, value_name = "WxH")]
        resolution: Option<Resolution>,
    },

    /// Print the measurement labels of every shape
    Measure {
        /// JSON array of shapes
        #[arg(long, value_name = "FILE")]
        shapes: PathBuf,

        #[command(flatten)]
        calibration: CalibrationArgs,
    },

    /// Write a documented default config file
    InitConfig,
}

#[derive(clap::Args, Debug)]
struct CalibrationArgs {
    /// Microns per pixel, overriding the config
    #[arg(long, value_name = "FACTOR", conflicts_with = "magnification")]
    calibration: Option<f64>,

    /// Look the factor up in the config's [calibration.factors] table
    #[arg(long, value_name = "MAG")]
    magnification: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Command::InitConfig => {
            let path = Config::create_default_file()?;
            println!("Created {}", path.display());
        }
        Command::Measure {
            shapes,
            calibration,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let factor = resolve_calibration(&config, &calibration).await;
            let shapes = read_shapes(&shapes)?;

            let mut engine = config.to_engine_config();
            engine.calibration = factor;
            let units = engine.units();

            if let Some(scale) = units.scale_text() {
                println!("{scale}");
            }
            for shape in &shapes {
                println!("#{} {}", shape.id, shape.kind.name());
                for label in measure::labels(&shape.kind, &units) {
                    println!("  {}", label.text);
                }
            }
        }
        Command::Render {
            shapes,
            output,
            background,
            calibration,
            resolution,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let factor = resolve_calibration(&config, &calibration).await;
            let shapes = read_shapes(&shapes)?;

            let mut engine = config.to_engine_config();
            engine.calibration = factor;
            if let Some(resolution) = resolution {
                engine.resolution = resolution;
            }
            let resolution = engine.resolution;

            let background = match background {
                Some(path) => load_background(&path).await,
                None => None,
            };

            let mut state = InputState::new(engine, config.action_map());
            state.set_shapes(shapes);

            let surface = cairo::ImageSurface::create(
                cairo::Format::ARgb32,
                resolution.width as i32,
                resolution.height as i32,
            )
            .context("Failed to create render surface")?;
            {
                let ctx = cairo::Context::new(&surface).context("Failed to create context")?;
                state.render(&ctx, background.as_ref());
            }
            surface.flush();

            let mut file = File::create(&output)
                .with_context(|| format!("Failed to create {}", output.display()))?;
            surface
                .write_to_png(&mut file)
                .with_context(|| format!("Failed to write {}", output.display()))?;

            log::info!(
                "Rendered {} shapes at {} to {}",
                state.shapes().len(),
                resolution,
                output.display()
            );
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

fn read_shapes(path: &Path) -> Result<Vec<Shape>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read shapes from {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse shapes from {}", path.display()))
}

/// Flag, then magnification lookup, then config. Anything invalid means pixels.
async fn resolve_calibration(config: &Config, args: &CalibrationArgs) -> Option<f64> {
    if let Some(factor) = args.calibration {
        if factor.is_finite() && factor > 0.0 {
            return Some(factor);
        }
        log::warn!("Invalid calibration factor {factor}, measurements will use pixels");
        return None;
    }

    let Some(magnification) = &args.magnification else {
        return config.calibration_factor();
    };

    let factors: HashMap<String, f64> = config
        .calibration
        .factors
        .iter()
        .map(|(mag, factor)| (mag.clone(), *factor))
        .collect();
    let loader = CalibrationLoader::new(Arc::new(StaticCalibrationProvider::new(factors)));
    match loader.load(magnification).await {
        LoadOutcome::Applied(calibration) => Some(calibration.calibration_factor),
        _ => None,
    }
}

async fn load_background(path: &Path) -> Option<cairo::ImageSurface> {
    let loader = ImageLoader::new(Arc::new(FileImageSource::default()));
    let image = match loader.load(&path.to_string_lossy()).await {
        LoadOutcome::Applied(image) => image,
        _ => return None,
    };
    match image.decode() {
        Ok(surface) => Some(surface),
        Err(err) => {
            log::warn!("{err}; using placeholder background");
            None
        }
    }
}
