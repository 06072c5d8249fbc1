use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SHAPES: &str = r##"[
  {"id": 1, "style": {"color": "#00ff00", "thickness": 2.0, "fontColor": "#ffffff"},
   "type": "line", "start": {"x": 0.0, "y": 0.0}, "end": {"x": 100.0, "y": 0.0}},
  {"id": 2, "style": {"color": "#ff0000", "thickness": 3.0, "fontColor": "#ffffff"},
   "type": "point", "x": 10.0, "y": 20.0, "label": "p1"}
]"##;

fn scopemark_cmd(config_home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("scopemark").expect("binary exists");
    cmd.env("XDG_CONFIG_HOME", config_home);
    cmd
}

fn write_shapes(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("shapes.json");
    std::fs::write(&path, SHAPES).unwrap();
    path
}

#[test]
fn help_prints_usage() {
    let temp = TempDir::new().unwrap();
    scopemark_cmd(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Measurement annotations for microscopy images",
        ));
}

#[test]
fn measure_without_calibration_reports_pixels() {
    let temp = TempDir::new().unwrap();
    let shapes = write_shapes(&temp);

    scopemark_cmd(temp.path())
        .arg("measure")
        .arg("--shapes")
        .arg(&shapes)
        .assert()
        .success()
        .stdout(predicate::str::contains("#1 line"))
        .stdout(predicate::str::contains("100 px"))
        .stdout(predicate::str::contains("#2 point"))
        .stdout(predicate::str::contains("p1"))
        .stdout(predicate::str::contains("microns").not());
}

#[test]
fn measure_with_calibration_divides_by_factor() {
    let temp = TempDir::new().unwrap();
    let shapes = write_shapes(&temp);

    scopemark_cmd(temp.path())
        .arg("measure")
        .arg("--shapes")
        .arg(&shapes)
        .args(["--calibration", "2.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 pixel = 2.000 microns"))
        .stdout(predicate::str::contains("50 µm"));
}

#[test]
fn measure_looks_up_magnification_in_config() {
    let temp = TempDir::new().unwrap();
    let shapes = write_shapes(&temp);
    let config = temp.path().join("custom.toml");
    std::fs::write(
        &config,
        "[calibration.factors]\n\"10x\" = 0.5\n\"40x\" = 4.0\n",
    )
    .unwrap();

    scopemark_cmd(temp.path())
        .arg("--config")
        .arg(&config)
        .arg("measure")
        .arg("--shapes")
        .arg(&shapes)
        .args(["--magnification", "40x"])
        .assert()
        .success()
        .stdout(predicate::str::contains("25 µm"));

    scopemark_cmd(temp.path())
        .arg("--config")
        .arg(&config)
        .arg("measure")
        .arg("--shapes")
        .arg(&shapes)
        .args(["--magnification", "63x"])
        .assert()
        .success()
        .stdout(predicate::str::contains("100 px"));
}

#[test]
fn invalid_calibration_falls_back_to_pixels() {
    let temp = TempDir::new().unwrap();
    let shapes = write_shapes(&temp);

    scopemark_cmd(temp.path())
        .arg("measure")
        .arg("--shapes")
        .arg(&shapes)
        .args(["--calibration", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("100 px"));
}

#[test]
fn measure_rejects_malformed_shapes() {
    let temp = TempDir::new().unwrap();
    let shapes = temp.path().join("broken.json");
    std::fs::write(&shapes, "[{\"type\": \"hexagon\"}]").unwrap();

    scopemark_cmd(temp.path())
        .arg("measure")
        .arg("--shapes")
        .arg(&shapes)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse shapes"));
}

#[test]
fn render_writes_png_at_requested_resolution() {
    let temp = TempDir::new().unwrap();
    let shapes = write_shapes(&temp);
    let output = temp.path().join("out.png");

    scopemark_cmd(temp.path())
        .arg("render")
        .arg("--shapes")
        .arg(&shapes)
        .arg("--output")
        .arg(&output)
        .args(["--resolution", "160x120"])
        .assert()
        .success();

    let mut file = std::fs::File::open(&output).unwrap();
    let image = cairo::ImageSurface::create_from_png(&mut file).unwrap();
    assert_eq!((image.width(), image.height()), (160, 120));
}

#[test]
fn render_with_missing_background_uses_placeholder() {
    let temp = TempDir::new().unwrap();
    let shapes = write_shapes(&temp);
    let output = temp.path().join("out.png");

    scopemark_cmd(temp.path())
        .arg("render")
        .arg("--shapes")
        .arg(&shapes)
        .arg("--output")
        .arg(&output)
        .arg("--background")
        .arg(temp.path().join("missing.png"))
        .args(["--resolution", "64x64"])
        .assert()
        .success();

    assert!(output.exists());
}

#[test]
fn render_rejects_bad_resolution() {
    let temp = TempDir::new().unwrap();
    let shapes = write_shapes(&temp);

    scopemark_cmd(temp.path())
        .arg("render")
        .arg("--shapes")
        .arg(&shapes)
        .args(["--output", "unused.png", "--resolution", "0x10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("non-zero"));
}

#[test]
fn init_config_refuses_to_overwrite() {
    let temp = TempDir::new().unwrap();

    scopemark_cmd(temp.path())
        .arg("init-config")
        .assert()
        .success();
    assert!(temp.path().join("scopemark").join("config.toml").exists());

    scopemark_cmd(temp.path())
        .arg("init-config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn schema_binary_prints_config_sections() {
    Command::cargo_bin("scopemark-config-schema")
        .expect("binary exists")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"calibration\""))
        .stdout(predicate::str::contains("\"keybindings\""));
}
