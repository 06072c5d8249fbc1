//! Library exports for the scopemark annotation engine.
//!
//! Exposes the shape model, the input state machine, Cairo rendering and the
//! configuration types so that hosts (a GUI shell, the headless CLI, tests) can
//! drive the same engine and share validation logic with the main binary.

pub mod calibration;
pub mod config;
pub mod draw;
pub mod geometry;
pub mod history;
pub mod input;
pub mod util;

pub use config::Config;
pub use input::{EngineConfig, InputState};
