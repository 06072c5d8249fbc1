mod actions;
mod core;
mod mouse;
mod render;

pub use core::{
    DEFAULT_ERASER_RADIUS, DrawingState, EngineConfig, EngineError, InputState, MAX_ERASER_RADIUS,
    MAX_THICKNESS, MIN_ERASER_RADIUS, MIN_THICKNESS,
};
pub use render::Provisional;
