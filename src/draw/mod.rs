//! Rendering primitives and shape definitions (Cairo-based).
//!
//! This module defines the core drawing types used for measurement annotation:
//! - [`Color`]: RGBA color representation with predefined color constants
//! - [`Shape`]: The annotation kinds (points, lines, circles, curves, text, ...)
//! - [`Frame`]: Ordered container for the committed shapes
//! - Hit-testing, calibrated measurement labels and Cairo-based output

pub mod color;
pub mod font;
pub mod frame;
pub mod hit;
pub mod measure;
pub mod render;
pub mod shape;

// Re-export commonly used types at module level
pub use color::Color;
pub use font::FontDescriptor;
pub use frame::Frame;
pub use hit::HIT_THRESHOLD;
pub use measure::{Label, Measurement, Units};
pub use render::{RenderSettings, render_background, render_shape, render_shapes};
pub use shape::{Shape, ShapeId, ShapeKind, Style};

pub use color::{BLACK, BLUE, CYAN, GREEN, RED, WHITE, YELLOW};
