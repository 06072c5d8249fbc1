//! Input handling and tool state machine.
//!
//! This module translates host keyboard and pointer events into annotation
//! edits. It maps screen positions onto the annotation surface, dispatches
//! pointer events to the active tool, and manages the drawing state machine
//! (idle, dragging, collecting points, erasing, moving, text entry).

pub mod events;
pub mod modifiers;
pub mod state;
pub mod tool;
pub mod viewport;

// Re-export commonly used types at module level
pub use events::{Key, MouseButton};
pub use modifiers::Modifiers;
pub use state::{DrawingState, EngineConfig, EngineError, InputState, Provisional};
pub use tool::{Tool, ToolBehavior, Transition};
pub use viewport::Viewport;
