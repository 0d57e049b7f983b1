//! Render context implementations
//!
//! Only the headless recording context lives here; a windowed backend plugs in
//! by implementing `RenderContext` in the host application.

pub mod recording;

pub use recording::{RecordingContext, DEFAULT_DRAW_HISTORY};
