//! # Lighting Engine
//!
//! Transform and shading math for a sequence of real-time lighting lessons,
//! from a flat unlit model up to Blinn-Phong with several attenuated lights.
//!
//! ## Features
//!
//! - **Math primitives**: column-major vectors and matrices with checked
//!   normalize and inverse
//! - **Transform builders**: translation, Y rotation, perspective, view and
//!   normal matrices
//! - **Shading evaluator**: CPU reference of every lesson's lighting model
//! - **Lesson pipeline**: one parameterized pipeline behind a `RenderContext`
//!   seam, with a headless recording context
//! - **Debug panel**: range-checked live parameters for lights and materials
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lighting_engine::prelude::*;
//!
//! fn main() -> Result<(), EngineError> {
//!     let config = LessonConfig::for_lesson("blinn-phong")
//!         .map_err(RenderError::from)?
//!         .with_frame_limit(600);
//!     let mut ctx = RecordingContext::new();
//!     let stats = run_lesson(&config, &mut ctx, FrameClock::new())?;
//!     println!("{} frames drawn", stats.rendered);
//!     Ok(())
//! }
//! ```

#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::must_use_candidate
)]

pub mod config;
pub mod core;
pub mod debug;
pub mod foundation;
pub mod render;

mod engine;

pub use engine::{run_lesson, EngineError, FrameLoop, FrameStats};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        core::config::{Config, ConfigError, LessonConfig},
        debug::{light_direction_panel, material_panel, ParameterPanel},
        foundation::{
            math::{Mat3, Mat4, MathError, Vec3, Vec4},
            time::{FixedStepClock, FrameClock, TimeSource},
        },
        render::{
            Camera, LessonPipeline, Light, LightType, LightingEnvironment, LightingMode, Material,
            MeshData, ParameterError, RecordingContext, RenderContext, RenderError, SurfacePoint,
        },
        run_lesson, EngineError, FrameLoop, FrameStats,
    };
}
