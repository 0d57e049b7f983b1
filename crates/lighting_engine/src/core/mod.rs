//! # Core Module
//!
//! Lesson configuration shared by the library and the lesson binary.
//!
//! ## Organization
//!
//! - **Config**: `LessonConfig`, its presets and file loading

pub mod config;

pub use config::{CameraConfig, Config, ConfigError, LessonConfig, MeshConfig};
