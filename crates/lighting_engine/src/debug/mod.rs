//! Debug module for live parameter tweaking
//!
//! Named numeric and color parameters with declared ranges, change callbacks,
//! and helpers that write edited values back into lights and materials.

pub mod panel;

pub use panel::{
    light_direction_panel, material_panel, point_light_panel, ColorParameter, NumericParameter,
    ParameterPanel, ParameterValue,
};
