//! Transfer functions
//!
//! Gradient stops map normalized channel intensity to color and opacity.
//! Channels sample them into lookup tables used by the renderer.

mod gradient;
mod histogram;
mod presets;

pub use gradient::{GradientStop, GradientStops, MIN_WINDOW};
pub use histogram::{Histogram, DEFAULT_BIN_COUNT};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GradientError {
    #[error("gradient needs at least one stop")]
    Empty,
    #[error("stop {index} has position {position} outside of <0;1>")]
    PositionOutOfRange { index: usize, position: f32 },
    #[error("stop {index} is placed before the previous stop")]
    NotMonotonic { index: usize },
    #[error("unknown gradient preset {0}")]
    UnknownPreset(u32),
}
