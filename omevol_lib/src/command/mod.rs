//! Remote command set
//!
//! Every [`Command`] is a plain data record. Executing it mutates the camera,
//! scene or render settings and marks what the renderer has to recompute.

mod commands;
mod context;
mod params;

pub use commands::{Command, ControlPoint};
pub use context::{ExecutionContext, SessionInfo};
pub use params::ParamsError;

use crate::{scene::LightingError, transfer::GradientError, volumetric::VolumeError};

#[derive(thiserror::Error, Debug)]
pub enum CommandError {
    #[error("channel {channel} out of range, {count} channels available")]
    ChannelOutOfRange { channel: usize, count: usize },
    #[error(transparent)]
    Lighting(#[from] LightingError),
    #[error("no volume loaded")]
    NoVolume,
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("cannot load volume: {0}")]
    Load(#[from] VolumeError),
    #[error("invalid transfer function: {0}")]
    Gradient(#[from] GradientError),
}
