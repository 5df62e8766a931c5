//! # Default values
//!
//! Used when neither the config file nor the command line sets a value.

pub const HOST: &str = "127.0.0.1";
pub const PORT: u16 = 1235;

// Render resolution
pub const RENDER_WIDTH: usize = 512;
pub const RENDER_HEIGHT: usize = 512;

/// Progressive iterations until a frame is final
pub const EXPOSURE_ITERATIONS: u32 = 256;

pub const MULTI_THREAD: bool = true;
pub const ERT: bool = true;

pub const DENSITY_SCALE: f32 = 50.0;

/// Longest accepted request line in bytes
pub const MAX_LINE_LENGTH: usize = 1 << 20;
