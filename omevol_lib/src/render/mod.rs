mod render_options;
mod render_settings;
mod renderer;

pub use render_options::RenderOptions;
pub use render_settings::{DirtyFlags, RenderParams, RenderSettings};
pub use renderer::{RenderStatus, Renderer};

/// Renderer operations reachable from remote commands
pub trait RenderControl {
    /// Publish every iteration instead of only converged frames
    fn set_stream_mode(&mut self, stream: bool);

    fn resize(&mut self, width: usize, height: usize);

    /// Publish the current frame as soon as possible
    fn request_redraw(&mut self);
}
