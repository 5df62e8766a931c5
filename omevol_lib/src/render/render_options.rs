#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub resolution: (usize, usize),
    /// Stop marching once the ray is almost opaque
    pub ray_termination: bool,
    /// Split image rows between worker threads
    pub multi_thread: bool,
}

impl RenderOptions {
    pub fn new(resolution: (usize, usize), ray_termination: bool, multi_thread: bool) -> RenderOptions {
        RenderOptions {
            resolution,
            ray_termination,
            multi_thread,
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            resolution: (512, 512),
            ray_termination: true,
            multi_thread: true,
        }
    }
}
