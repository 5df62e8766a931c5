/// Image sensor of the camera
#[derive(Debug, Clone, PartialEq)]
pub struct Film {
    /// Width and height in pixels
    pub resolution: (usize, usize),
    /// Tone mapping exposure, mapped as `1 - exp(-c / exposure)`
    pub exposure: f32,
    /// Number of progressive iterations until the image is considered converged
    pub exposure_iterations: u32,
}

impl Film {
    pub fn set_resolution(&mut self, width: usize, height: usize) {
        self.resolution = (usize::max(width, 1), usize::max(height, 1));
    }

    pub fn width(&self) -> usize {
        self.resolution.0
    }

    pub fn height(&self) -> usize {
        self.resolution.1
    }

    pub fn pixel_count(&self) -> usize {
        self.resolution.0 * self.resolution.1
    }

    /// Width / height
    pub fn aspect(&self) -> f32 {
        self.resolution.0 as f32 / self.resolution.1 as f32
    }
}

impl Default for Film {
    fn default() -> Self {
        Self {
            resolution: (512, 512),
            exposure: 0.75,
            exposure_iterations: 256,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aperture {
    /// Lens radius, 0 is a pinhole
    pub size: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Focus {
    pub focal_distance: f32,
}

impl Default for Focus {
    fn default() -> Self {
        Self {
            focal_distance: 1.0,
        }
    }
}

/// Predefined viewpoints around the scene bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    User,
    Front,
    Back,
    Left,
    Right,
    Top,
    Bottom,
}
