//! Scene state shared by commands and the renderer

mod lighting;
mod material;

pub use lighting::{AreaLight, Light, Lighting, LightingError, SkyLight};
pub use material::{Material, DEFAULT_CHANNEL_COLORS};

use crate::{common::BoundBox, volumetric::ImageXYZC};

/// Number of channels with their own material slot
pub const MAX_CHANNELS: usize = 4;

#[derive(Debug, Clone, Default)]
pub struct AppScene {
    pub volume: Option<ImageXYZC>,
    pub material: Material,
    pub lighting: Lighting,
    /// World space box the volume is drawn into
    pub bounding_box: BoundBox,
}

impl AppScene {
    /// Replace the volume and reset everything derived from it
    pub fn init_scene_from_img(&mut self, image: ImageXYZC) {
        self.bounding_box = image.normalized_bound_box();
        self.material.diffuse = DEFAULT_CHANNEL_COLORS;
        self.material.reset_enabled(image.size_c());
        self.volume = Some(image);
    }

    pub fn channel_count(&self) -> usize {
        self.volume.as_ref().map_or(0, |v| v.size_c())
    }

    /// Indexes of channels that exist and are switched on
    pub fn enabled_channels(&self) -> Vec<usize> {
        self.material.enabled_channels(self.channel_count())
    }
}
