use crate::color::ColorRgbHdr;

use super::MAX_CHANNELS;

/// Default diffuse colors of the first channels
pub const DEFAULT_CHANNEL_COLORS: [ColorRgbHdr; MAX_CHANNELS] = [
    ColorRgbHdr::new(1.0, 0.0, 1.0),
    ColorRgbHdr::new(1.0, 1.0, 1.0),
    ColorRgbHdr::new(0.0, 1.0, 1.0),
    ColorRgbHdr::new(1.0, 1.0, 0.0),
];

/// Per-channel shading parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub diffuse: [ColorRgbHdr; MAX_CHANNELS],
    pub specular: [ColorRgbHdr; MAX_CHANNELS],
    pub emissive: [ColorRgbHdr; MAX_CHANNELS],
    /// 0 is a mirror-like highlight, 1 is fully diffuse
    pub roughness: [f32; MAX_CHANNELS],
    pub enabled: [bool; MAX_CHANNELS],
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse: DEFAULT_CHANNEL_COLORS,
            specular: [ColorRgbHdr::BLACK; MAX_CHANNELS],
            emissive: [ColorRgbHdr::BLACK; MAX_CHANNELS],
            roughness: [0.0; MAX_CHANNELS],
            enabled: [true, true, true, false],
        }
    }
}

impl Material {
    /// Enable the first three channels that exist in an image with `channel_count` channels
    pub fn reset_enabled(&mut self, channel_count: usize) {
        for (i, enabled) in self.enabled.iter_mut().enumerate() {
            *enabled = i < channel_count && i < 3;
        }
    }

    pub fn enabled_channels(&self, channel_count: usize) -> Vec<usize> {
        (0..usize::min(channel_count, MAX_CHANNELS))
            .filter(|&i| self.enabled[i])
            .collect()
    }
}
