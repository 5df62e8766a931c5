use nalgebra::Vector3;

use super::SampleGenerator;

/// Widest empty border around the solid block
const MAX_PAD: u32 = 5;

/// Generate solid volume
/// All sample values are the same, except for an empty border
pub struct SolidGenerator {
    /// The sample value
    sample: u16,
    pad: u32,
    dims: Vector3<u32>,
}

impl SolidGenerator {
    pub fn new(dims: Vector3<u32>, sample: u16) -> SolidGenerator {
        let pad = u32::min(MAX_PAD, dims.min() / 4);
        SolidGenerator { sample, pad, dims }
    }
}

impl SampleGenerator for SolidGenerator {
    fn sample_at(&self, coords: Vector3<u32>) -> u16 {
        let pad = self.pad;
        let inside = (0..3).all(|i| coords[i] >= pad && coords[i] + pad < self.dims[i]);
        if inside {
            self.sample
        } else {
            0
        }
    }
}
