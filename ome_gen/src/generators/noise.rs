use nalgebra::Vector3;

use super::SampleGenerator;

/// Smooth value noise
///
/// Random values on a lattice with cells of `cell_size` voxels,
/// interpolated with smoothstep in between.
pub struct NoiseGenerator {
    seed: u64,
    cell_size: f32,
}

impl NoiseGenerator {
    pub fn new(cell_size: u32, seed: Option<u64>) -> NoiseGenerator {
        NoiseGenerator {
            seed: seed.unwrap_or_else(|| fastrand::u64(..)),
            cell_size: u32::max(cell_size, 1) as f32,
        }
    }

    /// Value `<0;1>` of lattice point
    fn lattice(&self, x: u32, y: u32, z: u32) -> f32 {
        // splitmix64 finalizer over the combined coordinates
        let mut h = self.seed
            ^ (x as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15)
            ^ (y as u64).wrapping_mul(0xc2b2_ae3d_27d4_eb4f)
            ^ (z as u64).wrapping_mul(0x1656_67b1_9e37_79f9);
        h = (h ^ (h >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        h = (h ^ (h >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        h ^= h >> 31;
        (h >> 40) as f32 / (1u64 << 24) as f32
    }
}

fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

fn lerp(t: f32, a: f32, b: f32) -> f32 {
    a + t * (b - a)
}

impl SampleGenerator for NoiseGenerator {
    fn sample_at(&self, coords: Vector3<u32>) -> u16 {
        let p = coords.map(|c| c as f32 / self.cell_size);
        let cell = p.map(|v| v.floor() as u32);
        let t = (p - cell.map(|c| c as f32)).map(smoothstep);

        let corner = |dx: u32, dy: u32, dz: u32| self.lattice(cell.x + dx, cell.y + dy, cell.z + dz);

        let x00 = lerp(t.x, corner(0, 0, 0), corner(1, 0, 0));
        let x10 = lerp(t.x, corner(0, 1, 0), corner(1, 1, 0));
        let x01 = lerp(t.x, corner(0, 0, 1), corner(1, 0, 1));
        let x11 = lerp(t.x, corner(0, 1, 1), corner(1, 1, 1));
        let value = lerp(t.z, lerp(t.y, x00, x10), lerp(t.y, x01, x11));

        (value.clamp(0.0, 1.0) * u16::MAX as f32) as u16
    }
}
