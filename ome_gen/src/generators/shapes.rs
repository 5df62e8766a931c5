use std::ops::RangeBounds;

use nalgebra::{vector, Vector3};

use super::SampleGenerator;

/// Generate volume with a number of randomly placed shapes
pub struct ShapesGenerator {
    shapes: Vec<ShapeInfo>,
}

impl ShapesGenerator {
    pub fn new(
        dims: Vector3<u32>,
        n_of_shapes: usize,
        sample: u16,
        obj_size: u32,
        seed: Option<u64>,
    ) -> ShapesGenerator {
        let size = Vector3::repeat(obj_size);
        let size_variance = Vector3::repeat(obj_size / 4);
        let sample_variance = sample / 10;

        let random_shape_gen =
            ShapeInfoGenerator::new(dims, size, size_variance, sample, sample_variance, seed);
        let shapes = random_shape_gen.get_shapes(n_of_shapes);
        log::debug!("Generated {} shapes", shapes.len());
        ShapesGenerator { shapes }
    }
}

impl SampleGenerator for ShapesGenerator {
    fn sample_at(&self, coords: Vector3<u32>) -> u16 {
        self.shapes
            .iter()
            .filter(|shape| shape.contains(coords))
            .map(|shape| shape.render_at(coords - shape.position_low))
            .find(|&sample| sample != 0)
            .unwrap_or(0)
    }
}

// # of enum ShapeType variants
const N_OF_SHAPE_KINDS: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeType {
    Cuboid,
    Sphere,
}

/// One shape in volume
/// Occupies voxels from `position_low` up to, but not including, `position_high`
#[derive(Debug)]
pub struct ShapeInfo {
    pub position_low: Vector3<u32>,
    pub position_high: Vector3<u32>,
    pub shape_type: ShapeType,
    pub sample: u16,
}

impl ShapeInfo {
    #[must_use]
    pub fn new(
        position_low: Vector3<u32>,
        position_high: Vector3<u32>,
        shape_type: ShapeType,
        sample: u16,
    ) -> Self {
        Self {
            position_low,
            position_high,
            shape_type,
            sample,
        }
    }

    fn contains(&self, coords: Vector3<u32>) -> bool {
        (0..3).all(|i| coords[i] >= self.position_low[i] && coords[i] < self.position_high[i])
    }

    fn render_at(&self, offset: Vector3<u32>) -> u16 {
        match self.shape_type {
            ShapeType::Cuboid => self.sample,
            ShapeType::Sphere => self.render_sphere(offset),
        }
    }

    fn render_sphere(&self, offset: Vector3<u32>) -> u16 {
        let extent = (self.position_high - self.position_low).cast::<f32>();
        let center = extent / 2.0;
        let r = extent.min() / 2.0;

        // voxel centers
        let point = offset.cast::<f32>().add_scalar(0.5);
        if (point - center).magnitude() <= r {
            self.sample
        } else {
            0
        }
    }
}

/// Generate shapes
/// Helper type
pub struct ShapeInfoGenerator {
    rng: fastrand::Rng,
    vol_dims: Vector3<u32>,
    size: Vector3<u32>,
    size_variance: Vector3<u32>,
    sample: u16,
    sample_variance: u16,
}

impl ShapeInfoGenerator {
    #[must_use]
    pub fn new(
        vol_dims: Vector3<u32>,
        size: Vector3<u32>,
        size_variance: Vector3<u32>,
        sample: u16,
        sample_variance: u16,
        seed: Option<u64>,
    ) -> Self {
        let rng = fastrand::Rng::new();
        if let Some(seed) = seed {
            rng.seed(seed);
        }

        Self {
            rng,
            vol_dims,
            size,
            size_variance,
            sample,
            sample_variance,
        }
    }

    fn random_shape(&self) -> ShapeType {
        match self.rng.u8(0..N_OF_SHAPE_KINDS) {
            0 => ShapeType::Cuboid,
            _ => ShapeType::Sphere,
        }
    }

    fn random_vector<R>(&self, ranges: Vector3<R>) -> Vector3<u32>
    where
        R: RangeBounds<u32> + Clone,
    {
        vector![
            self.rng.u32(ranges[0].clone()),
            self.rng.u32(ranges[1].clone()),
            self.rng.u32(ranges[2].clone())
        ]
    }

    pub fn get_shapes(&self, n: usize) -> Vec<ShapeInfo> {
        (0..n).map(|_| self.get_shape()).collect()
    }

    pub fn get_shape(&self) -> ShapeInfo {
        let shape_type = self.random_shape();

        // Shapes are at least one voxel and never bigger than the volume
        let size_min = (self.size - self.size_variance.inf(&self.size))
            .map(|s| s.max(1))
            .inf(&self.vol_dims);
        let size_max = self
            .size
            .zip_map(&self.size_variance, u32::saturating_add)
            .map(|s| s.max(1))
            .inf(&self.vol_dims);

        let size_ranges = vector![
            size_min.x..=size_max.x,
            size_min.y..=size_max.y,
            size_min.z..=size_max.z
        ];
        let size = self.random_vector(size_ranges);

        // Spawn shape in positions it fits
        let pos_ranges = vector![
            0..=(self.vol_dims.x - size.x),
            0..=(self.vol_dims.y - size.y),
            0..=(self.vol_dims.z - size.z)
        ];
        let position_low = self.random_vector(pos_ranges);
        let position_high = position_low + size;

        let sample = self.random_sample();

        ShapeInfo::new(position_low, position_high, shape_type, sample)
    }

    fn random_sample(&self) -> u16 {
        // Saturating, an empty sample would vanish into the background
        let low = self.sample.saturating_sub(self.sample_variance).max(1);
        let high = self.sample.saturating_add(self.sample_variance).max(low);
        self.rng.u16(low..=high)
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn shapes_fit_volume() {
        let dims = vector![10, 6, 3];
        let gen = ShapeInfoGenerator::new(dims, vector![8, 8, 8], vector![2, 2, 2], 100, 10, Some(4));

        for shape in gen.get_shapes(50) {
            assert!(shape.position_high <= dims);
            assert!(shape.position_low < shape.position_high);
            assert!((90..=110).contains(&shape.sample));
        }
    }

    #[test]
    fn cuboid_is_filled() {
        let shape = ShapeInfo::new(vector![2, 2, 2], vector![4, 5, 6], ShapeType::Cuboid, 40);
        let gen = ShapesGenerator { shapes: vec![shape] };

        assert_eq!(gen.sample_at(vector![2, 2, 2]), 40);
        assert_eq!(gen.sample_at(vector![3, 4, 5]), 40);
        assert_eq!(gen.sample_at(vector![4, 4, 5]), 0);
        assert_eq!(gen.sample_at(vector![1, 2, 2]), 0);
    }

    #[test]
    fn sphere_corners_are_empty() {
        let shape = ShapeInfo::new(vector![0, 0, 0], vector![8, 8, 8], ShapeType::Sphere, 9);
        let gen = ShapesGenerator { shapes: vec![shape] };

        assert_eq!(gen.sample_at(vector![4, 4, 4]), 9);
        assert_eq!(gen.sample_at(vector![0, 0, 0]), 0);
        assert_eq!(gen.sample_at(vector![7, 7, 7]), 0);
        assert_eq!(gen.sample_at(vector![0, 4, 4]), 9);
    }

    #[test]
    fn same_seed_same_shapes() {
        let a = ShapesGenerator::new(vector![20, 20, 20], 3, 500, 6, Some(9));
        let b = ShapesGenerator::new(vector![20, 20, 20], 3, 500, 6, Some(9));

        let positions = |g: &ShapesGenerator| {
            g.shapes
                .iter()
                .map(|s| (s.position_low, s.position_high, s.shape_type, s.sample))
                .collect::<Vec<_>>()
        };
        assert_eq!(positions(&a), positions(&b));
    }
}
