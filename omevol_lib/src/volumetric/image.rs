use nalgebra::{point, vector, Point3, Vector3};

use crate::common::BoundBox;

use super::{Channel, VolumeError};

/// Multi-channel volume, voxels stored x fastest, then y, then z
#[derive(Debug, Clone)]
pub struct ImageXYZC {
    size: Vector3<usize>,
    /// Physical size of one voxel
    physical_size: Vector3<f32>,
    channels: Vec<Channel>,
}

impl ImageXYZC {
    pub fn new(
        size: Vector3<usize>,
        physical_size: Vector3<f32>,
        channels: Vec<Channel>,
    ) -> Result<ImageXYZC, VolumeError> {
        let expected = size.x * size.y * size.z;
        if expected == 0 {
            return Err(VolumeError::Layout(format!("volume of size {size:?} has no voxels")));
        }
        for channel in &channels {
            if channel.data().len() != expected {
                return Err(VolumeError::DataLength {
                    expected,
                    found: channel.data().len(),
                });
            }
        }
        let physical_size = physical_size.map(|v| if v.is_finite() && v > 0.0 { v } else { 1.0 });

        Ok(ImageXYZC {
            size,
            physical_size,
            channels,
        })
    }

    pub fn size(&self) -> Vector3<usize> {
        self.size
    }

    pub fn size_x(&self) -> usize {
        self.size.x
    }

    pub fn size_y(&self) -> usize {
        self.size.y
    }

    pub fn size_z(&self) -> usize {
        self.size.z
    }

    pub fn size_c(&self) -> usize {
        self.channels.len()
    }

    pub fn physical_size(&self) -> Vector3<f32> {
        self.physical_size
    }

    pub fn channel(&self, index: usize) -> Option<&Channel> {
        self.channels.get(index)
    }

    pub fn channel_mut(&mut self, index: usize) -> Option<&mut Channel> {
        self.channels.get_mut(index)
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    fn get_3d_index(&self, x: usize, y: usize, z: usize) -> usize {
        x + y * self.size.x + z * self.size.x * self.size.y
    }

    pub fn get_voxel(&self, channel: usize, x: usize, y: usize, z: usize) -> Option<u16> {
        if x >= self.size.x || y >= self.size.y || z >= self.size.z {
            return None;
        }
        let index = self.get_3d_index(x, y, z);
        self.channels.get(channel)?.data().get(index).copied()
    }

    /// Voxel value as float, zero outside of the volume
    fn voxel_or_zero(&self, data: &[u16], x: i64, y: i64, z: i64) -> f32 {
        if x < 0 || y < 0 || z < 0 {
            return 0.0;
        }
        let (x, y, z) = (x as usize, y as usize, z as usize);
        if x >= self.size.x || y >= self.size.y || z >= self.size.z {
            return 0.0;
        }
        data[self.get_3d_index(x, y, z)] as f32
    }

    /// Trilinear interpolation of raw intensity at voxel coordinates `pos`
    ///
    /// Neighbours outside of the volume count as zero.
    pub fn sample_at(&self, channel: usize, pos: Point3<f32>) -> f32 {
        let data = match self.channels.get(channel) {
            Some(ch) => ch.data(),
            None => return 0.0,
        };

        let base = pos.map(f32::floor);
        let x_t = pos.x - base.x;
        let y_t = pos.y - base.y;
        let z_t = pos.z - base.z;
        let (x, y, z) = (base.x as i64, base.y as i64, base.z as i64);

        let c000 = self.voxel_or_zero(data, x, y, z);
        let c100 = self.voxel_or_zero(data, x + 1, y, z);
        let c010 = self.voxel_or_zero(data, x, y + 1, z);
        let c110 = self.voxel_or_zero(data, x + 1, y + 1, z);
        let c001 = self.voxel_or_zero(data, x, y, z + 1);
        let c101 = self.voxel_or_zero(data, x + 1, y, z + 1);
        let c011 = self.voxel_or_zero(data, x, y + 1, z + 1);
        let c111 = self.voxel_or_zero(data, x + 1, y + 1, z + 1);

        // x lines
        let c00 = c000 * (1.0 - x_t) + c100 * x_t;
        let c10 = c010 * (1.0 - x_t) + c110 * x_t;
        let c01 = c001 * (1.0 - x_t) + c101 * x_t;
        let c11 = c011 * (1.0 - x_t) + c111 * x_t;

        // y plane
        let c0 = c00 * (1.0 - y_t) + c10 * y_t;
        let c1 = c01 * (1.0 - y_t) + c11 * y_t;

        c0 * (1.0 - z_t) + c1 * z_t
    }

    /// Central difference gradient of raw intensity, in voxel units
    pub fn sample_gradient(&self, channel: usize, pos: Point3<f32>) -> Vector3<f32> {
        let dx = vector![1.0, 0.0, 0.0];
        let dy = vector![0.0, 1.0, 0.0];
        let dz = vector![0.0, 0.0, 1.0];

        let sample = |p: Point3<f32>| self.sample_at(channel, p);

        vector![
            sample(pos + dx) - sample(pos - dx),
            sample(pos + dy) - sample(pos - dy),
            sample(pos + dz) - sample(pos - dz)
        ] * 0.5
    }

    /// Physical extent of the whole volume
    pub fn physical_dims(&self) -> Vector3<f32> {
        self.size.map(|v| v as f32).component_mul(&self.physical_size)
    }

    /// Physical extent scaled so that the largest side is 1, starting at the origin
    pub fn normalized_bound_box(&self) -> BoundBox {
        let dims = self.physical_dims();
        let largest = dims.max();
        let dims = if largest > 0.0 {
            dims / largest
        } else {
            vector![1.0, 1.0, 1.0]
        };
        BoundBox::from_position_dims(point![0.0, 0.0, 0.0], dims)
    }

    /// Map world position inside `bound_box` to continuous voxel coordinates
    pub fn world_to_voxel(&self, bound_box: &BoundBox, pos: Point3<f32>) -> Point3<f32> {
        let rel = (pos - bound_box.lower).component_div(&bound_box.dims());
        let max_index = self.size.map(|v| (v as f32 - 1.0).max(0.0));
        Point3::from(rel.component_mul(&max_index))
    }
}

#[cfg(test)]
mod test {

    use approx::assert_relative_eq;

    use super::*;

    fn cube() -> ImageXYZC {
        // 2x2x2, value = 100 * (x + 2y + 4z)
        let data: Vec<u16> = (0..8).map(|i| i * 100).collect();
        ImageXYZC::new(
            vector![2, 2, 2],
            vector![1.0, 1.0, 1.0],
            vec![Channel::new("c0", data)],
        )
        .unwrap()
    }

    #[test]
    fn rejects_wrong_length() {
        let res = ImageXYZC::new(
            vector![2, 2, 2],
            vector![1.0, 1.0, 1.0],
            vec![Channel::new("c0", vec![0; 7])],
        );

        assert!(matches!(
            res,
            Err(VolumeError::DataLength {
                expected: 8,
                found: 7
            })
        ));
    }

    #[test]
    fn voxel_layout() {
        let image = cube();

        assert_eq!(image.get_voxel(0, 1, 0, 0), Some(100));
        assert_eq!(image.get_voxel(0, 0, 1, 0), Some(200));
        assert_eq!(image.get_voxel(0, 0, 0, 1), Some(400));
        assert_eq!(image.get_voxel(0, 2, 0, 0), None);
        assert_eq!(image.get_voxel(1, 0, 0, 0), None);
    }

    #[test]
    fn sample_at_corners_and_center() {
        let image = cube();

        assert_relative_eq!(image.sample_at(0, point![1.0, 1.0, 1.0]), 700.0);
        assert_relative_eq!(image.sample_at(0, point![0.5, 0.5, 0.5]), 350.0);
        assert_relative_eq!(image.sample_at(0, point![0.5, 0.0, 0.0]), 50.0);
    }

    #[test]
    fn sample_outside_is_zero() {
        let image = cube();

        assert_relative_eq!(image.sample_at(0, point![-3.0, 0.0, 0.0]), 0.0);
        assert_relative_eq!(image.sample_at(0, point![5.0, 5.0, 5.0]), 0.0);
        assert_relative_eq!(image.sample_at(3, point![0.5, 0.5, 0.5]), 0.0);
    }

    #[test]
    fn gradient_points_up_the_ramp() {
        let image = cube();

        let g = image.sample_gradient(0, point![0.5, 0.5, 0.5]);

        assert!(g.z > g.y);
        assert!(g.y > g.x);
        assert!(g.x > 0.0);
    }

    #[test]
    fn normalized_box() {
        let image = ImageXYZC::new(
            vector![4, 2, 1],
            vector![1.0, 1.0, 4.0],
            vec![Channel::new("c0", vec![0; 8])],
        )
        .unwrap();

        let bbox = image.normalized_bound_box();

        assert_eq!(bbox.lower, point![0.0, 0.0, 0.0]);
        assert_relative_eq!(bbox.upper.x, 1.0);
        assert_relative_eq!(bbox.upper.y, 0.5);
        assert_relative_eq!(bbox.upper.z, 1.0);
    }

    #[test]
    fn world_to_voxel_corners() {
        let image = cube();
        let bbox = image.normalized_bound_box();

        let v = image.world_to_voxel(&bbox, point![1.0, 0.5, 0.0]);

        assert_relative_eq!(v.x, 1.0);
        assert_relative_eq!(v.y, 0.5);
        assert_relative_eq!(v.z, 0.0);
    }
}
