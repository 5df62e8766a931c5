use nalgebra::{point, vector, Matrix4, Point3, Vector3};

use super::BoundBox;

/// Ray cast by camera.
/// Main usecase is getting intersections with volumes ([`BoundBox::intersect`]),
/// then iterating over the intersected line segment in steps.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Point3<f32>,
    /// Unit direction
    pub direction: Vector3<f32>,
    /// Minimum parametric range
    pub min_t: f32,
    /// Maximum parametric range
    pub max_t: f32,
    /// Pixel the ray was generated for
    pub pixel_id: usize,
}

impl Ray {
    /// Construct new ray using `origin` and `direction`.
    /// `direction` must be unit vector.
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Ray {
        Ray {
            origin,
            direction,
            min_t: 0.0,
            max_t: f32::INFINITY,
            pixel_id: 0,
        }
    }

    pub fn with_range(mut self, min_t: f32, max_t: f32) -> Ray {
        self.min_t = min_t;
        self.max_t = max_t;
        self
    }

    pub fn with_pixel(mut self, pixel_id: usize) -> Ray {
        self.pixel_id = pixel_id;
        self
    }

    /// Returns point `t` units far from ray origin in ray direction
    pub fn point_from_t(&self, t: f32) -> Point3<f32> {
        self.origin + t * self.direction
    }

    /// Clip the ray against `bound_box` and its own `[min_t, max_t]` range
    pub fn clip(&self, bound_box: &BoundBox) -> Option<(f32, f32)> {
        let (t0, t1) = bound_box.intersect(self)?;
        let t0 = f32::max(t0, self.min_t);
        let t1 = f32::min(t1, self.max_t);
        if t0 >= t1 {
            None
        } else {
            Some((t0, t1))
        }
    }

    /// Transform ray from world coordinates into volume coordinates.
    ///
    /// # Params
    /// * `bound_box` - Bounding box of volume
    /// * `scale` - Shape of cells in volume
    pub fn transform_to_volume_space(&self, bound_box: BoundBox, scale: Vector3<f32>) -> Ray {
        let obj_origin = match bound_box.intersect(self) {
            Some((t0, _t1)) if t0 > 0.0 => self.point_from_t(t0),
            _ => self.origin,
        };

        let scale_inv = vector![1.0, 1.0, 1.0].component_div(&scale);
        let lower_vec = bound_box.lower - point![0.0, 0.0, 0.0];

        let transform = Matrix4::identity()
            .append_translation(&-lower_vec)
            .append_nonuniform_scaling(&scale_inv);

        let origin = transform.transform_point(&obj_origin);
        let direction = self.direction.component_mul(&scale_inv);
        Ray {
            origin,
            direction,
            min_t: 0.0,
            max_t: f32::INFINITY,
            pixel_id: self.pixel_id,
        }
    }
}

#[cfg(test)]
mod test {

    use nalgebra::vector;

    use super::*;

    #[test]
    fn to_object_space() {
        let ray = Ray::new(point![0.0, 0.0, 0.0], vector![1.0, 1.0, 1.0]);

        let bbox = BoundBox::new(point![1.0, 1.0, 1.0], point![5.0, 5.0, 5.0]);

        let scale = vector![2.0, 1.0, 1.0];

        let obj_ray = ray.transform_to_volume_space(bbox, scale);

        assert_eq!(obj_ray.origin, point![0.0, 0.0, 0.0]);
        assert_eq!(
            obj_ray.direction.normalize(),
            vector![0.5, 1.0, 1.0].normalize()
        );
    }

    #[test]
    fn clip_respects_range() {
        let ray = Ray::new(point![-1.0, 0.5, 0.5], vector![1.0, 0.0, 0.0]).with_range(0.0, 1.5);
        let bbox = BoundBox::unit();

        let (t0, t1) = ray.clip(&bbox).unwrap();

        assert!((t0 - 1.0).abs() < f32::EPSILON);
        assert!((t1 - 1.5).abs() < f32::EPSILON);

        let short = ray.with_range(0.0, 0.5);
        assert!(short.clip(&bbox).is_none());
    }
}
