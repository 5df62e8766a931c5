use nalgebra::{vector, Point3, Vector2, Vector3};

use crate::common::{BoundBox, Ray, ViewportBox};

/// Ray generator derived from a [`Camera`](super::Camera) snapshot
///
/// Recomputed whenever camera parameters change.
#[derive(Debug, Clone)]
pub struct ViewFrame {
    /// Position of the camera in world coordinates
    position: Point3<f32>,
    /// Unit view direction
    direction: Vector3<f32>,
    /// Unit up direction, orthogonal to `direction`
    up: Vector3<f32>,
    /// Unit right direction
    right: Vector3<f32>,
    /// Size of image plane at distance 1
    img_plane_size: Vector2<f32>,
    /// Direction of ray passing through pixel \[0,0\] | upper left corner, in line with buffer convention
    dir_00: Vector3<f32>,
    /// Offset between left and right edge of the image plane
    du: Vector3<f32>,
    /// Offset between top and bottom edge of the image plane
    dv: Vector3<f32>,
    aperture: f32,
    focal_distance: f32,
}

impl ViewFrame {
    /// # Arguments
    ///
    /// * `position` - camera position
    /// * `direction` - viewing direction, does not have to be normalized
    /// * `up_hint` - approximate up vector, made orthogonal to `direction`
    /// * `fov_y` - vertical field of view in degrees
    /// * `aspect` - width / height of the image
    pub fn new(
        position: Point3<f32>,
        direction: Vector3<f32>,
        up_hint: Vector3<f32>,
        fov_y: f32,
        aspect: f32,
    ) -> ViewFrame {
        let direction = direction.normalize();

        let mut right = direction.cross(&up_hint);
        if right.magnitude_squared() < 1e-12 {
            // up parallel with direction, pick any perpendicular axis
            right = direction.cross(&vector![0.0, 0.0, 1.0]);
            if right.magnitude_squared() < 1e-12 {
                right = direction.cross(&vector![1.0, 0.0, 0.0]);
            }
        }
        let right = right.normalize();
        let up = right.cross(&direction);

        let h = 2.0 * f32::tan(f32::to_radians(0.5 * fov_y));
        let img_plane_size = vector![h * aspect, h];

        let du = img_plane_size.x * right;
        let dv = -img_plane_size.y * up; // negative, pointing downwards
        let dir_00 = direction - 0.5 * du - 0.5 * dv;

        ViewFrame {
            position,
            direction,
            up,
            right,
            img_plane_size,
            dir_00,
            du,
            dv,
            aperture: 0.0,
            focal_distance: 1.0,
        }
    }

    /// Enable thin lens depth of field
    pub fn with_lens(mut self, aperture: f32, focal_distance: f32) -> ViewFrame {
        self.aperture = f32::max(aperture, 0.0);
        self.focal_distance = f32::max(focal_distance, f32::EPSILON);
        self
    }

    /// Get ray originating in the camera crossing view plane in coordinates `pixel_coord`
    ///
    /// # Arguments
    ///
    /// * `pixel_coord` - Coordinates in the range of `<0;1>x<0;1>`, point \[0,0\] being upper left corner
    /// * `lens_sample` - Point on the lens in `<-1;1>x<-1;1>`, ignored for pinhole cameras
    pub fn get_ray(&self, pixel_coord: (f32, f32), lens_sample: (f32, f32)) -> Ray {
        let dir = self.dir_00 + self.du * pixel_coord.0 + self.dv * pixel_coord.1;
        let dir = dir.normalize();

        if self.aperture <= 0.0 {
            return Ray::new(self.position, dir);
        }

        // Every ray through the pixel meets at the focal plane
        let t_focus = self.focal_distance / dir.dot(&self.direction);
        let focal_point = self.position + dir * t_focus;
        let (lens_x, lens_y) = concentric_disk(lens_sample);
        let origin = self.position + self.aperture * (lens_x * self.right + lens_y * self.up);
        Ray::new(origin, (focal_point - origin).normalize())
    }

    /// Position of the camera in world coordinates
    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    /// Project bounding box of a volume to viewport
    ///
    /// Resulting viewport box is the minimal orthogonal rectangular projection.
    /// Returns full screen if any corner lies behind the camera.
    pub fn project_box(&self, bound_box: BoundBox) -> ViewportBox {
        // Source: https://github.com/ospray/ospray, Intel corp., Apache 2.0 license
        let mut viewbox = ViewportBox::new();

        let dun = self.du.normalize() / self.img_plane_size.x;
        let dvn = self.dv.normalize() / self.img_plane_size.y;

        for point in bound_box {
            let v = point - self.position;
            let den = v.dot(&self.direction);
            if den <= f32::EPSILON {
                return ViewportBox::full();
            }
            let screen_dir = v / den - self.dir_00;
            let x = screen_dir.dot(&dun);
            let y = screen_dir.dot(&dvn);
            viewbox.add_point(x, y);
        }

        viewbox
    }

    /// Get the distance from camera origin to the middle of a bound box
    pub fn box_distance(&self, bound_box: &BoundBox) -> f32 {
        (bound_box.center() - self.position).magnitude()
    }

    pub fn get_dir(&self) -> Vector3<f32> {
        self.direction
    }

    pub fn get_pos(&self) -> Point3<f32> {
        self.position
    }

    pub fn get_up(&self) -> Vector3<f32> {
        self.up
    }

    pub fn get_right(&self) -> Vector3<f32> {
        self.right
    }
}

/// Map a point of the square `<-1;1>x<-1;1>` onto the unit disk, keeping the sample density uniform
fn concentric_disk((x, y): (f32, f32)) -> (f32, f32) {
    if x == 0.0 && y == 0.0 {
        return (0.0, 0.0);
    }
    let (radius, theta) = if x.abs() > y.abs() {
        (x, std::f32::consts::FRAC_PI_4 * (y / x))
    } else {
        (y, std::f32::consts::FRAC_PI_2 - std::f32::consts::FRAC_PI_4 * (x / y))
    };
    (radius * theta.cos(), radius * theta.sin())
}
