//! Scene camera
//!
//! [`Camera`] holds the user facing parameters, [`ViewFrame`] is the
//! derived ray generator used by the renderer.

use nalgebra::{point, vector, Point3, Rotation3, Unit, Vector3};

mod film;
mod view_frame;

pub use film::{Aperture, Film, Focus, ViewMode};
pub use view_frame::ViewFrame;

use crate::common::BoundBox;

#[derive(Debug, Clone)]
pub struct Camera {
    pub from: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in degrees
    pub fov_v: f32,
    pub aperture: Aperture,
    pub focus: Focus,
    pub film: Film,
    pub scene_bounding_box: BoundBox,
    pub view_mode: ViewMode,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            from: point![0.0, 0.0, 2.0],
            target: point![0.0, 0.0, 0.0],
            up: vector![0.0, 1.0, 0.0],
            fov_v: 55.0,
            aperture: Aperture::default(),
            focus: Focus::default(),
            film: Film::default(),
            scene_bounding_box: BoundBox::unit(),
            view_mode: ViewMode::User,
        }
    }
}

impl Camera {
    pub fn new(width: usize, height: usize) -> Camera {
        let mut camera = Camera::default();
        camera.film.set_resolution(width, height);
        camera
    }

    /// Unit vector from `from` towards `target`
    pub fn direction(&self) -> Vector3<f32> {
        (self.target - self.from).normalize()
    }

    pub fn distance_to_target(&self) -> f32 {
        (self.target - self.from).magnitude()
    }

    /// Place camera on one of the axis aligned viewpoints, far enough
    /// to see the whole scene bounding box
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;

        let center = self.scene_bounding_box.center();
        let half_fov = f32::to_radians(0.5 * self.fov_v);
        let distance = self.scene_bounding_box.half_diagonal() / f32::sin(half_fov);

        let (axis, up) = match mode {
            ViewMode::Front => (vector![0.0, 0.0, 1.0], vector![0.0, 1.0, 0.0]),
            ViewMode::Back => (vector![0.0, 0.0, -1.0], vector![0.0, 1.0, 0.0]),
            ViewMode::Left => (vector![-1.0, 0.0, 0.0], vector![0.0, 1.0, 0.0]),
            ViewMode::Right => (vector![1.0, 0.0, 0.0], vector![0.0, 1.0, 0.0]),
            ViewMode::Top => (vector![0.0, 1.0, 0.0], vector![0.0, 0.0, -1.0]),
            ViewMode::Bottom => (vector![0.0, -1.0, 0.0], vector![0.0, 0.0, 1.0]),
            ViewMode::User => return,
        };

        self.target = center;
        self.from = center + axis * distance;
        self.up = up;
        self.focus.focal_distance = distance;
    }

    /// Store the scene bounds and look at them from the front
    pub fn frame_scene(&mut self, bound_box: BoundBox) {
        self.scene_bounding_box = bound_box;
        self.set_view_mode(ViewMode::Front);
    }

    /// Rotate the camera around its target
    ///
    /// `theta` is the yaw about `up`, `phi` the pitch about the camera right axis, both in degrees.
    pub fn orbit(&mut self, theta: f32, phi: f32) {
        let up = match Unit::try_new(self.up, f32::EPSILON) {
            Some(up) => up,
            None => return,
        };

        let yaw = Rotation3::from_axis_angle(&up, f32::to_radians(theta));
        let mut offset = yaw * (self.from - self.target);

        let right = offset.cross(&self.up);
        if let Some(right) = Unit::try_new(right, 1e-6) {
            let pitch = Rotation3::from_axis_angle(&right, f32::to_radians(phi));
            offset = pitch * offset;
            self.up = pitch * self.up;
        }

        self.from = self.target + offset;
        self.view_mode = ViewMode::User;
    }

    /// Ray generator for the current parameters
    pub fn view_frame(&self) -> ViewFrame {
        ViewFrame::new(
            self.from,
            self.target - self.from,
            self.up,
            self.fov_v,
            self.film.aspect(),
        )
        .with_lens(self.aperture.size, self.focus.focal_distance)
    }
}
