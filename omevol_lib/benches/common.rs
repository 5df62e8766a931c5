pub use criterion::Criterion;

use nalgebra::vector;
use omevol_lib::{
    camera::Camera,
    render::{RenderOptions, RenderSettings, Renderer},
    scene::AppScene,
    test_helpers,
};

pub const WIDTH: usize = 256;
pub const HEIGHT: usize = 256;

/// Two channel gradient cube, framed from the front
pub fn bench_scene() -> (Camera, AppScene) {
    let mut scene = AppScene::default();
    scene.init_scene_from_img(test_helpers::gradient_image(vector![64, 64, 64], 2));

    let mut camera = Camera::new(WIDTH, HEIGHT);
    camera.frame_scene(scene.bounding_box);
    // never converge, every call renders
    camera.film.exposure_iterations = u32::MAX;

    (camera, scene)
}

pub struct BenchOptions {
    pub render_options: RenderOptions,
    pub bench_name: &'static str,
}

impl BenchOptions {
    pub fn new(bench_name: &'static str, ray_termination: bool, multi_thread: bool) -> BenchOptions {
        BenchOptions {
            render_options: RenderOptions::new((WIDTH, HEIGHT), ray_termination, multi_thread),
            bench_name,
        }
    }

    /// One progressive iteration per benchmark sample
    pub fn get_benchmark(self) -> impl FnOnce(&mut Criterion) {
        move |c: &mut Criterion| {
            let (camera, scene) = bench_scene();
            let mut settings = RenderSettings::default();
            let mut renderer = Renderer::new(self.render_options);

            c.bench_function(self.bench_name, |b| {
                b.iter(|| renderer.render(&camera, &scene, &mut settings))
            });
        }
    }
}
