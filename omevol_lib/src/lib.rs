//! Remote controlled renderer of multi-channel OME-TIFF volumes
//!
//! Clients mutate [`camera::Camera`], [`scene::AppScene`] and
//! [`render::RenderSettings`] through [`command::Command`]s,
//! [`render::Renderer`] turns them into progressively refined frames.

pub mod camera;
pub mod cgi;
pub mod color;
pub mod command;
pub mod common;
pub mod render;
pub mod scene;
pub mod test_helpers;
pub mod transfer;
pub mod volumetric;

use camera::Camera;
use render::{RenderOptions, RenderSettings, Renderer};
use scene::AppScene;
use volumetric::ImageXYZC;

/// Render `image` from the front view until the frame converges
///
/// Returns the RGB8 frame.
pub fn render_frame(image: ImageXYZC, width: usize, height: usize, iterations: u32) -> Vec<u8> {
    let mut scene = AppScene::default();
    scene.init_scene_from_img(image);

    let mut camera = Camera::new(width, height);
    camera.frame_scene(scene.bounding_box);
    camera.film.exposure_iterations = iterations;

    let mut settings = RenderSettings::default();
    let mut renderer = Renderer::new(RenderOptions::new((width, height), true, true));

    while renderer.render(&camera, &scene, &mut settings).rendered {}

    renderer.frame().to_vec()
}
