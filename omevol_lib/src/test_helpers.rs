//! Module with helper functions
//! Saves repetition in unit tests, integration tests and benchmarks

use nalgebra::{vector, Vector3};

use crate::{
    color::ColorRgbHdr,
    scene::{AppScene, Light},
    volumetric::{Channel, ImageXYZC},
};

/// Value of voxel `(x, y, z)` in channel `c` of [`gradient_image`]
pub fn gradient_value(x: usize, y: usize, z: usize, c: usize) -> u16 {
    (x + 10 * y + 100 * z + 1000 * c) as u16
}

/// Volume where every voxel has a distinct value, see [`gradient_value`]
pub fn gradient_image(size: Vector3<usize>, channels: usize) -> ImageXYZC {
    let channels = (0..channels)
        .map(|c| {
            let mut data = Vec::with_capacity(size.x * size.y * size.z);
            for z in 0..size.z {
                for y in 0..size.y {
                    for x in 0..size.x {
                        data.push(gradient_value(x, y, z, c));
                    }
                }
            }
            Channel::new(format!("gradient_{c}"), data)
        })
        .collect();

    ImageXYZC::new(size, vector![1.0, 1.0, 1.0], channels).unwrap()
}

/// Single channel cube of value 1000 with an opaque transfer function
///
/// First voxel is 0 so the channel range is `<0;1000>`.
pub fn solid_image(size: Vector3<usize>) -> ImageXYZC {
    let mut data = vec![1000u16; size.x * size.y * size.z];
    data[0] = 0;
    let mut channel = Channel::new("solid", data);
    channel.generate_window_level(1.0, 0.5);

    ImageXYZC::new(size, vector![1.0, 1.0, 1.0], vec![channel]).unwrap()
}

pub fn solid_scene(size: Vector3<usize>) -> AppScene {
    let mut scene = AppScene::default();
    scene.init_scene_from_img(solid_image(size));
    scene
}

/// Solid scene without any light, only emission of channel 0 is visible
pub fn unlit_scene(size: Vector3<usize>, emissive: ColorRgbHdr) -> AppScene {
    let mut scene = solid_scene(size);
    scene.material.diffuse[0] = ColorRgbHdr::BLACK;
    scene.material.emissive[0] = emissive;
    for light in scene.lighting.lights.iter_mut() {
        match light {
            Light::Sky(sky) => {
                sky.color_top = ColorRgbHdr::BLACK;
                sky.color_middle = ColorRgbHdr::BLACK;
                sky.color_bottom = ColorRgbHdr::BLACK;
            }
            Light::Area(area) => area.intensity = 0.0,
        }
    }
    scene
}
