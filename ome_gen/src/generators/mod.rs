use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use nalgebra::{vector, Vector3};
use omevol_lib::volumetric::{write_ome_tiff, Channel, ImageXYZC, VolumeError};
use rayon::prelude::*;

use crate::config::{Config, GeneratorConfig};

mod noise;
mod shapes;
mod solid;

// Generates one sample at a time, at any location
pub trait SampleGenerator: Sync {
    fn sample_at(&self, coords: Vector3<u32>) -> u16;
}

/// Generator of channel `channel`
pub fn get_sample_generator(config: &Config, channel: usize) -> Box<dyn SampleGenerator> {
    let seed = config.channel_seed(channel);
    match config.generator {
        GeneratorConfig::Shapes {
            n_of_shapes,
            sample,
            obj_size,
        } => Box::new(shapes::ShapesGenerator::new(
            config.dims,
            n_of_shapes,
            sample,
            obj_size,
            seed,
        )),
        GeneratorConfig::Noise { cell_size } => {
            Box::new(noise::NoiseGenerator::new(cell_size, seed))
        }
        GeneratorConfig::Solid { sample } => Box::new(solid::SolidGenerator::new(config.dims, sample)),
    }
}

/// Samples of one channel, x fastest
///
/// Z slices are generated in parallel.
pub fn generate_channel(
    generator: &dyn SampleGenerator,
    dims: Vector3<u32>,
    progress: &ProgressBar,
) -> Vec<u16> {
    let (size_x, size_y) = (dims.x as usize, dims.y as usize);
    let slice_len = size_x * size_y;
    let mut data = vec![0; slice_len * dims.z as usize];
    if slice_len == 0 {
        return data;
    }

    data.par_chunks_mut(slice_len)
        .enumerate()
        .for_each(|(z, slice)| {
            for y in 0..size_y {
                for x in 0..size_x {
                    slice[x + y * size_x] = generator.sample_at(vector![x as u32, y as u32, z as u32]);
                }
            }
            progress.inc(1);
        });

    data
}

pub fn generate_image(config: &Config, progress: &ProgressBar) -> Result<ImageXYZC, VolumeError> {
    let channels = (0..config.channels)
        .map(|c| {
            let generator = get_sample_generator(config, c);
            Channel::new(format!("Ch{c}"), generate_channel(generator.as_ref(), config.dims, progress))
        })
        .collect();

    ImageXYZC::new(config.dims.map(|d| d as usize), config.cell_shape, channels)
}

pub fn generate_vol(config: &Config) -> Result<()> {
    let progress = ProgressBar::new(config.dims.z as u64 * config.channels as u64);
    progress.set_style(
        ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} slices"),
    );

    let image = generate_image(config, &progress).context("cannot assemble volume")?;
    write_ome_tiff(&config.file_name, &image)
        .with_context(|| format!("cannot write {}", config.file_name.display()))?;

    progress.finish_with_message("done");
    log::info!(
        "Generating finished, {} voxels in {} channels, result in {}",
        config.voxel_count(),
        config.channels,
        config.file_name.display()
    );
    Ok(())
}
