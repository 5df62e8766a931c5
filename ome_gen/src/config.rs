use std::{path::PathBuf, str::FromStr};

use clap::ArgMatches;
use nalgebra::{vector, Vector3};

/// Parse value of option `key`
fn parse_value<T: FromStr>(args: &ArgMatches, key: &str) -> Result<T, String> {
    let value = args
        .value_of(key)
        .ok_or_else(|| format!("Option {key} required"))?;
    value
        .parse()
        .map_err(|_| format!("Invalid value '{value}' of option {key}"))
}

/// Transform `Values` into `Vector`
fn values_to_vector3<T>(args: &ArgMatches, key: &str) -> Result<Vector3<T>, String>
where
    T: FromStr + Copy,
{
    let vals = args
        .values_of(key)
        .ok_or_else(|| format!("Option {key} required"))?
        .map(|v| v.parse::<T>().map_err(|_| format!("Invalid value '{v}' of option {key}")))
        .collect::<Result<Vec<T>, String>>()?;

    match vals[..] {
        [x, y, z] => Ok(vector![x, y, z]),
        _ => Err(format!("Option {key} takes 3 values")),
    }
}

/// App configuration
/// Config is built from args parsed by `clap`
#[derive(Debug)]
pub struct Config {
    /// Dimensions of volume
    pub dims: Vector3<u32>,
    /// Number of generated channels
    pub channels: usize,
    /// Physical size of one voxel
    pub cell_shape: Vector3<f32>,
    /// Type of generator to be used
    pub generator: GeneratorConfig,
    // Output file name
    pub file_name: PathBuf,
    /// Optional seed for RNG, to replicate results
    pub seed: Option<u64>,
}

impl Config {
    pub fn from_args(args: &ArgMatches) -> Result<Config, String> {
        let dims = values_to_vector3(args, "dims")?;
        let channels = parse_value(args, "channels")?;
        let cell_shape = values_to_vector3(args, "shape")?;
        let generator = GeneratorConfig::from_args(args)?;
        let file_name = args
            .value_of_os("output-file")
            .ok_or("Output file required")?
            .into();
        let seed = match args.value_of("seed") {
            Some(_) => Some(parse_value(args, "seed")?),
            None => None,
        };

        Ok(Config {
            dims,
            channels,
            cell_shape,
            generator,
            file_name,
            seed,
        })
    }

    /// Seed of channel `channel`, `None` for a random one
    pub fn channel_seed(&self, channel: usize) -> Option<u64> {
        self.seed.map(|seed| seed.wrapping_add(channel as u64))
    }

    pub fn voxel_count(&self) -> usize {
        self.dims.iter().map(|&d| d as usize).product()
    }
}

/// Settings specific to generator variant
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeneratorConfig {
    /// Generate shapes
    Shapes {
        n_of_shapes: usize,
        sample: u16,
        obj_size: u32,
    },
    /// Generate smooth value noise
    Noise { cell_size: u32 },
    /// Generate solid volume
    Solid { sample: u16 },
}

impl GeneratorConfig {
    pub fn from_args(args: &ArgMatches) -> Result<GeneratorConfig, String> {
        let name = args.value_of("generator").ok_or("Generator required")?;

        match name {
            "shapes" => Ok(GeneratorConfig::Shapes {
                n_of_shapes: parse_value(args, "n-of-shapes")?,
                sample: parse_value(args, "sample")?,
                obj_size: parse_value(args, "object-size")?,
            }),
            "noise" => Ok(GeneratorConfig::Noise {
                cell_size: parse_value(args, "cell-size")?,
            }),
            "solid" => Ok(GeneratorConfig::Solid {
                sample: parse_value(args, "sample")?,
            }),
            other => Err(format!("Unknown generator {other}")),
        }
    }
}

#[cfg(test)]
mod test {

    use super::*;
    use crate::args::get_command;

    fn config(args: &[&str]) -> Result<Config, String> {
        let matches = get_command()
            .try_get_matches_from(std::iter::once("ome_gen").chain(args.iter().copied()))
            .unwrap();
        Config::from_args(&matches)
    }

    #[test]
    fn shapes_config() {
        let cfg = config(&[
            "--dims=32,16,8",
            "-g",
            "shapes",
            "--n-of-shapes",
            "5",
            "--sample",
            "900",
            "--object-size",
            "6",
            "--channels",
            "3",
            "--shape=0.5,0.5,2",
            "--seed",
            "7",
            "-o",
            "out.ome.tif",
        ])
        .unwrap();

        assert_eq!(cfg.dims, vector![32, 16, 8]);
        assert_eq!(cfg.channels, 3);
        assert_eq!(cfg.cell_shape, vector![0.5, 0.5, 2.0]);
        assert_eq!(
            cfg.generator,
            GeneratorConfig::Shapes {
                n_of_shapes: 5,
                sample: 900,
                obj_size: 6
            }
        );
        assert_eq!(cfg.file_name, PathBuf::from("out.ome.tif"));
        assert_eq!(cfg.channel_seed(2), Some(9));
        assert_eq!(cfg.voxel_count(), 32 * 16 * 8);
    }

    #[test]
    fn noise_defaults() {
        let cfg = config(&["--dims=4,4,4", "-g", "noise"]).unwrap();

        assert_eq!(cfg.generator, GeneratorConfig::Noise { cell_size: 8 });
        assert_eq!(cfg.channels, 1);
        assert_eq!(cfg.seed, None);
        assert_eq!(cfg.file_name, PathBuf::from("a.ome.tif"));
    }
}
