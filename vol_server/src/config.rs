use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use clap::ArgMatches;
use omevol_lib::render::{RenderOptions, RenderParams};
use serde::{Deserialize, Serialize};

use crate::defaults;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value '{value}' of option {name}")]
    InvalidArgument { name: &'static str, value: String },
}

/// Server configuration
/// Built from an optional TOML file, then overridden by command line options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Volume loaded on start
    pub volume: Option<PathBuf>,
    /// Root of relative volume paths
    pub asset_path: Option<PathBuf>,
    pub resolution: (usize, usize),
    pub exposure_iterations: u32,
    pub multi_thread: bool,
    pub ray_termination: bool,
    pub density_scale: f32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::HOST.into(),
            port: defaults::PORT,
            volume: None,
            asset_path: None,
            resolution: (defaults::RENDER_WIDTH, defaults::RENDER_HEIGHT),
            exposure_iterations: defaults::EXPOSURE_ITERATIONS,
            multi_thread: defaults::MULTI_THREAD,
            ray_termination: defaults::ERT,
            density_scale: defaults::DENSITY_SCALE,
        }
    }
}

/// Parse option `key` if present
fn parse_value<T: FromStr>(args: &ArgMatches, key: &'static str) -> Result<Option<T>, ConfigError> {
    match args.value_of(key) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidArgument {
                name: key,
                value: value.into(),
            }),
        None => Ok(None),
    }
}

impl ServerConfig {
    pub fn from_toml(contents: &str) -> Result<ServerConfig, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load_from_file(path: &Path) -> Result<ServerConfig, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_args(args: &ArgMatches) -> Result<ServerConfig, ConfigError> {
        let mut config = match args.value_of_os("config") {
            Some(path) => Self::load_from_file(Path::new(path))?,
            None => ServerConfig::default(),
        };
        config.apply_args(args)?;
        Ok(config)
    }

    /// Override values set on the command line
    pub fn apply_args(&mut self, args: &ArgMatches) -> Result<(), ConfigError> {
        if let Some(host) = args.value_of("host") {
            self.host = host.into();
        }
        if let Some(port) = parse_value(args, "port")? {
            self.port = port;
        }
        if let Some(volume) = args.value_of_os("volume") {
            self.volume = Some(volume.into());
        }
        if let Some(asset_path) = args.value_of_os("asset-path") {
            self.asset_path = Some(asset_path.into());
        }
        if let Some(values) = args.values_of("resolution") {
            let values: Vec<&str> = values.collect();
            let parse = |v: &str| {
                v.parse::<usize>().map_err(|_| ConfigError::InvalidArgument {
                    name: "resolution",
                    value: values.join(","),
                })
            };
            if let [w, h] = values[..] {
                self.resolution = (parse(w)?, parse(h)?);
            }
        }
        if let Some(iterations) = parse_value(args, "iterations")? {
            self.exposure_iterations = iterations;
        }
        if let Some(density) = parse_value(args, "density")? {
            self.density_scale = density;
        }
        if args.is_present("single-thread") {
            self.multi_thread = false;
        }
        if args.is_present("no-ert") {
            self.ray_termination = false;
        }
        Ok(())
    }

    /// `host:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions::new(self.resolution, self.ray_termination, self.multi_thread)
    }

    pub fn render_params(&self) -> RenderParams {
        RenderParams {
            density_scale: self.density_scale,
            ..Default::default()
        }
    }
}
