//! Multi-channel OME-TIFF volume generator
//!
//! `ome_gen --dims=128,128,64 -c 3 -g shapes --n-of-shapes 20 --sample 2000 --object-size 16`

use anyhow::Result;
use config::Config;

mod args;
mod config;
mod generators;

use crate::{args::get_command, generators::generate_vol};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = get_command().get_matches();
    let cfg = Config::from_args(&args).map_err(anyhow::Error::msg)?;

    println!("Generating volume...");
    log::info!("{cfg:?}");

    generate_vol(&cfg)
}
