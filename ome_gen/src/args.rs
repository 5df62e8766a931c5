//! Argument parsing and validation
//! Uses library `clap`

use std::ffi::OsStr;

use clap::{Arg, Command, ValueHint};

// up to 32bit value
pub fn is_positive_number(num: &str) -> Result<(), String> {
    let n = num.parse::<u32>();
    match n {
        Ok(n) => {
            if n > 0 {
                Ok(())
            } else {
                Err("Number must be greater than 0".into())
            }
        }
        Err(_) => Err("Number required".into()),
    }
}

pub fn can_fit_u16(num: &str) -> Result<(), String> {
    let n = num.parse::<u16>();
    match n {
        Ok(_) => Ok(()),
        Err(_) => Err("Number does not fit in range <0;65535>".into()),
    }
}

pub fn is_float_number(num: &str) -> Result<(), String> {
    let n = num.parse::<f32>();
    match n {
        Ok(n) => {
            if n > 0.0 {
                Ok(())
            } else {
                Err("Number must be greater than 0.0".into())
            }
        }
        Err(_) => Err("Number required".into()),
    }
}

pub fn is_channel_count(num: &str) -> Result<(), String> {
    is_positive_number(num)?;
    match num.parse::<u32>() {
        Ok(n) if n <= 16 => Ok(()),
        _ => Err("At most 16 channels are supported".into()),
    }
}

pub const GENERATOR_NAMES: &[&str] = &["shapes", "noise", "solid"];

pub fn get_command<'a>() -> Command<'a> {
    Command::new("ome_gen")
        .version("0.1.0")
        .about("Multi-channel OME-TIFF volume generator")
        .arg(
            Arg::new("dims")
                .help("Dimensions of volume")
                .long("dims")
                .short('d')
                .required(true)
                .number_of_values(3)
                .value_names(&["X", "Y", "Z"])
                .use_value_delimiter(true)
                .require_value_delimiter(true)
                .require_equals(true)
                .validator(is_positive_number),
        )
        .arg(
            Arg::new("channels")
                .help("Number of channels, every channel gets its own seed")
                .long("channels")
                .short('c')
                .value_name("N")
                .default_value("1")
                .validator(is_channel_count),
        )
        .arg(
            Arg::new("shape")
                .help("Physical size of one voxel")
                .long("shape")
                .short('s')
                .number_of_values(3)
                .value_names(&["X", "Y", "Z"])
                .use_value_delimiter(true)
                .require_value_delimiter(true)
                .require_equals(true)
                .default_values(&["1", "1", "1"])
                .validator(is_float_number),
        )
        .arg(
            Arg::new("generator")
                .help("Type of generator")
                .long("generator")
                .short('g')
                .required(true)
                .requires_ifs(&[
                    ("solid", "sample"), // if solid is set, require option sample
                    ("shapes", "n-of-shapes"),
                    ("shapes", "sample"),
                    ("shapes", "object-size"),
                ])
                .takes_value(true)
                .value_name("NAME")
                .possible_values(GENERATOR_NAMES),
        )
        .arg(
            Arg::new("seed")
                .help("Seed for RNG, leave out for random seed")
                .long("seed")
                .value_name("SEED")
                .validator(is_positive_number),
        )
        .arg(
            Arg::new("sample")
                .help("Values of generated object")
                .long("sample")
                .value_name("VALUE")
                .validator(|s| is_positive_number(s).and(can_fit_u16(s))),
        )
        .arg(
            Arg::new("object-size")
                .help("Size of individual generated objects")
                .long("object-size")
                .value_name("SIDE")
                .validator(is_positive_number),
        )
        .arg(
            Arg::new("n-of-shapes")
                .help("Number of shapes generated in volume")
                .long("n-of-shapes")
                .value_name("N")
                .validator(is_positive_number),
        )
        .arg(
            Arg::new("cell-size")
                .help("Side of noise lattice cells in voxels")
                .long("cell-size")
                .value_name("SIDE")
                .default_value("8")
                .validator(is_positive_number),
        )
        .arg(
            Arg::new("output-file")
                .help("File name to output")
                .long("output-file")
                .short('o')
                .value_name("FILE")
                .allow_invalid_utf8(true)
                .value_hint(ValueHint::FilePath)
                .default_value_os(OsStr::new("a.ome.tif")),
        )
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn shapes_need_parameters() {
        let result = get_command().try_get_matches_from(["ome_gen", "--dims=8,8,8", "-g", "shapes"]);

        assert!(result.is_err());
    }

    #[test]
    fn solid_arguments() {
        let matches = get_command()
            .try_get_matches_from(["ome_gen", "--dims=8,4,2", "-g", "solid", "--sample", "700"])
            .unwrap();

        assert_eq!(matches.value_of("generator"), Some("solid"));
        assert_eq!(matches.value_of("channels"), Some("1"));
        let dims: Vec<&str> = matches.values_of("dims").unwrap().collect();
        assert_eq!(dims, ["8", "4", "2"]);
    }

    #[test]
    fn sample_range() {
        assert!(can_fit_u16("65535").is_ok());
        assert!(can_fit_u16("65536").is_err());
        assert!(is_channel_count("4").is_ok());
        assert!(is_channel_count("17").is_err());
        assert!(is_channel_count("0").is_err());
    }
}
