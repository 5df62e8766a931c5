//! Argument parsing and validation
//! Uses library `clap`

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

pub fn is_port(num: &str) -> Result<(), String> {
    match num.parse::<u16>() {
        Ok(_) => Ok(()),
        Err(_) => Err("Port must be in range <0;65535>".into()),
    }
}

pub fn is_float_number(num: &str) -> Result<(), String> {
    let n = num.parse::<f32>();
    match n {
        Ok(n) => {
            if n > 0.0 && n.is_finite() {
                Ok(())
            } else {
                Err("Number must be greater than 0.0".into())
            }
        }
        Err(_) => Err("Number required".into()),
    }
}

pub fn get_command<'a>() -> Command<'a> {
    Command::new("vol_server")
        .version("0.1.0")
        .about("Remote controlled volume renderer of OME-TIFF images")
        .arg(
            Arg::new("config")
                .help("TOML configuration file, command line options take precedence")
                .long("config")
                .short('c')
                .value_name("FILE")
                .allow_invalid_utf8(true)
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("host")
                .help("Address to listen on")
                .long("host")
                .value_name("HOST"),
        )
        .arg(
            Arg::new("port")
                .help("Port to listen on, 0 picks a free port")
                .long("port")
                .short('p')
                .value_name("PORT")
                .validator(is_port),
        )
        .arg(
            Arg::new("volume")
                .help("OME-TIFF volume loaded on start")
                .long("volume")
                .short('v')
                .value_name("FILE")
                .allow_invalid_utf8(true)
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("asset-path")
                .help("Directory relative volume paths are resolved against")
                .long("asset-path")
                .value_name("DIR")
                .allow_invalid_utf8(true)
                .value_hint(ValueHint::DirPath),
        )
        .arg(
            Arg::new("resolution")
                .help("Size of rendered frames")
                .long("resolution")
                .short('r')
                .number_of_values(2)
                .value_names(&["W", "H"])
                .use_value_delimiter(true)
                .require_value_delimiter(true)
                .require_equals(true)
                .validator(is_positive_number),
        )
        .arg(
            Arg::new("iterations")
                .help("Progressive iterations until a frame is final")
                .long("iterations")
                .short('i')
                .value_name("N")
                .validator(is_positive_number),
        )
        .arg(
            Arg::new("density")
                .help("Density scale of the volume")
                .long("density")
                .value_name("SCALE")
                .validator(is_float_number),
        )
        .arg(
            Arg::new("single-thread")
                .help("Render on the session thread only")
                .long("single-thread"),
        )
        .arg(
            Arg::new("no-ert")
                .help("Disable early ray termination")
                .long("no-ert"),
        )
        .subcommand(
            Command::new("cgi")
                .about("Relay one CGI request to a running server")
                .arg(
                    Arg::new("server")
                        .help("Address of the server, defaults to the configured host and port")
                        .long("server")
                        .value_name("ADDR"),
                )
                .arg(
                    Arg::new("query")
                        .help("Query string used when QUERY_STRING is not set")
                        .value_name("QUERY"),
                ),
        )
}
