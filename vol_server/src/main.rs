//! Remote controlled volume renderer
//!
//! Serve commands on a TCP port:
//! `cargo run --release --bin vol_server -- --volume cell.ome.tif`
//!
//! Relay a CGI request to a running server:
//! `vol_server cgi --server 127.0.0.1:1235`

use anyhow::{Context, Result};
use omevol_lib::command::Command;

mod args;
mod cgi_relay;
mod config;
mod defaults;
mod protocol;
mod render_thread;
mod server;
mod session;

use crate::{
    args::get_command, config::ServerConfig, protocol::Request, render_thread::RenderThread,
    server::start_server, session::Session,
};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = get_command().get_matches();
    let config = ServerConfig::from_args(&args).context("invalid configuration")?;

    match args.subcommand() {
        Some(("cgi", cgi_args)) => {
            let server = cgi_args
                .value_of("server")
                .map(String::from)
                .unwrap_or_else(|| config.address());
            cgi_relay::run(&server, cgi_args.value_of("query"))
        }
        _ => serve(config),
    }
}

fn serve(config: ServerConfig) -> Result<()> {
    log::debug!("{config:?}");

    let render_thread = RenderThread::new(Session::new(&config));
    let session = render_thread.get_sender();
    let render_handle = render_thread.start();

    if let Some(volume) = &config.volume {
        let command = Command::LoadOmeTif {
            path: volume.to_string_lossy().into_owned(),
        };
        let response = session.request(Request::Command(command));
        if !response.ok {
            log::error!(
                "Cannot load {}: {}",
                volume.display(),
                response.error.unwrap_or_default()
            );
        }
    }

    let server = start_server(&config.address(), session.clone())
        .with_context(|| format!("cannot listen on {}", config.address()))?;
    println!("Listening on {}", server.addr);

    server.join();
    session.shut_down();
    if render_handle.join().is_err() {
        anyhow::bail!("session thread panicked");
    }
    Ok(())
}
