//! CGI front end
//!
//! Turns one CGI request into a request line, relays it to a running
//! server and prints the answer as a CGI response. Frames are printed
//! as binary PPM images.

use std::{
    collections::HashMap,
    io::{self, BufRead, BufReader, Read, Write},
    net::TcpStream,
};

use anyhow::{Context, Result};
use omevol_lib::cgi::CgiParser;

use crate::protocol::{request_from_params, request_line, Response};

/// Send one request line to `server` and read the answer
pub fn relay_line(line: &str, server: &str) -> Result<Response> {
    let stream = TcpStream::connect(server).with_context(|| format!("cannot connect to {server}"))?;
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = stream;

    writeln!(writer, "{line}")?;
    writer.flush()?;

    let mut answer = String::new();
    reader.read_line(&mut answer)?;
    let mut response: Response =
        serde_json::from_str(&answer).with_context(|| format!("invalid server answer '{}'", answer.trim()))?;

    if let Some(len) = response.bytes {
        let mut payload = Vec::new();
        (&mut reader).take(len as u64).read_to_end(&mut payload)?;
        if payload.len() != len {
            anyhow::bail!("server sent {} of {len} frame bytes", payload.len());
        }
        response.payload = Some(payload);
    }
    Ok(response)
}

/// Answer for GET and POST parameters of a CGI request
pub fn relay_params(params: &HashMap<String, String>, server: &str) -> Response {
    let request = match request_from_params(params) {
        Ok(request) => request,
        Err(e) => return Response::error(e),
    };
    let line = match request_line(&request) {
        Ok(line) => line,
        Err(e) => return Response::error(e),
    };

    relay_line(&line, server).unwrap_or_else(|e| {
        log::error!("Relay failed: {e:#}");
        Response::error(format!("{e:#}"))
    })
}

/// Complete CGI output, headers included
pub fn cgi_response(response: &Response) -> Vec<u8> {
    if let (Some(frame), Some(payload)) = (&response.frame, &response.payload) {
        let mut out = format!(
            "Status: 200 OK\r\nContent-Type: image/x-portable-pixmap\r\n\r\nP6\n{} {}\n255\n",
            frame.width, frame.height
        )
        .into_bytes();
        out.extend_from_slice(payload);
        return out;
    }

    let status = if response.ok {
        "200 OK"
    } else {
        "400 Bad Request"
    };
    format!(
        "Status: {status}\r\nContent-Type: application/json\r\n\r\n{}\n",
        response.to_line()
    )
    .into_bytes()
}

/// Handle the CGI request of this process
pub fn run(server: &str, query: Option<&str>) -> Result<()> {
    let env: HashMap<String, String> = std::env::vars().collect();
    let args: Vec<String> = query.map(String::from).into_iter().collect();
    let parser = CgiParser::new(&args, env, io::stdin().lock()).context("cannot read CGI request")?;

    let response = relay_params(&parser.params(), server);

    let mut stdout = io::stdout().lock();
    stdout.write_all(&cgi_response(&response))?;
    stdout.flush()?;
    Ok(())
}
