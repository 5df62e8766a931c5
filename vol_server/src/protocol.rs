//! Line protocol of the command server
//!
//! Every request is one line, either a JSON object tagged by `cmd`
//! (`{"cmd":"SetDensity","x":20}`) or url encoded (`cmd=SetDensity&x=20`).
//! Every response is one JSON object per line. The answer to a `Frame`
//! request announces `bytes` and is followed by that many raw RGB8 bytes,
//! row 0 first.

use std::collections::HashMap;

use omevol_lib::{
    cgi::url_decode,
    command::{Command, ParamsError},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::session::Frame;

/// Requests answered by the server itself instead of a command
const STATUS_REQUEST: &str = "Status";
const FRAME_REQUEST: &str = "Frame";

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Command(Command),
    /// Describe the last published frame
    Status,
    /// Last published frame with its pixels
    Frame,
}

fn server_request(cmd: Option<&str>) -> Option<Request> {
    match cmd? {
        STATUS_REQUEST => Some(Request::Status),
        FRAME_REQUEST => Some(Request::Frame),
        _ => None,
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ProtocolError {
    #[error("empty request")]
    Empty,
    #[error("invalid JSON request: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Params(#[from] ParamsError),
}

pub fn parse_request(line: &str) -> Result<Request, ProtocolError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ProtocolError::Empty);
    }

    if line.starts_with('{') {
        let value: Value = serde_json::from_str(line)?;
        if let Some(request) = server_request(value.get("cmd").and_then(Value::as_str)) {
            return Ok(request);
        }
        return Ok(Request::Command(serde_json::from_value(value)?));
    }

    request_from_params(&url_decode(line))
}

/// Request from decoded `key=value` parameters
pub fn request_from_params(params: &HashMap<String, String>) -> Result<Request, ProtocolError> {
    if let Some(request) = server_request(params.get("cmd").map(String::as_str)) {
        return Ok(request);
    }
    Ok(Request::Command(Command::from_params(params)?))
}

/// JSON form of `request`, accepted by [`parse_request`]
pub fn request_line(request: &Request) -> Result<String, serde_json::Error> {
    match request {
        Request::Command(command) => serde_json::to_string(command),
        Request::Status => Ok(format!("{{\"cmd\":\"{STATUS_REQUEST}\"}}")),
        Request::Frame => Ok(format!("{{\"cmd\":\"{FRAME_REQUEST}\"}}")),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameInfo {
    pub width: usize,
    pub height: usize,
    pub iteration: u32,
    pub converged: bool,
}

impl From<&Frame> for FrameInfo {
    fn from(frame: &Frame) -> Self {
        FrameInfo {
            width: frame.width,
            height: frame.height,
            iteration: frame.iteration,
            converged: frame.converged,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub ok: bool,
    /// Iteration counter after the command was applied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iteration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<FrameInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Length of the pixel data following the response line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes: Option<usize>,
    /// Pixel data, sent after the line
    #[serde(skip)]
    pub payload: Option<Vec<u8>>,
}

impl Response {
    pub fn success(iteration: u32) -> Response {
        Response {
            ok: true,
            iteration: Some(iteration),
            frame: None,
            error: None,
            bytes: None,
            payload: None,
        }
    }

    /// Frame description followed by its RGB8 pixels
    pub fn with_image(frame: &Frame) -> Response {
        Response {
            bytes: Some(frame.data.len()),
            payload: Some(frame.data.clone()),
            ..Response::with_frame(FrameInfo::from(frame))
        }
    }

    pub fn with_frame(frame: FrameInfo) -> Response {
        Response {
            ok: true,
            iteration: None,
            frame: Some(frame),
            error: None,
            bytes: None,
            payload: None,
        }
    }

    pub fn error(message: impl ToString) -> Response {
        Response {
            ok: false,
            iteration: None,
            frame: None,
            error: Some(message.to_string()),
            bytes: None,
            payload: None,
        }
    }

    /// JSON text without trailing newline
    pub fn to_line(&self) -> String {
        match serde_json::to_string(self) {
            Ok(line) => line,
            Err(e) => format!("{{\"ok\":false,\"error\":{:?}}}", e.to_string()),
        }
    }
}
