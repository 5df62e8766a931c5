use std::collections::HashMap;

use serde_json::{Map, Number, Value};

use super::Command;

/// Keys whose values are never read as numbers
const TEXT_KEYS: [&str; 3] = ["cmd", "name", "path"];

#[derive(thiserror::Error, Debug)]
pub enum ParamsError {
    #[error("request has no 'cmd' parameter")]
    MissingCommand,
    #[error("invalid command parameters: {0}")]
    Invalid(#[from] serde_json::Error),
}

fn param_value(key: &str, value: &str) -> Value {
    if TEXT_KEYS.contains(&key) {
        return Value::String(value.to_owned());
    }

    if let Ok(int) = value.parse::<i64>() {
        return Value::Number(int.into());
    }
    if let Some(number) = value.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(number);
    }
    if value.starts_with('[') || value.starts_with('{') {
        if let Ok(json) = serde_json::from_str(value) {
            return json;
        }
    }
    Value::String(value.to_owned())
}

impl Command {
    /// Build a command from string parameters such as a decoded query string
    ///
    /// `cmd` names the command, remaining keys are its fields.
    /// Numbers are recognized, list fields are given as JSON text.
    pub fn from_params(params: &HashMap<String, String>) -> Result<Command, ParamsError> {
        if !params.contains_key("cmd") {
            return Err(ParamsError::MissingCommand);
        }

        let object: Map<String, Value> = params
            .iter()
            .map(|(key, value)| (key.clone(), param_value(key, value)))
            .collect();

        Ok(serde_json::from_value(Value::Object(object))?)
    }
}
