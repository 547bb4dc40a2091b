//! JSON and YAML readers
//!
//! Both formats accept either a list of entries or a single mapping. List
//! items may be objects (with any of `content`, `question`, `answer`,
//! `source`) or bare strings, which are taken as content.

use super::{file_name, LoadOptions};
use crate::error::{Error, Result};
use crate::record::{normalize, RawUnit, Record};
use serde_json::Value;
use std::path::Path;

/// Load a JSON file
pub fn load_json(path: &Path, options: &LoadOptions) -> Result<Vec<Record>> {
    let name = file_name(path);
    let content = std::fs::read_to_string(path).map_err(|e| Error::load(&name, e))?;
    let value: Value = serde_json::from_str(&content).map_err(|e| Error::load(&name, e))?;
    records_from_value(value, &name, options)
}

/// Load a YAML file
pub fn load_yaml(path: &Path, options: &LoadOptions) -> Result<Vec<Record>> {
    let name = file_name(path);
    let content = std::fs::read_to_string(path).map_err(|e| Error::load(&name, e))?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    let value: Value = serde_yaml::from_str(&content).map_err(|e| Error::load(&name, e))?;
    records_from_value(value, &name, options)
}

/// Normalize every entry of an already-parsed document
pub fn records_from_value(value: Value, name: &str, options: &LoadOptions) -> Result<Vec<Record>> {
    let units = units_from_value(value, name)?;
    Ok(units
        .iter()
        .map(|unit| normalize(unit, Some(name), options.digest))
        .collect())
}

fn units_from_value(value: Value, name: &str) -> Result<Vec<RawUnit>> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(map) => Ok(RawUnit::from_map(&map)),
                Value::String(text) => Ok(RawUnit::from_content(text)),
                other => Err(Error::load(
                    name,
                    format!("entry {} is {}, expected an object", index, kind(&other)),
                )),
            })
            .collect(),
        Value::Object(map) => Ok(vec![RawUnit::from_map(&map)]),
        Value::Null => Ok(Vec::new()),
        other => Err(Error::load(
            name,
            format!("top level is {}, expected a list or an object", kind(&other)),
        )),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
