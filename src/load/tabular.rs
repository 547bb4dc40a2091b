//! CSV reader: one record per row

use super::{file_name, LoadOptions};
use crate::error::{Error, Result};
use crate::record::{normalize, RawUnit, Record};
use csv::StringRecord;
use std::path::Path;

/// Columns every row must provide
const TOPIC: &str = "topic";
const EXAMPLE: &str = "example";
const DESCRIPTION: &str = "description";

/// Load a CSV file with `topic`, `example` and `description` columns
pub fn load_csv(path: &Path, options: &LoadOptions) -> Result<Vec<Record>> {
    let name = file_name(path);
    let reader = csv::Reader::from_path(path).map_err(|e| Error::load(&name, e))?;
    read_rows(reader, &name, options)
}

fn read_rows<R: std::io::Read>(
    mut reader: csv::Reader<R>,
    name: &str,
    options: &LoadOptions,
) -> Result<Vec<Record>> {
    let headers = reader.headers().map_err(|e| Error::load(name, e))?.clone();
    let topic = column_index(&headers, TOPIC, name)?;
    let example = column_index(&headers, EXAMPLE, name)?;
    let description = column_index(&headers, DESCRIPTION, name)?;

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        // Header is line 1
        let line = index + 2;
        let row = row.map_err(|e| Error::load(name, format!("line {}: {}", line, e)))?;
        let field = |column: usize| {
            row.get(column)
                .ok_or_else(|| Error::load(name, format!("line {}: row is too short", line)))
        };

        let text = row_text(field(topic)?, field(example)?, field(description)?);
        records.push(normalize(
            &RawUnit::from_content(text),
            Some(name),
            options.digest,
        ));
    }

    Ok(records)
}

fn column_index(headers: &StringRecord, column: &str, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| Error::load(name, format!("missing required column '{}'", column)))
}

/// Synthetic body for one row
fn row_text(topic: &str, example: &str, description: &str) -> String {
    format!(
        "{}:\nExample:{}\nDescription:{}",
        capitalize(topic),
        example,
        description
    )
}

/// Upper-case the first character, lower-case the rest
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
