//! CSV export of data models.
//!
//! The header row is the key order of the first model. A later model
//! carrying a key outside that header fails the export; a missing key
//! writes an empty cell.

use crate::error::{AxlError, AxlResult};
use crate::model::data_model::DataModel;
use serde_json::Value;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes `models` as CSV to `writer`. An empty slice writes nothing.
pub fn write_csv<W: Write>(models: &[DataModel], writer: W) -> AxlResult<()> {
    let Some(first) = models.first() else {
        return Ok(());
    };
    let header: Vec<&str> = first.keys().collect();

    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(&header).map_err(export_error)?;
    for (index, model) in models.iter().enumerate() {
        if let Some(extra) = model.keys().find(|key| !header.contains(key)) {
            return Err(AxlError::Export(format!(
                "row {index} has field `{extra}` outside the header"
            )));
        }
        let cells = header.iter().map(|key| match model.get(key) {
            Ok(value) => cell(value),
            Err(_) => String::new(),
        });
        writer.write_record(cells).map_err(export_error)?;
    }
    writer
        .flush()
        .map_err(|err| AxlError::Export(err.to_string()))
}

/// Writes `models` to a CSV file at `path`, replacing any existing file.
pub fn to_csv(models: &[DataModel], path: impl AsRef<Path>) -> AxlResult<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|err| {
        AxlError::Export(format!("cannot create `{}`: {err}", path.display()))
    })?;
    write_csv(models, file)
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn export_error(err: csv::Error) -> AxlError {
    AxlError::Export(err.to_string())
}
