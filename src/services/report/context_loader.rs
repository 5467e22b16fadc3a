//! Context Loader
//!
//! Reads the reference dataset of prior test scenarios (delimited text with
//! a header row) into string-valued records.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::path::Path;

use perf_analyzer_core::{CoreError, CoreResult, InputKind};

/// One dataset row: column name to cell text.
pub type ContextRecord = BTreeMap<String, String>;

/// Load every data row of the dataset at `path`.
///
/// All cells stay as text. Rows shorter than the header are padded with
/// empty strings; rows longer than the header are rejected.
pub fn read_context(path: &Path) -> CoreResult<Vec<ContextRecord>> {
    if !path.exists() {
        return Err(CoreError::not_found(InputKind::ContextFile, path));
    }

    let file = File::open(path).map_err(|e| read_error(path, e))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers = reader.headers().map_err(|e| read_error(path, e))?.clone();
    if headers.is_empty() {
        return Err(CoreError::empty_data(format!(
            "Context file is empty: {}",
            path.display()
        )));
    }
    let columns = dedupe_columns(headers.iter());

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row.map_err(|e| read_error(path, e))?;
        if row.len() > columns.len() {
            return Err(CoreError::unexpected(format!(
                "Error reading context file {}: row {} has {} fields, header has {}",
                path.display(),
                index + 1,
                row.len(),
                columns.len()
            )));
        }
        let record: ContextRecord = columns
            .iter()
            .enumerate()
            .map(|(i, column)| (column.clone(), row.get(i).unwrap_or("").to_string()))
            .collect();
        records.push(record);
    }

    if records.is_empty() {
        return Err(CoreError::empty_data(format!(
            "Context file has no data rows: {}",
            path.display()
        )));
    }

    tracing::debug!(
        path = %path.display(),
        rows = records.len(),
        columns = columns.len(),
        "loaded context records"
    );
    Ok(records)
}

fn read_error(path: &Path, err: impl std::fmt::Display) -> CoreError {
    CoreError::unexpected(format!(
        "Error reading context file {}: {}",
        path.display(),
        err
    ))
}

/// Repeated column names get a `.1`, `.2`, ... suffix so no cell is lost.
fn dedupe_columns<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut columns = Vec::new();
    for name in names {
        let count = seen.entry(name.to_string()).or_insert(0);
        let column = if *count == 0 {
            name.to_string()
        } else {
            format!("{}.{}", name, count)
        };
        *count += 1;
        columns.push(column);
    }
    columns
}
