//! CSV ingest of aggregated trial rows.
//!
//! Expected layout (one row per trial condition):
//!
//! ```text
//! K3PO4,buffer,tot_case,good_case
//! 2.5,1.0,6,4
//! ```
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Fatal row errors**: a malformed row aborts the load with its row index,
//!   because a fit on a silently filtered dataset would be misleading
//! - **Separation of concerns**: count consistency is checked by the expander

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::info;

use crate::domain::AggregatedTrial;
use crate::error::AppError;

/// Accepted header names per field (after normalization).
const STOICHIOMETRY_COLUMNS: [&str; 2] = ["k3po4", "stoichiometry"];
const BUFFER_COLUMNS: [&str; 1] = ["buffer"];
const TOTAL_COLUMNS: [&str; 2] = ["tot_case", "total"];
const SUCCESS_COLUMNS: [&str; 2] = ["good_case", "successful"];

struct ColumnIndex {
    stoichiometry: usize,
    buffer: usize,
    total: usize,
    successful: usize,
}

/// Load aggregated trials from a CSV file.
pub fn load_trials(path: &Path) -> Result<Vec<AggregatedTrial>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open CSV '{}': {e}", path.display())))?;
    let rows = read_trials(file)?;
    info!(path = %path.display(), rows = rows.len(), "loaded aggregated trials");
    Ok(rows)
}

/// Parse aggregated trials from any CSV reader.
pub fn read_trials<R: Read>(reader: R) -> Result<Vec<AggregatedTrial>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let columns = resolve_columns(&build_header_map(&headers))?;

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result
            .map_err(|e| AppError::data_integrity(idx, format!("CSV parse error: {e}")))?;
        let row = parse_row(&record, &columns).map_err(|msg| AppError::data_integrity(idx, msg))?;
        rows.push(row);
    }

    Ok(rows)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, schema validation will incorrectly
    // report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn resolve_columns(header_map: &HashMap<String, usize>) -> Result<ColumnIndex, AppError> {
    Ok(ColumnIndex {
        stoichiometry: find_column(header_map, &STOICHIOMETRY_COLUMNS)?,
        buffer: find_column(header_map, &BUFFER_COLUMNS)?,
        total: find_column(header_map, &TOTAL_COLUMNS)?,
        successful: find_column(header_map, &SUCCESS_COLUMNS)?,
    })
}

fn find_column(header_map: &HashMap<String, usize>, names: &[&str]) -> Result<usize, AppError> {
    names
        .iter()
        .find_map(|name| header_map.get(*name).copied())
        .ok_or_else(|| {
            let expected = names
                .iter()
                .map(|n| format!("`{n}`"))
                .collect::<Vec<_>>()
                .join(" or ");
            AppError::input(format!("Missing required column: {expected}"))
        })
}

fn parse_row(record: &StringRecord, columns: &ColumnIndex) -> Result<AggregatedTrial, String> {
    Ok(AggregatedTrial {
        stoichiometry: parse_f64(get_required(record, columns.stoichiometry, "K3PO4")?, "K3PO4")?,
        buffer: parse_f64(get_required(record, columns.buffer, "buffer")?, "buffer")?,
        total: parse_count(get_required(record, columns.total, "tot_case")?, "tot_case")?,
        successful: parse_count(get_required(record, columns.successful, "good_case")?, "good_case")?,
    })
}

fn get_required<'a>(record: &'a StringRecord, idx: usize, name: &str) -> Result<&'a str, String> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn parse_f64(s: &str, name: &str) -> Result<f64, String> {
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("Invalid `{name}` value '{s}'."))
}

/// Counts are integers, but spreadsheet exports often write `6.0`.
fn parse_count(s: &str, name: &str) -> Result<i64, String> {
    if let Ok(v) = s.parse::<i64>() {
        return Ok(v);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Ok(v as i64),
        _ => Err(format!("Invalid `{name}` count '{s}' (expected an integer).")),
    }
}
