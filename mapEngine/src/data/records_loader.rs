use std::fs::File;
use std::io::Read;
use std::path::Path;
use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, warn};
use super::marker_record::MarkerRecord;
use crate::errors::RecordLoadError;
use crate::utils::logging::{self, OperationCategory, FileIOType};

const COLUMNS: [&str; 6] = ["id", "latitude", "longitude", "budget", "category", "is_urgent"];

/// Loads records from a `.csv` or `.json` file, picked by extension.
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<MarkerRecord>, RecordLoadError> {
    let path = path.as_ref();
    let _timing = logging::start_timing("load_records",
        OperationCategory::FileIO { subcategory: FileIOType::RecordLoad });

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_lowercase();

    let mut contents = String::new();
    File::open(path)?.read_to_string(&mut contents)?;

    let records = match extension.as_str() {
        "csv" => parse_csv(&contents)?,
        "json" => parse_json(&contents)?,
        other => return Err(RecordLoadError::UnsupportedFormat(other.to_string())),
    };

    debug!(path = %path.display(), count = records.len(), "loaded marker records");
    Ok(records)
}

/// Parses a JSON array of records. Non-numeric coordinates are treated as absent.
pub fn parse_json(contents: &str) -> Result<Vec<MarkerRecord>, RecordLoadError> {
    let raw: Vec<serde_json::Value> = serde_json::from_str(contents)?;
    let mut records = Vec::with_capacity(raw.len());

    for mut value in raw {
        if let Some(object) = value.as_object_mut() {
            for field in ["latitude", "longitude"] {
                let numeric = object.get(field).map_or(true, |v| v.is_number() || v.is_null());
                if !numeric {
                    warn!(field, value = %object[field], "dropping non-numeric coordinate");
                    object.insert(field.to_string(), serde_json::Value::Null);
                }
            }
            normalize_optional_fields(object);
        }
        records.push(serde_json::from_value(value)?);
    }

    Ok(records)
}

// Optional fields may arrive as null or with the wrong type; fall back to defaults
fn normalize_optional_fields(object: &mut serde_json::Map<String, serde_json::Value>) {
    let budget = object
        .get("budget")
        .and_then(|v| v.as_f64())
        .filter(|b| b.is_finite())
        .unwrap_or(0.0)
        .max(0.0);
    object.insert("budget".to_string(), serde_json::Value::from(budget));

    if !object.get("category").map_or(true, |v| v.is_string()) {
        object.insert("category".to_string(), serde_json::Value::from(""));
    }

    for field in ["is_urgent", "isUrgent"] {
        if object.get(field).is_some_and(|v| !v.is_boolean()) {
            object.remove(field);
        }
    }
}

/// Parses CSV with a header row naming at least `id`, `latitude` and `longitude`.
/// Empty or unparsable coordinates become `None` so the record is skipped at
/// layout time instead of failing the whole file.
pub fn parse_csv(contents: &str) -> Result<Vec<MarkerRecord>, RecordLoadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(contents.as_bytes());

    let headers = reader.headers()?.clone();
    let index_of = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));

    let id_col = index_of(COLUMNS[0]).ok_or(RecordLoadError::MissingColumn(COLUMNS[0]))?;
    let lat_col = index_of(COLUMNS[1]).ok_or(RecordLoadError::MissingColumn(COLUMNS[1]))?;
    let lng_col = index_of(COLUMNS[2]).ok_or(RecordLoadError::MissingColumn(COLUMNS[2]))?;
    let budget_col = index_of(COLUMNS[3]);
    let category_col = index_of(COLUMNS[4]);
    let urgent_col = index_of(COLUMNS[5]);

    let mut records = Vec::new();

    for result in reader.records() {
        let row = result?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();

        let raw_id = row.get(id_col).unwrap_or_default();
        let id: i64 = raw_id.parse().map_err(|_| RecordLoadError::InvalidId {
            line,
            value: raw_id.to_string(),
        })?;

        let latitude = parse_coordinate(&row, lat_col, id, "latitude");
        let longitude = parse_coordinate(&row, lng_col, id, "longitude");

        let budget = budget_col
            .and_then(|col| row.get(col))
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|b| b.is_finite())
            .unwrap_or(0.0)
            .max(0.0);

        let category = category_col
            .and_then(|col| row.get(col))
            .unwrap_or_default()
            .to_string();

        let is_urgent = urgent_col
            .and_then(|col| row.get(col))
            .map(parse_flag)
            .unwrap_or(false);

        records.push(MarkerRecord {
            id,
            latitude,
            longitude,
            budget,
            category,
            is_urgent,
        });
    }

    Ok(records)
}

fn parse_coordinate(row: &StringRecord, col: usize, id: i64, field: &str) -> Option<f64> {
    let raw = row.get(col)?;
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => {
            warn!(id, field, raw, "unparsable coordinate, record will not be placed");
            None
        }
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.to_lowercase().as_str(), "1" | "true" | "yes" | "y")
}
