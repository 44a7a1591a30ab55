//! CSV payloads for Bulk API ingest jobs.

use serde_json::{Map, Value};
use std::collections::BTreeSet;

use crate::bulk::BulkOperation;
use crate::error::{Error, ErrorKind, Result};
use crate::payload::GenericPayload;
use crate::shape::build_json_data;

/// Counters gathered while building a CSV payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CsvStats {
    pub number_of_columns: u64,
    pub number_of_values: u64,
    pub number_of_nulls: u64,
}

/// A CSV body ready for upload together with its statistics.
#[derive(Debug, Clone)]
pub struct CsvPayload {
    pub csv: String,
    pub stats: CsvStats,
}

/// Build the ingest CSV for a batch.
///
/// Each payload becomes one row built from the same fields as a
/// single-record request ([`build_json_data`]). Columns are the sorted union
/// of every row's fields. For `update` and `upsert` the `id_field` column is
/// appended (or overwritten) with each payload's `bulkUpdateRecordId` or
/// `bulkUpsertExternalId.externalIdValue`. Missing and null cells are left
/// empty and counted as nulls.
pub fn build_csv_data(
    payloads: &[GenericPayload],
    sobject: &str,
    id_field: &str,
    operation: BulkOperation,
) -> Result<CsvPayload> {
    let id_column = match operation {
        BulkOperation::Insert => None,
        BulkOperation::Update | BulkOperation::Upsert if !id_field.is_empty() => Some(id_field),
        BulkOperation::Update | BulkOperation::Upsert => {
            return Err(Error::new(ErrorKind::Csv(format!(
                "an id column is required for {}",
                operation.api_name()
            ))))
        }
    };

    let rows: Vec<Map<String, Value>> = payloads
        .iter()
        .map(|payload| {
            let mut row = build_json_data(payload, sobject);
            if let Some(column) = id_column {
                row.insert(column.to_string(), id_value(payload, operation));
            }
            row
        })
        .collect();

    let mut columns: BTreeSet<&str> = rows
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();
    if let Some(column) = id_column {
        columns.remove(column);
    }
    let headers: Vec<&str> = columns.into_iter().chain(id_column).collect();

    let mut stats = CsvStats {
        number_of_columns: headers.len() as u64,
        ..Default::default()
    };

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(&headers)?;

    for row in &rows {
        let cells: Vec<String> = headers
            .iter()
            .map(|header| {
                let cell = row.get(*header).and_then(cell_text);
                stats.number_of_values += 1;
                if cell.is_none() {
                    stats.number_of_nulls += 1;
                }
                cell.unwrap_or_default()
            })
            .collect();
        writer.write_record(&cells)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::new(ErrorKind::Csv(e.to_string())))?;
    let csv = String::from_utf8(bytes).map_err(|e| Error::with_source(ErrorKind::Csv(e.to_string()), e))?;

    Ok(CsvPayload { csv, stats })
}

fn id_value(payload: &GenericPayload, operation: BulkOperation) -> Value {
    match operation {
        BulkOperation::Update => payload
            .bulk_update_record_id
            .clone()
            .map(Value::String)
            .unwrap_or(Value::Null),
        BulkOperation::Upsert => payload
            .bulk_upsert_external_id
            .as_ref()
            .and_then(|ext| ext.external_id_value.clone())
            .unwrap_or(Value::Null),
        BulkOperation::Insert => Value::Null,
    }
}

/// Text of one cell; `None` for a null cell.
fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}
