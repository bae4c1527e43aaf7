//! Tabular export
//!
//! Flattens extraction results into CSV: the column header comes from the
//! first record's field names, later records fill matching columns and
//! leave the rest empty. Nested values are JSON-encoded into their cell.
//! Serialization concern only; the pipeline's own contract ends at
//! [`ExtractionResult`].

use crate::types::{ExtractionResult, Value};
use std::io::{self, Write};

/// Render results as a CSV document
///
/// Columns: `url`, the first record's fields in order, `success`. Returns
/// an empty string for an empty slice.
pub fn to_csv_string(results: &[ExtractionResult]) -> String {
    let mut out = String::new();
    let Some(first) = results.first() else {
        return out;
    };

    let field_names: Vec<&str> = first.fields.names().collect();

    let mut header: Vec<String> = Vec::with_capacity(field_names.len() + 2);
    header.push("url".to_string());
    header.extend(field_names.iter().map(|name| name.to_string()));
    header.push("success".to_string());
    push_row(&mut out, &header);

    for result in results {
        let mut row: Vec<String> = Vec::with_capacity(header.len());
        row.push(result.url.clone());
        for name in &field_names {
            row.push(result.fields.get(name).map(cell).unwrap_or_default());
        }
        row.push(result.succeeded().to_string());
        push_row(&mut out, &row);
    }

    out
}

/// Write results as CSV to any writer
pub fn write_csv<W: Write>(mut writer: W, results: &[ExtractionResult]) -> io::Result<()> {
    writer.write_all(to_csv_string(results).as_bytes())
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        nested => serde_json::to_string(nested).unwrap_or_default(),
    }
}

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn push_row(out: &mut String, row: &[String]) {
    for (i, field) in row.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        if needs_quotes(field) {
            out.push('"');
            out.push_str(&field.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(field);
        }
    }
    out.push('\n');
}
