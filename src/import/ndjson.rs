use bson::{Bson, Document as BsonDocument};
use std::io::{BufRead, BufReader, Read};

use super::options::{ImportOptions, ImportReport};
use super::pipeline::accept;
use crate::book::Book;
use crate::errors::{CatalogError, Result};

/// Reads a JSON array of book objects.
pub(crate) fn load_json_array<R: Read>(reader: R, opts: &ImportOptions, report: &mut ImportReport) -> Result<Vec<Book>> {
    let val: serde_json::Value = serde_json::from_reader(BufReader::new(reader))?;
    let serde_json::Value::Array(items) = val else {
        return Err(CatalogError::Validation { field: "$root".into(), reason: "expected JSON array".into() });
    };
    let mut out = Vec::with_capacity(items.len());
    for (i, v) in items.into_iter().enumerate() {
        let parsed = to_document(v);
        accept(parsed, i + 1, opts, report, &mut out)?;
    }
    Ok(out)
}

/// Reads one JSON object per line; blank lines are ignored.
pub(crate) fn load_ndjson<R: Read>(reader: R, opts: &ImportOptions, report: &mut ImportReport) -> Result<Vec<Book>> {
    let mut reader = BufReader::new(reader);
    let mut out = Vec::new();
    let mut line_no: usize = 0;
    let mut buf = String::with_capacity(8 * 1024);
    loop {
        buf.clear();
        let n = reader.read_line(&mut buf)?;
        if n == 0 {
            break;
        }
        line_no += 1;
        let line = buf.trim();
        if line.is_empty() {
            continue;
        }
        let parsed = serde_json::from_str::<serde_json::Value>(line).map_err(CatalogError::from).and_then(to_document);
        accept(parsed, line_no, opts, report, &mut out)?;
    }
    Ok(out)
}

fn to_document(v: serde_json::Value) -> Result<BsonDocument> {
    if !v.is_object() {
        return Err(CatalogError::Validation { field: "$root".into(), reason: "expected a JSON object".into() });
    }
    match Bson::try_from(v) {
        Ok(Bson::Document(d)) => Ok(d),
        Ok(other) => Err(CatalogError::Validation {
            field: "$root".into(),
            reason: format!("expected a document, found {:?}", other.element_type()),
        }),
        Err(e) => Err(CatalogError::Validation { field: "$root".into(), reason: e.to_string() }),
    }
}
