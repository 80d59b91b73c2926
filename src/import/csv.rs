use bson::{Bson, Document as BsonDocument};
use std::io::Read;

use super::options::{ImportOptions, ImportReport};
use super::pipeline::accept;
use crate::book::Book;
use crate::errors::{CatalogError, Result};
use crate::types::{BookField, FieldKind};

/// Reads a headed CSV file. Cells are typed by the column's book field; a cell that does
/// not parse is kept as text so validation reports the column by name.
pub(crate) fn load_csv<R: Read>(reader: R, opts: &ImportOptions, report: &mut ImportReport) -> Result<Vec<Book>> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).delimiter(opts.csv.delimiter).from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let mut out = Vec::new();
    for (i, rec) in rdr.records().enumerate() {
        let parsed = rec.map_err(CatalogError::from).map(|rec| {
            let mut map = BsonDocument::new();
            for (key, cell) in headers.iter().zip(rec.iter()) {
                map.insert(key.clone(), cell_to_bson(key, cell));
            }
            map
        });
        accept(parsed, i + 1, opts, report, &mut out)?;
    }
    Ok(out)
}

fn cell_to_bson(column: &str, cell: &str) -> Bson {
    let cell = cell.trim();
    let Ok(field) = column.parse::<BookField>() else {
        return Bson::String(cell.to_string());
    };
    let typed = match field.kind() {
        FieldKind::Text => None,
        FieldKind::Integer => cell.parse::<i64>().ok().map(Bson::Int64),
        FieldKind::Decimal => cell.parse::<f64>().ok().map(Bson::Double),
        FieldKind::Boolean => match cell.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(Bson::Boolean(true)),
            "false" | "no" | "0" => Some(Bson::Boolean(false)),
            _ => None,
        },
    };
    typed.unwrap_or_else(|| Bson::String(cell.to_string()))
}
