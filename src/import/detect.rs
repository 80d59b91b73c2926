//! Format detection heuristics for dataset files.

use std::io::{self, BufRead};
use std::path::Path;

use super::ImportFormat;

/// Picks a format from the file extension, else from the first bytes of `reader`
/// (peeked, not consumed).
///
/// # Errors
/// Returns I/O errors from filling the reader's buffer.
pub fn detect_format<R: BufRead>(reader: &mut R, path: Option<&Path>) -> io::Result<ImportFormat> {
    if let Some(ext) = path.and_then(|p| p.extension()).and_then(|s| s.to_str()) {
        match ext.to_lowercase().as_str() {
            "jsonl" | "ndjson" => return Ok(ImportFormat::Ndjson),
            "json" => return Ok(ImportFormat::Json),
            "csv" => return Ok(ImportFormat::Csv),
            _ => {}
        }
    }
    let buf = reader.fill_buf()?;
    let s = String::from_utf8_lossy(&buf[..buf.len().min(256)]);
    let head = s.trim_start_matches('\u{feff}').trim_start();
    Ok(if head.starts_with('[') {
        ImportFormat::Json
    } else if head.starts_with('{') {
        ImportFormat::Ndjson
    } else {
        ImportFormat::Csv
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn extension_wins_over_content() {
        let mut r = Cursor::new(b"[{}]".to_vec());
        assert_eq!(detect_format(&mut r, Some(Path::new("books.csv"))).unwrap(), ImportFormat::Csv);
    }

    #[test]
    fn content_sniffing() {
        let mut r = Cursor::new(b"  [ {\"title\": 1} ]".to_vec());
        assert_eq!(detect_format(&mut r, None).unwrap(), ImportFormat::Json);
        let mut r = Cursor::new(b"{\"title\": 1}\n".to_vec());
        assert_eq!(detect_format(&mut r, None).unwrap(), ImportFormat::Ndjson);
        let mut r = Cursor::new(b"title,author\n".to_vec());
        assert_eq!(detect_format(&mut r, None).unwrap(), ImportFormat::Csv);
    }
}
