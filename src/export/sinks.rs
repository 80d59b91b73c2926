use bson::{Bson, Document as BsonDocument};
use std::io::{self, BufWriter, Write};

pub trait ReportSink {
    fn write_doc(&mut self, doc: &BsonDocument) -> io::Result<()>;
    fn finish(self: Box<Self>) -> io::Result<()>;
}

pub struct NdjsonSink<W: Write> {
    w: BufWriter<W>,
}
impl<W: Write> NdjsonSink<W> {
    pub fn new(inner: W) -> Self { Self { w: BufWriter::new(inner) } }
}
impl<W: Write> ReportSink for NdjsonSink<W> {
    fn write_doc(&mut self, doc: &BsonDocument) -> io::Result<()> {
        let v = Bson::Document(doc.clone()).into_relaxed_extjson();
        let s = serde_json::to_string(&v).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        writeln!(self.w, "{s}")
    }
    fn finish(mut self: Box<Self>) -> io::Result<()> { self.w.flush() }
}

/// Header row comes from the first document; later documents are written in that column order.
pub struct CsvSink<W: Write> {
    w: csv::Writer<BufWriter<W>>,
    headers: Option<Vec<String>>,
    write_headers: bool,
}
impl<W: Write> CsvSink<W> {
    pub fn new(inner: W, delimiter: u8, write_headers: bool) -> Self {
        let w = csv::WriterBuilder::new().delimiter(delimiter).from_writer(BufWriter::new(inner));
        Self { w, headers: None, write_headers }
    }
}
impl<W: Write> ReportSink for CsvSink<W> {
    fn write_doc(&mut self, doc: &BsonDocument) -> io::Result<()> {
        if self.headers.is_none() {
            let hdrs: Vec<String> = doc.keys().cloned().collect();
            if self.write_headers {
                self.w.write_record(&hdrs).map_err(|e| io::Error::other(e.to_string()))?;
            }
            self.headers = Some(hdrs);
        }
        let row: Vec<String> = self
            .headers
            .iter()
            .flatten()
            .map(|k| doc.get(k).map(bson_to_string).unwrap_or_default())
            .collect();
        self.w.write_record(&row).map_err(|e| io::Error::other(e.to_string()))
    }
    fn finish(mut self: Box<Self>) -> io::Result<()> {
        self.w.flush().map_err(|e| io::Error::other(e.to_string()))
    }
}

/// Buffers every document, then writes space-aligned columns. Columns are the union of
/// all keys in first-seen order.
pub struct TableSink<W: Write> {
    w: BufWriter<W>,
    columns: Vec<String>,
    rows: Vec<BsonDocument>,
}
impl<W: Write> TableSink<W> {
    pub fn new(inner: W) -> Self { Self { w: BufWriter::new(inner), columns: Vec::new(), rows: Vec::new() } }
}
impl<W: Write> ReportSink for TableSink<W> {
    fn write_doc(&mut self, doc: &BsonDocument) -> io::Result<()> {
        for k in doc.keys() {
            if !self.columns.contains(k) {
                self.columns.push(k.clone());
            }
        }
        self.rows.push(doc.clone());
        Ok(())
    }
    fn finish(mut self: Box<Self>) -> io::Result<()> {
        if self.rows.is_empty() {
            writeln!(self.w, "(no results)")?;
            return self.w.flush();
        }
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|d| self.columns.iter().map(|c| d.get(c).map(bson_to_string).unwrap_or_default()).collect())
            .collect();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| cells.iter().map(|r| r[i].chars().count()).chain([c.chars().count()]).max().unwrap_or(0))
            .collect();
        let line = |vals: &[String]| -> String {
            vals.iter()
                .zip(&widths)
                .map(|(v, w)| format!("{v:<w$}"))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };
        writeln!(self.w, "{}", line(&self.columns))?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(self.w, "{}", line(&rule))?;
        for r in &cells {
            writeln!(self.w, "{}", line(r))?;
        }
        self.w.flush()
    }
}

pub(crate) fn bson_to_string(v: &Bson) -> String {
    match v {
        Bson::String(s) => s.clone(),
        Bson::Int32(i) => i.to_string(),
        Bson::Int64(i) => i.to_string(),
        Bson::Double(f) => f.to_string(),
        Bson::Boolean(b) => b.to_string(),
        Bson::Null => String::new(),
        other => other.to_string(),
    }
}
