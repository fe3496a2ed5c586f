//! CSV rendering
//!
//! RFC 4180 output: CRLF line endings, fields quoted only when they contain
//! a comma, a quote, or a line break, embedded quotes doubled. Rendering is a
//! pure function of its input so repeated runs are byte-identical.

use reqtrace_core::{BackwardMatrix, CoverageGap, ForwardMatrix, MatrixRow, SourceLocation};

const LINE_END: &str = "\r\n";

/// Gap report column names
pub const GAP_COLUMNS: [&str; 3] = ["record_id", "category", "missing_links"];

/// Missing fields column names
pub const MISSING_FIELDS_COLUMNS: [&str; 2] = ["file", "missing_fields"];

/// Accumulates CSV text row by row
#[derive(Debug, Clone, Default)]
pub struct CsvWriter {
    out: String,
}

impl CsvWriter {
    /// Start a table with a header row
    #[must_use]
    pub fn with_header<S: AsRef<str>>(columns: &[S]) -> Self {
        let mut writer = Self::default();
        writer.row(columns);
        writer
    }

    /// Append one row
    pub fn row<S: AsRef<str>>(&mut self, fields: &[S]) {
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            push_field(&mut self.out, field.as_ref());
        }
        self.out.push_str(LINE_END);
    }

    /// Finished CSV text
    #[inline]
    #[must_use]
    pub fn finish(self) -> String {
        self.out
    }
}

fn push_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\r', '\n']) {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}

/// Forward matrix as CSV
#[must_use]
pub fn forward_csv(matrix: &ForwardMatrix) -> String {
    rows_csv(&ForwardMatrix::COLUMNS, matrix.rows(), ForwardMatrix::cells)
}

/// Backward matrix as CSV
#[must_use]
pub fn backward_csv(matrix: &BackwardMatrix) -> String {
    rows_csv(&BackwardMatrix::COLUMNS, matrix.rows(), BackwardMatrix::cells)
}

/// One category table as CSV, forward columns
#[must_use]
pub fn category_csv(rows: &[MatrixRow]) -> String {
    rows_csv(&ForwardMatrix::COLUMNS, rows, ForwardMatrix::cells)
}

fn rows_csv(columns: &[&str], rows: &[MatrixRow], cells: fn(&MatrixRow) -> [&str; 4]) -> String {
    let mut writer = CsvWriter::with_header(columns);
    for row in rows {
        writer.row(&cells(row));
    }
    writer.finish()
}

/// Coverage gap report as CSV
#[must_use]
pub fn gap_csv(gaps: &[CoverageGap]) -> String {
    let mut writer = CsvWriter::with_header(&GAP_COLUMNS);
    for gap in gaps {
        writer.row(&[gap.record_id.as_str(), gap.category.as_str(), gap.missing_links]);
    }
    writer.finish()
}

/// Missing required fields per file as CSV, fields joined by `;`
#[must_use]
pub fn missing_fields_csv<'a>(
    rows: impl IntoIterator<Item = (&'a SourceLocation, &'a [String])>,
) -> String {
    let mut writer = CsvWriter::with_header(&MISSING_FIELDS_COLUMNS);
    for (location, missing) in rows {
        let joined = missing.join(";");
        writer.row(&[location.as_str(), joined.as_str()]);
    }
    writer.finish()
}
