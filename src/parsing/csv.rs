//! CSV reading and writing for song catalogs and batch inputs.
//!
//! Plain and gzip-compressed input are both accepted: files are recognised by
//! a `.gz` suffix, in-memory uploads by the gzip magic number.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;

use crate::core::catalog::Catalog;
use crate::core::cell::CellValue;
use crate::utils::validation::{check_row_limit, is_gzip, MAX_CSV_ROWS};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid CSV: {0}")]
    InvalidFormat(String),

    #[error("Too many rows: {0} exceeds maximum allowed ({MAX_CSV_ROWS})")]
    TooManyRows(usize),
}

/// Check if the path names a gzip-compressed file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
fn is_gzipped(path: &Path) -> bool {
    path.to_string_lossy().to_lowercase().ends_with(".gz")
}

/// Read a CSV file into a catalog, decompressing `.gz` files
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be opened, and the errors of
/// [`read_csv`] for its content.
pub fn read_csv_file(path: &Path) -> Result<Catalog, ParseError> {
    let file = File::open(path)?;
    if is_gzipped(path) {
        read_csv(BufReader::new(GzDecoder::new(file)))
    } else {
        read_csv(BufReader::new(file))
    }
}

/// Read CSV bytes (e.g. an upload) into a catalog, decompressing gzip content
///
/// # Errors
///
/// See [`read_csv`].
pub fn read_csv_bytes(content: &[u8]) -> Result<Catalog, ParseError> {
    if is_gzip(content) {
        read_csv(GzDecoder::new(content))
    } else {
        read_csv(content)
    }
}

/// Read CSV with a header line from any reader.
///
/// Rows shorter than the header are padded with missing cells. Blank lines
/// are skipped.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if there is no header or a row has
/// more fields than the header, `ParseError::Csv` on malformed or non-UTF-8
/// data, or `ParseError::TooManyRows` if the row limit is exceeded.
pub fn read_csv<R: Read>(reader: R) -> Result<Catalog, ParseError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();
    if columns.is_empty() {
        return Err(ParseError::InvalidFormat("No columns to parse".to_string()));
    }

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result?;

        if record.len() > columns.len() {
            let line = record.position().map_or(0, csv::Position::line);
            return Err(ParseError::InvalidFormat(format!(
                "Line {line}: expected {} fields, saw {}",
                columns.len(),
                record.len()
            )));
        }

        if check_row_limit(rows.len()).is_some() {
            return Err(ParseError::TooManyRows(rows.len()));
        }

        rows.push(record.iter().map(CellValue::parse).collect());
    }

    Ok(Catalog::new(columns, rows))
}

/// Write a catalog as CSV with a header line. Missing cells are empty fields.
///
/// # Errors
///
/// Returns `ParseError::Csv` or `ParseError::Io` if writing fails.
pub fn write_csv<W: Write>(catalog: &Catalog, writer: W) -> Result<(), ParseError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(catalog.columns())?;
    for row in catalog.rows() {
        csv_writer.write_record(row.values().iter().map(ToString::to_string))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Render a catalog as a CSV string
///
/// # Errors
///
/// See [`write_csv`].
pub fn to_csv_string(catalog: &Catalog) -> Result<String, ParseError> {
    let mut buf = Vec::new();
    write_csv(catalog, &mut buf)?;
    String::from_utf8(buf).map_err(|e| ParseError::InvalidFormat(e.to_string()))
}
