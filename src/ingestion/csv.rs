//! CSV decoding into a [`DataSet`].

use crate::error::{PipelineError, PipelineResult};
use crate::types::{DataSet, Header};

/// Decode a UTF-8 CSV object body into an in-memory [`DataSet`].
///
/// Rules:
///
/// - The body must be valid UTF-8.
/// - The first line is the header; an empty body is [`PipelineError::MissingHeader`].
/// - Blank lines are skipped.
/// - A record shorter than the header is padded with empty values; a longer one is an error.
pub fn read_csv_from_bytes(body: Vec<u8>) -> PipelineResult<DataSet> {
    let text = String::from_utf8(body)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());
    read_csv_from_reader(&mut rdr)
}

/// Decode CSV data from an existing CSV reader.
///
/// The reader should be built with `has_headers(true)`; build it with `flexible(true)` to get
/// padding of short records instead of a parse error.
pub fn read_csv_from_reader<R: std::io::Read>(rdr: &mut csv::Reader<R>) -> PipelineResult<DataSet> {
    let headers = rdr.headers()?.clone();
    if headers.is_empty() {
        return Err(PipelineError::MissingHeader);
    }
    let header = Header::new(headers.iter());
    let width = header.len();

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if record.len() > width {
            return Err(PipelineError::MalformedRecord {
                line: record.position().map(|p| p.line()).unwrap_or_default(),
                expected: width,
                found: record.len(),
            });
        }

        let mut row: Vec<String> = record.iter().map(str::to_owned).collect();
        row.resize(width, String::new());
        rows.push(row);
    }

    Ok(DataSet::new(header, rows))
}
