//! CSV encoding.

use crate::error::PipelineResult;
use crate::types::DataSet;

/// Quoting policy for written fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CsvQuoting {
    /// Quote only fields containing the delimiter, a quote or a line break.
    #[default]
    Minimal,
    /// Never quote; values are written verbatim.
    Never,
}

/// Options controlling CSV output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvWriteOptions {
    /// Field quoting policy.
    pub quoting: CsvQuoting,
}

impl CsvWriteOptions {
    /// Options with quoting disabled.
    pub fn unquoted() -> Self {
        Self {
            quoting: CsvQuoting::Never,
        }
    }
}

/// Encode `dataset` as CSV: the header line first, then one `\n`-terminated line per row.
///
/// Output is a pure function of the dataset and options, so re-encoding the same dataset yields
/// byte-identical bodies.
pub fn write_csv(dataset: &DataSet, options: &CsvWriteOptions) -> PipelineResult<Vec<u8>> {
    let quote_style = match options.quoting {
        CsvQuoting::Minimal => csv::QuoteStyle::Necessary,
        CsvQuoting::Never => csv::QuoteStyle::Never,
    };

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(quote_style)
        .from_writer(Vec::new());

    wtr.write_record(dataset.header.field_names())?;
    for row in &dataset.rows {
        wtr.write_record(row)?;
    }

    wtr.into_inner().map_err(|e| e.into_error().into())
}
