//! Parquet decoding into a string-valued [`DataSet`].

use bytes::Bytes;
use parquet::file::reader::{ChunkReader, FileReader};
use parquet::file::serialized_reader::SerializedFileReader;
use parquet::record::Field;

use crate::error::{PipelineError, PipelineResult};
use crate::types::{DataSet, Header};

/// Decode a Parquet object body into an in-memory [`DataSet`].
///
/// Notes:
/// - The header is the list of leaf column paths, in file schema order
/// - Nulls become empty strings; other values are rendered as text
/// - Uses the Parquet record API (`RowIter`)
pub fn read_parquet_from_bytes(body: Vec<u8>) -> PipelineResult<DataSet> {
    let reader = SerializedFileReader::new(Bytes::from(body))?;
    let header = Header::new(parquet_leaf_column_paths(&reader));

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx0, row_res) in reader.get_row_iter(None)?.enumerate() {
        let row = row_res?;
        let mut out = vec![String::new(); header.len()];
        for (name, field) in row.get_column_iter() {
            let idx = header
                .index_of(name)
                .ok_or_else(|| PipelineError::SchemaMismatch {
                    message: format!("row {} has unknown column '{name}'", idx0 + 1),
                })?;
            out[idx] = field_to_string(field);
        }
        rows.push(out);
    }

    Ok(DataSet::new(header, rows))
}

fn parquet_leaf_column_paths<R: ChunkReader + 'static>(reader: &SerializedFileReader<R>) -> Vec<String> {
    reader
        .metadata()
        .file_metadata()
        .schema_descr()
        .columns()
        .iter()
        .map(|c| c.path().string())
        .collect()
}

fn field_to_string(f: &Field) -> String {
    match f {
        Field::Null => String::new(),
        Field::Str(s) => s.clone(),
        other => other.to_string(),
    }
}
