//! Parquet encoding.

use std::sync::Arc;

use parquet::basic::{ConvertedType, Repetition, Type as PhysicalType};
use parquet::data_type::{ByteArray, ByteArrayType};
use parquet::file::properties::WriterProperties;
use parquet::file::writer::SerializedFileWriter;
use parquet::schema::types::Type;

use crate::error::PipelineResult;
use crate::types::DataSet;

/// Encode `dataset` as a Parquet file body.
///
/// Every column is written as a required UTF-8 byte array in a single row group.
pub fn write_parquet(dataset: &DataSet) -> PipelineResult<Vec<u8>> {
    let mut fields = Vec::with_capacity(dataset.header.len());
    for name in dataset.header.field_names() {
        let field = Type::primitive_type_builder(name, PhysicalType::BYTE_ARRAY)
            .with_repetition(Repetition::REQUIRED)
            .with_converted_type(ConvertedType::UTF8)
            .build()?;
        fields.push(Arc::new(field));
    }
    let schema = Arc::new(Type::group_type_builder("schema").with_fields(fields).build()?);
    let props = Arc::new(WriterProperties::builder().build());

    let mut writer = SerializedFileWriter::new(Vec::new(), schema, props)?;
    let mut rg = writer.next_row_group()?;
    let mut col_idx: usize = 0;
    while let Some(mut col) = rg.next_column()? {
        let values: Vec<ByteArray> = dataset
            .rows
            .iter()
            .map(|row| ByteArray::from(row[col_idx].as_str()))
            .collect();
        col.typed::<ByteArrayType>().write_batch(&values, None, None)?;
        col.close()?;
        col_idx += 1;
    }
    rg.close()?;

    Ok(writer.into_inner()?)
}

#[cfg(test)]
mod tests {
    use super::write_parquet;
    use crate::ingestion::parquet::read_parquet_from_bytes;
    use crate::types::{DataSet, Header};

    #[test]
    fn parquet_output_reads_back_with_same_header_and_values() {
        let ds = DataSet::new(
            Header::new(["id", "name", "email", "registration_date"]),
            vec![
                vec!["1".into(), "Al".into(), "a@x.com".into(), "2024-01-02".into()],
                vec!["3".into(), "Cy".into(), "".into(), "2024-02-03".into()],
            ],
        );

        let body = write_parquet(&ds).unwrap();
        let back = read_parquet_from_bytes(body).unwrap();
        assert_eq!(back, ds);
    }
}
