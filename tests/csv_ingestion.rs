use csv_pipeline::export::{write_csv, CsvWriteOptions};
use csv_pipeline::ingestion::csv::{read_csv_from_bytes, read_csv_from_reader};
use csv_pipeline::PipelineError;

#[test]
fn read_csv_from_bytes_happy_path() {
    let ds = read_csv_from_bytes(b"id,name,email,status\n1,Ada,ada@x.com,active\n2,Grace,,pending\n".to_vec())
        .unwrap();

    assert_eq!(ds.header.names(), &["id", "name", "email", "status"]);
    assert_eq!(ds.row_count(), 2);
    assert_eq!(ds.rows[0], vec!["1", "Ada", "ada@x.com", "active"]);
    assert_eq!(ds.rows[1][2], "");
}

#[test]
fn read_csv_keeps_values_as_text() {
    let ds = read_csv_from_bytes(b"id,score\n007,98.50\n".to_vec()).unwrap();
    assert_eq!(ds.rows[0], vec!["007", "98.50"]);
}

#[test]
fn read_csv_handles_quoted_fields() {
    let input = "id,name\n1,\"Lovelace, Ada\"\n2,\"say \"\"hi\"\"\"\n";
    let ds = read_csv_from_bytes(input.as_bytes().to_vec()).unwrap();
    assert_eq!(ds.rows[0][1], "Lovelace, Ada");
    assert_eq!(ds.rows[1][1], "say \"hi\"");
}

#[test]
fn read_csv_from_reader_accepts_prebuilt_reader() {
    let input = "name;id\nAda;1\n";
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b';')
        .from_reader(input.as_bytes());

    let ds = read_csv_from_reader(&mut rdr).unwrap();
    assert_eq!(ds.header.names(), &["name", "id"]);
    assert_eq!(ds.rows[0], vec!["Ada", "1"]);
}

#[test]
fn read_csv_errors_on_empty_body() {
    let err = read_csv_from_bytes(Vec::new()).unwrap_err();
    assert!(matches!(err, PipelineError::MissingHeader));
    assert_eq!(err.to_string(), "csv has no headers or is empty");
}

#[test]
fn read_csv_errors_on_record_longer_than_header() {
    let err = read_csv_from_bytes(b"id,name\n1,Ada,extra\n".to_vec()).unwrap_err();
    match err {
        PipelineError::MalformedRecord { expected, found, .. } => {
            assert_eq!(expected, 2);
            assert_eq!(found, 3);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn read_csv_errors_on_invalid_utf8() {
    let err = read_csv_from_bytes(vec![b'i', b'd', b'\n', 0xff, 0xfe, b'\n']).unwrap_err();
    assert!(matches!(err, PipelineError::Encoding(_)));
}

#[test]
fn decoded_csv_is_written_back_unchanged() {
    let input = "id,name,email\n1,\"Lovelace, Ada\",ada@x.com\n2,Grace,grace@x.com\n";
    let ds = read_csv_from_bytes(input.as_bytes().to_vec()).unwrap();
    let out = write_csv(&ds, &CsvWriteOptions::default()).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), input);
}
