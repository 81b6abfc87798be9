use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use csv_pipeline::batch_transform::{BatchTransformer, TransformOutcome, INPUT_CONTEXT};
use csv_pipeline::bookmark::{BookmarkMode, FileBookmarkStore, MemoryBookmarkStore};
use csv_pipeline::catalog::{StaticCatalog, TableDescriptor};
use csv_pipeline::config::BatchTransformConfig;
use csv_pipeline::export::OutputFormat;
use csv_pipeline::ingestion::parquet::read_parquet_from_bytes;
use csv_pipeline::store::{LocalFsStore, MemoryStore, ObjectLocation, ObjectStore};
use csv_pipeline::PipelineError;

const JOB: &str = "users-final";
const USERS: &[u8] = b"id,name,email,status,signup_date\n\
    1,Al,a@x.com,active,2024-01-01\n\
    2,Bo,b@x.com,inactive,2024-02-01\n\
    3,Cy,c@x.com,active,2024-03-01\n";

struct Fixture {
    store: Arc<MemoryStore>,
    bookmarks: Arc<MemoryBookmarkStore>,
    catalog: Arc<StaticCatalog>,
}

impl Fixture {
    fn new() -> Self {
        let catalog = StaticCatalog::new().with_table(
            "csv_pipeline_db",
            "processed",
            TableDescriptor::new(ObjectLocation::new("csv-processed-data", "processed/")),
        );
        Self {
            store: Arc::new(MemoryStore::new()),
            bookmarks: Arc::new(MemoryBookmarkStore::new()),
            catalog: Arc::new(catalog),
        }
    }

    fn upload(&self, name: &str, body: &[u8]) {
        self.store
            .put(
                &ObjectLocation::new("csv-processed-data", format!("processed/{name}")),
                body.to_vec(),
                "text/csv",
            )
            .unwrap();
    }

    fn config(&self, run_id: &str) -> BatchTransformConfig {
        BatchTransformConfig::new(
            JOB,
            "csv_pipeline_db",
            "processed",
            ObjectLocation::new("csv-final-data", "final_output/"),
            run_id,
        )
    }

    fn transformer(&self, config: BatchTransformConfig) -> BatchTransformer {
        BatchTransformer::new(
            self.store.clone(),
            self.catalog.clone(),
            self.bookmarks.clone(),
            config,
        )
    }

    fn run(&self, run_id: &str) -> Result<TransformOutcome, PipelineError> {
        self.transformer(self.config(run_id)).run()
    }

    fn output(&self, name: &str) -> String {
        let body = self
            .store
            .get(&ObjectLocation::new("csv-final-data", format!("final_output/{name}")))
            .unwrap();
        String::from_utf8(body).unwrap()
    }

    fn outputs(&self) -> usize {
        self.store.list("csv-final-data", "").unwrap().len()
    }
}

#[test]
fn renames_filters_and_projects() {
    let fx = Fixture::new();
    fx.upload("users.csv", USERS);

    let outcome = fx.run("r1").unwrap();

    assert_eq!(
        outcome,
        TransformOutcome::Written {
            destination: ObjectLocation::new("csv-final-data", "final_output/run-r1-part-r-00000.csv"),
            rows_in: 3,
            rows_out: 2,
        }
    );
    assert_eq!(
        fx.output("run-r1-part-r-00000.csv"),
        "id,name,email,registration_date\n1,Al,a@x.com,2024-01-01\n3,Cy,c@x.com,2024-03-01\n"
    );
}

#[test]
fn status_filter_is_case_sensitive() {
    let fx = Fixture::new();
    fx.upload(
        "users.csv",
        b"id,name,email,status,signup_date\n1,Al,a@x.com,Active,2024-01-01\n2,Bo,b@x.com,active,2024-02-01\n",
    );

    fx.run("r1").unwrap();

    assert_eq!(
        fx.output("run-r1-part-r-00000.csv"),
        "id,name,email,registration_date\n2,Bo,b@x.com,2024-02-01\n"
    );
}

#[test]
fn missing_status_column_skips_the_filter() {
    let fx = Fixture::new();
    fx.upload(
        "users.csv",
        b"signup_date,email,name,id,plan\n2024-01-01,a@x.com,Al,1,free\n2024-02-01,b@x.com,Bo,2,pro\n",
    );

    let outcome = fx.run("r1").unwrap();

    assert!(matches!(outcome, TransformOutcome::Written { rows_out: 2, .. }));
    assert_eq!(
        fx.output("run-r1-part-r-00000.csv"),
        "id,name,email,registration_date\n1,Al,a@x.com,2024-01-01\n2,Bo,b@x.com,2024-02-01\n"
    );
}

#[test]
fn output_values_are_not_quoted() {
    let fx = Fixture::new();
    fx.upload(
        "users.csv",
        b"id,name,email,status,signup_date\n1,\"Lovelace, Ada\",a@x.com,active,2024-01-01\n",
    );

    fx.run("r1").unwrap();

    assert_eq!(
        fx.output("run-r1-part-r-00000.csv"),
        "id,name,email,registration_date\n1,Lovelace, Ada,a@x.com,2024-01-01\n"
    );
}

#[test]
fn bookmarked_objects_are_not_read_again() {
    let fx = Fixture::new();
    fx.upload("day1.csv", USERS);
    fx.run("r1").unwrap();

    assert_eq!(fx.run("r2").unwrap(), TransformOutcome::NoInput);
    assert_eq!(fx.outputs(), 1);

    fx.upload(
        "day2.csv",
        b"id,name,email,status,signup_date\n4,Di,d@x.com,active,2024-04-01\n",
    );
    let outcome = fx.run("r3").unwrap();

    assert!(matches!(outcome, TransformOutcome::Written { rows_in: 1, rows_out: 1, .. }));
    assert_eq!(
        fx.output("run-r3-part-r-00000.csv"),
        "id,name,email,registration_date\n4,Di,d@x.com,2024-04-01\n"
    );

    let saved = fx.bookmarks.get(JOB).unwrap().unwrap();
    assert_eq!(saved.contexts[INPUT_CONTEXT].len(), 2);
}

#[test]
fn rewritten_objects_are_read_again() {
    let fx = Fixture::new();
    fx.upload("users.csv", USERS);
    fx.run("r1").unwrap();

    fx.upload("users.csv", USERS);
    assert!(matches!(fx.run("r2").unwrap(), TransformOutcome::Written { .. }));
}

#[test]
fn disabled_bookmarks_read_everything_and_persist_nothing() {
    let fx = Fixture::new();
    fx.upload("users.csv", USERS);

    for run_id in ["r1", "r2"] {
        let mut config = fx.config(run_id);
        config.bookmarks = BookmarkMode::Disabled;
        let outcome = fx.transformer(config).run().unwrap();
        assert!(matches!(outcome, TransformOutcome::Written { rows_out: 2, .. }));
    }

    assert_eq!(fx.outputs(), 2);
    assert!(fx.bookmarks.get(JOB).unwrap().is_none());
}

#[test]
fn objects_are_unioned_by_column_name() {
    let fx = Fixture::new();
    fx.upload("a.csv", b"id,name,email,status,signup_date\n1,Al,a@x.com,active,2024-01-01\n");
    fx.upload("b.csv", b"signup_date,status,email,name,id\n2024-02-01,active,b@x.com,Bo,2\n");

    fx.run("r1").unwrap();

    assert_eq!(
        fx.output("run-r1-part-r-00000.csv"),
        "id,name,email,registration_date\n1,Al,a@x.com,2024-01-01\n2,Bo,b@x.com,2024-02-01\n"
    );
}

#[test]
fn objects_with_different_columns_fail() {
    let fx = Fixture::new();
    fx.upload("a.csv", USERS);
    fx.upload("b.csv", b"id,name\n1,Al\n");

    let err = fx.run("r1").unwrap_err();
    assert!(matches!(err, PipelineError::SchemaMismatch { .. }));
    assert!(fx.bookmarks.get(JOB).unwrap().is_none());
}

#[test]
fn empty_table_commits_and_writes_nothing() {
    let fx = Fixture::new();

    assert_eq!(fx.run("r1").unwrap(), TransformOutcome::NoInput);
    assert_eq!(fx.outputs(), 0);
    assert!(fx.bookmarks.get(JOB).unwrap().is_some());
}

#[test]
fn header_only_objects_are_no_input() {
    let fx = Fixture::new();
    fx.upload("users.csv", b"id,name,email,status,signup_date\n");

    assert_eq!(fx.run("r1").unwrap(), TransformOutcome::NoInput);
    assert_eq!(fx.outputs(), 0);
}

#[test]
fn zero_byte_object_is_no_input_and_is_committed() {
    let fx = Fixture::new();
    fx.upload("empty.csv", b"");

    assert_eq!(fx.run("r1").unwrap(), TransformOutcome::NoInput);
    assert_eq!(fx.outputs(), 0);
    let saved = fx.bookmarks.get(JOB).unwrap().unwrap();
    assert!(saved.contexts[INPUT_CONTEXT].contains_key("s3://csv-processed-data/processed/empty.csv"));

    assert_eq!(fx.run("r2").unwrap(), TransformOutcome::NoInput);
}

#[test]
fn zero_byte_object_does_not_block_other_objects() {
    let fx = Fixture::new();
    fx.upload("a-empty.csv", b"");
    fx.upload("b.csv", USERS);

    let outcome = fx.run("r1").unwrap();

    assert!(matches!(outcome, TransformOutcome::Written { rows_in: 3, rows_out: 2, .. }));
    assert_eq!(fx.bookmarks.get(JOB).unwrap().unwrap().contexts[INPUT_CONTEXT].len(), 2);
}

#[test]
fn everything_filtered_out_commits_and_writes_nothing() {
    let fx = Fixture::new();
    fx.upload(
        "users.csv",
        b"id,name,email,status,signup_date\n1,Al,a@x.com,inactive,2024-01-01\n",
    );

    assert_eq!(
        fx.run("r1").unwrap(),
        TransformOutcome::EmptyAfterTransform { rows_in: 1 }
    );
    assert_eq!(fx.outputs(), 0);

    let saved = fx.bookmarks.get(JOB).unwrap().unwrap();
    assert_eq!(saved.contexts[INPUT_CONTEXT].len(), 1);
    assert_eq!(fx.run("r2").unwrap(), TransformOutcome::NoInput);
}

#[test]
fn missing_signup_date_fails_without_commit() {
    let fx = Fixture::new();
    fx.upload("users.csv", b"id,name,email,status\n1,Al,a@x.com,active\n");

    let err = fx.run("r1").unwrap_err();

    match err {
        PipelineError::MissingColumn { column, .. } => assert_eq!(column, "signup_date"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(fx.outputs(), 0);
    assert!(fx.bookmarks.get(JOB).unwrap().is_none());
}

#[test]
fn missing_projection_column_fails() {
    let fx = Fixture::new();
    fx.upload("users.csv", b"id,email,status,signup_date\n1,a@x.com,active,2024-01-01\n");

    let err = fx.run("r1").unwrap_err();

    match err {
        PipelineError::InvalidProjection { missing } => assert_eq!(missing, vec!["name"]),
        other => panic!("unexpected error: {other}"),
    }
    assert!(fx.bookmarks.get(JOB).unwrap().is_none());
}

#[test]
fn unknown_table_fails() {
    let fx = Fixture::new();
    let mut config = fx.config("r1");
    config.table = "raw".to_string();

    let err = fx.transformer(config).run().unwrap_err();
    assert_eq!(err.to_string(), "table not found: csv_pipeline_db.raw");
}

#[test]
fn writes_parquet_when_requested() {
    let fx = Fixture::new();
    fx.upload("users.csv", USERS);
    let mut config = fx.config("r1");
    config.format = OutputFormat::Parquet;

    let outcome = fx.transformer(config).run().unwrap();

    let destination = ObjectLocation::new("csv-final-data", "final_output/run-r1-part-r-00000.parquet");
    assert!(matches!(&outcome, TransformOutcome::Written { destination: d, .. } if *d == destination));
    assert_eq!(
        fx.store.content_type(&destination).as_deref(),
        Some("application/vnd.apache.parquet")
    );

    let ds = read_parquet_from_bytes(fx.store.get(&destination).unwrap()).unwrap();
    assert_eq!(ds.header.names(), &["id", "name", "email", "registration_date"]);
    assert_eq!(ds.rows[1], vec!["3", "Cy", "c@x.com", "2024-03-01"]);
}

#[test]
fn runs_against_local_directories_and_a_catalog_document() {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    let root = std::env::temp_dir().join(format!("csv-pipeline-batch-{nanos}"));
    let store = Arc::new(LocalFsStore::new(root.join("buckets")));
    store
        .put(
            &ObjectLocation::new("csv-processed-data", "processed/2024/users.csv"),
            USERS.to_vec(),
            "text/csv",
        )
        .unwrap();
    store
        .put(
            &ObjectLocation::new("csv-processed-data", "processed/README.txt"),
            b"not data".to_vec(),
            "text/plain",
        )
        .unwrap();

    let catalog = StaticCatalog::from_json(
        r#"{"databases": {"csv_pipeline_db": {"processed": {
            "location": "s3://csv-processed-data/processed/", "format": "csv"
        }}}}"#,
    )
    .unwrap();
    let bookmarks = Arc::new(FileBookmarkStore::new(root.join("bookmarks")));
    let output = ObjectLocation::parse("s3://csv-final-data/final_output/").unwrap();

    let job = |run_id: &str| {
        BatchTransformer::new(
            store.clone(),
            Arc::new(catalog.clone()),
            bookmarks.clone(),
            BatchTransformConfig::new(JOB, "csv_pipeline_db", "processed", output.clone(), run_id),
        )
    };

    let outcome = job("r1").run().unwrap();
    assert!(matches!(outcome, TransformOutcome::Written { rows_out: 2, .. }));
    assert!(root.join("bookmarks").join(format!("{JOB}.json")).exists());
    assert_eq!(job("r2").run().unwrap(), TransformOutcome::NoInput);

    let written = std::fs::read_to_string(
        root.join("buckets/csv-final-data/final_output/run-r1-part-r-00000.csv"),
    )
    .unwrap();
    assert!(written.starts_with("id,name,email,registration_date\n"));

    let _ = std::fs::remove_dir_all(&root);
}
