//! `csv-pipeline` implements a two-stage CSV ingestion pipeline over a pluggable object store.
//!
//! - **Row filter** ([`row_filter`]): triggered per uploaded object. Reads one CSV, drops records
//!   without an email or with a `pending` status, and writes the survivors under the original
//!   header to `<prefix><basename>` in a destination bucket.
//! - **Batch transformer** ([`batch_transform`]): triggered per scheduled run. Resolves a table
//!   through a [`catalog::Catalog`], reads the objects not yet consumed by the job bookmark,
//!   renames `signup_date` → `registration_date`, keeps `status == "active"` rows, projects to
//!   `id, name, email, registration_date` and writes a CSV (or Parquet) object.
//!
//! The stages share no runtime state; they meet only in the object store. Storage, catalog and
//! bookmark backends are traits passed in at construction time, so tests run against in-memory
//! fakes.
//!
//! ## Quick example: row filter
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use csv_pipeline::config::RowFilterConfig;
//! use csv_pipeline::event::ObjectCreatedEvent;
//! use csv_pipeline::row_filter::{RowFilter, RowFilterOutcome};
//! use csv_pipeline::store::{MemoryStore, ObjectLocation, ObjectStore};
//!
//! # fn main() -> Result<(), csv_pipeline::PipelineError> {
//! let store = Arc::new(MemoryStore::new());
//! let source = ObjectLocation::new("csv-raw-data", "uploads/users.csv");
//! store.put(
//!     &source,
//!     b"id,name,email,status\n1,Al,a@x.com,active\n2,Bo,,pending\n3,Cy,c@x.com,pending\n".to_vec(),
//!     "text/csv",
//! )?;
//!
//! let filter = RowFilter::new(store.clone(), RowFilterConfig::new("csv-processed-data"));
//! let outcome = filter.handle(&ObjectCreatedEvent::for_object(&source))?;
//! assert!(matches!(outcome, RowFilterOutcome::Written { rows_out: 1, .. }));
//!
//! let written = store.get(&ObjectLocation::new("csv-processed-data", "processed/users.csv"))?;
//! assert_eq!(written, b"id,name,email,status\n1,Al,a@x.com,active\n");
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`types`]: header, record and dataset types
//! - [`ingestion`] / [`export`]: CSV and Parquet decoding/encoding
//! - [`processing`]: admission rules, rename, status filter, projection
//! - [`store`], [`catalog`], [`bookmark`]: injected collaborators
//! - [`row_filter`], [`batch_transform`]: the two stages
//! - [`observability`], [`logging`]: outcome reporting and `tracing` setup
//! - [`error`]: error types shared by everything above

pub mod batch_transform;
pub mod bookmark;
pub mod catalog;
pub mod config;
pub mod error;
pub mod event;
pub mod export;
pub mod ingestion;
pub mod logging;
pub mod observability;
pub mod processing;
pub mod row_filter;
pub mod store;
pub mod types;

pub use error::{PipelineError, PipelineResult};
