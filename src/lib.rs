//! bucket-ingest: load bucket-hosted flat files into PostgreSQL
//!
//! The storage path of each object names its relational target
//! (`<prefix>/<database>/<schema>/<table>/<filename>.<ext>`). CSV shards are
//! merged per target table, their column types inferred from the merged
//! values, and the rows bulk-loaded; image files contribute only a
//! (file_name, url) metadata row to a fixed image table.

pub mod cli;
pub mod config;
pub mod database;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod logging;
pub mod merge;
pub mod schema;
pub mod storage;

pub use config::LoaderConfig;
pub use engine::{LoadEngine, RunSummary};
pub use error::{IngestError, IngestResult};
