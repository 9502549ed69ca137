//! CSV shard fetching and merging
//!
//! All shards of one (database, schema, table) group are fetched fully into
//! memory, decoded, parsed, and concatenated into a single [`MergedDataset`]
//! in listing order. Shards are assumed to share the same column set and
//! order; no cross-shard validation is performed, so divergent shards
//! misalign positionally.

use crate::discovery::ObjectRef;
use crate::error::{MergeError, MergeResult};
use crate::storage::BucketSource;
use std::borrow::Cow;
use tracing::debug;

/// A merged, row-major dataset ready for type inference and loading
///
/// Cells hold the raw textual representation from the CSV; an empty cell is
/// `None` and loads as SQL NULL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedDataset {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl MergedDataset {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate one column's cells top to bottom
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = Option<&str>> {
        self.rows
            .iter()
            .map(move |row| row.get(index).and_then(|cell| cell.as_deref()))
    }
}

/// Fetches and concatenates the CSV shards of one group
pub struct CsvMerger<'a> {
    source: &'a BucketSource,
}

impl<'a> CsvMerger<'a> {
    pub fn new(source: &'a BucketSource) -> Self {
        Self { source }
    }

    /// Merge every shard of one group, in the order the shards were listed
    ///
    /// The first shard's header row names the merged columns. Rows from
    /// later shards are appended positionally, padded with NULL or truncated
    /// to the merged width when a shard disagrees on column count.
    pub async fn merge_group(&self, shards: &[ObjectRef]) -> MergeResult<MergedDataset> {
        let mut columns: Vec<String> = Vec::new();
        let mut rows: Vec<Vec<Option<String>>> = Vec::new();

        for shard in shards {
            let bytes = self.source.fetch(&shard.path).await?;
            let text = decode_shard(&bytes);

            let mut reader = csv::ReaderBuilder::new()
                .has_headers(true)
                .from_reader(text.as_bytes());

            let headers = reader.headers().map_err(|e| MergeError::CsvParseFailed {
                path: shard.path.clone(),
                cause: e.to_string(),
            })?;

            if columns.is_empty() {
                columns = headers.iter().map(str::to_string).collect();
            }
            let width = columns.len();

            for record in reader.records() {
                let record = record.map_err(|e| MergeError::CsvParseFailed {
                    path: shard.path.clone(),
                    cause: e.to_string(),
                })?;

                let mut row: Vec<Option<String>> = record
                    .iter()
                    .take(width)
                    .map(|cell| {
                        if cell.is_empty() {
                            None
                        } else {
                            Some(cell.to_string())
                        }
                    })
                    .collect();
                row.resize(width, None);
                rows.push(row);
            }

            debug!("Merged shard {} ({} rows so far)", shard.path, rows.len());
        }

        Ok(MergedDataset { columns, rows })
    }
}

/// Decode a shard's bytes, preferring UTF-8 with an ISO-8859-1 fallback
///
/// Latin-1 maps every byte value, so the fallback itself cannot fail; a file
/// that is unusable after decoding surfaces as a CSV parse error instead.
fn decode_shard(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => encoding_rs::mem::decode_latin1(bytes),
    }
}
