//! Bucket listing classification and grouping
//!
//! The storage path itself names the relational target:
//! `<prefix>/<database>/<schema>/<table>/<filename>.<ext>`. This module
//! parses each listed path into those components, classifies the object as
//! tabular (CSV) or image, and groups objects by their
//! (database, schema, table) triple. Paths that do not fit the convention
//! are collected as skipped entries, never treated as fatal.

use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// Image extensions recorded as metadata rows, matched case-insensitively
pub const IMAGE_EXTENSIONS: [&str; 9] = [
    "jpeg", "jpg", "png", "gif", "bmp", "tiff", "webp", "svg", "heic",
];

/// Number of path segments a conforming object must have at minimum
/// (prefix, database, schema, table, filename)
const MIN_SEGMENTS: usize = 5;

/// Classification of a discovered object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Tabular,
    Image,
}

/// The relational target a group of objects loads into
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct GroupKey {
    pub database: String,
    pub schema: String,
    pub table: String,
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.database, self.schema, self.table)
    }
}

/// One accepted object from the bucket listing
#[derive(Debug, Clone)]
pub struct ObjectRef {
    pub path: String,
    pub kind: ObjectKind,
    pub key: GroupKey,
    pub file_name: String,
}

/// Metadata row recorded for one image object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    pub file_name: String,
    pub url: String,
}

/// Why an object was excluded from the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    TooFewSegments { segments: usize },
    UnrecognizedExtension { extension: Option<String> },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::TooFewSegments { segments } => {
                write!(f, "path has {} segments, expected at least {}", segments, MIN_SEGMENTS)
            }
            SkipReason::UnrecognizedExtension { extension: Some(ext) } => {
                write!(f, "unrecognized extension '{}'", ext)
            }
            SkipReason::UnrecognizedExtension { extension: None } => {
                write!(f, "object has no extension")
            }
        }
    }
}

/// An object excluded from the run, with the reason it was excluded
#[derive(Debug, Clone)]
pub struct SkippedObject {
    pub path: String,
    pub reason: SkipReason,
}

/// Grouped view of a full bucket listing
///
/// Group iteration order is the key order of the underlying `BTreeMap`, so
/// two runs over the same listing process groups in the same sequence.
/// Within a group, objects keep the order the listing enumerated them.
#[derive(Debug, Default)]
pub struct BucketIndex {
    pub tabular: BTreeMap<GroupKey, Vec<ObjectRef>>,
    pub images: BTreeMap<GroupKey, Vec<ImageRecord>>,
    pub skipped: Vec<SkippedObject>,
}

impl BucketIndex {
    /// Classify and group a bucket listing
    ///
    /// `url_for` maps an object path to its public URL; it is only invoked
    /// for image objects.
    pub fn build<F>(paths: &[String], url_for: F) -> Self
    where
        F: Fn(&str) -> String,
    {
        let mut index = BucketIndex::default();

        for path in paths {
            match parse_object_path(path) {
                Ok(object) => match object.kind {
                    ObjectKind::Tabular => {
                        index
                            .tabular
                            .entry(object.key.clone())
                            .or_default()
                            .push(object);
                    }
                    ObjectKind::Image => {
                        let record = ImageRecord {
                            file_name: object.file_name.clone(),
                            url: url_for(&object.path),
                        };
                        index.images.entry(object.key).or_default().push(record);
                    }
                },
                Err(reason) => {
                    warn!("Skipping object with unexpected path structure: {} ({})", path, reason);
                    index.skipped.push(SkippedObject {
                        path: path.clone(),
                        reason,
                    });
                }
            }
        }

        index
    }

    /// Total number of accepted objects
    pub fn accepted_count(&self) -> usize {
        let tabular: usize = self.tabular.values().map(Vec::len).sum();
        let images: usize = self.images.values().map(Vec::len).sum();
        tabular + images
    }
}

/// Parse one object path against the storage layout convention
///
/// Segment 0 is the convention-defined bucket prefix and is ignored;
/// segments 1..4 are database, schema, table, filename.
pub fn parse_object_path(path: &str) -> Result<ObjectRef, SkipReason> {
    let segments: Vec<&str> = path.split('/').collect();
    if segments.len() < MIN_SEGMENTS {
        return Err(SkipReason::TooFewSegments {
            segments: segments.len(),
        });
    }

    let kind = classify_extension(path)?;

    Ok(ObjectRef {
        path: path.to_string(),
        kind,
        key: GroupKey {
            database: segments[1].to_string(),
            schema: segments[2].to_string(),
            table: segments[3].to_string(),
        },
        file_name: segments[4].to_string(),
    })
}

fn classify_extension(path: &str) -> Result<ObjectKind, SkipReason> {
    if path.ends_with(".csv") {
        return Ok(ObjectKind::Tabular);
    }

    match path.rsplit_once('.') {
        Some((_, ext)) if !ext.contains('/') => {
            let lowered = ext.to_lowercase();
            if IMAGE_EXTENSIONS.contains(&lowered.as_str()) {
                Ok(ObjectKind::Image)
            } else {
                Err(SkipReason::UnrecognizedExtension {
                    extension: Some(lowered),
                })
            }
        }
        _ => Err(SkipReason::UnrecognizedExtension { extension: None }),
    }
}
