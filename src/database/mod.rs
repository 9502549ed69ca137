//! PostgreSQL side of the pipeline: connections, provisioning, and loading

pub mod connection;
pub mod load;
pub mod provision;

pub use connection::ConnectionManager;
pub use load::DataLoader;
pub use provision::TableProvisioner;

use crate::error::{DatabaseError, DatabaseResult};

/// Quote a path-derived name for embedding into DDL
///
/// Path segments are trusted by convention, but they still pass through this
/// utility so a stray quote cannot break out of the identifier: embedded
/// double quotes are doubled, and empty or NUL-bearing names are rejected.
pub fn quote_ident(name: &str) -> DatabaseResult<String> {
    if name.is_empty() {
        return Err(DatabaseError::InvalidIdentifier {
            name: name.to_string(),
            reason: "identifier is empty".to_string(),
        });
    }
    if name.contains('\0') {
        return Err(DatabaseError::InvalidIdentifier {
            name: name.replace('\0', "\\0"),
            reason: "identifier contains a NUL byte".to_string(),
        });
    }

    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}
