//! Idempotent provisioning of schemas and tables
//!
//! Every statement is a "create if absent" form, so provisioning the same
//! target twice is a no-op. Existing tables are never altered; column drift
//! between runs is not detected.

use crate::database::quote_ident;
use crate::error::{DatabaseError, DatabaseResult};
use crate::schema::ColumnType;
use sqlx::PgPool;
use tracing::debug;

/// Ensures schemas and tables exist before a load
pub struct TableProvisioner<'a> {
    pool: &'a PgPool,
}

impl<'a> TableProvisioner<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create the schema if absent
    pub async fn ensure_schema(&self, schema: &str) -> DatabaseResult<()> {
        let ddl = schema_ddl(schema)?;
        sqlx::query(&ddl)
            .execute(self.pool)
            .await
            .map_err(|e| DatabaseError::SchemaCreationFailed {
                schema: schema.to_string(),
                cause: e.to_string(),
            })?;

        debug!("Ensured schema {}", schema);
        Ok(())
    }

    /// Create a tabular table if absent, one column per inferred
    /// (name, type) pair
    pub async fn ensure_table(
        &self,
        schema: &str,
        table: &str,
        columns: &[(String, ColumnType)],
    ) -> DatabaseResult<()> {
        let ddl = table_ddl(schema, table, columns)?;
        sqlx::query(&ddl)
            .execute(self.pool)
            .await
            .map_err(|e| DatabaseError::TableCreationFailed {
                table_name: format!("{}.{}", schema, table),
                cause: e.to_string(),
            })?;

        debug!("Ensured table {}.{}", schema, table);
        Ok(())
    }

    /// Create the fixed image-metadata table if absent
    pub async fn ensure_image_table(&self, schema: &str, table: &str) -> DatabaseResult<()> {
        let ddl = image_table_ddl(schema, table)?;
        sqlx::query(&ddl)
            .execute(self.pool)
            .await
            .map_err(|e| DatabaseError::TableCreationFailed {
                table_name: format!("{}.{}", schema, table),
                cause: e.to_string(),
            })?;

        debug!("Ensured image table {}.{}", schema, table);
        Ok(())
    }
}

pub(crate) fn schema_ddl(schema: &str) -> DatabaseResult<String> {
    Ok(format!(
        "CREATE SCHEMA IF NOT EXISTS {}",
        quote_ident(schema)?
    ))
}

pub(crate) fn table_ddl(
    schema: &str,
    table: &str,
    columns: &[(String, ColumnType)],
) -> DatabaseResult<String> {
    let mut column_defs = Vec::with_capacity(columns.len());
    for (name, column_type) in columns {
        column_defs.push(format!("{} {}", quote_ident(name)?, column_type.sql_type()));
    }

    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {}.{} ({})",
        quote_ident(schema)?,
        quote_ident(table)?,
        column_defs.join(", ")
    ))
}

pub(crate) fn image_table_ddl(schema: &str, table: &str) -> DatabaseResult<String> {
    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {}.{} (id BIGSERIAL PRIMARY KEY, file_name TEXT NOT NULL, url TEXT NOT NULL UNIQUE)",
        quote_ident(schema)?,
        quote_ident(table)?
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_ddl_is_idempotent_form() {
        assert_eq!(
            schema_ddl("public").unwrap(),
            "CREATE SCHEMA IF NOT EXISTS \"public\""
        );
    }

    #[test]
    fn test_table_ddl_quotes_identifiers_and_types_columns() {
        let columns = vec![
            ("id".to_string(), ColumnType::Integer),
            ("amount".to_string(), ColumnType::Real),
            ("note".to_string(), ColumnType::Text),
        ];
        assert_eq!(
            table_ddl("public", "orders", &columns).unwrap(),
            "CREATE TABLE IF NOT EXISTS \"public\".\"orders\" (\"id\" INTEGER, \"amount\" REAL, \"note\" TEXT)"
        );
    }

    #[test]
    fn test_table_ddl_preserves_column_case() {
        let columns = vec![("OrderId".to_string(), ColumnType::Integer)];
        let ddl = table_ddl("Sales", "Orders", &columns).unwrap();
        assert!(ddl.contains("\"Sales\".\"Orders\""));
        assert!(ddl.contains("\"OrderId\" INTEGER"));
    }

    #[test]
    fn test_image_table_ddl_has_fixed_shape() {
        let ddl = image_table_ddl("assets", "photos").unwrap();
        assert!(ddl.contains("id BIGSERIAL PRIMARY KEY"));
        assert!(ddl.contains("file_name TEXT NOT NULL"));
        assert!(ddl.contains("url TEXT NOT NULL UNIQUE"));
        assert!(ddl.starts_with("CREATE TABLE IF NOT EXISTS \"assets\".\"photos\""));
    }

    #[test]
    fn test_table_ddl_rejects_invalid_column_name() {
        let columns = vec![("".to_string(), ColumnType::Text)];
        assert!(table_ddl("public", "orders", &columns).is_err());
    }
}
