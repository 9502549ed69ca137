//! Bulk, set-oriented row loading
//!
//! Each group is loaded with multi-row parameterized INSERTs inside one
//! transaction, committed once per group. Tabular inserts carry
//! `ON CONFLICT DO NOTHING` (a no-op in practice, since inferred tables have
//! no unique constraint, so duplicate rows across re-runs are kept); the image
//! table's `ON CONFLICT (url) DO NOTHING` is a genuine at-most-once guarantee
//! per URL.

use crate::database::quote_ident;
use crate::discovery::ImageRecord;
use crate::error::{DatabaseError, DatabaseResult};
use crate::merge::MergedDataset;
use crate::schema::ColumnType;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::{PgPool, Postgres};
use tracing::debug;

/// PostgreSQL wire-protocol limit on bind parameters per statement
const MAX_BIND_PARAMS: usize = 65_535;

/// Loads merged datasets and image records into provisioned tables
pub struct DataLoader<'a> {
    pool: &'a PgPool,
}

impl<'a> DataLoader<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert every row of a merged dataset, binding each cell per its
    /// inferred column type. Returns the number of rows inserted.
    pub async fn load_tabular(
        &self,
        schema: &str,
        table: &str,
        dataset: &MergedDataset,
        types: &[ColumnType],
    ) -> DatabaseResult<u64> {
        if dataset.is_empty() {
            return Ok(0);
        }

        let width = dataset.column_count();
        let rows_per_chunk = (MAX_BIND_PARAMS / width).max(1);

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DatabaseError::TransactionFailed {
                cause: format!("Failed to start transaction: {}", e),
            })?;

        let mut inserted = 0u64;
        for chunk in dataset.rows.chunks(rows_per_chunk) {
            let sql = tabular_insert_sql(schema, table, &dataset.columns, chunk.len())?;
            let mut query = sqlx::query(&sql);

            for row in chunk {
                for (cell, column_type) in row.iter().zip(types) {
                    query = bind_cell(query, cell.as_deref(), *column_type)?;
                }
            }

            let result = query
                .execute(&mut *tx)
                .await
                .map_err(|e| DatabaseError::QueryFailed {
                    query: sql.clone(),
                    cause: e.to_string(),
                })?;
            inserted += result.rows_affected();
        }

        tx.commit()
            .await
            .map_err(|e| DatabaseError::TransactionFailed {
                cause: format!("Failed to commit transaction: {}", e),
            })?;

        debug!("Loaded {} rows into {}.{}", inserted, schema, table);
        Ok(inserted)
    }

    /// Insert image metadata rows; rows whose URL already exists are skipped
    pub async fn load_images(
        &self,
        schema: &str,
        table: &str,
        records: &[ImageRecord],
    ) -> DatabaseResult<u64> {
        if records.is_empty() {
            return Ok(0);
        }

        let rows_per_chunk = (MAX_BIND_PARAMS / 2).max(1);

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DatabaseError::TransactionFailed {
                cause: format!("Failed to start transaction: {}", e),
            })?;

        let mut inserted = 0u64;
        for chunk in records.chunks(rows_per_chunk) {
            let sql = image_insert_sql(schema, table, chunk.len())?;
            let mut query = sqlx::query(&sql);

            for record in chunk {
                query = query.bind(&record.file_name).bind(&record.url);
            }

            let result = query
                .execute(&mut *tx)
                .await
                .map_err(|e| DatabaseError::QueryFailed {
                    query: sql.clone(),
                    cause: e.to_string(),
                })?;
            inserted += result.rows_affected();
        }

        tx.commit()
            .await
            .map_err(|e| DatabaseError::TransactionFailed {
                cause: format!("Failed to commit transaction: {}", e),
            })?;

        debug!("Loaded {} image rows into {}.{}", inserted, schema, table);
        Ok(inserted)
    }
}

/// Bind one cell according to the column's inferred type
///
/// Inference runs over the same merged values beforehand, so the parses here
/// only fail if the dataset was mutated between inference and load.
fn bind_cell<'q>(
    query: Query<'q, Postgres, PgArguments>,
    cell: Option<&str>,
    column_type: ColumnType,
) -> DatabaseResult<Query<'q, Postgres, PgArguments>> {
    let query = match column_type {
        ColumnType::Integer => {
            let value = cell
                .map(|raw| {
                    raw.trim()
                        .parse::<i64>()
                        .map_err(|_| DatabaseError::TypeMismatch {
                            expected: ColumnType::Integer.sql_type().to_string(),
                            value: raw.to_string(),
                        })
                })
                .transpose()?;
            query.bind(value)
        }
        ColumnType::Real => {
            let value = cell
                .map(|raw| {
                    raw.trim()
                        .parse::<f64>()
                        .map_err(|_| DatabaseError::TypeMismatch {
                            expected: ColumnType::Real.sql_type().to_string(),
                            value: raw.to_string(),
                        })
                })
                .transpose()?;
            query.bind(value)
        }
        ColumnType::Text => query.bind(cell.map(str::to_string)),
    };
    Ok(query)
}

pub(crate) fn tabular_insert_sql(
    schema: &str,
    table: &str,
    columns: &[String],
    row_count: usize,
) -> DatabaseResult<String> {
    let mut quoted_columns = Vec::with_capacity(columns.len());
    for column in columns {
        quoted_columns.push(quote_ident(column)?);
    }

    Ok(format!(
        "INSERT INTO {}.{} ({}) VALUES {} ON CONFLICT DO NOTHING",
        quote_ident(schema)?,
        quote_ident(table)?,
        quoted_columns.join(", "),
        placeholders(row_count, columns.len())
    ))
}

pub(crate) fn image_insert_sql(
    schema: &str,
    table: &str,
    row_count: usize,
) -> DatabaseResult<String> {
    Ok(format!(
        "INSERT INTO {}.{} (file_name, url) VALUES {} ON CONFLICT (url) DO NOTHING",
        quote_ident(schema)?,
        quote_ident(table)?,
        placeholders(row_count, 2)
    ))
}

/// `($1, $2), ($3, $4), ...` for `row_count` rows of `width` parameters
fn placeholders(row_count: usize, width: usize) -> String {
    let mut groups = Vec::with_capacity(row_count);
    let mut param = 1usize;
    for _ in 0..row_count {
        let row: Vec<String> = (0..width)
            .map(|_| {
                let p = format!("${}", param);
                param += 1;
                p
            })
            .collect();
        groups.push(format!("({})", row.join(", ")));
    }
    groups.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_number_sequentially_across_rows() {
        assert_eq!(placeholders(2, 3), "($1, $2, $3), ($4, $5, $6)");
    }

    #[test]
    fn test_tabular_insert_sql_shape() {
        let sql = tabular_insert_sql(
            "public",
            "orders",
            &["id".to_string(), "amount".to_string()],
            2,
        )
        .unwrap();
        assert_eq!(
            sql,
            "INSERT INTO \"public\".\"orders\" (\"id\", \"amount\") VALUES ($1, $2), ($3, $4) ON CONFLICT DO NOTHING"
        );
    }

    #[test]
    fn test_image_insert_sql_conflicts_on_url() {
        let sql = image_insert_sql("assets", "photos", 1).unwrap();
        assert_eq!(
            sql,
            "INSERT INTO \"assets\".\"photos\" (file_name, url) VALUES ($1, $2) ON CONFLICT (url) DO NOTHING"
        );
    }

    #[test]
    fn test_chunking_respects_bind_parameter_limit() {
        let width = 10;
        let rows_per_chunk = (MAX_BIND_PARAMS / width).max(1);
        assert!(rows_per_chunk * width <= MAX_BIND_PARAMS);
        assert_eq!(rows_per_chunk, 6553);
    }
}
