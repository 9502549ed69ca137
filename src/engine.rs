//! Run orchestration: discover, group, merge, provision, load
//!
//! A run is a single sequential pass. Tabular groups are processed first,
//! then image groups; the first fatal error aborts the remaining groups,
//! but connections already opened are always released before the error
//! propagates, and work committed for earlier groups stays applied.

use crate::config::LoaderConfig;
use crate::database::{ConnectionManager, DataLoader, TableProvisioner};
use crate::discovery::BucketIndex;
use crate::error::IngestResult;
use crate::merge::CsvMerger;
use crate::schema::{infer_column_types, ColumnType};
use crate::storage::BucketSource;
use tracing::info;

/// Counters reported after a successful run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub tabular_groups: usize,
    pub image_groups: usize,
    pub tabular_rows_loaded: u64,
    pub image_rows_loaded: u64,
    pub skipped_objects: usize,
}

/// Drives one full ingestion run over a bucket
pub struct LoadEngine {
    config: LoaderConfig,
    source: BucketSource,
}

impl LoadEngine {
    pub fn new(config: LoaderConfig, source: BucketSource) -> Self {
        Self { config, source }
    }

    /// Discover, then load. Connections are released on every exit path.
    pub async fn run(&self) -> IngestResult<RunSummary> {
        let paths = self.source.list_all().await?;
        let index = BucketIndex::build(&paths, |path| self.source.public_url(path));

        info!(
            "Discovered {} objects: {} tabular groups, {} image groups, {} skipped",
            index.accepted_count(),
            index.tabular.len(),
            index.images.len(),
            index.skipped.len()
        );

        let mut connections = ConnectionManager::new(self.config.database.clone());
        let result = self.process_groups(&index, &mut connections).await;
        connections.close_all().await;
        result
    }

    async fn process_groups(
        &self,
        index: &BucketIndex,
        connections: &mut ConnectionManager,
    ) -> IngestResult<RunSummary> {
        let mut summary = RunSummary {
            skipped_objects: index.skipped.len(),
            ..RunSummary::default()
        };

        let merger = CsvMerger::new(&self.source);

        for (key, shards) in &index.tabular {
            let dataset = merger.merge_group(shards).await?;
            let types = infer_column_types(&dataset);
            let columns: Vec<(String, ColumnType)> = dataset
                .columns
                .iter()
                .cloned()
                .zip(types.iter().copied())
                .collect();

            let pool = connections.pool_for(&key.database).await?;
            let provisioner = TableProvisioner::new(&pool);
            provisioner.ensure_schema(&key.schema).await?;
            provisioner
                .ensure_table(&key.schema, &key.table, &columns)
                .await?;

            let loader = DataLoader::new(&pool);
            let inserted = loader
                .load_tabular(&key.schema, &key.table, &dataset, &types)
                .await?;

            summary.tabular_groups += 1;
            summary.tabular_rows_loaded += inserted;
            info!("Data inserted into {}", key);
        }

        for (key, records) in &index.images {
            let pool = connections.pool_for(&key.database).await?;
            let provisioner = TableProvisioner::new(&pool);
            provisioner.ensure_schema(&key.schema).await?;
            provisioner.ensure_image_table(&key.schema, &key.table).await?;

            let loader = DataLoader::new(&pool);
            let inserted = loader.load_images(&key.schema, &key.table, records).await?;

            summary.image_groups += 1;
            summary.image_rows_loaded += inserted;
            info!("Image metadata inserted into {}", key);
        }

        Ok(summary)
    }
}
