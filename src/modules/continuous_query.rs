//! Continuous query management.

use std::sync::Arc;

use crate::client::Pipeline;
use crate::error::Result;
use crate::parser;
use crate::query::{BackfillParams, CqParams};
use crate::types::ContinuousQueryInfo;

/// Continuous query operations.
///
/// The builder behind these calls is version-split: servers before 0.9.6 do
/// not understand the RESAMPLE clause and never receive one.
#[derive(Debug)]
pub struct ContinuousQueryClient {
    pipeline: Arc<Pipeline>,
}

impl ContinuousQueryClient {
    pub(crate) fn new(pipeline: Arc<Pipeline>) -> Self {
        Self { pipeline }
    }

    /// `CREATE CONTINUOUS QUERY`.
    pub async fn create_continuous_query(&self, params: &CqParams) -> Result<()> {
        let statement = self.pipeline.cq_builder.create(params);
        self.pipeline
            .execute(&statement, Some(&params.database))
            .await?;
        Ok(())
    }

    /// `SHOW CONTINUOUS QUERIES`, filtered to one database.
    pub async fn get_continuous_queries(
        &self,
        database: &str,
    ) -> Result<Vec<ContinuousQueryInfo>> {
        let statement = self.pipeline.cq_builder.show();
        let series = self.pipeline.execute(&statement, Some(database)).await?;
        parser::parse_continuous_queries(database, &series)
    }

    /// `DROP CONTINUOUS QUERY`.
    pub async fn delete_continuous_query(&self, name: &str, database: &str) -> Result<()> {
        let statement = self.pipeline.cq_builder.drop(name, database);
        self.pipeline.execute(&statement, Some(database)).await?;
        Ok(())
    }

    /// Backfill downsampled data for a past time window with a one-off
    /// `SELECT ... INTO`.
    pub async fn backfill(&self, database: &str, params: &BackfillParams) -> Result<()> {
        let statement = self.pipeline.cq_builder.backfill(params);
        self.pipeline.execute(&statement, Some(database)).await?;
        Ok(())
    }
}
