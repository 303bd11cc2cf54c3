//! Retention policy management.

use std::sync::Arc;

use crate::client::Pipeline;
use crate::error::Result;
use crate::parser;
use crate::query::retention::{self, RetentionPolicyParams};
use crate::types::RetentionPolicyInfo;

/// Retention policy operations.
#[derive(Debug)]
pub struct RetentionClient {
    pipeline: Arc<Pipeline>,
}

impl RetentionClient {
    pub(crate) fn new(pipeline: Arc<Pipeline>) -> Self {
        Self { pipeline }
    }

    /// `CREATE RETENTION POLICY`.
    pub async fn create_retention_policy(&self, params: &RetentionPolicyParams) -> Result<()> {
        self.pipeline.execute(&retention::create(params), None).await?;
        Ok(())
    }

    /// `SHOW RETENTION POLICIES ON`.
    pub async fn get_retention_policies(
        &self,
        database: &str,
    ) -> Result<Vec<RetentionPolicyInfo>> {
        let series = self.pipeline.execute(&retention::show(database), None).await?;
        parser::parse_retention_policies(&series)
    }

    /// `ALTER RETENTION POLICY`.
    pub async fn alter_retention_policy(&self, params: &RetentionPolicyParams) -> Result<()> {
        self.pipeline.execute(&retention::alter(params), None).await?;
        Ok(())
    }

    /// `DROP RETENTION POLICY`.
    pub async fn drop_retention_policy(&self, name: &str, database: &str) -> Result<()> {
        self.pipeline
            .execute(&retention::drop(name, database), None)
            .await?;
        Ok(())
    }
}
