//! Database management.

use std::sync::Arc;

use crate::client::Pipeline;
use crate::error::Result;
use crate::parser;
use crate::query;
use crate::types::DatabaseInfo;

/// Database management operations.
#[derive(Debug)]
pub struct DatabaseClient {
    pipeline: Arc<Pipeline>,
}

impl DatabaseClient {
    pub(crate) fn new(pipeline: Arc<Pipeline>) -> Self {
        Self { pipeline }
    }

    /// `CREATE DATABASE`. Succeeds when the database already exists.
    pub async fn create_database(&self, name: &str) -> Result<()> {
        self.pipeline
            .execute(&query::database::create(name), None)
            .await?;
        Ok(())
    }

    /// `SHOW DATABASES`.
    pub async fn get_databases(&self) -> Result<Vec<DatabaseInfo>> {
        let series = self.pipeline.execute(&query::database::show(), None).await?;
        parser::parse_databases(&series)
    }

    /// `DROP DATABASE`.
    pub async fn drop_database(&self, name: &str) -> Result<()> {
        self.pipeline
            .execute(&query::database::drop(name), None)
            .await?;
        Ok(())
    }
}
