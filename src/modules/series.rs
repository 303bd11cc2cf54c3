//! Series and measurement management.

use std::sync::Arc;

use crate::client::Pipeline;
use crate::error::Result;
use crate::parser;
use crate::query;
use crate::types::{Measurement, SeriesKey};

/// Series and measurement operations.
#[derive(Debug)]
pub struct SeriesClient {
    pipeline: Arc<Pipeline>,
}

impl SeriesClient {
    pub(crate) fn new(pipeline: Arc<Pipeline>) -> Self {
        Self { pipeline }
    }

    /// `SHOW SERIES`, optionally scoped to one measurement. The two
    /// version-specific output shapes are normalized into [`SeriesKey`]s.
    pub async fn get_series(
        &self,
        database: &str,
        measurement: Option<&str>,
    ) -> Result<Vec<SeriesKey>> {
        let series = self
            .pipeline
            .execute(&query::series::show(measurement), Some(database))
            .await?;
        self.pipeline.series_keys.parse(&series)
    }

    /// `DROP SERIES FROM`, optionally narrowed by tag equality.
    pub async fn drop_series(
        &self,
        database: &str,
        measurement: &str,
        tags: &[(String, String)],
    ) -> Result<()> {
        self.pipeline
            .execute(&query::series::drop(measurement, tags), Some(database))
            .await?;
        Ok(())
    }

    /// `SHOW MEASUREMENTS`.
    pub async fn get_measurements(&self, database: &str) -> Result<Vec<Measurement>> {
        let series = self
            .pipeline
            .execute(&query::series::show_measurements(), Some(database))
            .await?;
        parser::parse_measurements(&series)
    }

    /// `DROP MEASUREMENT`.
    pub async fn drop_measurement(&self, database: &str, name: &str) -> Result<()> {
        self.pipeline
            .execute(&query::series::drop_measurement(name), Some(database))
            .await?;
        Ok(())
    }
}
