//! Server diagnostics.

use std::sync::Arc;

use crate::client::Pipeline;
use crate::error::Result;
use crate::query;
use crate::types::{Pong, Series};

/// Ping, stats and diagnostics operations.
///
/// Stats and diagnostics are returned as raw series: their columns vary
/// between server releases, so no typed mapping is imposed.
#[derive(Debug)]
pub struct DiagnosticsClient {
    pipeline: Arc<Pipeline>,
}

impl DiagnosticsClient {
    pub(crate) fn new(pipeline: Arc<Pipeline>) -> Self {
        Self { pipeline }
    }

    /// `GET /ping`: server version and measured round-trip time.
    pub async fn ping(&self) -> Result<Pong> {
        self.pipeline.request.ping().await
    }

    /// `SHOW STATS`.
    pub async fn get_stats(&self) -> Result<Vec<Series>> {
        self.pipeline.execute(&query::diagnostics::stats(), None).await
    }

    /// `SHOW DIAGNOSTICS`.
    pub async fn get_diagnostics(&self) -> Result<Vec<Series>> {
        self.pipeline
            .execute(&query::diagnostics::diagnostics(), None)
            .await
    }
}
