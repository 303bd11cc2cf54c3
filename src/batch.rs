//! Batched point writes.
//!
//! The writer accumulates points per (database, retention policy, precision)
//! key; points with different keys never share a write request. Flushing
//! formats a buffer once and issues exactly one write for it; a failed write
//! leaves the buffer intact so the caller decides whether to retry. There is
//! no automatic retry and no background task here.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::Mutex;
use tracing::debug;

use crate::error::Result;
use crate::format::PointFormatter;
use crate::point::{Point, Precision};

/// Destination a formatted write payload is delivered to.
///
/// The client's pipeline is the production implementation; tests substitute
/// a recording sink.
#[async_trait::async_trait]
pub trait WriteSink: Send + Sync {
    /// Deliver one formatted payload to one (database, retention policy,
    /// precision) destination.
    async fn write_payload(
        &self,
        database: &str,
        retention_policy: Option<&str>,
        precision: Precision,
        payload: String,
    ) -> Result<()>;
}

/// Batch segmentation key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct BatchKey {
    database: String,
    retention_policy: Option<String>,
    precision: Precision,
}

/// Batch writer options.
#[derive(Clone, Debug, Default)]
pub struct BatchOptions {
    /// When set, [`BatchWriter::add`] flushes a key's buffer as soon as it
    /// holds this many points. A failed implicit flush is surfaced to the
    /// `add` caller and the buffer stays intact.
    pub max_batch_size: Option<usize>,
}

impl BatchOptions {
    /// Options with a flush threshold.
    pub fn with_max_batch_size(size: usize) -> Self {
        Self {
            max_batch_size: Some(size),
        }
    }
}

/// Accumulates points and writes them in bounded batches.
///
/// Concurrent `add` calls for the same key serialize on that key's buffer;
/// buffers for different keys proceed independently. A flush interrupted by
/// cancellation leaves its buffer in an undefined state and must not be
/// treated as retryable.
pub struct BatchWriter {
    sink: Arc<dyn WriteSink>,
    formatter: PointFormatter,
    max_batch_size: Option<usize>,
    // The outer lock only resolves the per-key slot and is never held
    // across an await.
    buffers: StdMutex<HashMap<BatchKey, Arc<Mutex<Vec<Point>>>>>,
}

impl BatchWriter {
    pub(crate) fn new(
        sink: Arc<dyn WriteSink>,
        formatter: PointFormatter,
        options: BatchOptions,
    ) -> Self {
        Self {
            sink,
            formatter,
            max_batch_size: options.max_batch_size,
            buffers: StdMutex::new(HashMap::new()),
        }
    }

    fn slot(&self, key: BatchKey) -> Arc<Mutex<Vec<Point>>> {
        let mut buffers = self.buffers.lock().expect("buffer map lock poisoned");
        Arc::clone(buffers.entry(key).or_default())
    }

    fn slots(&self) -> Vec<(BatchKey, Arc<Mutex<Vec<Point>>>)> {
        let buffers = self.buffers.lock().expect("buffer map lock poisoned");
        buffers
            .iter()
            .map(|(key, slot)| (key.clone(), Arc::clone(slot)))
            .collect()
    }

    /// Buffer one point. No I/O happens unless a configured threshold is
    /// reached, in which case that key's buffer is flushed before returning
    /// and a flush failure is reported here.
    pub async fn add(
        &self,
        database: &str,
        retention_policy: Option<&str>,
        point: Point,
    ) -> Result<()> {
        let key = BatchKey {
            database: database.to_string(),
            retention_policy: retention_policy.map(str::to_string),
            precision: point.precision,
        };
        let slot = self.slot(key.clone());
        let mut buffer = slot.lock().await;
        buffer.push(point);
        if let Some(max) = self.max_batch_size {
            if buffer.len() >= max {
                self.flush_buffer(&key, &mut buffer).await?;
            }
        }
        Ok(())
    }

    /// Flush every non-empty buffer, one write per key.
    ///
    /// All keys are attempted even when one fails; the first failure is
    /// returned and every failed key's buffer keeps its points.
    pub async fn flush(&self) -> Result<()> {
        let mut first_error = None;
        for (key, slot) in self.slots() {
            let mut buffer = slot.lock().await;
            if let Err(e) = self.flush_buffer(&key, &mut buffer).await {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Total number of buffered points across all keys.
    pub async fn pending(&self) -> usize {
        let mut total = 0;
        for (_, slot) in self.slots() {
            total += slot.lock().await.len();
        }
        total
    }

    /// Drop all buffered points without writing them.
    pub async fn reset(&self) {
        for (_, slot) in self.slots() {
            slot.lock().await.clear();
        }
    }

    async fn flush_buffer(&self, key: &BatchKey, buffer: &mut Vec<Point>) -> Result<()> {
        if buffer.is_empty() {
            return Ok(());
        }
        let payload = self.formatter.format(buffer)?;
        debug!(
            database = key.database.as_str(),
            points = buffer.len(),
            "flushing batch"
        );
        self.sink
            .write_payload(
                &key.database,
                key.retention_policy.as_deref(),
                key.precision,
                payload,
            )
            .await?;
        buffer.clear();
        Ok(())
    }
}
