//! # influxdb-classic
//!
//! Async client for the classic InfluxDB HTTP API (0.8 through 1.x) that
//! hides the wire-protocol drift between server versions behind one API.
//!
//! ## Why?
//!
//! The classic server line changed its wire protocol several times: 0.8
//! takes JSON series writes, 0.9+ takes line protocol, `SHOW SERIES` output
//! changed shape in 1.0, and the continuous-query RESAMPLE clause only
//! exists from 0.9.6 on. This crate resolves all of that once, at client
//! construction, into a version-specific formatter/parser/builder bundle;
//! everything downstream is version-agnostic.
//!
//! ## Quick Start
//!
//! ```ignore
//! use influxdb_classic::{ClientConfig, Point, Precision, ProtocolVersion, WriteOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ClientConfig::new("http://localhost:8086", ProtocolVersion::Latest)
//!         .with_credentials("root", "root")
//!         .build()?;
//!
//!     let point = Point::new("cpu")
//!         .with_tag("host", "server01")
//!         .with_field("value", 0.64)
//!         .with_timestamp(chrono::Utc::now())
//!         .with_precision(Precision::Millisecond);
//!     client.write("mydb", &[point], &WriteOptions::default()).await?;
//!
//!     let series = client
//!         .query("mydb", "SELECT * FROM cpu WHERE time > now() - 1h")
//!         .await?;
//!     for s in &series {
//!         println!("{}: {} rows", s.name, s.rows.len());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Version-spanning**: one API across the 0.8 / 0.9.x / 1.x dialects
//! - **Batched writes**: per-(database, retention policy, precision)
//!   buffering with optional flush-on-threshold and caller-driven retry
//! - **Typed results**: loosely-typed tabular responses parsed into typed
//!   series values without precision loss
//! - **Management operations**: databases, retention policies, continuous
//!   queries, series, users, diagnostics
//! - **Error handling**: all failures are `Result`s; server rejections keep
//!   the status code and body

pub mod batch;
mod client;
pub mod error;
mod format;
mod modules;
mod parser;
mod point;
mod query;
mod types;
mod value;

// Re-export main types at crate root
pub use batch::{BatchOptions, BatchWriter, WriteSink};
pub use client::{Client, ClientConfig, WriteOptions};
pub use error::{Error, Result};
pub use format::PointFormatter;
pub use modules::{
    ContinuousQueryClient, DatabaseClient, DiagnosticsClient, RetentionClient, SeriesClient,
    UserClient,
};
pub use point::{Point, Precision};
pub use query::retention::RetentionPolicyParams;
pub use query::{BackfillParams, CqParams, Resample};
pub use types::{
    Consistency, ContinuousQueryInfo, DatabaseInfo, Grant, Measurement, Pong, Privilege,
    ProtocolVersion, QueryResult, RetentionPolicyInfo, Series, SeriesKey, UserInfo,
};
pub use value::Value;
