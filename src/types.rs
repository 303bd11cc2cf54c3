//! Core types for classic InfluxDB query results.

use std::collections::BTreeMap;

use crate::value::Value;

/// Wire-format dialect of the target server.
///
/// Fixed at client construction and immutable for the client's lifetime; it
/// selects the point formatter, the response envelope parser, the series-key
/// parser and the continuous-query builder once, so the rest of the pipeline
/// is version-agnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProtocolVersion {
    /// 0.8.x: JSON series writes, `/db/{db}/series` endpoints.
    V0_8,
    /// 0.9.2 through 0.9.4: line protocol, no RESAMPLE clause.
    V0_9_2,
    /// 0.9.5: line protocol, no RESAMPLE clause.
    V0_9_5,
    /// 0.9.6 through 0.13: RESAMPLE clause available.
    V0_9_6,
    /// 1.0 through 1.2: `SHOW SERIES` returns key strings.
    V1_0,
    /// 1.3 and later point releases.
    V1_3,
    /// The newest supported dialect (1.4+, unsigned integer fields).
    Latest,
}

impl ProtocolVersion {
    /// True for servers speaking the 0.8 JSON dialect.
    pub(crate) fn is_legacy(self) -> bool {
        matches!(self, ProtocolVersion::V0_8)
    }

    /// True for servers that understand the CQ RESAMPLE (EVERY/FOR) clause.
    pub(crate) fn supports_resample(self) -> bool {
        !matches!(
            self,
            ProtocolVersion::V0_8 | ProtocolVersion::V0_9_2 | ProtocolVersion::V0_9_5
        )
    }

    /// True for servers whose `SHOW SERIES` output is a `key` column.
    pub(crate) fn series_as_keys(self) -> bool {
        matches!(
            self,
            ProtocolVersion::V1_0 | ProtocolVersion::V1_3 | ProtocolVersion::Latest
        )
    }

    /// True for servers that accept `u`-suffixed unsigned integer fields.
    pub(crate) fn accepts_unsigned(self) -> bool {
        matches!(self, ProtocolVersion::Latest)
    }
}

/// Write consistency level forwarded to clustered servers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Consistency {
    /// Any node may acknowledge the write.
    Any,
    /// One data node must acknowledge.
    One,
    /// A quorum of data nodes must acknowledge.
    Quorum,
    /// All data nodes must acknowledge.
    All,
}

impl Consistency {
    pub(crate) fn query_param(self) -> &'static str {
        match self {
            Consistency::Any => "any",
            Consistency::One => "one",
            Consistency::Quorum => "quorum",
            Consistency::All => "all",
        }
    }
}

/// A named, columnar set of rows returned by a query.
///
/// Every row has exactly as many values as there are columns; the parser
/// rejects responses that violate this.
#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    /// Series (measurement) name.
    pub name: String,
    /// GROUP BY tags, empty when the query had none.
    pub tags: BTreeMap<String, String>,
    /// Ordered column names.
    pub columns: Vec<String>,
    /// Rows, one value tuple per sample.
    pub rows: Vec<Vec<Value>>,
}

impl Series {
    /// Index of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value at (row, column name), if both exist.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)
    }
}

/// The outcome of one statement within a query response.
///
/// A result can carry both series and an error: the server reports partial
/// results this way, so neither side is discarded.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryResult {
    /// Series returned by the statement.
    pub series: Vec<Series>,
    /// Server-side statement error, if any.
    pub error: Option<String>,
}

/// One database, from `SHOW DATABASES`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatabaseInfo {
    /// Database name.
    pub name: String,
}

/// One retention policy, from `SHOW RETENTION POLICIES`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetentionPolicyInfo {
    /// Policy name.
    pub name: String,
    /// How long samples are kept.
    pub duration: chrono::Duration,
    /// Shard group duration; absent on servers that predate the column.
    pub shard_group_duration: Option<chrono::Duration>,
    /// Replication factor.
    pub replication: i64,
    /// Whether this is the database's default policy.
    pub is_default: bool,
}

/// One continuous query, from `SHOW CONTINUOUS QUERIES`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContinuousQueryInfo {
    /// Database the query runs against.
    pub database: String,
    /// Query name.
    pub name: String,
    /// Full query text as the server stores it.
    pub query: String,
}

/// One series key: measurement plus identifying tag set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeriesKey {
    /// Measurement name.
    pub measurement: String,
    /// Tag key/value pairs identifying the series.
    pub tags: BTreeMap<String, String>,
}

/// One measurement name, from `SHOW MEASUREMENTS`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Measurement {
    /// Measurement name.
    pub name: String,
}

/// One user, from `SHOW USERS`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserInfo {
    /// User name.
    pub name: String,
    /// Whether the user holds cluster administrator rights.
    pub is_admin: bool,
}

/// A database privilege level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Privilege {
    /// Read-only access.
    Read,
    /// Write-only access.
    Write,
    /// Read and write access.
    All,
}

impl Privilege {
    pub(crate) fn keyword(self) -> &'static str {
        match self {
            Privilege::Read => "READ",
            Privilege::Write => "WRITE",
            Privilege::All => "ALL",
        }
    }
}

/// One granted privilege, from `SHOW GRANTS FOR`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grant {
    /// Database the privilege applies to.
    pub database: String,
    /// Privilege level.
    pub privilege: Privilege,
}

/// Result of a `/ping` round trip.
#[derive(Clone, Debug)]
pub struct Pong {
    /// Server version, from the `X-Influxdb-Version` response header.
    pub version: String,
    /// Measured request round-trip time.
    pub response_time: std::time::Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_lookup() {
        let series = Series {
            name: "cpu".to_string(),
            tags: BTreeMap::new(),
            columns: vec!["time".to_string(), "value".to_string()],
            rows: vec![vec![Value::Integer(0), Value::from(0.5)]],
        };

        assert_eq!(series.column_index("value"), Some(1));
        assert_eq!(series.column_index("missing"), None);
        assert_eq!(series.get(0, "value"), Some(&Value::from(0.5)));
        assert_eq!(series.get(1, "value"), None);
        assert_eq!(series.get(0, "missing"), None);
    }

    #[test]
    fn test_version_capabilities() {
        assert!(ProtocolVersion::V0_8.is_legacy());
        assert!(!ProtocolVersion::V0_9_2.is_legacy());

        assert!(!ProtocolVersion::V0_9_5.supports_resample());
        assert!(ProtocolVersion::V0_9_6.supports_resample());
        assert!(ProtocolVersion::Latest.supports_resample());

        assert!(!ProtocolVersion::V0_9_6.series_as_keys());
        assert!(ProtocolVersion::V1_0.series_as_keys());

        assert!(!ProtocolVersion::V1_3.accepts_unsigned());
        assert!(ProtocolVersion::Latest.accepts_unsigned());
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(Consistency::Quorum.query_param(), "quorum");
        assert_eq!(Privilege::Read.keyword(), "READ");
        assert_eq!(Privilege::All.keyword(), "ALL");
    }
}
