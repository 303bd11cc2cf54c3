//! Measurement points and write precision.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::value::Value;

/// Time unit used to interpret and emit a point's timestamp.
///
/// Writes are segmented by precision: the server is told the unit once per
/// request, so every point in a single write payload shares it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Precision {
    /// Nanoseconds since the epoch (the server default).
    Nanosecond,
    /// Microseconds since the epoch.
    Microsecond,
    /// Milliseconds since the epoch.
    Millisecond,
    /// Seconds since the epoch.
    Second,
    /// Minutes since the epoch.
    Minute,
    /// Hours since the epoch.
    Hour,
}

impl Precision {
    /// Nanoseconds per unit of this precision.
    fn nanos_per_unit(self) -> i64 {
        match self {
            Precision::Nanosecond => 1,
            Precision::Microsecond => 1_000,
            Precision::Millisecond => 1_000_000,
            Precision::Second => 1_000_000_000,
            Precision::Minute => 60 * 1_000_000_000,
            Precision::Hour => 3_600 * 1_000_000_000,
        }
    }

    /// Converts an instant to an epoch count in this unit.
    ///
    /// Truncates toward minus infinity so pre-epoch instants behave the same
    /// way as everything else. Instants outside the nanosecond-representable
    /// range (roughly year 1678 to 2262) cannot be carried on the wire.
    pub(crate) fn scale(self, instant: &DateTime<Utc>) -> Result<i64> {
        let nanos = instant.timestamp_nanos_opt().ok_or_else(|| {
            Error::format(format!(
                "timestamp {} is outside the wire-representable range",
                instant
            ))
        })?;
        Ok(nanos.div_euclid(self.nanos_per_unit()))
    }

    /// Wire name used by the 0.9+ `precision` query parameter.
    pub(crate) fn query_param(self) -> &'static str {
        match self {
            Precision::Nanosecond => "n",
            Precision::Microsecond => "u",
            Precision::Millisecond => "ms",
            Precision::Second => "s",
            Precision::Minute => "m",
            Precision::Hour => "h",
        }
    }

    /// Wire name used by the 0.8 `time_precision` query parameter.
    ///
    /// 0.8 only understands seconds, milliseconds and microseconds, and its
    /// name for milliseconds is `m` (which means minutes on 0.9+ servers).
    pub(crate) fn legacy_time_precision(self) -> Result<&'static str> {
        match self {
            Precision::Second => Ok("s"),
            Precision::Millisecond => Ok("m"),
            Precision::Microsecond => Ok("u"),
            other => Err(Error::format(format!(
                "precision {:?} is not representable in the 0.8 protocol",
                other
            ))),
        }
    }
}

impl Default for Precision {
    fn default() -> Self {
        Precision::Nanosecond
    }
}

impl std::fmt::Display for Precision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.query_param())
    }
}

/// A single measurement sample.
///
/// A point names a measurement, carries indexed tag metadata and at least one
/// field value, and optionally an explicit timestamp (the server assigns one
/// otherwise). Tags are kept sorted; fields preserve insertion order, which
/// is the order they appear on the wire.
///
/// # Example
///
/// ```ignore
/// use influxdb_classic::{Point, Precision};
///
/// let point = Point::new("cpu")
///     .with_tag("host", "server01")
///     .with_tag("region", "us-west")
///     .with_field("value", 0.64)
///     .with_timestamp(chrono::Utc::now())
///     .with_precision(Precision::Millisecond);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Point {
    /// Measurement name. Must be non-empty when formatted.
    pub measurement: String,
    /// Tag key/value pairs, unique and lexicographically ordered.
    pub tags: BTreeMap<String, String>,
    /// Field key/value pairs in insertion order. At least one is required
    /// when formatted; duplicate keys are rejected there.
    pub fields: Vec<(String, Value)>,
    /// Explicit sample time. `None` lets the server assign one.
    pub timestamp: Option<DateTime<Utc>>,
    /// Unit the timestamp is emitted in. Also a write-segmentation key.
    pub precision: Precision,
}

impl Point {
    /// Create a new point for the given measurement.
    pub fn new(measurement: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
            tags: BTreeMap::new(),
            fields: Vec::new(),
            timestamp: None,
            precision: Precision::default(),
        }
    }

    /// Add a tag. A repeated key replaces the earlier value.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Add a field. Keys must be unique; duplicates are rejected when the
    /// point is formatted.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    /// Set an explicit timestamp.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Set the timestamp precision.
    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_point_builder() {
        let point = Point::new("cpu")
            .with_tag("host", "server01")
            .with_field("value", 0.64)
            .with_field("count", 2i64);

        assert_eq!(point.measurement, "cpu");
        assert_eq!(point.tags.get("host").map(String::as_str), Some("server01"));
        assert_eq!(point.fields.len(), 2);
        assert_eq!(point.fields[0].0, "value");
        assert_eq!(point.precision, Precision::Nanosecond);
        assert!(point.timestamp.is_none());
    }

    #[test]
    fn test_repeated_tag_key_replaces() {
        let point = Point::new("cpu")
            .with_tag("host", "a")
            .with_tag("host", "b")
            .with_field("value", 1i64);
        assert_eq!(point.tags.len(), 1);
        assert_eq!(point.tags.get("host").map(String::as_str), Some("b"));
    }

    #[test]
    fn test_tags_iterate_sorted() {
        let point = Point::new("m")
            .with_tag("zebra", "1")
            .with_tag("alpha", "2")
            .with_tag("mid", "3");
        let keys: Vec<&str> = point.tags.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["alpha", "mid", "zebra"]);
    }

    #[test]
    fn test_precision_scale() {
        let t = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(Precision::Second.scale(&t).unwrap(), 1_609_459_200);
        assert_eq!(Precision::Millisecond.scale(&t).unwrap(), 1_609_459_200_000);
        assert_eq!(
            Precision::Nanosecond.scale(&t).unwrap(),
            1_609_459_200_000_000_000
        );
        assert_eq!(Precision::Minute.scale(&t).unwrap(), 1_609_459_200 / 60);
        assert_eq!(Precision::Hour.scale(&t).unwrap(), 1_609_459_200 / 3600);
    }

    #[test]
    fn test_precision_scale_truncates() {
        let t = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 59).unwrap();
        // 59 seconds past the minute truncates down
        assert_eq!(
            Precision::Minute.scale(&t).unwrap(),
            1_609_459_200 / 60
        );
    }

    #[test]
    fn test_precision_scale_pre_epoch() {
        let t = Utc.with_ymd_and_hms(1969, 12, 31, 23, 59, 59).unwrap();
        // div_euclid keeps truncation direction consistent below zero
        assert_eq!(Precision::Second.scale(&t).unwrap(), -1);
        assert_eq!(Precision::Minute.scale(&t).unwrap(), -1);
    }

    #[test]
    fn test_precision_wire_names() {
        assert_eq!(Precision::Nanosecond.query_param(), "n");
        assert_eq!(Precision::Minute.query_param(), "m");

        // 0.8 calls milliseconds "m" and cannot express the rest
        assert_eq!(Precision::Millisecond.legacy_time_precision().unwrap(), "m");
        assert_eq!(Precision::Second.legacy_time_precision().unwrap(), "s");
        assert_eq!(Precision::Microsecond.legacy_time_precision().unwrap(), "u");
        assert!(Precision::Nanosecond.legacy_time_precision().is_err());
        assert!(Precision::Hour.legacy_time_precision().is_err());
    }
}
