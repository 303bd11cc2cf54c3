//! Response parsers for the version-specific query envelopes.
//!
//! Servers from 0.9 on answer queries with a `{"results": [...]}` envelope;
//! 0.8 answers with a bare JSON array of series objects. Both shapes are
//! normalized into [`QueryResult`]/[`Series`], and per-resource helpers turn
//! series rows into typed records (databases, retention policies, users, ...).
//!
//! Empty result sets are empty vectors, never errors; only a body whose shape
//! cannot be understood at all raises [`Error::Parse`], naming the offending
//! field so version mismatches are diagnosable.

use std::collections::BTreeMap;

use chrono::DateTime;
use go_parse_duration::parse_duration;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::{
    ContinuousQueryInfo, DatabaseInfo, Grant, Measurement, Privilege, QueryResult,
    RetentionPolicyInfo, Series, SeriesKey, UserInfo,
};
use crate::value::Value;

/// Envelope parser bound to a protocol version.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ResponseParser {
    /// `{"results":[{"series":[...], "error"?}], "error"?}` (0.9+).
    Results,
    /// Bare array of `{name, columns, points}` objects (0.8).
    SeriesArray,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    results: Vec<StatementResult>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct StatementResult {
    #[serde(default)]
    series: Vec<RawSeries>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct RawSeries {
    #[serde(default)]
    name: String,
    #[serde(default)]
    tags: BTreeMap<String, String>,
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Deserialize)]
struct LegacySeries {
    name: String,
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    points: Vec<Vec<serde_json::Value>>,
}

impl ResponseParser {
    /// Parse a raw response body into one result per statement.
    ///
    /// A well-formed envelope that carries an `error` member becomes a
    /// [`QueryResult`] with the error set, so callers can tell a rejected
    /// query from an empty one. A body that does not match the envelope
    /// shape at all is [`Error::Parse`].
    pub(crate) fn parse(&self, raw: &str) -> Result<Vec<QueryResult>> {
        match self {
            ResponseParser::Results => {
                let envelope: Envelope = serde_json::from_str(raw)
                    .map_err(|e| Error::parse(format!("response envelope: {}", e)))?;
                if let Some(error) = envelope.error {
                    return Ok(vec![QueryResult {
                        series: Vec::new(),
                        error: Some(error),
                    }]);
                }
                envelope
                    .results
                    .into_iter()
                    .map(|result| {
                        Ok(QueryResult {
                            series: result
                                .series
                                .into_iter()
                                .map(raw_series_to_series)
                                .collect::<Result<Vec<_>>>()?,
                            error: result.error,
                        })
                    })
                    .collect()
            }
            ResponseParser::SeriesArray => {
                let series: Vec<LegacySeries> = serde_json::from_str(raw)
                    .map_err(|e| Error::parse(format!("series array body: {}", e)))?;
                let series = series
                    .into_iter()
                    .map(|s| build_series(s.name, BTreeMap::new(), s.columns, s.points))
                    .collect::<Result<Vec<_>>>()?;
                Ok(vec![QueryResult {
                    series,
                    error: None,
                }])
            }
        }
    }
}

fn raw_series_to_series(raw: RawSeries) -> Result<Series> {
    build_series(raw.name, raw.tags, raw.columns, raw.values)
}

fn build_series(
    name: String,
    tags: BTreeMap<String, String>,
    columns: Vec<String>,
    values: Vec<Vec<serde_json::Value>>,
) -> Result<Series> {
    let mut rows = Vec::with_capacity(values.len());
    for row in values {
        if row.len() != columns.len() {
            return Err(Error::ColumnMismatch {
                expected: columns.len(),
                actual: row.len(),
            });
        }
        rows.push(
            row.into_iter()
                .zip(columns.iter())
                .map(|(cell, column)| convert_cell(column, cell))
                .collect::<Result<Vec<_>>>()?,
        );
    }
    Ok(Series {
        name,
        tags,
        columns,
        rows,
    })
}

/// Convert one JSON cell into a typed value.
///
/// Numbers keep their JSON type (integer, unsigned, float); strings in the
/// `time` column that parse as RFC3339 become timestamps, everything else
/// stays a string. Nested arrays/objects have no place in a series row.
fn convert_cell(column: &str, cell: serde_json::Value) -> Result<Value> {
    match cell {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(b) => Ok(Value::Boolean(b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Integer(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::UnsignedInteger(u))
            } else if let Some(f) = n.as_f64() {
                Ok(Value::from(f))
            } else {
                Err(Error::parse(format!(
                    "column '{}': unrepresentable number {}",
                    column, n
                )))
            }
        }
        serde_json::Value::String(s) => {
            if column == "time" {
                if let Ok(t) = DateTime::parse_from_rfc3339(&s) {
                    return Ok(Value::Timestamp(t));
                }
            }
            Ok(Value::String(s))
        }
        other => Err(Error::parse(format!(
            "column '{}': unexpected nested value {}",
            column, other
        ))),
    }
}

/// Flatten statement results into their series, failing on the first
/// server-side statement error.
pub(crate) fn flatten(results: Vec<QueryResult>) -> Result<Vec<Series>> {
    let mut series = Vec::new();
    for result in results {
        if let Some(message) = result.error {
            return Err(Error::Query { message });
        }
        series.extend(result.series);
    }
    Ok(series)
}

fn column_index(series: &Series, column: &str) -> Result<usize> {
    series.column_index(column).ok_or_else(|| {
        Error::parse(format!(
            "missing column '{}' in series '{}'",
            column, series.name
        ))
    })
}

fn string_cell(series: &Series, row: &[Value], index: usize, column: &str) -> Result<String> {
    match &row[index] {
        Value::String(s) => Ok(s.clone()),
        other => Err(Error::parse(format!(
            "column '{}' of series '{}': expected a string, got {}",
            column, series.name, other
        ))),
    }
}

/// Integer cell, tolerating text representations (`"2"`) and integral floats.
fn i64_cell(series: &Series, row: &[Value], index: usize, column: &str) -> Result<i64> {
    let fail = || {
        Error::parse(format!(
            "column '{}' of series '{}': cannot coerce {} to an integer",
            column, series.name, row[index]
        ))
    };
    match &row[index] {
        Value::Integer(i) => Ok(*i),
        Value::UnsignedInteger(u) => i64::try_from(*u).map_err(|_| fail()),
        Value::Float(f) if f.fract() == 0.0 => Ok(f.into_inner() as i64),
        Value::String(s) => s.trim().parse().map_err(|_| fail()),
        _ => Err(fail()),
    }
}

/// Boolean cell, tolerating the text forms the server sometimes emits.
fn bool_cell(series: &Series, row: &[Value], index: usize, column: &str) -> Result<bool> {
    match &row[index] {
        Value::Boolean(b) => Ok(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(false),
        other => Err(Error::parse(format!(
            "column '{}' of series '{}': cannot coerce {} to a boolean",
            column, series.name, other
        ))),
    }
}

/// Go-style duration cell (`720h0m0s`).
fn duration_cell(
    series: &Series,
    row: &[Value],
    index: usize,
    column: &str,
) -> Result<chrono::Duration> {
    let text = string_cell(series, row, index, column)?;
    let nanos = parse_duration(&text).map_err(|_| {
        Error::parse(format!(
            "column '{}' of series '{}': invalid duration '{}'",
            column, series.name, text
        ))
    })?;
    Ok(chrono::Duration::nanoseconds(nanos))
}

/// `SHOW DATABASES` rows.
pub(crate) fn parse_databases(series: &[Series]) -> Result<Vec<DatabaseInfo>> {
    let mut databases = Vec::new();
    for s in series {
        let name = column_index(s, "name")?;
        for row in &s.rows {
            databases.push(DatabaseInfo {
                name: string_cell(s, row, name, "name")?,
            });
        }
    }
    Ok(databases)
}

/// `SHOW RETENTION POLICIES` rows.
///
/// `shardGroupDuration` only exists on 0.9.5+ servers, so it stays optional;
/// `replicaN` shows up as text on some releases and is coerced.
pub(crate) fn parse_retention_policies(series: &[Series]) -> Result<Vec<RetentionPolicyInfo>> {
    let mut policies = Vec::new();
    for s in series {
        let name = column_index(s, "name")?;
        let duration = column_index(s, "duration")?;
        let replication = column_index(s, "replicaN")?;
        let is_default = column_index(s, "default")?;
        let shard_group = s.column_index("shardGroupDuration");
        for row in &s.rows {
            policies.push(RetentionPolicyInfo {
                name: string_cell(s, row, name, "name")?,
                duration: duration_cell(s, row, duration, "duration")?,
                shard_group_duration: shard_group
                    .map(|i| duration_cell(s, row, i, "shardGroupDuration"))
                    .transpose()?,
                replication: i64_cell(s, row, replication, "replicaN")?,
                is_default: bool_cell(s, row, is_default, "default")?,
            });
        }
    }
    Ok(policies)
}

/// `SHOW CONTINUOUS QUERIES` rows.
///
/// The server answers with one series per database; only the requested
/// database's series is kept.
pub(crate) fn parse_continuous_queries(
    database: &str,
    series: &[Series],
) -> Result<Vec<ContinuousQueryInfo>> {
    let mut queries = Vec::new();
    for s in series.iter().filter(|s| s.name == database) {
        let name = column_index(s, "name")?;
        let query = column_index(s, "query")?;
        for row in &s.rows {
            queries.push(ContinuousQueryInfo {
                database: s.name.clone(),
                name: string_cell(s, row, name, "name")?,
                query: string_cell(s, row, query, "query")?,
            });
        }
    }
    Ok(queries)
}

/// `SHOW MEASUREMENTS` rows.
pub(crate) fn parse_measurements(series: &[Series]) -> Result<Vec<Measurement>> {
    let mut measurements = Vec::new();
    for s in series {
        let name = column_index(s, "name")?;
        for row in &s.rows {
            measurements.push(Measurement {
                name: string_cell(s, row, name, "name")?,
            });
        }
    }
    Ok(measurements)
}

/// `SHOW USERS` rows.
pub(crate) fn parse_users(series: &[Series]) -> Result<Vec<UserInfo>> {
    let mut users = Vec::new();
    for s in series {
        let user = column_index(s, "user")?;
        let admin = column_index(s, "admin")?;
        for row in &s.rows {
            users.push(UserInfo {
                name: string_cell(s, row, user, "user")?,
                is_admin: bool_cell(s, row, admin, "admin")?,
            });
        }
    }
    Ok(users)
}

/// `SHOW GRANTS FOR` rows. `NO PRIVILEGES` rows are dropped.
pub(crate) fn parse_grants(series: &[Series]) -> Result<Vec<Grant>> {
    let mut grants = Vec::new();
    for s in series {
        let database = column_index(s, "database")?;
        let privilege = column_index(s, "privilege")?;
        for row in &s.rows {
            let text = string_cell(s, row, privilege, "privilege")?;
            let privilege = match text.as_str() {
                "READ" | "READ PRIVILEGE" => Privilege::Read,
                "WRITE" | "WRITE PRIVILEGE" => Privilege::Write,
                "ALL" | "ALL PRIVILEGES" => Privilege::All,
                "NO PRIVILEGES" => continue,
                other => {
                    return Err(Error::parse(format!(
                        "column 'privilege': unknown privilege '{}'",
                        other
                    )));
                }
            };
            grants.push(Grant {
                database: string_cell(s, row, database, "database")?,
                privilege,
            });
        }
    }
    Ok(grants)
}

/// Series-key parser, version-split at client construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SeriesKeyParser {
    /// 1.x: a single `key` column of line-protocol-escaped key strings.
    KeyColumn,
    /// Pre-1.0: one series per measurement with tag values as columns.
    TagColumns,
}

impl SeriesKeyParser {
    pub(crate) fn parse(&self, series: &[Series]) -> Result<Vec<SeriesKey>> {
        match self {
            SeriesKeyParser::KeyColumn => {
                let mut keys = Vec::new();
                for s in series {
                    let key = column_index(s, "key")?;
                    for row in &s.rows {
                        keys.push(parse_series_key(&string_cell(s, row, key, "key")?)?);
                    }
                }
                Ok(keys)
            }
            SeriesKeyParser::TagColumns => {
                let mut keys = Vec::new();
                for s in series {
                    for row in &s.rows {
                        let mut tags = BTreeMap::new();
                        for (index, column) in s.columns.iter().enumerate() {
                            // _key repeats the composed key; skip it
                            if column == "_key" {
                                continue;
                            }
                            match &row[index] {
                                Value::String(v) if !v.is_empty() => {
                                    tags.insert(column.clone(), v.clone());
                                }
                                Value::String(_) | Value::Null => {}
                                other => {
                                    return Err(Error::parse(format!(
                                        "column '{}' of series '{}': expected a tag value, got {}",
                                        column, s.name, other
                                    )));
                                }
                            }
                        }
                        keys.push(SeriesKey {
                            measurement: s.name.clone(),
                            tags,
                        });
                    }
                }
                Ok(keys)
            }
        }
    }
}

/// Split on an unescaped delimiter, keeping backslash escapes in the parts.
fn split_escaped(input: &str, delimiter: char) -> Vec<String> {
    let mut parts = vec![String::new()];
    let mut escaped = false;
    for c in input.chars() {
        if escaped {
            let current = parts.last_mut().expect("parts is never empty");
            current.push('\\');
            current.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == delimiter {
            parts.push(String::new());
        } else {
            parts.last_mut().expect("parts is never empty").push(c);
        }
    }
    if escaped {
        parts.last_mut().expect("parts is never empty").push('\\');
    }
    parts
}

fn unescape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut escaped = false;
    for c in input.chars() {
        if escaped {
            out.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else {
            out.push(c);
        }
    }
    if escaped {
        out.push('\\');
    }
    out
}

/// Parse one line-protocol-escaped series key (`cpu,host=a,region=b`).
fn parse_series_key(key: &str) -> Result<SeriesKey> {
    let parts = split_escaped(key, ',');
    let measurement = unescape(&parts[0]);
    if measurement.is_empty() {
        return Err(Error::parse(format!(
            "series key '{}' has no measurement",
            key
        )));
    }
    let mut tags = BTreeMap::new();
    for part in &parts[1..] {
        let pair = split_escaped(part, '=');
        if pair.len() != 2 {
            return Err(Error::parse(format!(
                "series key '{}': malformed tag pair '{}'",
                key, part
            )));
        }
        tags.insert(unescape(&pair[0]), unescape(&pair[1]));
    }
    Ok(SeriesKey { measurement, tags })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn parse_series(raw: &str) -> Vec<Series> {
        flatten(ResponseParser::Results.parse(raw).unwrap()).unwrap()
    }

    // =========================================================================
    // Envelope parsing
    // =========================================================================

    #[test]
    fn test_typed_row() {
        let series = parse_series(
            r#"{"results":[{"series":[{
                "name":"status",
                "columns":["time","value","status"],
                "values":[["2021-01-01T00:00:00Z",42,"ok"]]
            }]}]}"#,
        );

        assert_eq!(series.len(), 1);
        assert_eq!(series[0].rows.len(), 1);
        let row = &series[0].rows[0];
        assert!(row[0].as_timestamp().is_some());
        assert_eq!(row[1].as_i64(), Some(42));
        assert_eq!(row[2].as_str(), Some("ok"));
    }

    #[test]
    fn test_number_types_preserved() {
        let series = parse_series(
            r#"{"results":[{"series":[{
                "name":"m","columns":["a","b","c"],
                "values":[[1,1.5,18446744073709551615]]
            }]}]}"#,
        );
        let row = &series[0].rows[0];
        assert_eq!(row[0], Value::Integer(1));
        assert_eq!(row[1], Value::from(1.5));
        assert_eq!(row[2], Value::UnsignedInteger(u64::MAX));
    }

    #[test]
    fn test_empty_series_is_not_an_error() {
        assert_eq!(parse_series(r#"{"results":[{}]}"#), Vec::<Series>::new());
        assert_eq!(
            parse_series(r#"{"results":[{"series":[]}]}"#),
            Vec::<Series>::new()
        );
        assert_eq!(
            ResponseParser::Results.parse(r#"{"results":[]}"#).unwrap(),
            Vec::new()
        );
    }

    #[test]
    fn test_group_by_tags_and_time_column() {
        let series = parse_series(
            r#"{"results":[{"series":[{
                "name":"cpu",
                "tags":{"host":"server01"},
                "columns":["time","value"],
                "values":[["2021-01-01T00:00:00Z",0.5],[1609459200,0.6]]
            }]}]}"#,
        );
        assert_eq!(
            series[0].tags.get("host").map(String::as_str),
            Some("server01")
        );
        // RFC3339 time becomes a timestamp; epoch numbers stay integers
        assert!(series[0].rows[0][0].as_timestamp().is_some());
        assert_eq!(series[0].rows[1][0], Value::Integer(1_609_459_200));
    }

    #[test]
    fn test_column_mismatch() {
        let err = ResponseParser::Results
            .parse(
                r#"{"results":[{"series":[{
                    "name":"m","columns":["a","b"],"values":[[1]]
                }]}]}"#,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ColumnMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_top_level_error_is_structured() {
        let results = ResponseParser::Results
            .parse(r#"{"error":"authorization failed"}"#)
            .unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].series.is_empty());
        assert_eq!(results[0].error.as_deref(), Some("authorization failed"));
    }

    #[test]
    fn test_partial_result_keeps_series_and_error() {
        let results = ResponseParser::Results
            .parse(
                r#"{"results":[
                    {"series":[{"name":"cpu","columns":["v"],"values":[[1]]}]},
                    {"error":"database not found: missing"}
                ]}"#,
            )
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].series.len(), 1);
        assert_eq!(
            results[1].error.as_deref(),
            Some("database not found: missing")
        );

        // flatten surfaces the statement error
        assert!(matches!(flatten(results), Err(Error::Query { .. })));
    }

    #[test]
    fn test_unparseable_body() {
        let err = ResponseParser::Results
            .parse("<html>502</html>")
            .unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        assert!(err.to_string().contains("response envelope"));

        let err = ResponseParser::Results
            .parse(r#"{"results":[{"series":[{"columns":["a"],"values":[[[1]]]}]}]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("column 'a'"));
    }

    #[test]
    fn test_legacy_series_array() {
        let results = ResponseParser::SeriesArray
            .parse(
                r#"[{"name":"cpu","columns":["host","value","time"],
                    "points":[["server01",0.64,1609459200000]]}]"#,
            )
            .unwrap();
        assert_eq!(results.len(), 1);
        let series = &results[0].series;
        assert_eq!(series[0].name, "cpu");
        assert_eq!(series[0].rows[0][0].as_str(), Some("server01"));
        assert_eq!(series[0].rows[0][2], Value::Integer(1_609_459_200_000));
    }

    #[test]
    fn test_legacy_round_trip() {
        // The 0.8 write payload has the same shape the 0.8 read side returns,
        // so a formatted point survives a full parse unchanged.
        use crate::format::PointFormatter;
        use crate::point::{Point, Precision};

        let point = Point::new("cpu")
            .with_tag("host", "server01")
            .with_field("value", 0.64)
            .with_timestamp(Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap())
            .with_precision(Precision::Second);

        let payload = PointFormatter::SeriesJson.format(&[point]).unwrap();
        let results = ResponseParser::SeriesArray.parse(&payload).unwrap();
        let series = &results[0].series[0];

        assert_eq!(series.name, "cpu");
        assert_eq!(series.columns, vec!["host", "value", "time"]);
        assert_eq!(
            series.get(0, "host").and_then(Value::as_str),
            Some("server01")
        );
        assert_eq!(series.get(0, "value").and_then(Value::as_f64), Some(0.64));
        assert_eq!(
            series.get(0, "time").and_then(Value::as_i64),
            Some(1_609_459_200)
        );
    }

    // =========================================================================
    // Typed record parsers
    // =========================================================================

    #[test]
    fn test_parse_databases() {
        let series = parse_series(
            r#"{"results":[{"series":[{
                "name":"databases","columns":["name"],
                "values":[["_internal"],["mydb"]]
            }]}]}"#,
        );
        let databases = parse_databases(&series).unwrap();
        assert_eq!(databases.len(), 2);
        assert_eq!(databases[1].name, "mydb");
    }

    #[test]
    fn test_parse_retention_policies() {
        let series = parse_series(
            r#"{"results":[{"series":[{
                "columns":["name","duration","shardGroupDuration","replicaN","default"],
                "values":[["autogen","720h0m0s","168h0m0s",1,true],
                          ["short","1h0m0s","1h0m0s","2",false]]
            }]}]}"#,
        );
        let policies = parse_retention_policies(&series).unwrap();
        assert_eq!(policies[0].name, "autogen");
        assert_eq!(policies[0].duration, chrono::Duration::hours(720));
        assert_eq!(
            policies[0].shard_group_duration,
            Some(chrono::Duration::hours(168))
        );
        assert!(policies[0].is_default);
        // replicaN arrived as text and was coerced
        assert_eq!(policies[1].replication, 2);
        assert!(!policies[1].is_default);
    }

    #[test]
    fn test_parse_retention_policies_without_shard_column() {
        let series = parse_series(
            r#"{"results":[{"series":[{
                "columns":["name","duration","replicaN","default"],
                "values":[["default","0","1",true]]
            }]}]}"#,
        );
        let policies = parse_retention_policies(&series).unwrap();
        assert_eq!(policies[0].shard_group_duration, None);
        assert_eq!(policies[0].duration, chrono::Duration::zero());
    }

    #[test]
    fn test_bad_duration_names_the_column() {
        let series = parse_series(
            r#"{"results":[{"series":[{
                "columns":["name","duration","replicaN","default"],
                "values":[["p","not-a-duration",1,false]]
            }]}]}"#,
        );
        let err = parse_retention_policies(&series).unwrap_err();
        assert!(err.to_string().contains("duration"));
    }

    #[test]
    fn test_parse_continuous_queries_filters_by_database() {
        let series = parse_series(
            r#"{"results":[{"series":[
                {"name":"mydb","columns":["name","query"],
                 "values":[["cq_mean","CREATE CONTINUOUS QUERY cq_mean ..."]]},
                {"name":"otherdb","columns":["name","query"],
                 "values":[["cq_other","CREATE CONTINUOUS QUERY cq_other ..."]]}
            ]}]}"#,
        );
        let queries = parse_continuous_queries("mydb", &series).unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].name, "cq_mean");
        assert_eq!(queries[0].database, "mydb");
    }

    #[test]
    fn test_parse_users_and_grants() {
        let series = parse_series(
            r#"{"results":[{"series":[{
                "columns":["user","admin"],
                "values":[["root",true],["reader",false]]
            }]}]}"#,
        );
        let users = parse_users(&series).unwrap();
        assert_eq!(
            users,
            vec![
                UserInfo {
                    name: "root".to_string(),
                    is_admin: true
                },
                UserInfo {
                    name: "reader".to_string(),
                    is_admin: false
                }
            ]
        );

        let series = parse_series(
            r#"{"results":[{"series":[{
                "columns":["database","privilege"],
                "values":[["mydb","READ PRIVILEGE"],["other","NO PRIVILEGES"],
                          ["all_db","ALL PRIVILEGES"]]
            }]}]}"#,
        );
        let grants = parse_grants(&series).unwrap();
        assert_eq!(grants.len(), 2);
        assert_eq!(grants[0].privilege, Privilege::Read);
        assert_eq!(grants[1].database, "all_db");
        assert_eq!(grants[1].privilege, Privilege::All);
    }

    #[test]
    fn test_missing_column_is_named() {
        let series = parse_series(
            r#"{"results":[{"series":[{
                "name":"users","columns":["user"],"values":[["root"]]
            }]}]}"#,
        );
        let err = parse_users(&series).unwrap_err();
        assert!(err.to_string().contains("missing column 'admin'"));
    }

    // =========================================================================
    // Series keys
    // =========================================================================

    #[test]
    fn test_key_column_parser() {
        let series = parse_series(
            r#"{"results":[{"series":[{
                "columns":["key"],
                "values":[["cpu,host=server01,region=us-west"],
                          ["disk\\ usage,path=/,host=a\\=b"]]
            }]}]}"#,
        );
        let keys = SeriesKeyParser::KeyColumn.parse(&series).unwrap();
        assert_eq!(keys[0].measurement, "cpu");
        assert_eq!(
            keys[0].tags.get("host").map(String::as_str),
            Some("server01")
        );
        assert_eq!(keys[0].tags.len(), 2);

        // Escaped space in the measurement, escaped '=' in a tag value
        assert_eq!(keys[1].measurement, "disk usage");
        assert_eq!(keys[1].tags.get("host").map(String::as_str), Some("a=b"));
    }

    #[test]
    fn test_malformed_key_fails() {
        let series = parse_series(
            r#"{"results":[{"series":[{
                "columns":["key"],"values":[["cpu,host"]]
            }]}]}"#,
        );
        let err = SeriesKeyParser::KeyColumn.parse(&series).unwrap_err();
        assert!(err.to_string().contains("malformed tag pair"));
    }

    #[test]
    fn test_tag_columns_parser() {
        let series = parse_series(
            r#"{"results":[{"series":[{
                "name":"cpu",
                "columns":["_key","host","region"],
                "values":[["cpu,host=server01,region=us-west","server01","us-west"],
                          ["cpu,host=server02","server02",""]]
            }]}]}"#,
        );
        let keys = SeriesKeyParser::TagColumns.parse(&series).unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].measurement, "cpu");
        assert_eq!(keys[0].tags.len(), 2);
        // Empty tag values mean the tag is absent from the series
        assert_eq!(keys[1].tags.len(), 1);
        assert_eq!(
            keys[1].tags.get("host").map(String::as_str),
            Some("server02")
        );
    }

    #[test]
    fn test_both_series_parsers_normalize_identically() {
        let modern = parse_series(
            r#"{"results":[{"series":[{
                "columns":["key"],"values":[["cpu,host=a"]]
            }]}]}"#,
        );
        let legacy = parse_series(
            r#"{"results":[{"series":[{
                "name":"cpu","columns":["host"],"values":[["a"]]
            }]}]}"#,
        );
        assert_eq!(
            SeriesKeyParser::KeyColumn.parse(&modern).unwrap(),
            SeriesKeyParser::TagColumns.parse(&legacy).unwrap()
        );
    }
}
