//! Point formatters for the version-specific write payloads.
//!
//! Servers from 0.9 on accept line protocol; 0.8 accepts a JSON array of
//! series objects. Both formatters produce one entry per point, in input
//! order, with tags sorted lexicographically and fields in insertion order,
//! so formatting the same points twice yields byte-identical payloads.

use std::collections::HashSet;

use serde_json::{Map, Number, json};

use crate::error::{Error, Result};
use crate::point::Point;
use crate::value::Value;

/// Write-payload formatter bound to a protocol version.
///
/// Obtained from the client once the version is negotiated; upstream code
/// formats points without knowing which dialect it is speaking.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointFormatter {
    /// Line protocol, one line per point (0.9+).
    LineProtocol {
        /// Whether `u`-suffixed unsigned integer fields may be emitted.
        /// Servers before 1.4 reject the suffix.
        accepts_unsigned: bool,
    },
    /// JSON series array, one object per point (0.8).
    SeriesJson,
}

impl PointFormatter {
    /// Content type of the payload this formatter produces.
    pub fn content_type(&self) -> &'static str {
        match self {
            PointFormatter::LineProtocol { .. } => "text/plain",
            PointFormatter::SeriesJson => "application/json",
        }
    }

    /// Serialize points into a single write payload.
    ///
    /// Fails with [`Error::Format`] when a point has no fields, a duplicate
    /// field key, an empty measurement or tag component, or a field value
    /// the target dialect cannot carry.
    pub fn format(&self, points: &[Point]) -> Result<String> {
        match self {
            PointFormatter::LineProtocol { accepts_unsigned } => {
                let mut out = String::new();
                for (i, point) in points.iter().enumerate() {
                    validate(point)?;
                    if i > 0 {
                        out.push('\n');
                    }
                    write_line(&mut out, point, *accepts_unsigned)?;
                }
                Ok(out)
            }
            PointFormatter::SeriesJson => {
                let mut series = Vec::with_capacity(points.len());
                for point in points {
                    validate(point)?;
                    series.push(point_to_series_object(point)?);
                }
                Ok(serde_json::to_string(&series)?)
            }
        }
    }
}

/// Structural checks shared by both dialects.
fn validate(point: &Point) -> Result<()> {
    if point.measurement.is_empty() {
        return Err(Error::format("measurement name must not be empty"));
    }
    if point.fields.is_empty() {
        return Err(Error::format(format!(
            "point '{}' has no fields; at least one is required",
            point.measurement
        )));
    }
    let mut seen = HashSet::with_capacity(point.fields.len());
    for (key, value) in &point.fields {
        if key.is_empty() {
            return Err(Error::format(format!(
                "point '{}' has an empty field key",
                point.measurement
            )));
        }
        if !seen.insert(key.as_str()) {
            return Err(Error::format(format!(
                "point '{}' repeats field key '{}'",
                point.measurement, key
            )));
        }
        if !value.is_field_value() {
            return Err(Error::format(format!(
                "field '{}' of point '{}' holds a read-side value ({})",
                key, point.measurement, value
            )));
        }
    }
    for (key, value) in &point.tags {
        if key.is_empty() || value.is_empty() {
            return Err(Error::format(format!(
                "point '{}' has an empty tag key or value",
                point.measurement
            )));
        }
    }
    Ok(())
}

fn write_line(out: &mut String, point: &Point, accepts_unsigned: bool) -> Result<()> {
    escape_measurement(out, &point.measurement);
    for (key, value) in &point.tags {
        out.push(',');
        escape_tag_component(out, key);
        out.push('=');
        escape_tag_component(out, value);
    }
    out.push(' ');
    for (i, (key, value)) in point.fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        escape_tag_component(out, key);
        out.push('=');
        write_field_value(out, key, value, accepts_unsigned)?;
    }
    if let Some(timestamp) = &point.timestamp {
        out.push(' ');
        out.push_str(&point.precision.scale(timestamp)?.to_string());
    }
    Ok(())
}

fn write_field_value(
    out: &mut String,
    key: &str,
    value: &Value,
    accepts_unsigned: bool,
) -> Result<()> {
    match value {
        Value::Float(f) => {
            if !f.is_finite() {
                return Err(Error::format(format!(
                    "field '{}' is not finite ({})",
                    key, f
                )));
            }
            out.push_str(&f.to_string());
        }
        Value::Integer(i) => {
            out.push_str(&i.to_string());
            out.push('i');
        }
        Value::UnsignedInteger(u) => {
            if !accepts_unsigned {
                return Err(Error::format(format!(
                    "field '{}' is an unsigned integer, which this server version does not accept",
                    key
                )));
            }
            out.push_str(&u.to_string());
            out.push('u');
        }
        Value::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::String(s) => {
            out.push('"');
            for c in s.chars() {
                if c == '"' || c == '\\' {
                    out.push('\\');
                }
                out.push(c);
            }
            out.push('"');
        }
        // Rejected by validate() already
        Value::Timestamp(_) | Value::Null => unreachable!("validated field value"),
    }
    Ok(())
}

/// Measurement names escape commas and spaces (not equals signs).
fn escape_measurement(out: &mut String, s: &str) {
    for c in s.chars() {
        if c == ',' || c == ' ' {
            out.push('\\');
        }
        out.push(c);
    }
}

/// Tag keys/values and field keys escape commas, equals signs and spaces.
fn escape_tag_component(out: &mut String, s: &str) {
    for c in s.chars() {
        if c == ',' || c == '=' || c == ' ' {
            out.push('\\');
        }
        out.push(c);
    }
}

/// One 0.8 series object per point: tag columns first (sorted), then field
/// columns (insertion order), then `time` when the point carries one.
fn point_to_series_object(point: &Point) -> Result<serde_json::Value> {
    let mut columns = Vec::with_capacity(point.tags.len() + point.fields.len() + 1);
    let mut row = Vec::with_capacity(columns.capacity());

    for (key, value) in &point.tags {
        columns.push(key.clone());
        row.push(serde_json::Value::String(value.clone()));
    }
    for (key, value) in &point.fields {
        columns.push(key.clone());
        row.push(field_to_json(key, value)?);
    }
    if let Some(timestamp) = &point.timestamp {
        columns.push("time".to_string());
        row.push(json!(point.precision.scale(timestamp)?));
    }

    let mut object = Map::new();
    object.insert("name".to_string(), json!(point.measurement));
    object.insert("columns".to_string(), json!(columns));
    object.insert("points".to_string(), json!([row]));
    Ok(serde_json::Value::Object(object))
}

fn field_to_json(key: &str, value: &Value) -> Result<serde_json::Value> {
    match value {
        Value::Float(f) => Number::from_f64(f.into_inner())
            .map(serde_json::Value::Number)
            .ok_or_else(|| Error::format(format!("field '{}' is not finite ({})", key, f))),
        Value::Integer(i) => Ok(json!(i)),
        Value::UnsignedInteger(u) => Ok(json!(u)),
        Value::Boolean(b) => Ok(json!(b)),
        Value::String(s) => Ok(json!(s)),
        Value::Timestamp(_) | Value::Null => unreachable!("validated field value"),
    }
}
