//! InfluxQL query builders, one group per resource.
//!
//! Builders are pure functions from structured parameters to query strings:
//! no I/O, no state, byte-identical output for identical input. Identifiers
//! are always double-quoted so reserved words and special characters cannot
//! break the statement; string literals are single-quoted.
//!
//! The continuous-query builder is the one version-split builder: servers
//! before 0.9.6 do not understand the RESAMPLE clause, so the legacy variant
//! omits it. All other builders produce the same text for every line-protocol
//! version.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::types::Privilege;

/// Double-quote an identifier, escaping embedded double quotes.
pub(crate) fn quote_identifier(identifier: &str) -> String {
    let mut out = String::with_capacity(identifier.len() + 2);
    out.push('"');
    for c in identifier.chars() {
        if c == '"' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Single-quote a string literal, escaping embedded single quotes.
pub(crate) fn quote_literal(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len() + 2);
    out.push('\'');
    for c in literal.chars() {
        if c == '\'' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

fn time_literal(instant: &DateTime<Utc>) -> String {
    quote_literal(&instant.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

pub(crate) mod database {
    use super::quote_identifier;

    pub(crate) fn create(name: &str) -> String {
        format!("CREATE DATABASE {}", quote_identifier(name))
    }

    pub(crate) fn show() -> String {
        "SHOW DATABASES".to_string()
    }

    pub(crate) fn drop(name: &str) -> String {
        format!("DROP DATABASE {}", quote_identifier(name))
    }
}

pub(crate) mod retention {
    use super::quote_identifier;

    /// Parameters for creating or altering a retention policy.
    ///
    /// `duration` is an InfluxQL duration literal such as `1h`, `90m` or
    /// `52w`; the server validates it.
    #[derive(Clone, Debug)]
    pub struct RetentionPolicyParams {
        pub name: String,
        pub database: String,
        pub duration: String,
        pub replication: i64,
        pub is_default: bool,
    }

    pub(crate) fn create(params: &RetentionPolicyParams) -> String {
        format!(
            "CREATE RETENTION POLICY {} ON {} DURATION {} REPLICATION {}{}",
            quote_identifier(&params.name),
            quote_identifier(&params.database),
            params.duration,
            params.replication,
            if params.is_default { " DEFAULT" } else { "" }
        )
    }

    pub(crate) fn show(database: &str) -> String {
        format!("SHOW RETENTION POLICIES ON {}", quote_identifier(database))
    }

    pub(crate) fn alter(params: &RetentionPolicyParams) -> String {
        format!(
            "ALTER RETENTION POLICY {} ON {} DURATION {} REPLICATION {}{}",
            quote_identifier(&params.name),
            quote_identifier(&params.database),
            params.duration,
            params.replication,
            if params.is_default { " DEFAULT" } else { "" }
        )
    }

    pub(crate) fn drop(name: &str, database: &str) -> String {
        format!(
            "DROP RETENTION POLICY {} ON {}",
            quote_identifier(name),
            quote_identifier(database)
        )
    }
}

/// Parameters for `CREATE CONTINUOUS QUERY`.
#[derive(Clone, Debug)]
pub struct CqParams {
    /// Query name.
    pub name: String,
    /// Database the query runs against.
    pub database: String,
    /// The inner `SELECT ... INTO ... FROM ... GROUP BY ...` statement.
    pub query: String,
    /// Optional RESAMPLE clause (0.9.6+ servers only).
    pub resample: Option<Resample>,
}

/// RESAMPLE clause of a continuous query. At least one of the two intervals
/// should be set; both are InfluxQL duration literals.
#[derive(Clone, Debug, Default)]
pub struct Resample {
    /// How often the query resamples (`EVERY`).
    pub every: Option<String>,
    /// How far back each run recomputes (`FOR`).
    pub for_interval: Option<String>,
}

/// Parameters for a manual backfill of downsampled data.
#[derive(Clone, Debug)]
pub struct BackfillParams {
    /// Aggregate expressions, e.g. `mean(value) AS value`.
    pub downsamplers: Vec<String>,
    /// Measurement the aggregates are written into.
    pub destination: String,
    /// Measurement the raw samples are read from.
    pub source: String,
    /// Start of the backfilled window (inclusive).
    pub start: DateTime<Utc>,
    /// End of the backfilled window (exclusive).
    pub end: DateTime<Utc>,
    /// GROUP BY time interval, an InfluxQL duration literal.
    pub interval: String,
    /// Optional fill strategy, e.g. `none`, `previous` or a number.
    pub fill: Option<String>,
}

/// Continuous-query builder, version-split at client construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CqQueryBuilder {
    /// 0.9.6+: emits the RESAMPLE clause when requested.
    Modern,
    /// Pre-0.9.6: the clause does not exist, so it is omitted.
    Legacy,
}

impl CqQueryBuilder {
    pub(crate) fn create(self, params: &CqParams) -> String {
        let mut statement = format!(
            "CREATE CONTINUOUS QUERY {} ON {} ",
            quote_identifier(&params.name),
            quote_identifier(&params.database)
        );
        if self == CqQueryBuilder::Modern {
            if let Some(resample) = &params.resample {
                statement.push_str("RESAMPLE ");
                if let Some(every) = &resample.every {
                    statement.push_str("EVERY ");
                    statement.push_str(every);
                    statement.push(' ');
                }
                if let Some(for_interval) = &resample.for_interval {
                    statement.push_str("FOR ");
                    statement.push_str(for_interval);
                    statement.push(' ');
                }
            }
        }
        statement.push_str("BEGIN ");
        statement.push_str(&params.query);
        statement.push_str(" END");
        statement
    }

    pub(crate) fn show(self) -> String {
        "SHOW CONTINUOUS QUERIES".to_string()
    }

    pub(crate) fn drop(self, name: &str, database: &str) -> String {
        format!(
            "DROP CONTINUOUS QUERY {} ON {}",
            quote_identifier(name),
            quote_identifier(database)
        )
    }

    pub(crate) fn backfill(self, params: &BackfillParams) -> String {
        let mut statement = format!(
            "SELECT {} INTO {} FROM {} WHERE time >= {} AND time < {} GROUP BY time({})",
            params.downsamplers.join(", "),
            quote_identifier(&params.destination),
            quote_identifier(&params.source),
            time_literal(&params.start),
            time_literal(&params.end),
            params.interval
        );
        if let Some(fill) = &params.fill {
            statement.push_str(&format!(" fill({})", fill));
        }
        statement
    }
}

pub(crate) mod series {
    use super::{quote_identifier, quote_literal};

    pub(crate) fn show(measurement: Option<&str>) -> String {
        match measurement {
            Some(measurement) => format!("SHOW SERIES FROM {}", quote_identifier(measurement)),
            None => "SHOW SERIES".to_string(),
        }
    }

    pub(crate) fn drop(measurement: &str, tags: &[(String, String)]) -> String {
        let mut statement = format!("DROP SERIES FROM {}", quote_identifier(measurement));
        for (i, (key, value)) in tags.iter().enumerate() {
            statement.push_str(if i == 0 { " WHERE " } else { " AND " });
            statement.push_str(&quote_identifier(key));
            statement.push_str(" = ");
            statement.push_str(&quote_literal(value));
        }
        statement
    }

    pub(crate) fn show_measurements() -> String {
        "SHOW MEASUREMENTS".to_string()
    }

    pub(crate) fn drop_measurement(name: &str) -> String {
        format!("DROP MEASUREMENT {}", quote_identifier(name))
    }
}

pub(crate) mod diagnostics {
    pub(crate) fn stats() -> String {
        "SHOW STATS".to_string()
    }

    pub(crate) fn diagnostics() -> String {
        "SHOW DIAGNOSTICS".to_string()
    }
}

pub(crate) mod user {
    use super::{Privilege, quote_identifier, quote_literal};

    pub(crate) fn show() -> String {
        "SHOW USERS".to_string()
    }

    pub(crate) fn create(name: &str, password: &str, is_admin: bool) -> String {
        format!(
            "CREATE USER {} WITH PASSWORD {}{}",
            quote_identifier(name),
            quote_literal(password),
            if is_admin { " WITH ALL PRIVILEGES" } else { "" }
        )
    }

    pub(crate) fn drop(name: &str) -> String {
        format!("DROP USER {}", quote_identifier(name))
    }

    pub(crate) fn set_password(name: &str, password: &str) -> String {
        format!(
            "SET PASSWORD FOR {} = {}",
            quote_identifier(name),
            quote_literal(password)
        )
    }

    pub(crate) fn grant_administrator(name: &str) -> String {
        format!("GRANT ALL PRIVILEGES TO {}", quote_identifier(name))
    }

    pub(crate) fn revoke_administrator(name: &str) -> String {
        format!("REVOKE ALL PRIVILEGES FROM {}", quote_identifier(name))
    }

    pub(crate) fn grant(privilege: Privilege, database: &str, name: &str) -> String {
        format!(
            "GRANT {} ON {} TO {}",
            privilege.keyword(),
            quote_identifier(database),
            quote_identifier(name)
        )
    }

    pub(crate) fn revoke(privilege: Privilege, database: &str, name: &str) -> String {
        format!(
            "REVOKE {} ON {} FROM {}",
            privilege.keyword(),
            quote_identifier(database),
            quote_identifier(name)
        )
    }

    pub(crate) fn show_grants(name: &str) -> String {
        format!("SHOW GRANTS FOR {}", quote_identifier(name))
    }
}
