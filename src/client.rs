//! Client construction and the HTTP request pipeline.
//!
//! The version-specific pieces (formatter, envelope parser, series-key
//! parser, continuous-query builder) are resolved once, when the client is
//! built, into a single [`Pipeline`] that every resource module shares. From
//! there on the rest of the crate is version-agnostic.

use std::sync::Arc;
use std::time::Instant;

use reqwest::Url;
use tracing::{debug, warn};

use crate::batch::{BatchOptions, BatchWriter, WriteSink};
use crate::error::{Error, Result};
use crate::format::PointFormatter;
use crate::modules::{
    ContinuousQueryClient, DatabaseClient, DiagnosticsClient, RetentionClient, SeriesClient,
    UserClient,
};
use crate::parser::{self, ResponseParser, SeriesKeyParser};
use crate::point::{Point, Precision};
use crate::query::CqQueryBuilder;
use crate::types::{Consistency, Pong, ProtocolVersion, QueryResult, Series};

/// Client configuration, validated when [`ClientConfig::build`] runs.
///
/// # Example
///
/// ```ignore
/// use influxdb_classic::{ClientConfig, ProtocolVersion};
///
/// let client = ClientConfig::new("http://localhost:8086", ProtocolVersion::Latest)
///     .with_credentials("root", "root")
///     .build()?;
/// ```
#[derive(Clone, Debug)]
pub struct ClientConfig {
    url: String,
    version: ProtocolVersion,
    credentials: Option<(String, String)>,
    http: Option<reqwest::Client>,
}

impl ClientConfig {
    /// Start a configuration for the given endpoint and protocol version.
    pub fn new(url: impl Into<String>, version: ProtocolVersion) -> Self {
        Self {
            url: url.into(),
            version,
            credentials: None,
            http: None,
        }
    }

    /// Authenticate as the given user.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Use a custom reqwest client (timeouts, proxies, TLS settings).
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Validate the configuration and construct the client.
    ///
    /// Fails with [`Error::Configuration`] when the endpoint URL is
    /// malformed or cannot carry a path.
    pub fn build(self) -> Result<Client> {
        let base_url = Url::parse(&self.url).map_err(|e| {
            Error::Configuration(format!("invalid server URL '{}': {}", self.url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Configuration(format!(
                "server URL '{}' cannot carry a path",
                self.url
            )));
        }

        let version = self.version;
        let request = RequestClient {
            http: self.http.unwrap_or_default(),
            base_url,
            credentials: self.credentials,
            version,
            formatter: if version.is_legacy() {
                PointFormatter::SeriesJson
            } else {
                PointFormatter::LineProtocol {
                    accepts_unsigned: version.accepts_unsigned(),
                }
            },
        };

        // The whole version bundle is fixed here; nothing downstream
        // inspects the version again.
        let pipeline = Arc::new(Pipeline {
            request,
            parser: if version.is_legacy() {
                ResponseParser::SeriesArray
            } else {
                ResponseParser::Results
            },
            series_keys: if version.series_as_keys() {
                SeriesKeyParser::KeyColumn
            } else {
                SeriesKeyParser::TagColumns
            },
            cq_builder: if version.supports_resample() {
                CqQueryBuilder::Modern
            } else {
                CqQueryBuilder::Legacy
            },
        });

        Ok(Client {
            database: DatabaseClient::new(Arc::clone(&pipeline)),
            retention: RetentionClient::new(Arc::clone(&pipeline)),
            continuous_query: ContinuousQueryClient::new(Arc::clone(&pipeline)),
            series: SeriesClient::new(Arc::clone(&pipeline)),
            user: UserClient::new(Arc::clone(&pipeline)),
            diagnostics: DiagnosticsClient::new(Arc::clone(&pipeline)),
            pipeline,
        })
    }
}

/// The version-resolved request/response pipeline shared by all modules.
#[derive(Debug)]
pub(crate) struct Pipeline {
    pub(crate) request: RequestClient,
    pub(crate) parser: ResponseParser,
    pub(crate) series_keys: SeriesKeyParser,
    pub(crate) cq_builder: CqQueryBuilder,
}

impl Pipeline {
    /// Run one statement and flatten its series, surfacing statement errors
    /// as [`Error::Query`].
    pub(crate) async fn execute(
        &self,
        query: &str,
        database: Option<&str>,
    ) -> Result<Vec<Series>> {
        let raw = self.request.read(query, database).await?;
        parser::flatten(self.parser.parse(&raw)?)
    }

    /// Run one or more statements, keeping per-statement errors in place.
    pub(crate) async fn execute_results(
        &self,
        query: &str,
        database: Option<&str>,
    ) -> Result<Vec<QueryResult>> {
        let raw = self.request.read(query, database).await?;
        self.parser.parse(&raw)
    }
}

#[async_trait::async_trait]
impl WriteSink for Pipeline {
    async fn write_payload(
        &self,
        database: &str,
        retention_policy: Option<&str>,
        precision: Precision,
        payload: String,
    ) -> Result<()> {
        self.request
            .write(database, payload, retention_policy, precision, None)
            .await
    }
}

/// HTTP request client bound to one endpoint and protocol version.
#[derive(Debug)]
pub(crate) struct RequestClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Option<(String, String)>,
    version: ProtocolVersion,
    formatter: PointFormatter,
}

impl RequestClient {
    pub(crate) fn point_formatter(&self) -> PointFormatter {
        self.formatter
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(path);
        url
    }

    fn auth_params(&self) -> Vec<(&'static str, String)> {
        match &self.credentials {
            Some((username, password)) => {
                vec![("u", username.clone()), ("p", password.clone())]
            }
            None => Vec::new(),
        }
    }

    /// Issue a query over HTTP GET and return the raw response body.
    pub(crate) async fn read(&self, query: &str, database: Option<&str>) -> Result<String> {
        let mut params = self.auth_params();
        let url = if self.version.is_legacy() {
            let database = database.ok_or_else(|| {
                Error::Configuration(
                    "the 0.8 protocol requires a database name for queries".to_string(),
                )
            })?;
            self.endpoint(&format!("/db/{}/series", database))
        } else {
            if let Some(database) = database {
                params.push(("db", database.to_string()));
            }
            self.endpoint("/query")
        };
        params.push(("q", query.to_string()));

        debug!(query, "sending query");
        let response = self.http.get(url).query(&params).send().await?;
        self.success_body(response).await
    }

    /// Issue a write over HTTP POST with a pre-formatted payload body.
    pub(crate) async fn write(
        &self,
        database: &str,
        payload: String,
        retention_policy: Option<&str>,
        precision: Precision,
        consistency: Option<Consistency>,
    ) -> Result<()> {
        let mut params = self.auth_params();
        let url = if self.version.is_legacy() {
            params.push((
                "time_precision",
                precision.legacy_time_precision()?.to_string(),
            ));
            self.endpoint(&format!("/db/{}/series", database))
        } else {
            params.push(("db", database.to_string()));
            if let Some(retention_policy) = retention_policy {
                params.push(("rp", retention_policy.to_string()));
            }
            params.push(("precision", precision.query_param().to_string()));
            if let Some(consistency) = consistency {
                params.push(("consistency", consistency.query_param().to_string()));
            }
            self.endpoint("/write")
        };

        debug!(database, bytes = payload.len(), "sending write");
        let response = self
            .http
            .post(url)
            .query(&params)
            .header("Content-Type", self.formatter.content_type())
            .body(payload)
            .send()
            .await?;
        self.success_body(response).await?;
        Ok(())
    }

    /// Round-trip `/ping`, reporting the server version and elapsed time.
    pub(crate) async fn ping(&self) -> Result<Pong> {
        let started = Instant::now();
        let response = self
            .http
            .get(self.endpoint("/ping"))
            .query(&self.auth_params())
            .send()
            .await?;
        let version = response
            .headers()
            .get("X-Influxdb-Version")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();
        self.success_body(response).await?;
        Ok(Pong {
            version,
            response_time: started.elapsed(),
        })
    }

    /// Read the body, mapping non-2xx statuses to [`Error::Server`] with the
    /// body preserved verbatim.
    async fn success_body(&self, response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let body = response.text().await?;
        if status.as_u16() >= 400 {
            warn!(status = status.as_u16(), "server rejected request");
            return Err(Error::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

/// Version-spanning client for the classic InfluxDB HTTP API.
///
/// One instance talks one protocol dialect, fixed at construction. Resource
/// modules are thin façades over the shared pipeline and are constructed
/// eagerly; the client is cheap to share behind an `Arc`.
#[derive(Debug)]
pub struct Client {
    pipeline: Arc<Pipeline>,
    database: DatabaseClient,
    retention: RetentionClient,
    continuous_query: ContinuousQueryClient,
    series: SeriesClient,
    user: UserClient,
    diagnostics: DiagnosticsClient,
}

/// Options for a single write request.
#[derive(Clone, Debug, Default)]
pub struct WriteOptions {
    /// Target retention policy; the database default when absent.
    pub retention_policy: Option<String>,
    /// Write consistency level for clustered servers.
    pub consistency: Option<Consistency>,
}

impl Client {
    /// Database management operations.
    pub fn database(&self) -> &DatabaseClient {
        &self.database
    }

    /// Retention policy operations.
    pub fn retention(&self) -> &RetentionClient {
        &self.retention
    }

    /// Continuous query operations.
    pub fn continuous_query(&self) -> &ContinuousQueryClient {
        &self.continuous_query
    }

    /// Series and measurement operations.
    pub fn series(&self) -> &SeriesClient {
        &self.series
    }

    /// User and privilege operations.
    pub fn user(&self) -> &UserClient {
        &self.user
    }

    /// Ping, stats and diagnostics operations.
    pub fn diagnostics(&self) -> &DiagnosticsClient {
        &self.diagnostics
    }

    /// The point formatter negotiated for this client's protocol version.
    pub fn point_formatter(&self) -> PointFormatter {
        self.pipeline.request.point_formatter()
    }

    /// Write points to a database in one request.
    ///
    /// All points must share one precision, since the server is told the
    /// timestamp unit once per request. Writing an empty slice is a no-op.
    pub async fn write(
        &self,
        database: &str,
        points: &[Point],
        options: &WriteOptions,
    ) -> Result<()> {
        let Some(first) = points.first() else {
            return Ok(());
        };
        let precision = first.precision;
        if points.iter().any(|p| p.precision != precision) {
            return Err(Error::format(
                "all points in one write must share the same precision",
            ));
        }

        let payload = self.pipeline.request.point_formatter().format(points)?;
        self.pipeline
            .request
            .write(
                database,
                payload,
                options.retention_policy.as_deref(),
                precision,
                options.consistency,
            )
            .await
    }

    /// Run a single query statement and return its series.
    ///
    /// A statement the server rejects inside a well-formed envelope is
    /// surfaced as [`Error::Query`].
    pub async fn query(&self, database: &str, query: &str) -> Result<Vec<Series>> {
        self.pipeline.execute(query, Some(database)).await
    }

    /// Run several statements in one request, preserving per-statement
    /// errors so partial results stay usable.
    pub async fn multi_query(
        &self,
        database: &str,
        queries: &[&str],
    ) -> Result<Vec<QueryResult>> {
        let joined = queries.join(";");
        self.pipeline.execute_results(&joined, Some(database)).await
    }

    /// Create a batch writer that accumulates points and writes them in
    /// bounded batches through this client.
    pub fn batch_writer(&self, options: BatchOptions) -> BatchWriter {
        BatchWriter::new(
            Arc::clone(&self.pipeline) as Arc<dyn WriteSink>,
            self.pipeline.request.point_formatter(),
            options,
        )
    }
}
