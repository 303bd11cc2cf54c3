//! Per-resource client modules.
//!
//! Each module is a thin façade combining the resource's query builder and
//! response parser with the shared request pipeline. They hold no state of
//! their own and are constructed eagerly when the client is built.

mod continuous_query;
mod database;
mod diagnostics;
mod retention;
mod series;
mod user;

pub use continuous_query::ContinuousQueryClient;
pub use database::DatabaseClient;
pub use diagnostics::DiagnosticsClient;
pub use retention::RetentionClient;
pub use series::SeriesClient;
pub use user::UserClient;
