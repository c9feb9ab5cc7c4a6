//! Row store contract

use async_trait::async_trait;
use bson::Document;
use std::fmt;

use super::Query;

/// A single row. Keys are column names; `id` is the primary key.
pub type Row = Document;

/// Tables known to the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Resources,
    Announcements,
    Events,
    ContactSubmissions,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Resources => "resources",
            Self::Announcements => "announcements",
            Self::Events => "events",
            Self::ContactSubmissions => "contact_submissions",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Store failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Point lookup, update or delete addressed a row that does not exist
    #[error("No row in {table} with id {id}")]
    NotFound { table: Table, id: String },

    /// Backend rejected the operation; the message is the backend's own
    #[error("{0}")]
    Backend(String),

    /// Backend could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Row could not be converted to or from its typed shape
    #[error("Row conversion failed: {0}")]
    Codec(String),

    /// Failure without a usable description
    #[error("store operation failed")]
    Opaque,
}

impl StoreError {
    /// Human-readable message, if the failure carries one
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Opaque => None,
            Self::Backend(msg) if msg.trim().is_empty() => None,
            other => Some(other.to_string()),
        }
    }
}

impl From<bson::ser::Error> for StoreError {
    fn from(err: bson::ser::Error) -> Self {
        Self::Codec(err.to_string())
    }
}

impl From<bson::de::Error> for StoreError {
    fn from(err: bson::de::Error) -> Self {
        Self::Codec(err.to_string())
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Typed table operations. Every call is a single round trip.
///
/// Implementations assign `id` (UUID v4 string), `created_at` and
/// `updated_at` on insert, and refresh `updated_at` on update. Caller-supplied
/// values for those columns are ignored.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Rows matching every filter in `query`, in the requested order
    async fn select(&self, table: Table, query: &Query) -> StoreResult<Vec<Row>>;

    /// Single row by id, `NotFound` if absent
    async fn select_by_id(&self, table: Table, id: &str) -> StoreResult<Row>;

    /// Insert and return the materialized row
    async fn insert(&self, table: Table, row: Row) -> StoreResult<Row>;

    /// Set the columns present in `patch` and return the post-update row
    async fn update(&self, table: Table, id: &str, patch: Row) -> StoreResult<Row>;

    /// Hard delete, `NotFound` if absent
    async fn delete(&self, table: Table, id: &str) -> StoreResult<()>;
}

/// Columns owned by the store
pub(crate) const MANAGED_COLUMNS: [&str; 3] = ["id", "created_at", "updated_at"];

pub(crate) fn strip_managed(mut row: Row) -> Row {
    for column in MANAGED_COLUMNS {
        row.remove(column);
    }
    row
}
