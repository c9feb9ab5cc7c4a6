//! MongoDB client and row store adapter
//!
//! One collection per [`Table`]. The row's `id` column is stored as the
//! document `_id` (a UUID string); timestamps are stored as fixed-width
//! RFC 3339 strings so `$gte` on them compares chronologically.

use async_trait::async_trait;
use bson::{doc, Bson, Document};
use futures_util::TryStreamExt;
use mongodb::{
    error::ErrorKind,
    options::{IndexOptions, ReturnDocument},
    Client, Collection, IndexModel,
};
use tracing::{debug, info};
use uuid::Uuid;

use super::store::strip_managed;
use super::{Direction, Filter, Query, Row, RowStore, StoreError, StoreResult, Table};
use crate::models::Timestamp;
use crate::types::AppError;

/// MongoDB client wrapper
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
    db_name: String,
}

impl MongoClient {
    /// Connect and verify with a ping
    pub async fn new(uri: &str, db_name: &str) -> Result<Self, AppError> {
        info!("Connecting to MongoDB at {}", uri);

        // Use serverSelectionTimeoutMS to avoid hanging on unreachable MongoDB
        let timeout_uri = if uri.contains('?') {
            format!("{}&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        } else {
            format!("{}?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        };

        let client = Client::with_uri_str(&timeout_uri)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to MongoDB: {}", e)))?;

        client
            .database(db_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| AppError::Database(format!("MongoDB ping failed: {}", e)))?;

        info!("Connected to MongoDB database '{}'", db_name);

        Ok(Self {
            client,
            db_name: db_name.to_string(),
        })
    }

    pub fn collection(&self, table: Table) -> Collection<Document> {
        self.client.database(&self.db_name).collection(table.name())
    }

    pub fn db_name(&self) -> &str {
        &self.db_name
    }
}

/// Index definitions per table
fn table_indexes(table: Table) -> Vec<(Document, Option<IndexOptions>)> {
    match table {
        Table::Resources => vec![
            (doc! { "name": 1 }, None),
            (doc! { "is_active": 1, "category": 1, "name": 1 }, None),
        ],
        Table::Announcements => vec![
            (doc! { "created_at": -1 }, None),
            (doc! { "date_expired": 1 }, None),
        ],
        Table::Events => vec![(doc! { "start_date": 1 }, None)],
        Table::ContactSubmissions => vec![(doc! { "created_at": -1 }, None)],
    }
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        match err.kind.as_ref() {
            ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) => {
                Self::Unavailable(err.to_string())
            }
            _ => Self::Backend(err.to_string()),
        }
    }
}

/// Row store backed by MongoDB collections
#[derive(Clone)]
pub struct MongoRowStore {
    mongo: MongoClient,
}

impl MongoRowStore {
    pub fn new(mongo: MongoClient) -> Self {
        Self { mongo }
    }

    /// Create the indexes the content reads rely on
    pub async fn ensure_indexes(&self) -> Result<(), AppError> {
        for table in [
            Table::Resources,
            Table::Announcements,
            Table::Events,
            Table::ContactSubmissions,
        ] {
            let indices: Vec<IndexModel> = table_indexes(table)
                .into_iter()
                .map(|(keys, opts)| IndexModel::builder().keys(keys).options(opts).build())
                .collect();

            self.mongo
                .collection(table)
                .create_indexes(indices)
                .await
                .map_err(|e| AppError::Database(format!("Failed to create indexes: {}", e)))?;
        }
        debug!("MongoDB indexes applied");
        Ok(())
    }
}

fn column(name: &str) -> &str {
    if name == "id" {
        "_id"
    } else {
        name
    }
}

fn filter_document(filter: &Filter) -> Document {
    match filter {
        Filter::Eq(c, v) => doc! { column(c): v.clone() },
        Filter::Gte(c, v) => doc! { column(c): { "$gte": v.clone() } },
        Filter::IsNull(c) => doc! { column(c): Bson::Null },
        Filter::Or(filters) => {
            let branches: Vec<Document> = filters.iter().map(filter_document).collect();
            doc! { "$or": branches }
        }
    }
}

/// Translate a query's filters into a MongoDB filter document
pub(crate) fn query_filter(query: &Query) -> Document {
    match query.filters.as_slice() {
        [] => Document::new(),
        [single] => filter_document(single),
        many => {
            let all: Vec<Document> = many.iter().map(filter_document).collect();
            doc! { "$and": all }
        }
    }
}

pub(crate) fn query_sort(query: &Query) -> Option<Document> {
    query.order.as_ref().map(|order| {
        let dir = match order.direction {
            Direction::Ascending => 1,
            Direction::Descending => -1,
        };
        doc! { column(&order.column): dir }
    })
}

/// `_id` back to `id`
fn from_storage(mut document: Document) -> Row {
    if let Some(id) = document.remove("_id") {
        let id = match id {
            Bson::String(s) => s,
            Bson::ObjectId(oid) => oid.to_hex(),
            other => other.to_string(),
        };
        let mut row = Row::new();
        row.insert("id", id);
        for (k, v) in document {
            row.insert(k, v);
        }
        row
    } else {
        document
    }
}

fn not_found(table: Table, id: &str) -> StoreError {
    StoreError::NotFound {
        table,
        id: id.to_string(),
    }
}

#[async_trait]
impl RowStore for MongoRowStore {
    async fn select(&self, table: Table, query: &Query) -> StoreResult<Vec<Row>> {
        let collection = self.mongo.collection(table);
        let find = collection.find(query_filter(query));
        let cursor = match query_sort(query) {
            Some(sort) => find.sort(sort).await?,
            None => find.await?,
        };
        let documents: Vec<Document> = cursor.try_collect().await?;
        Ok(documents.into_iter().map(from_storage).collect())
    }

    async fn select_by_id(&self, table: Table, id: &str) -> StoreResult<Row> {
        self.mongo
            .collection(table)
            .find_one(doc! { "_id": id })
            .await?
            .map(from_storage)
            .ok_or_else(|| not_found(table, id))
    }

    async fn insert(&self, table: Table, row: Row) -> StoreResult<Row> {
        let now = Timestamp::now().to_wire();
        let id = Uuid::new_v4().to_string();

        let mut document = doc! { "_id": id.as_str() };
        for (k, v) in strip_managed(row) {
            document.insert(k, v);
        }
        document.insert("created_at", now.as_str());
        document.insert("updated_at", now.as_str());

        self.mongo.collection(table).insert_one(&document).await?;
        debug!(table = %table, id = %id, "Inserted document");
        Ok(from_storage(document))
    }

    async fn update(&self, table: Table, id: &str, patch: Row) -> StoreResult<Row> {
        let mut set = strip_managed(patch);
        set.insert("updated_at", Timestamp::now().to_wire());

        self.mongo
            .collection(table)
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?
            .map(from_storage)
            .ok_or_else(|| not_found(table, id))
    }

    async fn delete(&self, table: Table, id: &str) -> StoreResult<()> {
        let result = self
            .mongo
            .collection(table)
            .delete_one(doc! { "_id": id })
            .await?;
        if result.deleted_count == 0 {
            return Err(not_found(table, id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    // Round trips against a live MongoDB are not run here; the translation
    // from queries to filter documents is.
    use super::*;

    #[test]
    fn test_active_announcement_filter_document() {
        let query = Query::new()
            .or(vec![
                Filter::is_null("date_expired"),
                Filter::gte("date_expired", "2025-01-01T00:00:00.000Z"),
            ])
            .order_by("created_at", Direction::Descending);

        assert_eq!(
            query_filter(&query),
            doc! { "$or": [
                { "date_expired": Bson::Null },
                { "date_expired": { "$gte": "2025-01-01T00:00:00.000Z" } },
            ] }
        );
        assert_eq!(query_sort(&query), Some(doc! { "created_at": -1 }));
    }

    #[test]
    fn test_multiple_filters_are_anded_and_id_maps() {
        let query = Query::new().eq("is_active", true).eq("id", "abc");
        assert_eq!(
            query_filter(&query),
            doc! { "$and": [ { "is_active": true }, { "_id": "abc" } ] }
        );
        assert_eq!(query_filter(&Query::new()), Document::new());
    }

    #[test]
    fn test_from_storage_renames_id() {
        let row = from_storage(doc! { "_id": "u1", "name": "x" });
        assert_eq!(row, doc! { "id": "u1", "name": "x" });
    }
}
