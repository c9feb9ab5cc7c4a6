//! In-memory row store
//!
//! Used when MongoDB is unavailable in dev mode, and as the backing store in
//! tests. Rows per table are kept in insertion order.

use async_trait::async_trait;
use bson::Bson;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use super::store::strip_managed;
use super::{Query, Row, RowStore, StoreError, StoreResult, Table};
use crate::models::Timestamp;

#[derive(Debug, Default)]
pub struct MemoryRowStore {
    tables: DashMap<Table, Vec<Row>>,
}

impl MemoryRowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows in a table
    pub fn len(&self, table: Table) -> usize {
        self.tables.get(&table).map_or(0, |rows| rows.len())
    }

    pub fn is_empty(&self, table: Table) -> bool {
        self.len(table) == 0
    }
}

fn row_id(row: &Row) -> Option<&str> {
    row.get_str("id").ok()
}

fn not_found(table: Table, id: &str) -> StoreError {
    StoreError::NotFound {
        table,
        id: id.to_string(),
    }
}

#[async_trait]
impl RowStore for MemoryRowStore {
    async fn select(&self, table: Table, query: &Query) -> StoreResult<Vec<Row>> {
        let mut rows: Vec<Row> = self
            .tables
            .get(&table)
            .map(|rows| rows.iter().filter(|r| query.matches(r)).cloned().collect())
            .unwrap_or_default();
        query.sort(&mut rows);
        Ok(rows)
    }

    async fn select_by_id(&self, table: Table, id: &str) -> StoreResult<Row> {
        self.tables
            .get(&table)
            .and_then(|rows| rows.iter().find(|r| row_id(r) == Some(id)).cloned())
            .ok_or_else(|| not_found(table, id))
    }

    async fn insert(&self, table: Table, row: Row) -> StoreResult<Row> {
        let now = Bson::String(Timestamp::now().to_wire());
        let id = Uuid::new_v4().to_string();

        let mut stored = Row::new();
        stored.insert("id", id.as_str());
        for (column, value) in strip_managed(row) {
            stored.insert(column, value);
        }
        stored.insert("created_at", now.clone());
        stored.insert("updated_at", now);

        self.tables.entry(table).or_default().push(stored.clone());
        debug!(table = %table, id = %id, "Inserted row");
        Ok(stored)
    }

    async fn update(&self, table: Table, id: &str, patch: Row) -> StoreResult<Row> {
        let mut rows = self.tables.entry(table).or_default();
        let row = rows
            .iter_mut()
            .find(|r| row_id(r) == Some(id))
            .ok_or_else(|| not_found(table, id))?;

        for (column, value) in strip_managed(patch) {
            row.insert(column, value);
        }
        row.insert("updated_at", Timestamp::now().to_wire());
        Ok(row.clone())
    }

    async fn delete(&self, table: Table, id: &str) -> StoreResult<()> {
        let mut rows = self.tables.entry(table).or_default();
        let before = rows.len();
        rows.retain(|r| row_id(r) != Some(id));
        if rows.len() == before {
            return Err(not_found(table, id));
        }
        Ok(())
    }
}
