//! Per-entity CRUD over the row store

use bson::Bson;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::debug;

use super::{Clock, SystemClock};
use crate::db::{Direction, Filter, Query, Row, RowStore, StoreResult, Table};
use crate::models::{
    Announcement, AnnouncementPatch, ContactSubmission, Event, EventPatch, NewAnnouncement,
    NewContactSubmission, NewEvent, NewResource, Resource, ResourceCategory, ResourcePatch,
};

fn encode<T: Serialize>(value: &T) -> StoreResult<Row> {
    Ok(bson::to_document(value)?)
}

fn decode<T: DeserializeOwned>(row: Row) -> StoreResult<T> {
    Ok(bson::from_document(row)?)
}

fn decode_all<T: DeserializeOwned>(rows: Vec<Row>) -> StoreResult<Vec<T>> {
    rows.into_iter().map(decode).collect()
}

/// Typed access to content tables
#[derive(Clone)]
pub struct ContentRepository {
    store: Arc<dyn RowStore>,
    clock: Arc<dyn Clock>,
}

impl ContentRepository {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn RowStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &Arc<dyn RowStore> {
        &self.store
    }

    async fn fetch<T: DeserializeOwned>(&self, table: Table, query: Query) -> StoreResult<Vec<T>> {
        let rows = self.store.select(table, &query).await?;
        debug!(table = %table, rows = rows.len(), "Fetched rows");
        decode_all(rows)
    }

    async fn fetch_one<T: DeserializeOwned>(&self, table: Table, id: &str) -> StoreResult<T> {
        decode(self.store.select_by_id(table, id).await?)
    }

    async fn insert<I: Serialize, T: DeserializeOwned>(
        &self,
        table: Table,
        input: &I,
    ) -> StoreResult<T> {
        decode(self.store.insert(table, encode(input)?).await?)
    }

    async fn patch<P: Serialize, T: DeserializeOwned>(
        &self,
        table: Table,
        id: &str,
        patch: &P,
    ) -> StoreResult<T> {
        decode(self.store.update(table, id, encode(patch)?).await?)
    }

    // =========================================================================
    // Resources
    // =========================================================================

    /// Every resource, by name
    pub async fn get_all_resources(&self) -> StoreResult<Vec<Resource>> {
        let query = Query::new().order_by("name", Direction::Ascending);
        self.fetch(Table::Resources, query).await
    }

    /// Active resources by name, optionally restricted to one category
    pub async fn get_active_resources(
        &self,
        category: Option<ResourceCategory>,
    ) -> StoreResult<Vec<Resource>> {
        let mut query = Query::new().eq("is_active", true);
        if let Some(category) = category {
            query = query.eq("category", category.as_str());
        }
        self.fetch(Table::Resources, query.order_by("name", Direction::Ascending))
            .await
    }

    pub async fn get_resource_by_id(&self, id: &str) -> StoreResult<Resource> {
        self.fetch_one(Table::Resources, id).await
    }

    pub async fn create_resource(&self, input: &NewResource) -> StoreResult<Resource> {
        self.insert(Table::Resources, input).await
    }

    pub async fn update_resource(&self, id: &str, patch: &ResourcePatch) -> StoreResult<Resource> {
        self.patch(Table::Resources, id, patch).await
    }

    pub async fn delete_resource(&self, id: &str) -> StoreResult<()> {
        self.store.delete(Table::Resources, id).await
    }

    // =========================================================================
    // Announcements
    // =========================================================================

    /// Every announcement, newest first
    pub async fn get_all_announcements(&self) -> StoreResult<Vec<Announcement>> {
        let query = Query::new().order_by("created_at", Direction::Descending);
        self.fetch(Table::Announcements, query).await
    }

    /// Announcements with no expiry or an expiry at or after now
    pub async fn get_active_announcements(&self) -> StoreResult<Vec<Announcement>> {
        let now = self.clock.now().to_wire();
        let query = Query::new()
            .or(vec![
                Filter::is_null("date_expired"),
                Filter::gte("date_expired", Bson::String(now)),
            ])
            .order_by("created_at", Direction::Descending);
        self.fetch(Table::Announcements, query).await
    }

    pub async fn get_announcement_by_id(&self, id: &str) -> StoreResult<Announcement> {
        self.fetch_one(Table::Announcements, id).await
    }

    pub async fn create_announcement(&self, input: &NewAnnouncement) -> StoreResult<Announcement> {
        self.insert(Table::Announcements, input).await
    }

    pub async fn update_announcement(
        &self,
        id: &str,
        patch: &AnnouncementPatch,
    ) -> StoreResult<Announcement> {
        self.patch(Table::Announcements, id, patch).await
    }

    pub async fn delete_announcement(&self, id: &str) -> StoreResult<()> {
        self.store.delete(Table::Announcements, id).await
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Every event, soonest first
    pub async fn get_all_events(&self) -> StoreResult<Vec<Event>> {
        let query = Query::new().order_by("start_date", Direction::Ascending);
        self.fetch(Table::Events, query).await
    }

    /// Events starting at or after now
    pub async fn get_upcoming_events(&self) -> StoreResult<Vec<Event>> {
        let now = self.clock.now().to_wire();
        let query = Query::new()
            .gte("start_date", Bson::String(now))
            .order_by("start_date", Direction::Ascending);
        self.fetch(Table::Events, query).await
    }

    pub async fn get_event_by_id(&self, id: &str) -> StoreResult<Event> {
        self.fetch_one(Table::Events, id).await
    }

    pub async fn create_event(&self, input: &NewEvent) -> StoreResult<Event> {
        self.insert(Table::Events, input).await
    }

    pub async fn update_event(&self, id: &str, patch: &EventPatch) -> StoreResult<Event> {
        self.patch(Table::Events, id, patch).await
    }

    pub async fn delete_event(&self, id: &str) -> StoreResult<()> {
        self.store.delete(Table::Events, id).await
    }

    // =========================================================================
    // Contact submissions
    // =========================================================================

    pub async fn create_contact_submission(
        &self,
        input: &NewContactSubmission,
    ) -> StoreResult<ContactSubmission> {
        self.insert(Table::ContactSubmissions, input).await
    }
}
