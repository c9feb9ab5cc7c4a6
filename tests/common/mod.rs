//! Shared fixtures for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use commonground::actions::ContentActions;
use commonground::auth::{CurrentUser, DemoGate};
use commonground::cache::RecordingRevalidator;
use commonground::content::{ContentRepository, FixedClock};
use commonground::db::{MemoryRowStore, Query, Row, RowStore, StoreError, StoreResult, Table};
use commonground::models::Timestamp;

pub const DEMO_EMAIL: &str = "demo@commonground.org";
pub const STAFF_EMAIL: &str = "staff@commonground.org";

/// Memory store that counts calls, records update patches, and can be told
/// to fail every call with a given error.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryRowStore,
    calls: AtomicUsize,
    updates: Mutex<Vec<Row>>,
    inserts: Mutex<Vec<Row>>,
    fail_with: Mutex<Option<StoreError>>,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fail_with(&self, err: StoreError) {
        *self.fail_with.lock().unwrap() = Some(err);
    }

    pub fn last_update(&self) -> Option<Row> {
        self.updates.lock().unwrap().last().cloned()
    }

    pub fn last_insert(&self) -> Option<Row> {
        self.inserts.lock().unwrap().last().cloned()
    }

    pub fn inner(&self) -> &MemoryRowStore {
        &self.inner
    }

    fn enter(&self) -> StoreResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.fail_with.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RowStore for CountingStore {
    async fn select(&self, table: Table, query: &Query) -> StoreResult<Vec<Row>> {
        self.enter()?;
        self.inner.select(table, query).await
    }

    async fn select_by_id(&self, table: Table, id: &str) -> StoreResult<Row> {
        self.enter()?;
        self.inner.select_by_id(table, id).await
    }

    async fn insert(&self, table: Table, row: Row) -> StoreResult<Row> {
        self.enter()?;
        self.inserts.lock().unwrap().push(row.clone());
        self.inner.insert(table, row).await
    }

    async fn update(&self, table: Table, id: &str, patch: Row) -> StoreResult<Row> {
        self.enter()?;
        self.updates.lock().unwrap().push(patch.clone());
        self.inner.update(table, id, patch).await
    }

    async fn delete(&self, table: Table, id: &str) -> StoreResult<()> {
        self.enter()?;
        self.inner.delete(table, id).await
    }
}

pub struct Harness {
    pub actions: ContentActions,
    pub repo: ContentRepository,
    pub store: Arc<CountingStore>,
    pub admin_store: Arc<CountingStore>,
    pub revalidator: Arc<RecordingRevalidator>,
    pub clock: Arc<FixedClock>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_demo(Some(DEMO_EMAIL))
    }

    pub fn with_demo(demo_email: Option<&str>) -> Self {
        let store = Arc::new(CountingStore::new());
        let admin_store = Arc::new(CountingStore::new());
        let revalidator = Arc::new(RecordingRevalidator::new());
        let clock = Arc::new(FixedClock::new(Timestamp::now()));

        let repo = ContentRepository::with_clock(store.clone(), clock.clone());
        let admin_repo = ContentRepository::with_clock(admin_store.clone(), clock.clone());
        let actions = ContentActions::new(
            repo.clone(),
            admin_repo,
            DemoGate::new(demo_email.map(str::to_string)),
            revalidator.clone(),
        );

        Self {
            actions,
            repo,
            store,
            admin_store,
            revalidator,
            clock,
        }
    }
}

pub fn staff() -> CurrentUser {
    CurrentUser::authenticated("staff-id", Some(STAFF_EMAIL.to_string()))
}

pub fn demo() -> CurrentUser {
    CurrentUser::authenticated("demo-id", Some(DEMO_EMAIL.to_string()))
}
