#![allow(dead_code)]

use almanac::entry::{Entry, EntryId, HistoryRecord, OneOff};
use almanac::feed::FeedConfig;
use almanac::render::Templates;
use almanac::serve::{self, AppState, FeedSettings};
use almanac::store::{self, EntryStore, SqliteStore, SCHEMA};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

// 2020-06-01, 2021-01-01 and 2021-06-01, all at 00:00:00 UTC.
pub const JUNE_2020: EntryId = 1590969600;
pub const JAN_2021: EntryId = 1609459200;
pub const JUNE_2021: EntryId = 1622505600;

/// Three linked entries and one one-off page.
pub const FIXTURES: &str = "
INSERT INTO entry VALUES (1590969600, 'summer', 1609459200, 0, 'It was warm.', '');
INSERT INTO entry VALUES (1609459200, 'new year', 1622505600, 1590969600, 'One.\\nTwo.', 'a.png\\nb.png');
INSERT INTO entry VALUES (1622505600, 'later', 0, 1609459200, 'The most recent entry, which is long enough to be truncated in feeds.', '');
INSERT INTO oneoff VALUES ('about', 'About me', 'me.png');
";

pub const ENTRY_TEMPLATE: &str = "entry:{{.Title}}|{{.PrevPath}}|{{.NextPath}}|{{.Month}} {{.Day}} {{.Year}}|{{range .Content}}[{{.}}]{{end}}";
pub const LANDING_TEMPLATE: &str = "landing:{{.Title}}|{{.PrevPath}}";
pub const HISTORY_TEMPLATE: &str =
    "{{range .}}{{.Year}}:{{range .Metadata}}{{.Title}}={{.Path}};{{end}} {{end}}";

/// Opens a private in-memory database with the schema applied and `sql` run
/// against it.
pub async fn sqlite_store(sql: &str) -> SqliteStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::raw_sql(SCHEMA).execute(&pool).await.unwrap();
    sqlx::raw_sql(sql).execute(&pool).await.unwrap();
    SqliteStore::from_pool(pool)
}

pub fn feed_settings() -> FeedSettings {
    FeedSettings {
        identity: FeedConfig {
            title: "A Blog".to_owned(),
            link: "https://example.org".to_owned(),
            description: "Musings.".to_owned(),
            author: None,
            created: 1489554739,
        },
        recent_entries: 2,
        description_cutoff: 50,
    }
}

pub fn build_test_app(store: Arc<dyn EntryStore>) -> Router {
    let templates =
        Templates::from_sources(ENTRY_TEMPLATE, LANDING_TEMPLATE, HISTORY_TEMPLATE).unwrap();
    serve::router(AppState::new(store, templates, feed_settings()), None)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Wraps a store and counts every query made through it.
pub struct CountingStore {
    pub inner: SqliteStore,
    pub calls: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: SqliteStore) -> CountingStore {
        CountingStore {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn count(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl EntryStore for CountingStore {
    async fn get_entry(&self, id: Option<EntryId>) -> store::Result<Entry> {
        self.count();
        self.inner.get_entry(id).await
    }

    async fn get_one_off(&self, uid: &str) -> store::Result<OneOff> {
        self.count();
        self.inner.get_one_off(uid).await
    }

    async fn get_history(&self) -> store::Result<Vec<HistoryRecord>> {
        self.count();
        self.inner.get_history().await
    }

    async fn get_recent(&self, limit: usize) -> store::Result<Vec<Entry>> {
        self.count();
        self.inner.get_recent(limit).await
    }

    async fn health_check(&self) -> store::Result<()> {
        self.inner.health_check().await
    }
}
