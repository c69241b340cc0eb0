//! cesta-core: shopping-list types, cache and remote-store traits, and the
//! optimistic local-first reconciliation controller.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex, RwLock};
use std::thread::JoinHandle;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::warn;

pub type ItemId = String;

/// Cache keys shared with the mobile app; the values under them are the
/// on-device format and must stay stable.
pub const KEY_SHOPPING_LIST: &str = "shoppingList";
pub const KEY_CURRENT_USER: &str = "currentUser";
pub const KEY_USER_THEME: &str = "userTheme";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub completed: bool,
    pub quantity: u32,
    pub category: Category,
    /// Stored as unix milliseconds in the cached JSON.
    #[serde(with = "timestamp_ms")]
    pub created_at: OffsetDateTime,
    #[serde(default)]
    pub added_by: Option<String>,
}

impl Item {
    pub fn new<S: Into<String>>(
        id: ItemId,
        name: S,
        category: Category,
        added_by: Option<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            completed: false,
            quantity: 1,
            category,
            created_at: now_millis(),
            added_by,
        }
    }
}

/// Current time at millisecond precision, matching the cached JSON format
/// so a cache round-trip reproduces an equal Item.
fn now_millis() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    let ms = now.unix_timestamp_nanos() / 1_000_000;
    OffsetDateTime::from_unix_timestamp_nanos(ms * 1_000_000).unwrap_or(now)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Alimentos,
    Bebidas,
    Limpeza,
    Higiene,
    Hortifruti,
    Outros,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Alimentos => "Alimentos",
            Category::Bebidas => "Bebidas",
            Category::Limpeza => "Limpeza",
            Category::Higiene => "Higiene",
            Category::Hortifruti => "Hortifruti",
            Category::Outros => "Outros",
        };
        f.write_str(s)
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "alimentos" => Ok(Category::Alimentos),
            "bebidas" => Ok(Category::Bebidas),
            "limpeza" => Ok(Category::Limpeza),
            "higiene" => Ok(Category::Higiene),
            "hortifruti" => Ok(Category::Hortifruti),
            "outros" => Ok(Category::Outros),
            other => Err(format!(
                "unknown category '{other}' (expected Alimentos, Bebidas, Limpeza, Higiene, Hortifruti or Outros)"
            )),
        }
    }
}

/// The server-side row shape: snake_case names, `created_at` as RFC 3339.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRecord {
    pub id: String,
    pub name: String,
    pub completed: bool,
    pub quantity: u32,
    pub category: String,
    pub created_at: String,
    #[serde(default)]
    pub added_by: Option<String>,
}

impl RemoteRecord {
    /// Translate a server row into an Item. Rows are never dropped: an
    /// unparsable timestamp falls back to the epoch and an unknown category
    /// to `Outros`, both with a warning.
    pub fn into_item(self) -> Item {
        let created_at = match OffsetDateTime::parse(&self.created_at, &Rfc3339) {
            Ok(t) => t,
            Err(e) => {
                warn!(id = %self.id, error = %e, "bad created_at on remote record");
                OffsetDateTime::UNIX_EPOCH
            }
        };
        let category = match self.category.parse() {
            Ok(c) => c,
            Err(e) => {
                warn!(id = %self.id, %e, "bad category on remote record");
                Category::Outros
            }
        };
        Item {
            id: self.id,
            name: self.name,
            completed: self.completed,
            quantity: self.quantity.max(1),
            category,
            created_at,
            added_by: self.added_by,
        }
    }
}

impl From<&Item> for RemoteRecord {
    fn from(item: &Item) -> Self {
        let created_at = item
            .created_at
            .format(&Rfc3339)
            .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"));
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            completed: item.completed,
            quantity: item.quantity,
            category: item.category.to_string(),
            created_at,
            added_by: item.added_by.clone(),
        }
    }
}

/// Partial update body for remote `update`; absent fields are not sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct Query {
    pub contains: Option<String>,
    pub pending_only: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("remote store unavailable: {0}")]
    RemoteUnavailable(String),
    #[error("remote write failed: {0}")]
    RemoteWrite(String),
    #[error("completed items cannot be deleted; uncheck the item first")]
    DeleteRejected,
}

mod timestamp_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::OffsetDateTime;

    pub fn serialize<S: Serializer>(t: &OffsetDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64((t.unix_timestamp_nanos() / 1_000_000) as i64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<OffsetDateTime, D::Error> {
        let ms = i64::deserialize(d)?;
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000)
            .map_err(serde::de::Error::custom)
    }
}

fn gen_id() -> String {
    // Sortable time-derived id: epoch nanos in hex.
    let ns = OffsetDateTime::now_utc().unix_timestamp_nanos();
    format!("{:x}", ns)
}

pub trait Cache: Send + Sync {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
}

/// In-memory cache used by tests and remote-less runs.
#[derive(Default)]
pub struct MemCache {
    inner: RwLock<HashMap<String, String>>,
}

impl MemCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Cache for MemCache {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.inner.read().expect("poisoned").get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.inner
            .write()
            .expect("poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(feature = "sqlite")]
mod sqlite_cache {
    use super::Cache;
    use rusqlite::{params, Connection, OptionalExtension};
    use std::path::Path;
    use std::sync::Mutex;

    /// Durable key-value cache backed by SQLite.
    pub struct SqliteCache {
        conn: Mutex<Connection>,
    }

    impl SqliteCache {
        pub fn new<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
            let conn = Connection::open(path)?;
            let _ = conn.pragma_update(None, "journal_mode", "WAL");
            let _ = conn.busy_timeout(std::time::Duration::from_millis(5000));
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS kv (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
            )?;
            Ok(Self {
                conn: Mutex::new(conn),
            })
        }
    }

    impl Cache for SqliteCache {
        fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
            let conn = self.conn.lock().expect("poisoned");
            let v = conn
                .prepare("SELECT value FROM kv WHERE key = ?")?
                .query_row([key], |r| r.get(0))
                .optional()?;
            Ok(v)
        }

        fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
            let conn = self.conn.lock().expect("poisoned");
            conn.execute(
                "INSERT INTO kv(key, value) VALUES(?, ?)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )?;
            Ok(())
        }
    }
}

#[cfg(feature = "sqlite")]
pub use sqlite_cache::SqliteCache;

pub type OnChange = Box<dyn Fn() + Send + Sync>;

/// Handle for a remote change subscription. The listener is released on
/// `unsubscribe()` or when the handle is dropped.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

pub trait RemoteStore: Send + Sync {
    /// All rows, newest first.
    fn fetch_all(&self) -> Result<Vec<RemoteRecord>, Error>;
    fn insert(&self, record: &RemoteRecord) -> Result<(), Error>;
    /// Unknown ids silently match zero rows.
    fn update(&self, id: &str, patch: &ItemPatch) -> Result<(), Error>;
    fn delete(&self, id: &str) -> Result<(), Error>;
    /// `on_change` fires at least once per remote mutation, including the
    /// caller's own writes; ordering relative to local writes is unspecified.
    fn subscribe(&self, on_change: OnChange) -> Result<Subscription, Error>;
}

type Listeners = Arc<Mutex<Vec<(u64, Arc<dyn Fn() + Send + Sync>)>>>;

/// In-memory remote table with failure injection, used by tests and by the
/// CLI when no remote is configured.
#[derive(Default)]
pub struct MemRemote {
    rows: Mutex<Vec<RemoteRecord>>,
    offline: AtomicBool,
    fail_writes: AtomicBool,
    listeners: Listeners,
    next_listener: AtomicU64,
}

impl MemRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make reads fail with `RemoteUnavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Relaxed);
    }

    /// Make writes fail with `RemoteWrite`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> Vec<RemoteRecord> {
        self.rows.lock().expect("poisoned").clone()
    }

    fn check_write(&self) -> Result<(), Error> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(Error::RemoteWrite("injected write failure".into()));
        }
        Ok(())
    }

    fn notify(&self) {
        // Listeners run outside the registry lock so a callback may
        // subscribe or read without deadlocking.
        let listeners: Vec<Arc<dyn Fn() + Send + Sync>> = self
            .listeners
            .lock()
            .expect("poisoned")
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for cb in listeners {
            cb();
        }
    }
}

impl RemoteStore for MemRemote {
    fn fetch_all(&self) -> Result<Vec<RemoteRecord>, Error> {
        if self.offline.load(Ordering::Relaxed) {
            return Err(Error::RemoteUnavailable("remote is offline".into()));
        }
        let mut rows = self.rows.lock().expect("poisoned").clone();
        // RFC 3339 strings sort chronologically.
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    fn insert(&self, record: &RemoteRecord) -> Result<(), Error> {
        self.check_write()?;
        self.rows.lock().expect("poisoned").push(record.clone());
        self.notify();
        Ok(())
    }

    fn update(&self, id: &str, patch: &ItemPatch) -> Result<(), Error> {
        self.check_write()?;
        {
            let mut rows = self.rows.lock().expect("poisoned");
            if let Some(row) = rows.iter_mut().find(|r| r.id == id) {
                if let Some(name) = &patch.name {
                    row.name = name.clone();
                }
                if let Some(completed) = patch.completed {
                    row.completed = completed;
                }
                if let Some(quantity) = patch.quantity {
                    row.quantity = quantity;
                }
            }
        }
        self.notify();
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<(), Error> {
        self.check_write()?;
        self.rows.lock().expect("poisoned").retain(|r| r.id != id);
        self.notify();
        Ok(())
    }

    fn subscribe(&self, on_change: OnChange) -> Result<Subscription, Error> {
        let id = self.next_listener.fetch_add(1, Ordering::Relaxed);
        let cb: Arc<dyn Fn() + Send + Sync> = Arc::from(on_change);
        self.listeners.lock().expect("poisoned").push((id, cb));
        let listeners = Arc::clone(&self.listeners);
        Ok(Subscription::new(move || {
            listeners
                .lock()
                .expect("poisoned")
                .retain(|(i, _)| *i != id);
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Ready,
}

/// How a full reload resolved. A fallback means the remote was unreachable
/// and the caller should surface a non-fatal warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Fresh { count: usize },
    CacheFallback { count: usize },
}

/// Explicitly owned application state; user and theme live here rather than
/// as ambient globals. The theme blob is opaque to the core.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub items: Vec<Item>,
    pub current_user: String,
    pub theme: Option<serde_json::Value>,
    pub phase: Phase,
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Ready
    }
}

type PushJob = Box<dyn FnOnce() + Send>;

/// Background worker for remote pushes: runs them off the caller's thread,
/// one at a time in issue order. Dropping the queue lets the worker drain
/// its backlog and exit.
struct PushQueue {
    tx: Option<mpsc::Sender<PushJob>>,
    worker: Option<JoinHandle<()>>,
}

impl PushQueue {
    fn new() -> Self {
        let (tx, rx) = mpsc::channel::<PushJob>();
        let worker = std::thread::spawn(move || {
            for job in rx {
                job();
            }
        });
        Self {
            tx: Some(tx),
            worker: Some(worker),
        }
    }

    fn push(&self, job: PushJob) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(job);
        }
    }

    fn flush(&self) {
        let (done_tx, done_rx) = mpsc::channel();
        if let Some(tx) = &self.tx {
            if tx
                .send(Box::new(move || {
                    let _ = done_tx.send(());
                }))
                .is_ok()
            {
                let _ = done_rx.recv();
            }
        }
    }
}

impl Drop for PushQueue {
    fn drop(&mut self) {
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// The reconciliation core. Every mutation lands in memory and the cache
/// before returning; the matching remote write runs out-of-band on the push
/// queue, best-effort, exactly one attempt, never rolled back.
pub struct Controller<C: Cache> {
    remote: Arc<dyn RemoteStore>,
    cache: C,
    state: AppState,
    queue: PushQueue,
}

impl<C: Cache> Controller<C> {
    pub fn new(remote: Arc<dyn RemoteStore>, cache: C) -> Self {
        Self {
            remote,
            cache,
            state: AppState::default(),
            queue: PushQueue::new(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Full reload: replace the in-memory list with the remote result and
    /// overwrite the cache. Falls back to the cached list (or empty) when
    /// the remote is unreachable; never an error.
    pub fn load(&mut self) -> LoadOutcome {
        self.state.phase = Phase::Loading;
        match self.remote.fetch_all() {
            Ok(records) => {
                self.state.items = records.into_iter().map(RemoteRecord::into_item).collect();
                self.persist_list();
                self.state.phase = Phase::Ready;
                LoadOutcome::Fresh {
                    count: self.state.items.len(),
                }
            }
            Err(e) => {
                warn!(error = %e, "remote fetch failed; falling back to cached list");
                let count = self.load_cached();
                self.state.phase = Phase::Ready;
                LoadOutcome::CacheFallback { count }
            }
        }
    }

    /// Replace the in-memory list from the cache alone. Absent or corrupt
    /// cache yields an empty list.
    pub fn load_cached(&mut self) -> usize {
        self.state.items = match self.cache.get(KEY_SHOPPING_LIST) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "cached list is corrupt; starting empty");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "cache read failed");
                Vec::new()
            }
        };
        self.state.items.len()
    }

    /// Restore the saved profile (user and theme) from the cache.
    pub fn load_profile(&mut self) {
        match self.cache.get(KEY_CURRENT_USER) {
            Ok(Some(user)) if !user.is_empty() => self.state.current_user = user,
            Ok(_) => {}
            Err(e) => warn!(error = %e, "cache read failed for current user"),
        }
        match self.cache.get(KEY_USER_THEME) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(theme) => self.state.theme = Some(theme),
                Err(e) => warn!(error = %e, "cached theme is corrupt"),
            },
            Ok(None) => {}
            Err(e) => warn!(error = %e, "cache read failed for theme"),
        }
    }

    pub fn set_user(&mut self, user: &str, theme: Option<serde_json::Value>) {
        self.state.current_user = user.to_string();
        if let Err(e) = self.cache.set(KEY_CURRENT_USER, user) {
            warn!(error = %e, "cache write failed for current user");
        }
        if let Some(theme) = theme {
            match serde_json::to_string(&theme) {
                Ok(raw) => {
                    if let Err(e) = self.cache.set(KEY_USER_THEME, &raw) {
                        warn!(error = %e, "cache write failed for theme");
                    }
                }
                Err(e) => warn!(error = %e, "theme is not serializable"),
            }
            self.state.theme = Some(theme);
        }
    }

    /// Add an item; a blank name is silently rejected. The new item goes to
    /// the head of the list (most-recent-first base order).
    pub fn add(&mut self, name: &str, category: Category) -> Option<&Item> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let added_by = if self.state.current_user.is_empty() {
            None
        } else {
            Some(self.state.current_user.clone())
        };
        let item = Item::new(gen_id(), name, category, added_by);
        let record = RemoteRecord::from(&item);
        self.state.items.insert(0, item);
        self.persist_list();
        let remote = Arc::clone(&self.remote);
        self.spawn_push("insert", move || remote.insert(&record));
        Some(&self.state.items[0])
    }

    /// Flip the completed flag; unknown ids are a no-op.
    pub fn toggle(&mut self, id: &str) {
        let completed = {
            let Some(item) = self.state.items.iter_mut().find(|i| i.id == id) else {
                return;
            };
            item.completed = !item.completed;
            item.completed
        };
        self.persist_list();
        let remote = Arc::clone(&self.remote);
        let id = id.to_string();
        self.spawn_push("update", move || {
            remote.update(
                &id,
                &ItemPatch {
                    completed: Some(completed),
                    ..Default::default()
                },
            )
        });
    }

    /// Adjust quantity by `delta`, clamped so it never drops below 1.
    pub fn change_quantity(&mut self, id: &str, delta: i32) {
        let quantity = {
            let Some(item) = self.state.items.iter_mut().find(|i| i.id == id) else {
                return;
            };
            item.quantity = (i64::from(item.quantity) + i64::from(delta)).max(1) as u32;
            item.quantity
        };
        self.persist_list();
        let remote = Arc::clone(&self.remote);
        let id = id.to_string();
        self.spawn_push("update", move || {
            remote.update(
                &id,
                &ItemPatch {
                    quantity: Some(quantity),
                    ..Default::default()
                },
            )
        });
    }

    /// Rename an item; a blank replacement is a no-op.
    pub fn rename(&mut self, id: &str, new_name: &str) {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return;
        }
        {
            let Some(item) = self.state.items.iter_mut().find(|i| i.id == id) else {
                return;
            };
            item.name = new_name.to_string();
        }
        self.persist_list();
        let remote = Arc::clone(&self.remote);
        let id = id.to_string();
        let name = new_name.to_string();
        self.spawn_push("update", move || {
            remote.update(
                &id,
                &ItemPatch {
                    name: Some(name),
                    ..Default::default()
                },
            )
        });
    }

    /// Delete an item. Completed items are protected: they must be unchecked
    /// first. The error is a user-facing business rule, not a fault.
    pub fn delete(&mut self, id: &str) -> Result<(), Error> {
        if let Some(item) = self.state.items.iter().find(|i| i.id == id) {
            if item.completed {
                return Err(Error::DeleteRejected);
            }
        }
        self.state.items.retain(|i| i.id != id);
        self.persist_list();
        let remote = Arc::clone(&self.remote);
        let id = id.to_string();
        self.spawn_push("delete", move || remote.delete(&id));
        Ok(())
    }

    /// Derive the view list: filter, case-insensitive substring match, then
    /// incomplete-first / newest-first. Recomputed on every call.
    pub fn view(&self, q: &Query) -> Vec<&Item> {
        let needle = q.contains.as_ref().map(|s| s.to_lowercase());
        let mut out: Vec<&Item> = self
            .state
            .items
            .iter()
            .filter(|i| !q.pending_only || !i.completed)
            .filter(|i| match &needle {
                Some(s) => i.name.to_lowercase().contains(s),
                None => true,
            })
            .collect();
        out.sort_by_key(|i| (i.completed, Reverse(i.created_at)));
        out
    }

    /// Wait for all outstanding remote pushes to settle (one attempt each).
    pub fn flush(&self) {
        self.queue.flush();
    }

    fn persist_list(&self) {
        match serde_json::to_string(&self.state.items) {
            Ok(raw) => {
                if let Err(e) = self.cache.set(KEY_SHOPPING_LIST, &raw) {
                    warn!(error = %e, "cache write failed; list kept in memory only");
                }
            }
            Err(e) => warn!(error = %e, "list is not serializable"),
        }
    }

    fn spawn_push<F>(&self, op: &'static str, push: F)
    where
        F: FnOnce() -> Result<(), Error> + Send + 'static,
    {
        self.queue.push(Box::new(move || {
            if let Err(e) = push() {
                warn!(op, error = %e, "remote push failed; optimistic local state stands");
            }
        }));
    }
}

// Remote table over a PostgREST-style endpoint, with a polling change feed.
#[cfg(feature = "rest")]
pub mod rest {
    use super::{Error, ItemPatch, OnChange, RemoteRecord, RemoteStore, Subscription};
    use sha2::{Digest, Sha256};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    pub struct RestRemote {
        http: reqwest::blocking::Client,
        base_url: String,
        api_key: String,
        table: String,
        poll_interval: Duration,
    }

    impl RestRemote {
        pub fn new(
            base_url: &str,
            api_key: &str,
            table: Option<&str>,
            poll_interval: Duration,
        ) -> anyhow::Result<Self> {
            // No timeout override; the transport default stands.
            let http = reqwest::blocking::Client::builder().build()?;
            Ok(Self {
                http,
                base_url: base_url.trim_end_matches('/').to_string(),
                api_key: api_key.to_string(),
                table: table.unwrap_or("shopping_items").to_string(),
                poll_interval,
            })
        }

        fn endpoint(&self) -> String {
            format!("{}/rest/v1/{}", self.base_url, self.table)
        }

        fn auth(&self, rb: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
            rb.header("apikey", &self.api_key).bearer_auth(&self.api_key)
        }
    }

    impl RemoteStore for RestRemote {
        fn fetch_all(&self) -> Result<Vec<RemoteRecord>, Error> {
            let resp = self
                .auth(self.http.get(self.endpoint()))
                .query(&[("select", "*"), ("order", "created_at.desc")])
                .send()
                .and_then(|r| r.error_for_status())
                .map_err(|e| Error::RemoteUnavailable(e.to_string()))?;
            resp.json()
                .map_err(|e| Error::RemoteUnavailable(e.to_string()))
        }

        fn insert(&self, record: &RemoteRecord) -> Result<(), Error> {
            self.auth(self.http.post(self.endpoint()))
                .header("Prefer", "return=minimal")
                .json(&[record])
                .send()
                .and_then(|r| r.error_for_status())
                .map(|_| ())
                .map_err(|e| Error::RemoteWrite(e.to_string()))
        }

        fn update(&self, id: &str, patch: &ItemPatch) -> Result<(), Error> {
            self.auth(self.http.patch(self.endpoint()))
                .query(&[("id", format!("eq.{id}"))])
                .header("Prefer", "return=minimal")
                .json(patch)
                .send()
                .and_then(|r| r.error_for_status())
                .map(|_| ())
                .map_err(|e| Error::RemoteWrite(e.to_string()))
        }

        fn delete(&self, id: &str) -> Result<(), Error> {
            self.auth(self.http.delete(self.endpoint()))
                .query(&[("id", format!("eq.{id}"))])
                .send()
                .and_then(|r| r.error_for_status())
                .map(|_| ())
                .map_err(|e| Error::RemoteWrite(e.to_string()))
        }

        fn subscribe(&self, on_change: OnChange) -> Result<Subscription, Error> {
            let http = self.http.clone();
            let url = self.endpoint();
            let api_key = self.api_key.clone();
            let interval = self.poll_interval;
            let stop = Arc::new(AtomicBool::new(false));
            let stop_flag = Arc::clone(&stop);
            let handle = std::thread::spawn(move || {
                let mut last: Option<[u8; 32]> = None;
                while !stop_flag.load(Ordering::Relaxed) {
                    let fetched = http
                        .get(&url)
                        .header("apikey", &api_key)
                        .bearer_auth(&api_key)
                        .query(&[
                            ("select", "id,name,completed,quantity,category,created_at"),
                            ("order", "created_at.desc"),
                        ])
                        .send()
                        .and_then(|r| r.error_for_status())
                        .and_then(|r| r.text());
                    if let Ok(body) = fetched {
                        let digest: [u8; 32] = Sha256::digest(body.as_bytes()).into();
                        if let Some(prev) = last {
                            if prev != digest {
                                on_change();
                            }
                        }
                        last = Some(digest);
                    }
                    std::thread::sleep(interval);
                }
            });
            Ok(Subscription::new(move || {
                stop.store(true, Ordering::Relaxed);
                let _ = handle.join();
            }))
        }
    }
}
