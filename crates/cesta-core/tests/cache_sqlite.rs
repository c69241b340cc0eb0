#![cfg(feature = "sqlite")]
use cesta_core::{Cache, SqliteCache, KEY_CURRENT_USER, KEY_SHOPPING_LIST};
use tempfile::tempdir;

#[test]
fn kv_set_get_and_overwrite() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("cesta.db");
    let cache = SqliteCache::new(&db).expect("cache");

    assert_eq!(cache.get(KEY_SHOPPING_LIST).unwrap(), None);
    cache.set(KEY_SHOPPING_LIST, "[]").unwrap();
    assert_eq!(cache.get(KEY_SHOPPING_LIST).unwrap().as_deref(), Some("[]"));

    // wholesale overwrite, no history
    cache.set(KEY_SHOPPING_LIST, "[{\"id\":\"1\"}]").unwrap();
    assert_eq!(
        cache.get(KEY_SHOPPING_LIST).unwrap().as_deref(),
        Some("[{\"id\":\"1\"}]")
    );
}

#[test]
fn values_survive_reopen() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("cesta.db");
    {
        let cache = SqliteCache::new(&db).expect("cache");
        cache.set(KEY_CURRENT_USER, "Daniel").unwrap();
    }
    let reopened = SqliteCache::new(&db).expect("cache");
    assert_eq!(
        reopened.get(KEY_CURRENT_USER).unwrap().as_deref(),
        Some("Daniel")
    );
}
