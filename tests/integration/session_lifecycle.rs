//! Integration tests for the session store lifecycle.
//!
//! Login, logout and restart against both the in-memory and file-backed
//! slots, including recovery from damaged snapshots.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use taskflow::config::SessionConfig;
use taskflow::session::{CredentialTable, SHARED_PASSWORD, SessionStore};
use taskflow::storage::{FileStore, KeyValueStore, MemoryStore};
use taskflow_proto::codec::{decode_identity, encode_identity};
use taskflow_proto::identity::Role;

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

fn config() -> SessionConfig {
    SessionConfig::default()
}

/// Unique scratch directory, removed when dropped.
struct TempDir(PathBuf);

impl TempDir {
    fn new() -> Self {
        Self(std::env::temp_dir().join(format!("taskflow-session-{}", uuid::Uuid::now_v7())))
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

// ===========================================================================
// Credential checks
// ===========================================================================

#[tokio::test(start_paused = true)]
async fn every_table_entry_logs_in_with_shared_password() {
    let table = CredentialTable::builtin();
    for entry in table.entries() {
        let store = SessionStore::restore(MemoryStore::new(), &config());
        assert!(store.login(&entry.email, SHARED_PASSWORD).await, "{}", entry.email);
        assert_eq!(store.current_user().as_ref(), Some(entry));
    }
}

#[tokio::test(start_paused = true)]
async fn rejected_pairs_never_change_identity() {
    let store = SessionStore::restore(MemoryStore::new(), &config());
    let attempts = [
        ("admin@taskflow.com", "Password"),
        ("admin@taskflow.com", ""),
        ("ADMIN@taskflow.com", "password"),
        ("", "password"),
        ("ghost@taskflow.com", "password"),
    ];

    for (email, password) in attempts {
        assert!(!store.login(email, password).await, "{email}/{password}");
        assert!(store.current_user().is_none());
    }

    assert!(store.login("manager@taskflow.com", "password").await);
    let manager = store.current_user();
    for (email, password) in attempts {
        assert!(!store.login(email, password).await);
        assert_eq!(store.current_user(), manager);
    }
}

#[tokio::test(start_paused = true)]
async fn second_login_replaces_identity() {
    let store = SessionStore::restore(MemoryStore::new(), &config());
    store.login("user@taskflow.com", "password").await;
    store.login("admin@taskflow.com", "password").await;
    assert_eq!(store.current_user().unwrap().role, Role::Admin);
}

#[tokio::test(start_paused = true)]
async fn concurrent_logins_keep_loading_until_all_settle() {
    let store = SessionStore::restore(
        MemoryStore::new(),
        &SessionConfig {
            login_delay: Duration::from_millis(500),
            ..config()
        },
    );
    let (a, b) = tokio::join!(
        store.login("admin@taskflow.com", "password"),
        store.login("admin@taskflow.com", "nope"),
    );
    assert!(a);
    assert!(!b);
    assert!(!store.is_loading());
    assert!(store.is_authenticated());
}

// ===========================================================================
// Persistence across restarts
// ===========================================================================

#[tokio::test(start_paused = true)]
async fn file_slot_survives_restart() {
    let tmp = TempDir::new();
    let store = SessionStore::restore(FileStore::new(&tmp.0), &config());
    assert!(store.login("admin@taskflow.com", "password").await);
    let identity = store.current_user().unwrap();
    drop(store);

    let path = tmp.0.join("taskflow_user.json");
    let raw = std::fs::read_to_string(&path).unwrap();
    assert_eq!(decode_identity(&raw).unwrap(), identity);

    let restarted = SessionStore::restore(FileStore::new(&tmp.0), &config());
    assert_eq!(restarted.current_user(), Some(identity));
}

#[tokio::test(start_paused = true)]
async fn logout_then_restart_is_unauthenticated() {
    let tmp = TempDir::new();
    let store = SessionStore::restore(FileStore::new(&tmp.0), &config());
    store.login("user@taskflow.com", "password").await;
    store.logout();
    drop(store);

    assert!(!tmp.0.join("taskflow_user.json").exists());
    let restarted = SessionStore::restore(FileStore::new(&tmp.0), &config());
    assert!(!restarted.is_authenticated());
}

#[test]
fn corrupt_file_snapshot_is_treated_as_logged_out() {
    let tmp = TempDir::new();
    let slot = FileStore::new(&tmp.0);
    slot.set("taskflow_user", r#"{"id":"1","email":"admin@taskflow.com"}"#)
        .unwrap();

    let store = SessionStore::restore(slot.clone(), &config());
    assert!(!store.is_authenticated());
    assert_eq!(slot.get("taskflow_user").unwrap(), None);
}

#[test]
fn snapshot_written_elsewhere_is_restored_verbatim() {
    let table = CredentialTable::builtin();
    let mut identity = table.find("manager@taskflow.com").cloned().unwrap();
    identity.avatar = None;

    let slot = Arc::new(MemoryStore::new());
    slot.set("taskflow_user", &encode_identity(&identity).unwrap())
        .unwrap();

    let store = SessionStore::restore(slot, &config());
    assert_eq!(store.current_user(), Some(identity));
}

#[tokio::test(start_paused = true)]
async fn custom_storage_key_is_isolated() {
    let slot = Arc::new(MemoryStore::new());
    let custom = SessionConfig {
        storage_key: "other_app".to_string(),
        ..config()
    };

    let store = SessionStore::restore(slot.clone(), &custom);
    store.login("admin@taskflow.com", "password").await;

    assert!(slot.get("other_app").unwrap().is_some());
    let default_store = SessionStore::restore(slot, &config());
    assert!(!default_store.is_authenticated());
}

#[tokio::test(start_paused = true)]
async fn subscribers_observe_login_and_logout() {
    let store = SessionStore::restore(MemoryStore::new(), &config());
    let mut rx = store.subscribe();

    store.login("user@taskflow.com", "password").await;
    assert!(rx.borrow_and_update().is_authenticated());

    store.logout();
    assert!(rx.has_changed().unwrap());
    assert!(!rx.borrow_and_update().is_authenticated());
}
