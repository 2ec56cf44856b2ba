//! LMDB defaults store tests

use scopegate::{
    DefaultPermission, DefaultsStore, PbacDefaults, RoleDefaults, ScopeEntry, ScopeKind, ScopeResolver, User,
};
use tempfile::TempDir;

fn setup() -> (TempDir, DefaultsStore) {
    let dir = TempDir::new().unwrap();
    let store = DefaultsStore::open(dir.path()).unwrap();
    (dir, store)
}

fn submitter() -> RoleDefaults {
    RoleDefaults::new(
        "Submitter",
        vec![
            DefaultPermission::new("data_submission:view", &["own"], &[]),
            DefaultPermission::new("data_submission:create", &["study"], &[]),
        ],
    )
}

fn admin() -> RoleDefaults {
    RoleDefaults::new("Admin", vec![DefaultPermission::new("data_submission:view", &["all"], &[])])
}

#[test]
fn put_get_remove() {
    let (_dir, store) = setup();
    store.put_defaults(&submitter()).unwrap();
    assert_eq!(store.get_role("Submitter").unwrap(), Some(submitter()));
    assert_eq!(store.get_role("Admin").unwrap(), None);
    assert!(store.remove_defaults("Submitter").unwrap());
    assert!(!store.remove_defaults("Submitter").unwrap());
    assert_eq!(store.get_role("Submitter").unwrap(), None);
}

#[test]
fn seed_replaces_everything() {
    let (_dir, store) = setup();
    store.put_defaults(&RoleDefaults::new("User", vec![])).unwrap();
    store.seed(&[submitter(), admin()]).unwrap();
    let roles: Vec<String> = store.list_roles().unwrap().into_iter().map(|r| r.role).collect();
    assert_eq!(roles, vec!["Admin", "Submitter"]);
    store.clear().unwrap();
    assert!(store.list_roles().unwrap().is_empty());
}

#[test]
fn transact_batches_writes() {
    let (_dir, store) = setup();
    store
        .transact(|tx| {
            tx.put_defaults(&submitter())?;
            assert!(tx.get_defaults("Submitter")?.is_some());
            tx.put_defaults(&admin())
        })
        .unwrap();
    assert_eq!(store.list_roles().unwrap().len(), 2);
}

#[test]
fn reopen_keeps_data() {
    let dir = TempDir::new().unwrap();
    DefaultsStore::open(dir.path()).unwrap().put_defaults(&admin()).unwrap();
    let store = DefaultsStore::open(dir.path()).unwrap();
    assert_eq!(store.get_role("Admin").unwrap(), Some(admin()));
}

#[tokio::test]
async fn provider_returns_requested_roles_only() {
    let (_dir, store) = setup();
    store.seed(&[submitter(), admin()]).unwrap();
    let got = store.get_defaults(&["Admin".to_string(), "Nobody".to_string()]).await.unwrap();
    assert_eq!(got, vec![admin()]);
    assert!(store.get_defaults(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn resolver_over_store() {
    let (_dir, store) = setup();
    store.seed(&[submitter()]).unwrap();
    let resolver = ScopeResolver::new(store.clone());

    let user = User::new("u1", "Submitter")
        .with_permissions(["data_submission:view", "data_submission:create"])
        .with_studies(["S1"]);
    assert_eq!(
        resolver.resolve(Some(&user), "data_submission:view").await,
        vec![ScopeEntry::new(ScopeKind::Own, vec![])]
    );
    assert_eq!(
        resolver.resolve(Some(&user), "data_submission:create").await,
        vec![ScopeEntry::new(ScopeKind::Study, vec!["S1".into()])]
    );

    store.remove_defaults("Submitter").unwrap();
    assert_eq!(resolver.resolve(Some(&user), "data_submission:view").await, vec![ScopeEntry::none()]);
}

/// Writes and listings run off the async executor on a cloned handle
#[tokio::test(flavor = "current_thread")]
async fn blocking_handle_from_async_context() {
    let (_dir, store) = setup();
    let writer = store.clone();
    tokio::task::spawn_blocking(move || writer.put_defaults(&admin()))
        .await
        .unwrap()
        .unwrap();

    let reader = store.clone();
    let listed = tokio::task::spawn_blocking(move || reader.list_roles()).await.unwrap().unwrap();
    assert_eq!(listed, vec![admin()]);
}
