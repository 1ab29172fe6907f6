//! Integration tests for the flat-file account store

use adboard::models::StoredAccount;
use adboard::storage::{AccountStore, FileAccountStore};
use std::path::PathBuf;

fn temp_store_path(tag: &str) -> PathBuf {
    let unique = format!(
        "adboard-{tag}-{}-{}.json",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    );
    std::env::temp_dir().join(unique)
}

fn account(id: &str, token: &str) -> StoredAccount {
    StoredAccount {
        account_id: id.to_string(),
        name: format!("Account {id}"),
        access_token: token.to_string(),
        token_expires_at: Some(1_900_000_000),
    }
}

#[tokio::test]
async fn upsert_list_and_remove_round_trip() {
    let path = temp_store_path("roundtrip");
    let store = FileAccountStore::new(&path);
    store.init().await.expect("init on a missing file succeeds");

    store.upsert(account("act_111", "tok-a")).await.unwrap();
    store.upsert(account("act_222", "tok-b")).await.unwrap();

    let all = store.list().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].account_id, "act_111");

    assert!(store.remove("act_111").await.unwrap());
    assert!(!store.remove("act_111").await.unwrap());
    assert_eq!(store.list().await.unwrap().len(), 1);

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn persisted_accounts_survive_a_reload() {
    let path = temp_store_path("reload");

    {
        let store = FileAccountStore::new(&path);
        store.init().await.unwrap();
        store.upsert(account("act_333", "tok-c")).await.unwrap();
    }

    let reloaded = FileAccountStore::new(&path);
    reloaded.init().await.expect("existing file loads");
    let fetched = reloaded.get("act_333").await.unwrap();
    assert_eq!(fetched.map(|a| a.access_token), Some("tok-c".to_string()));

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn resolve_token_distinguishes_missing_accounts() {
    let path = temp_store_path("resolve");
    let store = FileAccountStore::new(&path);
    store.init().await.unwrap();
    store.upsert(account("act_444", "tok-d")).await.unwrap();

    assert_eq!(
        store.resolve_token("act_444").await.unwrap(),
        Some("tok-d".to_string())
    );
    // absence is a defined outcome, not an error
    assert_eq!(store.resolve_token("act_999").await.unwrap(), None);

    let _ = std::fs::remove_file(&path);
}
