//! Worker Module Tests
//!
//! Validates the durable store: persistence layout, restart visibility,
//! idempotent writes, and per-key write serialization.

#[cfg(test)]
mod tests {
    use crate::worker::store::KeyStore;
    use std::sync::Arc;

    // ============================================================
    // STORE BASICS
    // ============================================================

    #[tokio::test]
    async fn test_store_put_and_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::open(dir.path()).await.unwrap();

        store.put("demo-key", "v1").await.unwrap();

        assert_eq!(store.get("demo-key"), Some("v1".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_store_get_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::open(dir.path()).await.unwrap();

        assert_eq!(store.get("nonexistent"), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_store_overwrite_is_last_writer_wins() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::open(dir.path()).await.unwrap();

        store.put("demo-key", "old").await.unwrap();
        store.put("demo-key", "new").await.unwrap();

        assert_eq!(store.get("demo-key"), Some("new".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_store_repeated_put_is_idempotent() {
        // Replication and pull may redeliver the same (key, value).
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::open(dir.path()).await.unwrap();

        store.put("demo-key", "v1").await.unwrap();
        store.put("demo-key", "v1").await.unwrap();
        store.put("demo-key", "v1").await.unwrap();

        assert_eq!(store.get("demo-key"), Some("v1".to_string()));
        assert_eq!(store.keys(), vec!["demo-key".to_string()]);
    }

    // ============================================================
    // PERSISTENCE LAYOUT
    // ============================================================

    #[tokio::test]
    async fn test_store_writes_json_envelope_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::open(dir.path()).await.unwrap();

        store.put("demo-key", "v1").await.unwrap();

        let raw = std::fs::read_to_string(dir.path().join("demo-key")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["value"], "v1");
    }

    #[tokio::test]
    async fn test_store_encodes_unsafe_keys_in_filenames() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::open(dir.path()).await.unwrap();

        let key = "user profile/2024?lang=pl&x=ą";
        store.put(key, "v1").await.unwrap();

        // No raw separator may reach the filesystem.
        for entry in std::fs::read_dir(dir.path()).unwrap() {
            let name = entry.unwrap().file_name();
            assert!(!name.to_string_lossy().contains('/'));
            assert!(!name.to_string_lossy().contains(' '));
        }

        drop(store);
        let reopened = KeyStore::open(dir.path()).await.unwrap();
        assert_eq!(
            reopened.get(key),
            Some("v1".to_string()),
            "Encoded filename must decode back to the original key"
        );
    }

    // ============================================================
    // RESTART VISIBILITY
    // ============================================================

    #[tokio::test]
    async fn test_store_reload_after_restart() {
        let dir = tempfile::tempdir().unwrap();

        {
            let store = KeyStore::open(dir.path()).await.unwrap();
            store.put("persist-test", "p").await.unwrap();
            store.put("other", "q").await.unwrap();
        }

        let reopened = KeyStore::open(dir.path()).await.unwrap();
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.get("persist-test"), Some("p".to_string()));
        assert_eq!(reopened.get("other"), Some("q".to_string()));
    }

    #[tokio::test]
    async fn test_store_open_discards_tmp_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("half-written.tmp"), "{\"value\":").unwrap();

        let store = KeyStore::open(dir.path()).await.unwrap();

        assert!(store.is_empty(), "Interrupted writes must not surface as keys");
        assert!(
            !dir.path().join("half-written.tmp").exists(),
            "Leftover temp file is cleaned up"
        );
    }

    #[tokio::test]
    async fn test_store_skips_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad"), "not-json").unwrap();
        std::fs::write(dir.path().join("good"), "{\"value\":\"v\"}").unwrap();

        let store = KeyStore::open(dir.path()).await.unwrap();

        assert_eq!(store.len(), 1, "Corrupt artifacts are skipped, not fatal");
        assert_eq!(store.get("good"), Some("v".to_string()));
    }

    // ============================================================
    // DELETE
    // ============================================================

    #[tokio::test]
    async fn test_store_remove_deletes_file_and_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::open(dir.path()).await.unwrap();

        store.put("demo-key", "v1").await.unwrap();
        assert!(store.remove("demo-key").await.unwrap());

        assert_eq!(store.get("demo-key"), None);
        assert!(!dir.path().join("demo-key").exists());

        assert!(
            !store.remove("demo-key").await.unwrap(),
            "Removing an absent key is a no-op"
        );
    }

    // ============================================================
    // WRITE SERIALIZATION
    // ============================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_same_key_writes_keep_file_and_map_aligned() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(KeyStore::open(dir.path()).await.unwrap());

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.put("contended", &format!("v{}", i)).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let in_memory = store.get("contended").unwrap();
        let raw = std::fs::read_to_string(dir.path().join("contended")).unwrap();
        let on_disk: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            on_disk["value"], in_memory,
            "Per-key locking must keep the file and the map in step"
        );
    }
}
