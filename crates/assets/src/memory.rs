//! In-memory backend that records recent calls. Used by tests and by demo
//! deployments without an asset host.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{AssetError, AssetRef, AssetStore, Upload};

/// How many uploads and deletes each history keeps; older entries are
/// dropped so a long-running demo server stays bounded.
pub const HISTORY_LIMIT: usize = 1024;

#[derive(Default)]
struct Calls {
    next: u64,
    live: HashSet<String>,
    uploads: VecDeque<AssetRef>,
    deletes: VecDeque<String>,
    fail_filename: Option<String>,
    fail_deletes: bool,
}

#[derive(Default)]
pub struct MemoryAssetStore {
    calls: Mutex<Calls>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later upload of a file named `filename` fail.
    pub fn fail_uploads_named(&self, filename: impl Into<String>) {
        self.lock().fail_filename = Some(filename.into());
    }

    /// Make every later delete fail.
    pub fn fail_deletes(&self) {
        self.lock().fail_deletes = true;
    }

    /// The last [`HISTORY_LIMIT`] successful uploads, in call order.
    pub fn uploads(&self) -> Vec<AssetRef> {
        self.lock().uploads.iter().cloned().collect()
    }

    /// The last [`HISTORY_LIMIT`] delete calls' handles, in call order
    /// (including failed ones).
    pub fn deletes(&self) -> Vec<String> {
        self.lock().deletes.iter().cloned().collect()
    }

    /// Handles uploaded and not yet deleted.
    pub fn live(&self) -> HashSet<String> {
        self.lock().live.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Calls> {
        // A poisoned lock only means another test thread panicked mid-call.
        self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn record<T>(history: &mut VecDeque<T>, entry: T) {
    if history.len() == HISTORY_LIMIT {
        history.pop_front();
    }
    history.push_back(entry);
}

#[async_trait]
impl AssetStore for MemoryAssetStore {
    async fn upload(&self, upload: &Upload, folder: &str) -> Result<AssetRef, AssetError> {
        let mut calls = self.lock();
        if calls.fail_filename.as_deref() == Some(upload.filename.as_str()) {
            return Err(AssetError::Rejected(format!(
                "Upload of '{}' refused",
                upload.filename
            )));
        }
        calls.next += 1;
        let public_id = format!("{folder}/asset-{}", calls.next);
        let asset = AssetRef {
            url: format!("memory://{public_id}"),
            public_id,
        };
        calls.live.insert(asset.public_id.clone());
        record(&mut calls.uploads, asset.clone());
        Ok(asset)
    }

    async fn delete(&self, public_id: &str) -> Result<bool, AssetError> {
        let mut calls = self.lock();
        record(&mut calls.deletes, public_id.to_string());
        if calls.fail_deletes {
            return Err(AssetError::Rejected(format!("Delete of '{public_id}' refused")));
        }
        Ok(calls.live.remove(public_id))
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_uploads_and_deletes() {
        let store = MemoryAssetStore::new();
        let a = store
            .upload(&Upload::new("a.jpg", None, vec![1]), "products")
            .await
            .unwrap();
        assert_eq!(a.public_id, "products/asset-1");
        assert!(store.live().contains(&a.public_id));

        assert!(store.delete(&a.public_id).await.unwrap());
        assert!(!store.delete(&a.public_id).await.unwrap());
        assert_eq!(store.deletes().len(), 2);
        assert!(store.live().is_empty());
    }

    #[tokio::test]
    async fn history_is_bounded() {
        let store = MemoryAssetStore::new();
        for _ in 0..HISTORY_LIMIT + 5 {
            let asset = store
                .upload(&Upload::new("a.jpg", None, vec![1]), "products")
                .await
                .unwrap();
            store.delete(&asset.public_id).await.unwrap();
        }
        let uploads = store.uploads();
        assert_eq!(uploads.len(), HISTORY_LIMIT);
        assert_eq!(uploads[0].public_id, "products/asset-6");
        assert_eq!(store.deletes().len(), HISTORY_LIMIT);
        assert!(store.live().is_empty());
    }

    #[tokio::test]
    async fn configured_failures() {
        let store = MemoryAssetStore::new();
        store.fail_uploads_named("bad.jpg");
        assert!(store
            .upload(&Upload::new("bad.jpg", None, vec![1]), "x")
            .await
            .is_err());
        assert!(store.uploads().is_empty());

        store.fail_deletes();
        assert!(store.delete("x/asset-1").await.is_err());
    }
}
