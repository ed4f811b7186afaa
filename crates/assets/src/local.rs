//! Local-disk backend. Files land under `root/<folder>/<uuid>.<ext>` and are
//! served by the API under `public_base`.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use storefront_core::image::file_extension;

use crate::{AssetError, AssetRef, AssetStore, Upload};

pub struct LocalAssetStore {
    root: PathBuf,
    public_base: String,
}

impl LocalAssetStore {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a handle to a path inside `root`, rejecting anything that
    /// could escape it.
    fn resolve(&self, public_id: &str) -> Result<PathBuf, AssetError> {
        let relative = Path::new(public_id);
        let safe = !public_id.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(AssetError::InvalidHandle(public_id.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

fn sanitize_folder(folder: &str) -> String {
    folder
        .split('/')
        .filter(|seg| !seg.is_empty() && *seg != "." && *seg != "..")
        .collect::<Vec<_>>()
        .join("/")
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    async fn upload(&self, upload: &Upload, folder: &str) -> Result<AssetRef, AssetError> {
        let ext = file_extension(&upload.filename).unwrap_or_else(|| "bin".to_string());
        let folder = sanitize_folder(folder);
        let public_id = if folder.is_empty() {
            format!("{}.{ext}", uuid::Uuid::new_v4())
        } else {
            format!("{folder}/{}.{ext}", uuid::Uuid::new_v4())
        };

        let path = self.resolve(&public_id)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &upload.bytes).await?;

        tracing::debug!(public_id = %public_id, bytes = upload.len(), "Stored asset on disk");
        Ok(AssetRef {
            url: format!("{}/{public_id}", self.public_base),
            public_id,
        })
    }

    async fn delete(&self, public_id: &str) -> Result<bool, AssetError> {
        let path = self.resolve(public_id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn backend(&self) -> &'static str {
        "local"
    }
}
