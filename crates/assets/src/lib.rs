//! Hosted image storage.
//!
//! The catalog only needs two things from an asset host: upload bytes into a
//! logical folder and get back `(url, public_id)`, and delete by `public_id`.
//! [`AssetStore`] is that seam; backends live in the submodules.

pub mod cloudinary;
pub mod local;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use storefront_core::error::CoreError;

pub use cloudinary::{CloudinaryConfig, CloudinaryStore};
pub use local::LocalAssetStore;
pub use memory::MemoryAssetStore;

/// A file received from a client, not yet uploaded.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type,
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Where an uploaded asset ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef {
    /// Publicly reachable URL.
    pub url: String,
    /// Opaque handle required to delete the asset later.
    pub public_id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// The host answered but refused the request.
    #[error("Asset host rejected the request: {0}")]
    Rejected(String),

    #[error("Asset host request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Asset storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid asset handle: {0}")]
    InvalidHandle(String),
}

impl From<AssetError> for CoreError {
    fn from(err: AssetError) -> Self {
        CoreError::ExternalService(err.to_string())
    }
}

/// Upload and delete hosted images.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Upload `upload` into `folder`.
    async fn upload(&self, upload: &Upload, folder: &str) -> Result<AssetRef, AssetError>;

    /// Delete the asset behind `public_id`. `Ok(false)` when it did not exist.
    async fn delete(&self, public_id: &str) -> Result<bool, AssetError>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}
