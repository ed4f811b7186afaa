//! Keeping an entity's image references consistent with the asset store.
//!
//! Writes that add images upload first, persist second, and release the
//! assets that became stale last. When the persist step fails the fresh
//! uploads are released instead, so neither path leaves orphans behind.

use std::sync::Arc;

use storefront_assets::{AssetRef, AssetStore, Upload};
use storefront_core::error::{CoreError, CoreResult};
use storefront_core::image::{plan_image_update, validate_image_upload, ImageAction};

/// Outcome of applying the single-image policy to one field.
#[derive(Debug, Clone)]
pub struct ImageChange {
    pub action: ImageAction,
    /// The freshly attached asset for `Replace`.
    pub uploaded: Option<AssetRef>,
    /// Handle to release once the write is persisted.
    pub stale: Option<String>,
}

impl ImageChange {
    /// Write the new state into an entity's `(url, public_id)` pair.
    pub fn apply(&self, url: &mut Option<String>, public_id: &mut Option<String>) {
        match self.action {
            ImageAction::Replace => {
                if let Some(asset) = &self.uploaded {
                    *url = Some(asset.url.clone());
                    *public_id = Some(asset.public_id.clone());
                }
            }
            ImageAction::Clear => {
                *url = None;
                *public_id = None;
            }
            ImageAction::Keep | ImageAction::Nothing => {}
        }
    }
}

#[derive(Clone)]
pub struct ImageAttachment {
    assets: Arc<dyn AssetStore>,
    max_upload_bytes: usize,
}

impl ImageAttachment {
    pub fn new(assets: Arc<dyn AssetStore>, max_upload_bytes: usize) -> Self {
        Self {
            assets,
            max_upload_bytes,
        }
    }

    /// Reject files the asset store should never see.
    pub fn validate(&self, upload: &Upload) -> CoreResult<()> {
        validate_image_upload(
            &upload.filename,
            upload.content_type.as_deref(),
            upload.len(),
            self.max_upload_bytes,
        )
    }

    /// Upload one file into `folder`.
    pub async fn attach(&self, upload: &Upload, folder: &str) -> CoreResult<AssetRef> {
        self.validate(upload)?;
        self.assets.upload(upload, folder).await.map_err(|e| {
            tracing::error!(
                filename = %upload.filename,
                folder,
                backend = self.assets.backend(),
                error = %e,
                "Image upload failed"
            );
            CoreError::from(e)
        })
    }

    /// Upload a batch in order, all or nothing.
    ///
    /// Every file is validated before any upload starts. If one upload fails,
    /// the ones already attached are released and its error is returned.
    pub async fn attach_all(&self, uploads: &[Upload], folder: &str) -> CoreResult<Vec<AssetRef>> {
        for upload in uploads {
            self.validate(upload)?;
        }

        let mut attached = Vec::with_capacity(uploads.len());
        for upload in uploads {
            match self.attach(upload, folder).await {
                Ok(asset) => attached.push(asset),
                Err(err) => {
                    self.release_assets(&attached).await;
                    return Err(err);
                }
            }
        }
        Ok(attached)
    }

    /// Best-effort delete. Failures are logged and swallowed.
    pub async fn release(&self, public_id: &str) {
        if public_id.is_empty() {
            return;
        }
        match self.assets.delete(public_id).await {
            Ok(true) => tracing::debug!(public_id, "Released image asset"),
            Ok(false) => tracing::warn!(public_id, "Image asset was already gone"),
            Err(e) => tracing::warn!(
                public_id,
                backend = self.assets.backend(),
                error = %e,
                "Failed to release image asset"
            ),
        }
    }

    pub async fn release_all(&self, handles: &[String]) {
        for handle in handles {
            self.release(handle).await;
        }
    }

    /// Release freshly uploaded assets after a failed write.
    pub async fn release_assets(&self, assets: &[AssetRef]) {
        for asset in assets {
            self.release(&asset.public_id).await;
        }
    }

    /// Attach `upload` as the replacement for `current`.
    ///
    /// The new asset is attached first; `current` is reported back as stale
    /// so the caller releases it only after the entity points at the new one.
    pub async fn replace(
        &self,
        current: Option<&str>,
        upload: &Upload,
        folder: &str,
    ) -> CoreResult<ImageChange> {
        let asset = self.attach(upload, folder).await?;
        Ok(ImageChange {
            action: ImageAction::Replace,
            uploaded: Some(asset),
            stale: current.map(str::to_string),
        })
    }

    /// Apply the replace / keep / clear matrix to one optional image field.
    pub async fn update_single(
        &self,
        current_url: Option<&str>,
        current_public_id: Option<&str>,
        upload: Option<&Upload>,
        keep_current: bool,
        folder: &str,
    ) -> CoreResult<ImageChange> {
        let has_existing = current_url.is_some_and(|u| !u.is_empty());
        let action = plan_image_update(upload.is_some(), keep_current, has_existing);
        match (action, upload) {
            (ImageAction::Replace, Some(file)) => {
                self.replace(current_public_id, file, folder).await
            }
            (ImageAction::Clear, _) => Ok(ImageChange {
                action,
                uploaded: None,
                stale: current_public_id.map(str::to_string),
            }),
            _ => Ok(ImageChange {
                action,
                uploaded: None,
                stale: None,
            }),
        }
    }

    /// Release what became stale after a successful write.
    pub async fn commit(&self, change: &ImageChange) {
        if let Some(handle) = &change.stale {
            self.release(handle).await;
        }
    }

    /// Undo a change whose write failed.
    pub async fn rollback(&self, change: &ImageChange) {
        if let Some(asset) = &change.uploaded {
            self.release(&asset.public_id).await;
        }
    }
}
