//! Image field rules shared by the catalog entities.
//!
//! Covers the update policy matrix for single-image fields (category image,
//! subcategory image, product main image), gallery index removal and upload
//! validation. Everything here is pure; the side effects live in the catalog
//! crate's `ImageAttachment`.

use crate::error::CoreError;

/// Asset folder for category images.
pub const FOLDER_CATEGORIES: &str = "categories";

/// Asset folder for subcategory images.
pub const FOLDER_SUBCATEGORIES: &str = "subcategories";

/// Asset folder for product main and gallery images.
pub const FOLDER_PRODUCTS: &str = "products";

/// Default maximum upload size (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Accepted image file extensions.
pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "avif"];

/// What to do with a single-image field on update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageAction {
    /// Release the current asset (if any) and attach the new file.
    Replace,
    /// Leave the stored reference untouched.
    Keep,
    /// Release the current asset and clear the reference.
    Clear,
    /// Nothing stored, nothing given.
    Nothing,
}

/// Decide the action for a single-image field.
///
/// | new file | keep flag | existing | action  |
/// |----------|-----------|----------|---------|
/// | yes      | any       | any      | Replace |
/// | no       | true      | any      | Keep    |
/// | no       | false     | present  | Clear   |
/// | no       | false     | absent   | Nothing |
pub fn plan_image_update(has_new_file: bool, keep_current: bool, has_existing: bool) -> ImageAction {
    match (has_new_file, keep_current, has_existing) {
        (true, _, _) => ImageAction::Replace,
        (false, true, _) => ImageAction::Keep,
        (false, false, true) => ImageAction::Clear,
        (false, false, false) => ImageAction::Nothing,
    }
}

/// Decide the action for a product main image, which may never end up empty.
///
/// Same matrix as [`plan_image_update`], except that any outcome leaving the
/// product without a main image is rejected.
pub fn plan_main_image_update(
    has_new_file: bool,
    keep_current: bool,
    has_existing: bool,
) -> Result<ImageAction, CoreError> {
    match plan_image_update(has_new_file, keep_current, has_existing) {
        ImageAction::Replace => Ok(ImageAction::Replace),
        ImageAction::Keep if has_existing => Ok(ImageAction::Keep),
        _ => Err(CoreError::Validation(
            "Main image is required: upload a new image or keep the current one".into(),
        )),
    }
}

/// Normalize a set of gallery indices to remove.
///
/// Returns the indices sorted descending and de-duplicated so they can be
/// removed one by one without shifting positions. Any index outside
/// `0..gallery_len` is a validation error.
pub fn removal_order(indices: &[usize], gallery_len: usize) -> Result<Vec<usize>, CoreError> {
    if let Some(bad) = indices.iter().find(|&&i| i >= gallery_len) {
        return Err(CoreError::Validation(format!(
            "Image index {bad} is out of range (gallery has {gallery_len} images)"
        )));
    }
    let mut order = indices.to_vec();
    order.sort_unstable_by(|a, b| b.cmp(a));
    order.dedup();
    Ok(order)
}

/// Validate an uploaded image before it is sent to the asset store.
///
/// The file is accepted when either its extension or its content type names
/// a supported image format.
pub fn validate_image_upload(
    filename: &str,
    content_type: Option<&str>,
    size_bytes: usize,
    max_bytes: usize,
) -> Result<(), CoreError> {
    if size_bytes == 0 {
        return Err(CoreError::Validation(format!("Uploaded file '{filename}' is empty")));
    }
    if size_bytes > max_bytes {
        return Err(CoreError::Validation(format!(
            "Uploaded file '{filename}' is {size_bytes} bytes; the limit is {max_bytes} bytes"
        )));
    }

    let ext = file_extension(filename);
    let ext_ok = ext
        .as_deref()
        .is_some_and(|e| SUPPORTED_IMAGE_EXTENSIONS.contains(&e));
    let type_ok = content_type.is_some_and(|ct| {
        ct.strip_prefix("image/")
            .is_some_and(|sub| SUPPORTED_IMAGE_EXTENSIONS.contains(&sub))
    });

    if ext_ok || type_ok {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Unsupported image format for '{filename}'. Supported: {}",
            SUPPORTED_IMAGE_EXTENSIONS.join(", ")
        )))
    }
}

/// Lowercased extension of `filename`, if it has one.
pub fn file_extension(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
