//! Slug derivation for catalog entities and inbox records.
//!
//! Catalog slugs (categories, subcategories, products) are derived from the
//! display name or taken from an admin-entered value, normalized the same way,
//! and checked for uniqueness inside their own collection by the store.
//! Inbox slugs (contact submissions, newsletter subscriptions) are synthetic:
//! a normalized seed plus a base-36 timestamp suffix, never checked.

use std::fmt;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Maximum length of a synthetic slug's seed part. Catalog slugs are never
/// shortened, so distinct names keep distinct slugs.
pub const MAX_SEED_LEN: usize = 96;

/// Fallback seed used when a synthetic slug's seed normalizes to nothing.
const FALLBACK_SEED: &str = "entry";

/// The collection a slug must be unique within.
///
/// Slug namespaces are not shared: a category and a product may carry the
/// same slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugCollection {
    Categories,
    Subcategories,
    Products,
}

impl SlugCollection {
    /// Human-readable entity name used in error messages.
    pub fn entity(self) -> &'static str {
        match self {
            Self::Categories => "Category",
            Self::Subcategories => "Subcategory",
            Self::Products => "Product",
        }
    }

    /// Backing table name.
    pub fn table(self) -> &'static str {
        match self {
            Self::Categories => "categories",
            Self::Subcategories => "subcategories",
            Self::Products => "products",
        }
    }
}

impl fmt::Display for SlugCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.entity())
    }
}

/// Derive a URL-safe slug from a display name.
///
/// Lower-cases, replaces every run of characters outside `[a-z0-9]` with a
/// single hyphen and trims leading/trailing hyphens.
///
/// ```
/// use storefront_core::slug::derive_slug;
///
/// assert_eq!(derive_slug("PTZ Cameras"), "ptz-cameras");
/// assert_eq!(derive_slug("  --Héllo, World!--  "), "h-llo-world");
/// ```
pub fn derive_slug(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !result.is_empty() {
                result.push('-');
            }
            pending_hyphen = false;
            result.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    result
}

/// Pick the slug for a catalog write.
///
/// An explicit (admin-entered) slug wins when it is non-blank, otherwise the
/// slug is derived from `name`. Either way the value is normalized with
/// [`derive_slug`]; an empty result is a validation error.
pub fn resolve_slug(name: &str, explicit: Option<&str>) -> Result<String, CoreError> {
    let source = match explicit {
        Some(s) if !s.trim().is_empty() => s,
        _ => name,
    };
    let slug = derive_slug(source);
    if slug.is_empty() {
        return Err(CoreError::Validation(
            "Slug must contain at least one letter or digit".into(),
        ));
    }
    Ok(slug)
}

/// Validate a slug that arrives from a URL path.
pub fn validate_slug(slug: &str) -> Result<(), CoreError> {
    if slug.is_empty() {
        return Err(CoreError::Validation("Slug must not be empty".into()));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(CoreError::Validation(
            "Slug must contain only lowercase alphanumeric characters and hyphens".into(),
        ));
    }
    Ok(())
}

/// Build a synthetic slug for records that are never looked up by name.
///
/// `seed` is normalized with [`derive_slug`] and suffixed with the base-36
/// millisecond timestamp followed by a short base-36 disambiguator, so two
/// records created in the same millisecond still differ.
pub fn synthetic_slug(seed: &str, now: Timestamp, entropy: u32) -> String {
    let millis = now.timestamp_millis().max(0) as u64;
    let mut base = derive_slug(seed);
    if base.len() > MAX_SEED_LEN {
        base.truncate(MAX_SEED_LEN);
        while base.ends_with('-') {
            base.pop();
        }
    }
    if base.is_empty() {
        base = FALLBACK_SEED.to_string();
    }
    format!(
        "{base}-{}{}",
        to_base36(millis),
        pad_base36(u64::from(entropy % 1_679_616), 4)
    )
}

/// Encode `value` in lowercase base 36.
pub fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::new();
    while value > 0 {
        buf.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    buf.reverse();
    String::from_utf8(buf).unwrap_or_default()
}

fn pad_base36(value: u64, width: usize) -> String {
    format!("{:0>width$}", to_base36(value))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::TimeZone;

    use super::*;

    fn is_normalized(slug: &str) -> bool {
        !slug.starts_with('-')
            && !slug.ends_with('-')
            && !slug.contains("--")
            && slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    }

    #[test]
    fn derive_basic_names() {
        assert_eq!(derive_slug("Cameras"), "cameras");
        assert_eq!(derive_slug("PTZ Cameras"), "ptz-cameras");
        assert_eq!(derive_slug("PTZ Pro"), "ptz-pro");
    }

    #[test]
    fn derive_collapses_runs_and_trims() {
        assert_eq!(derive_slug("  Access -- Control & Locks!! "), "access-control-locks");
        assert_eq!(derive_slug("---"), "");
        assert_eq!(derive_slug("4K/60fps"), "4k-60fps");
    }

    #[test]
    fn derive_drops_non_ascii_letters() {
        assert_eq!(derive_slug("Câmeras Térmicas"), "c-meras-t-rmicas");
        assert_eq!(derive_slug("日本"), "");
    }

    #[test]
    fn derive_output_is_normalized_for_many_inputs() {
        let inputs = [
            "",
            " ",
            "a",
            "A b C",
            "__init__",
            "-leading",
            "trailing-",
            "Mixed_CASE and 123 digits",
            "emoji 📷 camera",
            "tab\tand\nnewline",
        ];
        for input in inputs {
            let slug = derive_slug(input);
            assert!(is_normalized(&slug), "{input:?} -> {slug:?}");
        }
    }

    #[test]
    fn derive_is_idempotent() {
        for input in ["PTZ Cameras", " x--y ", "Déjà vu 2", "a/b/c", "---x---"] {
            let once = derive_slug(input);
            assert_eq!(derive_slug(&once), once);
        }
    }

    #[test]
    fn derive_keeps_long_names_whole() {
        let prefix = "Ultra HD pan tilt zoom outdoor camera ".repeat(3);
        let black = derive_slug(&format!("{prefix} Zoom Black"));
        let white = derive_slug(&format!("{prefix} Zoom White"));
        assert!(black.ends_with("-zoom-black"));
        assert!(white.ends_with("-zoom-white"));
        assert_ne!(black, white);
    }

    #[test]
    fn synthetic_slug_caps_seed_without_trailing_hyphen() {
        let now = chrono::Utc.timestamp_millis_opt(0).unwrap();
        let slug = synthetic_slug(&"ab ".repeat(100), now, 0);
        let seed = slug.trim_end_matches("-00000");
        assert!(seed.len() <= MAX_SEED_LEN);
        assert!(is_normalized(&slug));
    }

    #[test]
    fn resolve_prefers_explicit_slug_but_normalizes_it() {
        assert_eq!(
            resolve_slug("Cameras", Some("My Custom Slug")).unwrap(),
            "my-custom-slug"
        );
        assert_eq!(resolve_slug("Cameras", Some("   ")).unwrap(), "cameras");
        assert_eq!(resolve_slug("Cameras", None).unwrap(), "cameras");
    }

    #[test]
    fn resolve_rejects_empty_result() {
        assert_matches!(resolve_slug("!!!", None), Err(CoreError::Validation(_)));
    }

    #[test]
    fn validate_slug_rules() {
        assert!(validate_slug("ptz-cameras").is_ok());
        assert_matches!(validate_slug(""), Err(CoreError::Validation(_)));
        assert_matches!(validate_slug("Upper"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn synthetic_slug_has_seed_and_base36_suffix() {
        let now = chrono::Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let slug = synthetic_slug("Jane Doe", now, 0);
        assert_eq!(slug, format!("jane-doe-{}0000", to_base36(1_700_000_000_000)));
        assert!(is_normalized(&slug));
    }

    #[test]
    fn synthetic_slug_differs_by_entropy() {
        let now = chrono::Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        assert_ne!(synthetic_slug("a", now, 1), synthetic_slug("a", now, 2));
    }

    #[test]
    fn synthetic_slug_falls_back_for_empty_seed() {
        let now = chrono::Utc.timestamp_millis_opt(0).unwrap();
        assert_eq!(synthetic_slug("!!!", now, 35), "entry-0000z");
    }

    #[test]
    fn base36_encoding() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1295), "zz");
    }
}
