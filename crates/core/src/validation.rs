//! Field-level validation helpers shared by the catalog and inbox services.

use validator::ValidateEmail;

use crate::error::CoreError;

/// Maximum accepted length for display names.
pub const MAX_NAME_LEN: usize = 200;

/// Trim `value` and reject it when blank.
pub fn require_text(field: &str, value: &str) -> Result<String, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Validate a display name: required, trimmed, at most [`MAX_NAME_LEN`] characters.
pub fn require_name(value: &str) -> Result<String, CoreError> {
    let name = require_text("Name", value)?;
    if name.chars().count() > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name)
}

/// Trim optional text; blank values become `None`.
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Validate that a price is a finite, strictly positive number.
pub fn validate_price(price: f64) -> Result<(), CoreError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(CoreError::Validation(
            "Price must be a positive number".into(),
        ));
    }
    Ok(())
}

/// Normalize (trim + lowercase) and validate an email address.
pub fn normalize_email(value: &str) -> Result<String, CoreError> {
    let email = value.trim().to_lowercase();
    if email.is_empty() {
        return Err(CoreError::Validation("Email is required".into()));
    }
    if !email.validate_email() {
        return Err(CoreError::Validation(format!(
            "'{email}' is not a valid email address"
        )));
    }
    Ok(email)
}

/// The part of an email address before the `@`.
pub fn email_local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn require_text_trims() {
        assert_eq!(require_text("Name", "  Cameras ").unwrap(), "Cameras");
        assert_matches!(require_text("Name", "   "), Err(CoreError::Validation(_)));
    }

    #[test]
    fn name_length_is_capped() {
        assert!(require_name(&"x".repeat(MAX_NAME_LEN)).is_ok());
        assert_matches!(
            require_name(&"x".repeat(MAX_NAME_LEN + 1)),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn optional_text_blank_is_none() {
        assert_eq!(optional_text(Some("  ")), None);
        assert_eq!(optional_text(Some(" hi ")).as_deref(), Some("hi"));
        assert_eq!(optional_text(None), None);
    }

    #[test]
    fn price_must_be_positive() {
        assert!(validate_price(499.99).is_ok());
        assert_matches!(validate_price(0.0), Err(CoreError::Validation(_)));
        assert_matches!(validate_price(-1.0), Err(CoreError::Validation(_)));
        assert_matches!(validate_price(f64::NAN), Err(CoreError::Validation(_)));
    }

    #[test]
    fn email_is_normalized_and_checked() {
        assert_eq!(normalize_email("  A@B.com ").unwrap(), "a@b.com");
        assert_matches!(normalize_email("not-an-email"), Err(CoreError::Validation(_)));
        assert_matches!(normalize_email(""), Err(CoreError::Validation(_)));
    }

    #[test]
    fn local_part() {
        assert_eq!(email_local_part("jane.doe@example.com"), "jane.doe");
    }
}
