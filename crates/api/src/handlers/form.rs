//! `multipart/form-data` parsing for catalog writes.
//!
//! Admin forms post text fields and files in one body. [`CatalogForm`]
//! collects them and offers typed accessors; the handlers turn those into
//! catalog inputs and patches.

use std::collections::HashMap;

use axum::extract::Multipart;
use storefront_assets::Upload;
use storefront_core::types::DbId;

use crate::error::{AppError, AppResult};

/// Multipart field names that carry files.
const FILE_FIELDS: &[&str] = &["image", "mainImage", "images"];

#[derive(Debug, Default)]
pub struct CatalogForm {
    fields: HashMap<String, String>,
    files: HashMap<String, Vec<Upload>>,
}

fn bad_request(e: impl std::fmt::Display) -> AppError {
    AppError::BadRequest(e.to_string())
}

fn parse_bool(name: &str, raw: &str) -> AppResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" | "" => Ok(false),
        other => Err(AppError::BadRequest(format!(
            "Field '{name}' must be a boolean, got '{other}'"
        ))),
    }
}

fn parse_id(name: &str, raw: &str) -> AppResult<DbId> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Field '{name}' must be a numeric id")))
}

/// A JSON array or a list split on `sep`.
fn parse_list(raw: &str, sep: char) -> AppResult<Vec<String>> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        return serde_json::from_str::<Vec<serde_json::Value>>(trimmed)
            .map(|items| {
                items
                    .into_iter()
                    .map(|v| match v {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .collect()
            })
            .map_err(bad_request);
    }
    Ok(trimmed
        .split(sep)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

impl CatalogForm {
    /// Drain a multipart body. Unknown fields are ignored; file inputs left
    /// empty by the browser (no filename, no bytes) are skipped.
    pub async fn parse(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
            let name = field.name().unwrap_or("").to_string();
            if name.is_empty() {
                continue;
            }

            if FILE_FIELDS.contains(&name.as_str()) || field.file_name().is_some() {
                let filename = field.file_name().unwrap_or("").to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(bad_request)?;
                if filename.is_empty() && data.is_empty() {
                    continue;
                }
                let filename = if filename.is_empty() {
                    name.clone()
                } else {
                    filename
                };
                form.files
                    .entry(name)
                    .or_default()
                    .push(Upload::new(filename, content_type, data.to_vec()));
            } else {
                let text = field.text().await.map_err(bad_request)?;
                form.fields.insert(name, text);
            }
        }

        Ok(form)
    }

    #[cfg(test)]
    fn from_parts(fields: &[(&str, &str)], files: Vec<(&str, Upload)>) -> Self {
        let mut form = Self::default();
        for (k, v) in fields {
            form.fields.insert((*k).to_string(), (*v).to_string());
        }
        for (k, upload) in files {
            form.files.entry(k.to_string()).or_default().push(upload);
        }
        form
    }

    /// Raw text of `name`, if sent.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }

    pub fn required_text(&self, name: &str) -> AppResult<String> {
        self.text(name)
            .ok_or_else(|| AppError::BadRequest(format!("Missing required field '{name}'")))
    }

    /// Text of `name` with blank values treated as absent.
    pub fn non_blank(&self, name: &str) -> Option<String> {
        self.text(name).filter(|v| !v.trim().is_empty())
    }

    pub fn id(&self, name: &str) -> AppResult<Option<DbId>> {
        self.non_blank(name).map(|raw| parse_id(name, &raw)).transpose()
    }

    pub fn required_id(&self, name: &str) -> AppResult<DbId> {
        self.id(name)?
            .ok_or_else(|| AppError::BadRequest(format!("Missing required field '{name}'")))
    }

    /// An optional reference that can be cleared: absent field is `None`,
    /// `""` / `none` / `null` is `Some(None)`.
    pub fn nullable_id(&self, name: &str) -> AppResult<Option<Option<DbId>>> {
        match self.text(name) {
            None => Ok(None),
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "" | "none" | "null" => Ok(Some(None)),
                _ => Ok(Some(Some(parse_id(name, &raw)?))),
            },
        }
    }

    pub fn flag(&self, name: &str) -> AppResult<bool> {
        Ok(self.optional_bool(name)?.unwrap_or(false))
    }

    pub fn optional_bool(&self, name: &str) -> AppResult<Option<bool>> {
        self.text(name).map(|raw| parse_bool(name, &raw)).transpose()
    }

    pub fn price(&self, name: &str) -> AppResult<Option<f64>> {
        self.non_blank(name)
            .map(|raw| {
                raw.trim().parse::<f64>().map_err(|_| {
                    AppError::BadRequest(format!("Field '{name}' must be a number"))
                })
            })
            .transpose()
    }

    /// Feature list: a JSON array or one feature per line.
    pub fn features(&self, name: &str) -> AppResult<Option<Vec<String>>> {
        self.text(name).map(|raw| parse_list(&raw, '\n')).transpose()
    }

    /// Gallery indices: a JSON array or comma separated.
    pub fn indices(&self, name: &str) -> AppResult<Vec<usize>> {
        let Some(raw) = self.text(name) else {
            return Ok(Vec::new());
        };
        parse_list(&raw, ',')?
            .iter()
            .map(|item| {
                item.trim().parse::<usize>().map_err(|_| {
                    AppError::BadRequest(format!("Field '{name}' must list non-negative indices"))
                })
            })
            .collect()
    }

    /// First file sent under `name`.
    pub fn file(&mut self, name: &str) -> Option<Upload> {
        let files = self.files.get_mut(name)?;
        if files.is_empty() {
            None
        } else {
            Some(files.remove(0))
        }
    }

    /// Every file sent under `name`, in order.
    pub fn files(&mut self, name: &str) -> Vec<Upload> {
        self.files.remove(name).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn upload(name: &str) -> Upload {
        Upload::new(name, Some("image/png".into()), vec![1])
    }

    #[test]
    fn typed_accessors() {
        let form = CatalogForm::from_parts(
            &[
                ("name", "PTZ Pro"),
                ("categoryId", " 7 "),
                ("price", "499.99"),
                ("inStock", "false"),
                ("keepCurrentMainImage", "on"),
                ("description", "   "),
            ],
            vec![],
        );
        assert_eq!(form.required_text("name").unwrap(), "PTZ Pro");
        assert_eq!(form.required_id("categoryId").unwrap(), 7);
        assert_eq!(form.price("price").unwrap(), Some(499.99));
        assert_eq!(form.optional_bool("inStock").unwrap(), Some(false));
        assert!(form.flag("keepCurrentMainImage").unwrap());
        assert!(!form.flag("keepCurrentImage").unwrap());
        assert_eq!(form.non_blank("description"), None);
        assert_eq!(form.text("description").as_deref(), Some("   "));
    }

    #[test]
    fn bad_values_are_bad_requests() {
        let form = CatalogForm::from_parts(
            &[("categoryId", "seven"), ("price", "cheap"), ("inStock", "maybe")],
            vec![],
        );
        assert_matches!(form.id("categoryId"), Err(AppError::BadRequest(_)));
        assert_matches!(form.price("price"), Err(AppError::BadRequest(_)));
        assert_matches!(form.optional_bool("inStock"), Err(AppError::BadRequest(_)));
        assert_matches!(form.required_text("name"), Err(AppError::BadRequest(_)));
    }

    #[test]
    fn subcategory_can_be_cleared() {
        let form = CatalogForm::from_parts(&[("subcategoryId", "none"), ("other", "4")], vec![]);
        assert_eq!(form.nullable_id("subcategoryId").unwrap(), Some(None));
        assert_eq!(form.nullable_id("other").unwrap(), Some(Some(4)));
        assert_eq!(form.nullable_id("missing").unwrap(), None);
    }

    #[test]
    fn lists_accept_json_or_separators() {
        let form = CatalogForm::from_parts(
            &[
                ("features", "4K sensor\n\n 30x zoom "),
                ("removeImageIndices", "[2, 0]"),
            ],
            vec![],
        );
        assert_eq!(
            form.features("features").unwrap(),
            Some(vec!["4K sensor".to_string(), "30x zoom".to_string()])
        );
        assert_eq!(form.indices("removeImageIndices").unwrap(), vec![2, 0]);

        let form = CatalogForm::from_parts(
            &[("features", r#"["PoE", "IP67"]"#), ("removeImageIndices", "1, 3")],
            vec![],
        );
        assert_eq!(
            form.features("features").unwrap(),
            Some(vec!["PoE".to_string(), "IP67".to_string()])
        );
        assert_eq!(form.indices("removeImageIndices").unwrap(), vec![1, 3]);

        let form = CatalogForm::from_parts(&[("removeImageIndices", "-1")], vec![]);
        assert_matches!(form.indices("removeImageIndices"), Err(AppError::BadRequest(_)));
    }

    #[test]
    fn files_by_field() {
        let mut form = CatalogForm::from_parts(
            &[],
            vec![
                ("mainImage", upload("main.png")),
                ("images", upload("a.png")),
                ("images", upload("b.png")),
            ],
        );
        assert_eq!(form.file("mainImage").unwrap().filename, "main.png");
        assert!(form.file("mainImage").is_none());
        let gallery = form.files("images");
        assert_eq!(gallery.len(), 2);
        assert_eq!(gallery[1].filename, "b.png");
        assert!(form.files("images").is_empty());
    }
}
