//! Cloudinary backend: signed upload and destroy calls over the REST API.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::{AssetError, AssetRef, AssetStore, Upload};

/// Default API origin; overridable for tests and proxies.
pub const DEFAULT_API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Credentials and placement for a Cloudinary account.
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// Optional prefix prepended to every logical folder.
    pub root_folder: Option<String>,
    pub api_base: String,
}

impl CloudinaryConfig {
    pub fn new(cloud_name: String, api_key: String, api_secret: String) -> Self {
        Self {
            cloud_name,
            api_key,
            api_secret,
            root_folder: None,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/{}/image/{action}", self.api_base, self.cloud_name)
    }

    fn folder(&self, folder: &str) -> String {
        match self.root_folder.as_deref().map(|r| r.trim_matches('/')) {
            Some(root) if !root.is_empty() => format!("{root}/{folder}"),
            _ => folder.to_string(),
        }
    }
}

/// Compute a request signature.
///
/// Parameters are sorted by name, joined as `k=v` with `&`, the API secret is
/// appended, and the result is SHA-256 hashed and hex encoded. `file`,
/// `api_key`, `cloud_name` and `resource_type` never take part.
pub fn sign(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
    let to_sign = params
        .iter()
        .filter(|&(k, _)| !matches!(*k, "file" | "api_key" | "cloud_name" | "resource_type"))
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorMessage,
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    message: String,
}

pub struct CloudinaryStore {
    config: CloudinaryConfig,
    http: reqwest::Client,
}

impl CloudinaryStore {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn signed_params(&self, mut params: BTreeMap<&'static str, String>) -> BTreeMap<&'static str, String> {
        params.insert("timestamp", chrono::Utc::now().timestamp().to_string());
        let signature = sign(&params, &self.config.api_secret);
        params.insert("signature", signature);
        params.insert("signature_algorithm", "sha256".to_string());
        params.insert("api_key", self.config.api_key.clone());
        params
    }

    async fn rejected(response: reqwest::Response) -> AssetError {
        let status = response.status();
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error.message,
            Err(_) => "no error body".to_string(),
        };
        AssetError::Rejected(format!("{status}: {message}"))
    }
}

#[async_trait]
impl AssetStore for CloudinaryStore {
    async fn upload(&self, upload: &Upload, folder: &str) -> Result<AssetRef, AssetError> {
        let mut params = BTreeMap::new();
        params.insert("folder", self.config.folder(folder));
        let params = self.signed_params(params);

        let mut part =
            reqwest::multipart::Part::bytes(upload.bytes.clone()).file_name(upload.filename.clone());
        if let Some(ct) = upload.content_type.as_deref() {
            part = part.mime_str(ct)?;
        }
        let form = params
            .into_iter()
            .fold(reqwest::multipart::Form::new(), |form, (k, v)| form.text(k, v))
            .part("file", part);

        let response = self
            .http
            .post(self.config.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::rejected(response).await);
        }

        let body: UploadResponse = response.json().await?;
        tracing::debug!(public_id = %body.public_id, "Uploaded asset to Cloudinary");
        Ok(AssetRef {
            url: body.secure_url,
            public_id: body.public_id,
        })
    }

    async fn delete(&self, public_id: &str) -> Result<bool, AssetError> {
        let mut params = BTreeMap::new();
        params.insert("public_id", public_id.to_string());
        let params = self.signed_params(params);

        let response = self
            .http
            .post(self.config.endpoint("destroy"))
            .form(&params)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::rejected(response).await);
        }

        let body: DestroyResponse = response.json().await?;
        match body.result.as_str() {
            "ok" => Ok(true),
            "not found" => Ok(false),
            other => Err(AssetError::Rejected(format!(
                "Unexpected destroy result '{other}' for {public_id}"
            ))),
        }
    }

    fn backend(&self) -> &'static str {
        "cloudinary"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_sorts_params_and_skips_unsigned_keys() {
        let mut params = BTreeMap::new();
        params.insert("timestamp", "1315060510".to_string());
        params.insert("public_id", "sample_image".to_string());
        params.insert("api_key", "1234".to_string());

        let mut only_signed = BTreeMap::new();
        only_signed.insert("public_id", "sample_image".to_string());
        only_signed.insert("timestamp", "1315060510".to_string());

        let sig = sign(&params, "abcd");
        assert_eq!(sig, sign(&only_signed, "abcd"));
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn signature_matches_manual_digest() {
        let mut params = BTreeMap::new();
        params.insert("timestamp", "1".to_string());
        params.insert("folder", "products".to_string());

        let mut hasher = Sha256::new();
        hasher.update(b"folder=products&timestamp=1secret");
        let expected = format!("{:x}", hasher.finalize());

        assert_eq!(sign(&params, "secret"), expected);
    }

    #[test]
    fn folder_prefix_is_applied() {
        let mut config = CloudinaryConfig::new("demo".into(), "k".into(), "s".into());
        assert_eq!(config.folder("products"), "products");
        config.root_folder = Some("/shop/".into());
        assert_eq!(config.folder("products"), "shop/products");
        assert_eq!(
            config.endpoint("upload"),
            "https://api.cloudinary.com/v1_1/demo/image/upload"
        );
    }
}
