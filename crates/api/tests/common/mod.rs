#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use storefront_api::auth::cookie::CookieConfig;
use storefront_api::auth::jwt::{generate_token, JwtConfig};
use storefront_api::config::{AssetBackend, ServerConfig, StoreBackend};
use storefront_api::router::build_app_router;
use storefront_api::state::AppState;
use storefront_assets::MemoryAssetStore;
use storefront_core::roles::ROLE_ADMIN;
use storefront_db::models::admin_user::NewAdminUser;
use storefront_db::store::{MemoryStore, UserStore};

pub const TEST_JWT_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

/// Build a test `ServerConfig` on the in-memory backends.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        max_upload_bytes: 1024 * 1024,
        store_backend: StoreBackend::Memory,
        database_url: None,
        asset_backend: AssetBackend::Memory,
        upload_dir: "uploads".to_string(),
        public_upload_url: "/uploads".to_string(),
        cloudinary: None,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            expiry_hours: 1,
        },
        cookie: CookieConfig::default(),
        admin_seed: None,
    }
}

/// The full application over in-memory backends, with handles on both
/// backends for assertions.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub assets: Arc<MemoryAssetStore>,
    pub config: ServerConfig,
}

/// Build the application router with the same middleware stack `main.rs`
/// uses.
pub fn build_test_app() -> TestApp {
    let config = test_config();
    let store = Arc::new(MemoryStore::new());
    let assets = Arc::new(MemoryAssetStore::new());
    let state = AppState::new(store.clone(), assets.clone(), config.clone(), None);
    TestApp {
        router: build_app_router(state, &config),
        store,
        assets,
        config,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Create an admin user and return a `Cookie` header value carrying a
    /// valid session for it.
    pub async fn admin_cookie(&self) -> String {
        let user = self
            .store
            .insert_user(&NewAdminUser {
                email: "admin@shop.test".into(),
                name: "Admin".into(),
                password_hash: "not-used".into(),
                role: ROLE_ADMIN.into(),
            })
            .await
            .unwrap();
        let token = generate_token(user.id, &user.email, &user.role, &self.config.jwt).unwrap();
        format!("{}={token}", self.config.cookie.name)
    }

    /// A session token for a role other than admin.
    pub fn token_for_role(&self, role: &str) -> String {
        generate_token(99, "someone@shop.test", role, &self.config.jwt).unwrap()
    }
}

// ---------------------------------------------------------------------------
// Request builders
// ---------------------------------------------------------------------------

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

pub fn get_with_bearer(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

pub fn delete_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header(COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(
    method: Method,
    uri: &str,
    body: serde_json::Value,
    cookie: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Hand-built `multipart/form-data` body.
pub struct MultipartForm {
    boundary: &'static str,
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self {
            boundary: "storefront-test-boundary",
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: image/jpeg\r\n\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// A small valid-looking JPEG under `name`.
    pub fn image(self, name: &str, filename: &str) -> Self {
        self.file(name, filename, &[0xFF, 0xD8, 0xFF, 0xE0])
    }

    pub fn request(mut self, method: Method, uri: &str, cookie: &str) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        Request::builder()
            .method(method)
            .uri(uri)
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", self.boundary),
            )
            .header(COOKIE, cookie)
            .body(Body::from(self.body))
            .unwrap()
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
