use std::str::FromStr;

use storefront_assets::CloudinaryConfig;
use storefront_core::image::DEFAULT_MAX_UPLOAD_BYTES;

use crate::auth::cookie::CookieConfig;
use crate::auth::jwt::JwtConfig;

/// How many maximum-size files one multipart request may carry before the
/// body limit rejects it.
pub const FILES_PER_REQUEST: usize = 12;

/// Which persistence backend the server runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown store backend '{other}' (postgres|memory)")),
        }
    }
}

/// Which asset host uploads go to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetBackend {
    Cloudinary,
    Local,
    Memory,
}

impl FromStr for AssetBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cloudinary" => Ok(Self::Cloudinary),
            "local" => Ok(Self::Local),
            "memory" => Ok(Self::Memory),
            other => Err(format!(
                "unknown asset backend '{other}' (cloudinary|local|memory)"
            )),
        }
    }
}

/// Credentials for the admin account created at startup, if configured.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// Per-file upload limit in bytes.
    pub max_upload_bytes: usize,
    pub store_backend: StoreBackend,
    /// Required when `store_backend` is Postgres.
    pub database_url: Option<String>,
    pub asset_backend: AssetBackend,
    /// Root directory of the local asset backend.
    pub upload_dir: String,
    /// URL prefix under which local uploads are served.
    pub public_upload_url: String,
    /// Present when `asset_backend` is Cloudinary.
    pub cloudinary: Option<CloudinaryConfig>,
    pub jwt: JwtConfig,
    pub cookie: CookieConfig,
    pub admin_seed: Option<AdminSeed>,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{key} is invalid: {e}")),
        Err(_) => default,
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `3000`                  |
    /// | `CORS_ORIGINS`          | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `MAX_UPLOAD_BYTES`      | `10485760`              |
    /// | `STORE_BACKEND`         | `postgres`              |
    /// | `DATABASE_URL`          | required for postgres   |
    /// | `ASSET_BACKEND`         | `local`                 |
    /// | `UPLOAD_DIR`            | `uploads`               |
    /// | `PUBLIC_UPLOAD_URL`     | `/uploads`              |
    /// | `CLOUDINARY_CLOUD_NAME` | required for cloudinary |
    /// | `CLOUDINARY_API_KEY`    | required for cloudinary |
    /// | `CLOUDINARY_API_SECRET` | required for cloudinary |
    /// | `CLOUDINARY_FOLDER`     | none                    |
    /// | `ADMIN_EMAIL`           | none                    |
    /// | `ADMIN_PASSWORD`        | none                    |
    /// | `ADMIN_NAME`            | `Administrator`         |
    ///
    /// JWT and cookie settings are documented on [`JwtConfig::from_env`] and
    /// [`CookieConfig::from_env`].
    ///
    /// # Panics
    ///
    /// Panics on malformed values and on missing credentials for the
    /// selected backends.
    pub fn from_env() -> Self {
        let cors_origins: Vec<String> = env_or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let store_backend: StoreBackend = env_parse("STORE_BACKEND", StoreBackend::Postgres);
        let database_url = env_opt("DATABASE_URL");
        if store_backend == StoreBackend::Postgres {
            assert!(
                database_url.is_some(),
                "DATABASE_URL must be set when STORE_BACKEND=postgres"
            );
        }

        let asset_backend: AssetBackend = env_parse("ASSET_BACKEND", AssetBackend::Local);
        let cloudinary = (asset_backend == AssetBackend::Cloudinary).then(|| {
            let mut config = CloudinaryConfig::new(
                env_opt("CLOUDINARY_CLOUD_NAME").expect("CLOUDINARY_CLOUD_NAME must be set"),
                env_opt("CLOUDINARY_API_KEY").expect("CLOUDINARY_API_KEY must be set"),
                env_opt("CLOUDINARY_API_SECRET").expect("CLOUDINARY_API_SECRET must be set"),
            );
            config.root_folder = env_opt("CLOUDINARY_FOLDER");
            config
        });

        let admin_seed = match (env_opt("ADMIN_EMAIL"), env_opt("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminSeed {
                email,
                password,
                name: env_or("ADMIN_NAME", "Administrator"),
            }),
            _ => None,
        };

        Self {
            host: env_or("HOST", "0.0.0.0"),
            port: env_parse("PORT", 3000),
            cors_origins,
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", 30),
            max_upload_bytes: env_parse("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
            store_backend,
            database_url,
            asset_backend,
            upload_dir: env_or("UPLOAD_DIR", "uploads"),
            public_upload_url: env_or("PUBLIC_UPLOAD_URL", "/uploads")
                .trim_end_matches('/')
                .to_string(),
            cloudinary,
            jwt: JwtConfig::from_env(),
            cookie: CookieConfig::from_env(),
            admin_seed,
        }
    }

    /// Request body limit: room for a full gallery of maximum-size files.
    pub fn body_limit(&self) -> usize {
        self.max_upload_bytes.saturating_mul(FILES_PER_REQUEST)
    }

    /// Whether the API itself serves `/uploads` from disk.
    pub fn serves_local_uploads(&self) -> bool {
        self.asset_backend == AssetBackend::Local
            && self.public_upload_url.len() > 1
            && self.public_upload_url.starts_with('/')
    }
}
