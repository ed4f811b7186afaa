use std::net::SocketAddr;
use std::sync::Arc;

use storefront_assets::{AssetStore, CloudinaryStore, LocalAssetStore, MemoryAssetStore};
use storefront_db::store::{MemoryStore, PgStore, UserStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_api::config::{AssetBackend, ServerConfig, StoreBackend};
use storefront_api::router::build_app_router;
use storefront_api::seed::ensure_admin;
use storefront_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        store = ?config.store_backend,
        assets = ?config.asset_backend,
        "Loaded server configuration"
    );

    // --- Asset store ---
    let assets: Arc<dyn AssetStore> = match config.asset_backend {
        AssetBackend::Cloudinary => {
            let cloudinary = config
                .cloudinary
                .clone()
                .expect("Cloudinary configuration must be present");
            Arc::new(CloudinaryStore::new(cloudinary))
        }
        AssetBackend::Local => {
            tokio::fs::create_dir_all(&config.upload_dir)
                .await
                .expect("Failed to create upload directory");
            Arc::new(LocalAssetStore::new(
                &config.upload_dir,
                &config.public_upload_url,
            ))
        }
        AssetBackend::Memory => Arc::new(MemoryAssetStore::new()),
    };
    tracing::info!(backend = assets.backend(), "Asset store ready");

    // --- Persistence ---
    let state = match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .clone()
                .expect("DATABASE_URL must be set");

            let pool = storefront_db::create_pool(&database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            storefront_db::health_check(&pool)
                .await
                .expect("Database health check failed");
            storefront_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            let store = Arc::new(PgStore::new(pool.clone()));
            AppState::new(store, assets, config.clone(), Some(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Running on the in-memory store; data is lost on restart");
            AppState::new(Arc::new(MemoryStore::new()), assets, config.clone(), None)
        }
    };

    // --- Admin seed ---
    if let Some(seed) = &config.admin_seed {
        ensure_admin(state.users.as_ref(), seed)
            .await
            .expect("Failed to seed admin user");
    }
    let users = state.users.count_users().await.unwrap_or(0);
    if users == 0 {
        tracing::warn!("No admin users exist; set ADMIN_EMAIL and ADMIN_PASSWORD to create one");
    }

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
