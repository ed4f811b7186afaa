use std::sync::Arc;

use storefront_assets::AssetStore;
use storefront_catalog::{CatalogGraph, ImageAttachment, Inbox};
use storefront_db::store::{CatalogStore, InboxStore, UserStore};
use storefront_db::DbPool;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: every service holds its collaborators behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogGraph,
    pub inbox: Inbox,
    pub users: Arc<dyn UserStore>,
    pub config: Arc<ServerConfig>,
    /// Database pool when running on Postgres; used by the health check.
    pub pool: Option<DbPool>,
}

impl AppState {
    /// Wire the services over one store value that backs every seam.
    pub fn new<S>(
        store: Arc<S>,
        assets: Arc<dyn AssetStore>,
        config: ServerConfig,
        pool: Option<DbPool>,
    ) -> Self
    where
        S: CatalogStore + InboxStore + UserStore + 'static,
    {
        let images = ImageAttachment::new(assets, config.max_upload_bytes);
        let catalog_store: Arc<dyn CatalogStore> = store.clone();
        let inbox_store: Arc<dyn InboxStore> = store.clone();
        Self {
            catalog: CatalogGraph::new(catalog_store, images),
            inbox: Inbox::new(inbox_store),
            users: store,
            config: Arc::new(config),
            pool,
        }
    }
}
