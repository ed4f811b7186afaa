//! Admin dashboard counts.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use storefront_db::models::dashboard::{CatalogCounts, InboxCounts};

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub catalog: CatalogCounts,
    pub inbox: InboxCounts,
}

/// GET /api/v1/admin/dashboard
pub async fn summary(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<DashboardSummary>>> {
    let (catalog, inbox) = tokio::try_join!(state.catalog.counts(), state.inbox.counts())?;
    Ok(Json(DataResponse {
        data: DashboardSummary { catalog, inbox },
    }))
}
