//! Admin dashboard and admin code endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::admin_code::{AdminCode, CreateAdminCodes},
    services::admin::AdminStats,
};

use super::AdminUser;

/// Dashboard figures
#[utoipa::path(
    get,
    path = "/admin/stats",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Catalog and borrow counts", body = AdminStats),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn get_stats(
    State(state): State<crate::AppState>,
    AdminUser(_claims): AdminUser,
) -> AppResult<Json<AdminStats>> {
    let stats = state.services.admin.stats().await?;
    Ok(Json(stats))
}

/// List admin registration codes
#[utoipa::path(
    get,
    path = "/admin/codes",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Codes, unused first", body = Vec<AdminCode>)
    )
)]
pub async fn list_codes(
    State(state): State<crate::AppState>,
    AdminUser(_claims): AdminUser,
) -> AppResult<Json<Vec<AdminCode>>> {
    let codes = state.services.admin.list_codes().await?;
    Ok(Json(codes))
}

/// Mint new admin registration codes
#[utoipa::path(
    post,
    path = "/admin/codes",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = CreateAdminCodes,
    responses(
        (status = 201, description = "Codes created", body = Vec<AdminCode>)
    )
)]
pub async fn create_codes(
    State(state): State<crate::AppState>,
    AdminUser(claims): AdminUser,
    body: Option<Json<CreateAdminCodes>>,
) -> AppResult<(StatusCode, Json<Vec<AdminCode>>)> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let codes = state.services.admin.mint_codes(request.count).await?;
    tracing::info!(user_id = %claims.user_id, count = codes.len(), "Admin codes issued");
    Ok((StatusCode::CREATED, Json(codes)))
}
