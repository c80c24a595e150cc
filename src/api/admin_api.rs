//! Admin API function: user listing for administrators.
//!
//! Served under `/functions/v1/admin-api`. Every request passes the same gate
//! (bearer token, then the caller's profile role) before routing, and errors
//! use a flat `{"error": "..."}` body instead of the `/api/v1` error shape.

use axum::{
    extract::{Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    error::AppError,
    models::user::{AdminUserEntry, UserClaims},
    AppState,
};

/// Error returned by the admin API, rendered as `{"error": message}`
#[derive(Debug)]
pub struct AdminApiError {
    status: StatusCode,
    message: String,
}

impl AdminApiError {
    fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "Unauthorized".to_string(),
        }
    }

    fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: "Not found".to_string(),
        }
    }
}

impl From<AppError> for AdminApiError {
    fn from(error: AppError) -> Self {
        match error {
            AppError::Authentication(_) => Self::unauthorized(),
            AppError::Authorization(_) => Self {
                status: StatusCode::FORBIDDEN,
                message: "Forbidden - Admin access required".to_string(),
            },
            AppError::NotFound(_) => Self::not_found(),
            other => {
                tracing::error!(error = %other, "Admin API failure");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "Internal server error".to_string(),
                }
            }
        }
    }
}

impl IntoResponse for AdminApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct AdminUsersQuery {
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AdminUsersResponse {
    pub users: Vec<AdminUserEntry>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/users", get(list_users).fallback(not_found))
        .fallback(not_found)
        .with_state(state)
}

/// All users merged with their profile roles
pub async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<AdminUsersQuery>,
) -> Result<Json<AdminUsersResponse>, AdminApiError> {
    let claims = authenticate(&state, &headers).await?;

    let users = state
        .services
        .users
        .list_users_for_admin(claims.user_id, query.search.as_deref())
        .await?;

    Ok(Json(AdminUsersResponse { users }))
}

/// Anything else under the function, still behind the gate
async fn not_found(State(state): State<AppState>, headers: HeaderMap) -> AdminApiError {
    let gate = async {
        let claims = authenticate(&state, &headers).await?;
        state.services.users.require_admin_profile(claims.user_id).await?;
        Ok::<_, AdminApiError>(())
    };

    match gate.await {
        Ok(()) => AdminApiError::not_found(),
        Err(e) => e,
    }
}

/// The token may come with or without the `Bearer ` prefix
async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<UserClaims, AdminApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(AdminApiError::unauthorized)?;

    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
    if token.is_empty() {
        return Err(AdminApiError::unauthorized());
    }

    Ok(state.services.users.validate_token(token).await?)
}
