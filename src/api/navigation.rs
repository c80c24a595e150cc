//! Client route guard endpoint

use axum::{extract::Query, Json};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::navigation::{self, Decision};

use super::AuthenticatedUser;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NavigationQuery {
    /// Client path being opened, e.g. `/admin/books`
    pub path: String,
}

/// Where a client navigation should land; the token is optional
#[utoipa::path(
    get,
    path = "/navigation",
    tag = "navigation",
    params(NavigationQuery),
    responses(
        (status = 200, description = "Allow, redirect or not found", body = Decision)
    )
)]
pub async fn resolve_navigation(
    user: Option<AuthenticatedUser>,
    Query(query): Query<NavigationQuery>,
) -> Json<Decision> {
    let role = user.map(|AuthenticatedUser(claims)| claims.role);
    Json(navigation::resolve(&query.path, role))
}
