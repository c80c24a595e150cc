//! Borrow workflow endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::borrow::{Borrow, BorrowDetails, BorrowQuery, BorrowWithBook, CreateBorrow, UpdateBorrowStatus},
};

use super::{AdminUser, AuthenticatedUser};

/// Request to borrow a book
#[utoipa::path(
    post,
    path = "/borrows",
    tag = "borrows",
    security(("bearer_auth" = [])),
    request_body = CreateBorrow,
    responses(
        (status = 201, description = "Borrow requested", body = Borrow),
        (status = 404, description = "Book not found"),
        (status = 422, description = "Book is not available")
    )
)]
pub async fn request_borrow(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateBorrow>,
) -> AppResult<(StatusCode, Json<Borrow>)> {
    let borrow = state
        .services
        .borrows
        .request_borrow(request.book_id, claims.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(borrow)))
}

/// Borrows of the signed-in user, newest first
#[utoipa::path(
    get,
    path = "/borrows/me",
    tag = "borrows",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's borrows", body = Vec<BorrowWithBook>)
    )
)]
pub async fn my_borrows(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BorrowWithBook>>> {
    let borrows = state.services.borrows.user_borrows(claims.user_id).await?;
    Ok(Json(borrows))
}

/// All borrows, optionally filtered by status
#[utoipa::path(
    get,
    path = "/borrows",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(BorrowQuery),
    responses(
        (status = 200, description = "Borrows with book and borrower", body = Vec<BorrowDetails>),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn list_borrows(
    State(state): State<crate::AppState>,
    AdminUser(_claims): AdminUser,
    Query(query): Query<BorrowQuery>,
) -> AppResult<Json<Vec<BorrowDetails>>> {
    let borrows = state.services.borrows.all_borrows(query.status).await?;
    Ok(Json(borrows))
}

/// Approve, deny or mark a borrow returned
#[utoipa::path(
    put,
    path = "/borrows/{id}/status",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Borrow ID")
    ),
    request_body = UpdateBorrowStatus,
    responses(
        (status = 200, description = "Status changed", body = Borrow),
        (status = 404, description = "Borrow not found"),
        (status = 409, description = "Borrow changed concurrently"),
        (status = 422, description = "Transition not allowed or book unavailable")
    )
)]
pub async fn update_borrow_status(
    State(state): State<crate::AppState>,
    AdminUser(_claims): AdminUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateBorrowStatus>,
) -> AppResult<Json<Borrow>> {
    let borrow = state.services.borrows.update_status(id, request.status).await?;
    Ok(Json(borrow))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/borrows/{id}/return",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Borrow ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = Borrow),
        (status = 403, description = "Not the borrower"),
        (status = 422, description = "Borrow is not approved")
    )
)]
pub async fn return_borrow(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Borrow>> {
    let borrow = state.services.borrows.return_book(id, &claims).await?;
    Ok(Json(borrow))
}
