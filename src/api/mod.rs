//! API handlers for Bookshelf REST endpoints

pub mod admin;
pub mod admin_api;
pub mod auth;
pub mod books;
pub mod borrows;
pub mod health;
pub mod navigation;
pub mod openapi;

use axum::{
    async_trait,
    extract::{DefaultBodyLimit, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::{
    error::{AppError, AppResult},
    models::user::UserClaims,
    services::storage::PUBLIC_OBJECT_PATH,
    AppState,
};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let claims = state.services.users.validate_token(token).await?;
        Ok(AuthenticatedUser(claims))
    }
}

/// Authenticated user whose token carries the admin role
pub struct AdminUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(claims) = AuthenticatedUser::from_request_parts(parts, state).await?;
        claims.require_admin()?;
        Ok(AdminUser(claims))
    }
}

fn bearer_token(headers: &HeaderMap) -> AppResult<&str> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Multipart framing on top of the image itself
    let upload_limit = state.config.storage.max_upload_bytes + 64 * 1024;

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/categories", get(books::list_categories))
        .route(
            "/books/cover",
            post(books::upload_cover).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        // Borrows
        .route("/borrows", get(borrows::list_borrows).post(borrows::request_borrow))
        .route("/borrows/me", get(borrows::my_borrows))
        .route("/borrows/:id/status", put(borrows::update_borrow_status))
        .route("/borrows/:id/return", post(borrows::return_borrow))
        // Admin
        .route("/admin/stats", get(admin::get_stats))
        .route("/admin/codes", get(admin::list_codes).post(admin::create_codes))
        // Client route guard
        .route("/navigation", get(navigation::resolve_navigation))
        .with_state(state.clone());

    let storage = &state.config.storage;
    let bucket_path = format!("{}/{}", PUBLIC_OBJECT_PATH, storage.bucket);
    let bucket_dir = storage.root.join(&storage.bucket);

    Router::new()
        .nest("/api/v1", api_v1)
        .nest("/functions/v1/admin-api", admin_api::router(state))
        .nest_service(&bucket_path, ServeDir::new(bucket_dir))
        .merge(openapi::create_openapi_router())
        .fallback(route_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn route_not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}
