//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{admin, auth, books, borrows, health, navigation};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookshelf API",
        version = "1.0.0",
        description = "Library lending REST API: catalog, borrow workflow and accounts",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::logout,
        auth::me,
        // Books
        books::list_books,
        books::list_categories,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        books::upload_cover,
        // Borrows
        borrows::request_borrow,
        borrows::my_borrows,
        borrows::list_borrows,
        borrows::update_borrow_status,
        borrows::return_borrow,
        // Admin
        admin::get_stats,
        admin::list_codes,
        admin::create_codes,
        // Navigation
        navigation::resolve_navigation,
    ),
    components(
        schemas(
            // Auth
            auth::LoginResponse,
            crate::models::user::RegisterRequest,
            crate::models::user::LoginRequest,
            crate::models::user::UserInfo,
            crate::models::user::UserMetadata,
            crate::models::user::Role,
            // Books
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            books::CoverUpload,
            books::CoverUploadResponse,
            // Borrows
            crate::models::borrow::Borrow,
            crate::models::borrow::BorrowStatus,
            crate::models::borrow::BorrowWithBook,
            crate::models::borrow::BorrowDetails,
            crate::models::borrow::CreateBorrow,
            crate::models::borrow::UpdateBorrowStatus,
            // Admin
            crate::models::admin_code::AdminCode,
            crate::models::admin_code::CreateAdminCodes,
            crate::services::admin::AdminStats,
            // Navigation
            crate::navigation::Decision,
            crate::navigation::Access,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Sign-up, sign-in and session"),
        (name = "books", description = "Book catalog"),
        (name = "borrows", description = "Borrow requests and returns"),
        (name = "admin", description = "Dashboard and admin codes"),
        (name = "navigation", description = "Client route guard")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
