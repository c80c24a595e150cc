//! Client route table and access decisions

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::Role;

/// Who may open a client route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    Public,
    Authenticated,
    Admin,
}

/// Client routes; `:param` segments match any non-empty segment
pub const ROUTES: &[(&str, Access)] = &[
    ("/", Access::Public),
    ("/login", Access::Public),
    ("/register", Access::Public),
    ("/books", Access::Authenticated),
    ("/books/:id", Access::Authenticated),
    ("/profile", Access::Authenticated),
    ("/admin", Access::Admin),
    ("/admin/books", Access::Admin),
    ("/admin/books/add", Access::Admin),
    ("/admin/books/edit/:id", Access::Admin),
    ("/admin/users", Access::Admin),
];

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

/// Outcome of a navigation attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    Allow,
    Redirect { to: String },
    NotFound,
}

/// Decide where a navigation to `path` lands for a caller with `role`
/// (`None` when signed out).
pub fn resolve(path: &str, role: Option<Role>) -> Decision {
    let access = match route_access(path) {
        Some(access) => access,
        None => return Decision::NotFound,
    };

    match (access, role) {
        (Access::Public, _) => Decision::Allow,
        (_, None) => Decision::Redirect {
            to: LOGIN_PATH.to_string(),
        },
        (Access::Admin, Some(Role::Member)) => Decision::Redirect {
            to: HOME_PATH.to_string(),
        },
        _ => Decision::Allow,
    }
}

/// Access level of the route matching `path`, ignoring query and trailing slash
pub fn route_access(path: &str) -> Option<Access> {
    let path = normalize(path);
    ROUTES
        .iter()
        .find(|(pattern, _)| matches_pattern(pattern, &path))
        .map(|(_, access)| *access)
}

fn normalize(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or("");
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

fn matches_pattern(pattern: &str, path: &str) -> bool {
    let pattern_segments: Vec<&str> = pattern.split('/').collect();
    let path_segments: Vec<&str> = path.split('/').collect();

    pattern_segments.len() == path_segments.len()
        && pattern_segments
            .iter()
            .zip(&path_segments)
            .all(|(expected, actual)| {
                if expected.starts_with(':') {
                    !actual.is_empty()
                } else {
                    expected == actual
                }
            })
}
