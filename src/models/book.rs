//! Book (catalog) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema, PartialEq)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub category: String,
    pub cover_image_url: Option<String>,
    /// Whether the book can currently be lent
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Book list filters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Case-insensitive substring matched against title or author
    pub search: Option<String>,
    pub category: Option<String>,
    pub available: Option<bool>,
}

impl BookQuery {
    /// Search term, ignoring blank input
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn category_filter(&self) -> Option<&str> {
        self.category.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

fn default_available() -> bool {
    true
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    #[validate(length(min = 1, message = "ISBN is required"))]
    pub isbn: String,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
    pub cover_image_url: Option<String>,
    #[serde(default = "default_available")]
    pub available: bool,
}

/// Partial book update; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: Option<String>,
    #[validate(length(min = 1, message = "ISBN is required"))]
    pub isbn: Option<String>,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: Option<String>,
    pub cover_image_url: Option<String>,
    pub available: Option<bool>,
}

fn trim_owned(value: String) -> String {
    value.trim().to_string()
}

impl CreateBook {
    /// Strip surrounding whitespace so blank fields fail `length(min = 1)`
    pub fn trimmed(self) -> Self {
        Self {
            title: trim_owned(self.title),
            author: trim_owned(self.author),
            isbn: trim_owned(self.isbn),
            category: trim_owned(self.category),
            ..self
        }
    }
}

impl UpdateBook {
    pub fn trimmed(self) -> Self {
        Self {
            title: self.title.map(trim_owned),
            author: self.author.map(trim_owned),
            isbn: self.isbn.map(trim_owned),
            category: self.category.map(trim_owned),
            ..self
        }
    }
}

/// Distinct categories in first-seen order.
///
/// Callers pass categories already sorted, so the result is sorted too.
pub fn unique_categories<I>(categories: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = std::collections::HashSet::new();
    categories
        .into_iter()
        .filter(|category| seen.insert(category.clone()))
        .collect()
}
