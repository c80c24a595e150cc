//! Admin registration codes and dashboard figures

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::admin_code::{generate_code, AdminCode},
    repository::Repository,
};

/// Upper bound on codes minted in one request
pub const MAX_CODES_PER_REQUEST: usize = 50;

/// Figures shown on the admin dashboard
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminStats {
    pub total_books: i64,
    pub available_books: i64,
    pub pending_borrows: i64,
}

#[derive(Clone)]
pub struct AdminService {
    repository: Repository,
}

impl AdminService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Mint `count` fresh codes (at least one, at most MAX_CODES_PER_REQUEST)
    pub async fn mint_codes(&self, count: Option<usize>) -> AppResult<Vec<AdminCode>> {
        let count = clamp_count(count);
        let mut codes = Vec::with_capacity(count);
        for _ in 0..count {
            codes.push(self.repository.admin_codes.create(&generate_code()).await?);
        }
        tracing::info!(count = codes.len(), "Admin codes minted");
        Ok(codes)
    }

    pub async fn list_codes(&self) -> AppResult<Vec<AdminCode>> {
        self.repository.admin_codes.list().await
    }

    pub async fn stats(&self) -> AppResult<AdminStats> {
        let total_books = self.repository.books.count_all().await?;
        let available_books = self.repository.books.count_available().await?;
        let pending_borrows = self
            .repository
            .borrows
            .count_by_status(crate::models::BorrowStatus::Requested)
            .await?;

        Ok(AdminStats {
            total_books,
            available_books,
            pending_borrows,
        })
    }
}

fn clamp_count(count: Option<usize>) -> usize {
    count.unwrap_or(1).clamp(1, MAX_CODES_PER_REQUEST)
}
