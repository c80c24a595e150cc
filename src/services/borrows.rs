//! Borrow workflow service

use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        borrow::{Borrow, BorrowDetails, BorrowStatus, BorrowWithBook},
        user::UserClaims,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct BorrowsService {
    repository: Repository,
    loan_period_days: i64,
}

impl BorrowsService {
    pub fn new(repository: Repository, loan_period_days: i64) -> Self {
        Self {
            repository,
            loan_period_days,
        }
    }

    /// Ask to borrow a book; due date is fixed now, relative to the request
    pub async fn request_borrow(&self, book_id: Uuid, user_id: Uuid) -> AppResult<Borrow> {
        let book = self.repository.books.get_by_id(book_id).await?;
        if !book.available {
            return Err(AppError::BusinessRule("Book is not available".to_string()));
        }

        let borrow = Borrow::new_request(book.id, user_id, Utc::now(), self.loan_period_days);
        let created = self.repository.borrows.create(&borrow).await?;

        tracing::info!(
            borrow_id = %created.id,
            book_id = %created.book_id,
            user_id = %created.user_id,
            due_date = %created.due_date,
            "Borrow requested"
        );

        Ok(created)
    }

    /// Admin status change: approve, deny or mark returned
    pub async fn update_status(&self, borrow_id: Uuid, status: BorrowStatus) -> AppResult<Borrow> {
        let borrow = self.repository.borrows.get_by_id(borrow_id).await?;
        self.apply(borrow, status).await
    }

    /// Return a book; the borrower or an admin may do this
    pub async fn return_book(&self, borrow_id: Uuid, caller: &UserClaims) -> AppResult<Borrow> {
        let borrow = self.repository.borrows.get_by_id(borrow_id).await?;
        if borrow.user_id != caller.user_id && !caller.is_admin() {
            return Err(AppError::Authorization(
                "Only the borrower or an administrator can return this book".to_string(),
            ));
        }
        self.apply(borrow, BorrowStatus::Returned).await
    }

    pub async fn user_borrows(&self, user_id: Uuid) -> AppResult<Vec<BorrowWithBook>> {
        self.repository.borrows.list_for_user(user_id).await
    }

    pub async fn all_borrows(&self, status: Option<BorrowStatus>) -> AppResult<Vec<BorrowDetails>> {
        self.repository.borrows.list_all(status).await
    }

    async fn apply(&self, borrow: Borrow, status: BorrowStatus) -> AppResult<Borrow> {
        check_transition(borrow.status, status)?;

        let updated = self
            .repository
            .borrows
            .transition(&borrow, status, Utc::now())
            .await?;

        tracing::info!(
            borrow_id = %updated.id,
            from = %borrow.status,
            to = %updated.status,
            "Borrow status changed"
        );

        Ok(updated)
    }
}

fn check_transition(from: BorrowStatus, to: BorrowStatus) -> AppResult<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(AppError::BusinessRule(format!(
            "Cannot change borrow status from {} to {}",
            from, to
        )))
    }
}
