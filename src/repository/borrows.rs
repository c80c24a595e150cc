//! Borrows repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::Book,
        borrow::{Borrow, BorrowDetails, BorrowStatus, BorrowWithBook},
        user::{UserInfo, UserMetadata},
    },
};

/// Effect of a status change on the book's availability flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityChange {
    Unchanged,
    /// Book leaves the shelf; fails when it is already out
    CheckOut,
    CheckIn,
}

impl AvailabilityChange {
    pub fn for_transition(to: BorrowStatus) -> Self {
        match to {
            BorrowStatus::Approved => AvailabilityChange::CheckOut,
            BorrowStatus::Returned => AvailabilityChange::CheckIn,
            BorrowStatus::Requested | BorrowStatus::Denied => AvailabilityChange::Unchanged,
        }
    }
}

const BORROW_WITH_BOOK_COLUMNS: &str = r#"
    br.id, br.book_id, br.user_id, br.borrow_date, br.due_date, br.return_date, br.status,
    b.title AS book_title, b.author AS book_author, b.isbn AS book_isbn,
    b.category AS book_category, b.cover_image_url AS book_cover_image_url,
    b.available AS book_available, b.created_at AS book_created_at,
    b.updated_at AS book_updated_at
"#;

#[derive(Clone)]
pub struct BorrowsRepository {
    pool: Pool<Postgres>,
}

impl BorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get borrow by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Borrow> {
        sqlx::query_as::<_, Borrow>("SELECT * FROM borrows WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrow with id {} not found", id)))
    }

    pub async fn create(&self, borrow: &Borrow) -> AppResult<Borrow> {
        let created = sqlx::query_as::<_, Borrow>(
            r#"
            INSERT INTO borrows (id, book_id, user_id, borrow_date, due_date, return_date, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(borrow.id)
        .bind(borrow.book_id)
        .bind(borrow.user_id)
        .bind(borrow.borrow_date)
        .bind(borrow.due_date)
        .bind(borrow.return_date)
        .bind(borrow.status)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Borrows of one user with their books, newest first
    pub async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<BorrowWithBook>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM borrows br
            JOIN books b ON b.id = br.book_id
            WHERE br.user_id = $1
            ORDER BY br.borrow_date DESC
            "#,
            BORROW_WITH_BOOK_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let now = Utc::now();
        rows.iter()
            .map(|row| -> AppResult<BorrowWithBook> {
                let borrow = borrow_from_row(row)?;
                let book = book_from_row(row)?;
                Ok(BorrowWithBook {
                    is_overdue: borrow.is_overdue(now),
                    borrow,
                    book,
                })
            })
            .collect()
    }

    /// All borrows with book and borrower, newest first
    pub async fn list_all(&self, status: Option<BorrowStatus>) -> AppResult<Vec<BorrowDetails>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {},
                   u.email AS user_email, u.role AS user_role, u.full_name AS user_full_name
            FROM borrows br
            JOIN books b ON b.id = br.book_id
            JOIN users u ON u.id = br.user_id
            WHERE ($1::text IS NULL OR br.status = $1)
            ORDER BY br.borrow_date DESC
            "#,
            BORROW_WITH_BOOK_COLUMNS
        ))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;

        let now = Utc::now();
        rows.iter()
            .map(|row| -> AppResult<BorrowDetails> {
                let borrow = borrow_from_row(row)?;
                let book = book_from_row(row)?;
                let user = UserInfo {
                    id: borrow.user_id,
                    email: row.try_get("user_email")?,
                    user_metadata: UserMetadata {
                        role: row.try_get("user_role")?,
                        full_name: row.try_get("user_full_name")?,
                    },
                };
                Ok(BorrowDetails {
                    is_overdue: borrow.is_overdue(now),
                    borrow,
                    book,
                    user,
                })
            })
            .collect()
    }

    /// Move a borrow to `to` and write back book availability in one
    /// transaction.
    ///
    /// The update only matches while the stored status still equals
    /// `borrow.status`; a concurrent change turns into a conflict.
    pub async fn transition(
        &self,
        borrow: &Borrow,
        to: BorrowStatus,
        now: DateTime<Utc>,
    ) -> AppResult<Borrow> {
        let mut tx = self.pool.begin().await?;

        let next = borrow.with_status(to, now);

        let updated = sqlx::query_as::<_, Borrow>(
            r#"
            UPDATE borrows
            SET status = $1, return_date = $2
            WHERE id = $3 AND status = $4
            RETURNING *
            "#,
        )
        .bind(next.status)
        .bind(next.return_date)
        .bind(borrow.id)
        .bind(borrow.status)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::Conflict(format!("Borrow {} was modified by another request", borrow.id))
        })?;

        match AvailabilityChange::for_transition(to) {
            AvailabilityChange::CheckOut => {
                let result = sqlx::query(
                    "UPDATE books SET available = FALSE, updated_at = NOW() WHERE id = $1 AND available",
                )
                .bind(borrow.book_id)
                .execute(&mut *tx)
                .await?;

                if result.rows_affected() == 0 {
                    return Err(AppError::BusinessRule("Book is not available".to_string()));
                }
            }
            AvailabilityChange::CheckIn => {
                sqlx::query("UPDATE books SET available = TRUE, updated_at = NOW() WHERE id = $1")
                    .bind(borrow.book_id)
                    .execute(&mut *tx)
                    .await?;
            }
            AvailabilityChange::Unchanged => {}
        }

        tx.commit().await?;

        Ok(updated)
    }

    pub async fn count_by_status(&self, status: BorrowStatus) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM borrows WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn borrow_from_row(row: &PgRow) -> Result<Borrow, sqlx::Error> {
    Ok(Borrow {
        id: row.try_get("id")?,
        book_id: row.try_get("book_id")?,
        user_id: row.try_get("user_id")?,
        borrow_date: row.try_get("borrow_date")?,
        due_date: row.try_get("due_date")?,
        return_date: row.try_get("return_date")?,
        status: row.try_get("status")?,
    })
}

fn book_from_row(row: &PgRow) -> Result<Book, sqlx::Error> {
    Ok(Book {
        id: row.try_get("book_id")?,
        title: row.try_get("book_title")?,
        author: row.try_get("book_author")?,
        isbn: row.try_get("book_isbn")?,
        category: row.try_get("book_category")?,
        cover_image_url: row.try_get("book_cover_image_url")?,
        available: row.try_get("book_available")?,
        created_at: row.try_get("book_created_at")?,
        updated_at: row.try_get("book_updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_follows_status() {
        assert_eq!(
            AvailabilityChange::for_transition(BorrowStatus::Approved),
            AvailabilityChange::CheckOut
        );
        assert_eq!(
            AvailabilityChange::for_transition(BorrowStatus::Returned),
            AvailabilityChange::CheckIn
        );
        assert_eq!(
            AvailabilityChange::for_transition(BorrowStatus::Denied),
            AvailabilityChange::Unchanged
        );
    }
}
