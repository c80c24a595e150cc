//! Admin codes repository

use sqlx::{PgConnection, Pool, Postgres};
use uuid::Uuid;

use crate::{error::AppResult, models::admin_code::AdminCode};

#[derive(Clone)]
pub struct AdminCodesRepository {
    pool: Pool<Postgres>,
}

impl AdminCodesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, code: &str) -> AppResult<AdminCode> {
        let created = sqlx::query_as::<_, AdminCode>(
            r#"
            INSERT INTO admin_codes (id, code, is_used, used_at, created_at)
            VALUES ($1, $2, FALSE, NULL, NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(code)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Unused codes first, newest first
    pub async fn list(&self) -> AppResult<Vec<AdminCode>> {
        let codes = sqlx::query_as::<_, AdminCode>(
            "SELECT * FROM admin_codes ORDER BY is_used, created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(codes)
    }
}

/// Mark an unused code as used. Returns false when the code is unknown or
/// was already claimed.
pub async fn claim(conn: &mut PgConnection, code: &str) -> AppResult<bool> {
    let claimed = sqlx::query_scalar::<_, Uuid>(
        r#"
        UPDATE admin_codes
        SET is_used = TRUE, used_at = NOW()
        WHERE code = $1 AND NOT is_used
        RETURNING id
        "#,
    )
    .bind(code)
    .fetch_optional(conn)
    .await?;

    if let Some(id) = claimed {
        tracing::info!(admin_code_id = %id, "Admin code claimed");
    }

    Ok(claimed.is_some())
}
