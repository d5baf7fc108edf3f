//! Repository for the `guests` table.

use innkeep_core::guest::GuestContact;
use innkeep_core::types::DbId;
use sqlx::PgPool;

use crate::models::guest::GuestRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, email, phone, created_at, updated_at";

/// Shared search predicate over name, email and phone.
const SEARCH: &str = "($1::TEXT IS NULL OR name ILIKE $1 OR email ILIKE $1 OR phone ILIKE $1)";

/// Provides CRUD operations for guests.
pub struct GuestRepo;

impl GuestRepo {
    pub async fn create(pool: &PgPool, contact: &GuestContact) -> Result<GuestRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO guests (name, email, phone) VALUES ($1, $2, $3) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GuestRow>(&query)
            .bind(&contact.name)
            .bind(&contact.email)
            .bind(&contact.phone)
            .fetch_one(pool)
            .await
    }

    /// Overwrite name, email and phone. Returns `None` if no row with `id`
    /// exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        contact: &GuestContact,
    ) -> Result<Option<GuestRow>, sqlx::Error> {
        let query = format!(
            "UPDATE guests SET name = $2, email = $3, phone = $4 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GuestRow>(&query)
            .bind(id)
            .bind(&contact.name)
            .bind(&contact.email)
            .bind(&contact.phone)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<GuestRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM guests WHERE id = $1");
        sqlx::query_as::<_, GuestRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Exact, case-sensitive email match.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<GuestRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM guests WHERE email = $1");
        sqlx::query_as::<_, GuestRow>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// One page of guests matching `search`, ordered by id.
    pub async fn list(
        pool: &PgPool,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<GuestRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM guests WHERE {SEARCH} ORDER BY id LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, GuestRow>(&query)
            .bind(search.map(like_pattern))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Number of guests matching `search`, ignoring pagination.
    pub async fn count(pool: &PgPool, search: Option<&str>) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*)::BIGINT FROM guests WHERE {SEARCH}");
        let (count,): (i64,) = sqlx::query_as(&query)
            .bind(search.map(like_pattern))
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Delete a guest. Fails with a foreign-key violation while bookings
    /// reference the row.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM guests WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// `%term%` with LIKE metacharacters escaped.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
