//! Repository for the `rooms` table.

use chrono::NaiveDate;
use innkeep_core::booking::blocking_status_ids;
use innkeep_core::room::{RoomFilter, RoomSpec, RoomStatus};
use innkeep_core::types::DbId;
use sqlx::PgPool;

use crate::models::room::RoomRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, room_number, room_type, capacity, price_per_night, status_id, \
                       description, amenities, image_url, created_at, updated_at";

/// Result of [`RoomRepo::deactivate`].
#[derive(Debug)]
pub enum Deactivation {
    Deactivated(RoomRow),
    /// Blocking bookings still checking out after the reference date.
    Blocked(i64),
    Missing,
}

/// Provides CRUD operations for rooms.
pub struct RoomRepo;

impl RoomRepo {
    /// Insert a new active room, returning the created row.
    pub async fn create(pool: &PgPool, spec: &RoomSpec) -> Result<RoomRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO rooms (room_number, room_type, capacity, price_per_night, status_id, \
                                description, amenities, image_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RoomRow>(&query)
            .bind(&spec.room_number)
            .bind(&spec.room_type)
            .bind(spec.capacity)
            .bind(spec.price_per_night)
            .bind(RoomStatus::Active.id())
            .bind(&spec.description)
            .bind(&spec.amenities)
            .bind(&spec.image_url)
            .fetch_one(pool)
            .await
    }

    /// Replace every editable column. Returns `None` if no row with `id`
    /// exists.
    pub async fn replace(
        pool: &PgPool,
        id: DbId,
        spec: &RoomSpec,
    ) -> Result<Option<RoomRow>, sqlx::Error> {
        let query = format!(
            "UPDATE rooms SET \
                 room_number = $2, room_type = $3, capacity = $4, price_per_night = $5, \
                 description = $6, amenities = $7, image_url = $8 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RoomRow>(&query)
            .bind(id)
            .bind(&spec.room_number)
            .bind(&spec.room_type)
            .bind(spec.capacity)
            .bind(spec.price_per_night)
            .bind(&spec.description)
            .bind(&spec.amenities)
            .bind(&spec.image_url)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<RoomRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rooms WHERE id = $1");
        sqlx::query_as::<_, RoomRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List rooms matching the filter, ordered by id. Room type matching is
    /// case-insensitive.
    pub async fn list(pool: &PgPool, filter: &RoomFilter) -> Result<Vec<RoomRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rooms \
             WHERE ($1::SMALLINT IS NULL OR status_id = $1) \
               AND ($2::TEXT IS NULL OR LOWER(room_type) = LOWER($2)) \
               AND ($3::INTEGER IS NULL OR capacity >= $3) \
             ORDER BY id"
        );
        sqlx::query_as::<_, RoomRow>(&query)
            .bind(filter.status.map(RoomStatus::id))
            .bind(&filter.room_type)
            .bind(filter.min_capacity)
            .fetch_all(pool)
            .await
    }

    /// Set a room's status. Returns `None` if no row with `id` exists.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: RoomStatus,
    ) -> Result<Option<RoomRow>, sqlx::Error> {
        let query = format!("UPDATE rooms SET status_id = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, RoomRow>(&query)
            .bind(id)
            .bind(status.id())
            .fetch_optional(pool)
            .await
    }

    /// Mark a room inactive unless a blocking booking checks out after
    /// `today`.
    ///
    /// Locks the room row for the duration of the check, the same lock
    /// [`BookingRepo::reserve`](super::BookingRepo::reserve) takes, so no
    /// reservation can slip in between the count and the update.
    pub async fn deactivate(
        pool: &PgPool,
        id: DbId,
        today: NaiveDate,
    ) -> Result<Deactivation, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let locked: Option<(DbId,)> = sqlx::query_as("SELECT id FROM rooms WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Ok(Deactivation::Missing);
        }

        let (active,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*)::BIGINT FROM bookings \
             WHERE room_id = $1 AND status_id = ANY($2) AND check_out > $3",
        )
        .bind(id)
        .bind(blocking_status_ids())
        .bind(today)
        .fetch_one(&mut *tx)
        .await?;
        if active > 0 {
            return Ok(Deactivation::Blocked(active));
        }

        let query = format!("UPDATE rooms SET status_id = $2 WHERE id = $1 RETURNING {COLUMNS}");
        let row = sqlx::query_as::<_, RoomRow>(&query)
            .bind(id)
            .bind(RoomStatus::Inactive.id())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Deactivation::Deactivated(row))
    }
}
