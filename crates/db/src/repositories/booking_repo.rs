//! Repository for the `bookings` table.
//!
//! `reserve` and `revise` lock the room row (`SELECT ... FOR UPDATE`) before
//! checking for overlaps, which serializes every write against one room.
//! The `ex_bookings_room_overlap` exclusion constraint backstops the same
//! rule at the storage layer.

use innkeep_core::booking::{
    blocking_status_ids, BookingOrder, BookingQuery, BookingRevision, BookingStatus, NewBooking,
    StatusChange,
};
use innkeep_core::room::RoomStatus;
use innkeep_core::stay::{total_price, StayRange};
use innkeep_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::booking::BookingRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, guest_id, room_id, check_in, check_out, status_id, total_price, \
                       special_requests, guest_count, reference_number, cancellation_fee, \
                       cancellation_reason, cancelled_at, actual_check_in, actual_check_out, \
                       created_at, updated_at";

/// Result of [`BookingRepo::revise`].
#[derive(Debug)]
pub enum ReviseOutcome {
    Revised(BookingRow),
    /// Another blocking booking overlaps the new dates.
    Unavailable { room_id: DbId },
    /// The booking is missing or no longer in an editable status.
    NotEditable,
}

/// Provides CRUD and reservation operations for bookings.
pub struct BookingRepo;

impl BookingRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<BookingRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bookings WHERE id = $1");
        sqlx::query_as::<_, BookingRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_reference(
        pool: &PgPool,
        reference: &str,
    ) -> Result<Option<BookingRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bookings WHERE reference_number = $1");
        sqlx::query_as::<_, BookingRow>(&query)
            .bind(reference)
            .fetch_optional(pool)
            .await
    }

    /// List bookings matching every set field of `filter`.
    pub async fn list(pool: &PgPool, filter: &BookingQuery) -> Result<Vec<BookingRow>, sqlx::Error> {
        let direction = match filter.order {
            BookingOrder::CheckInAsc => "ASC",
            BookingOrder::CheckInDesc => "DESC",
        };
        let query = format!(
            "SELECT {COLUMNS} FROM bookings \
             WHERE (cardinality($1::SMALLINT[]) = 0 OR status_id = ANY($1)) \
               AND (NOT $2::BOOL OR status_id = ANY($3)) \
               AND ($4::BIGINT IS NULL OR guest_id = $4) \
               AND ($5::BIGINT IS NULL OR room_id = $5) \
               AND ($6::DATE IS NULL OR check_in = $6) \
               AND ($7::DATE IS NULL OR check_in > $7) \
               AND ($8::DATE IS NULL OR (check_in < $9 AND check_out > $8)) \
               AND ($10::DATE IS NULL OR (check_in <= $10 AND check_out > $10)) \
             ORDER BY check_in {direction}, id ASC"
        );
        let statuses: Vec<i16> = filter.statuses.iter().map(|s| s.id()).collect();
        sqlx::query_as::<_, BookingRow>(&query)
            .bind(statuses)
            .bind(filter.blocking_only)
            .bind(blocking_status_ids())
            .bind(filter.guest_id)
            .bind(filter.room_id)
            .bind(filter.check_in_on)
            .bind(filter.check_in_after)
            .bind(filter.overlapping.map(|r| r.check_in()))
            .bind(filter.overlapping.map(|r| r.check_out()))
            .bind(filter.in_house_on)
            .fetch_all(pool)
            .await
    }

    /// Insert a booking, priced at the locked room's rate, if the room is
    /// active and no blocking booking on it overlaps the stay. Returns `None`
    /// when the room is inactive, missing or taken.
    pub async fn reserve(
        pool: &PgPool,
        booking: &NewBooking,
    ) -> Result<Option<BookingRow>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let price_per_night = match lock_room(&mut tx, booking.room_id).await? {
            Some(room) if room.status_id == RoomStatus::Active.id() => room.price_per_night,
            _ => return Ok(None),
        };
        if count_overlaps(&mut tx, booking.room_id, &booking.stay, None).await? > 0 {
            return Ok(None);
        }

        let query = format!(
            "INSERT INTO bookings (guest_id, room_id, check_in, check_out, status_id, \
                                   total_price, special_requests, guest_count, reference_number) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, BookingRow>(&query)
            .bind(booking.guest_id)
            .bind(booking.room_id)
            .bind(booking.stay.check_in())
            .bind(booking.stay.check_out())
            .bind(booking.status.id())
            .bind(total_price(price_per_night, &booking.stay))
            .bind(&booking.special_requests)
            .bind(booking.guest_count)
            .bind(&booking.reference_number)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(row))
    }

    /// Rewrite dates, price, guest count and requests while the booking is in
    /// one of `editable`, re-checking overlap against every other booking on
    /// the room.
    pub async fn revise(
        pool: &PgPool,
        id: DbId,
        editable: &[BookingStatus],
        revision: &BookingRevision,
    ) -> Result<ReviseOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Room first, then booking: the same order `reserve` uses.
        let room_id: Option<(DbId,)> = sqlx::query_as("SELECT room_id FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some((room_id,)) = room_id else {
            return Ok(ReviseOutcome::NotEditable);
        };
        lock_room(&mut tx, room_id).await?;

        let status: Option<(i16,)> =
            sqlx::query_as("SELECT status_id FROM bookings WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let editable_ids: Vec<i16> = editable.iter().map(|s| s.id()).collect();
        match status {
            Some((status_id,)) if editable_ids.contains(&status_id) => {}
            _ => return Ok(ReviseOutcome::NotEditable),
        }

        if count_overlaps(&mut tx, room_id, &revision.stay, Some(id)).await? > 0 {
            return Ok(ReviseOutcome::Unavailable { room_id });
        }

        let query = format!(
            "UPDATE bookings SET \
                 check_in = $2, check_out = $3, total_price = $4, guest_count = $5, \
                 special_requests = $6 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, BookingRow>(&query)
            .bind(id)
            .bind(revision.stay.check_in())
            .bind(revision.stay.check_out())
            .bind(revision.total_price)
            .bind(revision.guest_count)
            .bind(&revision.special_requests)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(ReviseOutcome::Revised(row))
    }

    /// Apply a status change only while the booking is still in `expected`.
    /// Unset optional columns keep their stored values.
    pub async fn change_status(
        pool: &PgPool,
        id: DbId,
        expected: BookingStatus,
        change: &StatusChange,
    ) -> Result<Option<BookingRow>, sqlx::Error> {
        let query = format!(
            "UPDATE bookings SET \
                 status_id = $3, \
                 cancellation_fee = COALESCE($4, cancellation_fee), \
                 cancellation_reason = COALESCE($5, cancellation_reason), \
                 cancelled_at = COALESCE($6, cancelled_at), \
                 actual_check_in = COALESCE($7, actual_check_in), \
                 actual_check_out = COALESCE($8, actual_check_out) \
             WHERE id = $1 AND status_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BookingRow>(&query)
            .bind(id)
            .bind(expected.id())
            .bind(change.status.id())
            .bind(change.cancellation_fee)
            .bind(&change.cancellation_reason)
            .bind(change.cancelled_at)
            .bind(change.actual_check_in)
            .bind(change.actual_check_out)
            .fetch_optional(pool)
            .await
    }
}

/// Room columns read under the row lock.
#[derive(Debug, sqlx::FromRow)]
struct LockedRoom {
    status_id: i16,
    price_per_night: f64,
}

/// Take the per-room write lock for the rest of the transaction.
async fn lock_room(
    conn: &mut PgConnection,
    room_id: DbId,
) -> Result<Option<LockedRoom>, sqlx::Error> {
    sqlx::query_as::<_, LockedRoom>(
        "SELECT status_id, price_per_night FROM rooms WHERE id = $1 FOR UPDATE",
    )
    .bind(room_id)
    .fetch_optional(conn)
    .await
}

/// Blocking bookings on `room_id` overlapping `stay`, ignoring `exclude`.
async fn count_overlaps(
    conn: &mut PgConnection,
    room_id: DbId,
    stay: &StayRange,
    exclude: Option<DbId>,
) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*)::BIGINT FROM bookings \
         WHERE room_id = $1 \
           AND status_id = ANY($2) \
           AND check_in < $4 AND check_out > $3 \
           AND ($5::BIGINT IS NULL OR id <> $5)",
    )
    .bind(room_id)
    .bind(blocking_status_ids())
    .bind(stay.check_in())
    .bind(stay.check_out())
    .bind(exclude)
    .fetch_one(conn)
    .await?;
    Ok(count)
}
