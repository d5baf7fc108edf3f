//! [`BookingStore`] backed by PostgreSQL.

use async_trait::async_trait;
use innkeep_core::booking::{Booking, BookingQuery, BookingRevision, BookingStatus, NewBooking, StatusChange};
use innkeep_core::error::CoreError;
use innkeep_core::guest::{Guest, GuestContact};
use innkeep_core::room::{Room, RoomFilter, RoomSpec, RoomStatus};
use innkeep_core::store::{BookingStore, GuestPage, RoomDeactivation};
use innkeep_core::types::{DbId, StayDate};

use crate::repositories::{BookingRepo, Deactivation, GuestRepo, ReviseOutcome, RoomRepo};
use crate::DbPool;

/// PostgreSQL error code for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL error code for foreign key violations.
const FOREIGN_KEY_VIOLATION: &str = "23503";
/// PostgreSQL error code for exclusion constraint violations.
const EXCLUSION_VIOLATION: &str = "23P01";

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn db_code(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().map(|c| c.into_owned()),
        _ => None,
    }
}

/// Map a sqlx error to the core taxonomy. Constraint violations become
/// `Conflict`; everything else is a `Storage` fault.
fn storage_error(err: sqlx::Error) -> CoreError {
    match (&err, db_code(&err).as_deref()) {
        (sqlx::Error::Database(db_err), Some(UNIQUE_VIOLATION)) => CoreError::Conflict(format!(
            "Duplicate value violates unique constraint: {}",
            db_err.constraint().unwrap_or("unknown")
        )),
        (sqlx::Error::Database(db_err), Some(FOREIGN_KEY_VIOLATION)) => CoreError::Conflict(
            format!(
                "Referenced record is missing or still in use: {}",
                db_err.constraint().unwrap_or("unknown")
            ),
        ),
        _ => {
            tracing::error!(error = %err, "Database error");
            CoreError::Storage(err.to_string())
        }
    }
}

/// Like [`storage_error`], but an exclusion violation on the overlap
/// constraint means the room was taken by a concurrent writer.
fn reservation_error(
    err: sqlx::Error,
    room_id: DbId,
    stay_from: StayDate,
    stay_to: StayDate,
) -> CoreError {
    if db_code(&err).as_deref() == Some(EXCLUSION_VIOLATION) {
        tracing::warn!(room_id, "Overlap rejected by exclusion constraint");
        return CoreError::RoomUnavailable {
            room_id,
            check_in: stay_from,
            check_out: stay_to,
        };
    }
    storage_error(err)
}

fn rooms(rows: Vec<crate::models::room::RoomRow>) -> Result<Vec<Room>, CoreError> {
    rows.into_iter().map(Room::try_from).collect()
}

fn bookings(rows: Vec<crate::models::booking::BookingRow>) -> Result<Vec<Booking>, CoreError> {
    rows.into_iter().map(Booking::try_from).collect()
}

#[async_trait]
impl BookingStore for PgStore {
    // -- Rooms --------------------------------------------------------------

    async fn insert_room(&self, spec: &RoomSpec) -> Result<Room, CoreError> {
        RoomRepo::create(&self.pool, spec)
            .await
            .map_err(storage_error)?
            .try_into()
    }

    async fn replace_room(&self, id: DbId, spec: &RoomSpec) -> Result<Option<Room>, CoreError> {
        RoomRepo::replace(&self.pool, id, spec)
            .await
            .map_err(storage_error)?
            .map(Room::try_from)
            .transpose()
    }

    async fn find_room(&self, id: DbId) -> Result<Option<Room>, CoreError> {
        RoomRepo::find_by_id(&self.pool, id)
            .await
            .map_err(storage_error)?
            .map(Room::try_from)
            .transpose()
    }

    async fn list_rooms(&self, filter: &RoomFilter) -> Result<Vec<Room>, CoreError> {
        rooms(RoomRepo::list(&self.pool, filter).await.map_err(storage_error)?)
    }

    async fn activate_room(&self, id: DbId) -> Result<Option<Room>, CoreError> {
        RoomRepo::set_status(&self.pool, id, RoomStatus::Active)
            .await
            .map_err(storage_error)?
            .map(Room::try_from)
            .transpose()
    }

    async fn deactivate_room(
        &self,
        id: DbId,
        today: StayDate,
    ) -> Result<RoomDeactivation, CoreError> {
        match RoomRepo::deactivate(&self.pool, id, today)
            .await
            .map_err(storage_error)?
        {
            Deactivation::Deactivated(row) => Ok(RoomDeactivation::Deactivated(row.try_into()?)),
            Deactivation::Blocked(count) => Ok(RoomDeactivation::HasActiveBookings(count)),
            Deactivation::Missing => Ok(RoomDeactivation::NotFound),
        }
    }

    // -- Guests -------------------------------------------------------------

    async fn insert_guest(&self, contact: &GuestContact) -> Result<Guest, CoreError> {
        let row = GuestRepo::create(&self.pool, contact)
            .await
            .map_err(storage_error)?;
        Ok(row.into())
    }

    async fn update_guest(
        &self,
        id: DbId,
        contact: &GuestContact,
    ) -> Result<Option<Guest>, CoreError> {
        let row = GuestRepo::update(&self.pool, id, contact)
            .await
            .map_err(storage_error)?;
        Ok(row.map(Guest::from))
    }

    async fn find_guest(&self, id: DbId) -> Result<Option<Guest>, CoreError> {
        let row = GuestRepo::find_by_id(&self.pool, id)
            .await
            .map_err(storage_error)?;
        Ok(row.map(Guest::from))
    }

    async fn find_guest_by_email(&self, email: &str) -> Result<Option<Guest>, CoreError> {
        let row = GuestRepo::find_by_email(&self.pool, email)
            .await
            .map_err(storage_error)?;
        Ok(row.map(Guest::from))
    }

    async fn list_guests(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<GuestPage, CoreError> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        let rows = GuestRepo::list(&self.pool, search, limit, offset)
            .await
            .map_err(storage_error)?;
        let total = GuestRepo::count(&self.pool, search)
            .await
            .map_err(storage_error)?;
        Ok(GuestPage {
            guests: rows.into_iter().map(Guest::from).collect(),
            total,
        })
    }

    async fn delete_guest(&self, id: DbId) -> Result<bool, CoreError> {
        GuestRepo::delete(&self.pool, id).await.map_err(|e| {
            if db_code(&e).as_deref() == Some(FOREIGN_KEY_VIOLATION) {
                CoreError::Conflict(format!(
                    "Guest {id} has booking history and cannot be deleted"
                ))
            } else {
                storage_error(e)
            }
        })
    }

    // -- Bookings -----------------------------------------------------------

    async fn find_booking(&self, id: DbId) -> Result<Option<Booking>, CoreError> {
        BookingRepo::find_by_id(&self.pool, id)
            .await
            .map_err(storage_error)?
            .map(Booking::try_from)
            .transpose()
    }

    async fn find_booking_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Booking>, CoreError> {
        BookingRepo::find_by_reference(&self.pool, reference)
            .await
            .map_err(storage_error)?
            .map(Booking::try_from)
            .transpose()
    }

    async fn list_bookings(&self, query: &BookingQuery) -> Result<Vec<Booking>, CoreError> {
        bookings(BookingRepo::list(&self.pool, query).await.map_err(storage_error)?)
    }

    async fn reserve(&self, booking: NewBooking) -> Result<Booking, CoreError> {
        let (room_id, from, to) = (
            booking.room_id,
            booking.stay.check_in(),
            booking.stay.check_out(),
        );
        match BookingRepo::reserve(&self.pool, &booking)
            .await
            .map_err(|e| reservation_error(e, room_id, from, to))?
        {
            Some(row) => row.try_into(),
            None => Err(CoreError::RoomUnavailable {
                room_id,
                check_in: from,
                check_out: to,
            }),
        }
    }

    async fn revise(
        &self,
        id: DbId,
        editable: &[BookingStatus],
        revision: BookingRevision,
    ) -> Result<Option<Booking>, CoreError> {
        let (from, to) = (revision.stay.check_in(), revision.stay.check_out());
        let Some(current) = BookingRepo::find_by_id(&self.pool, id)
            .await
            .map_err(storage_error)?
        else {
            return Ok(None);
        };
        let outcome = BookingRepo::revise(&self.pool, id, editable, &revision)
            .await
            .map_err(|e| reservation_error(e, current.room_id, from, to))?;
        match outcome {
            ReviseOutcome::Revised(row) => Ok(Some(row.try_into()?)),
            ReviseOutcome::Unavailable { room_id } => Err(CoreError::RoomUnavailable {
                room_id,
                check_in: from,
                check_out: to,
            }),
            ReviseOutcome::NotEditable => Ok(None),
        }
    }

    async fn change_status(
        &self,
        id: DbId,
        expected: BookingStatus,
        change: StatusChange,
    ) -> Result<Option<Booking>, CoreError> {
        BookingRepo::change_status(&self.pool, id, expected, &change)
            .await
            .map_err(storage_error)?
            .map(Booking::try_from)
            .transpose()
    }
}
