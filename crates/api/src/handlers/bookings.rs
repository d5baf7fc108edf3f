//! Handlers for the booking lifecycle.
//!
//! Staff endpoints address bookings by id. The guest self-service endpoints
//! (`lookup`, `self-cancel`) require the booking's reference number together
//! with the guest's email and answer 404 when either does not match.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use innkeep_core::booking::BookingStatus;
use innkeep_core::lifecycle::{BookingChanges, BookingChannel, CreateBooking};
use innkeep_core::types::{DbId, StayDate};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::guests::GuestRequest;
use crate::handlers::optional_json;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Body for `POST /bookings`. The guest is named either by `guest_id` or by
/// contact details, which are resolved through the guest registry.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    pub guest_id: Option<DbId>,
    #[validate(nested)]
    pub guest: Option<GuestRequest>,
    pub room_id: DbId,
    pub check_in: StayDate,
    pub check_out: StayDate,
    #[validate(length(max = 1000))]
    pub special_requests: Option<String>,
    #[validate(range(min = 1))]
    pub guest_count: Option<i32>,
    #[serde(default)]
    pub channel: BookingChannel,
}

/// Optional body for `reject` and `cancel`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ReasonRequest {
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

/// Body for `POST /bookings/{id}/self-cancel`.
#[derive(Debug, Deserialize, Validate)]
pub struct SelfCancelRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub reference: String,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

/// `GET /bookings` filters. `guest_id`, `date` and `from`/`to` select
/// mutually exclusive queries, tried in that order; otherwise `status` and
/// `future` filter the full list. Combining `status`/`future` with one of
/// the selectors is rejected.
#[derive(Debug, Deserialize)]
pub struct BookingListParams {
    pub status: Option<BookingStatus>,
    #[serde(default)]
    pub future: bool,
    pub date: Option<StayDate>,
    pub from: Option<StayDate>,
    pub to: Option<StayDate>,
    pub guest_id: Option<DbId>,
}

#[derive(Debug, Deserialize)]
pub struct LookupParams {
    pub email: String,
    pub reference: String,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// GET /api/v1/bookings
pub async fn list_bookings(
    State(state): State<AppState>,
    Query(params): Query<BookingListParams>,
) -> AppResult<impl IntoResponse> {
    let selector = params.guest_id.is_some()
        || params.date.is_some()
        || params.from.is_some()
        || params.to.is_some();
    if selector && (params.status.is_some() || params.future) {
        return Err(AppError::BadRequest(
            "'status' and 'future' cannot be combined with 'guest_id', 'date' or 'from'/'to'"
                .into(),
        ));
    }

    let bookings = match (params.guest_id, params.date, params.from, params.to) {
        (Some(guest_id), ..) => state.bookings.bookings_for_guest(guest_id).await?,
        (None, Some(date), ..) => state.bookings.bookings_on(date).await?,
        (None, None, Some(from), Some(to)) => state.bookings.bookings_between(from, to).await?,
        (None, None, Some(_), None) | (None, None, None, Some(_)) => {
            return Err(AppError::BadRequest(
                "Both 'from' and 'to' are required for a date range query".into(),
            ));
        }
        (None, None, None, None) => {
            state
                .bookings
                .list_bookings(params.status, params.future)
                .await?
        }
    };
    Ok(Json(DataResponse { data: bookings }))
}

/// GET /api/v1/bookings/upcoming
///
/// Confirmed bookings that check in after today.
pub async fn upcoming_bookings(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let bookings = state.bookings.upcoming_bookings().await?;
    Ok(Json(DataResponse { data: bookings }))
}

/// GET /api/v1/bookings/current
///
/// Guests in house today.
pub async fn current_bookings(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let bookings = state.bookings.current_bookings().await?;
    Ok(Json(DataResponse { data: bookings }))
}

/// GET /api/v1/bookings/lookup?email=&reference=
pub async fn lookup_booking(
    State(state): State<AppState>,
    Query(params): Query<LookupParams>,
) -> AppResult<impl IntoResponse> {
    let details = state
        .bookings
        .lookup_by_reference(&params.email, &params.reference)
        .await?;
    Ok(Json(DataResponse { data: details }))
}

/// GET /api/v1/bookings/{id}
///
/// Booking with its guest and room.
pub async fn get_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let details = state.bookings.booking_details(booking_id).await?;
    Ok(Json(DataResponse { data: details }))
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

/// POST /api/v1/bookings
pub async fn create_booking(
    State(state): State<AppState>,
    Json(input): Json<CreateBookingRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let guest_id = match (input.guest_id, input.guest) {
        (Some(id), _) => id,
        (None, Some(contact)) => {
            state
                .guests
                .create_or_get_guest(&contact.name, &contact.email, &contact.phone)
                .await?
                .id
        }
        (None, None) => {
            return Err(AppError::BadRequest(
                "Either 'guest_id' or 'guest' contact details are required".into(),
            ));
        }
    };

    let booking = state
        .bookings
        .create_booking(CreateBooking {
            guest_id,
            room_id: input.room_id,
            check_in: input.check_in,
            check_out: input.check_out,
            special_requests: input.special_requests,
            guest_count: input.guest_count,
            channel: input.channel,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: booking })))
}

/// PUT /api/v1/bookings/{id}
pub async fn update_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<DbId>,
    Json(changes): Json<BookingChanges>,
) -> AppResult<impl IntoResponse> {
    let booking = state.bookings.update_booking(booking_id, changes).await?;
    Ok(Json(DataResponse { data: booking }))
}

/// POST /api/v1/bookings/{id}/confirm
pub async fn confirm_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let booking = state.bookings.confirm_booking(booking_id).await?;
    Ok(Json(DataResponse { data: booking }))
}

/// POST /api/v1/bookings/{id}/reject
pub async fn reject_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<DbId>,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let input: ReasonRequest = optional_json(&body)?;
    input.validate()?;
    let booking = state
        .bookings
        .reject_booking(booking_id, input.reason)
        .await?;
    Ok(Json(DataResponse { data: booking }))
}

/// POST /api/v1/bookings/{id}/cancel
pub async fn cancel_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<DbId>,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let input: ReasonRequest = optional_json(&body)?;
    input.validate()?;
    let booking = state
        .bookings
        .cancel_booking(booking_id, input.reason)
        .await?;
    Ok(Json(DataResponse { data: booking }))
}

/// POST /api/v1/bookings/{id}/self-cancel
pub async fn self_cancel_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<DbId>,
    Json(input): Json<SelfCancelRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let booking = state
        .bookings
        .cancel_as_guest(booking_id, &input.email, &input.reference, input.reason)
        .await?;
    tracing::info!(booking_id, "Booking cancelled by guest");
    Ok(Json(DataResponse { data: booking }))
}

/// POST /api/v1/bookings/{id}/check-in
pub async fn check_in(
    State(state): State<AppState>,
    Path(booking_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let booking = state.bookings.check_in(booking_id).await?;
    Ok(Json(DataResponse { data: booking }))
}

/// POST /api/v1/bookings/{id}/check-out
pub async fn check_out(
    State(state): State<AppState>,
    Path(booking_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let booking = state.bookings.check_out(booking_id).await?;
    Ok(Json(DataResponse { data: booking }))
}
