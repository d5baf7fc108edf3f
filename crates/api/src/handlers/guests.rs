//! Handlers for the guest registry.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use innkeep_core::guest::GuestContact;
use innkeep_core::types::DbId;
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Guest contact details as submitted by a client.
#[derive(Debug, Deserialize, Validate)]
pub struct GuestRequest {
    #[serde(default)]
    #[validate(length(max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub phone: String,
}

impl From<GuestRequest> for GuestContact {
    fn from(req: GuestRequest) -> Self {
        GuestContact::new(req.name, req.email, req.phone)
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}

/// GET /api/v1/guests?search=&limit=&offset=
pub async fn list_guests(
    State(state): State<AppState>,
    Query(search): Query<SearchParams>,
    Query(page): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let page = state
        .guests
        .list_guests(search.search.as_deref(), page.limit, page.offset)
        .await?;
    Ok(Json(DataResponse { data: page }))
}

/// POST /api/v1/guests
///
/// Returns the existing guest for a known email (refreshing name and phone)
/// or registers a new one.
pub async fn create_guest(
    State(state): State<AppState>,
    Json(input): Json<GuestRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let guest = state
        .guests
        .create_or_get_guest(&input.name, &input.email, &input.phone)
        .await?;
    Ok(Json(DataResponse { data: guest }))
}

/// GET /api/v1/guests/{id}
pub async fn get_guest(
    State(state): State<AppState>,
    Path(guest_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let guest = state.guests.get_guest(guest_id).await?;
    Ok(Json(DataResponse { data: guest }))
}

/// PUT /api/v1/guests/{id}
pub async fn update_guest(
    State(state): State<AppState>,
    Path(guest_id): Path<DbId>,
    Json(input): Json<GuestRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let guest = state.guests.update_guest(guest_id, input.into()).await?;
    Ok(Json(DataResponse { data: guest }))
}

/// DELETE /api/v1/guests/{id}
pub async fn delete_guest(
    State(state): State<AppState>,
    Path(guest_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state.guests.delete_guest(guest_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/guests/{id}/bookings
///
/// Booking history, newest check-in first.
pub async fn guest_bookings(
    State(state): State<AppState>,
    Path(guest_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let bookings = state.bookings.bookings_for_guest(guest_id).await?;
    Ok(Json(DataResponse { data: bookings }))
}
