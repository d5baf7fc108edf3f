//! Handlers for room inventory and availability.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use innkeep_core::room::{RoomFilter, RoomSpec};
use innkeep_core::types::{DbId, StayDate};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request and response types
// ---------------------------------------------------------------------------

/// Body for `POST /rooms` and `PUT /rooms/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct RoomRequest {
    #[validate(length(min = 1, max = 20))]
    pub room_number: String,
    #[validate(length(min = 1, max = 50))]
    pub room_type: String,
    #[validate(range(min = 1))]
    pub capacity: i32,
    #[validate(range(exclusive_min = 0.0))]
    pub price_per_night: f64,
    pub description: Option<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[validate(url)]
    pub image_url: Option<String>,
}

impl From<RoomRequest> for RoomSpec {
    fn from(req: RoomRequest) -> Self {
        RoomSpec {
            room_number: req.room_number,
            room_type: req.room_type,
            capacity: req.capacity,
            price_per_night: req.price_per_night,
            description: req.description,
            amenities: req.amenities,
            image_url: req.image_url,
        }
    }
}

/// `?check_in=&check_out=&guests=` for availability searches.
#[derive(Debug, Deserialize)]
pub struct StayParams {
    pub check_in: StayDate,
    pub check_out: StayDate,
    pub guests: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct RoomAvailability {
    pub room_id: DbId,
    pub check_in: StayDate,
    pub check_out: StayDate,
    pub available: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/rooms
pub async fn list_rooms(
    State(state): State<AppState>,
    Query(filter): Query<RoomFilter>,
) -> AppResult<impl IntoResponse> {
    let rooms = state.rooms.list_rooms(&filter).await?;
    Ok(Json(DataResponse { data: rooms }))
}

/// GET /api/v1/rooms/types
///
/// Distinct room types, for populating the `room_type` filter.
pub async fn room_types(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let types = state.rooms.room_types().await?;
    Ok(Json(DataResponse { data: types }))
}

/// POST /api/v1/rooms
pub async fn create_room(
    State(state): State<AppState>,
    Json(input): Json<RoomRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let room = state.rooms.create_room(input.into()).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: room })))
}

/// GET /api/v1/rooms/{id}
pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let room = state.rooms.get_room(room_id).await?;
    Ok(Json(DataResponse { data: room }))
}

/// PUT /api/v1/rooms/{id}
///
/// Full replace of the editable fields.
pub async fn update_room(
    State(state): State<AppState>,
    Path(room_id): Path<DbId>,
    Json(input): Json<RoomRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let room = state.rooms.update_room(room_id, input.into()).await?;
    Ok(Json(DataResponse { data: room }))
}

/// POST /api/v1/rooms/{id}/deactivate
///
/// 409 while a blocking booking still has nights ahead.
pub async fn deactivate_room(
    State(state): State<AppState>,
    Path(room_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let room = state.rooms.deactivate_room(room_id).await?;
    Ok(Json(DataResponse { data: room }))
}

/// POST /api/v1/rooms/{id}/activate
pub async fn activate_room(
    State(state): State<AppState>,
    Path(room_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let room = state.rooms.activate_room(room_id).await?;
    Ok(Json(DataResponse { data: room }))
}

/// GET /api/v1/rooms/available?check_in=&check_out=&guests=
pub async fn available_rooms(
    State(state): State<AppState>,
    Query(params): Query<StayParams>,
) -> AppResult<impl IntoResponse> {
    let rooms = state
        .availability
        .list_available_rooms(params.check_in, params.check_out, params.guests)
        .await?;
    Ok(Json(DataResponse { data: rooms }))
}

/// GET /api/v1/rooms/{id}/availability?check_in=&check_out=
pub async fn room_availability(
    State(state): State<AppState>,
    Path(room_id): Path<DbId>,
    Query(params): Query<StayParams>,
) -> AppResult<impl IntoResponse> {
    let available = state
        .availability
        .is_available(room_id, params.check_in, params.check_out, None)
        .await?;
    Ok(Json(DataResponse {
        data: RoomAvailability {
            room_id,
            check_in: params.check_in,
            check_out: params.check_out,
            available,
        },
    }))
}
