use axum::routing::{get, post};
use axum::Router;

use crate::handlers::rooms;
use crate::state::AppState;

/// Room routes mounted at `/rooms`.
///
/// ```text
/// GET  /                   -> list_rooms
/// POST /                   -> create_room
/// GET  /types              -> room_types
/// GET  /available          -> available_rooms
/// GET  /{id}               -> get_room
/// PUT  /{id}               -> update_room
/// POST /{id}/deactivate    -> deactivate_room
/// POST /{id}/activate      -> activate_room
/// GET  /{id}/availability  -> room_availability
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(rooms::list_rooms).post(rooms::create_room))
        .route("/types", get(rooms::room_types))
        .route("/available", get(rooms::available_rooms))
        .route("/{id}", get(rooms::get_room).put(rooms::update_room))
        .route("/{id}/deactivate", post(rooms::deactivate_room))
        .route("/{id}/activate", post(rooms::activate_room))
        .route("/{id}/availability", get(rooms::room_availability))
}
