pub mod bookings;
pub mod guests;
pub mod health;
pub mod rooms;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /rooms                               list, create
/// /rooms/available                     available rooms for a stay
/// /rooms/{id}                          get, update
/// /rooms/{id}/deactivate               deactivate (POST)
/// /rooms/{id}/activate                 activate (POST)
/// /rooms/{id}/availability             single-room availability
///
/// /bookings                            list, create
/// /bookings/upcoming                   confirmed, checking in after today
/// /bookings/current                    in house today
/// /bookings/lookup                     guest lookup by email + reference
/// /bookings/{id}                       details, update
/// /bookings/{id}/confirm               pending -> confirmed (POST)
/// /bookings/{id}/reject                pending -> rejected (POST)
/// /bookings/{id}/cancel                cancel with fee (POST)
/// /bookings/{id}/self-cancel           guest cancel by email + reference (POST)
/// /bookings/{id}/check-in              confirmed -> checked_in (POST)
/// /bookings/{id}/check-out             checked_in -> completed (POST)
///
/// /guests                              search, create-or-get
/// /guests/{id}                         get, update, delete
/// /guests/{id}/bookings                booking history
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/rooms", rooms::router())
        .nest("/bookings", bookings::router())
        .nest("/guests", guests::router())
}
