use axum::routing::{get, post};
use axum::Router;

use crate::handlers::bookings;
use crate::state::AppState;

/// Booking routes mounted at `/bookings`.
///
/// ```text
/// GET  /                   -> list_bookings
/// POST /                   -> create_booking
/// GET  /upcoming           -> upcoming_bookings
/// GET  /current            -> current_bookings
/// GET  /lookup             -> lookup_booking
/// GET  /{id}               -> get_booking
/// PUT  /{id}               -> update_booking
/// POST /{id}/confirm       -> confirm_booking
/// POST /{id}/reject        -> reject_booking
/// POST /{id}/cancel        -> cancel_booking
/// POST /{id}/self-cancel   -> self_cancel_booking
/// POST /{id}/check-in      -> check_in
/// POST /{id}/check-out     -> check_out
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(bookings::list_bookings).post(bookings::create_booking),
        )
        .route("/upcoming", get(bookings::upcoming_bookings))
        .route("/current", get(bookings::current_bookings))
        .route("/lookup", get(bookings::lookup_booking))
        .route(
            "/{id}",
            get(bookings::get_booking).put(bookings::update_booking),
        )
        .route("/{id}/confirm", post(bookings::confirm_booking))
        .route("/{id}/reject", post(bookings::reject_booking))
        .route("/{id}/cancel", post(bookings::cancel_booking))
        .route("/{id}/self-cancel", post(bookings::self_cancel_booking))
        .route("/{id}/check-in", post(bookings::check_in))
        .route("/{id}/check-out", post(bookings::check_out))
}
