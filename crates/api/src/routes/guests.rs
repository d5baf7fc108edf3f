use axum::routing::get;
use axum::Router;

use crate::handlers::guests;
use crate::state::AppState;

/// Guest routes mounted at `/guests`.
///
/// ```text
/// GET    /               -> list_guests
/// POST   /               -> create_guest
/// GET    /{id}           -> get_guest
/// PUT    /{id}           -> update_guest
/// DELETE /{id}           -> delete_guest
/// GET    /{id}/bookings  -> guest_bookings
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(guests::list_guests).post(guests::create_guest))
        .route(
            "/{id}",
            get(guests::get_guest)
                .put(guests::update_guest)
                .delete(guests::delete_guest),
        )
        .route("/{id}/bookings", get(guests::guest_bookings))
}
