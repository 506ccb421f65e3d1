// src/event/mod.rs
pub mod handlers;
pub mod store;
pub mod types;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::SharedState;

pub use types::{Event, Registration, Review};

pub fn event_router() -> Router<SharedState> {
    use handlers::*;

    Router::new()
        .route("/events", get(list_events_handler).post(create_event_handler))
        .route(
            "/events/{id}",
            get(get_event_handler)
                .put(update_event_handler)
                .delete(delete_event_handler),
        )
        .route(
            "/events/{id}/register",
            post(register_handler).delete(unregister_handler),
        )
        .route("/events/{id}/registrations", get(list_registrants_handler))
        .route(
            "/events/{id}/reviews",
            get(list_reviews_handler).post(create_review_handler),
        )
        .route("/me/registrations", get(my_registrations_handler))
}
