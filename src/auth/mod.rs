// src/auth/mod.rs
pub mod extract;
pub mod handlers;
pub mod store;
pub mod types;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::SharedState;

pub use extract::{AdminUser, CurrentUser, MaybeUser};
pub use types::User;

pub fn auth_router() -> Router<SharedState> {
    Router::new()
        .route("/auth/callback", post(handlers::identity_callback_handler))
        .route("/auth/user", get(handlers::current_user_handler))
        .route("/logout", post(handlers::logout_handler))
}
