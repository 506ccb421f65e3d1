// src/community/mod.rs
pub mod handlers;
pub mod store;
pub mod types;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::SharedState;

pub use types::{BlogPost, Discussion, EventWish, Reply};

pub fn community_router() -> Router<SharedState> {
    use handlers::*;

    Router::new()
        .route(
            "/discussions",
            get(list_discussions_handler).post(create_discussion_handler),
        )
        .route(
            "/discussions/{id}",
            get(get_discussion_handler).delete(delete_discussion_handler),
        )
        .route("/discussions/{id}/replies", post(create_reply_handler))
        .route("/wishes", get(list_wishes_handler).post(create_wish_handler))
        .route("/wishes/{id}", delete(delete_wish_handler))
        .route("/wishes/{id}/vote", post(toggle_vote_handler))
        .route("/blogs", get(list_blogs_handler).post(create_blog_handler))
        .route(
            "/blogs/{id}",
            get(get_blog_handler)
                .put(update_blog_handler)
                .delete(delete_blog_handler),
        )
}
