// src/competition/mod.rs
pub mod handlers;
pub mod leaderboard;
pub mod scoring;
pub mod store;
pub mod types;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::SharedState;

pub use types::{Competition, CompetitionResult, Question};

pub fn competition_router() -> Router<SharedState> {
    use handlers::*;

    Router::new()
        .route(
            "/competitions",
            get(list_competitions_handler).post(create_competition_handler),
        )
        .route(
            "/competitions/{id}",
            get(get_competition_handler)
                .put(update_competition_handler)
                .delete(delete_competition_handler),
        )
        .route("/competitions/{id}/submit", post(submit_answers_handler))
        .route("/competitions/{id}/leaderboard", get(competition_leaderboard_handler))
        .route("/leaderboard", get(global_leaderboard_handler))
        .route("/me/results", get(my_results_handler))
}
