// src/api/handlers.rs
// Service-level endpoints: health probe and community counters

use std::collections::BTreeMap;

use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::warn;

use super::error::ApiResult;
use super::router::API_VERSION;
use crate::error::now_ts;
use crate::state::SharedState;

pub async fn health_handler(State(state): State<SharedState>) -> Json<Value> {
    let database = match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => true,
        Err(e) => {
            warn!("Health check could not reach the database: {}", e);
            false
        }
    };

    Json(json!({
        "status": if database { "ok" } else { "degraded" },
        "version": API_VERSION,
        "database": database,
        "timestamp": now_ts(),
    }))
}

#[derive(Debug, Serialize)]
pub struct CommunityStats {
    pub users: i64,
    pub competitions: i64,
    pub completed_attempts: i64,
    pub events: i64,
    pub registrations: i64,
    pub reports: BTreeMap<String, i64>,
    pub discussions: i64,
    pub blog_posts: i64,
}

pub async fn stats_handler(State(state): State<SharedState>) -> ApiResult<impl IntoResponse> {
    let (users, competitions, completed_attempts, events, registrations, by_status, discussions, blog_posts) =
        tokio::try_join!(
            state.user_store.count_users(),
            state.competition_store.count_competitions(),
            state.competition_store.count_results(),
            state.event_store.count_events(),
            state.event_store.count_registrations(),
            state.report_store.count_by_status(),
            state.community_store.count_discussions(),
            state.community_store.count_published_blogs(),
        )?;

    Ok(Json(CommunityStats {
        users,
        competitions,
        completed_attempts,
        events,
        registrations,
        reports: by_status
            .into_iter()
            .map(|(status, count)| (status.to_string(), count))
            .collect(),
        discussions,
        blog_posts,
    }))
}
