// src/competition/handlers.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use super::leaderboard::{rank_competition, rank_global};
use super::scoring::{max_score, score_submission};
use super::types::{
    CompetitionDetail, CreateCompetitionRequest, LeaderboardEntry, QuestionView, Submission,
    UpdateCompetitionRequest,
};
use crate::api::common::{ListResponse, PageQuery};
use crate::api::error::{ApiError, ApiResult, IntoApiErrorOption, validation_error};
use crate::auth::{AdminUser, CurrentUser, MaybeUser};
use crate::error::now_ts;
use crate::state::SharedState;

pub async fn list_competitions_handler(
    State(state): State<SharedState>,
    Query(page): Query<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let competitions = state
        .competition_store
        .list_competitions(page.resolve(&state.config))
        .await?;
    Ok(Json(ListResponse::from(competitions)))
}

async fn load_detail(state: &SharedState, id: &str, reveal_answers: bool) -> ApiResult<CompetitionDetail> {
    let competition = state
        .competition_store
        .get_competition(id)
        .await?
        .ok_or_not_found("Competition not found")?;
    let questions = state.competition_store.list_questions(id).await?;

    Ok(CompetitionDetail {
        competition,
        max_score: max_score(&questions),
        questions: questions
            .iter()
            .map(|q| QuestionView::from_question(q, reveal_answers))
            .collect(),
    })
}

pub async fn get_competition_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    user: MaybeUser,
) -> ApiResult<impl IntoResponse> {
    let detail = load_detail(&state, &id, user.is_admin()).await?;
    Ok(Json(detail))
}

pub async fn create_competition_handler(
    State(state): State<SharedState>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<CreateCompetitionRequest>,
) -> ApiResult<impl IntoResponse> {
    let competition = state
        .competition_store
        .create_competition(&admin.id, payload)
        .await?;
    info!(competition_id = %competition.id, "Competition created");

    let detail = load_detail(&state, &competition.id, true).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

pub async fn update_competition_handler(
    State(state): State<SharedState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCompetitionRequest>,
) -> ApiResult<impl IntoResponse> {
    state
        .competition_store
        .update_competition(&id, payload)
        .await?
        .ok_or_not_found("Competition not found")?;

    let detail = load_detail(&state, &id, true).await?;
    Ok(Json(detail))
}

pub async fn delete_competition_handler(
    State(state): State<SharedState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    if state.competition_store.delete_competition(&id).await? {
        info!(competition_id = %id, "Competition deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Competition not found"))
    }
}

pub async fn submit_answers_handler(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(submission): Json<Submission>,
) -> ApiResult<impl IntoResponse> {
    let competition = state
        .competition_store
        .get_competition(&id)
        .await?
        .ok_or_not_found("Competition not found")?;
    if !competition.is_open_at(now_ts()) {
        return Err(ApiError::conflict("Competition is not open for submissions"));
    }

    let questions = state.competition_store.list_questions(&id).await?;
    let breakdown = score_submission(&questions, &submission.answers)
        .map_err(|e| validation_error("answers", &e.to_string()))?;

    let result = state
        .competition_store
        .record_result(&id, &user.id, breakdown)
        .await?;
    info!(
        competition_id = %id,
        user_id = %user.id,
        score = result.score,
        max_score = result.max_score,
        "Competition result recorded"
    );

    Ok((StatusCode::CREATED, Json(result)))
}

pub async fn competition_leaderboard_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(page): Query<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    state
        .competition_store
        .get_competition(&id)
        .await?
        .ok_or_not_found("Competition not found")?;

    let rows = state.competition_store.leaderboard_rows(Some(&id)).await?;
    Ok(Json(paginate(rank_competition(&rows), page, &state)))
}

pub async fn global_leaderboard_handler(
    State(state): State<SharedState>,
    Query(page): Query<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let rows = state.competition_store.leaderboard_rows(None).await?;
    Ok(Json(paginate(rank_global(&rows), page, &state)))
}

fn paginate(entries: Vec<LeaderboardEntry>, page: PageQuery, state: &SharedState) -> ListResponse<LeaderboardEntry> {
    let page = page.resolve(&state.config);
    entries
        .into_iter()
        .skip(page.offset as usize)
        .take(page.limit as usize)
        .collect::<Vec<_>>()
        .into()
}

pub async fn my_results_handler(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    Query(page): Query<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let results = state
        .competition_store
        .list_user_results(&user.id, page.resolve(&state.config))
        .await?;
    Ok(Json(ListResponse::from(results)))
}
