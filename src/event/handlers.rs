// src/event/handlers.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use super::types::{
    CreateEventRequest, CreateReviewRequest, EventFilter, ReviewSummary, ReviewsResponse, UpdateEventRequest,
};
use crate::api::common::{ListResponse, PageQuery};
use crate::api::error::{ApiError, ApiResult, IntoApiErrorOption};
use crate::auth::{AdminUser, CurrentUser};
use crate::state::SharedState;

pub async fn list_events_handler(
    State(state): State<SharedState>,
    Query(filter): Query<EventFilter>,
    Query(page): Query<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let events = state
        .event_store
        .list_events(filter.upcoming, page.resolve(&state.config))
        .await?;
    Ok(Json(ListResponse::from(events)))
}

pub async fn get_event_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let event = state
        .event_store
        .get_event(&id)
        .await?
        .ok_or_not_found("Event not found")?;
    Ok(Json(event))
}

pub async fn create_event_handler(
    State(state): State<SharedState>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<CreateEventRequest>,
) -> ApiResult<impl IntoResponse> {
    let event = state.event_store.create_event(&admin.id, payload).await?;
    info!(event_id = %event.id, "Event created");
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn update_event_handler(
    State(state): State<SharedState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateEventRequest>,
) -> ApiResult<impl IntoResponse> {
    let event = state
        .event_store
        .update_event(&id, payload)
        .await?
        .ok_or_not_found("Event not found")?;
    Ok(Json(event))
}

pub async fn delete_event_handler(
    State(state): State<SharedState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    if state.event_store.delete_event(&id).await? {
        info!(event_id = %id, "Event deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Event not found"))
    }
}

pub async fn register_handler(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let registration = state
        .event_store
        .register(&id, &user.id)
        .await?
        .ok_or_not_found("Event not found")?;
    info!(event_id = %id, user_id = %user.id, "Registered for event");
    Ok((StatusCode::CREATED, Json(registration)))
}

pub async fn unregister_handler(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    if state.event_store.unregister(&id, &user.id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Registration not found"))
    }
}

pub async fn list_registrants_handler(
    State(state): State<SharedState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state
        .event_store
        .get_event(&id)
        .await?
        .ok_or_not_found("Event not found")?;
    let registrants = state.event_store.list_registrants(&id).await?;
    Ok(Json(ListResponse::from(registrants)))
}

pub async fn my_registrations_handler(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<impl IntoResponse> {
    let events = state.event_store.list_user_events(&user.id).await?;
    Ok(Json(ListResponse::from(events)))
}

pub async fn list_reviews_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state
        .event_store
        .get_event(&id)
        .await?
        .ok_or_not_found("Event not found")?;

    let reviews = state.event_store.list_reviews(&id).await?;
    let summary = ReviewSummary::from_reviews(&reviews);
    Ok(Json(ReviewsResponse { items: reviews, summary }))
}

pub async fn create_review_handler(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<CreateReviewRequest>,
) -> ApiResult<impl IntoResponse> {
    state
        .event_store
        .get_event(&id)
        .await?
        .ok_or_not_found("Event not found")?;
    if !state.event_store.is_registered(&id, &user.id).await? {
        return Err(ApiError::forbidden("Only registered participants can review an event"));
    }

    let review = state.event_store.create_review(&id, &user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(review)))
}
