// src/community/handlers.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use super::types::{
    BlogFilter, CreateBlogRequest, CreateDiscussionRequest, CreateReplyRequest, CreateWishRequest,
    DiscussionThread, UpdateBlogRequest,
};
use crate::api::common::{ListResponse, PageQuery};
use crate::api::error::{ApiError, ApiResult, IntoApiErrorOption};
use crate::auth::extract::ensure_owner_or_admin;
use crate::auth::{CurrentUser, MaybeUser};
use crate::state::SharedState;

// ============================================================================
// Discussions
// ============================================================================

pub async fn list_discussions_handler(
    State(state): State<SharedState>,
    Query(page): Query<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let discussions = state
        .community_store
        .list_discussions(page.resolve(&state.config))
        .await?;
    Ok(Json(ListResponse::from(discussions)))
}

pub async fn create_discussion_handler(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateDiscussionRequest>,
) -> ApiResult<impl IntoResponse> {
    let discussion = state.community_store.create_discussion(&user.id, payload).await?;
    info!(discussion_id = %discussion.id, "Discussion started");
    Ok((StatusCode::CREATED, Json(discussion)))
}

pub async fn get_discussion_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let discussion = state
        .community_store
        .get_discussion(&id)
        .await?
        .ok_or_not_found("Discussion not found")?;
    let replies = state.community_store.list_replies(&id).await?;
    Ok(Json(DiscussionThread { discussion, replies }))
}

pub async fn delete_discussion_handler(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let discussion = state
        .community_store
        .get_discussion(&id)
        .await?
        .ok_or_not_found("Discussion not found")?;
    ensure_owner_or_admin(&user, &discussion.author_id)?;

    if state.community_store.delete_discussion(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Discussion not found"))
    }
}

pub async fn create_reply_handler(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<CreateReplyRequest>,
) -> ApiResult<impl IntoResponse> {
    let reply = state
        .community_store
        .add_reply(&id, &user.id, payload)
        .await?
        .ok_or_not_found("Discussion not found")?;
    Ok((StatusCode::CREATED, Json(reply)))
}

// ============================================================================
// Event wishes
// ============================================================================

pub async fn list_wishes_handler(
    State(state): State<SharedState>,
    viewer: MaybeUser,
    Query(page): Query<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let wishes = state
        .community_store
        .list_wishes(viewer.id(), page.resolve(&state.config))
        .await?;
    Ok(Json(ListResponse::from(wishes)))
}

pub async fn create_wish_handler(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateWishRequest>,
) -> ApiResult<impl IntoResponse> {
    let wish = state.community_store.create_wish(&user.id, payload).await?;
    info!(wish_id = %wish.id, "Event wish added");
    Ok((StatusCode::CREATED, Json(wish)))
}

pub async fn toggle_vote_handler(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let outcome = state
        .community_store
        .toggle_vote(&id, &user.id)
        .await?
        .ok_or_not_found("Wish not found")?;
    Ok(Json(outcome))
}

pub async fn delete_wish_handler(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let wish = state
        .community_store
        .get_wish(&id, Some(&user.id))
        .await?
        .ok_or_not_found("Wish not found")?;
    ensure_owner_or_admin(&user, &wish.author_id)?;

    if state.community_store.delete_wish(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Wish not found"))
    }
}

// ============================================================================
// Blogs
// ============================================================================

pub async fn list_blogs_handler(
    State(state): State<SharedState>,
    viewer: MaybeUser,
    Query(filter): Query<BlogFilter>,
    Query(page): Query<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let posts = state
        .community_store
        .list_blogs(
            filter.drafts,
            viewer.id(),
            viewer.is_admin(),
            page.resolve(&state.config),
        )
        .await?;
    Ok(Json(ListResponse::from(posts)))
}

pub async fn create_blog_handler(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateBlogRequest>,
) -> ApiResult<impl IntoResponse> {
    let post = state.community_store.create_blog(&user.id, payload).await?;
    info!(blog_id = %post.id, published = post.published, "Blog post created");
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn get_blog_handler(
    State(state): State<SharedState>,
    viewer: MaybeUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let post = state
        .community_store
        .get_blog(&id)
        .await?
        .filter(|p| p.visible_to(viewer.id(), viewer.is_admin()))
        .ok_or_not_found("Blog post not found")?;
    Ok(Json(post))
}

pub async fn update_blog_handler(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateBlogRequest>,
) -> ApiResult<impl IntoResponse> {
    let existing = state
        .community_store
        .get_blog(&id)
        .await?
        .ok_or_not_found("Blog post not found")?;
    ensure_owner_or_admin(&user, &existing.author_id)?;

    let post = state
        .community_store
        .update_blog(&id, payload)
        .await?
        .ok_or_not_found("Blog post not found")?;
    Ok(Json(post))
}

pub async fn delete_blog_handler(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let post = state
        .community_store
        .get_blog(&id)
        .await?
        .ok_or_not_found("Blog post not found")?;
    ensure_owner_or_admin(&user, &post.author_id)?;

    if state.community_store.delete_blog(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Blog post not found"))
    }
}
