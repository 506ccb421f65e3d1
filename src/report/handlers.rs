// src/report/handlers.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use super::types::{
    CreateReportRequest, ReportCategory, ReportFilter, ReportFilterQuery, ReportStatus, UpdateStatusRequest,
};
use crate::api::common::{ListResponse, PageQuery};
use crate::api::error::{ApiError, ApiResult, IntoApiErrorOption, invalid_param_error};
use crate::auth::extract::ensure_owner_or_admin;
use crate::auth::{AdminUser, CurrentUser};
use crate::state::SharedState;

fn parse_filter(query: ReportFilterQuery) -> ApiResult<ReportFilter> {
    let status = query
        .status
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.parse::<ReportStatus>().map_err(|e| invalid_param_error("status", &e)))
        .transpose()?;
    let category = query
        .category
        .filter(|c| !c.trim().is_empty())
        .map(|c| c.parse::<ReportCategory>().map_err(|e| invalid_param_error("category", &e)))
        .transpose()?;
    Ok(ReportFilter { status, category })
}

pub async fn list_reports_handler(
    State(state): State<SharedState>,
    Query(filter): Query<ReportFilterQuery>,
    Query(page): Query<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let filter = parse_filter(filter)?;
    let reports = state
        .report_store
        .list_reports(filter, page.resolve(&state.config))
        .await?;
    Ok(Json(ListResponse::from(reports)))
}

pub async fn create_report_handler(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateReportRequest>,
) -> ApiResult<impl IntoResponse> {
    let report = state.report_store.create_report(&user.id, payload).await?;
    info!(report_id = %report.id, category = %report.category, "Problem reported");
    Ok((StatusCode::CREATED, Json(report)))
}

pub async fn get_report_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let report = state
        .report_store
        .get_report(&id)
        .await?
        .ok_or_not_found("Report not found")?;
    Ok(Json(report))
}

pub async fn update_status_handler(
    State(state): State<SharedState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> ApiResult<impl IntoResponse> {
    let report = state
        .report_store
        .update_status(&id, payload.status)
        .await?
        .ok_or_not_found("Report not found")?;
    info!(report_id = %id, status = %report.status, admin_id = %admin.id, "Report status changed");
    Ok(Json(report))
}

pub async fn delete_report_handler(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let report = state
        .report_store
        .get_report(&id)
        .await?
        .ok_or_not_found("Report not found")?;
    ensure_owner_or_admin(&user, &report.reporter_id)?;

    if state.report_store.delete_report(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Report not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        let filter = parse_filter(ReportFilterQuery {
            status: Some("resolved".into()),
            category: Some("".into()),
        })
        .unwrap();
        assert_eq!(filter.status, Some(ReportStatus::Resolved));
        assert_eq!(filter.category, None);

        let filter = parse_filter(ReportFilterQuery {
            status: None,
            category: Some("waste".into()),
        })
        .unwrap();
        assert_eq!(filter.category, Some(ReportCategory::Waste));

        let err = parse_filter(ReportFilterQuery {
            status: Some("closed".into()),
            category: None,
        })
        .unwrap_err();
        assert_eq!(err.status_code, StatusCode::BAD_REQUEST);
    }
}
