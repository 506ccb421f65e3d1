// src/report/store.rs
// Environmental problem reports submitted by community members

use sqlx::SqlitePool;
use uuid::Uuid;

use super::types::{CreateReportRequest, ProblemReport, ReportFilter, ReportRow, ReportStatus};
use crate::api::common::Page;
use crate::error::{StoreError, StoreResult, now_ts, optional_text, require_text};

fn validate_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> StoreResult<()> {
    if let Some(lat) = latitude {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(StoreError::invalid("latitude must be between -90 and 90"));
        }
    }
    if let Some(lng) = longitude {
        if !(-180.0..=180.0).contains(&lng) {
            return Err(StoreError::invalid("longitude must be between -180 and 180"));
        }
    }
    Ok(())
}

#[derive(Clone)]
pub struct ReportStore {
    pub pool: SqlitePool,
}

impl ReportStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_report(&self, reporter_id: &str, req: CreateReportRequest) -> StoreResult<ProblemReport> {
        let title = require_text("title", &req.title)?;
        let description = require_text("description", &req.description)?;
        validate_coordinates(req.latitude, req.longitude)?;

        let now = now_ts();
        let report = ProblemReport {
            id: Uuid::new_v4().to_string(),
            reporter_id: reporter_id.to_string(),
            title,
            description,
            category: req.category,
            location: optional_text(req.location),
            latitude: req.latitude,
            longitude: req.longitude,
            image_url: optional_text(req.image_url),
            status: ReportStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO problem_reports
                (id, reporter_id, title, description, category, location, latitude, longitude,
                 image_url, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&report.id)
        .bind(&report.reporter_id)
        .bind(&report.title)
        .bind(&report.description)
        .bind(report.category.to_string())
        .bind(&report.location)
        .bind(report.latitude)
        .bind(report.longitude)
        .bind(&report.image_url)
        .bind(report.status.to_string())
        .bind(report.created_at)
        .bind(report.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(report)
    }

    pub async fn get_report(&self, id: &str) -> StoreResult<Option<ProblemReport>> {
        let row = sqlx::query_as::<_, ReportRow>("SELECT * FROM problem_reports WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(ProblemReport::try_from).transpose()
    }

    pub async fn list_reports(&self, filter: ReportFilter, page: Page) -> StoreResult<Vec<ProblemReport>> {
        let rows = sqlx::query_as::<_, ReportRow>(
            r#"
            SELECT * FROM problem_reports
            WHERE (?1 IS NULL OR status = ?1)
              AND (?2 IS NULL OR category = ?2)
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?3 OFFSET ?4
            "#,
        )
        .bind(filter.status.map(|s| s.to_string()))
        .bind(filter.category.map(|c| c.to_string()))
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(ProblemReport::try_from).collect()
    }

    pub async fn update_status(&self, id: &str, status: ReportStatus) -> StoreResult<Option<ProblemReport>> {
        let result = sqlx::query("UPDATE problem_reports SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.to_string())
            .bind(now_ts())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_report(id).await
    }

    pub async fn delete_report(&self, id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM problem_reports WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Report counts keyed by status, every status present.
    pub async fn count_by_status(&self) -> StoreResult<Vec<(ReportStatus, i64)>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM problem_reports GROUP BY status")
                .fetch_all(&self.pool)
                .await?;

        Ok(ReportStatus::ALL
            .iter()
            .map(|status| {
                let count = rows
                    .iter()
                    .filter(|(s, _)| s.parse::<ReportStatus>().ok() == Some(*status))
                    .map(|(_, c)| *c)
                    .sum();
                (*status, count)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::run_migrations;
    use sqlx::sqlite::SqlitePoolOptions;

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(None, None).is_ok());
        assert!(validate_coordinates(Some(47.6), Some(-122.3)).is_ok());
        assert!(validate_coordinates(Some(91.0), None).is_err());
        assert!(validate_coordinates(None, Some(-180.5)).is_err());
    }

    #[tokio::test]
    async fn test_schema_rejects_unknown_category_and_status() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        run_migrations(&pool).await.unwrap();
        sqlx::query("INSERT INTO users (id, is_admin, created_at, updated_at) VALUES ('u1', 0, 0, 0)")
            .execute(&pool)
            .await
            .unwrap();

        let db = &pool;
        let insert = move |category: &'static str, status: &'static str| {
            sqlx::query(
                "INSERT INTO problem_reports (id, reporter_id, title, description, category, status, created_at, updated_at)
                 VALUES (?, 'u1', 't', 'd', ?, ?, 0, 0)",
            )
            .bind(format!("{category}-{status}"))
            .bind(category)
            .bind(status)
            .execute(db)
        };

        assert!(insert("waste", "pending").await.is_ok());
        assert!(insert("noise", "pending").await.is_err());
        assert!(insert("waste", "done").await.is_err());

        let store = ReportStore::new(pool.clone());
        let reports = store.list_reports(ReportFilter::default(), Page { limit: 10, offset: 0 }).await.unwrap();
        assert_eq!(reports.len(), 1);
    }
}
