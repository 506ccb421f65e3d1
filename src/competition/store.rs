// src/competition/store.rs
// Competitions, their questions and submitted results

use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use super::scoring::{MAX_QUESTION_POINTS, ScoreBreakdown};
use super::types::{
    Competition, CompetitionResult, CreateCompetitionRequest, LeaderboardRow, NewQuestion, Question,
    QuestionRow, ResultRow, UpdateCompetitionRequest,
};
use crate::api::common::Page;
use crate::error::{StoreError, StoreResult, now_ts, optional_text, require_text};

fn validate_window(starts_at: Option<i64>, ends_at: Option<i64>) -> StoreResult<()> {
    if let (Some(s), Some(e)) = (starts_at, ends_at) {
        if s >= e {
            return Err(StoreError::invalid("starts_at must be before ends_at"));
        }
    }
    Ok(())
}

fn validate_questions(questions: &[NewQuestion]) -> StoreResult<()> {
    if questions.is_empty() {
        return Err(StoreError::invalid("A competition needs at least one question"));
    }
    for (i, q) in questions.iter().enumerate() {
        let n = i + 1;
        if q.prompt.trim().is_empty() {
            return Err(StoreError::invalid(format!("Question {n}: prompt must not be empty")));
        }
        if q.options.len() < 2 {
            return Err(StoreError::invalid(format!("Question {n}: at least two options are required")));
        }
        if q.options.iter().any(|o| o.trim().is_empty()) {
            return Err(StoreError::invalid(format!("Question {n}: options must not be empty")));
        }
        if q.correct_option < 0 || q.correct_option >= q.options.len() as i64 {
            return Err(StoreError::invalid(format!("Question {n}: correct_option does not match an option")));
        }
        if !(0..=MAX_QUESTION_POINTS).contains(&q.points.unwrap_or(1)) {
            return Err(StoreError::invalid(format!(
                "Question {n}: points must be between 0 and {MAX_QUESTION_POINTS}"
            )));
        }
    }
    Ok(())
}

async fn insert_questions(
    tx: &mut Transaction<'_, Sqlite>,
    competition_id: &str,
    questions: &[NewQuestion],
) -> StoreResult<()> {
    for (position, q) in questions.iter().enumerate() {
        let options: Vec<String> = q.options.iter().map(|o| o.trim().to_string()).collect();
        sqlx::query(
            r#"
            INSERT INTO questions (id, competition_id, position, prompt, options, correct_option, points)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(competition_id)
        .bind(position as i64)
        .bind(q.prompt.trim())
        .bind(serde_json::to_string(&options)?)
        .bind(q.correct_option)
        .bind(q.points.unwrap_or(1))
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

#[derive(Clone)]
pub struct CompetitionStore {
    pub pool: SqlitePool,
}

impl CompetitionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_competition(
        &self,
        created_by: &str,
        req: CreateCompetitionRequest,
    ) -> StoreResult<Competition> {
        let title = require_text("title", &req.title)?;
        validate_window(req.starts_at, req.ends_at)?;
        validate_questions(&req.questions)?;

        let now = now_ts();
        let competition = Competition {
            id: Uuid::new_v4().to_string(),
            title,
            description: optional_text(req.description),
            category: optional_text(req.category),
            image_url: optional_text(req.image_url),
            starts_at: req.starts_at,
            ends_at: req.ends_at,
            created_by: created_by.to_string(),
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO competitions
                (id, title, description, category, image_url, starts_at, ends_at, created_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&competition.id)
        .bind(&competition.title)
        .bind(&competition.description)
        .bind(&competition.category)
        .bind(&competition.image_url)
        .bind(competition.starts_at)
        .bind(competition.ends_at)
        .bind(&competition.created_by)
        .bind(competition.created_at)
        .bind(competition.updated_at)
        .execute(&mut *tx)
        .await?;

        insert_questions(&mut tx, &competition.id, &req.questions).await?;
        tx.commit().await?;

        Ok(competition)
    }

    pub async fn get_competition(&self, id: &str) -> StoreResult<Option<Competition>> {
        let competition = sqlx::query_as::<_, Competition>("SELECT * FROM competitions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(competition)
    }

    pub async fn list_competitions(&self, page: Page) -> StoreResult<Vec<Competition>> {
        let competitions = sqlx::query_as::<_, Competition>(
            "SELECT * FROM competitions ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?",
        )
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(competitions)
    }

    pub async fn list_questions(&self, competition_id: &str) -> StoreResult<Vec<Question>> {
        let rows = sqlx::query_as::<_, QuestionRow>(
            "SELECT * FROM questions WHERE competition_id = ? ORDER BY position",
        )
        .bind(competition_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|r| Question::try_from(r).map_err(StoreError::from))
            .collect()
    }

    /// Merge the given fields into the stored competition. A `questions` list
    /// replaces the existing questions.
    pub async fn update_competition(
        &self,
        id: &str,
        req: UpdateCompetitionRequest,
    ) -> StoreResult<Option<Competition>> {
        let Some(mut competition) = self.get_competition(id).await? else {
            return Ok(None);
        };

        if let Some(title) = req.title {
            competition.title = require_text("title", &title)?;
        }
        if req.description.is_some() {
            competition.description = optional_text(req.description);
        }
        if req.category.is_some() {
            competition.category = optional_text(req.category);
        }
        if req.image_url.is_some() {
            competition.image_url = optional_text(req.image_url);
        }
        if req.starts_at.is_some() {
            competition.starts_at = req.starts_at;
        }
        if req.ends_at.is_some() {
            competition.ends_at = req.ends_at;
        }
        validate_window(competition.starts_at, competition.ends_at)?;
        if let Some(questions) = &req.questions {
            validate_questions(questions)?;
        }
        competition.updated_at = now_ts();

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            UPDATE competitions
            SET title = ?, description = ?, category = ?, image_url = ?,
                starts_at = ?, ends_at = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&competition.title)
        .bind(&competition.description)
        .bind(&competition.category)
        .bind(&competition.image_url)
        .bind(competition.starts_at)
        .bind(competition.ends_at)
        .bind(competition.updated_at)
        .bind(&competition.id)
        .execute(&mut *tx)
        .await?;

        if let Some(questions) = &req.questions {
            sqlx::query("DELETE FROM questions WHERE competition_id = ?")
                .bind(&competition.id)
                .execute(&mut *tx)
                .await?;
            insert_questions(&mut tx, &competition.id, questions).await?;
        }
        tx.commit().await?;

        Ok(Some(competition))
    }

    pub async fn delete_competition(&self, id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM competitions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn record_result(
        &self,
        competition_id: &str,
        user_id: &str,
        breakdown: ScoreBreakdown,
    ) -> StoreResult<CompetitionResult> {
        let result = CompetitionResult {
            id: Uuid::new_v4().to_string(),
            competition_id: competition_id.to_string(),
            user_id: user_id.to_string(),
            score: breakdown.score,
            max_score: breakdown.max_score,
            correct_count: breakdown.correct_count,
            question_count: breakdown.question_count,
            answers: breakdown.answers,
            completed_at: now_ts(),
        };

        sqlx::query(
            r#"
            INSERT INTO competition_results
                (id, competition_id, user_id, score, max_score, correct_count, question_count, answers, completed_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&result.id)
        .bind(&result.competition_id)
        .bind(&result.user_id)
        .bind(result.score)
        .bind(result.max_score)
        .bind(result.correct_count)
        .bind(result.question_count)
        .bind(serde_json::to_string(&result.answers)?)
        .bind(result.completed_at)
        .execute(&self.pool)
        .await?;

        Ok(result)
    }

    pub async fn list_user_results(&self, user_id: &str, page: Page) -> StoreResult<Vec<CompetitionResult>> {
        let rows = sqlx::query_as::<_, ResultRow>(
            r#"
            SELECT * FROM competition_results
            WHERE user_id = ?
            ORDER BY completed_at DESC, rowid DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(user_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|r| CompetitionResult::try_from(r).map_err(StoreError::from))
            .collect()
    }

    /// All attempts (optionally for one competition) with the users' names.
    pub async fn leaderboard_rows(&self, competition_id: Option<&str>) -> StoreResult<Vec<LeaderboardRow>> {
        let rows = sqlx::query_as::<_, LeaderboardRow>(
            r#"
            SELECT r.user_id, r.competition_id, r.score, r.completed_at, r.rowid AS seq,
                   u.first_name, u.last_name
            FROM competition_results r
            JOIN users u ON u.id = r.user_id
            WHERE ?1 IS NULL OR r.competition_id = ?1
            "#,
        )
        .bind(competition_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn count_competitions(&self) -> StoreResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM competitions")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_results(&self) -> StoreResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM competition_results")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(options: &[&str], correct: i64) -> NewQuestion {
        NewQuestion {
            prompt: "How long does a plastic bottle take to degrade?".into(),
            options: options.iter().map(|s| s.to_string()).collect(),
            correct_option: correct,
            points: None,
        }
    }

    #[test]
    fn test_validate_questions() {
        assert!(validate_questions(&[q(&["10 years", "450 years"], 1)]).is_ok());
        assert!(validate_questions(&[]).is_err());
        assert!(validate_questions(&[q(&["only one"], 0)]).is_err());
        assert!(validate_questions(&[q(&["a", "b"], 2)]).is_err());
        assert!(validate_questions(&[q(&["a", " "], 0)]).is_err());
    }

    #[test]
    fn test_validate_question_points() {
        let worth = |points: i64| NewQuestion { points: Some(points), ..q(&["a", "b"], 0) };
        assert!(validate_questions(&[worth(0), worth(MAX_QUESTION_POINTS)]).is_ok());
        assert!(validate_questions(&[worth(-1)]).is_err());
        assert!(validate_questions(&[worth(MAX_QUESTION_POINTS + 1)]).is_err());
        assert!(validate_questions(&[worth(i64::MAX), worth(1)]).is_err());
    }

    #[test]
    fn test_validate_window() {
        assert!(validate_window(None, Some(5)).is_ok());
        assert!(validate_window(Some(1), Some(5)).is_ok());
        assert!(validate_window(Some(5), Some(5)).is_err());
    }
}
