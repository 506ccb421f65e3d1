// src/competition/types.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Competition {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub starts_at: Option<i64>,
    pub ends_at: Option<i64>,
    pub created_by: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Competition {
    /// Open when `ts` falls inside the optional `[starts_at, ends_at]` window.
    pub fn is_open_at(&self, ts: i64) -> bool {
        self.starts_at.is_none_or(|s| ts >= s) && self.ends_at.is_none_or(|e| ts <= e)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub competition_id: String,
    pub position: i64,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_option: i64,
    pub points: i64,
}

// options are stored as a JSON array in a TEXT column
#[derive(FromRow)]
pub(crate) struct QuestionRow {
    pub id: String,
    pub competition_id: String,
    pub position: i64,
    pub prompt: String,
    pub options: String,
    pub correct_option: i64,
    pub points: i64,
}

impl TryFrom<QuestionRow> for Question {
    type Error = serde_json::Error;

    fn try_from(r: QuestionRow) -> Result<Self, Self::Error> {
        Ok(Question {
            id: r.id,
            competition_id: r.competition_id,
            position: r.position,
            prompt: r.prompt,
            options: serde_json::from_str(&r.options)?,
            correct_option: r.correct_option,
            points: r.points,
        })
    }
}

/// A question as served to clients; `correct_option` only for administrators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionView {
    pub id: String,
    pub position: i64,
    pub prompt: String,
    pub options: Vec<String>,
    pub points: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_option: Option<i64>,
}

impl QuestionView {
    pub fn from_question(q: &Question, reveal_answer: bool) -> Self {
        Self {
            id: q.id.clone(),
            position: q.position,
            prompt: q.prompt.clone(),
            options: q.options.clone(),
            points: q.points,
            correct_option: reveal_answer.then_some(q.correct_option),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompetitionDetail {
    #[serde(flatten)]
    pub competition: Competition,
    pub questions: Vec<QuestionView>,
    pub max_score: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnsweredQuestion {
    pub question_id: String,
    pub selected_option: Option<i64>,
    pub correct: bool,
    pub points_awarded: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitionResult {
    pub id: String,
    pub competition_id: String,
    pub user_id: String,
    pub score: i64,
    pub max_score: i64,
    pub correct_count: i64,
    pub question_count: i64,
    pub answers: Vec<AnsweredQuestion>,
    pub completed_at: i64,
}

#[derive(FromRow)]
pub(crate) struct ResultRow {
    pub id: String,
    pub competition_id: String,
    pub user_id: String,
    pub score: i64,
    pub max_score: i64,
    pub correct_count: i64,
    pub question_count: i64,
    pub answers: String,
    pub completed_at: i64,
}

impl TryFrom<ResultRow> for CompetitionResult {
    type Error = serde_json::Error;

    fn try_from(r: ResultRow) -> Result<Self, Self::Error> {
        Ok(CompetitionResult {
            id: r.id,
            competition_id: r.competition_id,
            user_id: r.user_id,
            score: r.score,
            max_score: r.max_score,
            correct_count: r.correct_count,
            question_count: r.question_count,
            answers: serde_json::from_str(&r.answers)?,
            completed_at: r.completed_at,
        })
    }
}

/// One stored attempt joined with its user's name, as read for leaderboards.
#[derive(Debug, Clone, FromRow)]
pub struct LeaderboardRow {
    pub user_id: String,
    pub competition_id: String,
    pub score: i64,
    pub completed_at: i64,
    /// Insertion order of the attempt; breaks ties between same-second completions.
    pub seq: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: String,
    pub display_name: Option<String>,
    pub score: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competitions: Option<usize>,
}

// Request types for API

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQuestion {
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_option: i64,
    pub points: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateCompetitionRequest {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub starts_at: Option<i64>,
    pub ends_at: Option<i64>,
    pub questions: Vec<NewQuestion>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateCompetitionRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub starts_at: Option<i64>,
    pub ends_at: Option<i64>,
    pub questions: Option<Vec<NewQuestion>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    pub selected_option: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Submission {
    pub answers: Vec<Answer>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn competition(starts_at: Option<i64>, ends_at: Option<i64>) -> Competition {
        Competition {
            id: "c1".into(),
            title: "Recycling basics".into(),
            description: None,
            category: None,
            image_url: None,
            starts_at,
            ends_at,
            created_by: "admin".into(),
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_open_window() {
        assert!(competition(None, None).is_open_at(5));
        assert!(competition(Some(5), Some(10)).is_open_at(5));
        assert!(competition(Some(5), Some(10)).is_open_at(10));
        assert!(!competition(Some(5), None).is_open_at(4));
        assert!(!competition(None, Some(10)).is_open_at(11));
    }

    #[test]
    fn test_question_view_hides_answer() {
        let q = Question {
            id: "q1".into(),
            competition_id: "c1".into(),
            position: 0,
            prompt: "Which bin takes glass?".into(),
            options: vec!["Green".into(), "Blue".into()],
            correct_option: 0,
            points: 2,
        };

        let public = serde_json::to_value(QuestionView::from_question(&q, false)).unwrap();
        assert!(public.get("correct_option").is_none());

        let admin = serde_json::to_value(QuestionView::from_question(&q, true)).unwrap();
        assert_eq!(admin["correct_option"], 0);
    }
}
