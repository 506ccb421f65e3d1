// src/event/types.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::auth::types::display_name;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: i64,
    pub ends_at: Option<i64>,
    pub capacity: Option<i64>,
    pub image_url: Option<String>,
    pub created_by: String,
    pub created_at: i64,
    pub updated_at: i64,
    #[sqlx(default)]
    pub registered_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Registration {
    pub id: String,
    pub event_id: String,
    pub user_id: String,
    pub registered_at: i64,
}

#[derive(FromRow)]
pub(crate) struct RegistrantRow {
    pub user_id: String,
    pub registered_at: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registrant {
    pub user_id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub registered_at: i64,
}

impl From<RegistrantRow> for Registrant {
    fn from(r: RegistrantRow) -> Self {
        Registrant {
            display_name: display_name(r.first_name.as_deref(), r.last_name.as_deref()),
            user_id: r.user_id,
            email: r.email,
            registered_at: r.registered_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: String,
    pub event_id: String,
    pub author_id: String,
    pub rating: i64,
    pub comment: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewSummary {
    pub count: usize,
    pub average: Option<f64>,
}

impl ReviewSummary {
    pub fn from_reviews(reviews: &[Review]) -> Self {
        let count = reviews.len();
        let average = (count > 0)
            .then(|| reviews.iter().map(|r| r.rating as f64).sum::<f64>() / count as f64);
        Self { count, average }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewsResponse {
    pub items: Vec<Review>,
    pub summary: ReviewSummary,
}

// Request types for API

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: i64,
    pub ends_at: Option<i64>,
    pub capacity: Option<i64>,
    pub image_url: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: Option<i64>,
    pub ends_at: Option<i64>,
    pub capacity: Option<i64>,
    pub image_url: Option<String>,
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct EventFilter {
    #[serde(default)]
    pub upcoming: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateReviewRequest {
    pub rating: i64,
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(rating: i64) -> Review {
        Review {
            id: format!("r{rating}"),
            event_id: "e1".into(),
            author_id: "u1".into(),
            rating,
            comment: None,
            created_at: 0,
        }
    }

    #[test]
    fn test_review_summary() {
        let summary = ReviewSummary::from_reviews(&[review(5), review(4), review(3)]);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.average, Some(4.0));

        assert_eq!(ReviewSummary::from_reviews(&[]), ReviewSummary { count: 0, average: None });
    }
}
