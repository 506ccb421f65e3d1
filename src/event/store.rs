// src/event/store.rs
// Events, registrations and post-event reviews

use sqlx::SqlitePool;
use uuid::Uuid;

use super::types::{
    CreateEventRequest, CreateReviewRequest, Event, RegistrantRow, Registrant, Registration, Review,
    UpdateEventRequest,
};
use crate::api::common::Page;
use crate::error::{StoreError, StoreResult, now_ts, optional_text, require_text};

const EVENT_COLUMNS: &str = r#"
    e.*,
    (SELECT COUNT(*) FROM event_registrations r WHERE r.event_id = e.id) AS registered_count
"#;

fn validate_schedule(starts_at: i64, ends_at: Option<i64>) -> StoreResult<()> {
    match ends_at {
        Some(end) if end <= starts_at => Err(StoreError::invalid("ends_at must be after starts_at")),
        _ => Ok(()),
    }
}

fn validate_capacity(capacity: Option<i64>) -> StoreResult<()> {
    match capacity {
        Some(c) if c <= 0 => Err(StoreError::invalid("capacity must be positive")),
        _ => Ok(()),
    }
}

#[derive(Clone)]
pub struct EventStore {
    pub pool: SqlitePool,
}

impl EventStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_event(&self, created_by: &str, req: CreateEventRequest) -> StoreResult<Event> {
        let title = require_text("title", &req.title)?;
        validate_schedule(req.starts_at, req.ends_at)?;
        validate_capacity(req.capacity)?;

        let now = now_ts();
        let event = Event {
            id: Uuid::new_v4().to_string(),
            title,
            description: optional_text(req.description),
            location: optional_text(req.location),
            starts_at: req.starts_at,
            ends_at: req.ends_at,
            capacity: req.capacity,
            image_url: optional_text(req.image_url),
            created_by: created_by.to_string(),
            created_at: now,
            updated_at: now,
            registered_count: 0,
        };

        sqlx::query(
            r#"
            INSERT INTO events
                (id, title, description, location, starts_at, ends_at, capacity, image_url, created_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&event.id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location)
        .bind(event.starts_at)
        .bind(event.ends_at)
        .bind(event.capacity)
        .bind(&event.image_url)
        .bind(&event.created_by)
        .bind(event.created_at)
        .bind(event.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(event)
    }

    pub async fn get_event(&self, id: &str) -> StoreResult<Option<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events e WHERE e.id = ?");
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(event)
    }

    /// Events ordered by start time; `upcoming_only` hides events that already started.
    pub async fn list_events(&self, upcoming_only: bool, page: Page) -> StoreResult<Vec<Event>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events e
             WHERE ?1 = 0 OR e.starts_at >= ?2
             ORDER BY e.starts_at, e.rowid
             LIMIT ?3 OFFSET ?4"
        );
        let events = sqlx::query_as::<_, Event>(&sql)
            .bind(upcoming_only)
            .bind(now_ts())
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(events)
    }

    pub async fn update_event(&self, id: &str, req: UpdateEventRequest) -> StoreResult<Option<Event>> {
        let Some(mut event) = self.get_event(id).await? else {
            return Ok(None);
        };

        if let Some(title) = req.title {
            event.title = require_text("title", &title)?;
        }
        if req.description.is_some() {
            event.description = optional_text(req.description);
        }
        if req.location.is_some() {
            event.location = optional_text(req.location);
        }
        if req.image_url.is_some() {
            event.image_url = optional_text(req.image_url);
        }
        if let Some(starts_at) = req.starts_at {
            event.starts_at = starts_at;
        }
        if req.ends_at.is_some() {
            event.ends_at = req.ends_at;
        }
        if req.capacity.is_some() {
            validate_capacity(req.capacity)?;
            event.capacity = req.capacity;
        }
        validate_schedule(event.starts_at, event.ends_at)?;
        if let Some(capacity) = event.capacity {
            if capacity < event.registered_count {
                return Err(StoreError::conflict("Capacity cannot be lower than current registrations"));
            }
        }
        event.updated_at = now_ts();

        sqlx::query(
            r#"
            UPDATE events
            SET title = ?, description = ?, location = ?, starts_at = ?, ends_at = ?,
                capacity = ?, image_url = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location)
        .bind(event.starts_at)
        .bind(event.ends_at)
        .bind(event.capacity)
        .bind(&event.image_url)
        .bind(event.updated_at)
        .bind(&event.id)
        .execute(&self.pool)
        .await?;

        Ok(Some(event))
    }

    pub async fn delete_event(&self, id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Register `user_id` for an event. The capacity check and the insert are a
    /// single statement, so concurrent registrations cannot overfill an event.
    /// Returns `None` when the event does not exist.
    pub async fn register(&self, event_id: &str, user_id: &str) -> StoreResult<Option<Registration>> {
        let registration = Registration {
            id: Uuid::new_v4().to_string(),
            event_id: event_id.to_string(),
            user_id: user_id.to_string(),
            registered_at: now_ts(),
        };

        let result = sqlx::query(
            r#"
            INSERT INTO event_registrations (id, event_id, user_id, registered_at)
            SELECT ?, e.id, ?, ?
            FROM events e
            WHERE e.id = ?
              AND (e.capacity IS NULL
                   OR (SELECT COUNT(*) FROM event_registrations r WHERE r.event_id = e.id) < e.capacity)
            "#,
        )
        .bind(&registration.id)
        .bind(&registration.user_id)
        .bind(registration.registered_at)
        .bind(&registration.event_id)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) if done.rows_affected() == 1 => Ok(Some(registration)),
            Ok(_) => match self.get_event(event_id).await? {
                Some(_) => Err(StoreError::conflict("Event is full")),
                None => Ok(None),
            },
            Err(e) if StoreError::is_unique_violation(&e) => {
                Err(StoreError::conflict("Already registered for this event"))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn unregister(&self, event_id: &str, user_id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM event_registrations WHERE event_id = ? AND user_id = ?")
            .bind(event_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn is_registered(&self, event_id: &str, user_id: &str) -> StoreResult<bool> {
        let found: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM event_registrations WHERE event_id = ? AND user_id = ?")
                .bind(event_id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(found.is_some())
    }

    pub async fn list_registrants(&self, event_id: &str) -> StoreResult<Vec<Registrant>> {
        let rows = sqlx::query_as::<_, RegistrantRow>(
            r#"
            SELECT r.user_id, r.registered_at, u.first_name, u.last_name, u.email
            FROM event_registrations r
            JOIN users u ON u.id = r.user_id
            WHERE r.event_id = ?
            ORDER BY r.registered_at, r.rowid
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Registrant::from).collect())
    }

    pub async fn list_user_events(&self, user_id: &str) -> StoreResult<Vec<Event>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events e
             JOIN event_registrations mine ON mine.event_id = e.id
             WHERE mine.user_id = ?
             ORDER BY e.starts_at, e.rowid"
        );
        let events = sqlx::query_as::<_, Event>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(events)
    }

    pub async fn create_review(
        &self,
        event_id: &str,
        author_id: &str,
        req: CreateReviewRequest,
    ) -> StoreResult<Review> {
        if !(1..=5).contains(&req.rating) {
            return Err(StoreError::invalid("rating must be between 1 and 5"));
        }

        let review = Review {
            id: Uuid::new_v4().to_string(),
            event_id: event_id.to_string(),
            author_id: author_id.to_string(),
            rating: req.rating,
            comment: optional_text(req.comment),
            created_at: now_ts(),
        };

        let result = sqlx::query(
            r#"
            INSERT INTO event_reviews (id, event_id, author_id, rating, comment, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&review.id)
        .bind(&review.event_id)
        .bind(&review.author_id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(review),
            Err(e) if StoreError::is_unique_violation(&e) => {
                Err(StoreError::conflict("You have already reviewed this event"))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list_reviews(&self, event_id: &str) -> StoreResult<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(
            "SELECT * FROM event_reviews WHERE event_id = ? ORDER BY created_at DESC, rowid DESC",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    pub async fn count_events(&self) -> StoreResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_registrations(&self) -> StoreResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM event_registrations")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_schedule() {
        assert!(validate_schedule(100, None).is_ok());
        assert!(validate_schedule(100, Some(200)).is_ok());
        assert!(validate_schedule(100, Some(100)).is_err());
    }

    #[test]
    fn test_validate_capacity() {
        assert!(validate_capacity(None).is_ok());
        assert!(validate_capacity(Some(1)).is_ok());
        assert!(validate_capacity(Some(0)).is_err());
    }
}
