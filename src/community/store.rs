// src/community/store.rs
// Discussions, event wishes with votes, and blog posts

use sqlx::SqlitePool;
use uuid::Uuid;

use super::types::{
    BlogPost, CreateBlogRequest, CreateDiscussionRequest, CreateReplyRequest, CreateWishRequest, Discussion,
    DiscussionRow, EventWish, Reply, ReplyRow, UpdateBlogRequest, VoteOutcome,
};
use crate::api::common::Page;
use crate::error::{StoreError, StoreResult, now_ts, optional_text, require_text};

const DISCUSSION_COLUMNS: &str = r#"
    d.*,
    (SELECT COUNT(*) FROM discussion_replies r WHERE r.discussion_id = d.id) AS reply_count,
    u.first_name, u.last_name
"#;

// ?1 is the caller's id, NULL for anonymous callers
const WISH_COLUMNS: &str = r#"
    w.*,
    (SELECT COUNT(*) FROM wish_votes v WHERE v.wish_id = w.id) AS votes,
    EXISTS(SELECT 1 FROM wish_votes v WHERE v.wish_id = w.id AND v.user_id = ?1) AS voted
"#;

#[derive(Clone)]
pub struct CommunityStore {
    pub pool: SqlitePool,
}

impl CommunityStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ===== Discussions =====

    pub async fn create_discussion(&self, author_id: &str, req: CreateDiscussionRequest) -> StoreResult<Discussion> {
        let title = require_text("title", &req.title)?;
        let body = require_text("body", &req.body)?;
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO discussions (id, author_id, title, body, topic, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(author_id)
        .bind(&title)
        .bind(&body)
        .bind(optional_text(req.topic))
        .bind(now_ts())
        .execute(&self.pool)
        .await?;

        self.get_discussion(&id)
            .await?
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))
    }

    pub async fn get_discussion(&self, id: &str) -> StoreResult<Option<Discussion>> {
        let sql = format!(
            "SELECT {DISCUSSION_COLUMNS} FROM discussions d LEFT JOIN users u ON u.id = d.author_id WHERE d.id = ?"
        );
        let row = sqlx::query_as::<_, DiscussionRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Discussion::from))
    }

    /// Newest first.
    pub async fn list_discussions(&self, page: Page) -> StoreResult<Vec<Discussion>> {
        let sql = format!(
            "SELECT {DISCUSSION_COLUMNS} FROM discussions d
             LEFT JOIN users u ON u.id = d.author_id
             ORDER BY d.created_at DESC, d.rowid DESC
             LIMIT ? OFFSET ?"
        );
        let rows = sqlx::query_as::<_, DiscussionRow>(&sql)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Discussion::from).collect())
    }

    pub async fn delete_discussion(&self, id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM discussions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Returns `None` when the discussion does not exist.
    pub async fn add_reply(
        &self,
        discussion_id: &str,
        author_id: &str,
        req: CreateReplyRequest,
    ) -> StoreResult<Option<Reply>> {
        let body = require_text("body", &req.body)?;
        let id = Uuid::new_v4().to_string();

        let result = sqlx::query(
            r#"
            INSERT INTO discussion_replies (id, discussion_id, author_id, body, created_at)
            SELECT ?, d.id, ?, ?, ? FROM discussions d WHERE d.id = ?
            "#,
        )
        .bind(&id)
        .bind(author_id)
        .bind(&body)
        .bind(now_ts())
        .bind(discussion_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let row = sqlx::query_as::<_, ReplyRow>(
            r#"
            SELECT r.*, u.first_name, u.last_name
            FROM discussion_replies r LEFT JOIN users u ON u.id = r.author_id
            WHERE r.id = ?
            "#,
        )
        .bind(&id)
        .fetch_one(&self.pool)
        .await?;
        Ok(Some(row.into()))
    }

    /// Oldest first, so a thread reads top to bottom.
    pub async fn list_replies(&self, discussion_id: &str) -> StoreResult<Vec<Reply>> {
        let rows = sqlx::query_as::<_, ReplyRow>(
            r#"
            SELECT r.*, u.first_name, u.last_name
            FROM discussion_replies r LEFT JOIN users u ON u.id = r.author_id
            WHERE r.discussion_id = ?
            ORDER BY r.created_at, r.rowid
            "#,
        )
        .bind(discussion_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Reply::from).collect())
    }

    pub async fn count_discussions(&self) -> StoreResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM discussions")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // ===== Event wishes =====

    pub async fn create_wish(&self, author_id: &str, req: CreateWishRequest) -> StoreResult<EventWish> {
        let wish = EventWish {
            id: Uuid::new_v4().to_string(),
            author_id: author_id.to_string(),
            title: require_text("title", &req.title)?,
            description: optional_text(req.description),
            created_at: now_ts(),
            votes: 0,
            voted: false,
        };

        sqlx::query("INSERT INTO event_wishes (id, author_id, title, description, created_at) VALUES (?, ?, ?, ?, ?)")
            .bind(&wish.id)
            .bind(&wish.author_id)
            .bind(&wish.title)
            .bind(&wish.description)
            .bind(wish.created_at)
            .execute(&self.pool)
            .await?;

        Ok(wish)
    }

    pub async fn get_wish(&self, id: &str, viewer_id: Option<&str>) -> StoreResult<Option<EventWish>> {
        let sql = format!("SELECT {WISH_COLUMNS} FROM event_wishes w WHERE w.id = ?2");
        let wish = sqlx::query_as::<_, EventWish>(&sql)
            .bind(viewer_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(wish)
    }

    /// Most voted first, newest first among equals.
    pub async fn list_wishes(&self, viewer_id: Option<&str>, page: Page) -> StoreResult<Vec<EventWish>> {
        let sql = format!(
            "SELECT {WISH_COLUMNS} FROM event_wishes w
             ORDER BY votes DESC, w.created_at DESC, w.rowid DESC
             LIMIT ?2 OFFSET ?3"
        );
        let wishes = sqlx::query_as::<_, EventWish>(&sql)
            .bind(viewer_id)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(wishes)
    }

    /// Add the caller's vote, or take it back if already cast.
    /// Returns `None` when the wish does not exist. Opens with a write so the
    /// transaction holds the write lock before it reads.
    pub async fn toggle_vote(&self, wish_id: &str, user_id: &str) -> StoreResult<Option<VoteOutcome>> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM wish_votes WHERE wish_id = ? AND user_id = ?")
            .bind(wish_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if removed == 0 {
            let inserted = sqlx::query(
                r#"
                INSERT INTO wish_votes (wish_id, user_id, created_at)
                SELECT id, ?2, ?3 FROM event_wishes WHERE id = ?1
                "#,
            )
            .bind(wish_id)
            .bind(user_id)
            .bind(now_ts())
            .execute(&mut *tx)
            .await?
            .rows_affected();
            if inserted == 0 {
                return Ok(None);
            }
        }

        let (votes,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM wish_votes WHERE wish_id = ?")
            .bind(wish_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(VoteOutcome {
            voted: removed == 0,
            votes,
        }))
    }

    pub async fn delete_wish(&self, id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM event_wishes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ===== Blogs =====

    pub async fn create_blog(&self, author_id: &str, req: CreateBlogRequest) -> StoreResult<BlogPost> {
        let now = now_ts();
        let mut post = BlogPost {
            id: Uuid::new_v4().to_string(),
            author_id: author_id.to_string(),
            title: require_text("title", &req.title)?,
            content: require_text("content", &req.content)?,
            excerpt: optional_text(req.excerpt),
            image_url: optional_text(req.image_url),
            published: false,
            published_at: None,
            created_at: now,
            updated_at: now,
        };
        post.set_published(req.published, now);

        sqlx::query(
            r#"
            INSERT INTO blog_posts
                (id, author_id, title, content, excerpt, image_url, published, published_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&post.id)
        .bind(&post.author_id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.excerpt)
        .bind(&post.image_url)
        .bind(post.published)
        .bind(post.published_at)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(post)
    }

    pub async fn get_blog(&self, id: &str) -> StoreResult<Option<BlogPost>> {
        let post = sqlx::query_as::<_, BlogPost>("SELECT * FROM blog_posts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(post)
    }

    /// Published posts, newest first. With `include_drafts`, admins also see every
    /// draft and other callers see their own.
    pub async fn list_blogs(
        &self,
        include_drafts: bool,
        viewer_id: Option<&str>,
        viewer_is_admin: bool,
        page: Page,
    ) -> StoreResult<Vec<BlogPost>> {
        let posts = sqlx::query_as::<_, BlogPost>(
            r#"
            SELECT * FROM blog_posts
            WHERE published = 1
               OR (?1 = 1 AND (?2 = 1 OR author_id = ?3))
            ORDER BY COALESCE(published_at, created_at) DESC, rowid DESC
            LIMIT ?4 OFFSET ?5
            "#,
        )
        .bind(include_drafts)
        .bind(viewer_is_admin)
        .bind(viewer_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(posts)
    }

    pub async fn update_blog(&self, id: &str, req: UpdateBlogRequest) -> StoreResult<Option<BlogPost>> {
        let Some(mut post) = self.get_blog(id).await? else {
            return Ok(None);
        };

        if let Some(title) = req.title {
            post.title = require_text("title", &title)?;
        }
        if let Some(content) = req.content {
            post.content = require_text("content", &content)?;
        }
        if req.excerpt.is_some() {
            post.excerpt = optional_text(req.excerpt);
        }
        if req.image_url.is_some() {
            post.image_url = optional_text(req.image_url);
        }
        let now = now_ts();
        if let Some(published) = req.published {
            post.set_published(published, now);
        }
        post.updated_at = now;

        sqlx::query(
            r#"
            UPDATE blog_posts
            SET title = ?, content = ?, excerpt = ?, image_url = ?, published = ?, published_at = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.excerpt)
        .bind(&post.image_url)
        .bind(post.published)
        .bind(post.published_at)
        .bind(post.updated_at)
        .bind(&post.id)
        .execute(&self.pool)
        .await?;

        Ok(Some(post))
    }

    pub async fn delete_blog(&self, id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM blog_posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_published_blogs(&self) -> StoreResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM blog_posts WHERE published = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
