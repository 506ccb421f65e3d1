// src/community/types.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::auth::types::display_name;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discussion {
    pub id: String,
    pub author_id: String,
    pub author_name: Option<String>,
    pub title: String,
    pub body: String,
    pub topic: Option<String>,
    pub reply_count: i64,
    pub created_at: i64,
}

// discussion joined with its author's name columns
#[derive(FromRow)]
pub(crate) struct DiscussionRow {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub body: String,
    pub topic: Option<String>,
    pub created_at: i64,
    #[sqlx(default)]
    pub reply_count: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl From<DiscussionRow> for Discussion {
    fn from(r: DiscussionRow) -> Self {
        Discussion {
            author_name: display_name(r.first_name.as_deref(), r.last_name.as_deref()),
            id: r.id,
            author_id: r.author_id,
            title: r.title,
            body: r.body,
            topic: r.topic,
            reply_count: r.reply_count,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reply {
    pub id: String,
    pub discussion_id: String,
    pub author_id: String,
    pub author_name: Option<String>,
    pub body: String,
    pub created_at: i64,
}

#[derive(FromRow)]
pub(crate) struct ReplyRow {
    pub id: String,
    pub discussion_id: String,
    pub author_id: String,
    pub body: String,
    pub created_at: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl From<ReplyRow> for Reply {
    fn from(r: ReplyRow) -> Self {
        Reply {
            author_name: display_name(r.first_name.as_deref(), r.last_name.as_deref()),
            id: r.id,
            discussion_id: r.discussion_id,
            author_id: r.author_id,
            body: r.body,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DiscussionThread {
    #[serde(flatten)]
    pub discussion: Discussion,
    pub replies: Vec<Reply>,
}

/// An event idea members can vote for. `voted` is relative to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventWish {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub description: Option<String>,
    pub created_at: i64,
    #[sqlx(default)]
    pub votes: i64,
    #[sqlx(default)]
    pub voted: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteOutcome {
    pub voted: bool,
    pub votes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BlogPost {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub image_url: Option<String>,
    pub published: bool,
    pub published_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl BlogPost {
    /// Flip the published flag. The first publication stamps `published_at`;
    /// unpublishing keeps it.
    pub fn set_published(&mut self, published: bool, now: i64) {
        self.published = published;
        if published && self.published_at.is_none() {
            self.published_at = Some(now);
        }
    }

    pub fn visible_to(&self, user_id: Option<&str>, is_admin: bool) -> bool {
        self.published || is_admin || user_id == Some(self.author_id.as_str())
    }
}

// Request types for API

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateDiscussionRequest {
    pub title: String,
    pub body: String,
    pub topic: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateReplyRequest {
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateWishRequest {
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateBlogRequest {
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub published: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateBlogRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub image_url: Option<String>,
    pub published: Option<bool>,
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct BlogFilter {
    #[serde(default)]
    pub drafts: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> BlogPost {
        BlogPost {
            id: "b1".into(),
            author_id: "u1".into(),
            title: "Composting at home".into(),
            content: "Start small.".into(),
            excerpt: None,
            image_url: None,
            published: false,
            published_at: None,
            created_at: 100,
            updated_at: 100,
        }
    }

    #[test]
    fn test_first_publication_is_stamped_once() {
        let mut post = draft();
        post.set_published(true, 200);
        assert_eq!(post.published_at, Some(200));

        post.set_published(false, 300);
        assert!(!post.published);
        assert_eq!(post.published_at, Some(200));

        post.set_published(true, 400);
        assert_eq!(post.published_at, Some(200));
    }

    #[test]
    fn test_draft_visibility() {
        let post = draft();
        assert!(!post.visible_to(None, false));
        assert!(!post.visible_to(Some("u2"), false));
        assert!(post.visible_to(Some("u1"), false));
        assert!(post.visible_to(Some("u2"), true));
    }

    #[test]
    fn test_thread_flattens_discussion() {
        let thread = DiscussionThread {
            discussion: Discussion {
                id: "d1".into(),
                author_id: "u1".into(),
                author_name: Some("Ada".into()),
                title: "Plastic-free July".into(),
                body: "Who is in?".into(),
                topic: None,
                reply_count: 0,
                created_at: 1,
            },
            replies: vec![],
        };
        let json = serde_json::to_value(&thread).unwrap();
        assert_eq!(json["title"], "Plastic-free July");
        assert!(json["replies"].as_array().unwrap().is_empty());
    }
}
