use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::tag::Tag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "post_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub title: String,
    pub slug: String,
    pub body: String,
    pub publish: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: PostStatus,
    #[sqlx(skip)]
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Post {
    pub fn new(author_id: Uuid, author_name: String, title: String, body: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            author_name,
            slug: slug::slugify(&title),
            title,
            body,
            publish: now,
            created_at: now,
            updated_at: now,
            status: PostStatus::Draft,
            tags: Vec::new(),
        }
    }

    pub fn published_at(mut self, publish: DateTime<Utc>) -> Self {
        self.publish = publish;
        self.status = PostStatus::Published;
        self
    }

    /// Visible to readers: published and not scheduled for later.
    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        self.status == PostStatus::Published && self.publish <= now
    }

    pub fn absolute_url(&self) -> String {
        format!(
            "/blog/{}/{:02}/{:02}/{}/",
            self.publish.year(),
            self.publish.month(),
            self.publish.day(),
            self.slug
        )
    }

    pub fn share_url(&self) -> String {
        format!("/blog/{}/share/", self.id)
    }
}

/// A post that shares tags with another one.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SimilarPost {
    #[sqlx(flatten)]
    pub post: Post,
    pub same_tags: i64,
}

/// Search result with its relevance score (trigram similarity or text rank).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SearchHit {
    #[sqlx(flatten)]
    pub post: Post,
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn new_post_is_draft_with_slug() {
        let post = Post::new(
            Uuid::new_v4(),
            "admin".into(),
            "Who was Django Reinhardt?".into(),
            "body".into(),
        );
        assert_eq!(post.slug, "who-was-django-reinhardt");
        assert_eq!(post.status, PostStatus::Draft);
        assert!(!post.is_visible_at(Utc::now()));
    }

    #[test]
    fn absolute_url_uses_zero_padded_publish_date() {
        let publish = Utc.with_ymd_and_hms(2024, 3, 7, 10, 0, 0).unwrap();
        let post = Post::new(Uuid::new_v4(), "admin".into(), "Hello World".into(), "".into())
            .published_at(publish);
        assert_eq!(post.absolute_url(), "/blog/2024/03/07/hello-world/");
    }

    #[test]
    fn scheduled_post_is_not_visible_yet() {
        let now = Utc::now();
        let post = Post::new(Uuid::new_v4(), "admin".into(), "Later".into(), "".into())
            .published_at(now + Duration::hours(1));
        assert!(!post.is_visible_at(now));
        assert!(post.is_visible_at(now + Duration::hours(2)));
    }
}
