use crate::domain::error::DomainError;
use crate::domain::post::{Post, SearchHit, SimilarPost};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn count_published(&self, tag_id: Option<Uuid>) -> Result<u64, DomainError>;
    async fn list_published(
        &self,
        tag_id: Option<Uuid>,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<Post>, DomainError>;
    async fn find_published(&self, id: Uuid) -> Result<Option<Post>, DomainError>;
    async fn find_published_by_date(
        &self,
        date: NaiveDate,
        slug: &str,
    ) -> Result<Option<Post>, DomainError>;
    async fn similar_posts(&self, post_id: Uuid, limit: u32)
    -> Result<Vec<SimilarPost>, DomainError>;
    async fn search_by_title(
        &self,
        query: &str,
        threshold: f32,
    ) -> Result<Vec<SearchHit>, DomainError>;
    async fn search_full_text(&self, query: &str) -> Result<Vec<SearchHit>, DomainError>;
}

const POST_COLUMNS: &str = r#"
    p.id, p.author_id, a.name AS author_name, p.title, p.slug, p.body,
    p.publish, p.created_at, p.updated_at, p.status
"#;

const PUBLISHED: &str = "p.status = 'published' AND p.publish <= NOW()";

const DOCUMENT: &str =
    "setweight(to_tsvector(p.title), 'A') || setweight(to_tsvector(p.body), 'B')";

#[derive(Clone)]
pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn count_published(&self, tag_id: Option<Uuid>) -> Result<u64, DomainError> {
        let sql = format!(
            r#"
            SELECT COUNT(*) FROM posts p
            WHERE {PUBLISHED}
              AND ($1::uuid IS NULL OR EXISTS (
                  SELECT 1 FROM post_tags pt WHERE pt.post_id = p.id AND pt.tag_id = $1
              ))
            "#
        );
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(tag_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("db error while counting posts: {}", e);
                DomainError::from(e)
            })?;

        Ok(count.max(0) as u64)
    }

    async fn list_published(
        &self,
        tag_id: Option<Uuid>,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<Post>, DomainError> {
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts p JOIN authors a ON a.id = p.author_id
            WHERE {PUBLISHED}
              AND ($1::uuid IS NULL OR EXISTS (
                  SELECT 1 FROM post_tags pt WHERE pt.post_id = p.id AND pt.tag_id = $1
              ))
            ORDER BY p.publish DESC, p.id DESC
            LIMIT $2 OFFSET $3
            "#
        );
        sqlx::query_as::<_, Post>(&sql)
            .bind(tag_id)
            .bind(i64::from(limit))
            .bind(i64::try_from(offset).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("db error while fetching posts: {}", e);
                DomainError::from(e)
            })
    }

    async fn find_published(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts p JOIN authors a ON a.id = p.author_id
            WHERE p.id = $1 AND {PUBLISHED}
            "#
        );
        sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("db error find_published {}: {}", id, e);
                DomainError::from(e)
            })
    }

    async fn find_published_by_date(
        &self,
        date: NaiveDate,
        slug: &str,
    ) -> Result<Option<Post>, DomainError> {
        let Some(start) = date.and_hms_opt(0, 0, 0).map(|d| d.and_utc()) else {
            return Ok(None);
        };
        let end = start + chrono::Duration::days(1);

        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts p JOIN authors a ON a.id = p.author_id
            WHERE p.slug = $1 AND p.publish >= $2 AND p.publish < $3 AND {PUBLISHED}
            "#
        );
        sqlx::query_as::<_, Post>(&sql)
            .bind(slug)
            .bind(start)
            .bind(end)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("db error find_published_by_date {} {}: {}", date, slug, e);
                DomainError::from(e)
            })
    }

    async fn similar_posts(
        &self,
        post_id: Uuid,
        limit: u32,
    ) -> Result<Vec<SimilarPost>, DomainError> {
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}, COUNT(*) AS same_tags
            FROM posts p
            JOIN authors a ON a.id = p.author_id
            JOIN post_tags pt ON pt.post_id = p.id
            WHERE pt.tag_id IN (SELECT tag_id FROM post_tags WHERE post_id = $1)
              AND p.id <> $1
              AND {PUBLISHED}
            GROUP BY p.id, a.name
            ORDER BY same_tags DESC, p.publish DESC
            LIMIT $2
            "#
        );
        sqlx::query_as::<_, SimilarPost>(&sql)
            .bind(post_id)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("db error similar_posts {}: {}", post_id, e);
                DomainError::from(e)
            })
    }

    async fn search_by_title(
        &self,
        query: &str,
        threshold: f32,
    ) -> Result<Vec<SearchHit>, DomainError> {
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}, similarity(p.title, $1) AS score
            FROM posts p JOIN authors a ON a.id = p.author_id
            WHERE {PUBLISHED} AND similarity(p.title, $1) > $2
            ORDER BY score DESC, p.publish DESC
            "#
        );
        sqlx::query_as::<_, SearchHit>(&sql)
            .bind(query)
            .bind(threshold)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("db error search_by_title {:?}: {}", query, e);
                DomainError::from(e)
            })
    }

    async fn search_full_text(&self, query: &str) -> Result<Vec<SearchHit>, DomainError> {
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}, ts_rank({DOCUMENT}, plainto_tsquery($1)) AS score
            FROM posts p JOIN authors a ON a.id = p.author_id
            WHERE {PUBLISHED} AND ({DOCUMENT}) @@ plainto_tsquery($1)
            ORDER BY score DESC, p.publish DESC
            "#
        );
        sqlx::query_as::<_, SearchHit>(&sql)
            .bind(query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("db error search_full_text {:?}: {}", query, e);
                DomainError::from(e)
            })
    }
}
