use std::sync::Arc;

use crate::data::post_repository::PostRepository;
use crate::data::tag_repository::TagRepository;
use crate::domain::pagination::{POSTS_PER_PAGE, Page, Paginator};
use crate::domain::{
    error::DomainError,
    post::{Post, SearchHit, SimilarPost},
    tag::Tag,
};
use crate::infrastructure::config::SearchMode;
use chrono::NaiveDate;
use tracing::{debug, instrument};
use uuid::Uuid;

pub const SIMILAR_POSTS_LIMIT: u32 = 4;
pub const SEARCH_SIMILARITY_THRESHOLD: f32 = 0.1;

#[derive(Debug)]
pub struct PostList {
    pub page: Page<Post>,
    pub tag: Option<Tag>,
}

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    tags: Arc<dyn TagRepository>,
    search_mode: SearchMode,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        tags: Arc<dyn TagRepository>,
        search_mode: SearchMode,
    ) -> Self {
        Self {
            posts,
            tags,
            search_mode,
        }
    }

    /// One page of published posts, optionally restricted to a tag.
    #[instrument(skip(self))]
    pub async fn list_posts(
        &self,
        tag_slug: Option<&str>,
        page_token: Option<&str>,
    ) -> Result<PostList, DomainError> {
        let tag = match tag_slug {
            Some(slug) => Some(
                self.tags
                    .find_by_slug(slug)
                    .await?
                    .ok_or_else(|| DomainError::TagNotFound(slug.to_string()))?,
            ),
            None => None,
        };
        let tag_id = tag.as_ref().map(|t| t.id);

        let count = self.posts.count_published(tag_id).await?;
        let window = Paginator::new(count, POSTS_PER_PAGE).window(page_token);
        let mut posts = self
            .posts
            .list_published(tag_id, window.limit, window.offset)
            .await?;
        self.attach_tags(posts.iter_mut()).await?;

        debug!(count, page = window.number, pages = window.num_pages, "posts listed");
        Ok(PostList {
            page: Page::new(posts, window),
            tag,
        })
    }

    pub async fn get_post_by_date(
        &self,
        year: i32,
        month: u32,
        day: u32,
        slug: &str,
    ) -> Result<Post, DomainError> {
        let not_found = || DomainError::PostNotFound(format!("{year}/{month}/{day}/{slug}"));
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(not_found)?;

        let mut post = self
            .posts
            .find_published_by_date(date, slug)
            .await?
            .ok_or_else(not_found)?;
        self.attach_tags(std::iter::once(&mut post)).await?;
        Ok(post)
    }

    pub async fn get_published_post(&self, id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_published(id)
            .await?
            .ok_or_else(|| DomainError::post_id(id))
    }

    pub async fn similar_posts(&self, post: &Post) -> Result<Vec<SimilarPost>, DomainError> {
        let mut similar = self
            .posts
            .similar_posts(post.id, SIMILAR_POSTS_LIMIT)
            .await?;
        self.attach_tags(similar.iter_mut().map(|s| &mut s.post))
            .await?;
        Ok(similar)
    }

    /// Blank queries return no results rather than every post.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>, DomainError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits = match self.search_mode {
            SearchMode::Trigram => {
                self.posts
                    .search_by_title(query, SEARCH_SIMILARITY_THRESHOLD)
                    .await?
            }
            SearchMode::Fulltext => self.posts.search_full_text(query).await?,
        };
        self.attach_tags(hits.iter_mut().map(|h| &mut h.post))
            .await?;

        debug!(hits = hits.len(), mode = ?self.search_mode, "search finished");
        Ok(hits)
    }

    async fn attach_tags<'a>(
        &self,
        posts: impl IntoIterator<Item = &'a mut Post>,
    ) -> Result<(), DomainError> {
        let mut posts: Vec<&mut Post> = posts.into_iter().collect();
        if posts.is_empty() {
            return Ok(());
        }

        let ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
        let mut tags = self.tags.tags_for_posts(&ids).await?;
        for post in posts.iter_mut() {
            post.tags = tags.remove(&post.id).unwrap_or_default();
        }
        Ok(())
    }
}
