//! In-memory content store - used when no database is configured and in tests.
//!
//! Implements the same repository traits as the PostgreSQL backend with the
//! same visibility and ordering rules. Data is lost on process restart.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::PostRepository;
use crate::data::tag_repository::TagRepository;
use crate::data::text::{full_text_rank, trigram_similarity};
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::post::{Post, SearchHit, SimilarPost};
use crate::domain::tag::Tag;

#[derive(Default)]
struct State {
    posts: Vec<Post>,
    tags: Vec<Tag>,
    post_tags: HashMap<Uuid, Vec<Uuid>>,
    comments: Vec<Comment>,
}

impl State {
    fn published(&self) -> impl Iterator<Item = &Post> {
        let now = Utc::now();
        self.posts.iter().filter(move |p| p.is_visible_at(now))
    }

    fn has_tag(&self, post_id: Uuid, tag_id: Uuid) -> bool {
        self.post_tags
            .get(&post_id)
            .is_some_and(|tags| tags.contains(&tag_id))
    }
}

fn newest_first(a: &Post, b: &Post) -> Ordering {
    b.publish.cmp(&a.publish).then_with(|| b.id.cmp(&a.id))
}

pub struct InMemoryBlogStore {
    state: RwLock<State>,
}

impl InMemoryBlogStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
        }
    }

    /// Store a post and link it to `tags`, reusing stored tags with the same slug.
    pub async fn insert_post(&self, post: Post, tags: &[Tag]) -> Post {
        let mut state = self.state.write().await;

        let mut tag_ids = Vec::with_capacity(tags.len());
        for tag in tags {
            let id = match state.tags.iter().find(|t| t.slug == tag.slug).map(|t| t.id) {
                Some(existing) => existing,
                None => {
                    state.tags.push(tag.clone());
                    tag.id
                }
            };
            if !tag_ids.contains(&id) {
                tag_ids.push(id);
            }
        }

        state.post_tags.insert(post.id, tag_ids);
        state.posts.retain(|p| p.id != post.id);
        state.posts.push(post.clone());
        info!(post_id = %post.id, slug = %post.slug, "post stored in memory");
        post
    }

    /// Every comment of a post, including inactive ones.
    #[cfg(test)]
    pub async fn all_comments(&self, post_id: Uuid) -> Vec<Comment> {
        let state = self.state.read().await;
        state
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect()
    }
}

impl Default for InMemoryBlogStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostRepository for InMemoryBlogStore {
    async fn count_published(&self, tag_id: Option<Uuid>) -> Result<u64, DomainError> {
        let state = self.state.read().await;
        let count = state
            .published()
            .filter(|p| tag_id.is_none_or(|t| state.has_tag(p.id, t)))
            .count();
        Ok(count as u64)
    }

    async fn list_published(
        &self,
        tag_id: Option<Uuid>,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<Post>, DomainError> {
        let state = self.state.read().await;
        let mut posts: Vec<Post> = state
            .published()
            .filter(|p| tag_id.is_none_or(|t| state.has_tag(p.id, t)))
            .cloned()
            .collect();
        posts.sort_by(newest_first);

        Ok(posts
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn find_published(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        let state = self.state.read().await;
        Ok(state.published().find(|p| p.id == id).cloned())
    }

    async fn find_published_by_date(
        &self,
        date: NaiveDate,
        slug: &str,
    ) -> Result<Option<Post>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .published()
            .find(|p| p.slug == slug && p.publish.date_naive() == date)
            .cloned())
    }

    async fn similar_posts(
        &self,
        post_id: Uuid,
        limit: u32,
    ) -> Result<Vec<SimilarPost>, DomainError> {
        let state = self.state.read().await;
        let Some(own_tags) = state.post_tags.get(&post_id) else {
            return Ok(Vec::new());
        };

        let mut similar: Vec<SimilarPost> = state
            .published()
            .filter(|p| p.id != post_id)
            .filter_map(|p| {
                let same_tags = state
                    .post_tags
                    .get(&p.id)?
                    .iter()
                    .filter(|t| own_tags.contains(t))
                    .count();
                (same_tags > 0).then(|| SimilarPost {
                    post: p.clone(),
                    same_tags: same_tags as i64,
                })
            })
            .collect();

        similar.sort_by(|a, b| {
            b.same_tags
                .cmp(&a.same_tags)
                .then_with(|| b.post.publish.cmp(&a.post.publish))
        });
        similar.truncate(limit as usize);
        Ok(similar)
    }

    async fn search_by_title(
        &self,
        query: &str,
        threshold: f32,
    ) -> Result<Vec<SearchHit>, DomainError> {
        let state = self.state.read().await;
        let mut hits: Vec<SearchHit> = state
            .published()
            .map(|p| SearchHit {
                post: p.clone(),
                score: trigram_similarity(&p.title, query),
            })
            .filter(|hit| hit.score > threshold)
            .collect();

        hits.sort_by(by_score);
        Ok(hits)
    }

    async fn search_full_text(&self, query: &str) -> Result<Vec<SearchHit>, DomainError> {
        let state = self.state.read().await;
        let mut hits: Vec<SearchHit> = state
            .published()
            .filter_map(|p| {
                full_text_rank(&p.title, &p.body, query).map(|score| SearchHit {
                    post: p.clone(),
                    score,
                })
            })
            .collect();

        hits.sort_by(by_score);
        Ok(hits)
    }
}

fn by_score(a: &SearchHit, b: &SearchHit) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.post.publish.cmp(&a.post.publish))
}

#[async_trait]
impl TagRepository for InMemoryBlogStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, DomainError> {
        let state = self.state.read().await;
        Ok(state.tags.iter().find(|t| t.slug == slug).cloned())
    }

    async fn tags_for_posts(
        &self,
        post_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<Tag>>, DomainError> {
        let state = self.state.read().await;
        let mut result = HashMap::new();
        for post_id in post_ids {
            let Some(tag_ids) = state.post_tags.get(post_id) else {
                continue;
            };
            let mut tags: Vec<Tag> = state
                .tags
                .iter()
                .filter(|t| tag_ids.contains(&t.id))
                .cloned()
                .collect();
            tags.sort_by(|a, b| a.name.cmp(&b.name));
            result.insert(*post_id, tags);
        }
        Ok(result)
    }
}

#[async_trait]
impl CommentRepository for InMemoryBlogStore {
    async fn create(&self, comment: Comment) -> Result<Comment, DomainError> {
        let mut state = self.state.write().await;
        state.comments.push(comment.clone());
        info!(comment_id = %comment.id, post_id = %comment.post_id, "comment created");
        Ok(comment)
    }

    async fn active_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, DomainError> {
        let state = self.state.read().await;
        let mut comments: Vec<Comment> = state
            .comments
            .iter()
            .filter(|c| c.post_id == post_id && c.active)
            .cloned()
            .collect();
        comments.sort_by_key(|c| c.created_at);
        Ok(comments)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{DateTime, Duration};

    pub(crate) fn post_at(title: &str, publish: DateTime<Utc>) -> Post {
        Post::new(Uuid::new_v4(), "admin".into(), title.into(), format!("{title} body"))
            .published_at(publish)
    }

    #[tokio::test]
    async fn drafts_and_scheduled_posts_are_hidden() {
        let store = InMemoryBlogStore::new();
        let now = Utc::now();
        let visible = store
            .insert_post(post_at("Visible", now - Duration::days(1)), &[])
            .await;
        let mut draft = post_at("Draft", now - Duration::days(1));
        draft.status = crate::domain::post::PostStatus::Draft;
        let draft = store.insert_post(draft, &[]).await;
        let scheduled = store
            .insert_post(post_at("Scheduled", now + Duration::days(1)), &[])
            .await;

        assert_eq!(store.count_published(None).await.unwrap(), 1);
        let posts = store.list_published(None, 10, 0).await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, visible.id);
        assert!(store.find_published(draft.id).await.unwrap().is_none());
        assert!(store.find_published(scheduled.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_is_newest_first_and_filtered_by_tag() {
        let store = InMemoryBlogStore::new();
        let now = Utc::now();
        let jazz = Tag::new("jazz");
        let old = store
            .insert_post(post_at("Old", now - Duration::days(3)), &[jazz.clone()])
            .await;
        let new = store
            .insert_post(post_at("New", now - Duration::days(1)), &[jazz.clone()])
            .await;
        store
            .insert_post(post_at("Untagged", now - Duration::days(2)), &[])
            .await;

        let all = store.list_published(None, 10, 0).await.unwrap();
        let titles: Vec<&str> = all.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["New", "Untagged", "Old"]);

        let tagged = store.list_published(Some(jazz.id), 10, 0).await.unwrap();
        let ids: Vec<Uuid> = tagged.iter().map(|p| p.id).collect();
        assert_eq!(ids, [new.id, old.id]);
        assert_eq!(store.count_published(Some(jazz.id)).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn tags_are_shared_by_slug() {
        let store = InMemoryBlogStore::new();
        let now = Utc::now();
        let a = store
            .insert_post(post_at("A", now), &[Tag::new("Music")])
            .await;
        let b = store
            .insert_post(post_at("B", now), &[Tag::new("music")])
            .await;

        let tags = store.tags_for_posts(&[a.id, b.id]).await.unwrap();
        assert_eq!(tags[&a.id][0].id, tags[&b.id][0].id);
        assert!(store.find_by_slug("music").await.unwrap().is_some());
        assert!(store.find_by_slug("jazz").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn similar_posts_rank_by_shared_tags_then_recency() {
        let store = InMemoryBlogStore::new();
        let now = Utc::now();
        let (a, b, c) = (Tag::new("a"), Tag::new("b"), Tag::new("c"));

        let subject = store
            .insert_post(
                post_at("Subject", now - Duration::days(10)),
                &[a.clone(), b.clone(), c.clone()],
            )
            .await;
        let only_a = store
            .insert_post(post_at("Only A", now - Duration::days(1)), &[a.clone()])
            .await;
        let a_and_b = store
            .insert_post(
                post_at("A and B", now - Duration::days(3)),
                &[a.clone(), b.clone()],
            )
            .await;
        let b_and_c = store
            .insert_post(
                post_at("B and C", now - Duration::days(5)),
                &[b.clone(), c.clone()],
            )
            .await;
        let mut draft = post_at("Draft", now - Duration::days(1));
        draft.status = crate::domain::post::PostStatus::Draft;
        store.insert_post(draft, &[a, b, c]).await;

        let similar = store.similar_posts(subject.id, 4).await.unwrap();
        let ids: Vec<Uuid> = similar.iter().map(|s| s.post.id).collect();
        // {A,B} and {B,C} both share two tags, the newer one goes first.
        assert_eq!(ids, [a_and_b.id, b_and_c.id, only_a.id]);
        assert_eq!(similar[0].same_tags, 2);
        assert_eq!(similar[2].same_tags, 1);

        let limited = store.similar_posts(subject.id, 1).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn post_without_tags_has_no_similar_posts() {
        let store = InMemoryBlogStore::new();
        let post = store.insert_post(post_at("Lonely", Utc::now()), &[]).await;
        store
            .insert_post(post_at("Other", Utc::now()), &[Tag::new("x")])
            .await;
        assert!(store.similar_posts(post.id, 4).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn title_search_applies_threshold_and_orders_by_similarity() {
        let store = InMemoryBlogStore::new();
        let now = Utc::now();
        store
            .insert_post(post_at("Learning Django", now), &[])
            .await;
        store
            .insert_post(post_at("Django tips and tricks", now), &[])
            .await;
        store.insert_post(post_at("Gardening", now), &[]).await;

        let hits = store.search_by_title("django", 0.1).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].post.title, "Learning Django");
        assert!(hits[0].score >= hits[1].score);

        assert!(store.search_by_title("zzzz", 0.1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn comments_filter_inactive_and_keep_order() {
        let store = InMemoryBlogStore::new();
        let post_id = Uuid::new_v4();
        let first = Comment::new(post_id, "a".into(), "a@x.io".into(), "one".into());
        let mut hidden = Comment::new(post_id, "b".into(), "b@x.io".into(), "two".into());
        hidden.active = false;
        store.create(first.clone()).await.unwrap();
        store.create(hidden).await.unwrap();

        let comments = store.active_for_post(post_id).await.unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].id, first.id);
        assert_eq!(store.all_comments(post_id).await.len(), 2);
    }
}
