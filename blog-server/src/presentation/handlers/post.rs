use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, get, web};
use tracing::info;

use super::html;
use crate::application::comment_service::CommentService;
use crate::application::post_service::PostService;
use crate::domain::error::DomainError;
use crate::presentation::dto::{CommentForm, FormErrors, ListPostsQuery, SearchQuery};
use crate::presentation::middleware::request_id;
use crate::presentation::render::forms::{SearchResults, search_page};
use crate::presentation::render::post::{DetailView, detail_page, list_page};

#[get("/")]
async fn list_posts(
    req: HttpRequest,
    posts: web::Data<PostService>,
    query: web::Query<ListPostsQuery>,
) -> Result<HttpResponse, DomainError> {
    let list = posts.list_posts(None, query.page.as_deref()).await?;

    info!(
        request_id = %request_id(&req),
        page = list.page.number,
        "posts listed"
    );

    Ok(html(StatusCode::OK, list_page(&list)))
}

#[get("/tag/{tag_slug}/")]
async fn list_posts_by_tag(
    req: HttpRequest,
    posts: web::Data<PostService>,
    path: web::Path<String>,
    query: web::Query<ListPostsQuery>,
) -> Result<HttpResponse, DomainError> {
    let tag_slug = path.into_inner();
    let list = posts
        .list_posts(Some(&tag_slug), query.page.as_deref())
        .await?;

    info!(
        request_id = %request_id(&req),
        tag = %tag_slug,
        page = list.page.number,
        "posts listed by tag"
    );

    Ok(html(StatusCode::OK, list_page(&list)))
}

#[get(r"/{year:\d+}/{month:\d+}/{day:\d+}/{slug}/")]
async fn post_detail(
    req: HttpRequest,
    posts: web::Data<PostService>,
    comments: web::Data<CommentService>,
    path: web::Path<(i32, u32, u32, String)>,
) -> Result<HttpResponse, DomainError> {
    let (year, month, day, slug) = path.into_inner();
    let post = posts.get_post_by_date(year, month, day, &slug).await?;
    let active = comments.active_comments(post.id).await?;
    let similar = posts.similar_posts(&post).await?;

    info!(
        request_id = %request_id(&req),
        post_id = %post.id,
        comments = active.len(),
        "post viewed"
    );

    let page = detail_page(&DetailView {
        post: &post,
        comments: &active,
        similar: &similar,
        new_comment: None,
        form: &CommentForm::default(),
        errors: &FormErrors::default(),
    });
    Ok(html(StatusCode::OK, page))
}

#[get("/search/")]
async fn search(
    req: HttpRequest,
    posts: web::Data<PostService>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, DomainError> {
    let page = match query.query.as_deref().map(str::trim) {
        None => search_page(None, &FormErrors::default()),
        Some("") => search_page(
            None,
            &FormErrors::for_field("query", "This field is required."),
        ),
        Some(q) => {
            let hits = posts.search(q).await?;
            info!(
                request_id = %request_id(&req),
                query = %q,
                hits = hits.len(),
                "search executed"
            );
            search_page(Some(&SearchResults { query: q, hits: &hits }), &FormErrors::default())
        }
    };

    Ok(html(StatusCode::OK, page))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::data::memory::InMemoryBlogStore;
    use crate::data::memory::tests::post_at;
    use crate::domain::post::Post;
    use crate::domain::tag::Tag;
    use crate::infrastructure::mailer::testing::RecordingMailer;
    use actix_web::body::MessageBody;
    use actix_web::dev::ServiceResponse;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    async fn body_of<B: MessageBody>(res: ServiceResponse<B>) -> String {
        String::from_utf8(test::read_body(res).await.to_vec()).unwrap()
    }

    #[actix_web::test]
    async fn list_shows_three_newest_published_posts() {
        let store = Arc::new(InMemoryBlogStore::new());
        let now = Utc::now();
        for i in 0..4 {
            store
                .insert_post(post_at(&format!("Entry {i}"), now - Duration::days(i)), &[])
                .await;
        }
        let draft = Post::new(Uuid::new_v4(), "admin".into(), "Secret draft".into(), "".into());
        store.insert_post(draft, &[]).await;
        let app = test_app!(store, Arc::new(RecordingMailer::default()));

        let res = test::call_service(&app, test::TestRequest::get().uri("/blog/").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_of(res).await;
        assert!(body.contains("Entry 0"));
        assert!(body.contains("Entry 2"));
        assert!(!body.contains("Entry 3"));
        assert!(!body.contains("Secret draft"));
        assert!(body.contains("Page 1 of 2."));

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/blog/?page=99").to_request(),
        )
        .await;
        let body = body_of(res).await;
        assert!(body.contains("Entry 3"));
        assert!(body.contains("Page 2 of 2."));
    }

    #[actix_web::test]
    async fn tag_listing_filters_and_unknown_tag_is_404() {
        let store = Arc::new(InMemoryBlogStore::new());
        let now = Utc::now();
        store
            .insert_post(post_at("Jazz notes", now), &[Tag::new("jazz")])
            .await;
        store.insert_post(post_at("Rock notes", now), &[]).await;
        let app = test_app!(store, Arc::new(RecordingMailer::default()));

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/blog/tag/jazz/").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_of(res).await;
        assert!(body.contains("Jazz notes"));
        assert!(!body.contains("Rock notes"));

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/blog/tag/opera/").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn detail_renders_published_post_and_hides_drafts() {
        let store = Arc::new(InMemoryBlogStore::new());
        let post = store
            .insert_post(post_at("Hello World", Utc::now() - Duration::hours(1)), &[])
            .await;
        let draft = store
            .insert_post(
                Post::new(Uuid::new_v4(), "admin".into(), "Hidden".into(), "".into()),
                &[],
            )
            .await;
        let app = test_app!(store, Arc::new(RecordingMailer::default()));

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri(&post.absolute_url()).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_of(res).await;
        assert!(body.contains("Hello World"));
        assert!(body.contains("0 comments"));

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri(&draft.absolute_url()).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/blog/2024/02/30/hello-world/")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn search_distinguishes_missing_blank_and_present_query() {
        let store = Arc::new(InMemoryBlogStore::new());
        store
            .insert_post(post_at("Django tutorial", Utc::now()), &[])
            .await;
        let app = test_app!(store, Arc::new(RecordingMailer::default()));

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/blog/search/").to_request(),
        )
        .await;
        let body = body_of(res).await;
        assert!(body.contains("Search for posts"));
        assert!(!body.contains(r#"class="errorlist""#));

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/blog/search/?query=+").to_request(),
        )
        .await;
        let body = body_of(res).await;
        assert!(body.contains("This field is required."));
        assert!(!body.contains("Found"));

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/blog/search/?query=django").to_request(),
        )
        .await;
        let body = body_of(res).await;
        assert!(body.contains("Found 1 result"));
        assert!(body.contains("Django tutorial"));

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/blog/search/?query=xylophone").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(body_of(res).await.contains("Found 0 results"));
    }
}
