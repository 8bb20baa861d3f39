/// Builds an actix test service over the given in-memory store and mailer,
/// wired the same way as the server.
#[cfg(test)]
macro_rules! test_app {
    ($store:expr, $mailer:expr) => {{
        use crate::application::{
            comment_service::CommentService, post_service::PostService,
            share_service::ShareService,
        };
        use crate::infrastructure::config::SearchMode;
        use actix_web::middleware::{NormalizePath, TrailingSlash};

        let store = $store.clone();
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(NormalizePath::new(TrailingSlash::Always))
                .app_data(actix_web::web::Data::new(PostService::new(
                    store.clone(),
                    store.clone(),
                    SearchMode::Trigram,
                )))
                .app_data(actix_web::web::Data::new(CommentService::new(store.clone())))
                .app_data(actix_web::web::Data::new(ShareService::new(
                    $mailer.clone(),
                    "blog@example.com".into(),
                    None,
                )))
                .configure(crate::presentation::handlers::configure),
        )
        .await
    }};
}

pub mod comment;
pub mod post;
pub mod share;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, get, web};
use chrono::Utc;
use maud::Markup;
use serde_json::json;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health).service(
        web::scope("/blog")
            .service(post::list_posts)
            .service(post::search)
            .service(post::list_posts_by_tag)
            .service(share::share_form)
            .service(share::share_post)
            .service(post::post_detail)
            .service(comment::add_comment),
    );
}

pub(crate) fn html(status: StatusCode, page: Markup) -> HttpResponse {
    HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(page.into_string())
}

#[get("/health/")]
async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
