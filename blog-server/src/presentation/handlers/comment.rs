use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, post, web};
use tracing::{info, warn};

use super::html;
use crate::application::comment_service::CommentService;
use crate::application::post_service::PostService;
use crate::domain::error::DomainError;
use crate::presentation::dto::{CommentForm, FormErrors, validate_form};
use crate::presentation::middleware::request_id;
use crate::presentation::render::post::{DetailView, detail_page};

#[post(r"/{year:\d+}/{month:\d+}/{day:\d+}/{slug}/")]
async fn add_comment(
    req: HttpRequest,
    posts: web::Data<PostService>,
    comments: web::Data<CommentService>,
    path: web::Path<(i32, u32, u32, String)>,
    form: web::Form<CommentForm>,
) -> Result<HttpResponse, DomainError> {
    let (year, month, day, slug) = path.into_inner();
    let post = posts.get_post_by_date(year, month, day, &slug).await?;
    let similar = posts.similar_posts(&post).await?;
    let form = form.into_inner();

    if let Err(errors) = validate_form(&form) {
        warn!(
            request_id = %request_id(&req),
            post_id = %post.id,
            "comment rejected"
        );
        let active = comments.active_comments(post.id).await?;
        let page = detail_page(&DetailView {
            post: &post,
            comments: &active,
            similar: &similar,
            new_comment: None,
            form: &form,
            errors: &errors,
        });
        return Ok(html(StatusCode::UNPROCESSABLE_ENTITY, page));
    }

    let (name, email, body) = form.into_parts();
    let comment = comments.add_comment(&post, name, email, body).await?;
    let active = comments.active_comments(post.id).await?;

    info!(
        request_id = %request_id(&req),
        post_id = %post.id,
        comment_id = %comment.id,
        "comment added"
    );

    let page = detail_page(&DetailView {
        post: &post,
        comments: &active,
        similar: &similar,
        new_comment: Some(&comment),
        form: &CommentForm::default(),
        errors: &FormErrors::default(),
    });
    Ok(html(StatusCode::OK, page))
}
