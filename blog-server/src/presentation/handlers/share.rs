use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, get, post, web};
use tracing::{info, warn};
use uuid::Uuid;

use super::html;
use crate::application::post_service::PostService;
use crate::application::share_service::ShareService;
use crate::domain::error::DomainError;
use crate::presentation::dto::{EmailPostForm, FormErrors, validate_form};
use crate::presentation::middleware::request_id;
use crate::presentation::render::forms::{ShareView, share_page};

const DELIVERY_FAILED: &str = "Your message could not be sent right now. Please try again later.";

fn request_origin(req: &HttpRequest) -> String {
    let info = req.connection_info();
    format!("{}://{}", info.scheme(), info.host())
}

#[get("/{post_id}/share/")]
async fn share_form(
    posts: web::Data<PostService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let post = posts.get_published_post(path.into_inner()).await?;
    let page = share_page(&ShareView {
        post: &post,
        form: &EmailPostForm::default(),
        errors: &FormErrors::default(),
        sent: false,
    });
    Ok(html(StatusCode::OK, page))
}

#[post("/{post_id}/share/")]
async fn share_post(
    req: HttpRequest,
    posts: web::Data<PostService>,
    share: web::Data<ShareService>,
    path: web::Path<Uuid>,
    form: web::Form<EmailPostForm>,
) -> Result<HttpResponse, DomainError> {
    let post = posts.get_published_post(path.into_inner()).await?;
    let form = form.into_inner();

    let (status, errors, sent) = match validate_form(&form) {
        Err(errors) => {
            warn!(
                request_id = %request_id(&req),
                post_id = %post.id,
                "share form rejected"
            );
            (StatusCode::UNPROCESSABLE_ENTITY, errors, false)
        }
        Ok(()) => match share
            .share(&post, &request_origin(&req), &form.recommendation())
            .await
        {
            Ok(()) => {
                info!(
                    request_id = %request_id(&req),
                    post_id = %post.id,
                    "post shared"
                );
                (StatusCode::OK, FormErrors::default(), true)
            }
            Err(DomainError::Mail(err)) => {
                warn!(
                    request_id = %request_id(&req),
                    post_id = %post.id,
                    error = %err,
                    "share delivery failed"
                );
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    FormErrors::general(DELIVERY_FAILED),
                    false,
                )
            }
            Err(other) => return Err(other),
        },
    };

    let page = share_page(&ShareView {
        post: &post,
        form: &form,
        errors: &errors,
        sent,
    });
    Ok(html(status, page))
}
