mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;

use std::sync::Arc;

use actix_web::middleware::{DefaultHeaders, NormalizePath, TrailingSlash};
use actix_web::{App, HttpServer, web};
use anyhow::Context;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use application::comment_service::CommentService;
use application::post_service::PostService;
use application::share_service::ShareService;
use data::comment_repository::{CommentRepository, PostgresCommentRepository};
use data::memory::InMemoryBlogStore;
use data::post_repository::{PostRepository, PostgresPostRepository};
use data::tag_repository::{PostgresTagRepository, TagRepository};
use domain::post::Post;
use domain::tag::Tag;
use infrastructure::config::AppConfig;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::logging::init_logging;
use infrastructure::mailer::build_mailer;
use presentation::handlers;
use presentation::middleware::RequestTracing;

struct Repositories {
    posts: Arc<dyn PostRepository>,
    tags: Arc<dyn TagRepository>,
    comments: Arc<dyn CommentRepository>,
}

async fn repositories(config: &AppConfig) -> anyhow::Result<Repositories> {
    match &config.database_url {
        Some(url) => {
            let pool = create_pool(url)
                .await
                .context("failed to connect to database")?;
            run_migrations(&pool)
                .await
                .context("failed to run migrations")?;
            Ok(Repositories {
                posts: Arc::new(PostgresPostRepository::new(pool.clone())),
                tags: Arc::new(PostgresTagRepository::new(pool.clone())),
                comments: Arc::new(PostgresCommentRepository::new(pool)),
            })
        }
        None => {
            warn!("DATABASE_URL not set, using the in-memory store");
            let store = Arc::new(InMemoryBlogStore::new());
            seed_welcome_post(&store).await;
            Ok(Repositories {
                posts: store.clone(),
                tags: store.clone(),
                comments: store,
            })
        }
    }
}

async fn seed_welcome_post(store: &InMemoryBlogStore) {
    let post = Post::new(
        Uuid::new_v4(),
        "admin".into(),
        "Welcome to the blog".into(),
        "This post lives in memory. Set `DATABASE_URL` to keep content across restarts.".into(),
    )
    .published_at(Utc::now());
    store.insert_post(post, &[Tag::new("meta")]).await;
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let repos = repositories(&config).await?;
    let mailer = build_mailer(&config.mail).context("failed to set up mailer")?;

    let post_service = PostService::new(repos.posts, repos.tags, config.search_mode);
    let comment_service = CommentService::new(repos.comments);
    let share_service = ShareService::new(
        mailer,
        config.mail.from_address().to_string(),
        config.public_url.clone(),
    );

    info!(
        host = %config.host,
        port = config.port,
        search_mode = ?config.search_mode,
        "starting blog server"
    );

    HttpServer::new(move || {
        App::new()
            .wrap(NormalizePath::new(TrailingSlash::Always))
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("Referrer-Policy", "no-referrer"))
                    .add(("X-Frame-Options", "DENY")),
            )
            .wrap(RequestTracing)
            .app_data(web::Data::new(post_service.clone()))
            .app_data(web::Data::new(comment_service.clone()))
            .app_data(web::Data::new(share_service.clone()))
            .configure(handlers::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
