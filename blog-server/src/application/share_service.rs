use std::sync::Arc;

use crate::domain::{error::DomainError, post::Post};
use crate::infrastructure::mailer::{Mailer, OutgoingMail};
use tracing::{error, info, instrument};

/// A reader recommending a post to someone else.
#[derive(Debug, Clone)]
pub struct Recommendation {
    pub name: String,
    pub email: String,
    pub to: String,
    pub comments: String,
}

#[derive(Clone)]
pub struct ShareService {
    mailer: Arc<dyn Mailer>,
    from: String,
    public_url: Option<String>,
}

impl ShareService {
    pub fn new(mailer: Arc<dyn Mailer>, from: String, public_url: Option<String>) -> Self {
        Self {
            mailer,
            from,
            public_url,
        }
    }

    /// Absolute link to the post, preferring the configured public URL over
    /// the origin the request came in on.
    pub fn post_url(&self, post: &Post, request_origin: &str) -> String {
        let base = self.public_url.as_deref().unwrap_or(request_origin);
        format!("{}{}", base.trim_end_matches('/'), post.absolute_url())
    }

    pub fn compose(&self, post: &Post, post_url: &str, rec: &Recommendation) -> OutgoingMail {
        OutgoingMail {
            subject: format!("{} recommends you read {}", rec.name, post.title),
            body: format!(
                "Read {} at {}\n\n{}'s comments: {}",
                post.title, post_url, rec.name, rec.comments
            ),
            from: self.from.clone(),
            to: vec![rec.to.clone()],
            reply_to: Some(rec.email.clone()),
        }
    }

    #[instrument(skip(self, post, rec), fields(post_id = %post.id))]
    pub async fn share(
        &self,
        post: &Post,
        request_origin: &str,
        rec: &Recommendation,
    ) -> Result<(), DomainError> {
        let post_url = self.post_url(post, request_origin);
        let mail = self.compose(post, &post_url, rec);

        self.mailer.send(mail).await.map_err(|e| {
            error!("failed to send recommendation: {}", e);
            DomainError::Mail(e.to_string())
        })?;

        info!("post recommendation sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::mailer::testing::RecordingMailer;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn post() -> Post {
        Post::new(Uuid::new_v4(), "admin".into(), "Hello World".into(), "".into())
            .published_at(Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap())
    }

    fn recommendation() -> Recommendation {
        Recommendation {
            name: "Ana".into(),
            email: "ana@example.com".into(),
            to: "bob@example.com".into(),
            comments: "Worth it".into(),
        }
    }

    #[test]
    fn composes_subject_and_body_with_absolute_url() {
        let service = ShareService::new(
            Arc::new(RecordingMailer::default()),
            "blog@example.com".into(),
            None,
        );
        let post = post();
        let url = service.post_url(&post, "http://localhost:8080");
        assert_eq!(url, "http://localhost:8080/blog/2024/05/01/hello-world/");

        let mail = service.compose(&post, &url, &recommendation());
        assert_eq!(mail.subject, "Ana recommends you read Hello World");
        assert_eq!(
            mail.body,
            "Read Hello World at http://localhost:8080/blog/2024/05/01/hello-world/\n\nAna's comments: Worth it"
        );
        assert_eq!(mail.from, "blog@example.com");
        assert_eq!(mail.to, vec!["bob@example.com".to_string()]);
        assert_eq!(mail.reply_to.as_deref(), Some("ana@example.com"));
    }

    #[test]
    fn public_url_overrides_request_origin() {
        let service = ShareService::new(
            Arc::new(RecordingMailer::default()),
            "blog@example.com".into(),
            Some("https://blog.example.com".into()),
        );
        assert_eq!(
            service.post_url(&post(), "http://10.0.0.5:8080"),
            "https://blog.example.com/blog/2024/05/01/hello-world/"
        );
    }

    #[tokio::test]
    async fn share_dispatches_exactly_one_mail() {
        let mailer = Arc::new(RecordingMailer::default());
        let service = ShareService::new(mailer.clone(), "blog@example.com".into(), None);
        service
            .share(&post(), "http://localhost", &recommendation())
            .await
            .unwrap();
        assert_eq!(mailer.sent().await.len(), 1);
    }

    #[tokio::test]
    async fn delivery_failure_surfaces_as_mail_error() {
        let service = ShareService::new(
            Arc::new(RecordingMailer::failing()),
            "blog@example.com".into(),
            None,
        );
        let err = service
            .share(&post(), "http://localhost", &recommendation())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Mail(_)));
    }
}
