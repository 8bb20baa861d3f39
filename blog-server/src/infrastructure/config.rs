use std::str::FromStr;

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Title similarity (`pg_trgm`) above a fixed threshold.
    #[default]
    Trigram,
    /// Ranked full-text search over title and body.
    Fulltext,
}

impl FromStr for SearchMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trigram" => Ok(SearchMode::Trigram),
            "fulltext" => Ok(SearchMode::Fulltext),
            other => Err(anyhow::anyhow!("invalid SEARCH_MODE: {}", other)),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum MailConfig {
    /// Write outgoing messages to the log instead of sending them.
    Log { from: String },
    Smtp {
        from: String,
        host: String,
        port: u16,
        username: Option<String>,
        password: Option<String>,
        starttls: bool,
    },
}

impl MailConfig {
    pub fn from_address(&self) -> &str {
        match self {
            MailConfig::Log { from } | MailConfig::Smtp { from, .. } => from,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub public_url: Option<String>,
    #[serde(default)]
    pub search_mode: SearchMode,
    pub mail: MailConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = var("HOST").unwrap_or_else(|| "127.0.0.1".into());
        let port = var("PORT")
            .unwrap_or_else(|| "8080".into())
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid PORT: {}", e))?;
        let database_url = var("DATABASE_URL").filter(|s| !s.trim().is_empty());
        let public_url = var("PUBLIC_URL")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty());
        let search_mode = match var("SEARCH_MODE") {
            Some(mode) => mode.parse()?,
            None => SearchMode::default(),
        };

        let from = var("MAIL_FROM").unwrap_or_else(|| "blog@localhost".into());
        let mail = match var("MAIL_BACKEND").as_deref().map(str::trim) {
            None | Some("") | Some("log") => MailConfig::Log { from },
            Some("smtp") => MailConfig::Smtp {
                from,
                host: var("SMTP_HOST").unwrap_or_else(|| "localhost".into()),
                port: var("SMTP_PORT")
                    .unwrap_or_else(|| "587".into())
                    .parse()
                    .map_err(|e| anyhow::anyhow!("invalid SMTP_PORT: {}", e))?,
                username: var("SMTP_USERNAME"),
                password: var("SMTP_PASSWORD"),
                starttls: var("SMTP_STARTTLS")
                    .map(|v| !matches!(v.trim(), "0" | "false" | "no" | "off"))
                    .unwrap_or(true),
            },
            Some(other) => return Err(anyhow::anyhow!("invalid MAIL_BACKEND: {}", other)),
        };

        Ok(Self {
            host,
            port,
            database_url,
            public_url,
            search_mode,
            mail,
        })
    }
}
