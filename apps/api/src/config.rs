use anyhow::{Context, Result};

const DEFAULT_SESSION_TTL_SECS: u64 = 86_400;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub llm: LlmConfig,
    pub embedding: Option<EmbeddingConfig>,
    /// When unset, sessions live in process memory only.
    pub redis_url: Option<String>,
    pub session_ttl_secs: u64,
    pub email: Option<EmailConfig>,
    pub archive: Option<ArchiveConfig>,
    pub port: u16,
    pub rust_log: String,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub api_url: Option<String>,
    pub model: Option<String>,
    /// Gemini fallback, used only when the primary provider fails.
    pub gemini_api_key: Option<String>,
    pub gemini_model: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub resend_api_key: String,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    pub bucket: String,
    pub endpoint: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let embedding = optional_env("EMBEDDING_API_URL").map(|api_url| EmbeddingConfig {
            api_url,
            api_key: optional_env("EMBEDDING_API_KEY"),
            model: optional_env("EMBEDDING_MODEL"),
        });

        let email = optional_env("RESEND_API_KEY").map(|resend_api_key| EmailConfig {
            resend_api_key,
            from: optional_env("EMAIL_FROM")
                .unwrap_or_else(|| "DFR Assessment <noreply@example.com>".to_string()),
        });

        let archive = optional_env("S3_BUCKET").map(|bucket| ArchiveConfig {
            bucket,
            endpoint: optional_env("S3_ENDPOINT"),
            access_key_id: optional_env("AWS_ACCESS_KEY_ID"),
            secret_access_key: optional_env("AWS_SECRET_ACCESS_KEY"),
        });

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            llm: LlmConfig {
                api_key: require_env("LLM_API_KEY")?,
                api_url: optional_env("LLM_API_URL"),
                model: optional_env("LLM_MODEL"),
                gemini_api_key: optional_env("GEMINI_API_KEY"),
                gemini_model: optional_env("GEMINI_MODEL"),
            },
            embedding,
            redis_url: optional_env("REDIS_URL"),
            session_ttl_secs: match optional_env("SESSION_TTL_SECS") {
                Some(v) => v
                    .parse::<u64>()
                    .context("SESSION_TTL_SECS must be a positive integer")?,
                None => DEFAULT_SESSION_TTL_SECS,
            },
            email,
            archive,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Empty values count as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
