mod assessment;
mod catalog;
mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod report;
mod routes;
mod selection;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::assessment::store::{InMemorySessionStore, RedisSessionStore, SessionStore};
use crate::catalog::repository::list_packages;
use crate::catalog::seed::seed_if_empty;
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::report::archive::ReportArchive;
use crate::report::email::{DisabledEmailSender, EmailSender, ResendEmailSender};
use crate::routes::build_router;
use crate::selection::embedder::{Embedder, HashingEmbedder, HttpEmbedder};
use crate::selection::PackageMatcher;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting readiness API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL and the question catalog
    let db = create_pool(&config.database_url).await?;
    let seeded = seed_if_empty(&db).await?;
    if seeded > 0 {
        info!("Seeded {seeded} assessment packages");
    }

    // Initialize LLM client
    let llm = LlmClient::new(&config.llm)?;
    info!(
        "LLM client initialized (model: {}, fallback: {})",
        llm.model(),
        llm.has_fallback()
    );

    // Embed package descriptions once
    let embedder: Arc<dyn Embedder> = match &config.embedding {
        Some(embedding) => Arc::new(HttpEmbedder::new(embedding)?),
        None => Arc::new(HashingEmbedder::default()),
    };
    let packages = list_packages(&db).await?;
    let matcher = Arc::new(PackageMatcher::build(embedder, packages).await?);

    // Session store: Redis when configured, process memory otherwise
    let sessions: Arc<dyn SessionStore> = match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str())?;
            info!("Session store: Redis (ttl {}s)", config.session_ttl_secs);
            Arc::new(RedisSessionStore::new(client, config.session_ttl_secs))
        }
        None => {
            info!("Session store: in-memory (ttl {}s)", config.session_ttl_secs);
            Arc::new(InMemorySessionStore::new(config.session_ttl_secs))
        }
    };

    let email: Arc<dyn EmailSender> = match &config.email {
        Some(email) => Arc::new(ResendEmailSender::new(email)?),
        None => {
            info!("RESEND_API_KEY not set; report emails are disabled");
            Arc::new(DisabledEmailSender)
        }
    };

    let archive = match &config.archive {
        Some(archive) => {
            info!("Report archive: s3://{}", archive.bucket);
            Some(ReportArchive::connect(archive).await)
        }
        None => None,
    };

    // Build app state
    let state = AppState {
        db,
        sessions,
        llm,
        matcher,
        email,
        archive,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
