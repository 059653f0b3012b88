use std::sync::Arc;

use sqlx::PgPool;

use crate::assessment::store::SessionStore;
use crate::llm_client::LlmClient;
use crate::report::archive::ReportArchive;
use crate::report::email::EmailSender;
use crate::selection::PackageMatcher;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub sessions: Arc<dyn SessionStore>,
    pub llm: LlmClient,
    /// Package descriptions embedded once at startup.
    pub matcher: Arc<PackageMatcher>,
    pub email: Arc<dyn EmailSender>,
    /// Present only when `S3_BUCKET` is set.
    pub archive: Option<ReportArchive>,
}
