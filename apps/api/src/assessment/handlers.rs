//! Axum route handlers for the assessment flow.

use std::collections::{BTreeMap, HashMap};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::assessment::evaluation::{evaluate, Evaluation};
use crate::assessment::persistence::{list_sessions, upsert_session};
use crate::assessment::phase::{Phase, PhaseError};
use crate::assessment::profiling::{
    describe_profile, map_profile, profiling_questions, ProfilingQuestion,
};
use crate::assessment::scoring::ScoreSummary;
use crate::assessment::session::SessionContext;
use crate::assessment::validation::validate_email;
use crate::catalog::models::{PackageSummary, Question, QuestionKind};
use crate::catalog::repository::{get_package, list_packages};
use crate::errors::{AppError, AppJson};
use crate::models::assessment::AssessmentSessionRow;
use crate::report::archive::report_key;
use crate::report::email::EmailMessage;
use crate::report::render::{render_html, report_subject};
use crate::selection::PackageMatch;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ProfilingQuestionsResponse {
    pub session_id: String,
    pub phase: Phase,
    pub questions: &'static [ProfilingQuestion],
}

#[derive(Debug, Deserialize)]
pub struct ProfilingAnswersRequest {
    pub answers: HashMap<String, String>,
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ProfilingAnswersResponse {
    pub session_id: String,
    pub phase: Phase,
    pub profile_description: String,
    pub package: PackageMatch,
}

#[derive(Debug, Serialize)]
pub struct TestQuestionView {
    pub index: usize,
    pub id: String,
    pub enabler: String,
    pub indicator: String,
    pub text: String,
    pub kind: QuestionKind,
    /// Accepted Likert values; empty for open questions.
    pub options: Vec<i64>,
}

impl TestQuestionView {
    fn new(index: usize, q: &Question) -> Self {
        Self {
            index,
            id: q.id.clone(),
            enabler: q.enabler.clone(),
            indicator: q.indicator.clone(),
            text: q.text.clone(),
            kind: q.kind,
            options: match q.kind {
                QuestionKind::Likert => q.allowed_values(),
                QuestionKind::Open => Vec::new(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TestQuestionsResponse {
    pub session_id: String,
    pub phase: Phase,
    pub package: Option<PackageMatch>,
    pub questions: Vec<TestQuestionView>,
}

#[derive(Debug, Deserialize)]
pub struct TestAnswersRequest {
    pub answers: Vec<Value>,
}

#[derive(Debug, Serialize)]
pub struct TestAnswersResponse {
    pub session_id: String,
    pub phase: Phase,
    pub scores: ScoreSummary,
}

#[derive(Debug, Serialize)]
pub struct ResultsResponse {
    pub session_id: String,
    pub phase: Phase,
    pub profile: BTreeMap<String, String>,
    pub profile_description: Option<String>,
    pub package: Option<PackageMatch>,
    pub scores: Option<ScoreSummary>,
    pub maturity_description: Option<&'static str>,
    pub evaluation: Option<Evaluation>,
}

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct EmailResponse {
    pub session_id: String,
    pub message_id: String,
    pub archived_key: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn load_existing(state: &AppState, session_id: &str) -> Result<SessionContext, AppError> {
    state
        .sessions
        .load(session_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))
}

/// Persists the assessment row, then saves the context. If the database write
/// fails the stored context keeps its previous phase, so the request can be retried.
async fn commit(state: &AppState, ctx: &SessionContext) -> Result<(), AppError> {
    upsert_session(&state.db, ctx)
        .await
        .map_err(AppError::Internal)?;
    state.sessions.save(ctx).await?;
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/packages
pub async fn handle_list_packages(
    State(state): State<AppState>,
) -> Result<Json<Vec<PackageSummary>>, AppError> {
    let packages = list_packages(&state.db).await.map_err(AppError::Internal)?;
    Ok(Json(packages))
}

/// GET /api/v1/assessments?user_id=
pub async fn handle_list_assessments(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<AssessmentSessionRow>>, AppError> {
    let rows = list_sessions(&state.db, params.user_id)
        .await
        .map_err(AppError::Internal)?;
    Ok(Json(rows))
}

/// GET /api/v1/sessions/:session_id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionContext>, AppError> {
    Ok(Json(load_existing(&state, &session_id).await?))
}

/// DELETE /api/v1/sessions/:session_id
///
/// Discards the context. The next request with the same id starts over in
/// `profiling`; the persisted row of the discarded run is kept as history.
pub async fn handle_reset_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, AppError> {
    if !state.sessions.remove(&session_id).await? {
        return Err(AppError::NotFound(format!("Session {session_id} not found")));
    }
    tracing::info!("Session {session_id} reset");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/sessions/:session_id/profiling/questions
pub async fn handle_profiling_questions(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ProfilingQuestionsResponse>, AppError> {
    let ctx = state.sessions.load_or_create(&session_id).await?;
    Ok(Json(ProfilingQuestionsResponse {
        session_id: ctx.session_id,
        phase: ctx.phase,
        questions: profiling_questions(),
    }))
}

/// POST /api/v1/sessions/:session_id/profiling/answers
///
/// Profile → LLM description → nearest package. Moves the session to
/// `package_selected`.
pub async fn handle_profiling_answers(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    AppJson(request): AppJson<ProfilingAnswersRequest>,
) -> Result<Json<ProfilingAnswersResponse>, AppError> {
    let mut ctx = state.sessions.load_or_create(&session_id).await?;
    // Fail before spending LLM calls on a session that is past profiling.
    ctx.phase.require(Phase::Profiling)?;

    let profile = map_profile(&request.answers)?;
    let description = describe_profile(&state.llm, &profile).await?;
    let package = state.matcher.select(&description).await?;

    ctx.record_profile(request.user_id, profile, description.clone(), package.clone())?;
    commit(&state, &ctx).await?;

    Ok(Json(ProfilingAnswersResponse {
        session_id: ctx.session_id,
        phase: ctx.phase,
        profile_description: description,
        package,
    }))
}

/// GET /api/v1/sessions/:session_id/test/questions
///
/// First call loads the package questions and moves the session to
/// `testing`; later calls in `testing` return the same questions.
pub async fn handle_test_questions(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<TestQuestionsResponse>, AppError> {
    let mut ctx = load_existing(&state, &session_id).await?;

    match ctx.phase {
        Phase::Testing => {}
        Phase::PackageSelected => {
            let package_id = ctx
                .package_id()
                .ok_or_else(|| AppError::Internal(anyhow::anyhow!("session has no package")))?
                .to_string();
            let package = get_package(&state.db, &package_id)
                .await
                .map_err(AppError::Internal)?
                .ok_or_else(|| AppError::NotFound(format!("Package {package_id} not found")))?;
            ctx.begin_testing(package.questions)?;
            commit(&state, &ctx).await?;
        }
        actual => {
            return Err(PhaseError::WrongPhase {
                expected: Phase::PackageSelected,
                actual,
            }
            .into())
        }
    }

    let questions = ctx
        .test_questions
        .iter()
        .enumerate()
        .map(|(i, q)| TestQuestionView::new(i, q))
        .collect();

    Ok(Json(TestQuestionsResponse {
        session_id: ctx.session_id,
        phase: ctx.phase,
        package: ctx.package,
        questions,
    }))
}

/// POST /api/v1/sessions/:session_id/test/answers
///
/// Answers must line up one-to-one with the questions; Likert values must be 1-4.
pub async fn handle_test_answers(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    AppJson(request): AppJson<TestAnswersRequest>,
) -> Result<Json<TestAnswersResponse>, AppError> {
    let mut ctx = load_existing(&state, &session_id).await?;
    let scores = ctx.submit_answers(&request.answers)?.clone();
    commit(&state, &ctx).await?;

    Ok(Json(TestAnswersResponse {
        session_id: ctx.session_id,
        phase: ctx.phase,
        scores,
    }))
}

/// GET /api/v1/sessions/:session_id/results
///
/// In `evaluation`, runs the LLM evaluation and completes the session.
/// In `completed`, returns the stored result.
pub async fn handle_results(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ResultsResponse>, AppError> {
    let mut ctx = load_existing(&state, &session_id).await?;

    match ctx.phase {
        Phase::Completed => {}
        Phase::Evaluation => {
            let evaluation = evaluate(&state.llm, &ctx).await?;
            ctx.complete(evaluation)?;
            commit(&state, &ctx).await?;
        }
        actual => {
            return Err(PhaseError::WrongPhase {
                expected: Phase::Evaluation,
                actual,
            }
            .into())
        }
    }

    Ok(Json(ResultsResponse {
        maturity_description: ctx.scores.as_ref().map(|s| s.maturity_level.description()),
        session_id: ctx.session_id,
        phase: ctx.phase,
        profile: ctx.user_profile,
        profile_description: ctx.profile_description,
        package: ctx.package,
        scores: ctx.scores,
        evaluation: ctx.evaluation,
    }))
}

/// POST /api/v1/sessions/:session_id/email
pub async fn handle_email_report(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    AppJson(request): AppJson<EmailRequest>,
) -> Result<Json<EmailResponse>, AppError> {
    let ctx = load_existing(&state, &session_id).await?;
    ctx.phase.require(Phase::Completed)?;
    let to = validate_email(&request.email)?;

    let html = render_html(&ctx);
    let message_id = state
        .email
        .send(&EmailMessage {
            to,
            subject: report_subject(&ctx),
            html: html.clone(),
        })
        .await?;

    // The email is already out; an archive failure must not turn into a retry.
    let archived_key = match &state.archive {
        Some(archive) => match archive
            .store(&report_key(&ctx.session_id, &ctx.record_id), html)
            .await
        {
            Ok(key) => Some(key),
            Err(e) => {
                tracing::warn!("Report for session {} was not archived: {e}", ctx.session_id);
                None
            }
        },
        None => None,
    };

    Ok(Json(EmailResponse {
        session_id: ctx.session_id,
        message_id,
        archived_key,
    }))
}
