pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::assessment::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Catalog & history
        .route("/api/v1/packages", get(handlers::handle_list_packages))
        .route("/api/v1/assessments", get(handlers::handle_list_assessments))
        // Session lifecycle
        .route(
            "/api/v1/sessions/:session_id",
            get(handlers::handle_get_session).delete(handlers::handle_reset_session),
        )
        .route(
            "/api/v1/sessions/:session_id/profiling/questions",
            get(handlers::handle_profiling_questions),
        )
        .route(
            "/api/v1/sessions/:session_id/profiling/answers",
            post(handlers::handle_profiling_answers),
        )
        .route(
            "/api/v1/sessions/:session_id/test/questions",
            get(handlers::handle_test_questions),
        )
        .route(
            "/api/v1/sessions/:session_id/test/answers",
            post(handlers::handle_test_answers),
        )
        .route(
            "/api/v1/sessions/:session_id/results",
            get(handlers::handle_results),
        )
        .route(
            "/api/v1/sessions/:session_id/email",
            post(handlers::handle_email_report),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::assessment::evaluation::Evaluation;
    use crate::assessment::phase::Phase;
    use crate::assessment::session::SessionContext;
    use crate::assessment::store::{InMemorySessionStore, SessionStore};
    use crate::catalog::models::QuestionKind;
    use crate::catalog::seed::bundled_packages;
    use crate::config::{ArchiveConfig, LlmConfig};
    use crate::llm_client::LlmClient;
    use crate::report::archive::ReportArchive;
    use crate::report::email::{DisabledEmailSender, EmailError, EmailMessage, EmailSender};
    use crate::selection::embedder::HashingEmbedder;
    use crate::selection::{PackageMatch, PackageMatcher};

    struct TestApp {
        app: Router,
        sessions: Arc<InMemorySessionStore>,
    }

    /// Postgres and the LLM point at closed ports: any route that reaches
    /// them fails with a 500.
    async fn test_app(email: Arc<dyn EmailSender>, archive: Option<ReportArchive>) -> TestApp {
        let db = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(500))
            .connect_lazy("postgres://readiness@127.0.0.1:1/readiness_test")
            .unwrap();
        let llm = LlmClient::new(&LlmConfig {
            api_key: "test".to_string(),
            api_url: Some("http://127.0.0.1:9".to_string()),
            model: None,
            gemini_api_key: None,
            gemini_model: None,
        })
        .unwrap();
        let packages = bundled_packages()
            .unwrap()
            .iter()
            .map(|p| p.summary())
            .collect();
        let matcher = PackageMatcher::build(Arc::new(HashingEmbedder::default()), packages)
            .await
            .unwrap();
        let sessions = Arc::new(InMemorySessionStore::new(3600));

        let app = build_router(AppState {
            db,
            sessions: sessions.clone(),
            llm,
            matcher: Arc::new(matcher),
            email,
            archive,
        });
        TestApp { app, sessions }
    }

    async fn test_router() -> Router {
        test_app(Arc::new(DisabledEmailSender), None).await.app
    }

    /// A context walked forward to `phase` on the first bundled package.
    fn session_in(session_id: &str, phase: Phase) -> SessionContext {
        let package = bundled_packages().unwrap().remove(0);
        let mut ctx = SessionContext::new(session_id);
        ctx.record_profile(
            None,
            BTreeMap::from([("sector".to_string(), "Finance".to_string())]),
            "A mid-sized bank.".to_string(),
            PackageMatch {
                package: package.summary(),
                distance: 0.0,
            },
        )
        .unwrap();
        if phase == Phase::PackageSelected {
            return ctx;
        }
        ctx.begin_testing(package.questions).unwrap();
        if phase == Phase::Testing {
            return ctx;
        }
        ctx.submit_answers(&valid_answers(&ctx)).unwrap();
        if phase == Phase::Evaluation {
            return ctx;
        }
        ctx.complete(Evaluation {
            evaluation: "Developing.".to_string(),
            strengths: vec![],
            weaknesses: vec![],
            recommendations: vec![],
        })
        .unwrap();
        ctx
    }

    fn valid_answers(ctx: &SessionContext) -> Vec<Value> {
        ctx.test_questions
            .iter()
            .map(|q| match q.kind {
                QuestionKind::Likert => json!(2),
                QuestionKind::Open => json!("Logs are kept for 90 days."),
            })
            .collect()
    }

    #[derive(Default)]
    struct CountingSender {
        sent: AtomicUsize,
    }

    #[async_trait]
    impl EmailSender for CountingSender {
        async fn send(&self, _message: &EmailMessage) -> Result<String, EmailError> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            Ok("msg-1".to_string())
        }
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let request = match body {
            Some(json) => request.body(Body::from(json.to_string())).unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_profiling_questions_create_session() {
        let app = test_router().await;
        let (status, body) =
            send(&app, "GET", "/api/v1/sessions/s1/profiling/questions", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["phase"], "profiling");
        assert_eq!(body["questions"].as_array().unwrap().len(), 9);

        let (status, body) = send(&app, "GET", "/api/v1/sessions/s1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["session_id"], "s1");
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let app = test_router().await;
        let (status, body) =
            send(&app, "GET", "/api/v1/sessions/nope/test/questions", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_out_of_order_requests_conflict() {
        let app = test_router().await;
        send(&app, "GET", "/api/v1/sessions/s2/profiling/questions", None).await;

        let answers = serde_json::json!({ "answers": [1, 2, 3] });
        let (status, body) =
            send(&app, "POST", "/api/v1/sessions/s2/test/answers", Some(answers)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "PHASE_CONFLICT");

        let (status, _) = send(&app, "GET", "/api/v1/sessions/s2/results", None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let email = serde_json::json!({ "email": "ciso@example.org" });
        let (status, _) = send(&app, "POST", "/api/v1/sessions/s2/email", Some(email)).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_reset_discards_session() {
        let app = test_router().await;
        send(&app, "GET", "/api/v1/sessions/s3/profiling/questions", None).await;

        let (status, _) = send(&app, "DELETE", "/api/v1/sessions/s3", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, "DELETE", "/api/v1/sessions/s3", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_profile_rejected_before_llm() {
        let app = test_router().await;
        let request = serde_json::json!({ "answers": { "sector": "Finance" } });
        let (status, body) =
            send(&app, "POST", "/api/v1/sessions/s4/profiling/answers", Some(request)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_failed_persist_leaves_session_retryable() {
        let TestApp { app, sessions } = test_app(Arc::new(DisabledEmailSender), None).await;
        let ctx = session_in("t1", Phase::Testing);
        let answers = json!({ "answers": valid_answers(&ctx) });
        sessions.save(&ctx).await.unwrap();

        let (status, body) =
            send(&app, "POST", "/api/v1/sessions/t1/test/answers", Some(answers.clone())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");

        let stored = sessions.load("t1").await.unwrap().unwrap();
        assert_eq!(stored.phase, Phase::Testing);
        assert!(stored.scores.is_none());

        // Same failure again, not a phase conflict.
        let (status, _) =
            send(&app, "POST", "/api/v1/sessions/t1/test/answers", Some(answers)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_malformed_answer_bodies_are_validation_errors() {
        let TestApp { app, sessions } = test_app(Arc::new(DisabledEmailSender), None).await;
        sessions.save(&session_in("t2", Phase::Testing)).await.unwrap();

        for body in [json!({ "answers": 3 }), json!({ "answers": null }), json!({})] {
            let (status, response) =
                send(&app, "POST", "/api/v1/sessions/t2/test/answers", Some(body.clone())).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body {body}");
            assert_eq!(response["error"]["code"], "VALIDATION_ERROR", "body {body}");
        }

        let (status, response) =
            send(&app, "POST", "/api/v1/sessions/t2/profiling/answers", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"]["code"], "VALIDATION_ERROR");

        let (status, _) =
            send(&app, "POST", "/api/v1/sessions/t2/email", Some(json!({ "mail": "x" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let stored = sessions.load("t2").await.unwrap().unwrap();
        assert_eq!(stored.phase, Phase::Testing);
    }

    #[tokio::test]
    async fn test_archive_failure_still_reports_sent_email() {
        let sender = Arc::new(CountingSender::default());
        let archive = ReportArchive::connect(&ArchiveConfig {
            bucket: "reports".to_string(),
            endpoint: Some("http://127.0.0.1:1".to_string()),
            access_key_id: Some("test".to_string()),
            secret_access_key: Some("test".to_string()),
        })
        .await;
        let TestApp { app, sessions } = test_app(sender.clone(), Some(archive)).await;
        sessions.save(&session_in("t3", Phase::Completed)).await.unwrap();

        let email = json!({ "email": "ciso@example.org" });
        let (status, body) = send(&app, "POST", "/api/v1/sessions/t3/email", Some(email)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message_id"], "msg-1");
        assert!(body["archived_key"].is_null());
        assert_eq!(sender.sent.load(Ordering::SeqCst), 1);
    }
}
