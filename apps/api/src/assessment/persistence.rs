use anyhow::Result;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::assessment::session::SessionContext;
use crate::models::assessment::AssessmentSessionRow;

/// Final result blob stored once a session has been scored.
fn final_result(ctx: &SessionContext) -> Option<serde_json::Value> {
    let scores = ctx.scores.as_ref()?;
    Some(json!({
        "profile": ctx.user_profile,
        "profile_description": ctx.profile_description,
        "scores": scores,
        "evaluation": ctx.evaluation,
    }))
}

/// Inserts or refreshes the persisted row for a session. A reset session gets
/// a new `record_id`, so earlier runs stay in the history.
pub async fn upsert_session(pool: &PgPool, ctx: &SessionContext) -> Result<()> {
    let current_level = ctx
        .scores
        .as_ref()
        .map(|s| s.maturity_level.label().to_string());

    sqlx::query(
        r#"
        INSERT INTO assessment_sessions
            (id, session_id, user_id, status, current_level, package_id,
             answers, final_result, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (id) DO UPDATE SET
            user_id       = EXCLUDED.user_id,
            status        = EXCLUDED.status,
            current_level = EXCLUDED.current_level,
            package_id    = EXCLUDED.package_id,
            answers       = EXCLUDED.answers,
            final_result  = EXCLUDED.final_result,
            updated_at    = EXCLUDED.updated_at
        "#,
    )
    .bind(ctx.record_id)
    .bind(&ctx.session_id)
    .bind(ctx.user_id)
    .bind(ctx.phase.as_str())
    .bind(current_level)
    .bind(ctx.package_id())
    .bind(serde_json::to_value(&ctx.test_answers)?)
    .bind(final_result(ctx))
    .bind(ctx.created_at)
    .bind(ctx.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn list_sessions(pool: &PgPool, user_id: Uuid) -> Result<Vec<AssessmentSessionRow>> {
    Ok(sqlx::query_as::<_, AssessmentSessionRow>(
        "SELECT * FROM assessment_sessions WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}
