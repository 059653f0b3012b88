use serde::{Deserialize, Serialize};

use crate::assessment::profiling::profile_lines;
use crate::assessment::prompts::{EVALUATION_PROMPT, EVALUATION_SYSTEM};
use crate::assessment::scoring::{EnablerScore, ScoreSummary};
use crate::assessment::session::SessionContext;
use crate::assessment::validation::Answer;
use crate::errors::AppError;
use crate::llm_client::prompts::{fill_template, GROUNDING_INSTRUCTION, JSON_ONLY_SYSTEM};
use crate::llm_client::LlmClient;

/// Narrative assessment produced by the LLM.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Evaluation {
    pub evaluation: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

fn format_enabler(score: Option<&EnablerScore>) -> String {
    let score = score.cloned().unwrap_or_else(EnablerScore::unavailable);
    format!("{} ({:.2})", score.enabler, score.score)
}

fn format_enabler_scores(summary: &ScoreSummary) -> String {
    if summary.score_enablers.is_empty() {
        return "- none scored".to_string();
    }
    summary
        .score_enablers
        .iter()
        .map(|(name, score)| format!("- {name}: {score:.2}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_answers(ctx: &SessionContext) -> String {
    ctx.answered_questions()
        .enumerate()
        .map(|(i, (q, a))| {
            let answer = match a {
                Answer::Likert(v) => format!("{v} / 4"),
                Answer::Text(t) => format!("\"{t}\""),
            };
            format!("{}. [{}] {} -> {}", i + 1, q.enabler, q.text, answer)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_evaluation_prompt(ctx: &SessionContext, summary: &ScoreSummary) -> String {
    let package_name = ctx
        .package
        .as_ref()
        .map(|p| p.package.name.as_str())
        .unwrap_or("unknown");
    let profile = if ctx.user_profile.is_empty() {
        "(no profile)".to_string()
    } else {
        profile_lines(&ctx.user_profile)
    };

    let enabler_scores = format_enabler_scores(summary);
    let overall_average = format!("{:.2}", summary.overall_average);
    let readiness_index = format!("{:.1}", summary.readiness_index);
    let highest = format_enabler(summary.highest_enabler.as_ref());
    let lowest = format_enabler(summary.lowest_enabler.as_ref());
    let answers = format_answers(ctx);

    fill_template(
        EVALUATION_PROMPT,
        &[
            ("profile", profile.as_str()),
            (
                "profile_description",
                ctx.profile_description.as_deref().unwrap_or("(no description)"),
            ),
            ("package_name", package_name),
            ("enabler_scores", enabler_scores.as_str()),
            ("overall_average", overall_average.as_str()),
            ("readiness_index", readiness_index.as_str()),
            ("maturity_level", summary.maturity_level.label()),
            ("highest", highest.as_str()),
            ("lowest", lowest.as_str()),
            ("answers", answers.as_str()),
            ("grounding", GROUNDING_INSTRUCTION),
        ],
    )
}

/// Asks the LLM for the narrative evaluation of a scored session.
pub async fn evaluate(llm: &LlmClient, ctx: &SessionContext) -> Result<Evaluation, AppError> {
    let summary = ctx
        .scores
        .as_ref()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("session has no scores to evaluate")))?;

    let prompt = build_evaluation_prompt(ctx, summary);
    let system = format!("{EVALUATION_SYSTEM} {JSON_ONLY_SYSTEM}");
    let evaluation: Evaluation = llm.call_json(&prompt, &system).await?;
    Ok(evaluation)
}
