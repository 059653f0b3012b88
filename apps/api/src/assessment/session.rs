use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::assessment::evaluation::Evaluation;
use crate::assessment::phase::{Phase, PhaseError};
use crate::assessment::scoring::{summarize, ScoreSummary};
use crate::assessment::validation::{validate_answers, Answer};
use crate::catalog::models::Question;
use crate::errors::AppError;
use crate::selection::PackageMatch;

/// Everything the service knows about one assessment session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContext {
    pub session_id: String,
    /// Primary key of the persisted assessment row.
    pub record_id: Uuid,
    pub user_id: Option<Uuid>,
    pub phase: Phase,
    pub user_profile: BTreeMap<String, String>,
    pub profile_description: Option<String>,
    pub package: Option<PackageMatch>,
    pub test_questions: Vec<Question>,
    pub test_answers: Vec<Answer>,
    /// Aligned with `test_questions`; `None` for open questions.
    pub likert_scores: Vec<Option<i64>>,
    pub scores: Option<ScoreSummary>,
    pub evaluation: Option<Evaluation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionContext {
    pub fn new(session_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            record_id: Uuid::new_v4(),
            user_id: None,
            phase: Phase::Profiling,
            user_profile: BTreeMap::new(),
            profile_description: None,
            package: None,
            test_questions: Vec::new(),
            test_answers: Vec::new(),
            likert_scores: Vec::new(),
            scores: None,
            evaluation: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn advance(&mut self, target: Phase) -> Result<(), PhaseError> {
        let from = self.phase;
        self.phase.advance_to(target)?;
        self.updated_at = Utc::now();
        info!("Session {} moved {} -> {}", self.session_id, from, target);
        Ok(())
    }

    /// Stores the profile and the package chosen for it.
    /// profiling → package_selected
    pub fn record_profile(
        &mut self,
        user_id: Option<Uuid>,
        profile: BTreeMap<String, String>,
        description: String,
        package: PackageMatch,
    ) -> Result<(), PhaseError> {
        self.phase.require(Phase::Profiling)?;
        if user_id.is_some() {
            self.user_id = user_id;
        }
        self.user_profile = profile;
        self.profile_description = Some(description);
        self.package = Some(package);
        self.advance(Phase::PackageSelected)
    }

    /// Loads the package questions.
    /// package_selected → testing
    pub fn begin_testing(&mut self, questions: Vec<Question>) -> Result<(), PhaseError> {
        self.phase.require(Phase::PackageSelected)?;
        self.test_questions = questions;
        self.advance(Phase::Testing)
    }

    /// Validates and scores the answers.
    /// testing → evaluation
    pub fn submit_answers(&mut self, raw: &[Value]) -> Result<&ScoreSummary, AppError> {
        self.phase.require(Phase::Testing)?;
        let answers = validate_answers(&self.test_questions, raw)?;

        let likert: Vec<Option<i64>> = answers.iter().map(Answer::likert).collect();
        let summary = summarize(&self.test_questions, &likert);

        self.test_answers = answers;
        self.likert_scores = likert;
        self.advance(Phase::Evaluation)?;
        Ok(self.scores.insert(summary))
    }

    /// Stores the narrative evaluation.
    /// evaluation → completed
    pub fn complete(&mut self, evaluation: Evaluation) -> Result<(), PhaseError> {
        self.phase.require(Phase::Evaluation)?;
        self.evaluation = Some(evaluation);
        self.advance(Phase::Completed)
    }

    pub fn package_id(&self) -> Option<&str> {
        self.package.as_ref().map(|p| p.package.id.as_str())
    }

    /// Question/answer pairs in questionnaire order.
    pub fn answered_questions(&self) -> impl Iterator<Item = (&Question, &Answer)> {
        self.test_questions.iter().zip(&self.test_answers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::catalog::models::{PackageSummary, QuestionKind};

    fn question(id: &str, enabler: &str, kind: QuestionKind) -> Question {
        Question {
            id: id.to_string(),
            enabler: enabler.to_string(),
            indicator: "indicator".to_string(),
            text: format!("question {id}"),
            kind,
            contribution_max: 1.0,
            options: vec![],
        }
    }

    fn package_match() -> PackageMatch {
        PackageMatch {
            package: PackageSummary {
                id: "dfr-foundation".to_string(),
                name: "Foundation Readiness".to_string(),
                description: "small orgs".to_string(),
            },
            distance: 0.4,
        }
    }

    fn evaluation() -> Evaluation {
        Evaluation {
            evaluation: "Fair".to_string(),
            strengths: vec!["Logging".to_string()],
            weaknesses: vec!["Policy".to_string()],
            recommendations: vec!["Write a policy".to_string()],
        }
    }

    fn at_testing() -> SessionContext {
        let mut ctx = SessionContext::new("s-1");
        ctx.record_profile(
            None,
            BTreeMap::from([("sector".to_string(), "Healthcare".to_string())]),
            "A hospital".to_string(),
            package_match(),
        )
        .unwrap();
        ctx.begin_testing(vec![
            question("a", "Policies", QuestionKind::Likert),
            question("b", "People", QuestionKind::Likert),
            question("c", "People", QuestionKind::Open),
        ])
        .unwrap();
        ctx
    }

    #[test]
    fn test_new_session_starts_profiling() {
        let ctx = SessionContext::new("s-1");
        assert_eq!(ctx.phase, Phase::Profiling);
        assert!(ctx.package.is_none());
    }

    #[test]
    fn test_full_lifecycle() {
        let mut ctx = at_testing();
        assert_eq!(ctx.phase, Phase::Testing);
        assert_eq!(ctx.package_id(), Some("dfr-foundation"));

        let summary = ctx
            .submit_answers(&[json!(2), json!(4), json!("Call our MSP")])
            .unwrap()
            .clone();
        assert_eq!(ctx.phase, Phase::Evaluation);
        assert_eq!(summary.overall_average, 3.0);
        assert_eq!(ctx.likert_scores, vec![Some(2), Some(4), None]);
        assert_eq!(ctx.answered_questions().count(), 3);

        ctx.complete(evaluation()).unwrap();
        assert_eq!(ctx.phase, Phase::Completed);
    }

    #[test]
    fn test_record_profile_twice_is_rejected() {
        let mut ctx = SessionContext::new("s-1");
        ctx.record_profile(None, BTreeMap::new(), "d".to_string(), package_match())
            .unwrap();
        let err = ctx
            .record_profile(None, BTreeMap::new(), "d".to_string(), package_match())
            .unwrap_err();
        assert!(matches!(err, PhaseError::WrongPhase { .. }));
        assert_eq!(ctx.phase, Phase::PackageSelected);
    }

    #[test]
    fn test_record_profile_keeps_user() {
        let user = Uuid::new_v4();
        let mut ctx = SessionContext::new("s-1");
        ctx.record_profile(Some(user), BTreeMap::new(), "d".to_string(), package_match())
            .unwrap();
        assert_eq!(ctx.user_id, Some(user));
    }

    #[test]
    fn test_cannot_test_before_package() {
        let mut ctx = SessionContext::new("s-1");
        assert!(ctx.begin_testing(vec![]).is_err());
        assert_eq!(ctx.phase, Phase::Profiling);
    }

    #[test]
    fn test_invalid_answers_keep_phase() {
        let mut ctx = at_testing();
        let err = ctx.submit_answers(&[json!(2), json!(9), json!("x")]).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(ctx.phase, Phase::Testing);
        assert!(ctx.scores.is_none());
    }

    #[test]
    fn test_wrong_answer_count_rejected() {
        let mut ctx = at_testing();
        assert!(matches!(
            ctx.submit_answers(&[json!(2)]),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_answers_rejected_after_evaluation() {
        let mut ctx = at_testing();
        ctx.submit_answers(&[json!(1), json!(1), json!("x")]).unwrap();
        assert!(matches!(
            ctx.submit_answers(&[json!(1), json!(1), json!("x")]),
            Err(AppError::Phase(_))
        ));
    }

    #[test]
    fn test_complete_requires_evaluation() {
        let mut ctx = at_testing();
        assert!(ctx.complete(evaluation()).is_err());
    }

    #[test]
    fn test_context_json_round_trip() {
        let mut ctx = at_testing();
        ctx.submit_answers(&[json!(3), json!(3), json!("x")]).unwrap();
        let raw = serde_json::to_string(&ctx).unwrap();
        let back: SessionContext = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.phase, Phase::Evaluation);
        assert_eq!(back.scores, ctx.scores);
    }
}
