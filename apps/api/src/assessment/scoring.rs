use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::models::{Question, LIKERT_MAX, LIKERT_MIN};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MaturityLevel {
    NotAssessed,
    Initial,
    Repeatable,
    Defined,
    Optimized,
}

impl MaturityLevel {
    /// Maps an overall Likert average (1.0 - 4.0) onto a maturity level.
    /// An average of 0.0 means nothing was scored.
    pub fn from_average(avg: f64) -> Self {
        match avg {
            a if a <= 0.0 => MaturityLevel::NotAssessed,
            a if a < 1.5 => MaturityLevel::Initial,
            a if a < 2.5 => MaturityLevel::Repeatable,
            a if a < 3.5 => MaturityLevel::Defined,
            _ => MaturityLevel::Optimized,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MaturityLevel::NotAssessed => "Not assessed",
            MaturityLevel::Initial => "Level 1 - Initial",
            MaturityLevel::Repeatable => "Level 2 - Repeatable",
            MaturityLevel::Defined => "Level 3 - Defined",
            MaturityLevel::Optimized => "Level 4 - Optimized",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            MaturityLevel::NotAssessed => "No Likert answers were scored.",
            MaturityLevel::Initial => {
                "Evidence handling is ad hoc. Incidents are resolved without preserving \
                 digital evidence and no one owns forensic readiness."
            }
            MaturityLevel::Repeatable => {
                "Some practices exist and are repeated informally, but they depend on \
                 individuals and are not documented or tested."
            }
            MaturityLevel::Defined => {
                "Policies and procedures for collecting and preserving evidence are \
                 documented, assigned and followed in most incidents."
            }
            MaturityLevel::Optimized => {
                "Forensic readiness is measured, exercised and continuously improved, \
                 and evidence can be produced quickly and defensibly."
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnablerScore {
    pub enabler: String,
    pub score: f64,
}

impl EnablerScore {
    /// Stand-in used when no enabler could be scored.
    pub fn unavailable() -> Self {
        Self {
            enabler: "Not available".to_string(),
            score: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreSummary {
    /// Enabler name → average of its Likert answers.
    pub score_enablers: BTreeMap<String, f64>,
    pub overall_average: f64,
    /// Weighted by `contribution_max`, 0 - 100.
    pub readiness_index: f64,
    pub maturity_level: MaturityLevel,
    pub highest_enabler: Option<EnablerScore>,
    pub lowest_enabler: Option<EnablerScore>,
    pub likert_answered: usize,
}

fn is_valid_likert(v: i64) -> bool {
    (LIKERT_MIN..=LIKERT_MAX).contains(&v)
}

/// Mean of the values in 1..=4. Out-of-range values are ignored; returns 0.0
/// when nothing valid remains.
pub fn average_likert(values: &[i64]) -> f64 {
    let valid: Vec<i64> = values.iter().copied().filter(|v| is_valid_likert(*v)).collect();
    if valid.is_empty() {
        return 0.0;
    }
    valid.iter().sum::<i64>() as f64 / valid.len() as f64
}

/// Averages Likert answers per enabler. `likert` is aligned with `questions`;
/// `None` marks an open question. Enablers with no valid answer are omitted.
pub fn enabler_scores(questions: &[Question], likert: &[Option<i64>]) -> BTreeMap<String, f64> {
    let mut grouped: BTreeMap<String, Vec<i64>> = BTreeMap::new();
    for (question, value) in questions.iter().zip(likert) {
        if let Some(v) = value.filter(|v| is_valid_likert(*v)) {
            grouped.entry(question.enabler.clone()).or_default().push(v);
        }
    }
    grouped
        .into_iter()
        .map(|(enabler, values)| {
            let avg = average_likert(&values);
            (enabler, avg)
        })
        .collect()
}

/// Enabler with the highest score. Ties go to the alphabetically first name.
pub fn highest_enabler(scores: &BTreeMap<String, f64>) -> Option<EnablerScore> {
    pick_enabler(scores, |candidate, best| candidate > best)
}

/// Enabler with the lowest score. Ties go to the alphabetically first name.
pub fn lowest_enabler(scores: &BTreeMap<String, f64>) -> Option<EnablerScore> {
    pick_enabler(scores, |candidate, best| candidate < best)
}

fn pick_enabler(
    scores: &BTreeMap<String, f64>,
    better: impl Fn(f64, f64) -> bool,
) -> Option<EnablerScore> {
    let mut best: Option<(&String, f64)> = None;
    for (name, &score) in scores {
        match best {
            Some((_, best_score)) if !better(score, best_score) => {}
            _ => best = Some((name, score)),
        }
    }
    best.map(|(name, score)| EnablerScore {
        enabler: name.clone(),
        score,
    })
}

/// Σ(contribution_max × v/4) / Σ(contribution_max) × 100 over scored Likert
/// questions. Returns 0.0 when the scored questions carry no weight.
pub fn readiness_index(questions: &[Question], likert: &[Option<i64>]) -> f64 {
    let mut earned = 0.0;
    let mut possible = 0.0;
    for (question, value) in questions.iter().zip(likert) {
        if let Some(v) = value.filter(|v| is_valid_likert(*v)) {
            let weight = question.contribution_max.max(0.0);
            earned += weight * v as f64 / LIKERT_MAX as f64;
            possible += weight;
        }
    }
    if possible > 0.0 {
        (earned / possible * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    }
}

pub fn summarize(questions: &[Question], likert: &[Option<i64>]) -> ScoreSummary {
    let all: Vec<i64> = likert.iter().flatten().copied().collect();
    let overall_average = average_likert(&all);
    let score_enablers = enabler_scores(questions, likert);

    ScoreSummary {
        overall_average,
        readiness_index: readiness_index(questions, likert),
        maturity_level: MaturityLevel::from_average(overall_average),
        highest_enabler: highest_enabler(&score_enablers),
        lowest_enabler: lowest_enabler(&score_enablers),
        likert_answered: all.iter().filter(|v| is_valid_likert(**v)).count(),
        score_enablers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::models::QuestionKind;

    fn q(enabler: &str, kind: QuestionKind, weight: f64) -> Question {
        Question {
            id: format!("{enabler}-{weight}"),
            enabler: enabler.to_string(),
            indicator: "indicator".to_string(),
            text: "text".to_string(),
            kind,
            contribution_max: weight,
            options: vec![],
        }
    }

    fn scores(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_average_empty_is_zero() {
        assert_eq!(average_likert(&[]), 0.0);
    }

    #[test]
    fn test_average_ignores_out_of_range() {
        // 0, 5 and -1 dropped: (2 + 4) / 2
        assert_eq!(average_likert(&[2, 0, 4, 5, -1]), 3.0);
    }

    #[test]
    fn test_average_all_invalid_is_zero() {
        assert_eq!(average_likert(&[0, 7, 9]), 0.0);
    }

    #[test]
    fn test_average_plain() {
        assert!((average_likert(&[1, 2, 2]) - 5.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_enabler_scores_group_and_skip_open() {
        let questions = vec![
            q("Policies", QuestionKind::Likert, 1.0),
            q("Policies", QuestionKind::Likert, 1.0),
            q("People", QuestionKind::Likert, 1.0),
            q("Culture", QuestionKind::Open, 0.0),
        ];
        let result = enabler_scores(&questions, &[Some(2), Some(3), Some(4), None]);
        assert_eq!(result, scores(&[("People", 4.0), ("Policies", 2.5)]));
    }

    #[test]
    fn test_highest_and_lowest() {
        let s = scores(&[("Culture", 2.0), ("People", 3.5), ("Processes", 1.5)]);
        assert_eq!(highest_enabler(&s).unwrap().enabler, "People");
        assert_eq!(lowest_enabler(&s).unwrap().enabler, "Processes");
    }

    #[test]
    fn test_ties_go_to_first_alphabetically() {
        let s = scores(&[("Processes", 3.0), ("Culture", 3.0), ("People", 3.0)]);
        assert_eq!(highest_enabler(&s).unwrap().enabler, "Culture");
        assert_eq!(lowest_enabler(&s).unwrap().enabler, "Culture");
    }

    #[test]
    fn test_empty_mapping_falls_back() {
        let s = BTreeMap::new();
        assert!(highest_enabler(&s).is_none());
        assert!(lowest_enabler(&s).is_none());
        let fallback = lowest_enabler(&s).unwrap_or_else(EnablerScore::unavailable);
        assert_eq!(fallback.score, 0.0);
    }

    #[test]
    fn test_readiness_index_weighted() {
        let questions = vec![
            q("Policies", QuestionKind::Likert, 2.0),
            q("People", QuestionKind::Likert, 1.0),
            q("People", QuestionKind::Open, 0.0),
        ];
        // (2 * 4/4 + 1 * 2/4) / 3 * 100 = 83.33
        let idx = readiness_index(&questions, &[Some(4), Some(2), None]);
        assert!((idx - 83.333).abs() < 0.01, "index was {idx}");
    }

    #[test]
    fn test_readiness_index_without_weight() {
        let questions = vec![q("Policies", QuestionKind::Likert, 0.0)];
        assert_eq!(readiness_index(&questions, &[Some(4)]), 0.0);
    }

    #[test]
    fn test_maturity_thresholds() {
        assert_eq!(MaturityLevel::from_average(0.0), MaturityLevel::NotAssessed);
        assert_eq!(MaturityLevel::from_average(1.0), MaturityLevel::Initial);
        assert_eq!(MaturityLevel::from_average(1.5), MaturityLevel::Repeatable);
        assert_eq!(MaturityLevel::from_average(2.49), MaturityLevel::Repeatable);
        assert_eq!(MaturityLevel::from_average(2.5), MaturityLevel::Defined);
        assert_eq!(MaturityLevel::from_average(3.5), MaturityLevel::Optimized);
        assert_eq!(MaturityLevel::from_average(4.0), MaturityLevel::Optimized);
    }

    #[test]
    fn test_summarize() {
        let questions = vec![
            q("Policies", QuestionKind::Likert, 1.0),
            q("Processes", QuestionKind::Likert, 1.0),
            q("Processes", QuestionKind::Open, 0.0),
        ];
        let summary = summarize(&questions, &[Some(1), Some(3), None]);
        assert_eq!(summary.overall_average, 2.0);
        assert_eq!(summary.likert_answered, 2);
        assert_eq!(summary.maturity_level, MaturityLevel::Repeatable);
        assert_eq!(summary.highest_enabler.unwrap().enabler, "Processes");
        assert_eq!(summary.lowest_enabler.unwrap().enabler, "Policies");
        assert!((summary.readiness_index - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_summarize_only_open_questions() {
        let questions = vec![q("Culture", QuestionKind::Open, 0.0)];
        let summary = summarize(&questions, &[None]);
        assert_eq!(summary.maturity_level, MaturityLevel::NotAssessed);
        assert!(summary.score_enablers.is_empty());
        assert!(summary.highest_enabler.is_none());
    }
}
