use crate::assessment::profiling::PROFILING_QUESTIONS;
use crate::assessment::scoring::EnablerScore;
use crate::assessment::session::SessionContext;
use crate::assessment::validation::Answer;

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn list(items: &[String]) -> String {
    if items.is_empty() {
        return "<p><em>None noted.</em></p>\n".to_string();
    }
    let mut html = String::from("<ul>\n");
    for item in items {
        html.push_str(&format!("  <li>{}</li>\n", escape(item)));
    }
    html.push_str("</ul>\n");
    html
}

pub fn report_subject(ctx: &SessionContext) -> String {
    match ctx.user_profile.get("organization_name") {
        Some(name) => format!("Digital Forensic Readiness Report: {name}"),
        None => "Digital Forensic Readiness Report".to_string(),
    }
}

/// Renders the assessment as a standalone HTML document.
pub fn render_html(ctx: &SessionContext) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">");
    html.push_str(&format!("<title>{}</title>", escape(&report_subject(ctx))));
    html.push_str("</head><body style=\"font-family: sans-serif; max-width: 720px\">\n");
    html.push_str(&format!("<h1>{}</h1>\n", escape(&report_subject(ctx))));

    // Profile
    html.push_str("<h2>Organization profile</h2>\n<table>\n");
    for q in PROFILING_QUESTIONS {
        if let Some(v) = ctx.user_profile.get(q.key) {
            html.push_str(&format!(
                "  <tr><th align=\"left\">{}</th><td>{}</td></tr>\n",
                escape(q.question),
                escape(v)
            ));
        }
    }
    html.push_str("</table>\n");
    if let Some(desc) = &ctx.profile_description {
        html.push_str(&format!("<p>{}</p>\n", escape(desc)));
    }
    if let Some(m) = &ctx.package {
        html.push_str(&format!(
            "<p>Question package: <strong>{}</strong></p>\n",
            escape(&m.package.name)
        ));
    }

    // Scores
    if let Some(scores) = &ctx.scores {
        let highest = scores
            .highest_enabler
            .clone()
            .unwrap_or_else(EnablerScore::unavailable);
        let lowest = scores
            .lowest_enabler
            .clone()
            .unwrap_or_else(EnablerScore::unavailable);

        html.push_str("<h2>Results</h2>\n");
        html.push_str(&format!(
            "<p>Maturity level: <strong>{}</strong><br>{}</p>\n",
            scores.maturity_level.label(),
            scores.maturity_level.description()
        ));
        html.push_str(&format!(
            "<p>Average score: {:.2} / 4 &middot; Readiness index: {:.1} / 100</p>\n",
            scores.overall_average, scores.readiness_index
        ));
        html.push_str("<table>\n  <tr><th align=\"left\">Enabler</th><th>Score</th></tr>\n");
        for (enabler, score) in &scores.score_enablers {
            html.push_str(&format!(
                "  <tr><td>{}</td><td>{:.2}</td></tr>\n",
                escape(enabler),
                score
            ));
        }
        html.push_str("</table>\n");
        html.push_str(&format!(
            "<p>Strongest enabler: {} ({:.2}). Weakest enabler: {} ({:.2}).</p>\n",
            escape(&highest.enabler),
            highest.score,
            escape(&lowest.enabler),
            lowest.score
        ));
    }

    // Evaluation
    if let Some(e) = &ctx.evaluation {
        html.push_str("<h2>Evaluation</h2>\n");
        for para in e.evaluation.split("\n\n").filter(|p| !p.trim().is_empty()) {
            html.push_str(&format!("<p>{}</p>\n", escape(para.trim())));
        }
        html.push_str("<h3>Strengths</h3>\n");
        html.push_str(&list(&e.strengths));
        html.push_str("<h3>Weaknesses</h3>\n");
        html.push_str(&list(&e.weaknesses));
        html.push_str("<h3>Recommendations</h3>\n");
        html.push_str(&list(&e.recommendations));
    }

    // Answers
    if !ctx.test_answers.is_empty() {
        html.push_str("<h2>Your answers</h2>\n<ol>\n");
        for (q, a) in ctx.answered_questions() {
            let answer = match a {
                Answer::Likert(v) => format!("{v} / 4"),
                Answer::Text(t) => escape(t),
            };
            html.push_str(&format!(
                "  <li>[{}] {}<br><em>{}</em></li>\n",
                escape(&q.enabler),
                escape(&q.text),
                answer
            ));
        }
        html.push_str("</ol>\n");
    }

    html.push_str("</body></html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use serde_json::json;

    use crate::assessment::evaluation::Evaluation;
    use crate::catalog::models::{PackageSummary, Question, QuestionKind};
    use crate::selection::PackageMatch;

    fn completed() -> SessionContext {
        let mut ctx = SessionContext::new("s-report");
        ctx.record_profile(
            None,
            BTreeMap::from([("organization_name".to_string(), "R&D <Labs>".to_string())]),
            "A research lab.".to_string(),
            PackageMatch {
                package: PackageSummary {
                    id: "dfr-foundation".to_string(),
                    name: "Foundation Readiness".to_string(),
                    description: String::new(),
                },
                distance: 0.2,
            },
        )
        .unwrap();
        ctx.begin_testing(vec![Question {
            id: "q".to_string(),
            enabler: "Policies".to_string(),
            indicator: "i".to_string(),
            text: "Policy exists".to_string(),
            kind: QuestionKind::Likert,
            contribution_max: 1.0,
            options: vec![],
        }])
        .unwrap();
        ctx.submit_answers(&[json!(3)]).unwrap();
        ctx.complete(Evaluation {
            evaluation: "First paragraph.\n\nSecond paragraph.".to_string(),
            strengths: vec!["Clear policy".to_string()],
            weaknesses: vec![],
            recommendations: vec!["Run an exercise".to_string()],
        })
        .unwrap();
        ctx
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("<a href=\"x\">&</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
    }

    #[test]
    fn test_report_contains_sections() {
        let html = render_html(&completed());
        assert!(html.contains("R&amp;D &lt;Labs&gt;"));
        assert!(html.contains("Level 3 - Defined"));
        assert!(html.contains("<li>Run an exercise</li>"));
        assert!(html.contains("<p>Second paragraph.</p>"));
        assert!(html.contains("None noted."));
        assert!(html.contains("3 / 4"));
    }

    #[test]
    fn test_subject_without_name() {
        let ctx = SessionContext::new("s");
        assert_eq!(report_subject(&ctx), "Digital Forensic Readiness Report");
    }

    #[test]
    fn test_render_unscored_session() {
        let html = render_html(&SessionContext::new("s"));
        assert!(!html.contains("<h2>Results</h2>"));
        assert!(html.ends_with("</body></html>\n"));
    }
}
