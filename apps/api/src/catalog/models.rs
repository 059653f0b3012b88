use serde::{Deserialize, Serialize};

/// Lowest and highest values on the Likert self-assessment scale.
pub const LIKERT_MIN: i64 = 1;
pub const LIKERT_MAX: i64 = 4;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Likert,
    Open,
}

impl QuestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionKind::Likert => "likert",
            QuestionKind::Open => "open",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "likert" => Some(QuestionKind::Likert),
            "open" => Some(QuestionKind::Open),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub id: String,
    /// Maturity-model dimension the question is scored under.
    pub enabler: String,
    pub indicator: String,
    pub text: String,
    pub kind: QuestionKind,
    /// Weight of this question in the readiness index.
    #[serde(default = "default_contribution_max")]
    pub contribution_max: f64,
    /// Allowed Likert values. Empty means the full 1-4 scale.
    #[serde(default)]
    pub options: Vec<i64>,
}

impl Question {
    /// Likert values this question accepts.
    pub fn allowed_values(&self) -> Vec<i64> {
        if self.options.is_empty() {
            (LIKERT_MIN..=LIKERT_MAX).collect()
        } else {
            self.options
                .iter()
                .copied()
                .filter(|v| (LIKERT_MIN..=LIKERT_MAX).contains(v))
                .collect()
        }
    }
}

fn default_contribution_max() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackageSummary {
    pub id: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Package {
    pub id: String,
    pub name: String,
    pub description: String,
    pub questions: Vec<Question>,
}

impl Package {
    pub fn summary(&self) -> PackageSummary {
        PackageSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}
