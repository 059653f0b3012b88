use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::assessment::prompts::{PROFILE_DESCRIBE_PROMPT, PROFILE_DESCRIBE_SYSTEM};
use crate::assessment::validation::ValidationError;
use crate::llm_client::prompts::{fill_template, GROUNDING_INSTRUCTION};
use crate::llm_client::{LlmClient, LlmError};

/// A fixed intake question. Empty `options` means free text.
#[derive(Debug, Clone, Serialize)]
pub struct ProfilingQuestion {
    pub key: &'static str,
    pub question: &'static str,
    pub options: &'static [&'static str],
}

pub const PROFILING_QUESTIONS: &[ProfilingQuestion] = &[
    ProfilingQuestion {
        key: "organization_name",
        question: "What is the name of your organization?",
        options: &[],
    },
    ProfilingQuestion {
        key: "sector",
        question: "Which sector does your organization operate in?",
        options: &[
            "Government",
            "Finance and banking",
            "Healthcare",
            "Education",
            "Telecommunications",
            "Energy and utilities",
            "Manufacturing",
            "Retail and e-commerce",
            "Technology",
            "Other",
        ],
    },
    ProfilingQuestion {
        key: "organization_size",
        question: "How many employees does your organization have?",
        options: &[
            "1-50 employees",
            "51-250 employees",
            "251-1000 employees",
            "More than 1000 employees",
        ],
    },
    ProfilingQuestion {
        key: "it_environment",
        question: "Where do your main systems run?",
        options: &["Mostly on-premises", "Hybrid", "Mostly cloud and SaaS"],
    },
    ProfilingQuestion {
        key: "security_team",
        question: "How is information security staffed?",
        options: &[
            "None",
            "Part-time or outsourced",
            "Dedicated security team",
            "Security operations center (SOC)",
        ],
    },
    ProfilingQuestion {
        key: "incident_history",
        question: "Which best describes your security incident history over the last three years?",
        options: &[
            "No known incidents",
            "Minor incidents",
            "At least one major incident",
        ],
    },
    ProfilingQuestion {
        key: "regulatory_obligations",
        question: "Are you subject to rules on retaining or producing digital evidence?",
        options: &[
            "None",
            "Sector guidelines",
            "Binding regulation with evidence requirements",
        ],
    },
    ProfilingQuestion {
        key: "forensic_capability",
        question: "What digital forensic capability do you have today?",
        options: &[
            "None",
            "External provider on call",
            "Some internal capability",
            "Dedicated internal forensic team",
        ],
    },
    ProfilingQuestion {
        key: "main_concern",
        question: "What is your biggest concern about investigating a security incident today?",
        options: &[],
    },
];

pub fn profiling_questions() -> &'static [ProfilingQuestion] {
    PROFILING_QUESTIONS
}

/// Maps raw intake answers into a profile. Every question must be answered;
/// choice answers match options case-insensitively and are stored in their
/// canonical spelling. Unknown keys are dropped.
pub fn map_profile(
    answers: &HashMap<String, String>,
) -> Result<BTreeMap<String, String>, ValidationError> {
    let mut profile = BTreeMap::new();

    for q in PROFILING_QUESTIONS {
        let raw = answers
            .get(q.key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ValidationError::MissingProfileAnswer(q.key.to_string()))?;

        let value = if q.options.is_empty() {
            raw.to_string()
        } else {
            q.options
                .iter()
                .find(|opt| opt.eq_ignore_ascii_case(raw))
                .map(|opt| opt.to_string())
                .ok_or_else(|| ValidationError::InvalidProfileChoice {
                    key: q.key.to_string(),
                    value: raw.to_string(),
                })?
        };

        profile.insert(q.key.to_string(), value);
    }

    Ok(profile)
}

/// Renders the profile as `question: answer` lines in intake order.
pub fn profile_lines(profile: &BTreeMap<String, String>) -> String {
    PROFILING_QUESTIONS
        .iter()
        .filter_map(|q| profile.get(q.key).map(|v| format!("- {}: {}", q.question, v)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Asks the LLM for a prose description of the profile.
pub async fn describe_profile(
    llm: &LlmClient,
    profile: &BTreeMap<String, String>,
) -> Result<String, LlmError> {
    let lines = profile_lines(profile);
    let prompt = fill_template(
        PROFILE_DESCRIBE_PROMPT,
        &[
            ("profile", lines.as_str()),
            ("grounding", GROUNDING_INSTRUCTION),
        ],
    );
    let text = llm.call(&prompt, PROFILE_DESCRIBE_SYSTEM).await?;
    Ok(text.trim().to_string())
}
