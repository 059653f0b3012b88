// Assessment LLM prompt templates.

pub const PROFILE_DESCRIBE_SYSTEM: &str = "\
You are a digital forensic readiness consultant. \
Write concise, neutral prose describing an organization from structured intake answers. \
Respond with plain text only: no headings, no lists, no markdown.";

pub const PROFILE_DESCRIBE_PROMPT: &str = r#"Describe the following organization in one paragraph of 80 to 140 words.
Cover its sector, size, IT environment, security staffing, incident history,
regulatory pressure and current forensic capability. The description is used to
match the organization to a questionnaire, so name concrete characteristics
rather than giving advice.

ORGANIZATION PROFILE:
{profile}

{grounding}"#;

pub const EVALUATION_SYSTEM: &str = "\
You are a digital forensic readiness assessor writing for the organization's management.";

pub const EVALUATION_PROMPT: &str = r#"Evaluate the organization's digital forensic readiness.

ORGANIZATION PROFILE:
{profile}

ORGANIZATION SUMMARY:
{profile_description}

QUESTION PACKAGE: {package_name}

SCORES (Likert 1-4 per enabler):
{enabler_scores}
Overall average: {overall_average}
Readiness index: {readiness_index} / 100
Maturity level: {maturity_level}
Strongest enabler: {highest}
Weakest enabler: {lowest}

ANSWERS:
{answers}

OUTPUT SCHEMA (return exactly this structure):
{
  "evaluation": "string, 2-3 paragraphs",
  "strengths": ["string"],
  "weaknesses": ["string"],
  "recommendations": ["string, concrete and prioritized"]
}

RULES:
1. Give 2-4 strengths, 2-4 weaknesses and 3-6 recommendations.
2. Recommendations must start with the weakest enabler.
3. {grounding}
4. Return ONLY the JSON object, with no code fences."#;
