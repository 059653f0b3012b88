use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PackageRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuestionRow {
    pub id: String,
    pub package_id: String,
    pub position: i32,
    pub enabler: String,
    pub indicator: String,
    pub question_text: String,
    pub kind: String,
    pub contribution_max: f64,
    pub options: Value,
}
