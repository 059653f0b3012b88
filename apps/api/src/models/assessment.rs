use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssessmentSessionRow {
    pub id: Uuid,
    pub session_id: String,
    pub user_id: Option<Uuid>,
    pub status: String,
    pub current_level: Option<String>,
    pub package_id: Option<String>,
    pub answers: Value,
    pub final_result: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
