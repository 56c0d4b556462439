use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StudentProgress {
    pub student_id: String,
    pub topic_id: i64,
    pub subject_id: String,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectProgress {
    pub subject_id: String,
    pub name: String,
    pub total_topics: i64,
    pub completed_topics: i64,
    pub percentage: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub subjects: Vec<SubjectProgress>,
    pub overall_percentage: u32,
}
