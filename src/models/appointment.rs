use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Appointment {
    pub id: String,
    pub student_id: String,
    pub tutor_id: String,
    pub slot_id: String,
    pub topic_id: Option<i64>,
    pub subject_id: Option<String>,
    pub topic: String,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveRequest {
    pub tutor_id: String,
    pub slot_id: String,
    /// Free-text label; derived from the topic name when left empty.
    #[serde(default)]
    pub topic: String,
    pub topic_id: Option<i64>,
    pub subject_id: Option<String>,
}

/// Appointment joined with the other party's name and the slot start.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AppointmentDetail {
    pub id: String,
    pub student_id: String,
    pub tutor_id: String,
    pub slot_id: String,
    pub topic: String,
    pub status: AppointmentStatus,
    pub counterpart_name: String,
    pub start_time: DateTime<Utc>,
}
