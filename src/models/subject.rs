use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
}

/// A class joined with the names a picker needs to show it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ClassSummary {
    pub id: String,
    pub course_id: String,
    pub course_name: String,
    pub subject_id: String,
    pub subject_name: String,
    pub subject_icon: Option<String>,
    pub tutor_id: String,
    pub tutor_name: String,
}
