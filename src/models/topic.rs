use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Topic {
    pub id: i64,
    pub subject_id: String,
    pub unit_number: i64,
    pub name: String,
}

/// A topic as the class tutor sees it, with its effective visibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagedTopic {
    pub id: i64,
    pub unit_number: i64,
    pub name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisibilityRequest {
    pub is_active: bool,
}

/// Topics are hidden from a class until its tutor switches them on,
/// so a missing visibility row counts as inactive.
pub fn resolve_visibility(flag: Option<bool>) -> bool {
    flag.unwrap_or(false)
}
