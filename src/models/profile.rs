use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Student,
    Tutor,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: String,
    pub full_name: String,
    pub email: Option<String>,
    pub role: Role,
    pub bio: Option<String>,
    pub phone: Option<String>,
    /// Special educational needs, only kept for students.
    pub nee: Option<String>,
    /// Only kept for tutors.
    pub specialty: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// The self-editable part of a profile. Absent and blank fields clear the
/// stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub nee: Option<String>,
    #[serde(default)]
    pub specialty: Option<String>,
}

impl ProfileUpdate {
    /// Trims every field and turns blank ones into `None`.
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            bio: clean(self.bio),
            phone: clean(self.phone),
            nee: clean(self.nee),
            specialty: clean(self.specialty),
        }
    }

    /// Name of a field the role may not carry, if one is filled in.
    pub fn foreign_field(&self, role: Role) -> Option<&'static str> {
        match role {
            Role::Student if self.specialty.is_some() => Some("specialty"),
            Role::Tutor if self.nee.is_some() => Some("nee"),
            _ => None,
        }
    }
}
