use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{Profile, ProfileUpdate, Role};

const PROFILE_COLUMNS: &str =
    "id, full_name, email, role, bio, phone, nee, specialty, updated_at";

pub async fn insert_profile(
    db: &SqlitePool,
    full_name: &str,
    email: Option<&str>,
    role: Role,
) -> Result<Profile, sqlx::Error> {
    let id = Uuid::new_v4().to_string();

    sqlx::query("INSERT INTO profiles (id, full_name, email, role) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(full_name)
        .bind(email)
        .bind(role)
        .execute(db)
        .await?;

    Ok(Profile {
        id,
        full_name: full_name.to_string(),
        email: email.map(str::to_string),
        role,
        bio: None,
        phone: None,
        nee: None,
        specialty: None,
        updated_at: None,
    })
}

pub async fn find_profile(db: &SqlitePool, id: &str) -> Result<Option<Profile>, sqlx::Error> {
    let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?");
    sqlx::query_as::<_, Profile>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
}

/// Overwrites the editable fields. Returns false when no such profile exists.
pub async fn update_profile(
    db: &SqlitePool,
    id: &str,
    update: &ProfileUpdate,
    now: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let affected = sqlx::query(
        r#"
        UPDATE profiles
        SET bio = ?1, phone = ?2, nee = ?3, specialty = ?4, updated_at = ?5
        WHERE id = ?6
        "#,
    )
    .bind(&update.bio)
    .bind(&update.phone)
    .bind(&update.nee)
    .bind(&update.specialty)
    .bind(now)
    .bind(id)
    .execute(db)
    .await?
    .rows_affected();

    Ok(affected > 0)
}
