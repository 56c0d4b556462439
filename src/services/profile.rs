use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::auth::Identity;
use crate::db::profiles;
use crate::error::AppError;
use crate::models::{Profile, ProfileUpdate};

#[derive(Clone)]
pub struct ProfileService {
    db: SqlitePool,
}

impl ProfileService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn me(&self, identity: &Identity) -> Result<Profile, AppError> {
        profiles::find_profile(&self.db, &identity.id)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Saves the caller's bio, phone and role-specific field. A student may
    /// not set a specialty and a tutor may not set special needs.
    pub async fn update(&self, identity: &Identity, update: ProfileUpdate) -> Result<Profile, AppError> {
        let profile = self.me(identity).await?;
        let update = update.normalized();

        if let Some(field) = update.foreign_field(profile.role) {
            warn!("{} tried to set {} on a {:?} profile", identity.id, field, profile.role);
            return Err(AppError::BadRequest(format!(
                "{} is not part of a {:?} profile",
                field, profile.role
            ).to_lowercase()));
        }

        if !profiles::update_profile(&self.db, &identity.id, &update, Utc::now()).await? {
            return Err(AppError::NotFound);
        }
        info!("profile {} updated", identity.id);

        self.me(identity).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{memory_pool, profiles::insert_profile};
    use crate::models::Role;

    #[tokio::test]
    async fn test_update_keeps_role_fields_apart() {
        let pool = memory_pool().await.expect("Failed to create test db");
        let tutor = insert_profile(&pool, "Marta Ríos", None, Role::Tutor).await.unwrap();
        let student = insert_profile(&pool, "Pedro Soto", None, Role::Student).await.unwrap();
        let service = ProfileService::new(pool);
        let as_tutor = Identity::new(&tutor.id, None);
        let as_student = Identity::new(&student.id, None);

        let saved = service
            .update(
                &as_tutor,
                ProfileUpdate {
                    bio: Some(" Profesora de física ".to_string()),
                    specialty: Some("Mecánica".to_string()),
                    ..ProfileUpdate::default()
                },
            )
            .await
            .expect("tutor update failed");
        assert_eq!(saved.bio.as_deref(), Some("Profesora de física"));
        assert_eq!(saved.specialty.as_deref(), Some("Mecánica"));

        let tutor_nee = service
            .update(
                &as_tutor,
                ProfileUpdate {
                    nee: Some("TDAH".to_string()),
                    ..ProfileUpdate::default()
                },
            )
            .await;
        assert!(matches!(tutor_nee, Err(AppError::BadRequest(_))));
        assert_eq!(service.me(&as_tutor).await.unwrap().specialty.as_deref(), Some("Mecánica"));

        let student_specialty = service
            .update(
                &as_student,
                ProfileUpdate {
                    specialty: Some("Química".to_string()),
                    ..ProfileUpdate::default()
                },
            )
            .await;
        assert!(matches!(student_specialty, Err(AppError::BadRequest(_))));

        // Blank role field from the other role is ignored, not rejected.
        let saved = service
            .update(
                &as_student,
                ProfileUpdate {
                    nee: Some("TDAH".to_string()),
                    specialty: Some("  ".to_string()),
                    ..ProfileUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(saved.nee.as_deref(), Some("TDAH"));
        assert_eq!(saved.specialty, None);
    }

    #[tokio::test]
    async fn test_missing_profile_is_not_found() {
        let pool = memory_pool().await.expect("Failed to create test db");
        let service = ProfileService::new(pool);
        let ghost = Identity::new("ghost", None);

        assert!(matches!(service.me(&ghost).await, Err(AppError::NotFound)));
        let update = service.update(&ghost, ProfileUpdate::default()).await;
        assert!(matches!(update, Err(AppError::NotFound)));
    }
}
