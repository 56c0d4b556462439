use sqlx::SqlitePool;
use tracing::info;

use crate::auth::{Identity, require_role};
use crate::db::{catalog, topics};
use crate::error::AppError;
use crate::events::{ChangeEvent, ChangeFeed, ChangeKind, Table};
use crate::models::{ClassSummary, ManagedTopic, Role, Subject, Topic};

/// Classes, topics and per-class topic visibility.
#[derive(Clone)]
pub struct CurriculumService {
    db: SqlitePool,
    feed: ChangeFeed,
}

impl CurriculumService {
    pub fn new(db: SqlitePool, feed: ChangeFeed) -> Self {
        Self { db, feed }
    }

    pub async fn subjects(&self) -> Result<Vec<Subject>, AppError> {
        Ok(catalog::fetch_subjects(&self.db).await?)
    }

    /// Classes of the student's enrolled course; empty when not enrolled.
    pub async fn student_classes(&self, student_id: &str) -> Result<Vec<ClassSummary>, AppError> {
        match catalog::enrolled_course(&self.db, student_id).await? {
            Some(course_id) => Ok(catalog::classes_for_course(&self.db, &course_id).await?),
            None => Ok(Vec::new()),
        }
    }

    /// Topics open for booking in a class. Readable by the class tutor and by
    /// students enrolled in the class's course.
    pub async fn active_topics(&self, identity: &Identity, class_id: &str) -> Result<Vec<Topic>, AppError> {
        let class = catalog::find_class(&self.db, class_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if class.tutor_id != identity.id {
            let enrolled = catalog::enrolled_course(&self.db, &identity.id).await?;
            if enrolled.as_deref() != Some(class.course_id.as_str()) {
                return Err(AppError::Forbidden("not enrolled in this class's course".to_string()));
            }
        }

        Ok(topics::active_topics(&self.db, class_id).await?)
    }

    pub async fn tutor_classes(&self, identity: &Identity) -> Result<Vec<ClassSummary>, AppError> {
        require_role(&self.db, identity, Role::Tutor).await?;
        Ok(catalog::classes_for_tutor(&self.db, &identity.id).await?)
    }

    pub async fn managed_topics(
        &self,
        identity: &Identity,
        class_id: &str,
    ) -> Result<Vec<ManagedTopic>, AppError> {
        let class = self.owned_class(identity, class_id).await?;
        Ok(topics::managed_topics(&self.db, &class.id, &class.subject_id).await?)
    }

    pub async fn set_topic_visibility(
        &self,
        identity: &Identity,
        class_id: &str,
        topic_id: i64,
        is_active: bool,
    ) -> Result<(), AppError> {
        let class = self.owned_class(identity, class_id).await?;

        let topic = topics::find_topic(&self.db, topic_id)
            .await?
            .ok_or(AppError::NotFound)?;
        if topic.subject_id != class.subject_id {
            return Err(AppError::BadRequest("topic belongs to another subject".to_string()));
        }

        topics::upsert_visibility(&self.db, class_id, topic_id, is_active).await?;

        info!("class {} topic {} visibility set to {}", class_id, topic_id, is_active);
        self.feed.publish(ChangeEvent::new(
            Table::TopicVisibility,
            ChangeKind::Updated,
            format!("{}:{}", class_id, topic_id),
        ));

        Ok(())
    }

    async fn owned_class(&self, identity: &Identity, class_id: &str) -> Result<ClassSummary, AppError> {
        let class = catalog::find_class(&self.db, class_id)
            .await?
            .ok_or(AppError::NotFound)?;
        if class.tutor_id != identity.id {
            return Err(AppError::Forbidden("class is taught by another tutor".to_string()));
        }
        Ok(class)
    }
}
