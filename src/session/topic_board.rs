use std::sync::Arc;

use tracing::info;

use crate::error::AppError;
use crate::models::ManagedTopic;
use crate::session::backend::Backend;
use crate::session::optimistic::{Reversible, apply_optimistically};

/// Flips one topic's visibility in a local list.
struct ToggleTopic {
    topic_id: i64,
}

impl ToggleTopic {
    fn flip(&self, topics: &mut [ManagedTopic]) {
        if let Some(topic) = topics.iter_mut().find(|t| t.id == self.topic_id) {
            topic.is_active = !topic.is_active;
        }
    }
}

impl Reversible<Vec<ManagedTopic>> for ToggleTopic {
    fn apply(&self, target: &mut Vec<ManagedTopic>) {
        self.flip(target);
    }

    fn revert(&self, target: &mut Vec<ManagedTopic>) {
        self.flip(target);
    }
}

/// Tutor view of one class's topics.
pub struct TopicBoard {
    backend: Arc<dyn Backend>,
    class_id: Option<String>,
    topics: Vec<ManagedTopic>,
}

impl TopicBoard {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            class_id: None,
            topics: Vec::new(),
        }
    }

    pub fn topics(&self) -> &[ManagedTopic] {
        &self.topics
    }

    pub fn class_id(&self) -> Option<&str> {
        self.class_id.as_deref()
    }

    pub async fn load(&mut self, class_id: &str) -> Result<(), AppError> {
        let topics = self.backend.managed_topics(class_id).await?;
        self.class_id = Some(class_id.to_string());
        self.topics = topics;
        Ok(())
    }

    /// Flips the topic on screen right away and undoes it if saving fails.
    /// Returns the new visibility.
    pub async fn toggle(&mut self, topic_id: i64) -> Result<bool, AppError> {
        let class_id = self
            .class_id
            .clone()
            .ok_or_else(|| AppError::BadRequest("no class selected".to_string()))?;
        let current = self
            .topics
            .iter()
            .find(|t| t.id == topic_id)
            .map(|t| t.is_active)
            .ok_or(AppError::NotFound)?;
        let target = !current;

        let write = self.backend.set_topic_visibility(&class_id, topic_id, target);
        apply_optimistically(&mut self.topics, &ToggleTopic { topic_id }, write).await?;

        info!("topic {} in class {} is now {}", topic_id, class_id, if target { "active" } else { "hidden" });
        Ok(target)
    }
}
