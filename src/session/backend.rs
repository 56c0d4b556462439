use async_trait::async_trait;
use chrono::Utc;

use crate::auth::Identity;
use crate::error::AppError;
use crate::models::{
    Appointment, AvailabilitySlot, ClassSummary, ManagedTopic, ReserveRequest, Topic,
};
use crate::services::{AvailabilityService, BookingService, CurriculumService};

/// Everything a signed-in user's session reads and writes.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn enrolled_classes(&self) -> Result<Vec<ClassSummary>, AppError>;
    async fn active_topics(&self, class_id: &str) -> Result<Vec<Topic>, AppError>;
    async fn open_slots(&self, tutor_id: &str) -> Result<Vec<AvailabilitySlot>, AppError>;
    async fn reserve(&self, req: ReserveRequest) -> Result<Appointment, AppError>;
    async fn cancel(&self, appointment_id: &str) -> Result<Appointment, AppError>;
    async fn complete(&self, appointment_id: &str) -> Result<Appointment, AppError>;
    async fn managed_topics(&self, class_id: &str) -> Result<Vec<ManagedTopic>, AppError>;
    async fn set_topic_visibility(
        &self,
        class_id: &str,
        topic_id: i64,
        is_active: bool,
    ) -> Result<(), AppError>;
}

/// [`Backend`] over the local services, acting as one identity.
pub struct StoreBackend {
    identity: Identity,
    curriculum: CurriculumService,
    availability: AvailabilityService,
    booking: BookingService,
}

impl StoreBackend {
    pub fn new(
        identity: Identity,
        curriculum: CurriculumService,
        availability: AvailabilityService,
        booking: BookingService,
    ) -> Self {
        Self {
            identity,
            curriculum,
            availability,
            booking,
        }
    }
}

#[async_trait]
impl Backend for StoreBackend {
    async fn enrolled_classes(&self) -> Result<Vec<ClassSummary>, AppError> {
        self.curriculum.student_classes(&self.identity.id).await
    }

    async fn active_topics(&self, class_id: &str) -> Result<Vec<Topic>, AppError> {
        self.curriculum.active_topics(&self.identity, class_id).await
    }

    async fn open_slots(&self, tutor_id: &str) -> Result<Vec<AvailabilitySlot>, AppError> {
        self.availability.open_slots(tutor_id, Utc::now()).await
    }

    async fn reserve(&self, req: ReserveRequest) -> Result<Appointment, AppError> {
        self.booking.reserve(&self.identity, req).await
    }

    async fn cancel(&self, appointment_id: &str) -> Result<Appointment, AppError> {
        self.booking.cancel(&self.identity, appointment_id).await
    }

    async fn complete(&self, appointment_id: &str) -> Result<Appointment, AppError> {
        self.booking.complete(&self.identity, appointment_id).await
    }

    async fn managed_topics(&self, class_id: &str) -> Result<Vec<ManagedTopic>, AppError> {
        self.curriculum.managed_topics(&self.identity, class_id).await
    }

    async fn set_topic_visibility(
        &self,
        class_id: &str,
        topic_id: i64,
        is_active: bool,
    ) -> Result<(), AppError> {
        self.curriculum
            .set_topic_visibility(&self.identity, class_id, topic_id, is_active)
            .await
    }
}
