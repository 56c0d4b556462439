use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{Identity, require_role};
use crate::db::{appointments, catalog, profiles, progress, slots, topics};
use crate::error::{AppError, is_unique_violation};
use crate::events::{ChangeEvent, ChangeFeed, ChangeKind, Table};
use crate::models::{
    Appointment, AppointmentDetail, AppointmentStatus, ReserveRequest, Role, resolve_visibility,
};

const SLOT_TAKEN: &str = "slot is no longer available";

/// Reservation transaction: every write pair commits or rolls back together.
#[derive(Clone)]
pub struct BookingService {
    db: SqlitePool,
    feed: ChangeFeed,
}

impl BookingService {
    pub fn new(db: SqlitePool, feed: ChangeFeed) -> Self {
        Self { db, feed }
    }

    pub async fn reserve(
        &self,
        identity: &Identity,
        req: ReserveRequest,
    ) -> Result<Appointment, AppError> {
        require_role(&self.db, identity, Role::Student).await?;

        let (label, subject_id) = self.resolve_topic(identity, &req).await?;
        let now = Utc::now();

        let appointment = Appointment {
            id: Uuid::new_v4().to_string(),
            student_id: identity.id.clone(),
            tutor_id: req.tutor_id.clone(),
            slot_id: req.slot_id.clone(),
            topic_id: req.topic_id,
            subject_id,
            topic: label,
            status: AppointmentStatus::Scheduled,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.db.begin().await?;

        if !slots::claim_slot(&mut *tx, &req.slot_id, &req.tutor_id, now).await? {
            let existing = slots::find_slot(&mut *tx, &req.slot_id).await?;
            tx.rollback().await?;
            return match existing {
                Some(slot) if slot.tutor_id == req.tutor_id => {
                    warn!("slot {} could not be claimed by {}", req.slot_id, identity.id);
                    Err(AppError::Conflict(SLOT_TAKEN.to_string()))
                }
                _ => Err(AppError::NotFound),
            };
        }

        if let Err(e) = appointments::insert_appointment(&mut *tx, &appointment).await {
            tx.rollback().await?;
            if is_unique_violation(&e) {
                warn!("slot {} already has a scheduled appointment", req.slot_id);
                return Err(AppError::Conflict(SLOT_TAKEN.to_string()));
            }
            return Err(e.into());
        }

        tx.commit().await?;

        info!(
            "appointment {} booked: student {} with tutor {} on slot {}",
            appointment.id, appointment.student_id, appointment.tutor_id, appointment.slot_id
        );
        self.feed.publish(ChangeEvent::new(Table::Appointments, ChangeKind::Created, &appointment.id));
        self.feed.publish(ChangeEvent::new(Table::AvailabilitySlots, ChangeKind::Updated, &appointment.slot_id));

        Ok(appointment)
    }

    /// Works out the stored label and subject, enforcing that a chosen topic
    /// is switched on for the student's class with this tutor.
    async fn resolve_topic(
        &self,
        identity: &Identity,
        req: &ReserveRequest,
    ) -> Result<(String, Option<String>), AppError> {
        let label = req.topic.trim().to_string();

        let Some(topic_id) = req.topic_id else {
            if label.is_empty() {
                return Err(AppError::BadRequest("a topic or topic label is required".to_string()));
            }
            return Ok((label, req.subject_id.clone()));
        };

        let topic = topics::find_topic(&self.db, topic_id)
            .await?
            .ok_or_else(|| AppError::BadRequest(format!("topic {} does not exist", topic_id)))?;

        if let Some(subject_id) = &req.subject_id {
            if subject_id != &topic.subject_id {
                return Err(AppError::BadRequest("topic does not belong to the subject".to_string()));
            }
        }

        let course_id = catalog::enrolled_course(&self.db, &identity.id)
            .await?
            .ok_or_else(|| AppError::BadRequest("student is not enrolled in a course".to_string()))?;

        let class_id = catalog::class_for(&self.db, &course_id, &req.tutor_id, &topic.subject_id)
            .await?
            .ok_or_else(|| AppError::BadRequest("tutor does not teach this subject in your course".to_string()))?;

        let visible = resolve_visibility(topics::visibility_flag(&self.db, &class_id, topic_id).await?);
        if !visible {
            return Err(AppError::BadRequest("topic is not open for booking".to_string()));
        }

        let label = if label.is_empty() { topic.name } else { label };
        Ok((label, Some(topic.subject_id)))
    }

    /// Cancels a scheduled appointment and frees its slot.
    pub async fn cancel(
        &self,
        identity: &Identity,
        appointment_id: &str,
    ) -> Result<Appointment, AppError> {
        let appointment = appointments::find_appointment(&self.db, appointment_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if identity.id != appointment.student_id && identity.id != appointment.tutor_id {
            return Err(AppError::Forbidden("not your appointment".to_string()));
        }

        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        let moved = appointments::transition_status(
            &mut *tx,
            appointment_id,
            AppointmentStatus::Scheduled,
            AppointmentStatus::Cancelled,
            now,
        )
        .await?;
        if !moved {
            tx.rollback().await?;
            return Err(AppError::Conflict(format!(
                "appointment is {:?}, only scheduled ones can be cancelled",
                appointment.status
            ).to_lowercase()));
        }

        slots::release_slot(&mut *tx, &appointment.slot_id).await?;
        tx.commit().await?;

        info!("appointment {} cancelled by {}", appointment_id, identity.id);
        self.feed.publish(ChangeEvent::new(Table::Appointments, ChangeKind::Updated, appointment_id));
        self.feed.publish(ChangeEvent::new(Table::AvailabilitySlots, ChangeKind::Updated, &appointment.slot_id));

        Ok(Appointment {
            status: AppointmentStatus::Cancelled,
            updated_at: now,
            ..appointment
        })
    }

    /// Marks an appointment completed and records the topic as done.
    /// Completing twice is harmless.
    pub async fn complete(
        &self,
        identity: &Identity,
        appointment_id: &str,
    ) -> Result<Appointment, AppError> {
        let appointment = appointments::find_appointment(&self.db, appointment_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if identity.id != appointment.tutor_id {
            return Err(AppError::Forbidden("only the appointment's tutor can complete it".to_string()));
        }
        if appointment.status == AppointmentStatus::Cancelled {
            return Err(AppError::Conflict("a cancelled appointment cannot be completed".to_string()));
        }

        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        let moved = appointments::transition_status(
            &mut *tx,
            appointment_id,
            AppointmentStatus::Scheduled,
            AppointmentStatus::Completed,
            now,
        )
        .await?;
        if !moved {
            let current = appointments::find_appointment(&mut *tx, appointment_id)
                .await?
                .map(|a| a.status);
            if current != Some(AppointmentStatus::Completed) {
                tx.rollback().await?;
                return Err(AppError::Conflict("appointment is no longer scheduled".to_string()));
            }
        }

        let recorded = match (appointment.topic_id, &appointment.subject_id) {
            (Some(topic_id), Some(subject_id)) => {
                progress::record_progress(&mut *tx, &appointment.student_id, topic_id, subject_id, now)
                    .await?
            }
            _ => false,
        };

        tx.commit().await?;

        info!("appointment {} completed (new progress row: {})", appointment_id, recorded);
        self.feed.publish(ChangeEvent::new(Table::Appointments, ChangeKind::Updated, appointment_id));
        if recorded {
            self.feed.publish(ChangeEvent::new(
                Table::StudentProgress,
                ChangeKind::Created,
                &appointment.student_id,
            ));
        }

        let updated_at = if moved { now } else { appointment.updated_at };
        Ok(Appointment {
            status: AppointmentStatus::Completed,
            updated_at,
            ..appointment
        })
    }

    /// Scheduled appointments of the caller, whichever side of them they are on.
    pub async fn upcoming(&self, identity: &Identity) -> Result<Vec<AppointmentDetail>, AppError> {
        let profile = profiles::find_profile(&self.db, &identity.id)
            .await?
            .ok_or_else(|| AppError::Forbidden("no profile for this account".to_string()))?;

        let list = match profile.role {
            Role::Student => appointments::scheduled_for_student(&self.db, &identity.id).await?,
            Role::Tutor => appointments::scheduled_for_tutor(&self.db, &identity.id).await?,
        };
        Ok(list)
    }

    pub async fn next_for_student(
        &self,
        identity: &Identity,
    ) -> Result<Option<AppointmentDetail>, AppError> {
        require_role(&self.db, identity, Role::Student).await?;
        Ok(appointments::next_for_student(&self.db, &identity.id).await?)
    }
}
