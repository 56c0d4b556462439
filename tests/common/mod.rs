#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use sqlx::SqlitePool;

use tutor_desk::auth::Identity;
use tutor_desk::db::{catalog, memory_pool, profiles, slots, topics};
use tutor_desk::events::ChangeFeed;
use tutor_desk::models::{AvailabilitySlot, Profile, ReserveRequest, Role, Subject, Topic};
use tutor_desk::services::{AvailabilityService, BookingService, CurriculumService};
use tutor_desk::session::{Backend, StoreBackend};

/// One course with one class ("Matemáticas", four topics, the first two
/// switched on), a tutor and two enrolled students.
pub struct Campus {
    pub pool: SqlitePool,
    pub feed: ChangeFeed,
    pub tutor: Profile,
    pub student: Profile,
    pub other_student: Profile,
    pub subject: Subject,
    pub course_id: String,
    pub class_id: String,
    pub topics: Vec<Topic>,
}

impl Campus {
    pub async fn new() -> Self {
        let pool = memory_pool().await.expect("Failed to create test db");

        let tutor = profiles::insert_profile(&pool, "Laura Méndez", Some("laura@example.com"), Role::Tutor)
            .await
            .unwrap();
        let student = profiles::insert_profile(&pool, "Mateo Ruiz", Some("mateo@example.com"), Role::Student)
            .await
            .unwrap();
        let other_student = profiles::insert_profile(&pool, "Valentina Gil", None, Role::Student)
            .await
            .unwrap();

        let subject = catalog::insert_subject(&pool, "Matemáticas", Some("📐")).await.unwrap();
        let course_id = catalog::insert_course(&pool, "3°A").await.unwrap();
        let class_id = catalog::insert_class(&pool, &subject.id, &tutor.id, &course_id)
            .await
            .unwrap();
        catalog::enroll(&pool, &student.id, &course_id).await.unwrap();
        catalog::enroll(&pool, &other_student.id, &course_id).await.unwrap();

        let mut all = Vec::new();
        for (unit, name) in [(1, "Fracciones"), (1, "Decimales"), (2, "Ecuaciones"), (3, "Funciones")] {
            all.push(topics::insert_topic(&pool, &subject.id, unit, name).await.unwrap());
        }
        topics::upsert_visibility(&pool, &class_id, all[0].id, true).await.unwrap();
        topics::upsert_visibility(&pool, &class_id, all[1].id, true).await.unwrap();

        Self {
            pool,
            feed: ChangeFeed::new(),
            tutor,
            student,
            other_student,
            subject,
            course_id,
            class_id,
            topics: all,
        }
    }

    pub fn booking(&self) -> BookingService {
        BookingService::new(self.pool.clone(), self.feed.clone())
    }

    pub fn availability(&self) -> AvailabilityService {
        AvailabilityService::new(self.pool.clone(), self.feed.clone(), 60)
    }

    pub fn curriculum(&self) -> CurriculumService {
        CurriculumService::new(self.pool.clone(), self.feed.clone())
    }

    pub fn as_student(&self) -> Identity {
        Identity::new(&self.student.id, self.student.email.clone())
    }

    pub fn as_other_student(&self) -> Identity {
        Identity::new(&self.other_student.id, None)
    }

    pub fn as_tutor(&self) -> Identity {
        Identity::new(&self.tutor.id, self.tutor.email.clone())
    }

    pub fn backend_for(&self, identity: Identity) -> Arc<dyn Backend> {
        Arc::new(StoreBackend::new(
            identity,
            self.curriculum(),
            self.availability(),
            self.booking(),
        ))
    }

    /// Unbooked slot of the tutor starting `hours` from now.
    pub async fn slot_in(&self, hours: i64) -> AvailabilitySlot {
        let start = Utc::now() + Duration::hours(hours);
        slots::insert_slot(&self.pool, &self.tutor.id, start, start + Duration::hours(1))
            .await
            .unwrap()
    }

    pub fn request_for(&self, slot: &AvailabilitySlot, topic: &Topic) -> ReserveRequest {
        ReserveRequest {
            tutor_id: self.tutor.id.clone(),
            slot_id: slot.id.clone(),
            topic: String::new(),
            topic_id: Some(topic.id),
            subject_id: Some(self.subject.id.clone()),
        }
    }
}
