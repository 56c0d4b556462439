use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::models::{Appointment, AppointmentDetail, AppointmentStatus};

const APPOINTMENT_COLUMNS: &str =
    "id, student_id, tutor_id, slot_id, topic_id, subject_id, topic, status, created_at, updated_at";

pub async fn insert_appointment<'e, E>(db: E, appointment: &Appointment) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO appointments
            (id, student_id, tutor_id, slot_id, topic_id, subject_id, topic,
            status, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&appointment.id)
    .bind(&appointment.student_id)
    .bind(&appointment.tutor_id)
    .bind(&appointment.slot_id)
    .bind(appointment.topic_id)
    .bind(&appointment.subject_id)
    .bind(&appointment.topic)
    .bind(appointment.status)
    .bind(appointment.created_at)
    .bind(appointment.updated_at)
    .execute(db)
    .await?;

    Ok(())
}

pub async fn find_appointment<'e, E>(db: E, id: &str) -> Result<Option<Appointment>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ?");
    sqlx::query_as::<_, Appointment>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
}

/// Moves an appointment from `from` to `to`. Returns false if it was not in `from`.
pub async fn transition_status<'e, E>(
    db: E,
    id: &str,
    from: AppointmentStatus,
    to: AppointmentStatus,
    now: DateTime<Utc>,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let affected = sqlx::query(
        "UPDATE appointments SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
    )
    .bind(to)
    .bind(now)
    .bind(id)
    .bind(from)
    .execute(db)
    .await?
    .rows_affected();

    Ok(affected > 0)
}

pub async fn scheduled_for_student(
    db: &SqlitePool,
    student_id: &str,
) -> Result<Vec<AppointmentDetail>, sqlx::Error> {
    sqlx::query_as::<_, AppointmentDetail>(
        r#"
        SELECT a.id, a.student_id, a.tutor_id, a.slot_id, a.topic, a.status,
            p.full_name AS counterpart_name, s.start_time
        FROM appointments a
        JOIN profiles p ON p.id = a.tutor_id
        JOIN availability_slots s ON s.id = a.slot_id
        WHERE a.student_id = ? AND a.status = 'scheduled'
        ORDER BY s.start_time ASC
        "#,
    )
    .bind(student_id)
    .fetch_all(db)
    .await
}

/// The student's most recently booked scheduled appointment.
pub async fn next_for_student(
    db: &SqlitePool,
    student_id: &str,
) -> Result<Option<AppointmentDetail>, sqlx::Error> {
    sqlx::query_as::<_, AppointmentDetail>(
        r#"
        SELECT a.id, a.student_id, a.tutor_id, a.slot_id, a.topic, a.status,
            p.full_name AS counterpart_name, s.start_time
        FROM appointments a
        JOIN profiles p ON p.id = a.tutor_id
        JOIN availability_slots s ON s.id = a.slot_id
        WHERE a.student_id = ? AND a.status = 'scheduled'
        ORDER BY a.created_at DESC
        LIMIT 1
        "#,
    )
    .bind(student_id)
    .fetch_optional(db)
    .await
}

pub async fn scheduled_for_tutor(
    db: &SqlitePool,
    tutor_id: &str,
) -> Result<Vec<AppointmentDetail>, sqlx::Error> {
    sqlx::query_as::<_, AppointmentDetail>(
        r#"
        SELECT a.id, a.student_id, a.tutor_id, a.slot_id, a.topic, a.status,
            p.full_name AS counterpart_name, s.start_time
        FROM appointments a
        JOIN profiles p ON p.id = a.student_id
        JOIN availability_slots s ON s.id = a.slot_id
        WHERE a.tutor_id = ? AND a.status = 'scheduled'
        ORDER BY s.start_time ASC
        "#,
    )
    .bind(tutor_id)
    .fetch_all(db)
    .await
}
