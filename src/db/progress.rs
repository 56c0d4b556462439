use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::models::StudentProgress;

/// Records a completed topic. A row that already exists is left untouched;
/// the return value tells whether a new row was written.
pub async fn record_progress<'e, E>(
    db: E,
    student_id: &str,
    topic_id: i64,
    subject_id: &str,
    completed_at: DateTime<Utc>,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let affected = sqlx::query(
        r#"
        INSERT INTO student_progress (student_id, topic_id, subject_id, completed_at)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT(student_id, topic_id) DO NOTHING
        "#,
    )
    .bind(student_id)
    .bind(topic_id)
    .bind(subject_id)
    .bind(completed_at)
    .execute(db)
    .await?
    .rows_affected();

    Ok(affected > 0)
}

/// Completed topics that still belong to the subject.
pub async fn count_completed(
    db: &SqlitePool,
    student_id: &str,
    subject_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM student_progress sp
        JOIN topics t ON t.id = sp.topic_id
        WHERE sp.student_id = ? AND t.subject_id = ?
        "#,
    )
    .bind(student_id)
    .bind(subject_id)
    .fetch_one(db)
    .await
}

pub async fn progress_for_student(
    db: &SqlitePool,
    student_id: &str,
) -> Result<Vec<StudentProgress>, sqlx::Error> {
    sqlx::query_as::<_, StudentProgress>(
        r#"
        SELECT student_id, topic_id, subject_id, completed_at
        FROM student_progress
        WHERE student_id = ?
        ORDER BY completed_at ASC, topic_id ASC
        "#,
    )
    .bind(student_id)
    .fetch_all(db)
    .await
}
