use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{ClassSummary, Subject};

const CLASS_SUMMARY_SELECT: &str = r#"
    SELECT
        c.id,
        c.course_id,
        co.name AS course_name,
        c.subject_id,
        s.name AS subject_name,
        s.icon AS subject_icon,
        c.tutor_id,
        p.full_name AS tutor_name
    FROM classes c
    JOIN courses co ON co.id = c.course_id
    JOIN subjects s ON s.id = c.subject_id
    JOIN profiles p ON p.id = c.tutor_id
"#;

pub async fn fetch_subjects(db: &SqlitePool) -> Result<Vec<Subject>, sqlx::Error> {
    sqlx::query_as::<_, Subject>("SELECT id, name, icon FROM subjects ORDER BY name ASC")
        .fetch_all(db)
        .await
}

pub async fn insert_subject(
    db: &SqlitePool,
    name: &str,
    icon: Option<&str>,
) -> Result<Subject, sqlx::Error> {
    let id = Uuid::new_v4().to_string();

    sqlx::query("INSERT INTO subjects (id, name, icon) VALUES (?, ?, ?)")
        .bind(&id)
        .bind(name)
        .bind(icon)
        .execute(db)
        .await?;

    Ok(Subject {
        id,
        name: name.to_string(),
        icon: icon.map(str::to_string),
    })
}

pub async fn insert_course(db: &SqlitePool, name: &str) -> Result<String, sqlx::Error> {
    let id = Uuid::new_v4().to_string();

    sqlx::query("INSERT INTO courses (id, name) VALUES (?, ?)")
        .bind(&id)
        .bind(name)
        .execute(db)
        .await?;

    Ok(id)
}

/// Enrolls a student, moving them if they were already in another course.
pub async fn enroll(db: &SqlitePool, student_id: &str, course_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO enrollments (student_id, course_id) VALUES (?1, ?2)
        ON CONFLICT(student_id) DO UPDATE SET course_id = excluded.course_id
        "#,
    )
    .bind(student_id)
    .bind(course_id)
    .execute(db)
    .await?;

    Ok(())
}

pub async fn enrolled_course(db: &SqlitePool, student_id: &str) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT course_id FROM enrollments WHERE student_id = ?")
        .bind(student_id)
        .fetch_optional(db)
        .await
}

pub async fn insert_class(
    db: &SqlitePool,
    subject_id: &str,
    tutor_id: &str,
    course_id: &str,
) -> Result<String, sqlx::Error> {
    let id = Uuid::new_v4().to_string();

    sqlx::query("INSERT INTO classes (id, subject_id, tutor_id, course_id) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(subject_id)
        .bind(tutor_id)
        .bind(course_id)
        .execute(db)
        .await?;

    Ok(id)
}

pub async fn find_class(db: &SqlitePool, id: &str) -> Result<Option<ClassSummary>, sqlx::Error> {
    let sql = format!("{CLASS_SUMMARY_SELECT} WHERE c.id = ?");
    sqlx::query_as::<_, ClassSummary>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn classes_for_course(
    db: &SqlitePool,
    course_id: &str,
) -> Result<Vec<ClassSummary>, sqlx::Error> {
    let sql = format!("{CLASS_SUMMARY_SELECT} WHERE c.course_id = ? ORDER BY s.name ASC");
    sqlx::query_as::<_, ClassSummary>(&sql)
        .bind(course_id)
        .fetch_all(db)
        .await
}

pub async fn classes_for_tutor(
    db: &SqlitePool,
    tutor_id: &str,
) -> Result<Vec<ClassSummary>, sqlx::Error> {
    let sql = format!("{CLASS_SUMMARY_SELECT} WHERE c.tutor_id = ? ORDER BY co.name ASC, s.name ASC");
    sqlx::query_as::<_, ClassSummary>(&sql)
        .bind(tutor_id)
        .fetch_all(db)
        .await
}

/// The class of `course_id` in which `tutor_id` teaches `subject_id`, if any.
pub async fn class_for(
    db: &SqlitePool,
    course_id: &str,
    tutor_id: &str,
    subject_id: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT id FROM classes WHERE course_id = ? AND tutor_id = ? AND subject_id = ? LIMIT 1",
    )
    .bind(course_id)
    .bind(tutor_id)
    .bind(subject_id)
    .fetch_optional(db)
    .await
}

/// Distinct subjects taught in a course.
pub async fn subjects_for_course(
    db: &SqlitePool,
    course_id: &str,
) -> Result<Vec<Subject>, sqlx::Error> {
    sqlx::query_as::<_, Subject>(
        r#"
        SELECT DISTINCT s.id, s.name, s.icon
        FROM classes c
        JOIN subjects s ON s.id = c.subject_id
        WHERE c.course_id = ?
        ORDER BY s.name ASC
        "#,
    )
    .bind(course_id)
    .fetch_all(db)
    .await
}
