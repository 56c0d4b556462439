use std::collections::HashMap;

use sqlx::SqlitePool;

use crate::models::{ManagedTopic, Topic, resolve_visibility};

pub async fn insert_topic(
    db: &SqlitePool,
    subject_id: &str,
    unit_number: i64,
    name: &str,
) -> Result<Topic, sqlx::Error> {
    let id = sqlx::query("INSERT INTO topics (subject_id, unit_number, name) VALUES (?, ?, ?)")
        .bind(subject_id)
        .bind(unit_number)
        .bind(name)
        .execute(db)
        .await?
        .last_insert_rowid();

    Ok(Topic {
        id,
        subject_id: subject_id.to_string(),
        unit_number,
        name: name.to_string(),
    })
}

pub async fn find_topic(db: &SqlitePool, id: i64) -> Result<Option<Topic>, sqlx::Error> {
    sqlx::query_as::<_, Topic>("SELECT id, subject_id, unit_number, name FROM topics WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn topics_for_subject(db: &SqlitePool, subject_id: &str) -> Result<Vec<Topic>, sqlx::Error> {
    sqlx::query_as::<_, Topic>(
        r#"
        SELECT id, subject_id, unit_number, name
        FROM topics
        WHERE subject_id = ?
        ORDER BY unit_number ASC, id ASC
        "#,
    )
    .bind(subject_id)
    .fetch_all(db)
    .await
}

pub async fn count_topics(db: &SqlitePool, subject_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM topics WHERE subject_id = ?")
        .bind(subject_id)
        .fetch_one(db)
        .await
}

/// Raw visibility row for one (class, topic) pair. `None` means no row exists.
pub async fn visibility_flag(
    db: &SqlitePool,
    class_id: &str,
    topic_id: i64,
) -> Result<Option<bool>, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT is_active FROM class_topic_visibility WHERE class_id = ? AND topic_id = ?",
    )
    .bind(class_id)
    .bind(topic_id)
    .fetch_optional(db)
    .await
}

pub async fn visibility_for_class(
    db: &SqlitePool,
    class_id: &str,
) -> Result<HashMap<i64, bool>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (i64, bool)>(
        "SELECT topic_id, is_active FROM class_topic_visibility WHERE class_id = ?",
    )
    .bind(class_id)
    .fetch_all(db)
    .await?;

    Ok(rows.into_iter().collect())
}

pub async fn upsert_visibility(
    db: &SqlitePool,
    class_id: &str,
    topic_id: i64,
    is_active: bool,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO class_topic_visibility (class_id, topic_id, is_active)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(class_id, topic_id) DO UPDATE SET is_active = excluded.is_active
        "#,
    )
    .bind(class_id)
    .bind(topic_id)
    .bind(is_active)
    .execute(db)
    .await?;

    Ok(())
}

/// Every topic of the class's subject, merged with its visibility rows.
pub async fn managed_topics(
    db: &SqlitePool,
    class_id: &str,
    subject_id: &str,
) -> Result<Vec<ManagedTopic>, sqlx::Error> {
    let topics = topics_for_subject(db, subject_id).await?;
    let visibility = visibility_for_class(db, class_id).await?;

    Ok(topics
        .into_iter()
        .map(|topic| ManagedTopic {
            is_active: resolve_visibility(visibility.get(&topic.id).copied()),
            id: topic.id,
            unit_number: topic.unit_number,
            name: topic.name,
        })
        .collect())
}

/// Topics students of the class may book.
pub async fn active_topics(db: &SqlitePool, class_id: &str) -> Result<Vec<Topic>, sqlx::Error> {
    sqlx::query_as::<_, Topic>(
        r#"
        SELECT t.id, t.subject_id, t.unit_number, t.name
        FROM classes c
        JOIN topics t ON t.subject_id = c.subject_id
        JOIN class_topic_visibility v ON v.class_id = c.id AND v.topic_id = t.id
        WHERE c.id = ? AND v.is_active = 1
        ORDER BY t.unit_number ASC, t.id ASC
        "#,
    )
    .bind(class_id)
    .fetch_all(db)
    .await
}
