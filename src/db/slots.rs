use chrono::{DateTime, SubsecRound, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::models::AvailabilitySlot;

const SLOT_COLUMNS: &str = "id, tutor_id, start_time, end_time, is_booked";

/// Inserts an unbooked slot. Times are stored at whole-second precision so
/// the textual timestamps compare in chronological order.
pub async fn insert_slot<'e, E>(
    db: E,
    tutor_id: &str,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
) -> Result<AvailabilitySlot, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let id = Uuid::new_v4().to_string();
    let start_time = start_time.trunc_subsecs(0);
    let end_time = end_time.trunc_subsecs(0);

    sqlx::query(
        r#"
        INSERT INTO availability_slots (id, tutor_id, start_time, end_time, is_booked)
        VALUES (?1, ?2, ?3, ?4, 0)
        "#,
    )
    .bind(&id)
    .bind(tutor_id)
    .bind(start_time)
    .bind(end_time)
    .execute(db)
    .await?;

    Ok(AvailabilitySlot {
        id,
        tutor_id: tutor_id.to_string(),
        start_time,
        end_time,
        is_booked: false,
    })
}

pub async fn find_slot<'e, E>(db: E, id: &str) -> Result<Option<AvailabilitySlot>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {SLOT_COLUMNS} FROM availability_slots WHERE id = ?");
    sqlx::query_as::<_, AvailabilitySlot>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
}

/// Unbooked slots of a tutor starting strictly after `now`, earliest first.
pub async fn list_open_slots(
    db: &SqlitePool,
    tutor_id: &str,
    now: DateTime<Utc>,
) -> Result<Vec<AvailabilitySlot>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {SLOT_COLUMNS}
        FROM availability_slots
        WHERE tutor_id = ? AND is_booked = 0 AND start_time > ?
        ORDER BY start_time ASC
        "#
    );
    sqlx::query_as::<_, AvailabilitySlot>(&sql)
        .bind(tutor_id)
        .bind(now)
        .fetch_all(db)
        .await
}

/// Marks a slot booked if it belongs to `tutor_id`, is still free and has not
/// started yet. Returns false when any of those no longer holds.
pub async fn claim_slot<'e, E>(
    db: E,
    slot_id: &str,
    tutor_id: &str,
    now: DateTime<Utc>,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let affected = sqlx::query(
        r#"
        UPDATE availability_slots
        SET is_booked = 1
        WHERE id = ?1 AND tutor_id = ?2 AND is_booked = 0 AND start_time > ?3
        "#,
    )
    .bind(slot_id)
    .bind(tutor_id)
    .bind(now)
    .execute(db)
    .await?
    .rows_affected();

    Ok(affected > 0)
}

pub async fn release_slot<'e, E>(db: E, slot_id: &str) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let affected = sqlx::query("UPDATE availability_slots SET is_booked = 0 WHERE id = ?")
        .bind(slot_id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{memory_pool, profiles::insert_profile};
    use crate::models::Role;
    use chrono::Duration;

    #[tokio::test]
    async fn test_open_slots_exclude_past_and_booked() {
        let pool = memory_pool().await.expect("Failed to create test db");
        let tutor = insert_profile(&pool, "Pablo", None, Role::Tutor).await.unwrap();
        let now = Utc::now();

        let past = insert_slot(&pool, &tutor.id, now - Duration::hours(2), now - Duration::hours(1))
            .await
            .unwrap();
        let later = insert_slot(&pool, &tutor.id, now + Duration::hours(5), now + Duration::hours(6))
            .await
            .unwrap();
        let sooner = insert_slot(&pool, &tutor.id, now + Duration::hours(1), now + Duration::hours(2))
            .await
            .unwrap();
        let booked = insert_slot(&pool, &tutor.id, now + Duration::hours(3), now + Duration::hours(4))
            .await
            .unwrap();
        assert!(claim_slot(&pool, &booked.id, &tutor.id, now).await.unwrap());

        let open = list_open_slots(&pool, &tutor.id, now).await.unwrap();
        let ids: Vec<&str> = open.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec![sooner.id.as_str(), later.id.as_str()]);
        assert!(!ids.contains(&past.id.as_str()));
    }

    #[tokio::test]
    async fn test_open_slots_empty_is_not_an_error() {
        let pool = memory_pool().await.expect("Failed to create test db");
        let tutor = insert_profile(&pool, "Pablo", None, Role::Tutor).await.unwrap();

        let open = list_open_slots(&pool, &tutor.id, Utc::now()).await.unwrap();
        assert!(open.is_empty());
    }

    #[tokio::test]
    async fn test_claim_slot_only_once() {
        let pool = memory_pool().await.expect("Failed to create test db");
        let tutor = insert_profile(&pool, "Pablo", None, Role::Tutor).await.unwrap();
        let now = Utc::now();
        let slot = insert_slot(&pool, &tutor.id, now + Duration::days(1), now + Duration::days(1) + Duration::hours(1))
            .await
            .unwrap();

        assert!(claim_slot(&pool, &slot.id, &tutor.id, now).await.unwrap());
        assert!(!claim_slot(&pool, &slot.id, &tutor.id, now).await.unwrap());

        assert!(release_slot(&pool, &slot.id).await.unwrap());
        let reloaded = find_slot(&pool, &slot.id).await.unwrap().unwrap();
        assert!(!reloaded.is_booked);
        assert!(reloaded.is_bookable(now));
    }

    #[tokio::test]
    async fn test_claim_slot_rejects_other_tutor_and_past() {
        let pool = memory_pool().await.expect("Failed to create test db");
        let tutor = insert_profile(&pool, "Pablo", None, Role::Tutor).await.unwrap();
        let other = insert_profile(&pool, "Irene", None, Role::Tutor).await.unwrap();
        let now = Utc::now();

        let future = insert_slot(&pool, &tutor.id, now + Duration::hours(1), now + Duration::hours(2))
            .await
            .unwrap();
        let past = insert_slot(&pool, &tutor.id, now - Duration::hours(1), now)
            .await
            .unwrap();

        assert!(!claim_slot(&pool, &future.id, &other.id, now).await.unwrap());
        assert!(!claim_slot(&pool, &past.id, &tutor.id, now).await.unwrap());
    }
}
