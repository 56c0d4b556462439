use chrono::{DateTime, Duration, SubsecRound, Utc};
use sqlx::SqlitePool;
use tracing::info;

use crate::auth::{Identity, require_role};
use crate::config::MAX_SLOT_MINUTES;
use crate::db::slots;
use crate::error::AppError;
use crate::events::{ChangeEvent, ChangeFeed, ChangeKind, Table};
use crate::models::{AvailabilitySlot, NewSlotRequest, Role};

#[derive(Clone)]
pub struct AvailabilityService {
    db: SqlitePool,
    feed: ChangeFeed,
    slot_length: Duration,
}

impl AvailabilityService {
    pub fn new(db: SqlitePool, feed: ChangeFeed, slot_minutes: i64) -> Self {
        Self {
            db,
            feed,
            slot_length: Duration::minutes(slot_minutes.clamp(1, MAX_SLOT_MINUTES)),
        }
    }

    /// Bookable slots of a tutor as of `now`.
    pub async fn open_slots(
        &self,
        tutor_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<AvailabilitySlot>, AppError> {
        Ok(slots::list_open_slots(&self.db, tutor_id, now).await?)
    }

    pub async fn publish_slot(
        &self,
        identity: &Identity,
        req: NewSlotRequest,
    ) -> Result<AvailabilitySlot, AppError> {
        require_role(&self.db, identity, Role::Tutor).await?;

        // Checked at the precision the slot is stored with.
        let start_time = req.start_time.trunc_subsecs(0);
        let end_time = req
            .end_time
            .map(|end| end.trunc_subsecs(0))
            .unwrap_or(start_time + self.slot_length);

        if start_time <= Utc::now() {
            return Err(AppError::BadRequest("slot must start in the future".to_string()));
        }
        if end_time <= start_time {
            return Err(AppError::BadRequest("slot must end after it starts".to_string()));
        }

        let slot = slots::insert_slot(&self.db, &identity.id, start_time, end_time).await?;

        info!("tutor {} published slot {} at {}", identity.id, slot.id, slot.start_time);
        self.feed.publish(ChangeEvent::new(Table::AvailabilitySlots, ChangeKind::Created, &slot.id));

        Ok(slot)
    }
}
