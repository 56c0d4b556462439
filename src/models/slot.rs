use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct AvailabilitySlot {
    pub id: String,
    pub tutor_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_booked: bool,
}

impl AvailabilitySlot {
    pub fn is_bookable(&self, now: DateTime<Utc>) -> bool {
        !self.is_booked && self.start_time > now
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSlotRequest {
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}
