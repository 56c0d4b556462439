use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::events::ChangeFeed;
use crate::services::{AvailabilityService, BookingService, CurriculumService, ProfileService};
use crate::settings::SettingsStore;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub feed: ChangeFeed,
    pub config: Config,
    pub settings: Arc<dyn SettingsStore>,
}

impl AppState {
    pub fn booking(&self) -> BookingService {
        BookingService::new(self.db.clone(), self.feed.clone())
    }

    pub fn availability(&self) -> AvailabilityService {
        AvailabilityService::new(self.db.clone(), self.feed.clone(), self.config.slot_minutes)
    }

    pub fn curriculum(&self) -> CurriculumService {
        CurriculumService::new(self.db.clone(), self.feed.clone())
    }

    pub fn profiles(&self) -> ProfileService {
        ProfileService::new(self.db.clone())
    }
}
