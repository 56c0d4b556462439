//! In-process change feed.
//!
//! Every write path publishes a [`ChangeEvent`] after its transaction commits.
//! Subscribers treat events as a hint to re-read, never as data to patch in.

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

const FEED_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    AvailabilitySlots,
    Appointments,
    StudentProgress,
    TopicVisibility,
    Topics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEvent {
    pub table: Table,
    pub kind: ChangeKind,
    pub id: String,
}

impl ChangeEvent {
    pub fn new(table: Table, kind: ChangeKind, id: impl Into<String>) -> Self {
        Self {
            table,
            kind,
            id: id.into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ChangeFeed {
    sender: broadcast::Sender<ChangeEvent>,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(FEED_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: ChangeEvent) {
        debug!("change: {:?} {:?} {}", event.table, event.kind, event.id);
        // No subscribers is fine.
        let _ = self.sender.send(event);
    }
}
