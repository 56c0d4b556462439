use sqlx::SqlitePool;
use tokio::sync::{broadcast::error::RecvError, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::events::{ChangeEvent, ChangeFeed, Table};
use crate::models::ProgressReport;
use crate::services::compute_progress;

/// Keeps a student's progress report current.
/// Recomputes from the database on start and after every relevant change.
pub struct ProgressWatcher {
    db: SqlitePool,
    feed: ChangeFeed,
    student_id: String,
}

impl ProgressWatcher {
    pub fn new(db: SqlitePool, feed: ChangeFeed, student_id: impl Into<String>) -> Self {
        Self {
            db,
            feed,
            student_id: student_id.into(),
        }
    }

    pub fn spawn(self) -> (watch::Receiver<ProgressReport>, JoinHandle<()>) {
        let (tx, rx) = watch::channel(ProgressReport::default());
        let handle = tokio::spawn(self.start(tx));
        (rx, handle)
    }

    /// Runs until every receiver is gone.
    pub async fn start(self, tx: watch::Sender<ProgressReport>) {
        info!("watching progress of {}", self.student_id);
        let mut events = self.feed.subscribe();

        self.refresh(&tx).await;

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                received = events.recv() => match received {
                    Ok(event) if affects_progress(&event) => self.refresh(&tx).await,
                    Ok(_) => {}
                    Err(RecvError::Lagged(missed)) => {
                        warn!("progress watcher lagged by {} events", missed);
                        self.refresh(&tx).await;
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }

        info!("stopped watching progress of {}", self.student_id);
    }

    async fn refresh(&self, tx: &watch::Sender<ProgressReport>) {
        match compute_progress(&self.db, &self.student_id).await {
            Ok(report) => {
                tx.send_replace(report);
            }
            Err(e) => warn!("progress refresh failed: {:?}", e),
        }
    }
}

fn affects_progress(event: &ChangeEvent) -> bool {
    matches!(
        event.table,
        Table::Appointments | Table::StudentProgress | Table::Topics
    )
}
