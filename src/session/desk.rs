use std::sync::Arc;

use crate::error::AppError;
use crate::models::Appointment;
use crate::session::backend::Backend;
use crate::session::confirm::{ConfirmGuard, PendingAction, Press};

#[derive(Debug, Clone, PartialEq)]
pub enum DeskOutcome {
    /// First press registered; press again to go through with it.
    AwaitingConfirmation,
    Done(Appointment),
}

/// Cancel / complete buttons of an appointment, each needing two presses.
pub struct AppointmentDesk {
    backend: Arc<dyn Backend>,
    guard: ConfirmGuard,
}

impl AppointmentDesk {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            guard: ConfirmGuard::new(),
        }
    }

    pub fn guard(&self) -> &ConfirmGuard {
        &self.guard
    }

    pub async fn press_cancel(&mut self, appointment_id: &str) -> Result<DeskOutcome, AppError> {
        match self.guard.press(appointment_id, PendingAction::Cancel) {
            Press::Armed => Ok(DeskOutcome::AwaitingConfirmation),
            Press::Confirmed => Ok(DeskOutcome::Done(self.backend.cancel(appointment_id).await?)),
        }
    }

    pub async fn press_complete(&mut self, appointment_id: &str) -> Result<DeskOutcome, AppError> {
        match self.guard.press(appointment_id, PendingAction::Complete) {
            Press::Armed => Ok(DeskOutcome::AwaitingConfirmation),
            Press::Confirmed => Ok(DeskOutcome::Done(self.backend.complete(appointment_id).await?)),
        }
    }

    /// "Keep it", or the user navigated away.
    pub fn dismiss(&mut self) {
        self.guard.dismiss();
    }
}
