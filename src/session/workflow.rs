//! Booking wizard: subject → topic → slot → booked.
//!
//! The subjects offered are the classes of the student's course; picking one
//! fixes the tutor. Only topics the class tutor switched on are listed.
//!
//! State lives behind a shared lock so the handle can be cloned into UI tasks.
//! Each backend call is bracketed by a busy flag (one call per workflow at a
//! time) and a generation number: anything that resets or steps back bumps
//! the generation, and a response carrying an older one is dropped.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::events::{ChangeEvent, Table};
use crate::models::{Appointment, AvailabilitySlot, ClassSummary, ReserveRequest, Topic};
use crate::session::backend::Backend;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Step {
    #[default]
    SelectSubject,
    SelectTopic,
    SelectSlot,
    Completed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SlotView {
    Loading,
    NoAvailability,
    Available(Vec<AvailabilitySlot>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    /// Blocking notices need the user's attention before anything else.
    pub blocking: bool,
}

impl Notice {
    fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
            blocking: false,
        }
    }

    fn error(err: &AppError) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: err.to_string(),
            blocking: matches!(err, AppError::Unauthenticated),
        }
    }
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("a request for this step is still pending")]
    Busy,

    #[error("not available at this step")]
    InvalidStep,

    #[error("choice is not among the listed options")]
    UnknownChoice,

    #[error("response arrived after the workflow moved on")]
    Stale,

    #[error(transparent)]
    Backend(#[from] AppError),
}

#[derive(Debug, Clone, Default)]
pub struct BookingState {
    pub step: Step,
    pub classes: Vec<ClassSummary>,
    pub class: Option<ClassSummary>,
    pub topics: Vec<Topic>,
    pub topic: Option<Topic>,
    /// `None` until the slot list for the chosen topic has been read.
    pub slots: Option<Vec<AvailabilitySlot>>,
    pub appointment: Option<Appointment>,
    pub busy: bool,
    pub notice: Option<Notice>,
    generation: u64,
}

impl BookingState {
    pub fn slot_view(&self) -> SlotView {
        match &self.slots {
            None => SlotView::Loading,
            Some(slots) if slots.is_empty() => SlotView::NoAvailability,
            Some(slots) => SlotView::Available(slots.clone()),
        }
    }

    fn ensure_ready(&self, step: Step) -> Result<(), WorkflowError> {
        if self.step != step {
            return Err(WorkflowError::InvalidStep);
        }
        if self.busy {
            return Err(WorkflowError::Busy);
        }
        Ok(())
    }

    fn start_request(&mut self) -> u64 {
        self.notice = None;
        self.start_refresh()
    }

    /// Like `start_request` but leaves the current notice on screen.
    fn start_refresh(&mut self) -> u64 {
        self.busy = true;
        self.generation
    }

    fn fail(&mut self, err: AppError) -> WorkflowError {
        warn!("booking step failed at {:?}: {}", self.step, err);
        self.notice = Some(Notice::error(&err));
        WorkflowError::Backend(err)
    }

    fn invalidate(&mut self) {
        self.generation += 1;
        self.busy = false;
    }
}

#[derive(Clone)]
pub struct BookingWorkflow {
    backend: Arc<dyn Backend>,
    state: Arc<Mutex<BookingState>>,
}

impl BookingWorkflow {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            state: Arc::new(Mutex::new(BookingState::default())),
        }
    }

    pub async fn snapshot(&self) -> BookingState {
        self.state.lock().await.clone()
    }

    /// Starts from scratch and loads the classes of the student's course.
    pub async fn open(&self) -> Result<(), WorkflowError> {
        let generation = {
            let mut state = self.state.lock().await;
            let generation = state.generation + 1;
            *state = BookingState {
                generation,
                ..BookingState::default()
            };
            state.start_request()
        };

        let result = self.backend.enrolled_classes().await;

        let mut state = self.finish(generation).await?;
        match result {
            Ok(classes) => {
                debug!("booking opened with {} classes", classes.len());
                state.classes = classes;
                Ok(())
            }
            Err(e) => Err(state.fail(e)),
        }
    }

    /// Discards every selection. Pending responses are ignored.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        let generation = state.generation + 1;
        *state = BookingState {
            generation,
            ..BookingState::default()
        };
    }

    pub async fn select_subject(&self, class_id: &str) -> Result<(), WorkflowError> {
        let (generation, class) = {
            let mut state = self.state.lock().await;
            state.ensure_ready(Step::SelectSubject)?;
            let class = state
                .classes
                .iter()
                .find(|c| c.id == class_id)
                .cloned()
                .ok_or(WorkflowError::UnknownChoice)?;
            (state.start_request(), class)
        };

        let result = self.backend.active_topics(&class.id).await;

        let mut state = self.finish(generation).await?;
        match result {
            Ok(topics) => {
                state.class = Some(class);
                state.topics = topics;
                state.step = Step::SelectTopic;
                Ok(())
            }
            Err(e) => Err(state.fail(e)),
        }
    }

    pub async fn select_topic(&self, topic_id: i64) -> Result<(), WorkflowError> {
        let (generation, topic, tutor_id) = {
            let mut state = self.state.lock().await;
            state.ensure_ready(Step::SelectTopic)?;
            let topic = state
                .topics
                .iter()
                .find(|t| t.id == topic_id)
                .cloned()
                .ok_or(WorkflowError::UnknownChoice)?;
            let tutor_id = state
                .class
                .as_ref()
                .map(|c| c.tutor_id.clone())
                .ok_or(WorkflowError::InvalidStep)?;
            (state.start_request(), topic, tutor_id)
        };

        let result = self.backend.open_slots(&tutor_id).await;

        let mut state = self.finish(generation).await?;
        match result {
            Ok(slots) => {
                state.topic = Some(topic);
                state.slots = Some(slots);
                state.step = Step::SelectSlot;
                Ok(())
            }
            Err(e) => Err(state.fail(e)),
        }
    }

    /// Books the slot. A slot someone else took in the meantime leaves the
    /// wizard on the slot step with a freshly read list.
    pub async fn confirm_slot(&self, slot_id: &str) -> Result<Appointment, WorkflowError> {
        let (generation, req, tutor_name) = {
            let mut state = self.state.lock().await;
            state.ensure_ready(Step::SelectSlot)?;
            let listed = state
                .slots
                .as_ref()
                .is_some_and(|slots| slots.iter().any(|s| s.id == slot_id));
            if !listed {
                return Err(WorkflowError::UnknownChoice);
            }
            let (Some(class), Some(topic)) = (state.class.clone(), state.topic.clone()) else {
                return Err(WorkflowError::InvalidStep);
            };
            let req = ReserveRequest {
                tutor_id: class.tutor_id,
                slot_id: slot_id.to_string(),
                topic: topic.name,
                topic_id: Some(topic.id),
                subject_id: Some(class.subject_id),
            };
            (state.start_request(), req, class.tutor_name)
        };

        let tutor_id = req.tutor_id.clone();
        let result = self.backend.reserve(req).await;
        let refreshed = match &result {
            Err(e) if e.is_conflict() => Some(self.backend.open_slots(&tutor_id).await),
            _ => None,
        };

        let mut state = self.finish(generation).await?;
        match result {
            Ok(appointment) => {
                info!("booked slot {} with {}", appointment.slot_id, tutor_name);
                state.notice = Some(Notice::success(format!("Booked with {}", tutor_name)));
                state.appointment = Some(appointment.clone());
                state.step = Step::Completed;
                Ok(appointment)
            }
            Err(e) => {
                if let Some(Ok(slots)) = refreshed {
                    state.slots = Some(slots);
                }
                Err(state.fail(e))
            }
        }
    }

    /// One step back, dropping what was chosen on the step being left.
    /// Refused while a request is pending so a reservation in flight can
    /// neither be doubled nor lost.
    pub async fn back(&self) -> Result<(), WorkflowError> {
        let mut state = self.state.lock().await;
        if state.busy {
            return Err(WorkflowError::Busy);
        }
        match state.step {
            Step::SelectTopic => {
                state.class = None;
                state.topics.clear();
                state.step = Step::SelectSubject;
            }
            Step::SelectSlot => {
                state.topic = None;
                state.slots = None;
                state.step = Step::SelectTopic;
            }
            Step::SelectSubject | Step::Completed => return Err(WorkflowError::InvalidStep),
        }
        state.invalidate();
        state.notice = None;
        Ok(())
    }

    /// Re-reads the slot list when slots changed while the user is choosing
    /// one. Returns whether a refresh happened.
    pub async fn handle_change(&self, event: &ChangeEvent) -> Result<bool, WorkflowError> {
        if event.table != Table::AvailabilitySlots {
            return Ok(false);
        }

        let (generation, tutor_id) = {
            let mut state = self.state.lock().await;
            if state.step != Step::SelectSlot || state.busy {
                return Ok(false);
            }
            let Some(tutor_id) = state.class.as_ref().map(|c| c.tutor_id.clone()) else {
                return Ok(false);
            };
            (state.start_refresh(), tutor_id)
        };

        let result = self.backend.open_slots(&tutor_id).await;

        let mut state = self.finish(generation).await?;
        match result {
            Ok(slots) => {
                state.slots = Some(slots);
                Ok(true)
            }
            Err(e) => Err(state.fail(e)),
        }
    }

    async fn finish(&self, generation: u64) -> Result<MutexGuard<'_, BookingState>, WorkflowError> {
        let mut state = self.state.lock().await;
        if state.generation != generation {
            debug!("dropping response from generation {}", generation);
            return Err(WorkflowError::Stale);
        }
        state.busy = false;
        Ok(state)
    }
}
