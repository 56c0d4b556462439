//! Per-user interaction logic that sits on top of the services: the booking
//! wizard, the tutor's topic board, the appointment actions and the live
//! progress view.

pub mod backend;
pub mod confirm;
pub mod desk;
pub mod optimistic;
pub mod progress_watch;
pub mod topic_board;
pub mod workflow;

pub use backend::{Backend, StoreBackend};
pub use confirm::{ConfirmGuard, PendingAction, PendingConfirmation, Press};
pub use desk::{AppointmentDesk, DeskOutcome};
pub use optimistic::{Reversible, apply_optimistically};
pub use progress_watch::ProgressWatcher;
pub use topic_board::TopicBoard;
pub use workflow::{BookingState, BookingWorkflow, Notice, NoticeLevel, SlotView, Step, WorkflowError};
