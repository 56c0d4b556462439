pub mod appointment;
pub mod profile;
pub mod progress;
pub mod slot;
pub mod subject;
pub mod topic;

pub use appointment::{Appointment, AppointmentDetail, AppointmentStatus, ReserveRequest};
pub use profile::{Profile, ProfileUpdate, Role};
pub use progress::{ProgressReport, StudentProgress, SubjectProgress};
pub use slot::{AvailabilitySlot, NewSlotRequest};
pub use subject::{ClassSummary, Subject};
pub use topic::{ManagedTopic, Topic, VisibilityRequest, resolve_visibility};
