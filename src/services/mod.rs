pub mod availability;
pub mod booking;
pub mod curriculum;
pub mod profile;
pub mod progress;

pub use availability::AvailabilityService;
pub use booking::BookingService;
pub use curriculum::CurriculumService;
pub use profile::ProfileService;
pub use progress::{compute_progress, summarize};
