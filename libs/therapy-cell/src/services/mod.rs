pub mod conflict;
pub mod dashboard;
pub mod feedback;
pub mod lifecycle;
pub mod mapper;
pub mod plan;
pub mod progress;
pub mod scheduling;

pub use conflict::ConflictWindow;
pub use dashboard::{DashboardService, PatientScope};
pub use feedback::FeedbackService;
pub use mapper::ResponseMapper;
pub use plan::PlanService;
pub use progress::ProgressService;
pub use scheduling::SchedulingService;
