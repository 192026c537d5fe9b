pub mod conflict;
pub mod gate;
pub mod periods;
pub mod resolver;
pub mod rotation;
pub mod scheduler;

pub use periods::PeriodService;
pub use resolver::{DayClass, PeriodQuery, PeriodQueryResult, QueryResolver};
pub use rotation::{ArchiveReport, ResetReport, RotationService};
pub use scheduler::{RotationJob, RotationScheduler};
