pub mod actor;
pub mod period;
pub mod weekday;

pub use actor::{Actor, Role};
pub use period::{
    ArchivedPeriod, CancelPeriodRequest, DailyPeriod, NewPeriodRequest, PeriodFields,
    PeriodSource, ScheduledPeriod, TemplatePeriod, TemplatePeriodRequest, TimeWindow,
    UpdatePeriodRequest,
};
pub use weekday::Weekday;
