use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::services::rotation::RotationService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationJob {
    Archive,
    Reset,
}

/// Earliest trigger strictly after `after`, with every job due at that
/// instant. Jobs sharing an instant are ordered archive first.
pub fn next_trigger(
    after: NaiveDateTime,
    archive_at: NaiveTime,
    reset_at: NaiveTime,
) -> (NaiveDateTime, Vec<RotationJob>) {
    let archive = next_occurrence(after, archive_at);
    let reset = next_occurrence(after, reset_at);

    if archive < reset {
        (archive, vec![RotationJob::Archive])
    } else if reset < archive {
        (reset, vec![RotationJob::Reset])
    } else {
        (archive, vec![RotationJob::Archive, RotationJob::Reset])
    }
}

/// Calendar day a job acts on when it fires at `at`.
///
/// Rotation boundaries sit around midnight, so each job is tied to the
/// nearest midnight: a reset opens the day starting there, an archive closes
/// the day ending there. An archive at 00:00 therefore snapshots the day that
/// just ended, and a reset at 23:00 materializes tomorrow.
pub fn job_date(job: RotationJob, at: NaiveDateTime) -> NaiveDate {
    let boundary = (at + TimeDelta::hours(12)).date();
    match job {
        RotationJob::Reset => boundary,
        RotationJob::Archive => boundary.pred_opt().unwrap_or(boundary),
    }
}

fn next_occurrence(after: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let same_day = after.date().and_time(at);
    if same_day > after {
        same_day
    } else {
        same_day + TimeDelta::days(1)
    }
}

/// Runs the rotation jobs at fixed local wall-clock times, forever.
pub struct RotationScheduler {
    rotation: RotationService,
    clock: Arc<dyn Clock>,
    archive_at: NaiveTime,
    reset_at: NaiveTime,
}

impl RotationScheduler {
    pub fn new(
        rotation: RotationService,
        clock: Arc<dyn Clock>,
        archive_at: NaiveTime,
        reset_at: NaiveTime,
    ) -> Self {
        Self {
            rotation,
            clock,
            archive_at,
            reset_at,
        }
    }

    pub async fn start(self) {
        info!(
            "Starting rotation scheduler (archive at {}, reset at {})",
            self.archive_at.format("%H:%M"),
            self.reset_at.format("%H:%M")
        );

        // Triggers missed while the process was down are not replayed.
        let mut cursor = self.clock.now();
        loop {
            let (at, jobs) = next_trigger(cursor, self.archive_at, self.reset_at);
            let wait = (at - self.clock.now()).to_std().unwrap_or(Duration::ZERO);
            debug!("Next rotation at {} ({:?}) in {:?}", at, jobs, wait);

            tokio::time::sleep(wait).await;

            for job in jobs {
                self.run(job, job_date(job, at)).await;
            }
            cursor = at;
        }
    }

    /// Runs one job for `date`. Failures are logged and swallowed so the loop
    /// keeps going; there is no retry within the same trigger.
    pub async fn run(&self, job: RotationJob, date: NaiveDate) {
        match job {
            RotationJob::Archive => match self.rotation.archive_day(date).await {
                Ok(report) => info!(
                    "Rotation archive completed - {} periods for {} ({} replaced)",
                    report.archived, report.date, report.replaced
                ),
                Err(e) => warn!("Rotation archive failed for {}: {:?}", date, e),
            },
            RotationJob::Reset => match self.rotation.reset_day(date).await {
                Ok(report) => info!(
                    "Rotation reset completed - cleared {}, inserted {} for {}",
                    report.cleared, report.inserted, report.weekday
                ),
                Err(e) => warn!("Rotation reset failed for {}: {:?}", date, e),
            },
        }
    }
}
