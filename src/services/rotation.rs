use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::clock::Clock;
use crate::db::{archive, daily, templates};
use crate::error::AppError;
use crate::models::{ArchivedPeriod, DailyPeriod, TemplatePeriod, Weekday};
use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct ArchiveReport {
    pub date: NaiveDate,
    pub archived: usize,
    /// Rows of an earlier snapshot for the same date that were replaced.
    pub replaced: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResetReport {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub cleared: u64,
    pub inserted: usize,
}

/// The two daily rotation steps: archive today's periods, then rebuild the
/// daily store from the template.
#[derive(Clone)]
pub struct RotationService {
    db: SqlitePool,
    clock: Arc<dyn Clock>,
    write_lock: Arc<Mutex<()>>,
}

impl RotationService {
    pub fn new(db: SqlitePool, clock: Arc<dyn Clock>, write_lock: Arc<Mutex<()>>) -> Self {
        Self {
            db,
            clock,
            write_lock,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.db.clone(), state.clock.clone(), state.write_lock.clone())
    }

    pub async fn run_archive_job(&self) -> Result<ArchiveReport, AppError> {
        self.archive_day(self.clock.today()).await
    }

    pub async fn run_reset_job(&self) -> Result<ResetReport, AppError> {
        self.reset_day(self.clock.today()).await
    }

    /// Snapshots every daily period under `date`. Re-running for the same
    /// date replaces the earlier snapshot instead of duplicating it. The daily
    /// store is left as is.
    pub async fn archive_day(&self, date: NaiveDate) -> Result<ArchiveReport, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.db.begin().await?;

        let rows = daily::fetch_all(&mut *tx).await?;
        let attempted = rows.len();

        match write_archive(tx, date, &rows).await {
            Ok(replaced) => {
                info!(
                    job = "archive",
                    %date,
                    archived = attempted,
                    replaced,
                    "Archived {} daily periods",
                    attempted
                );
                Ok(ArchiveReport {
                    date,
                    archived: attempted,
                    replaced,
                })
            }
            Err(e) => {
                error!(
                    job = "archive",
                    %date,
                    attempted,
                    error = %e,
                    "Archive job failed; no snapshot written for this date"
                );
                Err(e.into())
            }
        }
    }

    /// Clears the whole daily store and materializes `date`'s weekday from
    /// the template. Both steps commit together.
    pub async fn reset_day(&self, date: NaiveDate) -> Result<ResetReport, AppError> {
        let weekday = Weekday::of(date);
        let _guard = self.write_lock.lock().await;
        let mut tx = self.db.begin().await?;

        let matching = templates::fetch_filtered(&mut *tx, Some(weekday), None, None).await?;
        let attempted = matching.len();

        match write_reset(tx, &matching).await {
            Ok(cleared) => {
                if attempted == 0 {
                    info!(
                        job = "reset",
                        %date,
                        %weekday,
                        cleared,
                        "No template periods for {}; daily store left empty",
                        weekday
                    );
                } else {
                    info!(
                        job = "reset",
                        %date,
                        %weekday,
                        cleared,
                        inserted = attempted,
                        "Inserted {} periods for {}",
                        attempted,
                        weekday
                    );
                }
                Ok(ResetReport {
                    date,
                    weekday,
                    cleared,
                    inserted: attempted,
                })
            }
            Err(e) => {
                error!(
                    job = "reset",
                    %date,
                    %weekday,
                    attempted,
                    error = %e,
                    "Reset job failed; daily store unchanged"
                );
                Err(e.into())
            }
        }
    }
}

async fn write_archive(
    mut tx: Transaction<'_, Sqlite>,
    date: NaiveDate,
    rows: &[DailyPeriod],
) -> Result<u64, sqlx::Error> {
    let archived_at = Utc::now().to_rfc3339();
    let replaced = archive::delete_for_date(&mut *tx, date).await?;
    for row in rows {
        let snapshot = ArchivedPeriod::from_daily(row, date, archived_at.clone());
        archive::insert(&mut *tx, &snapshot).await?;
    }
    tx.commit().await?;
    Ok(replaced)
}

async fn write_reset(
    mut tx: Transaction<'_, Sqlite>,
    matching: &[TemplatePeriod],
) -> Result<u64, sqlx::Error> {
    let now = Utc::now().to_rfc3339();
    let cleared = daily::delete_all(&mut *tx).await?;
    for template in matching {
        daily::insert(&mut *tx, &DailyPeriod::from_template(template, now.clone())).await?;
    }
    tx.commit().await?;
    Ok(cleared)
}
