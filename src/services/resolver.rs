use std::cmp::Ordering;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

use crate::clock::Clock;
use crate::db::{archive, daily, templates};
use crate::error::AppError;
use crate::models::{Actor, PeriodFields, Role, ScheduledPeriod, Weekday};
use crate::services::gate;
use crate::state::AppState;

/// Where a requested date sits relative to the server's current day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DayClass {
    Past,
    Today,
    Future,
}

pub fn classify(date: NaiveDate, today: NaiveDate) -> DayClass {
    match date.cmp(&today) {
        Ordering::Less => DayClass::Past,
        Ordering::Equal => DayClass::Today,
        Ordering::Greater => DayClass::Future,
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PeriodQuery {
    pub branch: Option<String>,
    pub semester: Option<i32>,
    /// Calendar date (`YYYY-MM-DD`); today when absent.
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct PeriodQueryResult {
    pub date: NaiveDate,
    pub day: DayClass,
    pub weekday: Weekday,
    pub periods: Vec<ScheduledPeriod>,
}

/// Picks the store that answers a date and shapes its rows uniformly.
pub struct QueryResolver {
    db: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl QueryResolver {
    pub fn new(db: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.db.clone(), state.clock.clone())
    }

    pub async fn query_periods(
        &self,
        actor: &Actor,
        query: PeriodQuery,
    ) -> Result<PeriodQueryResult, AppError> {
        let today = self.clock.today();
        let date = query.date.unwrap_or(today);
        let day = classify(date, today);
        let weekday = Weekday::of(date);
        let (branch, semester) = scope(actor, &query);
        let branch = branch.as_deref();

        let periods: Vec<ScheduledPeriod> = match day {
            DayClass::Today => daily::fetch_filtered(&self.db, branch, semester)
                .await?
                .into_iter()
                .filter(|p| visible_to(actor, &p.fields))
                .map(ScheduledPeriod::from)
                .collect(),
            DayClass::Past => archive::fetch_for_date(&self.db, date, branch, semester)
                .await?
                .into_iter()
                .filter(|p| visible_to(actor, &p.fields))
                .map(ScheduledPeriod::from)
                .collect(),
            // Projection only; nothing is written for future dates.
            DayClass::Future => templates::fetch_filtered(&self.db, Some(weekday), branch, semester)
                .await?
                .iter()
                .filter(|p| visible_to(actor, &p.fields))
                .map(ScheduledPeriod::projected)
                .collect(),
        };

        debug!(
            "Resolved {} periods for {} ({:?}, {}) branch={:?} sem={:?} actor={}",
            periods.len(),
            date,
            day,
            weekday,
            branch,
            semester,
            actor.id
        );

        Ok(PeriodQueryResult {
            date,
            day,
            weekday,
            periods,
        })
    }
}

/// Instructors only see the periods they own.
fn visible_to(actor: &Actor, fields: &PeriodFields) -> bool {
    match actor.role {
        Role::Instructor => gate::owns(actor, fields),
        Role::Student => true,
    }
}

/// Effective branch/semester filters. Students who leave them out are
/// scoped to their own group when it is known.
fn scope(actor: &Actor, query: &PeriodQuery) -> (Option<String>, Option<i32>) {
    let branch = normalized(query.branch.as_deref());
    match actor.role {
        Role::Student => (
            branch.or_else(|| normalized(actor.branch.as_deref())),
            query.semester.or(actor.semester),
        ),
        Role::Instructor => (branch, query.semester),
    }
}

fn normalized(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
}
