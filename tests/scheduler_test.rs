mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveTime;
use timetable::clock::{Clock, FixedClock};
use timetable::db::{archive, daily};
use timetable::models::Weekday;
use timetable::services::{PeriodService, RotationJob, RotationScheduler, RotationService};
use timetable::state::AppState;

use common::*;

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[tokio::test]
async fn test_scheduler_initialization() {
    let state = state_on(monday()).await;

    let _scheduler = RotationScheduler::new(
        RotationService::from_state(&state),
        state.clock.clone(),
        time(23, 59),
        time(0, 0),
    );
}

#[tokio::test]
async fn test_scheduler_fires_archive_at_trigger() {
    let pool = setup_pool().await;
    let now = monday().and_hms_opt(23, 58, 59).unwrap();
    let clock: Arc<dyn Clock> = Arc::new(FixedClock(now));
    let state = AppState::new(pool, clock.clone());
    seed_daily(&state.db, fields("cse", 3, "09:00", "10:00", None, "bob")).await;

    let scheduler = RotationScheduler::new(
        RotationService::from_state(&state),
        clock,
        time(23, 59),
        time(0, 0),
    );

    // First trigger is one second away; the reset after it is a minute out.
    let scheduler_task = tokio::spawn(scheduler.start());
    tokio::time::sleep(Duration::from_millis(2500)).await;
    scheduler_task.abort();

    let archived = archive::fetch_for_date(&state.db, monday(), None, None).await.unwrap();
    assert_eq!(archived.len(), 1);
    assert_eq!(daily::fetch_all(&state.db).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_scheduler_run_reset_uses_trigger_date() {
    let state = state_on(monday()).await;
    PeriodService::from_state(&state)
        .create_template_period(
            &admin(),
            template("DBMS", Weekday::Tuesday, "cse", 3, "09:00", "10:00", "bob"),
        )
        .await
        .unwrap();

    let scheduler = RotationScheduler::new(
        RotationService::from_state(&state),
        state.clock.clone(),
        time(23, 59),
        time(0, 0),
    );
    scheduler.run(RotationJob::Reset, date(2026, 10, 13)).await;

    let rows = daily::fetch_all(&state.db).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].fields.name, "dbms");
}

#[tokio::test]
async fn test_midnight_archive_lands_on_the_day_that_ended() {
    let pool = setup_pool().await;
    let now = monday().and_hms_opt(23, 59, 59).unwrap();
    let clock: Arc<dyn Clock> = Arc::new(FixedClock(now));
    let state = AppState::new(pool, clock.clone());
    seed_daily(&state.db, fields("cse", 3, "09:00", "10:00", None, "bob")).await;
    PeriodService::from_state(&state)
        .create_template_period(
            &admin(),
            template("OS", Weekday::Tuesday, "cse", 3, "11:00", "12:00", "carol"),
        )
        .await
        .unwrap();

    // Archive and reset share the midnight trigger, one second away.
    let scheduler = RotationScheduler::new(
        RotationService::from_state(&state),
        clock,
        time(0, 0),
        time(0, 0),
    );
    let scheduler_task = tokio::spawn(scheduler.start());
    tokio::time::sleep(Duration::from_millis(2500)).await;
    scheduler_task.abort();

    let archived = archive::fetch_for_date(&state.db, monday(), None, None).await.unwrap();
    assert_eq!(archived.len(), 1);
    assert_eq!(archived[0].fields.instructor_name, "bob");
    assert!(
        archive::fetch_for_date(&state.db, date(2026, 10, 13), None, None)
            .await
            .unwrap()
            .is_empty()
    );

    let rows = daily::fetch_all(&state.db).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].fields.name, "os");
}
