mod common;

use timetable::db::{archive, daily};
use timetable::models::Weekday;
use timetable::services::{PeriodService, RotationService};

use common::*;

#[tokio::test]
async fn test_reset_materializes_matching_weekday() {
    let state = state_on(monday()).await;
    let periods = PeriodService::from_state(&state);

    let dbms = periods
        .create_template_period(
            &admin(),
            template("DBMS", Weekday::Monday, "cse", 3, "09:00", "10:00", "bob"),
        )
        .await
        .expect("Failed to create template");
    periods
        .create_template_period(
            &admin(),
            template("OS", Weekday::Tuesday, "cse", 3, "09:00", "10:00", "carol"),
        )
        .await
        .expect("Failed to create template");

    let report = RotationService::from_state(&state)
        .run_reset_job()
        .await
        .expect("Reset failed");
    assert_eq!(report.weekday, Weekday::Monday);
    assert_eq!(report.inserted, 1);

    let rows = daily::fetch_all(&state.db).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].fields, dbms.fields);
    assert_eq!(rows[0].fields.name, "dbms");
    assert!(!rows[0].is_cancelled);
    assert_eq!(rows[0].updated_by, "");
    assert_ne!(rows[0].id, dbms.id);
}

#[tokio::test]
async fn test_reset_wipes_every_branch() {
    let state = state_on(monday()).await;
    seed_daily(&state.db, fields("cse", 3, "09:00", "10:00", None, "bob")).await;
    seed_daily(&state.db, fields("ece", 5, "11:00", "12:00", None, "dan")).await;

    let report = RotationService::from_state(&state)
        .reset_day(date(2026, 10, 18))
        .await
        .expect("Reset failed");

    assert_eq!(report.weekday, Weekday::Sunday);
    assert_eq!(report.cleared, 2);
    assert_eq!(report.inserted, 0);
    assert!(daily::fetch_all(&state.db).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_archive_preserves_cancellation_and_stamps_date() {
    let state = state_on(monday()).await;
    seed_daily(&state.db, fields("cse", 3, "09:00", "10:00", Some("t-1"), "bob")).await;
    let cancelled = seed_daily(&state.db, fields("cse", 3, "10:00", "11:00", Some("t-1"), "bob")).await;

    PeriodService::from_state(&state)
        .cancel_daily_period(&instructor("t-1", "bob"), &cancelled.id, "Bob")
        .await
        .expect("Cancel failed");

    let report = RotationService::from_state(&state)
        .run_archive_job()
        .await
        .expect("Archive failed");
    assert_eq!(report.date, monday());
    assert_eq!(report.archived, 2);

    let rows = archive::fetch_for_date(&state.db, monday(), None, None).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.date == monday()));

    let by_start = |start: &str| rows.iter().find(|r| r.fields.start_time == start).unwrap();
    assert!(!by_start("09:00").is_cancelled);
    assert!(by_start("10:00").is_cancelled);
    assert_eq!(by_start("10:00").updated_by, "bob");

    // Archiving does not clear today's store.
    assert_eq!(daily::fetch_all(&state.db).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_repeated_archive_replaces_snapshot() {
    let state = state_on(monday()).await;
    seed_daily(&state.db, fields("cse", 3, "09:00", "10:00", None, "bob")).await;
    seed_daily(&state.db, fields("cse", 3, "10:00", "11:00", None, "bob")).await;

    let rotation = RotationService::from_state(&state);
    rotation.run_archive_job().await.expect("Archive failed");
    let second = rotation.run_archive_job().await.expect("Archive failed");

    assert_eq!(second.replaced, 2);
    assert_eq!(archive::count_all(&state.db).await.unwrap(), 2);

    // A different date is its own snapshot.
    rotation.archive_day(date(2026, 10, 13)).await.expect("Archive failed");
    assert_eq!(archive::count_all(&state.db).await.unwrap(), 4);
}

#[tokio::test]
async fn test_archive_then_reset_rolls_the_day() {
    let state = state_on(monday()).await;
    let periods = PeriodService::from_state(&state);
    periods
        .create_template_period(
            &admin(),
            template("DBMS", Weekday::Tuesday, "cse", 3, "09:00", "10:00", "bob"),
        )
        .await
        .unwrap();
    seed_daily(&state.db, fields("cse", 3, "14:00", "15:00", None, "bob")).await;

    let rotation = RotationService::from_state(&state);
    rotation.archive_day(monday()).await.unwrap();
    rotation.reset_day(date(2026, 10, 13)).await.unwrap();

    let archived = archive::fetch_for_date(&state.db, monday(), None, None).await.unwrap();
    assert_eq!(archived.len(), 1);
    assert_eq!(archived[0].fields.start_time, "14:00");

    let today = daily::fetch_all(&state.db).await.unwrap();
    assert_eq!(today.len(), 1);
    assert_eq!(today[0].fields.start_time, "09:00");
}

#[tokio::test]
async fn test_template_edits_do_not_touch_materialized_rows() {
    let state = state_on(monday()).await;
    let periods = PeriodService::from_state(&state);
    let tpl = periods
        .create_template_period(
            &admin(),
            template("DBMS", Weekday::Monday, "cse", 3, "09:00", "10:00", "bob"),
        )
        .await
        .unwrap();
    RotationService::from_state(&state).run_reset_job().await.unwrap();

    periods
        .update_template_period(
            &admin(),
            &tpl.id,
            template("Networks", Weekday::Monday, "cse", 3, "13:00", "14:00", "bob"),
        )
        .await
        .unwrap();

    let rows = daily::fetch_all(&state.db).await.unwrap();
    assert_eq!(rows[0].fields.name, "dbms");
    assert_eq!(rows[0].fields.start_time, "09:00");
}

#[tokio::test]
async fn test_failed_archive_leaves_daily_store_untouched() {
    let state = state_on(monday()).await;
    let seeded = seed_daily(&state.db, fields("cse", 3, "09:00", "10:00", None, "bob")).await;

    sqlx::query("ALTER TABLE archived_periods RENAME TO archived_periods_old")
        .execute(&state.db)
        .await
        .unwrap();

    let result = RotationService::from_state(&state).archive_day(monday()).await;
    assert!(result.is_err());

    let rows = daily::fetch_all(&state.db).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, seeded.id);
    let snapshots: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM archived_periods_old")
        .fetch_one(&state.db)
        .await
        .unwrap();
    assert_eq!(snapshots, 0);
}

#[tokio::test]
async fn test_failed_reset_keeps_yesterdays_rows() {
    let state = state_on(monday()).await;
    let first = seed_daily(&state.db, fields("cse", 3, "09:00", "10:00", None, "bob")).await;
    let second = seed_daily(&state.db, fields("ece", 5, "11:00", "12:00", None, "dan")).await;
    PeriodService::from_state(&state)
        .create_template_period(
            &admin(),
            template("OS", Weekday::Tuesday, "cse", 3, "09:00", "10:00", "carol"),
        )
        .await
        .expect("Failed to create template");

    // The wipe succeeds; the first insert after it aborts.
    sqlx::query(
        "CREATE TRIGGER reject_daily_insert BEFORE INSERT ON daily_periods \
         BEGIN SELECT RAISE(ABORT, 'daily insert rejected'); END",
    )
    .execute(&state.db)
    .await
    .unwrap();

    let result = RotationService::from_state(&state)
        .reset_day(date(2026, 10, 13))
        .await;
    assert!(result.is_err());

    let mut ids: Vec<String> = daily::fetch_all(&state.db)
        .await
        .unwrap()
        .into_iter()
        .map(|row| row.id)
        .collect();
    ids.sort();
    let mut expected = vec![first.id, second.id];
    expected.sort();
    assert_eq!(ids, expected);
}
