#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use timetable::clock::FixedClock;
use timetable::db;
use timetable::models::{
    Actor, DailyPeriod, NewPeriodRequest, PeriodFields, Role, TemplatePeriodRequest, Weekday,
};
use timetable::state::AppState;

/// In-memory database on a single connection so every query sees the same
/// schema and rows.
pub async fn setup_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create database");

    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

pub async fn state_on(date: NaiveDate) -> AppState {
    AppState::new(setup_pool().await, Arc::new(FixedClock::on(date)))
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// 2026-10-12 is a Monday.
pub fn monday() -> NaiveDate {
    date(2026, 10, 12)
}

pub fn instructor(id: &str, name: &str) -> Actor {
    Actor {
        id: id.to_string(),
        name: name.to_string(),
        role: Role::Instructor,
        is_admin: false,
        branch: None,
        semester: None,
    }
}

pub fn student(branch: &str, semester: i32) -> Actor {
    Actor {
        id: "student-1".to_string(),
        name: "sam".to_string(),
        role: Role::Student,
        is_admin: false,
        branch: Some(branch.to_string()),
        semester: Some(semester),
    }
}

pub fn admin() -> Actor {
    Actor {
        id: "admin-1".to_string(),
        name: "root".to_string(),
        role: Role::Instructor,
        is_admin: true,
        branch: None,
        semester: None,
    }
}

pub fn new_period(name: &str, branch: &str, semester: i32, start: &str, end: &str) -> NewPeriodRequest {
    NewPeriodRequest {
        name: name.to_string(),
        instructor_name: "bob".to_string(),
        room: "lt-1".to_string(),
        start_time: start.to_string(),
        end_time: end.to_string(),
        branch: branch.to_string(),
        batch: None,
        semester,
    }
}

pub fn template(
    name: &str,
    weekday: Weekday,
    branch: &str,
    semester: i32,
    start: &str,
    end: &str,
    instructor_name: &str,
) -> TemplatePeriodRequest {
    let mut period = new_period(name, branch, semester, start, end);
    period.instructor_name = instructor_name.to_string();
    TemplatePeriodRequest {
        period,
        instructor_id: None,
        weekday,
    }
}

pub fn fields(
    branch: &str,
    semester: i32,
    start: &str,
    end: &str,
    instructor_id: Option<&str>,
    instructor_name: &str,
) -> PeriodFields {
    PeriodFields {
        name: "dbms".to_string(),
        instructor_id: instructor_id.map(str::to_string),
        instructor_name: instructor_name.to_string(),
        room: "lt-1".to_string(),
        start_time: start.to_string(),
        end_time: end.to_string(),
        branch: branch.to_string(),
        batch: None,
        semester,
    }
}

/// Writes a daily row directly, bypassing the conflict check.
pub async fn seed_daily(pool: &SqlitePool, fields: PeriodFields) -> DailyPeriod {
    let period = DailyPeriod::new(fields, Utc::now().to_rfc3339());
    db::daily::insert(pool, &period)
        .await
        .expect("Failed to insert daily period");
    period
}
