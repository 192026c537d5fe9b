use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::Weekday;

/// Columns shared by the template, daily and archive stores.
///
/// Rotation copies this struct wholesale between stores, so every store
/// table carries exactly these columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PeriodFields {
    pub name: String,
    pub instructor_id: Option<String>,
    pub instructor_name: String,
    pub room: String,
    pub start_time: String,
    pub end_time: String,
    pub branch: String,
    pub batch: Option<String>,
    pub semester: i32,
}

impl PeriodFields {
    /// Normalizes every string field and checks the shape invariants.
    pub fn validate(self) -> Result<Self, AppError> {
        let fields = PeriodFields {
            name: required("name", &self.name)?,
            instructor_id: self.instructor_id.and_then(non_empty),
            instructor_name: required("instructor_name", &self.instructor_name)?,
            room: required("room", &self.room)?,
            start_time: self.start_time.trim().to_string(),
            end_time: self.end_time.trim().to_string(),
            branch: required("branch", &self.branch)?,
            batch: self.batch.and_then(non_empty),
            semester: self.semester,
        };

        if fields.branch.chars().count() < 2 {
            return Err(AppError::Validation(
                "branch must be at least 2 characters long".to_string(),
            ));
        }
        if !(1..=8).contains(&fields.semester) {
            return Err(AppError::Validation(format!(
                "semester must be between 1 and 8, got {}",
                fields.semester
            )));
        }
        fields.window()?;

        Ok(fields)
    }

    pub fn window(&self) -> Result<TimeWindow, AppError> {
        TimeWindow::parse(&self.start_time, &self.end_time)
    }

    pub fn same_group(&self, other: &PeriodFields) -> bool {
        self.branch == other.branch && self.semester == other.semester
    }
}

/// Half-open `[start, end)` slot of a period within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, AppError> {
        if start >= end {
            return Err(AppError::Validation(format!(
                "start time {} must be before end time {}",
                start.format("%H:%M"),
                end.format("%H:%M")
            )));
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, AppError> {
        Self::new(parse_clock_time(start)?, parse_clock_time(end)?)
    }
}

/// Parses a strict 24h `HH:MM` string.
pub fn parse_clock_time(value: &str) -> Result<NaiveTime, AppError> {
    let bytes = value.as_bytes();
    let well_formed = bytes.len() == 5
        && bytes[2] == b':'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 2 || b.is_ascii_digit());

    if !well_formed {
        return Err(AppError::Validation(format!(
            "time must be in HH:MM format, got {:?}",
            value
        )));
    }

    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| AppError::Validation(format!("invalid time of day: {}", value)))
}

fn required(field: &str, value: &str) -> Result<String, AppError> {
    non_empty(value.to_string())
        .ok_or_else(|| AppError::Validation(format!("{} is required", field)))
}

fn non_empty(value: String) -> Option<String> {
    let value = value.trim().to_lowercase();
    if value.is_empty() { None } else { Some(value) }
}

/// Recurring weekly period; the source of truth for rotation and future queries.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TemplatePeriod {
    pub id: String,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub fields: PeriodFields,
    #[sqlx(try_from = "String")]
    pub weekday: Weekday,
}

/// Today's editable occurrence of a period.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DailyPeriod {
    pub id: String,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub fields: PeriodFields,
    pub is_cancelled: bool,
    pub updated_by: String,
    pub updated_at: String,
}

impl DailyPeriod {
    pub fn new(fields: PeriodFields, updated_at: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            fields,
            is_cancelled: false,
            updated_by: String::new(),
            updated_at,
        }
    }

    /// Materializes a template row for the current day. Values are copied,
    /// so later template edits never reach this row.
    pub fn from_template(template: &TemplatePeriod, updated_at: String) -> Self {
        Self::new(template.fields.clone(), updated_at)
    }
}

/// Immutable snapshot of a daily period for a past calendar date.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ArchivedPeriod {
    pub id: String,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub fields: PeriodFields,
    pub is_cancelled: bool,
    pub updated_by: String,
    pub date: NaiveDate,
    pub archived_at: String,
}

impl ArchivedPeriod {
    pub fn from_daily(daily: &DailyPeriod, date: NaiveDate, archived_at: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            fields: daily.fields.clone(),
            is_cancelled: daily.is_cancelled,
            updated_by: daily.updated_by.clone(),
            date,
            archived_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodSource {
    Daily,
    Archive,
    Template,
}

/// Daily-shaped period returned by the query resolver, whichever store it
/// came from. Template projections carry no id since they are never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledPeriod {
    pub id: Option<String>,
    pub source: PeriodSource,
    #[serde(flatten)]
    pub fields: PeriodFields,
    pub is_cancelled: bool,
    pub updated_by: String,
}

impl ScheduledPeriod {
    pub fn projected(template: &TemplatePeriod) -> Self {
        Self {
            id: None,
            source: PeriodSource::Template,
            fields: template.fields.clone(),
            is_cancelled: false,
            updated_by: String::new(),
        }
    }
}

impl From<DailyPeriod> for ScheduledPeriod {
    fn from(period: DailyPeriod) -> Self {
        Self {
            id: Some(period.id),
            source: PeriodSource::Daily,
            fields: period.fields,
            is_cancelled: period.is_cancelled,
            updated_by: period.updated_by,
        }
    }
}

impl From<ArchivedPeriod> for ScheduledPeriod {
    fn from(period: ArchivedPeriod) -> Self {
        Self {
            id: Some(period.id),
            source: PeriodSource::Archive,
            fields: period.fields,
            is_cancelled: period.is_cancelled,
            updated_by: period.updated_by,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPeriodRequest {
    pub name: String,
    pub instructor_name: String,
    pub room: String,
    pub start_time: String,
    pub end_time: String,
    pub branch: String,
    #[serde(default)]
    pub batch: Option<String>,
    pub semester: i32,
}

impl NewPeriodRequest {
    pub fn into_fields(self, instructor_id: Option<String>) -> Result<PeriodFields, AppError> {
        PeriodFields {
            name: self.name,
            instructor_id,
            instructor_name: self.instructor_name,
            room: self.room,
            start_time: self.start_time,
            end_time: self.end_time,
            branch: self.branch,
            batch: self.batch,
            semester: self.semester,
        }
        .validate()
    }
}

/// Partial edit of a daily period. Branch and semester are fixed once the
/// period exists; `updated_by` is the mandatory audit note.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePeriodRequest {
    pub name: Option<String>,
    pub instructor_name: Option<String>,
    pub room: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub batch: Option<String>,
    pub is_cancelled: Option<bool>,
    pub updated_by: String,
}

impl UpdatePeriodRequest {
    pub fn apply_to(&self, current: &PeriodFields) -> Result<PeriodFields, AppError> {
        let mut next = current.clone();
        if let Some(name) = &self.name {
            next.name = name.clone();
        }
        if let Some(instructor_name) = &self.instructor_name {
            next.instructor_name = instructor_name.clone();
        }
        if let Some(room) = &self.room {
            next.room = room.clone();
        }
        if let Some(start_time) = &self.start_time {
            next.start_time = start_time.clone();
        }
        if let Some(end_time) = &self.end_time {
            next.end_time = end_time.clone();
        }
        if let Some(batch) = &self.batch {
            next.batch = Some(batch.clone());
        }
        next.validate()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelPeriodRequest {
    pub updated_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplatePeriodRequest {
    #[serde(flatten)]
    pub period: NewPeriodRequest,
    #[serde(default)]
    pub instructor_id: Option<String>,
    pub weekday: Weekday,
}

/// Normalizes a free-text audit note the same way stored strings are.
pub fn audit_note(value: &str) -> Result<String, AppError> {
    required("updated_by", value)
}
