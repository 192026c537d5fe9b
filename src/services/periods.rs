use std::sync::Arc;

use chrono::Utc;
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::db::{daily, templates};
use crate::error::AppError;
use crate::models::period::audit_note;
use crate::models::{
    Actor, DailyPeriod, NewPeriodRequest, TemplatePeriod, TemplatePeriodRequest,
    UpdatePeriodRequest, Weekday,
};
use crate::services::{conflict, gate};
use crate::state::AppState;

/// Mutations on the daily and template stores.
pub struct PeriodService {
    db: SqlitePool,
    write_lock: Arc<Mutex<()>>,
}

impl PeriodService {
    pub fn new(db: SqlitePool, write_lock: Arc<Mutex<()>>) -> Self {
        Self { db, write_lock }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.db.clone(), state.write_lock.clone())
    }

    /// Adds an extra class to today's schedule, owned by the calling instructor.
    pub async fn create_daily_period(
        &self,
        actor: &Actor,
        req: NewPeriodRequest,
    ) -> Result<DailyPeriod, AppError> {
        gate::require_instructor(actor)?;
        let fields = req.into_fields(Some(actor.id.clone()))?;
        let window = fields.window()?;

        let _guard = self.write_lock.lock().await;
        let mut tx = self.db.begin().await?;

        let group = daily::fetch_filtered(&mut *tx, Some(fields.branch.as_str()), Some(fields.semester)).await?;
        if let Some(hit) = conflict::find_conflict(&fields, &window, &group, None) {
            return Err(overlap_error(hit));
        }

        let period = DailyPeriod::new(fields, Utc::now().to_rfc3339());
        daily::insert(&mut *tx, &period).await?;
        tx.commit().await?;

        info!(
            "Daily period {} created by {} ({} sem {} {}-{})",
            period.id,
            actor.id,
            period.fields.branch,
            period.fields.semester,
            period.fields.start_time,
            period.fields.end_time
        );
        Ok(period)
    }

    pub async fn update_daily_period(
        &self,
        actor: &Actor,
        id: &str,
        req: UpdatePeriodRequest,
    ) -> Result<DailyPeriod, AppError> {
        gate::require_instructor(actor)?;
        let updated_by = audit_note(&req.updated_by)?;

        let _guard = self.write_lock.lock().await;
        let mut tx = self.db.begin().await?;

        let mut period = daily::find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("Period"))?;
        let matched = gate::authorize_daily_mutation(actor, &period.fields)?;

        let fields = req.apply_to(&period.fields)?;
        let window = fields.window()?;
        if period.fields.window().ok() != Some(window) {
            let group = daily::fetch_filtered(&mut *tx, Some(fields.branch.as_str()), Some(fields.semester)).await?;
            if let Some(hit) = conflict::find_conflict(&fields, &window, &group, Some(id)) {
                return Err(overlap_error(hit));
            }
        }

        period.fields = fields;
        // The editor becomes the id-owner, retiring any name-only ownership.
        period.fields.instructor_id = Some(actor.id.clone());
        if let Some(is_cancelled) = req.is_cancelled {
            period.is_cancelled = is_cancelled;
        }
        period.updated_by = updated_by;
        period.updated_at = Utc::now().to_rfc3339();

        if !daily::update(&mut *tx, &period).await? {
            return Err(AppError::NotFound("Period"));
        }
        tx.commit().await?;

        debug!("Daily period {} updated by {} (owner match: {:?})", id, actor.id, matched);
        Ok(period)
    }

    pub async fn cancel_daily_period(
        &self,
        actor: &Actor,
        id: &str,
        note: &str,
    ) -> Result<DailyPeriod, AppError> {
        gate::require_instructor(actor)?;
        let updated_by = audit_note(note)?;

        let _guard = self.write_lock.lock().await;
        let mut tx = self.db.begin().await?;

        let mut period = daily::find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("Period"))?;
        gate::authorize_daily_mutation(actor, &period.fields)?;

        period.is_cancelled = true;
        period.updated_by = updated_by;
        period.updated_at = Utc::now().to_rfc3339();

        if !daily::update(&mut *tx, &period).await? {
            return Err(AppError::NotFound("Period"));
        }
        tx.commit().await?;

        info!("Daily period {} cancelled by {}", id, actor.id);
        Ok(period)
    }

    pub async fn create_template_period(
        &self,
        actor: &Actor,
        req: TemplatePeriodRequest,
    ) -> Result<TemplatePeriod, AppError> {
        gate::require_admin(actor)?;
        let period = TemplatePeriod {
            id: Uuid::new_v4().to_string(),
            fields: req.period.into_fields(req.instructor_id)?,
            weekday: req.weekday,
        };

        templates::insert(&self.db, &period).await?;
        info!("Template period {} added for {}", period.id, period.weekday);
        Ok(period)
    }

    /// Replaces every field of a template period. Already materialized daily
    /// periods are left untouched.
    pub async fn update_template_period(
        &self,
        actor: &Actor,
        id: &str,
        req: TemplatePeriodRequest,
    ) -> Result<TemplatePeriod, AppError> {
        gate::require_admin(actor)?;
        let period = TemplatePeriod {
            id: id.to_string(),
            fields: req.period.into_fields(req.instructor_id)?,
            weekday: req.weekday,
        };

        if !templates::update(&self.db, &period).await? {
            return Err(AppError::NotFound("Template period"));
        }
        info!("Template period {} updated", id);
        Ok(period)
    }

    pub async fn delete_template_period(
        &self,
        actor: &Actor,
        id: &str,
    ) -> Result<TemplatePeriod, AppError> {
        gate::require_admin(actor)?;
        let period = templates::find_by_id(&self.db, id)
            .await?
            .ok_or(AppError::NotFound("Template period"))?;

        if !templates::delete(&self.db, id).await? {
            return Err(AppError::NotFound("Template period"));
        }
        info!("Template period {} deleted", id);
        Ok(period)
    }

    pub async fn list_template_periods(
        &self,
        weekday: Option<Weekday>,
        branch: Option<&str>,
        semester: Option<i32>,
    ) -> Result<Vec<TemplatePeriod>, AppError> {
        let branch = branch.map(|b| b.trim().to_lowercase());
        Ok(templates::fetch_filtered(&self.db, weekday, branch.as_deref(), semester).await?)
    }
}

fn overlap_error(existing: &DailyPeriod) -> AppError {
    AppError::Conflict(format!(
        "Period time overlaps with {} ({}-{})",
        existing.fields.name, existing.fields.start_time, existing.fields.end_time
    ))
}
