pub mod extract;

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query};
use axum::routing::{patch, post, put};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::AppError;
use crate::models::*;
use crate::services::gate;
use crate::services::{
    ArchiveReport, PeriodQuery, PeriodQueryResult, PeriodService, QueryResolver, ResetReport,
    RotationService,
};
use crate::state::AppState;

pub use extract::CurrentActor;

#[derive(Deserialize)]
struct TemplateQueryParams {
    weekday: Option<Weekday>,
    branch: Option<String>,
    semester: Option<i32>,
}

#[derive(Deserialize)]
struct RotationParams {
    date: Option<NaiveDate>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/periods", get(query_periods).post(create_period))
        .route("/periods/{id}", patch(update_period))
        .route("/periods/{id}/cancel", patch(cancel_period))
        .route("/templates", get(list_templates).post(create_template))
        .route("/templates/{id}", put(update_template).delete(delete_template))
        .route("/rotation/archive", post(run_archive))
        .route("/rotation/reset", post(run_reset))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn query_periods(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> Result<Json<PeriodQueryResult>, AppError> {
    let Query(query) = query?;
    let result = QueryResolver::from_state(&state)
        .query_periods(&actor, query)
        .await?;
    Ok(Json(result))
}

async fn create_period(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(req): Json<NewPeriodRequest>,
) -> Result<(StatusCode, Json<DailyPeriod>), AppError> {
    let period = PeriodService::from_state(&state)
        .create_daily_period(&actor, req)
        .await?;
    Ok((StatusCode::CREATED, Json(period)))
}

async fn update_period(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Json(req): Json<UpdatePeriodRequest>,
) -> Result<Json<DailyPeriod>, AppError> {
    let period = PeriodService::from_state(&state)
        .update_daily_period(&actor, &id, req)
        .await?;
    Ok(Json(period))
}

async fn cancel_period(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Json(req): Json<CancelPeriodRequest>,
) -> Result<Json<DailyPeriod>, AppError> {
    let period = PeriodService::from_state(&state)
        .cancel_daily_period(&actor, &id, &req.updated_by)
        .await?;
    Ok(Json(period))
}

async fn list_templates(
    State(state): State<AppState>,
    CurrentActor(_actor): CurrentActor,
    params: Result<Query<TemplateQueryParams>, QueryRejection>,
) -> Result<Json<Vec<TemplatePeriod>>, AppError> {
    let Query(params) = params?;
    let periods = PeriodService::from_state(&state)
        .list_template_periods(params.weekday, params.branch.as_deref(), params.semester)
        .await?;
    Ok(Json(periods))
}

async fn create_template(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(req): Json<TemplatePeriodRequest>,
) -> Result<(StatusCode, Json<TemplatePeriod>), AppError> {
    let period = PeriodService::from_state(&state)
        .create_template_period(&actor, req)
        .await?;
    Ok((StatusCode::CREATED, Json(period)))
}

async fn update_template(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Json(req): Json<TemplatePeriodRequest>,
) -> Result<Json<TemplatePeriod>, AppError> {
    let period = PeriodService::from_state(&state)
        .update_template_period(&actor, &id, req)
        .await?;
    Ok(Json(period))
}

async fn delete_template(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> Result<Json<TemplatePeriod>, AppError> {
    let period = PeriodService::from_state(&state)
        .delete_template_period(&actor, &id)
        .await?;
    Ok(Json(period))
}

async fn run_archive(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    params: Result<Query<RotationParams>, QueryRejection>,
) -> Result<Json<ArchiveReport>, AppError> {
    let Query(params) = params?;
    gate::require_admin(&actor)?;
    let rotation = RotationService::from_state(&state);
    let report = match params.date {
        Some(date) => rotation.archive_day(date).await?,
        None => rotation.run_archive_job().await?,
    };
    Ok(Json(report))
}

async fn run_reset(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    params: Result<Query<RotationParams>, QueryRejection>,
) -> Result<Json<ResetReport>, AppError> {
    let Query(params) = params?;
    gate::require_admin(&actor)?;
    let rotation = RotationService::from_state(&state);
    let report = match params.date {
        Some(date) => rotation.reset_day(date).await?,
        None => rotation.run_reset_job().await?,
    };
    Ok(Json(report))
}
