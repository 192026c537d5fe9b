use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::models::{Actor, Role};
use crate::services::gate;

pub const ACTOR_ID: &str = "x-actor-id";
pub const ACTOR_NAME: &str = "x-actor-name";
pub const ACTOR_ROLE: &str = "x-actor-role";
pub const ACTOR_ADMIN: &str = "x-actor-admin";
pub const ACTOR_BRANCH: &str = "x-actor-branch";
pub const ACTOR_SEMESTER: &str = "x-actor-semester";

/// Identity asserted by the authenticating gateway in front of this service.
pub struct CurrentActor(pub Actor);

impl<S> FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor = actor_from_headers(&parts.headers)?;
        gate::require_actor(actor).map(CurrentActor)
    }
}

/// `Ok(None)` when no identity header is present. A missing role header
/// means student.
pub fn actor_from_headers(headers: &HeaderMap) -> Result<Option<Actor>, AppError> {
    let Some(id) = header(headers, ACTOR_ID) else {
        return Ok(None);
    };

    let role = match header(headers, ACTOR_ROLE) {
        Some(raw) => raw.parse::<Role>().map_err(AppError::Validation)?,
        None => Role::Student,
    };
    let is_admin = header(headers, ACTOR_ADMIN)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false);
    let semester = header(headers, ACTOR_SEMESTER)
        .map(|v| v.parse::<i32>())
        .transpose()
        .map_err(|_| AppError::Validation(format!("{} must be a number", ACTOR_SEMESTER)))?;

    Ok(Some(Actor {
        id,
        name: header(headers, ACTOR_NAME).unwrap_or_default(),
        role,
        is_admin,
        branch: header(headers, ACTOR_BRANCH),
        semester,
    }))
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
