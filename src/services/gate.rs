//! Authorization decisions for reading and mutating periods.

use serde::Serialize;

use crate::error::AppError;
use crate::models::{Actor, PeriodFields};

/// How an actor was matched as the owner of a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerMatch {
    ById,
    /// Legacy rows created before periods carried an instructor id.
    ByName,
    NoMatch,
}

impl OwnerMatch {
    pub fn is_owner(self) -> bool {
        self != OwnerMatch::NoMatch
    }
}

/// Resolves ownership of a period. A stored instructor id always decides;
/// the case-insensitive name comparison applies only when no id is stored.
pub fn resolve_owner(fields: &PeriodFields, actor_id: &str, actor_name: &str) -> OwnerMatch {
    match fields.instructor_id.as_deref() {
        Some(id) if id == actor_id => OwnerMatch::ById,
        Some(_) => OwnerMatch::NoMatch,
        None => {
            let stored = fields.instructor_name.trim();
            if !stored.is_empty() && stored.to_lowercase() == actor_name.trim().to_lowercase() {
                OwnerMatch::ByName
            } else {
                OwnerMatch::NoMatch
            }
        }
    }
}

pub fn owns(actor: &Actor, fields: &PeriodFields) -> bool {
    resolve_owner(fields, &actor.id, &actor.name).is_owner()
}

pub fn require_actor(actor: Option<Actor>) -> Result<Actor, AppError> {
    match actor {
        Some(actor) if !actor.id.trim().is_empty() => Ok(actor),
        _ => Err(AppError::Unauthenticated),
    }
}

/// Only instructors may add, edit or cancel today's periods.
pub fn require_instructor(actor: &Actor) -> Result<(), AppError> {
    if actor.is_instructor() {
        Ok(())
    } else {
        Err(AppError::ForbiddenRole(
            "Only instructors can change today's periods".to_string(),
        ))
    }
}

pub fn require_admin(actor: &Actor) -> Result<(), AppError> {
    if actor.is_admin {
        Ok(())
    } else {
        Err(AppError::ForbiddenRole(
            "Administrator privileges required".to_string(),
        ))
    }
}

/// Full check for editing or cancelling an existing daily period: role
/// first, then ownership.
pub fn authorize_daily_mutation(actor: &Actor, fields: &PeriodFields) -> Result<OwnerMatch, AppError> {
    require_instructor(actor)?;
    match resolve_owner(fields, &actor.id, &actor.name) {
        OwnerMatch::NoMatch => Err(AppError::ForbiddenOwnership(
            "You can only change your own periods".to_string(),
        )),
        matched => Ok(matched),
    }
}
