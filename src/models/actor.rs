use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Instructor,
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "instructor" | "teacher" => Ok(Role::Instructor),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// The authenticated caller of an operation.
///
/// `branch` and `semester` are only meaningful for students and are used to
/// scope their queries when they do not ask for a specific group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub semester: Option<i32>,
}

impl Actor {
    pub fn is_instructor(&self) -> bool {
        self.role == Role::Instructor
    }
}
