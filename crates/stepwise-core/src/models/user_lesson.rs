//! Per-(user, lesson) progress marker.
//!
//! Written by the completion tracker; the resolver layer only reads it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserLesson {
    pub id: Uuid,
    pub user_id: Uuid,
    pub lesson_id: Uuid,
    pub is_passed: bool,
    pub is_teaching: bool,
    pub is_enrolled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CreateUserLesson {
    pub user_id: Uuid,
    pub lesson_id: Uuid,
    pub is_passed: bool,
    pub is_teaching: bool,
    pub is_enrolled: bool,
}
