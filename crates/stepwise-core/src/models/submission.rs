//! Submission domain model.
//!
//! A submission is identified by `(user_id, challenge_id)`: there is at
//! most one row per pair, and resubmitting replaces its `diff`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SubmissionStatus {
    /// Waiting for review.
    #[default]
    Open,
    Passed,
    NeedMoreWork,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: Uuid,
    pub user_id: Uuid,
    pub lesson_id: Uuid,
    pub challenge_id: Uuid,
    pub diff: String,
    pub status: SubmissionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lookup key plus the defaults used when the row has to be created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubmission {
    pub user_id: Uuid,
    pub lesson_id: Uuid,
    pub challenge_id: Uuid,
    pub diff: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateSubmission {
    pub diff: Option<String>,
    pub status: Option<SubmissionStatus>,
}
