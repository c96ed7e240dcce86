//! SurrealDB implementation of [`SubmissionRepository`].
//!
//! Uniqueness of `(user_id, challenge_id)` is enforced by the
//! `idx_submission_user_challenge` UNIQUE index. `find_or_create` looks
//! the pair up first and, if its own CREATE loses a race against a
//! concurrent caller, re-reads the row that won.

use chrono::{DateTime, Utc};
use stepwise_core::error::StepwiseResult;
use stepwise_core::models::submission::{
    CreateSubmission, Submission, SubmissionStatus, UpdateSubmission,
};
use stepwise_core::repository::SubmissionRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

const SELECT_SUBMISSION: &str = "SELECT record::id(id) AS record_id, * FROM submission";
const SELECT_SUBMISSION_BY_ID: &str =
    "SELECT record::id(id) AS record_id, * FROM type::record('submission', $id)";

#[derive(Debug, SurrealValue)]
struct SubmissionRow {
    record_id: String,
    user_id: String,
    lesson_id: String,
    challenge_id: String,
    diff: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_status(s: &str) -> Result<SubmissionStatus, DbError> {
    match s {
        "Open" => Ok(SubmissionStatus::Open),
        "Passed" => Ok(SubmissionStatus::Passed),
        "NeedMoreWork" => Ok(SubmissionStatus::NeedMoreWork),
        other => Err(DbError::Corrupt(format!("unknown submission status: {other}"))),
    }
}

fn status_to_string(s: SubmissionStatus) -> &'static str {
    match s {
        SubmissionStatus::Open => "Open",
        SubmissionStatus::Passed => "Passed",
        SubmissionStatus::NeedMoreWork => "NeedMoreWork",
    }
}

impl SubmissionRow {
    fn try_into_submission(self) -> Result<Submission, DbError> {
        Ok(Submission {
            id: parse_uuid("submission", &self.record_id)?,
            user_id: parse_uuid("user", &self.user_id)?,
            lesson_id: parse_uuid("lesson", &self.lesson_id)?,
            challenge_id: parse_uuid("challenge", &self.challenge_id)?,
            diff: self.diff,
            status: parse_status(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn collect_rows(rows: Vec<SubmissionRow>) -> Result<Vec<Submission>, DbError> {
    rows.into_iter()
        .map(SubmissionRow::try_into_submission)
        .collect()
}

/// SurrealDB implementation of the Submission repository.
#[derive(Clone)]
pub struct SurrealSubmissionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSubmissionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn find_pair(
        &self,
        user_id: Uuid,
        challenge_id: Uuid,
    ) -> Result<Option<Submission>, DbError> {
        let mut result = self
            .db
            .query(format!(
                "{SELECT_SUBMISSION} WHERE user_id = $user_id \
                 AND challenge_id = $challenge_id LIMIT 1"
            ))
            .bind(("user_id", user_id.to_string()))
            .bind(("challenge_id", challenge_id.to_string()))
            .await?;
        let rows: Vec<SubmissionRow> = result.take(0)?;
        rows.into_iter()
            .next()
            .map(SubmissionRow::try_into_submission)
            .transpose()
    }

    async fn list_where(&self, column: &'static str, value: Uuid) -> Result<Vec<Submission>, DbError> {
        let mut result = self
            .db
            .query(format!(
                "{SELECT_SUBMISSION} WHERE {column} = $value ORDER BY created_at ASC"
            ))
            .bind(("value", value.to_string()))
            .await?;
        let rows: Vec<SubmissionRow> = result.take(0)?;
        collect_rows(rows)
    }
}

impl<C: Connection> SubmissionRepository for SurrealSubmissionRepository<C> {
    async fn find_or_create(&self, input: CreateSubmission) -> StepwiseResult<(Submission, bool)> {
        if let Some(existing) = self.find_pair(input.user_id, input.challenge_id).await? {
            return Ok((existing, false));
        }

        let id = Uuid::new_v4().to_string();
        let result = self
            .db
            .query(
                "CREATE type::record('submission', $id) SET \
                 user_id = $user_id, lesson_id = $lesson_id, \
                 challenge_id = $challenge_id, diff = $diff, \
                 status = $status;",
            )
            .query(SELECT_SUBMISSION_BY_ID)
            .bind(("id", id.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("lesson_id", input.lesson_id.to_string()))
            .bind(("challenge_id", input.challenge_id.to_string()))
            .bind(("diff", input.diff))
            .bind(("status", status_to_string(SubmissionStatus::Open).to_string()))
            .await
            .map_err(DbError::from)?;

        match result.check() {
            Ok(mut result) => {
                let rows: Vec<SubmissionRow> = result.take(1).map_err(DbError::from)?;
                let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
                    entity: "submission".into(),
                    id,
                })?;
                Ok((row.try_into_submission()?, true))
            }
            Err(e) => {
                // Most likely the unique index: someone else created the
                // pair between our lookup and our CREATE.
                debug!(error = %e, "submission create rejected, re-reading pair");
                let existing = self
                    .find_pair(input.user_id, input.challenge_id)
                    .await?
                    .ok_or_else(|| DbError::Query(e.to_string()))?;
                Ok((existing, false))
            }
        }
    }

    async fn find_by_user_and_challenge(
        &self,
        user_id: Uuid,
        challenge_id: Uuid,
    ) -> StepwiseResult<Option<Submission>> {
        Ok(self.find_pair(user_id, challenge_id).await?)
    }

    async fn update(&self, id: Uuid, input: UpdateSubmission) -> StepwiseResult<Submission> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.diff.is_some() {
            sets.push("diff = $diff");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        sets.push("updated_at = time::now()");

        let mut builder = self
            .db
            .query(format!(
                "UPDATE type::record('submission', $id) SET {};",
                sets.join(", ")
            ))
            .query(SELECT_SUBMISSION_BY_ID)
            .bind(("id", id_str.clone()));

        if let Some(diff) = input.diff {
            builder = builder.bind(("diff", diff));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", status_to_string(status).to_string()));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<SubmissionRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "submission".into(),
            id: id_str,
        })?;

        Ok(row.try_into_submission()?)
    }

    async fn list_by_lesson(&self, lesson_id: Uuid) -> StepwiseResult<Vec<Submission>> {
        Ok(self.list_where("lesson_id", lesson_id).await?)
    }

    async fn list_by_user(&self, user_id: Uuid) -> StepwiseResult<Vec<Submission>> {
        Ok(self.list_where("user_id", user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings_round_trip() {
        for status in [
            SubmissionStatus::Open,
            SubmissionStatus::Passed,
            SubmissionStatus::NeedMoreWork,
        ] {
            assert_eq!(parse_status(status_to_string(status)).unwrap(), status);
        }
        assert!(parse_status("Closed").is_err());
    }
}
