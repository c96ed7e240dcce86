//! SurrealDB implementation of [`UserLessonRepository`].

use chrono::{DateTime, Utc};
use stepwise_core::error::StepwiseResult;
use stepwise_core::models::user_lesson::{CreateUserLesson, UserLesson};
use stepwise_core::repository::UserLessonRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct UserLessonRow {
    record_id: String,
    user_id: String,
    lesson_id: String,
    is_passed: bool,
    is_teaching: bool,
    is_enrolled: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserLessonRow {
    fn try_into_user_lesson(self) -> Result<UserLesson, DbError> {
        Ok(UserLesson {
            id: parse_uuid("user_lesson", &self.record_id)?,
            user_id: parse_uuid("user", &self.user_id)?,
            lesson_id: parse_uuid("lesson", &self.lesson_id)?,
            is_passed: self.is_passed,
            is_teaching: self.is_teaching,
            is_enrolled: self.is_enrolled,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the UserLesson repository.
#[derive(Clone)]
pub struct SurrealUserLessonRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserLessonRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> UserLessonRepository for SurrealUserLessonRepository<C> {
    async fn create(&self, input: CreateUserLesson) -> StepwiseResult<UserLesson> {
        let id = Uuid::new_v4().to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('user_lesson', $id) SET \
                 user_id = $user_id, lesson_id = $lesson_id, \
                 is_passed = $is_passed, is_teaching = $is_teaching, \
                 is_enrolled = $is_enrolled;",
            )
            .query("SELECT record::id(id) AS record_id, * FROM type::record('user_lesson', $id)")
            .bind(("id", id.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("lesson_id", input.lesson_id.to_string()))
            .bind(("is_passed", input.is_passed))
            .bind(("is_teaching", input.is_teaching))
            .bind(("is_enrolled", input.is_enrolled))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;
        let rows: Vec<UserLessonRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user_lesson".into(),
            id,
        })?;

        Ok(row.try_into_user_lesson()?)
    }

    async fn list_by_user(&self, user_id: Uuid) -> StepwiseResult<Vec<UserLesson>> {
        let mut result = self
            .db
            .query(
                "SELECT record::id(id) AS record_id, * FROM user_lesson \
                 WHERE user_id = $user_id ORDER BY created_at ASC",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<UserLessonRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(UserLessonRow::try_into_user_lesson)
            .collect::<Result<Vec<_>, DbError>>()?)
    }
}
