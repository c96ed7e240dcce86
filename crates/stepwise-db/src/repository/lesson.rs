//! SurrealDB implementation of [`LessonRepository`].

use chrono::{DateTime, Utc};
use stepwise_core::error::StepwiseResult;
use stepwise_core::models::lesson::{CreateLesson, Lesson};
use stepwise_core::repository::LessonRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

const SELECT_LESSON_BY_ID: &str =
    "SELECT record::id(id) AS record_id, * FROM type::record('lesson', $id)";

#[derive(Debug, SurrealValue)]
struct LessonRow {
    record_id: String,
    title: String,
    description: Option<String>,
    sort_order: i64,
    chat_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl LessonRow {
    fn try_into_lesson(self) -> Result<Lesson, DbError> {
        Ok(Lesson {
            id: parse_uuid("lesson", &self.record_id)?,
            title: self.title,
            description: self.description,
            order: self.sort_order,
            chat_url: self.chat_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Lesson repository.
#[derive(Clone)]
pub struct SurrealLessonRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealLessonRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> LessonRepository for SurrealLessonRepository<C> {
    async fn create(&self, input: CreateLesson) -> StepwiseResult<Lesson> {
        let id = Uuid::new_v4().to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('lesson', $id) SET \
                 title = $title, description = $description, \
                 sort_order = $sort_order, chat_url = $chat_url;",
            )
            .query(SELECT_LESSON_BY_ID)
            .bind(("id", id.clone()))
            .bind(("title", input.title))
            .bind(("description", input.description))
            .bind(("sort_order", input.order))
            .bind(("chat_url", input.chat_url))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;
        let rows: Vec<LessonRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "lesson".into(),
            id,
        })?;

        Ok(row.try_into_lesson()?)
    }

    async fn find_by_id(&self, id: Uuid) -> StepwiseResult<Option<Lesson>> {
        let mut result = self
            .db
            .query(SELECT_LESSON_BY_ID)
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<LessonRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(LessonRow::try_into_lesson)
            .transpose()?)
    }

    async fn list(&self) -> StepwiseResult<Vec<Lesson>> {
        let mut result = self
            .db
            .query(
                "SELECT record::id(id) AS record_id, * FROM lesson \
                 ORDER BY sort_order ASC, created_at ASC",
            )
            .await
            .map_err(DbError::from)?;
        let rows: Vec<LessonRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(LessonRow::try_into_lesson)
            .collect::<Result<Vec<_>, DbError>>()?)
    }
}
