//! SurrealDB repository implementations.

mod lesson;
mod submission;
mod user;
mod user_lesson;

pub use lesson::SurrealLessonRepository;
pub use submission::SurrealSubmissionRepository;
pub use user::SurrealUserRepository;
pub use user_lesson::SurrealUserLessonRepository;

use uuid::Uuid;

use crate::error::DbError;

/// Parse a UUID stored as a string column.
fn parse_uuid(column: &str, raw: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::Corrupt(format!("invalid {column} UUID: {e}")))
}
