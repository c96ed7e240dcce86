//! Read-only listings.

use stepwise_core::error::StepwiseResult;
use stepwise_core::models::lesson::Lesson;
use stepwise_core::models::submission::Submission;
use stepwise_core::repository::{LessonRepository, SubmissionRepository};
use uuid::Uuid;

/// Pass-through listings over the lesson and submission stores.
pub struct QueryFacade<L: LessonRepository, S: SubmissionRepository> {
    lessons: L,
    submissions: S,
}

impl<L: LessonRepository, S: SubmissionRepository> QueryFacade<L, S> {
    pub fn new(lessons: L, submissions: S) -> Self {
        Self {
            lessons,
            submissions,
        }
    }

    /// Every lesson, in store order. Empty when there are none.
    pub async fn lessons(&self) -> StepwiseResult<Vec<Lesson>> {
        self.lessons.list().await
    }

    /// Every submission made against `lesson_id`. Empty when there are none.
    pub async fn submissions(&self, lesson_id: Uuid) -> StepwiseResult<Vec<Submission>> {
        self.submissions.list_by_lesson(lesson_id).await
    }
}
