//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Lookups that may legitimately
//! find nothing return `Option` (or an empty `Vec`); absence is never an
//! error. Only writes against a missing record fail with `NotFound`.

use uuid::Uuid;

use crate::error::StepwiseResult;
use crate::models::{
    lesson::{CreateLesson, Lesson},
    submission::{CreateSubmission, Submission, UpdateSubmission},
    user::{CreateUser, UpdateUser, User},
    user_lesson::{CreateUserLesson, UserLesson},
};

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = StepwiseResult<User>> + Send;
    fn find_by_id(&self, id: Uuid) -> impl Future<Output = StepwiseResult<Option<User>>> + Send;
    fn find_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = StepwiseResult<Option<User>>> + Send;
    fn find_by_cli_token(
        &self,
        cli_token: &str,
    ) -> impl Future<Output = StepwiseResult<Option<User>>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = StepwiseResult<User>> + Send;
    /// Store `cli_token` only if the user holds none (absent or empty),
    /// then return the user as stored. When another writer got there
    /// first the returned user carries that writer's token.
    fn set_cli_token_if_absent(
        &self,
        id: Uuid,
        cli_token: &str,
    ) -> impl Future<Output = StepwiseResult<User>> + Send;
}

pub trait LessonRepository: Send + Sync {
    fn create(&self, input: CreateLesson) -> impl Future<Output = StepwiseResult<Lesson>> + Send;
    fn find_by_id(&self, id: Uuid)
    -> impl Future<Output = StepwiseResult<Option<Lesson>>> + Send;
    /// All lessons ordered by `order`, then creation time.
    fn list(&self) -> impl Future<Output = StepwiseResult<Vec<Lesson>>> + Send;
}

pub trait SubmissionRepository: Send + Sync {
    /// Return the submission for `(input.user_id, input.challenge_id)`,
    /// creating it from `input` if none exists. The flag is `true` when
    /// this call created the row.
    ///
    /// Implementations must converge to a single row per pair even when
    /// called concurrently for the same pair.
    fn find_or_create(
        &self,
        input: CreateSubmission,
    ) -> impl Future<Output = StepwiseResult<(Submission, bool)>> + Send;
    fn find_by_user_and_challenge(
        &self,
        user_id: Uuid,
        challenge_id: Uuid,
    ) -> impl Future<Output = StepwiseResult<Option<Submission>>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateSubmission,
    ) -> impl Future<Output = StepwiseResult<Submission>> + Send;
    fn list_by_lesson(
        &self,
        lesson_id: Uuid,
    ) -> impl Future<Output = StepwiseResult<Vec<Submission>>> + Send;
    fn list_by_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = StepwiseResult<Vec<Submission>>> + Send;
}

pub trait UserLessonRepository: Send + Sync {
    fn create(
        &self,
        input: CreateUserLesson,
    ) -> impl Future<Output = StepwiseResult<UserLesson>> + Send;
    fn list_by_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = StepwiseResult<Vec<UserLesson>>> + Send;
}
