//! Session assembly for authenticated browser requests.

use serde::Serialize;
use stepwise_core::error::StepwiseResult;
use stepwise_core::models::session::SessionContext;
use stepwise_core::models::submission::Submission;
use stepwise_core::models::user::User;
use stepwise_core::models::user_lesson::UserLesson;
use stepwise_core::repository::{SubmissionRepository, UserLessonRepository, UserRepository};
use tracing::debug;

/// Everything the client needs about the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub user: User,
    pub submissions: Vec<Submission>,
    pub lesson_status: Vec<UserLesson>,
}

pub struct SessionAssembler<U, S, P>
where
    U: UserRepository,
    S: SubmissionRepository,
    P: UserLessonRepository,
{
    users: U,
    submissions: S,
    progress: P,
}

impl<U, S, P> SessionAssembler<U, S, P>
where
    U: UserRepository,
    S: SubmissionRepository,
    P: UserLessonRepository,
{
    pub fn new(users: U, submissions: S, progress: P) -> Self {
        Self {
            users,
            submissions,
            progress,
        }
    }

    /// Assemble the session for `context`.
    ///
    /// No context means no identity, and nothing is read. A session
    /// pointing at a user that no longer exists yields `None` as well,
    /// never a partial view and never a listing error.
    pub async fn session(
        &self,
        context: Option<&SessionContext>,
    ) -> StepwiseResult<Option<SessionView>> {
        let Some(context) = context else {
            return Ok(None);
        };

        let (user, submissions, lesson_status) = tokio::join!(
            self.users.find_by_id(context.user_id),
            self.submissions.list_by_user(context.user_id),
            self.progress.list_by_user(context.user_id),
        );

        // The user decides first: a dangling session is `None` whatever
        // the listings returned.
        let Some(user) = user? else {
            debug!(user_id = %context.user_id, "session references a missing user");
            return Ok(None);
        };

        Ok(Some(SessionView {
            user,
            submissions: submissions?,
            lesson_status: lesson_status?,
        }))
    }
}
