//! Submission intake: validate, upsert, then notify in the background.
//!
//! The submission row is written before anything else happens. The chat
//! notification runs as a detached task whose errors only reach the
//! logs; its outcome never changes what `create_submission` returns.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use stepwise_auth::{CredentialVerifier, TokenAuthenticator};
use stepwise_core::error::{StepwiseError, StepwiseResult};
use stepwise_core::models::submission::{
    CreateSubmission, Submission, SubmissionStatus, UpdateSubmission,
};
use stepwise_core::repository::{LessonRepository, SubmissionRepository, UserRepository};
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::notify::{ChatNotifier, NotifyError, SubmissionNotice};

const INVALID_ARGS: &str = "Invalid args";

/// Raw `createSubmission` arguments as they arrive from the transport.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionArgs {
    pub cli_token: Option<String>,
    pub challenge_id: Option<String>,
    pub diff: Option<String>,
    pub lesson_id: Option<String>,
}

#[derive(Debug)]
struct ValidArgs {
    cli_token: String,
    challenge_id: Uuid,
    lesson_id: Uuid,
    diff: String,
}

impl SubmissionArgs {
    fn validate(self) -> StepwiseResult<ValidArgs> {
        let invalid = || StepwiseError::validation(INVALID_ARGS);
        let parse_id = |raw: Option<String>| {
            raw.and_then(|s| Uuid::parse_str(s.trim()).ok())
                .ok_or_else(invalid)
        };

        let cli_token = self.cli_token.filter(|t| !t.is_empty()).ok_or_else(invalid)?;
        let diff = self.diff.ok_or_else(invalid)?;
        Ok(ValidArgs {
            cli_token,
            challenge_id: parse_id(self.challenge_id)?,
            lesson_id: parse_id(self.lesson_id)?,
            diff,
        })
    }
}

pub struct SubmissionIntake<U, V, L, S, N>
where
    U: UserRepository,
    V: CredentialVerifier,
    L: LessonRepository,
    S: SubmissionRepository,
    N: ChatNotifier,
{
    auth: Arc<TokenAuthenticator<U, V>>,
    lessons: L,
    submissions: S,
    notifier: Arc<N>,
    notify_timeout: Duration,
    pending: Mutex<JoinSet<()>>,
}

impl<U, V, L, S, N> SubmissionIntake<U, V, L, S, N>
where
    U: UserRepository,
    V: CredentialVerifier,
    L: LessonRepository + Clone + 'static,
    S: SubmissionRepository,
    N: ChatNotifier + 'static,
{
    pub fn new(
        auth: Arc<TokenAuthenticator<U, V>>,
        lessons: L,
        submissions: S,
        notifier: Arc<N>,
        notify_timeout: Duration,
    ) -> Self {
        Self {
            auth,
            lessons,
            submissions,
            notifier,
            notify_timeout,
            pending: Mutex::new(JoinSet::new()),
        }
    }

    /// Record a submission for the user behind `args.cli_token`.
    ///
    /// There is exactly one submission per (user, challenge): the first
    /// call creates it, later calls replace its diff and reopen it for
    /// review. Returns the persisted row.
    pub async fn create_submission(
        &self,
        args: Option<SubmissionArgs>,
    ) -> StepwiseResult<Submission> {
        let args = args
            .ok_or_else(|| StepwiseError::validation(INVALID_ARGS))?
            .validate()?;

        let user = self.auth.resolve_user(&args.cli_token).await?;

        let (submission, created) = self
            .submissions
            .find_or_create(CreateSubmission {
                user_id: user.id,
                lesson_id: args.lesson_id,
                challenge_id: args.challenge_id,
                diff: args.diff.clone(),
            })
            .await?;

        let submission = if created {
            info!(submission_id = %submission.id, user_id = %user.id, "submission created");
            submission
        } else {
            let updated = self
                .submissions
                .update(
                    submission.id,
                    UpdateSubmission {
                        diff: Some(args.diff),
                        status: Some(SubmissionStatus::Open),
                    },
                )
                .await?;
            info!(submission_id = %updated.id, user_id = %user.id, "submission updated");
            updated
        };

        self.dispatch_notification(user.username, submission.clone())
            .await;

        Ok(submission)
    }

    /// Wait for every notification still in flight.
    pub async fn drain_notifications(&self) {
        let mut pending = std::mem::take(&mut *self.pending.lock().await);
        while let Some(joined) = pending.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "notification task aborted");
            }
        }
    }

    async fn dispatch_notification(&self, username: String, submission: Submission) {
        if !self.notifier.enabled() {
            debug!(submission_id = %submission.id, "chat notifications disabled");
            return;
        }

        let lessons = self.lessons.clone();
        let notifier = Arc::clone(&self.notifier);
        let timeout = self.notify_timeout;
        let span = info_span!(
            "submission.notify",
            submission_id = %submission.id,
            lesson_id = %submission.lesson_id,
        );

        let task = async move {
            let outcome = tokio::time::timeout(
                timeout,
                notify_submission(&lessons, notifier.as_ref(), &username, &submission),
            )
            .await
            .unwrap_or(Err(NotifyError::Timeout(timeout)));

            match outcome {
                Ok(()) => debug!("submission notification delivered"),
                Err(e) => warn!(error = %e, "submission notification failed"),
            }
        }
        .instrument(span);

        let mut pending = self.pending.lock().await;
        // Reap finished tasks so the set does not grow without bound.
        while pending.try_join_next().is_some() {}
        pending.spawn(task);
    }
}

/// Fetch the lesson and the submitter's chat account side by side, then
/// post to the lesson's channel.
async fn notify_submission<L, N>(
    lessons: &L,
    notifier: &N,
    username: &str,
    submission: &Submission,
) -> Result<(), NotifyError>
where
    L: LessonRepository,
    N: ChatNotifier,
{
    let (lesson, chat_user) = tokio::join!(
        lessons.find_by_id(submission.lesson_id),
        notifier.lookup_user(username),
    );

    let lesson = lesson
        .map_err(NotifyError::Store)?
        .ok_or(NotifyError::LessonNotFound(submission.lesson_id))?;
    let chat_user = chat_user?;

    let Some(channel) = lesson.chat_channel() else {
        debug!("lesson has no chat channel, nothing to notify");
        return Ok(());
    };

    let notice = SubmissionNotice::new(submission, &lesson.title, channel, chat_user);
    notifier.notify(&notice).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_args() -> SubmissionArgs {
        SubmissionArgs {
            cli_token: Some("tok".into()),
            challenge_id: Some(Uuid::new_v4().to_string()),
            diff: Some("diff --git a/x b/x".into()),
            lesson_id: Some(Uuid::new_v4().to_string()),
        }
    }

    fn assert_invalid(args: SubmissionArgs) {
        let err = args.validate().unwrap_err();
        assert!(matches!(err, StepwiseError::Validation { .. }));
        assert_eq!(err.to_string(), "Invalid args");
    }

    #[test]
    fn complete_args_validate() {
        let args = full_args();
        let challenge = args.challenge_id.clone().unwrap();
        let valid = args.validate().unwrap();
        assert_eq!(valid.challenge_id.to_string(), challenge);
        assert_eq!(valid.cli_token, "tok");
    }

    #[test]
    fn missing_fields_are_invalid() {
        assert_invalid(SubmissionArgs::default());
        assert_invalid(SubmissionArgs {
            cli_token: None,
            ..full_args()
        });
        assert_invalid(SubmissionArgs {
            diff: None,
            ..full_args()
        });
        assert_invalid(SubmissionArgs {
            lesson_id: None,
            ..full_args()
        });
    }

    #[test]
    fn empty_token_and_bad_ids_are_invalid() {
        assert_invalid(SubmissionArgs {
            cli_token: Some(String::new()),
            ..full_args()
        });
        assert_invalid(SubmissionArgs {
            challenge_id: Some("fakeChallengeId".into()),
            ..full_args()
        });
    }

    #[test]
    fn args_deserialize_from_camel_case() {
        let args: SubmissionArgs = serde_json::from_value(serde_json::json!({
            "cliToken": "tok",
            "challengeId": Uuid::nil(),
            "diff": "d",
            "lessonId": Uuid::nil(),
        }))
        .unwrap();
        assert!(args.validate().is_ok());
    }
}
