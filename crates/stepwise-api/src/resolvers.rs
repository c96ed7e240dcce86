//! Composition root: the operations exposed to the transport layer.

use std::sync::Arc;
use std::time::Duration;

use stepwise_auth::{Argon2Verifier, AuthConfig, CredentialVerifier, TokenAuthenticator};
use stepwise_core::error::StepwiseResult;
use stepwise_core::models::lesson::Lesson;
use stepwise_core::models::session::SessionContext;
use stepwise_core::models::submission::Submission;
use stepwise_core::repository::{
    LessonRepository, SubmissionRepository, UserLessonRepository, UserRepository,
};
use uuid::Uuid;

use crate::intake::{SubmissionArgs, SubmissionIntake};
use crate::notify::ChatNotifier;
use crate::query::QueryFacade;
use crate::session::{SessionAssembler, SessionView};

/// One repository per entity.
#[derive(Clone)]
pub struct Stores<U, L, S, P> {
    pub users: U,
    pub lessons: L,
    pub submissions: S,
    pub progress: P,
}

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub auth: AuthConfig,
    /// Upper bound for one background chat notification.
    pub notify_timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            auth: AuthConfig::default(),
            notify_timeout: Duration::from_secs(5),
        }
    }
}

pub struct Resolvers<U, L, S, P, N, V = Argon2Verifier>
where
    U: UserRepository,
    L: LessonRepository,
    S: SubmissionRepository,
    P: UserLessonRepository,
    N: ChatNotifier,
    V: CredentialVerifier,
{
    auth: Arc<TokenAuthenticator<U, V>>,
    session: SessionAssembler<U, S, P>,
    intake: SubmissionIntake<U, V, L, S, N>,
    query: QueryFacade<L, S>,
}

impl<U, L, S, P, N> Resolvers<U, L, S, P, N, Argon2Verifier>
where
    U: UserRepository + Clone,
    L: LessonRepository + Clone + 'static,
    S: SubmissionRepository + Clone,
    P: UserLessonRepository,
    N: ChatNotifier + 'static,
{
    pub fn new(stores: Stores<U, L, S, P>, notifier: N, config: ResolverConfig) -> Self {
        let verifier = Argon2Verifier::new(config.auth.pepper.clone());
        Self::with_verifier(stores, notifier, verifier, config)
    }
}

impl<U, L, S, P, N, V> Resolvers<U, L, S, P, N, V>
where
    U: UserRepository + Clone,
    L: LessonRepository + Clone + 'static,
    S: SubmissionRepository + Clone,
    P: UserLessonRepository,
    N: ChatNotifier + 'static,
    V: CredentialVerifier,
{
    pub fn with_verifier(
        stores: Stores<U, L, S, P>,
        notifier: N,
        verifier: V,
        config: ResolverConfig,
    ) -> Self {
        let Stores {
            users,
            lessons,
            submissions,
            progress,
        } = stores;

        let auth = Arc::new(TokenAuthenticator::with_verifier(
            users.clone(),
            verifier,
            config.auth,
        ));
        let session = SessionAssembler::new(users, submissions.clone(), progress);
        let query = QueryFacade::new(lessons.clone(), submissions.clone());
        let intake = SubmissionIntake::new(
            Arc::clone(&auth),
            lessons,
            submissions,
            Arc::new(notifier),
            config.notify_timeout,
        );

        Self {
            auth,
            session,
            intake,
            query,
        }
    }

    pub async fn lessons(&self) -> StepwiseResult<Vec<Lesson>> {
        self.query.lessons().await
    }

    pub async fn submissions(&self, lesson_id: Uuid) -> StepwiseResult<Vec<Submission>> {
        self.query.submissions(lesson_id).await
    }

    pub async fn is_token_valid(&self, cli_token: Option<&str>) -> StepwiseResult<bool> {
        self.auth.is_token_valid(cli_token).await
    }

    pub async fn cli_token(&self, username: &str, password: &str) -> StepwiseResult<String> {
        self.auth.cli_token(username, password).await
    }

    pub async fn session(
        &self,
        context: Option<&SessionContext>,
    ) -> StepwiseResult<Option<SessionView>> {
        self.session.session(context).await
    }

    pub async fn create_submission(
        &self,
        args: Option<SubmissionArgs>,
    ) -> StepwiseResult<Submission> {
        self.intake.create_submission(args).await
    }

    /// Wait for background notifications; call before shutting down.
    pub async fn drain_notifications(&self) {
        self.intake.drain_notifications().await;
    }
}
