//! Shared fixtures for resolver integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use stepwise_api::{
    ChatNotifier, ChatUser, NotifyError, ResolverConfig, Resolvers, Stores, SubmissionNotice,
};
use stepwise_core::models::lesson::{CreateLesson, Lesson};
use stepwise_core::models::user::{CreateUser, UpdateUser, User};
use stepwise_core::repository::{LessonRepository, UserRepository};
use stepwise_db::repository::{
    SurrealLessonRepository, SurrealSubmissionRepository, SurrealUserLessonRepository,
    SurrealUserRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

pub const PASSWORD: &str = "correct-horse-battery";
pub const CLI_TOKEN: &str = "alice-cli-token";

pub type SurrealStores = Stores<
    SurrealUserRepository<Db>,
    SurrealLessonRepository<Db>,
    SurrealSubmissionRepository<Db>,
    SurrealUserLessonRepository<Db>,
>;

pub type TestResolvers<N> = Resolvers<
    SurrealUserRepository<Db>,
    SurrealLessonRepository<Db>,
    SurrealSubmissionRepository<Db>,
    SurrealUserLessonRepository<Db>,
    N,
>;

/// In-memory DB with migrations applied, wrapped in repositories.
pub async fn stores() -> SurrealStores {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    stepwise_db::run_migrations(&db).await.unwrap();

    Stores {
        users: SurrealUserRepository::new(db.clone()),
        lessons: SurrealLessonRepository::new(db.clone()),
        submissions: SurrealSubmissionRepository::new(db.clone()),
        progress: SurrealUserLessonRepository::new(db),
    }
}

pub fn resolvers<N: ChatNotifier + 'static>(
    stores: &SurrealStores,
    notifier: N,
    notify_timeout: Duration,
) -> TestResolvers<N> {
    Resolvers::new(
        stores.clone(),
        notifier,
        ResolverConfig {
            notify_timeout,
            ..ResolverConfig::default()
        },
    )
}

/// Create a user, optionally holding a CLI token already.
pub async fn seed_user(stores: &SurrealStores, username: &str, cli_token: Option<&str>) -> User {
    let user = stores
        .users
        .create(CreateUser {
            username: username.into(),
            email: format!("{username}@example.com"),
            name: None,
            password: PASSWORD.into(),
        })
        .await
        .unwrap();

    match cli_token {
        Some(token) => stores
            .users
            .update(
                user.id,
                UpdateUser {
                    cli_token: Some(Some(token.into())),
                    ..Default::default()
                },
            )
            .await
            .unwrap(),
        None => user,
    }
}

pub async fn seed_lesson(stores: &SurrealStores, title: &str, chat_url: Option<&str>) -> Lesson {
    stores
        .lessons
        .create(CreateLesson {
            title: title.into(),
            description: None,
            order: 0,
            chat_url: chat_url.map(Into::into),
        })
        .await
        .unwrap()
}

/// Records every notice; optionally fails or stalls.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub notices: Arc<Mutex<Vec<SubmissionNotice>>>,
    pub lookups: Arc<Mutex<Vec<String>>>,
    pub fail_with_status: Option<u16>,
    pub stall: Option<Duration>,
}

impl RecordingNotifier {
    pub fn failing(status: u16) -> Self {
        Self {
            fail_with_status: Some(status),
            ..Self::default()
        }
    }

    pub fn stalling(stall: Duration) -> Self {
        Self {
            stall: Some(stall),
            ..Self::default()
        }
    }

    pub fn notices(&self) -> Vec<SubmissionNotice> {
        self.notices.lock().unwrap().clone()
    }
}

impl ChatNotifier for RecordingNotifier {
    async fn lookup_user(&self, username: &str) -> Result<ChatUser, NotifyError> {
        self.lookups.lock().unwrap().push(username.to_string());
        Ok(ChatUser {
            id: format!("chat-{username}"),
            username: username.to_string(),
        })
    }

    async fn notify(&self, notice: &SubmissionNotice) -> Result<(), NotifyError> {
        if let Some(stall) = self.stall {
            tokio::time::sleep(stall).await;
        }
        if let Some(status) = self.fail_with_status {
            return Err(NotifyError::Status {
                status,
                body: "upstream unavailable".into(),
            });
        }
        self.notices.lock().unwrap().push(notice.clone());
        Ok(())
    }
}
