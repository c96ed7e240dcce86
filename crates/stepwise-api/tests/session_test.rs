//! Session assembly against counting in-process stores.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::Utc;
use stepwise_api::SessionAssembler;
use stepwise_core::error::{StepwiseError, StepwiseResult};
use stepwise_core::models::session::SessionContext;
use stepwise_core::models::submission::{
    CreateSubmission, Submission, SubmissionStatus, UpdateSubmission,
};
use stepwise_core::models::user::{CreateUser, UpdateUser, User};
use stepwise_core::models::user_lesson::{CreateUserLesson, UserLesson};
use stepwise_core::repository::{SubmissionRepository, UserLessonRepository, UserRepository};
use uuid::Uuid;

#[derive(Clone, Default)]
struct Calls(Arc<AtomicUsize>);

impl Calls {
    fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

struct FixedUsers {
    user: Option<User>,
    calls: Calls,
}

impl UserRepository for FixedUsers {
    async fn create(&self, _input: CreateUser) -> StepwiseResult<User> {
        unimplemented!("read-only fixture")
    }

    async fn find_by_id(&self, id: Uuid) -> StepwiseResult<Option<User>> {
        self.calls.hit();
        Ok(self.user.clone().filter(|u| u.id == id))
    }

    async fn find_by_username(&self, _username: &str) -> StepwiseResult<Option<User>> {
        self.calls.hit();
        Ok(None)
    }

    async fn find_by_cli_token(&self, _cli_token: &str) -> StepwiseResult<Option<User>> {
        self.calls.hit();
        Ok(None)
    }

    async fn update(&self, _id: Uuid, _input: UpdateUser) -> StepwiseResult<User> {
        unimplemented!("read-only fixture")
    }

    async fn set_cli_token_if_absent(&self, _id: Uuid, _cli_token: &str) -> StepwiseResult<User> {
        unimplemented!("read-only fixture")
    }
}

struct FixedSubmissions {
    rows: Vec<Submission>,
    calls: Calls,
    fail_listing: bool,
}

impl SubmissionRepository for FixedSubmissions {
    async fn find_or_create(&self, _input: CreateSubmission) -> StepwiseResult<(Submission, bool)> {
        unimplemented!("read-only fixture")
    }

    async fn find_by_user_and_challenge(
        &self,
        _user_id: Uuid,
        _challenge_id: Uuid,
    ) -> StepwiseResult<Option<Submission>> {
        self.calls.hit();
        Ok(None)
    }

    async fn update(&self, _id: Uuid, _input: UpdateSubmission) -> StepwiseResult<Submission> {
        unimplemented!("read-only fixture")
    }

    async fn list_by_lesson(&self, lesson_id: Uuid) -> StepwiseResult<Vec<Submission>> {
        self.calls.hit();
        Ok(self.rows.iter().filter(|s| s.lesson_id == lesson_id).cloned().collect())
    }

    async fn list_by_user(&self, user_id: Uuid) -> StepwiseResult<Vec<Submission>> {
        self.calls.hit();
        if self.fail_listing {
            return Err(StepwiseError::Database("submission listing failed".into()));
        }
        Ok(self.rows.iter().filter(|s| s.user_id == user_id).cloned().collect())
    }
}

struct FixedProgress {
    rows: Vec<UserLesson>,
    calls: Calls,
}

impl UserLessonRepository for FixedProgress {
    async fn create(&self, _input: CreateUserLesson) -> StepwiseResult<UserLesson> {
        unimplemented!("read-only fixture")
    }

    async fn list_by_user(&self, user_id: Uuid) -> StepwiseResult<Vec<UserLesson>> {
        self.calls.hit();
        Ok(self.rows.iter().filter(|r| r.user_id == user_id).cloned().collect())
    }
}

fn user() -> User {
    User {
        id: Uuid::new_v4(),
        username: "alice".into(),
        email: "alice@example.com".into(),
        name: Some("Alice".into()),
        password_hash: "$argon2id$fixture".into(),
        cli_token: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn submission(user_id: Uuid) -> Submission {
    Submission {
        id: Uuid::new_v4(),
        user_id,
        lesson_id: Uuid::new_v4(),
        challenge_id: Uuid::new_v4(),
        diff: "diff".into(),
        status: SubmissionStatus::Passed,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn progress(user_id: Uuid) -> UserLesson {
    UserLesson {
        id: Uuid::new_v4(),
        user_id,
        lesson_id: Uuid::new_v4(),
        is_passed: true,
        is_teaching: false,
        is_enrolled: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn assembler(
    user: Option<User>,
    submissions: Vec<Submission>,
    lesson_status: Vec<UserLesson>,
    calls: &Calls,
) -> SessionAssembler<FixedUsers, FixedSubmissions, FixedProgress> {
    SessionAssembler::new(
        FixedUsers {
            user,
            calls: calls.clone(),
        },
        FixedSubmissions {
            rows: submissions,
            calls: calls.clone(),
            fail_listing: false,
        },
        FixedProgress {
            rows: lesson_status,
            calls: calls.clone(),
        },
    )
}

#[tokio::test]
async fn no_context_reads_nothing() {
    let calls = Calls::default();
    let alice = user();
    let sessions = assembler(Some(alice.clone()), vec![submission(alice.id)], vec![], &calls);

    assert_eq!(sessions.session(None).await.unwrap(), None);
    assert_eq!(calls.count(), 0);
}

#[tokio::test]
async fn missing_user_yields_no_session() {
    let calls = Calls::default();
    let sessions = assembler(None, vec![], vec![], &calls);
    let context = SessionContext {
        user_id: Uuid::new_v4(),
    };

    assert_eq!(sessions.session(Some(&context)).await.unwrap(), None);
}

#[tokio::test]
async fn session_carries_user_submissions_and_progress() {
    let calls = Calls::default();
    let alice = user();
    let other = Uuid::new_v4();
    let mine = submission(alice.id);
    let status = progress(alice.id);
    let sessions = assembler(
        Some(alice.clone()),
        vec![mine.clone(), submission(other)],
        vec![status.clone(), progress(other)],
        &calls,
    );
    let context = SessionContext { user_id: alice.id };

    let view = sessions.session(Some(&context)).await.unwrap().unwrap();
    assert_eq!(view.user, alice);
    assert_eq!(view.submissions, vec![mine]);
    assert_eq!(view.lesson_status, vec![status]);
    assert_eq!(calls.count(), 3);
}

#[tokio::test]
async fn session_view_serializes_camel_case_without_secrets() {
    let calls = Calls::default();
    let mut alice = user();
    alice.cli_token = Some("secret-token".into());
    let sessions = assembler(Some(alice.clone()), vec![], vec![progress(alice.id)], &calls);
    let context = SessionContext { user_id: alice.id };

    let view = sessions.session(Some(&context)).await.unwrap().unwrap();
    let rendered = serde_json::to_string(&view).unwrap();
    assert!(rendered.contains("lessonStatus"));
    assert!(rendered.contains("\"createdAt\""));
    assert!(!rendered.contains("created_at"));
    assert!(!rendered.contains("secret-token"));
    assert!(!rendered.contains("argon2"));
}

fn failing_listings(
    user: Option<User>,
    calls: &Calls,
) -> SessionAssembler<FixedUsers, FixedSubmissions, FixedProgress> {
    SessionAssembler::new(
        FixedUsers {
            user,
            calls: calls.clone(),
        },
        FixedSubmissions {
            rows: vec![],
            calls: calls.clone(),
            fail_listing: true,
        },
        FixedProgress {
            rows: vec![],
            calls: calls.clone(),
        },
    )
}

#[tokio::test]
async fn missing_user_wins_over_listing_errors() {
    let calls = Calls::default();
    let sessions = failing_listings(None, &calls);
    let context = SessionContext {
        user_id: Uuid::new_v4(),
    };

    assert_eq!(sessions.session(Some(&context)).await.unwrap(), None);
}

#[tokio::test]
async fn listing_errors_surface_for_a_live_user() {
    let calls = Calls::default();
    let alice = user();
    let context = SessionContext { user_id: alice.id };
    let sessions = failing_listings(Some(alice), &calls);

    let err = sessions.session(Some(&context)).await.unwrap_err();
    assert!(matches!(err, StepwiseError::Database(_)));
}
