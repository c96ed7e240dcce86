//! Outbound chat notifications for new submissions.
//!
//! Delivery is best-effort: callers log a [`NotifyError`] and move on.
//! [`HttpChatNotifier`] talks to a Mattermost-style v4 API:
//!
//! - `GET  {base}/users/username/{username}`
//! - `GET  {base}/teams/name/{team}/channels/name/{channel}`
//! - `POST {base}/posts`

use std::time::Duration;

use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;
use stepwise_core::error::StepwiseError;
use stepwise_core::models::submission::Submission;
use thiserror::Error;
use tracing::{Instrument, debug, info_span};
use url::Url;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("chat notifications are disabled")]
    Disabled,

    #[error("invalid chat service url: {0}")]
    InvalidUrl(String),

    #[error("chat request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("chat service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("notification timed out after {0:?}")]
    Timeout(Duration),

    #[error("lesson {0} not found")]
    LessonNotFound(Uuid),

    #[error("store lookup failed: {0}")]
    Store(#[source] StepwiseError),
}

/// Chat service connection settings.
#[derive(Clone)]
pub struct NotifyConfig {
    /// API root, e.g. `https://chat.example.com/api/v4`. `None` disables
    /// notifications.
    pub base_url: Option<String>,
    /// Team that owns the lesson channels.
    pub team: String,
    /// Bot access token sent as a bearer token.
    pub access_token: SecretString,
    /// Upper bound for a whole notification, lookups included.
    pub timeout: Duration,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            team: "stepwise".into(),
            access_token: SecretString::default(),
            timeout: Duration::from_secs(5),
        }
    }
}

impl std::fmt::Debug for NotifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyConfig")
            .field("base_url", &self.base_url)
            .field("team", &self.team)
            .field("access_token", &"***")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// The submitter's account on the chat service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatUser {
    pub id: String,
    pub username: String,
}

/// What gets posted to the lesson channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionNotice {
    pub submission_id: Uuid,
    pub challenge_id: Uuid,
    pub lesson_title: String,
    pub channel: String,
    pub chat_user: ChatUser,
    pub message: String,
}

impl SubmissionNotice {
    pub fn new(
        submission: &Submission,
        lesson_title: &str,
        channel: &str,
        chat_user: ChatUser,
    ) -> Self {
        let message = format!(
            "@{} submitted a solution to **{}** (challenge `{}`)",
            chat_user.username, lesson_title, submission.challenge_id
        );
        Self {
            submission_id: submission.id,
            challenge_id: submission.challenge_id,
            lesson_title: lesson_title.to_string(),
            channel: channel.to_string(),
            chat_user,
            message,
        }
    }
}

/// Outbound chat capability used by submission intake.
pub trait ChatNotifier: Send + Sync {
    /// `false` skips notification entirely.
    fn enabled(&self) -> bool {
        true
    }

    fn lookup_user(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<ChatUser, NotifyError>> + Send;

    fn notify(
        &self,
        notice: &SubmissionNotice,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

/// Notifier used when no chat service is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledNotifier;

impl ChatNotifier for DisabledNotifier {
    fn enabled(&self) -> bool {
        false
    }

    async fn lookup_user(&self, _username: &str) -> Result<ChatUser, NotifyError> {
        Err(NotifyError::Disabled)
    }

    async fn notify(&self, _notice: &SubmissionNotice) -> Result<(), NotifyError> {
        Err(NotifyError::Disabled)
    }
}

#[derive(Debug, Deserialize)]
struct ChannelRecord {
    id: String,
}

/// reqwest-backed [`ChatNotifier`].
#[derive(Clone)]
pub struct HttpChatNotifier {
    client: Client,
    base_url: Url,
    team: String,
    access_token: SecretString,
}

impl HttpChatNotifier {
    /// Build a notifier from `config`.
    ///
    /// # Errors
    /// Returns an error if no base url is configured, it does not parse,
    /// or the HTTP client cannot be built.
    pub fn new(config: &NotifyConfig) -> Result<Self, NotifyError> {
        let raw = config.base_url.as_deref().ok_or(NotifyError::Disabled)?;
        let base_url = Url::parse(raw).map_err(|e| NotifyError::InvalidUrl(format!("{raw}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(NotifyError::InvalidUrl(raw.to_string()));
        }

        let client = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url,
            team: config.team.clone(),
            access_token: config.access_token.clone(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, NotifyError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| NotifyError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn channel_id(&self, channel: &str) -> Result<String, NotifyError> {
        let url = self.endpoint(&["teams", "name", &self.team, "channels", "name", channel])?;
        let response = self
            .client
            .get(url)
            .bearer_auth(self.access_token.expose_secret())
            .send()
            .await?;
        let record: ChannelRecord = success(response).await?.json().await?;
        Ok(record.id)
    }
}

/// Pass 2xx responses through, turn anything else into `Status`.
async fn success(response: Response) -> Result<Response, NotifyError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(NotifyError::Status {
        status: status.as_u16(),
        body,
    })
}

impl ChatNotifier for HttpChatNotifier {
    async fn lookup_user(&self, username: &str) -> Result<ChatUser, NotifyError> {
        let url = self.endpoint(&["users", "username", username])?;
        let span = info_span!("chat.lookup_user", http.method = "GET", url = %url);
        let response = self
            .client
            .get(url)
            .bearer_auth(self.access_token.expose_secret())
            .send()
            .instrument(span)
            .await?;
        Ok(success(response).await?.json().await?)
    }

    async fn notify(&self, notice: &SubmissionNotice) -> Result<(), NotifyError> {
        let channel_id = self.channel_id(&notice.channel).await?;
        let url = self.endpoint(&["posts"])?;
        let span = info_span!("chat.post", http.method = "POST", url = %url);
        let body = json!({
            "channel_id": channel_id,
            "message": notice.message,
            "props": {
                "submission_id": notice.submission_id,
                "challenge_id": notice.challenge_id,
                "lesson_title": notice.lesson_title,
            },
        });
        let response = self
            .client
            .post(url)
            .bearer_auth(self.access_token.expose_secret())
            .json(&body)
            .send()
            .instrument(span)
            .await?;
        success(response).await?;
        debug!(channel = %notice.channel, "posted submission notice");
        Ok(())
    }
}
