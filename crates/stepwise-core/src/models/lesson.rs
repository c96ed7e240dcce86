//! Lesson domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Position of the lesson within the curriculum.
    pub order: i64,
    /// URL of the lesson's chat channel, e.g.
    /// `https://chat.example.com/stepwise/channels/js1-variables`.
    pub chat_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lesson {
    /// Chat channel name: the last non-empty path segment of `chat_url`.
    pub fn chat_channel(&self) -> Option<&str> {
        self.chat_url
            .as_deref()?
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty() && !segment.contains(':'))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLesson {
    pub title: String,
    pub description: Option<String>,
    pub order: i64,
    pub chat_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson(chat_url: Option<&str>) -> Lesson {
        Lesson {
            id: Uuid::new_v4(),
            title: "Variables & Functions".into(),
            description: None,
            order: 1,
            chat_url: chat_url.map(Into::into),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn chat_channel_is_last_segment() {
        let l = lesson(Some("https://chat.example.com/team/channels/js1-variables"));
        assert_eq!(l.chat_channel(), Some("js1-variables"));
    }

    #[test]
    fn chat_channel_ignores_trailing_slash() {
        let l = lesson(Some("https://chat.example.com/team/channels/js2-arrays/"));
        assert_eq!(l.chat_channel(), Some("js2-arrays"));
    }

    #[test]
    fn no_chat_url_no_channel() {
        assert_eq!(lesson(None).chat_channel(), None);
        assert_eq!(lesson(Some("")).chat_channel(), None);
        assert_eq!(lesson(Some("https://")).chat_channel(), None);
    }
}
