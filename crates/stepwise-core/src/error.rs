//! Error types for the Stepwise resolver layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StepwiseError {
    /// Malformed or missing input. The message is surfaced verbatim.
    #[error("{message}")]
    Validation { message: String },

    /// Credential mismatch or unresolved token. The reason is surfaced
    /// verbatim and never says more than the fixed message.
    #[error("{reason}")]
    AuthenticationFailed { reason: String },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StepwiseError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

pub type StepwiseResult<T> = Result<T, StepwiseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_facing_messages_are_bare() {
        assert_eq!(
            StepwiseError::validation("Invalid args").to_string(),
            "Invalid args"
        );
        let err = StepwiseError::AuthenticationFailed {
            reason: "Invalid password".into(),
        };
        assert_eq!(err.to_string(), "Invalid password");
    }
}
