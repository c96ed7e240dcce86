//! Authentication error types.

use stepwise_core::error::StepwiseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid username")]
    InvalidUsername,

    #[error("Invalid password")]
    InvalidPassword,

    #[error("Invalid token")]
    InvalidToken,

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for StepwiseError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidUsername | AuthError::InvalidPassword | AuthError::InvalidToken => {
                StepwiseError::AuthenticationFailed {
                    reason: err.to_string(),
                }
            }
            AuthError::Crypto(msg) => StepwiseError::Crypto(msg),
        }
    }
}
