//! Stepwise Auth: password verification and CLI token issuance.

pub mod config;
pub mod error;
pub mod password;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use password::{Argon2Verifier, CredentialVerifier};
pub use service::TokenAuthenticator;
