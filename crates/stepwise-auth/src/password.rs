//! Password verification using Argon2id.

use std::borrow::Cow;

use argon2::password_hash::{self, PasswordHash};
use argon2::{Argon2, PasswordVerifier};

use crate::error::AuthError;

/// Opaque "does this password match this hash" capability.
///
/// Anything other than `Ok(true)` counts as a failed verification.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Argon2id verifier with an optional server-side pepper.
#[derive(Debug, Clone, Default)]
pub struct Argon2Verifier {
    pepper: Option<String>,
}

impl Argon2Verifier {
    pub fn new(pepper: Option<String>) -> Self {
        Self { pepper }
    }
}

impl CredentialVerifier for Argon2Verifier {
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        verify_password(password, hash, self.pepper.as_deref())
    }
}

/// Verify a plaintext password against an Argon2id PHC-format hash.
///
/// If `pepper` is provided it is prepended to the password before
/// verification; it must match the pepper used during hashing.
///
/// Returns `Ok(true)` on match, `Ok(false)` on mismatch, or
/// `Err(AuthError::Crypto)` if the stored hash is malformed.
pub fn verify_password(
    password: &str,
    hash: &str,
    pepper: Option<&str>,
) -> Result<bool, AuthError> {
    let stored = PasswordHash::new(hash)
        .map_err(|e| AuthError::Crypto(format!("unreadable password hash: {e}")))?;
    let candidate = with_pepper(password, pepper);

    match Argon2::default().verify_password(candidate.as_bytes(), &stored) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Crypto(format!("argon2 verification: {e}"))),
    }
}

fn with_pepper<'a>(password: &'a str, pepper: Option<&str>) -> Cow<'a, str> {
    match pepper {
        Some(p) => Cow::Owned(format!("{p}{password}")),
        None => Cow::Borrowed(password),
    }
}
