//! Token authenticator: CLI token validation and lazy issuance.

use stepwise_core::error::{StepwiseError, StepwiseResult};
use stepwise_core::models::user::User;
use stepwise_core::repository::UserRepository;
use tracing::{debug, info, warn};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password::{Argon2Verifier, CredentialVerifier};
use crate::token;

/// Authenticates CLI clients.
///
/// Generic over the user repository and the password verifier so that
/// the auth layer has no dependency on the database crate.
pub struct TokenAuthenticator<U: UserRepository, V: CredentialVerifier = Argon2Verifier> {
    user_repo: U,
    verifier: V,
    config: AuthConfig,
}

impl<U: UserRepository> TokenAuthenticator<U, Argon2Verifier> {
    /// Authenticator backed by Argon2id, peppered per `config`.
    pub fn new(user_repo: U, config: AuthConfig) -> Self {
        let verifier = Argon2Verifier::new(config.pepper.clone());
        Self::with_verifier(user_repo, verifier, config)
    }
}

impl<U: UserRepository, V: CredentialVerifier> TokenAuthenticator<U, V> {
    pub fn with_verifier(user_repo: U, verifier: V, config: AuthConfig) -> Self {
        Self {
            user_repo,
            verifier,
            config,
        }
    }

    /// `true` iff some user currently holds `cli_token`.
    ///
    /// A missing or empty token is simply not valid; no lookup is made.
    pub async fn is_token_valid(&self, cli_token: Option<&str>) -> StepwiseResult<bool> {
        let Some(cli_token) = cli_token.filter(|t| !t.is_empty()) else {
            return Ok(false);
        };
        Ok(self.user_repo.find_by_cli_token(cli_token).await?.is_some())
    }

    /// Exchange a username and password for the user's CLI token,
    /// minting and persisting one on first use.
    pub async fn cli_token(&self, username: &str, password: &str) -> StepwiseResult<String> {
        // 1. Look up the user.
        let Some(user) = self.user_repo.find_by_username(username).await? else {
            debug!("cli token requested for unknown username");
            return Err(AuthError::InvalidUsername.into());
        };

        // 2. Verify the password. Anything but a positive match fails.
        match self.verifier.verify(password, &user.password_hash) {
            Ok(true) => {}
            Ok(false) => {
                debug!(user_id = %user.id, "cli token password mismatch");
                return Err(AuthError::InvalidPassword.into());
            }
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "password verification failed");
                return Err(AuthError::InvalidPassword.into());
            }
        }

        // 3. Hand back the existing token unchanged.
        if let Some(existing) = user.active_cli_token() {
            return Ok(existing.to_string());
        }

        // 4. Mint and store unless a concurrent request stored one first;
        //    either way hand back what the store now holds.
        let minted = token::generate_cli_token(self.config.cli_token_bytes);
        let stored = self
            .user_repo
            .set_cli_token_if_absent(user.id, &minted)
            .await?;

        match stored.active_cli_token() {
            Some(current) if current == minted => {
                info!(user_id = %user.id, "minted cli token");
                Ok(minted)
            }
            Some(current) => {
                debug!(user_id = %user.id, "cli token minted concurrently, returning stored one");
                Ok(current.to_string())
            }
            None => Err(StepwiseError::Internal(
                "cli token was not persisted".into(),
            )),
        }
    }

    /// Resolve the user acting behind a CLI token.
    pub async fn resolve_user(&self, cli_token: &str) -> StepwiseResult<User> {
        if cli_token.is_empty() {
            return Err(AuthError::InvalidToken.into());
        }
        self.user_repo
            .find_by_cli_token(cli_token)
            .await?
            .ok_or_else(|| AuthError::InvalidToken.into())
    }
}
