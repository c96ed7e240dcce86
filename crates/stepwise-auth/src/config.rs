//! Authentication configuration.

/// Configuration for the token authenticator.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Optional pepper prepended to passwords before Argon2id verification.
    pub pepper: Option<String>,
    /// Number of random bytes in a freshly minted CLI token (default: 32).
    pub cli_token_bytes: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            pepper: None,
            cli_token_bytes: 32,
        }
    }
}
