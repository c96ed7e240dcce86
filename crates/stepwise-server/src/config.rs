//! Command-line and environment configuration.

use std::time::Duration;

use clap::Parser;
use secrecy::SecretString;
use stepwise_api::{NotifyConfig, ResolverConfig};
use stepwise_auth::AuthConfig;
use stepwise_db::DbConfig;

#[derive(Parser)]
#[command(name = "stepwise", version, about = "Stepwise resolver host")]
pub struct Args {
    /// SurrealDB WebSocket address.
    #[arg(long, env = "STEPWISE_DB_URL", default_value = "127.0.0.1:8000")]
    pub db_url: String,

    #[arg(long, env = "STEPWISE_DB_NAMESPACE", default_value = "stepwise")]
    pub db_namespace: String,

    #[arg(long, env = "STEPWISE_DB_DATABASE", default_value = "main")]
    pub db_database: String,

    #[arg(long, env = "STEPWISE_DB_USERNAME", default_value = "root")]
    pub db_username: String,

    #[arg(long, env = "STEPWISE_DB_PASSWORD", default_value = "root", hide_env_values = true)]
    pub db_password: String,

    /// Skip schema migrations on startup.
    #[arg(long, env = "STEPWISE_DB_SKIP_MIGRATIONS")]
    pub skip_migrations: bool,

    /// Pepper prepended to passwords before hashing and verification.
    #[arg(long, env = "STEPWISE_PASSWORD_PEPPER", hide_env_values = true)]
    pub password_pepper: Option<String>,

    /// Chat API root, e.g. `https://chat.example.com/api/v4`. Unset disables
    /// submission notifications.
    #[arg(long, env = "STEPWISE_CHAT_URL")]
    pub chat_url: Option<String>,

    #[arg(long, env = "STEPWISE_CHAT_TEAM", default_value = "stepwise")]
    pub chat_team: String,

    #[arg(long, env = "STEPWISE_CHAT_TOKEN", default_value = "", hide_env_values = true)]
    pub chat_token: String,

    /// Upper bound for one submission notification, in seconds.
    #[arg(long, env = "STEPWISE_NOTIFY_TIMEOUT_SECS", default_value_t = 5)]
    pub notify_timeout_secs: u64,
}

impl Args {
    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            url: self.db_url.clone(),
            namespace: self.db_namespace.clone(),
            database: self.db_database.clone(),
            username: self.db_username.clone(),
            password: self.db_password.clone(),
            migrate: !self.skip_migrations,
        }
    }

    pub fn notify_config(&self) -> NotifyConfig {
        NotifyConfig {
            base_url: self.chat_url.clone().filter(|u| !u.trim().is_empty()),
            team: self.chat_team.clone(),
            access_token: SecretString::from(self.chat_token.clone()),
            timeout: self.notify_timeout(),
        }
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            auth: AuthConfig {
                pepper: self.password_pepper.clone().filter(|p| !p.is_empty()),
                ..AuthConfig::default()
            },
            notify_timeout: self.notify_timeout(),
        }
    }

    fn notify_timeout(&self) -> Duration {
        Duration::from_secs(self.notify_timeout_secs.max(1))
    }
}
