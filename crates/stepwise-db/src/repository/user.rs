//! SurrealDB implementation of [`UserRepository`].
//!
//! Passwords are hashed with Argon2id using OWASP-recommended parameters
//! (memory: 19 MiB, iterations: 2, parallelism: 1) and a per-hash random
//! salt. An optional pepper can be provided at construction time.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use chrono::{DateTime, Utc};
use stepwise_core::error::StepwiseResult;
use stepwise_core::models::user::{CreateUser, UpdateUser, User};
use stepwise_core::repository::UserRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

const SELECT_USER: &str = "SELECT record::id(id) AS record_id, * FROM user";
const SELECT_USER_BY_ID: &str =
    "SELECT record::id(id) AS record_id, * FROM type::record('user', $id)";
const USERNAME_INDEX: &str = "idx_user_username";

#[derive(Debug, SurrealValue)]
struct UserRow {
    record_id: String,
    username: String,
    email: String,
    name: Option<String>,
    password_hash: String,
    cli_token: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn try_into_user(self) -> Result<User, DbError> {
        Ok(User {
            id: parse_uuid("user", &self.record_id)?,
            username: self.username,
            email: self.email,
            name: self.name,
            password_hash: self.password_hash,
            cli_token: self.cli_token,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn hash_password(password: &str, pepper: Option<&str>) -> Result<String, DbError> {
    // OWASP ASVS recommended: m=19456 (19 MiB), t=2, p=1
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| DbError::Hash(format!("argon2 params error: {e}")))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let input = match pepper {
        Some(p) => format!("{p}{password}"),
        None => password.to_string(),
    };

    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = argon2
        .hash_password(input.as_bytes(), &salt)
        .map_err(|e| DbError::Hash(format!("password hash error: {e}")))?;

    Ok(hash.to_string())
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
    /// Optional server-side pepper for password hashing.
    pepper: Option<String>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db, pepper: None }
    }

    pub fn with_pepper(db: Surreal<C>, pepper: String) -> Self {
        Self {
            db,
            pepper: Some(pepper),
        }
    }

    async fn find_where(
        &self,
        clause: &str,
        column: &'static str,
        value: String,
    ) -> Result<Option<User>, DbError> {
        let mut result = self
            .db
            .query(format!("{SELECT_USER} WHERE {clause} LIMIT 1"))
            .bind((column, value))
            .await?;
        let rows: Vec<UserRow> = result.take(0)?;
        rows.into_iter().next().map(UserRow::try_into_user).transpose()
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> StepwiseResult<User> {
        if self.find_by_username(&input.username).await?.is_some() {
            return Err(DbError::AlreadyExists {
                entity: "user".into(),
            }
            .into());
        }

        let id = Uuid::new_v4().to_string();
        let password_hash = hash_password(&input.password, self.pepper.as_deref())?;

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 username = $username, email = $email, name = $name, \
                 password_hash = $password_hash, cli_token = NONE;",
            )
            .query(SELECT_USER_BY_ID)
            .bind(("id", id.clone()))
            .bind(("username", input.username))
            .bind(("email", input.email))
            .bind(("name", input.name))
            .bind(("password_hash", password_hash))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| {
            let message = e.to_string();
            if message.contains(USERNAME_INDEX) {
                DbError::AlreadyExists {
                    entity: "user".into(),
                }
            } else {
                DbError::Query(message)
            }
        })?;
        let rows: Vec<UserRow> = result.take(1).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::NotFound {
                entity: "user".into(),
                id,
            })?;

        Ok(row.try_into_user()?)
    }

    async fn find_by_id(&self, id: Uuid) -> StepwiseResult<Option<User>> {
        let mut result = self
            .db
            .query(SELECT_USER_BY_ID)
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().next().map(UserRow::try_into_user).transpose()?)
    }

    async fn find_by_username(&self, username: &str) -> StepwiseResult<Option<User>> {
        Ok(self
            .find_where("username = $username", "username", username.to_string())
            .await?)
    }

    async fn find_by_cli_token(&self, cli_token: &str) -> StepwiseResult<Option<User>> {
        Ok(self
            .find_where("cli_token = $cli_token", "cli_token", cli_token.to_string())
            .await?)
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> StepwiseResult<User> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.email.is_some() {
            sets.push("email = $email");
        }
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.cli_token.is_some() {
            sets.push("cli_token = $cli_token");
        }
        sets.push("updated_at = time::now()");

        let mut builder = self
            .db
            .query(format!(
                "UPDATE type::record('user', $id) SET {};",
                sets.join(", ")
            ))
            .query(SELECT_USER_BY_ID)
            .bind(("id", id_str.clone()));

        if let Some(email) = input.email {
            builder = builder.bind(("email", email));
        }
        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(cli_token) = input.cli_token {
            // Some(Some(v)) = set, Some(None) = clear
            builder = builder.bind(("cli_token", cli_token));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<UserRow> = result.take(1).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::NotFound {
                entity: "user".into(),
                id: id_str,
            })?;

        Ok(row.try_into_user()?)
    }

    async fn set_cli_token_if_absent(&self, id: Uuid, cli_token: &str) -> StepwiseResult<User> {
        let outcome = self
            .db
            .query(
                "UPDATE type::record('user', $id) \
                 SET cli_token = $cli_token, updated_at = time::now() \
                 WHERE cli_token = NONE OR cli_token = '';",
            )
            .bind(("id", id.to_string()))
            .bind(("cli_token", cli_token.to_string()))
            .await
            .map_err(DbError::from)?
            .check();
        if let Err(e) = outcome {
            // A concurrent writer touching the same record; its token, if
            // any, is what the re-read below returns.
            debug!(user_id = %id, error = %e, "conditional cli token write rejected");
        }

        self.find_by_id(id).await?.ok_or_else(|| {
            DbError::NotFound {
                entity: "user".into(),
                id: id.to_string(),
            }
            .into()
        })
    }
}
